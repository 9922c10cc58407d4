//! Configuration management infrastructure: hierarchical YAML + env loading
//! via `figment`, grounded on the teacher's `infrastructure/config/loader.rs`.

pub mod loader;

pub use loader::{ConfigError, ConfigLoader};
