//! AI adapter implementations.

pub mod json_extract;
pub mod mock;

pub use mock::MockAiAdapter;
