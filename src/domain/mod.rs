//! Domain layer: shared models and the external port traits they flow through.

pub mod models;
pub mod ports;
