//! Concrete adapters implementing the domain's port traits.

pub mod ai;
pub mod kanban;
