//! External-facing port traits (hexagonal boundary, §4.4/§4.12).

pub mod ai;
pub mod kanban;

pub use ai::{AiAdapter, ExpandedProject, ExpandedTask};
pub use kanban::KanbanProvider;
