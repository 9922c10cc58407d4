//! Marcus: a multi-agent task coordination server speaking MCP over stdio.
//!
//! The crate is organized by the components named in the specification: the
//! error substrate (`error_handling`), the error monitor (`monitoring`), the
//! response formatter (`formatting`), the domain model and port traits
//! (`domain`), concrete adapters (`adapters`), the coordination core
//! (`coordination`), the stdio MCP surface (`server`), and the ambient
//! configuration/logging stack (`infrastructure`).

pub mod adapters;
pub mod cli;
pub mod coordination;
pub mod domain;
pub mod error_handling;
pub mod formatting;
pub mod infrastructure;
pub mod monitoring;
pub mod server;
