//! C10: the external surface — MCP stdio JSON-RPC dispatcher, tool handlers,
//! and the realtime event log.

pub mod dispatcher;
pub mod realtime_log;
pub mod tools;

pub use dispatcher::{run, AppState};
pub use realtime_log::RealtimeLog;
