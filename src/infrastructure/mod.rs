//! Infrastructure layer: configuration loading and logging setup — the
//! ambient concerns every call site in `coordination`/`server` relies on but
//! none of them construct directly.

pub mod config;
pub mod logging;
