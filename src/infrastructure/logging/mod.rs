//! Structured logging infrastructure: `tracing`-based subscriber setup and
//! secret scrubbing, grounded on the teacher's `infrastructure/logging/`.

pub mod logger;
pub mod secret_scrubbing;

pub use logger::LoggerImpl;
pub use secret_scrubbing::scrub_message;
