//! Event Logging
//!
//! Machine-readable record of landings, movements, fights and the end of a run.

pub mod logger;

pub use logger::{EventLogger, PendingEvents};
