//! Shared event and snapshot types for the alien invasion simulation.
//!
//! This crate contains pure data structures with no simulation logic.
//! It is a dependency for all other crates in the workspace.

pub mod event;
pub mod snapshot;

/// Identifier of a city, assigned in load order starting at 0.
pub type CityId = usize;

/// Identifier of an alien, assigned by the caller.
pub type AlienId = usize;

// Re-export event types
pub use event::{generate_event_id, AlienRef, Event, EventKind, EventType, StopReason};

// Re-export snapshot types
pub use snapshot::{AlienSnapshot, CitySnapshot, WorldSnapshot};
