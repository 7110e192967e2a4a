//! Alien Invasion Simulation Library
//!
//! World model and simulation engine: map parsing and validation,
//! coordinate assignment, the world store and the tick loop.

pub mod components;
pub mod config;
pub mod error;
pub mod events;
pub mod setup;
pub mod simulation;
pub mod systems;
pub mod world;

pub use invasion_events::{AlienId, CityId};

pub use components::{Alien, City, CityRecord, Direction};
pub use config::{ConfigError, SimConfig};
pub use error::WorldError;
pub use events::EventLogger;
pub use simulation::{Phase, RunSummary, Simulation, TickReport};
pub use world::{InMemoryWorld, SharedWorld, WorldStore};
