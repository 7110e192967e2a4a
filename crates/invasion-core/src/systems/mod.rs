//! Tick Systems
//!
//! Movement and fight resolution, run in that order once per tick.

pub mod fight;
pub mod movement;

pub use fight::resolve_fights;
pub use movement::{choose_exit, move_aliens, MoveOutcome};
