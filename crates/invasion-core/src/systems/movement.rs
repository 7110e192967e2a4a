//! Movement System
//!
//! Each living alien either stays or follows one of its city's links.

use invasion_events::EventKind;
use rand::Rng;
use tracing::{error, warn};

use crate::events::PendingEvents;
use crate::world::WorldStore;
use crate::CityId;

/// Counts for one movement pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveOutcome {
    pub moved: usize,
    pub stayed: usize,
    /// Aliens skipped because of a store error
    pub failed: usize,
}

/// Draws from `0..=exits.len()`; the last outcome means stay.
///
/// An alien with no exit stays without drawing.
pub fn choose_exit<R: Rng + ?Sized>(exits: &[CityId], rng: &mut R) -> Option<CityId> {
    if exits.is_empty() {
        return None;
    }
    let index = rng.gen_range(0..=exits.len());
    exits.get(index).copied()
}

/// Moves every alien once, in ascending id order.
///
/// Errors for one alien are logged and do not affect the others.
pub fn move_aliens<W, R>(world: &mut W, rng: &mut R, pending: &mut PendingEvents) -> MoveOutcome
where
    W: WorldStore + ?Sized,
    R: Rng + ?Sized,
{
    let mut outcome = MoveOutcome::default();
    let roster: Vec<_> = world
        .aliens()
        .into_iter()
        .map(|a| (a.to_ref(), a.city))
        .collect();

    for (alien, from) in roster {
        let exits = match world.exits(from) {
            Ok(exits) => exits,
            Err(e) if e.is_not_found() => {
                warn!(alien_id = alien.alien_id, city = from, error = %e, "getting exits");
                outcome.failed += 1;
                continue;
            }
            Err(e) => {
                error!(alien_id = alien.alien_id, city = from, error = %e, "getting exits");
                outcome.failed += 1;
                continue;
            }
        };
        let Some(to) = choose_exit(&exits, rng) else {
            outcome.stayed += 1;
            continue;
        };
        match world.move_alien(alien.alien_id, to) {
            Ok(()) => {
                outcome.moved += 1;
                pending.push(EventKind::Movement { alien, from, to });
            }
            Err(e) if e.is_not_found() => {
                warn!(alien_id = alien.alien_id, from, to, error = %e, "moving alien");
                outcome.failed += 1;
            }
            Err(e) => {
                error!(alien_id = alien.alien_id, from, to, error = %e, "moving alien");
                outcome.failed += 1;
            }
        }
    }
    outcome
}
