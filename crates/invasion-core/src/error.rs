//! Error taxonomy for loading and mutating the world.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::components::Direction;
use crate::{AlienId, CityId};

/// Errors raised by the parser, validator, coordinate assigner and store.
#[derive(Debug, Error)]
pub enum WorldError {
    /// A token is not of the form `direction=name`, or the line is too long
    #[error("line {line}: malformed entry: {reason}")]
    MalformedLine { line: u64, reason: String },

    /// The same direction keyword appears twice on one line
    #[error("line {line}: duplicated connection `{direction}`")]
    DuplicateDirection { line: u64, direction: Direction },

    /// Two lines declare the same city name
    #[error("duplicated city `{0}`")]
    DuplicateCity(String),

    /// A link names a city that was never declared
    #[error("{city} {direction} connection: city `{target}` not found")]
    UnknownCity {
        city: String,
        direction: Direction,
        target: String,
    },

    /// A link is not mirrored by the neighbour's opposite link
    #[error(
        "invalid connection: {city} {direction} connection ({neighbor}) doesn't match \
         {neighbor} {opposite} connection ({found})"
    )]
    InconsistentConnection {
        city: String,
        direction: Direction,
        neighbor: String,
        opposite: Direction,
        found: String,
    },

    /// Some cities cannot be reached from the first city
    #[error("invalid map: {unreachable} of {total} cities unreachable from `{origin}`")]
    UnreachableCities {
        origin: String,
        unreachable: usize,
        total: usize,
    },

    /// The map declares no city at all
    #[error("invalid map: no cities")]
    EmptyMap,

    #[error("city {0} not found")]
    CityNotFound(CityId),

    #[error("city `{0}` not found")]
    NamedCityNotFound(String),

    #[error("alien {0} not found")]
    AlienNotFound(AlienId),

    #[error("reading map: {0}")]
    Io(#[from] io::Error),

    /// The map could not be written out
    #[error("writing map to {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl WorldError {
    /// True for runtime lookup misses. Per-alien and per-city loops log these
    /// as warnings and any other error as an error; both are skipped.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            WorldError::CityNotFound(_)
                | WorldError::NamedCityNotFound(_)
                | WorldError::AlienNotFound(_)
                | WorldError::UnknownCity { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_keep_searchable_wording() {
        let dup = WorldError::DuplicateDirection {
            line: 1,
            direction: Direction::South,
        };
        assert!(dup.to_string().contains("duplicated connection"));

        let inconsistent = WorldError::InconsistentConnection {
            city: "Foo".to_string(),
            direction: Direction::South,
            neighbor: "Qu-ux".to_string(),
            opposite: Direction::North,
            found: "Bar".to_string(),
        };
        assert_eq!(
            inconsistent.to_string(),
            "invalid connection: Foo south connection (Qu-ux) doesn't match Qu-ux north connection (Bar)"
        );

        assert!(WorldError::EmptyMap.to_string().contains("invalid map"));
        assert!(WorldError::CityNotFound(3).to_string().contains("not found"));
    }

    #[test]
    fn test_not_found_classification() {
        assert!(WorldError::AlienNotFound(1).is_not_found());
        assert!(WorldError::CityNotFound(1).is_not_found());
        assert!(!WorldError::DuplicateCity("Foo".to_string()).is_not_found());
    }
}
