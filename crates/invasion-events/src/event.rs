//! Event Types
//!
//! Records appended to the invasion event log, one JSON object per line.

use serde::{Deserialize, Serialize};

use crate::{AlienId, CityId};

/// Generates an event ID with the given sequence number.
pub fn generate_event_id(sequence: u64) -> String {
    format!("evt_{:08}", sequence)
}

/// Primary event type categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Landing,
    Movement,
    Fight,
    End,
}

/// Why the simulation stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The configured move budget was exhausted
    MaxMoves,
    /// Every alien died in a fight
    NoAliensLeft,
    /// An external shutdown was requested
    Shutdown,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            StopReason::MaxMoves => "max_moves",
            StopReason::NoAliensLeft => "no_aliens_left",
            StopReason::Shutdown => "shutdown",
        };
        f.write_str(text)
    }
}

/// Minimal reference to an alien inside an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlienRef {
    pub alien_id: AlienId,
    pub name: String,
}

impl AlienRef {
    pub fn new(alien_id: AlienId, name: impl Into<String>) -> Self {
        Self {
            alien_id,
            name: name.into(),
        }
    }
}

/// Event payload, tagged by kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    /// An alien was placed on its starting city
    Landing {
        alien: AlienRef,
        city_id: CityId,
        city: String,
    },
    /// An alien moved along a link
    Movement {
        alien: AlienRef,
        from: CityId,
        to: CityId,
    },
    /// Two or more aliens met and destroyed a city
    Fight {
        city_id: CityId,
        city: String,
        aliens: Vec<AlienRef>,
        /// Neighbours whose link to the destroyed city was severed
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        severed: Vec<String>,
    },
    /// The simulation stopped
    End {
        reason: StopReason,
        aliens_remaining: usize,
        cities_remaining: usize,
    },
}

impl EventKind {
    /// Category of this payload
    pub fn event_type(&self) -> EventType {
        match self {
            EventKind::Landing { .. } => EventType::Landing,
            EventKind::Movement { .. } => EventType::Movement,
            EventKind::Fight { .. } => EventType::Fight,
            EventKind::End { .. } => EventType::End,
        }
    }
}

/// A single logged event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier (e.g., "evt_00000042")
    pub event_id: String,
    /// Tick during which the event happened (0 = seeding)
    pub tick: u64,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl Event {
    pub fn new(event_id: impl Into<String>, tick: u64, kind: EventKind) -> Self {
        Self {
            event_id: event_id.into(),
            tick,
            kind,
        }
    }

    pub fn event_type(&self) -> EventType {
        self.kind.event_type()
    }

    /// Serializes the event to a single JSON line (no trailing newline).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes an event from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
