//! Snapshot Types
//!
//! Serialization structs for point-in-time copies of the invasion world.
//!
//! A snapshot is detached from the live store: renderers and the map service
//! work on it without holding any lock.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{AlienId, CityId};

/// City snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitySnapshot {
    pub city_id: CityId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub north: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub east: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub south: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub west: Option<String>,
    pub x: i64,
    pub y: i64,
}

impl CitySnapshot {
    /// Creates a city snapshot without links.
    pub fn new(city_id: CityId, name: impl Into<String>, x: i64, y: i64) -> Self {
        Self {
            city_id,
            name: name.into(),
            north: None,
            east: None,
            south: None,
            west: None,
            x,
            y,
        }
    }
}

/// Alien snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlienSnapshot {
    pub alien_id: AlienId,
    pub name: String,
    pub city_id: CityId,
}

impl AlienSnapshot {
    pub fn new(alien_id: AlienId, name: impl Into<String>, city_id: CityId) -> Self {
        Self {
            alien_id,
            name: name.into(),
            city_id,
        }
    }
}

/// Complete world snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Ticks elapsed when the snapshot was taken
    pub tick: u64,
    /// Map width in cells, fixed at load time
    pub width: i64,
    /// Map height in cells, fixed at load time
    pub height: i64,
    /// Surviving cities, ascending id
    pub cities: Vec<CitySnapshot>,
    /// Surviving aliens, ascending id
    pub aliens: Vec<AlienSnapshot>,
}

impl WorldSnapshot {
    pub fn new(tick: u64, width: i64, height: i64) -> Self {
        Self {
            tick,
            width,
            height,
            cities: Vec::new(),
            aliens: Vec::new(),
        }
    }

    /// Finds a city by ID.
    pub fn find_city(&self, city_id: CityId) -> Option<&CitySnapshot> {
        self.cities.iter().find(|c| c.city_id == city_id)
    }

    /// Returns aliens currently in a city.
    pub fn aliens_in_city(&self, city_id: CityId) -> Vec<&AlienSnapshot> {
        self.aliens.iter().filter(|a| a.city_id == city_id).collect()
    }

    /// Number of aliens per occupied city.
    pub fn alien_counts(&self) -> BTreeMap<CityId, usize> {
        let mut counts = BTreeMap::new();
        for alien in &self.aliens {
            *counts.entry(alien.city_id).or_insert(0) += 1;
        }
        counts
    }

    /// Serializes the snapshot to pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserializes a snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> WorldSnapshot {
        let mut snapshot = WorldSnapshot::new(4, 2, 3);
        let mut foo = CitySnapshot::new(0, "Foo", 1, 1);
        foo.north = Some("Bar".to_string());
        snapshot.cities.push(foo);
        let mut bar = CitySnapshot::new(1, "Bar", 1, 0);
        bar.south = Some("Foo".to_string());
        snapshot.cities.push(bar);
        snapshot.aliens.push(AlienSnapshot::new(0, "zaxor0", 0));
        snapshot.aliens.push(AlienSnapshot::new(1, "kigml1", 0));
        snapshot.aliens.push(AlienSnapshot::new(2, "ukaxe2", 1));
        snapshot
    }

    #[test]
    fn test_alien_counts() {
        let counts = sample().alien_counts();

        assert_eq!(counts.get(&0), Some(&2));
        assert_eq!(counts.get(&1), Some(&1));
        assert_eq!(counts.get(&2), None);
    }

    #[test]
    fn test_find_city_and_aliens() {
        let snapshot = sample();

        assert_eq!(snapshot.find_city(1).map(|c| c.name.as_str()), Some("Bar"));
        assert!(snapshot.find_city(9).is_none());
        assert_eq!(snapshot.aliens_in_city(0).len(), 2);
    }

    #[test]
    fn test_empty_links_are_omitted_from_json() {
        let json = serde_json::to_string(&CitySnapshot::new(3, "Baz", 0, 1)).unwrap();

        assert!(!json.contains("north"));
        assert!(json.contains("\"name\":\"Baz\""));
    }

    #[test]
    fn test_json_roundtrip_keeps_links() {
        let snapshot = sample();
        let parsed = WorldSnapshot::from_json(&snapshot.to_json_pretty().unwrap()).unwrap();

        assert_eq!(parsed, snapshot);
    }
}
