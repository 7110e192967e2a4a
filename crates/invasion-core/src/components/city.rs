//! City Components
//!
//! Compass directions, raw city records and indexed cities.

use serde::{Deserialize, Serialize};
use std::fmt;

use invasion_events::CitySnapshot;

use crate::CityId;

/// One of the four compass directions a city can link through.
///
/// The declaration order is clockwise starting at north; the coordinate walk
/// relies on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// All directions in serialization order (north, east, south, west)
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Keyword used in map files
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::East => "east",
            Direction::South => "south",
            Direction::West => "west",
        }
    }

    /// Parses a map-file keyword. Matching is case-sensitive.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "north" => Some(Direction::North),
            "east" => Some(Direction::East),
            "south" => Some(Direction::South),
            "west" => Some(Direction::West),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    /// Rotate 90 degrees clockwise
    pub fn clockwise(self) -> Self {
        Self::ALL[(self.index() + 1) % 4]
    }

    /// Rotate 90 degrees counter-clockwise
    pub fn counter_clockwise(self) -> Self {
        Self::ALL[(self.index() + 3) % 4]
    }

    /// Planar offset of one step in this direction; y grows southward.
    pub fn delta(self) -> (i64, i64) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named links indexed by `Direction::index`
pub type Links = [Option<String>; 4];

/// A city as read from one map line, before it is registered
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CityRecord {
    pub name: String,
    pub links: Links,
}

impl CityRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            links: Default::default(),
        }
    }

    pub fn with_link(mut self, direction: Direction, target: impl Into<String>) -> Self {
        self.links[direction.index()] = Some(target.into());
        self
    }

    pub fn link(&self, direction: Direction) -> Option<&str> {
        self.links[direction.index()].as_deref()
    }
}

/// A registered city
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub id: CityId,
    pub name: String,
    links: Links,
    /// Planar position, assigned after validation
    pub x: i64,
    pub y: i64,
}

impl City {
    pub fn new(id: CityId, record: CityRecord) -> Self {
        Self {
            id,
            name: record.name,
            links: record.links,
            x: 0,
            y: 0,
        }
    }

    /// Name of the neighbour in `direction`, if linked
    pub fn link(&self, direction: Direction) -> Option<&str> {
        self.links[direction.index()].as_deref()
    }

    pub fn has_link(&self, direction: Direction) -> bool {
        self.links[direction.index()].is_some()
    }

    pub fn clear_link(&mut self, direction: Direction) {
        self.links[direction.index()] = None;
    }

    /// Present links in fixed order (north, east, south, west)
    pub fn links(&self) -> impl Iterator<Item = (Direction, &str)> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |d| self.link(d).map(|name| (d, name)))
    }

    pub fn is_isolated(&self) -> bool {
        self.links().next().is_none()
    }

    /// Map-file line for this city, without the trailing newline
    pub fn to_line(&self) -> String {
        let mut line = self.name.clone();
        for (direction, target) in self.links() {
            line.push(' ');
            line.push_str(direction.as_str());
            line.push('=');
            line.push_str(target);
        }
        line
    }

    pub fn to_snapshot(&self) -> CitySnapshot {
        let mut snapshot = CitySnapshot::new(self.id, &self.name, self.x, self.y);
        snapshot.north = self.link(Direction::North).map(str::to_string);
        snapshot.east = self.link(Direction::East).map(str::to_string);
        snapshot.south = self.link(Direction::South).map(str::to_string);
        snapshot.west = self.link(Direction::West).map(str::to_string);
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_cycles() {
        assert_eq!(Direction::North.clockwise(), Direction::East);
        assert_eq!(Direction::West.clockwise(), Direction::North);
        assert_eq!(Direction::North.counter_clockwise(), Direction::West);
        assert_eq!(Direction::East.counter_clockwise(), Direction::North);

        for d in Direction::ALL {
            assert_eq!(d.clockwise().counter_clockwise(), d);
            assert_eq!(d.opposite().opposite(), d);
            assert_eq!(d.clockwise().clockwise(), d.opposite());
        }
    }

    #[test]
    fn test_keywords_are_case_sensitive() {
        assert_eq!(Direction::from_keyword("north"), Some(Direction::North));
        assert_eq!(Direction::from_keyword("North"), None);
        assert_eq!(Direction::from_keyword("up"), None);
        for d in Direction::ALL {
            assert_eq!(Direction::from_keyword(d.as_str()), Some(d));
        }
    }

    #[test]
    fn test_to_line_uses_fixed_order() {
        let record = CityRecord::new("Foo")
            .with_link(Direction::West, "Baz")
            .with_link(Direction::South, "Qu-ux")
            .with_link(Direction::North, "Bar");
        let city = City::new(0, record);

        assert_eq!(city.to_line(), "Foo north=Bar south=Qu-ux west=Baz");
    }

    #[test]
    fn test_clear_link() {
        let mut city = City::new(2, CityRecord::new("Qu-ux").with_link(Direction::North, "Foo"));
        assert!(!city.is_isolated());

        city.clear_link(Direction::North);

        assert!(city.is_isolated());
        assert_eq!(city.to_line(), "Qu-ux");
    }

    #[test]
    fn test_snapshot_copies_links() {
        let mut city = City::new(1, CityRecord::new("Bar").with_link(Direction::South, "Foo"));
        city.x = 1;

        let snapshot = city.to_snapshot();

        assert_eq!(snapshot.city_id, 1);
        assert_eq!(snapshot.south.as_deref(), Some("Foo"));
        assert_eq!(snapshot.north, None);
        assert_eq!((snapshot.x, snapshot.y), (1, 0));
    }
}
