//! Coordinate Assignment
//!
//! Map files only describe topology. Positions are derived by walking the
//! graph with the right-hand rule from the first city, facing north, and
//! recording each step as a unit offset in the direction walked.

use std::collections::{BTreeMap, HashSet};

use crate::components::{City, Direction};
use crate::error::WorldError;
use crate::CityId;

use super::{InMemoryWorld, WorldStore};

/// Normalized positions and map bounds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Non-negative (x, y) per city
    pub positions: BTreeMap<CityId, (i64, i64)>,
    pub width: i64,
    pub height: i64,
}

/// What the walker did to arrive at its current state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Start,
    Moved,
    Turned,
}

/// Right-hand wall follower over an `InMemoryWorld`.
pub struct WallFollower<'w> {
    world: &'w InMemoryWorld,
    origin: CityId,
    current: CityId,
    facing: Direction,
    step: Step,
    x: i64,
    y: i64,
    visited: HashSet<CityId>,
    seen_states: HashSet<(CityId, Direction)>,
    positions: BTreeMap<CityId, (i64, i64)>,
}

impl<'w> WallFollower<'w> {
    /// Walker starting at the lowest city id, facing north.
    pub fn new(world: &'w InMemoryWorld) -> Self {
        let origin = world.cities().first().map(|c| c.id).unwrap_or_default();
        Self {
            world,
            origin,
            current: origin,
            facing: Direction::North,
            step: Step::Start,
            x: 0,
            // the first step is recorded as a move north, which lands on y = 0
            y: 1,
            visited: HashSet::new(),
            seen_states: HashSet::new(),
            positions: BTreeMap::new(),
        }
    }

    /// Walks until every city is visited or the walker is back in a state it
    /// has already been in (normally: the origin, facing north).
    pub fn walk(mut self) -> Result<Layout, WorldError> {
        let total = self.world.num_cities();
        if total == 0 {
            return Err(WorldError::EmptyMap);
        }

        let world = self.world;
        while self.visited.len() < total {
            if !self.seen_states.insert((self.current, self.facing)) {
                break;
            }
            let city = world.city(self.current)?;
            self.visited.insert(self.current);
            if self.step != Step::Turned {
                let (dx, dy) = self.facing.delta();
                self.x += dx;
                self.y += dy;
                self.positions.insert(self.current, (self.x, self.y));
            }
            self.advance(city)?;
        }

        if self.visited.len() < total {
            let origin = self.world.city(self.origin)?.name.clone();
            return Err(WorldError::UnreachableCities {
                origin,
                unreachable: total - self.visited.len(),
                total,
            });
        }
        Ok(self.normalize())
    }

    /// Prefer turning right, then going straight, else turn left in place.
    fn advance(&mut self, city: &City) -> Result<(), WorldError> {
        let right = self.facing.clockwise();
        if city.has_link(right) {
            self.facing = right;
            self.current = self.forward(city)?;
            self.step = Step::Moved;
        } else if city.has_link(self.facing) {
            self.current = self.forward(city)?;
            self.step = Step::Moved;
        } else {
            self.facing = self.facing.counter_clockwise();
            self.step = Step::Turned;
        }
        Ok(())
    }

    fn forward(&self, city: &City) -> Result<CityId, WorldError> {
        let target = city.link(self.facing).unwrap_or_default();
        self.world
            .lookup_link(city, self.facing, target)
            .map(|neighbor| neighbor.id)
    }

    /// Shift so the smallest coordinate on each axis is 0.
    fn normalize(self) -> Layout {
        let (mut min_x, mut max_x, mut min_y, mut max_y) = (0, 0, 0, 0);
        for &(x, y) in self.positions.values() {
            min_x = min_x.min(x);
            max_x = max_x.max(x);
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
        let positions = self
            .positions
            .into_iter()
            .map(|(id, (x, y))| (id, (x - min_x, y - min_y)))
            .collect();
        Layout {
            positions,
            width: max_x - min_x + 1,
            height: max_y - min_y + 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout_of(map: &str) -> Result<InMemoryWorld, WorldError> {
        InMemoryWorld::from_reader(map.as_bytes())
    }

    fn position(world: &InMemoryWorld, name: &str) -> (i64, i64) {
        let city = world.city_by_name(name).unwrap();
        (city.x, city.y)
    }

    #[test]
    fn test_five_city_cross() {
        let world = layout_of(
            "Foo north=Bar west=Baz south=Qu-ux
Bar south=Foo west=Bee
Qu-ux north=Foo
Baz east=Foo
Bee east=Bar",
        )
        .unwrap();

        let ids: Vec<_> = world.cities().iter().map(|c| (c.id, c.name.clone())).collect();
        assert_eq!(
            ids,
            vec![
                (0, "Foo".to_string()),
                (1, "Bar".to_string()),
                (2, "Qu-ux".to_string()),
                (3, "Baz".to_string()),
                (4, "Bee".to_string()),
            ]
        );
        assert_eq!(position(&world, "Foo"), (1, 1));
        assert_eq!(position(&world, "Bar"), (1, 0));
        assert_eq!(position(&world, "Qu-ux"), (1, 2));
        assert_eq!(position(&world, "Baz"), (0, 1));
        assert_eq!(position(&world, "Bee"), (0, 0));
        assert_eq!((world.width(), world.height()), (2, 3));
    }

    #[test]
    fn test_single_city() {
        let world = layout_of("Solo\n").unwrap();

        assert_eq!(position(&world, "Solo"), (0, 0));
        assert_eq!((world.width(), world.height()), (1, 1));
    }

    #[test]
    fn test_row_of_cities() {
        let world = layout_of(
            "A east=B
B west=A east=C
C west=B",
        )
        .unwrap();

        assert_eq!(position(&world, "A"), (0, 0));
        assert_eq!(position(&world, "B"), (1, 0));
        assert_eq!(position(&world, "C"), (2, 0));
        assert_eq!((world.width(), world.height()), (3, 1));
    }

    #[test]
    fn test_square_ring() {
        let world = layout_of(
            "A east=B south=D
B west=A south=C
C north=B west=D
D north=A east=C",
        )
        .unwrap();

        assert_eq!(position(&world, "A"), (0, 0));
        assert_eq!(position(&world, "B"), (1, 0));
        assert_eq!(position(&world, "C"), (1, 1));
        assert_eq!(position(&world, "D"), (0, 1));
        assert_eq!((world.width(), world.height()), (2, 2));
    }

    #[test]
    fn test_isolated_component_is_unreachable() {
        let err = layout_of(
            "Foo south=Qu-ux
Qu-ux north=Foo
Bar east=Bee
Bee west=Bar
",
        )
        .unwrap_err();

        assert!(matches!(
            err,
            WorldError::UnreachableCities {
                unreachable: 2,
                total: 4,
                ..
            }
        ));
        assert!(err.to_string().contains("invalid map"));
    }

    #[test]
    fn test_isolated_single_city_is_unreachable() {
        let err = layout_of("Foo\nBar\n").unwrap_err();

        assert!(matches!(err, WorldError::UnreachableCities { unreachable: 1, .. }));
    }

    #[test]
    fn test_empty_map() {
        assert!(matches!(layout_of("\n\n"), Err(WorldError::EmptyMap)));
    }

    #[test]
    fn test_walk_is_deterministic() {
        let map = "Foo north=Bar west=Baz south=Qu-ux
Bar south=Foo west=Bee
Qu-ux north=Foo
Baz east=Foo
Bee east=Bar";
        let a = layout_of(map).unwrap();
        let b = layout_of(map).unwrap();

        let first = WallFollower::new(&a).walk().unwrap();
        let second = WallFollower::new(&b).walk().unwrap();

        assert_eq!(first, second);
    }
}
