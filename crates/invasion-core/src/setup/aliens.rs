//! Alien Landing
//!
//! Places the initial invaders, each on a uniformly random city.

use rand::Rng;
use tracing::{info, warn};

use crate::components::Alien;
use crate::world::WorldStore;
use crate::CityId;

/// Lands `count` aliens with ids `0..count` on random cities.
///
/// City ids are drawn from `0..num_cities`. An alien the store refuses is
/// logged and skipped. Returns the aliens that actually landed.
pub fn land_aliens<W, R>(world: &mut W, count: usize, rng: &mut R) -> Vec<Alien>
where
    W: WorldStore + ?Sized,
    R: Rng + ?Sized,
{
    let num_cities = world.num_cities();
    if num_cities == 0 {
        warn!(count, "no city to land on");
        return Vec::new();
    }

    let mut landed = Vec::with_capacity(count);
    for id in 0..count {
        let city: CityId = rng.gen_range(0..num_cities);
        let alien = Alien::new(id, city, rng);
        match world.add_alien(alien.clone()) {
            Ok(()) => {
                info!(alien_id = alien.id, name = %alien.name, city, "alien landed");
                landed.push(alien);
            }
            Err(e) => warn!(alien_id = id, error = %e, "failed to land alien"),
        }
    }
    landed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::InMemoryWorld;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    const CROSS: &str = "Foo north=Bar west=Baz south=Qu-ux
Bar south=Foo west=Bee
Qu-ux north=Foo
Baz east=Foo
Bee east=Bar
";

    #[test]
    fn test_lands_requested_number() {
        let mut world = InMemoryWorld::from_reader(CROSS.as_bytes()).unwrap();
        let mut rng = SmallRng::seed_from_u64(7);

        let landed = land_aliens(&mut world, 10, &mut rng);

        assert_eq!(landed.len(), 10);
        assert_eq!(world.aliens().len(), 10);
        let ids: Vec<_> = landed.iter().map(|a| a.id).collect();
        assert_eq!(ids, (0..10).collect::<Vec<_>>());
        assert!(landed.iter().all(|a| a.city < 5));

        let indexed: usize = world.aliens_by_city().values().map(Vec::len).sum();
        assert_eq!(indexed, 10);
    }

    #[test]
    fn test_landing_is_seed_deterministic() {
        let mut a = InMemoryWorld::from_reader(CROSS.as_bytes()).unwrap();
        let mut b = InMemoryWorld::from_reader(CROSS.as_bytes()).unwrap();

        let first = land_aliens(&mut a, 6, &mut SmallRng::seed_from_u64(99));
        let second = land_aliens(&mut b, 6, &mut SmallRng::seed_from_u64(99));

        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_world_lands_nothing() {
        let mut world = InMemoryWorld::new();
        let mut rng = SmallRng::seed_from_u64(1);

        assert!(land_aliens(&mut world, 3, &mut rng).is_empty());
    }
}
