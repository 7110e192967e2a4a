//! Fight System
//!
//! Any city holding two or more aliens is destroyed together with them.

use invasion_events::EventKind;
use tracing::{error, info, warn};

use crate::events::PendingEvents;
use crate::world::{RemovedCity, WorldStore};

/// Destroys every occupied-by-many city. Returns what was removed.
pub fn resolve_fights<W>(world: &mut W, pending: &mut PendingEvents) -> Vec<RemovedCity>
where
    W: WorldStore + ?Sized,
{
    let contested: Vec<_> = world
        .aliens_by_city()
        .into_iter()
        .filter(|(_, aliens)| aliens.len() > 1)
        .map(|(city_id, _)| city_id)
        .collect();

    let mut destroyed = Vec::with_capacity(contested.len());
    for city_id in contested {
        let removed = match world.remove_city(city_id) {
            Ok(removed) => removed,
            Err(e) if e.is_not_found() => {
                warn!(city_id, error = %e, "removing city");
                continue;
            }
            Err(e) => {
                error!(city_id, error = %e, "removing city");
                continue;
            }
        };

        let names: Vec<&str> = removed.aliens.iter().map(|a| a.name.as_str()).collect();
        info!(
            city = %removed.city.name,
            aliens = removed.aliens.len(),
            names = %names.join(", "),
            "Fight !!"
        );

        pending.push(EventKind::Fight {
            city_id,
            city: removed.city.name.clone(),
            aliens: removed.aliens.iter().map(|a| a.to_ref()).collect(),
            severed: removed.severed.clone(),
        });
        destroyed.push(removed);
    }
    destroyed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Alien, Direction};
    use crate::world::InMemoryWorld;

    const CROSS: &str = "Foo north=Bar west=Baz south=Qu-ux
Bar south=Foo west=Bee
Qu-ux north=Foo
Baz east=Foo
Bee east=Bar
";

    #[test]
    fn test_two_aliens_destroy_city() {
        let mut world = InMemoryWorld::from_reader(CROSS.as_bytes()).unwrap();
        world.add_alien(Alien::named(0, "zukam0", 0)).unwrap();
        world.add_alien(Alien::named(1, "gamor1", 0)).unwrap();
        world.add_alien(Alien::named(2, "lixor2", 4)).unwrap();
        let mut pending = PendingEvents::new();

        let destroyed = resolve_fights(&mut world, &mut pending);

        assert_eq!(destroyed.len(), 1);
        assert_eq!(destroyed[0].city.name, "Foo");
        assert_eq!(destroyed[0].aliens.len(), 2);
        assert_eq!(world.num_cities(), 4);
        assert!(world.city_by_name("Foo").is_err());

        let bar = world.city_by_name("Bar").unwrap();
        assert_eq!(bar.link(Direction::South), None);
        assert_eq!(bar.link(Direction::West), Some("Bee"));
        assert_eq!(world.city_by_name("Baz").unwrap().link(Direction::East), None);
        assert_eq!(world.city_by_name("Qu-ux").unwrap().link(Direction::North), None);

        let survivors: Vec<_> = world.aliens().iter().map(|a| a.id).collect();
        assert_eq!(survivors, vec![2]);

        let events = pending.drain();
        assert_eq!(events.len(), 1);
        let EventKind::Fight { city, aliens, severed, .. } = &events[0] else {
            panic!("expected a fight event");
        };
        assert_eq!(city, "Foo");
        assert_eq!(aliens.len(), 2);
        assert_eq!(severed.len(), 3);
    }

    #[test]
    fn test_simultaneous_fights() {
        let mut world = InMemoryWorld::from_reader(CROSS.as_bytes()).unwrap();
        for (id, city) in [(0, 1), (1, 1), (2, 4), (3, 4), (4, 4)] {
            world.add_alien(Alien::named(id, format!("a{id}"), city)).unwrap();
        }
        let mut pending = PendingEvents::new();

        let destroyed = resolve_fights(&mut world, &mut pending);

        let names: Vec<_> = destroyed.iter().map(|r| r.city.name.as_str()).collect();
        assert_eq!(names, vec!["Bar", "Bee"]);
        assert!(world.aliens().is_empty());
        assert_eq!(world.num_cities(), 3);
        assert_eq!(world.city_by_name("Foo").unwrap().link(Direction::North), None);
    }

    #[test]
    fn test_lone_aliens_do_not_fight() {
        let mut world = InMemoryWorld::from_reader(CROSS.as_bytes()).unwrap();
        world.add_alien(Alien::named(0, "a0", 0)).unwrap();
        world.add_alien(Alien::named(1, "a1", 1)).unwrap();
        let mut pending = PendingEvents::new();

        assert!(resolve_fights(&mut world, &mut pending).is_empty());
        assert!(pending.is_empty());
        assert_eq!(world.num_cities(), 5);
    }
}
