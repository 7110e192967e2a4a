//! In-memory world store.
//!
//! Cities are indexed by id and by name, aliens by id and by occupied city.
//! Every mutation updates both indices of a pair before returning.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use crate::components::{Alien, City, CityRecord, Direction};
use crate::error::WorldError;
use crate::setup::parse_map;
use crate::{AlienId, CityId};

use super::{RemovedCity, WorldStore};

#[derive(Debug, Clone, Default)]
pub struct InMemoryWorld {
    next_city_id: CityId,
    cities_by_id: BTreeMap<CityId, City>,
    city_ids_by_name: HashMap<String, CityId>,
    aliens_by_id: BTreeMap<AlienId, Alien>,
    aliens_by_city: BTreeMap<CityId, BTreeSet<AlienId>>,
    width: i64,
    height: i64,
}

impl InMemoryWorld {
    /// An empty world; cities are added with `add_city`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses, validates and lays out a map.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, WorldError> {
        let mut world = Self::new();
        for record in parse_map(reader)? {
            world.add_city(record)?;
        }
        world.validate()?;
        world.assign_coordinates()?;
        Ok(world)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, WorldError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Checks that every link is mirrored by the neighbour's opposite link.
    ///
    /// Cities are checked in ascending id order; the first problem found is
    /// returned.
    pub fn validate(&self) -> Result<(), WorldError> {
        for city in self.cities_by_id.values() {
            for (direction, target) in city.links() {
                let neighbor = self.lookup_link(city, direction, target)?;
                let opposite = direction.opposite();
                if neighbor.link(opposite) != Some(city.name.as_str()) {
                    return Err(WorldError::InconsistentConnection {
                        city: city.name.clone(),
                        direction,
                        neighbor: neighbor.name.clone(),
                        opposite,
                        found: neighbor.link(opposite).unwrap_or("none").to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Positions computed by the wall-following walk are copied onto the
    /// cities and the map bounds are recorded.
    pub fn assign_coordinates(&mut self) -> Result<(), WorldError> {
        let layout = super::WallFollower::new(self).walk()?;
        for (id, (x, y)) in &layout.positions {
            if let Some(city) = self.cities_by_id.get_mut(id) {
                city.x = *x;
                city.y = *y;
            }
        }
        self.width = layout.width;
        self.height = layout.height;
        Ok(())
    }

    /// Resolves the neighbour named by one of `city`'s links.
    pub(crate) fn lookup_link(
        &self,
        city: &City,
        direction: Direction,
        target: &str,
    ) -> Result<&City, WorldError> {
        self.city_ids_by_name
            .get(target)
            .and_then(|id| self.cities_by_id.get(id))
            .ok_or_else(|| WorldError::UnknownCity {
                city: city.name.clone(),
                direction,
                target: target.to_string(),
            })
    }

    fn index_alien(&mut self, alien: Alien) {
        self.aliens_by_city
            .entry(alien.city)
            .or_default()
            .insert(alien.id);
        self.aliens_by_id.insert(alien.id, alien);
    }

    fn unindex_alien_from_city(&mut self, alien_id: AlienId, city_id: CityId) {
        if let Some(ids) = self.aliens_by_city.get_mut(&city_id) {
            ids.remove(&alien_id);
            if ids.is_empty() {
                self.aliens_by_city.remove(&city_id);
            }
        }
    }
}

impl WorldStore for InMemoryWorld {
    fn num_cities(&self) -> usize {
        self.cities_by_id.len()
    }

    fn width(&self) -> i64 {
        self.width
    }

    fn height(&self) -> i64 {
        self.height
    }

    fn cities(&self) -> Vec<&City> {
        self.cities_by_id.values().collect()
    }

    fn city(&self, id: CityId) -> Result<&City, WorldError> {
        self.cities_by_id
            .get(&id)
            .ok_or(WorldError::CityNotFound(id))
    }

    fn city_by_name(&self, name: &str) -> Result<&City, WorldError> {
        let id = self
            .city_ids_by_name
            .get(name)
            .ok_or_else(|| WorldError::NamedCityNotFound(name.to_string()))?;
        self.city(*id)
    }

    fn exits(&self, id: CityId) -> Result<Vec<CityId>, WorldError> {
        let city = self.city(id)?;
        city.links()
            .map(|(direction, target)| {
                self.lookup_link(city, direction, target)
                    .map(|neighbor| neighbor.id)
            })
            .collect()
    }

    fn aliens(&self) -> Vec<&Alien> {
        self.aliens_by_id.values().collect()
    }

    fn alien(&self, id: AlienId) -> Result<&Alien, WorldError> {
        self.aliens_by_id
            .get(&id)
            .ok_or(WorldError::AlienNotFound(id))
    }

    fn aliens_in_city(&self, id: CityId) -> Vec<&Alien> {
        self.aliens_by_city
            .get(&id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|alien_id| self.aliens_by_id.get(alien_id))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn aliens_by_city(&self) -> BTreeMap<CityId, Vec<AlienId>> {
        self.aliens_by_city
            .iter()
            .map(|(city_id, ids)| (*city_id, ids.iter().copied().collect()))
            .collect()
    }

    fn add_city(&mut self, record: CityRecord) -> Result<CityId, WorldError> {
        if self.city_ids_by_name.contains_key(&record.name) {
            return Err(WorldError::DuplicateCity(record.name));
        }
        let id = self.next_city_id;
        self.next_city_id += 1;
        self.city_ids_by_name.insert(record.name.clone(), id);
        self.cities_by_id.insert(id, City::new(id, record));
        Ok(id)
    }

    fn add_alien(&mut self, alien: Alien) -> Result<(), WorldError> {
        // a reused id replaces the previous alien in both indices
        if let Some(previous) = self.aliens_by_id.remove(&alien.id) {
            self.unindex_alien_from_city(previous.id, previous.city);
        }
        self.index_alien(alien);
        Ok(())
    }

    fn move_alien(&mut self, alien_id: AlienId, to: CityId) -> Result<(), WorldError> {
        let mut alien = self
            .aliens_by_id
            .remove(&alien_id)
            .ok_or(WorldError::AlienNotFound(alien_id))?;
        self.unindex_alien_from_city(alien_id, alien.city);
        alien.city = to;
        self.index_alien(alien);
        Ok(())
    }

    fn remove_city(&mut self, id: CityId) -> Result<RemovedCity, WorldError> {
        let city = self
            .cities_by_id
            .remove(&id)
            .ok_or(WorldError::CityNotFound(id))?;
        self.city_ids_by_name.remove(&city.name);

        let mut severed = Vec::new();
        for (direction, target) in city.links() {
            let neighbor = self
                .city_ids_by_name
                .get(target)
                .and_then(|neighbor_id| self.cities_by_id.get_mut(neighbor_id));
            match neighbor {
                Some(neighbor) => {
                    neighbor.clear_link(direction.opposite());
                    severed.push(neighbor.name.clone());
                }
                None => debug!(city = %city.name, %direction, link = target, "link to missing city"),
            }
        }

        let aliens = self
            .aliens_by_city
            .remove(&id)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|alien_id| self.aliens_by_id.remove(&alien_id))
            .collect();

        Ok(RemovedCity {
            city,
            aliens,
            severed,
        })
    }

    fn load(&mut self, path: &Path) -> Result<(), WorldError> {
        *self = Self::from_file(path)?;
        Ok(())
    }
}
