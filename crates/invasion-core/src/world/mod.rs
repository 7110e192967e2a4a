//! World State Store
//!
//! The authoritative cities and aliens. `WorldStore` is the capability the
//! engine and the map service program against; `InMemoryWorld` is the
//! implementation used by the binary.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use invasion_events::WorldSnapshot;

use crate::components::{Alien, City, CityRecord};
use crate::error::WorldError;
use crate::{AlienId, CityId};

pub mod coords;
pub mod memory;

pub use coords::{Layout, WallFollower};
pub use memory::InMemoryWorld;

/// What `remove_city` destroyed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedCity {
    pub city: City,
    /// Aliens that were in the city, ascending id
    pub aliens: Vec<Alien>,
    /// Neighbours whose opposite link was cleared
    pub severed: Vec<String>,
}

/// Operations on the world graph and its occupants.
pub trait WorldStore: Send + Sync + 'static {
    fn num_cities(&self) -> usize;

    /// Map width in cells, computed once at load time
    fn width(&self) -> i64;

    /// Map height in cells, computed once at load time
    fn height(&self) -> i64;

    /// All cities, ascending id
    fn cities(&self) -> Vec<&City>;

    fn city(&self, id: CityId) -> Result<&City, WorldError>;

    fn city_by_name(&self, name: &str) -> Result<&City, WorldError>;

    /// Ids of directly linked cities in north, east, south, west order
    fn exits(&self, id: CityId) -> Result<Vec<CityId>, WorldError>;

    /// All living aliens, ascending id
    fn aliens(&self) -> Vec<&Alien>;

    fn alien(&self, id: AlienId) -> Result<&Alien, WorldError>;

    /// Aliens currently in a city, ascending id; empty when none
    fn aliens_in_city(&self, id: CityId) -> Vec<&Alien>;

    /// Occupied cities and the aliens in each
    fn aliens_by_city(&self) -> BTreeMap<CityId, Vec<AlienId>>;

    /// Registers a city under the next sequential id
    fn add_city(&mut self, record: CityRecord) -> Result<CityId, WorldError>;

    fn add_alien(&mut self, alien: Alien) -> Result<(), WorldError>;

    /// Moves an alien without checking that `to` is linked to its city
    fn move_alien(&mut self, alien_id: AlienId, to: CityId) -> Result<(), WorldError>;

    /// Destroys a city, the aliens in it and every link pointing at it
    fn remove_city(&mut self, id: CityId) -> Result<RemovedCity, WorldError>;

    /// Replaces the whole world with the map at `path`. On error the
    /// current contents are left untouched.
    fn load(&mut self, path: &Path) -> Result<(), WorldError>;

    /// Writes every city in map-file format, ascending id.
    fn write_map(&self, writer: &mut dyn Write) -> io::Result<()> {
        for city in self.cities() {
            writeln!(writer, "{}", city.to_line())?;
        }
        Ok(())
    }

    /// Writes the map to `path`, replacing any existing file.
    fn save(&self, path: &Path) -> Result<(), WorldError> {
        let persistence = |source: io::Error| WorldError::Persistence {
            path: path.to_path_buf(),
            source,
        };
        let file = File::create(path).map_err(persistence)?;
        let mut writer = BufWriter::new(file);
        self.write_map(&mut writer).map_err(persistence)?;
        writer.flush().map_err(persistence)?;
        writer
            .into_inner()
            .map_err(|e| persistence(e.into_error()))?
            .sync_all()
            .map_err(persistence)
    }

    /// Detached copy of the current state for rendering.
    fn snapshot(&self, tick: u64) -> WorldSnapshot {
        let mut snapshot = WorldSnapshot::new(tick, self.width(), self.height());
        snapshot.cities = self.cities().into_iter().map(City::to_snapshot).collect();
        snapshot.aliens = self.aliens().into_iter().map(Alien::to_snapshot).collect();
        snapshot
    }
}

/// A store shared between the tick loop and the map service.
pub struct SharedWorld<W> {
    inner: Arc<RwLock<W>>,
}

impl<W> Clone for SharedWorld<W> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<W: WorldStore> SharedWorld<W> {
    pub fn new(world: W) -> Self {
        Self {
            inner: Arc::new(RwLock::new(world)),
        }
    }

    /// Shared access. Poisoning is ignored: store operations never leave the
    /// indices half-updated.
    pub fn read(&self) -> RwLockReadGuard<'_, W> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, W> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self, tick: u64) -> WorldSnapshot {
        self.read().snapshot(tick)
    }
}
