//! Alien Components

use rand::Rng;
use serde::{Deserialize, Serialize};

use invasion_events::{AlienRef, AlienSnapshot};

use crate::{AlienId, CityId};

/// Letters display names are composed from
pub const NAME_ALPHABET: &[u8] = b"zaxorukigmle";

/// Number of random letters before the id suffix
pub const NAME_LETTERS: usize = 5;

/// An invader occupying exactly one city
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alien {
    pub id: AlienId,
    /// Display name; only used for logs and rendering, not unique
    pub name: String,
    /// City currently occupied
    pub city: CityId,
}

impl Alien {
    /// Creates an alien with a random display name.
    pub fn new<R: Rng + ?Sized>(id: AlienId, city: CityId, rng: &mut R) -> Self {
        Self {
            id,
            name: random_name(id, rng),
            city,
        }
    }

    /// Creates an alien with a fixed display name.
    pub fn named(id: AlienId, name: impl Into<String>, city: CityId) -> Self {
        Self {
            id,
            name: name.into(),
            city,
        }
    }

    pub fn to_ref(&self) -> AlienRef {
        AlienRef::new(self.id, &self.name)
    }

    pub fn to_snapshot(&self) -> AlienSnapshot {
        AlienSnapshot::new(self.id, &self.name, self.city)
    }
}

/// Five letters from `NAME_ALPHABET` followed by the id, e.g. `zukam7`.
pub fn random_name<R: Rng + ?Sized>(id: AlienId, rng: &mut R) -> String {
    let mut name: String = (0..NAME_LETTERS)
        .map(|_| NAME_ALPHABET[rng.gen_range(0..NAME_ALPHABET.len())] as char)
        .collect();
    name.push_str(&id.to_string());
    name
}
