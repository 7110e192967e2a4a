//! World components: cities and aliens.

pub mod alien;
pub mod city;

pub use alien::{random_name, Alien, NAME_ALPHABET, NAME_LETTERS};
pub use city::{City, CityRecord, Direction, Links};
