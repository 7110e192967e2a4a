//! World Setup
//!
//! Map parsing and initial alien placement.

pub mod aliens;
pub mod parser;

pub use aliens::land_aliens;
pub use parser::{parse_line, parse_map, MAX_LINE_LEN};
