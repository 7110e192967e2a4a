//! Rendering and serving of the live invasion map.
//!
//! Both adapters work on detached `WorldSnapshot`s and never touch the
//! world store directly.

pub mod render;
pub mod service;

pub use render::{escape_xml, RenderError, Renderer, SvgRenderer};
pub use service::{bind_address, MapService, Response, ServeError, SnapshotSource};
