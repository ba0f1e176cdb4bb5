//! Core table types: ids, geometry, RNG, configuration, errors and the world.
//!
//! Everything here is independent of networking and input. Higher layers
//! (containers, animation, manipulation, sync) build on these.

pub mod config;
pub mod error;
pub mod geometry;
pub mod id;
pub mod rng;
pub mod world;

pub use config::TableConfig;
pub use error::{Result, TableError};
pub use geometry::{snap_to_grid, within_board, Point, Rect, Rotation, BOARD_LIMIT, FULL_TURN, ROTATION_STEP};
pub use id::ObjectId;
pub use rng::TableRng;
pub use world::World;
