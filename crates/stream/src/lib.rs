//! Streaming: tile grid, tile composition and exactly-once tile builds.
//!
//! # Invariants
//! - A tile is built at most once per coordinate and registered only after
//!   it is complete.
//! - A tile's contents depend only on the world seed and its coordinate.
//! - Updates with an unmoved observer build nothing.

mod factory;
mod grid;
mod streamer;
mod tile;

pub use factory::{tile_seed, TileFactory};
pub use grid::{TileCoord, TileGrid};
pub use streamer::{StreamStats, TileStreamer};
pub use tile::{Appearance, Rock, RockCluster, TerrainPatch, Tile, TreeInstance};

pub fn crate_info() -> &'static str {
    "wildwood-stream v0.1.0"
}
