use std::collections::HashSet;

use glam::Vec2;

/// Integer key of a tile: its origin divided by the tile size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    pub x: i32,
    pub z: i32,
}

impl TileCoord {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Squared distance to `other`, in tiles.
    pub fn distance_squared(&self, other: TileCoord) -> i64 {
        let dx = self.x as i64 - other.x as i64;
        let dz = self.z as i64 - other.z as i64;
        dx * dx + dz * dz
    }
}

/// Fixed-size square tiling of the XZ plane.
///
/// A world position belongs to the tile whose origin is the position
/// floored to a multiple of the tile size.
#[derive(Debug, Clone, Copy)]
pub struct TileGrid {
    tile_size: f32,
}

impl TileGrid {
    /// Create a grid with the given tile size. The size must be positive;
    /// world configs are validated before a grid is made from them.
    pub fn new(tile_size: f32) -> Self {
        debug_assert!(tile_size > 0.0, "tile_size must be positive");
        Self { tile_size }
    }

    /// Tile size used for this grid.
    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Tile containing world `(x, z)`.
    pub fn position_to_tile(&self, x: f32, z: f32) -> TileCoord {
        let size = self.tile_size as f64;
        TileCoord {
            x: (x as f64 / size).floor() as i32,
            z: (z as f64 / size).floor() as i32,
        }
    }

    /// World `(x, z)` of a tile's origin corner.
    pub fn origin(&self, coord: TileCoord) -> Vec2 {
        Vec2::new(
            coord.x as f32 * self.tile_size,
            coord.z as f32 * self.tile_size,
        )
    }

    /// Tiles that should exist around `observer`.
    ///
    /// Offsets run from `-radius` in tile-size steps while below `radius`
    /// on both axes; each offset position is floored to its tile. The result
    /// keeps that scan order (x outer, z inner) and holds no duplicates.
    pub fn tiles_around(&self, observer: Vec2, radius: f32) -> Vec<TileCoord> {
        let steps = (2.0 * radius as f64 / self.tile_size as f64).ceil() as i32;
        let offsets: Vec<f32> = (0..steps)
            .map(|i| -radius + i as f32 * self.tile_size)
            .filter(|o| *o < radius)
            .collect();

        let mut seen = HashSet::new();
        let mut result = Vec::with_capacity(offsets.len() * offsets.len());
        for &dx in &offsets {
            for &dz in &offsets {
                let coord = self.position_to_tile(observer.x + dx, observer.y + dz);
                if seen.insert(coord) {
                    result.push(coord);
                }
            }
        }
        result
    }
}
