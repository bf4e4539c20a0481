use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use glam::{Vec2, Vec3};
use wildwood_common::StreamingConfig;

use crate::grid::{TileCoord, TileGrid};
use crate::tile::Tile;

/// Per-update streaming statistics for instrumentation.
#[derive(Debug, Clone, Default)]
pub struct StreamStats {
    pub tiles_built_this_tick: usize,
    /// Tiles still missing after this update because of the build budget.
    pub tiles_deferred: usize,
    pub total_tiles: usize,
    pub build_time: Duration,
}

/// Keeps every tile within the adjacency radius of the observer built.
///
/// A tile is registered only after it is fully built and is never built a
/// second time. Tiles are not unloaded.
///
/// Builds run sequentially on the caller's thread. A host that moves builds
/// onto workers must claim the coordinate before handing it out so two
/// updates cannot build the same tile.
#[derive(Debug)]
pub struct TileStreamer {
    config: StreamingConfig,
    grid: TileGrid,
    tiles: BTreeMap<TileCoord, Tile>,
    stats: StreamStats,
}

impl TileStreamer {
    pub fn new(config: StreamingConfig, grid: TileGrid) -> Self {
        Self {
            config,
            grid,
            tiles: BTreeMap::new(),
            stats: StreamStats::default(),
        }
    }

    /// Build the tiles around `observer` that do not exist yet.
    ///
    /// Tiles are built in scan order, or nearest first when a build budget is
    /// set. Returns the coordinates built by this call.
    pub fn update<F>(&mut self, observer: Vec3, mut build: F) -> Vec<TileCoord>
    where
        F: FnMut(TileCoord) -> Tile,
    {
        let _span = tracing::info_span!("stream_update").entered();
        let start = Instant::now();

        let mut missing = self.pending(observer);
        let mut deferred = 0;
        if let Some(budget) = self.config.build_budget {
            let here = self.grid.position_to_tile(observer.x, observer.z);
            missing.sort_by_key(|c| c.distance_squared(here));
            deferred = missing.len().saturating_sub(budget);
            missing.truncate(budget);
        }

        for coord in &missing {
            tracing::debug!(x = coord.x, z = coord.z, "building tile");
            let tile = build(*coord);
            self.tiles.insert(*coord, tile);
        }

        self.stats = StreamStats {
            tiles_built_this_tick: missing.len(),
            tiles_deferred: deferred,
            total_tiles: self.tiles.len(),
            build_time: start.elapsed(),
        };

        tracing::trace!(
            built = missing.len(),
            deferred,
            total = self.tiles.len(),
            "stream update complete"
        );

        missing
    }

    /// Tiles around `observer` that are not built yet, in scan order.
    pub fn pending(&self, observer: Vec3) -> Vec<TileCoord> {
        self.grid
            .tiles_around(Vec2::new(observer.x, observer.z), self.config.adjacency_radius)
            .into_iter()
            .filter(|c| !self.tiles.contains_key(c))
            .collect()
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    pub fn tiles_mut(&mut self) -> impl Iterator<Item = &mut Tile> {
        self.tiles.values_mut()
    }

    pub fn tile(&self, coord: TileCoord) -> Option<&Tile> {
        self.tiles.get(&coord)
    }

    pub fn tile_mut(&mut self, coord: TileCoord) -> Option<&mut Tile> {
        self.tiles.get_mut(&coord)
    }

    pub fn is_built(&self, coord: TileCoord) -> bool {
        self.tiles.contains_key(&coord)
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Statistics from the last update.
    pub fn stats(&self) -> &StreamStats {
        &self.stats
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn config(&self) -> &StreamingConfig {
        &self.config
    }
}
