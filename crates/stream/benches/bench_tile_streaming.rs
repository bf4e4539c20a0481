use std::hint::black_box;
use std::time::Instant;

use glam::{Vec2, Vec3};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use wildwood_common::WorldConfig;
use wildwood_ecs::ComponentStore;
use wildwood_stream::{TileCoord, TileFactory, TileGrid, TileStreamer};
use wildwood_terrain::HeightField;

fn setup(seed: u64) -> (WorldConfig, TileFactory, HeightField) {
    let config = WorldConfig::default();
    let factory = TileFactory::new(&config, seed);
    let field = HeightField::from_rng(&config.terrain, &mut ChaCha8Rng::seed_from_u64(seed));
    (config, factory, field)
}

fn bench_tiles_around(radius: f32, iterations: usize) {
    let grid = TileGrid::new(50.0);
    let start = Instant::now();
    for i in 0..iterations {
        let observer = Vec2::new(i as f32 * 0.37, -(i as f32) * 0.11);
        let _ = black_box(grid.tiles_around(black_box(observer), black_box(radius)));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!("  tiles_around (r={radius}, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}");
}

fn bench_tile_build(iterations: usize) {
    let (_, factory, field) = setup(7);
    let mut store = ComponentStore::new();
    let start = Instant::now();
    for i in 0..iterations {
        let coord = TileCoord::new(i as i32, 0);
        let _ = black_box(factory.build(black_box(coord), &field, &mut store));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!("  tile build ({iterations} iters): {per_iter:?}/iter, total {elapsed:?}");
}

fn bench_walk(steps: usize, budget: Option<usize>) {
    let (mut config, factory, field) = setup(7);
    config.streaming.build_budget = budget;
    let mut store = ComponentStore::new();
    let mut streamer = TileStreamer::new(config.streaming.clone(), TileGrid::new(50.0));

    let start = Instant::now();
    let mut built = 0;
    for i in 0..steps {
        // Observer walks east at 5 units per step.
        let observer = Vec3::new(i as f32 * 5.0, 0.0, 0.0);
        built += streamer
            .update(black_box(observer), |coord| factory.build(coord, &field, &mut store))
            .len();
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / steps as u32;
    println!(
        "  walk ({steps} steps, budget {budget:?}, {built} tiles): {per_iter:?}/step, total {elapsed:?}"
    );
}

fn main() {
    println!("=== Tile Streaming Benchmarks ===\n");

    println!("Coverage scan:");
    bench_tiles_around(150.0, 10000);
    bench_tiles_around(500.0, 1000);

    println!("\nTile build:");
    bench_tile_build(50);

    println!("\nStreaming walk:");
    bench_walk(200, None);
    bench_walk(200, Some(4));

    println!("\n=== Done ===");
}
