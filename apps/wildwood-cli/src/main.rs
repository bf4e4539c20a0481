use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;
use wildwood_common::{EntityId, MaterialHandle, PrefabHandle, Transform, WorldConfig};
use wildwood_ecs::NoopAttacher;
use wildwood_kernel::World;
use wildwood_terrain::{grow_tree, MeshConsumer, MeshData, TreeSpec};

#[derive(Parser)]
#[command(name = "wildwood-cli", about = "CLI tool for the wildwood world generator")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// World config as JSON; missing fields keep their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate info and the effective config
    Info,
    /// Sample the height field at a point
    Sample {
        #[arg(short, long, default_value = "42")]
        seed: u64,
        #[arg(short, default_value = "0", allow_negative_numbers = true)]
        x: f32,
        #[arg(short, default_value = "0", allow_negative_numbers = true)]
        z: f32,
    },
    /// Grow random trees and report their mesh sizes
    Tree {
        #[arg(short, long, default_value = "42")]
        seed: u64,
        #[arg(short = 'n', long, default_value = "5")]
        count: usize,
    },
    /// Walk the observer along +x and report what the world does
    Walk {
        #[arg(short, long, default_value = "42")]
        seed: u64,
        #[arg(short, long, default_value = "100")]
        ticks: u64,
        /// Seconds per tick
        #[arg(long, default_value = "0.1")]
        dt: f32,
        /// Observer speed in units per second
        #[arg(long, default_value = "10")]
        speed: f32,
    },
}

/// Counts what the world hands over for drawing.
#[derive(Default)]
struct Tally {
    meshes: usize,
    vertices: usize,
    triangles: usize,
    prefabs: usize,
}

impl MeshConsumer for Tally {
    fn consume_mesh(
        &mut self,
        _entity: EntityId,
        mesh: &MeshData,
        _material: MaterialHandle,
        _transform: &Transform,
    ) {
        self.meshes += 1;
        self.vertices += mesh.vertex_count();
        self.triangles += mesh.triangle_count();
    }

    fn place_prefab(
        &mut self,
        _entity: EntityId,
        _prefab: PrefabHandle,
        _material: MaterialHandle,
        _transform: &Transform,
    ) {
        self.prefabs += 1;
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<WorldConfig> {
    let Some(path) = path else {
        return Ok(WorldConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config: WorldConfig = serde_json::from_str(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    tracing::info!(path = %path.display(), "loaded config");
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = load_config(cli.config.as_ref())?;
    config.validate().context("invalid world config")?;

    match cli.command {
        Commands::Info => {
            println!("wildwood-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("ecs: {}", wildwood_ecs::crate_info());
            println!("stream: {}", wildwood_stream::crate_info());
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::Sample { seed, x, z } => {
            let world = World::new(config, seed)?;
            let n = world.normal_at(x, z);
            println!("seed={seed} x={x} z={z}");
            println!("height: {:.4}", world.height_at(x, z));
            println!("normal: ({:.4}, {:.4}, {:.4})", n.x, n.y, n.z);
            let spawn = world.spawn_point(x, z);
            println!("spawn point: ({:.2}, {:.2}, {:.2})", spawn.x, spawn.y, spawn.z);
        }
        Commands::Tree { seed, count } => {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            for i in 0..count {
                let spec = TreeSpec::random(&config.trees, &mut rng);
                let tree = grow_tree(&spec, &config.trees);
                println!(
                    "tree {i}: levels={} leaves={} radius={:.2} level_height={:.2} \
                     vertices={} indices={} capsule(h={:.2}, r={:.2})",
                    spec.levels,
                    spec.leaves,
                    spec.radius,
                    spec.level_height,
                    tree.mesh.vertex_count(),
                    tree.mesh.indices.len(),
                    tree.collider.height,
                    tree.collider.radius,
                );
            }
        }
        Commands::Walk {
            seed,
            ticks,
            dt,
            speed,
        } => {
            let mut world = World::new(config, seed)?;
            let mut tally = Tally::default();
            let mut activated = 0;
            let mut changes = 0;
            let start = world.spawn_point(0.0, 0.0);

            for i in 0..ticks {
                let x = start.x + speed * dt * i as f32;
                let observer = world.spawn_point(x, start.z);
                let report = world.tick(dt, observer, &mut tally, &mut NoopAttacher);
                activated += report.activated.len();
                changes += world.drain_component_events().len();
                if !report.tiles_built.is_empty() {
                    tracing::info!(
                        tick = report.tick,
                        built = report.tiles_built.len(),
                        total = world.tiles().tile_count(),
                        "tiles streamed"
                    );
                }
            }

            let spooked = world.creatures().filter(|c| c.is_spooked()).count();
            println!("ticks: {}  time: {:.1}s", world.tick_count(), world.time());
            println!(
                "tiles: {}  meshes: {}  vertices: {}  triangles: {}  prefabs: {}",
                world.tiles().tile_count(),
                tally.meshes,
                tally.vertices,
                tally.triangles,
                tally.prefabs
            );
            println!(
                "creatures: {} ({spooked} spooked)  activated: {activated}  component changes: {changes}",
                world.creatures().count()
            );
            println!("sun intensity: {:.3}", world.sun().intensity());
            println!("state hash: {:#x}", world.state_hash());
        }
    }

    Ok(())
}
