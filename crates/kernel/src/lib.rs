//! World kernel: owns the generated world and advances it tick by tick.
//!
//! # Invariants
//! - Config is validated once, in `World::new`; nothing after that fails.
//! - All state mutations flow through `World::tick` and `World::push_collision`.

pub mod daylight;
pub mod world;

pub use daylight::SunCycle;
pub use world::{TickReport, World, WorldError};
