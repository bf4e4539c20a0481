//! Creatures: a per-creature state machine driven by the observer position
//! and kept on the ground by the height field.
//!
//! # Invariants
//! - A creature only ever mutates itself.
//! - Its up axis follows the ground normal after every update.

mod creature;

pub use creature::{random_horizontal_direction, Creature, CreatureState, TickContext};
