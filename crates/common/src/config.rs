//! World configuration.
//!
//! Every tunable of the generator lives here. A config is validated once
//! when a world is created; per-tile builds assume a valid config.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::types::{tag_set, MaterialHandle, PrefabHandle, Tag, TagSet};

/// Errors from configuration validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be finite")]
    NonFinite { field: &'static str },
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },
    #[error("{field} range is inverted: min {min} > max {max}")]
    InvertedRange {
        field: &'static str,
        min: f64,
        max: f64,
    },
    #[error("vertex spacing {spacing} exceeds tile size {tile_size}")]
    SpacingExceedsTile { spacing: f32, tile_size: f32 },
    #[error("trees need at least 3 leaf sides, got {0}")]
    TooFewLeafSides(u32),
    #[error("trees need at least one canopy level")]
    NoTreeLevels,
    #[error("{field} must lie in [0, 1], got {value}")]
    OutOfUnitRange { field: &'static str, value: f32 },
    #[error("knockdown tag set is empty")]
    EmptyKnockdownTags,
    #[error("build budget must allow at least one tile per tick")]
    ZeroBuildBudget,
    #[error("twilight stop angle {stop} must be greater than start angle {start}")]
    TwilightOrder { start: f32, stop: f32 },
}

/// Inclusive `[min, max]` range a random value is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span<T> {
    pub min: T,
    pub max: T,
}

impl<T> Span<T> {
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

impl<T: Copy + Into<f64>> Span<T> {
    fn check(&self, field: &'static str) -> Result<(), ConfigError> {
        let (min, max) = (self.min.into(), self.max.into());
        if !min.is_finite() || !max.is_finite() {
            return Err(ConfigError::NonFinite { field });
        }
        if min > max {
            return Err(ConfigError::InvertedRange { field, min, max });
        }
        Ok(())
    }
}

/// Complete configuration of a generated world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub terrain: TerrainConfig,
    pub trees: TreeConfig,
    pub population: PopulationConfig,
    pub streaming: StreamingConfig,
    pub creatures: CreatureConfig,
    pub sun: SunConfig,
    /// Height above the ground the observer spawns at.
    pub observer_clearance: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            terrain: TerrainConfig::default(),
            trees: TreeConfig::default(),
            population: PopulationConfig::default(),
            streaming: StreamingConfig::default(),
            creatures: CreatureConfig::default(),
            sun: SunConfig::default(),
            observer_clearance: 2.0,
        }
    }
}

impl WorldConfig {
    /// Check every precondition the generator relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.terrain.validate()?;
        self.trees.validate()?;
        self.population.validate()?;
        self.streaming.validate()?;
        self.creatures.validate()?;
        self.sun.validate()?;
        non_negative("observer_clearance", self.observer_clearance)
    }
}

/// Height field and terrain patch parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Edge length of a square tile in world units.
    pub tile_size: f32,
    /// Distance between neighbouring terrain vertices.
    pub vertex_spacing: f32,
    /// Range the per-axis frequencies of the bump band are drawn from.
    pub bump_frequency: Span<f32>,
    /// Range the per-axis noise offsets are drawn from.
    pub noise_offset: Span<f32>,
    pub bump_amplitude: f32,
    pub hills_frequency: f32,
    pub hills_amplitude: f32,
    /// Finite difference step used for normals.
    pub normal_epsilon: f32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            tile_size: 50.0,
            vertex_spacing: 2.0,
            bump_frequency: Span::new(0.05, 0.15),
            noise_offset: Span::new(0.0, 100.0),
            bump_amplitude: 2.0,
            hills_frequency: 0.01,
            hills_amplitude: 15.0,
            normal_epsilon: 0.1,
        }
    }
}

impl TerrainConfig {
    /// Grid cells per tile edge.
    pub fn rows(&self) -> usize {
        (self.tile_size / self.vertex_spacing) as usize
    }

    fn validate(&self) -> Result<(), ConfigError> {
        positive("tile_size", self.tile_size)?;
        positive("vertex_spacing", self.vertex_spacing)?;
        if self.vertex_spacing > self.tile_size {
            return Err(ConfigError::SpacingExceedsTile {
                spacing: self.vertex_spacing,
                tile_size: self.tile_size,
            });
        }
        self.bump_frequency.check("bump_frequency")?;
        self.noise_offset.check("noise_offset")?;
        finite("hills_frequency", self.hills_frequency)?;
        non_negative("bump_amplitude", self.bump_amplitude)?;
        non_negative("hills_amplitude", self.hills_amplitude)?;
        positive("normal_epsilon", self.normal_epsilon)
    }
}

/// Randomized tree shape parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Canopy levels stacked above the trunk.
    pub levels: Span<u32>,
    /// Sides of each ring.
    pub leaf_sides: Span<u32>,
    pub radius: Span<f32>,
    pub level_height: Span<f32>,
    pub trunk_radius_mult: f32,
    pub leaf_dimple_mult: f32,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            levels: Span::new(2, 3),
            leaf_sides: Span::new(3, 11),
            radius: Span::new(0.8, 3.0),
            level_height: Span::new(1.5, 2.5),
            trunk_radius_mult: 0.3,
            leaf_dimple_mult: 0.7,
        }
    }
}

impl TreeConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.levels.check("tree.levels")?;
        self.leaf_sides.check("tree.leaf_sides")?;
        self.radius.check("tree.radius")?;
        self.level_height.check("tree.level_height")?;
        if self.levels.min == 0 {
            return Err(ConfigError::NoTreeLevels);
        }
        if self.leaf_sides.min < 3 {
            return Err(ConfigError::TooFewLeafSides(self.leaf_sides.min));
        }
        positive("tree.radius.min", self.radius.min)?;
        positive("tree.level_height.min", self.level_height.min)?;
        positive("tree.trunk_radius_mult", self.trunk_radius_mult)?;
        positive("tree.leaf_dimple_mult", self.leaf_dimple_mult)
    }
}

/// How many objects a tile receives and how they are placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    pub trees: Span<u32>,
    pub rock_clusters: Span<u32>,
    pub rocks_per_cluster: Span<u32>,
    pub rock_scale: Span<f32>,
    /// Maximum jitter of a rock from its cluster centre, per axis.
    pub rock_cluster_max_radius: f32,
    pub creatures: Span<u32>,
    pub tree_clearance: f32,
    pub rock_clearance: f32,
    pub creature_clearance: f32,
    pub ground_material: MaterialHandle,
    pub tree_material: MaterialHandle,
    pub rock_material: MaterialHandle,
    pub creature_material: MaterialHandle,
    pub rock_prefab: PrefabHandle,
    pub creature_prefab: PrefabHandle,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            trees: Span::new(8, 19),
            rock_clusters: Span::new(5, 14),
            rocks_per_cluster: Span::new(1, 2),
            rock_scale: Span::new(1.0, 3.0),
            rock_cluster_max_radius: 3.0,
            creatures: Span::new(0, 1),
            tree_clearance: 0.0,
            rock_clearance: 0.5,
            creature_clearance: 2.0,
            ground_material: MaterialHandle(0),
            tree_material: MaterialHandle(1),
            rock_material: MaterialHandle(2),
            creature_material: MaterialHandle(3),
            rock_prefab: PrefabHandle(0),
            creature_prefab: PrefabHandle(1),
        }
    }
}

impl PopulationConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.trees.check("population.trees")?;
        self.rock_clusters.check("population.rock_clusters")?;
        self.rocks_per_cluster.check("population.rocks_per_cluster")?;
        self.rock_scale.check("population.rock_scale")?;
        self.creatures.check("population.creatures")?;
        positive("population.rock_scale.min", self.rock_scale.min)?;
        non_negative(
            "population.rock_cluster_max_radius",
            self.rock_cluster_max_radius,
        )?;
        non_negative("population.tree_clearance", self.tree_clearance)?;
        non_negative("population.rock_clearance", self.rock_clearance)?;
        non_negative("population.creature_clearance", self.creature_clearance)
    }
}

/// Tile streaming around the observer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Half-extent of the square of tiles kept around the observer.
    pub adjacency_radius: f32,
    /// Maximum tiles built per tick. `None` builds every missing tile.
    pub build_budget: Option<usize>,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            adjacency_radius: 150.0,
            build_budget: None,
        }
    }
}

impl StreamingConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        positive("streaming.adjacency_radius", self.adjacency_radius)?;
        if self.build_budget == Some(0) {
            return Err(ConfigError::ZeroBuildBudget);
        }
        Ok(())
    }
}

/// Creature movement and spook behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreatureConfig {
    pub speed: f32,
    pub notice_distance: f32,
    pub spook_distance: f32,
    /// Seconds a spook lasts.
    pub spook_length: f32,
    pub spook_speed: f32,
    /// Seconds between random direction changes while wandering.
    pub wander_interval: Span<f32>,
    /// Tags of objects a spooked creature knocks over.
    pub knockdown_tags: TagSet,
    /// Fraction of velocity kept after one second of ground friction.
    pub velocity_retention: f32,
}

impl Default for CreatureConfig {
    fn default() -> Self {
        Self {
            speed: 10.0,
            notice_distance: 15.0,
            spook_distance: 7.0,
            spook_length: 8.0,
            spook_speed: 12.0,
            wander_interval: Span::new(1.0, 4.0),
            knockdown_tags: tag_set([Tag::TREE, Tag::ROCK]),
            velocity_retention: 0.05,
        }
    }
}

impl CreatureConfig {
    pub fn notice_distance_squared(&self) -> f32 {
        self.notice_distance * self.notice_distance
    }

    pub fn spook_distance_squared(&self) -> f32 {
        self.spook_distance * self.spook_distance
    }

    fn validate(&self) -> Result<(), ConfigError> {
        non_negative("creatures.speed", self.speed)?;
        non_negative("creatures.notice_distance", self.notice_distance)?;
        non_negative("creatures.spook_distance", self.spook_distance)?;
        non_negative("creatures.spook_length", self.spook_length)?;
        non_negative("creatures.spook_speed", self.spook_speed)?;
        self.wander_interval.check("creatures.wander_interval")?;
        non_negative("creatures.wander_interval.min", self.wander_interval.min)?;
        if self.knockdown_tags.is_empty() {
            return Err(ConfigError::EmptyKnockdownTags);
        }
        if !(0.0..=1.0).contains(&self.velocity_retention) {
            return Err(ConfigError::OutOfUnitRange {
                field: "creatures.velocity_retention",
                value: self.velocity_retention,
            });
        }
        Ok(())
    }
}

/// Day/night cycle of the directional sun light.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SunConfig {
    pub axis: Vec3,
    pub degrees_per_second: f32,
    /// Angle from midday where the light starts fading.
    pub twilight_start: f32,
    /// Angle from midday where the light is fully off.
    pub twilight_stop: f32,
}

impl Default for SunConfig {
    fn default() -> Self {
        Self {
            axis: Vec3::X,
            degrees_per_second: 30.0,
            twilight_start: 85.0,
            twilight_stop: 100.0,
        }
    }
}

impl SunConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        positive("sun.axis", self.axis.length())?;
        finite("sun.degrees_per_second", self.degrees_per_second)?;
        finite("sun.twilight_start", self.twilight_start)?;
        finite("sun.twilight_stop", self.twilight_stop)?;
        if self.twilight_stop <= self.twilight_start {
            return Err(ConfigError::TwilightOrder {
                start: self.twilight_start,
                stop: self.twilight_stop,
            });
        }
        Ok(())
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NonFinite { field });
    }
    Ok(())
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value <= 0.0 {
        return Err(ConfigError::NonPositive {
            field,
            value: value as f64,
        });
    }
    Ok(())
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value < 0.0 {
        return Err(ConfigError::Negative {
            field,
            value: value as f64,
        });
    }
    Ok(())
}
