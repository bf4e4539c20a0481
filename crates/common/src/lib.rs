//! Shared types and configuration for the wildwood world generator.

pub mod config;
pub mod types;

pub use config::{
    ConfigError, CreatureConfig, PopulationConfig, Span, StreamingConfig, SunConfig,
    TerrainConfig, TreeConfig, WorldConfig,
};
pub use types::{tag_set, EntityId, MaterialHandle, PrefabHandle, Tag, TagSet, Transform};
