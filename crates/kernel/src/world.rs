use std::collections::BTreeMap;

use glam::Vec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use wildwood_common::{ConfigError, EntityId, WorldConfig};
use wildwood_ecs::{
    activate, propagate, CollisionEvent, CollisionQueue, ComponentEvent, ComponentStore,
    PhysicsBodyAttacher,
};
use wildwood_fauna::{Creature, TickContext};
use wildwood_stream::{TileCoord, TileFactory, TileGrid, TileStreamer};
use wildwood_terrain::{HeightField, MeshConsumer};

use crate::daylight::SunCycle;

#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error("invalid world config: {0}")]
    Config(#[from] ConfigError),
}

/// What a single tick changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub tiles_built: Vec<TileCoord>,
    /// Objects turned into physics objects this tick, in activation order.
    pub activated: Vec<EntityId>,
}

/// The generated world and everything that drives it.
///
/// Owns the height field, the tiles and the component store; collaborators
/// get borrows passed down instead of reaching for shared state. Given the
/// same config, seed, observer path and collision events, two worlds evolve
/// identically.
#[derive(Debug)]
pub struct World {
    config: WorldConfig,
    seed: u64,
    /// Drives creature decisions.
    rng: ChaCha8Rng,
    field: HeightField,
    factory: TileFactory,
    streamer: TileStreamer,
    components: ComponentStore,
    collisions: CollisionQueue,
    /// Where each creature lives: its tile and its index in that tile.
    creature_index: BTreeMap<EntityId, (TileCoord, usize)>,
    sun: SunCycle,
    time: f32,
    tick: u64,
}

impl World {
    /// Validate `config` and set up an empty world. No tile is built until
    /// the first tick.
    pub fn new(config: WorldConfig, seed: u64) -> Result<Self, WorldError> {
        config.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let field = HeightField::from_rng(&config.terrain, &mut rng);
        let factory = TileFactory::new(&config, seed);
        let streamer = TileStreamer::new(
            config.streaming.clone(),
            TileGrid::new(config.terrain.tile_size),
        );
        let sun = SunCycle::new(&config.sun);
        tracing::info!(seed, "world created");

        Ok(Self {
            config,
            seed,
            rng,
            field,
            factory,
            streamer,
            components: ComponentStore::new(),
            collisions: CollisionQueue::new(),
            creature_index: BTreeMap::new(),
            sun,
            time: 0.0,
            tick: 0,
        })
    }

    /// Advance the world by `dt` seconds with the observer at `observer`.
    ///
    /// Builds missing tiles and hands their meshes to `meshes`, updates every
    /// creature, then applies the collisions queued since the last tick.
    pub fn tick(
        &mut self,
        dt: f32,
        observer: Vec3,
        meshes: &mut dyn MeshConsumer,
        physics: &mut dyn PhysicsBodyAttacher,
    ) -> TickReport {
        let _span = tracing::info_span!("world_tick", tick = self.tick + 1).entered();
        self.tick += 1;
        self.time += dt;
        self.sun.advance(dt);

        let tiles_built = self.stream(observer, meshes);

        let ctx = TickContext {
            now: self.time,
            dt,
            observer,
            field: &self.field,
            config: &self.config.creatures,
        };
        for tile in self.streamer.tiles_mut() {
            for creature in &mut tile.creatures {
                creature.update(&ctx, &mut self.rng);
            }
        }

        let mut activated = Vec::new();
        for event in self.collisions.drain() {
            let hit = match self.knockdown(event, physics) {
                Some(entity) => Some(entity),
                None => propagate(&mut self.components, event, physics),
            };
            activated.extend(hit);
        }

        if !activated.is_empty() {
            tracing::debug!(count = activated.len(), "objects activated");
        }

        TickReport {
            tick: self.tick,
            tiles_built,
            activated,
        }
    }

    fn stream(&mut self, observer: Vec3, meshes: &mut dyn MeshConsumer) -> Vec<TileCoord> {
        let factory = &self.factory;
        let field = &self.field;
        let components = &mut self.components;
        let built = self
            .streamer
            .update(observer, |coord| factory.build(coord, field, components));

        for coord in &built {
            let Some(tile) = self.streamer.tile(*coord) else {
                continue;
            };
            tile.submit(meshes);
            for (i, creature) in tile.creatures.iter().enumerate() {
                self.creature_index.insert(creature.entity, (*coord, i));
            }
        }
        built
    }

    /// A spooked creature bumping into a knockdown-tagged object activates it.
    fn knockdown(
        &mut self,
        event: CollisionEvent,
        physics: &mut dyn PhysicsBodyAttacher,
    ) -> Option<EntityId> {
        let knockdown = &self.config.creatures.knockdown_tags;
        for (source, target) in event.pairs() {
            let Some(&(coord, index)) = self.creature_index.get(&source) else {
                continue;
            };
            let Some(creature) = self
                .streamer
                .tile(coord)
                .and_then(|tile| tile.creatures.get(index))
            else {
                continue;
            };
            let Some(tag) = self.components.tag(target) else {
                continue;
            };
            if creature.knocks_down(tag, knockdown)
                && activate(&mut self.components, target, knockdown, physics)
            {
                tracing::debug!(creature = %source, target = %target, "creature knocked object down");
                return Some(target);
            }
        }
        None
    }

    /// Queue a collision reported by the physics host. Applied on the next tick.
    pub fn push_collision(&mut self, a: EntityId, b: EntityId) {
        self.collisions.push(CollisionEvent::new(a, b));
    }

    /// Where an observer standing at `(x, z)` should be placed.
    pub fn spawn_point(&self, x: f32, z: f32) -> Vec3 {
        Vec3::new(x, self.field.height(x, z) + self.config.observer_clearance, z)
    }

    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        self.field.height(x, z)
    }

    pub fn normal_at(&self, x: f32, z: f32) -> Vec3 {
        self.field.normal(x, z)
    }

    pub fn creature(&self, entity: EntityId) -> Option<&Creature> {
        let &(coord, index) = self.creature_index.get(&entity)?;
        self.streamer.tile(coord)?.creatures.get(index)
    }

    /// Every creature, tile by tile in coordinate order.
    pub fn creatures(&self) -> impl Iterator<Item = &Creature> {
        self.streamer.tiles().flat_map(|tile| tile.creatures.iter())
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Seconds simulated so far.
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn height_field(&self) -> &HeightField {
        &self.field
    }

    pub fn tiles(&self) -> &TileStreamer {
        &self.streamer
    }

    pub fn components(&self) -> &ComponentStore {
        &self.components
    }

    /// Take the capability changes made since the last drain, oldest first.
    /// Hosts mirror spawned colliders and bodies from these.
    pub fn drain_component_events(&mut self) -> Vec<ComponentEvent> {
        self.components.drain_events()
    }

    pub fn sun(&self) -> &SunCycle {
        &self.sun
    }

    /// FNV hash of the evolving state, for comparing two runs.
    /// Tiles and creatures are visited in coordinate order.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325;
        let mix = |h: &mut u64, bytes: &[u8]| {
            for &b in bytes {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        mix(&mut h, &self.tick.to_le_bytes());
        mix(&mut h, &self.time.to_le_bytes());
        mix(&mut h, &(self.components.entity_count() as u64).to_le_bytes());
        mix(&mut h, &(self.components.reactive_count() as u64).to_le_bytes());
        for tile in self.streamer.tiles() {
            mix(&mut h, &tile.coord.x.to_le_bytes());
            mix(&mut h, &tile.coord.z.to_le_bytes());
            for creature in &tile.creatures {
                mix(&mut h, &creature.entity.0.to_le_bytes());
                for v in creature.transform.position.to_array() {
                    mix(&mut h, &v.to_le_bytes());
                }
            }
        }
        h
    }
}
