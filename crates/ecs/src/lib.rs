//! Deterministic capability table for world objects.
//!
//! Instead of attaching behaviour objects at runtime, every object carries a
//! fixed set of capabilities (tag, collider, physics body, reactive flag)
//! stored in per-capability maps keyed by `EntityId`.
//!
//! # Invariants
//! - Ids are allocated sequentially and never reused.
//! - Iteration order is deterministic (BTreeMap).
//! - Every capability change produces an event.

pub mod chain;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use wildwood_common::{EntityId, Tag, TagSet};

pub use chain::{
    activate, propagate, propagate_all, CollisionEvent, CollisionQueue, NoopAttacher,
    PhysicsBodyAttacher,
};

/// Physics body parameters handed to the host physics engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RigidBody {
    pub mass: f32,
    pub is_kinematic: bool,
}

impl Default for RigidBody {
    fn default() -> Self {
        Self {
            mass: 1.0,
            is_kinematic: false,
        }
    }
}

/// Collision shape of an object, in its local space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Collider {
    Box { half_extents: [f32; 3] },
    /// Upright capsule along the local y axis.
    Capsule {
        center: [f32; 3],
        height: f32,
        radius: f32,
    },
    /// Collides against the object's own render mesh.
    Mesh,
}

impl Default for Collider {
    fn default() -> Self {
        Self::Box {
            half_extents: [0.5, 0.5, 0.5],
        }
    }
}

/// Events produced by capability changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ComponentEvent {
    Spawned { entity: EntityId, tag: Tag },
    ColliderAdded { entity: EntityId, collider: Collider },
    RigidBodyAdded { entity: EntityId, body: RigidBody },
    BecameReactive { entity: EntityId },
}

/// Capability storage for every object in the world.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentStore {
    next_id: u64,
    tags: BTreeMap<EntityId, Tag>,
    colliders: BTreeMap<EntityId, Collider>,
    rigid_bodies: BTreeMap<EntityId, RigidBody>,
    /// Reactive objects and the tag set they pass on to what they hit.
    reactive: BTreeMap<EntityId, TagSet>,
    #[serde(skip)]
    events: Vec<ComponentEvent>,
}

impl ComponentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new object with the given tag.
    pub fn spawn(&mut self, tag: Tag) -> EntityId {
        let entity = EntityId(self.next_id);
        self.next_id += 1;
        self.events.push(ComponentEvent::Spawned {
            entity,
            tag: tag.clone(),
        });
        self.tags.insert(entity, tag);
        entity
    }

    /// Number of objects spawned so far.
    pub fn entity_count(&self) -> usize {
        self.tags.len()
    }

    /// Drain and return all pending component events.
    pub fn drain_events(&mut self) -> Vec<ComponentEvent> {
        std::mem::take(&mut self.events)
    }

    /// Read-only access to pending events.
    pub fn events(&self) -> &[ComponentEvent] {
        &self.events
    }

    // --- Tag ---
    pub fn tag(&self, entity: EntityId) -> Option<&Tag> {
        self.tags.get(&entity)
    }

    /// Objects carrying `tag`, in id order.
    pub fn with_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = EntityId> + 'a {
        self.tags
            .iter()
            .filter(move |(_, t)| t.as_str() == tag)
            .map(|(id, _)| *id)
    }

    // --- Collider ---
    pub fn set_collider(&mut self, entity: EntityId, collider: Collider) {
        self.events
            .push(ComponentEvent::ColliderAdded { entity, collider });
        self.colliders.insert(entity, collider);
    }

    pub fn collider(&self, entity: EntityId) -> Option<&Collider> {
        self.colliders.get(&entity)
    }

    // --- RigidBody ---
    pub fn set_rigid_body(&mut self, entity: EntityId, body: RigidBody) {
        self.events
            .push(ComponentEvent::RigidBodyAdded { entity, body });
        self.rigid_bodies.insert(entity, body);
    }

    pub fn rigid_body(&self, entity: EntityId) -> Option<&RigidBody> {
        self.rigid_bodies.get(&entity)
    }

    pub fn has_rigid_body(&self, entity: EntityId) -> bool {
        self.rigid_bodies.contains_key(&entity)
    }

    /// Give `entity` a default body unless it already has one.
    /// Returns whether a body was added.
    pub fn ensure_rigid_body(&mut self, entity: EntityId) -> bool {
        if self.has_rigid_body(entity) {
            return false;
        }
        self.set_rigid_body(entity, RigidBody::default());
        true
    }

    // --- Reactive ---
    pub fn is_reactive(&self, entity: EntityId) -> bool {
        self.reactive.contains_key(&entity)
    }

    /// Tag set a reactive object propagates with.
    pub fn reactive_tags(&self, entity: EntityId) -> Option<&TagSet> {
        self.reactive.get(&entity)
    }

    pub fn reactive_count(&self) -> usize {
        self.reactive.len()
    }

    pub(crate) fn mark_reactive(&mut self, entity: EntityId, tags: TagSet) {
        self.events.push(ComponentEvent::BecameReactive { entity });
        self.reactive.insert(entity, tags);
    }
}

pub fn crate_info() -> &'static str {
    "wildwood-ecs v0.1.0"
}
