//! Chain reactions: static scenery turning into physics objects.
//!
//! An activated object gets a physics body and becomes reactive. Whenever a
//! reactive object collides with an unreactive one whose tag is in the
//! reactive object's tag set, that one is activated too and inherits the
//! set. An object is never activated twice, so propagation terminates on any
//! collision graph, cyclic ones included.
//!
//! Collisions are not delivered by callbacks: the physics host pushes them
//! onto a `CollisionQueue` which the world drains once per tick, in arrival
//! order.

use std::collections::VecDeque;

use wildwood_common::{EntityId, TagSet};

use crate::ComponentStore;

/// Hook into the host physics engine.
pub trait PhysicsBodyAttacher {
    /// Make sure `entity` is simulated by the physics engine.
    /// Must be a no-op when it already is.
    fn ensure_body(&mut self, entity: EntityId);
}

/// Attacher for hosts that read bodies from the component store instead.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAttacher;

impl PhysicsBodyAttacher for NoopAttacher {
    fn ensure_body(&mut self, _entity: EntityId) {}
}

/// Two objects touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionEvent {
    pub a: EntityId,
    pub b: EntityId,
}

impl CollisionEvent {
    pub fn new(a: EntityId, b: EntityId) -> Self {
        Self { a, b }
    }

    /// Both orderings of the pair.
    pub fn pairs(&self) -> [(EntityId, EntityId); 2] {
        [(self.a, self.b), (self.b, self.a)]
    }
}

/// FIFO of collisions reported since the last drain.
#[derive(Debug, Default, Clone)]
pub struct CollisionQueue {
    events: VecDeque<CollisionEvent>,
}

impl CollisionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: CollisionEvent) {
        self.events.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Take every queued event, oldest first.
    pub fn drain(&mut self) -> Vec<CollisionEvent> {
        self.events.drain(..).collect()
    }
}

/// Activate `entity` if its tag is in `tags` and it is not reactive yet.
///
/// Returns whether it was activated.
pub fn activate(
    store: &mut ComponentStore,
    entity: EntityId,
    tags: &TagSet,
    physics: &mut dyn PhysicsBodyAttacher,
) -> bool {
    if store.is_reactive(entity) {
        return false;
    }
    match store.tag(entity) {
        Some(tag) if tags.contains(tag) => {}
        _ => return false,
    }

    store.ensure_rigid_body(entity);
    physics.ensure_body(entity);
    store.mark_reactive(entity, tags.clone());
    tracing::debug!(%entity, "chain reaction activated");
    true
}

/// Apply one collision. Returns the object it activated, if any.
pub fn propagate(
    store: &mut ComponentStore,
    event: CollisionEvent,
    physics: &mut dyn PhysicsBodyAttacher,
) -> Option<EntityId> {
    for (source, target) in event.pairs() {
        let Some(tags) = store.reactive_tags(source) else {
            continue;
        };
        let tags = tags.clone();
        if activate(store, target, &tags, physics) {
            return Some(target);
        }
    }
    None
}

/// Apply collisions in order. Returns every object activated, in order.
pub fn propagate_all(
    store: &mut ComponentStore,
    events: impl IntoIterator<Item = CollisionEvent>,
    physics: &mut dyn PhysicsBodyAttacher,
) -> Vec<EntityId> {
    events
        .into_iter()
        .filter_map(|event| propagate(store, event, physics))
        .collect()
}
