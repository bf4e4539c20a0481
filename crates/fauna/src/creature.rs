use glam::Vec3;
use rand::Rng;
use wildwood_common::{CreatureConfig, EntityId, Tag, TagSet, Transform};
use wildwood_terrain::{ground_rotation, HeightField};

/// Behaviour state of a creature after its last update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreatureState {
    /// Moving in its current direction.
    Wandering,
    /// Observer is close; standing still.
    Noticing,
    /// Observer came too close; fleeing.
    Spooked,
}

/// Everything a creature reads during one update.
#[derive(Debug, Clone, Copy)]
pub struct TickContext<'a> {
    /// Seconds since the world started.
    pub now: f32,
    /// Seconds since the previous tick.
    pub dt: f32,
    pub observer: Vec3,
    pub field: &'a HeightField,
    pub config: &'a CreatureConfig,
}

/// A critter that wanders randomly, stops when the observer approaches and
/// bolts away when the observer gets too close.
#[derive(Debug, Clone)]
pub struct Creature {
    pub entity: EntityId,
    pub transform: Transform,
    pub velocity: Vec3,
    direction: Vec3,
    state: CreatureState,
    spooked: bool,
    /// While spooked this is also when the spook ends.
    next_direction_change: f32,
    clearance: f32,
}

impl Creature {
    /// A creature standing at `transform`, hovering `clearance` above ground.
    /// It picks its first direction on its first update.
    pub fn new(entity: EntityId, transform: Transform, clearance: f32) -> Self {
        Self {
            entity,
            transform,
            velocity: Vec3::ZERO,
            direction: Vec3::ZERO,
            state: CreatureState::Wandering,
            spooked: false,
            next_direction_change: 0.0,
            clearance,
        }
    }

    pub fn state(&self) -> CreatureState {
        self.state
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn is_spooked(&self) -> bool {
        self.spooked
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    pub fn next_direction_change(&self) -> f32 {
        self.next_direction_change
    }

    /// When the current spook ends, if spooked.
    pub fn spook_expiry(&self) -> Option<f32> {
        self.spooked.then_some(self.next_direction_change)
    }

    /// Whether bumping into something tagged `tag` knocks it over.
    pub fn knocks_down(&self, tag: &Tag, knockdown: &TagSet) -> bool {
        self.spooked && knockdown.contains(tag)
    }

    /// Advance the creature by one tick.
    pub fn update<R: Rng + ?Sized>(&mut self, ctx: &TickContext<'_>, rng: &mut R) {
        let config = ctx.config;

        if ctx.now >= self.next_direction_change {
            if self.spooked {
                // Spook is over: stop dead.
                self.direction = Vec3::ZERO;
                self.velocity = Vec3::ZERO;
                self.spooked = false;
            } else {
                self.direction = random_horizontal_direction(rng);
            }
            let interval = config.wander_interval;
            self.next_direction_change = ctx.now + rng.random_range(interval.min..=interval.max);
        }

        let away = self.transform.position - ctx.observer;
        let distance_sq = away.length_squared();
        if distance_sq < config.spook_distance_squared() {
            if !self.spooked {
                tracing::trace!(entity = %self.entity, "creature spooked");
            }
            self.spooked = true;
            self.state = CreatureState::Spooked;
            self.direction = away.normalize_or_zero();
            self.direction.y = 0.0;
            self.next_direction_change = ctx.now + config.spook_length;
            self.apply_impulse(ctx);
        } else if !self.spooked && distance_sq < config.notice_distance_squared() {
            self.state = CreatureState::Noticing;
        } else {
            self.state = if self.spooked {
                CreatureState::Spooked
            } else {
                CreatureState::Wandering
            };
            self.apply_impulse(ctx);
        }

        self.integrate(ctx);
        self.transform.rotation = ground_rotation(
            ctx.field
                .normal(self.transform.position.x, self.transform.position.z),
        );
    }

    /// Velocity change in the current direction, scaled by the tick length.
    fn apply_impulse(&mut self, ctx: &TickContext<'_>) {
        if self.direction == Vec3::ZERO {
            return;
        }
        let speed = if self.spooked {
            ctx.config.spook_speed
        } else {
            ctx.config.speed
        };
        self.velocity += self.direction * speed * ctx.dt;
    }

    /// Ground-bound motion: friction, horizontal travel, snap to the terrain.
    fn integrate(&mut self, ctx: &TickContext<'_>) {
        self.velocity *= ctx.config.velocity_retention.powf(ctx.dt);
        let p = &mut self.transform.position;
        p.x += self.velocity.x * ctx.dt;
        p.z += self.velocity.z * ctx.dt;
        p.y = ctx.field.height(p.x, p.z) + self.clearance;
    }
}

/// Random point in the unit ball flattened onto the ground plane.
///
/// The length varies, which gives each wander leg its own pace.
pub fn random_horizontal_direction<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    loop {
        let v = Vec3::new(
            rng.random_range(-1.0..=1.0),
            rng.random_range(-1.0..=1.0),
            rng.random_range(-1.0..=1.0),
        );
        if v.length_squared() <= 1.0 {
            return Vec3::new(v.x, 0.0, v.z);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use wildwood_common::tag_set;
    use wildwood_terrain::HeightParams;

    fn field() -> HeightField {
        HeightField::new(HeightParams {
            x_frequency: 0.1,
            z_frequency: 0.1,
            x_offset: 20.0,
            z_offset: 60.0,
            bump_amplitude: 2.0,
            hills_frequency: 0.01,
            hills_amplitude: 15.0,
            normal_epsilon: 0.1,
        })
    }

    fn creature_at(f: &HeightField, x: f32, z: f32) -> Creature {
        let t = wildwood_terrain::place_on_ground(f, x, z, 2.0);
        Creature::new(EntityId(7), t, 2.0)
    }

    fn ctx<'a>(
        now: f32,
        observer: Vec3,
        field: &'a HeightField,
        config: &'a CreatureConfig,
    ) -> TickContext<'a> {
        TickContext {
            now,
            dt: 1.0 / 60.0,
            observer,
            field,
            config,
        }
    }

    #[test]
    fn spooks_and_flees_within_the_same_tick() {
        let f = field();
        let config = CreatureConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut c = creature_at(&f, 0.0, 0.0);
        let observer = c.position() + Vec3::new(3.0, 0.0, 0.0);

        c.update(&ctx(0.5, observer, &f, &config), &mut rng);

        assert_eq!(c.state(), CreatureState::Spooked);
        assert!(c.is_spooked());
        assert!((c.direction() - Vec3::new(-1.0, 0.0, 0.0)).length() < 1e-5);
        assert_eq!(c.spook_expiry(), Some(0.5 + config.spook_length));
        assert!(c.velocity.x < 0.0);
    }

    #[test]
    fn fleeing_from_above_stays_on_the_ground_plane() {
        let f = field();
        let config = CreatureConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let mut c = creature_at(&f, 0.0, 0.0);
        let observer = c.position() + Vec3::new(3.0, 4.0, 0.0);

        for i in 0..10 {
            c.update(&ctx(0.5 + i as f32 / 60.0, observer, &f, &config), &mut rng);
        }

        assert!(c.is_spooked());
        assert!((c.direction() - Vec3::new(-0.6, 0.0, 0.0)).length() < 1e-5);
        assert_eq!(c.velocity.y, 0.0);
        assert!(c.velocity.x < 0.0);
    }

    #[test]
    fn notices_and_stands_still() {
        let f = field();
        let config = CreatureConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut c = creature_at(&f, 10.0, 10.0);
        let observer = c.position() + Vec3::new(0.0, 0.0, 10.0);

        c.update(&ctx(0.0, observer, &f, &config), &mut rng);

        assert_eq!(c.state(), CreatureState::Noticing);
        assert_eq!(c.velocity, Vec3::ZERO);
        assert_ne!(c.direction(), Vec3::ZERO);
    }

    #[test]
    fn wanders_when_observer_is_far() {
        let f = field();
        let config = CreatureConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut c = creature_at(&f, -20.0, 5.0);
        let start = c.position();

        for i in 0..30 {
            c.update(&ctx(i as f32 / 60.0, Vec3::splat(500.0), &f, &config), &mut rng);
        }

        assert_eq!(c.state(), CreatureState::Wandering);
        assert_ne!(c.velocity, Vec3::ZERO);
        assert_ne!((c.position().x, c.position().z), (start.x, start.z));
        assert_eq!(c.velocity.y, 0.0);
    }

    #[test]
    fn direction_change_rerolled_within_wander_interval() {
        let f = field();
        let config = CreatureConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut c = creature_at(&f, 0.0, 0.0);

        c.update(&ctx(2.0, Vec3::splat(500.0), &f, &config), &mut rng);

        let next = c.next_direction_change();
        assert!((3.0..=6.0).contains(&next), "next change at {next}");
        let dir = c.direction();
        assert_eq!(dir.y, 0.0);
        assert!(dir.length() <= 1.0);
    }

    #[test]
    fn stays_spooked_while_fleeing_through_notice_range() {
        let f = field();
        let config = CreatureConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut c = creature_at(&f, 0.0, 0.0);
        let observer = c.position() + Vec3::new(2.0, 0.0, 0.0);
        c.update(&ctx(0.0, observer, &f, &config), &mut rng);
        let v = c.velocity;

        // Observer now inside notice range but outside spook range.
        let observer = c.position() + Vec3::new(10.0, 0.0, 0.0);
        c.update(&ctx(0.1, observer, &f, &config), &mut rng);

        assert_eq!(c.state(), CreatureState::Spooked);
        assert!(c.velocity.x < v.x * config.velocity_retention.powf(1.0 / 60.0) + 1e-6);
    }

    #[test]
    fn spook_expiry_stops_the_creature() {
        let f = field();
        let config = CreatureConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let mut c = creature_at(&f, 0.0, 0.0);
        let observer = c.position() + Vec3::new(1.0, 0.0, 1.0);
        c.update(&ctx(0.0, observer, &f, &config), &mut rng);
        assert!(c.is_spooked());

        let far = Vec3::splat(1000.0);
        c.update(&ctx(config.spook_length, far, &f, &config), &mut rng);

        assert!(!c.is_spooked());
        assert_eq!(c.direction(), Vec3::ZERO);
        assert_eq!(c.velocity, Vec3::ZERO);
        assert_eq!(c.state(), CreatureState::Wandering);
        assert_eq!(c.spook_expiry(), None);
    }

    #[test]
    fn zero_direction_applies_no_impulse() {
        let f = field();
        let config = CreatureConfig::default();
        let mut c = creature_at(&f, 0.0, 0.0);
        // Direction is zero and no change is due yet.
        c.next_direction_change = 10.0;
        c.update(&ctx(1.0, Vec3::splat(1000.0), &f, &config), &mut ChaCha8Rng::seed_from_u64(0));
        assert_eq!(c.velocity, Vec3::ZERO);
    }

    #[test]
    fn stays_on_and_aligned_with_the_ground() {
        let f = field();
        let config = CreatureConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut c = creature_at(&f, 30.0, -12.0);
        for i in 0..120 {
            c.update(&ctx(i as f32 / 60.0, Vec3::splat(800.0), &f, &config), &mut rng);
            let p = c.position();
            assert!((p.y - (f.height(p.x, p.z) + 2.0)).abs() < 1e-4);
            let dot = c.transform.up().dot(f.normal(p.x, p.z));
            assert!((dot - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn knocks_down_only_while_spooked() {
        let f = field();
        let config = CreatureConfig::default();
        let knockdown = tag_set([Tag::TREE, Tag::ROCK]);
        let mut c = creature_at(&f, 0.0, 0.0);
        assert!(!c.knocks_down(&Tag::new(Tag::TREE), &knockdown));

        let observer = c.position() + Vec3::new(0.0, 0.0, 1.0);
        c.update(&ctx(0.0, observer, &f, &config), &mut ChaCha8Rng::seed_from_u64(9));
        assert!(c.knocks_down(&Tag::new(Tag::TREE), &knockdown));
        assert!(!c.knocks_down(&Tag::new(Tag::GROUND), &knockdown));
    }

    #[test]
    fn horizontal_directions_are_flat_and_bounded() {
        let mut rng = ChaCha8Rng::seed_from_u64(10);
        for _ in 0..200 {
            let d = random_horizontal_direction(&mut rng);
            assert_eq!(d.y, 0.0);
            assert!(d.length() <= 1.0);
        }
    }
}
