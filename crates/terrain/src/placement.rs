use std::f32::consts::TAU;

use glam::{Quat, Vec2, Vec3};
use rand::Rng;
use wildwood_common::Transform;

use crate::height::HeightField;

/// Rotation taking the local up axis onto `normal`.
pub fn ground_rotation(normal: Vec3) -> Quat {
    Quat::from_rotation_arc(Vec3::Y, normal.normalize())
}

/// Transform that stands an object on the ground at world `(x, z)`.
///
/// The object's base sits `clearance` above the terrain and its up axis
/// follows the terrain normal.
pub fn place_on_ground(field: &HeightField, x: f32, z: f32, clearance: f32) -> Transform {
    let sample = field.sample(x, z);
    Transform {
        position: Vec3::new(x, sample.height + clearance, z),
        rotation: ground_rotation(sample.normal),
        scale: Vec3::ONE,
    }
}

/// Uniform random point inside the square footprint starting at `origin`.
pub fn random_point_in_square<R: Rng + ?Sized>(rng: &mut R, origin: Vec2, size: f32) -> Vec2 {
    Vec2::new(
        origin.x + rng.random_range(0.0..=size),
        origin.y + rng.random_range(0.0..=size),
    )
}

/// Uniformly distributed random rotation (Shoemake's method).
pub fn random_rotation<R: Rng + ?Sized>(rng: &mut R) -> Quat {
    let u1: f32 = rng.random();
    let u2: f32 = rng.random();
    let u3: f32 = rng.random();
    let a = (1.0 - u1).sqrt();
    let b = u1.sqrt();
    Quat::from_xyzw(
        a * (TAU * u2).sin(),
        a * (TAU * u2).cos(),
        b * (TAU * u3).sin(),
        b * (TAU * u3).cos(),
    )
    .normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::height::HeightParams;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn field() -> HeightField {
        HeightField::new(HeightParams {
            x_frequency: 0.12,
            z_frequency: 0.07,
            x_offset: 33.0,
            z_offset: 5.0,
            bump_amplitude: 2.0,
            hills_frequency: 0.01,
            hills_amplitude: 15.0,
            normal_epsilon: 0.1,
        })
    }

    #[test]
    fn placed_object_up_matches_ground_normal() {
        let f = field();
        for i in 0..40 {
            let (x, z) = (i as f32 * 2.7 - 50.0, i as f32 * 1.9 - 20.0);
            let t = place_on_ground(&f, x, z, 0.0);
            let dot = t.up().dot(f.normal(x, z));
            assert!((dot - 1.0).abs() < 1e-5, "dot {dot} at ({x}, {z})");
        }
    }

    #[test]
    fn clearance_raises_the_base() {
        let f = field();
        let t = place_on_ground(&f, 4.0, 9.0, 0.5);
        assert!((t.position.y - (f.height(4.0, 9.0) + 0.5)).abs() < 1e-6);
        assert_eq!(t.position.x, 4.0);
        assert_eq!(t.position.z, 9.0);
    }

    #[test]
    fn flat_ground_gives_identity_rotation() {
        let q = ground_rotation(Vec3::Y);
        assert!(q.angle_between(Quat::IDENTITY) < 1e-5);
    }

    #[test]
    fn random_points_stay_in_footprint() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let origin = Vec2::new(-50.0, 100.0);
        for _ in 0..500 {
            let p = random_point_in_square(&mut rng, origin, 50.0);
            assert!((-50.0..=0.0).contains(&p.x));
            assert!((100.0..=150.0).contains(&p.y));
        }
    }

    #[test]
    fn random_rotations_are_unit() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        for _ in 0..100 {
            let q = random_rotation(&mut rng);
            assert!((q.length() - 1.0).abs() < 1e-5);
        }
    }
}
