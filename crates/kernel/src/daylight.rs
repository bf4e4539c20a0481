use glam::{Quat, Vec3};
use wildwood_common::SunConfig;

/// Directional sun spinning about a fixed axis.
///
/// Starts at midday, with the light pointing straight down.
#[derive(Debug, Clone)]
pub struct SunCycle {
    axis: Vec3,
    degrees_per_second: f32,
    twilight_start: f32,
    twilight_stop: f32,
    /// Rotation applied on top of midday, in degrees, wrapped to [0, 360).
    angle: f32,
}

impl SunCycle {
    pub fn new(config: &SunConfig) -> Self {
        Self {
            axis: config.axis.normalize_or_zero(),
            degrees_per_second: config.degrees_per_second,
            twilight_start: config.twilight_start,
            twilight_stop: config.twilight_stop,
            angle: 0.0,
        }
    }

    /// Rotation of the light at midday.
    pub fn midday() -> Quat {
        Quat::from_rotation_x(90f32.to_radians())
    }

    pub fn advance(&mut self, dt: f32) {
        self.angle = (self.angle + self.degrees_per_second * dt).rem_euclid(360.0);
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_axis_angle(self.axis, self.angle.to_radians()) * Self::midday()
    }

    /// Direction the light travels in.
    pub fn direction(&self) -> Vec3 {
        self.rotation() * Vec3::Z
    }

    /// Degrees between the current rotation and midday.
    pub fn angle_from_midday(&self) -> f32 {
        self.rotation().angle_between(Self::midday()).to_degrees()
    }

    /// Light intensity in [0, 1]: full until the twilight band, then fading
    /// linearly to zero.
    pub fn intensity(&self) -> f32 {
        let fade = (self.angle_from_midday() - self.twilight_start)
            / (self.twilight_stop - self.twilight_start);
        1.0 - fade.clamp(0.0, 1.0)
    }
}
