use glam::Vec3;
use noise::{NoiseFn, Perlin};
use rand::Rng;
use serde::{Deserialize, Serialize};
use wildwood_common::TerrainConfig;

/// Parameters of a world's height field.
///
/// The frequencies and offsets are drawn once when the world is created and
/// held for its lifetime; the rest comes straight from the terrain config.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeightParams {
    pub x_frequency: f32,
    pub z_frequency: f32,
    pub x_offset: f32,
    pub z_offset: f32,
    pub bump_amplitude: f32,
    pub hills_frequency: f32,
    pub hills_amplitude: f32,
    pub normal_epsilon: f32,
}

impl HeightParams {
    /// Draw the per-world frequencies and offsets.
    pub fn random<R: Rng + ?Sized>(config: &TerrainConfig, rng: &mut R) -> Self {
        let freq = config.bump_frequency;
        let offset = config.noise_offset;
        Self {
            x_frequency: rng.random_range(freq.min..=freq.max),
            z_frequency: rng.random_range(freq.min..=freq.max),
            x_offset: rng.random_range(offset.min..=offset.max),
            z_offset: rng.random_range(offset.min..=offset.max),
            bump_amplitude: config.bump_amplitude,
            hills_frequency: config.hills_frequency,
            hills_amplitude: config.hills_amplitude,
            normal_epsilon: config.normal_epsilon,
        }
    }
}

/// Height and surface normal at one point of the terrain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightSample {
    pub height: f32,
    /// Unit length, pointing up.
    pub normal: Vec3,
}

/// Deterministic noise terrain: world `(x, z)` to height and normal.
///
/// Two bands of Perlin noise are summed: small uneven bumps at a per-world
/// frequency and broad hills at a fixed low frequency. Both bands share the
/// per-world offset, so two worlds with different params look different
/// while each one is a pure function of its inputs.
#[derive(Debug, Clone)]
pub struct HeightField {
    params: HeightParams,
    perlin: Perlin,
}

impl HeightField {
    pub fn new(params: HeightParams) -> Self {
        Self {
            params,
            perlin: Perlin::new(Perlin::DEFAULT_SEED),
        }
    }

    /// Build a height field with params drawn from `rng`.
    pub fn from_rng<R: Rng + ?Sized>(config: &TerrainConfig, rng: &mut R) -> Self {
        let params = HeightParams::random(config, rng);
        tracing::debug!(?params, "height field parameters drawn");
        Self::new(params)
    }

    pub fn params(&self) -> &HeightParams {
        &self.params
    }

    /// Terrain height at world `(x, z)`.
    pub fn height(&self, x: f32, z: f32) -> f32 {
        let p = &self.params;
        let bumps = self.band(x * p.x_frequency, z * p.z_frequency) * p.bump_amplitude;
        let hills =
            self.band(x * p.hills_frequency, z * p.hills_frequency) * p.hills_amplitude;
        bumps + hills
    }

    /// Unit surface normal at world `(x, z)`, estimated by forward differences.
    pub fn normal(&self, x: f32, z: f32) -> Vec3 {
        let e = self.params.normal_epsilon;
        let h = self.height(x, z);
        let dx = self.height(x + e, z) - h;
        let dz = self.height(x, z + e) - h;
        // The y component of this cross product is e², so it never vanishes.
        Vec3::new(0.0, dz, e)
            .cross(Vec3::new(e, dx, 0.0))
            .normalize()
    }

    pub fn sample(&self, x: f32, z: f32) -> HeightSample {
        HeightSample {
            height: self.height(x, z),
            normal: self.normal(x, z),
        }
    }

    /// One noise band remapped into `[0, 1]`.
    fn band(&self, u: f32, v: f32) -> f32 {
        let u = u as f64 + self.params.x_offset as f64;
        let v = v as f64 + self.params.z_offset as f64;
        (self.perlin.get([u, v]) * 0.5 + 0.5).clamp(0.0, 1.0) as f32
    }
}
