//! Stacked-frustum trees.
//!
//! A tree is a trunk (level 0) with `levels` canopy frustums stacked on top.
//! Every level is a ring of `leaves` sides:
//!
//! - the trunk is a cylinder of radius `radius * trunk_radius_mult`, closed
//!   at the bottom by a fan to vertex 0;
//! - each canopy level narrows from `radius` to `radius * trunk_radius_mult`,
//!   with a flat ring underneath joining it to the level below;
//! - the topmost level closes to a point.
//!
//! Trunk and canopy share one material; they are told apart by two UV
//! markers that index into a colour atlas.

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};
use rand::Rng;
use wildwood_common::TreeConfig;

use crate::mesh::MeshData;

/// Atlas coordinate selecting the trunk colour.
pub const TRUNK_UV: Vec2 = Vec2::new(0.75, 0.25);
/// Atlas coordinate selecting the canopy colour.
pub const CANOPY_UV: Vec2 = Vec2::new(0.25, 0.75);

/// Random shape parameters of one tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeSpec {
    pub levels: u32,
    pub leaves: u32,
    pub radius: f32,
    pub level_height: f32,
}

impl TreeSpec {
    pub fn random<R: Rng + ?Sized>(config: &TreeConfig, rng: &mut R) -> Self {
        Self {
            levels: rng.random_range(config.levels.min..=config.levels.max),
            leaves: rng.random_range(config.leaf_sides.min..=config.leaf_sides.max),
            radius: rng.random_range(config.radius.min..=config.radius.max),
            level_height: rng.random_range(config.level_height.min..=config.level_height.max),
        }
    }

    /// Total height from the trunk base to the tip.
    pub fn height(&self) -> f32 {
        (self.levels + 1) as f32 * self.level_height
    }
}

/// Upright capsule bounding a tree, in the tree's local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapsuleShape {
    pub center: Vec3,
    pub height: f32,
    pub radius: f32,
}

/// A synthesized tree and its collision shape.
#[derive(Debug, Clone)]
pub struct TreeMesh {
    pub spec: TreeSpec,
    pub mesh: MeshData,
    pub collider: CapsuleShape,
}

/// Exact vertex count of a tree with the given level and leaf counts.
pub fn tree_vertex_count(levels: u32, leaves: u32) -> usize {
    let (levels, leaves) = (levels as usize, leaves as usize);
    1 + (levels + 1) * leaves * 4 + levels * leaves * 4 + leaves * 2
}

/// Exact index count of a tree with the given level and leaf counts.
pub fn tree_index_count(levels: u32, leaves: u32) -> usize {
    let (levels, leaves) = (levels as usize, leaves as usize);
    (levels * 2 + 1) * leaves * 6 + leaves * 3
}

/// One ring of a tree: `leaves` points around the y axis.
struct Ring {
    leaves: u32,
    step: f32,
    dimple: Option<f32>,
}

impl Ring {
    fn new(leaves: u32, dimple_mult: f32) -> Self {
        // Dimples need an even count so that they alternate all the way round.
        let dimple = (leaves % 2 == 0 && leaves > 6).then_some(dimple_mult);
        Self {
            leaves,
            step: TAU / leaves as f32,
            dimple,
        }
    }

    fn point(&self, k: u32, y: f32, radius: f32) -> Vec3 {
        let scale = match self.dimple {
            Some(mult) if k % 2 == 0 => mult,
            _ => 1.0,
        };
        let angle = self.step * k as f32;
        Vec3::new(angle.cos() * radius * scale, y, angle.sin() * radius * scale)
    }

    /// Write the two ends of side `leaf` into `out[0]` and `out[1]`.
    fn edge(&self, out: &mut [Vec3], leaf: u32, y: f32, radius: f32) {
        debug_assert!(leaf < self.leaves);
        out[0] = self.point(leaf, y, radius);
        out[1] = self.point(leaf + 1, y, radius);
    }
}

/// Copy `pattern`, offset by `base`, into `out`.
fn emit(out: &mut [u32], base: usize, pattern: &[u32]) {
    for (dst, offset) in out.iter_mut().zip(pattern) {
        *dst = base as u32 + offset;
    }
}

/// Build the mesh of a tree.
///
/// Buffers are allocated at their exact final length up front and filled by
/// index; an out-of-range write means the count formulas are wrong.
pub fn grow_tree(spec: &TreeSpec, config: &TreeConfig) -> TreeMesh {
    let levels = spec.levels;
    let leaves = spec.leaves;
    let h = spec.level_height;
    let trunk_radius = spec.radius * config.trunk_radius_mult;
    let ring = Ring::new(leaves, config.leaf_dimple_mult);

    let vertex_count = tree_vertex_count(levels, leaves);
    let index_count = tree_index_count(levels, leaves);
    let mut positions = vec![Vec3::ZERO; vertex_count];
    let mut uvs = vec![TRUNK_UV; vertex_count];
    let mut indices = vec![0u32; index_count];

    // Vertex 0 is the bottom centre of the trunk.
    let mut v = 1;
    let mut t = 0;

    for level in 0..=levels {
        let bottom_radius = if level == 0 { trunk_radius } else { spec.radius };
        let top_radius = if level == levels { 0.0 } else { trunk_radius };
        let bottom_y = level as f32 * h;
        let top_y = (level + 1) as f32 * h;
        let uv = if level > 0 { CANOPY_UV } else { TRUNK_UV };

        for leaf in 0..leaves {
            // Side quad.
            ring.edge(&mut positions[v..v + 2], leaf, bottom_y, bottom_radius);
            ring.edge(&mut positions[v + 2..v + 4], leaf, top_y, top_radius);
            emit(&mut indices[t..t + 6], v, &[0, 3, 1, 0, 2, 3]);
            uvs[v..v + 4].fill(uv);
            v += 4;
            t += 6;

            if level > 0 {
                // Flat ring under the canopy, joining it to the level below.
                ring.edge(&mut positions[v..v + 2], leaf, bottom_y, bottom_radius);
                ring.edge(&mut positions[v + 2..v + 4], leaf, bottom_y, trunk_radius);
                emit(&mut indices[t..t + 6], v, &[2, 1, 3, 2, 0, 1]);
                uvs[v..v + 4].fill(CANOPY_UV);
                v += 4;
                t += 6;
            } else {
                // Trunk bottom cap.
                ring.edge(&mut positions[v..v + 2], leaf, bottom_y, bottom_radius);
                indices[t] = v as u32;
                indices[t + 1] = v as u32 + 1;
                indices[t + 2] = 0;
                uvs[v..v + 2].fill(TRUNK_UV);
                v += 2;
                t += 3;
            }
        }
    }

    debug_assert_eq!(v, vertex_count);
    debug_assert_eq!(t, index_count);

    let mut mesh = MeshData {
        positions,
        indices,
        uvs: Some(uvs),
        normals: Vec::new(),
    };
    mesh.recalculate_normals();

    let height = spec.height();
    TreeMesh {
        spec: *spec,
        mesh,
        collider: CapsuleShape {
            center: Vec3::new(0.0, height * 0.5, 0.0),
            height,
            radius: spec.radius,
        },
    }
}
