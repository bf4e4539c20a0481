use glam::{Vec2, Vec3};
use wildwood_common::TerrainConfig;

use crate::height::HeightField;
use crate::mesh::MeshData;

/// Vertices in a patch of `rows × rows` cells.
pub fn patch_vertex_count(rows: usize) -> usize {
    (rows + 1) * (rows + 1)
}

/// Indices in a patch of `rows × rows` cells.
pub fn patch_index_count(rows: usize) -> usize {
    rows * rows * 6
}

/// Build the ground mesh of the tile whose corner sits at `origin` (x, z).
///
/// Heights are sampled at absolute world positions so neighbouring patches
/// share their edge vertices exactly. Positions are local to `origin`.
pub fn terrain_patch(field: &HeightField, config: &TerrainConfig, origin: Vec2) -> MeshData {
    let rows = config.rows();
    let spacing = config.vertex_spacing;
    let stride = (rows + 1) as u32;

    let mut positions = Vec::with_capacity(patch_vertex_count(rows));
    let mut indices = Vec::with_capacity(patch_index_count(rows));

    for x in 0..=rows {
        for z in 0..=rows {
            let local_x = x as f32 * spacing;
            let local_z = z as f32 * spacing;
            let v = positions.len() as u32;
            positions.push(Vec3::new(
                local_x,
                field.height(origin.x + local_x, origin.y + local_z),
                local_z,
            ));

            if x < rows && z < rows {
                indices.extend_from_slice(&[v, v + stride + 1, v + stride]);
                indices.extend_from_slice(&[v, v + 1, v + stride + 1]);
            }
        }
    }

    debug_assert_eq!(positions.len(), patch_vertex_count(rows));
    debug_assert_eq!(indices.len(), patch_index_count(rows));

    let mut mesh = MeshData {
        positions,
        indices,
        uvs: None,
        normals: Vec::new(),
    };
    mesh.recalculate_normals();
    mesh
}
