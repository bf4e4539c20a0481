use glam::{Vec2, Vec3};
use wildwood_common::{EntityId, MaterialHandle, PrefabHandle, Transform};

/// A finished triangle mesh ready for submission to a renderer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<Vec3>,
    /// Three indices per triangle.
    pub indices: Vec<u32>,
    pub uvs: Option<Vec<Vec2>>,
    pub normals: Vec<Vec3>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn triangle(&self, i: usize) -> [Vec3; 3] {
        let t = &self.indices[i * 3..i * 3 + 3];
        [
            self.positions[t[0] as usize],
            self.positions[t[1] as usize],
            self.positions[t[2] as usize],
        ]
    }

    /// Recompute vertex normals from the triangles.
    ///
    /// Each face contributes its area-weighted normal to its three corners.
    /// A vertex touched only by degenerate faces gets `+Y`.
    pub fn recalculate_normals(&mut self) {
        let mut acc = vec![Vec3::ZERO; self.positions.len()];
        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let face = (self.positions[b] - self.positions[a])
                .cross(self.positions[c] - self.positions[a]);
            acc[a] += face;
            acc[b] += face;
            acc[c] += face;
        }
        self.normals = acc
            .into_iter()
            .map(|n| {
                let n = n.normalize_or_zero();
                if n == Vec3::ZERO { Vec3::Y } else { n }
            })
            .collect();
    }
}

/// Receives generated geometry. Implemented by the host renderer.
pub trait MeshConsumer {
    /// Accept a synthesized mesh placed at `transform`.
    fn consume_mesh(
        &mut self,
        entity: EntityId,
        mesh: &MeshData,
        material: MaterialHandle,
        transform: &Transform,
    );

    /// Accept an instance of an engine-owned prefab mesh.
    fn place_prefab(
        &mut self,
        entity: EntityId,
        prefab: PrefabHandle,
        material: MaterialHandle,
        transform: &Transform,
    ) {
        let _ = (entity, prefab, material, transform);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> MeshData {
        MeshData {
            positions: vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, 1.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 1.0),
            ],
            indices: vec![0, 3, 2, 0, 1, 3],
            uvs: None,
            normals: Vec::new(),
        }
    }

    #[test]
    fn counts() {
        let m = quad();
        assert_eq!(m.vertex_count(), 4);
        assert_eq!(m.triangle_count(), 2);
        assert_eq!(m.triangle(1)[2], Vec3::new(1.0, 0.0, 1.0));
    }

    #[test]
    fn flat_quad_normals_point_up() {
        let mut m = quad();
        m.recalculate_normals();
        assert_eq!(m.normals.len(), 4);
        for n in &m.normals {
            assert!((*n - Vec3::Y).length() < 1e-6);
        }
    }

    #[test]
    fn degenerate_triangle_falls_back_to_up() {
        let mut m = MeshData {
            positions: vec![Vec3::ZERO, Vec3::X, Vec3::X],
            indices: vec![0, 1, 2],
            ..MeshData::default()
        };
        m.recalculate_normals();
        assert!(m.normals.iter().all(|n| *n == Vec3::Y));
    }
}
