//! Terrain: noise height field and procedural mesh synthesis.
//!
//! # Invariants
//! - `HeightField` is a pure function of its params; same inputs, same output.
//! - Mesh buffers are sized from closed-form counts before they are filled.

pub mod height;
pub mod mesh;
pub mod patch;
pub mod placement;
pub mod tree;

pub use height::{HeightField, HeightParams, HeightSample};
pub use mesh::{MeshConsumer, MeshData};
pub use patch::{patch_index_count, patch_vertex_count, terrain_patch};
pub use placement::{ground_rotation, place_on_ground, random_point_in_square, random_rotation};
pub use tree::{
    grow_tree, tree_index_count, tree_vertex_count, CapsuleShape, TreeMesh, TreeSpec, CANOPY_UV,
    TRUNK_UV,
};
