use glam::Vec2;
use wildwood_common::{EntityId, MaterialHandle, PrefabHandle, Transform};
use wildwood_fauna::Creature;
use wildwood_terrain::{MeshConsumer, MeshData, TreeMesh};

use crate::grid::TileCoord;

/// Engine-owned mesh and material an instance is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Appearance {
    pub prefab: PrefabHandle,
    pub material: MaterialHandle,
}

/// Ground mesh of a tile. Positions are local to `transform`.
#[derive(Debug, Clone)]
pub struct TerrainPatch {
    pub entity: EntityId,
    pub transform: Transform,
    pub mesh: MeshData,
    pub material: MaterialHandle,
}

#[derive(Debug, Clone)]
pub struct TreeInstance {
    pub entity: EntityId,
    pub transform: Transform,
    pub tree: TreeMesh,
    pub material: MaterialHandle,
}

/// One rock, placed relative to its cluster.
#[derive(Debug, Clone)]
pub struct Rock {
    pub entity: EntityId,
    pub local: Transform,
}

/// A handful of rocks around a common ground-aligned centre.
#[derive(Debug, Clone)]
pub struct RockCluster {
    pub transform: Transform,
    pub rocks: Vec<Rock>,
    pub appearance: Appearance,
}

impl RockCluster {
    /// World transform of `rock`.
    pub fn world_transform(&self, rock: &Rock) -> Transform {
        self.transform.mul_transform(&rock.local)
    }
}

/// Contents of one tile. Built once, never rebuilt.
#[derive(Debug, Clone)]
pub struct Tile {
    pub coord: TileCoord,
    /// World `(x, z)` of the tile's corner.
    pub origin: Vec2,
    pub terrain: TerrainPatch,
    pub trees: Vec<TreeInstance>,
    pub rock_clusters: Vec<RockCluster>,
    pub creatures: Vec<Creature>,
    pub creature_appearance: Appearance,
}

impl Tile {
    pub fn rock_count(&self) -> usize {
        self.rock_clusters.iter().map(|c| c.rocks.len()).sum()
    }

    /// Hand every mesh and prefab instance of the tile to `consumer`.
    pub fn submit(&self, consumer: &mut dyn MeshConsumer) {
        consumer.consume_mesh(
            self.terrain.entity,
            &self.terrain.mesh,
            self.terrain.material,
            &self.terrain.transform,
        );
        for tree in &self.trees {
            consumer.consume_mesh(tree.entity, &tree.tree.mesh, tree.material, &tree.transform);
        }
        for cluster in &self.rock_clusters {
            for rock in &cluster.rocks {
                consumer.place_prefab(
                    rock.entity,
                    cluster.appearance.prefab,
                    cluster.appearance.material,
                    &cluster.world_transform(rock),
                );
            }
        }
        for creature in &self.creatures {
            consumer.place_prefab(
                creature.entity,
                self.creature_appearance.prefab,
                self.creature_appearance.material,
                &creature.transform,
            );
        }
    }
}
