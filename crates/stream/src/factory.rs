use glam::{Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use wildwood_common::{PopulationConfig, Tag, TerrainConfig, Transform, TreeConfig, WorldConfig};
use wildwood_ecs::{Collider, ComponentStore, RigidBody};
use wildwood_fauna::Creature;
use wildwood_terrain::{
    grow_tree, place_on_ground, random_point_in_square, random_rotation, terrain_patch,
    HeightField, TreeSpec,
};

use crate::grid::{TileCoord, TileGrid};
use crate::tile::{Appearance, Rock, RockCluster, TerrainPatch, Tile, TreeInstance};

/// Composes the contents of a tile: ground, trees, rocks and creatures.
///
/// Every tile draws from its own RNG, seeded from the world seed and the
/// tile coordinate, so a tile's contents do not depend on the order in
/// which tiles are built.
#[derive(Debug, Clone)]
pub struct TileFactory {
    terrain: TerrainConfig,
    trees: TreeConfig,
    population: PopulationConfig,
    grid: TileGrid,
    seed: u64,
}

impl TileFactory {
    pub fn new(config: &WorldConfig, seed: u64) -> Self {
        Self {
            terrain: config.terrain.clone(),
            trees: config.trees.clone(),
            population: config.population.clone(),
            grid: TileGrid::new(config.terrain.tile_size),
            seed,
        }
    }

    /// RNG dedicated to the tile at `coord`.
    pub fn tile_rng(&self, coord: TileCoord) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(tile_seed(self.seed, coord))
    }

    /// Build the tile at `coord`, registering its objects in `store`.
    pub fn build(&self, coord: TileCoord, field: &HeightField, store: &mut ComponentStore) -> Tile {
        let mut rng = self.tile_rng(coord);
        let pop = &self.population;
        let size = self.terrain.tile_size;
        let origin = self.grid.origin(coord);

        let ground = store.spawn(Tag::new(Tag::GROUND));
        store.set_collider(ground, Collider::Mesh);
        let terrain = TerrainPatch {
            entity: ground,
            transform: Transform::from_position(Vec3::new(origin.x, 0.0, origin.y)),
            mesh: terrain_patch(field, &self.terrain, origin),
            material: pop.ground_material,
        };

        let tree_count = rng.random_range(pop.trees.min..=pop.trees.max);
        let trees = (0..tree_count)
            .map(|_| self.plant_tree(&mut rng, origin, field, store))
            .collect();

        let cluster_count = rng.random_range(pop.rock_clusters.min..=pop.rock_clusters.max);
        let rock_clusters = (0..cluster_count)
            .map(|_| self.pile_rocks(&mut rng, origin, field, store))
            .collect();

        let creature_count = rng.random_range(pop.creatures.min..=pop.creatures.max);
        let creatures = (0..creature_count)
            .map(|_| {
                let p = random_point_in_square(&mut rng, origin, size);
                let transform = place_on_ground(field, p.x, p.y, pop.creature_clearance);
                let entity = store.spawn(Tag::new(Tag::CREATURE));
                store.set_rigid_body(
                    entity,
                    RigidBody {
                        is_kinematic: true,
                        ..RigidBody::default()
                    },
                );
                Creature::new(entity, transform, pop.creature_clearance)
            })
            .collect();

        Tile {
            coord,
            origin,
            terrain,
            trees,
            rock_clusters,
            creatures,
            creature_appearance: Appearance {
                prefab: pop.creature_prefab,
                material: pop.creature_material,
            },
        }
    }

    fn plant_tree(
        &self,
        rng: &mut ChaCha8Rng,
        origin: Vec2,
        field: &HeightField,
        store: &mut ComponentStore,
    ) -> TreeInstance {
        let spec = TreeSpec::random(&self.trees, rng);
        let tree = grow_tree(&spec, &self.trees);
        let p = random_point_in_square(rng, origin, self.terrain.tile_size);
        let transform = place_on_ground(field, p.x, p.y, self.population.tree_clearance);

        let entity = store.spawn(Tag::new(Tag::TREE));
        store.set_collider(
            entity,
            Collider::Capsule {
                center: tree.collider.center.to_array(),
                height: tree.collider.height,
                radius: tree.collider.radius,
            },
        );
        TreeInstance {
            entity,
            transform,
            tree,
            material: self.population.tree_material,
        }
    }

    fn pile_rocks(
        &self,
        rng: &mut ChaCha8Rng,
        origin: Vec2,
        field: &HeightField,
        store: &mut ComponentStore,
    ) -> RockCluster {
        let pop = &self.population;
        let spread = pop.rock_cluster_max_radius;
        let count = rng.random_range(pop.rocks_per_cluster.min..=pop.rocks_per_cluster.max);
        let rocks = (0..count)
            .map(|_| {
                let offset = Vec3::new(
                    rng.random_range(-spread..=spread),
                    0.0,
                    rng.random_range(-spread..=spread),
                );
                let rotation = random_rotation(rng);
                let scale = rng.random_range(pop.rock_scale.min..=pop.rock_scale.max);
                let entity = store.spawn(Tag::new(Tag::ROCK));
                store.set_collider(entity, Collider::default());
                Rock {
                    entity,
                    local: Transform {
                        position: offset,
                        rotation,
                        scale: Vec3::splat(scale),
                    },
                }
            })
            .collect();

        let p = random_point_in_square(rng, origin, self.terrain.tile_size);
        RockCluster {
            transform: place_on_ground(field, p.x, p.y, pop.rock_clearance),
            rocks,
            appearance: Appearance {
                prefab: pop.rock_prefab,
                material: pop.rock_material,
            },
        }
    }
}

/// Seed of the tile at `coord` in a world seeded with `world_seed`.
pub fn tile_seed(world_seed: u64, coord: TileCoord) -> u64 {
    let packed = ((coord.x as u32 as u64) << 32) | coord.z as u32 as u64;
    splitmix64(world_seed ^ splitmix64(packed))
}

/// Splitmix64: a fast, well-distributed 64-bit mixing step.
fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wildwood_common::{EntityId, MaterialHandle, PrefabHandle, Span};
    use wildwood_terrain::{MeshConsumer, MeshData};

    fn setup(seed: u64) -> (WorldConfig, TileFactory, HeightField) {
        let config = WorldConfig::default();
        let factory = TileFactory::new(&config, seed);
        let field = HeightField::from_rng(&config.terrain, &mut ChaCha8Rng::seed_from_u64(seed));
        (config, factory, field)
    }

    #[test]
    fn tile_contents_respect_population_ranges() {
        let (_, factory, field) = setup(1);
        for x in -2..2 {
            let mut store = ComponentStore::new();
            let tile = factory.build(TileCoord::new(x, 1), &field, &mut store);
            assert!((8..=19).contains(&tile.trees.len()));
            assert!((5..=14).contains(&tile.rock_clusters.len()));
            assert!(tile.creatures.len() <= 1);
            for cluster in &tile.rock_clusters {
                assert!((1..=2).contains(&cluster.rocks.len()));
                for rock in &cluster.rocks {
                    assert!(rock.local.position.x.abs() <= 3.0);
                    assert!(rock.local.position.z.abs() <= 3.0);
                    assert!((1.0..=3.0).contains(&rock.local.scale.x));
                }
            }
            let expected = 1 + tile.trees.len() + tile.rock_count() + tile.creatures.len();
            assert_eq!(store.entity_count(), expected);
        }
    }

    #[test]
    fn objects_are_inside_the_footprint() {
        let (config, factory, field) = setup(2);
        let mut store = ComponentStore::new();
        let coord = TileCoord::new(-3, 2);
        let tile = factory.build(coord, &field, &mut store);
        let size = config.terrain.tile_size;
        assert_eq!(tile.origin, Vec2::new(-150.0, 100.0));
        let inside = |t: &Transform| {
            (tile.origin.x..=tile.origin.x + size).contains(&t.position.x)
                && (tile.origin.y..=tile.origin.y + size).contains(&t.position.z)
        };
        assert!(tile.trees.iter().all(|t| inside(&t.transform)));
        assert!(tile.rock_clusters.iter().all(|c| inside(&c.transform)));
        assert!(tile.creatures.iter().all(|c| inside(&c.transform)));
    }

    #[test]
    fn placed_objects_are_ground_aligned() {
        let (config, factory, field) = setup(3);
        let mut store = ComponentStore::new();
        let tile = factory.build(TileCoord::new(0, 0), &field, &mut store);
        let pop = &config.population;

        let check = |t: &Transform, clearance: f32| {
            let (x, z) = (t.position.x, t.position.z);
            assert!((t.up().dot(field.normal(x, z)) - 1.0).abs() < 1e-5);
            assert!((t.position.y - (field.height(x, z) + clearance)).abs() < 1e-4);
        };
        tile.trees.iter().for_each(|t| check(&t.transform, pop.tree_clearance));
        tile.rock_clusters
            .iter()
            .for_each(|c| check(&c.transform, pop.rock_clearance));
        tile.creatures
            .iter()
            .for_each(|c| check(&c.transform, pop.creature_clearance));
    }

    #[test]
    fn same_seed_and_coord_rebuild_identically() {
        let (_, factory, field) = setup(4);
        let a = factory.build(TileCoord::new(5, -7), &field, &mut ComponentStore::new());
        let b = factory.build(TileCoord::new(5, -7), &field, &mut ComponentStore::new());
        assert_eq!(a.trees.len(), b.trees.len());
        assert_eq!(a.rock_clusters.len(), b.rock_clusters.len());
        for (ta, tb) in a.trees.iter().zip(&b.trees) {
            assert_eq!(ta.transform, tb.transform);
            assert_eq!(ta.tree.spec, tb.tree.spec);
        }
    }

    #[test]
    fn neighbouring_tiles_get_different_seeds() {
        let c = TileCoord::new(0, 0);
        assert_ne!(tile_seed(9, c), tile_seed(9, TileCoord::new(1, 0)));
        assert_ne!(tile_seed(9, c), tile_seed(9, TileCoord::new(0, 1)));
        assert_ne!(tile_seed(9, c), tile_seed(10, c));
    }

    #[test]
    fn objects_are_tagged_in_the_store() {
        let (_, factory, field) = setup(5);
        let mut store = ComponentStore::new();
        let tile = factory.build(TileCoord::new(1, 1), &field, &mut store);
        assert_eq!(store.tag(tile.terrain.entity).unwrap().as_str(), Tag::GROUND);
        assert_eq!(store.collider(tile.terrain.entity), Some(&Collider::Mesh));
        for tree in &tile.trees {
            assert_eq!(store.tag(tree.entity).unwrap().as_str(), Tag::TREE);
            assert!(matches!(store.collider(tree.entity), Some(Collider::Capsule { .. })));
            assert!(!store.has_rigid_body(tree.entity));
        }
        for creature in &tile.creatures {
            assert_eq!(store.tag(creature.entity).unwrap().as_str(), Tag::CREATURE);
            // Creatures move themselves; physics must not push them around.
            assert!(store.rigid_body(creature.entity).unwrap().is_kinematic);
        }
    }

    #[test]
    fn creature_count_can_be_forced() {
        let mut config = WorldConfig::default();
        config.population.creatures = Span::new(2, 2);
        let factory = TileFactory::new(&config, 6);
        let field = HeightField::from_rng(&config.terrain, &mut ChaCha8Rng::seed_from_u64(6));
        let tile = factory.build(TileCoord::new(0, 0), &field, &mut ComponentStore::new());
        assert_eq!(tile.creatures.len(), 2);
    }

    #[derive(Default)]
    struct Tally {
        meshes: Vec<(EntityId, MaterialHandle, usize)>,
        prefabs: Vec<(EntityId, PrefabHandle)>,
    }

    impl MeshConsumer for Tally {
        fn consume_mesh(
            &mut self,
            entity: EntityId,
            mesh: &MeshData,
            material: MaterialHandle,
            _transform: &Transform,
        ) {
            self.meshes.push((entity, material, mesh.vertex_count()));
        }

        fn place_prefab(
            &mut self,
            entity: EntityId,
            prefab: PrefabHandle,
            _material: MaterialHandle,
            _transform: &Transform,
        ) {
            self.prefabs.push((entity, prefab));
        }
    }

    #[test]
    fn submit_hands_over_every_object() {
        let (config, factory, field) = setup(7);
        let tile = factory.build(TileCoord::new(0, 0), &field, &mut ComponentStore::new());
        let mut tally = Tally::default();
        tile.submit(&mut tally);

        assert_eq!(tally.meshes.len(), 1 + tile.trees.len());
        assert_eq!(tally.meshes[0].1, config.population.ground_material);
        assert_eq!(tally.meshes[0].2, 26 * 26);
        assert!(tally.meshes[1..]
            .iter()
            .all(|(_, m, _)| *m == config.population.tree_material));
        assert_eq!(tally.prefabs.len(), tile.rock_count() + tile.creatures.len());
    }

    #[test]
    fn rock_world_transform_composes_with_cluster() {
        let (_, factory, field) = setup(8);
        let tile = factory.build(TileCoord::new(2, 2), &field, &mut ComponentStore::new());
        let cluster = &tile.rock_clusters[0];
        let rock = &cluster.rocks[0];
        let world = cluster.world_transform(rock);
        let expected = cluster.transform.transform_point(rock.local.position);
        assert!((world.position - expected).length() < 1e-5);
    }
}
