//! Integration tests for map connectivity guarantees.
//!
//! Every generator promises a fully traversable map: the down staircase and
//! every room interior must be reachable from the up staircase by walking
//! cardinal steps over walkable tiles.

use delve::{
    connectivity::flood_fill, create_generator, generation::utils, GeneratedMap, GenerationConfig,
    GenerationMethod, Tile,
};

fn generate(config: &GenerationConfig) -> GeneratedMap {
    let generator = create_generator(config.method);
    let mut rng = utils::create_rng(config);
    generator.generate(config, &mut rng)
}

/// Core dungeon guarantee: stairs and all room interiors share one
/// walkable component.
#[test]
fn test_dungeon_stairs_and_rooms_connected() {
    for seed in 0..20 {
        let config = GenerationConfig::for_testing(seed);
        let map = generate(&config);

        let up = map.stairs_up.expect("dungeon should place up stairs");
        let down = map.stairs_down.expect("dungeon should place down stairs");
        assert_eq!(map.grid.get(up.x, up.y), Tile::StairsUp);
        assert_eq!(map.grid.get(down.x, down.y), Tile::StairsDown);

        let reached = flood_fill(&map.grid, up, Tile::is_walkable);
        assert!(
            reached.contains(&down),
            "seed {}: down stairs unreachable from up stairs",
            seed
        );

        for (i, room) in map.rooms.iter().enumerate() {
            let connected = room
                .interior_positions()
                .into_iter()
                .filter(|p| map.grid.get(p.x, p.y).is_walkable())
                .any(|p| reached.contains(&p));
            assert!(connected, "seed {}: room {} unreachable from up stairs", seed, i);
        }
    }
}

/// Doors only appear on the perimeter of rooms flagged as door rooms.
#[test]
fn test_dungeon_doors_belong_to_door_rooms() {
    for seed in 0..10 {
        let config = GenerationConfig::for_testing(seed);
        let map = generate(&config);

        for pos in map.grid.positions_of(Tile::Door) {
            let owned = map.door_rooms.iter().any(|&i| {
                map.rooms[i]
                    .perimeter_positions()
                    .iter()
                    .any(|&p| p == pos)
            });
            assert!(owned, "seed {}: door at {:?} outside any door room", seed, pos);
        }
    }
}

/// Caves contain exactly one walkable region even on large maps.
#[test]
fn test_cave_single_region() {
    for seed in [3, 77, 4096] {
        let mut config = GenerationConfig::new(seed);
        config.method = GenerationMethod::CellularAutomata;
        config.resource_density = 0.0;
        let map = generate(&config);

        let walkable: Vec<_> = map
            .grid
            .positions()
            .filter(|p| map.grid.get(p.x, p.y).is_walkable())
            .collect();
        assert!(!walkable.is_empty(), "seed {}: cave has no open space", seed);

        let reached = flood_fill(&map.grid, walkable[0], Tile::is_walkable);
        assert_eq!(
            reached.len(),
            walkable.len(),
            "seed {}: cave walkable area is split",
            seed
        );
    }
}

/// Town buildings are all enterable from the road network.
#[test]
fn test_town_buildings_reachable_from_roads() {
    for seed in 0..6 {
        let mut config = GenerationConfig::new(seed);
        config.method = GenerationMethod::Town;
        config.width = 60;
        config.height = 40;
        config.max_rooms = 8;
        config.resource_density = 0.0;
        let map = generate(&config);

        assert!(!map.rooms.is_empty(), "seed {}: town placed no buildings", seed);

        // Any floor tile outside every building lies on the road network.
        let road = map
            .grid
            .positions_of(Tile::Floor)
            .into_iter()
            .find(|p| map.rooms.iter().all(|b| !b.contains(p.x, p.y)))
            .expect("town should have road tiles");

        let reached = flood_fill(&map.grid, road, Tile::is_walkable);
        for (i, building) in map.rooms.iter().enumerate() {
            let enterable = building
                .interior_positions()
                .into_iter()
                .any(|p| reached.contains(&p));
            assert!(enterable, "seed {}: building {} not reachable from roads", seed, i);
        }
    }
}

/// Resource nodes never break the single walkable component.
#[test]
fn test_resources_do_not_sever_connectivity() {
    let mut config = GenerationConfig::for_testing(11);
    config.resource_density = 8.0;
    let map = generate(&config);

    let nodes = map
        .grid
        .positions()
        .filter(|p| matches!(map.grid.get(p.x, p.y), Tile::Resource(_)))
        .count();
    assert!(nodes > 0, "high density should place at least one node");

    let up = map.stairs_up.expect("stairs up");
    let reached = flood_fill(&map.grid, up, Tile::is_walkable);
    let walkable = map
        .grid
        .positions()
        .filter(|p| map.grid.get(p.x, p.y).is_walkable())
        .count();
    assert_eq!(reached.len(), walkable);
}

/// Identical configurations always yield identical maps.
#[test]
fn test_generation_is_deterministic_across_runs() {
    for method in ["dungeon", "cave", "town"] {
        let mut config = GenerationConfig::new(987);
        config.method = method.parse().unwrap();
        let a = generate(&config);
        let b = generate(&config);
        assert_eq!(a.grid, b.grid, "{} generation diverged for equal configs", method);
        assert_eq!(a.stairs_up, b.stairs_up);
        assert_eq!(a.stairs_down, b.stairs_down);
    }
}
