//! # Cave Generation
//!
//! Cellular-automata caves: random fill, neighbor-count smoothing, then
//! largest-region pruning so the floor always forms a single connected
//! component. Caves never contain doors.

use crate::{
    connectivity, GeneratedMap, GenerationConfig, Grid, MapGenerator, Position, ResourceKind,
    Tile,
};
use log::debug;
use rand::{rngs::StdRng, Rng};

/// Resource kinds scattered in caves; mining country.
const CAVE_RESOURCES: &[ResourceKind] = &[
    ResourceKind::Ore,
    ResourceKind::Crystal,
    ResourceKind::Stone,
    ResourceKind::Essence,
];

/// Cellular-automata cave generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaveGenerator;

impl CaveGenerator {
    /// Creates a new cave generator.
    pub fn new() -> Self {
        Self
    }

    /// Random initial fill: forced border wall, interior wall with
    /// probability `initial_density`.
    fn randomize(&self, grid: &mut Grid, config: &GenerationConfig, rng: &mut StdRng) {
        let density = config.initial_density.clamp(0.0, 1.0);
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                let border =
                    x == 0 || y == 0 || x == grid.width() - 1 || y == grid.height() - 1;
                let tile = if border || rng.gen_bool(density) {
                    Tile::Wall
                } else {
                    Tile::Floor
                };
                grid.set(x, y, tile);
            }
        }
    }

    /// One smoothing round into a fresh buffer: a cell becomes wall when at
    /// least 5 of its 8 neighbors are wall (out of bounds counts as wall).
    fn smooth(&self, grid: &Grid) -> Grid {
        let mut next = Grid::new(grid.width(), grid.height(), Tile::Wall);
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                let tile = if grid.wall_neighbors(x, y) >= 5 {
                    Tile::Wall
                } else {
                    Tile::Floor
                };
                next.set(x, y, tile);
            }
        }
        next
    }

    /// Keeps only the largest connected floor region, converting every other
    /// region to wall. Queue-based fill throughout; a fully walled grid is
    /// left untouched.
    fn prune_to_largest_region(&self, grid: &mut Grid) {
        let regions = connectivity::regions(grid, |t| t == Tile::Floor);
        let Some(largest) = regions.iter().enumerate().max_by_key(|(_, r)| r.len()) else {
            return;
        };
        let keep = largest.0;
        debug!(
            "cave pruning: keeping region of {} tiles, discarding {} smaller regions",
            regions[keep].len(),
            regions.len() - 1
        );
        for (i, region) in regions.iter().enumerate() {
            if i == keep {
                continue;
            }
            for pos in region {
                grid.set(pos.x, pos.y, Tile::Wall);
            }
        }
    }

    /// StairsUp at a random floor tile; StairsDown at the floor tile of
    /// maximum Manhattan distance from it. A cave with fewer than two floor
    /// tiles gets no stairs.
    fn place_stairs(
        &self,
        grid: &mut Grid,
        rng: &mut StdRng,
    ) -> (Option<Position>, Option<Position>) {
        let floor = grid.positions_of(Tile::Floor);
        if floor.len() < 2 {
            return (None, None);
        }

        let up = floor[rng.gen_range(0..floor.len())];
        let down = floor
            .iter()
            .copied()
            .max_by_key(|p| p.manhattan_distance(up))
            .unwrap_or(up);

        grid.set(up.x, up.y, Tile::StairsUp);
        grid.set(down.x, down.y, Tile::StairsDown);
        (Some(up), Some(down))
    }
}

impl MapGenerator for CaveGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> GeneratedMap {
        let mut grid = Grid::new(config.width, config.height, Tile::Wall);
        self.randomize(&mut grid, config, rng);

        for _ in 0..config.smoothing_iterations {
            grid = self.smooth(&grid);
        }

        self.prune_to_largest_region(&mut grid);
        let (stairs_up, stairs_down) = self.place_stairs(&mut grid, rng);
        crate::generation::utils::place_resources(
            &mut grid,
            rng,
            config.resource_density,
            CAVE_RESOURCES,
        );

        GeneratedMap {
            grid,
            rooms: Vec::new(),
            door_rooms: Vec::new(),
            stairs_up,
            stairs_down,
        }
    }

    fn kind(&self) -> &'static str {
        "CaveGenerator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::utils;

    fn cave_config(seed: u64) -> GenerationConfig {
        let mut config = GenerationConfig::for_testing(seed);
        config.method = crate::GenerationMethod::CellularAutomata;
        config.width = 50;
        config.height = 35;
        config
    }

    fn generate(seed: u64) -> GeneratedMap {
        let config = cave_config(seed);
        let mut rng = utils::create_rng(&config);
        CaveGenerator::new().generate(&config, &mut rng)
    }

    #[test]
    fn test_caves_never_contain_doors() {
        for seed in 0..10 {
            let map = generate(seed);
            assert!(
                map.grid.positions_of(Tile::Door).is_empty(),
                "seed {seed}: cave contains a door"
            );
        }
    }

    #[test]
    fn test_floor_is_single_component() {
        for seed in 0..10 {
            let map = generate(seed);
            let regions = connectivity::regions(&map.grid, |t| {
                matches!(t, Tile::Floor | Tile::StairsUp | Tile::StairsDown)
            });
            assert!(
                regions.len() <= 1,
                "seed {seed}: cave floor split into {} regions",
                regions.len()
            );
        }
    }

    #[test]
    fn test_border_is_wall() {
        let map = generate(3);
        let grid = &map.grid;
        for x in 0..grid.width() {
            assert_eq!(grid.get(x, 0), Tile::Wall);
            assert_eq!(grid.get(x, grid.height() - 1), Tile::Wall);
        }
        for y in 0..grid.height() {
            assert_eq!(grid.get(0, y), Tile::Wall);
            assert_eq!(grid.get(grid.width() - 1, y), Tile::Wall);
        }
    }

    #[test]
    fn test_stairs_connected_when_present() {
        for seed in 0..10 {
            let map = generate(seed);
            if let (Some(up), Some(down)) = (map.stairs_up, map.stairs_down) {
                let reached = connectivity::flood_fill(&map.grid, up, |t| {
                    matches!(t, Tile::Floor | Tile::StairsUp | Tile::StairsDown)
                });
                assert!(reached.contains(&down), "seed {seed}: stairs disconnected");
            }
        }
    }

    #[test]
    fn test_solid_fill_prunes_without_crashing() {
        let mut config = cave_config(9);
        config.initial_density = 1.0;
        config.smoothing_iterations = 0;
        let mut rng = utils::create_rng(&config);
        let map = CaveGenerator::new().generate(&config, &mut rng);

        // Everything starts wall, so the largest region is empty and no
        // stairs can be placed.
        assert!(map.grid.positions_of(Tile::Floor).is_empty());
        assert!(map.stairs_up.is_none());
        assert!(map.stairs_down.is_none());
    }

    #[test]
    fn test_fully_open_fill_keeps_interior() {
        let mut config = cave_config(4);
        config.initial_density = 0.0;
        config.smoothing_iterations = 0;
        config.resource_density = 0.0;
        let mut rng = utils::create_rng(&config);
        let map = CaveGenerator::new().generate(&config, &mut rng);

        // Interior is one open region; only the border stays wall.
        let open = map
            .grid
            .positions()
            .filter(|p| map.grid.get(p.x, p.y) != Tile::Wall)
            .count();
        let interior = ((config.width - 2) * (config.height - 2)) as usize;
        assert_eq!(open, interior);
    }

    #[test]
    fn test_deterministic_for_fixed_seed() {
        let a = generate(777);
        let b = generate(777);
        assert_eq!(a.grid, b.grid);
        assert_eq!(a.stairs_up, b.stairs_up);
    }
}
