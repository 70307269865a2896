//! # Town Generation
//!
//! Road-grid towns: a primary road cross with subdivision and perimeter
//! roads, walled buildings with doors onto the road network, and a repair
//! pass that reconnects any district a later building walled off.

use crate::{
    config::MAX_REPAIR_ITERATIONS, connectivity, CorridorCarver, GeneratedMap, GenerationConfig,
    Grid, MapGenerator, Position, Room, Tile,
};
use log::debug;
use rand::{rngs::StdRng, seq::SliceRandom, Rng};

/// Building placement attempts before giving up on further buildings.
const MAX_BUILDING_ATTEMPTS: u32 = 100;

/// Minimum Manhattan separation between doors of the same building.
const MIN_DOOR_SEPARATION: i32 = 3;

/// Closest-pair repair searches sample at most this many tiles per region.
/// A deliberate approximation: repair corridors may run longer than optimal,
/// but connectedness is unaffected.
const REGION_SAMPLE_LIMIT: usize = 100;

/// Tiles a walker can traverse in a town.
fn passable(tile: Tile) -> bool {
    matches!(
        tile,
        Tile::Floor | Tile::Door | Tile::Altar | Tile::StairsUp | Tile::StairsDown
    )
}

/// Road-grid town generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct TownGenerator;

impl TownGenerator {
    /// Creates a new town generator.
    pub fn new() -> Self {
        Self
    }

    /// Carves the road network: a primary cross at `road_width`, two 1-tile
    /// subdivision roads per axis, and a 1-tile perimeter road so edge
    /// buildings can always connect.
    fn carve_roads(&self, grid: &mut Grid, config: &GenerationConfig) {
        let half = config.road_width / 2;
        let mid_x = config.width / 2;
        let mid_y = config.height / 2;

        for y in (mid_y - half)..=(mid_y + half) {
            for x in 0..config.width {
                grid.set(x, y, Tile::Floor);
            }
        }
        for x in (mid_x - half)..=(mid_x + half) {
            for y in 0..config.height {
                grid.set(x, y, Tile::Floor);
            }
        }

        // Subdivision roads at the third lines of each axis.
        for frac in [1, 2] {
            let x = config.width * frac / 3;
            for y in 0..config.height {
                grid.set(x, y, Tile::Floor);
            }
            let y = config.height * frac / 3;
            for x in 0..config.width {
                grid.set(x, y, Tile::Floor);
            }
        }

        // Perimeter road, one tile in from the border.
        for x in 1..(config.width - 1) {
            grid.set(x, 1, Tile::Floor);
            grid.set(x, config.height - 2, Tile::Floor);
        }
        for y in 1..(config.height - 1) {
            grid.set(1, y, Tile::Floor);
            grid.set(config.width - 2, y, Tile::Floor);
        }
    }

    /// Places up to `max_rooms` buildings near roads.
    ///
    /// A candidate is rejected when it overlaps an existing building or has
    /// no road tile anywhere in the one-tile halo around its footprint.
    fn place_buildings(
        &self,
        grid: &mut Grid,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> Vec<Room> {
        let mut buildings: Vec<Room> = Vec::new();
        let pad = config.building_padding.max(2);

        let mut attempts = 0;
        while buildings.len() < config.max_rooms as usize && attempts < MAX_BUILDING_ATTEMPTS {
            attempts += 1;

            let w = rng.gen_range(config.min_room_size + 2..=config.max_room_size + 2);
            let h = rng.gen_range(config.min_room_size + 2..=config.max_room_size + 2);
            if config.width - w - pad <= pad || config.height - h - pad <= pad {
                continue;
            }
            let x = rng.gen_range(pad..config.width - w - pad);
            let y = rng.gen_range(pad..config.height - h - pad);
            let building = Room::new(x, y, w, h);

            if buildings.iter().any(|b| building.intersects(b)) {
                continue;
            }
            if !self.touches_road(grid, &building) {
                continue;
            }

            self.carve_building(grid, &building);
            buildings.push(building);
        }

        buildings
    }

    /// Whether any tile in the one-tile halo around the footprint is road.
    fn touches_road(&self, grid: &Grid, building: &Room) -> bool {
        for y in (building.y - 1)..=(building.y + building.height) {
            for x in (building.x - 1)..=(building.x + building.width) {
                if !building.contains(x, y) && grid.get(x, y) == Tile::Floor {
                    return true;
                }
            }
        }
        false
    }

    /// Stamps the building: full wall footprint, then floored interior.
    fn carve_building(&self, grid: &mut Grid, building: &Room) {
        for y in building.y..(building.y + building.height) {
            for x in building.x..(building.x + building.width) {
                grid.set(x, y, Tile::Wall);
            }
        }
        for pos in building.interior_positions() {
            grid.set(pos.x, pos.y, Tile::Floor);
        }
    }

    /// Door candidates along one building side: wall tiles (corners
    /// excluded) whose interior neighbor is floor and whose exterior
    /// neighbor is road outside every building.
    fn side_candidates(
        &self,
        grid: &Grid,
        building: &Room,
        buildings: &[Room],
        side: usize,
    ) -> Vec<Position> {
        let mut candidates = Vec::new();
        let (x0, y0, w, h) = (building.x, building.y, building.width, building.height);

        let mut check = |door: Position, outside: Position, inside: Position| {
            if grid.get(inside.x, inside.y) == Tile::Floor
                && grid.get(outside.x, outside.y) == Tile::Floor
                && !buildings.iter().any(|b| b.contains(outside.x, outside.y))
            {
                candidates.push(door);
            }
        };

        match side {
            0 => {
                for x in (x0 + 1)..(x0 + w - 1) {
                    check(
                        Position::new(x, y0),
                        Position::new(x, y0 - 1),
                        Position::new(x, y0 + 1),
                    );
                }
            }
            1 => {
                for x in (x0 + 1)..(x0 + w - 1) {
                    check(
                        Position::new(x, y0 + h - 1),
                        Position::new(x, y0 + h),
                        Position::new(x, y0 + h - 2),
                    );
                }
            }
            2 => {
                for y in (y0 + 1)..(y0 + h - 1) {
                    check(
                        Position::new(x0, y),
                        Position::new(x0 - 1, y),
                        Position::new(x0 + 1, y),
                    );
                }
            }
            _ => {
                for y in (y0 + 1)..(y0 + h - 1) {
                    check(
                        Position::new(x0 + w - 1, y),
                        Position::new(x0 + w - 2, y),
                        Position::new(x0 + w, y),
                    );
                }
            }
        }

        candidates
    }

    /// Attempts 2–3 doors on distinct sides of one building, keeping
    /// same-building doors separated; forces a single door toward the
    /// nearest road when every candidate fails.
    fn place_building_doors(
        &self,
        grid: &mut Grid,
        building: &Room,
        buildings: &[Room],
        rng: &mut StdRng,
    ) {
        let target = rng.gen_range(2..=3usize);
        let mut sides = [0usize, 1, 2, 3];
        sides.shuffle(rng);

        let mut placed: Vec<Position> = Vec::new();
        for &side in &sides {
            if placed.len() >= target {
                break;
            }
            let candidates: Vec<Position> = self
                .side_candidates(grid, building, buildings, side)
                .into_iter()
                .filter(|c| {
                    placed
                        .iter()
                        .all(|d| d.manhattan_distance(*c) >= MIN_DOOR_SEPARATION)
                })
                .collect();
            if let Some(&pos) = candidates.get(rng.gen_range(0..candidates.len().max(1))) {
                grid.set(pos.x, pos.y, Tile::Door);
                placed.push(pos);
            }
        }

        if placed.is_empty() {
            self.force_door(grid, building, buildings);
        }
    }

    /// Forces one door on the side facing the nearest road tile.
    ///
    /// The building may still be sealed off from that road by neighboring
    /// walls; the repair pass reconnects it.
    fn force_door(&self, grid: &mut Grid, building: &Room, buildings: &[Room]) {
        let center = building.center();
        let mut nearest: Option<(i32, Position)> = None;
        for pos in grid.positions() {
            if grid.get(pos.x, pos.y) == Tile::Floor
                && !buildings.iter().any(|b| b.contains(pos.x, pos.y))
            {
                let dist = center.manhattan_distance(pos);
                if nearest.map_or(true, |(d, _)| dist < d) {
                    nearest = Some((dist, pos));
                }
            }
        }
        let Some((_, road)) = nearest else {
            return;
        };

        let door = if (road.x - center.x).abs() > (road.y - center.y).abs() {
            if road.x < center.x {
                Position::new(building.x, building.y + building.height / 2)
            } else {
                Position::new(building.x + building.width - 1, building.y + building.height / 2)
            }
        } else if road.y < center.y {
            Position::new(building.x + building.width / 2, building.y)
        } else {
            Position::new(building.x + building.width / 2, building.y + building.height - 1)
        };
        grid.set(door.x, door.y, Tile::Door);
    }

    /// Reconnects every passable region to the primary (largest) one.
    ///
    /// Closest-pair search samples only the first [`REGION_SAMPLE_LIMIT`]
    /// tiles of each region, then carves an L-shaped path between the pair.
    fn repair_regions(&self, grid: &mut Grid, rng: &mut StdRng) {
        for _ in 0..MAX_REPAIR_ITERATIONS {
            let mut regions = connectivity::regions(grid, passable);
            if regions.len() <= 1 {
                return;
            }
            debug!("town repair: {} disjoint regions", regions.len());

            let primary_idx = regions
                .iter()
                .enumerate()
                .max_by_key(|(_, r)| r.len())
                .map(|(i, _)| i)
                .unwrap_or(0);
            let primary = regions.swap_remove(primary_idx);
            let primary_sample = &primary[..primary.len().min(REGION_SAMPLE_LIMIT)];

            for region in &regions {
                let sample = &region[..region.len().min(REGION_SAMPLE_LIMIT)];
                let mut best: Option<(i32, Position, Position)> = None;
                for &a in primary_sample {
                    for &b in sample {
                        let dist = a.manhattan_distance(b);
                        if best.map_or(true, |(d, _, _)| dist < d) {
                            best = Some((dist, a, b));
                        }
                    }
                }
                if let Some((_, a, b)) = best {
                    CorridorCarver::carve_simple(grid, a, b, 1, rng);
                }
            }
        }
    }

    /// Places the altar in the median building and the stairs in the first
    /// and last buildings, then re-stamps the border as wall.
    fn place_features(
        &self,
        grid: &mut Grid,
        buildings: &[Room],
        config: &GenerationConfig,
    ) -> (Option<Position>, Option<Position>) {
        let mut stairs_up = None;
        let mut stairs_down = None;

        if let Some(median) = buildings.get(buildings.len() / 2) {
            let c = median.center();
            grid.set(c.x, c.y, Tile::Altar);
        }

        if buildings.len() >= 2 {
            let first = &buildings[0];
            let down = self.feature_anchor(grid, first);
            if let Some(pos) = down {
                grid.set(pos.x, pos.y, Tile::StairsDown);
                stairs_down = Some(pos);
            }

            let last = &buildings[buildings.len() - 1];
            let up = self.feature_anchor(grid, last);
            if let Some(pos) = up {
                grid.set(pos.x, pos.y, Tile::StairsUp);
                stairs_up = Some(pos);
            }
        } else if let Some(only) = buildings.first() {
            // One building hosts both stairs in opposite corners.
            let down = Position::new(only.x + 1, only.y + 1);
            let up = Position::new(only.x + only.width - 2, only.y + only.height - 2);
            grid.set(down.x, down.y, Tile::StairsDown);
            grid.set(up.x, up.y, Tile::StairsUp);
            stairs_down = Some(down);
            stairs_up = Some(up);
        }

        // Stray perimeter-road carving can leave floor on the border.
        for x in 0..config.width {
            grid.set(x, 0, Tile::Wall);
            grid.set(x, config.height - 1, Tile::Wall);
        }
        for y in 0..config.height {
            grid.set(0, y, Tile::Wall);
            grid.set(config.width - 1, y, Tile::Wall);
        }

        (stairs_up, stairs_down)
    }

    /// Building center when it is plain floor, else the first interior
    /// floor tile (the altar may already occupy the center).
    fn feature_anchor(&self, grid: &Grid, building: &Room) -> Option<Position> {
        let center = building.center();
        if grid.get(center.x, center.y) == Tile::Floor {
            return Some(center);
        }
        building
            .interior_positions()
            .into_iter()
            .find(|p| grid.get(p.x, p.y) == Tile::Floor)
    }
}

impl MapGenerator for TownGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> GeneratedMap {
        let mut grid = Grid::new(config.width, config.height, Tile::Wall);

        self.carve_roads(&mut grid, config);
        let buildings = self.place_buildings(&mut grid, config, rng);
        for building in &buildings {
            self.place_building_doors(&mut grid, building, &buildings, rng);
        }
        self.repair_regions(&mut grid, rng);
        let (stairs_up, stairs_down) = self.place_features(&mut grid, &buildings, config);

        let door_rooms = (0..buildings.len()).collect();
        GeneratedMap {
            grid,
            rooms: buildings,
            door_rooms,
            stairs_up,
            stairs_down,
        }
    }

    fn kind(&self) -> &'static str {
        "TownGenerator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::utils;
    use crate::GenerationMethod;

    fn town_config(seed: u64) -> GenerationConfig {
        let mut config = GenerationConfig::for_testing(seed);
        config.method = GenerationMethod::Town;
        config.width = 60;
        config.height = 40;
        config.max_rooms = 8;
        config
    }

    fn generate(seed: u64) -> GeneratedMap {
        let config = town_config(seed);
        let mut rng = utils::create_rng(&config);
        TownGenerator::new().generate(&config, &mut rng)
    }

    #[test]
    fn test_places_buildings() {
        for seed in 0..6 {
            let map = generate(seed);
            assert!(!map.rooms.is_empty(), "seed {seed}: no buildings placed");
        }
    }

    #[test]
    fn test_every_building_has_a_door() {
        for seed in 0..6 {
            let map = generate(seed);
            for (i, building) in map.rooms.iter().enumerate() {
                let doors = building
                    .perimeter_positions()
                    .iter()
                    .filter(|p| map.grid.get(p.x, p.y) == Tile::Door)
                    .count();
                assert!(doors >= 1, "seed {seed}: building {i} has no door");
            }
        }
    }

    #[test]
    fn test_passable_area_is_single_component() {
        for seed in 0..6 {
            let map = generate(seed);
            let regions = connectivity::regions(&map.grid, passable);
            assert_eq!(
                regions.len(),
                1,
                "seed {seed}: town split into {} regions",
                regions.len()
            );
        }
    }

    #[test]
    fn test_doors_reachable_from_road_network() {
        for seed in 0..6 {
            let map = generate(seed);
            // The primary road cross is outside every building at the map
            // midline edge region; start from any road tile.
            let road_start = map
                .grid
                .positions()
                .find(|p| {
                    map.grid.get(p.x, p.y) == Tile::Floor
                        && !map.rooms.iter().any(|b| b.contains(p.x, p.y))
                })
                .expect("town has road tiles");
            let reached = connectivity::flood_fill(&map.grid, road_start, passable);
            for door in map.grid.positions_of(Tile::Door) {
                assert!(
                    reached.contains(&door),
                    "seed {seed}: door {door:?} unreachable from roads"
                );
            }
        }
    }

    #[test]
    fn test_altar_and_stairs_placed() {
        for seed in 0..6 {
            let map = generate(seed);
            if map.rooms.len() >= 2 {
                assert_eq!(map.grid.positions_of(Tile::Altar).len(), 1, "seed {seed}");
                assert!(map.stairs_up.is_some(), "seed {seed}");
                assert!(map.stairs_down.is_some(), "seed {seed}");
            }
        }
    }

    #[test]
    fn test_border_is_wall() {
        let map = generate(2);
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
    fn test_deterministic_for_fixed_seed() {
        let a = generate(31);
        let b = generate(31);
        assert_eq!(a.grid, b.grid);
        assert_eq!(a.rooms, b.rooms);
    }
}
