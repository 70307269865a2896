//! # Dungeon Generation
//!
//! Rooms-and-corridors dungeon layout with a bounded retry loop and a
//! deterministic always-connected fallback.
//!
//! A single attempt places non-overlapping rooms, links them with a greedy
//! nearest-neighbor spanning strategy, places doors, and validates full
//! connectivity with a flood fill. Attempts that fail validation are
//! discarded and retried; when the retry budget is exhausted a fixed 3×3
//! room layout is emitted instead, so the caller never receives a
//! disconnected map.

use crate::{
    config::{MAX_GENERATION_ATTEMPTS, MAX_REPAIR_ITERATIONS, REPAIR_CORRIDOR_WIDTH},
    connectivity, CorridorCarver, GeneratedMap, GenerationConfig, Grid, MapGenerator, Position,
    ResourceKind, Room, Tile,
};
use log::{debug, warn};
use rand::{rngs::StdRng, Rng};

/// Probability that a placed room is flagged for door placement.
const DOOR_ROOM_CHANCE: f64 = 0.2;

/// Minimum center distance for an extra loop-making corridor.
const EXTRA_LINK_MIN_DISTANCE: i32 = 15;

/// Resource kinds scattered in dungeons.
const DUNGEON_RESOURCES: &[ResourceKind] = &[
    ResourceKind::Stone,
    ResourceKind::Ore,
    ResourceKind::Wood,
    ResourceKind::Herbs,
];

/// Tiles a walker can traverse during dungeon validation.
fn passable(tile: Tile) -> bool {
    matches!(tile, Tile::Floor | Tile::Door)
}

/// Rooms-and-corridors dungeon generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct DungeonGenerator;

impl DungeonGenerator {
    /// Creates a new dungeon generator.
    pub fn new() -> Self {
        Self
    }

    /// Runs one randomized attempt; `None` means the attempt failed
    /// validation and the caller should retry.
    fn attempt(&self, config: &GenerationConfig, rng: &mut StdRng) -> Option<GeneratedMap> {
        let mut grid = Grid::new(config.width, config.height, Tile::Wall);

        let (rooms, door_rooms) = self.place_rooms(&mut grid, config, rng);
        if rooms.len() < 2 {
            debug!("attempt placed {} rooms, need at least 2", rooms.len());
            return None;
        }

        self.connect_rooms(&mut grid, &rooms, config, rng);
        self.anchor_room_centers(&mut grid, &rooms, rng);
        self.place_doors(&mut grid, &rooms, &door_rooms, rng);

        if !self.repair_connectivity(&mut grid, &rooms, rng) {
            debug!("attempt still disconnected after repair budget");
            return None;
        }

        let (stairs_up, stairs_down) = self.place_stairs(&mut grid, &rooms);
        crate::generation::utils::place_resources(
            &mut grid,
            rng,
            config.resource_density,
            DUNGEON_RESOURCES,
        );

        Some(GeneratedMap {
            grid,
            rooms,
            door_rooms,
            stairs_up: Some(stairs_up),
            stairs_down: Some(stairs_down),
        })
    }

    /// Draws up to `max_rooms` random rooms, rejecting overlaps.
    ///
    /// Rooms keep a one-tile margin from the map edge. Returns the placed
    /// rooms plus the indices of rooms flagged for door placement.
    fn place_rooms(
        &self,
        grid: &mut Grid,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> (Vec<Room>, Vec<usize>) {
        let mut rooms: Vec<Room> = Vec::new();
        let mut door_rooms = Vec::new();

        for _ in 0..config.max_rooms {
            let w = rng.gen_range(config.min_room_size..=config.max_room_size);
            let h = rng.gen_range(config.min_room_size..=config.max_room_size);
            if config.width - w <= 2 || config.height - h <= 2 {
                continue;
            }
            let x = rng.gen_range(1..config.width - w);
            let y = rng.gen_range(1..config.height - h);
            let candidate = Room::new(x, y, w, h);

            if rooms.iter().any(|r| candidate.intersects(r)) {
                continue;
            }

            self.carve_room(grid, &candidate);
            if rng.gen_bool(DOOR_ROOM_CHANCE) {
                door_rooms.push(rooms.len());
            }
            rooms.push(candidate);
        }

        (rooms, door_rooms)
    }

    /// Floors the room interior, leaving its one-tile wall ring.
    fn carve_room(&self, grid: &mut Grid, room: &Room) {
        for pos in room.interior_positions() {
            grid.set(pos.x, pos.y, Tile::Floor);
        }
    }

    /// Links every room into one network.
    ///
    /// Greedy nearest-unconnected-to-connected linking over room centers (an
    /// approximate minimum spanning tree), then up to 3 extra corridors
    /// between distant room pairs so layouts grow loops.
    fn connect_rooms(
        &self,
        grid: &mut Grid,
        rooms: &[Room],
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) {
        let mut connected = vec![0usize];
        let mut unconnected: Vec<usize> = (1..rooms.len()).collect();

        while !unconnected.is_empty() {
            let mut best = (i32::MAX, 0usize, 0usize); // (dist, connected idx, unconnected slot)
            for &ci in &connected {
                let c = rooms[ci].center();
                for (slot, &ui) in unconnected.iter().enumerate() {
                    let dist = c.manhattan_distance(rooms[ui].center());
                    if dist < best.0 {
                        best = (dist, ci, slot);
                    }
                }
            }

            let ui = unconnected.remove(best.2);
            CorridorCarver::carve(
                grid,
                rooms[best.1].center(),
                rooms[ui].center(),
                config,
                config.corridor_width,
                rng,
            );
            connected.push(ui);
        }

        // Extra loop-making corridors between distant pairs.
        let extra = (rooms.len() / 4).min(3);
        for _ in 0..extra {
            if rooms.len() < 4 {
                break;
            }
            let a = rng.gen_range(0..rooms.len());
            let b = rng.gen_range(0..rooms.len());
            if a == b {
                continue;
            }
            let (ca, cb) = (rooms[a].center(), rooms[b].center());
            if ca.manhattan_distance(cb) > EXTRA_LINK_MIN_DISTANCE {
                CorridorCarver::carve(grid, ca, cb, config, config.corridor_width, rng);
            }
        }
    }

    /// Ensures each room's center is reachable floor.
    ///
    /// Centers are the corridor anchor points, and irregularly overwritten
    /// rooms can lose theirs; carve from the nearest interior floor tile to
    /// the center at the widened repair width.
    fn anchor_room_centers(&self, grid: &mut Grid, rooms: &[Room], rng: &mut StdRng) {
        for room in rooms {
            let center = room.center();
            if grid.get(center.x, center.y) == Tile::Floor {
                continue;
            }
            let nearest = room
                .interior_positions()
                .into_iter()
                .filter(|p| grid.get(p.x, p.y) == Tile::Floor)
                .min_by_key(|p| p.manhattan_distance(center));
            if let Some(from) = nearest {
                CorridorCarver::carve_simple(grid, from, center, REPAIR_CORRIDOR_WIDTH, rng);
            }
        }
    }

    /// Perimeter positions where a door could stand: exactly one
    /// room-interior floor neighbor and one exterior floor neighbor.
    fn door_candidates(&self, grid: &Grid, room: &Room) -> Vec<Position> {
        room.perimeter_positions()
            .into_iter()
            .filter(|pos| {
                let mut interior = 0;
                let mut exterior = 0;
                for n in pos.cardinal_neighbors() {
                    if grid.get(n.x, n.y) == Tile::Floor {
                        if room.contains(n.x, n.y) {
                            interior += 1;
                        } else {
                            exterior += 1;
                        }
                    }
                }
                interior == 1 && exterior == 1
            })
            .collect()
    }

    /// Places 1–2 doors on each flagged room.
    ///
    /// A room only receives doors when it has at least two distinct entry
    /// points, so a closed door can never seal off its only exit.
    fn place_doors(
        &self,
        grid: &mut Grid,
        rooms: &[Room],
        door_rooms: &[usize],
        rng: &mut StdRng,
    ) {
        for &idx in door_rooms {
            let room = &rooms[idx];
            let entry_points = room
                .perimeter_positions()
                .iter()
                .filter(|p| grid.get(p.x, p.y) == Tile::Floor)
                .count();
            if entry_points < 2 {
                continue;
            }

            let mut candidates = self.door_candidates(grid, room);
            if candidates.is_empty() {
                continue;
            }
            let door_count = rng.gen_range(1..=2usize).min(candidates.len());
            for _ in 0..door_count {
                let pick = rng.gen_range(0..candidates.len());
                let pos = candidates.swap_remove(pick);
                grid.set(pos.x, pos.y, Tile::Door);
            }
        }
    }

    /// Flood-fill validation plus bounded repair.
    ///
    /// While more than one room component exists, connects the two globally
    /// nearest rooms in different components with a widened corridor.
    /// Returns whether the map ends fully connected.
    fn repair_connectivity(&self, grid: &mut Grid, rooms: &[Room], rng: &mut StdRng) -> bool {
        for _ in 0..MAX_REPAIR_ITERATIONS {
            let components = connectivity::room_components(grid, rooms, passable);
            if components.len() <= 1 {
                return true;
            }

            let mut best: Option<(i32, usize, usize)> = None;
            for (i, comp_a) in components.iter().enumerate() {
                for comp_b in components.iter().skip(i + 1) {
                    for &ra in comp_a {
                        for &rb in comp_b {
                            let dist =
                                rooms[ra].center().manhattan_distance(rooms[rb].center());
                            if best.map_or(true, |(d, _, _)| dist < d) {
                                best = Some((dist, ra, rb));
                            }
                        }
                    }
                }
            }

            if let Some((_, ra, rb)) = best {
                debug!("repairing connectivity: linking rooms {ra} and {rb}");
                CorridorCarver::carve_simple(
                    grid,
                    rooms[ra].center(),
                    rooms[rb].center(),
                    REPAIR_CORRIDOR_WIDTH,
                    rng,
                );
            }
        }

        connectivity::room_components(grid, rooms, passable).len() <= 1
    }

    /// Places stairs in the first and last rooms of the connected ordering,
    /// preferring each room's center when it is floor.
    fn place_stairs(&self, grid: &mut Grid, rooms: &[Room]) -> (Position, Position) {
        let components = connectivity::room_components(grid, rooms, passable);
        let order = components.first().cloned().unwrap_or_default();
        let first = order.first().map_or(&rooms[0], |&i| &rooms[i]);
        let last = order.last().map_or(&rooms[rooms.len() - 1], |&i| &rooms[i]);

        let up = self.stairs_anchor(grid, first);
        grid.set(up.x, up.y, Tile::StairsUp);
        let down = self.stairs_anchor(grid, last);
        grid.set(down.x, down.y, Tile::StairsDown);
        (up, down)
    }

    /// Room center if it is floor, else the first interior floor tile found
    /// by scan, else the center regardless.
    fn stairs_anchor(&self, grid: &Grid, room: &Room) -> Position {
        let center = room.center();
        if grid.get(center.x, center.y) == Tile::Floor {
            return center;
        }
        room.interior_positions()
            .into_iter()
            .find(|p| grid.get(p.x, p.y) == Tile::Floor)
            .unwrap_or(center)
    }

    /// Deterministic fallback layout: a 3×3 grid of equal rooms on regular
    /// spacing, connected row-wise and column-wise.
    ///
    /// Connected by construction and independent of the RNG, so exhausted
    /// retries still hand the caller a playable map.
    pub fn fallback(config: &GenerationConfig) -> GeneratedMap {
        let mut grid = Grid::new(config.width, config.height, Tile::Wall);
        let cell_w = config.width / 3;
        let cell_h = config.height / 3;

        if cell_w < 5 || cell_h < 5 {
            // Map too small for the 3x3 layout: one open chamber.
            let room = Room::new(1, 1, config.width - 2, config.height - 2);
            for pos in room.interior_positions() {
                grid.set(pos.x, pos.y, Tile::Floor);
            }
            let up = Position::new(2, 2);
            let down = Position::new(config.width - 3, config.height - 3);
            grid.set(up.x, up.y, Tile::StairsUp);
            grid.set(down.x, down.y, Tile::StairsDown);
            return GeneratedMap {
                grid,
                rooms: vec![room],
                door_rooms: Vec::new(),
                stairs_up: Some(up),
                stairs_down: Some(down),
            };
        }

        let mut rooms = Vec::with_capacity(9);
        for gy in 0..3 {
            for gx in 0..3 {
                let room = Room::new(gx * cell_w + 1, gy * cell_h + 1, cell_w - 2, cell_h - 2);
                for pos in room.interior_positions() {
                    grid.set(pos.x, pos.y, Tile::Floor);
                }
                rooms.push(room);
            }
        }

        // Row-wise and column-wise straight corridors between neighbors;
        // rooms on a common row share a center y, likewise for columns.
        for gy in 0..3 {
            for gx in 0..2 {
                let a = rooms[gy * 3 + gx].center();
                let b = rooms[gy * 3 + gx + 1].center();
                CorridorCarver::carve_segment_horizontal(&mut grid, a.x, b.x, a.y, 1);
            }
        }
        for gx in 0..3 {
            for gy in 0..2 {
                let a = rooms[gy * 3 + gx].center();
                let b = rooms[(gy + 1) * 3 + gx].center();
                CorridorCarver::carve_segment_vertical(&mut grid, a.y, b.y, a.x, 1);
            }
        }

        let up = rooms[0].center();
        let down = rooms[8].center();
        grid.set(up.x, up.y, Tile::StairsUp);
        grid.set(down.x, down.y, Tile::StairsDown);

        GeneratedMap {
            grid,
            rooms,
            door_rooms: Vec::new(),
            stairs_up: Some(up),
            stairs_down: Some(down),
        }
    }
}

impl MapGenerator for DungeonGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> GeneratedMap {
        for attempt in 1..=MAX_GENERATION_ATTEMPTS {
            if let Some(map) = self.attempt(config, rng) {
                debug!("dungeon generated on attempt {attempt}");
                return map;
            }
        }

        warn!(
            "dungeon generation exhausted {} attempts, emitting fallback layout",
            MAX_GENERATION_ATTEMPTS
        );
        Self::fallback(config)
    }

    fn kind(&self) -> &'static str {
        "DungeonGenerator"
    }
}
