//! # Generation Module
//!
//! Procedural map generation: configuration, the generator trait, and the
//! three concrete algorithms (dungeon, cave, town).
//!
//! Every generator consumes a read-only [`GenerationConfig`] plus a seeded
//! RNG and produces a [`GeneratedMap`]. Generation is infallible by design:
//! transient failures (too few rooms, disconnected layouts) are retried
//! internally, and an exhausted retry budget falls back to a deterministic
//! always-connected layout. Callers never receive an unplayable map.

pub mod cave;
pub mod connectivity;
pub mod corridor;
pub mod dungeon;
pub mod factory;
pub mod room;
pub mod town;

pub use cave::*;
pub use corridor::*;
pub use dungeon::*;
pub use factory::*;
pub use room::*;
pub use town::*;

use crate::{DelveError, Grid, Position, ResourceKind, Tile};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Map generation algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationMethod {
    /// Rooms connected by corridors
    RoomsAndCorridors,
    /// Cellular-automata caves
    CellularAutomata,
    /// Road grid with buildings
    Town,
}

impl FromStr for GenerationMethod {
    type Err = DelveError;

    /// Parses a method name from untrusted input (CLI flags, config files).
    ///
    /// An unrecognized name is the one fatal configuration error this crate
    /// surfaces.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dungeon" | "rooms" | "rooms_and_corridors" => Ok(Self::RoomsAndCorridors),
            "cave" | "cellular_automata" => Ok(Self::CellularAutomata),
            "town" => Ok(Self::Town),
            other => Err(DelveError::UnknownMethod(other.to_string())),
        }
    }
}

/// Configuration for map generation.
///
/// Read-only input to every generator: an attempt never mutates its config.
/// The documented transient corridor widening during connectivity repair is
/// expressed as an explicit width argument to the carve calls instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Random seed for reproducible generation
    pub seed: u64,
    /// Map width in tiles
    pub width: i32,
    /// Map height in tiles
    pub height: i32,
    /// Minimum room dimension
    pub min_room_size: i32,
    /// Maximum room dimension
    pub max_room_size: i32,
    /// Maximum rooms (or town buildings) per map
    pub max_rooms: u32,
    /// Which algorithm to run
    pub method: GenerationMethod,

    /// Cave: probability an interior cell starts as wall
    pub initial_density: f64,
    /// Cave: cellular-automata smoothing rounds
    pub smoothing_iterations: u32,

    /// Town: width of the primary roads
    pub road_width: i32,
    /// Town: clearance kept between buildings and the map edge
    pub building_padding: i32,

    /// Whether diagonal corridors may be carved at all
    pub diagonal_corridors: bool,
    /// Probability a carved corridor is diagonal rather than L-shaped
    pub diagonal_chance: f64,
    /// Width of ordinary corridors
    pub corridor_width: i32,

    /// Resource nodes per 100 floor tiles
    pub resource_density: f64,
}

impl GenerationConfig {
    /// Creates a default configuration with the given seed.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::GenerationConfig;
    ///
    /// let config = GenerationConfig::new(42);
    /// assert!(config.min_room_size >= 3);
    /// assert!(config.max_room_size >= config.min_room_size);
    /// ```
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            width: crate::config::DEFAULT_MAP_WIDTH,
            height: crate::config::DEFAULT_MAP_HEIGHT,
            min_room_size: 4,
            max_room_size: 12,
            max_rooms: 20,
            method: GenerationMethod::RoomsAndCorridors,
            initial_density: 0.45,
            smoothing_iterations: 5,
            road_width: 3,
            building_padding: 2,
            diagonal_corridors: true,
            diagonal_chance: 0.5,
            corridor_width: 1,
            resource_density: 1.0,
        }
    }

    /// Creates a depth-scaled configuration for level `depth`.
    ///
    /// Deeper levels get more and larger rooms, a higher diagonal-corridor
    /// chance, slightly more open caves, and richer resource scatter. Depth 1
    /// is always a town and every 5th depth is a cave.
    pub fn for_depth(seed: u64, width: i32, height: i32, depth: u32) -> Self {
        let depth_i = depth as i32;
        let mut config = Self {
            seed,
            width,
            height,
            min_room_size: 4,
            max_room_size: (12 + depth_i / 3).min(20),
            max_rooms: (10 + depth * 2).min(30),
            method: GenerationMethod::RoomsAndCorridors,
            initial_density: 0.45,
            smoothing_iterations: 5,
            road_width: 3,
            building_padding: 2,
            diagonal_corridors: depth > 2,
            diagonal_chance: (0.3 + depth as f64 * 0.05).min(0.7),
            corridor_width: 1,
            resource_density: 1.0 + depth as f64 * 0.2,
        };

        if depth == 1 {
            config.method = GenerationMethod::Town;
        } else if depth % 5 == 0 {
            config.method = GenerationMethod::CellularAutomata;
            config.initial_density = 0.45 - depth as f64 * 0.01;
        }

        config
    }

    /// Creates a small configuration for tests.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            seed,
            width: 40,
            height: 25,
            min_room_size: 4,
            max_room_size: 8,
            max_rooms: 6,
            method: GenerationMethod::RoomsAndCorridors,
            initial_density: 0.45,
            smoothing_iterations: 3,
            road_width: 3,
            building_padding: 2,
            diagonal_corridors: false,
            diagonal_chance: 0.0,
            corridor_width: 1,
            resource_density: 0.0,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Output of a single generation run.
///
/// The grid plus the side-channel metadata collaborators need: the placed
/// room/building list, the subset of rooms that received doors, and the
/// cached stairs positions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedMap {
    /// The finished tile grid
    pub grid: Grid,
    /// Rooms (dungeon) or buildings (town); empty for caves
    pub rooms: Vec<Room>,
    /// Indices into `rooms` for rooms that received doors
    pub door_rooms: Vec<usize>,
    /// Position of the up staircase, if one was placed
    pub stairs_up: Option<Position>,
    /// Position of the down staircase, if one was placed
    pub stairs_down: Option<Position>,
}

impl GeneratedMap {
    /// Wraps a grid with empty metadata.
    pub fn new(grid: Grid) -> Self {
        Self {
            grid,
            rooms: Vec::new(),
            door_rooms: Vec::new(),
            stairs_up: None,
            stairs_down: None,
        }
    }
}

/// Trait implemented by each concrete map generator.
///
/// `generate` must terminate with a non-empty, fully connected map: bounded
/// retries plus a deterministic fallback make it infallible from the
/// caller's perspective.
pub trait MapGenerator {
    /// Generates a map using the provided configuration and seeded RNG.
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> GeneratedMap;

    /// Generator name for logging and diagnostics.
    fn kind(&self) -> &'static str;
}

/// Shared helpers for generation algorithms.
pub mod utils {
    use super::*;
    use rand::{Rng, SeedableRng};

    /// Creates the seeded RNG for a generation run.
    pub fn create_rng(config: &GenerationConfig) -> StdRng {
        StdRng::seed_from_u64(config.seed)
    }

    /// Scatters resource tiles over plain floor.
    ///
    /// Places `density` nodes per 100 floor tiles, drawing kinds uniformly
    /// from `kinds`. Doors, stairs, and features are never overwritten, and
    /// a placement that would sever the walkable area (a node blocking a
    /// one-tile corridor) is reverted, preserving the generators'
    /// full-connectivity guarantee.
    pub fn place_resources(
        grid: &mut Grid,
        rng: &mut StdRng,
        density: f64,
        kinds: &[ResourceKind],
    ) {
        if density <= 0.0 || kinds.is_empty() {
            return;
        }
        let floor: Vec<Position> = grid.positions_of(Tile::Floor);
        if floor.is_empty() {
            return;
        }
        let count = ((floor.len() as f64 * density) / 100.0).round() as usize;
        for _ in 0..count {
            let pos = floor[rng.gen_range(0..floor.len())];
            // Re-check: an earlier draw may already occupy this tile.
            if grid.get(pos.x, pos.y) != Tile::Floor {
                continue;
            }
            let kind = kinds[rng.gen_range(0..kinds.len())];
            grid.set(pos.x, pos.y, Tile::Resource(kind));
            if !walkable_is_connected(grid) {
                grid.set(pos.x, pos.y, Tile::Floor);
            }
        }
    }

    /// Whether all walkable tiles form one connected component.
    fn walkable_is_connected(grid: &Grid) -> bool {
        let walkable: Vec<Position> = grid
            .positions()
            .filter(|p| grid.get(p.x, p.y).is_walkable())
            .collect();
        let Some(&start) = walkable.first() else {
            return true;
        };
        let reached = crate::connectivity::flood_fill(grid, start, Tile::is_walkable);
        reached.len() == walkable.len()
    }
}
