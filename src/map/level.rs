//! # Level
//!
//! A frozen generation artifact: one depth's grid plus the metadata the
//! rest of the game reads. Collaborators treat a level as read-mostly; the
//! only permitted tile rewrites are opening a door and clearing a gathered
//! resource node.

use crate::{connectivity, GeneratedMap, Grid, Position, ResourceKind, Room, Tile};
use std::collections::HashMap;
use uuid::Uuid;

/// Unique identifier for entities and items placed on a level.
pub type EntityId = Uuid;

/// Creates a new unique entity ID.
pub fn new_entity_id() -> EntityId {
    Uuid::new_v4()
}

/// A single persisted dungeon level.
///
/// Created once per depth on first visit and reused for the whole session;
/// revisiting a depth never regenerates its map.
#[derive(Debug, Clone)]
pub struct Level {
    /// Depth index, increasing as the player descends
    pub depth: u32,
    grid: Grid,
    /// Rooms (or town buildings) the generator placed
    pub rooms: Vec<Room>,
    stairs_up: Option<Position>,
    stairs_down: Option<Position>,
    /// Entities currently standing on this level
    pub entities: HashMap<Position, EntityId>,
    /// Items lying on the floor
    pub items: HashMap<Position, Vec<EntityId>>,
    /// Where the player stood when last leaving this level
    pub last_player_pos: Option<Position>,
}

impl Level {
    /// Freezes a generated map into a level for the given depth.
    pub fn new(depth: u32, map: GeneratedMap) -> Self {
        Self {
            depth,
            grid: map.grid,
            rooms: map.rooms,
            stairs_up: map.stairs_up,
            stairs_down: map.stairs_down,
            entities: HashMap::new(),
            items: HashMap::new(),
            last_player_pos: None,
        }
    }

    /// Read access to the tile grid.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Tile at `(x, y)`; out of bounds reads as wall.
    pub fn get_tile(&self, x: i32, y: i32) -> Tile {
        self.grid.get(x, y)
    }

    /// Whether `(x, y)` lies on the level.
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        self.grid.in_bounds(x, y)
    }

    /// Cached up-stairs position.
    pub fn stairs_up(&self) -> Option<Position> {
        self.stairs_up
    }

    /// Cached down-stairs position.
    pub fn stairs_down(&self) -> Option<Position> {
        self.stairs_down
    }

    /// Whether `(x, y)` is the up staircase.
    pub fn is_stairs_up(&self, x: i32, y: i32) -> bool {
        self.grid.get(x, y) == Tile::StairsUp
    }

    /// Whether `(x, y)` is the down staircase.
    pub fn is_stairs_down(&self, x: i32, y: i32) -> bool {
        self.grid.get(x, y) == Tile::StairsDown
    }

    /// Removes the deepest level's down staircase so descent is bounded.
    pub(crate) fn seal_descent(&mut self) {
        if let Some(pos) = self.stairs_down.take() {
            self.grid.set(pos.x, pos.y, Tile::Floor);
        }
    }

    /// Removes the surface level's up staircase; there is nothing above.
    pub(crate) fn seal_ascent(&mut self) {
        if let Some(pos) = self.stairs_up.take() {
            self.grid.set(pos.x, pos.y, Tile::Floor);
        }
    }

    /// Spawn position when entering this level.
    ///
    /// Prefers the relevant staircase (up stairs when arriving from above),
    /// then the middle of the largest walkable region, then the first floor
    /// tile, then `(1, 1)` as a last resort.
    pub fn get_spawn_position(&self, from_above: bool) -> Position {
        let stairs = if from_above { self.stairs_up } else { self.stairs_down };
        if let Some(pos) = stairs {
            if self.grid.get(pos.x, pos.y).is_walkable() {
                return pos;
            }
        }

        let mut regions = connectivity::regions(&self.grid, Tile::is_walkable);
        regions.sort_by_key(|r| std::cmp::Reverse(r.len()));
        if let Some(largest) = regions.first() {
            return largest[largest.len() / 2];
        }

        self.grid
            .positions_of(Tile::Floor)
            .first()
            .copied()
            .unwrap_or(Position::new(1, 1))
    }

    /// Opens a door: the one door mutation collaborators may perform.
    ///
    /// Returns whether a door was present and opened.
    pub fn open_door(&mut self, x: i32, y: i32) -> bool {
        if self.grid.get(x, y) == Tile::Door {
            self.grid.set(x, y, Tile::Floor);
            true
        } else {
            false
        }
    }

    /// Clears a gathered resource node back to floor, returning its kind.
    pub fn remove_resource(&mut self, x: i32, y: i32) -> Option<ResourceKind> {
        match self.grid.get(x, y) {
            Tile::Resource(kind) => {
                self.grid.set(x, y, Tile::Floor);
                Some(kind)
            }
            _ => None,
        }
    }
}
