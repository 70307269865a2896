//! # Room Geometry
//!
//! Axis-aligned rectangles used for dungeon rooms and town buildings.

use crate::Position;
use serde::{Deserialize, Serialize};

/// A rectangular room or building footprint, walls included.
///
/// Immutable once placed: generators construct a `Room`, carve it into the
/// grid, and never resize it afterwards.
///
/// # Examples
///
/// ```
/// use delve::{Position, Room};
///
/// let room = Room::new(5, 5, 10, 8);
/// assert_eq!(room.center(), Position::new(10, 9));
/// assert!(room.contains(5, 5));
/// assert!(!room.contains(15, 5));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Room {
    /// Creates a new room with the given top-left corner and dimensions.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Integer-midpoint center of the room.
    pub fn center(&self) -> Position {
        Position::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Strict separating-axis overlap test; symmetric for all pairs.
    ///
    /// Rooms that merely share a wall line do not intersect.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::Room;
    ///
    /// let a = Room::new(0, 0, 5, 5);
    /// let b = Room::new(4, 4, 5, 5);
    /// let c = Room::new(5, 0, 5, 5); // touches a's right edge
    /// assert!(a.intersects(&b));
    /// assert!(b.intersects(&a));
    /// assert!(!a.intersects(&c));
    /// ```
    pub fn intersects(&self, other: &Room) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }

    /// Half-open containment test: `[x, x+width) × [y, y+height)`.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    /// Positions strictly inside the room, excluding its one-tile wall ring.
    pub fn interior_positions(&self) -> Vec<Position> {
        let mut positions = Vec::new();
        for y in (self.y + 1)..(self.y + self.height - 1) {
            for x in (self.x + 1)..(self.x + self.width - 1) {
                positions.push(Position::new(x, y));
            }
        }
        positions
    }

    /// Positions on the room's wall ring.
    pub fn perimeter_positions(&self) -> Vec<Position> {
        let mut positions = Vec::new();
        for x in self.x..(self.x + self.width) {
            positions.push(Position::new(x, self.y));
            positions.push(Position::new(x, self.y + self.height - 1));
        }
        for y in (self.y + 1)..(self.y + self.height - 1) {
            positions.push(Position::new(self.x, y));
            positions.push(Position::new(self.x + self.width - 1, y));
        }
        positions
    }
}
