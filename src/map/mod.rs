//! # Map Module
//!
//! Core map representation: positions, tiles, and the bounds-checked grid.
//!
//! Everything a generator produces is expressed in these primitives. The
//! grid owns its tile buffer exclusively during a generation attempt and is
//! frozen into a [`Level`] once an attempt validates.

pub mod level;
pub mod level_manager;

pub use level::*;
pub use level_manager::*;

use serde::{Deserialize, Serialize};

/// Represents a 2D coordinate on a map.
///
/// # Examples
///
/// ```
/// use delve::Position;
///
/// let pos = Position::new(10, 5);
/// assert_eq!(pos.x, 10);
/// assert_eq!(pos.y, 5);
///
/// let neighbors = pos.cardinal_neighbors();
/// assert_eq!(neighbors.len(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Creates a new position with the given coordinates.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Calculates the Manhattan distance to another position.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::Position;
    ///
    /// let a = Position::new(0, 0);
    /// let b = Position::new(3, 4);
    /// assert_eq!(a.manhattan_distance(b), 7);
    /// ```
    pub fn manhattan_distance(self, other: Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Returns the 4 cardinal neighbors (no diagonals).
    ///
    /// Connectivity throughout the crate is 4-directional, so this is the
    /// adjacency used by every flood fill.
    pub fn cardinal_neighbors(self) -> [Position; 4] {
        [
            Position::new(self.x, self.y - 1),
            Position::new(self.x - 1, self.y),
            Position::new(self.x + 1, self.y),
            Position::new(self.x, self.y + 1),
        ]
    }
}

/// Kinds of gatherable resources that can appear as map tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Wood,
    Stone,
    Ore,
    Crystal,
    Essence,
    Herbs,
}

/// Smallest addressable map unit.
///
/// A closed enumeration: collaborators match exhaustively on it and the
/// generators never produce anything outside it. Tiles are immutable values;
/// the only post-generation rewrites permitted to collaborators are
/// door-opening and resource removal, both handled by [`Level`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    Empty,
    Floor,
    Wall,
    Door,
    StairsUp,
    StairsDown,
    Water,
    Lava,
    Chest,
    Altar,
    Resource(ResourceKind),
}

impl Tile {
    /// Whether a walking entity can occupy this tile.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::Tile;
    ///
    /// assert!(Tile::Floor.is_walkable());
    /// assert!(Tile::Door.is_walkable());
    /// assert!(!Tile::Wall.is_walkable());
    /// assert!(!Tile::Lava.is_walkable());
    /// ```
    pub fn is_walkable(self) -> bool {
        matches!(
            self,
            Tile::Floor | Tile::Door | Tile::StairsUp | Tile::StairsDown | Tile::Altar
        )
    }

    /// Whether this tile counts as open floor for corridor/door adjacency
    /// tests during generation.
    pub fn is_floor(self) -> bool {
        self == Tile::Floor
    }

    /// ASCII glyph used by the demo renderer and map dumps.
    pub fn glyph(self) -> char {
        match self {
            Tile::Empty => ' ',
            Tile::Floor => '.',
            Tile::Wall => '#',
            Tile::Door => '+',
            Tile::StairsUp => '<',
            Tile::StairsDown => '>',
            Tile::Water => '~',
            Tile::Lava => '^',
            Tile::Chest => '$',
            Tile::Altar => '_',
            Tile::Resource(ResourceKind::Wood) => 't',
            Tile::Resource(ResourceKind::Stone) => 's',
            Tile::Resource(ResourceKind::Ore) => 'o',
            Tile::Resource(ResourceKind::Crystal) => '*',
            Tile::Resource(ResourceKind::Essence) => 'e',
            Tile::Resource(ResourceKind::Herbs) => '"',
        }
    }
}

/// Bounds-checked 2D tile buffer.
///
/// Out-of-bounds access never panics: `set` is a no-op and `get` returns
/// [`Tile::Wall`], so callers can probe neighborhoods at the map edge
/// without guarding every coordinate.
///
/// # Examples
///
/// ```
/// use delve::{Grid, Tile};
///
/// let mut grid = Grid::new(10, 6, Tile::Wall);
/// grid.set(3, 2, Tile::Floor);
/// assert_eq!(grid.get(3, 2), Tile::Floor);
/// assert_eq!(grid.get(-1, 2), Tile::Wall); // out of bounds reads as wall
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Creates a grid with every cell initialized to `fill`.
    pub fn new(width: i32, height: i32, fill: Tile) -> Self {
        assert!(width > 0 && height > 0, "grid dimensions must be positive");
        Self {
            width,
            height,
            tiles: vec![fill; (width * height) as usize],
        }
    }

    /// Grid width in tiles.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Grid height in tiles.
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Checks whether a position lies within the grid.
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    /// Reads the tile at `(x, y)`, or [`Tile::Wall`] if out of bounds.
    pub fn get(&self, x: i32, y: i32) -> Tile {
        if self.in_bounds(x, y) {
            self.tiles[(y * self.width + x) as usize]
        } else {
            Tile::Wall
        }
    }

    /// Writes the tile at `(x, y)`; no-op if out of bounds.
    pub fn set(&mut self, x: i32, y: i32, tile: Tile) {
        if self.in_bounds(x, y) {
            self.tiles[(y * self.width + x) as usize] = tile;
        }
    }

    /// Overwrites every cell with `tile`.
    pub fn fill(&mut self, tile: Tile) {
        self.tiles.fill(tile);
    }

    /// Counts walls among the 8 neighbors of `(x, y)`, with out-of-bounds
    /// cells counted as walls.
    pub fn wall_neighbors(&self, x: i32, y: i32) -> u32 {
        let mut count = 0;
        for ny in (y - 1)..=(y + 1) {
            for nx in (x - 1)..=(x + 1) {
                if (nx, ny) == (x, y) {
                    continue;
                }
                if self.get(nx, ny) == Tile::Wall {
                    count += 1;
                }
            }
        }
        count
    }

    /// Iterates over all positions in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        let width = self.width;
        (0..self.height).flat_map(move |y| (0..width).map(move |x| Position::new(x, y)))
    }

    /// Collects every position holding the given tile.
    pub fn positions_of(&self, tile: Tile) -> Vec<Position> {
        self.positions().filter(|p| self.get(p.x, p.y) == tile).collect()
    }

    /// Renders the grid as ASCII, one row per line.
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity((self.width as usize + 1) * self.height as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                out.push(self.get(x, y).glyph());
            }
            out.push('\n');
        }
        out
    }
}
