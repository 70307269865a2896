//! # Corridor Carving
//!
//! Carves floor paths between two points: L-shaped corridors for ordinary
//! links and Bresenham diagonals for variety.

use crate::{GenerationConfig, Grid, Position, Tile};
use rand::{rngs::StdRng, Rng};

/// Carves corridors into a grid.
///
/// Width is always an explicit argument: repair passes carve wider than the
/// configured corridor width without touching the shared config.
pub struct CorridorCarver;

impl CorridorCarver {
    /// Carves between two points, picking the strategy from the config.
    ///
    /// Diagonal corridors are used with probability `diagonal_chance` when
    /// enabled; otherwise an L-shaped corridor is carved at `width`.
    pub fn carve(
        grid: &mut Grid,
        start: Position,
        end: Position,
        config: &GenerationConfig,
        width: i32,
        rng: &mut StdRng,
    ) {
        if config.diagonal_corridors && rng.gen_bool(config.diagonal_chance.clamp(0.0, 1.0)) {
            Self::carve_diagonal(grid, start, end);
        } else {
            Self::carve_simple(grid, start, end, width, rng);
        }
    }

    /// Carves an L-shaped corridor of the given width.
    ///
    /// Goes horizontal-then-vertical or vertical-then-horizontal uniformly
    /// at random, widening each segment by replicating rows/columns on both
    /// sides of the spine.
    pub fn carve_simple(
        grid: &mut Grid,
        start: Position,
        end: Position,
        width: i32,
        rng: &mut StdRng,
    ) {
        if rng.gen_bool(0.5) {
            // Horizontal along start.y, then vertical along end.x.
            Self::carve_segment_horizontal(grid, start.x, end.x, start.y, width);
            Self::carve_segment_vertical(grid, start.y, end.y, end.x, width);
        } else {
            // Vertical along start.x, then horizontal along end.y.
            Self::carve_segment_vertical(grid, start.y, end.y, start.x, width);
            Self::carve_segment_horizontal(grid, start.x, end.x, end.y, width);
        }
    }

    /// Carves a straight horizontal segment along `y`.
    pub(crate) fn carve_segment_horizontal(grid: &mut Grid, x1: i32, x2: i32, y: i32, width: i32) {
        for x in x1.min(x2)..=x1.max(x2) {
            grid.set(x, y, Tile::Floor);
            for d in 1..width {
                grid.set(x, y + d, Tile::Floor);
                grid.set(x, y - d, Tile::Floor);
            }
        }
    }

    /// Carves a straight vertical segment along `x`.
    pub(crate) fn carve_segment_vertical(grid: &mut Grid, y1: i32, y2: i32, x: i32, width: i32) {
        for y in y1.min(y2)..=y1.max(y2) {
            grid.set(x, y, Tile::Floor);
            for d in 1..width {
                grid.set(x + d, y, Tile::Floor);
                grid.set(x - d, y, Tile::Floor);
            }
        }
    }

    /// Carves a diagonal corridor using Bresenham's line.
    ///
    /// The path is widened to 3 tiles perpendicular to the dominant axis so
    /// a step along the diagonal never requires a blocked diagonal move.
    pub fn carve_diagonal(grid: &mut Grid, start: Position, end: Position) {
        let dx = (end.x - start.x).abs();
        let dy = (end.y - start.y).abs();
        let x_step = if start.x < end.x { 1 } else { -1 };
        let y_step = if start.y < end.y { 1 } else { -1 };

        let (mut x, mut y) = (start.x, start.y);

        if dx > dy {
            let mut error = dx / 2;
            while x != end.x {
                grid.set(x, y, Tile::Floor);
                grid.set(x, y - 1, Tile::Floor);
                grid.set(x, y + 1, Tile::Floor);
                error -= dy;
                if error < 0 {
                    y += y_step;
                    error += dx;
                }
                x += x_step;
            }
        } else {
            let mut error = dy / 2;
            while y != end.y {
                grid.set(x, y, Tile::Floor);
                grid.set(x - 1, y, Tile::Floor);
                grid.set(x + 1, y, Tile::Floor);
                error -= dx;
                if error < 0 {
                    x += x_step;
                    error += dy;
                }
                y += y_step;
            }
        }

        grid.set(end.x, end.y, Tile::Floor);
    }
}
