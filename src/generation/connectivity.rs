//! # Connectivity Analysis
//!
//! Queue-based flood fill and the connectivity queries built on it.
//!
//! Every traversal here uses an explicit [`VecDeque`], never recursion, so
//! stack usage stays bounded on arbitrarily large grids. Adjacency is
//! 4-directional throughout.

use crate::{Grid, Position, Room, Tile};
use std::collections::{HashSet, VecDeque};

/// Flood-fills from `start` over tiles accepted by `passable`.
///
/// Returns the set of reachable positions, including `start` itself when it
/// is passable. An impassable start yields an empty set.
///
/// # Examples
///
/// ```
/// use delve::{connectivity, Grid, Position, Tile};
///
/// let mut grid = Grid::new(5, 5, Tile::Wall);
/// grid.set(1, 1, Tile::Floor);
/// grid.set(2, 1, Tile::Floor);
/// let reached = connectivity::flood_fill(&grid, Position::new(1, 1), |t| t == Tile::Floor);
/// assert_eq!(reached.len(), 2);
/// ```
pub fn flood_fill(
    grid: &Grid,
    start: Position,
    passable: impl Fn(Tile) -> bool,
) -> HashSet<Position> {
    let mut visited = HashSet::new();
    if !grid.in_bounds(start.x, start.y) || !passable(grid.get(start.x, start.y)) {
        return visited;
    }

    let mut queue = VecDeque::new();
    queue.push_back(start);
    visited.insert(start);

    while let Some(pos) = queue.pop_front() {
        for next in pos.cardinal_neighbors() {
            if visited.contains(&next) || !grid.in_bounds(next.x, next.y) {
                continue;
            }
            if passable(grid.get(next.x, next.y)) {
                visited.insert(next);
                queue.push_back(next);
            }
        }
    }

    visited
}

/// Enumerates all connected regions of passable tiles, in scan order.
///
/// Each region is a list of positions; the union of all regions is exactly
/// the set of passable tiles.
pub fn regions(grid: &Grid, passable: impl Fn(Tile) -> bool) -> Vec<Vec<Position>> {
    let width = grid.width();
    let mut seen = vec![false; (width * grid.height()) as usize];
    let mut found = Vec::new();

    for start in grid.positions() {
        let idx = (start.y * width + start.x) as usize;
        if seen[idx] || !passable(grid.get(start.x, start.y)) {
            continue;
        }

        let mut region = Vec::new();
        let mut queue = VecDeque::new();
        queue.push_back(start);
        seen[idx] = true;

        while let Some(pos) = queue.pop_front() {
            region.push(pos);
            for next in pos.cardinal_neighbors() {
                if !grid.in_bounds(next.x, next.y) {
                    continue;
                }
                let next_idx = (next.y * width + next.x) as usize;
                if !seen[next_idx] && passable(grid.get(next.x, next.y)) {
                    seen[next_idx] = true;
                    queue.push_back(next);
                }
            }
        }

        found.push(region);
    }

    found
}

/// Computes connected components over a room list.
///
/// Two rooms share a component when some passable path links their
/// interiors. A room whose interior holds no passable tile forms a
/// singleton component; the dungeon repair pass then links it explicitly.
pub fn room_components(
    grid: &Grid,
    rooms: &[Room],
    passable: impl Fn(Tile) -> bool + Copy,
) -> Vec<Vec<usize>> {
    let mut assigned = vec![false; rooms.len()];
    let mut components = Vec::new();

    for (i, room) in rooms.iter().enumerate() {
        if assigned[i] {
            continue;
        }

        let start = room
            .interior_positions()
            .into_iter()
            .find(|p| passable(grid.get(p.x, p.y)));

        let Some(start) = start else {
            assigned[i] = true;
            components.push(vec![i]);
            continue;
        };

        let reached = flood_fill(grid, start, passable);
        let mut component = Vec::new();
        for (j, other) in rooms.iter().enumerate() {
            if assigned[j] {
                continue;
            }
            let linked = other
                .interior_positions()
                .iter()
                .any(|p| reached.contains(p));
            if linked {
                assigned[j] = true;
                component.push(j);
            }
        }
        components.push(component);
    }

    components
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor_passable(t: Tile) -> bool {
        matches!(t, Tile::Floor | Tile::Door)
    }

    #[test]
    fn test_flood_fill_reaches_connected_tiles() {
        let mut grid = Grid::new(10, 10, Tile::Wall);
        for x in 1..9 {
            grid.set(x, 5, Tile::Floor);
        }
        let reached = flood_fill(&grid, Position::new(1, 5), floor_passable);
        assert_eq!(reached.len(), 8);
        assert!(reached.contains(&Position::new(8, 5)));
    }

    #[test]
    fn test_flood_fill_stops_at_walls() {
        let mut grid = Grid::new(10, 10, Tile::Wall);
        grid.set(1, 1, Tile::Floor);
        grid.set(2, 1, Tile::Floor);
        // Wall gap, then a separate pocket.
        grid.set(5, 1, Tile::Floor);
        let reached = flood_fill(&grid, Position::new(1, 1), floor_passable);
        assert_eq!(reached.len(), 2);
        assert!(!reached.contains(&Position::new(5, 1)));
    }

    #[test]
    fn test_flood_fill_from_impassable_start_is_empty() {
        let grid = Grid::new(5, 5, Tile::Wall);
        let reached = flood_fill(&grid, Position::new(2, 2), floor_passable);
        assert!(reached.is_empty());
    }

    #[test]
    fn test_flood_fill_passes_through_doors() {
        let mut grid = Grid::new(7, 3, Tile::Wall);
        grid.set(1, 1, Tile::Floor);
        grid.set(2, 1, Tile::Door);
        grid.set(3, 1, Tile::Floor);
        let reached = flood_fill(&grid, Position::new(1, 1), floor_passable);
        assert_eq!(reached.len(), 3);
    }

    #[test]
    fn test_regions_partitions_floor() {
        let mut grid = Grid::new(12, 5, Tile::Wall);
        for x in 1..4 {
            grid.set(x, 1, Tile::Floor);
        }
        for x in 6..11 {
            grid.set(x, 3, Tile::Floor);
        }
        let found = regions(&grid, |t| t == Tile::Floor);
        assert_eq!(found.len(), 2);
        let total: usize = found.iter().map(|r| r.len()).sum();
        assert_eq!(total, 8);
    }

    #[test]
    fn test_regions_on_all_wall_grid() {
        let grid = Grid::new(6, 6, Tile::Wall);
        assert!(regions(&grid, |t| t == Tile::Floor).is_empty());
    }

    #[test]
    fn test_room_components_split_and_joined() {
        let mut grid = Grid::new(30, 10, Tile::Wall);
        let a = Room::new(1, 1, 6, 6);
        let b = Room::new(9, 1, 6, 6);
        let c = Room::new(20, 1, 6, 6);
        for room in [&a, &b, &c] {
            for pos in room.interior_positions() {
                grid.set(pos.x, pos.y, Tile::Floor);
            }
        }
        // Corridor joins a and b only.
        for x in 6..11 {
            grid.set(x, 3, Tile::Floor);
        }

        let components = room_components(&grid, &[a, b, c], floor_passable);
        assert_eq!(components.len(), 2);
        let ab = components.iter().find(|c| c.len() == 2).unwrap();
        assert!(ab.contains(&0) && ab.contains(&1));
        let lone = components.iter().find(|c| c.len() == 1).unwrap();
        assert_eq!(lone[0], 2);
    }

    #[test]
    fn test_room_without_interior_floor_is_singleton() {
        let grid = Grid::new(20, 10, Tile::Wall);
        let sealed = Room::new(1, 1, 5, 5); // never carved
        let components = room_components(&grid, &[sealed], floor_passable);
        assert_eq!(components, vec![vec![0]]);
    }
}
