//! # Level Manager
//!
//! Owns the depth→level map and the transitions between depths.
//!
//! Levels are generated lazily on first visit with a depth-scaled
//! configuration and persisted for the whole session: going back up (or
//! down) to a visited depth reuses the stored level, never regenerates it.
//! The manager assumes a single caller; it holds exclusive ownership of
//! every level it creates.

use crate::{
    create_generator, generation::utils, GenerationConfig, Level, Position,
};
use log::info;
use std::collections::HashMap;

/// Multi-level dungeon manager.
///
/// # Examples
///
/// ```
/// use delve::LevelManager;
///
/// let mut manager = LevelManager::new(40, 25, 3, 7);
/// assert_eq!(manager.current_depth(), 1);
/// assert!(manager.can_go_down());
/// assert!(!manager.can_go_up());
///
/// let (moved, spawn) = manager.go_down();
/// assert!(moved);
/// assert!(spawn.is_some());
/// assert_eq!(manager.current_depth(), 2);
/// ```
#[derive(Debug)]
pub struct LevelManager {
    width: i32,
    height: i32,
    max_depth: u32,
    current_depth: u32,
    base_seed: u64,
    levels: HashMap<u32, Level>,
}

impl LevelManager {
    /// Creates a manager and generates the first level (always a town).
    pub fn new(width: i32, height: i32, max_depth: u32, base_seed: u64) -> Self {
        let mut manager = Self {
            width,
            height,
            max_depth: max_depth.max(1),
            current_depth: 1,
            base_seed,
            levels: HashMap::new(),
        };
        manager.ensure_level(1);
        manager
    }

    /// Deterministic per-depth seed derived from the base seed.
    fn seed_for_depth(&self, depth: u32) -> u64 {
        self.base_seed ^ (depth as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
    }

    /// Generates and stores the level for `depth` if absent.
    fn ensure_level(&mut self, depth: u32) {
        if self.levels.contains_key(&depth) {
            return;
        }

        let config = GenerationConfig::for_depth(
            self.seed_for_depth(depth),
            self.width,
            self.height,
            depth,
        );
        let generator = create_generator(config.method);
        info!("generating depth {depth} with {}", generator.kind());

        let mut rng = utils::create_rng(&config);
        let map = generator.generate(&config, &mut rng);
        let mut level = Level::new(depth, map);
        if depth == 1 {
            level.seal_ascent();
        }
        if depth >= self.max_depth {
            level.seal_descent();
        }
        self.levels.insert(depth, level);
    }

    /// The level the player currently occupies.
    pub fn current_level(&self) -> &Level {
        &self.levels[&self.current_depth]
    }

    /// Mutable access to the current level, for collaborator tile rewrites
    /// and entity bookkeeping.
    pub fn current_level_mut(&mut self) -> &mut Level {
        self.levels
            .get_mut(&self.current_depth)
            .expect("current level always exists")
    }

    /// Current depth, starting at 1.
    pub fn current_depth(&self) -> u32 {
        self.current_depth
    }

    /// Deepest reachable depth.
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Whether an upward transition is possible.
    pub fn can_go_up(&self) -> bool {
        self.current_depth > 1
    }

    /// Whether a downward transition is possible.
    pub fn can_go_down(&self) -> bool {
        self.current_depth < self.max_depth
    }

    /// Descends one level, generating it on first visit.
    ///
    /// Returns whether the move happened plus the spawn position on the new
    /// level (its up staircase, or a safe floor tile when stairs are
    /// absent).
    pub fn go_down(&mut self) -> (bool, Option<Position>) {
        if !self.can_go_down() {
            return (false, None);
        }
        self.current_depth += 1;
        self.ensure_level(self.current_depth);
        let spawn = self.current_level().get_spawn_position(true);
        (true, Some(spawn))
    }

    /// Ascends one level; the level above always already exists.
    pub fn go_up(&mut self) -> (bool, Option<Position>) {
        if !self.can_go_up() {
            return (false, None);
        }
        self.current_depth -= 1;
        let spawn = self.current_level().get_spawn_position(false);
        (true, Some(spawn))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tile;

    fn manager() -> LevelManager {
        LevelManager::new(50, 30, 10, 42)
    }

    #[test]
    fn test_starts_at_depth_one_town() {
        let manager = manager();
        assert_eq!(manager.current_depth(), 1);
        assert!(!manager.can_go_up());
        assert!(manager.can_go_down());
        // Depth 1 is a town: it has buildings.
        assert!(!manager.current_level().rooms.is_empty());
    }

    #[test]
    fn test_go_down_and_back_up() {
        let mut manager = manager();
        let (moved, spawn) = manager.go_down();
        assert!(moved);
        assert!(spawn.is_some());
        assert_eq!(manager.current_depth(), 2);

        let (moved, spawn) = manager.go_up();
        assert!(moved);
        assert!(spawn.is_some());
        assert_eq!(manager.current_depth(), 1);
    }

    #[test]
    fn test_cannot_go_up_from_surface() {
        let mut manager = manager();
        assert_eq!(manager.go_up(), (false, None));
        assert_eq!(manager.current_depth(), 1);
    }

    #[test]
    fn test_levels_persist_across_revisits() {
        let mut manager = manager();
        manager.go_down();
        let before = manager.current_level().grid().clone();
        manager.go_up();
        manager.go_down();
        assert_eq!(manager.current_level().grid(), &before);
    }

    #[test]
    fn test_mutations_survive_revisits() {
        let mut manager = manager();
        manager.go_down();
        let door = manager
            .current_level()
            .grid()
            .positions_of(Tile::Door)
            .first()
            .copied();
        if let Some(pos) = door {
            assert!(manager.current_level_mut().open_door(pos.x, pos.y));
            manager.go_up();
            manager.go_down();
            assert_eq!(manager.current_level().get_tile(pos.x, pos.y), Tile::Floor);
        }
    }

    #[test]
    fn test_fifth_depth_is_cave() {
        let mut manager = manager();
        for _ in 0..4 {
            manager.go_down();
        }
        assert_eq!(manager.current_depth(), 5);
        // Caves carry no room list and never contain doors.
        let level = manager.current_level();
        assert!(level.rooms.is_empty());
        assert!(level.grid().positions_of(Tile::Door).is_empty());
    }

    #[test]
    fn test_deepest_level_has_no_down_stairs() {
        let mut manager = LevelManager::new(50, 30, 3, 7);
        manager.go_down();
        manager.go_down();
        assert_eq!(manager.current_depth(), 3);
        assert!(!manager.can_go_down());
        let level = manager.current_level();
        assert!(level.stairs_down().is_none());
        assert!(level.grid().positions_of(Tile::StairsDown).is_empty());
        assert_eq!(manager.go_down(), (false, None));
    }

    #[test]
    fn test_same_seed_same_world() {
        let mut a = LevelManager::new(50, 30, 5, 99);
        let mut b = LevelManager::new(50, 30, 5, 99);
        for _ in 0..3 {
            a.go_down();
            b.go_down();
        }
        assert_eq!(a.current_level().grid(), b.current_level().grid());
    }

    #[test]
    fn test_different_depths_differ() {
        let mut manager = manager();
        let surface = manager.current_level().grid().clone();
        manager.go_down();
        assert_ne!(manager.current_level().grid(), &surface);
    }
}
