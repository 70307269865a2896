//! # Delve
//!
//! Procedural 2D tile map generation for roguelikes.
//!
//! ## Architecture Overview
//!
//! Delve generates playable tile maps using three algorithms and guarantees
//! that every map handed to the caller is fully traversable:
//!
//! - **Map primitives**: bounds-checked tile grid, positions, and levels
//! - **Generation system**: rooms-and-corridors dungeons, cellular-automata
//!   caves, and road-grid towns, all seeded and reproducible
//! - **Connectivity analysis**: queue-based flood fill used to validate and
//!   repair every generated layout
//! - **Level management**: per-depth generator selection and persistence of
//!   generated levels across depth transitions
//!
//! Rendering, entity simulation, AI, and persistence are external
//! collaborators: they consume the generated grid through a read-mostly
//! interface and never participate in generation.
//!
//! ## Determinism
//!
//! All randomness flows through a seeded [`rand::rngs::StdRng`] created from
//! [`GenerationConfig::seed`], so identical configurations produce identical
//! maps across independent runs.

pub mod generation;
pub mod map;

// Core module re-exports
pub use generation::*;
pub use map::*;

/// Core error type for the Delve map generation crate.
///
/// Generation itself never fails: transient failures are retried internally
/// and exhausted retries fall back to a deterministic layout. The only error
/// a normal caller can observe is a fatal configuration problem.
#[derive(thiserror::Error, Debug)]
pub enum DelveError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Unrecognized generation method name
    #[error("Unknown generation method: {0}")]
    UnknownMethod(String),

    /// Configuration parameters are unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type used throughout the Delve codebase.
pub type DelveResult<T> = Result<T, DelveError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Map generation constants.
pub mod config {
    /// Default map width in tiles
    pub const DEFAULT_MAP_WIDTH: i32 = 80;

    /// Default map height in tiles
    pub const DEFAULT_MAP_HEIGHT: i32 = 50;

    /// Default maximum dungeon depth
    pub const DEFAULT_MAX_DEPTH: u32 = 10;

    /// Maximum randomized generation attempts before the deterministic
    /// fallback layout is emitted
    pub const MAX_GENERATION_ATTEMPTS: u32 = 10;

    /// Maximum connectivity repair passes within a single attempt
    pub const MAX_REPAIR_ITERATIONS: u32 = 10;

    /// Corridor width used for connectivity-repair carves
    pub const REPAIR_CORRIDOR_WIDTH: i32 = 2;
}
