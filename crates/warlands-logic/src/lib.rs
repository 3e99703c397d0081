//! Pure world logic for Warlands.
//!
//! Everything here is plain data and deterministic functions: no ECS, no
//! random source, no I/O. The simulation engine in `warlands-core` drives
//! these from its tick loop; the headless harness calls them directly.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`combat`] | Projectile kinematics, spawn policy, hit testing |
//! | [`constants`] | Generation tuning, agent thresholds, combat policy |
//! | [`grid`] | Grid Store: bounds-safe tile matrix and crop growth timers |
//! | [`interaction`] | Shovel / watering can / seed rules |
//! | [`pathfinding`] | Bounded BFS nearest-tile search and next-step routing |
//! | [`terrain`] | Terrain kinds, walkability, export names |
//! | [`territory`] | Tent-influence claims and zone-change tracking |

pub mod combat;
pub mod constants;
pub mod grid;
pub mod interaction;
pub mod pathfinding;
pub mod terrain;
pub mod territory;

pub use grid::{Grid, Tile, TileCoord};
pub use terrain::TerrainKind;
