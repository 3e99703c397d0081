//! Warlands Core - Territorial Open-World Simulation Engine
//!
//! A tile world carved into faction territories and settled by autonomous
//! agents. Smugglers farm tobacco, sell it to villagers, buy ammunition from
//! gunsellers and eventually turn their guns on the player.
//!
//! # Architecture
//!
//! The simulation uses an Entity Component System (ECS) architecture via `hecs`:
//! - **Entities**: villagers, gunsellers, smugglers, warlords, soldiers
//! - **Components**: Pure data attached to entities (Position, Health, Smuggler, etc.)
//! - **Systems**: Logic that queries and updates components
//!
//! Terrain, territory, pathfinding and projectile rules live in the
//! ECS-free `warlands-logic` crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use warlands_core::prelude::*;
//! use warlands_core::generation::WorldConfig;
//!
//! let mut engine = SimulationEngine::new();
//! engine.generate(WorldConfig::default());
//!
//! loop {
//!     engine.update();
//!     for event in engine.drain_events() {
//!         println!("{:?}", event);
//!     }
//! }
//! ```

pub mod components;
pub mod engine;
pub mod generation;
pub mod persistence;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::engine::{AgentSnapshot, SimConfig, SimEvent, SimulationEngine};
    pub use crate::systems::CombatEvent;
}
