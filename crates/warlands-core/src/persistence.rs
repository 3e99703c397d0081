//! Save/load and map export
//!
//! Two formats:
//! - map export: the terrain alone, as a JSON array of rows of kind names;
//! - save files: the whole simulation, bincode-encoded and versioned.
//!
//! Agents are stored component by component and respawned on load.

use hecs::{EntityBuilder, World};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use warlands_logic::territory::ClaimTracker;
use warlands_logic::{Grid, TerrainKind};

use crate::components::*;
use crate::engine::SimConfig;
use crate::generation::WorldLayout;
use crate::systems::CombatResolver;

/// Version number for save file format (increment when format changes)
const SAVE_VERSION: u32 = 1;

/// Serializable snapshot of the simulation state
#[derive(Serialize, Deserialize)]
pub struct SaveData {
    pub version: u32,
    pub frame: u64,
    pub config: SimConfig,
    pub grid: Grid,
    pub layout: WorldLayout,
    pub player: Player,
    pub economy: u64,
    pub resolver: CombatResolver,
    pub claims: ClaimTracker,
    pub next_agent_id: u32,
    pub session_over: bool,
    pub agents: Vec<SerializableAgent>,
}

impl SaveData {
    pub fn current_version() -> u32 {
        SAVE_VERSION
    }
}

/// One agent's components
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializableAgent {
    pub agent: Agent,
    pub position: Position,
    pub facing: Facing,
    pub health: Health,
    pub name: Option<Name>,
    pub allegiance: Option<Allegiance>,
    pub smuggler: Option<Smuggler>,
}

/// Extract every agent from a world, ordered by id.
pub fn serialize_agents(world: &World) -> Vec<SerializableAgent> {
    let mut agents: Vec<SerializableAgent> = world
        .query::<(&Agent, &Position, &Facing, &Health, Option<&Name>, Option<&Allegiance>, Option<&Smuggler>)>()
        .iter()
        .map(|(_, (agent, position, facing, health, name, allegiance, smuggler))| SerializableAgent {
            agent: *agent,
            position: *position,
            facing: *facing,
            health: *health,
            name: name.cloned(),
            allegiance: allegiance.copied(),
            smuggler: smuggler.copied(),
        })
        .collect();
    agents.sort_by_key(|a| a.agent.id);
    agents
}

/// Rebuild a world from serialized agents
pub fn restore_agents(agents: Vec<SerializableAgent>) -> World {
    let mut world = World::new();
    for sa in agents {
        let mut builder = EntityBuilder::new();
        builder.add(sa.agent).add(sa.position).add(sa.facing).add(sa.health);
        if let Some(c) = sa.name {
            builder.add(c);
        }
        if let Some(c) = sa.allegiance {
            builder.add(c);
        }
        if let Some(c) = sa.smuggler {
            builder.add(c);
        }
        world.spawn(builder.build());
    }
    world
}

/// Write a save file
pub fn save_simulation<W: Write>(writer: W, data: &SaveData) -> Result<(), PersistenceError> {
    bincode::serialize_into(writer, data)?;
    Ok(())
}

/// Read a save file, rejecting other format versions
pub fn load_simulation<R: Read>(reader: R) -> Result<SaveData, PersistenceError> {
    let data: SaveData = bincode::deserialize_from(reader)?;
    if data.version != SAVE_VERSION {
        return Err(PersistenceError::VersionMismatch {
            expected: SAVE_VERSION,
            found: data.version,
        });
    }
    Ok(data)
}

/// Write the terrain as a JSON matrix of kind names (`rows[y][x]`).
pub fn export_map<W: Write>(writer: W, grid: &Grid) -> Result<(), PersistenceError> {
    let names: Vec<Vec<String>> = grid
        .kinds()
        .iter()
        .map(|row| row.iter().map(|kind| kind.name()).collect())
        .collect();
    serde_json::to_writer(writer, &names)?;
    Ok(())
}

/// Read a terrain matrix written by [`export_map`].
///
/// Only kinds are stored, so zone ownership comes back for tent and HQ
/// tiles alone. [`SimulationEngine::from_grid`](crate::engine::SimulationEngine::from_grid)
/// rebuilds the rest from the headquarters.
pub fn import_map<R: Read>(reader: R) -> Result<Grid, PersistenceError> {
    let names: Vec<Vec<String>> = serde_json::from_reader(reader)?;
    let mut rows = Vec::with_capacity(names.len());
    for (y, row) in names.iter().enumerate() {
        let mut kinds = Vec::with_capacity(row.len());
        for (x, name) in row.iter().enumerate() {
            let kind = TerrainKind::from_name(name).ok_or_else(|| {
                PersistenceError::MalformedMap(format!("unknown tile kind {:?} at ({}, {})", name, x, y))
            })?;
            kinds.push(kind);
        }
        rows.push(kinds);
    }
    Grid::from_kinds(&rows)
        .ok_or_else(|| PersistenceError::MalformedMap("map must be a non-empty square".to_string()))
}

/// Errors that can occur during save/load or map import/export
#[derive(Debug)]
pub enum PersistenceError {
    Io(std::io::Error),
    Bincode(Box<bincode::ErrorKind>),
    Json(serde_json::Error),
    VersionMismatch { expected: u32, found: u32 },
    MalformedMap(String),
}

impl From<std::io::Error> for PersistenceError {
    fn from(e: std::io::Error) -> Self {
        PersistenceError::Io(e)
    }
}

impl From<Box<bincode::ErrorKind>> for PersistenceError {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        PersistenceError::Bincode(e)
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(e: serde_json::Error) -> Self {
        PersistenceError::Json(e)
    }
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistenceError::Io(e) => write!(f, "IO error: {}", e),
            PersistenceError::Bincode(e) => write!(f, "Serialization error: {}", e),
            PersistenceError::Json(e) => write!(f, "Map format error: {}", e),
            PersistenceError::VersionMismatch { expected, found } => {
                write!(f, "Save version mismatch: expected {}, found {}", expected, found)
            }
            PersistenceError::MalformedMap(reason) => write!(f, "Malformed map: {}", reason),
        }
    }
}

impl std::error::Error for PersistenceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PersistenceError::Io(e) => Some(e),
            PersistenceError::Bincode(e) => Some(e),
            PersistenceError::Json(e) => Some(e),
            _ => None,
        }
    }
}
