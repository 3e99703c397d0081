//! Tool-driven tile interaction: shovel, watering can, tobacco seeds.

use serde::{Deserialize, Serialize};

use crate::grid::{Grid, TileCoord};
use crate::terrain::TerrainKind;

/// Hand tools the interaction layer can apply to a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tool {
    Shovel,
    WateringCan,
    TobaccoSeeds,
}

impl Tool {
    /// Terrain the tool works on and what it turns it into.
    pub fn rule(self) -> (TerrainKind, TerrainKind) {
        match self {
            Tool::Shovel => (TerrainKind::Grass, TerrainKind::Dirt),
            Tool::WateringCan => (TerrainKind::Dirt, TerrainKind::Farmland),
            Tool::TobaccoSeeds => (TerrainKind::Farmland, TerrainKind::Tobacco1),
        }
    }
}

/// Why an interaction left the tile unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractError {
    OutOfBounds { x: i32, y: i32 },
    WrongTerrain { tool: Tool, found: TerrainKind },
    NoSeeds,
}

impl std::fmt::Display for InteractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InteractError::OutOfBounds { x, y } => write!(f, "({}, {}) is outside the world", x, y),
            InteractError::WrongTerrain { tool, found } => {
                write!(f, "{:?} can only be used on {}, found {}", tool, tool.rule().0.name(), found.name())
            }
            InteractError::NoSeeds => write!(f, "not enough tobacco seeds in inventory"),
        }
    }
}

impl std::error::Error for InteractError {}

/// Apply `tool` at `(x, y)`. Seeds are drawn through `take_seed` only once
/// the terrain check passes; planting schedules growth from `now`.
pub fn tile_interact(
    grid: &mut Grid,
    x: i32,
    y: i32,
    tool: Tool,
    now: u64,
    stage_frames: u64,
    take_seed: impl FnOnce() -> bool,
) -> Result<TerrainKind, InteractError> {
    if !grid.in_bounds(x, y) {
        return Err(InteractError::OutOfBounds { x, y });
    }
    let found = grid.get(x, y).kind;
    let (from, to) = tool.rule();
    if found != from {
        return Err(InteractError::WrongTerrain { tool, found });
    }

    if tool == Tool::TobaccoSeeds {
        if !take_seed() {
            return Err(InteractError::NoSeeds);
        }
        grid.plant(TileCoord::new(x, y), now, stage_frames);
    } else {
        grid.set_kind(x, y, to);
    }
    Ok(to)
}
