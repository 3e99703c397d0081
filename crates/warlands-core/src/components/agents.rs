//! Agent components: identity, allegiance, and the smuggler economy.

use serde::{Deserialize, Serialize};
use warlands_logic::TileCoord;

/// Kinds of autonomous agents in the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentKind {
    Villager,
    Gunseller,
    Smuggler,
    Warlord,
    Soldier,
}

impl AgentKind {
    pub fn label(self) -> &'static str {
        match self {
            AgentKind::Villager => "Villager",
            AgentKind::Gunseller => "Gun Trader",
            AgentKind::Smuggler => "Smuggler",
            AgentKind::Warlord => "Warlord",
            AgentKind::Soldier => "Soldier",
        }
    }
}

/// Identity component. `id` is unique for the lifetime of the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub id: u32,
    pub kind: AgentKind,
}

/// Faction membership for warlords and soldiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allegiance(pub u8);

/// The six phases of the smuggler loop.
///
/// Each variant carries only the data that phase needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SmugglerState {
    /// Turning grass into farmland.
    #[default]
    Farming,
    /// Sowing tobacco on farmland.
    Planting,
    /// Collecting ripe tobacco, optionally heading for a known plant.
    Harvesting { target: Option<TileCoord> },
    /// Selling tobacco to a villager.
    Trading,
    /// Buying ammunition from a gunseller.
    AmmoTrading,
    /// Hunting the player.
    Combat,
}

impl SmugglerState {
    pub fn is_combat(&self) -> bool {
        matches!(self, SmugglerState::Combat)
    }

    /// States the overstock override leaves alone.
    pub fn is_market_bound(&self) -> bool {
        matches!(
            self,
            SmugglerState::Trading | SmugglerState::AmmoTrading | SmugglerState::Combat
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            SmugglerState::Farming => "farming",
            SmugglerState::Planting => "planting",
            SmugglerState::Harvesting { .. } => "harvesting",
            SmugglerState::Trading => "trading",
            SmugglerState::AmmoTrading => "ammo-trading",
            SmugglerState::Combat => "combat",
        }
    }
}

/// Economic stock carried by a smuggler
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmugglerData {
    pub tobacco: u32,
    pub ammo: u32,
    /// Grass tiles converted in the current farming phase.
    pub tiles_transformed: u32,
    /// Frame of the last projectile fired.
    pub last_shot_frame: Option<u64>,
}

/// Smuggler component: current phase plus stock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Smuggler {
    pub state: SmugglerState,
    pub data: SmugglerData,
}

impl Smuggler {
    pub fn new() -> Self {
        Self::default()
    }
}
