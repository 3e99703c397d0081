//! Territory oracle. Which faction, if any, claims a coordinate.
//!
//! Claims are recomputed from the tent list on every query. Tents never move,
//! so there is nothing to invalidate.

use serde::{Deserialize, Serialize};

/// A faction's territorial anchor: a regular tent or its headquarters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TentSite {
    pub faction: u8,
    pub x: i32,
    pub y: i32,
    pub is_hq: bool,
}

/// Result of a territory query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Claim {
    Faction(u8),
    Wilderness,
    /// Two or more factions project influence here.
    Border,
}

impl std::fmt::Display for Claim {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Claim::Faction(id) => write!(f, "faction {} territory", id),
            Claim::Wilderness => write!(f, "wilderness"),
            Claim::Border => write!(f, "contested border"),
        }
    }
}

/// Compute the claim on `(x, y)` from the tents within `radius`.
pub fn claim(tents: &[TentSite], x: f32, y: f32, radius: f32) -> Claim {
    let radius_sq = radius * radius;
    let mut found: Option<u8> = None;

    for tent in tents {
        let dx = tent.x as f32 - x;
        let dy = tent.y as f32 - y;
        if dx * dx + dy * dy > radius_sq {
            continue;
        }
        match found {
            None => found = Some(tent.faction),
            Some(f) if f != tent.faction => return Claim::Border,
            Some(_) => {}
        }
    }

    found.map(Claim::Faction).unwrap_or(Claim::Wilderness)
}

/// A change of claim observed by a moving entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneTransition {
    /// `None` on the very first observation.
    pub from: Option<Claim>,
    pub to: Claim,
}

/// Remembers the last claim seen under an entity's feet.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ClaimTracker {
    last: Option<Claim>,
}

impl ClaimTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `current`; returns a transition when it differs from the last one.
    pub fn observe(&mut self, current: Claim) -> Option<ZoneTransition> {
        if self.last == Some(current) {
            return None;
        }
        let transition = ZoneTransition {
            from: self.last,
            to: current,
        };
        self.last = Some(current);
        Some(transition)
    }

    pub fn last(&self) -> Option<Claim> {
        self.last
    }
}
