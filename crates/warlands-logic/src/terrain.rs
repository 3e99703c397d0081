//! Terrain kinds and their gameplay properties.

use serde::{Deserialize, Serialize};

/// Faction emblems, indexed by faction id. Used in tent and HQ tile names.
pub const FACTION_EMBLEMS: [&str; 5] = ["ak", "coin", "sword", "tobacco", "wolf"];

/// What occupies a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerrainKind {
    Grass,
    Dirt,
    Farmland,
    Tobacco1,
    Tobacco2,
    Tobacco3,
    Forest,
    /// Rivers and the out-of-bounds sentinel.
    Water,
    RoadHorizontal,
    RoadVertical,
    House,
    Tent(u8),
    Headquarters(u8),
    GunsellerTable,
    TobaccoTable,
}

impl TerrainKind {
    /// Crop growth stage. Zero for farmland and every non-crop kind.
    pub fn growth_stage(self) -> u8 {
        match self {
            TerrainKind::Tobacco1 => 1,
            TerrainKind::Tobacco2 => 2,
            TerrainKind::Tobacco3 => 3,
            _ => 0,
        }
    }

    /// Farmland and the three tobacco stages.
    pub fn is_crop(self) -> bool {
        matches!(
            self,
            TerrainKind::Farmland
                | TerrainKind::Tobacco1
                | TerrainKind::Tobacco2
                | TerrainKind::Tobacco3
        )
    }

    /// Whether the player and wandering agents may step onto this tile.
    pub fn is_walkable(self) -> bool {
        !matches!(self, TerrainKind::Forest | TerrainKind::House)
    }

    /// Open ground that structures and roads may replace.
    pub fn is_buildable(self) -> bool {
        matches!(
            self,
            TerrainKind::Grass | TerrainKind::Dirt | TerrainKind::Farmland
        )
    }

    pub fn is_road(self) -> bool {
        matches!(self, TerrainKind::RoadHorizontal | TerrainKind::RoadVertical)
    }

    /// Placed structures: tents, headquarters and trade tables.
    pub fn is_special(self) -> bool {
        matches!(
            self,
            TerrainKind::Tent(_)
                | TerrainKind::Headquarters(_)
                | TerrainKind::GunsellerTable
                | TerrainKind::TobaccoTable
        )
    }

    /// Faction encoded in the kind itself (tents and headquarters only).
    pub fn owner(self) -> Option<u8> {
        match self {
            TerrainKind::Tent(f) | TerrainKind::Headquarters(f) => Some(f),
            _ => None,
        }
    }

    /// The next tobacco stage, if this kind grows.
    pub fn next_growth(self) -> Option<TerrainKind> {
        match self {
            TerrainKind::Tobacco1 => Some(TerrainKind::Tobacco2),
            TerrainKind::Tobacco2 => Some(TerrainKind::Tobacco3),
            _ => None,
        }
    }

    /// Stable name used by map export.
    pub fn name(self) -> String {
        match self {
            TerrainKind::Grass => "grass".into(),
            TerrainKind::Dirt => "dirt".into(),
            TerrainKind::Farmland => "farmland".into(),
            TerrainKind::Tobacco1 => "tobacco-1".into(),
            TerrainKind::Tobacco2 => "tobacco-2".into(),
            TerrainKind::Tobacco3 => "tobacco-3".into(),
            TerrainKind::Forest => "tree-tile".into(),
            TerrainKind::Water => "ocean".into(),
            TerrainKind::RoadHorizontal => "road-lr".into(),
            TerrainKind::RoadVertical => "road-td".into(),
            TerrainKind::House => "house-1".into(),
            TerrainKind::Tent(f) => format!("tent-{}", emblem(f)),
            TerrainKind::Headquarters(f) => format!("hq-{}", emblem(f)),
            TerrainKind::GunsellerTable => "gunseller-table".into(),
            TerrainKind::TobaccoTable => "tobacco-table".into(),
        }
    }

    /// Inverse of [`TerrainKind::name`].
    pub fn from_name(name: &str) -> Option<TerrainKind> {
        let kind = match name {
            "grass" => TerrainKind::Grass,
            "dirt" => TerrainKind::Dirt,
            "farmland" => TerrainKind::Farmland,
            "tobacco-1" => TerrainKind::Tobacco1,
            "tobacco-2" => TerrainKind::Tobacco2,
            "tobacco-3" => TerrainKind::Tobacco3,
            "tree-tile" => TerrainKind::Forest,
            "ocean" => TerrainKind::Water,
            "road-lr" => TerrainKind::RoadHorizontal,
            "road-td" => TerrainKind::RoadVertical,
            "house-1" => TerrainKind::House,
            "gunseller-table" => TerrainKind::GunsellerTable,
            "tobacco-table" => TerrainKind::TobaccoTable,
            other => {
                if let Some(e) = other.strip_prefix("tent-") {
                    TerrainKind::Tent(faction_from_emblem(e)?)
                } else if let Some(e) = other.strip_prefix("hq-") {
                    TerrainKind::Headquarters(faction_from_emblem(e)?)
                } else {
                    return None;
                }
            }
        };
        Some(kind)
    }
}

/// Emblem for a faction id; `f<N>` past the named five.
pub fn emblem(faction: u8) -> String {
    FACTION_EMBLEMS
        .get(faction as usize)
        .map(|e| (*e).to_string())
        .unwrap_or_else(|| format!("f{}", faction))
}

fn faction_from_emblem(emblem: &str) -> Option<u8> {
    if let Some(idx) = FACTION_EMBLEMS.iter().position(|e| *e == emblem) {
        return Some(idx as u8);
    }
    emblem.strip_prefix('f')?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [TerrainKind; 17] = [
        TerrainKind::Grass,
        TerrainKind::Dirt,
        TerrainKind::Farmland,
        TerrainKind::Tobacco1,
        TerrainKind::Tobacco2,
        TerrainKind::Tobacco3,
        TerrainKind::Forest,
        TerrainKind::Water,
        TerrainKind::RoadHorizontal,
        TerrainKind::RoadVertical,
        TerrainKind::House,
        TerrainKind::Tent(0),
        TerrainKind::Tent(4),
        TerrainKind::Headquarters(2),
        TerrainKind::Headquarters(9),
        TerrainKind::GunsellerTable,
        TerrainKind::TobaccoTable,
    ];

    #[test]
    fn test_names_parse_back() {
        for kind in ALL {
            assert_eq!(TerrainKind::from_name(&kind.name()), Some(kind));
        }
        assert_eq!(TerrainKind::from_name("lava"), None);
        assert_eq!(TerrainKind::from_name("hq-unicorn"), None);
    }

    #[test]
    fn test_growth_stage_only_for_crops() {
        for kind in ALL {
            if !kind.is_crop() {
                assert_eq!(kind.growth_stage(), 0, "{:?}", kind);
            }
        }
        assert_eq!(TerrainKind::Farmland.growth_stage(), 0);
        assert_eq!(TerrainKind::Tobacco3.growth_stage(), 3);
    }

    #[test]
    fn test_growth_chain_ends_at_stage_three() {
        assert_eq!(TerrainKind::Tobacco1.next_growth(), Some(TerrainKind::Tobacco2));
        assert_eq!(TerrainKind::Tobacco2.next_growth(), Some(TerrainKind::Tobacco3));
        assert_eq!(TerrainKind::Tobacco3.next_growth(), None);
        assert_eq!(TerrainKind::Farmland.next_growth(), None);
    }

    #[test]
    fn test_hq_names_use_emblems() {
        assert_eq!(TerrainKind::Headquarters(0).name(), "hq-ak");
        assert_eq!(TerrainKind::Tent(4).name(), "tent-wolf");
        assert_eq!(TerrainKind::Tent(7).name(), "tent-f7");
    }

    #[test]
    fn test_walkability() {
        assert!(!TerrainKind::Forest.is_walkable());
        assert!(!TerrainKind::House.is_walkable());
        assert!(TerrainKind::RoadVertical.is_walkable());
        assert!(TerrainKind::Grass.is_buildable());
        assert!(!TerrainKind::Tent(1).is_buildable());
    }
}
