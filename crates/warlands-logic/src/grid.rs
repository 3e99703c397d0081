//! The Grid Store: a square terrain matrix plus pending crop growth.
//!
//! Reads outside the grid return [`Tile::SENTINEL`] instead of panicking;
//! writes outside the grid are dropped and reported as `false`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::terrain::TerrainKind;

/// Integer tile coordinate. Signed so neighbours of edge tiles can be formed
/// and then rejected by bounds checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Tile containing a continuous world position.
    pub fn containing(x: f32, y: f32) -> Self {
        Self {
            x: x.floor() as i32,
            y: y.floor() as i32,
        }
    }

    /// 4-connected neighbours in up, down, left, right order.
    pub fn neighbors(self) -> [TileCoord; 4] {
        [
            TileCoord::new(self.x, self.y - 1),
            TileCoord::new(self.x, self.y + 1),
            TileCoord::new(self.x - 1, self.y),
            TileCoord::new(self.x + 1, self.y),
        ]
    }

    pub fn distance_squared(self, other: TileCoord) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        dx * dx + dy * dy
    }

    /// Centre of the tile in world units.
    pub fn center(self) -> (f32, f32) {
        (self.x as f32 + 0.5, self.y as f32 + 0.5)
    }
}

/// One grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub kind: TerrainKind,
    /// Always `kind.growth_stage()`.
    pub growth_stage: u8,
    /// Faction zone assigned during generation.
    pub faction: Option<u8>,
}

impl Tile {
    /// Returned for any coordinate outside the grid.
    pub const SENTINEL: Tile = Tile {
        kind: TerrainKind::Water,
        growth_stage: 0,
        faction: None,
    };

    pub fn new(kind: TerrainKind) -> Self {
        Self {
            kind,
            growth_stage: kind.growth_stage(),
            faction: None,
        }
    }

    pub fn with_faction(mut self, faction: Option<u8>) -> Self {
        self.faction = faction;
        self
    }
}

/// A scheduled stage advance for one tobacco tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrowthTimer {
    /// Frame at or after which the tile advances.
    pub due: u64,
    /// Kind the tile must still have for the advance to apply.
    pub expected: TerrainKind,
    /// Frames between stages, reused for the following stage.
    pub stage_frames: u64,
}

/// Square terrain matrix, row-major.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    size: usize,
    tiles: Vec<Tile>,
    growth: HashMap<TileCoord, GrowthTimer>,
}

impl Grid {
    /// A grid of `size * size` grass tiles.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            tiles: vec![Tile::new(TerrainKind::Grass); size * size],
            growth: HashMap::new(),
        }
    }

    /// Build a grid from a row-major kind matrix (`rows[y][x]`).
    ///
    /// Returns `None` unless the matrix is square and non-empty.
    pub fn from_kinds(rows: &[Vec<TerrainKind>]) -> Option<Self> {
        let size = rows.len();
        if size == 0 || rows.iter().any(|row| row.len() != size) {
            return None;
        }
        let tiles = rows
            .iter()
            .flat_map(|row| row.iter().map(|kind| Tile::new(*kind).with_faction(kind.owner())))
            .collect();
        Some(Self {
            size,
            tiles,
            growth: HashMap::new(),
        })
    }

    /// Row-major kind matrix (`rows[y][x]`), the export view of the grid.
    pub fn kinds(&self) -> Vec<Vec<TerrainKind>> {
        self.tiles
            .chunks(self.size.max(1))
            .map(|row| row.iter().map(|t| t.kind).collect())
            .collect()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.size && (y as usize) < self.size
    }

    pub fn contains(&self, coord: TileCoord) -> bool {
        self.in_bounds(coord.x, coord.y)
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if self.in_bounds(x, y) {
            Some(y as usize * self.size + x as usize)
        } else {
            None
        }
    }

    /// Tile snapshot, or [`Tile::SENTINEL`] outside the grid.
    pub fn get(&self, x: i32, y: i32) -> Tile {
        self.index(x, y)
            .map(|i| self.tiles[i])
            .unwrap_or(Tile::SENTINEL)
    }

    pub fn at(&self, coord: TileCoord) -> Tile {
        self.get(coord.x, coord.y)
    }

    /// Replace a tile. Cancels any pending growth at that coordinate.
    pub fn set(&mut self, x: i32, y: i32, tile: Tile) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.tiles[i] = Tile {
                    growth_stage: tile.kind.growth_stage(),
                    ..tile
                };
                self.growth.remove(&TileCoord::new(x, y));
                true
            }
            None => false,
        }
    }

    /// Change a tile's kind, keeping its zone faction.
    pub fn set_kind(&mut self, x: i32, y: i32, kind: TerrainKind) -> bool {
        let faction = self.get(x, y).faction;
        self.set(x, y, Tile::new(kind).with_faction(faction))
    }

    /// Walkable and inside the grid.
    pub fn is_passable(&self, x: i32, y: i32) -> bool {
        self.in_bounds(x, y) && self.get(x, y).kind.is_walkable()
    }

    /// Plant stage-1 tobacco and schedule its growth.
    pub fn plant(&mut self, coord: TileCoord, now: u64, stage_frames: u64) -> bool {
        if !self.set_kind(coord.x, coord.y, TerrainKind::Tobacco1) {
            return false;
        }
        self.growth.insert(
            coord,
            GrowthTimer {
                due: now + stage_frames,
                expected: TerrainKind::Tobacco1,
                stage_frames,
            },
        );
        true
    }

    /// Pending growth timer for a tile, if any.
    pub fn growth_timer(&self, coord: TileCoord) -> Option<GrowthTimer> {
        self.growth.get(&coord).copied()
    }

    pub fn pending_growth(&self) -> usize {
        self.growth.len()
    }

    /// Advance every due tobacco tile by one stage. Returns how many grew.
    ///
    /// A timer only fires while its tile still holds the expected stage;
    /// timers on tiles altered in the meantime are dropped.
    pub fn sweep_growth(&mut self, now: u64) -> usize {
        let due: Vec<(TileCoord, GrowthTimer)> = self
            .growth
            .iter()
            .filter(|(_, timer)| timer.due <= now)
            .map(|(coord, timer)| (*coord, *timer))
            .collect();

        let mut grown = 0;
        for (coord, timer) in due {
            let Some(i) = self.index(coord.x, coord.y) else {
                self.growth.remove(&coord);
                continue;
            };
            let tile = self.tiles[i];
            let next = match tile.kind.next_growth() {
                Some(next) if tile.kind == timer.expected => next,
                _ => {
                    self.growth.remove(&coord);
                    continue;
                }
            };
            self.tiles[i] = Tile {
                kind: next,
                growth_stage: next.growth_stage(),
                faction: tile.faction,
            };
            grown += 1;
            if next.next_growth().is_some() {
                self.growth.insert(
                    coord,
                    GrowthTimer {
                        due: timer.due + timer.stage_frames,
                        expected: next,
                        stage_frames: timer.stage_frames,
                    },
                );
            } else {
                self.growth.remove(&coord);
            }
        }
        grown
    }

    /// Count tiles of a given kind.
    pub fn count(&self, kind: TerrainKind) -> usize {
        self.tiles.iter().filter(|t| t.kind == kind).count()
    }

    /// Iterate `(coord, tile)` over the whole grid in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (TileCoord, &Tile)> + '_ {
        let size = self.size;
        self.tiles.iter().enumerate().map(move |(i, tile)| {
            (TileCoord::new((i % size) as i32, (i / size) as i32), tile)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_reads_sentinel() {
        let grid = Grid::new(8);
        for (x, y) in [(-1, 0), (0, -1), (8, 0), (0, 8), (i32::MAX, i32::MIN)] {
            assert_eq!(grid.get(x, y), Tile::SENTINEL);
            assert!(!grid.is_passable(x, y));
        }
        assert_eq!(grid.get(7, 7).kind, TerrainKind::Grass);
    }

    #[test]
    fn test_out_of_bounds_write_is_dropped() {
        let mut grid = Grid::new(4);
        assert!(!grid.set(4, 0, Tile::new(TerrainKind::House)));
        assert!(!grid.set_kind(-1, 2, TerrainKind::House));
        assert_eq!(grid.count(TerrainKind::House), 0);
    }

    #[test]
    fn test_set_normalizes_growth_stage() {
        let mut grid = Grid::new(4);
        let bogus = Tile {
            kind: TerrainKind::Grass,
            growth_stage: 3,
            faction: None,
        };
        grid.set(1, 1, bogus);
        assert_eq!(grid.get(1, 1).growth_stage, 0);
        grid.set_kind(1, 1, TerrainKind::Tobacco2);
        assert_eq!(grid.get(1, 1).growth_stage, 2);
    }

    #[test]
    fn test_set_kind_keeps_faction() {
        let mut grid = Grid::new(4);
        grid.set(2, 2, Tile::new(TerrainKind::Grass).with_faction(Some(3)));
        grid.set_kind(2, 2, TerrainKind::Farmland);
        assert_eq!(grid.get(2, 2).faction, Some(3));
    }

    #[test]
    fn test_growth_advances_through_stages() {
        let mut grid = Grid::new(4);
        let c = TileCoord::new(1, 2);
        grid.set_kind(1, 2, TerrainKind::Farmland);
        assert!(grid.plant(c, 100, 10));

        assert_eq!(grid.sweep_growth(109), 0);
        assert_eq!(grid.at(c).kind, TerrainKind::Tobacco1);

        assert_eq!(grid.sweep_growth(110), 1);
        assert_eq!(grid.at(c).kind, TerrainKind::Tobacco2);

        assert_eq!(grid.sweep_growth(120), 1);
        assert_eq!(grid.at(c).kind, TerrainKind::Tobacco3);
        assert_eq!(grid.pending_growth(), 0);
    }

    #[test]
    fn test_growth_skips_altered_tile() {
        let mut grid = Grid::new(4);
        let c = TileCoord::new(0, 0);
        grid.plant(c, 0, 5);
        // Someone harvests/tramples the crop through the raw tile map.
        grid.tiles[0] = Tile::new(TerrainKind::Farmland);
        assert_eq!(grid.sweep_growth(50), 0);
        assert_eq!(grid.at(c).kind, TerrainKind::Farmland);
        assert_eq!(grid.pending_growth(), 0);
    }

    #[test]
    fn test_set_cancels_growth() {
        let mut grid = Grid::new(4);
        let c = TileCoord::new(3, 3);
        grid.plant(c, 0, 5);
        grid.set_kind(3, 3, TerrainKind::Farmland);
        assert!(grid.growth_timer(c).is_none());
    }

    #[test]
    fn test_kinds_roundtrip() {
        let mut grid = Grid::new(3);
        grid.set_kind(0, 1, TerrainKind::Forest);
        grid.set_kind(2, 0, TerrainKind::Headquarters(1));
        let rebuilt = Grid::from_kinds(&grid.kinds()).unwrap();
        assert_eq!(rebuilt.kinds(), grid.kinds());
        assert_eq!(rebuilt.get(2, 0).faction, Some(1));
    }

    #[test]
    fn test_from_kinds_rejects_ragged() {
        let rows = vec![vec![TerrainKind::Grass; 2], vec![TerrainKind::Grass; 3]];
        assert!(Grid::from_kinds(&rows).is_none());
        assert!(Grid::from_kinds(&[]).is_none());
    }
}
