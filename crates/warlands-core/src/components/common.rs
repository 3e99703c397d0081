//! Common components used across agent kinds.

use serde::{Deserialize, Serialize};
use warlands_logic::combat::Direction;
use warlands_logic::TileCoord;

/// Continuous world position. Tile occupancy is `floor(x), floor(y)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Centre of a tile.
    pub fn at_tile(tile: TileCoord) -> Self {
        let (x, y) = tile.center();
        Self { x, y }
    }

    pub fn tile(&self) -> TileCoord {
        TileCoord::containing(self.x, self.y)
    }

    pub fn distance_squared(&self, x: f32, y: f32) -> f32 {
        let dx = self.x - x;
        let dy = self.y - y;
        dx * dx + dy * dy
    }

    pub fn distance(&self, x: f32, y: f32) -> f32 {
        self.distance_squared(x, y).sqrt()
    }
}

/// Direction an entity is looking or last moved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facing(pub Direction);

/// Hit points. Zero or below means dead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health(pub i32);

impl Health {
    pub fn is_dead(&self) -> bool {
        self.0 <= 0
    }
}

/// Display name, e.g. "Luka - Smuggler"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Name(pub String);
