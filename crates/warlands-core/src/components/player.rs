use serde::{Deserialize, Serialize};
use warlands_logic::combat::Direction;
use warlands_logic::constants::combat;
use warlands_logic::TileCoord;

/// The human-controlled character. Lives outside the ECS world.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub facing: Direction,
    pub health: i32,
}

impl Player {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            facing: Direction::default(),
            health: combat::PLAYER_HEALTH,
        }
    }

    pub fn tile(&self) -> TileCoord {
        TileCoord::containing(self.x, self.y)
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }
}
