//! Projectile kinematics and hit testing.
//!
//! Projectiles travel along one of four cardinal directions at constant
//! speed and expire after a fixed number of frames.

use serde::{Deserialize, Serialize};

use crate::constants::combat;

/// Cardinal facing shared by projectiles, agents and the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    #[default]
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit step `(dx, dy)`; y grows downward.
    pub fn delta(self) -> (f32, f32) {
        match self {
            Direction::Up => (0.0, -1.0),
            Direction::Down => (0.0, 1.0),
            Direction::Left => (-1.0, 0.0),
            Direction::Right => (1.0, 0.0),
        }
    }

    /// Dominant-axis direction of `(dx, dy)`. Ties go vertical.
    pub fn toward(dx: f32, dy: f32) -> Self {
        if dx.abs() > dy.abs() {
            if dx > 0.0 {
                Direction::Right
            } else {
                Direction::Left
            }
        } else if dy > 0.0 {
            Direction::Down
        } else {
            Direction::Up
        }
    }
}

/// Who pulled the trigger. Selects the spawn policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileOrigin {
    Player,
    Npc,
}

/// Speed, damage and lifetime assigned at spawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectilePolicy {
    pub speed: f32,
    pub damage: i32,
    pub lifetime: u32,
}

impl ProjectilePolicy {
    /// Both origins currently fire the same round.
    pub fn for_origin(_origin: ProjectileOrigin) -> Self {
        Self {
            speed: combat::PROJECTILE_SPEED,
            damage: combat::PROJECTILE_DAMAGE,
            lifetime: combat::PROJECTILE_LIFETIME,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub x: f32,
    pub y: f32,
    pub direction: Direction,
    pub speed: f32,
    pub damage: i32,
    pub ticks_remaining: u32,
    pub origin: ProjectileOrigin,
}

impl Projectile {
    pub fn spawn(x: f32, y: f32, direction: Direction, origin: ProjectileOrigin) -> Self {
        let policy = ProjectilePolicy::for_origin(origin);
        Self {
            x,
            y,
            direction,
            speed: policy.speed,
            damage: policy.damage,
            ticks_remaining: policy.lifetime,
            origin,
        }
    }

    /// Move one frame and burn one tick of lifetime.
    pub fn advance(&mut self) {
        let (dx, dy) = self.direction.delta();
        self.x += dx * self.speed;
        self.y += dy * self.speed;
        self.ticks_remaining = self.ticks_remaining.saturating_sub(1);
    }

    pub fn is_expired(&self) -> bool {
        self.ticks_remaining == 0
    }

    /// Both axis deltas strictly below `threshold`.
    pub fn hits(&self, x: f32, y: f32, threshold: f32) -> bool {
        (self.x - x).abs() < threshold && (self.y - y).abs() < threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_travels_speed_times_lifetime() {
        let mut p = Projectile::spawn(10.0, 4.0, Direction::Right, ProjectileOrigin::Player);
        let mut frames = 0;
        while !p.is_expired() {
            p.advance();
            frames += 1;
        }
        assert_eq!(frames, 60);
        assert!((p.x - (10.0 + 1.5 * 60.0)).abs() < 1e-4);
        assert_eq!(p.y, 4.0);
    }

    #[test]
    fn test_hit_threshold_is_strict() {
        let p = Projectile::spawn(10.0, 10.0, Direction::Up, ProjectileOrigin::Npc);
        assert!(p.hits(10.3, 10.2, 0.5));
        assert!(!p.hits(10.6, 10.6, 0.5));
        assert!(!p.hits(10.5, 10.0, 0.5));
    }

    #[test]
    fn test_direction_toward() {
        assert_eq!(Direction::toward(5.0, 1.0), Direction::Right);
        assert_eq!(Direction::toward(-5.0, 1.0), Direction::Left);
        assert_eq!(Direction::toward(1.0, 5.0), Direction::Down);
        assert_eq!(Direction::toward(1.0, -5.0), Direction::Up);
        assert_eq!(Direction::toward(2.0, 2.0), Direction::Down);
    }
}
