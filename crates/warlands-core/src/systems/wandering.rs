//! Wandering system - aimless half-tile steps for everyone but smugglers

use hecs::World;
use rand::Rng;
use warlands_logic::combat::Direction;
use warlands_logic::constants::agents;
use warlands_logic::{Grid, TileCoord};

use crate::components::{Agent, AgentKind, Facing, Position};

/// Each non-smuggler agent picks one of the four directions or stays put,
/// then moves half a tile unless the destination tile blocks it.
pub fn wandering_system(world: &mut World, grid: &Grid, rng: &mut impl Rng) {
    for (_, (agent, pos, facing)) in world.query_mut::<(&Agent, &mut Position, &mut Facing)>() {
        if agent.kind == AgentKind::Smuggler {
            continue;
        }
        // Index 4 means stay.
        let choice = rng.gen_range(0..=Direction::ALL.len());
        let Some(&direction) = Direction::ALL.get(choice) else {
            continue;
        };
        wander_step(grid, pos, facing, direction);
    }
}

/// Try a single wander step. Returns whether the agent moved.
pub fn wander_step(grid: &Grid, pos: &mut Position, facing: &mut Facing, direction: Direction) -> bool {
    let (dx, dy) = direction.delta();
    let nx = pos.x + dx * agents::WANDER_STEP;
    let ny = pos.y + dy * agents::WANDER_STEP;
    let target = TileCoord::containing(nx, ny);
    if !grid.is_passable(target.x, target.y) {
        return false;
    }
    pos.x = nx;
    pos.y = ny;
    facing.0 = direction;
    true
}
