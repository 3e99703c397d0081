//! Tile-snapped agent movement shared by the agent systems

use rand::seq::SliceRandom;
use rand::Rng;
use warlands_logic::combat::Direction;
use warlands_logic::pathfinding::{open_neighbors, route_next_step};
use warlands_logic::{Grid, TileCoord};

use crate::components::{Facing, Position};

/// Put an agent on the centre of `next`, facing the way it moved.
pub fn snap_to(pos: &mut Position, facing: &mut Facing, next: TileCoord) {
    let from = pos.tile();
    let (dx, dy) = ((next.x - from.x) as f32, (next.y - from.y) as f32);
    if dx != 0.0 || dy != 0.0 {
        facing.0 = Direction::toward(dx, dy);
    }
    *pos = Position::at_tile(next);
}

/// One step to a random in-bounds neighbour. Returns false when boxed in.
pub fn step_randomly(grid: &Grid, pos: &mut Position, facing: &mut Facing, rng: &mut impl Rng) -> bool {
    let options = open_neighbors(grid, pos.tile());
    match options.choose(rng) {
        Some(&next) => {
            snap_to(pos, facing, next);
            true
        }
        None => false,
    }
}

/// One step along a shortest route to `target`, or a random step when the
/// route cannot be found.
pub fn step_toward(
    grid: &Grid,
    pos: &mut Position,
    facing: &mut Facing,
    target: TileCoord,
    rng: &mut impl Rng,
) {
    match route_next_step(grid, pos.tile(), target) {
        Some(next) => snap_to(pos, facing, next),
        None => {
            step_randomly(grid, pos, facing, rng);
        }
    }
}
