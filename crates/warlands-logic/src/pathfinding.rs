//! Breadth-first search over the terrain grid.
//!
//! Two queries: the nearest tile matching a predicate (radius-capped), and
//! the next step of a shortest 4-connected route to a known target. Neither
//! knows terrain rules beyond bounds; callers pass predicates for that.

use std::collections::{HashSet, VecDeque};

use crate::grid::{Grid, Tile, TileCoord};

const UNVISITED: u32 = u32::MAX;

/// Nearest tile (excluding `start`) for which `predicate` holds, searching no
/// farther than `max_radius` steps. Returns `None` once the cap is exhausted.
pub fn find_nearest_tile(
    grid: &Grid,
    start: TileCoord,
    max_radius: u32,
    predicate: impl Fn(&Tile) -> bool,
) -> Option<TileCoord> {
    if !grid.contains(start) {
        return None;
    }

    let mut visited = HashSet::new();
    let mut queue: VecDeque<(TileCoord, u32)> = VecDeque::new();
    visited.insert(start);
    queue.push_back((start, 0));

    while let Some((current, dist)) = queue.pop_front() {
        if dist > max_radius {
            break;
        }
        if dist > 0 && predicate(&grid.at(current)) {
            return Some(current);
        }
        for next in current.neighbors() {
            if grid.contains(next) && visited.insert(next) {
                queue.push_back((next, dist + 1));
            }
        }
    }

    None
}

/// First step of a shortest route from `start` to `target` over in-bounds tiles.
pub fn route_next_step(grid: &Grid, start: TileCoord, target: TileCoord) -> Option<TileCoord> {
    route_next_step_with(grid, start, target, |_, _| true)
}

/// Like [`route_next_step`], but only expands through tiles accepted by
/// `passable`. The target itself is always enterable.
///
/// The search is not radius-capped: callers only route toward coordinates
/// they have already discovered.
pub fn route_next_step_with(
    grid: &Grid,
    start: TileCoord,
    target: TileCoord,
    passable: impl Fn(TileCoord, &Tile) -> bool,
) -> Option<TileCoord> {
    if start == target || !grid.contains(start) || !grid.contains(target) {
        return None;
    }

    // Parent links over flat tile indices; the start links to itself.
    let size = grid.size();
    let index = |c: TileCoord| c.y as usize * size + c.x as usize;
    let mut parent = vec![UNVISITED; size * size];
    let mut queue: VecDeque<TileCoord> = VecDeque::new();
    parent[index(start)] = index(start) as u32;
    queue.push_back(start);

    let mut found = false;
    while let Some(current) = queue.pop_front() {
        if current == target {
            found = true;
            break;
        }
        for next in current.neighbors() {
            if !grid.contains(next) || parent[index(next)] != UNVISITED {
                continue;
            }
            if next != target && !passable(next, &grid.at(next)) {
                continue;
            }
            parent[index(next)] = index(current) as u32;
            queue.push_back(next);
        }
    }

    if !found {
        return None;
    }

    let origin = index(start);
    let mut node = index(target);
    let mut step = node;
    while node != origin {
        step = node;
        node = parent[node] as usize;
    }
    Some(TileCoord::new((step % size) as i32, (step / size) as i32))
}

/// Random-walk candidates: the in-bounds 4-neighbours of `from`.
pub fn open_neighbors(grid: &Grid, from: TileCoord) -> Vec<TileCoord> {
    from.neighbors()
        .into_iter()
        .filter(|c| grid.contains(*c))
        .collect()
}
