//! Smuggler system - the farm, trade, arm, fight loop
//!
//! Every agent tick each smuggler runs exactly one phase handler. Handlers
//! either act on the tile underfoot, take one step toward something they
//! need, or hand over to the next phase.

use hecs::World;
use rand::Rng;
use warlands_logic::combat::Direction;
use warlands_logic::constants::{agents, pathfinding};
use warlands_logic::pathfinding::find_nearest_tile;
use warlands_logic::{Grid, TerrainKind, TileCoord};

use super::movement::{step_randomly, step_toward};
use crate::components::*;

/// World state a smuggler can see and touch during its step.
pub struct SmugglerEnv<'a> {
    pub grid: &'a mut Grid,
    /// Shared coin pool: credited by tobacco sales, emptied by ammo purchases.
    pub economy: &'a mut u64,
    pub villagers: &'a [Position],
    pub gunsellers: &'a [Position],
    pub player: (f32, f32),
    pub frame: u64,
    pub stage_frames: u64,
}

/// Run one agent tick for every smuggler in the world.
pub fn smuggler_system(
    world: &mut World,
    grid: &mut Grid,
    economy: &mut u64,
    player: (f32, f32),
    frame: u64,
    stage_frames: u64,
    rng: &mut impl Rng,
) {
    let mut villagers = Vec::new();
    let mut gunsellers = Vec::new();
    for (_, (agent, pos)) in world.query::<(&Agent, &Position)>().iter() {
        match agent.kind {
            AgentKind::Villager => villagers.push(*pos),
            AgentKind::Gunseller => gunsellers.push(*pos),
            _ => {}
        }
    }

    let mut env = SmugglerEnv {
        grid,
        economy,
        villagers: &villagers,
        gunsellers: &gunsellers,
        player,
        frame,
        stage_frames,
    };

    for (_, (agent, smuggler, pos, facing)) in
        world.query_mut::<(&Agent, &mut Smuggler, &mut Position, &mut Facing)>()
    {
        let before = smuggler.state;
        step(smuggler, pos, facing, &mut env, rng);
        if before.name() != smuggler.state.name() {
            log::debug!(
                "Smuggler {} {} -> {} (tobacco {}, ammo {})",
                agent.id,
                before.name(),
                smuggler.state.name(),
                smuggler.data.tobacco,
                smuggler.data.ammo
            );
        }
    }
}

/// Advance one smuggler by one agent tick.
pub fn step(
    smuggler: &mut Smuggler,
    pos: &mut Position,
    facing: &mut Facing,
    env: &mut SmugglerEnv<'_>,
    rng: &mut impl Rng,
) {
    if !env.grid.contains(pos.tile()) {
        return;
    }
    if smuggler.data.tobacco >= agents::TRADE_THRESHOLD && !smuggler.state.is_market_bound() {
        smuggler.state = SmugglerState::Trading;
    }

    let data = &mut smuggler.data;
    smuggler.state = match smuggler.state {
        SmugglerState::Farming => farm(data, pos, facing, env, rng),
        SmugglerState::Planting => plant(pos, facing, env, rng),
        SmugglerState::Harvesting { target } => harvest(data, target, pos, facing, env, rng),
        SmugglerState::Trading => sell_tobacco(data, pos, facing, env, rng),
        SmugglerState::AmmoTrading => buy_ammo(data, pos, facing, env, rng),
        SmugglerState::Combat => fight(data, pos, facing, env, rng),
    };
}

fn nearest(grid: &Grid, from: TileCoord, kind: TerrainKind) -> Option<TileCoord> {
    find_nearest_tile(grid, from, pathfinding::MAX_SEARCH_RADIUS, |t| t.kind == kind)
}

/// Walk toward `target` if there is one, otherwise wander.
fn seek(
    target: Option<TileCoord>,
    pos: &mut Position,
    facing: &mut Facing,
    env: &SmugglerEnv<'_>,
    rng: &mut impl Rng,
) {
    match target {
        Some(target) => step_toward(env.grid, pos, facing, target, rng),
        None => {
            step_randomly(env.grid, pos, facing, rng);
        }
    }
}

fn farm(
    data: &mut SmugglerData,
    pos: &mut Position,
    facing: &mut Facing,
    env: &mut SmugglerEnv<'_>,
    rng: &mut impl Rng,
) -> SmugglerState {
    let here = pos.tile();
    if env.grid.at(here).kind == TerrainKind::Grass {
        env.grid.set_kind(here.x, here.y, TerrainKind::Farmland);
        data.tiles_transformed += 1;
        if data.tiles_transformed >= agents::FARMLAND_QUOTA {
            data.tiles_transformed = 0;
            return SmugglerState::Planting;
        }
        return SmugglerState::Farming;
    }
    let target = nearest(env.grid, here, TerrainKind::Grass);
    seek(target, pos, facing, env, rng);
    SmugglerState::Farming
}

fn plant(
    pos: &mut Position,
    facing: &mut Facing,
    env: &mut SmugglerEnv<'_>,
    rng: &mut impl Rng,
) -> SmugglerState {
    let here = pos.tile();
    if let Some(ripe) = nearest(env.grid, here, TerrainKind::Tobacco3) {
        return SmugglerState::Harvesting { target: Some(ripe) };
    }
    if env.grid.at(here).kind == TerrainKind::Farmland {
        env.grid.plant(here, env.frame, env.stage_frames);
        return SmugglerState::Planting;
    }
    let target = nearest(env.grid, here, TerrainKind::Farmland);
    seek(target, pos, facing, env, rng);
    SmugglerState::Planting
}

fn harvest(
    data: &mut SmugglerData,
    target: Option<TileCoord>,
    pos: &mut Position,
    facing: &mut Facing,
    env: &mut SmugglerEnv<'_>,
    rng: &mut impl Rng,
) -> SmugglerState {
    let here = pos.tile();
    if env.grid.at(here).kind == TerrainKind::Tobacco3 {
        let yield_amount = rng.gen_range(agents::HARVEST_MIN..=agents::HARVEST_MAX);
        data.tobacco += yield_amount;
        env.grid.set_kind(here.x, here.y, TerrainKind::Farmland);
        log::debug!("Harvested {} tobacco at ({}, {})", yield_amount, here.x, here.y);
        return if data.tobacco < agents::TRADE_THRESHOLD {
            SmugglerState::Planting
        } else {
            SmugglerState::Trading
        };
    }

    let still_ripe = target.filter(|t| env.grid.at(*t).kind == TerrainKind::Tobacco3);
    match still_ripe.or_else(|| nearest(env.grid, here, TerrainKind::Tobacco3)) {
        Some(target) => {
            step_toward(env.grid, pos, facing, target, rng);
            SmugglerState::Harvesting { target: Some(target) }
        }
        None => SmugglerState::Planting,
    }
}

/// Nearest position within the trade search radius.
fn nearest_partner(partners: &[Position], pos: &Position) -> Option<Position> {
    partners
        .iter()
        .map(|p| (*p, pos.distance(p.x, p.y)))
        .filter(|(_, d)| *d <= agents::TRADE_SEARCH_RADIUS)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(p, _)| p)
}

/// Sum of one 3..=5 roll per unit.
fn convert(units: u64, rng: &mut impl Rng) -> u64 {
    (0..units)
        .map(|_| rng.gen_range(agents::RATE_MIN..=agents::RATE_MAX) as u64)
        .sum()
}

/// Approach `partner`; true once within trading reach.
fn reach(
    partner: Option<Position>,
    pos: &mut Position,
    facing: &mut Facing,
    env: &SmugglerEnv<'_>,
    rng: &mut impl Rng,
) -> bool {
    let Some(partner) = partner else {
        step_randomly(env.grid, pos, facing, rng);
        return false;
    };
    if pos.distance(partner.x, partner.y) > agents::TRADE_REACH {
        step_toward(env.grid, pos, facing, partner.tile(), rng);
        return false;
    }
    true
}

fn sell_tobacco(
    data: &mut SmugglerData,
    pos: &mut Position,
    facing: &mut Facing,
    env: &mut SmugglerEnv<'_>,
    rng: &mut impl Rng,
) -> SmugglerState {
    let partner = nearest_partner(env.villagers, pos);
    if !reach(partner, pos, facing, env, rng) {
        return SmugglerState::Trading;
    }
    let coins = convert(data.tobacco as u64, rng);
    log::debug!("Sold {} tobacco for {} coins", data.tobacco, coins);
    *env.economy += coins;
    data.tobacco = 0;
    SmugglerState::AmmoTrading
}

fn buy_ammo(
    data: &mut SmugglerData,
    pos: &mut Position,
    facing: &mut Facing,
    env: &mut SmugglerEnv<'_>,
    rng: &mut impl Rng,
) -> SmugglerState {
    let partner = nearest_partner(env.gunsellers, pos);
    if !reach(partner, pos, facing, env, rng) {
        return SmugglerState::AmmoTrading;
    }
    let coins = *env.economy;
    if coins == 0 {
        log::warn!("No coins in the pool to buy ammo");
        return SmugglerState::Farming;
    }
    let ammo = convert(coins, rng);
    data.ammo = data.ammo.saturating_add(ammo.min(u32::MAX as u64) as u32);
    *env.economy = 0;
    log::debug!("Bought {} ammo for {} coins", ammo, coins);
    if data.ammo >= agents::COMBAT_AMMO_THRESHOLD {
        SmugglerState::Combat
    } else {
        SmugglerState::Farming
    }
}

fn fight(
    data: &mut SmugglerData,
    pos: &mut Position,
    facing: &mut Facing,
    env: &mut SmugglerEnv<'_>,
    rng: &mut impl Rng,
) -> SmugglerState {
    if data.ammo < agents::COMBAT_AMMO_THRESHOLD {
        return SmugglerState::Farming;
    }
    let (px, py) = env.player;
    if pos.distance(px, py) > agents::ENGAGEMENT_DISTANCE {
        step_toward(env.grid, pos, facing, TileCoord::containing(px, py), rng);
    } else {
        facing.0 = Direction::toward(px - pos.x, py - pos.y);
    }
    SmugglerState::Combat
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct Fixture {
        grid: Grid,
        economy: u64,
        villagers: Vec<Position>,
        gunsellers: Vec<Position>,
        player: (f32, f32),
        smuggler: Smuggler,
        pos: Position,
        facing: Facing,
        rng: StdRng,
    }

    impl Fixture {
        fn new(size: usize, x: i32, y: i32) -> Self {
            Self {
                grid: Grid::new(size),
                economy: 0,
                villagers: Vec::new(),
                gunsellers: Vec::new(),
                player: (0.5, 0.5),
                smuggler: Smuggler::new(),
                pos: Position::at_tile(TileCoord::new(x, y)),
                facing: Facing::default(),
                rng: StdRng::seed_from_u64(7),
            }
        }

        fn tick(&mut self) {
            let mut env = SmugglerEnv {
                grid: &mut self.grid,
                economy: &mut self.economy,
                villagers: &self.villagers,
                gunsellers: &self.gunsellers,
                player: self.player,
                frame: 0,
                stage_frames: agents::GROWTH_STAGE_FRAMES,
            };
            step(&mut self.smuggler, &mut self.pos, &mut self.facing, &mut env, &mut self.rng);
        }
    }

    #[test]
    fn test_ten_conversions_switch_to_planting() {
        let mut f = Fixture::new(12, 6, 6);
        for _ in 0..100 {
            f.tick();
            if f.smuggler.state != SmugglerState::Farming {
                break;
            }
        }
        assert_eq!(f.smuggler.state, SmugglerState::Planting);
        assert_eq!(f.smuggler.data.tiles_transformed, 0);
        assert_eq!(f.grid.count(TerrainKind::Farmland), 10);
    }

    #[test]
    fn test_overstock_forces_trading() {
        let mut f = Fixture::new(8, 3, 3);
        f.smuggler.data.tobacco = 50;
        f.tick();
        assert_eq!(f.smuggler.state, SmugglerState::Trading);
        // No grass was converted on the way.
        assert_eq!(f.grid.count(TerrainKind::Farmland), 0);
    }

    #[test]
    fn test_override_leaves_combat_alone() {
        let mut f = Fixture::new(8, 3, 3);
        f.smuggler.state = SmugglerState::Combat;
        f.smuggler.data.tobacco = 80;
        f.smuggler.data.ammo = 400;
        f.player = (3.5, 4.5);
        f.tick();
        assert_eq!(f.smuggler.state, SmugglerState::Combat);
    }

    #[test]
    fn test_planting_on_farmland_schedules_growth() {
        let mut f = Fixture::new(8, 2, 2);
        f.smuggler.state = SmugglerState::Planting;
        f.grid.set_kind(2, 2, TerrainKind::Farmland);
        f.tick();
        let here = TileCoord::new(2, 2);
        assert_eq!(f.grid.at(here).kind, TerrainKind::Tobacco1);
        assert_eq!(f.grid.growth_timer(here).map(|t| t.due), Some(agents::GROWTH_STAGE_FRAMES));
    }

    #[test]
    fn test_planting_spots_ripe_tobacco() {
        let mut f = Fixture::new(20, 2, 2);
        f.smuggler.state = SmugglerState::Planting;
        f.grid.set_kind(6, 2, TerrainKind::Tobacco3);
        f.tick();
        assert_eq!(
            f.smuggler.state,
            SmugglerState::Harvesting {
                target: Some(TileCoord::new(6, 2))
            }
        );
    }

    #[test]
    fn test_harvest_yields_and_resets_tile() {
        let mut f = Fixture::new(8, 4, 4);
        f.smuggler.state = SmugglerState::Harvesting { target: None };
        f.grid.set_kind(4, 4, TerrainKind::Tobacco3);
        f.tick();
        let tobacco = f.smuggler.data.tobacco;
        assert!((agents::HARVEST_MIN..=agents::HARVEST_MAX).contains(&tobacco));
        assert_eq!(f.grid.get(4, 4).kind, TerrainKind::Farmland);
        assert_eq!(f.smuggler.state, SmugglerState::Planting);
    }

    #[test]
    fn test_harvest_without_targets_replants() {
        let mut f = Fixture::new(8, 4, 4);
        f.smuggler.state = SmugglerState::Harvesting { target: None };
        f.tick();
        assert_eq!(f.smuggler.state, SmugglerState::Planting);
    }

    #[test]
    fn test_harvest_walks_to_target() {
        let mut f = Fixture::new(10, 1, 1);
        f.smuggler.state = SmugglerState::Harvesting { target: None };
        f.grid.set_kind(5, 1, TerrainKind::Tobacco3);
        f.tick();
        assert_eq!(f.pos.tile(), TileCoord::new(2, 1));
        assert_eq!(f.facing.0, Direction::Right);
    }

    #[test]
    fn test_sale_credits_pool() {
        let mut f = Fixture::new(8, 3, 3);
        f.smuggler.state = SmugglerState::Trading;
        f.smuggler.data.tobacco = 50;
        f.villagers.push(Position::new(3.7, 3.5));
        f.tick();
        assert_eq!(f.smuggler.state, SmugglerState::AmmoTrading);
        assert_eq!(f.smuggler.data.tobacco, 0);
        assert!((150..=250).contains(&f.economy));
    }

    #[test]
    fn test_trading_approaches_distant_villager() {
        let mut f = Fixture::new(30, 2, 2);
        f.smuggler.state = SmugglerState::Trading;
        f.smuggler.data.tobacco = 60;
        f.villagers.push(Position::at_tile(TileCoord::new(20, 2)));
        f.tick();
        assert_eq!(f.smuggler.state, SmugglerState::Trading);
        assert_eq!(f.pos.tile(), TileCoord::new(3, 2));
    }

    #[test]
    fn test_ammo_purchase_with_empty_pool() {
        let mut f = Fixture::new(8, 3, 3);
        f.smuggler.state = SmugglerState::AmmoTrading;
        f.gunsellers.push(Position::at_tile(TileCoord::new(3, 3)));
        f.tick();
        assert_eq!(f.smuggler.state, SmugglerState::Farming);
        assert_eq!(f.smuggler.data.ammo, 0);
    }

    #[test]
    fn test_ammo_purchase_arms_for_combat() {
        let mut f = Fixture::new(8, 3, 3);
        f.smuggler.state = SmugglerState::AmmoTrading;
        f.economy = 100;
        f.gunsellers.push(Position::at_tile(TileCoord::new(3, 3)));
        f.tick();
        assert_eq!(f.economy, 0);
        assert!(f.smuggler.data.ammo >= 300);
        assert_eq!(f.smuggler.state, SmugglerState::Combat);
    }

    #[test]
    fn test_combat_requires_ammo() {
        let mut f = Fixture::new(8, 3, 3);
        f.smuggler.state = SmugglerState::Combat;
        f.smuggler.data.ammo = 299;
        f.tick();
        assert_eq!(f.smuggler.state, SmugglerState::Farming);
    }

    #[test]
    fn test_combat_faces_player_and_holds_ammo() {
        let mut f = Fixture::new(8, 3, 3);
        f.smuggler.state = SmugglerState::Combat;
        f.smuggler.data.ammo = 300;
        f.player = (1.5, 3.5);
        f.tick();
        assert_eq!(f.facing.0, Direction::Left);
        assert_eq!(f.smuggler.data.ammo, 300);
        assert_eq!(f.pos.tile(), TileCoord::new(3, 3));
    }

    #[test]
    fn test_combat_closes_distance() {
        let mut f = Fixture::new(20, 2, 2);
        f.smuggler.state = SmugglerState::Combat;
        f.smuggler.data.ammo = 300;
        f.player = (2.5, 12.5);
        f.tick();
        assert_eq!(f.pos.tile(), TileCoord::new(2, 3));
        assert_eq!(f.smuggler.data.ammo, 300);
    }

    #[test]
    fn test_system_runs_over_world() {
        let mut world = World::new();
        let mut grid = Grid::new(10);
        let mut economy = 0;
        let mut rng = StdRng::seed_from_u64(11);
        world.spawn((
            Agent { id: 1, kind: AgentKind::Smuggler },
            Position::at_tile(TileCoord::new(4, 4)),
            Facing::default(),
            Health(100),
            Smuggler::new(),
        ));
        smuggler_system(&mut world, &mut grid, &mut economy, (0.0, 0.0), 0, 600, &mut rng);
        assert_eq!(grid.get(4, 4).kind, TerrainKind::Farmland);
        let data = world.query::<&Smuggler>().iter().map(|(_, s)| s.data).next().unwrap();
        assert_eq!(data.tiles_transformed, 1);
    }
}
