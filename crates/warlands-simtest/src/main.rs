//! Warlands Headless Simulation Harness
//!
//! Generates a world, runs the tick loop and validates the invariants the
//! simulation relies on. Runs entirely in-process: no rendering, no input.
//!
//! Usage:
//!   cargo run -p warlands-simtest
//!   cargo run -p warlands-simtest -- --verbose
//!   cargo run -p warlands-simtest -- --json --size 500 --seed 7 --frames 3000

use std::collections::{BTreeMap, HashSet};
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use warlands_core::engine::{SimEvent, SimulationEngine};
use warlands_core::generation::{generate_world, WorldConfig, WorldLayout};
use warlands_core::prelude::*;
use warlands_logic::combat::Direction;
use warlands_logic::constants::{pathfinding::MAX_SEARCH_RADIUS, territory::INFLUENCE_RADIUS};
use warlands_logic::pathfinding::{find_nearest_tile, route_next_step};
use warlands_logic::territory::{claim, Claim};
use warlands_logic::{Grid, TerrainKind, TileCoord};

// ── Test harness ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

impl TestResult {
    fn new(name: &str, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed,
            detail: detail.into(),
        }
    }
}

/// Wall-clock cost of `update()` calls in one phase of the tick loop.
#[derive(Default)]
struct UpdateTiming {
    count: u32,
    total: Duration,
    max: Duration,
}

impl UpdateTiming {
    fn record(&mut self, elapsed: Duration) {
        self.count += 1;
        self.total += elapsed;
        self.max = self.max.max(elapsed);
    }

    fn mean(&self) -> Duration {
        if self.count == 0 {
            return Duration::ZERO;
        }
        self.total / self.count
    }

    fn describe(&self) -> String {
        format!(
            "{} calls, mean {:.3} ms, max {:.3} ms",
            self.count,
            self.mean().as_secs_f64() * 1000.0,
            self.max.as_secs_f64() * 1000.0
        )
    }
}

/// One display frame at 60 Hz.
const FRAME_BUDGET: Duration = Duration::from_micros(16_667);

struct Options {
    verbose: bool,
    json: bool,
    size: usize,
    seed: u64,
    frames: u64,
}

fn parse_options() -> Options {
    let mut opts = Options {
        verbose: false,
        json: false,
        size: 300,
        seed: 1,
        frames: 2000,
    };
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut i = 0;
    while i < args.len() {
        let value = args.get(i + 1);
        match args[i].as_str() {
            "--verbose" => opts.verbose = true,
            "--json" => opts.json = true,
            "--size" => {
                opts.size = value.and_then(|v| v.parse().ok()).unwrap_or(opts.size);
                i += 1;
            }
            "--seed" => {
                opts.seed = value.and_then(|v| v.parse().ok()).unwrap_or(opts.seed);
                i += 1;
            }
            "--frames" => {
                opts.frames = value.and_then(|v| v.parse().ok()).unwrap_or(opts.frames);
                i += 1;
            }
            other => eprintln!("ignoring unknown argument {}", other),
        }
        i += 1;
    }
    opts
}

fn section(opts: &Options, title: &str) {
    if !opts.json {
        println!("--- {} ---", title);
    }
}

#[derive(Serialize)]
struct Report<'a> {
    size: usize,
    seed: u64,
    frames: u64,
    passed: usize,
    failed: usize,
    results: &'a [TestResult],
}

fn main() {
    let opts = parse_options();
    if !opts.json {
        println!("=== Warlands Simulation Harness ===\n");
    }

    let mut results = Vec::new();

    // 1. Terrain generation
    let (grid, layout, config) = validate_generation(&opts, &mut results);

    // 2. Territory oracle on the generated world
    results.extend(validate_territory(&opts, &grid, &layout));

    // 3. Pathfinding on the generated world
    results.extend(validate_pathfinding(&opts, &grid, &layout));

    // 4. Population and tick loop
    let engine = validate_simulation(&opts, config, &mut results);

    // 5. Scripted combat
    results.extend(validate_combat(&opts));

    // 6. Export/import and save/load
    results.extend(validate_persistence(&opts, &engine));

    // ── Summary ──
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    if opts.json {
        let report = Report {
            size: opts.size,
            seed: opts.seed,
            frames: opts.frames,
            passed,
            failed,
            results: &results,
        };
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("failed to encode report: {}", e),
        }
    } else {
        println!();
        for r in &results {
            let icon = if r.passed { "✓" } else { "✗" };
            if !r.passed || opts.verbose {
                println!("  {} {}: {}", icon, r.name, r.detail);
            }
        }
        println!(
            "\n=== RESULT: {}/{} passed, {} failed ===",
            passed, total, failed
        );
    }

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Generation ───────────────────────────────────────────────────────

fn validate_generation(
    opts: &Options,
    results: &mut Vec<TestResult>,
) -> (Grid, WorldLayout, WorldConfig) {
    section(opts, "Generation");
    let config = WorldConfig::sized(opts.size);
    let mut rng = StdRng::seed_from_u64(opts.seed);
    let (grid, layout) = generate_world(&config, &mut rng);

    results.push(TestResult::new(
        "grid_size",
        grid.size() == opts.size && grid.iter().count() == opts.size * opts.size,
        format!("{}x{} tiles", grid.size(), grid.size()),
    ));

    let bad_hq: Vec<u8> = config
        .factions
        .iter()
        .map(|s| s.faction)
        .filter(|f| {
            grid.iter()
                .filter(|(_, t)| t.kind == TerrainKind::Headquarters(*f))
                .count()
                != 1
        })
        .collect();
    results.push(TestResult::new(
        "one_hq_per_faction",
        bad_hq.is_empty(),
        if bad_hq.is_empty() {
            format!("{} factions, one HQ each", config.factions.len())
        } else {
            format!("factions without exactly one HQ: {:?}", bad_hq)
        },
    ));

    let stray: Vec<_> = layout
        .tents
        .iter()
        .filter(|t| !t.is_hq && grid.get(t.x, t.y).faction != Some(t.faction))
        .collect();
    results.push(TestResult::new(
        "tents_inside_zone",
        stray.is_empty(),
        format!(
            "{} regular tents, {} outside their zone",
            layout.tents.iter().filter(|t| !t.is_hq).count(),
            stray.len()
        ),
    ));

    let over_quota: Vec<u8> = config
        .factions
        .iter()
        .map(|s| s.faction)
        .filter(|f| layout.tents_of(*f).filter(|t| !t.is_hq).count() > config.tents_per_faction)
        .collect();
    results.push(TestResult::new(
        "tent_quota",
        over_quota.is_empty(),
        format!("quota {} per faction", config.tents_per_faction),
    ));

    let roads = grid.count(TerrainKind::RoadHorizontal) + grid.count(TerrainKind::RoadVertical);
    results.push(TestResult::new(
        "roads_connect_camps",
        layout.tents.len() <= config.factions.len() || roads > 0,
        format!("{} road tiles", roads),
    ));

    let misplaced_tables = layout
        .gunseller_tables
        .iter()
        .filter(|c| grid.at(**c).kind != TerrainKind::GunsellerTable)
        .chain(
            layout
                .tobacco_tables
                .iter()
                .filter(|c| grid.at(**c).kind != TerrainKind::TobaccoTable),
        )
        .count();
    results.push(TestResult::new(
        "tables_recorded",
        misplaced_tables == 0,
        format!(
            "{} gunseller, {} tobacco tables",
            layout.gunseller_tables.len(),
            layout.tobacco_tables.len()
        ),
    ));

    let crops = grid.iter().filter(|(_, t)| t.kind.is_crop() || t.growth_stage != 0).count();
    results.push(TestResult::new(
        "no_crops_at_start",
        crops == 0,
        format!(
            "{} forest, {} water, {} houses",
            grid.count(TerrainKind::Forest),
            grid.count(TerrainKind::Water),
            layout.houses.len()
        ),
    ));

    (grid, layout, config)
}

// ── 2. Territory ────────────────────────────────────────────────────────

fn validate_territory(opts: &Options, grid: &Grid, layout: &WorldLayout) -> Vec<TestResult> {
    section(opts, "Territory");
    let mut results = Vec::new();

    let unclaimed_camps = layout
        .tents
        .iter()
        .filter(|t| {
            let (x, y) = TileCoord::new(t.x, t.y).center();
            let owner = claim(&layout.tents, x, y, INFLUENCE_RADIUS);
            owner != Claim::Border && owner != Claim::Faction(t.faction)
        })
        .count();
    results.push(TestResult::new(
        "camps_claim_own_ground",
        unclaimed_camps == 0,
        format!("{} camps checked", layout.tents.len()),
    ));

    let mut histogram: BTreeMap<String, usize> = BTreeMap::new();
    let step = (grid.size() / 30).max(1);
    for y in (0..grid.size()).step_by(step) {
        for x in (0..grid.size()).step_by(step) {
            let key = match claim(&layout.tents, x as f32, y as f32, INFLUENCE_RADIUS) {
                Claim::Faction(f) => format!("faction-{}", f),
                Claim::Wilderness => "wilderness".to_string(),
                Claim::Border => "border".to_string(),
            };
            *histogram.entry(key).or_default() += 1;
        }
    }
    results.push(TestResult::new(
        "claim_sampling",
        !histogram.is_empty(),
        format!("{:?}", histogram),
    ));

    results
}

// ── 3. Pathfinding ──────────────────────────────────────────────────────

fn validate_pathfinding(opts: &Options, grid: &Grid, layout: &WorldLayout) -> Vec<TestResult> {
    section(opts, "Pathfinding");
    let mut results = Vec::new();

    let mut synthetic = Grid::new(40);
    synthetic.set_kind(20 + MAX_SEARCH_RADIUS as i32 + 1, 20, TerrainKind::Farmland);
    let capped = find_nearest_tile(&synthetic, TileCoord::new(20, 20), MAX_SEARCH_RADIUS, |t| {
        t.kind == TerrainKind::Farmland
    });
    results.push(TestResult::new(
        "search_radius_cap",
        capped.is_none(),
        format!("target at {} steps not found", MAX_SEARCH_RADIUS + 1),
    ));

    let hqs: Vec<TileCoord> = layout
        .tents
        .iter()
        .filter(|t| t.is_hq)
        .map(|t| TileCoord::new(t.x, t.y))
        .collect();
    let mut routed = 0;
    for pair in hqs.windows(2) {
        let next = route_next_step(grid, pair[0], pair[1]);
        let adjacent = next.map_or(false, |n| n.distance_squared(pair[0]) == 1);
        if adjacent {
            routed += 1;
        }
    }
    results.push(TestResult::new(
        "routes_between_hqs",
        routed == hqs.len().saturating_sub(1),
        format!("{}/{} HQ pairs routable", routed, hqs.len().saturating_sub(1)),
    ));

    let grass_near_hq = hqs
        .iter()
        .filter(|hq| {
            find_nearest_tile(grid, **hq, MAX_SEARCH_RADIUS, |t| t.kind == TerrainKind::Grass)
                .is_some()
        })
        .count();
    results.push(TestResult::new(
        "grass_near_hqs",
        grass_near_hq == hqs.len(),
        format!("{}/{} HQs have grass within reach", grass_near_hq, hqs.len()),
    ));

    results
}

// ── 4. Simulation ───────────────────────────────────────────────────────

fn validate_simulation(
    opts: &Options,
    config: WorldConfig,
    results: &mut Vec<TestResult>,
) -> SimulationEngine {
    section(opts, "Simulation");
    let mut engine = SimulationEngine::with_seed(opts.seed);
    let summary = engine.generate(config);

    let snapshot = engine.agents();
    let ids: HashSet<u32> = snapshot.iter().map(|a| a.id).collect();
    results.push(TestResult::new(
        "agent_ids_unique",
        ids.len() == snapshot.len(),
        format!("{} agents", snapshot.len()),
    ));
    results.push(TestResult::new(
        "population_matches_layout",
        summary.smugglers == engine.layout().tobacco_tables.len()
            && summary.gunsellers == engine.layout().gunseller_tables.len()
            && summary.total() == engine.agent_count(),
        format!(
            "{} villagers, {} gunsellers, {} smugglers, {} warlords, {} soldiers",
            summary.villagers, summary.gunsellers, summary.smugglers, summary.warlords, summary.soldiers
        ),
    ));

    let mut escaped = 0;
    let mut zone_changes = 0;
    let mut combat_events = 0;
    let mut agent_ticks = UpdateTiming::default();
    let mut plain_frames = UpdateTiming::default();
    for frame in 0..opts.frames {
        let started = Instant::now();
        engine.update();
        let elapsed = started.elapsed();
        if engine.frame() % engine.config().agent_tick_interval == 0 {
            agent_ticks.record(elapsed);
        } else {
            plain_frames.record(elapsed);
        }
        if frame % engine.config().agent_tick_interval == 0 {
            escaped += engine
                .agents()
                .iter()
                .filter(|a| !engine.grid().contains(TileCoord::containing(a.x, a.y)))
                .count();
        }
        for event in engine.drain_events() {
            match event {
                SimEvent::ZoneChanged(_) => zone_changes += 1,
                SimEvent::Combat(_) | SimEvent::PlayerKilled => combat_events += 1,
            }
        }
    }

    results.push(TestResult::new(
        "update_timing",
        agent_ticks.mean() <= FRAME_BUDGET && plain_frames.mean() <= FRAME_BUDGET,
        format!(
            "agent ticks: {}; other frames: {}",
            agent_ticks.describe(),
            plain_frames.describe()
        ),
    ));
    results.push(TestResult::new(
        "frames_advanced",
        engine.frame() == opts.frames || engine.is_session_over(),
        format!("{} frames, session over: {}", engine.frame(), engine.is_session_over()),
    ));
    results.push(TestResult::new(
        "agents_stay_in_bounds",
        escaped == 0,
        format!("{} out-of-bounds observations", escaped),
    ));

    let mut states: BTreeMap<&'static str, usize> = BTreeMap::new();
    for agent in engine.agents() {
        if let Some(state) = agent.smuggler_state {
            *states.entry(state.name()).or_default() += 1;
        }
    }
    let farmland = engine.grid().count(TerrainKind::Farmland);
    let crops = [TerrainKind::Tobacco1, TerrainKind::Tobacco2, TerrainKind::Tobacco3]
        .iter()
        .map(|k| engine.grid().count(*k))
        .sum::<usize>();
    let smugglers_worked = summary.smugglers == 0
        || opts.frames < engine.config().agent_tick_interval
        || farmland + crops > 0;
    results.push(TestResult::new(
        "smugglers_work_the_land",
        smugglers_worked,
        format!(
            "{} farmland, {} tobacco, {} pending growth, states {:?}",
            farmland,
            crops,
            engine.grid().pending_growth(),
            states
        ),
    ));

    let health_ok = engine.agents().iter().all(|a| a.health > 0) && engine.player().health >= 0;
    results.push(TestResult::new(
        "health_bounds",
        health_ok,
        format!(
            "player {} hp, economy {} coins, {} combat events, {} zone changes",
            engine.player().health,
            engine.economy(),
            combat_events,
            zone_changes
        ),
    ));

    engine
}

// ── 5. Combat ───────────────────────────────────────────────────────────

fn validate_combat(opts: &Options) -> Vec<TestResult> {
    section(opts, "Combat");
    let mut results = Vec::new();

    let mut engine = SimulationEngine::with_seed(opts.seed);
    engine.from_grid(Grid::new(40));
    engine.drain_events();
    let (px, py) = (engine.player().x, engine.player().y);
    engine.world.spawn((
        Agent {
            id: 10_000,
            kind: AgentKind::Smuggler,
        },
        Position::new(px - 3.0, py),
        Facing::default(),
        Health(100),
        Smuggler {
            state: SmugglerState::Combat,
            data: SmugglerData {
                ammo: 400,
                ..Default::default()
            },
        },
    ));

    let mut hits = 0;
    let mut killed = false;
    for _ in 0..600 {
        engine.update();
        for event in engine.drain_events() {
            match event {
                SimEvent::Combat(CombatEvent::PlayerHit { .. }) => hits += 1,
                SimEvent::PlayerKilled => killed = true,
                _ => {}
            }
        }
        if engine.is_session_over() {
            break;
        }
    }
    results.push(TestResult::new(
        "smuggler_kills_player",
        killed && hits == 4 && engine.player().health == 0,
        format!("{} hits, killed at frame {}", hits, engine.frame()),
    ));

    let frame = engine.frame();
    engine.update();
    results.push(TestResult::new(
        "session_stops_after_death",
        engine.frame() == frame && !engine.player_fire(),
        "update and fire are no-ops",
    ));

    let mut engine = SimulationEngine::with_seed(opts.seed);
    engine.from_grid(Grid::new(40));
    let (px, py) = (engine.player().x, engine.player().y);
    engine.world.spawn((
        Agent {
            id: 10_001,
            kind: AgentKind::Villager,
        },
        Position::new(px, py - 1.5),
        Facing::default(),
        Health(30),
    ));
    engine.move_player(0.0, -0.01);
    let turned = engine.player().facing == Direction::Up;
    engine.player_fire();
    engine.update();
    let gone = engine.agents().iter().all(|a| a.id != 10_001);
    results.push(TestResult::new(
        "player_shot_despawns_agent",
        turned && gone,
        "one-shot kill removes the agent",
    ));

    results
}

// ── 6. Persistence ──────────────────────────────────────────────────────

fn validate_persistence(opts: &Options, engine: &SimulationEngine) -> Vec<TestResult> {
    section(opts, "Persistence");
    let mut results = Vec::new();

    let mut map = Vec::new();
    let exported = engine.export_map(&mut map);
    let mut imported = SimulationEngine::with_seed(opts.seed);
    let roundtrip = exported.is_ok()
        && imported.import_map(&map[..]).is_ok()
        && imported.grid().kinds() == engine.grid().kinds();
    results.push(TestResult::new(
        "map_export_roundtrip",
        roundtrip,
        format!("{} bytes of JSON", map.len()),
    ));

    let mut save = Vec::new();
    let saved = engine.save(&mut save);
    let mut loaded = SimulationEngine::new();
    let restored = saved.is_ok()
        && loaded.load(&save[..]).is_ok()
        && loaded.agents() == engine.agents()
        && loaded.frame() == engine.frame()
        && loaded.economy() == engine.economy();
    results.push(TestResult::new(
        "save_load_roundtrip",
        restored,
        format!("{} bytes saved", save.len()),
    ));

    results
}
