//! World generation - terrain, factions, settlements and markets
//!
//! One pass, fixed phase order. Each phase reads the terrain left by the
//! ones before it, so reordering changes the world's character.

use rand::Rng;
use serde::{Deserialize, Serialize};
use warlands_logic::constants::{generation, world};
use warlands_logic::territory::TentSite;
use warlands_logic::{Grid, TerrainKind, Tile, TileCoord};

/// Seed positions of the five factions on a 3000-tile world.
const CANONICAL_SEEDS: [(i32, i32); 5] = [
    (500, 350),
    (1300, 800),
    (1500, 2500),
    (800, 1500),
    (2200, 1500),
];

/// Origin of a faction's zone and the site of its headquarters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactionSeed {
    pub faction: u8,
    pub x: i32,
    pub y: i32,
}

impl FactionSeed {
    /// The five canonical seeds scaled to a world of side `size`.
    pub fn canonical(size: usize) -> Vec<FactionSeed> {
        let scale = |v: i32| (v as i64 * size as i64 / world::LARGE_SIZE as i64) as i32;
        CANONICAL_SEEDS
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| FactionSeed {
                faction: i as u8,
                x: scale(x),
                y: scale(y),
            })
            .collect()
    }

    fn coord(&self) -> TileCoord {
        TileCoord::new(self.x, self.y)
    }
}

/// Configuration for world generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    pub size: usize,
    pub forest_draws: usize,
    pub forest_probability: f64,
    pub river_count: usize,
    /// Empty disables zones, headquarters, tents and faction roads.
    pub factions: Vec<FactionSeed>,
    pub zone_cell: usize,
    pub tents_per_faction: usize,
    /// Tent placement attempts per faction.
    pub tent_attempts: usize,
    /// Straight map-spanning roads, used when there are no faction roads.
    pub through_roads: usize,
    pub village_count: usize,
    pub village_attempts: usize,
    pub village_radius: i32,
    pub houses_min: usize,
    pub houses_max: usize,
    /// Draws per trade-table kind.
    pub table_draws: usize,
    pub gunseller_probability: f64,
    pub tobacco_table_probability: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self::sized(world::LARGE_SIZE)
    }
}

impl WorldConfig {
    /// Faction world of side `size`, densities scaled from the large world.
    pub fn sized(size: usize) -> Self {
        let cells = (size * size) as f64;
        let area_ratio = cells / (world::LARGE_SIZE * world::LARGE_SIZE) as f64;
        let village_count = ((generation::VILLAGES_LARGE as f64 * area_ratio).round() as usize).max(1);
        Self {
            size,
            forest_draws: (cells * generation::FOREST_DRAW_FRACTION) as usize,
            forest_probability: generation::FOREST_PROBABILITY,
            river_count: generation::RIVER_COUNT,
            factions: FactionSeed::canonical(size),
            zone_cell: generation::ZONE_CELL,
            tents_per_faction: generation::TENTS_PER_FACTION,
            tent_attempts: generation::TENTS_PER_FACTION * generation::TENT_ATTEMPTS_PER_SLOT,
            through_roads: 0,
            village_count,
            village_attempts: village_count * generation::VILLAGE_ATTEMPTS_PER_SLOT,
            village_radius: generation::VILLAGE_RADIUS,
            houses_min: generation::HOUSES_MIN,
            houses_max: generation::HOUSES_MAX,
            table_draws: ((cells * generation::TABLE_DRAW_FRACTION) as usize)
                .max(generation::MIN_TABLE_DRAWS),
            gunseller_probability: generation::GUNSELLER_PROBABILITY,
            tobacco_table_probability: generation::TOBACCO_TABLE_PROBABILITY,
        }
    }

    /// The 50-tile prototype world.
    pub fn small() -> Self {
        Self::sized(world::SMALL_SIZE)
    }

    /// Faction-less world crossed by straight roads (the 1000-tile layout).
    pub fn without_factions(size: usize) -> Self {
        Self {
            factions: Vec::new(),
            through_roads: (size / 10).max(1),
            ..Self::sized(size)
        }
    }
}

/// Everything generation placed that later systems need to find again
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldLayout {
    pub seeds: Vec<FactionSeed>,
    /// Headquarters and regular tents.
    pub tents: Vec<TentSite>,
    pub houses: Vec<TileCoord>,
    pub gunseller_tables: Vec<TileCoord>,
    pub tobacco_tables: Vec<TileCoord>,
}

impl WorldLayout {
    /// Rebuild a layout by scanning tile kinds (e.g. after a map import).
    pub fn survey(grid: &Grid, seeds: Vec<FactionSeed>) -> Self {
        let mut layout = WorldLayout {
            seeds,
            ..Default::default()
        };
        for (coord, tile) in grid.iter() {
            match tile.kind {
                TerrainKind::Headquarters(faction) | TerrainKind::Tent(faction) => {
                    layout.tents.push(TentSite {
                        faction,
                        x: coord.x,
                        y: coord.y,
                        is_hq: matches!(tile.kind, TerrainKind::Headquarters(_)),
                    });
                }
                TerrainKind::House => layout.houses.push(coord),
                TerrainKind::GunsellerTable => layout.gunseller_tables.push(coord),
                TerrainKind::TobaccoTable => layout.tobacco_tables.push(coord),
                _ => {}
            }
        }
        layout
    }

    pub fn headquarters(&self, faction: u8) -> Option<&TentSite> {
        self.tents.iter().find(|t| t.is_hq && t.faction == faction)
    }

    pub fn tents_of(&self, faction: u8) -> impl Iterator<Item = &TentSite> + '_ {
        self.tents.iter().filter(move |t| t.faction == faction)
    }
}

/// Generate a complete world
pub fn generate_world(config: &WorldConfig, rng: &mut impl Rng) -> (Grid, WorldLayout) {
    let mut grid = Grid::new(config.size);
    let mut layout = WorldLayout {
        seeds: config.factions.clone(),
        ..Default::default()
    };
    if config.size == 0 {
        return (grid, layout);
    }

    scatter_forests(&mut grid, config, rng);
    carve_rivers(&mut grid, config, rng);
    if !config.factions.is_empty() {
        assign_zones(&mut grid, config, rng);
        place_headquarters(&mut grid, config, &mut layout);
        place_tents(&mut grid, config, &mut layout, rng);
        connect_roads(&mut grid, &layout);
    }
    lay_through_roads(&mut grid, config, rng);
    build_villages(&mut grid, config, &mut layout, rng);
    place_trade_tables(&mut grid, config, &mut layout, rng);

    log::info!(
        "Generated {}x{} world: {} forest, {} water, {} tents, {} houses, {} gunseller / {} tobacco tables",
        config.size,
        config.size,
        grid.count(TerrainKind::Forest),
        grid.count(TerrainKind::Water),
        layout.tents.len(),
        layout.houses.len(),
        layout.gunseller_tables.len(),
        layout.tobacco_tables.len(),
    );

    (grid, layout)
}

fn random_coord(size: usize, rng: &mut impl Rng) -> TileCoord {
    TileCoord::new(rng.gen_range(0..size) as i32, rng.gen_range(0..size) as i32)
}

/// Independent draws; density, not connectivity, makes the forests.
fn scatter_forests(grid: &mut Grid, config: &WorldConfig, rng: &mut impl Rng) {
    for _ in 0..config.forest_draws {
        let c = random_coord(config.size, rng);
        if grid.at(c).kind == TerrainKind::Grass && rng.gen_bool(config.forest_probability) {
            grid.set_kind(c.x, c.y, TerrainKind::Forest);
        }
    }
}

/// Top-to-bottom bounded random walks.
fn carve_rivers(grid: &mut Grid, config: &WorldConfig, rng: &mut impl Rng) {
    for _ in 0..config.river_count {
        let mut x = rng.gen_range(0..config.size) as i32;
        let width = rng.gen_range(generation::RIVER_MIN_WIDTH..=generation::RIVER_MAX_WIDTH);
        for y in 0..config.size as i32 {
            for i in 0..width {
                grid.set_kind(x + i, y, TerrainKind::Water);
            }
            x += rng.gen_range(-generation::RIVER_DRIFT..=generation::RIVER_DRIFT);
        }
    }
}

/// Index of the seed nearest to `point`; the first of equals wins.
fn nearest_seed(seeds: &[FactionSeed], point: TileCoord) -> Option<usize> {
    let mut best: Option<(usize, i64)> = None;
    for (i, seed) in seeds.iter().enumerate() {
        let d = seed.coord().distance_squared(point);
        if best.map_or(true, |(_, bd)| d < bd) {
            best = Some((i, d));
        }
    }
    best.map(|(i, _)| i)
}

/// Coarse nearest-seed partition: one jittered sample per cell.
fn assign_zones(grid: &mut Grid, config: &WorldConfig, rng: &mut impl Rng) {
    let cell = config.zone_cell.max(1);
    for cy in (0..config.size).step_by(cell) {
        for cx in (0..config.size).step_by(cell) {
            let w = cell.min(config.size - cx);
            let h = cell.min(config.size - cy);
            let sample = TileCoord::new(
                (cx + rng.gen_range(0..w)) as i32,
                (cy + rng.gen_range(0..h)) as i32,
            );
            let Some(idx) = nearest_seed(&config.factions, sample) else {
                continue;
            };
            let faction = Some(config.factions[idx].faction);
            for y in cy..cy + h {
                for x in cx..cx + w {
                    let (x, y) = (x as i32, y as i32);
                    let tile = grid.get(x, y);
                    grid.set(x, y, tile.with_faction(faction));
                }
            }
        }
    }
}

/// Rebuild zone ownership on a grid that carries none (an imported map).
///
/// Each coarse cell goes to the seed nearest its centre. Tent and HQ tiles
/// keep the faction their kind names.
pub fn restore_zones(grid: &mut Grid, seeds: &[FactionSeed], cell: usize) {
    let cell = cell.max(1);
    let size = grid.size();
    for cy in (0..size).step_by(cell) {
        for cx in (0..size).step_by(cell) {
            let w = cell.min(size - cx);
            let h = cell.min(size - cy);
            let centre = TileCoord::new((cx + w / 2) as i32, (cy + h / 2) as i32);
            let zone = nearest_seed(seeds, centre).map(|i| seeds[i].faction);
            for y in cy..cy + h {
                for x in cx..cx + w {
                    let (x, y) = (x as i32, y as i32);
                    let tile = grid.get(x, y);
                    grid.set(x, y, tile.with_faction(tile.kind.owner().or(zone)));
                }
            }
        }
    }
}

fn place_headquarters(grid: &mut Grid, config: &WorldConfig, layout: &mut WorldLayout) {
    let max = config.size as i32 - 1;
    for seed in &config.factions {
        let (x, y) = (seed.x.clamp(0, max), seed.y.clamp(0, max));
        grid.set_kind(x, y, TerrainKind::Headquarters(seed.faction));
        layout.tents.push(TentSite {
            faction: seed.faction,
            x,
            y,
            is_hq: true,
        });
    }
}

fn place_tents(grid: &mut Grid, config: &WorldConfig, layout: &mut WorldLayout, rng: &mut impl Rng) {
    for seed in &config.factions {
        let mut placed = 0;
        let mut attempts = 0;
        while placed < config.tents_per_faction && attempts < config.tent_attempts {
            attempts += 1;
            let c = random_coord(config.size, rng);
            let tile = grid.at(c);
            if !tile.kind.is_buildable() || tile.faction != Some(seed.faction) {
                continue;
            }
            grid.set_kind(c.x, c.y, TerrainKind::Tent(seed.faction));
            layout.tents.push(TentSite {
                faction: seed.faction,
                x: c.x,
                y: c.y,
                is_hq: false,
            });
            placed += 1;
        }
        if placed < config.tents_per_faction {
            log::warn!(
                "Faction {} placed only {}/{} tents",
                seed.faction,
                placed,
                config.tents_per_faction
            );
        }
    }
}

/// Integer line from `from` to `to`, tagging each step with the road kind
/// matching the axis it advanced along.
fn road_line(from: TileCoord, to: TileCoord) -> Vec<(TileCoord, TerrainKind)> {
    let dx = (to.x - from.x).abs();
    let dy = -(to.y - from.y).abs();
    let sx = if from.x < to.x { 1 } else { -1 };
    let sy = if from.y < to.y { 1 } else { -1 };
    let dominant = if dx >= -dy {
        TerrainKind::RoadHorizontal
    } else {
        TerrainKind::RoadVertical
    };

    let mut points = Vec::with_capacity((dx - dy) as usize + 1);
    let (mut x, mut y) = (from.x, from.y);
    let mut err = dx + dy;
    let mut kind = dominant;
    loop {
        points.push((TileCoord::new(x, y), kind));
        if x == to.x && y == to.y {
            break;
        }
        let e2 = 2 * err;
        let mut moved_x = false;
        let mut moved_y = false;
        if e2 >= dy {
            err += dy;
            x += sx;
            moved_x = true;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
            moved_y = true;
        }
        kind = match (moved_x, moved_y) {
            (true, false) => TerrainKind::RoadHorizontal,
            (false, true) => TerrainKind::RoadVertical,
            _ => dominant,
        };
    }
    points
}

/// Roads from each headquarters to every tent of its faction.
fn connect_roads(grid: &mut Grid, layout: &WorldLayout) {
    let mut laid = 0usize;
    for hq in layout.tents.iter().filter(|t| t.is_hq) {
        let from = TileCoord::new(hq.x, hq.y);
        for tent in layout.tents_of(hq.faction).filter(|t| !t.is_hq) {
            for (c, kind) in road_line(from, TileCoord::new(tent.x, tent.y)) {
                if grid.at(c).kind.is_buildable() {
                    grid.set_kind(c.x, c.y, kind);
                    laid += 1;
                }
            }
        }
    }
    log::debug!("Laid {} road tiles between camps", laid);
}

/// Straight edge-to-edge roads over grass.
fn lay_through_roads(grid: &mut Grid, config: &WorldConfig, rng: &mut impl Rng) {
    for _ in 0..config.through_roads {
        let horizontal = rng.gen_bool(0.5);
        let line = rng.gen_range(0..config.size) as i32;
        for step in 0..config.size as i32 {
            let (x, y, kind) = if horizontal {
                (step, line, TerrainKind::RoadHorizontal)
            } else {
                (line, step, TerrainKind::RoadVertical)
            };
            if grid.get(x, y).kind == TerrainKind::Grass {
                grid.set_kind(x, y, kind);
            }
        }
    }
}

/// House clusters seeded on roads.
fn build_villages(grid: &mut Grid, config: &WorldConfig, layout: &mut WorldLayout, rng: &mut impl Rng) {
    let mut villages = 0;
    let mut attempts = 0;
    let (min, max) = (config.houses_min, config.houses_max.max(config.houses_min));
    let r = config.village_radius;

    while villages < config.village_count && attempts < config.village_attempts {
        attempts += 1;
        let center = random_coord(config.size, rng);
        if !grid.at(center).kind.is_road() {
            continue;
        }
        villages += 1;

        let target = rng.gen_range(min..=max);
        let mut built = 0;
        for _ in 0..target * generation::HOUSE_ATTEMPTS_PER_SLOT {
            if built >= target {
                break;
            }
            let x = center.x + rng.gen_range(-r..=r);
            let y = center.y + rng.gen_range(-r..=r);
            if grid.get(x, y).kind == TerrainKind::Grass {
                grid.set_kind(x, y, TerrainKind::House);
                layout.houses.push(TileCoord::new(x, y));
                built += 1;
            }
        }
    }
    log::debug!("Built {} villages in {} attempts", villages, attempts);
}

fn table_site_ok(tile: Tile) -> bool {
    !matches!(tile.kind, TerrainKind::House | TerrainKind::Water) && !tile.kind.is_special()
}

fn place_trade_tables(grid: &mut Grid, config: &WorldConfig, layout: &mut WorldLayout, rng: &mut impl Rng) {
    let passes = [
        (TerrainKind::GunsellerTable, config.gunseller_probability),
        (TerrainKind::TobaccoTable, config.tobacco_table_probability),
    ];
    for (kind, probability) in passes {
        for _ in 0..config.table_draws {
            let c = random_coord(config.size, rng);
            if !table_site_ok(grid.at(c)) || !rng.gen_bool(probability) {
                continue;
            }
            grid.set_kind(c.x, c.y, kind);
            match kind {
                TerrainKind::GunsellerTable => layout.gunseller_tables.push(c),
                _ => layout.tobacco_tables.push(c),
            }
        }
    }
}
