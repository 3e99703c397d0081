//! Integration tests for the world generation pipeline.
//!
//! Exercises: WorldConfig → terrain phases → WorldLayout → population
//! → map export/import.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use warlands_core::engine::SimulationEngine;
use warlands_core::generation::{generate_world, WorldConfig, WorldLayout};
use warlands_core::prelude::AgentKind;
use warlands_logic::territory::Claim;
use warlands_logic::{Grid, TerrainKind, TileCoord};

// ── Helpers ────────────────────────────────────────────────────────────

fn generate(size: usize, seed: u64) -> (Grid, WorldLayout, WorldConfig) {
    let config = WorldConfig::sized(size);
    let mut rng = StdRng::seed_from_u64(seed);
    let (grid, layout) = generate_world(&config, &mut rng);
    (grid, layout, config)
}

// ── Terrain invariants ─────────────────────────────────────────────────

#[test]
fn grid_has_requested_size_and_every_tile_defined() {
    let (grid, _, _) = generate(250, 1);
    assert_eq!(grid.size(), 250);
    assert_eq!(grid.iter().count(), 250 * 250);
}

#[test]
fn exactly_one_headquarters_per_faction() {
    let (grid, layout, config) = generate(250, 2);
    for seed in &config.factions {
        let tiles = grid
            .iter()
            .filter(|(_, t)| t.kind == TerrainKind::Headquarters(seed.faction))
            .count();
        assert_eq!(tiles, 1, "faction {}", seed.faction);
        assert!(layout.headquarters(seed.faction).is_some());
    }
}

#[test]
fn tents_lie_inside_their_faction_zone() {
    for seed in 0..4 {
        let (grid, layout, _) = generate(250, 10 + seed);
        for tent in layout.tents.iter().filter(|t| !t.is_hq) {
            assert!(grid.in_bounds(tent.x, tent.y));
            assert_eq!(grid.get(tent.x, tent.y).faction, Some(tent.faction));
        }
    }
}

#[test]
fn forest_and_water_actually_appear() {
    let (grid, _, _) = generate(250, 3);
    assert!(grid.count(TerrainKind::Forest) > 0);
    assert!(grid.count(TerrainKind::Water) > 0);
}

#[test]
fn crop_kinds_never_generated() {
    let (grid, _, _) = generate(250, 4);
    for kind in [
        TerrainKind::Dirt,
        TerrainKind::Farmland,
        TerrainKind::Tobacco1,
        TerrainKind::Tobacco2,
        TerrainKind::Tobacco3,
    ] {
        assert_eq!(grid.count(kind), 0, "{:?}", kind);
    }
    assert_eq!(grid.pending_growth(), 0);
}

#[test]
fn trade_tables_are_distinct_tiles() {
    let (_, layout, _) = generate(400, 5);
    let mut seen = HashSet::new();
    for c in layout.gunseller_tables.iter().chain(&layout.tobacco_tables) {
        assert!(seen.insert(*c), "table placed twice at {:?}", c);
    }
}

#[test]
fn same_seed_same_world() {
    let (a, _, _) = generate(150, 99);
    let (b, _, _) = generate(150, 99);
    assert_eq!(a.kinds(), b.kinds());
}

// ── Export / import ────────────────────────────────────────────────────

#[test]
fn export_import_preserves_kind_matrix_and_territory() {
    let mut engine = SimulationEngine::with_seed(6);
    engine.generate(WorldConfig::sized(160));

    let mut buffer = Vec::new();
    engine.export_map(&mut buffer).expect("export failed");

    let mut imported = SimulationEngine::with_seed(7);
    let summary = imported.import_map(&buffer[..]).expect("import failed");

    assert_eq!(imported.grid().kinds(), engine.grid().kinds());
    assert_eq!(imported.layout().tents.len(), engine.layout().tents.len());
    assert_eq!(summary.warlords, engine.count_kind(AgentKind::Warlord));

    for (x, y) in [(10.0, 10.0), (80.0, 80.0), (150.0, 20.0), (40.5, 120.5)] {
        assert_eq!(imported.territory_claim(x, y), engine.territory_claim(x, y));
    }
}

#[test]
fn reimported_map_keeps_zone_ownership() {
    let mut engine = SimulationEngine::with_seed(12);
    engine.generate(WorldConfig::sized(160));

    let mut first = Vec::new();
    engine.export_map(&mut first).expect("export failed");
    let mut once = SimulationEngine::with_seed(13);
    once.import_map(&first[..]).expect("import failed");

    let mut second = Vec::new();
    once.export_map(&mut second).expect("export failed");
    let mut twice = SimulationEngine::with_seed(14);
    twice.import_map(&second[..]).expect("import failed");

    let zones = |e: &SimulationEngine| -> Vec<Option<u8>> {
        e.grid().iter().map(|(_, t)| t.faction).collect()
    };
    assert!(zones(&once).iter().all(|f| f.is_some()));
    assert_eq!(zones(&once), zones(&twice));
    for hq in once.layout().tents.iter().filter(|t| t.is_hq) {
        assert_eq!(once.grid().get(hq.x, hq.y).faction, Some(hq.faction));
    }
}

#[test]
fn claims_cover_headquarters() {
    let (_, layout, _) = generate(250, 8);
    let engine_radius = warlands_logic::constants::territory::INFLUENCE_RADIUS;
    for hq in layout.tents.iter().filter(|t| t.is_hq) {
        let c = TileCoord::new(hq.x, hq.y);
        let (x, y) = c.center();
        let result = warlands_logic::territory::claim(&layout.tents, x, y, engine_radius);
        assert!(
            result == Claim::Faction(hq.faction) || result == Claim::Border,
            "hq {} claim {:?}",
            hq.faction,
            result
        );
    }
}
