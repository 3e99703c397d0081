//! Populating a generated world with agents

use hecs::{Entity, EntityBuilder, World};
use rand::Rng;
use serde::{Deserialize, Serialize};
use warlands_logic::constants::agents;
use warlands_logic::TileCoord;

use super::names::generate_name;
use super::world::WorldLayout;
use crate::components::*;

/// How many agents of each kind were spawned
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationSummary {
    pub villagers: usize,
    pub gunsellers: usize,
    pub smugglers: usize,
    pub warlords: usize,
    pub soldiers: usize,
}

impl PopulationSummary {
    pub fn total(&self) -> usize {
        self.villagers + self.gunsellers + self.smugglers + self.warlords + self.soldiers
    }
}

/// Spawn one agent with the next id from `next_id`.
pub fn spawn_agent(
    world: &mut World,
    next_id: &mut u32,
    kind: AgentKind,
    position: Position,
    faction: Option<u8>,
    rng: &mut impl Rng,
) -> Entity {
    let id = *next_id;
    *next_id += 1;

    let mut builder = EntityBuilder::new();
    builder
        .add(Agent { id, kind })
        .add(position)
        .add(Facing::default())
        .add(Health(agents::DEFAULT_HEALTH))
        .add(generate_name(kind, rng));
    if let Some(faction) = faction {
        builder.add(Allegiance(faction));
    }
    if kind == AgentKind::Smuggler {
        builder.add(Smuggler::new());
    }
    world.spawn(builder.build())
}

/// Soldiers around a tent, spread along x and centred on the tile.
fn spawn_squad(
    world: &mut World,
    next_id: &mut u32,
    tile: TileCoord,
    faction: u8,
    count: usize,
    rng: &mut impl Rng,
) -> usize {
    let (cx, cy) = tile.center();
    let middle = count.saturating_sub(1) as f32 / 2.0;
    for i in 0..count {
        let offset = (i as f32 - middle) * agents::SOLDIER_SPACING;
        let position = Position::new(cx + offset, cy);
        spawn_agent(world, next_id, AgentKind::Soldier, position, Some(faction), rng);
    }
    count
}

/// Spawn the standing population of a freshly generated world.
pub fn populate(
    world: &mut World,
    layout: &WorldLayout,
    next_id: &mut u32,
    rng: &mut impl Rng,
) -> PopulationSummary {
    let mut summary = PopulationSummary::default();

    for house in layout.houses.iter().step_by(agents::HOUSES_PER_VILLAGER) {
        spawn_agent(world, next_id, AgentKind::Villager, Position::at_tile(*house), None, rng);
        summary.villagers += 1;
    }

    for table in &layout.gunseller_tables {
        spawn_agent(world, next_id, AgentKind::Gunseller, Position::at_tile(*table), None, rng);
        summary.gunsellers += 1;
    }

    for table in &layout.tobacco_tables {
        spawn_agent(world, next_id, AgentKind::Smuggler, Position::at_tile(*table), None, rng);
        summary.smugglers += 1;
    }

    for tent in &layout.tents {
        let tile = TileCoord::new(tent.x, tent.y);
        if tent.is_hq {
            let position = Position::at_tile(tile);
            spawn_agent(world, next_id, AgentKind::Warlord, position, Some(tent.faction), rng);
            summary.warlords += 1;
            summary.soldiers += spawn_squad(world, next_id, tile, tent.faction, agents::SOLDIERS_PER_HQ, rng);
        } else {
            summary.soldiers += spawn_squad(world, next_id, tile, tent.faction, agents::SOLDIERS_PER_TENT, rng);
        }
    }

    log::info!(
        "Spawned {} agents: {} villagers, {} gunsellers, {} smugglers, {} warlords, {} soldiers",
        summary.total(),
        summary.villagers,
        summary.gunsellers,
        summary.smugglers,
        summary.warlords,
        summary.soldiers,
    );
    summary
}
