//! Simulation engine - main entry point for running the simulation

use hecs::World;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use warlands_logic::combat::{Direction, Projectile, ProjectileOrigin};
use warlands_logic::constants::{agents, combat, generation, pathfinding, territory};
use warlands_logic::interaction::{self, InteractError, Tool};
use warlands_logic::pathfinding::find_nearest_tile;
use warlands_logic::territory::{claim, Claim, ClaimTracker, ZoneTransition};
use warlands_logic::{Grid, TerrainKind, TileCoord};

use crate::components::*;
use crate::generation::{
    generate_world, populate, restore_zones, FactionSeed, PopulationSummary, WorldConfig, WorldLayout,
};
use crate::persistence::{self, PersistenceError, SaveData};
use crate::systems::*;

/// Runtime tuning for the tick loop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Frames between agent behaviour ticks.
    pub agent_tick_interval: u64,
    /// Frames per tobacco growth stage.
    pub growth_stage_frames: u64,
    pub influence_radius: f32,
    /// Minimum frames between two shots of one smuggler.
    pub fire_cooldown: u64,
    pub collision_threshold: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            agent_tick_interval: agents::TICK_INTERVAL,
            growth_stage_frames: agents::GROWTH_STAGE_FRAMES,
            influence_radius: territory::INFLUENCE_RADIUS,
            fire_cooldown: combat::FIRE_COOLDOWN,
            collision_threshold: combat::COLLISION_THRESHOLD,
        }
    }
}

/// Something a front end may want to show
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    ZoneChanged(ZoneTransition),
    Combat(CombatEvent),
    /// The session is over; `update` no longer advances.
    PlayerKilled,
}

/// Read-only view of one agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub id: u32,
    pub kind: AgentKind,
    pub x: f32,
    pub y: f32,
    pub facing: Direction,
    pub health: i32,
    pub faction: Option<u8>,
    pub smuggler_state: Option<SmugglerState>,
}

/// Main simulation engine
pub struct SimulationEngine {
    /// ECS world containing all agents
    pub world: World,
    grid: Grid,
    layout: WorldLayout,
    player: Player,
    /// Coins from tobacco sales awaiting ammo purchases
    economy: u64,
    resolver: CombatResolver,
    claims: ClaimTracker,
    config: SimConfig,
    frame: u64,
    next_agent_id: u32,
    events: Vec<SimEvent>,
    session_over: bool,
    rng: StdRng,
}

impl SimulationEngine {
    /// Create a new empty simulation
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Empty simulation with a reproducible random stream.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            world: World::new(),
            grid: Grid::new(0),
            layout: WorldLayout::default(),
            player: Player::new(0.0, 0.0),
            economy: 0,
            resolver: CombatResolver::default(),
            claims: ClaimTracker::new(),
            config: SimConfig::default(),
            frame: 0,
            next_agent_id: 0,
            events: Vec::new(),
            session_over: false,
            rng,
        }
    }

    pub fn set_config(&mut self, config: SimConfig) {
        self.resolver = CombatResolver::new(config.collision_threshold);
        self.config = config;
    }

    /// Generate terrain and population, replacing any existing world
    pub fn generate(&mut self, config: WorldConfig) -> PopulationSummary {
        let (grid, layout) = generate_world(&config, &mut self.rng);
        self.install(grid, layout)
    }

    /// Start from an existing terrain (e.g. an imported map).
    ///
    /// Headquarters tiles become the faction seeds, and zone ownership is
    /// rebuilt from them.
    pub fn from_grid(&mut self, mut grid: Grid) -> PopulationSummary {
        let mut layout = WorldLayout::survey(&grid, Vec::new());
        layout.seeds = layout
            .tents
            .iter()
            .filter(|t| t.is_hq)
            .map(|t| FactionSeed {
                faction: t.faction,
                x: t.x,
                y: t.y,
            })
            .collect();
        restore_zones(&mut grid, &layout.seeds, generation::ZONE_CELL);
        self.install(grid, layout)
    }

    /// Import a map written by [`SimulationEngine::export_map`] and populate it.
    pub fn import_map<R: Read>(&mut self, reader: R) -> Result<PopulationSummary, PersistenceError> {
        let grid = persistence::import_map(reader)?;
        Ok(self.from_grid(grid))
    }

    pub fn export_map<W: Write>(&self, writer: W) -> Result<(), PersistenceError> {
        persistence::export_map(writer, &self.grid)
    }

    fn install(&mut self, grid: Grid, layout: WorldLayout) -> PopulationSummary {
        self.world = World::new();
        self.next_agent_id = 0;
        self.frame = 0;
        self.economy = 0;
        self.events.clear();
        self.session_over = false;
        self.resolver = CombatResolver::new(self.config.collision_threshold);
        self.claims = ClaimTracker::new();

        let summary = populate(&mut self.world, &layout, &mut self.next_agent_id, &mut self.rng);
        self.grid = grid;
        self.layout = layout;

        let start = self.spawn_point();
        self.player = Player::new(start.0, start.1);
        self.observe_claim();
        summary
    }

    /// Centre of the world, or the nearest walkable tile to it.
    fn spawn_point(&self) -> (f32, f32) {
        let half = (self.grid.size() / 2) as i32;
        let centre = TileCoord::new(half, half);
        if self.grid.is_passable(centre.x, centre.y) {
            return centre.center();
        }
        find_nearest_tile(&self.grid, centre, pathfinding::MAX_SEARCH_RADIUS, |t| t.kind.is_walkable())
            .unwrap_or(centre)
            .center()
    }

    /// Advance the simulation by one frame
    pub fn update(&mut self) {
        if self.session_over {
            return;
        }
        self.frame += 1;

        // Every frame: crop growth
        self.grid.sweep_growth(self.frame);

        // Agent ticks
        if self.config.agent_tick_interval > 0 && self.frame % self.config.agent_tick_interval == 0 {
            smuggler_system(
                &mut self.world,
                &mut self.grid,
                &mut self.economy,
                (self.player.x, self.player.y),
                self.frame,
                self.config.growth_stage_frames,
                &mut self.rng,
            );
            wandering_system(&mut self.world, &self.grid, &mut self.rng);
        }

        // Every frame: fire, then resolve projectiles
        smuggler_fire_system(
            &mut self.world,
            &mut self.resolver,
            &self.player,
            self.frame,
            self.config.fire_cooldown,
        );
        for event in self.resolver.update(&mut self.player, &mut self.world) {
            match event {
                CombatEvent::PlayerKilled => {
                    log::info!("Player killed at frame {}", self.frame);
                    self.session_over = true;
                    self.events.push(SimEvent::PlayerKilled);
                }
                other => self.events.push(SimEvent::Combat(other)),
            }
        }
    }

    /// Move the player by `(dx, dy)`. Returns false if the destination is
    /// blocked; facing still turns toward the attempted move.
    pub fn move_player(&mut self, dx: f32, dy: f32) -> bool {
        if self.session_over || (dx == 0.0 && dy == 0.0) {
            return false;
        }
        self.player.facing = Direction::toward(dx, dy);
        let (nx, ny) = (self.player.x + dx, self.player.y + dy);
        let target = TileCoord::containing(nx, ny);
        if !self.grid.is_passable(target.x, target.y) {
            return false;
        }
        self.player.x = nx;
        self.player.y = ny;
        self.observe_claim();
        true
    }

    fn observe_claim(&mut self) {
        let current = self.territory_claim(self.player.x, self.player.y);
        if let Some(transition) = self.claims.observe(current) {
            log::info!("Player entered {}", transition.to);
            self.events.push(SimEvent::ZoneChanged(transition));
        }
    }

    /// Fire from the player's position in the player's facing
    pub fn player_fire(&mut self) -> bool {
        if self.session_over {
            return false;
        }
        let p = self.player;
        self.request_fire(p.x, p.y, p.facing, ProjectileOrigin::Player);
        true
    }

    pub fn request_fire(&mut self, x: f32, y: f32, direction: Direction, origin: ProjectileOrigin) {
        self.resolver.request_fire(x, y, direction, origin);
    }

    /// Apply a tool to a tile. Planting draws one seed from `seeds`.
    pub fn tile_interact(
        &mut self,
        x: i32,
        y: i32,
        tool: Tool,
        seeds: &mut u32,
    ) -> Result<TerrainKind, InteractError> {
        let result = interaction::tile_interact(
            &mut self.grid,
            x,
            y,
            tool,
            self.frame,
            self.config.growth_stage_frames,
            || {
                if *seeds == 0 {
                    return false;
                }
                *seeds -= 1;
                true
            },
        );
        if let Err(e) = &result {
            log::warn!("Tile interaction rejected: {}", e);
        }
        result
    }

    /// Who claims the point `(x, y)`
    pub fn territory_claim(&self, x: f32, y: f32) -> Claim {
        claim(&self.layout.tents, x, y, self.config.influence_radius)
    }

    /// Every live agent, ordered by id
    pub fn agents(&self) -> Vec<AgentSnapshot> {
        let mut out: Vec<AgentSnapshot> = self
            .world
            .query::<(&Agent, &Position, &Facing, &Health, Option<&Allegiance>, Option<&Smuggler>)>()
            .iter()
            .map(|(_, (agent, pos, facing, health, allegiance, smuggler))| AgentSnapshot {
                id: agent.id,
                kind: agent.kind,
                x: pos.x,
                y: pos.y,
                facing: facing.0,
                health: health.0,
                faction: allegiance.map(|a| a.0),
                smuggler_state: smuggler.map(|s| s.state),
            })
            .collect();
        out.sort_by_key(|a| a.id);
        out
    }

    /// Count live agents of one kind
    pub fn count_kind(&self, kind: AgentKind) -> usize {
        self.world
            .query::<&Agent>()
            .iter()
            .filter(|(_, agent)| agent.kind == kind)
            .count()
    }

    pub fn agent_count(&self) -> usize {
        self.world.len() as usize
    }

    /// Take every event produced since the last drain
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn layout(&self) -> &WorldLayout {
        &self.layout
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn economy(&self) -> u64 {
        self.economy
    }

    pub fn projectiles(&self) -> &[Projectile] {
        self.resolver.projectiles()
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn is_session_over(&self) -> bool {
        self.session_over
    }

    /// Save simulation state to a writer
    pub fn save<W: Write>(&self, writer: W) -> Result<(), PersistenceError> {
        let data = SaveData {
            version: SaveData::current_version(),
            frame: self.frame,
            config: self.config.clone(),
            grid: self.grid.clone(),
            layout: self.layout.clone(),
            player: self.player,
            economy: self.economy,
            resolver: self.resolver.clone(),
            claims: self.claims,
            next_agent_id: self.next_agent_id,
            session_over: self.session_over,
            agents: persistence::serialize_agents(&self.world),
        };
        persistence::save_simulation(writer, &data)
    }

    /// Load simulation state from a reader
    pub fn load<R: Read>(&mut self, reader: R) -> Result<(), PersistenceError> {
        let data = persistence::load_simulation(reader)?;
        self.world = persistence::restore_agents(data.agents);
        self.frame = data.frame;
        self.config = data.config;
        self.grid = data.grid;
        self.layout = data.layout;
        self.player = data.player;
        self.economy = data.economy;
        self.resolver = data.resolver;
        self.claims = data.claims;
        self.next_agent_id = data.next_agent_id;
        self.session_over = data.session_over;
        self.events.clear();
        Ok(())
    }
}

impl Default for SimulationEngine {
    fn default() -> Self {
        Self::new()
    }
}
