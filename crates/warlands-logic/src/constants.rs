//! Game constants: generation tuning, agent thresholds and combat policy.
//!
//! Plain values with no runtime dependency. The generator and engine copy
//! these into their `Default` configs; tests read them directly.

pub mod world {
    /// Side length of the richest world configuration.
    pub const LARGE_SIZE: usize = 3000;
    /// Side length used by the single-screen prototype world.
    pub const SMALL_SIZE: usize = 50;
    /// Side length of the faction-less mid-size world.
    pub const MEDIUM_SIZE: usize = 1000;
}

pub mod generation {
    /// Forest draws as a fraction of the cell count.
    pub const FOREST_DRAW_FRACTION: f64 = 0.15;
    /// Chance that a forest draw landing on grass plants a tree.
    pub const FOREST_PROBABILITY: f64 = 0.35;
    pub const RIVER_COUNT: usize = 15;
    pub const RIVER_MIN_WIDTH: i32 = 2;
    pub const RIVER_MAX_WIDTH: i32 = 4;
    /// Maximum sideways drift of a river per row.
    pub const RIVER_DRIFT: i32 = 2;
    /// Edge length of the coarse cells used for zone assignment.
    pub const ZONE_CELL: usize = 10;
    pub const TENTS_PER_FACTION: usize = 10;
    /// Placement attempts allowed per requested tent.
    pub const TENT_ATTEMPTS_PER_SLOT: usize = 500;
    /// Village count for a 3000-tile world; scaled by area for others.
    pub const VILLAGES_LARGE: usize = 300;
    pub const VILLAGE_ATTEMPTS_PER_SLOT: usize = 200;
    pub const VILLAGE_RADIUS: i32 = 10;
    pub const HOUSES_MIN: usize = 3;
    pub const HOUSES_MAX: usize = 15;
    /// House placement attempts allowed per requested house.
    pub const HOUSE_ATTEMPTS_PER_SLOT: usize = 10;
    /// Trade-table draws per cell.
    pub const TABLE_DRAW_FRACTION: f64 = 0.00005;
    /// Floor on trade-table draws so small worlds still get markets.
    pub const MIN_TABLE_DRAWS: usize = 50;
    pub const GUNSELLER_PROBABILITY: f64 = 0.1;
    pub const TOBACCO_TABLE_PROBABILITY: f64 = 0.2;
}

pub mod territory {
    /// Tent influence radius in tiles.
    pub const INFLUENCE_RADIUS: f32 = 150.0;
}

pub mod pathfinding {
    /// Radius cap for nearest-tile searches.
    pub const MAX_SEARCH_RADIUS: u32 = 15;
}

pub mod agents {
    /// Global frames between agent ticks.
    pub const TICK_INTERVAL: u64 = 50;
    /// Grass tiles converted before a smuggler starts planting.
    pub const FARMLAND_QUOTA: u32 = 10;
    pub const HARVEST_MIN: u32 = 3;
    pub const HARVEST_MAX: u32 = 5;
    /// Tobacco stock that sends a smuggler to market.
    pub const TRADE_THRESHOLD: u32 = 50;
    pub const TRADE_SEARCH_RADIUS: f32 = 75.0;
    /// Distance at which a trade can complete.
    pub const TRADE_REACH: f32 = 1.0;
    pub const RATE_MIN: u32 = 3;
    pub const RATE_MAX: u32 = 5;
    pub const COMBAT_AMMO_THRESHOLD: u32 = 300;
    pub const ENGAGEMENT_DISTANCE: f32 = 3.0;
    /// Frames a tobacco plant spends in each growth stage.
    pub const GROWTH_STAGE_FRAMES: u64 = 600;
    /// Distance a wandering agent covers per tick.
    pub const WANDER_STEP: f32 = 0.5;
    pub const DEFAULT_HEALTH: i32 = 100;
    /// Villagers settle at every Nth house.
    pub const HOUSES_PER_VILLAGER: usize = 10;
    pub const SOLDIERS_PER_HQ: usize = 3;
    pub const SOLDIERS_PER_TENT: usize = 1;
    pub const SOLDIER_SPACING: f32 = 0.3;
}

pub mod combat {
    pub const COLLISION_THRESHOLD: f32 = 0.5;
    pub const PROJECTILE_SPEED: f32 = 1.5;
    pub const PROJECTILE_DAMAGE: i32 = 30;
    /// Projectile lifetime in frames.
    pub const PROJECTILE_LIFETIME: u32 = 60;
    /// Frames between shots from a single smuggler.
    pub const FIRE_COOLDOWN: u64 = 30;
    pub const PLAYER_HEALTH: i32 = 100;
}
