//! Combat - projectile resolution and smuggler fire

use hecs::{Entity, World};
use serde::{Deserialize, Serialize};
use warlands_logic::combat::{Direction, Projectile, ProjectileOrigin};
use warlands_logic::constants::{agents, combat};

use crate::components::*;

/// Outcome of one projectile during a combat update
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CombatEvent {
    PlayerHit { damage: i32, health: i32 },
    PlayerKilled,
    AgentHit { id: u32, damage: i32, health: i32 },
    AgentKilled { id: u32, kind: AgentKind },
    ProjectileExpired { x: f32, y: f32 },
}

/// Owns live projectiles and resolves them against the player and agents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatResolver {
    projectiles: Vec<Projectile>,
    collision_threshold: f32,
}

impl Default for CombatResolver {
    fn default() -> Self {
        Self::new(combat::COLLISION_THRESHOLD)
    }
}

struct Target {
    entity: Entity,
    id: u32,
    kind: AgentKind,
    x: f32,
    y: f32,
    health: i32,
}

impl CombatResolver {
    pub fn new(collision_threshold: f32) -> Self {
        Self {
            projectiles: Vec::new(),
            collision_threshold,
        }
    }

    /// Spawn a projectile with the default policy for its origin.
    pub fn request_fire(&mut self, x: f32, y: f32, direction: Direction, origin: ProjectileOrigin) {
        self.projectiles.push(Projectile::spawn(x, y, direction, origin));
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    /// Advance every projectile one frame and apply hits.
    ///
    /// Each projectile hits at most one target: the player is tested first,
    /// then live agents. Agents reduced to zero health are despawned.
    pub fn update(&mut self, player: &mut Player, world: &mut World) -> Vec<CombatEvent> {
        let mut events = Vec::new();
        if self.projectiles.is_empty() {
            return events;
        }

        let mut targets: Vec<Target> = world
            .query::<(&Agent, &Position, &Health)>()
            .iter()
            .filter(|(_, (_, _, health))| !health.is_dead())
            .map(|(entity, (agent, pos, health))| Target {
                entity,
                id: agent.id,
                kind: agent.kind,
                x: pos.x,
                y: pos.y,
                health: health.0,
            })
            .collect();

        let threshold = self.collision_threshold;
        self.projectiles.retain_mut(|projectile| {
            projectile.advance();

            if !player.is_dead() && projectile.hits(player.x, player.y, threshold) {
                player.health = (player.health - projectile.damage).max(0);
                events.push(CombatEvent::PlayerHit {
                    damage: projectile.damage,
                    health: player.health,
                });
                if player.is_dead() {
                    events.push(CombatEvent::PlayerKilled);
                }
                return false;
            }

            if let Some(target) = targets
                .iter_mut()
                .find(|t| t.health > 0 && projectile.hits(t.x, t.y, threshold))
            {
                target.health = (target.health - projectile.damage).max(0);
                events.push(CombatEvent::AgentHit {
                    id: target.id,
                    damage: projectile.damage,
                    health: target.health,
                });
                if target.health == 0 {
                    events.push(CombatEvent::AgentKilled {
                        id: target.id,
                        kind: target.kind,
                    });
                }
                return false;
            }

            if projectile.is_expired() {
                events.push(CombatEvent::ProjectileExpired {
                    x: projectile.x,
                    y: projectile.y,
                });
                return false;
            }
            true
        });

        for target in targets {
            if target.health == 0 {
                let _ = world.despawn(target.entity);
                log::debug!("Agent {} ({}) killed", target.id, target.kind.label());
            } else if let Ok(mut health) = world.get::<&mut Health>(target.entity) {
                health.0 = target.health;
            }
        }
        events
    }
}

/// Smugglers in combat within engagement range shoot at the player once
/// their cooldown has elapsed. Each shot spends one round; an empty
/// magazine holds fire.
pub fn smuggler_fire_system(
    world: &mut World,
    resolver: &mut CombatResolver,
    player: &Player,
    frame: u64,
    cooldown: u64,
) -> usize {
    if player.is_dead() {
        return 0;
    }
    let mut fired = 0;
    for (_, (smuggler, pos)) in world.query_mut::<(&mut Smuggler, &Position)>() {
        if !smuggler.state.is_combat() || smuggler.data.ammo == 0 {
            continue;
        }
        if pos.distance(player.x, player.y) > agents::ENGAGEMENT_DISTANCE {
            continue;
        }
        let ready = smuggler
            .data
            .last_shot_frame
            .map_or(true, |last| frame.saturating_sub(last) >= cooldown);
        if !ready {
            continue;
        }
        let direction = Direction::toward(player.x - pos.x, player.y - pos.y);
        resolver.request_fire(pos.x, pos.y, direction, ProjectileOrigin::Npc);
        smuggler.data.last_shot_frame = Some(frame);
        smuggler.data.ammo -= 1;
        fired += 1;
    }
    fired
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn_villager(world: &mut World, id: u32, x: f32, y: f32, health: i32) -> Entity {
        world.spawn((
            Agent { id, kind: AgentKind::Villager },
            Position::new(x, y),
            Facing::default(),
            Health(health),
        ))
    }

    #[test]
    fn test_projectile_hits_agent_in_path() {
        let mut world = World::new();
        let mut player = Player::new(0.0, 0.0);
        let villager = spawn_villager(&mut world, 1, 4.0, 10.0, 100);
        let mut resolver = CombatResolver::default();
        resolver.request_fire(1.0, 10.0, Direction::Right, ProjectileOrigin::Player);

        // 2.5, then 4.0.
        assert!(resolver.update(&mut player, &mut world).is_empty());
        let events = resolver.update(&mut player, &mut world);
        assert_eq!(
            events,
            vec![CombatEvent::AgentHit {
                id: 1,
                damage: 30,
                health: 70
            }]
        );
        assert!(resolver.projectiles().is_empty());
        assert_eq!(world.get::<&Health>(villager).unwrap().0, 70);
    }

    #[test]
    fn test_lethal_hit_despawns() {
        let mut world = World::new();
        let mut player = Player::new(50.0, 50.0);
        let villager = spawn_villager(&mut world, 9, 11.5, 3.0, 20);
        let mut resolver = CombatResolver::default();
        resolver.request_fire(10.0, 3.0, Direction::Right, ProjectileOrigin::Player);
        let events = resolver.update(&mut player, &mut world);
        assert!(events.contains(&CombatEvent::AgentKilled {
            id: 9,
            kind: AgentKind::Villager
        }));
        assert!(!world.contains(villager));
    }

    #[test]
    fn test_player_checked_first() {
        let mut world = World::new();
        let mut player = Player::new(5.0, 6.5);
        spawn_villager(&mut world, 1, 5.0, 6.5, 100);
        let mut resolver = CombatResolver::default();
        resolver.request_fire(5.0, 5.0, Direction::Down, ProjectileOrigin::Npc);
        let events = resolver.update(&mut player, &mut world);
        assert_eq!(
            events,
            vec![CombatEvent::PlayerHit {
                damage: 30,
                health: 70
            }]
        );
    }

    #[test]
    fn test_player_health_clamps_and_dies() {
        let mut world = World::new();
        let mut player = Player::new(2.5, 0.0);
        player.health = 10;
        let mut resolver = CombatResolver::default();
        resolver.request_fire(1.0, 0.0, Direction::Right, ProjectileOrigin::Npc);
        let events = resolver.update(&mut player, &mut world);
        assert_eq!(player.health, 0);
        assert_eq!(events.last(), Some(&CombatEvent::PlayerKilled));
    }

    #[test]
    fn test_projectile_expires_after_lifetime() {
        let mut world = World::new();
        let mut player = Player::new(-100.0, -100.0);
        let mut resolver = CombatResolver::default();
        resolver.request_fire(0.0, 0.0, Direction::Right, ProjectileOrigin::Player);
        for _ in 0..combat::PROJECTILE_LIFETIME - 1 {
            assert!(resolver.update(&mut player, &mut world).is_empty());
        }
        let events = resolver.update(&mut player, &mut world);
        assert!(matches!(events[..], [CombatEvent::ProjectileExpired { .. }]));
        assert!(resolver.projectiles().is_empty());
    }

    #[test]
    fn test_fire_respects_cooldown() {
        let mut world = World::new();
        let player = Player::new(5.5, 5.5);
        world.spawn((
            Position::new(5.5, 3.5),
            Smuggler {
                state: SmugglerState::Combat,
                data: SmugglerData {
                    ammo: 300,
                    ..Default::default()
                },
            },
        ));
        let mut resolver = CombatResolver::default();
        assert_eq!(smuggler_fire_system(&mut world, &mut resolver, &player, 100, 30), 1);
        assert_eq!(resolver.projectiles()[0].direction, Direction::Down);
        assert_eq!(smuggler_fire_system(&mut world, &mut resolver, &player, 129, 30), 0);
        assert_eq!(smuggler_fire_system(&mut world, &mut resolver, &player, 130, 30), 1);
    }

    #[test]
    fn test_out_of_range_smuggler_holds_fire() {
        let mut world = World::new();
        let player = Player::new(20.5, 5.5);
        world.spawn((
            Position::new(5.5, 5.5),
            Smuggler {
                state: SmugglerState::Combat,
                data: SmugglerData {
                    ammo: 300,
                    ..Default::default()
                },
            },
        ));
        let mut resolver = CombatResolver::default();
        assert_eq!(smuggler_fire_system(&mut world, &mut resolver, &player, 0, 30), 0);
    }

    #[test]
    fn test_empty_magazine_holds_fire() {
        let mut world = World::new();
        let player = Player::new(5.5, 5.5);
        world.spawn((
            Position::new(5.5, 3.5),
            Smuggler {
                state: SmugglerState::Combat,
                data: SmugglerData::default(),
            },
        ));
        let mut resolver = CombatResolver::default();
        for frame in (0..300).step_by(30) {
            assert_eq!(smuggler_fire_system(&mut world, &mut resolver, &player, frame, 30), 0);
        }
        assert!(resolver.projectiles().is_empty());
    }

    #[test]
    fn test_each_shot_spends_one_round() {
        let mut world = World::new();
        let player = Player::new(5.5, 5.5);
        let shooter = world.spawn((
            Position::new(3.5, 5.5),
            Smuggler {
                state: SmugglerState::Combat,
                data: SmugglerData {
                    ammo: 2,
                    ..Default::default()
                },
            },
        ));
        let mut resolver = CombatResolver::default();
        assert_eq!(smuggler_fire_system(&mut world, &mut resolver, &player, 0, 30), 1);
        assert_eq!(world.get::<&Smuggler>(shooter).unwrap().data.ammo, 1);
        // Cooldown not elapsed: no shot, no spend.
        assert_eq!(smuggler_fire_system(&mut world, &mut resolver, &player, 10, 30), 0);
        assert_eq!(world.get::<&Smuggler>(shooter).unwrap().data.ammo, 1);
        assert_eq!(smuggler_fire_system(&mut world, &mut resolver, &player, 30, 30), 1);
        assert_eq!(smuggler_fire_system(&mut world, &mut resolver, &player, 60, 30), 0);
        assert_eq!(world.get::<&Smuggler>(shooter).unwrap().data.ammo, 0);
        assert_eq!(resolver.projectiles().len(), 2);
    }
}
