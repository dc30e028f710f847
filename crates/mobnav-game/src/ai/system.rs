//! AI tick system: runs each mob's goal selector and navigator, then applies
//! the results to ECS state.

use bevy_ecs::prelude::*;
use glam::Vec3;
use mobnav_world::{BlockSource, AIR};
use tracing::{debug, warn};

use crate::components::*;
use crate::game_world::{GameEvent, OutgoingEvents, Terrain, TickCounter};
use crate::mob_registry::MobCategory;

use super::behavior::{BehaviorContext, BehaviorOutput, NearestPlayerInfo};
use super::brain::GoalSelector;
use super::grid::GridClassifier;
use super::navigator::{PathNavigator, SteeringAgent, SteeringResult};
use super::pathfinding;

/// Player snapshot for AI context.
struct PlayerSnapshot {
    entity: Entity,
    runtime_id: u64,
    position: Vec3,
}

/// Mob snapshot for AI evaluation.
struct MobSnapshot {
    entity: Entity,
    runtime_id: u64,
    position: Vec3,
    eye_height: f32,
    speed: f32,
    attack_damage: f32,
    category: MobCategory,
    on_ground: bool,
    last_damage_tick: Option<u64>,
}

/// What one mob decided this tick.
struct Decision {
    entity: Entity,
    runtime_id: u64,
    position: Vec3,
    speed: f32,
    attack_damage: f32,
    output: BehaviorOutput,
    steering: SteeringResult,
}

/// Runs behavior selection and steering for all alive mobs with a GoalSelector.
pub fn system_ai_tick(world: &mut World) {
    // Step 1: Snapshot all player positions
    let players: Vec<PlayerSnapshot> = {
        let mut q = world
            .query_filtered::<(Entity, &EntityId, &Position), (With<Player>, Without<Dead>)>();
        q.iter(world)
            .map(|(entity, eid, pos)| PlayerSnapshot {
                entity,
                runtime_id: eid.runtime_id,
                position: pos.vec(),
            })
            .collect()
    };

    let current_tick = world.resource::<TickCounter>().0;

    // Step 2: Snapshot all mob entities
    let mobs: Vec<MobSnapshot> = {
        let mut q = world.query_filtered::<(
            Entity,
            &EntityId,
            &Position,
            &EyeHeight,
            &MovementSpeed,
            &AttackDamage,
            &MobCategory,
            &OnGround,
            &LastDamageTick,
        ), (With<Mob>, With<GoalSelector>, Without<Dead>)>();
        q.iter(world)
            .map(
                |(entity, eid, pos, eye, speed, dmg, category, on_ground, ldt)| MobSnapshot {
                    entity,
                    runtime_id: eid.runtime_id,
                    position: pos.vec(),
                    eye_height: eye.0,
                    speed: speed.0,
                    attack_damage: dmg.0,
                    category: *category,
                    on_ground: on_ground.0,
                    last_damage_tick: ldt.0,
                },
            )
            .collect()
    };

    // Step 3: Tick selectors and navigators against the terrain
    let mut decisions = Vec::with_capacity(mobs.len());
    world.resource_scope(|world, terrain: Mut<Terrain>| {
        let grid = GridClassifier::new(&terrain.blocks, &terrain.registry);
        let mut brains = world.query::<(&mut GoalSelector, &mut PathNavigator)>();

        for mob in &mobs {
            let Ok((mut selector, mut nav)) = brains.get_mut(world, mob.entity) else {
                continue;
            };
            let ctx = BehaviorContext {
                mob_position: mob.position,
                mob_eye_height: mob.eye_height,
                mob_speed: mob.speed,
                mob_category: mob.category,
                mob_on_ground: mob.on_ground,
                current_tick,
                last_damage_tick: mob.last_damage_tick,
                nearest_player: find_nearest_player(&players, mob.position),
                navigation: nav.last_mode(),
                grid,
            };
            let output = selector.tick(&ctx, &mut nav);
            let agent = SteeringAgent {
                position: mob.position,
                eye_height: mob.eye_height,
            };
            let steering = nav.steer(&agent, &grid);

            decisions.push(Decision {
                entity: mob.entity,
                runtime_id: mob.runtime_id,
                position: mob.position,
                speed: mob.speed,
                attack_damage: mob.attack_damage,
                output,
                steering,
            });
        }
    });

    // Step 4: Apply outputs to ECS state
    for decision in decisions {
        apply_decision(world, &players, decision);
    }
}

fn apply_decision(world: &mut World, players: &[PlayerSnapshot], decision: Decision) {
    let Decision {
        entity,
        runtime_id,
        position,
        speed,
        attack_damage,
        output,
        steering,
    } = decision;

    // Movement intent for the integrator
    if let Some(mut intent) = world.get_mut::<MovementIntent>(entity) {
        intent.forward = steering.forward;
        intent.jump = steering.jump || output.jump;
        intent.speed = speed * output.speed_multiplier.unwrap_or(1.0);
    }

    // Rotation: steering turns the body, a look request turns the head
    // (and the body too while standing still)
    if let Some(mut rot) = world.get_mut::<Rotation>(entity) {
        if let Some(yaw) = steering.yaw {
            let yaw = pathfinding::normalize_yaw(yaw);
            rot.yaw = yaw;
            rot.head_yaw = yaw;
        }
        if let Some((yaw, head_yaw)) = output.look_at {
            if !steering.is_moving() {
                rot.yaw = yaw;
            }
            rot.head_yaw = head_yaw;
        }
    }

    // Queue mob attack event
    if let Some(target_runtime_id) = output.attack {
        let knockback = players
            .iter()
            .find(|p| p.runtime_id == target_runtime_id)
            .map(|p| {
                let dx = p.position.x - position.x;
                let dz = p.position.z - position.z;
                let d = (dx * dx + dz * dz).sqrt().max(0.01);
                (dx / d * 0.4, 0.4_f32, dz / d * 0.4)
            })
            .unwrap_or((0.0, 0.4, 0.0));

        world
            .resource_mut::<OutgoingEvents>()
            .events
            .push(GameEvent::MobAttackPlayer {
                mob_runtime_id: runtime_id,
                target_runtime_id,
                damage: attack_damage,
                knockback,
            });
    }

    // Block placement, only into air
    if let Some((cell, block_id)) = output.place_block {
        let placed = {
            let mut terrain = world.resource_mut::<Terrain>();
            match terrain.blocks.block_id_at(cell.x, cell.y, cell.z) {
                Some(AIR) => terrain.blocks.set_block(cell.x, cell.y, cell.z, block_id),
                _ => {
                    debug!(?cell, "block placement target is occupied");
                    return;
                }
            }
        };
        match placed {
            Ok(()) => world
                .resource_mut::<OutgoingEvents>()
                .events
                .push(GameEvent::BlockPlaced {
                    runtime_id,
                    position: (cell.x, cell.y, cell.z),
                    block_id,
                }),
            Err(e) => warn!(?cell, "mob block placement failed: {e}"),
        }
    }
}

/// Find the nearest player to a given position (horizontal distance).
fn find_nearest_player(players: &[PlayerSnapshot], from: Vec3) -> Option<NearestPlayerInfo> {
    players
        .iter()
        .map(|p| {
            let dist = pathfinding::distance_xz(from.x, from.z, p.position.x, p.position.z);
            (p.entity, p.runtime_id, dist, p.position)
        })
        .min_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(std::cmp::Ordering::Equal))
}
