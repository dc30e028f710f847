//! ECS game world: bevy_ecs World, entity management, tick systems, and event bus.

use std::sync::atomic::{AtomicI64, Ordering};

use bevy_ecs::prelude::*;
use glam::Vec3;
use mobnav_world::chunk::MIN_Y;
use mobnav_world::{BlockRegistry, BlockSource, VoxelWorld, WorldError};
use serde::Deserialize;

use crate::ai::brain::GoalSelector;
use crate::ai::grid::GridClassifier;
use crate::ai::mob_behaviors;
use crate::ai::navigator::{NavigatorConfig, PathNavigator};
use crate::ai::pathfinding::PathfindingConfig;
use crate::ai::system::system_ai_tick;
use crate::components::*;
use crate::mob_registry;
use crate::movement::{self, Body};

/// Depth below the world floor at which falling entities are removed.
const VOID_MARGIN: f32 = 64.0;

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// Outgoing events queued by ECS operations for the embedding application.
#[derive(Resource, Default)]
pub struct OutgoingEvents {
    pub events: Vec<GameEvent>,
}

/// Global tick counter (incremented every tick).
#[derive(Resource, Default)]
pub struct TickCounter(pub u64);

/// Thread-safe entity ID allocator (shared by mobs and players).
#[derive(Resource)]
pub struct EntityIdAllocator {
    next: AtomicI64,
}

impl EntityIdAllocator {
    pub fn new(start: i64) -> Self {
        Self {
            next: AtomicI64::new(start),
        }
    }

    /// Allocate the next unique entity ID.
    pub fn allocate(&self) -> i64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// Current value (next ID that will be allocated).
    pub fn current(&self) -> i64 {
        self.next.load(Ordering::Relaxed)
    }
}

/// The voxel terrain and the block classification used to read it.
#[derive(Resource)]
pub struct Terrain {
    pub blocks: VoxelWorld,
    pub registry: BlockRegistry,
}

impl Terrain {
    pub fn new(blocks: VoxelWorld) -> Self {
        Self {
            blocks,
            registry: BlockRegistry::new(),
        }
    }

    pub fn grid(&self) -> GridClassifier<'_> {
        GridClassifier::new(&self.blocks, &self.registry)
    }
}

/// Tunables handed to every spawned mob's navigator and behaviors.
#[derive(Resource, Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AiSettings {
    pub navigation: NavigatorConfig,
    pub pathfinding: PathfindingConfig,
}

// ---------------------------------------------------------------------------
// Game events (ECS → embedding application)
// ---------------------------------------------------------------------------

/// Snapshot of a mob for reporting.
#[derive(Debug, Clone)]
pub struct MobSnapshot {
    pub unique_id: i64,
    pub runtime_id: u64,
    pub mob_type: String,
    pub position: Vec3,
    pub pitch: f32,
    pub yaw: f32,
    pub head_yaw: f32,
    pub health: f32,
    pub max_health: f32,
    pub on_ground: bool,
    /// Name of the running behavior, if any.
    pub behavior: Option<&'static str>,
}

/// Events produced by the game world.
#[derive(Debug, Clone)]
pub enum GameEvent {
    /// A new mob was spawned.
    MobSpawned {
        runtime_id: u64,
        unique_id: i64,
        mob_type: String,
        position: Vec3,
        health: f32,
        max_health: f32,
    },
    /// A mob moved.
    MobMoved {
        runtime_id: u64,
        position: Vec3,
        pitch: f32,
        yaw: f32,
        head_yaw: f32,
        on_ground: bool,
    },
    /// A mob was damaged.
    MobHurt {
        runtime_id: u64,
        new_health: f32,
        tick: u64,
    },
    /// A mob died.
    MobDied { runtime_id: u64, unique_id: i64 },
    /// An entity was removed (despawn or fell out of the world).
    EntityRemoved { unique_id: i64 },
    /// A mob attacks a player (melee).
    MobAttackPlayer {
        mob_runtime_id: u64,
        target_runtime_id: u64,
        damage: f32,
        knockback: (f32, f32, f32),
    },
    /// A mob placed a block.
    BlockPlaced {
        runtime_id: u64,
        position: (i32, i32, i32),
        block_id: u32,
    },
}

// ---------------------------------------------------------------------------
// GameWorld
// ---------------------------------------------------------------------------

/// The ECS game world.
pub struct GameWorld {
    pub world: World,
}

impl GameWorld {
    /// Create a new game world over `terrain` with default AI settings.
    pub fn new(starting_entity_id: i64, terrain: Terrain) -> Self {
        Self::with_settings(starting_entity_id, terrain, AiSettings::default())
    }

    /// Create a new game world with explicit AI settings.
    pub fn with_settings(starting_entity_id: i64, terrain: Terrain, settings: AiSettings) -> Self {
        let mut world = World::new();
        world.insert_resource(OutgoingEvents::default());
        world.insert_resource(TickCounter::default());
        world.insert_resource(EntityIdAllocator::new(starting_entity_id));
        world.insert_resource(terrain);
        world.insert_resource(settings);

        Self { world }
    }

    /// Run one game tick: AI, movement, movement collection, void check, dead cleanup.
    pub fn tick(&mut self) {
        self.world.resource_mut::<TickCounter>().0 += 1;
        system_ai_tick(&mut self.world);
        system_mob_movement(&mut self.world);
        system_collect_mob_moves(&mut self.world);
        system_fell_out_of_world(&mut self.world);
        system_cleanup_dead(&mut self.world);
    }

    /// Drain all pending outgoing events.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.world.resource_mut::<OutgoingEvents>().events)
    }

    /// Return the current tick count.
    pub fn current_tick(&self) -> u64 {
        self.world.resource::<TickCounter>().0
    }

    /// Allocate an entity ID (for players or mobs).
    pub fn allocate_entity_id(&self) -> i64 {
        self.world.resource::<EntityIdAllocator>().allocate()
    }

    pub fn terrain(&self) -> &Terrain {
        self.world.resource::<Terrain>()
    }

    /// Block ID at a position, `None` outside the loaded world.
    pub fn block_at(&self, x: i32, y: i32, z: i32) -> Option<u32> {
        self.terrain().blocks.block_id_at(x, y, z)
    }

    /// Edit the terrain.
    pub fn set_block(&mut self, x: i32, y: i32, z: i32, block_id: u32) -> Result<(), WorldError> {
        self.world
            .resource_mut::<Terrain>()
            .blocks
            .set_block(x, y, z, block_id)
    }

    /// Spawn a mob entity. Returns `(unique_id, runtime_id)` or `None` if type unknown.
    pub fn spawn_mob(&mut self, type_id: &str, position: Vec3) -> Option<(i64, u64)> {
        let def = mob_registry::lookup(type_id)?;
        let settings = self.world.resource::<AiSettings>().clone();
        let entity_id = self.world.resource::<EntityIdAllocator>().allocate();
        let runtime_id = entity_id as u64;

        self.world.spawn((
            (
                EntityId {
                    unique_id: entity_id,
                    runtime_id,
                },
                Position::from(position),
                Rotation::default(),
                Velocity::default(),
                Health {
                    current: def.max_health,
                    max: def.max_health,
                },
                OnGround(false),
                BoundingBox {
                    width: def.bb_width,
                    height: def.bb_height,
                },
                EyeHeight(def.eye_height),
            ),
            (
                Mob,
                def.category,
                MobType(type_id.to_string()),
                AttackDamage(def.attack_damage),
                LastDamageTick(None),
                MovementSpeed(def.movement_speed),
                MovementIntent::default(),
                mob_behaviors::create_selector(type_id, settings.pathfinding),
                PathNavigator::new(settings.navigation),
            ),
        ));

        self.world
            .resource_mut::<OutgoingEvents>()
            .events
            .push(GameEvent::MobSpawned {
                runtime_id,
                unique_id: entity_id,
                mob_type: type_id.to_string(),
                position,
                health: def.max_health,
                max_health: def.max_health,
            });

        Some((entity_id, runtime_id))
    }

    /// Deal damage to a mob. Returns remaining health, or `None` if invulnerable or not found.
    pub fn damage_mob(&mut self, runtime_id: u64, damage: f32, tick: u64) -> Option<f32> {
        let target = self.find_mob_entity(runtime_id)?;

        // Invulnerability check (10 ticks)
        if let Some(LastDamageTick(Some(last))) = self.world.get::<LastDamageTick>(target) {
            if tick.saturating_sub(*last) < 10 {
                return None;
            }
        }

        let new_health = {
            let mut health = self.world.get_mut::<Health>(target)?;
            health.current = (health.current - damage).max(0.0);
            health.current
        };

        if let Some(mut ldt) = self.world.get_mut::<LastDamageTick>(target) {
            ldt.0 = Some(tick);
        }

        let eid = self.world.get::<EntityId>(target)?.clone();

        if new_health <= 0.0 {
            self.world
                .resource_mut::<OutgoingEvents>()
                .events
                .push(GameEvent::MobDied {
                    runtime_id,
                    unique_id: eid.unique_id,
                });
            self.world.entity_mut(target).insert(Dead);
        } else {
            self.world
                .resource_mut::<OutgoingEvents>()
                .events
                .push(GameEvent::MobHurt {
                    runtime_id,
                    new_health,
                    tick,
                });
        }

        Some(new_health)
    }

    /// Get a mob's feet position by runtime_id.
    pub fn mob_position(&mut self, runtime_id: u64) -> Option<Vec3> {
        let entity = self.find_mob_entity(runtime_id)?;
        self.world.get::<Position>(entity).map(Position::vec)
    }

    /// Name of the behavior a mob is running.
    pub fn active_behavior(&mut self, runtime_id: u64) -> Option<&'static str> {
        let entity = self.find_mob_entity(runtime_id)?;
        self.world.get::<GoalSelector>(entity)?.active_name()
    }

    /// Get snapshots of all alive mobs.
    pub fn all_mobs(&mut self) -> Vec<MobSnapshot> {
        let mut query = self.world.query_filtered::<(
            &EntityId,
            &Position,
            &Rotation,
            &Health,
            &MobType,
            &OnGround,
            &GoalSelector,
        ), (With<Mob>, Without<Dead>)>();
        query
            .iter(&self.world)
            .map(
                |(eid, pos, rot, health, mob_type, on_ground, selector)| MobSnapshot {
                    unique_id: eid.unique_id,
                    runtime_id: eid.runtime_id,
                    mob_type: mob_type.0.clone(),
                    position: pos.vec(),
                    pitch: rot.pitch,
                    yaw: rot.yaw,
                    head_yaw: rot.head_yaw,
                    health: health.current,
                    max_health: health.max,
                    on_ground: on_ground.0,
                    behavior: selector.active_name(),
                },
            )
            .collect()
    }

    /// Spawn a player entity that mobs can see, chase and attack.
    pub fn spawn_player(&mut self, unique_id: i64, runtime_id: u64, position: Vec3) {
        self.world.spawn((
            EntityId {
                unique_id,
                runtime_id,
            },
            Position::from(position),
            Health {
                current: 20.0,
                max: 20.0,
            },
            Player,
        ));
    }

    /// Find a mob entity by runtime_id.
    fn find_mob_entity(&mut self, runtime_id: u64) -> Option<Entity> {
        let mut query = self
            .world
            .query_filtered::<(Entity, &EntityId), With<Mob>>();
        query
            .iter(&self.world)
            .find(|(_, eid)| eid.runtime_id == runtime_id)
            .map(|(entity, _)| entity)
    }
}

// ---------------------------------------------------------------------------
// Systems (manual, called by GameWorld::tick)
// ---------------------------------------------------------------------------

/// Integrate mob movement against the terrain.
fn system_mob_movement(world: &mut World) {
    world.resource_scope(|world, terrain: Mut<Terrain>| {
        let grid = terrain.grid();
        let mut query = world.query_filtered::<(
            &mut Position,
            &mut Velocity,
            &mut OnGround,
            &MovementIntent,
            &Rotation,
            &BoundingBox,
        ), (With<Mob>, Without<Dead>)>();

        for (mut pos, mut vel, mut on_ground, intent, rot, bb) in query.iter_mut(world) {
            let mut body = Body {
                position: pos.vec(),
                velocity: Vec3::new(vel.x, vel.y, vel.z),
                on_ground: on_ground.0,
                height: bb.height,
            };
            movement::step(&mut body, intent, rot.yaw, &grid);
            *pos = Position::from(body.position);
            vel.x = body.velocity.x;
            vel.y = body.velocity.y;
            vel.z = body.velocity.z;
            on_ground.0 = body.on_ground;
        }
    });
}

/// Collect position changes and emit MobMoved events.
fn system_collect_mob_moves(world: &mut World) {
    let mut moves = Vec::new();

    let mut query = world
        .query_filtered::<(&EntityId, &Position, &Rotation, &Velocity, &OnGround), (With<Mob>, Without<Dead>)>();

    for (eid, pos, rot, vel, on_ground) in query.iter(world) {
        // Resting on the ground still carries one tick of gravity
        let vertical = if on_ground.0 { 0.0 } else { vel.y };
        if vel.x.abs() > 0.001 || vertical.abs() > 0.001 || vel.z.abs() > 0.001 {
            moves.push(GameEvent::MobMoved {
                runtime_id: eid.runtime_id,
                position: pos.vec(),
                pitch: rot.pitch,
                yaw: rot.yaw,
                head_yaw: rot.head_yaw,
                on_ground: on_ground.0,
            });
        }
    }

    world.resource_mut::<OutgoingEvents>().events.extend(moves);
}

/// Remove mobs that fell far below the world.
fn system_fell_out_of_world(world: &mut World) {
    let floor = MIN_Y as f32 - VOID_MARGIN;
    let fallen: Vec<(Entity, i64)> = world
        .query_filtered::<(Entity, &EntityId, &Position), (With<Mob>, Without<Dead>)>()
        .iter(world)
        .filter(|(_, _, pos)| pos.y < floor)
        .map(|(entity, eid, _)| (entity, eid.unique_id))
        .collect();

    for (entity, unique_id) in fallen {
        tracing::debug!(unique_id, "mob fell out of the world");
        world
            .resource_mut::<OutgoingEvents>()
            .events
            .push(GameEvent::EntityRemoved { unique_id });
        world.entity_mut(entity).insert(Dead);
    }
}

/// Remove dead entities after their death events have been emitted.
fn system_cleanup_dead(world: &mut World) {
    stop_dead_brains(world);
    let dead_entities: Vec<Entity> = world
        .query_filtered::<Entity, With<Dead>>()
        .iter(world)
        .collect();
    for entity in dead_entities {
        world.despawn(entity);
    }
}

/// Give the running behavior of each dead mob its stop call.
fn stop_dead_brains(world: &mut World) {
    let mut brains = world.query_filtered::<(&mut GoalSelector, &mut PathNavigator), With<Dead>>();
    for (mut selector, mut nav) in brains.iter_mut(world) {
        selector.reset(&mut nav);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
