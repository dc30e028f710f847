//! Builds a populated game world from the loaded configuration.

use glam::Vec3;
use mobnav_game::game_world::{AiSettings, GameEvent, GameWorld, Terrain};
use mobnav_world::flat_generator::{generate_flat_world, FlatLayers};
use mobnav_world::{BlockRegistry, WorldError};
use tracing::{debug, info, warn};

use crate::config::{SimConfig, StructureEntry};

/// Generate the terrain, place structures, then spawn players and mobs.
pub fn build(config: &SimConfig) -> Result<GameWorld, WorldError> {
    let mut blocks = generate_flat_world(config.world.radius_chunks, &FlatLayers::default());
    let registry = BlockRegistry::new();
    for structure in &config.world.structures {
        place_structure(&mut blocks, &registry, structure)?;
    }

    let settings = AiSettings {
        navigation: config.navigation.clone(),
        pathfinding: config.pathfinding,
    };
    let mut gw = GameWorld::with_settings(1, Terrain::new(blocks), settings);

    for player in &config.players {
        let id = gw.allocate_entity_id();
        gw.spawn_player(id, id as u64, Vec3::from_array(player.position));
    }
    for mob in &config.mobs {
        if gw
            .spawn_mob(&mob.type_id, Vec3::from_array(mob.position))
            .is_none()
        {
            warn!("Unknown mob type {}, skipped", mob.type_id);
        }
    }

    info!(
        "Scenario ready: {} structure(s), {} player(s), {} mob(s)",
        config.world.structures.len(),
        config.players.len(),
        gw.all_mobs().len()
    );
    Ok(gw)
}

fn place_structure(
    blocks: &mut mobnav_world::VoxelWorld,
    registry: &BlockRegistry,
    structure: &StructureEntry,
) -> Result<(), WorldError> {
    let block_id = registry
        .id_by_name(&structure.block)
        .ok_or_else(|| WorldError::UnknownBlock(structure.block.clone()))?;
    let [x0, y0, z0] = structure.min;
    let [x1, y1, z1] = structure.max;
    blocks.fill((x0, y0, z0), (x1, y1, z1), block_id)?;
    debug!("Placed {} from {:?} to {:?}", structure.block, structure.min, structure.max);
    Ok(())
}

/// Log the state of every mob.
pub fn report(gw: &mut GameWorld) {
    let tick = gw.current_tick();
    for mob in gw.all_mobs() {
        info!(
            tick,
            runtime_id = mob.runtime_id,
            mob_type = %mob.mob_type,
            behavior = mob.behavior.unwrap_or("idle"),
            "at ({:.2}, {:.2}, {:.2}) health {}/{}",
            mob.position.x,
            mob.position.y,
            mob.position.z,
            mob.health,
            mob.max_health
        );
    }
}

/// Log the notable events of one tick.
pub fn log_events(events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::MobAttackPlayer {
                mob_runtime_id,
                target_runtime_id,
                damage,
                ..
            } => info!("Mob {mob_runtime_id} hit player {target_runtime_id} for {damage}"),
            GameEvent::BlockPlaced {
                runtime_id,
                position,
                block_id,
            } => info!("Mob {runtime_id} placed block {block_id} at {position:?}"),
            GameEvent::EntityRemoved { unique_id } => info!("Entity {unique_id} removed"),
            _ => {}
        }
    }
}
