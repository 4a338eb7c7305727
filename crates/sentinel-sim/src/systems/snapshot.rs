//! Snapshot system: reads the scene and controllers into a `Snapshot`.
//!
//! This system is read-only; it never modifies the world.

use sentinel_core::components::{Inactive, Lifetime, Name, Projectile, RigidBody, Tags};
use sentinel_core::events::TurretEvent;
use sentinel_core::state::*;
use sentinel_core::types::{SimTime, Transform};

use crate::controller::TurretController;
use crate::scene::Scene;
use crate::world::{entity_id, SceneWorld};

/// Build a complete snapshot of the current scene state.
pub fn build_snapshot(
    scene: &SceneWorld,
    turrets: &[TurretController],
    time: &SimTime,
    events: Vec<TurretEvent>,
) -> Snapshot {
    Snapshot {
        time: *time,
        turrets: build_turrets(scene, turrets),
        targets: build_targets(scene),
        projectiles: build_projectiles(scene),
        debug_lines: scene
            .debug_lines()
            .iter()
            .map(|line| LineView {
                from: line.from,
                to: line.to,
                color: line.color,
            })
            .collect(),
        sounds: scene.sounds().to_vec(),
        events,
    }
}

fn build_turrets(scene: &SceneWorld, turrets: &[TurretController]) -> Vec<TurretView> {
    turrets
        .iter()
        .filter_map(|turret| {
            let owner = turret.owner();
            Some(TurretView {
                entity: owner,
                name: scene.name_of(owner),
                state: turret.state(),
                target: turret.target(),
                position: scene.world_position(owner)?,
                rotation: scene.world_rotation(owner)?,
                retarget_elapsed: turret.retarget_elapsed(),
                fire_elapsed: turret.fire_elapsed(),
            })
        })
        .collect()
}

/// Tagged, non-projectile entities, sorted by id.
fn build_targets(scene: &SceneWorld) -> Vec<TargetView> {
    let world = scene.world();
    let mut targets: Vec<TargetView> = world
        .query::<(&Tags, Option<&Name>, Option<&Inactive>, Option<&Projectile>)>()
        .iter()
        .filter(|(_, (tags, _, _, projectile))| !tags.0.is_empty() && projectile.is_none())
        .filter_map(|(entity, (_, name, inactive, _))| {
            let id = entity_id(entity);
            Some(TargetView {
                entity: id,
                name: name.map(|n| n.0.clone()),
                position: scene.world_position(id)?,
                active: inactive.is_none(),
            })
        })
        .collect();
    targets.sort_by_key(|t| t.entity);
    targets
}

fn build_projectiles(scene: &SceneWorld) -> Vec<ProjectileView> {
    let mut projectiles: Vec<ProjectileView> = scene
        .world()
        .query::<(&Projectile, &Transform, Option<&RigidBody>, Option<&Lifetime>)>()
        .iter()
        .map(|(entity, (_, transform, body, lifetime))| ProjectileView {
            entity: entity_id(entity),
            position: transform.position,
            velocity: body.map(|b| b.linear_velocity).unwrap_or_default(),
            remaining_secs: lifetime.map(|l| l.remaining_secs),
        })
        .collect();
    projectiles.sort_by_key(|p| p.entity);
    projectiles
}
