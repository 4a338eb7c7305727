//! Lifetime system: retires entities whose scheduled time has run out.

use hecs::{Entity, World};

use sentinel_core::components::Lifetime;

/// Count down every `Lifetime` and despawn the expired entities.
/// Uses a pre-allocated buffer to avoid per-tick allocation.
/// Returns the number of entities removed.
pub fn run(world: &mut World, dt: f64, despawn_buffer: &mut Vec<Entity>) -> usize {
    despawn_buffer.clear();

    for (entity, lifetime) in world.query_mut::<&mut Lifetime>() {
        lifetime.remaining_secs -= dt;
        if lifetime.remaining_secs <= 0.0 {
            despawn_buffer.push(entity);
        }
    }

    let removed = despawn_buffer.len();
    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
    removed
}
