//! Kinematic integration system.
//!
//! Updates the local position of every rigid body: position += velocity * dt.

use hecs::World;

use sentinel_core::components::{Inactive, RigidBody};
use sentinel_core::types::Transform;

/// Integrate every active entity carrying a `RigidBody`.
pub fn run(world: &mut World, dt: f64) {
    for (_entity, (transform, body, inactive)) in
        world.query_mut::<(&mut Transform, &RigidBody, Option<&Inactive>)>()
    {
        if inactive.is_some() {
            continue;
        }
        transform.position += body.linear_velocity * dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    #[test]
    fn test_velocity_integrates() {
        let mut world = World::new();
        let e = world.spawn((
            Transform::from_position(DVec3::new(1.0, 0.0, 0.0)),
            RigidBody {
                linear_velocity: DVec3::new(0.0, 0.0, -30.0),
            },
        ));
        run(&mut world, 0.5);
        let t = world.get::<&Transform>(e).unwrap();
        assert_eq!(t.position, DVec3::new(1.0, 0.0, -15.0));
    }

    #[test]
    fn test_inactive_bodies_do_not_move() {
        let mut world = World::new();
        let e = world.spawn((
            Transform::default(),
            RigidBody {
                linear_velocity: DVec3::X,
            },
            Inactive,
        ));
        run(&mut world, 1.0);
        assert_eq!(world.get::<&Transform>(e).unwrap().position, DVec3::ZERO);
    }
}
