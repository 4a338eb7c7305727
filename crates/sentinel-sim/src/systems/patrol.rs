//! Patrol system: walks entities along their waypoint paths.
//!
//! Each patrol heads for `current` at `speed`. On arrival it waits
//! `wait_secs`, then picks the next waypoint: wrapping when looping,
//! reversing when ping-ponging, or stopping at the end otherwise.

use hecs::World;

use sentinel_core::components::{Inactive, Patrol};
use sentinel_core::constants::{DIRECTION_EPSILON, PATROL_ARRIVAL_EPSILON, WORLD_UP};
use sentinel_core::math;
use sentinel_core::types::Transform;

/// Advance every active patrol by `dt` seconds.
pub fn run(world: &mut World, dt: f64) {
    for (_entity, (transform, patrol, inactive)) in
        world.query_mut::<(&mut Transform, &mut Patrol, Option<&Inactive>)>()
    {
        if inactive.is_some() {
            continue;
        }
        step(transform, patrol, dt);
    }
}

fn step(transform: &mut Transform, patrol: &mut Patrol, dt: f64) {
    if patrol.completed || patrol.speed <= 0.0 {
        return;
    }

    if patrol.waiting {
        patrol.wait_timer.advance(dt);
        if !patrol.wait_timer.has_reached(patrol.wait_secs) {
            return;
        }
        patrol.waiting = false;
        patrol.wait_timer.reset();
        advance_index(patrol);
        if patrol.completed {
            return;
        }
    }

    let Some(&target) = patrol.waypoints.get(patrol.current) else {
        patrol.completed = true;
        return;
    };

    let delta = target - transform.position;
    let distance = delta.length();
    if distance <= PATROL_ARRIVAL_EPSILON {
        if patrol.wait_secs > 0.0 {
            patrol.waiting = true;
            patrol.wait_timer.reset();
        } else {
            advance_index(patrol);
        }
        return;
    }

    let direction = delta / distance;
    let travel = patrol.speed * dt;
    transform.position = if travel >= distance {
        target
    } else {
        transform.position + direction * travel
    };

    if patrol.align_to_motion {
        let planar = glam::DVec3::new(direction.x, 0.0, direction.z);
        if planar.length() > DIRECTION_EPSILON {
            if let Some(rotation) = math::look_rotation(planar.normalize(), WORLD_UP) {
                transform.rotation = rotation;
            }
        }
    }
}

fn advance_index(patrol: &mut Patrol) {
    let len = patrol.waypoints.len();
    if len <= 1 {
        patrol.completed = true;
        return;
    }

    let last = len - 1;
    let next = patrol.current as isize + patrol.direction as isize;

    patrol.current = if patrol.ping_pong {
        if next > last as isize {
            patrol.direction = -1;
            last - 1
        } else if next < 0 {
            patrol.direction = 1;
            1
        } else {
            next as usize
        }
    } else if next > last as isize {
        if patrol.looping {
            0
        } else {
            patrol.completed = true;
            last
        }
    } else if next < 0 {
        if patrol.looping {
            last
        } else {
            patrol.completed = true;
            0
        }
    } else {
        next as usize
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;
    use sentinel_core::types::ElapsedTimer;

    fn patrol(waypoints: Vec<DVec3>) -> Patrol {
        Patrol {
            waypoints,
            speed: 2.0,
            wait_secs: 0.0,
            looping: true,
            ping_pong: false,
            align_to_motion: true,
            current: 0,
            direction: 1,
            waiting: false,
            wait_timer: ElapsedTimer::new(),
            completed: false,
        }
    }

    fn position(world: &World, e: hecs::Entity) -> DVec3 {
        world.get::<&Transform>(e).unwrap().position
    }

    #[test]
    fn test_moves_at_constant_speed() {
        let mut world = World::new();
        let e = world.spawn((
            Transform::default(),
            patrol(vec![DVec3::new(10.0, 0.0, 0.0)]),
        ));
        run(&mut world, 0.5);
        assert!((position(&world, e) - DVec3::new(1.0, 0.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_snaps_to_waypoint_without_overshoot() {
        let mut world = World::new();
        let e = world.spawn((
            Transform::default(),
            patrol(vec![DVec3::new(0.5, 0.0, 0.0), DVec3::new(0.5, 0.0, 5.0)]),
        ));
        run(&mut world, 1.0);
        assert_eq!(position(&world, e), DVec3::new(0.5, 0.0, 0.0));
    }

    #[test]
    fn test_looping_path_wraps() {
        let mut p = patrol(vec![DVec3::ZERO, DVec3::X, DVec3::Z]);
        p.current = 2;
        advance_index(&mut p);
        assert_eq!(p.current, 0);
        assert!(!p.completed);
    }

    #[test]
    fn test_open_path_completes_at_end() {
        let mut p = patrol(vec![DVec3::ZERO, DVec3::X]);
        p.looping = false;
        p.current = 1;
        advance_index(&mut p);
        assert_eq!(p.current, 1);
        assert!(p.completed);
    }

    #[test]
    fn test_ping_pong_reverses() {
        let mut p = patrol(vec![DVec3::ZERO, DVec3::X, DVec3::Z]);
        p.ping_pong = true;
        p.current = 2;
        advance_index(&mut p);
        assert_eq!((p.current, p.direction), (1, -1));
        advance_index(&mut p);
        assert_eq!((p.current, p.direction), (0, -1));
        advance_index(&mut p);
        assert_eq!((p.current, p.direction), (1, 1));
    }

    #[test]
    fn test_single_waypoint_completes_on_arrival() {
        let mut world = World::new();
        let e = world.spawn((Transform::default(), patrol(vec![DVec3::ZERO])));
        run(&mut world, 0.1);
        assert!(world.get::<&Patrol>(e).unwrap().completed);
    }

    #[test]
    fn test_waits_before_leaving_waypoint() {
        let mut world = World::new();
        let mut p = patrol(vec![DVec3::ZERO, DVec3::new(0.0, 0.0, -10.0)]);
        p.wait_secs = 0.5;
        let e = world.spawn((Transform::default(), p));

        // Arrive, then wait out the pause.
        run(&mut world, 0.25);
        assert!(world.get::<&Patrol>(e).unwrap().waiting);
        run(&mut world, 0.25);
        assert_eq!(position(&world, e), DVec3::ZERO);
        run(&mut world, 0.25);
        assert!(position(&world, e).z < 0.0);
    }

    #[test]
    fn test_faces_direction_of_travel() {
        let mut world = World::new();
        let e = world.spawn((
            Transform::default(),
            patrol(vec![DVec3::new(10.0, 5.0, 0.0)]),
        ));
        run(&mut world, 0.1);
        let forward = world.get::<&Transform>(e).unwrap().forward();
        assert!((forward - DVec3::X).length() < 1e-9);
    }

    #[test]
    fn test_inactive_patrol_is_frozen() {
        let mut world = World::new();
        let e = world.spawn((
            Transform::default(),
            patrol(vec![DVec3::new(10.0, 0.0, 0.0)]),
            Inactive,
        ));
        run(&mut world, 1.0);
        assert_eq!(position(&world, e), DVec3::ZERO);
    }
}
