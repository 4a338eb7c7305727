//! ECS components for entities in the reference scene.
//!
//! Components are plain data structs with no methods.
//! Scene behavior lives in the sim crate, not in components.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::types::{ElapsedTimer, EntityId, LayerMask};

/// Unique lookup name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Name(pub String);

/// Tag memberships used by target scans.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tags(pub Vec<String>);

/// Parent entity. The owner's `Transform` is then relative to the parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parent(pub EntityId);

/// Marker: entity is deactivated (skipped by scans, rays, and movement).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Inactive;

/// Marker: entity is a turret driven by a controller.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Turret;

/// Marker: entity was spawned as a projectile.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Projectile;

/// Sphere that blocks rays on the given layers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SphereCollider {
    pub radius: f64,
    pub layers: LayerMask,
}

/// Physics body carrying a linear velocity (world units per second).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RigidBody {
    pub linear_velocity: DVec3,
}

/// Scheduled retirement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lifetime {
    pub remaining_secs: f64,
}

/// Waypoint path walked at constant speed. Waypoints are in parent space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patrol {
    pub waypoints: Vec<DVec3>,
    pub speed: f64,
    /// Pause at each waypoint before heading to the next.
    pub wait_secs: f64,
    /// Wrap back to the first waypoint after the last one.
    pub looping: bool,
    /// Walk the path back and forth. Takes precedence over `looping`.
    pub ping_pong: bool,
    /// Yaw the entity to face its horizontal direction of travel.
    pub align_to_motion: bool,
    /// Index of the waypoint currently walked toward.
    pub current: usize,
    /// +1 walking forward along the path, -1 walking back.
    pub direction: i8,
    pub waiting: bool,
    pub wait_timer: ElapsedTimer,
    /// Set once a non-looping path reaches its end.
    pub completed: bool,
}
