//! Simulation constants and tuning parameters.

use glam::DVec3;

/// Default host tick rate (Hz).
pub const TICK_RATE: u32 = 60;

/// Seconds per tick at the default tick rate.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

// --- Geometry ---

/// Vectors shorter than this are treated as degenerate directions.
pub const DIRECTION_EPSILON: f64 = 1e-4;

/// World up axis used for look-at rotations.
pub const WORLD_UP: DVec3 = DVec3::Y;

/// Forward axis of an unrotated transform, and the fallback launch direction.
pub const DEFAULT_FORWARD: DVec3 = DVec3::NEG_Z;

/// Frame rate the exponential smoothing value is calibrated against.
pub const SMOOTHING_REFERENCE_RATE: f64 = 60.0;

/// Upper bound for exponential smoothing values (1.0 would never converge).
pub const MAX_SMOOTHING: f64 = 0.99;

// --- Turret defaults ---

pub const DEFAULT_TARGET_TAG: &str = "Player";
pub const DEFAULT_MUZZLE_NAME: &str = "Muzzle";

/// Seconds between full candidate scans.
pub const DEFAULT_REACQUIRE_INTERVAL: f64 = 0.35;

/// Maximum engagement distance (world units).
pub const DEFAULT_MAX_DISTANCE: f64 = 25.0;

/// Aim gain (fraction of the remaining rotation covered per second).
pub const DEFAULT_ROTATION_SPEED: f64 = 6.0;

/// Seconds between shots.
pub const DEFAULT_FIRE_INTERVAL: f64 = 0.75;

/// Offset added to a target's position to get its aim point.
pub const DEFAULT_TARGET_OFFSET: DVec3 = DVec3::new(0.0, 1.2, 0.0);

pub const DEFAULT_PROJECTILE_SPEED: f64 = 28.0;
pub const DEFAULT_PROJECTILE_LIFETIME: f64 = 6.0;

pub const DEFAULT_DEBUG_COLOR: [f32; 3] = [1.0, 0.35, 0.15];

/// Tracer length as a fraction of max distance when no projectile template is set.
pub const TRACER_LENGTH_FACTOR: f64 = 0.5;

// --- Scene ---

/// Maximum parent chain walked when resolving world transforms.
pub const MAX_PARENT_DEPTH: usize = 16;

/// Distance at which a patrolling entity counts as arrived at a waypoint.
pub const PATROL_ARRIVAL_EPSILON: f64 = 0.01;

/// Number of layer bits available in a `LayerMask`.
pub const LAYER_COUNT: u8 = 32;
