//! Geometry and smoothing helpers shared by the turret core and the host.
//!
//! Everything here is a pure function of its inputs. Smoothing factors take
//! the tick's elapsed time so that behavior does not depend on frame rate.

use glam::{DMat3, DQuat, DVec3};

use crate::constants::{DIRECTION_EPSILON, MAX_SMOOTHING, SMOOTHING_REFERENCE_RATE};

pub fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

/// Interpolation weight for a gain-driven approach: `clamp(gain * dt, 0, 1)`.
pub fn linear_factor(gain: f64, dt: f64) -> f64 {
    clamp01(gain * dt)
}

/// Framerate-independent lerp weight for a per-frame smoothing value.
///
/// `smoothing` is the fraction of the remaining distance covered per frame at
/// the reference rate, clamped to `[0, 0.99]`. Zero disables smoothing (weight 1).
pub fn exponential_smoothing_factor(smoothing: f64, dt: f64) -> f64 {
    let smooth = smoothing.clamp(0.0, MAX_SMOOTHING);
    if smooth <= 0.0 {
        return 1.0;
    }
    1.0 - (1.0 - smooth).powf(dt * SMOOTHING_REFERENCE_RATE)
}

/// Unit vector along `v`, or `None` if `v` is too short to have a direction.
pub fn normalize_or_none(v: DVec3) -> Option<DVec3> {
    let len = v.length();
    if len > DIRECTION_EPSILON {
        Some(v / len)
    } else {
        None
    }
}

/// Rotation whose forward axis (-Z) points along `forward`, with +Y as close
/// to `up` as possible. Falls back to an arbitrary perpendicular up when
/// `forward` is parallel to `up`.
pub fn look_rotation(forward: DVec3, up: DVec3) -> Option<DQuat> {
    let f = normalize_or_none(forward)?;
    let right = match normalize_or_none(f.cross(up)) {
        Some(r) => r,
        None => f.cross(f.any_orthonormal_vector()).normalize(),
    };
    let true_up = right.cross(f);
    Some(DQuat::from_mat3(&DMat3::from_cols(right, true_up, -f)).normalize())
}

/// Rotate `current` toward facing `look_point` from `eye` by `factor` in [0, 1].
///
/// Returns `current` unchanged when the look direction is degenerate.
pub fn smooth_look_at(current: DQuat, eye: DVec3, look_point: DVec3, factor: f64, up: DVec3) -> DQuat {
    match look_rotation(look_point - eye, up) {
        Some(target) => current.slerp(target, clamp01(factor)).normalize(),
        None => current,
    }
}
