//! Author-set turret configuration.
//!
//! A `TurretConfig` is static data attached to one controller instance. It
//! deserializes from JSON with every field optional (missing fields take the
//! defaults below) and is checked once by `validate` before a controller is
//! built from it.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::ConfigError;
use crate::types::LayerMask;

/// How the aim rotation approaches the look direction each tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode")]
pub enum AimSmoothing {
    /// Interpolation weight `clamp(rotation_speed * dt, 0, 1)`.
    #[default]
    Linear,
    /// Framerate-independent weight `1 - (1 - smoothing)^(dt * 60)`.
    Exponential { smoothing: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurretConfig {
    /// Tag scanned for candidates. `None` disables the tag scan.
    pub target_tag: Option<String>,
    /// Name of a fixed target tried before the tag scan.
    pub target_name: Option<String>,
    /// Seconds between full candidate scans.
    pub reacquire_interval: f64,
    pub max_distance: f64,
    /// Aim gain used by `AimSmoothing::Linear`.
    pub rotation_speed: f64,
    /// Seconds between shots. Zero or negative disables firing.
    pub fire_interval: f64,
    /// Child entity used as the muzzle. Falls back to the turret itself.
    pub muzzle_name: Option<String>,
    /// Added to a target's world position to get the aim point.
    pub target_offset: DVec3,
    /// Template spawned per shot. `None` draws a debug tracer instead.
    pub projectile_template: Option<String>,
    /// Launch speed. Zero or negative leaves the projectile at rest.
    pub projectile_speed: f64,
    /// Seconds before a projectile retires. Zero or negative keeps it forever.
    pub projectile_lifetime: f64,
    pub fire_sound: Option<String>,
    /// Single layer that rays are restricted to. `None` hits every layer.
    pub raycast_mask_bit: Option<u8>,
    pub require_line_of_sight: bool,
    pub draw_debug_aim: bool,
    pub debug_color: [f32; 3],
    pub aim_smoothing: AimSmoothing,
}

impl Default for TurretConfig {
    fn default() -> Self {
        Self {
            target_tag: Some(DEFAULT_TARGET_TAG.to_string()),
            target_name: None,
            reacquire_interval: DEFAULT_REACQUIRE_INTERVAL,
            max_distance: DEFAULT_MAX_DISTANCE,
            rotation_speed: DEFAULT_ROTATION_SPEED,
            fire_interval: DEFAULT_FIRE_INTERVAL,
            muzzle_name: Some(DEFAULT_MUZZLE_NAME.to_string()),
            target_offset: DEFAULT_TARGET_OFFSET,
            projectile_template: None,
            projectile_speed: DEFAULT_PROJECTILE_SPEED,
            projectile_lifetime: DEFAULT_PROJECTILE_LIFETIME,
            fire_sound: None,
            raycast_mask_bit: None,
            require_line_of_sight: true,
            draw_debug_aim: false,
            debug_color: DEFAULT_DEBUG_COLOR,
            aim_smoothing: AimSmoothing::default(),
        }
    }
}

impl TurretConfig {
    /// Check that every numeric field is usable.
    ///
    /// Non-positive fire interval, projectile speed and lifetime are valid:
    /// they switch the corresponding behavior off.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            ("reacquire_interval", self.reacquire_interval),
            ("max_distance", self.max_distance),
            ("rotation_speed", self.rotation_speed),
            ("fire_interval", self.fire_interval),
            ("projectile_speed", self.projectile_speed),
            ("projectile_lifetime", self.projectile_lifetime),
            ("target_offset.x", self.target_offset.x),
            ("target_offset.y", self.target_offset.y),
            ("target_offset.z", self.target_offset.z),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field, value });
            }
        }

        let non_negative = [
            ("reacquire_interval", self.reacquire_interval),
            ("max_distance", self.max_distance),
            ("rotation_speed", self.rotation_speed),
        ];
        for (field, value) in non_negative {
            if value < 0.0 {
                return Err(ConfigError::Negative { field, value });
            }
        }

        if let Some(bit) = self.raycast_mask_bit {
            if bit >= LAYER_COUNT {
                return Err(ConfigError::MaskBitOutOfRange(bit));
            }
        }

        if let AimSmoothing::Exponential { smoothing } = self.aim_smoothing {
            if !(0.0..1.0).contains(&smoothing) {
                return Err(ConfigError::SmoothingOutOfRange(smoothing));
            }
        }

        Ok(())
    }

    /// Layer mask derived from `raycast_mask_bit`.
    pub fn visibility_mask(&self) -> Option<LayerMask> {
        self.raycast_mask_bit.and_then(LayerMask::from_bit)
    }

    /// Length of the debug tracer drawn when no projectile template is set.
    pub fn tracer_length(&self) -> f64 {
        self.max_distance * TRACER_LENGTH_FACTOR
    }
}
