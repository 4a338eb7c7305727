//! Fundamental identity, transform, and timing types.

use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_FORWARD, LAYER_COUNT};

/// Opaque handle to an entity owned by the host scene.
///
/// Holding an `EntityId` never keeps the entity alive; it must be resolved
/// through the scene (and checked for liveness) every time it is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u64);

/// Collision layer bitmask used to filter ray casts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);
    pub const ALL: LayerMask = LayerMask(u32::MAX);

    /// Mask with a single layer enabled. `None` if `bit` is out of range.
    pub fn from_bit(bit: u8) -> Option<Self> {
        if bit < LAYER_COUNT {
            Some(Self(1 << bit))
        } else {
            None
        }
    }

    pub fn intersects(self, other: LayerMask) -> bool {
        self.0 & other.0 != 0
    }
}

/// Position, rotation and scale of an entity, relative to its parent (or the world).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: DVec3,
    pub rotation: DQuat,
    pub scale: DVec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: DVec3::ZERO,
            rotation: DQuat::IDENTITY,
            scale: DVec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_position(position: DVec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Forward axis in the parent space. Scaled, so a zero Z scale yields a
    /// degenerate (zero-length) forward vector.
    pub fn forward(&self) -> DVec3 {
        self.rotation * (DEFAULT_FORWARD * self.scale)
    }

    /// Compose `child` (expressed in this transform's space) into this space.
    pub fn mul_transform(&self, child: &Transform) -> Transform {
        Transform {
            position: self.position + self.rotation * (self.scale * child.position),
            rotation: self.rotation * child.rotation,
            scale: self.scale * child.scale,
        }
    }
}

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each tick).
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f64,
}

impl SimTime {
    /// Advance by one tick of `dt` seconds.
    pub fn advance(&mut self, dt: f64) {
        self.tick += 1;
        self.elapsed_secs += dt;
    }
}

/// Resettable elapsed-time accumulator, advanced by the frame clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ElapsedTimer {
    elapsed: f64,
}

impl ElapsedTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A timer that starts with `secs` already accumulated.
    pub fn starting_at(secs: f64) -> Self {
        Self { elapsed: secs }
    }

    pub fn advance(&mut self, dt: f64) {
        if dt.is_finite() && dt > 0.0 {
            self.elapsed += dt;
        }
    }

    pub fn get(&self) -> f64 {
        self.elapsed
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }

    pub fn has_reached(&self, interval: f64) -> bool {
        self.elapsed >= interval
    }
}
