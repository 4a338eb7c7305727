//! Events emitted by turret controllers for logging and UI feedback.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::enums::ShotKind;
use crate::types::EntityId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TurretEvent {
    /// A scan adopted a target (new, or the same one refreshed after being dropped).
    TargetAcquired {
        turret: EntityId,
        target: EntityId,
        distance: f64,
    },
    /// The held target failed its validity check and was dropped.
    TargetLost { turret: EntityId, target: EntityId },
    ShotFired {
        turret: EntityId,
        target: EntityId,
        kind: ShotKind,
        /// Spawned projectile, if any. The turret keeps no reference to it.
        projectile: Option<EntityId>,
        direction: DVec3,
    },
    /// The cooldown had elapsed but the fire-time visibility check failed.
    ShotHeld { turret: EntityId, target: EntityId },
}

impl TurretEvent {
    pub fn turret(&self) -> EntityId {
        match self {
            TurretEvent::TargetAcquired { turret, .. }
            | TurretEvent::TargetLost { turret, .. }
            | TurretEvent::ShotFired { turret, .. }
            | TurretEvent::ShotHeld { turret, .. } => *turret,
        }
    }
}
