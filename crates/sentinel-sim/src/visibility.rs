//! Line-of-sight query between the muzzle and an aim point.

use glam::DVec3;

use sentinel_core::config::TurretConfig;
use sentinel_core::types::{EntityId, LayerMask};

use crate::scene::Scene;

/// Ray-test wrapper that decides whether a point can be seen from the muzzle.
///
/// The mask is derived once from the configuration and never changes.
#[derive(Debug, Clone)]
pub struct VisibilityQuery {
    owner: EntityId,
    require_line_of_sight: bool,
    mask: Option<LayerMask>,
}

impl VisibilityQuery {
    pub fn new(owner: EntityId, config: &TurretConfig) -> Self {
        Self {
            owner,
            require_line_of_sight: config.require_line_of_sight,
            mask: config.visibility_mask(),
        }
    }

    /// Whether `target_point` is visible from `origin`.
    ///
    /// A hit on `expected` counts as visible. A hit on the turret itself counts
    /// only when no specific entity is expected. Anything else occludes.
    pub fn is_visible<S: Scene + ?Sized>(
        &self,
        scene: &S,
        origin: DVec3,
        target_point: DVec3,
        expected: Option<EntityId>,
    ) -> bool {
        if !self.require_line_of_sight {
            return true;
        }

        let Some(hit) = scene.ray_cast(origin, target_point, self.mask) else {
            return true;
        };

        match expected {
            Some(entity) => hit.entity == entity,
            None => hit.entity == self.owner,
        }
    }
}
