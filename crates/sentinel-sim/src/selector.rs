//! Target selection: validity checks and nearest-visible scans.

use glam::DVec3;

use sentinel_core::config::TurretConfig;
use sentinel_core::types::EntityId;

use crate::scene::Scene;
use crate::visibility::VisibilityQuery;

/// A target that passed every check during a scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub entity: EntityId,
    pub aim_point: DVec3,
    /// Straight-line distance from the muzzle to `aim_point`.
    pub distance: f64,
}

#[derive(Debug, Clone)]
pub struct TargetSelector {
    owner: EntityId,
    target_tag: Option<String>,
    target_name: Option<String>,
    max_distance: f64,
    target_offset: DVec3,
    visibility: VisibilityQuery,
}

impl TargetSelector {
    pub fn new(owner: EntityId, config: &TurretConfig) -> Self {
        Self {
            owner,
            target_tag: config.target_tag.clone().filter(|t| !t.is_empty()),
            target_name: config.target_name.clone().filter(|n| !n.is_empty()),
            max_distance: config.max_distance,
            target_offset: config.target_offset,
            visibility: VisibilityQuery::new(owner, config),
        }
    }

    pub fn visibility(&self) -> &VisibilityQuery {
        &self.visibility
    }

    /// World position of `entity` plus the configured target offset.
    pub fn aim_point<S: Scene + ?Sized>(&self, scene: &S, entity: EntityId) -> Option<DVec3> {
        scene
            .world_position(entity)
            .map(|position| position + self.target_offset)
    }

    /// Whether `entity` is still a legitimate target: alive, active, within
    /// range of the muzzle, and visible from it.
    pub fn is_valid<S: Scene + ?Sized>(&self, scene: &S, entity: EntityId, muzzle: DVec3) -> bool {
        self.evaluate(scene, entity, muzzle).is_some()
    }

    /// Find the best target from `muzzle`.
    ///
    /// A configured fixed target wins outright when valid. Otherwise the nearest
    /// valid tagged entity is returned; equal distances go to the lower id.
    pub fn acquire<S: Scene + ?Sized>(&self, scene: &S, muzzle: DVec3) -> Option<Candidate> {
        if let Some(name) = &self.target_name {
            if let Some(entity) = scene.find_by_name(name) {
                if entity != self.owner {
                    if let Some(candidate) = self.evaluate(scene, entity, muzzle) {
                        return Some(candidate);
                    }
                }
            }
        }

        let tag = self.target_tag.as_deref()?;
        let mut best: Option<Candidate> = None;

        for entity in scene.entities_with_tag(tag) {
            if entity == self.owner {
                continue;
            }
            let Some(candidate) = self.evaluate(scene, entity, muzzle) else {
                continue;
            };

            let better = match &best {
                None => true,
                Some(current) => {
                    candidate.distance < current.distance
                        || (candidate.distance == current.distance && candidate.entity < current.entity)
                }
            };
            if better {
                best = Some(candidate);
            }
        }

        best
    }

    fn evaluate<S: Scene + ?Sized>(&self, scene: &S, entity: EntityId, muzzle: DVec3) -> Option<Candidate> {
        if !scene.is_alive(entity) || !scene.is_active(entity) {
            return None;
        }

        let aim_point = self.aim_point(scene, entity)?;
        let distance = (aim_point - muzzle).length();
        if distance > self.max_distance {
            return None;
        }

        if !self.visibility.is_visible(scene, muzzle, aim_point, Some(entity)) {
            return None;
        }

        Some(Candidate {
            entity,
            aim_point,
            distance,
        })
    }
}
