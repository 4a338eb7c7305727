//! Projectile spawner: turns a fire decision into a projectile or tracer.

use glam::DVec3;
use tracing::{debug, warn};

use sentinel_core::config::TurretConfig;
use sentinel_core::constants::{DEFAULT_FORWARD, WORLD_UP};
use sentinel_core::enums::ShotKind;
use sentinel_core::math;
use sentinel_core::types::EntityId;

use crate::scene::{Scene, SceneError};

/// Result of one `fire` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shot {
    pub kind: ShotKind,
    pub direction: DVec3,
    /// Spawned projectile. Ownership has already passed to the scene.
    pub projectile: Option<EntityId>,
}

#[derive(Debug, Clone)]
pub struct ProjectileSpawner {
    template: Option<String>,
    speed: f64,
    lifetime: f64,
    sound: Option<String>,
    tracer_length: f64,
    color: [f32; 3],
}

impl ProjectileSpawner {
    pub fn new(config: &TurretConfig) -> Self {
        Self {
            template: config.projectile_template.clone().filter(|t| !t.is_empty()),
            speed: config.projectile_speed,
            lifetime: config.projectile_lifetime,
            sound: config.fire_sound.clone().filter(|s| !s.is_empty()),
            tracer_length: config.tracer_length(),
            color: config.debug_color,
        }
    }

    /// Fire from `muzzle` along its `forward` axis.
    ///
    /// An unknown template degrades to a tracer. Any other scene fault is
    /// returned to the caller untouched.
    pub fn fire<S: Scene + ?Sized>(
        &self,
        scene: &mut S,
        muzzle: DVec3,
        forward: Option<DVec3>,
        target_aim: Option<DVec3>,
    ) -> Result<Shot, SceneError> {
        let direction = launch_direction(muzzle, forward, target_aim);

        let shot = match &self.template {
            Some(template) => match self.spawn_projectile(scene, template, muzzle, direction) {
                Ok(projectile) => Shot {
                    kind: ShotKind::Projectile,
                    direction,
                    projectile: Some(projectile),
                },
                Err(SceneError::UnknownTemplate(name)) => {
                    warn!(template = %name, "projectile template not found, drawing tracer");
                    self.draw_tracer(scene, muzzle, direction)
                }
                Err(e) => return Err(e),
            },
            None => self.draw_tracer(scene, muzzle, direction),
        };

        if let Some(sound) = &self.sound {
            scene.play_sound(sound);
        }

        Ok(shot)
    }

    fn spawn_projectile<S: Scene + ?Sized>(
        &self,
        scene: &mut S,
        template: &str,
        muzzle: DVec3,
        direction: DVec3,
    ) -> Result<EntityId, SceneError> {
        let projectile = scene.spawn_from_template(template, muzzle)?;

        if let Some(rotation) = math::look_rotation(direction, WORLD_UP) {
            scene.set_world_rotation(projectile, rotation)?;
        }
        scene.submit_transform(projectile)?;

        if self.speed > 0.0 {
            match scene.rigid_body(projectile) {
                Some(body) => body.set_linear_velocity(direction * self.speed),
                None => debug!(?projectile, "projectile has no rigid body, launched at rest"),
            }
        }

        if self.lifetime > 0.0 {
            scene.schedule_retire(projectile, self.lifetime)?;
        }

        Ok(projectile)
    }

    fn draw_tracer<S: Scene + ?Sized>(&self, scene: &mut S, muzzle: DVec3, direction: DVec3) -> Shot {
        scene.draw_debug_line(muzzle, muzzle + direction * self.tracer_length, self.color);
        Shot {
            kind: ShotKind::Tracer,
            direction,
            projectile: None,
        }
    }
}

/// Launch direction: the muzzle's forward axis, else toward the target's aim
/// point, else the default forward axis.
pub fn launch_direction(muzzle: DVec3, forward: Option<DVec3>, target_aim: Option<DVec3>) -> DVec3 {
    forward
        .and_then(math::normalize_or_none)
        .or_else(|| target_aim.and_then(|aim| math::normalize_or_none(aim - muzzle)))
        .unwrap_or(DEFAULT_FORWARD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_direction_prefers_forward() {
        let dir = launch_direction(
            DVec3::ZERO,
            Some(DVec3::new(0.0, 0.0, 4.0)),
            Some(DVec3::new(10.0, 0.0, 0.0)),
        );
        assert_eq!(dir, DVec3::Z);
    }

    #[test]
    fn test_launch_direction_falls_back_to_target() {
        let dir = launch_direction(
            DVec3::new(1.0, 0.0, 0.0),
            Some(DVec3::ZERO),
            Some(DVec3::new(1.0, 3.0, 0.0)),
        );
        assert_eq!(dir, DVec3::Y);
    }

    #[test]
    fn test_launch_direction_default_axis() {
        assert_eq!(launch_direction(DVec3::ZERO, None, None), DEFAULT_FORWARD);
        // Target on top of the muzzle is no better than no target.
        assert_eq!(
            launch_direction(DVec3::ONE, Some(DVec3::ZERO), Some(DVec3::ONE)),
            DEFAULT_FORWARD
        );
    }
}
