//! Turret controller: the per-tick perception, aim and engage loop.
//!
//! Each tick, in order:
//! 1. Drop the held target if it is no longer valid.
//! 2. Rescan when the retarget timer is due or nothing is held. The timer
//!    resets whatever the scan finds; an empty scan never clears a held target.
//! 3. With a target, rotate toward its aim point.
//! 4. When the fire timer is due, re-check visibility *now* and fire on
//!    success. A blocked shot leaves the timer charged for the next tick.

use glam::DVec3;
use tracing::{debug, info, trace};

use sentinel_core::config::{AimSmoothing, TurretConfig};
use sentinel_core::enums::EngagementState;
use sentinel_core::error::ConfigError;
use sentinel_core::events::TurretEvent;
use sentinel_core::math;
use sentinel_core::types::{ElapsedTimer, EntityId};

use crate::scene::{Scene, SceneError};
use crate::selector::TargetSelector;
use crate::spawner::ProjectileSpawner;

#[derive(Debug, Clone)]
pub struct TurretController {
    owner: EntityId,
    /// Resolved once at construction; the owner when no muzzle child exists.
    muzzle: EntityId,
    config: TurretConfig,
    selector: TargetSelector,
    spawner: ProjectileSpawner,
    target: Option<EntityId>,
    retarget_timer: ElapsedTimer,
    fire_timer: ElapsedTimer,
}

impl TurretController {
    /// Build a controller for `owner`. The scene is used to resolve the muzzle.
    pub fn new<S: Scene + ?Sized>(
        scene: &S,
        owner: EntityId,
        config: TurretConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let muzzle = config
            .muzzle_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .and_then(|name| scene.child_by_name(owner, name))
            .unwrap_or_else(|| {
                debug!(?owner, "no muzzle child, aiming from the turret origin");
                owner
            });

        Ok(Self {
            owner,
            muzzle,
            selector: TargetSelector::new(owner, &config),
            spawner: ProjectileSpawner::new(&config),
            target: None,
            retarget_timer: ElapsedTimer::new(),
            // Charged so the first valid tick can fire straight away.
            fire_timer: ElapsedTimer::starting_at(config.fire_interval),
            config,
        })
    }

    pub fn owner(&self) -> EntityId {
        self.owner
    }

    pub fn muzzle(&self) -> EntityId {
        self.muzzle
    }

    pub fn config(&self) -> &TurretConfig {
        &self.config
    }

    pub fn selector(&self) -> &TargetSelector {
        &self.selector
    }

    pub fn target(&self) -> Option<EntityId> {
        self.target
    }

    pub fn state(&self) -> EngagementState {
        if self.target.is_some() {
            EngagementState::Tracking
        } else {
            EngagementState::NoTarget
        }
    }

    pub fn retarget_elapsed(&self) -> f64 {
        self.retarget_timer.get()
    }

    pub fn fire_elapsed(&self) -> f64 {
        self.fire_timer.get()
    }

    /// Run one tick of `dt` seconds. Events are appended to `events`.
    ///
    /// A despawned or inactive owner makes the tick a no-op; other soft
    /// conditions (no target, degenerate aim, blocked shot) skip the rest of it. Only scene faults are returned as errors.
    pub fn tick<S: Scene + ?Sized>(
        &mut self,
        scene: &mut S,
        dt: f64,
        events: &mut Vec<TurretEvent>,
    ) -> Result<(), SceneError> {
        self.retarget_timer.advance(dt);
        self.fire_timer.advance(dt);

        if !scene.is_alive(self.owner) || !scene.is_active(self.owner) {
            return Ok(());
        }
        let Some(muzzle_pos) = scene.world_position(self.muzzle) else {
            trace!(turret = ?self.owner, "muzzle not in scene, skipping tick");
            return Ok(());
        };

        self.update_target(scene, muzzle_pos, events);

        let Some(target) = self.target else {
            return Ok(());
        };

        self.aim(scene, target, muzzle_pos, dt)?;
        self.try_fire(scene, target, events)
    }

    fn update_target<S: Scene + ?Sized>(
        &mut self,
        scene: &S,
        muzzle_pos: DVec3,
        events: &mut Vec<TurretEvent>,
    ) {
        if let Some(target) = self.target {
            if !self.selector.is_valid(scene, target, muzzle_pos) {
                info!(turret = ?self.owner, ?target, "target lost");
                events.push(TurretEvent::TargetLost {
                    turret: self.owner,
                    target,
                });
                self.target = None;
            }
        }

        if self.retarget_timer.has_reached(self.config.reacquire_interval) || self.target.is_none() {
            self.retarget_timer.reset();
            if let Some(candidate) = self.selector.acquire(scene, muzzle_pos) {
                if self.target != Some(candidate.entity) {
                    info!(
                        turret = ?self.owner,
                        target = ?candidate.entity,
                        distance = candidate.distance,
                        "target acquired"
                    );
                    events.push(TurretEvent::TargetAcquired {
                        turret: self.owner,
                        target: candidate.entity,
                        distance: candidate.distance,
                    });
                }
                self.target = Some(candidate.entity);
            }
        }
    }

    fn aim<S: Scene + ?Sized>(
        &self,
        scene: &mut S,
        target: EntityId,
        muzzle_pos: DVec3,
        dt: f64,
    ) -> Result<(), SceneError> {
        let Some(aim_point) = self.selector.aim_point(scene, target) else {
            return Ok(());
        };

        if self.config.draw_debug_aim {
            scene.draw_debug_line(muzzle_pos, aim_point, self.config.debug_color);
        }

        let Some(direction) = math::normalize_or_none(aim_point - muzzle_pos) else {
            trace!(turret = ?self.owner, "aim point on the muzzle, holding rotation");
            return Ok(());
        };

        let factor = match self.config.aim_smoothing {
            AimSmoothing::Linear => math::linear_factor(self.config.rotation_speed, dt),
            AimSmoothing::Exponential { smoothing } => math::exponential_smoothing_factor(smoothing, dt),
        };

        scene.look_at_smooth(self.owner, muzzle_pos + direction, factor)?;
        scene.submit_transform(self.owner)
    }

    fn try_fire<S: Scene + ?Sized>(
        &mut self,
        scene: &mut S,
        target: EntityId,
        events: &mut Vec<TurretEvent>,
    ) -> Result<(), SceneError> {
        if self.config.fire_interval <= 0.0 || !self.fire_timer.has_reached(self.config.fire_interval) {
            return Ok(());
        }

        // Positions are read again: aiming may have moved the muzzle.
        let (Some(muzzle_pos), Some(aim_point)) = (
            scene.world_position(self.muzzle),
            self.selector.aim_point(scene, target),
        ) else {
            return Ok(());
        };

        if !self
            .selector
            .visibility()
            .is_visible(scene, muzzle_pos, aim_point, Some(target))
        {
            debug!(turret = ?self.owner, ?target, "shot held, target occluded");
            events.push(TurretEvent::ShotHeld {
                turret: self.owner,
                target,
            });
            return Ok(());
        }

        self.fire_timer.reset();
        let forward = scene.forward_vector(self.muzzle);
        let shot = self.spawner.fire(scene, muzzle_pos, forward, Some(aim_point))?;

        info!(
            turret = ?self.owner,
            ?target,
            kind = ?shot.kind,
            projectile = ?shot.projectile,
            "shot fired"
        );
        events.push(TurretEvent::ShotFired {
            turret: self.owner,
            target,
            kind: shot.kind,
            projectile: shot.projectile,
            direction: shot.direction,
        });

        Ok(())
    }
}
