//! Simulation engine: drives turret controllers over the reference scene.
//!
//! `SimulationEngine` owns the `SceneWorld` and every `TurretController`,
//! runs the host systems in a fixed order, and produces `Snapshot`s.
//! Completely headless, enabling deterministic testing.

use hecs::Entity;
use tracing::debug;

use sentinel_core::config::TurretConfig;
use sentinel_core::constants::DT;
use sentinel_core::error::ConfigError;
use sentinel_core::state::Snapshot;
use sentinel_core::types::{EntityId, SimTime};

use crate::controller::TurretController;
use crate::scene::SceneError;
use crate::systems;
use crate::world::SceneWorld;

/// Time scale bounds accepted by `set_time_scale`.
const MAX_TIME_SCALE: f64 = 4.0;

/// Configuration for starting a new simulation.
#[derive(Debug, Clone, Copy)]
pub struct SimConfig {
    /// Seconds simulated per tick at time scale 1.0.
    pub dt: f64,
    /// Initial time scale (1.0 = normal).
    pub time_scale: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dt: DT,
            time_scale: 1.0,
        }
    }
}

/// The simulation engine. Owns the scene and all turret controllers.
pub struct SimulationEngine {
    scene: SceneWorld,
    turrets: Vec<TurretController>,
    time: SimTime,
    dt: f64,
    time_scale: f64,
    despawn_buffer: Vec<Entity>,
}

impl SimulationEngine {
    pub fn new(scene: SceneWorld, config: SimConfig) -> Self {
        Self {
            scene,
            turrets: Vec::new(),
            time: SimTime::default(),
            dt: config.dt,
            time_scale: config.time_scale.clamp(0.0, MAX_TIME_SCALE),
            despawn_buffer: Vec::new(),
        }
    }

    /// Attach a controller to `owner`. Controllers tick in insertion order.
    pub fn add_turret(&mut self, owner: EntityId, config: TurretConfig) -> Result<(), ConfigError> {
        let controller = TurretController::new(&self.scene, owner, config)?;
        debug!(turret = ?owner, muzzle = ?controller.muzzle(), "turret added");
        self.turrets.push(controller);
        Ok(())
    }

    /// Advance the simulation by one tick and return the resulting snapshot.
    ///
    /// Order: controllers, patrol, movement, lifetime cleanup.
    pub fn tick(&mut self) -> Result<Snapshot, SceneError> {
        let dt = self.dt * self.time_scale;
        self.scene.begin_frame();

        let mut events = Vec::new();
        for turret in &mut self.turrets {
            turret.tick(&mut self.scene, dt, &mut events)?;
        }

        systems::patrol::run(self.scene.world_mut(), dt);
        systems::movement::run(self.scene.world_mut(), dt);
        let retired = systems::lifetime::run(self.scene.world_mut(), dt, &mut self.despawn_buffer);
        if retired > 0 {
            debug!(retired, tick = self.time.tick, "entities retired");
        }

        self.time.advance(dt);

        Ok(systems::snapshot::build_snapshot(
            &self.scene,
            &self.turrets,
            &self.time,
            events,
        ))
    }

    /// Run `ticks` ticks and return the last snapshot.
    pub fn run(&mut self, ticks: u64) -> Result<Snapshot, SceneError> {
        let mut snapshot = Snapshot {
            time: self.time,
            ..Default::default()
        };
        for _ in 0..ticks {
            snapshot = self.tick()?;
        }
        Ok(snapshot)
    }

    /// Get the current simulation time.
    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    /// Clamped to [0, 4]. Zero freezes the simulation.
    pub fn set_time_scale(&mut self, scale: f64) {
        self.time_scale = scale.clamp(0.0, MAX_TIME_SCALE);
    }

    pub fn scene(&self) -> &SceneWorld {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut SceneWorld {
        &mut self.scene
    }

    pub fn turrets(&self) -> &[TurretController] {
        &self.turrets
    }
}
