//! Scenario definitions: JSON-authored scenes and seeded random scenes.
//!
//! A scenario lists projectile templates, turrets (with their config),
//! tagged targets (optionally patrolling) and static obstacles. It is
//! validated and then built into a ready-to-run `SimulationEngine`.

use std::collections::BTreeMap;

use glam::DVec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use sentinel_core::components::Patrol;
use sentinel_core::config::TurretConfig;
use sentinel_core::constants::DEFAULT_TARGET_TAG;
use sentinel_core::error::ConfigError;
use sentinel_core::types::{ElapsedTimer, EntityId, LayerMask};

use crate::engine::{SimConfig, SimulationEngine};
use crate::world::{ProjectileTemplate, SceneWorld};

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("invalid scenario JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("turret `{turret}` has an invalid config: {source}")]
    Config {
        turret: String,
        #[source]
        source: ConfigError,
    },

    #[error("`{entity}`: {reason}")]
    InvalidGeometry { entity: String, reason: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub name: String,
    pub templates: BTreeMap<String, ProjectileTemplate>,
    pub turrets: Vec<TurretSpec>,
    pub targets: Vec<TargetSpec>,
    pub obstacles: Vec<ObstacleSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurretSpec {
    pub name: String,
    #[serde(default)]
    pub position: DVec3,
    /// Offset of the muzzle child, named after `config.muzzle_name`.
    #[serde(default)]
    pub muzzle_offset: Option<DVec3>,
    #[serde(default)]
    pub config: TurretConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetSpec {
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub position: DVec3,
    /// Collider radius. Without one the target never blocks rays.
    #[serde(default)]
    pub radius: Option<f64>,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub patrol: Option<PatrolSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatrolSpec {
    pub waypoints: Vec<DVec3>,
    pub speed: f64,
    pub wait_secs: f64,
    pub looping: bool,
    pub ping_pong: bool,
    pub align_to_motion: bool,
    /// Prepend the start position to the path.
    pub include_start: bool,
}

impl Default for PatrolSpec {
    fn default() -> Self {
        Self {
            waypoints: Vec::new(),
            speed: 3.0,
            wait_secs: 0.25,
            looping: true,
            ping_pong: false,
            align_to_motion: true,
            include_start: true,
        }
    }
}

impl PatrolSpec {
    /// Build the component for an entity starting at `start`.
    pub fn to_patrol(&self, start: DVec3) -> Patrol {
        let mut waypoints = self.waypoints.clone();
        let mut current = 0;
        if self.include_start {
            waypoints.insert(0, start);
            if waypoints.len() > 1 {
                current = 1;
            }
        }
        if waypoints.is_empty() {
            waypoints.push(start);
        }

        Patrol {
            completed: waypoints.len() <= 1,
            waypoints,
            speed: self.speed,
            wait_secs: self.wait_secs,
            looping: self.looping,
            ping_pong: self.ping_pong,
            align_to_motion: self.align_to_motion,
            current,
            direction: 1,
            waiting: false,
            wait_timer: ElapsedTimer::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleSpec {
    #[serde(default)]
    pub name: String,
    pub position: DVec3,
    pub radius: f64,
    #[serde(default = "all_layers")]
    pub layers: LayerMask,
}

fn default_true() -> bool {
    true
}

fn all_layers() -> LayerMask {
    LayerMask::ALL
}

impl Scenario {
    pub fn from_json(json: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = serde_json::from_str(json)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn to_json(&self) -> Result<String, ScenarioError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check configs and geometry before anything is spawned.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        for turret in &self.turrets {
            turret.config.validate().map_err(|source| ScenarioError::Config {
                turret: turret.name.clone(),
                source,
            })?;
            check_point(&turret.name, turret.position)?;
            if let Some(offset) = turret.muzzle_offset {
                check_point(&turret.name, offset)?;
                if turret.config.muzzle_name.as_deref().map_or(true, str::is_empty) {
                    return Err(ScenarioError::InvalidGeometry {
                        entity: turret.name.clone(),
                        reason: "muzzle_offset needs a muzzle_name".into(),
                    });
                }
            }
        }

        for target in &self.targets {
            check_point(&target.name, target.position)?;
            if let Some(radius) = target.radius {
                check_radius(&target.name, radius)?;
            }
            if let Some(patrol) = &target.patrol {
                if !patrol.speed.is_finite() || !patrol.wait_secs.is_finite() {
                    return Err(ScenarioError::InvalidGeometry {
                        entity: target.name.clone(),
                        reason: "patrol speed and wait must be finite".into(),
                    });
                }
                for &waypoint in &patrol.waypoints {
                    check_point(&target.name, waypoint)?;
                }
            }
        }

        for obstacle in &self.obstacles {
            check_point(&obstacle.name, obstacle.position)?;
            check_radius(&obstacle.name, obstacle.radius)?;
        }

        for (name, template) in &self.templates {
            if let Some(radius) = template.collider_radius {
                check_radius(name, radius)?;
            }
        }

        Ok(())
    }

    /// Populate a fresh scene. Returns the scene and each turret's entity
    /// paired with its config, in declaration order.
    pub fn build_scene(&self) -> Result<(SceneWorld, Vec<(EntityId, TurretConfig)>), ScenarioError> {
        self.validate()?;
        let mut scene = SceneWorld::new();

        for (name, template) in &self.templates {
            scene.register_template(name.clone(), template.clone());
        }

        for obstacle in &self.obstacles {
            scene.spawn_obstacle(&obstacle.name, obstacle.position, obstacle.radius, obstacle.layers);
        }

        for target in &self.targets {
            let tags: Vec<&str> = target.tags.iter().map(String::as_str).collect();
            let entity = scene.spawn_target(&target.name, &tags, target.position, target.radius);
            if let Some(patrol) = &target.patrol {
                // Freshly spawned, so the insert cannot miss.
                let _ = scene.insert_one(entity, patrol.to_patrol(target.position));
            }
            if !target.active {
                let _ = scene.set_active(entity, false);
            }
        }

        let mut turrets = Vec::with_capacity(self.turrets.len());
        for spec in &self.turrets {
            let owner = scene.spawn_turret(&spec.name, spec.position, None);
            if let (Some(offset), Some(muzzle_name)) = (spec.muzzle_offset, spec.config.muzzle_name.as_deref()) {
                scene.attach_child(owner, muzzle_name, offset);
            }
            turrets.push((owner, spec.config.clone()));
        }

        Ok((scene, turrets))
    }

    pub fn build_engine(&self, config: SimConfig) -> Result<SimulationEngine, ScenarioError> {
        let (scene, turrets) = self.build_scene()?;
        let mut engine = SimulationEngine::new(scene, config);
        for ((owner, turret_config), spec) in turrets.into_iter().zip(&self.turrets) {
            engine
                .add_turret(owner, turret_config)
                .map_err(|source| ScenarioError::Config {
                    turret: spec.name.clone(),
                    source,
                })?;
        }
        info!(
            scenario = %self.name,
            turrets = self.turrets.len(),
            targets = self.targets.len(),
            obstacles = self.obstacles.len(),
            "scenario loaded"
        );
        Ok(engine)
    }

    /// Seeded random scenario: one turret at the origin, `targets` tagged
    /// targets in a ring around it (some patrolling), and `obstacles` spheres
    /// scattered in between. Same seed = same scenario.
    pub fn random(seed: u64, targets: usize, obstacles: usize) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let mut templates = BTreeMap::new();
        templates.insert("Bolt".to_string(), ProjectileTemplate::default());

        let turret = TurretSpec {
            name: "Turret".into(),
            position: DVec3::ZERO,
            muzzle_offset: Some(DVec3::new(0.0, 1.0, -0.5)),
            config: TurretConfig {
                projectile_template: Some("Bolt".into()),
                projectile_lifetime: 2.0,
                ..Default::default()
            },
        };

        let targets = (0..targets)
            .map(|i| {
                let position = ring_point(&mut rng, 5.0, 35.0);
                let patrol = rng.gen_bool(0.5).then(|| PatrolSpec {
                    waypoints: vec![ring_point(&mut rng, 5.0, 35.0)],
                    speed: rng.gen_range(1.0..5.0),
                    ..Default::default()
                });
                TargetSpec {
                    name: format!("Target-{i}"),
                    tags: vec![DEFAULT_TARGET_TAG.to_string()],
                    position,
                    radius: Some(0.5),
                    active: true,
                    patrol,
                }
            })
            .collect();

        let obstacles = (0..obstacles)
            .map(|i| ObstacleSpec {
                name: format!("Rock-{i}"),
                position: ring_point(&mut rng, 3.0, 20.0) + DVec3::new(0.0, 1.0, 0.0),
                radius: rng.gen_range(0.5..2.0),
                layers: LayerMask::ALL,
            })
            .collect();

        Self {
            name: format!("random-{seed}"),
            templates,
            turrets: vec![turret],
            targets,
            obstacles,
        }
    }
}

/// Uniform bearing, uniform range in `[min, max)`, on the ground plane.
fn ring_point(rng: &mut ChaCha8Rng, min: f64, max: f64) -> DVec3 {
    let bearing: f64 = rng.gen_range(0.0..std::f64::consts::TAU);
    let range: f64 = rng.gen_range(min..max);
    DVec3::new(range * bearing.sin(), 0.0, -range * bearing.cos())
}

fn check_point(entity: &str, point: DVec3) -> Result<(), ScenarioError> {
    if point.is_finite() {
        Ok(())
    } else {
        Err(ScenarioError::InvalidGeometry {
            entity: entity.to_string(),
            reason: format!("non-finite position {point}"),
        })
    }
}

fn check_radius(entity: &str, radius: f64) -> Result<(), ScenarioError> {
    if radius.is_finite() && radius > 0.0 {
        Ok(())
    } else {
        Err(ScenarioError::InvalidGeometry {
            entity: entity.to_string(),
            reason: format!("radius {radius} must be positive"),
        })
    }
}
