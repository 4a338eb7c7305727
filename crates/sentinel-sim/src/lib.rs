//! Turret engagement core for SENTINEL.
//!
//! The perception, aim and engage loop (`TurretController`) talks to the
//! world only through the `Scene` trait. `SceneWorld` is a hecs-backed scene
//! used by the headless `SimulationEngine`, the scenario loader and the tests.

pub mod controller;
pub mod engine;
pub mod scenario;
pub mod scene;
pub mod selector;
pub mod spawner;
pub mod systems;
pub mod visibility;
pub mod world;

pub use sentinel_core as core;
pub use controller::TurretController;
pub use engine::{SimConfig, SimulationEngine};
pub use scenario::{Scenario, ScenarioError};
pub use scene::{Scene, SceneError};
pub use world::SceneWorld;
