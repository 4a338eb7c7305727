//! Simulation snapshot: the visible state of the scene after each tick.

use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};

use crate::enums::EngagementState;
use crate::events::TurretEvent;
use crate::types::{EntityId, SimTime};

/// Everything a viewer needs to draw one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub time: SimTime,
    pub turrets: Vec<TurretView>,
    pub targets: Vec<TargetView>,
    pub projectiles: Vec<ProjectileView>,
    pub debug_lines: Vec<LineView>,
    /// Sounds started during the tick.
    pub sounds: Vec<String>,
    pub events: Vec<TurretEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurretView {
    pub entity: EntityId,
    pub name: Option<String>,
    pub state: EngagementState,
    pub target: Option<EntityId>,
    pub position: DVec3,
    pub rotation: DQuat,
    /// Seconds since the last scan.
    pub retarget_elapsed: f64,
    /// Seconds since the last successful shot (pre-charged at start).
    pub fire_elapsed: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetView {
    pub entity: EntityId,
    pub name: Option<String>,
    pub position: DVec3,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectileView {
    pub entity: EntityId,
    pub position: DVec3,
    pub velocity: DVec3,
    /// Seconds until retirement, if scheduled.
    pub remaining_secs: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineView {
    pub from: DVec3,
    pub to: DVec3,
    pub color: [f32; 3],
}
