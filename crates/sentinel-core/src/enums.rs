//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Engagement state of a turret controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EngagementState {
    /// No target held; every tick runs a scan.
    #[default]
    NoTarget,
    /// A validated target is held, aimed at, and fired on.
    Tracking,
}

/// What a shot produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShotKind {
    /// A projectile entity spawned from a template.
    Projectile,
    /// A debug tracer line standing in for a shot.
    Tracer,
}
