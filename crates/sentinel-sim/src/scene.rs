//! Host scene boundary.
//!
//! The turret core never owns entities. Everything it knows about the world
//! comes through the `Scene` trait: lookups, transforms, ray casts, spawning,
//! debug drawing and audio. `SceneWorld` is the in-memory implementation used
//! by the engine and the tests; a game host would implement the trait over its
//! own scene graph.

use glam::{DQuat, DVec3};

use sentinel_core::constants::WORLD_UP;
use sentinel_core::math;
use sentinel_core::types::{EntityId, LayerMask};

/// Errors raised by a scene for faults the turret core does not own.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SceneError {
    #[error("no template named `{0}`")]
    UnknownTemplate(String),

    #[error("template `{name}` is malformed: {reason}")]
    MalformedTemplate { name: String, reason: String },

    #[error("entity {0:?} does not exist")]
    UnknownEntity(EntityId),
}

/// Closest hit of a ray cast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub entity: EntityId,
    pub point: DVec3,
    /// Distance from the ray origin to `point`.
    pub distance: f64,
}

/// Capability exposed by entities that carry a physics body.
pub trait LinearVelocity {
    fn set_linear_velocity(&mut self, velocity: DVec3);
}

pub trait Scene {
    fn find_by_name(&self, name: &str) -> Option<EntityId>;

    /// Entities carrying `tag`, in a stable order.
    fn entities_with_tag(&self, tag: &str) -> Vec<EntityId>;

    fn child_by_name(&self, parent: EntityId, name: &str) -> Option<EntityId>;

    fn is_alive(&self, entity: EntityId) -> bool;

    fn is_active(&self, entity: EntityId) -> bool;

    fn world_position(&self, entity: EntityId) -> Option<DVec3>;

    fn world_rotation(&self, entity: EntityId) -> Option<DQuat>;

    /// World-space forward axis. May be zero-length for degenerate transforms.
    fn forward_vector(&self, entity: EntityId) -> Option<DVec3>;

    fn set_world_rotation(&mut self, entity: EntityId, rotation: DQuat) -> Result<(), SceneError>;

    /// Publish pending transform changes to the world representation.
    fn submit_transform(&mut self, entity: EntityId) -> Result<(), SceneError>;

    /// Closest hit on the segment `from -> to`, restricted to `mask` when set.
    fn ray_cast(&self, from: DVec3, to: DVec3, mask: Option<LayerMask>) -> Option<RayHit>;

    fn spawn_from_template(&mut self, template: &str, position: DVec3) -> Result<EntityId, SceneError>;

    /// Physics capability of `entity`, if it has one.
    fn rigid_body(&mut self, entity: EntityId) -> Option<&mut dyn LinearVelocity>;

    fn schedule_retire(&mut self, entity: EntityId, delay_secs: f64) -> Result<(), SceneError>;

    fn draw_debug_line(&mut self, from: DVec3, to: DVec3, color: [f32; 3]);

    fn play_sound(&mut self, sound: &str);

    /// Rotate `entity` toward `point` by `factor` in [0, 1].
    /// A degenerate look direction leaves the rotation as it was.
    fn look_at_smooth(&mut self, entity: EntityId, point: DVec3, factor: f64) -> Result<(), SceneError> {
        let eye = self
            .world_position(entity)
            .ok_or(SceneError::UnknownEntity(entity))?;
        let current = self
            .world_rotation(entity)
            .ok_or(SceneError::UnknownEntity(entity))?;
        let rotation = math::smooth_look_at(current, eye, point, factor, WORLD_UP);
        self.set_world_rotation(entity, rotation)
    }
}
