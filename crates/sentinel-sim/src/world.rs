//! In-memory scene backed by a hecs world.
//!
//! `SceneWorld` implements `Scene` for the engine and the tests. Transforms
//! are stored parent-relative and resolved to world space on demand. Ray casts
//! test sphere colliders only; a collider that contains the ray origin is
//! ignored, the same way most physics engines treat rays starting inside a
//! shape. Projectile colliders never occlude a ray.

use std::collections::HashMap;

use glam::{DQuat, DVec3};
use hecs::{DynamicBundle, Entity, EntityBuilder, World};
use serde::{Deserialize, Serialize};

use sentinel_core::components::*;
use sentinel_core::constants::{DEFAULT_MUZZLE_NAME, MAX_PARENT_DEPTH};
use sentinel_core::math;
use sentinel_core::types::{EntityId, LayerMask, Transform};

use crate::scene::{LinearVelocity, RayHit, Scene, SceneError};

/// Blueprint for entities created by `spawn_from_template`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileTemplate {
    pub tags: Vec<String>,
    /// Sphere collider radius. Ray casts skip projectiles either way.
    pub collider_radius: Option<f64>,
    pub layers: LayerMask,
    pub rigid_body: bool,
}

impl Default for ProjectileTemplate {
    fn default() -> Self {
        Self {
            tags: Vec::new(),
            collider_radius: None,
            layers: LayerMask::ALL,
            rigid_body: true,
        }
    }
}

/// A debug line requested during the current frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugLine {
    pub from: DVec3,
    pub to: DVec3,
    pub color: [f32; 3],
}

impl DebugLine {
    pub fn length(&self) -> f64 {
        (self.to - self.from).length()
    }
}

impl LinearVelocity for RigidBody {
    fn set_linear_velocity(&mut self, velocity: DVec3) {
        self.linear_velocity = velocity;
    }
}

pub fn entity_id(entity: Entity) -> EntityId {
    EntityId(entity.to_bits().get())
}

fn to_entity(id: EntityId) -> Option<Entity> {
    Entity::from_bits(id.0)
}

#[derive(Default)]
pub struct SceneWorld {
    world: World,
    templates: HashMap<String, ProjectileTemplate>,
    debug_lines: Vec<DebugLine>,
    sounds: Vec<String>,
    submitted: Vec<EntityId>,
}

impl SceneWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Clear per-frame output (debug lines, sounds, submitted transforms).
    pub fn begin_frame(&mut self) {
        self.debug_lines.clear();
        self.sounds.clear();
        self.submitted.clear();
    }

    pub fn debug_lines(&self) -> &[DebugLine] {
        &self.debug_lines
    }

    pub fn sounds(&self) -> &[String] {
        &self.sounds
    }

    pub fn submitted(&self) -> &[EntityId] {
        &self.submitted
    }

    pub fn register_template(&mut self, name: impl Into<String>, template: ProjectileTemplate) {
        self.templates.insert(name.into(), template);
    }

    pub fn spawn(&mut self, components: impl DynamicBundle) -> EntityId {
        entity_id(self.world.spawn(components))
    }

    pub fn insert_one<C: hecs::Component>(&mut self, id: EntityId, component: C) -> Result<(), SceneError> {
        let entity = to_entity(id).ok_or(SceneError::UnknownEntity(id))?;
        self.world
            .insert_one(entity, component)
            .map_err(|_| SceneError::UnknownEntity(id))
    }

    /// Remove an entity. Returns false if it was already gone.
    pub fn despawn(&mut self, id: EntityId) -> bool {
        to_entity(id).is_some_and(|entity| self.world.despawn(entity).is_ok())
    }

    pub fn set_active(&mut self, id: EntityId, active: bool) -> Result<(), SceneError> {
        let entity = to_entity(id)
            .filter(|e| self.world.contains(*e))
            .ok_or(SceneError::UnknownEntity(id))?;
        if active {
            let _ = self.world.remove_one::<Inactive>(entity);
        } else {
            self.world
                .insert_one(entity, Inactive)
                .map_err(|_| SceneError::UnknownEntity(id))?;
        }
        Ok(())
    }

    /// Move an entity (parent-relative position).
    pub fn set_position(&mut self, id: EntityId, position: DVec3) -> Result<(), SceneError> {
        let entity = to_entity(id).ok_or(SceneError::UnknownEntity(id))?;
        let mut transform = self
            .world
            .get::<&mut Transform>(entity)
            .map_err(|_| SceneError::UnknownEntity(id))?;
        transform.position = position;
        Ok(())
    }

    /// Spawn a turret, optionally with a muzzle child at `muzzle_offset`.
    pub fn spawn_turret(&mut self, name: &str, position: DVec3, muzzle_offset: Option<DVec3>) -> EntityId {
        let turret = self.spawn((Turret, Name(name.to_string()), Transform::from_position(position)));
        if let Some(offset) = muzzle_offset {
            self.attach_child(turret, DEFAULT_MUZZLE_NAME, offset);
        }
        turret
    }

    /// Spawn a named child at `offset` in the parent's space.
    pub fn attach_child(&mut self, parent: EntityId, name: &str, offset: DVec3) -> EntityId {
        self.spawn((
            Name(name.to_string()),
            Parent(parent),
            Transform::from_position(offset),
        ))
    }

    /// Spawn a tagged target. With a radius it also blocks rays on every layer.
    pub fn spawn_target(&mut self, name: &str, tags: &[&str], position: DVec3, radius: Option<f64>) -> EntityId {
        let mut builder = EntityBuilder::new();
        builder
            .add(Name(name.to_string()))
            .add(Tags(tags.iter().map(|t| t.to_string()).collect()))
            .add(Transform::from_position(position));
        if let Some(radius) = radius {
            builder.add(SphereCollider {
                radius,
                layers: LayerMask::ALL,
            });
        }
        entity_id(self.world.spawn(builder.build()))
    }

    /// Spawn a static sphere that blocks rays on `layers`.
    pub fn spawn_obstacle(&mut self, name: &str, position: DVec3, radius: f64, layers: LayerMask) -> EntityId {
        self.spawn((
            Name(name.to_string()),
            Transform::from_position(position),
            SphereCollider { radius, layers },
        ))
    }

    pub fn name_of(&self, id: EntityId) -> Option<String> {
        let entity = to_entity(id)?;
        self.world.get::<&Name>(entity).ok().map(|n| n.0.clone())
    }

    pub fn projectile_count(&self) -> usize {
        self.world.query::<&Projectile>().iter().count()
    }

    fn parent_of(&self, entity: Entity) -> Option<Entity> {
        self.world
            .get::<&Parent>(entity)
            .ok()
            .and_then(|parent| to_entity(parent.0))
    }

    fn world_transform(&self, entity: Entity) -> Option<Transform> {
        let mut transform = *self.world.get::<&Transform>(entity).ok()?;
        let mut parent = self.parent_of(entity);
        for _ in 0..MAX_PARENT_DEPTH {
            let Some(p) = parent else {
                break;
            };
            let Some(parent_transform) = self.world.get::<&Transform>(p).ok().map(|t| *t) else {
                break;
            };
            transform = parent_transform.mul_transform(&transform);
            parent = self.parent_of(p);
        }
        Some(transform)
    }

    fn world_transform_of(&self, id: EntityId) -> Option<Transform> {
        to_entity(id).and_then(|entity| self.world_transform(entity))
    }
}

/// Distance along `dir` at which the ray enters the sphere, if within `length`.
fn segment_sphere_entry(origin: DVec3, dir: DVec3, length: f64, center: DVec3, radius: f64) -> Option<f64> {
    let m = origin - center;
    let c = m.length_squared() - radius * radius;
    if c <= 0.0 {
        return None;
    }
    let b = m.dot(dir);
    if b > 0.0 {
        return None;
    }
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let t = -b - discriminant.sqrt();
    (t <= length).then_some(t)
}

impl Scene for SceneWorld {
    fn find_by_name(&self, name: &str) -> Option<EntityId> {
        self.world
            .query::<&Name>()
            .iter()
            .filter(|(_, n)| n.0 == name)
            .map(|(entity, _)| entity_id(entity))
            .min()
    }

    fn entities_with_tag(&self, tag: &str) -> Vec<EntityId> {
        let mut found: Vec<EntityId> = self
            .world
            .query::<&Tags>()
            .iter()
            .filter(|(_, tags)| tags.0.iter().any(|t| t == tag))
            .map(|(entity, _)| entity_id(entity))
            .collect();
        found.sort();
        found
    }

    fn child_by_name(&self, parent: EntityId, name: &str) -> Option<EntityId> {
        self.world
            .query::<(&Name, &Parent)>()
            .iter()
            .filter(|(_, (n, p))| p.0 == parent && n.0 == name)
            .map(|(entity, _)| entity_id(entity))
            .min()
    }

    fn is_alive(&self, entity: EntityId) -> bool {
        to_entity(entity).is_some_and(|e| self.world.contains(e))
    }

    fn is_active(&self, entity: EntityId) -> bool {
        to_entity(entity)
            .and_then(|e| self.world.entity(e).ok())
            .is_some_and(|e| !e.has::<Inactive>())
    }

    fn world_position(&self, entity: EntityId) -> Option<DVec3> {
        self.world_transform_of(entity).map(|t| t.position)
    }

    fn world_rotation(&self, entity: EntityId) -> Option<DQuat> {
        self.world_transform_of(entity).map(|t| t.rotation)
    }

    fn forward_vector(&self, entity: EntityId) -> Option<DVec3> {
        self.world_transform_of(entity).map(|t| t.forward())
    }

    fn set_world_rotation(&mut self, id: EntityId, rotation: DQuat) -> Result<(), SceneError> {
        let entity = to_entity(id).ok_or(SceneError::UnknownEntity(id))?;
        let local = match self.parent_of(entity).and_then(|p| self.world_transform(p)) {
            Some(parent) => parent.rotation.inverse() * rotation,
            None => rotation,
        };
        let mut transform = self
            .world
            .get::<&mut Transform>(entity)
            .map_err(|_| SceneError::UnknownEntity(id))?;
        transform.rotation = local.normalize();
        Ok(())
    }

    fn submit_transform(&mut self, entity: EntityId) -> Result<(), SceneError> {
        if !self.is_alive(entity) {
            return Err(SceneError::UnknownEntity(entity));
        }
        self.submitted.push(entity);
        Ok(())
    }

    fn ray_cast(&self, from: DVec3, to: DVec3, mask: Option<LayerMask>) -> Option<RayHit> {
        let length = (to - from).length();
        let dir = math::normalize_or_none(to - from)?;

        let colliders: Vec<(Entity, SphereCollider)> = self
            .world
            .query::<(&SphereCollider, Option<&Inactive>, Option<&Projectile>)>()
            .iter()
            .filter(|(_, (_, inactive, projectile))| inactive.is_none() && projectile.is_none())
            .filter(|(_, (collider, _, _))| mask.map_or(true, |m| collider.layers.intersects(m)))
            .map(|(entity, (collider, _, _))| (entity, *collider))
            .collect();

        let mut best: Option<RayHit> = None;
        for (entity, collider) in colliders {
            let Some(center) = self.world_transform(entity).map(|t| t.position) else {
                continue;
            };
            let Some(t) = segment_sphere_entry(from, dir, length, center, collider.radius) else {
                continue;
            };
            if best.map_or(true, |hit| t < hit.distance) {
                best = Some(RayHit {
                    entity: entity_id(entity),
                    point: from + dir * t,
                    distance: t,
                });
            }
        }
        best
    }

    fn spawn_from_template(&mut self, template: &str, position: DVec3) -> Result<EntityId, SceneError> {
        let blueprint = self
            .templates
            .get(template)
            .ok_or_else(|| SceneError::UnknownTemplate(template.to_string()))?;

        let mut builder = EntityBuilder::new();
        builder
            .add(Projectile)
            .add(Tags(blueprint.tags.clone()))
            .add(Transform::from_position(position));
        if let Some(radius) = blueprint.collider_radius {
            if !(radius.is_finite() && radius > 0.0) {
                return Err(SceneError::MalformedTemplate {
                    name: template.to_string(),
                    reason: format!("collider radius {radius} must be positive"),
                });
            }
            builder.add(SphereCollider {
                radius,
                layers: blueprint.layers,
            });
        }
        if blueprint.rigid_body {
            builder.add(RigidBody::default());
        }

        Ok(entity_id(self.world.spawn(builder.build())))
    }

    fn rigid_body(&mut self, entity: EntityId) -> Option<&mut dyn LinearVelocity> {
        let entity = to_entity(entity)?;
        self.world
            .query_one_mut::<&mut RigidBody>(entity)
            .ok()
            .map(|body| body as &mut dyn LinearVelocity)
    }

    fn schedule_retire(&mut self, entity: EntityId, delay_secs: f64) -> Result<(), SceneError> {
        self.insert_one(
            entity,
            Lifetime {
                remaining_secs: delay_secs,
            },
        )
    }

    fn draw_debug_line(&mut self, from: DVec3, to: DVec3, color: [f32; 3]) {
        self.debug_lines.push(DebugLine { from, to, color });
    }

    fn play_sound(&mut self, sound: &str) {
        self.sounds.push(sound.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_hits_nearest_sphere() {
        let mut scene = SceneWorld::new();
        let near = scene.spawn_obstacle("Near", DVec3::new(0.0, 0.0, -5.0), 1.0, LayerMask::ALL);
        scene.spawn_obstacle("Far", DVec3::new(0.0, 0.0, -10.0), 1.0, LayerMask::ALL);

        let hit = scene
            .ray_cast(DVec3::ZERO, DVec3::new(0.0, 0.0, -20.0), None)
            .unwrap();
        assert_eq!(hit.entity, near);
        assert!((hit.distance - 4.0).abs() < 1e-9);
        assert!((hit.point - DVec3::new(0.0, 0.0, -4.0)).length() < 1e-9);
    }

    #[test]
    fn test_ray_stops_at_segment_end() {
        let mut scene = SceneWorld::new();
        scene.spawn_obstacle("Wall", DVec3::new(0.0, 0.0, -10.0), 1.0, LayerMask::ALL);
        assert!(scene
            .ray_cast(DVec3::ZERO, DVec3::new(0.0, 0.0, -5.0), None)
            .is_none());
    }

    #[test]
    fn test_ray_ignores_sphere_containing_origin() {
        let mut scene = SceneWorld::new();
        scene.spawn_obstacle("Shell", DVec3::ZERO, 2.0, LayerMask::ALL);
        assert!(scene
            .ray_cast(DVec3::ZERO, DVec3::new(10.0, 0.0, 0.0), None)
            .is_none());
    }

    #[test]
    fn test_ray_respects_mask() {
        let mut scene = SceneWorld::new();
        scene.spawn_obstacle("Glass", DVec3::new(5.0, 0.0, 0.0), 1.0, LayerMask(0b10));
        let to = DVec3::new(10.0, 0.0, 0.0);
        assert!(scene.ray_cast(DVec3::ZERO, to, Some(LayerMask(0b01))).is_none());
        assert!(scene.ray_cast(DVec3::ZERO, to, Some(LayerMask(0b10))).is_some());
        assert!(scene.ray_cast(DVec3::ZERO, to, None).is_some());
    }

    #[test]
    fn test_ray_skips_inactive_colliders() {
        let mut scene = SceneWorld::new();
        let wall = scene.spawn_obstacle("Wall", DVec3::new(5.0, 0.0, 0.0), 1.0, LayerMask::ALL);
        scene.set_active(wall, false).unwrap();
        assert!(scene
            .ray_cast(DVec3::ZERO, DVec3::new(10.0, 0.0, 0.0), None)
            .is_none());
        scene.set_active(wall, true).unwrap();
        assert!(scene
            .ray_cast(DVec3::ZERO, DVec3::new(10.0, 0.0, 0.0), None)
            .is_some());
    }

    #[test]
    fn test_ray_passes_through_projectiles() {
        let mut scene = SceneWorld::new();
        scene.register_template(
            "Slug",
            ProjectileTemplate {
                collider_radius: Some(1.0),
                ..Default::default()
            },
        );
        scene
            .spawn_from_template("Slug", DVec3::new(5.0, 0.0, 0.0))
            .unwrap();
        assert!(scene
            .ray_cast(DVec3::ZERO, DVec3::new(10.0, 0.0, 0.0), None)
            .is_none());
    }

    #[test]
    fn test_child_world_transform_follows_parent() {
        let mut scene = SceneWorld::new();
        let turret = scene.spawn_turret("Turret", DVec3::new(1.0, 2.0, 3.0), Some(DVec3::new(0.0, 0.0, -1.0)));
        let muzzle = scene.child_by_name(turret, DEFAULT_MUZZLE_NAME).unwrap();
        assert_eq!(scene.world_position(muzzle), Some(DVec3::new(1.0, 2.0, 2.0)));

        let face_east = DQuat::from_rotation_y(-std::f64::consts::FRAC_PI_2);
        scene.set_world_rotation(turret, face_east).unwrap();
        let muzzle_pos = scene.world_position(muzzle).unwrap();
        assert!((muzzle_pos - DVec3::new(2.0, 2.0, 3.0)).length() < 1e-9);
        let forward = scene.forward_vector(muzzle).unwrap();
        assert!((forward - DVec3::X).length() < 1e-9);
    }

    #[test]
    fn test_set_world_rotation_on_child_is_parent_relative() {
        let mut scene = SceneWorld::new();
        let turret = scene.spawn_turret("Turret", DVec3::ZERO, Some(DVec3::new(0.0, 0.0, -1.0)));
        let muzzle = scene.child_by_name(turret, DEFAULT_MUZZLE_NAME).unwrap();
        scene
            .set_world_rotation(turret, DQuat::from_rotation_y(0.5))
            .unwrap();
        let target = DQuat::from_rotation_y(1.2);
        scene.set_world_rotation(muzzle, target).unwrap();
        let world = scene.world_rotation(muzzle).unwrap();
        assert!(world.angle_between(target) < 1e-6);
    }

    #[test]
    fn test_tag_query_is_sorted_and_includes_inactive() {
        let mut scene = SceneWorld::new();
        let a = scene.spawn_target("A", &["Player"], DVec3::ZERO, None);
        let b = scene.spawn_target("B", &["Player", "Boss"], DVec3::ZERO, None);
        scene.spawn_target("C", &["Neutral"], DVec3::ZERO, None);
        scene.set_active(a, false).unwrap();

        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(scene.entities_with_tag("Player"), expected);
        assert_eq!(scene.entities_with_tag("Boss"), vec![b]);
        assert!(!scene.is_active(a));
        assert!(scene.is_active(b));
    }

    #[test]
    fn test_unknown_template() {
        let mut scene = SceneWorld::new();
        assert_eq!(
            scene.spawn_from_template("Rocket", DVec3::ZERO),
            Err(SceneError::UnknownTemplate("Rocket".into()))
        );
    }

    #[test]
    fn test_malformed_template() {
        let mut scene = SceneWorld::new();
        scene.register_template(
            "Broken",
            ProjectileTemplate {
                collider_radius: Some(-1.0),
                ..Default::default()
            },
        );
        assert!(matches!(
            scene.spawn_from_template("Broken", DVec3::ZERO),
            Err(SceneError::MalformedTemplate { .. })
        ));
        assert_eq!(scene.projectile_count(), 0);
    }

    #[test]
    fn test_rigid_body_capability() {
        let mut scene = SceneWorld::new();
        scene.register_template("Bolt", ProjectileTemplate::default());
        scene.register_template(
            "Decal",
            ProjectileTemplate {
                rigid_body: false,
                ..Default::default()
            },
        );
        let bolt = scene.spawn_from_template("Bolt", DVec3::ZERO).unwrap();
        let decal = scene.spawn_from_template("Decal", DVec3::ZERO).unwrap();

        scene
            .rigid_body(bolt)
            .unwrap()
            .set_linear_velocity(DVec3::X);
        assert!(scene.rigid_body(decal).is_none());

        let entity = to_entity(bolt).unwrap();
        let body = scene.world().get::<&RigidBody>(entity).unwrap();
        assert_eq!(body.linear_velocity, DVec3::X);
    }

    #[test]
    fn test_despawned_entity_is_not_alive() {
        let mut scene = SceneWorld::new();
        let target = scene.spawn_target("A", &["Player"], DVec3::ZERO, None);
        assert!(scene.is_alive(target));
        assert!(scene.despawn(target));
        assert!(!scene.is_alive(target));
        assert!(!scene.is_active(target));
        assert!(scene.world_position(target).is_none());
        assert!(!scene.despawn(target));
    }
}
