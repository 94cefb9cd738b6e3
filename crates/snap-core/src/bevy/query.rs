//! ECS-backed spatial queries.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::bevy::components::{BoxCollider, LinearVelocity, SnapTag, TriggerVolume};
use crate::pose::Pose;
use crate::query::{RayHit, SpatialQuery};
use crate::shape::OrientedBox;

type ColliderData = (
    Entity,
    &'static GlobalTransform,
    &'static BoxCollider,
    Option<&'static SnapTag>,
    Option<&'static LinearVelocity>,
    Has<TriggerVolume>,
);

/// World-space box of a collider, scaled by its global transform.
pub fn collider_box(transform: &GlobalTransform, collider: &BoxCollider) -> OrientedBox {
    let (scale, rotation, translation) = transform.to_scale_rotation_translation();
    OrientedBox::new(translation, rotation, collider.half_extents * scale.abs())
}

/// Spatial queries over every entity with a [`BoxCollider`].
///
/// Reads `GlobalTransform`, so poses written earlier in the same step become
/// visible after transform propagation.
#[derive(SystemParam)]
pub struct SceneQuery<'w, 's> {
    colliders: Query<'w, 's, ColliderData>,
}

impl SceneQuery<'_, '_> {
    /// World-space box of a collider.
    pub fn shape(&self, entity: Entity) -> Option<OrientedBox> {
        self.colliders
            .get(entity)
            .ok()
            .map(|(_, transform, collider, ..)| collider_box(transform, collider))
    }

    pub fn is_trigger(&self, entity: Entity) -> bool {
        self.colliders
            .get(entity)
            .is_ok_and(|(.., is_trigger)| is_trigger)
    }

    /// World pose of a collider.
    pub fn pose(&self, entity: Entity) -> Option<Pose> {
        let (_, transform, ..) = self.colliders.get(entity).ok()?;
        let (_, rotation, translation) = transform.to_scale_rotation_translation();
        Some(Pose::new(translation, rotation))
    }
}

impl SpatialQuery for SceneQuery<'_, '_> {
    type Collider = Entity;

    fn raycast(
        &self,
        origin: Vec3,
        direction: Dir3,
        max_distance: f32,
        exclude: Option<Entity>,
    ) -> Option<RayHit<Entity>> {
        self.colliders
            .iter()
            .filter(|(entity, .., is_trigger)| !is_trigger && Some(*entity) != exclude)
            .filter_map(|(entity, transform, collider, ..)| {
                collider_box(transform, collider)
                    .cast_ray(origin, direction, max_distance)
                    .map(|hit| RayHit {
                        collider: entity,
                        point: hit.point,
                        normal: hit.normal,
                        distance: hit.distance,
                    })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    fn overlap_box(&self, center: Vec3, half_extents: Vec3, rotation: Quat) -> Vec<Entity> {
        let volume = OrientedBox::new(center, rotation, half_extents);
        self.colliders
            .iter()
            .filter(|(_, transform, collider, ..)| collider_box(transform, collider).intersects(&volume))
            .map(|(entity, ..)| entity)
            .collect()
    }

    fn has_tag(&self, collider: Entity, tag: &str) -> bool {
        self.colliders
            .get(collider)
            .ok()
            .and_then(|(_, _, _, snap_tag, ..)| snap_tag)
            .is_some_and(|snap_tag| snap_tag.is(tag))
    }

    fn linear_velocity(&self, collider: Entity) -> Option<Vec3> {
        self.colliders
            .get(collider)
            .ok()
            .and_then(|(.., velocity, _)| velocity)
            .map(|velocity| velocity.0)
    }
}
