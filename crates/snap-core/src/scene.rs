//! In-memory collider set over oriented boxes.
//!
//! The ECS-backed [`crate::bevy::SceneQuery`] shares the same exact box
//! queries from [`crate::shape`].

use std::collections::BTreeMap;

use bevy::math::{Dir3, Quat, Vec3};

use crate::pose::Pose;
use crate::query::{RayHit, SpatialQuery};
use crate::shape::OrientedBox;

/// Identifier of a collider in a [`ColliderSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColliderId(pub u32);

/// A tagged box collider.
#[derive(Debug, Clone, PartialEq)]
pub struct ColliderEntry {
    pub pose: Pose,
    pub half_extents: Vec3,
    pub tag: Option<String>,
    pub velocity: Option<Vec3>,
    /// Trigger volumes report overlaps but never block rays.
    pub is_trigger: bool,
}

impl ColliderEntry {
    pub fn cuboid(position: Vec3, half_extents: Vec3) -> Self {
        Self {
            pose: Pose::from_translation(position),
            half_extents,
            tag: None,
            velocity: None,
            is_trigger: false,
        }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.pose.rotation = rotation;
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = Some(velocity);
        self
    }

    pub fn trigger(mut self) -> Self {
        self.is_trigger = true;
        self
    }

    pub fn shape(&self) -> OrientedBox {
        OrientedBox::new(self.pose.position, self.pose.rotation, self.half_extents)
    }
}

/// Collider storage implementing [`SpatialQuery`] without an ECS world.
#[derive(Debug, Clone, Default)]
pub struct ColliderSet {
    entries: BTreeMap<ColliderId, ColliderEntry>,
    next_id: u32,
}

impl ColliderSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entry: ColliderEntry) -> ColliderId {
        let id = ColliderId(self.next_id);
        self.next_id += 1;
        self.entries.insert(id, entry);
        id
    }

    pub fn remove(&mut self, id: ColliderId) -> Option<ColliderEntry> {
        self.entries.remove(&id)
    }

    pub fn get(&self, id: ColliderId) -> Option<&ColliderEntry> {
        self.entries.get(&id)
    }

    pub fn get_mut(&mut self, id: ColliderId) -> Option<&mut ColliderEntry> {
        self.entries.get_mut(&id)
    }

    /// Current pose of a collider.
    pub fn pose(&self, id: ColliderId) -> Option<Pose> {
        self.entries.get(&id).map(|entry| entry.pose)
    }

    /// Moves a collider. Returns `false` if it does not exist.
    pub fn set_pose(&mut self, id: ColliderId, pose: Pose) -> bool {
        match self.entries.get_mut(&id) {
            Some(entry) => {
                entry.pose = pose;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ColliderId, &ColliderEntry)> {
        self.entries.iter().map(|(id, entry)| (*id, entry))
    }
}

impl SpatialQuery for ColliderSet {
    type Collider = ColliderId;

    fn raycast(
        &self,
        origin: Vec3,
        direction: Dir3,
        max_distance: f32,
        exclude: Option<ColliderId>,
    ) -> Option<RayHit<ColliderId>> {
        self.entries
            .iter()
            .filter(|(id, entry)| !entry.is_trigger && Some(**id) != exclude)
            .filter_map(|(id, entry)| {
                entry
                    .shape()
                    .cast_ray(origin, direction, max_distance)
                    .map(|hit| RayHit {
                        collider: *id,
                        point: hit.point,
                        normal: hit.normal,
                        distance: hit.distance,
                    })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    fn overlap_box(&self, center: Vec3, half_extents: Vec3, rotation: Quat) -> Vec<ColliderId> {
        let volume = OrientedBox::new(center, rotation, half_extents);
        self.entries
            .iter()
            .filter(|(_, entry)| entry.shape().intersects(&volume))
            .map(|(id, _)| *id)
            .collect()
    }

    fn has_tag(&self, collider: ColliderId, tag: &str) -> bool {
        self.entries
            .get(&collider)
            .and_then(|entry| entry.tag.as_deref())
            .is_some_and(|own| own == tag)
    }

    fn linear_velocity(&self, collider: ColliderId) -> Option<Vec3> {
        self.entries.get(&collider).and_then(|entry| entry.velocity)
    }
}
