//! Spatial query capability consumed by the snap strategies.
//!
//! Collision detection itself lives outside this crate. Strategies only ask
//! for ray-casts, box overlaps, tags and (optionally) body velocities.

use std::fmt;
use std::hash::Hash;

use bevy::math::{Dir3, Quat, Vec3};

/// Nearest hit reported by a ray-cast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit<C> {
    pub collider: C,
    pub point: Vec3,
    /// Outward surface normal at `point`.
    pub normal: Vec3,
    pub distance: f32,
}

/// Collision-world queries used by the snap strategies.
pub trait SpatialQuery {
    /// Stable identity of a collider.
    type Collider: Copy + Eq + Hash + fmt::Debug;

    /// Casts a ray and returns the nearest solid hit, skipping `exclude`.
    fn raycast(
        &self,
        origin: Vec3,
        direction: Dir3,
        max_distance: f32,
        exclude: Option<Self::Collider>,
    ) -> Option<RayHit<Self::Collider>>;

    /// Returns every collider overlapping the given oriented box.
    fn overlap_box(&self, center: Vec3, half_extents: Vec3, rotation: Quat) -> Vec<Self::Collider>;

    /// Whether `collider` carries `tag`.
    fn has_tag(&self, collider: Self::Collider, tag: &str) -> bool;

    /// Linear velocity of the body owning `collider`, if it exposes one.
    fn linear_velocity(&self, collider: Self::Collider) -> Option<Vec3>;

    /// Ray-cast that only reports the nearest hit when it carries `tag`.
    ///
    /// An untagged collider in front of a tagged one blocks the ray.
    fn raycast_tagged(
        &self,
        origin: Vec3,
        direction: Dir3,
        max_distance: f32,
        exclude: Option<Self::Collider>,
        tag: &str,
    ) -> Option<RayHit<Self::Collider>> {
        self.raycast(origin, direction, max_distance, exclude)
            .filter(|hit| self.has_tag(hit.collider, tag))
    }
}
