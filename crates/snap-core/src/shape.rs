//! Exact oriented-box geometry backed by `parry3d`.
//!
//! Both spatial query backends describe colliders as [`OrientedBox`]es; ray
//! casts, overlap tests and point projection go through parry's cuboid
//! queries, so rotated boxes report their true face normals.

use bevy::math::{Dir3, Quat, Vec3};
use parry3d::math::{Isometry, Point, Real, Vector};
use parry3d::na::{Quaternion, Translation3, UnitQuaternion};
use parry3d::query::{self, PointQuery, Ray, RayCast};
use parry3d::shape::Cuboid;

fn to_vector(v: Vec3) -> Vector<Real> {
    Vector::new(v.x, v.y, v.z)
}

fn to_point(v: Vec3) -> Point<Real> {
    Point::new(v.x, v.y, v.z)
}

fn from_vector(v: Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

fn from_point(p: Point<Real>) -> Vec3 {
    Vec3::new(p.x, p.y, p.z)
}

/// Nearest entry of a ray into a box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxRayHit {
    pub distance: f32,
    pub point: Vec3,
    /// Outward face normal in world space. Zero when the ray starts inside.
    pub normal: Vec3,
}

/// A box in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedBox {
    pub center: Vec3,
    pub rotation: Quat,
    pub half_extents: Vec3,
}

impl OrientedBox {
    pub fn new(center: Vec3, rotation: Quat, half_extents: Vec3) -> Self {
        Self {
            center,
            rotation,
            half_extents: half_extents.abs(),
        }
    }

    pub fn axis_aligned(center: Vec3, half_extents: Vec3) -> Self {
        Self::new(center, Quat::IDENTITY, half_extents)
    }

    fn isometry(&self) -> Isometry<Real> {
        let q = self.rotation.normalize();
        Isometry::from_parts(
            Translation3::new(self.center.x, self.center.y, self.center.z),
            UnitQuaternion::new_normalize(Quaternion::new(q.w, q.x, q.y, q.z)),
        )
    }

    fn cuboid(&self) -> Cuboid {
        Cuboid::new(to_vector(self.half_extents))
    }

    /// Casts a ray against the box surface.
    pub fn cast_ray(&self, origin: Vec3, direction: Dir3, max_distance: f32) -> Option<BoxRayHit> {
        let ray = Ray::new(to_point(origin), to_vector(*direction));
        let hit = self
            .cuboid()
            .cast_ray_and_get_normal(&self.isometry(), &ray, max_distance, true)?;
        Some(BoxRayHit {
            distance: hit.time_of_impact,
            point: origin + *direction * hit.time_of_impact,
            normal: from_vector(hit.normal),
        })
    }

    /// Whether the two boxes touch or overlap.
    pub fn intersects(&self, other: &OrientedBox) -> bool {
        query::intersection_test(&self.isometry(), &self.cuboid(), &other.isometry(), &other.cuboid())
            .unwrap_or(false)
    }

    /// Closest point of the box to `point`; `point` itself when it lies inside.
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        let projection = self
            .cuboid()
            .project_point(&self.isometry(), &to_point(point), true);
        from_point(projection.point)
    }

    pub fn contains(&self, point: Vec3) -> bool {
        self.cuboid().contains_point(&self.isometry(), &to_point(point))
    }
}
