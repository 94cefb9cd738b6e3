//! Multi-ray face sweep that keeps a box aligned to tagged surfaces.
//!
//! Every step rays are cast outward from each of the six faces. Each hitting
//! face pulls the pose toward its own target; hits are applied in face order,
//! so with several touching faces the last one wins.
//!
//! The target position keeps the box's lateral placement and only corrects its
//! depth along the face normal, so the hit point ends up half a bounding
//! diagonal in front of the box center. Moving the center to
//! `hit - normal * half_diagonal` instead would drag the box sideways toward
//! whichever corner ray hit.

use bevy::math::{Dir3, Vec3};

use crate::config::{RaySampling, SurfaceSnapConfig};
use crate::pose::{Pose, angle_between_degrees, approach, facing_rotation};
use crate::query::SpatialQuery;

/// One of the six cardinal faces of a box, in its local frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaceDirection {
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

impl FaceDirection {
    /// Sweep order.
    pub const ALL: [FaceDirection; 6] = [
        FaceDirection::PosX,
        FaceDirection::NegX,
        FaceDirection::PosY,
        FaceDirection::NegY,
        FaceDirection::PosZ,
        FaceDirection::NegZ,
    ];

    pub fn normal(self) -> Vec3 {
        match self {
            FaceDirection::PosX => Vec3::X,
            FaceDirection::NegX => Vec3::NEG_X,
            FaceDirection::PosY => Vec3::Y,
            FaceDirection::NegY => Vec3::NEG_Y,
            FaceDirection::PosZ => Vec3::Z,
            FaceDirection::NegZ => Vec3::NEG_Z,
        }
    }

    /// The two in-face axes.
    fn tangents(self) -> (Vec3, Vec3) {
        match self {
            FaceDirection::PosX | FaceDirection::NegX => (Vec3::Y, Vec3::Z),
            FaceDirection::PosY | FaceDirection::NegY => (Vec3::X, Vec3::Z),
            FaceDirection::PosZ | FaceDirection::NegZ => (Vec3::X, Vec3::Y),
        }
    }

    /// Center of the face for a box with `half_extents`.
    pub fn center(self, half_extents: Vec3) -> Vec3 {
        self.normal() * half_extents
    }

    /// The four corners of the face for a box with `half_extents`.
    pub fn corners(self, half_extents: Vec3) -> [Vec3; 4] {
        let center = self.center(half_extents);
        let (u, v) = self.tangents();
        let (u, v) = (u * half_extents, v * half_extents);
        [center + u + v, center + u - v, center - u + v, center - u - v]
    }

    /// Local-frame ray origins, pushed `offset` outward along the face normal.
    pub fn sample_points(self, sampling: RaySampling, half_extents: Vec3, offset: f32) -> Vec<Vec3> {
        let push = self.normal() * offset;
        match sampling {
            RaySampling::Corners => self.corners(half_extents).into_iter().map(|p| p + push).collect(),
            RaySampling::FaceCenter => vec![self.center(half_extents) + push],
        }
    }
}

/// A face whose sweep hit a tagged surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceHit<C> {
    pub face: FaceDirection,
    pub collider: C,
    pub point: Vec3,
    pub normal: Vec3,
}

/// Engage/disengage edge of the "any face touching" flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceTransition {
    Engaged,
    Disengaged,
}

/// Outcome of one [`SurfaceSnapper::sweep`].
#[derive(Debug, Clone, PartialEq)]
pub struct SweepReport<C> {
    pub hits: Vec<FaceHit<C>>,
    pub transition: Option<SurfaceTransition>,
}

/// Surface snapper state for one box.
#[derive(Debug, Clone)]
pub struct SurfaceSnapper {
    config: SurfaceSnapConfig,
    engaged: bool,
}

impl SurfaceSnapper {
    pub fn new(config: SurfaceSnapConfig) -> Self {
        Self {
            config: config.sanitized(),
            engaged: false,
        }
    }

    pub fn config(&self) -> &SurfaceSnapConfig {
        &self.config
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged
    }

    /// Casts one face's rays from `pose`. The first ray that hits a tagged
    /// surface counts for the whole face.
    fn cast_face<Q: SpatialQuery>(
        &self,
        query: &Q,
        own: Option<Q::Collider>,
        pose: Pose,
        half_extents: Vec3,
        face: FaceDirection,
    ) -> Option<FaceHit<Q::Collider>> {
        let direction = Dir3::new(pose.rotation * face.normal()).ok()?;
        let max_distance = half_extents.length() + self.config.snap_threshold;

        face.sample_points(self.config.sampling, half_extents, self.config.corner_offset)
            .into_iter()
            .find_map(|local| {
                let origin = pose.position + pose.rotation * local;
                query.raycast_tagged(origin, direction, max_distance, own, &self.config.target_tag)
            })
            .map(|hit| FaceHit {
                face,
                collider: hit.collider,
                point: hit.point,
                normal: hit.normal,
            })
    }

    /// Pulls `pose` one step toward the surface reported by `hit`.
    fn apply_hit<C>(&self, hit: &FaceHit<C>, pose: &mut Pose, half_extents: Vec3, dt: f32) {
        let t = self.config.convergence_rate * dt;
        let world_normal = pose.rotation * hit.face.normal();
        let depth = (hit.point - pose.position).dot(world_normal) - half_extents.length();
        let target = pose.position + world_normal * depth;
        pose.position = approach(pose.position, target, t);

        let Some(target_rotation) = facing_rotation(-hit.normal) else {
            return;
        };
        if angle_between_degrees(pose.rotation, target_rotation) <= self.config.rotation_tolerance {
            pose.rotation = pose.rotation.slerp(target_rotation, t.clamp(0.0, 1.0));
        }
    }

    /// Sweeps all six faces and moves `pose` toward every hit surface.
    ///
    /// Ray origins are taken from the pose at the start of the sweep.
    pub fn sweep<Q: SpatialQuery>(
        &mut self,
        query: &Q,
        own: Option<Q::Collider>,
        pose: &mut Pose,
        half_extents: Vec3,
        dt: f32,
    ) -> SweepReport<Q::Collider> {
        let origin_pose = *pose;
        let hits: Vec<_> = FaceDirection::ALL
            .into_iter()
            .filter_map(|face| self.cast_face(query, own, origin_pose, half_extents, face))
            .collect();

        for hit in &hits {
            self.apply_hit(hit, pose, half_extents, dt);
        }

        let touching = !hits.is_empty();
        let transition = match (self.engaged, touching) {
            (false, true) => Some(SurfaceTransition::Engaged),
            (true, false) => Some(SurfaceTransition::Disengaged),
            _ => None,
        };
        self.engaged = touching;

        SweepReport { hits, transition }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::Quat;
    use crate::scene::{ColliderEntry, ColliderId, ColliderSet};

    const DT: f32 = 1.0 / 60.0;
    const HALF: Vec3 = Vec3::splat(0.5);

    /// Snapping cube at the origin plus a large tagged wall whose -X face sits at x = 1.1.
    fn wall_scene() -> (ColliderSet, ColliderId, ColliderId) {
        let mut set = ColliderSet::new();
        let own = set.insert(ColliderEntry::cuboid(Vec3::ZERO, HALF));
        let wall = set.insert(
            ColliderEntry::cuboid(Vec3::new(1.2, 0.0, 0.0), Vec3::new(0.1, 2.0, 2.0)).with_tag("SnapObject"),
        );
        (set, own, wall)
    }

    #[test]
    fn test_face_corners() {
        let corners = FaceDirection::NegY.corners(Vec3::new(1.0, 2.0, 3.0));
        assert!(corners.iter().all(|c| c.y == -2.0));
        assert!(corners.contains(&Vec3::new(1.0, -2.0, -3.0)));
        assert!(corners.contains(&Vec3::new(-1.0, -2.0, 3.0)));

        let center = FaceDirection::PosZ.sample_points(RaySampling::FaceCenter, HALF, 0.05);
        assert_eq!(center, vec![Vec3::new(0.0, 0.0, 0.55)]);
    }

    #[test]
    fn test_hit_engages_and_converges() {
        let (set, own, wall) = wall_scene();
        let mut snapper = SurfaceSnapper::new(SurfaceSnapConfig::default());
        let mut pose = Pose::IDENTITY;

        let report = snapper.sweep(&set, Some(own), &mut pose, HALF, DT);
        assert_eq!(report.transition, Some(SurfaceTransition::Engaged));
        assert_eq!(report.hits.len(), 1);
        assert_eq!(report.hits[0].face, FaceDirection::PosX);
        assert_eq!(report.hits[0].collider, wall);

        for _ in 0..60 {
            let report = snapper.sweep(&set, Some(own), &mut pose, HALF, DT);
            assert!(report.transition.is_none());
        }
        let expected = 1.1 - HALF.length();
        assert!((pose.position.x - expected).abs() < 1e-3);
        // Side wall would need a 90° turn, far outside tolerance
        assert_eq!(pose.rotation, Quat::IDENTITY);
    }

    #[test]
    fn test_disengage_fires_once() {
        let (mut set, own, wall) = wall_scene();
        let mut snapper = SurfaceSnapper::new(SurfaceSnapConfig::default());
        let mut pose = Pose::IDENTITY;

        snapper.sweep(&set, Some(own), &mut pose, HALF, DT);
        assert!(snapper.is_engaged());

        set.remove(wall);
        let report = snapper.sweep(&set, Some(own), &mut pose, HALF, DT);
        assert_eq!(report.transition, Some(SurfaceTransition::Disengaged));
        for _ in 0..5 {
            let report = snapper.sweep(&set, Some(own), &mut pose, HALF, DT);
            assert!(report.transition.is_none());
            assert!(report.hits.is_empty());
        }
    }

    #[test]
    fn test_untagged_surface_ignored() {
        let mut set = ColliderSet::new();
        let own = set.insert(ColliderEntry::cuboid(Vec3::ZERO, HALF));
        set.insert(ColliderEntry::cuboid(Vec3::new(1.2, 0.0, 0.0), Vec3::new(0.1, 2.0, 2.0)));

        let mut snapper = SurfaceSnapper::new(SurfaceSnapConfig::default());
        let mut pose = Pose::IDENTITY;
        let report = snapper.sweep(&set, Some(own), &mut pose, HALF, DT);
        assert!(report.hits.is_empty());
        assert_eq!(pose, Pose::IDENTITY);
    }

    /// Tagged wall behind the cube; its front face normal is +Z.
    fn back_wall_scene() -> (ColliderSet, ColliderId) {
        let mut set = ColliderSet::new();
        let own = set.insert(ColliderEntry::cuboid(Vec3::ZERO, HALF));
        set.insert(ColliderEntry::cuboid(Vec3::new(0.0, 0.0, -1.2), Vec3::new(2.0, 2.0, 0.1)).with_tag("SnapObject"));
        (set, own)
    }

    #[test]
    fn test_rotation_within_tolerance_aligns() {
        let (set, own) = back_wall_scene();
        let mut snapper = SurfaceSnapper::new(SurfaceSnapConfig::default());
        let mut pose = Pose::new(Vec3::ZERO, Quat::from_rotation_y(3_f32.to_radians()));

        for _ in 0..60 {
            snapper.sweep(&set, Some(own), &mut pose, HALF, DT);
        }
        assert!(angle_between_degrees(pose.rotation, Quat::IDENTITY) < 0.01);
    }

    #[test]
    fn test_rotation_outside_tolerance_unchanged() {
        let (set, own) = back_wall_scene();
        let mut snapper = SurfaceSnapper::new(SurfaceSnapConfig::default());
        let rotation = Quat::from_rotation_y(30_f32.to_radians());
        let mut pose = Pose::new(Vec3::ZERO, rotation);

        let report = snapper.sweep(&set, Some(own), &mut pose, HALF, DT);
        assert!(!report.hits.is_empty());
        assert_eq!(pose.rotation, rotation);
        assert_ne!(pose.position, Vec3::ZERO);
    }

    #[test]
    fn test_face_center_sampling_hits_narrow_target() {
        let mut set = ColliderSet::new();
        let own = set.insert(ColliderEntry::cuboid(Vec3::ZERO, HALF));
        set.insert(ColliderEntry::cuboid(Vec3::new(1.0, 0.0, 0.0), Vec3::splat(0.1)).with_tag("SnapObject"));

        let mut corners = SurfaceSnapper::new(SurfaceSnapConfig::default());
        let mut pose = Pose::IDENTITY;
        assert!(corners.sweep(&set, Some(own), &mut pose, HALF, DT).hits.is_empty());

        let mut center = SurfaceSnapper::new(SurfaceSnapConfig {
            sampling: RaySampling::FaceCenter,
            ..Default::default()
        });
        let report = center.sweep(&set, Some(own), &mut pose, HALF, DT);
        assert_eq!(report.hits.len(), 1);
        assert_eq!(report.transition, Some(SurfaceTransition::Engaged));
    }

    #[test]
    fn test_lateral_placement_kept() {
        let (mut set, own, _) = wall_scene();
        let start = Vec3::new(0.0, 0.3, -0.2);
        set.set_pose(own, Pose::from_translation(start));

        let mut snapper = SurfaceSnapper::new(SurfaceSnapConfig::default());
        let mut pose = Pose::from_translation(start);
        for _ in 0..60 {
            snapper.sweep(&set, Some(own), &mut pose, HALF, DT);
        }
        assert!((pose.position.x - (1.1 - HALF.length())).abs() < 1e-3);
        assert!((pose.position.y - start.y).abs() < 1e-5);
        assert!((pose.position.z - start.z).abs() < 1e-5);
    }

    #[test]
    fn test_rotated_wall_keeps_aligned_box_aligned() {
        let rotation = Quat::from_rotation_y(3_f32.to_radians());
        let mut set = ColliderSet::new();
        let own = set.insert(ColliderEntry::cuboid(Vec3::ZERO, HALF).with_rotation(rotation));
        set.insert(
            ColliderEntry::cuboid(Vec3::new(0.0, 0.0, -1.2), Vec3::new(2.0, 2.0, 0.1))
                .with_rotation(rotation)
                .with_tag("SnapObject"),
        );

        let mut snapper = SurfaceSnapper::new(SurfaceSnapConfig::default());
        let mut pose = Pose::new(Vec3::ZERO, rotation);
        let report = snapper.sweep(&set, Some(own), &mut pose, HALF, DT);
        assert_eq!(report.hits.len(), 1);
        assert!(report.hits[0].normal.distance(rotation * Vec3::Z) < 1e-4);

        for _ in 0..60 {
            snapper.sweep(&set, Some(own), &mut pose, HALF, DT);
        }
        assert!(angle_between_degrees(pose.rotation, rotation) < 0.01);
    }

    #[test]
    fn test_floor_and_wall_both_applied_in_face_order() {
        let (mut set, own, wall) = wall_scene();
        let floor = set.insert(
            ColliderEntry::cuboid(Vec3::new(0.0, -0.7, 0.0), Vec3::new(3.0, 0.1, 3.0)).with_tag("SnapObject"),
        );

        let mut snapper = SurfaceSnapper::new(SurfaceSnapConfig::default());
        let mut pose = Pose::IDENTITY;
        let report = snapper.sweep(&set, Some(own), &mut pose, HALF, DT);

        let faces: Vec<_> = report.hits.iter().map(|hit| (hit.face, hit.collider)).collect();
        assert_eq!(faces, vec![(FaceDirection::PosX, wall), (FaceDirection::NegY, floor)]);

        // One step at t = 1/3 toward each face's own depth target
        let t = 20.0 * DT;
        assert!((pose.position.x - (1.1 - HALF.length()) * t).abs() < 1e-4);
        assert!((pose.position.y - (HALF.length() - 0.6) * t).abs() < 1e-4);
    }

    #[test]
    fn test_opposite_faces_last_one_wins() {
        let (mut set, own, _) = wall_scene();
        // Second wall whose +X face sits at x = -1.0
        set.insert(
            ColliderEntry::cuboid(Vec3::new(-1.1, 0.0, 0.0), Vec3::new(0.1, 2.0, 2.0)).with_tag("SnapObject"),
        );

        let mut snapper = SurfaceSnapper::new(SurfaceSnapConfig::default());
        let mut pose = Pose::IDENTITY;
        let report = snapper.sweep(&set, Some(own), &mut pose, HALF, DT);
        let faces: Vec<_> = report.hits.iter().map(|hit| hit.face).collect();
        assert_eq!(faces, vec![FaceDirection::PosX, FaceDirection::NegX]);

        // +X pulls first, then -X pulls from the already moved position
        let t = 20.0 * DT;
        let half_diagonal = HALF.length();
        let after_pos_x = (1.1 - half_diagonal) * t;
        let neg_x_target = after_pos_x - ((1.0 + after_pos_x) - half_diagonal);
        let expected = after_pos_x + (neg_x_target - after_pos_x) * t;
        assert!((pose.position.x - expected).abs() < 1e-4);
    }
}
