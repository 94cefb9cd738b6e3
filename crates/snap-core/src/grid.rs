//! Grid snapping of settled bodies.
//!
//! - Lattice: `round((p - origin) / cell) * cell + origin` per axis
//! - Rotation: every Euler axis rounded to a right angle
//! - Quiescence: velocity or displacement based

use std::collections::HashMap;
use std::hash::Hash;

use bevy::math::{Quat, Vec3};

use crate::config::{GridSnapConfig, QuiescenceMode};
use crate::pose::{Pose, round_rotation_to_right_angles};
use crate::query::SpatialQuery;

/// Regular lattice anchored at `origin`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLattice {
    pub origin: Vec3,
    pub cell_size: f32,
}

impl GridLattice {
    pub fn new(origin: Vec3, cell_size: f32) -> Self {
        Self { origin, cell_size }
    }

    fn snap_axis(&self, value: f32, origin: f32) -> f32 {
        ((value - origin) / self.cell_size).round_ties_even() * self.cell_size + origin
    }

    /// Nearest lattice point to `position`.
    pub fn snap_position(&self, position: Vec3) -> Vec3 {
        if self.cell_size <= 0.0 {
            return position;
        }
        Vec3::new(
            self.snap_axis(position.x, self.origin.x),
            self.snap_axis(position.y, self.origin.y),
            self.snap_axis(position.z, self.origin.z),
        )
    }

    /// Snapped position plus right-angle rotation.
    pub fn snap_pose(&self, pose: Pose) -> Pose {
        Pose::new(
            self.snap_position(pose.position),
            round_rotation_to_right_angles(pose.rotation),
        )
    }
}

/// Decides whether bodies have come to rest.
///
/// Displacement mode keeps the last seen position per collider; entries are
/// never evicted.
#[derive(Debug, Clone)]
pub struct QuiescenceTracker<C> {
    mode: QuiescenceMode,
    threshold: f32,
    last_positions: HashMap<C, Vec3>,
}

impl<C: Copy + Eq + Hash> QuiescenceTracker<C> {
    pub fn new(mode: QuiescenceMode, threshold: f32) -> Self {
        Self {
            mode,
            threshold,
            last_positions: HashMap::new(),
        }
    }

    pub fn mode(&self) -> QuiescenceMode {
        self.mode
    }

    /// Judges one observation. A collider seen for the first time is never stopped.
    pub fn is_stopped(&mut self, collider: C, position: Vec3, velocity: Option<Vec3>) -> bool {
        match self.mode {
            QuiescenceMode::Velocity => {
                velocity.is_some_and(|velocity| velocity.length() <= self.threshold)
            }
            QuiescenceMode::Displacement => match self.last_positions.insert(collider, position) {
                Some(previous) => previous.distance(position) < self.threshold,
                None => false,
            },
        }
    }

    /// Records where a collider ended up after being moved by the snapper.
    pub fn record(&mut self, collider: C, position: Vec3) {
        if self.mode == QuiescenceMode::Displacement {
            self.last_positions.insert(collider, position);
        }
    }

    /// Number of colliders with a remembered position.
    pub fn tracked(&self) -> usize {
        self.last_positions.len()
    }
}

/// One grid correction produced by [`GridSnapper::step`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSnap<C> {
    pub collider: C,
    pub pose: Pose,
}

/// Grid snapper state for one lattice.
#[derive(Debug, Clone)]
pub struct GridSnapper<C> {
    config: GridSnapConfig,
    tracker: QuiescenceTracker<C>,
}

impl<C: Copy + Eq + Hash> GridSnapper<C> {
    pub fn new(config: GridSnapConfig) -> Self {
        let config = config.sanitized();
        let tracker = QuiescenceTracker::new(config.quiescence, config.stop_threshold);
        Self { config, tracker }
    }

    pub fn config(&self) -> &GridSnapConfig {
        &self.config
    }

    pub fn tracker(&self) -> &QuiescenceTracker<C> {
        &self.tracker
    }

    pub fn lattice(&self, origin: Vec3) -> GridLattice {
        GridLattice::new(origin, self.config.cell_size)
    }

    /// Runs one detection pass around `origin`.
    ///
    /// `pose_of` supplies the current pose of each overlapping collider; those
    /// without a pose are skipped for this step. Returned poses are already
    /// recorded as the colliders' last known positions.
    pub fn step<Q, F>(&mut self, query: &Q, origin: Vec3, mut pose_of: F) -> Vec<GridSnap<C>>
    where
        Q: SpatialQuery<Collider = C>,
        F: FnMut(C) -> Option<Pose>,
    {
        let lattice = self.lattice(origin);
        let half_extents = self.config.overlap_half_extents();
        let mut snaps = Vec::new();

        for collider in query.overlap_box(origin, half_extents, Quat::IDENTITY) {
            if !query.has_tag(collider, &self.config.target_tag) {
                continue;
            }
            let Some(pose) = pose_of(collider) else {
                continue;
            };
            if !self
                .tracker
                .is_stopped(collider, pose.position, query.linear_velocity(collider))
            {
                continue;
            }

            let snapped = lattice.snap_pose(pose);
            self.tracker.record(collider, snapped.position);
            snaps.push(GridSnap {
                collider,
                pose: snapped,
            });
        }

        snaps
    }
}
