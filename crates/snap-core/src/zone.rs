//! Anchor-zone snapping: rotation correction first, then position convergence.
//!
//! State machine per snapper:
//! `Idle -> RotationCorrecting -> PositionConverging -> Idle (on exit)`.
//! Only one object is tracked at a time; the first claimant wins.

use bevy::math::{Quat, Vec3};

use crate::config::ZoneSnapConfig;
use crate::pose::{Pose, angle_between_degrees, approach, round_rotation_to_right_angles};

/// Axis-aligned anchor volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorZone {
    pub center: Vec3,
    pub half_extents: Vec3,
}

impl AnchorZone {
    pub fn new(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            center,
            half_extents,
        }
    }

    pub fn contains(&self, point: Vec3) -> bool {
        let local = (point - self.center).abs();
        local.cmple(self.half_extents.abs()).all()
    }
}

/// Result of advancing a cross-step task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Running,
    Done,
}

/// Interpolates a rotation toward its right-angle rounding over several steps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationCorrection {
    initial: Quat,
    target: Quat,
    elapsed: f32,
    speed: f32,
    epsilon: f32,
}

impl RotationCorrection {
    /// Starts a correction from `current`, `speed` in progress per second.
    pub fn new(current: Quat, speed: f32, epsilon_degrees: f32) -> Self {
        Self {
            initial: current,
            target: round_rotation_to_right_angles(current),
            elapsed: 0.0,
            speed,
            epsilon: epsilon_degrees,
        }
    }

    pub fn target(&self) -> Quat {
        self.target
    }

    /// Progress in [0, 1].
    pub fn progress(&self) -> f32 {
        self.elapsed.min(1.0)
    }

    /// Advances by `dt` and writes the interpolated rotation into `rotation`.
    ///
    /// Once within epsilon of the target the rotation is set exactly.
    pub fn advance(&mut self, rotation: &mut Quat, dt: f32) -> Progress {
        self.elapsed += dt * self.speed;
        *rotation = self.initial.slerp(self.target, self.progress());
        if angle_between_degrees(*rotation, self.target) <= self.epsilon {
            *rotation = self.target;
            Progress::Done
        } else {
            Progress::Running
        }
    }
}

/// Observable phase of a [`ZoneSnapper`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZonePhase {
    Idle,
    RotationCorrecting,
    PositionConverging,
}

/// Transition reported by [`ZoneSnapper::step`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ZoneStep {
    /// Rotation correction finished; position convergence starts next step.
    RotationCorrected { rotation: Quat },
}

#[derive(Debug, Clone, Copy)]
struct ActiveSnap<C> {
    target: C,
    correction: Option<RotationCorrection>,
    zone_center: Vec3,
}

/// Zone snapper state for one set of anchor zones.
#[derive(Debug, Clone)]
pub struct ZoneSnapper<C> {
    config: ZoneSnapConfig,
    zones: Vec<AnchorZone>,
    initialized: bool,
    active: Option<ActiveSnap<C>>,
}

impl<C: Copy + Eq> ZoneSnapper<C> {
    pub fn new(config: ZoneSnapConfig) -> Self {
        Self {
            config: config.sanitized(),
            zones: Vec::new(),
            initialized: false,
            active: None,
        }
    }

    /// Snapper with its zones already known.
    pub fn with_zones(config: ZoneSnapConfig, zones: Vec<AnchorZone>) -> Self {
        let mut snapper = Self::new(config);
        snapper.install_zones(zones);
        snapper
    }

    pub fn config(&self) -> &ZoneSnapConfig {
        &self.config
    }

    /// Installs the static zone list. Later calls are ignored.
    pub fn install_zones(&mut self, zones: Vec<AnchorZone>) -> bool {
        if self.initialized {
            return false;
        }
        self.zones = zones;
        self.initialized = true;
        true
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn zones(&self) -> &[AnchorZone] {
        &self.zones
    }

    pub fn target(&self) -> Option<C> {
        self.active.map(|active| active.target)
    }

    /// Center of the zone the tracked object currently converges to.
    pub fn zone_center(&self) -> Option<Vec3> {
        self.active.map(|active| active.zone_center)
    }

    pub fn phase(&self) -> ZonePhase {
        match self.active {
            None => ZonePhase::Idle,
            Some(ActiveSnap {
                correction: Some(_), ..
            }) => ZonePhase::RotationCorrecting,
            Some(_) => ZonePhase::PositionConverging,
        }
    }

    /// Zone with the closest center to `position`.
    pub fn nearest_zone(&self, position: Vec3) -> Option<&AnchorZone> {
        self.zones.iter().min_by(|a, b| {
            a.center
                .distance_squared(position)
                .total_cmp(&b.center.distance_squared(position))
        })
    }

    /// A tagged collider is inside the trigger volume.
    ///
    /// Claims it and starts rotation correction when idle. Returns `true` on claim.
    pub fn on_stay(&mut self, collider: C, pose: Pose) -> bool {
        if self.active.is_some() {
            return false;
        }
        let Some(zone) = self.nearest_zone(pose.position) else {
            return false;
        };
        self.active = Some(ActiveSnap {
            target: collider,
            correction: Some(RotationCorrection::new(
                pose.rotation,
                self.config.rotation_speed,
                self.config.angle_epsilon,
            )),
            zone_center: zone.center,
        });
        true
    }

    /// A collider left the trigger volume. Returns `true` if it was the tracked one.
    ///
    /// Any running rotation correction is dropped where it stands.
    pub fn on_exit(&mut self, collider: C) -> bool {
        if self.target() != Some(collider) {
            return false;
        }
        self.active = None;
        true
    }

    /// Advances the tracked object's pose by one step.
    pub fn step(&mut self, pose: &mut Pose, dt: f32) -> Option<ZoneStep> {
        let center = self.nearest_zone(pose.position)?.center;
        let snap_speed = self.config.snap_speed;
        let active = self.active.as_mut()?;
        active.zone_center = center;

        match active.correction.as_mut() {
            Some(correction) => match correction.advance(&mut pose.rotation, dt) {
                Progress::Running => None,
                Progress::Done => {
                    active.correction = None;
                    Some(ZoneStep::RotationCorrected {
                        rotation: pose.rotation,
                    })
                }
            },
            None => {
                pose.position = approach(pose.position, center, snap_speed * dt);
                None
            }
        }
    }
}
