//! Per-strategy snap configuration.
//!
//! Every config deserializes with defaults for missing fields and exposes a
//! `sanitized()` step that clamps out-of-range values instead of rejecting them.

use bevy::math::Vec3;
use serde::{Deserialize, Serialize};

/// Smallest supported grid cell size.
pub const MIN_CELL_SIZE: f32 = 0.08;
/// Largest supported grid cell size.
pub const MAX_CELL_SIZE: f32 = 1.0;

/// Error type for scene/config loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid scene description: {0}")]
    Parse(#[from] serde_json::Error),
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() { value } else { fallback }
}

fn non_negative(value: f32, fallback: f32) -> f32 {
    finite_or(value, fallback).max(0.0)
}

/// How the grid snapper decides that a body has come to rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuiescenceMode {
    /// `|velocity| <= stop_threshold`; bodies without a velocity never count as stopped.
    #[default]
    Velocity,
    /// Moved less than `stop_threshold` since the previous step.
    Displacement,
}

/// Grid snapper settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSnapConfig {
    /// Lattice spacing, shared by all three axes.
    pub cell_size: f32,
    pub target_tag: String,
    /// Full size of the overlap box centered on the snapper.
    pub overlap_box_size: [f32; 3],
    pub stop_threshold: f32,
    pub quiescence: QuiescenceMode,
}

impl Default for GridSnapConfig {
    fn default() -> Self {
        Self {
            cell_size: 1.0,
            target_tag: "Snappable".to_string(),
            overlap_box_size: [5.0, 5.0, 5.0],
            stop_threshold: 0.1,
            quiescence: QuiescenceMode::Velocity,
        }
    }
}

impl GridSnapConfig {
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        self.cell_size = finite_or(self.cell_size, defaults.cell_size).clamp(MIN_CELL_SIZE, MAX_CELL_SIZE);
        for (axis, fallback) in self.overlap_box_size.iter_mut().zip(defaults.overlap_box_size) {
            *axis = finite_or(*axis, fallback).abs();
        }
        self.stop_threshold = non_negative(self.stop_threshold, defaults.stop_threshold);
        self
    }

    /// Half-extents of the overlap query box.
    pub fn overlap_half_extents(&self) -> Vec3 {
        Vec3::from_array(self.overlap_box_size) * 0.5
    }
}

/// Zone snapper settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneSnapConfig {
    pub target_tag: String,
    /// Position convergence speed toward the zone center (per second).
    pub snap_speed: f32,
    /// Rotation correction progress per second (1.0 = one second for the full turn).
    pub rotation_speed: f32,
    /// Rotation correction completes below this angular difference (degrees).
    pub angle_epsilon: f32,
}

impl Default for ZoneSnapConfig {
    fn default() -> Self {
        Self {
            target_tag: "SnapObject".to_string(),
            snap_speed: 5.0,
            rotation_speed: 2.0,
            angle_epsilon: 0.1,
        }
    }
}

impl ZoneSnapConfig {
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        self.snap_speed = non_negative(self.snap_speed, defaults.snap_speed);
        self.rotation_speed = non_negative(self.rotation_speed, defaults.rotation_speed);
        self.angle_epsilon = non_negative(self.angle_epsilon, defaults.angle_epsilon);
        self
    }
}

/// Where the surface snapper casts its rays from on each face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaySampling {
    /// Four rays per face, one from each corner.
    #[default]
    Corners,
    /// One ray per face from the face center.
    FaceCenter,
}

/// Surface snapper settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceSnapConfig {
    pub target_tag: String,
    /// Extra ray length beyond the half-extent magnitude.
    pub snap_threshold: f32,
    /// Outward offset of ray origins, keeps rays from starting inside the own box.
    pub corner_offset: f32,
    /// Maximum deviation (degrees) at which rotation alignment is still applied.
    pub rotation_tolerance: f32,
    /// Convergence rate toward the surface pose (per second).
    pub convergence_rate: f32,
    pub sampling: RaySampling,
}

impl Default for SurfaceSnapConfig {
    fn default() -> Self {
        Self {
            target_tag: "SnapObject".to_string(),
            snap_threshold: 0.1,
            corner_offset: 0.05,
            rotation_tolerance: 5.0,
            convergence_rate: 20.0,
            sampling: RaySampling::Corners,
        }
    }
}

impl SurfaceSnapConfig {
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        self.snap_threshold = non_negative(self.snap_threshold, defaults.snap_threshold);
        self.corner_offset = non_negative(self.corner_offset, defaults.corner_offset);
        self.rotation_tolerance =
            non_negative(self.rotation_tolerance, defaults.rotation_tolerance).min(180.0);
        self.convergence_rate = non_negative(self.convergence_rate, defaults.convergence_rate);
        self
    }
}

/// Collision snap-and-attach settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttachSnapConfig {
    pub target_tag: String,
    /// Only snap on the first tagged contact.
    pub snap_once: bool,
    /// Distance the body is backed off the contact point along the normal.
    pub snap_offset: f32,
}

impl Default for AttachSnapConfig {
    fn default() -> Self {
        Self {
            target_tag: "SnapObject".to_string(),
            snap_once: true,
            snap_offset: 0.5,
        }
    }
}

impl AttachSnapConfig {
    pub fn sanitized(mut self) -> Self {
        self.snap_offset = finite_or(self.snap_offset, Self::default().snap_offset);
        self
    }
}
