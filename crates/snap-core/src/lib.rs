//! Snap Core Library
//!
//! Snapping strategies for rigid bodies: grid lattice snapping, anchor zone
//! docking, surface alignment and collision attach, plus view-plane dragging.
//!
//! The strategies are plain state machines driven through the [`SpatialQuery`]
//! trait. They can be used on their own (see [`scene::ColliderSet`]) or through
//! the Bevy ECS integration in [`bevy`].

#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

// Strategies and geometry
pub mod attach;
pub mod config;
pub mod drag;
pub mod grid;
pub mod layout;
pub mod pose;
pub mod query;
pub mod scene;
pub mod shape;
pub mod surface;
pub mod zone;

// Bevy integration
pub mod bevy;

/// Fixed timestep of the snap systems (seconds).
pub const SNAP_DT: f32 = 1.0 / 60.0;

pub use attach::CollisionSnapper;
pub use config::{
    AttachSnapConfig, ConfigError, GridSnapConfig, QuiescenceMode, RaySampling, SurfaceSnapConfig,
    ZoneSnapConfig,
};
pub use drag::{DragPositioner, ViewFrame};
pub use grid::{GridLattice, GridSnap, GridSnapper, QuiescenceTracker};
pub use layout::{AnchorZoneConfig, Behaviour, DragButton, SceneMeta, SceneObject, SnapSceneConfig};
pub use pose::Pose;
pub use query::{RayHit, SpatialQuery};
pub use scene::{ColliderEntry, ColliderId, ColliderSet};
pub use shape::{BoxRayHit, OrientedBox};
pub use surface::{FaceDirection, FaceHit, SurfaceSnapper, SurfaceTransition, SweepReport};
pub use zone::{AnchorZone, Progress, RotationCorrection, ZonePhase, ZoneSnapper, ZoneStep};
