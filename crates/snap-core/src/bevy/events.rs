//! ECS messages for snapping.
//!
//! Collision input (`TriggerEvent`, `ContactBegan`) may come from the built-in
//! box detectors or from any physics backend writing the same messages.

use bevy::prelude::*;

use crate::layout::SnapSceneConfig;

/// Overlap report for a trigger volume.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerEvent {
    /// `other` is inside `trigger` this step. Sent every step while overlapping.
    Stay { trigger: Entity, other: Entity },
    /// `other` left `trigger` (or was despawned).
    Exit { trigger: Entity, other: Entity },
}

/// Two solid colliders started touching.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct ContactBegan {
    pub entity: Entity,
    pub other: Entity,
    /// Contact point in world space.
    pub point: Vec3,
    /// Unit normal pointing from `entity` toward `other`.
    pub normal: Vec3,
}

impl ContactBegan {
    /// Same contact seen from `other`.
    pub fn flipped(&self) -> Self {
        Self {
            entity: self.other,
            other: self.entity,
            point: self.point,
            normal: -self.normal,
        }
    }
}

/// A grid snapper moved `target` onto its lattice.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct GridSnapped {
    pub snapper: Entity,
    pub target: Entity,
    pub position: Vec3,
}

/// A zone snapper claimed `target`.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneClaimed {
    pub snapper: Entity,
    pub target: Entity,
}

/// Rotation correction finished; position convergence begins.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct ZoneRotationCorrected {
    pub snapper: Entity,
    pub target: Entity,
    pub rotation: Quat,
}

/// A zone snapper let go of `target`.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneReleased {
    pub snapper: Entity,
    pub target: Entity,
}

/// A surface snapper engaged or disengaged.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceContactChanged {
    pub entity: Entity,
    pub engaged: bool,
}

/// `entity` snapped onto `parent` and is now attached to it.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct AttachedToSurface {
    pub entity: Entity,
    pub parent: Entity,
    pub position: Vec3,
}

/// Request to replace the current scene.
#[derive(Message, Debug, Clone)]
pub struct LoadSceneEvent {
    pub config: SnapSceneConfig,
}

/// Fired after a scene has been spawned.
#[derive(Message, Debug, Clone)]
pub struct SceneLoadedEvent {
    pub scene_name: String,
    pub object_count: usize,
}
