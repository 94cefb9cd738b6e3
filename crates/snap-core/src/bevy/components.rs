//! ECS components for snapping entities.
//!
//! Collision data (`BoxCollider`, `SnapTag`, `LinearVelocity`) is read through
//! [`crate::bevy::SceneQuery`]; strategy components wrap the plain snappers.

use std::collections::HashSet;

use bevy::prelude::*;

use crate::attach::CollisionSnapper;
use crate::config::{AttachSnapConfig, GridSnapConfig, SurfaceSnapConfig, ZoneSnapConfig};
use crate::drag::DragPositioner;
use crate::grid::GridSnapper;
use crate::layout::DragButton;
use crate::surface::SurfaceSnapper;
use crate::zone::ZoneSnapper;

/// Tag string used by snappers to filter targets.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct SnapTag(pub String);

impl SnapTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn is(&self, tag: &str) -> bool {
        self.0 == tag
    }
}

/// Box collider in the entity's local frame.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct BoxCollider {
    pub half_extents: Vec3,
}

impl BoxCollider {
    pub fn new(half_extents: Vec3) -> Self {
        Self { half_extents }
    }

    pub fn cube(half_size: f32) -> Self {
        Self::new(Vec3::splat(half_size))
    }
}

/// Linear velocity reported by the physics backend.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct LinearVelocity(pub Vec3);

/// Body no longer driven by physics.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Kinematic;

/// Trigger collider. Reports overlaps, never blocks rays.
#[derive(Component, Debug, Clone, Default)]
pub struct TriggerVolume {
    /// Entities overlapping during the last detection pass.
    pub occupants: HashSet<Entity>,
}

/// Anchor zone child of a [`SnapZone`] entity.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct AnchorZone;

/// Grid snapper centered on this entity.
#[derive(Component, Debug, Clone)]
pub struct SnapGrid {
    pub snapper: GridSnapper<Entity>,
}

impl SnapGrid {
    pub fn new(config: GridSnapConfig) -> Self {
        Self {
            snapper: GridSnapper::new(config),
        }
    }
}

/// Zone snapper owning the [`AnchorZone`] children of this entity.
#[derive(Component, Debug, Clone)]
pub struct SnapZone {
    pub snapper: ZoneSnapper<Entity>,
}

impl SnapZone {
    pub fn new(config: ZoneSnapConfig) -> Self {
        Self {
            snapper: ZoneSnapper::new(config),
        }
    }
}

/// Surface snapper for this entity's [`BoxCollider`].
#[derive(Component, Debug, Clone)]
pub struct SnapSurface {
    pub snapper: SurfaceSnapper,
}

impl SnapSurface {
    pub fn new(config: SurfaceSnapConfig) -> Self {
        Self {
            snapper: SurfaceSnapper::new(config),
        }
    }
}

/// Snap-and-attach on the first tagged contact.
#[derive(Component, Debug, Clone)]
pub struct SnapAttach {
    pub snapper: CollisionSnapper,
}

impl SnapAttach {
    pub fn new(config: AttachSnapConfig) -> Self {
        Self {
            snapper: CollisionSnapper::new(config),
        }
    }
}

/// Entity that follows the pointer while `button` is held.
#[derive(Component, Debug, Clone)]
pub struct Draggable {
    pub button: MouseButton,
    pub positioner: DragPositioner,
}

impl Default for Draggable {
    fn default() -> Self {
        Self::new(MouseButton::Left)
    }
}

impl Draggable {
    pub fn new(button: MouseButton) -> Self {
        Self {
            button,
            positioner: DragPositioner::new(),
        }
    }
}

impl From<DragButton> for MouseButton {
    fn from(button: DragButton) -> Self {
        match button {
            DragButton::Left => MouseButton::Left,
            DragButton::Right => MouseButton::Right,
            DragButton::Middle => MouseButton::Middle,
        }
    }
}

/// Camera used to build pointer rays.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct SnapCamera;

/// Marker for entities spawned from a scene description.
#[derive(Component, Debug, Clone)]
pub struct SceneObjectMarker {
    pub object_id: Option<String>,
}
