//! One-shot snap on the first tagged contact.

use bevy::math::{Quat, Vec3};

use crate::config::AttachSnapConfig;
use crate::pose::{Pose, facing_rotation};

/// Collision snap-and-attach state for one body.
#[derive(Debug, Clone)]
pub struct CollisionSnapper {
    config: AttachSnapConfig,
    has_snapped: bool,
}

impl CollisionSnapper {
    pub fn new(config: AttachSnapConfig) -> Self {
        Self {
            config: config.sanitized(),
            has_snapped: false,
        }
    }

    pub fn config(&self) -> &AttachSnapConfig {
        &self.config
    }

    pub fn has_snapped(&self) -> bool {
        self.has_snapped
    }

    /// Whether a new contact can still produce a snap.
    pub fn is_armed(&self) -> bool {
        !(self.config.snap_once && self.has_snapped)
    }

    /// Handles the start of a contact.
    ///
    /// `normal` points from this body toward the contacted one. Returns the
    /// snapped pose, or `None` when the contact is ignored.
    pub fn on_contact(&mut self, point: Vec3, normal: Vec3, other_tagged: bool, rotation: Quat) -> Option<Pose> {
        if !self.is_armed() || !other_tagged {
            return None;
        }
        let normal = normal.try_normalize().unwrap_or(Vec3::ZERO);
        let position = point - normal * self.config.snap_offset;
        let rotation = facing_rotation(-normal).unwrap_or(rotation);

        self.has_snapped = true;
        Some(Pose::new(position, rotation))
    }

    /// Re-arms a `snap_once` snapper.
    pub fn reset(&mut self) {
        self.has_snapped = false;
    }
}
