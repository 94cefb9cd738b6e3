//! Scene description loaded from JSON.
//!
//! A scene is a flat list of objects. Each object may carry a box collider, a
//! tag, an initial velocity and any number of snap behaviours.

use std::path::Path;

use bevy::math::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::config::{AttachSnapConfig, ConfigError, GridSnapConfig, SurfaceSnapConfig, ZoneSnapConfig};
use crate::pose::{EULER_ORDER, Pose};

/// Pointer button that starts a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragButton {
    #[default]
    Left,
    Right,
    Middle,
}

/// Snap behaviour attached to a scene object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Behaviour {
    Grid(GridSnapConfig),
    Zone(ZoneSnapConfig),
    Surface(SurfaceSnapConfig),
    Attach(AttachSnapConfig),
    Draggable {
        #[serde(default)]
        button: DragButton,
    },
}

/// Anchor zone owned by a zone snapper, relative to the object position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorZoneConfig {
    #[serde(default)]
    pub offset: [f32; 3],
    pub half_extents: [f32; 3],
}

/// One object in the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub position: [f32; 3],
    /// Euler angles in degrees: x = pitch, y = yaw, z = roll.
    #[serde(default)]
    pub rotation: [f32; 3],
    /// Box collider half-extents. Objects without one are invisible to queries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub half_extents: Option<[f32; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity: Option<[f32; 3]>,
    #[serde(default)]
    pub trigger: bool,
    #[serde(default)]
    pub behaviours: Vec<Behaviour>,
    #[serde(default)]
    pub anchor_zones: Vec<AnchorZoneConfig>,
}

impl SceneObject {
    pub fn rotation(&self) -> Quat {
        let [pitch, yaw, roll] = self.rotation;
        Quat::from_euler(
            EULER_ORDER,
            yaw.to_radians(),
            pitch.to_radians(),
            roll.to_radians(),
        )
    }

    pub fn pose(&self) -> Pose {
        Pose::new(Vec3::from_array(self.position), self.rotation())
    }

    pub fn label(&self) -> &str {
        self.id.as_deref().unwrap_or("<unnamed>")
    }
}

/// Scene metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneMeta {
    pub name: String,
}

/// Complete scene description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapSceneConfig {
    pub meta: SceneMeta,
    pub objects: Vec<SceneObject>,
}

impl SnapSceneConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reads and parses a scene file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Looks up an object by id.
    pub fn object(&self, id: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|obj| obj.id.as_deref() == Some(id))
    }
}
