//! Bevy ECS integration.
//!
//! Wraps the plain snappers in components, feeds them collision reports as
//! messages and writes the resulting poses back into `Transform`s. All snap
//! strategies run in `FixedUpdate`; dragging runs every frame.

pub mod components;
pub mod events;
pub mod plugin;
pub mod query;
pub mod systems;

#[cfg(test)]
pub(crate) mod test_utils;

pub use components::*;
pub use events::*;
pub use plugin::{SnapCorePlugin, SnapPointerPlugin, SnapSet};
pub use query::{SceneQuery, collider_box};
pub use systems::{PointerRay, SceneEntityMap};
