//! Pointer dragging.
//!
//! `update_pointer_ray` turns the cursor into a world ray (needs a window and a
//! camera); `drag_entities` only reads the resulting [`PointerRay`], so it also
//! runs headless.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::bevy::components::{Draggable, SnapCamera};
use crate::bevy::query::SceneQuery;
use crate::drag::ViewFrame;
use crate::query::SpatialQuery;

/// Current pointer ray and the view it was cast from.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct PointerRay {
    pub ray: Option<(Ray3d, ViewFrame)>,
}

impl PointerRay {
    pub fn new(ray: Ray3d, view: ViewFrame) -> Self {
        Self {
            ray: Some((ray, view)),
        }
    }
}

/// Casts the cursor through the [`SnapCamera`].
pub fn update_pointer_ray(
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<SnapCamera>>,
    mut pointer: ResMut<PointerRay>,
) {
    let Ok(window) = windows.single() else {
        pointer.ray = None;
        return;
    };
    let Ok((camera, camera_transform)) = cameras.single() else {
        pointer.ray = None;
        return;
    };

    pointer.ray = window.cursor_position().and_then(|cursor| {
        let ray = camera.viewport_to_world(camera_transform, cursor).ok()?;
        let view = ViewFrame::new(camera_transform.translation(), camera_transform.forward());
        Some((ray, view))
    });
}

/// Starts, updates and ends drags of [`Draggable`] entities.
///
/// Drags work in world space; attached entities are moved through their
/// parent's frame.
pub fn drag_entities(
    buttons: Res<ButtonInput<MouseButton>>,
    pointer: Res<PointerRay>,
    scene: SceneQuery,
    mut draggables: Query<(
        Entity,
        &mut Draggable,
        &mut Transform,
        &GlobalTransform,
        Option<&ChildOf>,
    )>,
    globals: Query<&GlobalTransform>,
) {
    for (entity, mut draggable, mut transform, global, child_of) in &mut draggables {
        let button = draggable.button;

        if buttons.just_released(button) && draggable.positioner.release() {
            tracing::info!("[drag] Released {entity} at {}", global.translation());
            continue;
        }

        let Some((ray, view)) = pointer.ray else {
            continue;
        };

        if buttons.just_pressed(button) {
            let first_hit = scene
                .raycast(ray.origin, ray.direction, f32::MAX, None)
                .map(|hit| hit.collider);
            if draggable
                .positioner
                .press(ray, view, first_hit == Some(entity), global.translation())
            {
                tracing::info!("[drag] Picked up {entity}");
            }
        } else if buttons.pressed(button) {
            let Some(world) = draggable.positioner.drag(ray, view) else {
                continue;
            };
            transform.translation = match child_of {
                Some(child_of) => match globals.get(child_of.parent()) {
                    Ok(parent) => parent.affine().inverse().transform_point3(world),
                    Err(_) => continue,
                },
                None => world,
            };
        }
    }
}
