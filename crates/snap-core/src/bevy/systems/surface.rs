//! Surface snapping system.

use bevy::prelude::*;

use crate::bevy::components::{BoxCollider, SnapSurface};
use crate::bevy::events::SurfaceContactChanged;
use crate::bevy::query::SceneQuery;
use crate::pose::Pose;
use crate::surface::SurfaceTransition;

/// Sweeps the faces of every surface snapper and moves it toward touched surfaces.
pub fn sweep_surface_snappers(
    time: Res<Time>,
    scene: SceneQuery,
    mut snappers: Query<(Entity, &mut SnapSurface, &mut Transform, &BoxCollider), Without<ChildOf>>,
    mut changed: MessageWriter<SurfaceContactChanged>,
) {
    let dt = time.delta_secs();
    for (entity, mut surface, mut transform, collider) in &mut snappers {
        let half_extents = collider.half_extents * transform.scale.abs();
        let mut pose = Pose::from(&*transform);

        let report = surface
            .snapper
            .sweep(&scene, Some(entity), &mut pose, half_extents, dt);

        if pose.write_to(transform.bypass_change_detection()) {
            transform.set_changed();
        }
        for hit in &report.hits {
            tracing::trace!("[surface] {entity} face {:?} hit {}", hit.face, hit.collider);
        }

        match report.transition {
            Some(SurfaceTransition::Engaged) => {
                tracing::info!("[surface] {entity} engaged ({} faces touching)", report.hits.len());
                changed.write(SurfaceContactChanged {
                    entity,
                    engaged: true,
                });
            }
            Some(SurfaceTransition::Disengaged) => {
                tracing::info!("[surface] {entity} disengaged");
                changed.write(SurfaceContactChanged {
                    entity,
                    engaged: false,
                });
            }
            None => {}
        }
    }
}
