//! Grid snapping system.

use bevy::prelude::*;

use crate::bevy::components::SnapGrid;
use crate::bevy::events::GridSnapped;
use crate::bevy::query::SceneQuery;
use crate::pose::Pose;

/// Snaps settled tagged bodies around every grid snapper onto its lattice.
///
/// Only root bodies are moved; attached children follow their parent.
pub fn snap_bodies_to_grid(
    scene: SceneQuery,
    mut snappers: Query<(Entity, &GlobalTransform, &mut SnapGrid)>,
    mut bodies: Query<&mut Transform, Without<ChildOf>>,
    mut snapped: MessageWriter<GridSnapped>,
) {
    for (snapper, origin, mut grid) in &mut snappers {
        let snaps = grid
            .snapper
            .step(&scene, origin.translation(), |entity| bodies.get(entity).ok().map(Pose::from));

        for snap in snaps {
            let Ok(mut transform) = bodies.get_mut(snap.collider) else {
                continue;
            };
            if snap.pose.write_to(transform.bypass_change_detection()) {
                transform.set_changed();
                tracing::info!(
                    "[grid] Snapped {} to {} (snapper {})",
                    snap.collider,
                    snap.pose.position,
                    snapper
                );
                snapped.write(GridSnapped {
                    snapper,
                    target: snap.collider,
                    position: snap.pose.position,
                });
            }
        }
    }
}
