//! Zone snapping systems.
//!
//! Anchor zones are `AnchorZone` children of a `SnapZone` entity. Their world
//! boxes are cached once, after the first transform propagation.

use bevy::prelude::*;

use crate::bevy::components::{AnchorZone, BoxCollider, SnapTag, SnapZone};
use crate::bevy::events::{TriggerEvent, ZoneClaimed, ZoneReleased, ZoneRotationCorrected};
use crate::pose::Pose;
use crate::zone::{AnchorZone as AnchorBounds, ZoneStep};

/// Caches the anchor zones of snappers that have not been initialized yet.
///
/// Runs after transform propagation so child positions are final.
pub fn discover_anchor_zones(
    mut snappers: Query<(Entity, &mut SnapZone, Option<&Children>)>,
    zones: Query<(&GlobalTransform, &BoxCollider), With<AnchorZone>>,
) {
    for (entity, mut zone, children) in &mut snappers {
        if zone.snapper.is_initialized() {
            continue;
        }
        let bounds: Vec<AnchorBounds> = children
            .into_iter()
            .flatten()
            .filter_map(|child| zones.get(*child).ok())
            .map(|(transform, collider)| {
                let (scale, _, translation) = transform.to_scale_rotation_translation();
                AnchorBounds::new(translation, collider.half_extents * scale.abs())
            })
            .collect();

        if bounds.is_empty() {
            tracing::warn!("[zone] Snapper {entity} has no anchor zones; it will never snap");
        } else {
            tracing::info!("[zone] Snapper {entity} found {} anchor zones", bounds.len());
        }
        zone.snapper.install_zones(bounds);
    }
}

/// Feeds trigger reports of anchor zones into their owning snappers.
pub fn handle_zone_triggers(
    mut triggers: MessageReader<TriggerEvent>,
    anchors: Query<&ChildOf, With<AnchorZone>>,
    mut snappers: Query<&mut SnapZone>,
    bodies: Query<(&Transform, Option<&SnapTag>)>,
    mut claimed: MessageWriter<ZoneClaimed>,
    mut released: MessageWriter<ZoneReleased>,
) {
    for event in triggers.read() {
        let (TriggerEvent::Stay { trigger, other } | TriggerEvent::Exit { trigger, other }) = *event;
        let Ok(owner) = anchors.get(trigger).map(ChildOf::parent) else {
            continue;
        };
        let Ok(mut zone) = snappers.get_mut(owner) else {
            continue;
        };

        match event {
            TriggerEvent::Stay { .. } => {
                if zone.snapper.target().is_some() {
                    continue;
                }
                let Ok((transform, tag)) = bodies.get(other) else {
                    continue;
                };
                if !tag.is_some_and(|tag| tag.is(&zone.snapper.config().target_tag)) {
                    continue;
                }
                if zone.snapper.on_stay(other, Pose::from(transform)) {
                    tracing::info!("[zone] Snapper {owner} claimed {other}");
                    claimed.write(ZoneClaimed {
                        snapper: owner,
                        target: other,
                    });
                }
            }
            TriggerEvent::Exit { .. } => {
                if zone.snapper.on_exit(other) {
                    tracing::info!("[zone] Snapper {owner} released {other}");
                    released.write(ZoneReleased {
                        snapper: owner,
                        target: other,
                    });
                }
            }
        }
    }
}

/// Advances rotation correction or position convergence of every claimed body.
pub fn advance_zone_snappers(
    time: Res<Time>,
    mut snappers: Query<(Entity, &mut SnapZone)>,
    mut bodies: Query<&mut Transform, Without<ChildOf>>,
    mut corrected: MessageWriter<ZoneRotationCorrected>,
    mut released: MessageWriter<ZoneReleased>,
) {
    let dt = time.delta_secs();
    for (snapper, mut zone) in &mut snappers {
        let Some(target) = zone.snapper.target() else {
            continue;
        };
        let Ok(mut transform) = bodies.get_mut(target) else {
            // Target despawned or attached elsewhere
            zone.snapper.on_exit(target);
            tracing::info!("[zone] Snapper {snapper} lost {target}");
            released.write(ZoneReleased { snapper, target });
            continue;
        };

        let mut pose = Pose::from(&*transform);
        let step = zone.snapper.step(&mut pose, dt);
        if pose.write_to(transform.bypass_change_detection()) {
            transform.set_changed();
        }

        if let Some(ZoneStep::RotationCorrected { rotation }) = step {
            tracing::info!("[zone] Rotation of {target} corrected, converging to zone center");
            corrected.write(ZoneRotationCorrected {
                snapper,
                target,
                rotation,
            });
        }
    }
}
