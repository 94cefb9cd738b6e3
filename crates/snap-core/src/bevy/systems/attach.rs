//! Collision snap-and-attach system.

use std::collections::{HashMap, HashSet};

use bevy::prelude::*;

use crate::bevy::components::{Kinematic, LinearVelocity, SnapAttach, SnapTag};
use crate::bevy::events::{AttachedToSurface, ContactBegan};

/// Whether parenting `child` under `parent` would close a loop in the hierarchy.
///
/// Walks up from `parent`, preferring parents assigned earlier in the same pass.
fn creates_cycle(
    child: Entity,
    parent: Entity,
    parents: &Query<&ChildOf>,
    pending: &HashMap<Entity, Entity>,
) -> bool {
    let mut visited = HashSet::new();
    let mut current = Some(parent);
    while let Some(entity) = current {
        if entity == child || !visited.insert(entity) {
            return true;
        }
        current = pending
            .get(&entity)
            .copied()
            .or_else(|| parents.get(entity).ok().map(ChildOf::parent));
    }
    false
}

/// Snaps attach bodies onto the first tagged body they touch and parents them to it.
///
/// Contacts are checked in both orders, so a backend may report either body first.
/// An attach that would make a body its own ancestor is skipped.
pub fn handle_collision_attach(
    mut commands: Commands,
    mut contacts: MessageReader<ContactBegan>,
    mut snappers: Query<(&mut SnapAttach, &mut Transform, Option<&mut LinearVelocity>)>,
    tags: Query<&SnapTag>,
    globals: Query<&GlobalTransform>,
    parents: Query<&ChildOf>,
    mut attached: MessageWriter<AttachedToSurface>,
) {
    let mut pending: HashMap<Entity, Entity> = HashMap::new();

    for event in contacts.read() {
        for contact in [*event, event.flipped()] {
            let Ok((mut attach, mut transform, velocity)) = snappers.get_mut(contact.entity) else {
                continue;
            };
            if creates_cycle(contact.entity, contact.other, &parents, &pending) {
                tracing::debug!(
                    "[attach] {} not attached to its own descendant {}",
                    contact.entity,
                    contact.other
                );
                continue;
            }
            let other_tagged = tags
                .get(contact.other)
                .is_ok_and(|tag| tag.is(&attach.snapper.config().target_tag));
            let Ok(parent_global) = globals.get(contact.other) else {
                continue;
            };

            let Some(pose) =
                attach
                    .snapper
                    .on_contact(contact.point, contact.normal, other_tagged, transform.rotation)
            else {
                continue;
            };

            let world = GlobalTransform::from(Transform {
                translation: pose.position,
                rotation: pose.rotation,
                scale: transform.scale,
            });
            *transform = world.reparented_to(parent_global);
            if let Some(mut velocity) = velocity {
                velocity.0 = Vec3::ZERO;
            }
            commands
                .entity(contact.entity)
                .insert((ChildOf(contact.other), Kinematic));
            pending.insert(contact.entity, contact.other);

            tracing::info!(
                "[attach] {} snapped to {} at {}",
                contact.entity,
                contact.other,
                pose.position
            );
            attached.write(AttachedToSurface {
                entity: contact.entity,
                parent: contact.other,
                position: pose.position,
            });
        }
    }
}
