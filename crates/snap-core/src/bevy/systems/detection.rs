//! Box-overlap collision reporting.
//!
//! Stands in for a physics backend's trigger and contact callbacks: trigger
//! volumes report `Stay` every step and `Exit` once, attach bodies report
//! `ContactBegan` when they start touching a solid collider.

use std::collections::HashSet;

use bevy::prelude::*;

use crate::bevy::components::{BoxCollider, SnapAttach, TriggerVolume};
use crate::bevy::events::{ContactBegan, TriggerEvent};
use crate::bevy::query::{SceneQuery, collider_box};
use crate::query::SpatialQuery;

/// Updates trigger occupancy and writes stay/exit reports.
pub fn detect_trigger_overlaps(
    scene: SceneQuery,
    mut triggers: Query<(Entity, &GlobalTransform, &BoxCollider, &mut TriggerVolume, Option<&ChildOf>)>,
    mut events: MessageWriter<TriggerEvent>,
) {
    for (trigger, transform, collider, mut volume, owner) in &mut triggers {
        let (scale, rotation, translation) = transform.to_scale_rotation_translation();
        let owner = owner.map(ChildOf::parent);

        let occupants: HashSet<Entity> = scene
            .overlap_box(translation, collider.half_extents * scale.abs(), rotation)
            .into_iter()
            .filter(|other| *other != trigger && Some(*other) != owner && !scene.is_trigger(*other))
            .collect();

        let mut inside: Vec<Entity> = occupants.iter().copied().collect();
        inside.sort_unstable();
        for other in inside {
            events.write(TriggerEvent::Stay { trigger, other });
        }
        for &other in volume.occupants.difference(&occupants) {
            tracing::trace!("[trigger] {other} left {trigger}");
            events.write(TriggerEvent::Exit { trigger, other });
        }
        volume.occupants = occupants;
    }
}

/// Writes `ContactBegan` for attach bodies that started touching a solid collider.
pub fn detect_attach_contacts(
    scene: SceneQuery,
    bodies: Query<(Entity, &GlobalTransform, &BoxCollider), With<SnapAttach>>,
    mut touching: Local<HashSet<(Entity, Entity)>>,
    mut contacts: MessageWriter<ContactBegan>,
) {
    let mut current = HashSet::new();

    for (entity, transform, collider) in &bodies {
        let own = collider_box(transform, collider);
        let center = own.center;

        for other in scene.overlap_box(center, own.half_extents, own.rotation) {
            if other == entity || scene.is_trigger(other) {
                continue;
            }
            let Some(other_box) = scene.shape(other) else {
                continue;
            };
            current.insert((entity, other));
            if touching.contains(&(entity, other)) {
                continue;
            }

            let point = other_box.closest_point(center);
            let normal = (point - center)
                .try_normalize()
                .or_else(|| (other_box.center - center).try_normalize())
                .unwrap_or(Vec3::NEG_Y);
            tracing::debug!("[contact] {entity} touched {other} at {point}");
            contacts.write(ContactBegan {
                entity,
                other,
                point,
                normal,
            });
        }
    }

    *touching = current;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bevy::components::SnapTag;
    use crate::bevy::test_utils::TestApp;
    use crate::config::AttachSnapConfig;

    fn spawn_trigger(app: &mut TestApp) -> Entity {
        app.world_mut()
            .spawn((
                Transform::default(),
                BoxCollider::cube(1.0),
                TriggerVolume::default(),
            ))
            .id()
    }

    #[test]
    fn test_stay_every_step_exit_once() {
        let mut app = TestApp::new();
        app.record::<TriggerEvent>();
        let trigger = spawn_trigger(&mut app);
        let body = app
            .world_mut()
            .spawn((Transform::from_xyz(0.5, 0.0, 0.0), BoxCollider::cube(0.2)))
            .id();
        app.update();

        app.step(3);
        let stay = TriggerEvent::Stay {
            trigger,
            other: body,
        };
        assert_eq!(app.recorded::<TriggerEvent>(), &[stay, stay, stay]);

        app.world_mut().get_mut::<Transform>(body).unwrap().translation = Vec3::new(10.0, 0.0, 0.0);
        app.update();
        app.step(2);
        let events = app.recorded::<TriggerEvent>();
        assert_eq!(events.len(), 4);
        assert_eq!(
            events[3],
            TriggerEvent::Exit {
                trigger,
                other: body
            }
        );
    }

    #[test]
    fn test_owner_and_other_triggers_not_reported() {
        let mut app = TestApp::new();
        app.record::<TriggerEvent>();
        let owner = app
            .world_mut()
            .spawn((Transform::default(), BoxCollider::cube(0.5)))
            .id();
        app.world_mut().spawn((
            Transform::default(),
            BoxCollider::cube(1.0),
            TriggerVolume::default(),
            ChildOf(owner),
        ));
        // Overlaps the child trigger but not the owner
        app.world_mut().spawn((
            Transform::from_xyz(1.8, 0.0, 0.0),
            BoxCollider::cube(1.0),
            TriggerVolume::default(),
        ));
        app.update();

        app.step(2);
        assert!(app.recorded::<TriggerEvent>().is_empty());
    }

    #[test]
    fn test_contact_began_once_per_touch() {
        let mut app = TestApp::new();
        app.record::<ContactBegan>();
        let floor = app
            .world_mut()
            .spawn((
                Transform::from_xyz(0.0, -0.5, 0.0),
                BoxCollider::new(Vec3::new(5.0, 0.5, 5.0)),
                SnapTag::new("Ground"),
            ))
            .id();
        let body = app
            .world_mut()
            .spawn((
                Transform::from_xyz(0.0, 0.4, 0.0),
                BoxCollider::cube(0.5),
                SnapAttach::new(AttachSnapConfig::default()),
            ))
            .id();
        app.update();

        app.step(3);
        let contacts = app.recorded::<ContactBegan>();
        assert_eq!(contacts.len(), 1);
        assert_eq!((contacts[0].entity, contacts[0].other), (body, floor));
        assert!(contacts[0].point.distance(Vec3::ZERO) < 1e-5);
        assert!(contacts[0].normal.distance(Vec3::NEG_Y) < 1e-5);
    }
}
