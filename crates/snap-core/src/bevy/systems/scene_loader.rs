//! Scene loading systems.
//!
//! Spawns scene objects, their colliders, snap behaviours and anchor zones.

use std::collections::HashMap;

use bevy::prelude::*;

use crate::bevy::components::{
    AnchorZone, BoxCollider, Draggable, LinearVelocity, SceneObjectMarker, SnapAttach, SnapGrid,
    SnapSurface, SnapTag, SnapZone, TriggerVolume,
};
use crate::bevy::events::{LoadSceneEvent, SceneLoadedEvent};
use crate::layout::{Behaviour, SceneObject};

/// Entities of the loaded scene, by object id and by index.
#[derive(Resource, Debug, Default)]
pub struct SceneEntityMap {
    pub by_id: HashMap<String, Entity>,
    pub by_index: Vec<Entity>,
}

impl SceneEntityMap {
    pub fn clear(&mut self) {
        self.by_id.clear();
        self.by_index.clear();
    }

    pub fn get(&self, id: &str) -> Option<Entity> {
        self.by_id.get(id).copied()
    }
}

/// Replaces the current scene with the requested one.
pub fn handle_load_scene(
    mut commands: Commands,
    mut requests: MessageReader<LoadSceneEvent>,
    mut loaded: MessageWriter<SceneLoadedEvent>,
    mut entity_map: ResMut<SceneEntityMap>,
    existing: Query<Entity, With<SceneObjectMarker>>,
) {
    for request in requests.read() {
        for entity in &existing {
            commands.entity(entity).despawn();
        }
        entity_map.clear();

        let config = &request.config;
        for object in &config.objects {
            let entity = spawn_object(&mut commands, object);
            entity_map.by_index.push(entity);
            if let Some(id) = &object.id {
                entity_map.by_id.insert(id.clone(), entity);
            }
        }

        tracing::info!(
            "[scene] Loaded '{}' with {} objects",
            config.meta.name,
            config.objects.len()
        );
        loaded.write(SceneLoadedEvent {
            scene_name: config.meta.name.clone(),
            object_count: config.objects.len(),
        });
    }
}

fn spawn_object(commands: &mut Commands, object: &SceneObject) -> Entity {
    let pose = object.pose();
    let mut entity = commands.spawn((
        SceneObjectMarker {
            object_id: object.id.clone(),
        },
        Transform::from_translation(pose.position).with_rotation(pose.rotation),
    ));

    if let Some(half_extents) = object.half_extents {
        entity.insert(BoxCollider::new(Vec3::from_array(half_extents)));
        if object.trigger {
            entity.insert(TriggerVolume::default());
        }
    }
    if let Some(tag) = &object.tag {
        entity.insert(SnapTag::new(tag.clone()));
    }
    if let Some(velocity) = object.velocity {
        entity.insert(LinearVelocity(Vec3::from_array(velocity)));
    }

    for behaviour in &object.behaviours {
        match behaviour {
            Behaviour::Grid(config) => {
                entity.insert(SnapGrid::new(config.clone()));
            }
            Behaviour::Zone(config) => {
                entity.insert(SnapZone::new(config.clone()));
            }
            Behaviour::Surface(config) => {
                entity.insert(SnapSurface::new(config.clone()));
            }
            Behaviour::Attach(config) => {
                entity.insert(SnapAttach::new(config.clone()));
            }
            Behaviour::Draggable { button } => {
                entity.insert(Draggable::new((*button).into()));
            }
        }
    }

    let parent = entity.id();
    for zone in &object.anchor_zones {
        commands.spawn((
            AnchorZone,
            BoxCollider::new(Vec3::from_array(zone.half_extents)),
            TriggerVolume::default(),
            Transform::from_translation(Vec3::from_array(zone.offset)),
            ChildOf(parent),
        ));
    }

    tracing::debug!(
        "[scene] Spawned {} ({} behaviours, {} anchor zones)",
        object.label(),
        object.behaviours.len(),
        object.anchor_zones.len()
    );
    parent
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bevy::test_utils::TestApp;
    use crate::layout::SnapSceneConfig;

    const WORKBENCH: &str = r#"{
        "meta": { "name": "workbench" },
        "objects": [
            {
                "id": "floor",
                "position": [0, -1.5, 0],
                "half_extents": [5, 0.5, 5],
                "tag": "SnapObject"
            },
            {
                "id": "dock",
                "position": [4, 0, 0],
                "behaviours": [{ "type": "zone" }],
                "anchor_zones": [{ "half_extents": [0.5, 0.5, 0.5] }]
            },
            {
                "id": "crate",
                "position": [4.2, 0.1, 0],
                "rotation": [0, 10, 0],
                "half_extents": [0.2, 0.2, 0.2],
                "tag": "SnapObject",
                "velocity": [0, 0, 0],
                "behaviours": [{ "type": "draggable", "button": "right" }]
            }
        ]
    }"#;

    fn workbench() -> SnapSceneConfig {
        SnapSceneConfig::from_json(WORKBENCH).unwrap()
    }

    #[test]
    fn test_load_spawns_objects() {
        let mut app = TestApp::new();
        app.record::<SceneLoadedEvent>();
        app.load_scene(workbench());

        let loaded = app.recorded::<SceneLoadedEvent>();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].scene_name, "workbench");
        assert_eq!(loaded[0].object_count, 3);

        let map = app.world().resource::<SceneEntityMap>();
        assert_eq!(map.by_index.len(), 3);

        let floor = app.entity("floor");
        assert!(app.world().get::<SnapTag>(floor).unwrap().is("SnapObject"));
        assert!(app.world().get::<TriggerVolume>(floor).is_none());

        let crate_entity = app.entity("crate");
        assert_eq!(
            app.world().get::<Draggable>(crate_entity).unwrap().button,
            MouseButton::Right
        );
        assert!(app.world().get::<LinearVelocity>(crate_entity).is_some());

        let dock = app.entity("dock");
        assert!(app.world().get::<SnapZone>(dock).is_some());
        let children = app.world().get::<Children>(dock).unwrap();
        assert_eq!(children.len(), 1);
        assert!(app.world().get::<AnchorZone>(children[0]).is_some());
        assert!(app.world().get::<TriggerVolume>(children[0]).is_some());
    }

    #[test]
    fn test_reload_replaces_scene() {
        let mut app = TestApp::new();
        app.load_scene(workbench());
        let old_dock = app.entity("dock");
        let old_zone = app.world().get::<Children>(old_dock).unwrap()[0];

        app.load_scene(workbench());
        assert!(app.world().get_entity(old_dock).is_err());
        assert!(app.world().get_entity(old_zone).is_err());
        assert_ne!(app.entity("dock"), old_dock);

        let mut markers = app.world_mut().query::<&SceneObjectMarker>();
        assert_eq!(markers.iter(app.world()).count(), 3);
    }

    #[test]
    fn test_loaded_dock_pulls_crate_in() {
        let mut app = TestApp::new();
        app.load_scene(workbench());
        let crate_entity = app.entity("crate");

        app.step(240);
        let transform = app.transform(crate_entity);
        assert!(transform.translation.distance(Vec3::new(4.0, 0.0, 0.0)) < 1e-3);
        assert!(transform.rotation.angle_between(Quat::IDENTITY) < 1e-3);
    }
}
