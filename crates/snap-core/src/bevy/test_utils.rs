//! Test utilities for headless Bevy integration tests.
//!
//! Provides `TestApp`, a wrapper around `bevy::app::App` that uses
//! `MinimalPlugins` + `TransformPlugin` + `SnapCorePlugin` for testing snap
//! systems without a rendering or windowing backend.

use bevy::ecs::message::Message;
use bevy::prelude::*;

use crate::bevy::events::LoadSceneEvent;
use crate::bevy::plugin::SnapCorePlugin;
use crate::bevy::systems::{PointerRay, SceneEntityMap};
use crate::layout::SnapSceneConfig;

/// Every message of type `M` seen since the app started.
#[derive(Resource)]
pub(crate) struct Recorded<M: Message>(pub Vec<M>);

impl<M: Message> Default for Recorded<M> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

fn record_messages<M: Message + Clone>(mut reader: MessageReader<M>, mut recorded: ResMut<Recorded<M>>) {
    recorded.0.extend(reader.read().cloned());
}

/// A headless Bevy app wrapper for testing.
pub(crate) struct TestApp {
    pub app: App,
}

impl TestApp {
    pub fn new() -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(bevy::transform::TransformPlugin);
        app.add_plugins(SnapCorePlugin::default());
        // Pause virtual time so that only explicit steps advance the
        // fixed-step systems.
        app.world_mut().resource_mut::<Time<Virtual>>().pause();
        app.update();
        Self { app }
    }

    /// Run a single frame update. No fixed step runs.
    pub fn update(&mut self) {
        self.app.update();
    }

    /// Advance the snap systems by exactly `n` fixed timesteps.
    ///
    /// Feeds the fixed timestep straight into the accumulator; with paused
    /// virtual time each update then runs `FixedUpdate` exactly once.
    pub fn step(&mut self, n: usize) {
        let dt = self.app.world().resource::<Time<Fixed>>().timestep();
        for _ in 0..n {
            self.app
                .world_mut()
                .resource_mut::<Time<Fixed>>()
                .accumulate_overstep(dt);
            self.app.update();
        }
    }

    /// Starts collecting messages of type `M` into `Recorded<M>`.
    pub fn record<M: Message + Clone>(&mut self) {
        self.app.init_resource::<Recorded<M>>();
        self.app.add_systems(Last, record_messages::<M>);
    }

    pub fn recorded<M: Message + Clone>(&self) -> &[M] {
        &self.app.world().resource::<Recorded<M>>().0
    }

    /// Load a scene and run an update so it is spawned and propagated.
    pub fn load_scene(&mut self, config: SnapSceneConfig) {
        self.app.world_mut().write_message(LoadSceneEvent { config });
        self.update();
    }

    pub fn entity(&self, id: &str) -> Entity {
        self.app
            .world()
            .resource::<SceneEntityMap>()
            .get(id)
            .unwrap_or_else(|| panic!("no scene object '{id}'"))
    }

    pub fn transform(&self, entity: Entity) -> Transform {
        *self.app.world().get::<Transform>(entity).unwrap()
    }

    /// Enables drag input: a `ButtonInput<MouseButton>` resource driven by the test.
    pub fn enable_pointer(&mut self) {
        self.app.init_resource::<ButtonInput<MouseButton>>();
    }

    pub fn set_pointer(&mut self, pointer: PointerRay) {
        self.app.insert_resource(pointer);
    }

    pub fn press(&mut self, button: MouseButton) {
        self.app
            .world_mut()
            .resource_mut::<ButtonInput<MouseButton>>()
            .press(button);
    }

    pub fn release(&mut self, button: MouseButton) {
        self.app
            .world_mut()
            .resource_mut::<ButtonInput<MouseButton>>()
            .release(button);
    }

    /// Forget just-pressed/just-released state, as the input plugin does each frame.
    pub fn clear_input(&mut self) {
        self.app
            .world_mut()
            .resource_mut::<ButtonInput<MouseButton>>()
            .clear();
    }

    pub fn world(&self) -> &World {
        self.app.world()
    }

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }
}
