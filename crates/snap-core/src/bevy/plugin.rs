//! Bevy plugins for snapping.
//!
//! Provides:
//! - `SnapCorePlugin`: Logic-only plugin (no rendering/window dependencies) for headless use
//! - `SnapPointerPlugin`: Cursor-to-ray conversion for dragging, needs a window and a camera

use bevy::prelude::*;
use bevy::transform::TransformSystems;

use crate::SNAP_DT;
use crate::bevy::events::*;
use crate::bevy::systems;

/// Ordering of the fixed-step snap systems.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SnapSet {
    /// Trigger and contact reporting.
    Detect,
    /// Snap strategies.
    Resolve,
}

// ============================================================================
// Core Plugin (logic only, no rendering/window dependencies)
// ============================================================================

/// Headless plugin containing every snap strategy.
///
/// Use this plugin in tests with `MinimalPlugins` (plus `TransformPlugin`).
pub struct SnapCorePlugin {
    /// Run the built-in box-overlap trigger and contact detectors.
    ///
    /// Disable when a physics backend writes `TriggerEvent` and `ContactBegan` itself.
    pub builtin_detection: bool,
}

impl Default for SnapCorePlugin {
    fn default() -> Self {
        Self {
            builtin_detection: true,
        }
    }
}

impl Plugin for SnapCorePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Time::<Fixed>::from_seconds(f64::from(SNAP_DT)));

        app.init_resource::<systems::SceneEntityMap>()
            .init_resource::<systems::PointerRay>();

        // ====================================================================
        // Messages
        // ====================================================================

        // Collision input
        app.add_message::<TriggerEvent>()
            .add_message::<ContactBegan>();

        // Snap transitions
        app.add_message::<GridSnapped>()
            .add_message::<ZoneClaimed>()
            .add_message::<ZoneRotationCorrected>()
            .add_message::<ZoneReleased>()
            .add_message::<SurfaceContactChanged>()
            .add_message::<AttachedToSurface>();

        // Scene
        app.add_message::<LoadSceneEvent>()
            .add_message::<SceneLoadedEvent>();

        // ====================================================================
        // Fixed-step systems
        // ====================================================================

        app.configure_sets(FixedUpdate, (SnapSet::Detect, SnapSet::Resolve).chain());

        if self.builtin_detection {
            app.add_systems(
                FixedUpdate,
                (
                    systems::detect_trigger_overlaps,
                    systems::detect_attach_contacts,
                )
                    .in_set(SnapSet::Detect),
            );
        }

        app.add_systems(
            FixedUpdate,
            (
                systems::snap_bodies_to_grid,
                systems::handle_zone_triggers,
                systems::advance_zone_snappers,
                systems::sweep_surface_snappers,
                systems::handle_collision_attach,
            )
                .chain()
                .in_set(SnapSet::Resolve),
        );

        // ====================================================================
        // Per-frame systems
        // ====================================================================

        app.add_systems(
            Update,
            (
                systems::handle_load_scene,
                systems::drag_entities.run_if(resource_exists::<ButtonInput<MouseButton>>),
            )
                .chain(),
        );

        // Anchor zones need propagated child transforms
        app.add_systems(
            PostUpdate,
            systems::discover_anchor_zones.after(TransformSystems::Propagate),
        );
    }
}

// ============================================================================
// Pointer Plugin (window + camera)
// ============================================================================

/// Feeds cursor rays from the primary window through the `SnapCamera` into dragging.
///
/// Requires `SnapCorePlugin`.
pub struct SnapPointerPlugin;

impl Plugin for SnapPointerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            systems::update_pointer_ray.before(systems::drag_entities),
        );
    }
}
