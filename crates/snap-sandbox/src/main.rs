//! Snap Sandbox
//!
//! Loads a scene file, runs the snap systems headless for a number of fixed
//! steps, then logs how many snap transitions happened and where every object
//! ended up.
//!
//! Usage: `snap-sandbox [scene.json] [steps]`

use std::time::Duration;

use anyhow::Context;
use bevy::prelude::*;
use snap_core::SnapSceneConfig;
use snap_core::bevy::{
    AttachedToSurface, GridSnapped, LoadSceneEvent, SceneEntityMap, SnapCorePlugin,
    SurfaceContactChanged, ZoneClaimed, ZoneReleased, ZoneRotationCorrected,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_SCENE: &str = "scenes/workbench.json";
const DEFAULT_STEPS: u32 = 300;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let scene_path = args.next().unwrap_or_else(|| DEFAULT_SCENE.to_string());
    let steps = match args.next() {
        Some(raw) => raw
            .parse::<u32>()
            .with_context(|| format!("invalid step count '{raw}'"))?,
        None => DEFAULT_STEPS,
    };

    let config = SnapSceneConfig::load(&scene_path)
        .with_context(|| format!("failed to load scene {scene_path}"))?;
    tracing::info!(
        "[sandbox] Running '{}' ({} objects) for {steps} steps",
        config.meta.name,
        config.objects.len()
    );

    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins(bevy::transform::TransformPlugin)
        .add_plugins(SnapCorePlugin::default())
        .init_resource::<SnapEventCounts>()
        .add_systems(Last, count_snap_events);

    // Step virtual time by hand so every update runs exactly one fixed step.
    app.world_mut().resource_mut::<Time<Virtual>>().pause();
    app.world_mut().write_message(LoadSceneEvent { config });
    app.update();

    let timestep: Duration = app.world().resource::<Time<Fixed>>().timestep();
    for _ in 0..steps {
        app.world_mut()
            .resource_mut::<Time<Fixed>>()
            .accumulate_overstep(timestep);
        app.update();
    }

    report_counts(app.world().resource::<SnapEventCounts>());
    report_poses(app.world());
    Ok(())
}

/// Snap transitions seen during the run.
#[derive(Resource, Debug, Default)]
struct SnapEventCounts {
    grid: usize,
    zone_claimed: usize,
    zone_corrected: usize,
    zone_released: usize,
    surface_engaged: usize,
    surface_disengaged: usize,
    attached: usize,
}

fn count_snap_events(
    mut counts: ResMut<SnapEventCounts>,
    mut grid: MessageReader<GridSnapped>,
    mut claimed: MessageReader<ZoneClaimed>,
    mut corrected: MessageReader<ZoneRotationCorrected>,
    mut released: MessageReader<ZoneReleased>,
    mut surface: MessageReader<SurfaceContactChanged>,
    mut attached: MessageReader<AttachedToSurface>,
) {
    counts.grid += grid.read().count();
    counts.zone_claimed += claimed.read().count();
    counts.zone_corrected += corrected.read().count();
    counts.zone_released += released.read().count();
    for change in surface.read() {
        if change.engaged {
            counts.surface_engaged += 1;
        } else {
            counts.surface_disengaged += 1;
        }
    }
    counts.attached += attached.read().count();
}

fn report_counts(counts: &SnapEventCounts) {
    tracing::info!(
        "[sandbox] grid snaps {}, zone claims {} / corrections {} / releases {}, \
         surface engages {} / disengages {}, attaches {}",
        counts.grid,
        counts.zone_claimed,
        counts.zone_corrected,
        counts.zone_released,
        counts.surface_engaged,
        counts.surface_disengaged,
        counts.attached,
    );
}

fn report_poses(world: &World) {
    let entities = world.resource::<SceneEntityMap>();
    let mut ids: Vec<_> = entities.by_id.iter().collect();
    ids.sort_by(|a, b| a.0.cmp(b.0));

    for (id, &entity) in ids {
        let Some(global) = world.get::<GlobalTransform>(entity) else {
            continue;
        };
        let (_, rotation, translation) = global.to_scale_rotation_translation();
        let (yaw, pitch, roll) = rotation.to_euler(EulerRot::YXZ);
        tracing::info!(
            "[sandbox] {id}: position ({:.3}, {:.3}, {:.3}) rotation ({:.1}, {:.1}, {:.1})",
            translation.x,
            translation.y,
            translation.z,
            pitch.to_degrees(),
            yaw.to_degrees(),
            roll.to_degrees(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_each_transition_kind() {
        let mut app = App::new();
        app.add_message::<GridSnapped>()
            .add_message::<ZoneClaimed>()
            .add_message::<ZoneRotationCorrected>()
            .add_message::<ZoneReleased>()
            .add_message::<SurfaceContactChanged>()
            .add_message::<AttachedToSurface>()
            .init_resource::<SnapEventCounts>()
            .add_systems(Update, count_snap_events);

        let a = app.world_mut().spawn_empty().id();
        let b = app.world_mut().spawn_empty().id();
        let world = app.world_mut();
        world.write_message(GridSnapped {
            snapper: a,
            target: a,
            position: Vec3::ZERO,
        });
        world.write_message(ZoneClaimed { snapper: a, target: b });
        world.write_message(SurfaceContactChanged {
            entity: b,
            engaged: true,
        });
        world.write_message(SurfaceContactChanged {
            entity: b,
            engaged: false,
        });
        world.write_message(AttachedToSurface {
            entity: b,
            parent: a,
            position: Vec3::ONE,
        });
        app.update();

        assert_counts(&app, 1, 1, 1, 1, 1);

        // Messages already read are not counted twice
        app.update();
        assert_counts(&app, 1, 1, 1, 1, 1);
    }

    fn assert_counts(
        app: &App,
        grid: usize,
        claimed: usize,
        engaged: usize,
        disengaged: usize,
        attached: usize,
    ) {
        let counts = app.world().resource::<SnapEventCounts>();
        assert_eq!(counts.grid, grid);
        assert_eq!(counts.zone_claimed, claimed);
        assert_eq!(counts.zone_corrected, 0);
        assert_eq!(counts.zone_released, 0);
        assert_eq!(counts.surface_engaged, engaged);
        assert_eq!(counts.surface_disengaged, disengaged);
        assert_eq!(counts.attached, attached);
    }
}
