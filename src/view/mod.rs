//! Per-frame pass and viewport handling.
//!
//! Update: spin Earth, Cloud and the Moon pivot (in that order), turn NEO
//! labels toward the camera, then nudge the orbit controller.
//! PostUpdate: the controller applies its damping, then followers catch up
//! and the lens flare is laid out, all before transform propagation.

use bevy::prelude::*;
use bevy::transform::TransformSystems;
use bevy_panorbit_camera::PanOrbitCameraSystemSet;

pub mod resize;

pub use resize::ViewportSize;

use crate::core::follow::sync_followers;
use crate::core::orbit_camera::auto_rotate_camera;
use crate::core::spin::animate_bodies;
use crate::neo::orient_neo_labels;
use crate::visualization::earth::{Cloud, Earth};
use crate::visualization::lens_flare::layout_lens_flares;
use crate::visualization::moon::MoonPivot;

pub struct ViewPlugin;

impl Plugin for ViewPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ViewportSize>()
            .add_systems(Startup, resize::init_viewport)
            .add_systems(
                Update,
                (
                    resize::handle_resize,
                    animate_bodies::<Earth>,
                    animate_bodies::<Cloud>,
                    animate_bodies::<MoonPivot>,
                    orient_neo_labels,
                    auto_rotate_camera,
                )
                    .chain(),
            )
            .add_systems(
                PostUpdate,
                (
                    sync_followers.before(TransformSystems::Propagate),
                    layout_lens_flares
                        .after(PanOrbitCameraSystemSet)
                        .before(TransformSystems::Propagate),
                ),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::spin::Spin;
    use std::f32::consts::TAU;
    use std::time::Duration;

    #[test]
    fn one_frame_spins_every_body_by_its_own_rate() {
        let mut world = World::new();
        world.insert_resource(Time::<()>::default());
        let earth = world.spawn((Transform::default(), Spin::about_y(0.01), Earth)).id();
        let cloud = world.spawn((Transform::default(), Spin::about_y(-0.0012), Cloud)).id();
        let pivot = world
            .spawn((Transform::default(), Spin::about_y(0.05), MoonPivot))
            .id();

        let mut schedule = Schedule::default();
        schedule.add_systems(
            (
                animate_bodies::<Earth>,
                animate_bodies::<Cloud>,
                animate_bodies::<MoonPivot>,
            )
                .chain(),
        );
        world
            .resource_mut::<Time>()
            .advance_by(Duration::from_secs(2));
        schedule.run(&mut world);

        for (entity, rps) in [(earth, 0.01), (cloud, -0.0012), (pivot, 0.05)] {
            let spin = world.entity(entity).get::<Spin>().unwrap();
            let expected = (2.0 * TAU * rps).rem_euclid(TAU);
            assert!((spin.angle - expected).abs() < 1e-5);
        }
        // negative rate turns the other way
        let cloud_rot = world.entity(cloud).get::<Transform>().unwrap().rotation;
        assert!((cloud_rot * Vec3::X).z > 0.0);
    }
}
