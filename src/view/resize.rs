//! Viewport size tracking. Camera aspect and the recorded surface size move
//! together on every accepted resize.

use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowResized};

use crate::core::orbit_camera::MainCamera;

#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct ViewportSize {
    pub width: f32,
    pub height: f32,
    pub aspect: f32,
}

impl Default for ViewportSize {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            aspect: 1280.0 / 720.0,
        }
    }
}

impl ViewportSize {
    /// Record a new surface size. A degenerate size (minimised window) is
    /// ignored so the aspect never divides by zero; returns whether it applied.
    pub fn resize(&mut self, width: f32, height: f32) -> bool {
        if !(width > 0.0 && height > 0.0) {
            return false;
        }
        self.width = width;
        self.height = height;
        self.aspect = width / height;
        true
    }
}

pub fn init_viewport(mut viewport: ResMut<ViewportSize>, windows: Query<&Window, With<PrimaryWindow>>) {
    if let Ok(window) = windows.single() {
        viewport.resize(window.width(), window.height());
    }
}

pub fn handle_resize(
    mut resized: MessageReader<WindowResized>,
    mut viewport: ResMut<ViewportSize>,
    mut cameras: Query<&mut Projection, With<MainCamera>>,
) {
    let Some(last) = resized.read().last() else {
        return;
    };
    if !viewport.resize(last.width, last.height) {
        return;
    }
    for mut projection in &mut cameras {
        if let Projection::Perspective(perspective) = projection.as_mut() {
            perspective.aspect_ratio = viewport.aspect;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_updates_aspect_and_size_together() {
        let mut viewport = ViewportSize::default();
        assert!(viewport.resize(1920.0, 1080.0));
        assert_eq!(viewport.width, 1920.0);
        assert_eq!(viewport.height, 1080.0);
        assert!((viewport.aspect - 1920.0 / 1080.0).abs() < 1e-6);
    }

    #[test]
    fn zero_height_is_ignored() {
        let mut viewport = ViewportSize::default();
        let before = viewport;
        assert!(!viewport.resize(800.0, 0.0));
        assert!(!viewport.resize(0.0, 600.0));
        assert_eq!(viewport, before);
    }

    #[test]
    fn resize_message_sets_camera_aspect() {
        let mut world = World::new();
        world.init_resource::<ViewportSize>();
        world.init_resource::<Messages<WindowResized>>();
        let camera = world
            .spawn((Projection::Perspective(PerspectiveProjection::default()), MainCamera))
            .id();
        let window = world.spawn_empty().id();
        world.write_message(WindowResized {
            window,
            width: 800.0,
            height: 400.0,
        });

        let mut schedule = Schedule::default();
        schedule.add_systems(handle_resize);
        schedule.run(&mut world);

        assert_eq!(world.resource::<ViewportSize>().aspect, 2.0);
        let Projection::Perspective(p) = world.entity(camera).get::<Projection>().unwrap() else {
            panic!("expected perspective");
        };
        assert_eq!(p.aspect_ratio, 2.0);
    }

    #[test]
    fn resize_is_idempotent() {
        let mut viewport = ViewportSize::default();
        viewport.resize(1000.0, 500.0);
        let once = viewport;
        viewport.resize(1000.0, 500.0);
        assert_eq!(viewport, once);
    }
}
