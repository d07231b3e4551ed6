//! Main camera and its orbit controller.
//!
//! Input handling and damping belong to `bevy_panorbit_camera`; this module
//! only spawns the camera with our framing and adds a slow auto-rotation by
//! nudging the controller's target yaw each frame.

use bevy::prelude::*;
use bevy_panorbit_camera::PanOrbitCamera;
use std::f32::consts::TAU;

pub const CAMERA_FOV_DEG: f32 = 63.0;
pub const CAMERA_NEAR: f32 = 1.0;
pub const CAMERA_FAR: f32 = 8000.0;
pub const CAMERA_START: Vec3 = Vec3::new(0.0, 0.0, 150.0);

/// Dimensionless speed; 2.0 is one full orbit per 30 seconds.
pub const AUTO_ROTATE_SPEED: f32 = 0.07;
/// 0 snaps instantly, values near 1 ease slowly toward the target.
pub const ORBIT_SMOOTHNESS: f32 = 0.6;

#[derive(Component)]
pub struct MainCamera;

#[derive(Component, Clone, Copy, Debug)]
pub struct AutoRotate {
    pub enabled: bool,
    pub speed: f32,
}

impl Default for AutoRotate {
    fn default() -> Self {
        Self {
            enabled: true,
            speed: AUTO_ROTATE_SPEED,
        }
    }
}

impl AutoRotate {
    /// Yaw change in radians for a frame of `delta_secs`.
    pub fn step(&self, delta_secs: f32) -> f32 {
        if !self.enabled {
            return 0.0;
        }
        TAU / 60.0 * self.speed * delta_secs.max(0.0)
    }
}

pub fn spawn_main_camera(commands: &mut Commands) -> Entity {
    let radius = CAMERA_START.length();
    commands
        .spawn((
            Camera3d::default(),
            Projection::Perspective(PerspectiveProjection {
                fov: CAMERA_FOV_DEG.to_radians(),
                near: CAMERA_NEAR,
                far: CAMERA_FAR,
                ..default()
            }),
            Camera {
                clear_color: ClearColorConfig::Custom(Color::BLACK),
                ..default()
            },
            Transform::from_translation(CAMERA_START).looking_at(Vec3::ZERO, Vec3::Y),
            PanOrbitCamera {
                focus: Vec3::ZERO,
                radius: Some(radius),
                yaw: Some(0.0),
                pitch: Some(0.0),
                orbit_smoothness: ORBIT_SMOOTHNESS,
                force_update: true,
                ..default()
            },
            AutoRotate::default(),
            MainCamera,
            Name::new("Camera"),
        ))
        .id()
}

pub fn auto_rotate_camera(
    time: Res<Time>,
    mut cameras: Query<(&AutoRotate, &mut PanOrbitCamera)>,
) {
    let delta = time.delta_secs();
    for (auto, mut pan_orbit) in &mut cameras {
        let step = auto.step(delta);
        if step != 0.0 {
            pan_orbit.target_yaw -= step;
        }
    }
}
