use bevy::prelude::*;
use bevy::window::{PresentMode, Window, WindowPlugin};
use bevy_panorbit_camera::PanOrbitCameraPlugin;

#[cfg(feature = "dev")]
use bevy::dev_tools::fps_overlay::FpsOverlayPlugin;

mod core;
mod neo;
mod scene;
mod settings;
mod view;
mod visualization;

use neo::NeoPlugin;
use scene::ScenePlugin;
use settings::SettingsPlugin;
use view::ViewPlugin;

fn main() {
    let mut app = App::new();

    app.insert_resource(ClearColor(Color::BLACK))
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Earth NEO".to_string(),
                present_mode: PresentMode::AutoVsync,
                canvas: Some("#canvas-earth".to_string()),
                fit_canvas_to_parent: true,
                ..default()
            }),
            ..default()
        }));

    #[cfg(feature = "dev")]
    app.add_plugins(FpsOverlayPlugin::default());

    app.add_plugins(SettingsPlugin)
        .add_plugins(PanOrbitCameraPlugin)
        .add_plugins(ScenePlugin)
        .add_plugins(NeoPlugin)
        .add_plugins(ViewPlugin);

    app.run();
}
