//! Scene composition: camera, bodies, sun and background, then the shadow pass.

use bevy::light::GlobalAmbientLight;
use bevy::prelude::*;

pub mod shadows;

use crate::core::orbit_camera::spawn_main_camera;
use crate::settings::Settings;
use crate::visualization::config::EARTH;
use crate::visualization::earth::spawn_earth;
use crate::visualization::factory::TextureSource;
use crate::visualization::lighting::{AMBIENT_BRIGHTNESS, spawn_sun};
use crate::visualization::moon::spawn_moon;
use crate::visualization::skymap::{Skymap, assemble_skymap};
use crate::visualization::specular::apply_specular_maps;

/// Entities created by [`build_scene`], for systems that need a specific body.
#[derive(Resource, Clone, Copy, Debug)]
pub struct SceneBodies {
    pub earth: Entity,
    pub cloud: Entity,
    pub moon: Entity,
    pub moon_pivot: Entity,
    pub sun: Entity,
    pub camera: Entity,
}

pub fn build_scene(
    mut commands: Commands,
    settings: Res<Settings>,
    asset_server: Res<AssetServer>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.insert_resource(GlobalAmbientLight {
        brightness: AMBIENT_BRIGHTNESS,
        ..default()
    });
    commands.insert_resource(Skymap::load(
        &asset_server,
        &settings.asset_base,
        settings.quality,
    ));

    let camera = spawn_main_camera(&mut commands);
    let textures = TextureSource {
        asset_server: &asset_server,
        base: &settings.asset_base,
        tier: settings.quality,
    };

    let (earth, cloud) = match spawn_earth(&mut commands, &mut meshes, &mut materials, &textures) {
        Ok(spawned) => spawned,
        Err(err) => {
            error!("[INIT] Earth not built: {}", err);
            return;
        }
    };
    let (moon_pivot, moon) = match spawn_moon(
        &mut commands,
        &mut meshes,
        &mut materials,
        &textures,
        earth,
        EARTH.position,
    ) {
        Ok(spawned) => spawned,
        Err(err) => {
            error!("[INIT] Moon not built: {}", err);
            return;
        }
    };
    let sun = spawn_sun(&mut commands, &mut meshes, &mut materials, &textures);

    commands.insert_resource(SceneBodies {
        earth,
        cloud,
        moon,
        moon_pivot,
        sun,
        camera,
    });
    info!("[INIT] Scene built ({} textures)", settings.quality);
}

pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, (build_scene, shadows::configure_shadows).chain())
            .add_systems(Update, (assemble_skymap, apply_specular_maps));
    }
}
