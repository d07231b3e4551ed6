//! Sun light

use bevy::prelude::*;

use crate::visualization::factory::TextureSource;
use crate::visualization::lens_flare::spawn_lens_flare;

pub const SUN_POSITION: Vec3 = Vec3::new(-380.0, 240.0, -1000.0);
pub const SUN_ILLUMINANCE: f32 = 10_000.0;
/// Fill so the night side isn't pitch black.
pub const AMBIENT_BRIGHTNESS: f32 = 60.0;

/// Marker component for the sun directional light
#[derive(Component)]
pub struct SunLight;

/// Spawn the sun with its lens flare attached.
pub fn spawn_sun(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    textures: &TextureSource,
) -> Entity {
    let sun = commands
        .spawn((
            DirectionalLight {
                color: Color::WHITE,
                illuminance: SUN_ILLUMINANCE,
                ..default()
            },
            Transform::from_translation(SUN_POSITION).looking_at(Vec3::ZERO, Vec3::Y),
            Visibility::Visible,
            SunLight,
            Name::new("Sun"),
        ))
        .id();

    spawn_lens_flare(commands, meshes, materials, textures, sun);
    sun
}
