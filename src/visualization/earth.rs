use bevy::prelude::*;

use crate::core::spin::Spin;
use crate::visualization::config::{CLOUD, CelestialBodyConfig, EARTH};
use crate::visualization::factory::{BodyBuildError, TextureSource, build_sphere_body};
use crate::visualization::specular::PendingSpecular;

#[derive(Component)]
pub struct Earth;

/// Cloud layer; a child of [`Earth`] with its own spin.
#[derive(Component)]
pub struct Cloud;

/// Radius of a spawned sphere body, in scene units.
#[derive(Component, Clone, Copy, Debug, Deref)]
pub struct BodyRadius(pub f32);

pub fn visibility_of(config: &CelestialBodyConfig) -> Visibility {
    if config.visible {
        Visibility::Visible
    } else {
        Visibility::Hidden
    }
}

/// Spawn Earth with its cloud layer attached. Returns `(earth, cloud)`.
pub fn spawn_earth(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    textures: &TextureSource,
) -> Result<(Entity, Entity), BodyBuildError> {
    let earth_body = build_sphere_body(
        &EARTH.geometry,
        &EARTH.material,
        meshes,
        materials,
        Some(textures),
    )?;
    let cloud_body = build_sphere_body(
        &CLOUD.geometry,
        &CLOUD.material,
        meshes,
        materials,
        Some(textures),
    )?;

    let cloud = commands
        .spawn((
            Mesh3d(cloud_body.mesh),
            MeshMaterial3d(cloud_body.material),
            Transform::from_translation(CLOUD.position),
            visibility_of(&CLOUD),
            Spin::about_y(CLOUD.rotations_per_second).with_enabled(CLOUD.animate),
            BodyRadius(CLOUD.geometry.radius),
            Cloud,
            Name::new(CLOUD.name),
        ))
        .id();

    let mut earth = commands.spawn((
        Mesh3d(earth_body.mesh),
        MeshMaterial3d(earth_body.material),
        Transform::from_translation(EARTH.position),
        visibility_of(&EARTH),
        Spin::about_y(EARTH.rotations_per_second).with_enabled(EARTH.animate),
        BodyRadius(EARTH.geometry.radius),
        Earth,
        Name::new(EARTH.name),
    ));
    earth.add_child(cloud);
    if let Some(mask) = earth_body.specular {
        earth.insert(PendingSpecular(mask));
    }

    Ok((earth.id(), cloud))
}
