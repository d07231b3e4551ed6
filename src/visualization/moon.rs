//! Moon and the pivot it orbits on.
//!
//! The Moon never spins itself. It hangs off an invisible pivot at a fixed
//! offset, and the pivot spins while following Earth's position.

use bevy::prelude::*;

use crate::core::follow::Follows;
use crate::core::spin::Spin;
use crate::visualization::config::MOON;
use crate::visualization::earth::{BodyRadius, visibility_of};
use crate::visualization::factory::{BodyBuildError, TextureSource, build_sphere_body};

#[derive(Component)]
pub struct Moon;

#[derive(Component)]
pub struct MoonPivot;

/// Spawn the pivot (following `earth`) with the Moon attached. Returns `(pivot, moon)`.
pub fn spawn_moon(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    textures: &TextureSource,
    earth: Entity,
    earth_position: Vec3,
) -> Result<(Entity, Entity), BodyBuildError> {
    let body = build_sphere_body(
        &MOON.geometry,
        &MOON.material,
        meshes,
        materials,
        Some(textures),
    )?;

    let moon = commands
        .spawn((
            Mesh3d(body.mesh),
            MeshMaterial3d(body.material),
            Transform::from_translation(MOON.position),
            visibility_of(&MOON),
            BodyRadius(MOON.geometry.radius),
            Moon,
            Name::new(MOON.name),
        ))
        .id();

    let pivot = commands
        .spawn((
            Transform::from_translation(earth_position),
            Visibility::default(),
            Spin::about_y(MOON.rotations_per_second).with_enabled(MOON.animate),
            Follows(earth),
            MoonPivot,
            Name::new("Moon Pivot"),
        ))
        .add_child(moon)
        .id();

    Ok((pivot, moon))
}
