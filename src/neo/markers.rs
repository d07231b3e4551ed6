//! NEO marker geometry, placement and spawning.
//!
//! Placement is illustrative: the direction is random and only the distance
//! carries data (miss distance scaled down by a million, on top of Earth's
//! radius).

use bevy::light::{NotShadowCaster, NotShadowReceiver};
use bevy::prelude::*;
use rand::Rng;
use std::f32::consts::{PI, TAU};

use crate::neo::label::{LabelImageProducer, label_lines};
use crate::neo::types::NeoRecord;
use crate::visualization::config::{MaterialParams, SphereGeometry, Surface};
use crate::visualization::factory::{BodyBuildError, build_sphere_body};

pub const MARKER_MIN_SIZE: f32 = 1.0;
pub const MARKER_SIZE_PER_KM: f32 = 0.5;
pub const MISS_DISTANCE_SCALE: f64 = 1_000_000.0;
pub const MARKER_SEGMENTS: u32 = 16;
pub const MARKER_COLOR: Color = Color::srgb(1.0, 0.0, 0.0);

pub const LABEL_SCALE: Vec3 = Vec3::new(20.0, 10.0, 1.0);
pub const LABEL_GAP: f32 = 2.0;

#[derive(Component, Clone, Debug)]
#[allow(dead_code)]
pub struct NeoMarker {
    pub id: String,
    pub size: f32,
    pub distance: f32,
    pub velocity_km_s: f64,
}

#[derive(Component, Clone, Debug)]
#[allow(dead_code)]
pub struct NeoLabel {
    pub lines: [String; 3],
}

/// Visual radius: half the diameter, never below one unit.
pub fn marker_size(diameter_km: f64) -> f32 {
    (diameter_km as f32 * MARKER_SIZE_PER_KM).max(MARKER_MIN_SIZE)
}

pub fn marker_distance(earth_radius: f32, miss_distance_km: f64) -> f32 {
    earth_radius + (miss_distance_km / MISS_DISTANCE_SCALE) as f32
}

/// A point at exactly `distance` from the origin, in a direction built from
/// two uniformly random angles.
pub fn random_position(distance: f32, rng: &mut impl Rng) -> Vec3 {
    let azimuth = rng.gen_range(0.0..TAU);
    let elevation = rng.gen_range(-PI / 2.0..=PI / 2.0);
    let (sin_el, cos_el) = elevation.sin_cos();
    let (sin_az, cos_az) = azimuth.sin_cos();
    Vec3::new(cos_az * cos_el, sin_el, sin_az * cos_el) * distance
}

pub fn label_offset(size: f32) -> Vec3 {
    Vec3::new(0.0, size + LABEL_GAP, 0.0)
}

/// Shared mesh for every label billboard.
#[derive(Resource, Clone)]
pub struct LabelQuad(pub Handle<Mesh>);

/// Spawn one marker (with its label) under `earth`.
#[allow(clippy::too_many_arguments)]
pub fn spawn_marker(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    images: &mut Assets<Image>,
    labels: &dyn LabelImageProducer,
    label_quad: &Handle<Mesh>,
    earth: Entity,
    earth_radius: f32,
    record: &NeoRecord,
    rng: &mut impl Rng,
) -> Result<Entity, BodyBuildError> {
    let size = marker_size(record.diameter_km);
    let distance = marker_distance(earth_radius, record.miss_distance_km);
    let body = build_sphere_body(
        &SphereGeometry {
            radius: size,
            width_segments: MARKER_SEGMENTS,
            height_segments: MARKER_SEGMENTS,
        },
        &MaterialParams {
            color: MARKER_COLOR,
            surface: Surface::Unlit,
            ..default()
        },
        meshes,
        materials,
        None,
    )?;

    let lines = label_lines(record);
    let label_image = images.add(labels.produce(&lines));
    let label_material = materials.add(StandardMaterial {
        base_color_texture: Some(label_image),
        alpha_mode: AlphaMode::Blend,
        unlit: true,
        ..default()
    });
    let label = commands
        .spawn((
            Mesh3d(label_quad.clone()),
            MeshMaterial3d(label_material),
            Transform::from_translation(label_offset(size)).with_scale(LABEL_SCALE),
            Visibility::Inherited,
            NotShadowCaster,
            NotShadowReceiver,
            NeoLabel { lines },
            Name::new(format!("Label {}", record.name)),
        ))
        .id();

    let marker = commands
        .spawn((
            Mesh3d(body.mesh),
            MeshMaterial3d(body.material),
            Transform::from_translation(random_position(distance, rng)),
            Visibility::Inherited,
            NotShadowCaster,
            NotShadowReceiver,
            NeoMarker {
                id: record.id.clone(),
                size,
                distance,
                velocity_km_s: record.velocity_km_s,
            },
            Name::new(format!("NEO {} ({:.1} km/s)", record.name, record.velocity_km_s)),
        ))
        .add_child(label)
        .id();

    commands.entity(earth).add_child(marker);
    Ok(marker)
}

/// Rotation that turns a marker's +Z face toward `target`, both in the
/// marker's parent space.
pub fn facing_rotation(from: Vec3, target: Vec3) -> Option<Quat> {
    let to_target = target - from;
    if to_target.length_squared() < 1e-8 {
        return None;
    }
    Some(Transform::from_translation(from).looking_to(-to_target, Vec3::Y).rotation)
}
