//! Sphere mesh + material construction shared by every round body.

use bevy::prelude::*;
use thiserror::Error;

use crate::core::assets::QualityTier;
use crate::visualization::config::{BUMP_TO_PARALLAX, MaterialParams, SphereGeometry, Surface};

/// UV spheres degenerate below this many segments; smaller requests are clamped.
pub const MIN_SEGMENTS: u32 = 3;

#[derive(Debug, Error, PartialEq)]
pub enum BodyBuildError {
    #[error("sphere radius must be positive and finite, got {0}")]
    InvalidRadius(f32),
}

/// Handles for a constructed body.
#[derive(Clone, Debug)]
pub struct SphereBody {
    pub mesh: Handle<Mesh>,
    pub material: Handle<StandardMaterial>,
    /// Specular mask awaiting conversion; see
    /// [`PendingSpecular`](crate::visualization::specular::PendingSpecular).
    pub specular: Option<Handle<Image>>,
}

/// Where textures come from. Loads are asynchronous; a missing or broken file
/// leaves the slot unresolved and the surface renders with its base colour.
pub struct TextureSource<'a> {
    pub asset_server: &'a AssetServer,
    pub base: &'a str,
    pub tier: QualityTier,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct MaterialTexturePaths {
    pub color: Option<String>,
    pub bump: Option<String>,
    pub specular: Option<String>,
}

pub fn texture_paths(params: &MaterialParams, base: &str, tier: QualityTier) -> MaterialTexturePaths {
    let t = &params.textures;
    MaterialTexturePaths {
        color: t.color.map(|r| r.path(base, tier)),
        bump: t.bump.map(|r| r.path(base, tier)),
        specular: t.specular.map(|r| r.path(base, tier)),
    }
}

pub fn sphere_mesh(geometry: &SphereGeometry, with_tangents: bool) -> Result<Mesh, BodyBuildError> {
    if !geometry.radius.is_finite() || geometry.radius <= 0.0 {
        return Err(BodyBuildError::InvalidRadius(geometry.radius));
    }
    let sectors = geometry.width_segments.max(MIN_SEGMENTS);
    let stacks = geometry.height_segments.max(MIN_SEGMENTS);
    let mut mesh = Sphere::new(geometry.radius).mesh().uv(sectors, stacks);
    if with_tangents && let Err(err) = mesh.generate_tangents() {
        warn!("Sphere tangents unavailable, depth map disabled: {}", err);
    }
    Ok(mesh)
}

/// Material without textures.
pub fn base_material(params: &MaterialParams) -> StandardMaterial {
    let mut material = StandardMaterial {
        base_color: params.color,
        perceptual_roughness: params.perceptual_roughness,
        reflectance: params.reflectance,
        metallic: 0.0,
        ..default()
    };
    match params.surface {
        Surface::Opaque => {}
        Surface::Additive { opacity } => {
            material.base_color = params.color.with_alpha(opacity.clamp(0.0, 1.0));
            material.alpha_mode = AlphaMode::Add;
        }
        Surface::Unlit => material.unlit = true,
    }
    material
}

pub fn build_sphere_body(
    geometry: &SphereGeometry,
    params: &MaterialParams,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    textures: Option<&TextureSource>,
) -> Result<SphereBody, BodyBuildError> {
    let wants_depth = textures.is_some() && params.textures.bump.is_some();
    let mesh = sphere_mesh(geometry, wants_depth)?;
    let has_tangents = mesh.attribute(Mesh::ATTRIBUTE_TANGENT).is_some();

    let mut material = base_material(params);
    let mut specular = None;
    if let Some(source) = textures {
        let paths = texture_paths(params, source.base, source.tier);
        if let Some(path) = paths.color {
            material.base_color_texture = Some(source.asset_server.load(path));
        }
        if let Some(path) = paths.bump
            && has_tangents
        {
            material.depth_map = Some(source.asset_server.load(path));
            material.parallax_depth_scale = params.bump_scale * BUMP_TO_PARALLAX;
        }
        // The mask is not a roughness map; it is inverted after loading.
        specular = paths.specular.map(|path| source.asset_server.load(path));
    }

    Ok(SphereBody {
        mesh: meshes.add(mesh),
        material: materials.add(material),
        specular,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visualization::config::{CLOUD, EARTH, MOON};

    #[test]
    fn uv_sphere_vertex_count_matches_segments() {
        let mesh = sphere_mesh(&EARTH.geometry, false).unwrap();
        assert_eq!(mesh.count_vertices(), (64 + 1) * (32 + 1));
    }

    #[test]
    fn low_segment_counts_are_clamped_not_rejected() {
        let geometry = SphereGeometry {
            radius: 1.0,
            width_segments: 0,
            height_segments: 1,
        };
        let mesh = sphere_mesh(&geometry, false).unwrap();
        assert_eq!(mesh.count_vertices(), (MIN_SEGMENTS as usize + 1).pow(2));
    }

    #[test]
    fn non_positive_radius_is_rejected() {
        for radius in [0.0, -5.0, f32::NAN] {
            let geometry = SphereGeometry {
                radius,
                ..MOON.geometry
            };
            assert!(matches!(
                sphere_mesh(&geometry, false),
                Err(BodyBuildError::InvalidRadius(_))
            ));
        }
    }

    #[test]
    fn texture_paths_follow_quality_tier() {
        let sd = texture_paths(&EARTH.material, "textures", QualityTier::Standard);
        assert_eq!(sd.color.as_deref(), Some("textures/earth_map_1024x512.jpg"));
        assert_eq!(sd.specular.as_deref(), Some("textures/earth_specular_1024x512.jpg"));

        let hd = texture_paths(&MOON.material, "textures", QualityTier::High);
        assert_eq!(hd.bump.as_deref(), Some("textures/moon_bump_1024x512.jpg"));
        assert_eq!(hd.specular, None);
    }

    #[test]
    fn cloud_layer_is_additive_and_translucent() {
        let material = base_material(&CLOUD.material);
        assert!(matches!(material.alpha_mode, AlphaMode::Add));
        assert!((material.base_color.alpha() - 0.9).abs() < 1e-6);
    }

    #[test]
    fn untextured_build_registers_assets() {
        let mut meshes = Assets::<Mesh>::default();
        let mut materials = Assets::<StandardMaterial>::default();
        let body = build_sphere_body(
            &MOON.geometry,
            &MOON.material,
            &mut meshes,
            &mut materials,
            None,
        )
        .unwrap();

        assert!(meshes.get(&body.mesh).is_some());
        let material = materials.get(&body.material).unwrap();
        assert!(material.base_color_texture.is_none());
        assert!(material.depth_map.is_none());
        assert!(material.metallic_roughness_texture.is_none());
        assert!(body.specular.is_none());
    }
}
