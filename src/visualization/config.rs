//! Celestial body parameters.
//!
//! Scene units are arbitrary: Earth is 50 units across the radius and the
//! Moon orbits 100 units out. Rates are signed rotations per second.

use bevy::prelude::*;

use crate::core::assets::TextureRef;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphereGeometry {
    pub radius: f32,
    pub width_segments: u32,
    pub height_segments: u32,
}

/// Texture slots of a body material. Every slot is optional.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TextureSet {
    pub color: Option<TextureRef>,
    /// Height map, rendered as a parallax depth map.
    pub bump: Option<TextureRef>,
    pub specular: Option<TextureRef>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Surface {
    /// Lit, opaque surface.
    Opaque,
    /// Lit layer whose brightness is added over what is behind it.
    Additive { opacity: f32 },
    /// Flat colour, no lighting.
    Unlit,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaterialParams {
    pub color: Color,
    pub textures: TextureSet,
    pub bump_scale: f32,
    pub perceptual_roughness: f32,
    pub reflectance: f32,
    pub surface: Surface,
}

impl Default for MaterialParams {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            textures: TextureSet::default(),
            bump_scale: 0.0,
            perceptual_roughness: 1.0,
            reflectance: 0.5,
            surface: Surface::Opaque,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CelestialBodyConfig {
    pub name: &'static str,
    pub geometry: SphereGeometry,
    pub material: MaterialParams,
    pub rotations_per_second: f32,
    pub animate: bool,
    pub visible: bool,
    pub position: Vec3,
}

pub const EARTH: CelestialBodyConfig = CelestialBodyConfig {
    name: "Earth",
    geometry: SphereGeometry {
        radius: 50.0,
        width_segments: 64,
        height_segments: 32,
    },
    material: MaterialParams {
        color: Color::WHITE,
        textures: TextureSet {
            color: Some(TextureRef::new("earth", "map", (1024, 512), (2048, 1024))),
            bump: Some(TextureRef::new("earth", "bump", (1024, 512), (2048, 1024))),
            specular: Some(TextureRef::new("earth", "specular", (1024, 512), (2048, 1024))),
        },
        bump_scale: 0.45,
        // low shininess
        perceptual_roughness: 0.75,
        reflectance: 0.35,
        surface: Surface::Opaque,
    },
    rotations_per_second: 0.01,
    animate: true,
    visible: true,
    position: Vec3::ZERO,
};

pub const CLOUD: CelestialBodyConfig = CelestialBodyConfig {
    name: "Cloud",
    geometry: SphereGeometry {
        radius: 50.3,
        width_segments: 64,
        height_segments: 32,
    },
    material: MaterialParams {
        color: Color::WHITE,
        textures: TextureSet {
            color: Some(TextureRef::new("earth", "clouds", (1024, 512), (2048, 1024))),
            bump: Some(TextureRef::new("earth", "clouds", (1024, 512), (2048, 1024))),
            specular: None,
        },
        bump_scale: 0.13,
        perceptual_roughness: 1.0,
        reflectance: 0.5,
        surface: Surface::Additive { opacity: 0.9 },
    },
    rotations_per_second: -0.0012,
    animate: true,
    visible: true,
    position: Vec3::ZERO,
};

pub const MOON: CelestialBodyConfig = CelestialBodyConfig {
    name: "Moon",
    geometry: SphereGeometry {
        radius: 10.0,
        width_segments: 32,
        height_segments: 16,
    },
    material: MaterialParams {
        color: Color::WHITE,
        textures: TextureSet {
            color: Some(TextureRef::new("moon", "map", (512, 256), (1024, 512))),
            bump: Some(TextureRef::new("moon", "bump", (512, 256), (1024, 512))),
            specular: None,
        },
        bump_scale: 0.1,
        perceptual_roughness: 1.0,
        reflectance: 0.0,
        surface: Surface::Opaque,
    },
    // The Moon itself does not spin; this is the pivot's orbital rate.
    rotations_per_second: 0.05,
    animate: true,
    visible: true,
    position: Vec3::new(0.0, 0.0, -100.0),
};

/// Parallax depth per unit of bump scale.
pub const BUMP_TO_PARALLAX: f32 = 0.02;
