//! One-time shadow setup over the built scene.

use bevy::light::{
    CascadeShadowConfig, CascadeShadowConfigBuilder, DirectionalLightShadowMap, NotShadowCaster,
    ShadowFilteringMethod,
};
use bevy::prelude::*;

use crate::scene::SceneBodies;
use crate::settings::Settings;

pub const SHADOW_MAP_SIZE: usize = 512;
pub const SHADOW_NEAR: f32 = 1.0;
/// Far enough from the camera to cover Earth and the Moon's whole orbit.
pub const SHADOW_FAR: f32 = 1250.0;

pub fn shadow_cascades() -> CascadeShadowConfig {
    CascadeShadowConfigBuilder {
        num_cascades: 1,
        minimum_distance: SHADOW_NEAR,
        maximum_distance: SHADOW_FAR,
        ..default()
    }
    .build()
}

/// Sun casts; Earth and Moon cast and receive; the cloud layer only receives.
/// NEO markers opt out on their own when spawned.
pub fn configure_shadows(
    mut commands: Commands,
    settings: Res<Settings>,
    bodies: Option<Res<SceneBodies>>,
    mut lights: Query<&mut DirectionalLight>,
) {
    let Some(bodies) = bodies else {
        warn!("configure_shadows: scene not built, skipping");
        return;
    };
    if !settings.shadows {
        info!("[INIT] Shadows disabled");
        return;
    }
    let Ok(mut sun) = lights.get_mut(bodies.sun) else {
        warn!("configure_shadows: sun light {:?} not found", bodies.sun);
        return;
    };
    sun.shadows_enabled = true;
    sun.shadow_depth_bias = 0.0;

    commands.entity(bodies.sun).insert(shadow_cascades());
    commands.entity(bodies.cloud).insert(NotShadowCaster);
    commands
        .entity(bodies.camera)
        .insert(ShadowFilteringMethod::Gaussian);
    commands.insert_resource(DirectionalLightShadowMap {
        size: SHADOW_MAP_SIZE,
    });
    info!("[INIT] Shadows configured");
}
