//! Starfield background assembled from six cube faces.

use bevy::asset::{LoadState, RenderAssetUsages};
use bevy::core_pipeline::Skybox;
use bevy::prelude::*;
use bevy::render::render_resource::{
    Extent3d, TextureDimension, TextureViewDescriptor, TextureViewDimension,
};
use thiserror::Error;

use crate::core::assets::{QualityTier, join_asset_path};
use crate::core::orbit_camera::MainCamera;

/// Cube face order expected by the GPU: +X, -X, +Y, -Y, +Z, -Z.
pub const SKYMAP_FACES: [&str; 6] = ["posx", "negx", "posy", "negy", "posz", "negz"];
const SKYBOX_BRIGHTNESS: f32 = 1000.0;

pub fn skymap_face_size(tier: QualityTier) -> u32 {
    match tier {
        QualityTier::Standard => 512,
        QualityTier::High => 1024,
    }
}

pub fn skymap_face_paths(base: &str, tier: QualityTier) -> [String; 6] {
    let size = skymap_face_size(tier);
    SKYMAP_FACES.map(|pos| join_asset_path(base, &format!("skymap_{}_{}x{}.jpg", pos, size, size)))
}

#[derive(Debug, Error, PartialEq)]
pub enum SkymapError {
    #[error("face {0} has no pixel data")]
    MissingData(&'static str),
    #[error("face {face} is {got:?}, expected {expected:?}")]
    Mismatch {
        face: &'static str,
        got: (u32, u32),
        expected: (u32, u32),
    },
    #[error("faces must be square, got {0}x{1}")]
    NotSquare(u32, u32),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkymapState {
    Loading,
    Ready(Handle<Image>),
    /// Background stays the clear colour.
    Failed,
}

#[derive(Resource)]
pub struct Skymap {
    pub faces: [Handle<Image>; 6],
    pub state: SkymapState,
}

impl Skymap {
    pub fn load(asset_server: &AssetServer, base: &str, tier: QualityTier) -> Self {
        Self {
            faces: skymap_face_paths(base, tier).map(|path| asset_server.load(path)),
            state: SkymapState::Loading,
        }
    }
}

/// Stack six equally sized faces into one cube texture.
pub fn stack_faces(faces: [&Image; 6]) -> Result<Image, SkymapError> {
    let first = faces[0];
    let (width, height) = (first.width(), first.height());
    if width != height {
        return Err(SkymapError::NotSquare(width, height));
    }
    let format = first.texture_descriptor.format;

    let mut data = Vec::new();
    for (&face, image) in SKYMAP_FACES.iter().zip(faces) {
        let size = (image.width(), image.height());
        if size != (width, height) || image.texture_descriptor.format != format {
            return Err(SkymapError::Mismatch {
                face,
                got: size,
                expected: (width, height),
            });
        }
        let Some(bytes) = image.data.as_ref() else {
            return Err(SkymapError::MissingData(face));
        };
        data.extend_from_slice(bytes);
    }

    let mut cube = Image::new(
        Extent3d {
            width,
            height,
            depth_or_array_layers: 6,
        },
        TextureDimension::D2,
        data,
        format,
        RenderAssetUsages::RENDER_WORLD,
    );
    cube.texture_view_descriptor = Some(TextureViewDescriptor {
        dimension: Some(TextureViewDimension::Cube),
        ..default()
    });
    Ok(cube)
}

/// Once all six faces have loaded, build the cube and mount it on the camera.
pub fn assemble_skymap(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    mut images: ResMut<Assets<Image>>,
    skymap: Option<ResMut<Skymap>>,
    cameras: Query<Entity, (With<MainCamera>, Without<Skybox>)>,
) {
    let Some(mut skymap) = skymap else { return };
    if skymap.state != SkymapState::Loading {
        return;
    }

    let states: Vec<Option<LoadState>> = skymap
        .faces
        .iter()
        .map(|handle| asset_server.get_load_state(handle.id()))
        .collect();

    let mut loaded = 0;
    for (face, state) in SKYMAP_FACES.iter().zip(states) {
        match state {
            Some(LoadState::Loaded) => loaded += 1,
            Some(LoadState::Failed(err)) => {
                warn!("Skymap face {} failed to load: {}", face, err);
                skymap.state = SkymapState::Failed;
                return;
            }
            _ => {}
        }
    }
    if loaded < SKYMAP_FACES.len() {
        return;
    }

    let stacked = {
        let faces = skymap.faces.each_ref().map(|h| images.get(h));
        let Some(faces) = collect_faces(faces) else {
            return;
        };
        stack_faces(faces)
    };

    match stacked {
        Ok(cube) => {
            let handle = images.add(cube);
            for camera in &cameras {
                commands.entity(camera).insert(Skybox {
                    image: handle.clone(),
                    brightness: SKYBOX_BRIGHTNESS,
                    ..default()
                });
            }
            info!("[INIT] Skymap ready");
            skymap.state = SkymapState::Ready(handle);
        }
        Err(err) => {
            warn!("Skymap unavailable: {}", err);
            skymap.state = SkymapState::Failed;
        }
    }
}

fn collect_faces(faces: [Option<&Image>; 6]) -> Option<[&Image; 6]> {
    let [a, b, c, d, e, f] = faces;
    Some([a?, b?, c?, d?, e?, f?])
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::render::render_resource::TextureFormat;

    fn face(size: u32, fill: u8) -> Image {
        Image::new_fill(
            Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 1,
            },
            TextureDimension::D2,
            &[fill, fill, fill, 255],
            TextureFormat::Rgba8UnormSrgb,
            RenderAssetUsages::default(),
        )
    }

    #[test]
    fn face_paths_use_position_and_tier() {
        let paths = skymap_face_paths("textures", QualityTier::High);
        assert_eq!(paths[0], "textures/skymap_posx_1024x1024.jpg");
        assert_eq!(paths[5], "textures/skymap_negz_1024x1024.jpg");
        let sd = skymap_face_paths("", QualityTier::Standard);
        assert_eq!(sd[3], "skymap_negy_512x512.jpg");
    }

    #[test]
    fn stacks_faces_in_order() {
        let faces: Vec<Image> = (0..6).map(|i| face(2, i as u8 * 10)).collect();
        let refs = [&faces[0], &faces[1], &faces[2], &faces[3], &faces[4], &faces[5]];
        let cube = stack_faces(refs).unwrap();

        assert_eq!(cube.texture_descriptor.size.depth_or_array_layers, 6);
        let data = cube.data.as_ref().unwrap();
        assert_eq!(data.len(), 6 * 2 * 2 * 4);
        // first pixel of the fourth face
        assert_eq!(data[3 * 16], 30);
        assert_eq!(
            cube.texture_view_descriptor.as_ref().unwrap().dimension,
            Some(TextureViewDimension::Cube)
        );
    }

    #[test]
    fn mismatched_face_is_rejected() {
        let faces: Vec<Image> = (0..5).map(|_| face(2, 0)).collect();
        let odd = face(4, 0);
        let refs = [&faces[0], &faces[1], &odd, &faces[2], &faces[3], &faces[4]];
        assert_eq!(
            stack_faces(refs).unwrap_err(),
            SkymapError::Mismatch {
                face: "posy",
                got: (4, 4),
                expected: (2, 2),
            }
        );
    }
}
