//! Specular masks converted to roughness maps.
//!
//! A specular mask is bright where a surface is shiny, but the PBR material
//! reads roughness from the green channel, where bright means rough. The mask
//! is inverted on the CPU once it has loaded, then mounted on the material.

use bevy::asset::{LoadState, RenderAssetUsages};
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};

/// Specular mask still waiting to be turned into a roughness map for this
/// entity's material.
#[derive(Component, Clone, Debug)]
pub struct PendingSpecular(pub Handle<Image>);

/// Build a metallic/roughness texture from a specular mask: green is
/// `255 - luminance`, blue (metallic) is zero. Only 8-bit RGBA masks are
/// understood.
pub fn roughness_from_specular(mask: &Image) -> Option<Image> {
    if !matches!(
        mask.texture_descriptor.format,
        TextureFormat::Rgba8Unorm | TextureFormat::Rgba8UnormSrgb
    ) {
        return None;
    }
    let bytes = mask.data.as_ref()?;
    let data: Vec<u8> = bytes
        .chunks_exact(4)
        .flat_map(|px| {
            let luminance = (px[0] as u16 + px[1] as u16 + px[2] as u16) / 3;
            [0, 255 - luminance as u8, 0, 255]
        })
        .collect();

    Some(Image::new(
        Extent3d {
            width: mask.width(),
            height: mask.height(),
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        data,
        TextureFormat::Rgba8Unorm,
        RenderAssetUsages::RENDER_WORLD,
    ))
}

pub fn apply_specular_maps(
    mut commands: Commands,
    asset_server: Option<Res<AssetServer>>,
    mut images: ResMut<Assets<Image>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    pending: Query<(Entity, &PendingSpecular, &MeshMaterial3d<StandardMaterial>)>,
) {
    for (entity, specular, mesh_material) in &pending {
        if let Some(server) = asset_server.as_deref()
            && let Some(LoadState::Failed(err)) = server.get_load_state(specular.0.id())
        {
            warn!("Specular map failed to load, keeping flat roughness: {}", err);
            commands.entity(entity).remove::<PendingSpecular>();
            continue;
        }
        let Some(mask) = images.get(&specular.0) else {
            continue;
        };

        commands.entity(entity).remove::<PendingSpecular>();
        let Some(roughness) = roughness_from_specular(mask) else {
            warn!(
                "Specular map format {:?} not supported, keeping flat roughness",
                mask.texture_descriptor.format
            );
            continue;
        };
        let handle = images.add(roughness);
        if let Some(material) = materials.get_mut(&mesh_material.0) {
            material.metallic_roughness_texture = Some(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask(pixels: &[[u8; 4]], format: TextureFormat) -> Image {
        Image::new(
            Extent3d {
                width: pixels.len() as u32,
                height: 1,
                depth_or_array_layers: 1,
            },
            TextureDimension::D2,
            pixels.concat(),
            format,
            RenderAssetUsages::default(),
        )
    }

    #[test]
    fn shiny_ocean_becomes_smooth_and_land_rough() {
        let spec = mask(
            &[[255, 255, 255, 255], [0, 0, 0, 255], [90, 120, 150, 255]],
            TextureFormat::Rgba8UnormSrgb,
        );
        let rough = roughness_from_specular(&spec).unwrap();
        assert_eq!(rough.texture_descriptor.format, TextureFormat::Rgba8Unorm);
        let data = rough.data.as_ref().unwrap();
        assert_eq!(&data[0..4], &[0, 0, 0, 255]);
        assert_eq!(&data[4..8], &[0, 255, 0, 255]);
        assert_eq!(data[9], 255 - 120);
    }

    #[test]
    fn unsupported_format_is_skipped() {
        let spec = Image::new_fill(
            Extent3d::default(),
            TextureDimension::D2,
            &[0; 8],
            TextureFormat::Rg32Float,
            RenderAssetUsages::default(),
        );
        assert!(roughness_from_specular(&spec).is_none());
    }

    #[test]
    fn loaded_mask_is_mounted_inverted_once() {
        let mut world = World::new();
        let mut images = Assets::<Image>::default();
        let specular = images.add(mask(&[[255, 255, 255, 255]], TextureFormat::Rgba8UnormSrgb));
        let waiting = images.reserve_handle();
        world.insert_resource(images);
        let mut materials = Assets::<StandardMaterial>::default();
        let earth_mat = materials.add(StandardMaterial::default());
        let other_mat = materials.add(StandardMaterial::default());
        world.insert_resource(materials);

        let earth = world
            .spawn((MeshMaterial3d(earth_mat.clone()), PendingSpecular(specular)))
            .id();
        let other = world
            .spawn((MeshMaterial3d(other_mat.clone()), PendingSpecular(waiting)))
            .id();

        let mut schedule = Schedule::default();
        schedule.add_systems(apply_specular_maps);
        schedule.run(&mut world);

        assert!(world.get::<PendingSpecular>(earth).is_none());
        let materials = world.resource::<Assets<StandardMaterial>>();
        let texture = materials.get(&earth_mat).unwrap().metallic_roughness_texture.clone().unwrap();
        let image = world.resource::<Assets<Image>>().get(&texture).unwrap();
        assert_eq!(image.data.as_ref().unwrap()[1], 0);

        // a mask that has not arrived keeps waiting
        assert!(world.get::<PendingSpecular>(other).is_some());
        assert!(materials.get(&other_mat).unwrap().metallic_roughness_texture.is_none());
    }
}
