//! Additive lens flare anchored to the sun light.
//!
//! Elements are quads parented to the sun. Each frame they are laid out in
//! screen space along the line from the sun's projected position (distance
//! 0) through the screen centre to its mirror point (distance 1), then
//! placed on a plane a fixed distance in front of the camera.

use bevy::light::{NotShadowCaster, NotShadowReceiver};
use bevy::prelude::*;

use crate::core::assets::TextureRef;
use crate::core::orbit_camera::MainCamera;
use crate::view::ViewportSize;
use crate::visualization::earth::{BodyRadius, Earth};
use crate::visualization::factory::TextureSource;

/// Distance from the camera of the plane flare quads are drawn on.
const FLARE_PLANE_DISTANCE: f32 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlareTexture {
    Sun,
    Circle,
    Hexagon,
}

impl FlareTexture {
    pub fn texture_ref(self) -> TextureRef {
        match self {
            Self::Sun => TextureRef::new("lens_flare", "sun", (512, 512), (1024, 1024)),
            Self::Circle => TextureRef::new("lens_flare", "circle", (32, 32), (64, 64)),
            Self::Hexagon => TextureRef::new("lens_flare", "hexagon", (128, 128), (256, 256)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlareSpec {
    pub texture: FlareTexture,
    /// Screen pixels.
    pub size: f32,
    pub opacity: f32,
    /// 0 at the light, 1 at its mirror point through the screen centre.
    pub distance: f32,
}

const fn flare(texture: FlareTexture, size: f32, opacity: f32, distance: f32) -> FlareSpec {
    FlareSpec {
        texture,
        size,
        opacity,
        distance,
    }
}

pub const FLARE_ELEMENTS: [FlareSpec; 9] = [
    flare(FlareTexture::Sun, 1400.0, 1.0, 0.0),
    flare(FlareTexture::Circle, 20.0, 0.4, 0.63),
    flare(FlareTexture::Circle, 40.0, 0.3, 0.64),
    flare(FlareTexture::Circle, 70.0, 0.8, 0.7),
    flare(FlareTexture::Circle, 110.0, 0.7, 0.8),
    flare(FlareTexture::Circle, 60.0, 0.4, 0.85),
    flare(FlareTexture::Hexagon, 30.0, 0.4, 0.86),
    flare(FlareTexture::Hexagon, 120.0, 0.3, 0.9),
    flare(FlareTexture::Hexagon, 260.0, 0.4, 1.0),
];

/// On the light entity: its flare quads, in element order.
#[derive(Component, Debug, Default)]
pub struct LensFlare {
    pub elements: Vec<Entity>,
}

#[derive(Component, Clone, Copy, Debug)]
pub struct FlareElement(pub FlareSpec);

pub fn spawn_lens_flare(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    textures: &TextureSource,
    light: Entity,
) {
    let quad = meshes.add(Rectangle::new(1.0, 1.0));
    let mut elements = Vec::with_capacity(FLARE_ELEMENTS.len());

    for spec in FLARE_ELEMENTS {
        let path = spec.texture.texture_ref().path(textures.base, textures.tier);
        let material = materials.add(StandardMaterial {
            base_color: Color::WHITE.with_alpha(spec.opacity),
            base_color_texture: Some(textures.asset_server.load(path)),
            alpha_mode: AlphaMode::Add,
            unlit: true,
            ..default()
        });
        let element = commands
            .spawn((
                Mesh3d(quad.clone()),
                MeshMaterial3d(material),
                Transform::default(),
                Visibility::Hidden,
                NotShadowCaster,
                NotShadowReceiver,
                FlareElement(spec),
                Name::new("Lens Flare Element"),
            ))
            .id();
        elements.push(element);
    }

    commands
        .entity(light)
        .add_children(&elements)
        .insert(LensFlare { elements });
}

/// Camera parameters the layout needs.
#[derive(Clone, Copy, Debug)]
pub struct FlareView {
    pub position: Vec3,
    pub rotation: Quat,
    pub fov_y: f32,
    pub aspect: f32,
    pub viewport_height: f32,
}

impl FlareView {
    /// Light position on the image plane at unit depth, or `None` when it is
    /// behind the camera or outside the frustum.
    pub fn light_on_screen(&self, light: Vec3) -> Option<Vec2> {
        let view = self.rotation.inverse() * (light - self.position);
        if view.z >= 0.0 {
            return None;
        }
        let p = Vec2::new(view.x, view.y) / -view.z;
        let half_h = (self.fov_y * 0.5).tan();
        let half_w = half_h * self.aspect;
        if p.x.abs() > half_w || p.y.abs() > half_h {
            return None;
        }
        Some(p)
    }

    /// World-space centre and edge length of one element.
    pub fn place(&self, light_on_screen: Vec2, spec: &FlareSpec) -> (Vec3, f32) {
        let p = light_on_screen * (1.0 - 2.0 * spec.distance);
        let local = Vec3::new(p.x, p.y, -1.0) * FLARE_PLANE_DISTANCE;
        let world = self.position + self.rotation * local;
        let units_per_pixel =
            2.0 * FLARE_PLANE_DISTANCE * (self.fov_y * 0.5).tan() / self.viewport_height.max(1.0);
        (world, spec.size * units_per_pixel)
    }
}

/// Whether the segment `from -> to` passes through the sphere.
pub fn segment_hits_sphere(from: Vec3, to: Vec3, center: Vec3, radius: f32) -> bool {
    let d = to - from;
    let f = from - center;
    let a = d.length_squared();
    if a == 0.0 {
        return f.length_squared() <= radius * radius;
    }
    let b = 2.0 * f.dot(d);
    let c = f.length_squared() - radius * radius;
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return false;
    }
    let sqrt = disc.sqrt();
    let t1 = (-b - sqrt) / (2.0 * a);
    let t2 = (-b + sqrt) / (2.0 * a);
    (0.0..=1.0).contains(&t1) || (0.0..=1.0).contains(&t2) || (t1 < 0.0 && t2 > 1.0)
}

pub fn layout_lens_flares(
    viewport: Res<ViewportSize>,
    camera: Query<(&Transform, &Projection), With<MainCamera>>,
    lights: Query<(&Transform, &LensFlare)>,
    occluders: Query<(&Transform, &BodyRadius), With<Earth>>,
    mut elements: Query<
        (&FlareElement, &mut Transform, &mut Visibility),
        (Without<MainCamera>, Without<LensFlare>, Without<Earth>),
    >,
) {
    let Ok((cam_tf, projection)) = camera.single() else {
        return;
    };
    let Projection::Perspective(perspective) = projection else {
        return;
    };
    let view = FlareView {
        position: cam_tf.translation,
        rotation: cam_tf.rotation,
        fov_y: perspective.fov,
        aspect: viewport.aspect,
        viewport_height: viewport.height,
    };

    for (light_tf, flare) in &lights {
        let occluded = occluders.iter().any(|(tf, radius)| {
            segment_hits_sphere(view.position, light_tf.translation, tf.translation, radius.0)
        });
        let on_screen = if occluded {
            None
        } else {
            view.light_on_screen(light_tf.translation)
        };
        let to_local = light_tf.rotation.inverse();

        for &entity in &flare.elements {
            let Ok((element, mut transform, mut visibility)) = elements.get_mut(entity) else {
                continue;
            };
            let Some(screen) = on_screen else {
                *visibility = Visibility::Hidden;
                continue;
            };
            let (world, size) = view.place(screen, &element.0);
            transform.translation = to_local * (world - light_tf.translation);
            transform.rotation = to_local * view.rotation;
            transform.scale = Vec3::new(size, size, 1.0);
            *visibility = Visibility::Inherited;
        }
    }
}
