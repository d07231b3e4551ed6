//! Label text and the image producer behind NEO billboards.

use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use bevy::text::DEFAULT_FONT_DATA;
use cosmic_text::{
    Attrs, Buffer, Color as GlyphColor, Family, FontSystem, Metrics, Shaping, SwashCache, Wrap,
    fontdb,
};
use std::sync::Mutex;

use crate::neo::types::NeoRecord;

pub const LABEL_WIDTH: u32 = 256;
pub const LABEL_HEIGHT: u32 = 128;

/// Name, diameter and miss distance, one per line.
///
/// The distance line reports the feed's kilometre figure divided by a
/// thousand and rounded, so a 100 000 000 km miss reads "100000 km".
pub fn label_lines(record: &NeoRecord) -> [String; 3] {
    [
        record.name.clone(),
        format!("Diameter: {:.2} km", record.diameter_km),
        format!("Distance: {} km", (record.miss_distance_km / 1000.0).round() as i64),
    ]
}

/// Turns label lines into an image for a billboard texture.
pub trait LabelImageProducer: Send + Sync {
    fn produce(&self, lines: &[String; 3]) -> Image;
}

/// Resource holding the active producer.
#[derive(Resource)]
pub struct LabelImages(pub Box<dyn LabelImageProducer>);

impl Default for LabelImages {
    fn default() -> Self {
        Self(Box::new(TextLabelProducer::default()))
    }
}

const PADDING: u32 = 8;
const FONT_SIZE: f32 = 18.0;
const LINE_HEIGHT: f32 = 36.0;

struct GlyphRaster {
    fonts: FontSystem,
    cache: SwashCache,
    family: Option<String>,
}

/// Rasterises label lines onto a translucent bordered panel with
/// cosmic-text, the shaper Bevy's own text stack sits on.
pub struct TextLabelProducer {
    pub background: [u8; 4],
    pub border: [u8; 4],
    pub ink: [u8; 4],
    raster: Mutex<GlyphRaster>,
}

impl Default for TextLabelProducer {
    fn default() -> Self {
        Self::from_font_data(DEFAULT_FONT_DATA.to_vec())
    }
}

impl TextLabelProducer {
    /// Build from raw TrueType/OpenType bytes. Unparseable data leaves the
    /// producer drawing bare panels.
    pub fn from_font_data(data: Vec<u8>) -> Self {
        let mut db = fontdb::Database::new();
        db.load_font_data(data);
        let family = db
            .faces()
            .next()
            .and_then(|face| face.families.first())
            .map(|(name, _)| name.clone());
        if family.is_none() {
            warn!("[NEO] label font did not load; labels will have no text");
        }
        Self {
            background: [0, 0, 0, 160],
            border: [255, 255, 255, 220],
            ink: [255, 255, 255, 255],
            raster: Mutex::new(GlyphRaster {
                fonts: FontSystem::new_with_locale_and_db("en-US".to_string(), db),
                cache: SwashCache::new(),
                family,
            }),
        }
    }

    fn draw_text(&self, data: &mut [u8], lines: &[String; 3]) {
        let Ok(mut guard) = self.raster.lock() else {
            warn!("[NEO] label rasteriser poisoned; drawing bare panel");
            return;
        };
        let GlyphRaster {
            fonts,
            cache,
            family,
        } = &mut *guard;
        let Some(family) = family.as_deref() else {
            return;
        };

        let inner_w = (LABEL_WIDTH - 2 * PADDING) as f32;
        let inner_h = (LABEL_HEIGHT - 2 * PADDING) as f32;
        let mut buffer = Buffer::new(fonts, Metrics::new(FONT_SIZE, LINE_HEIGHT));
        buffer.set_wrap(fonts, Wrap::None);
        buffer.set_size(fonts, Some(inner_w), Some(inner_h));
        let attrs = Attrs::new().family(Family::Name(family));
        buffer.set_text(fonts, &lines.join("\n"), &attrs, Shaping::Advanced, None);
        buffer.shape_until_scroll(fonts, false);

        let [r, g, b, a] = self.ink;
        buffer.draw(fonts, cache, GlyphColor::rgba(r, g, b, a), |x, y, w, h, color| {
            for dy in 0..h as i32 {
                for dx in 0..w as i32 {
                    let px = x + dx + PADDING as i32;
                    let py = y + dy + PADDING as i32;
                    let inside = px > 0
                        && py > 0
                        && px < LABEL_WIDTH as i32 - 1
                        && py < LABEL_HEIGHT as i32 - 1;
                    if !inside {
                        continue;
                    }
                    let i = ((py as u32 * LABEL_WIDTH + px as u32) * 4) as usize;
                    blend_over(&mut data[i..i + 4], color.as_rgba());
                }
            }
        });
    }
}

/// Source-over blend of a straight-alpha colour onto a pixel.
fn blend_over(dst: &mut [u8], src: [u8; 4]) {
    let sa = src[3] as u32;
    if sa == 0 {
        return;
    }
    let inv = 255 - sa;
    for c in 0..3 {
        dst[c] = ((src[c] as u32 * sa + dst[c] as u32 * inv) / 255) as u8;
    }
    dst[3] = (sa + dst[3] as u32 * inv / 255).min(255) as u8;
}

impl LabelImageProducer for TextLabelProducer {
    fn produce(&self, lines: &[String; 3]) -> Image {
        let (w, h) = (LABEL_WIDTH, LABEL_HEIGHT);
        let mut data = vec![0u8; (w * h * 4) as usize];
        for y in 0..h {
            for x in 0..w {
                let edge = x == 0 || y == 0 || x == w - 1 || y == h - 1;
                let i = ((y * w + x) * 4) as usize;
                data[i..i + 4].copy_from_slice(if edge { &self.border } else { &self.background });
            }
        }

        self.draw_text(&mut data, lines);

        Image::new(
            Extent3d {
                width: w,
                height: h,
                depth_or_array_layers: 1,
            },
            TextureDimension::D2,
            data,
            TextureFormat::Rgba8UnormSrgb,
            RenderAssetUsages::RENDER_WORLD,
        )
    }
}
