//! Near-Earth object overlay: today's NeoWs feed as labelled markers around Earth.

use bevy::prelude::*;

pub mod fetcher;
pub mod label;
pub mod markers;
pub mod systems;
pub mod types;

pub use systems::orient_neo_labels;

use label::LabelImages;
use systems::{apply_neo_results, refresh_on_key, request_today_feed};
use types::{NeoField, NeoFieldState};

/// Plugin for the NEO feed and its markers.
pub struct NeoPlugin;

impl Plugin for NeoPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<NeoFieldState>()
            .init_resource::<NeoField>()
            .init_resource::<LabelImages>()
            .add_systems(Startup, systems::setup_neo_worker)
            .add_systems(
                Update,
                (refresh_on_key, request_today_feed, apply_neo_results).chain(),
            );
    }
}
