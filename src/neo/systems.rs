//! NEO systems (request, apply, label orientation).

use bevy::prelude::*;
use chrono::{NaiveDate, Utc};

use crate::core::orbit_camera::MainCamera;
use crate::neo::fetcher::{build_feed_url, start_neo_worker};
use crate::neo::label::LabelImages;
use crate::neo::markers::{LabelQuad, NeoLabel, NeoMarker, facing_rotation, spawn_marker};
use crate::neo::types::{NeoChannels, NeoCommand, NeoField, NeoFieldState, NeoResult};
use crate::settings::Settings;
use crate::visualization::earth::{BodyRadius, Earth};

pub fn setup_neo_worker(
    mut commands: Commands,
    settings: Res<Settings>,
    mut state: ResMut<NeoFieldState>,
    mut meshes: ResMut<Assets<Mesh>>,
) {
    if !settings.neo.enabled {
        info!("[INIT] NEO overlay disabled");
        *state = NeoFieldState::Unavailable;
        return;
    }
    commands.insert_resource(LabelQuad(meshes.add(Rectangle::new(1.0, 1.0))));
    commands.insert_resource(start_neo_worker());
    info!("[INIT] NEO worker started");
}

/// Queue a fetch for `date` and return the state that follows.
pub fn queue_fetch(channels: &NeoChannels, settings: &Settings, date: NaiveDate) -> NeoFieldState {
    let url = match build_feed_url(&settings.neo.endpoint, &settings.neo.api_key, date) {
        Ok(url) => url,
        Err(err) => {
            error!("[NEO] {}", err);
            return NeoFieldState::FetchFailed {
                error: err.to_string(),
            };
        }
    };
    match channels.cmd_tx.send(NeoCommand::FetchDay { url, date }) {
        Ok(()) => NeoFieldState::Fetching { date },
        Err(err) => {
            error!("[NEO] worker gone, cannot queue fetch: {}", err);
            NeoFieldState::Unavailable
        }
    }
}

/// Issue today's fetch whenever the field is idle.
pub fn request_today_feed(
    settings: Res<Settings>,
    mut state: ResMut<NeoFieldState>,
    channels: Option<Res<NeoChannels>>,
) {
    if *state != NeoFieldState::Idle {
        return;
    }
    let Some(channels) = channels else {
        warn!("[NEO] worker not initialized, overlay unavailable");
        *state = NeoFieldState::Unavailable;
        return;
    };
    let today = Utc::now().date_naive();
    *state = queue_fetch(&channels, &settings, today);
}

/// `R` re-fetches today's feed unless a fetch is already running.
pub fn refresh_on_key(keys: Res<ButtonInput<KeyCode>>, mut state: ResMut<NeoFieldState>) {
    if !keys.just_pressed(KeyCode::KeyR) {
        return;
    }
    if state.is_fetching() || *state == NeoFieldState::Unavailable {
        return;
    }
    info!("[NEO] refresh requested");
    *state = NeoFieldState::Idle;
}

/// Drain worker results. A new record set replaces every existing marker.
#[allow(clippy::too_many_arguments)]
pub fn apply_neo_results(
    mut commands: Commands,
    channels: Option<Res<NeoChannels>>,
    mut state: ResMut<NeoFieldState>,
    mut field: ResMut<NeoField>,
    earth: Query<(Entity, &BodyRadius), With<Earth>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut images: ResMut<Assets<Image>>,
    labels: Res<LabelImages>,
    label_quad: Option<Res<LabelQuad>>,
) {
    let Some(channels) = channels else { return };
    let Ok(guard) = channels.res_rx.lock() else {
        return;
    };

    while let Ok(msg) = guard.try_recv() {
        match msg {
            NeoResult::Records { date, records } => {
                let Ok((earth, radius)) = earth.single() else {
                    warn!("[NEO] no Earth in scene, dropping {} records", records.len());
                    *state = NeoFieldState::FetchFailed {
                        error: "Earth not spawned".to_string(),
                    };
                    continue;
                };
                let Some(label_quad) = label_quad.as_deref() else {
                    warn!("[NEO] label mesh missing, dropping {} records", records.len());
                    *state = NeoFieldState::Unavailable;
                    continue;
                };

                for marker in field.markers.drain(..) {
                    commands.entity(marker).despawn();
                }

                let mut rng = rand::thread_rng();
                let mut markers = Vec::with_capacity(records.len());
                for record in &records {
                    match spawn_marker(
                        &mut commands,
                        &mut meshes,
                        &mut materials,
                        &mut images,
                        labels.0.as_ref(),
                        &label_quad.0,
                        earth,
                        radius.0,
                        record,
                        &mut rng,
                    ) {
                        Ok(marker) => markers.push(marker),
                        Err(err) => warn!("[NEO] skipping {}: {}", record.name, err),
                    }
                }

                info!("[NEO] {} markers for {}", markers.len(), date);
                *state = NeoFieldState::Populated {
                    date,
                    count: markers.len(),
                };
                field.markers = markers;
            }
            NeoResult::Failed { date, error } => {
                warn!("[NEO] no data for {}: {}", date, error);
                *state = NeoFieldState::FetchFailed {
                    error: error.to_string(),
                };
            }
        }
    }
}

/// Turn every label toward the camera. Works in Earth's local space since
/// markers are Earth's children.
pub fn orient_neo_labels(
    field: Res<NeoField>,
    camera: Query<&Transform, (With<MainCamera>, Without<Earth>, Without<NeoLabel>)>,
    earth: Query<&Transform, (With<Earth>, Without<NeoLabel>)>,
    markers: Query<(&Transform, &Children), (With<NeoMarker>, Without<NeoLabel>)>,
    mut labels: Query<&mut Transform, With<NeoLabel>>,
) {
    if field.markers().is_empty() {
        return;
    }
    let (Ok(camera), Ok(earth)) = (camera.single(), earth.single()) else {
        return;
    };
    let to_earth = earth.compute_affine().inverse();
    let camera_local = to_earth.transform_point3(camera.translation);

    for &marker in field.markers() {
        let Ok((marker_tf, children)) = markers.get(marker) else {
            continue;
        };
        let target = camera_local - marker_tf.translation;
        for &child in children {
            let Ok(mut label) = labels.get_mut(child) else {
                continue;
            };
            if let Some(rotation) = facing_rotation(label.translation, target) {
                label.rotation = rotation;
            }
        }
    }
}
