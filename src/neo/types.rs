use bevy::prelude::*;
use chrono::NaiveDate;
use std::sync::{
    Arc, Mutex,
    mpsc::{Receiver, Sender},
};
use thiserror::Error;

/// One near-Earth object from the daily feed.
#[derive(Clone, Debug, PartialEq)]
pub struct NeoRecord {
    pub id: String,
    pub name: String,
    pub diameter_km: f64,
    pub miss_distance_km: f64,
    pub velocity_km_s: f64,
}

#[derive(Debug, Error)]
pub enum NeoFeedError {
    /// Transport failure. The request URL is stripped so the API key never
    /// reaches logs.
    #[error("request failed: {0}")]
    Http(reqwest::Error),
    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },
    #[error("invalid feed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("feed has no entries for {0}")]
    MissingDay(NaiveDate),
    #[error("invalid endpoint {url}: {reason}")]
    Url { url: String, reason: String },
}

impl From<reqwest::Error> for NeoFeedError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.without_url())
    }
}

/// Lifecycle of the NEO overlay.
#[derive(Resource, Clone, Debug, Default, PartialEq)]
pub enum NeoFieldState {
    #[default]
    Idle,
    Fetching {
        date: NaiveDate,
    },
    Populated {
        date: NaiveDate,
        count: usize,
    },
    /// Terminal for that day's data; nothing retries automatically.
    FetchFailed {
        error: String,
    },
    /// Disabled in settings, or the worker never started.
    Unavailable,
}

impl NeoFieldState {
    pub fn is_fetching(&self) -> bool {
        matches!(self, Self::Fetching { .. })
    }
}

/// Markers currently in the scene, in feed order.
#[derive(Resource, Debug, Default)]
pub struct NeoField {
    pub markers: Vec<Entity>,
}

impl NeoField {
    pub fn markers(&self) -> &[Entity] {
        &self.markers
    }
}

#[derive(Resource)]
pub struct NeoChannels {
    pub cmd_tx: Sender<NeoCommand>,
    pub res_rx: Arc<Mutex<Receiver<NeoResult>>>,
}

#[derive(Debug)]
pub enum NeoCommand {
    FetchDay { url: String, date: NaiveDate },
}

#[derive(Debug)]
pub enum NeoResult {
    Records {
        date: NaiveDate,
        records: Vec<NeoRecord>,
    },
    Failed {
        date: NaiveDate,
        error: NeoFeedError,
    },
}
