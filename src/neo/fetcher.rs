//! NeoWs feed worker.
//!
//! Runs on its own thread with a private tokio runtime. The frame loop sends
//! [`NeoCommand`]s and drains [`NeoResult`]s; nothing else is shared.

use crate::neo::types::{NeoChannels, NeoCommand, NeoFeedError, NeoRecord, NeoResult};
use bevy::log::{error, info, warn};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::sync::{
    Arc, Mutex,
    mpsc::{self},
};
use std::thread;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn start_neo_worker() -> NeoChannels {
    let (cmd_tx, cmd_rx) = mpsc::channel::<NeoCommand>();
    let (res_tx, res_rx) = mpsc::channel::<NeoResult>();

    thread::spawn(move || {
        let rt = match tokio::runtime::Runtime::new() {
            Ok(rt) => rt,
            Err(err) => {
                error!("[NEO] failed to start runtime: {}", err);
                return;
            }
        };
        rt.block_on(async move {
            let client = reqwest::Client::new();

            while let Ok(cmd) = cmd_rx.recv() {
                let msg = match cmd {
                    NeoCommand::FetchDay { url, date } => {
                        match fetch_day(&client, &url, date).await {
                            Ok(records) => {
                                info!("[NEO] {} objects for {}", records.len(), date);
                                NeoResult::Records { date, records }
                            }
                            Err(error) => {
                                error!("[NEO] fetch for {} failed: {}", date, error);
                                NeoResult::Failed { date, error }
                            }
                        }
                    }
                };
                if res_tx.send(msg).is_err() {
                    break;
                }
            }
        });
    });

    NeoChannels {
        cmd_tx,
        res_rx: Arc::new(Mutex::new(res_rx)),
    }
}

/// Feed URL for a single day (start and end both `date`).
pub fn build_feed_url(endpoint: &str, api_key: &str, date: NaiveDate) -> Result<String, NeoFeedError> {
    let mut url = reqwest::Url::parse(endpoint).map_err(|err| NeoFeedError::Url {
        url: endpoint.to_string(),
        reason: err.to_string(),
    })?;
    let day = date.format(DATE_FORMAT).to_string();
    url.query_pairs_mut()
        .append_pair("start_date", &day)
        .append_pair("end_date", &day)
        .append_pair("api_key", api_key);
    Ok(url.to_string())
}

async fn fetch_day(
    client: &reqwest::Client,
    url: &str,
    date: NaiveDate,
) -> Result<Vec<NeoRecord>, NeoFeedError> {
    let resp = client.get(url).send().await?;
    let status = resp.status();
    let body = resp.text().await?;
    if !status.is_success() {
        return Err(NeoFeedError::Status {
            status: status.as_u16(),
            url: redact_api_key(url),
        });
    }
    parse_feed(&body, date)
}

fn redact_api_key(url: &str) -> String {
    match reqwest::Url::parse(url) {
        Ok(mut parsed) => {
            let pairs: Vec<(String, String)> = parsed
                .query_pairs()
                .map(|(k, v)| {
                    let v = if k == "api_key" { "***".into() } else { v };
                    (k.into_owned(), v.into_owned())
                })
                .collect();
            parsed.query_pairs_mut().clear().extend_pairs(pairs);
            parsed.to_string()
        }
        Err(_) => url.to_string(),
    }
}

#[derive(Deserialize)]
struct FeedResponse {
    near_earth_objects: BTreeMap<String, Vec<RawNeo>>,
}

#[derive(Deserialize)]
struct RawNeo {
    #[serde(deserialize_with = "flexible_string")]
    id: String,
    name: String,
    estimated_diameter: EstimatedDiameter,
    #[serde(default)]
    close_approach_data: Vec<CloseApproach>,
}

#[derive(Deserialize)]
struct EstimatedDiameter {
    kilometers: DiameterRange,
}

#[derive(Deserialize)]
struct DiameterRange {
    #[serde(deserialize_with = "flexible_f64")]
    estimated_diameter_max: f64,
}

#[derive(Deserialize)]
struct CloseApproach {
    miss_distance: MissDistance,
    relative_velocity: RelativeVelocity,
}

#[derive(Deserialize)]
struct MissDistance {
    #[serde(deserialize_with = "flexible_f64")]
    kilometers: f64,
}

#[derive(Deserialize)]
struct RelativeVelocity {
    #[serde(deserialize_with = "flexible_f64")]
    kilometers_per_second: f64,
}

/// The feed sends most numbers as JSON strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    String(String),
}

fn flexible_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

fn flexible_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n.to_string()),
        NumberOrString::String(s) => Ok(s),
    }
}

/// Records for `date`, falling back to the first day in the response.
/// Objects without a close approach are skipped.
pub fn parse_feed(body: &str, date: NaiveDate) -> Result<Vec<NeoRecord>, NeoFeedError> {
    let mut feed: FeedResponse = serde_json::from_str(body)?;
    let key = date.format(DATE_FORMAT).to_string();
    let items = match feed.near_earth_objects.remove(&key) {
        Some(items) => items,
        None => feed
            .near_earth_objects
            .into_values()
            .next()
            .ok_or(NeoFeedError::MissingDay(date))?,
    };

    let mut records = Vec::with_capacity(items.len());
    for item in items {
        let Some(approach) = item.close_approach_data.into_iter().next() else {
            warn!("[NEO] {} has no close approach data, skipping", item.name);
            continue;
        };
        records.push(NeoRecord {
            id: item.id,
            name: item.name,
            diameter_km: item.estimated_diameter.kilometers.estimated_diameter_max,
            miss_distance_km: approach.miss_distance.kilometers,
            velocity_km_s: approach.relative_velocity.kilometers_per_second,
        });
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[test]
    fn url_scopes_start_and_end_to_one_day() {
        let url = build_feed_url("https://api.nasa.gov/neo/rest/v1/feed", "KEY", day()).unwrap();
        assert_eq!(
            url,
            "https://api.nasa.gov/neo/rest/v1/feed?start_date=2024-03-15&end_date=2024-03-15&api_key=KEY"
        );
    }

    #[test]
    fn bad_endpoint_is_typed_error() {
        let err = build_feed_url("not a url", "KEY", day()).unwrap_err();
        assert!(matches!(err, NeoFeedError::Url { .. }));
    }

    #[test]
    fn parse_single_record() {
        let body = r#"{
            "element_count": 1,
            "near_earth_objects": {
                "2024-03-15": [{
                    "id": "1",
                    "name": "Test",
                    "estimated_diameter": { "kilometers": {
                        "estimated_diameter_min": 1.0,
                        "estimated_diameter_max": 2.0
                    } },
                    "close_approach_data": [
                        {
                            "miss_distance": { "kilometers": "100000000" },
                            "relative_velocity": { "kilometers_per_second": "5" }
                        },
                        {
                            "miss_distance": { "kilometers": "1" },
                            "relative_velocity": { "kilometers_per_second": "1" }
                        }
                    ]
                }]
            }
        }"#;
        let records = parse_feed(body, day()).unwrap();
        assert_eq!(
            records,
            vec![NeoRecord {
                id: "1".to_string(),
                name: "Test".to_string(),
                diameter_km: 2.0,
                miss_distance_km: 100_000_000.0,
                velocity_km_s: 5.0,
            }]
        );
    }

    #[test]
    fn numeric_fields_accept_numbers() {
        let body = r#"{ "near_earth_objects": { "2024-03-15": [{
            "id": 42, "name": "(2024 AB)",
            "estimated_diameter": { "kilometers": { "estimated_diameter_max": "0.5" } },
            "close_approach_data": [{
                "miss_distance": { "kilometers": 7500000.5 },
                "relative_velocity": { "kilometers_per_second": 12.25 }
            }]
        }] } }"#;
        let records = parse_feed(body, day()).unwrap();
        assert_eq!(records[0].id, "42");
        assert_eq!(records[0].diameter_km, 0.5);
        assert_eq!(records[0].miss_distance_km, 7_500_000.5);
        assert_eq!(records[0].velocity_km_s, 12.25);
    }

    #[test]
    fn falls_back_to_first_day_in_response() {
        let body = r#"{ "near_earth_objects": {
            "2024-03-14": [{
                "id": "9", "name": "Yesterday",
                "estimated_diameter": { "kilometers": { "estimated_diameter_max": 1 } },
                "close_approach_data": [{
                    "miss_distance": { "kilometers": "1" },
                    "relative_velocity": { "kilometers_per_second": "1" }
                }]
            }]
        } }"#;
        let records = parse_feed(body, day()).unwrap();
        assert_eq!(records[0].name, "Yesterday");
    }

    #[test]
    fn object_without_approach_is_skipped() {
        let body = r#"{ "near_earth_objects": { "2024-03-15": [{
            "id": "3", "name": "Lonely",
            "estimated_diameter": { "kilometers": { "estimated_diameter_max": 1 } },
            "close_approach_data": []
        }] } }"#;
        assert!(parse_feed(body, day()).unwrap().is_empty());
    }

    #[test]
    fn empty_feed_is_missing_day() {
        let body = r#"{ "near_earth_objects": {} }"#;
        assert!(matches!(
            parse_feed(body, day()),
            Err(NeoFeedError::MissingDay(d)) if d == day()
        ));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        assert!(matches!(
            parse_feed("<html>rate limited</html>", day()),
            Err(NeoFeedError::Json(_))
        ));
        assert!(matches!(
            parse_feed(r#"{ "near_earth_objects": { "2024-03-15": [{ "id": "1" }] } }"#, day()),
            Err(NeoFeedError::Json(_))
        ));
    }

    #[test]
    fn transport_error_hides_api_key() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(5))
            .build()
            .unwrap();
        let url = build_feed_url("http://127.0.0.1:1/neo/rest/v1/feed", "SECRET", day()).unwrap();

        let err = rt.block_on(fetch_day(&client, &url, day())).unwrap_err();
        assert!(matches!(err, NeoFeedError::Http(_)));
        let NeoFeedError::Http(inner) = &err else { unreachable!() };
        assert!(inner.url().is_none());
        assert!(!err.to_string().contains("SECRET"));
        assert!(!format!("{:?}", err).contains("SECRET"));
    }

    #[test]
    fn status_error_hides_api_key() {
        let redacted = redact_api_key("https://x.test/feed?start_date=a&api_key=SECRET");
        assert!(!redacted.contains("SECRET"));
        assert!(redacted.contains("start_date=a"));
    }
}
