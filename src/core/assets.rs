//! Texture naming conventions and quality tiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Selectable texture resolution set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QualityTier {
    #[serde(rename = "sd")]
    Standard,
    #[default]
    #[serde(rename = "hd")]
    High,
}

impl FromStr for QualityTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sd" | "standard" => Ok(Self::Standard),
            "hd" | "high" => Ok(Self::High),
            other => Err(format!("unknown quality tier '{}', expected sd or hd", other)),
        }
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => f.write_str("sd"),
            Self::High => f.write_str("hd"),
        }
    }
}

/// A texture addressed as `{subject}_{map}_{W}x{H}.jpg`, with one size per tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextureRef {
    pub subject: &'static str,
    pub map: &'static str,
    pub standard: (u32, u32),
    pub high: (u32, u32),
}

impl TextureRef {
    pub const fn new(
        subject: &'static str,
        map: &'static str,
        standard: (u32, u32),
        high: (u32, u32),
    ) -> Self {
        Self {
            subject,
            map,
            standard,
            high,
        }
    }

    pub fn size(&self, tier: QualityTier) -> (u32, u32) {
        match tier {
            QualityTier::Standard => self.standard,
            QualityTier::High => self.high,
        }
    }

    pub fn file_name(&self, tier: QualityTier) -> String {
        let (w, h) = self.size(tier);
        format!("{}_{}_{}x{}.jpg", self.subject, self.map, w, h)
    }

    /// Asset path under `base` (empty base means the asset root).
    pub fn path(&self, base: &str, tier: QualityTier) -> String {
        join_asset_path(base, &self.file_name(tier))
    }
}

pub fn join_asset_path(base: &str, file: &str) -> String {
    let base = base.trim_end_matches('/');
    if base.is_empty() {
        file.to_string()
    } else {
        format!("{}/{}", base, file)
    }
}
