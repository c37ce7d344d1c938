//! Normalized market data types and the provider abstraction

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Where a record came from. Fallback records are placeholders substituted
/// when the live provider fails or the daily call budget is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordSource {
    Live,
    Fallback,
}

/// Normalized snapshot for one instrument. Constructed only at the
/// provider/fallback boundary, so every field a page reads is always
/// present and type-correct; numeric fields default to `0.0` when the
/// provider omits them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRecord {
    pub ticker: String,
    pub name: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub volume: f64,
    pub currency: String,
    pub timestamp: DateTime<Utc>,
    pub source: RecordSource,
}

/// Data kinds served by the data layer. Every kind resolves to quote
/// snapshots; they differ in how the instrument set is chosen and, for
/// `Indicator`, in the reference the momentum fields are computed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataKind {
    /// Single-instrument snapshot against previous close.
    Quote,
    /// Single-instrument momentum snapshot against the 50-day average.
    Indicator,
    /// Snapshots for the "in the news" watchlist.
    News,
    /// Snapshots for the constituents of a named sector.
    Sector,
}

impl Display for DataKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                DataKind::Quote => "quote",
                DataKind::Indicator => "indicator",
                DataKind::News => "news",
                DataKind::Sector => "sector",
            }
        )
    }
}

impl FromStr for DataKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "quote" => Ok(DataKind::Quote),
            "indicator" => Ok(DataKind::Indicator),
            "news" => Ok(DataKind::News),
            "sector" => Ok(DataKind::Sector),
            _ => Err(anyhow::anyhow!("Invalid data kind: {}", s)),
        }
    }
}

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetch normalized records for one (kind, identifier) pair in a
    /// single attempt. Callers own retry and fallback policy.
    async fn fetch(&self, kind: DataKind, identifier: &str) -> Result<Vec<MarketRecord>>;
}
