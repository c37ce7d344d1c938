//! Static instrument catalog: the fallback data table, sector constituent
//! lists, the "in the news" watchlist, and the search directory all derive
//! from the entries defined here.

use crate::core::record::{DataKind, MarketRecord, RecordSource};
use chrono::Utc;

#[derive(Debug, Clone, Copy)]
pub struct CatalogEntry {
    pub ticker: &'static str,
    pub name: &'static str,
    pub sector: &'static str,
    pub currency: &'static str,
    /// Last known reference price, used when the live provider is down.
    pub reference_price: f64,
    pub reference_volume: f64,
}

/// Reference prices are periodically refreshed snapshots, not live data.
pub const CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        ticker: "EQNR.OL",
        name: "Equinor",
        sector: "energy",
        currency: "NOK",
        reference_price: 342.55,
        reference_volume: 3_120_000.0,
    },
    CatalogEntry {
        ticker: "AKRBP.OL",
        name: "Aker BP",
        sector: "energy",
        currency: "NOK",
        reference_price: 248.10,
        reference_volume: 1_480_000.0,
    },
    CatalogEntry {
        ticker: "VAR.OL",
        name: "Vår Energi",
        sector: "energy",
        currency: "NOK",
        reference_price: 33.86,
        reference_volume: 5_900_000.0,
    },
    CatalogEntry {
        ticker: "DNB.OL",
        name: "DNB Bank",
        sector: "finance",
        currency: "NOK",
        reference_price: 221.40,
        reference_volume: 1_950_000.0,
    },
    CatalogEntry {
        ticker: "STB.OL",
        name: "Storebrand",
        sector: "finance",
        currency: "NOK",
        reference_price: 108.15,
        reference_volume: 1_020_000.0,
    },
    CatalogEntry {
        ticker: "GJF.OL",
        name: "Gjensidige Forsikring",
        sector: "finance",
        currency: "NOK",
        reference_price: 196.00,
        reference_volume: 420_000.0,
    },
    CatalogEntry {
        ticker: "MOWI.OL",
        name: "Mowi",
        sector: "seafood",
        currency: "NOK",
        reference_price: 192.85,
        reference_volume: 880_000.0,
    },
    CatalogEntry {
        ticker: "SALM.OL",
        name: "SalMar",
        sector: "seafood",
        currency: "NOK",
        reference_price: 512.50,
        reference_volume: 190_000.0,
    },
    CatalogEntry {
        ticker: "LSG.OL",
        name: "Lerøy Seafood Group",
        sector: "seafood",
        currency: "NOK",
        reference_price: 48.66,
        reference_volume: 640_000.0,
    },
    CatalogEntry {
        ticker: "TEL.OL",
        name: "Telenor",
        sector: "industry",
        currency: "NOK",
        reference_price: 128.90,
        reference_volume: 1_340_000.0,
    },
    CatalogEntry {
        ticker: "NHY.OL",
        name: "Norsk Hydro",
        sector: "industry",
        currency: "NOK",
        reference_price: 64.28,
        reference_volume: 4_710_000.0,
    },
    CatalogEntry {
        ticker: "YAR.OL",
        name: "Yara International",
        sector: "industry",
        currency: "NOK",
        reference_price: 318.70,
        reference_volume: 520_000.0,
    },
    CatalogEntry {
        ticker: "ORK.OL",
        name: "Orkla",
        sector: "industry",
        currency: "NOK",
        reference_price: 102.35,
        reference_volume: 760_000.0,
    },
    CatalogEntry {
        ticker: "BTC-USD",
        name: "Bitcoin",
        sector: "crypto",
        currency: "USD",
        reference_price: 64_230.00,
        reference_volume: 28_400_000_000.0,
    },
    CatalogEntry {
        ticker: "ETH-USD",
        name: "Ethereum",
        sector: "crypto",
        currency: "USD",
        reference_price: 3_112.00,
        reference_volume: 14_100_000_000.0,
    },
    CatalogEntry {
        ticker: "NOKUSD=X",
        name: "NOK/USD",
        sector: "currency",
        currency: "USD",
        reference_price: 0.0945,
        reference_volume: 0.0,
    },
    CatalogEntry {
        ticker: "EURNOK=X",
        name: "EUR/NOK",
        sector: "currency",
        currency: "NOK",
        reference_price: 11.62,
        reference_volume: 0.0,
    },
];

/// Instruments currently surfaced on the front page and the news kind.
pub const NEWS_WATCHLIST: &[&str] = &[
    "EQNR.OL", "DNB.OL", "TEL.OL", "NHY.OL", "MOWI.OL", "YAR.OL", "BTC-USD",
];

pub fn find(ticker: &str) -> Option<&'static CatalogEntry> {
    CATALOG.iter().find(|e| e.ticker.eq_ignore_ascii_case(ticker))
}

/// Tickers belonging to a named sector. Unknown sectors resolve to an
/// empty list, which the data layer turns into a zeroed fallback record.
pub fn sector_constituents(sector: &str) -> Vec<&'static str> {
    CATALOG
        .iter()
        .filter(|e| e.sector.eq_ignore_ascii_case(sector))
        .map(|e| e.ticker)
        .collect()
}

fn distinct_in_order<'a>(sectors: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut names = Vec::new();
    for sector in sectors {
        if !names.contains(&sector) {
            names.push(sector);
        }
    }
    names
}

/// Distinct sector names in first-appearance order, independent of how
/// the catalog rows happen to be grouped.
pub fn sector_names() -> Vec<&'static str> {
    distinct_in_order(CATALOG.iter().map(|e| e.sector))
}

/// Case-insensitive substring search over tickers and display names.
pub fn search(query: &str) -> Vec<&'static CatalogEntry> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return Vec::new();
    }
    CATALOG
        .iter()
        .filter(|e| e.ticker.to_lowercase().contains(&q) || e.name.to_lowercase().contains(&q))
        .collect()
}

/// Build a schema-complete placeholder record for one ticker. Known
/// tickers carry their reference price; unknown ones are zeroed but still
/// expose every field a page reads.
pub fn fallback_record(ticker: &str) -> MarketRecord {
    let now = Utc::now();
    match find(ticker) {
        Some(entry) => MarketRecord {
            ticker: entry.ticker.to_string(),
            name: entry.name.to_string(),
            price: entry.reference_price,
            change: 0.0,
            change_percent: 0.0,
            volume: entry.reference_volume,
            currency: entry.currency.to_string(),
            timestamp: now,
            source: RecordSource::Fallback,
        },
        None => MarketRecord {
            ticker: ticker.to_string(),
            name: ticker.to_string(),
            price: 0.0,
            change: 0.0,
            change_percent: 0.0,
            volume: 0.0,
            currency: "NOK".to_string(),
            timestamp: now,
            source: RecordSource::Fallback,
        },
    }
}

/// Fallback payload for a whole (kind, identifier) request.
pub fn fallback_records(kind: DataKind, identifier: &str) -> Vec<MarketRecord> {
    resolve_tickers(kind, identifier)
        .iter()
        .map(|t| fallback_record(t))
        .collect()
}

/// Resolve a (kind, identifier) pair to the tickers it covers. Single-
/// instrument kinds pass the identifier through; list kinds expand to
/// their static watchlists.
pub fn resolve_tickers(kind: DataKind, identifier: &str) -> Vec<String> {
    match kind {
        DataKind::Quote | DataKind::Indicator => vec![identifier.to_string()],
        DataKind::News => NEWS_WATCHLIST.iter().map(|t| t.to_string()).collect(),
        DataKind::Sector => {
            let constituents = sector_constituents(identifier);
            if constituents.is_empty() {
                vec![identifier.to_string()]
            } else {
                constituents.iter().map(|t| t.to_string()).collect()
            }
        }
    }
}
