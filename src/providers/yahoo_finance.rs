use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::catalog;
use crate::core::record::{DataKind, MarketDataProvider, MarketRecord, RecordSource};

/// Market data from the Yahoo Finance quote API. One HTTP request per
/// `fetch` call, regardless of how many tickers the kind expands to.
pub struct YahooFinanceProvider {
    base_url: String,
    client: reqwest::Client,
}

impl YahooFinanceProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("aksjeradar/0.3")
            .timeout(timeout)
            .build()?;
        Ok(YahooFinanceProvider {
            base_url: base_url.to_string(),
            client,
        })
    }
}

#[derive(Deserialize, Debug)]
struct YahooQuoteEnvelope {
    #[serde(alias = "quoteResponse")]
    quote_response: QuoteResponse,
}

#[derive(Deserialize, Debug)]
struct QuoteResponse {
    result: Vec<YahooQuote>,
}

#[derive(Deserialize, Debug)]
struct YahooQuote {
    symbol: String,
    #[serde(alias = "shortName")]
    short_name: Option<String>,
    currency: Option<String>,
    #[serde(alias = "regularMarketPrice")]
    regular_market_price: Option<f64>,
    #[serde(alias = "regularMarketChange")]
    regular_market_change: Option<f64>,
    #[serde(alias = "regularMarketChangePercent")]
    regular_market_change_percent: Option<f64>,
    #[serde(alias = "regularMarketVolume")]
    regular_market_volume: Option<f64>,
    #[serde(alias = "regularMarketTime")]
    regular_market_time: Option<i64>,
    #[serde(alias = "fiftyDayAverage")]
    fifty_day_average: Option<f64>,
}

/// Map one provider quote onto the fixed record schema. Missing numeric
/// fields become `0.0`; this is the only place provider field names and
/// defaults are handled.
fn normalize(quote: &YahooQuote, kind: DataKind) -> MarketRecord {
    let price = quote.regular_market_price.unwrap_or(0.0);

    // Indicator records measure momentum against the 50-day average
    // instead of previous close.
    let (change, change_percent) = match kind {
        DataKind::Indicator => match quote.fifty_day_average {
            Some(avg) if avg > 0.0 => (price - avg, ((price - avg) / avg) * 100.0),
            _ => (0.0, 0.0),
        },
        _ => (
            quote.regular_market_change.unwrap_or(0.0),
            quote.regular_market_change_percent.unwrap_or(0.0),
        ),
    };

    let timestamp = quote
        .regular_market_time
        .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
        .unwrap_or_else(Utc::now);

    let name = quote
        .short_name
        .clone()
        .or_else(|| catalog::find(&quote.symbol).map(|e| e.name.to_string()))
        .unwrap_or_else(|| quote.symbol.clone());

    MarketRecord {
        ticker: quote.symbol.clone(),
        name,
        price,
        change,
        change_percent,
        volume: quote.regular_market_volume.unwrap_or(0.0),
        currency: quote.currency.clone().unwrap_or_else(|| "NOK".to_string()),
        timestamp,
        source: RecordSource::Live,
    }
}

#[async_trait]
impl MarketDataProvider for YahooFinanceProvider {
    #[instrument(
        name = "YahooQuoteFetch",
        skip(self),
        fields(kind = %kind, identifier = %identifier)
    )]
    async fn fetch(&self, kind: DataKind, identifier: &str) -> Result<Vec<MarketRecord>> {
        let tickers = catalog::resolve_tickers(kind, identifier);
        let url = format!(
            "{}/v7/finance/quote?symbols={}",
            self.base_url,
            tickers.join(",")
        );
        debug!("Requesting quote data from {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            anyhow!("Request error: {} for identifier: {} URL: {}", e, identifier, url)
        })?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for identifier: {}",
                response.status(),
                identifier
            ));
        }

        let text = response.text().await?;
        let data: YahooQuoteEnvelope = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response for {}: {}", identifier, e))?;

        if data.quote_response.result.is_empty() {
            return Err(anyhow!("No quote data found for identifier: {}", identifier));
        }

        Ok(data
            .quote_response
            .result
            .iter()
            .map(|q| normalize(q, kind))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn create_mock_server(mock_response: &str) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v7/finance/quote"))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        mock_server
    }

    fn provider(base_url: &str) -> YahooFinanceProvider {
        YahooFinanceProvider::new(base_url, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_successful_quote_fetch() {
        let mock_response = r#"{
            "quoteResponse": {
                "result": [{
                    "symbol": "EQNR.OL",
                    "shortName": "Equinor",
                    "currency": "NOK",
                    "regularMarketPrice": 342.55,
                    "regularMarketChange": 4.15,
                    "regularMarketChangePercent": 1.23,
                    "regularMarketVolume": 2840000,
                    "regularMarketTime": 1719397800
                }],
                "error": null
            }
        }"#;

        let mock_server = create_mock_server(mock_response).await;
        let records = provider(&mock_server.uri())
            .fetch(DataKind::Quote, "EQNR.OL")
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.ticker, "EQNR.OL");
        assert_eq!(record.price, 342.55);
        assert_eq!(record.change, 4.15);
        assert_eq!(record.change_percent, 1.23);
        assert_eq!(record.volume, 2_840_000.0);
        assert_eq!(record.source, RecordSource::Live);
    }

    #[tokio::test]
    async fn test_missing_fields_default_to_zero() {
        let mock_response = r#"{
            "quoteResponse": {
                "result": [{
                    "symbol": "EQNR.OL",
                    "regularMarketPrice": 342.55
                }],
                "error": null
            }
        }"#;

        let mock_server = create_mock_server(mock_response).await;
        let records = provider(&mock_server.uri())
            .fetch(DataKind::Quote, "EQNR.OL")
            .await
            .unwrap();

        let record = &records[0];
        assert_eq!(record.price, 342.55);
        assert_eq!(record.change, 0.0);
        assert_eq!(record.change_percent, 0.0);
        assert_eq!(record.volume, 0.0);
        assert_eq!(record.currency, "NOK");
        // Name backfilled from the catalog when the provider omits it
        assert_eq!(record.name, "Equinor");
    }

    #[tokio::test]
    async fn test_indicator_momentum_against_fifty_day_average() {
        let mock_response = r#"{
            "quoteResponse": {
                "result": [{
                    "symbol": "EQNR.OL",
                    "regularMarketPrice": 110.0,
                    "regularMarketChange": 1.0,
                    "regularMarketChangePercent": 0.9,
                    "fiftyDayAverage": 100.0
                }],
                "error": null
            }
        }"#;

        let mock_server = create_mock_server(mock_response).await;
        let records = provider(&mock_server.uri())
            .fetch(DataKind::Indicator, "EQNR.OL")
            .await
            .unwrap();

        let record = &records[0];
        assert!((record.change - 10.0).abs() < 1e-9);
        assert!((record.change_percent - 10.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_sector_fetch_returns_all_constituents() {
        let mock_response = r#"{
            "quoteResponse": {
                "result": [
                    {"symbol": "EQNR.OL", "regularMarketPrice": 342.55},
                    {"symbol": "AKRBP.OL", "regularMarketPrice": 248.10},
                    {"symbol": "VAR.OL", "regularMarketPrice": 33.86}
                ],
                "error": null
            }
        }"#;

        let mock_server = create_mock_server(mock_response).await;
        let records = provider(&mock_server.uri())
            .fetch(DataKind::Sector, "energy")
            .await
            .unwrap();

        assert_eq!(records.len(), 3);
    }

    #[tokio::test]
    async fn test_no_quote_data() {
        let mock_response = r#"{"quoteResponse": {"result": [], "error": null}}"#;
        let mock_server = create_mock_server(mock_response).await;

        let result = provider(&mock_server.uri())
            .fetch(DataKind::Quote, "INVALID")
            .await;
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            "No quote data found for identifier: INVALID"
        );
    }

    #[tokio::test]
    async fn test_api_error_response() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v7/finance/quote"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let result = provider(&mock_server.uri())
            .fetch(DataKind::Quote, "EQNR.OL")
            .await;
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            "HTTP error: 500 Internal Server Error for identifier: EQNR.OL"
        );
    }

    #[tokio::test]
    async fn test_malformed_response() {
        let mock_response = r#"{"quotes": {"results": []}}"#;
        let mock_server = create_mock_server(mock_response).await;

        let result = provider(&mock_server.uri())
            .fetch(DataKind::Quote, "EQNR.OL")
            .await;
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to parse JSON response for EQNR.OL")
        );
    }
}
