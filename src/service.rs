//! DataService: the single entry point route handlers use for market data.
//!
//! Wraps the provider with a (kind, identifier)-keyed TTL cache, an
//! advisory per-day call budget, and fallback substitution. Provider
//! errors never leave this module.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use tracing::{debug, warn};

use crate::catalog;
use crate::core::cache::TtlCache;
use crate::core::record::{DataKind, MarketDataProvider, MarketRecord};

/// Advisory per-day provider call counter. Once the limit is reached the
/// service stops attempting live calls for the rest of the UTC day and
/// serves fallback data instead.
struct CallBudget {
    limit: u32,
    state: Mutex<(NaiveDate, u32)>,
}

impl CallBudget {
    fn new(limit: u32) -> Self {
        Self {
            limit,
            state: Mutex::new((Utc::now().date_naive(), 0)),
        }
    }

    fn try_acquire(&self) -> bool {
        let today = Utc::now().date_naive();
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.0 != today {
            *state = (today, 0);
        }
        if state.1 >= self.limit {
            return false;
        }
        state.1 += 1;
        true
    }

    fn used_today(&self) -> u32 {
        let today = Utc::now().date_naive();
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.0 == today { state.1 } else { 0 }
    }
}

pub struct DataService {
    provider: Arc<dyn MarketDataProvider>,
    cache: TtlCache<(DataKind, String), Vec<MarketRecord>>,
    budget: CallBudget,
}

impl DataService {
    pub fn new(provider: Arc<dyn MarketDataProvider>, ttl: Duration, daily_budget: u32) -> Self {
        Self {
            provider,
            cache: TtlCache::new(ttl),
            budget: CallBudget::new(daily_budget),
        }
    }

    /// Fetch records for one (kind, identifier) pair. Infallible by
    /// design: any provider problem degrades to fallback records tagged
    /// as such. Results, fallback included, are cached for the TTL so
    /// repeat calls return identical records without a provider attempt.
    pub async fn fetch(&self, kind: DataKind, identifier: &str) -> Vec<MarketRecord> {
        let key = (kind, identifier.to_string());
        if let Some(cached) = self.cache.get(&key).await {
            return cached;
        }

        let records = if self.budget.try_acquire() {
            match self.provider.fetch(kind, identifier).await {
                Ok(records) if !records.is_empty() => records,
                Ok(_) => {
                    warn!(%kind, identifier, "Provider returned no records, using fallback");
                    catalog::fallback_records(kind, identifier)
                }
                Err(e) => {
                    warn!(%kind, identifier, error = %e, "Provider call failed, using fallback");
                    catalog::fallback_records(kind, identifier)
                }
            }
        } else {
            warn!(
                %kind,
                identifier,
                limit = self.budget.limit,
                "Daily provider budget exhausted, using fallback"
            );
            catalog::fallback_records(kind, identifier)
        };

        debug!(%kind, identifier, count = records.len(), "Caching records");
        self.cache.put(key, records.clone()).await;
        records
    }

    /// Single-record convenience view over `fetch`.
    pub async fn quote(&self, ticker: &str) -> MarketRecord {
        self.fetch(DataKind::Quote, ticker)
            .await
            .into_iter()
            .next()
            .unwrap_or_else(|| catalog::fallback_record(ticker))
    }

    pub fn provider_calls_today(&self) -> u32 {
        self.budget.used_today()
    }
}
