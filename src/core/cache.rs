use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

/// In-memory cache with a fixed time-to-live injected at construction.
/// Entries are replaced wholesale, never mutated in place.
#[derive(Clone)]
pub struct TtlCache<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    inner: Arc<Mutex<HashMap<K, CacheEntry<V>>>>,
    ttl: Duration,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        let cache = self.inner.lock().await;
        match cache.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => {
                debug!("Cache HIT");
                Some(entry.value.clone())
            }
            Some(_) => {
                debug!("Cache entry expired");
                None
            }
            None => {
                debug!("Cache MISS");
                None
            }
        }
    }

    pub async fn put(&self, key: K, value: V) {
        let mut cache = self.inner.lock().await;
        debug!("Cache PUT");
        cache.insert(
            key,
            CacheEntry {
                value,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    pub async fn clear(&self) {
        let mut cache = self.inner.lock().await;
        cache.clear();
        debug!("Cache CLEAR");
    }
}
