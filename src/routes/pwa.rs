//! Progressive web app assets served from static strings.

use axum::Json;
use axum::http::header;
use axum::response::IntoResponse;
use serde_json::{Value, json};

pub async fn manifest() -> Json<Value> {
    Json(json!({
        "name": "Aksjeradar",
        "short_name": "Aksjeradar",
        "start_url": "/",
        "display": "standalone",
        "background_color": "#ffffff",
        "theme_color": "#1a2330",
        "icons": [],
    }))
}

const SERVICE_WORKER: &str = r#"// Network-first; no offline caching of market data.
self.addEventListener('install', () => self.skipWaiting());
self.addEventListener('activate', (event) => event.waitUntil(clients.claim()));
self.addEventListener('fetch', (event) => event.respondWith(fetch(event.request)));
"#;

pub async fn service_worker() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        SERVICE_WORKER,
    )
}
