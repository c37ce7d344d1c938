//! Public JSON API: health, version and instrument search.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

use crate::catalog;
use crate::error::AppError;
use crate::state::AppState;

pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "provider_calls_today": state.data.provider_calls_today(),
    }))
}

pub async fn version() -> Json<Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Operational counters for the admin tier.
pub async fn admin_stats(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let (total, active) = state.users.count()?;
    Ok(Json(json!({
        "users": { "total": total, "active": active },
        "provider_calls_today": state.data.provider_calls_today(),
    })))
}

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    q: String,
}

pub async fn search(Query(params): Query<SearchParams>) -> Json<Value> {
    let hits: Vec<Value> = catalog::search(&params.q)
        .into_iter()
        .map(|entry| {
            json!({
                "ticker": entry.ticker,
                "name": entry.name,
                "sector": entry.sector,
            })
        })
        .collect();
    Json(json!({ "query": params.q, "results": hits }))
}
