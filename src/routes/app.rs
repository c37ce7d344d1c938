//! Subscriber pages. All routes here sit behind the tier gate, so a
//! resolved user is always present in request extensions.

use axum::extract::State;
use axum::response::Html;
use axum::{Extension, Json};
use futures::future::join_all;
use serde_json::{Value, json};
use std::sync::Arc;

use crate::access::CurrentUser;
use crate::catalog;
use crate::core::record::{DataKind, MarketRecord};
use crate::state::AppState;
use crate::ui;

/// Starter watchlist shown until user-managed portfolios land.
const PORTFOLIO_TICKERS: &[&str] = &["EQNR.OL", "DNB.OL", "MOWI.OL", "BTC-USD"];

async fn quotes_for(state: &AppState, tickers: &[&str]) -> Vec<MarketRecord> {
    join_all(tickers.iter().map(|ticker| state.data.quote(ticker))).await
}

pub async fn portfolio(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Html<String> {
    let records = quotes_for(&state, PORTFOLIO_TICKERS).await;
    let greeting = user
        .map(|u| format!("<p>Innlogget som {} ({}).</p>", ui::escape(&u.email), u.tier))
        .unwrap_or_default();
    let body = format!("{greeting}{}", ui::quote_table(&records));
    Html(ui::page("Portefølje", &body))
}

pub async fn analysis(State(state): State<Arc<AppState>>) -> Html<String> {
    let records: Vec<MarketRecord> = join_all(
        catalog::NEWS_WATCHLIST
            .iter()
            .map(|ticker| state.data.fetch(DataKind::Indicator, ticker)),
    )
    .await
    .into_iter()
    .flatten()
    .collect();

    let body = format!(
        "<p>Momentum mot 50-dagers snitt.</p>{}",
        ui::quote_table(&records)
    );
    Html(ui::page("Analyse", &body))
}

pub async fn stocks(State(state): State<Arc<AppState>>) -> Html<String> {
    let mut body = String::new();
    for sector in catalog::sector_names() {
        let records = state.data.fetch(DataKind::Sector, sector).await;
        body.push_str(&format!("<h2>{sector}</h2>{}", ui::quote_table(&records)));
    }
    Html(ui::page("Aksjer", &body))
}

pub async fn premium_dashboard(State(state): State<Arc<AppState>>) -> Html<String> {
    let quotes = state.data.fetch(DataKind::News, "oslo").await;
    let indicators: Vec<MarketRecord> = join_all(
        catalog::NEWS_WATCHLIST
            .iter()
            .map(|ticker| state.data.fetch(DataKind::Indicator, ticker)),
    )
    .await
    .into_iter()
    .flatten()
    .collect();

    let body = format!(
        "<h2>Kurser</h2>{}<h2>Momentum</h2>{}",
        ui::quote_table(&quotes),
        ui::quote_table(&indicators)
    );
    Html(ui::page("Premium-dashbord", &body))
}

/// Toy momentum screen over the watchlist: rank by distance from the
/// 50-day average and report the spread.
pub async fn api_backtesting(State(state): State<Arc<AppState>>) -> Json<Value> {
    let mut records: Vec<MarketRecord> = join_all(
        catalog::NEWS_WATCHLIST
            .iter()
            .map(|ticker| state.data.fetch(DataKind::Indicator, ticker)),
    )
    .await
    .into_iter()
    .flatten()
    .collect();

    records.sort_by(|a, b| {
        b.change_percent
            .partial_cmp(&a.change_percent)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let best = records.first();
    let worst = records.last();
    Json(json!({
        "strategy": "momentum-50d",
        "universe": catalog::NEWS_WATCHLIST,
        "best": best,
        "worst": worst,
        "spread_percent": match (best, worst) {
            (Some(b), Some(w)) => b.change_percent - w.change_percent,
            _ => 0.0,
        },
        "records": records,
    }))
}
