pub mod api;
pub mod app;
pub mod auth;
pub mod pages;
pub mod pwa;

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::{Router, middleware};
use std::sync::Arc;

use crate::access;
use crate::core::tier::Capability;
use crate::state::AppState;
use crate::ui;

/// Assemble the full application router. Session resolution runs on
/// every request; tier gates wrap the app and premium route groups.
pub fn router(state: Arc<AppState>) -> Router {
    let public = Router::new()
        .route("/", get(pages::index))
        .route("/demo", get(pages::demo))
        .route("/pricing", get(pages::pricing))
        .route("/login", get(auth::login_form).post(auth::login_submit))
        .route(
            "/register",
            get(auth::register_form).post(auth::register_submit),
        )
        .route("/logout", get(auth::logout))
        .route("/api/health", get(api::health))
        .route("/api/version", get(api::version))
        .route("/api/search", get(api::search))
        .route("/manifest.json", get(pwa::manifest))
        .route("/service-worker.js", get(pwa::service_worker));

    let app_pages = Router::new()
        .route("/portfolio", get(app::portfolio))
        .route("/analysis", get(app::analysis))
        .route("/stocks", get(app::stocks))
        .layer(middleware::from_fn(|request, next| {
            access::gate(Capability::Portfolio.required_tier(), request, next)
        }));

    let premium = Router::new()
        .route("/premium/dashboard", get(app::premium_dashboard))
        .route("/api/premium/backtesting", get(app::api_backtesting))
        .layer(middleware::from_fn(|request, next| {
            access::gate(Capability::Backtesting.required_tier(), request, next)
        }));

    let admin = Router::new()
        .route("/api/admin/stats", get(api::admin_stats))
        .layer(middleware::from_fn(|request, next| {
            access::gate(Capability::AdminPanel.required_tier(), request, next)
        }));

    Router::new()
        .merge(public)
        .merge(app_pages)
        .merge(premium)
        .merge(admin)
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            access::resolve_session,
        ))
        .with_state(state)
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Html(ui::page("Ikke funnet", "<p>Siden finnes ikke.</p>")),
    )
}
