//! AccessGate: per-request authorization.
//!
//! Two middleware layers cooperate. `resolve_session` runs on every
//! request, turns the session cookie into an `Option<User>` (any lookup
//! failure counts as anonymous) and stashes it in request extensions.
//! `gate` runs on protected route groups and maps the pure
//! [`evaluate`] decision onto a redirect (HTML routes) or a status code
//! (JSON routes under `/api/`).

use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::core::tier::SubscriptionTier;
use crate::db::users::User;
use crate::error::found;
use crate::state::AppState;

/// Outcome of an access check for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    RedirectToLogin,
    RedirectToUpgrade,
}

/// The decision rule. Pure: no side effects, no user mutation.
pub fn evaluate(user: Option<&User>, required: SubscriptionTier) -> AccessDecision {
    match user {
        None => AccessDecision::RedirectToLogin,
        Some(user) if user.tier.allows(required) => AccessDecision::Allow,
        Some(_) => AccessDecision::RedirectToUpgrade,
    }
}

/// Session user attached to every request by `resolve_session`.
#[derive(Clone)]
pub struct CurrentUser(pub Option<User>);

/// Extract the session token from a request's cookie header.
pub(crate) fn session_token(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|part| {
        let (name, value) = part.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}

pub const SESSION_COOKIE: &str = "session";

/// Resolve the session cookie to a user. Fails closed: a missing cookie,
/// an unknown or expired token, or a store error all yield an anonymous
/// request.
pub async fn resolve_session(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let user = match session_token(request.headers()) {
        Some(token) => match state.sessions.resolve(&token) {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "Session lookup failed, treating as anonymous");
                None
            }
        },
        None => None,
    };

    request.extensions_mut().insert(CurrentUser(user));
    next.run(request).await
}

/// Tier gate for a route group. Assumes `resolve_session` already ran.
pub async fn gate(required: SubscriptionTier, request: Request, next: Next) -> Response {
    let user = request
        .extensions()
        .get::<CurrentUser>()
        .and_then(|current| current.0.as_ref());

    match evaluate(user, required) {
        AccessDecision::Allow => next.run(request).await,
        decision => {
            let path = request.uri().path().to_string();
            debug!(path, ?decision, "Access denied");
            deny(&path, decision)
        }
    }
}

/// Render a denial. JSON API routes get status codes; HTML routes get a
/// 302 to the login or upgrade page.
fn deny(path: &str, decision: AccessDecision) -> Response {
    let api = path.starts_with("/api/");
    match decision {
        AccessDecision::RedirectToLogin if api => (
            StatusCode::UNAUTHORIZED,
            axum::Json(json!({ "error": "authentication_required" })),
        )
            .into_response(),
        AccessDecision::RedirectToLogin => found(&format!("/login?next={path}")),
        AccessDecision::RedirectToUpgrade if api => (
            StatusCode::FORBIDDEN,
            axum::Json(json!({ "error": "insufficient_tier" })),
        )
            .into_response(),
        AccessDecision::RedirectToUpgrade => found("/pricing"),
        AccessDecision::Allow => unreachable!("deny called with Allow"),
    }
}
