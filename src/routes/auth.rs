//! Login, registration and logout. Sessions are opaque tokens in an
//! HttpOnly cookie.

use axum::Form;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, header};
use axum::response::{AppendHeaders, Html, IntoResponse, Response};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::access::{self, SESSION_COOKIE};
use crate::error::{AppError, found};
use crate::state::AppState;
use crate::ui;

#[derive(Deserialize)]
pub struct NextParam {
    next: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    email: String,
    password: String,
    next: Option<String>,
}

#[derive(Deserialize)]
pub struct RegisterForm {
    email: String,
    password: String,
}

/// Only accept same-site paths as a post-login destination.
fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path,
        _ => "/portfolio",
    }
}

fn session_cookie(token: &str, max_age_secs: i64) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}")
}

fn login_page(next: Option<&str>, message: Option<&str>) -> Html<String> {
    // Same filter as on submit, then escaped: the query string never
    // reaches the markup verbatim.
    let next_field = format!(
        r#"<input type="hidden" name="next" value="{}">"#,
        ui::escape(safe_next(next))
    );
    let message = message
        .map(|m| format!("<p><strong>{m}</strong></p>"))
        .unwrap_or_default();
    let body = format!(
        r#"{message}<form method="post" action="/login">
<p><label>E-post <input type="email" name="email" required></label></p>
<p><label>Passord <input type="password" name="password" required></label></p>
{next_field}
<p><button type="submit">Logg inn</button></p>
</form>
<p>Ny her? <a href="/register">Registrer deg</a></p>"#
    );
    Html(ui::page("Logg inn", &body))
}

pub async fn login_form(Query(query): Query<NextParam>) -> Html<String> {
    login_page(query.next.as_deref(), None)
}

pub async fn login_submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let Some(user) = state.users.authenticate(&form.email, &form.password)? else {
        info!(email = %form.email, "Rejected login attempt");
        return Ok(login_page(form.next.as_deref(), Some("Feil e-post eller passord.")).into_response());
    };

    let token = state.sessions.create(user.id)?;
    let max_age = state.config.session.ttl_hours * 3600;
    info!(user_id = user.id, "User logged in");
    Ok((
        AppendHeaders([(header::SET_COOKIE, session_cookie(&token, max_age))]),
        found(safe_next(form.next.as_deref())),
    )
        .into_response())
}

pub async fn register_form() -> Html<String> {
    let body = r#"<form method="post" action="/register">
<p><label>E-post <input type="email" name="email" required></label></p>
<p><label>Passord <input type="password" name="password" minlength="8" required></label></p>
<p><button type="submit">Registrer</button></p>
</form>"#;
    Html(ui::page("Registrer", body))
}

pub async fn register_submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    let user = match state.users.create(&form.email, &form.password) {
        Ok(user) => user,
        Err(AppError::BadRequest(message)) => {
            let body = format!(
                r#"<p><strong>{message}</strong></p><p><a href="/register">Prøv igjen</a></p>"#
            );
            return Ok(Html(ui::page("Registrer", &body)).into_response());
        }
        Err(e) => return Err(e),
    };

    let token = state.sessions.create(user.id)?;
    let max_age = state.config.session.ttl_hours * 3600;
    // New accounts start on the Free tier; land them on the upgrade page.
    Ok((
        AppendHeaders([(header::SET_COOKIE, session_cookie(&token, max_age))]),
        found("/pricing"),
    )
        .into_response())
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    if let Some(token) = access::session_token(&headers) {
        state.sessions.delete(&token)?;
    }

    Ok((
        AppendHeaders([(header::SET_COOKIE, session_cookie("", 0))]),
        found("/"),
    )
        .into_response())
}
