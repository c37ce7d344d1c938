//! Public pages: front page, demo, and subscription overview.

use axum::extract::State;
use axum::response::Html;
use std::sync::Arc;

use crate::core::record::DataKind;
use crate::state::AppState;
use crate::ui;

pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let records = state.data.fetch(DataKind::News, "oslo").await;
    let body = format!(
        "<p>Dagens marked på Oslo Børs.</p>{}",
        ui::quote_table(&records)
    );
    Html(ui::page("Aksjeradar", &body))
}

pub async fn demo(State(state): State<Arc<AppState>>) -> Html<String> {
    let records = state.data.fetch(DataKind::Sector, "energy").await;
    let body = format!(
        "<p>Demo: energisektoren, uten innlogging. \
         <a href=\"/register\">Registrer deg</a> for full tilgang.</p>{}",
        ui::quote_table(&records)
    );
    Html(ui::page("Demo", &body))
}

pub async fn pricing() -> Html<String> {
    let body = r#"<table>
<thead><tr><th>Abonnement</th><th>Innhold</th></tr></thead>
<tbody>
<tr><td>Free</td><td>Forside og demo</td></tr>
<tr><td>Basic</td><td>Portefølje, analyse og aksjeliste</td></tr>
<tr><td>Pro</td><td>Alt i Basic, pluss premium-dashbord og backtesting</td></tr>
</tbody>
</table>
<p><a href="/register">Kom i gang</a></p>"#;
    Html(ui::page("Abonnement", body))
}
