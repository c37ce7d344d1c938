//! Minimal HTML shell and table rendering. Records arrive schema-complete
//! from the data layer, so nothing here guards against missing fields.

use crate::core::record::{MarketRecord, RecordSource};

/// HTML-escape a string before interpolating it into markup. Everything
/// that originates outside the binary (form fields, account emails,
/// provider display names) goes through here.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

pub fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="no">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<link rel="manifest" href="/manifest.json">
<title>{title} – Aksjeradar</title>
<style>
body {{ font-family: system-ui, sans-serif; margin: 2rem auto; max-width: 60rem; color: #1a2330; }}
table {{ border-collapse: collapse; width: 100%; margin: 1rem 0; }}
th, td {{ text-align: left; padding: 0.4rem 0.8rem; border-bottom: 1px solid #d8dee8; }}
.up {{ color: #0a7d33; }} .down {{ color: #b3261e; }}
.badge {{ font-size: 0.75rem; color: #6b7280; }}
nav a {{ margin-right: 1rem; }}
</style>
</head>
<body>
<nav>
<a href="/">Hjem</a><a href="/stocks">Aksjer</a><a href="/analysis">Analyse</a><a href="/portfolio">Portefølje</a><a href="/pricing">Abonnement</a><a href="/login">Logg inn</a>
</nav>
<h1>{title}</h1>
{body}
</body>
</html>"#
    )
}

pub fn quote_table(records: &[MarketRecord]) -> String {
    let mut rows = String::new();
    for record in records {
        let direction = if record.change_percent < 0.0 { "down" } else { "up" };
        let badge = match record.source {
            RecordSource::Live => "",
            RecordSource::Fallback => r#" <span class="badge">forsinket</span>"#,
        };
        rows.push_str(&format!(
            "<tr><td>{}{}</td><td>{}</td><td>{:.2} {}</td>\
             <td class=\"{}\">{:+.2} ({:+.2}%)</td><td>{:.0}</td></tr>\n",
            escape(&record.ticker),
            badge,
            escape(&record.name),
            record.price,
            escape(&record.currency),
            direction,
            record.change,
            record.change_percent,
            record.volume,
        ));
    }
    format!(
        "<table><thead><tr><th>Ticker</th><th>Navn</th><th>Kurs</th>\
         <th>Endring</th><th>Volum</th></tr></thead><tbody>\n{rows}</tbody></table>"
    )
}
