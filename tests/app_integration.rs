use std::sync::Arc;

use aksjeradar::config::AppConfig;
use aksjeradar::core::tier::SubscriptionTier;
use aksjeradar::routes;
use aksjeradar::state::AppState;

mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Quote API mock answering every symbol list with a fixed payload.
    pub async fn create_quote_mock_server(mock_response: &str) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v7/finance/quote"))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        mock_server
    }

    pub const LIVE_RESPONSE: &str = r#"{
        "quoteResponse": {
            "result": [
                {
                    "symbol": "EQNR.OL",
                    "shortName": "Equinor",
                    "currency": "NOK",
                    "regularMarketPrice": 355.10,
                    "regularMarketChange": 12.55,
                    "regularMarketChangePercent": 3.66,
                    "regularMarketVolume": 2840000,
                    "fiftyDayAverage": 330.0
                },
                {
                    "symbol": "DNB.OL",
                    "shortName": "DNB Bank",
                    "currency": "NOK",
                    "regularMarketPrice": 221.40,
                    "regularMarketChange": -1.2,
                    "regularMarketChangePercent": -0.54,
                    "regularMarketVolume": 1950000,
                    "fiftyDayAverage": 225.0
                }
            ],
            "error": null
        }
    }"#;
}

struct TestApp {
    base_url: String,
    state: Arc<AppState>,
    _db_dir: tempfile::TempDir,
}

/// Boot the full application against a provider base URL and return its
/// address. The SQLite database lives in a temp dir per test.
async fn spawn_app(provider_url: &str) -> TestApp {
    let db_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_yaml = format!(
        r#"
provider:
  base_url: "{provider_url}"
  daily_budget: 100
  timeout_secs: 2
cache:
  ttl_secs: 300
database: "{}"
"#,
        db_dir.path().join("app.db").display()
    );
    let config: AppConfig = serde_yaml::from_str(&config_yaml).expect("Failed to parse config");

    let state = AppState::new(config).expect("Failed to build state");
    let app = routes::router(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        base_url: format!("http://{addr}"),
        state,
        _db_dir: db_dir,
    }
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

/// Register an account and return its session cookie value.
async fn register(app: &TestApp, email: &str) -> String {
    let response = client()
        .post(format!("{}/register", app.base_url))
        .form(&[("email", email), ("password", "password123")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 302);

    let cookie = response
        .headers()
        .get("set-cookie")
        .expect("registration should set a session cookie")
        .to_str()
        .unwrap();
    cookie.split(';').next().unwrap().to_string()
}

#[test_log::test(tokio::test)]
async fn test_health_version_and_search() {
    let mock_server = test_utils::create_quote_mock_server(test_utils::LIVE_RESPONSE).await;
    let app = spawn_app(&mock_server.uri()).await;
    let client = client();

    let response = client
        .get(format!("{}/api/health", app.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");

    let response = client
        .get(format!("{}/api/version", app.base_url))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["name"], "aksjeradar");

    let response = client
        .get(format!("{}/api/search?q=equinor", app.base_url))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["results"][0]["ticker"], "EQNR.OL");

    let response = client
        .get(format!("{}/no/such/page", app.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[test_log::test(tokio::test)]
async fn test_login_page_escapes_next_parameter() {
    let mock_server = test_utils::create_quote_mock_server(test_utils::LIVE_RESPONSE).await;
    let app = spawn_app(&mock_server.uri()).await;

    let response = client()
        .get(format!(
            "{}/login?next=%22%3E%3Cscript%3Ealert(1)%3C%2Fscript%3E",
            app.base_url
        ))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(!body.contains("<script>alert(1)</script>"));
}

#[test_log::test(tokio::test)]
async fn test_anonymous_premium_dashboard_redirects_to_login() {
    let mock_server = test_utils::create_quote_mock_server(test_utils::LIVE_RESPONSE).await;
    let app = spawn_app(&mock_server.uri()).await;

    let response = client()
        .get(format!("{}/premium/dashboard", app.base_url))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 302);
    let location = response.headers()["location"].to_str().unwrap();
    assert!(location.starts_with("/login"));
}

#[test_log::test(tokio::test)]
async fn test_tier_gating_end_to_end() {
    let mock_server = test_utils::create_quote_mock_server(test_utils::LIVE_RESPONSE).await;
    let app = spawn_app(&mock_server.uri()).await;
    let client = client();
    let cookie = register(&app, "kari@example.no").await;

    // Fresh accounts are Free: app pages bounce to the upgrade page.
    let response = client
        .get(format!("{}/portfolio", app.base_url))
        .header("cookie", &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 302);
    assert_eq!(response.headers()["location"], "/pricing");

    // Basic unlocks the app pages but not premium.
    let user = app
        .state
        .users
        .find_by_email("kari@example.no")
        .unwrap()
        .unwrap();
    app.state
        .users
        .set_tier(user.id, SubscriptionTier::Basic)
        .unwrap();

    let response = client
        .get(format!("{}/portfolio", app.base_url))
        .header("cookie", &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert!(response.text().await.unwrap().contains("kari@example.no"));

    let response = client
        .get(format!("{}/api/premium/backtesting", app.base_url))
        .header("cookie", &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    // Pro unlocks premium but not the admin surface.
    app.state
        .users
        .set_tier(user.id, SubscriptionTier::Pro)
        .unwrap();
    let response = client
        .get(format!("{}/api/premium/backtesting", app.base_url))
        .header("cookie", &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["strategy"], "momentum-50d");

    let response = client
        .get(format!("{}/api/admin/stats", app.base_url))
        .header("cookie", &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    // Admin sees the stats endpoint.
    app.state
        .users
        .set_tier(user.id, SubscriptionTier::Admin)
        .unwrap();
    let response = client
        .get(format!("{}/api/admin/stats", app.base_url))
        .header("cookie", &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["users"]["total"], 1);
    assert_eq!(body["users"]["active"], 1);
}

#[test_log::test(tokio::test)]
async fn test_api_routes_return_status_codes_not_redirects() {
    let mock_server = test_utils::create_quote_mock_server(test_utils::LIVE_RESPONSE).await;
    let app = spawn_app(&mock_server.uri()).await;

    let response = client()
        .get(format!("{}/api/premium/backtesting", app.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

#[test_log::test(tokio::test)]
async fn test_logout_invalidates_session() {
    let mock_server = test_utils::create_quote_mock_server(test_utils::LIVE_RESPONSE).await;
    let app = spawn_app(&mock_server.uri()).await;
    let client = client();
    let cookie = register(&app, "ola@example.no").await;

    let user = app
        .state
        .users
        .find_by_email("ola@example.no")
        .unwrap()
        .unwrap();
    app.state
        .users
        .set_tier(user.id, SubscriptionTier::Basic)
        .unwrap();

    let response = client
        .get(format!("{}/logout", app.base_url))
        .header("cookie", &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 302);

    // Old token no longer resolves: back to the login redirect.
    let response = client
        .get(format!("{}/portfolio", app.base_url))
        .header("cookie", &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 302);
    let location = response.headers()["location"].to_str().unwrap();
    assert!(location.starts_with("/login"));
}

#[test_log::test(tokio::test)]
async fn test_front_page_uses_live_data_when_provider_is_up() {
    let mock_server = test_utils::create_quote_mock_server(test_utils::LIVE_RESPONSE).await;
    let app = spawn_app(&mock_server.uri()).await;

    let response = client()
        .get(format!("{}/", app.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("EQNR.OL"));
    assert!(body.contains("355.10 NOK"));
    assert!(!body.contains("forsinket"));
}

#[test_log::test(tokio::test)]
async fn test_front_page_degrades_to_fallback_when_provider_is_down() {
    // Mock server with no mounted routes: every call is a 404.
    let mock_server = wiremock::MockServer::start().await;
    let app = spawn_app(&mock_server.uri()).await;

    let response = client()
        .get(format!("{}/", app.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("EQNR.OL"));
    assert!(body.contains("forsinket"));
    // Fallback reference price, never an empty cell
    assert!(body.contains("342.55 NOK"));
}
