//! Test utilities for handler and relay tests.

use std::sync::Once;
use std::time::Duration;

use axum_test::TestServer;
use wiremock::matchers::{method, path as path_matcher};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::config::{Config, RelayConfig};

static CRYPTO_PROVIDER: Once = Once::new();

/// reqwest is built without a default rustls provider; install one once per test binary.
pub fn install_crypto_provider() {
    CRYPTO_PROVIDER.call_once(|| {
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
    });
}

/// Relay settings pointing every destination at `{base}/contact`, `{base}/gpt` and `{base}/handyman`.
pub fn relay_config(base: &str) -> RelayConfig {
    let base = base.trim_end_matches('/');
    RelayConfig {
        contact_url: Some(format!("{base}/contact").parse().unwrap()),
        gpt_url: Some(format!("{base}/gpt").parse().unwrap()),
        handyman_url: Some(format!("{base}/handyman").parse().unwrap()),
        timeout: Duration::from_secs(5),
    }
}

pub fn create_test_config(webhook_base: &str) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        relay: relay_config(webhook_base),
        ..Default::default()
    }
}

pub async fn create_test_app(config: Config) -> TestServer {
    install_crypto_provider();

    crate::Application::new(config)
        .await
        .expect("Failed to create application")
        .into_test_server()
}

/// Answer `POST {path}` with `status` and an empty JSON object, expecting `expected_calls` hits.
pub async fn mount_webhook(server: &MockServer, path: &str, status: u16, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path_matcher(path))
        .respond_with(ResponseTemplate::new(status).set_body_json(serde_json::json!({})))
        .expect(expected_calls)
        .mount(server)
        .await;
}
