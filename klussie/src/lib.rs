//! # klussie: marketing site and lead relay for Klussie
//!
//! Klussie connects people who need a job done around the house with local handymen. This crate
//! serves the public website and forwards every lead it collects to external automation webhooks.
//! Nothing is stored locally: a submission is validated, stamped with the time it was received,
//! and relayed as JSON.
//!
//! ## Overview
//!
//! The site is server-rendered in Dutch (default) or English. Three kinds of lead come in:
//!
//! - **Contact messages** from the contact page, optionally with photos
//! - **Job requests** collected by the conversational wizard at `/gpt`, one question at a time
//! - **Handyman registrations** from the signup page, with an optional profile photo
//!
//! Each has a browser form and a JSON endpoint under `/api/*`. Both paths share the same
//! validation ([`validation`]) and relay ([`relay`]), so a payload accepted by one is accepted
//! by the other.
//!
//! ## Architecture
//!
//! The HTTP layer is [Axum](https://github.com/tokio-rs/axum). Pages are rendered from embedded
//! minijinja templates ([`render`]) with translations from embedded JSON catalogs ([`i18n`]).
//! Uploaded images are checked against the configured limits and inlined as base64 data URLs
//! ([`attachments`]) before being relayed. The wizard ([`wizard`]) is a pure state machine whose
//! state round-trips through a hidden form field, so the server keeps no sessions.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use klussie::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = klussie::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     klussie::telemetry::init_telemetry(config.enable_otel_export, config.log_format)?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.
#[cfg(test)]
pub mod test_utils;

pub mod api;
pub mod attachments;
pub mod config;
pub mod errors;
mod forms;
pub mod i18n;
mod openapi;
pub mod relay;
pub mod render;
mod static_assets;
pub mod telemetry;
pub mod validation;
pub mod wizard;

use axum::extract::DefaultBodyLimit;
use axum::http::{self, HeaderValue};
use axum::{
    Json, Router,
    routing::{get, post},
};
use bon::Builder;
pub use config::Config;
use config::CorsOrigin;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::i18n::Catalog;
use crate::openapi::ApiDoc;
use crate::relay::WebhookRelay;
use crate::render::Renderer;

/// Application state shared across all request handlers.
///
/// # Example
///
/// ```ignore
/// let state = AppState::builder()
///     .config(config)
///     .relay(relay)
///     .renderer(Arc::new(renderer))
///     .catalog(Arc::new(catalog))
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub config: Config,
    pub relay: WebhookRelay,
    pub renderer: Arc<Renderer>,
    pub catalog: Arc<Catalog>,
}

impl AppState {
    /// Build the shared state: the webhook client, the template environment and both
    /// translation catalogs.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let relay = WebhookRelay::new(&config.relay)?;
        let renderer = Renderer::new()?;
        let catalog = Catalog::load()?;

        Ok(Self::builder()
            .config(config)
            .relay(relay)
            .renderer(Arc::new(renderer))
            .catalog(Arc::new(catalog))
            .build())
    }
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let allow_origin = if config.cors.allowed_origins.iter().any(|origin| matches!(origin, CorsOrigin::Wildcard)) {
        AllowOrigin::any()
    } else {
        let mut origins = Vec::new();
        for origin in &config.cors.allowed_origins {
            if let CorsOrigin::Url(url) = origin {
                origins.push(url.as_str().trim_end_matches('/').parse::<HeaderValue>()?);
            }
        }
        AllowOrigin::list(origins)
    };

    let mut cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([http::Method::POST, http::Method::OPTIONS])
        .allow_headers([http::header::CONTENT_TYPE]);

    if let Some(max_age) = config.cors.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the main application router.
///
/// - JSON submission API under `/api` (CORS enabled), plus its OpenAPI document and Scalar UI
/// - Server-rendered pages, with `GET` rendering a form and `POST` submitting it
/// - Embedded static assets
/// - A rendered 404 page for everything else
///
/// # Errors
///
/// Returns an error if the CORS configuration is invalid.
#[instrument(skip_all)]
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let cors = create_cors_layer(&state.config)?;
    let body_limit = state.config.uploads.max_body_size;

    let api_routes = Router::new()
        .route("/contact", post(api::handlers::contact::submit_contact))
        .route("/gpt", post(api::handlers::gpt::submit_job_request))
        .route("/handyman", post(api::handlers::handyman::submit_signup))
        .route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .layer(cors);

    let page_routes = Router::new()
        .route("/", get(api::handlers::pages::home))
        .route("/over-ons", get(api::handlers::pages::about))
        .route("/algemene-voorwaarden", get(api::handlers::pages::terms))
        .route("/privacy", get(api::handlers::pages::privacy))
        .route(
            "/contact",
            get(api::handlers::contact::contact_page).post(api::handlers::contact::submit_contact_form),
        )
        .route(
            "/aanmelden-klusser",
            get(api::handlers::handyman::signup_page).post(api::handlers::handyman::submit_signup_form),
        )
        .route(
            "/gpt",
            get(api::handlers::wizard::wizard_page).post(api::handlers::wizard::wizard_step),
        );

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .route("/static/{*path}", get(api::handlers::static_assets::serve_embedded_asset))
        .route("/robots.txt", get(api::handlers::static_assets::robots))
        .route("/favicon.ico", get(api::handlers::static_assets::favicon))
        .nest("/api", api_routes)
        .merge(page_routes)
        .fallback(api::handlers::pages::not_found)
        .with_state(state)
        .merge(Scalar::with_url("/api/docs", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    Ok(router)
}

/// Main application struct that owns the router and configuration.
///
/// 1. **Create**: [`Application::new`] builds the shared state and the router
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and handles requests until the
///    shutdown future resolves
/// 3. **Shutdown**: in-flight requests are drained and pending telemetry is flushed
pub struct Application {
    router: Router,
    config: Config,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting Klussie with configuration: {:#?}", config);

        let state = AppState::from_config(config.clone())?;
        let router = build_router(state)?;

        Ok(Self { router, config })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "Klussie listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router).with_graceful_shutdown(shutdown).await?;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_utils::{create_test_app, create_test_config};
    use axum::http::StatusCode;
    use serde_json::Value;

    #[test_log::test(tokio::test)]
    async fn test_healthz_endpoint() {
        let server = create_test_app(create_test_config("http://127.0.0.1:9")).await;

        let response = server.get("/healthz").await;

        response.assert_status(StatusCode::OK);
        assert_eq!(response.text(), "OK");
    }

    #[test_log::test(tokio::test)]
    async fn test_openapi_document_is_served() {
        let server = create_test_app(create_test_config("http://127.0.0.1:9")).await;

        let response = server.get("/api/openapi.json").await;

        response.assert_status(StatusCode::OK);
        let spec: Value = response.json();
        assert!(spec["paths"]["/handyman"]["post"].is_object());
    }

    #[test_log::test(tokio::test)]
    async fn test_api_docs_ui_is_served() {
        let server = create_test_app(create_test_config("http://127.0.0.1:9")).await;

        let response = server.get("/api/docs").await;

        response.assert_status(StatusCode::OK);
    }

    #[test_log::test(tokio::test)]
    async fn test_api_sends_cors_headers() {
        let mut config = create_test_config("http://127.0.0.1:9");
        config.cors.allowed_origins = vec![CorsOrigin::Url("https://klussie.nl".parse().unwrap())];
        let server = create_test_app(config).await;

        let response = server
            .post("/api/contact")
            .add_header("origin", "https://klussie.nl")
            .json(&serde_json::json!({}))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(http::header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://klussie.nl"
        );
    }

    #[test_log::test(tokio::test)]
    async fn test_unknown_api_path_is_not_found() {
        let server = create_test_app(create_test_config("http://127.0.0.1:9")).await;

        let response = server.get("/api/bestaat-niet").await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[test_log::test(tokio::test)]
    async fn test_wildcard_origin_allows_any_site() {
        let server = create_test_app(create_test_config("http://127.0.0.1:9")).await;

        let response = server
            .post("/api/contact")
            .add_header("origin", "https://partner.example.com")
            .json(&serde_json::json!({}))
            .await;

        assert_eq!(response.headers().get(http::header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");
    }
}
