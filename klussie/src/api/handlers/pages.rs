//! Server-rendered marketing pages.
//!
//! Every page response also sets the `lang` cookie, so a language picked once with `?lang=`
//! sticks for the rest of the visit.

use axum::{
    extract::State,
    http::{StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use tracing::instrument;

use crate::errors::Result;
use crate::i18n::Locale;
use crate::render::PageContext;
use crate::AppState;

/// Render `template` with the shared page context plus `page`.
pub(crate) fn render_page<T: Serialize>(
    state: &AppState,
    locale: Locale,
    status: StatusCode,
    template: &str,
    path: &str,
    page: T,
) -> Result<Response> {
    let messages = state.catalog.messages(locale.0);
    let context = PageContext::new(&messages, &state.config.site, path, page);
    let html = state.renderer.render(template, &context)?;

    Ok((status, [(header::SET_COOKIE, locale.cookie())], html).into_response())
}

#[instrument(skip_all)]
pub async fn home(State(state): State<AppState>, locale: Locale) -> Result<Response> {
    render_page(&state, locale, StatusCode::OK, "home.html", "/", json!({}))
}

#[instrument(skip_all)]
pub async fn about(State(state): State<AppState>, locale: Locale) -> Result<Response> {
    render_page(&state, locale, StatusCode::OK, "about.html", "/over-ons", json!({}))
}

#[instrument(skip_all)]
pub async fn terms(State(state): State<AppState>, locale: Locale) -> Result<Response> {
    render_page(
        &state,
        locale,
        StatusCode::OK,
        "legal.html",
        "/algemene-voorwaarden",
        json!({ "document": "terms" }),
    )
}

#[instrument(skip_all)]
pub async fn privacy(State(state): State<AppState>, locale: Locale) -> Result<Response> {
    render_page(
        &state,
        locale,
        StatusCode::OK,
        "legal.html",
        "/privacy",
        json!({ "document": "privacy" }),
    )
}

#[instrument(skip_all, fields(path = %uri.path()))]
pub async fn not_found(State(state): State<AppState>, locale: Locale, uri: Uri) -> Result<Response> {
    render_page(&state, locale, StatusCode::NOT_FOUND, "not_found.html", uri.path(), json!({}))
}
