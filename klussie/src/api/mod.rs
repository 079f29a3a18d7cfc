//! HTTP surface of the site.
//!
//! - **[`handlers`]**: Axum handlers for pages, forms, the wizard and the JSON API
//! - **[`models`]**: Submission payloads and API responses
//!
//! # Routes
//!
//! - **Pages**: `/`, `/over-ons`, `/algemene-voorwaarden`, `/privacy`
//! - **Forms**: `/contact`, `/aanmelden-klusser` (GET renders, POST submits)
//! - **Wizard**: `/gpt` (GET starts, POST advances one step)
//! - **JSON API**: `POST /api/contact`, `POST /api/gpt`, `POST /api/handyman`
//!
//! # OpenAPI Documentation
//!
//! The JSON API is documented with `utoipa`. The document is served at `/api/openapi.json` and
//! browsable at `/api/docs`.

pub mod handlers;
pub mod models;
