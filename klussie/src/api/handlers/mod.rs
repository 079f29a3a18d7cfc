//! HTTP request handlers for pages, forms and the JSON API.
//!
//! # Handler Modules
//!
//! - [`contact`]: Contact form submissions (`POST /api/contact`)
//! - [`gpt`]: Job requests from the wizard (`POST /api/gpt`)
//! - [`handyman`]: Handyman registrations (`POST /api/handyman`)
//! - [`pages`]: Home, about, legal and 404 pages
//! - [`wizard`]: The conversational job request wizard (`/gpt`)
//! - [`static_assets`]: Embedded stylesheet, icons and robots file
//!
//! # Error Handling
//!
//! JSON handlers return [`crate::errors::Error`], which converts to `{error}` (400) or
//! `{error, success: false}` (500) JSON bodies. Form handlers re-render the page with a
//! translated message instead. JSON bodies are decoded whatever their `Content-Type`: a body with
//! the wrong shape counts as missing fields (400), a body that is not JSON fails the submission
//! (500).

pub mod contact;
pub mod gpt;
pub mod handyman;
pub mod pages;
pub mod static_assets;
pub mod wizard;

use serde::de::DeserializeOwned;
use serde_json::error::Category;

use crate::errors::{Error, Result};
use crate::relay::Destination;

/// Decode a JSON request body for `destination`, ignoring the declared content type.
pub(crate) fn decode_json<T: DeserializeOwned>(destination: Destination, body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|source| match source.classify() {
        Category::Data => {
            tracing::debug!(destination = %destination, reason = %source, "Rejected request body");
            Error::MissingFields { destination }
        }
        Category::Syntax | Category::Eof | Category::Io => Error::UnreadableBody { destination, source },
    })
}
