//! HTTP handlers for contact form submissions.
//!
//! `POST /api/contact` takes JSON with images already inlined. `/contact` serves the HTML form
//! and accepts its multipart post, inlining uploaded images on the server.

use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, State},
    http::StatusCode,
    response::Response,
};
use serde::Serialize;
use tracing::{instrument, warn};

use super::{decode_json, pages::render_page};
use crate::api::models::{
    contact::ContactSubmission,
    responses::{ErrorResponse, SubmissionResponse},
};
use crate::attachments::{self, UploadPolicy};
use crate::errors::{Error, Result};
use crate::forms::FormData;
use crate::i18n::Locale;
use crate::relay::{Destination, Submission};
use crate::AppState;

const PATH: &str = "/contact";

#[utoipa::path(
    post,
    path = "/contact",
    tag = "submissions",
    summary = "Submit contact form",
    description = "Validate a contact message and forward it, with a timestamp, to the contact webhook.",
    request_body = ContactSubmission,
    responses(
        (status = 200, description = "Message forwarded", body = SubmissionResponse),
        (status = 400, description = "Missing required fields or invalid email", body = ErrorResponse),
        (status = 500, description = "Body is not JSON, or the webhook is unavailable or rejected the message", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn submit_contact(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SubmissionResponse>> {
    let submission: ContactSubmission = decode_json(ContactSubmission::DESTINATION, &body)?;

    state.relay.submit(&submission).await?;

    Ok(Json(SubmissionResponse::delivered(Destination::Contact)))
}

#[derive(Debug, Serialize)]
struct ContactPage<'a> {
    form: &'a ContactSubmission,
    error: Option<String>,
    submitted: bool,
}

fn render_form(state: &AppState, locale: Locale, form: &ContactSubmission, error: Option<&Error>) -> Result<Response> {
    let status = error.map_or(StatusCode::OK, Error::status_code);
    let page = ContactPage {
        form,
        error: error.map(|err| state.catalog.messages(locale.0).get(err.ui_message_key())),
        submitted: false,
    };
    render_page(state, locale, status, "contact.html", PATH, page)
}

fn from_form(form: &FormData) -> ContactSubmission {
    ContactSubmission {
        name: form.text("name"),
        email: form.text("email").trim().to_string(),
        phone: form.optional_text("phone"),
        subject: form.text("subject"),
        message: form.text("message"),
        images: Vec::new(),
    }
}

#[instrument(skip_all)]
pub async fn contact_page(State(state): State<AppState>, locale: Locale) -> Result<Response> {
    render_form(&state, locale, &ContactSubmission::default(), None)
}

/// Handle the HTML contact form: inline the images, validate, relay, then render the outcome.
#[instrument(skip_all)]
pub async fn submit_contact_form(State(state): State<AppState>, locale: Locale, multipart: Multipart) -> Result<Response> {
    let mut form = match FormData::from_multipart(multipart).await {
        Ok(form) => form,
        Err(err) => return render_form(&state, locale, &ContactSubmission::default(), Some(&err)),
    };

    let mut submission = from_form(&form);
    let uploads = UploadPolicy::from_config(&state.config.uploads).filter(form.take_files("images"));
    match attachments::encode_all(uploads).await {
        Ok(images) => submission.images = images,
        Err(err) => return render_form(&state, locale, &submission, Some(&err)),
    }

    if let Err(err) = state.relay.submit(&submission).await {
        if err.status_code().is_server_error() {
            warn!(error = %err, "Contact form submission failed");
        }
        return render_form(&state, locale, &submission, Some(&err));
    }

    let page = ContactPage {
        form: &ContactSubmission::default(),
        error: None,
        submitted: true,
    };
    render_page(&state, locale, StatusCode::OK, "contact.html", PATH, page)
}
