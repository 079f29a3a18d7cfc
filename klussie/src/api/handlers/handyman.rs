//! HTTP handlers for handyman registrations (`/api/handyman` and the `/aanmelden-klusser` form).

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
    handyman::HandymanSignup,
    responses::{ErrorResponse, SubmissionResponse},
};
use crate::attachments::{self, UploadPolicy};
use crate::errors::{Error, Result};
use crate::forms::FormData;
use crate::i18n::Locale;
use crate::relay::{Destination, Submission};
use crate::AppState;

const PATH: &str = "/aanmelden-klusser";

#[utoipa::path(
    post,
    path = "/handyman",
    tag = "submissions",
    summary = "Register as handyman",
    description = "Validate a handyman registration (including the 8-digit KvK number) and forward it, \
                   with a timestamp, to the handyman webhook.",
    request_body = HandymanSignup,
    responses(
        (status = 200, description = "Registration forwarded", body = SubmissionResponse),
        (status = 400, description = "Missing fields, invalid email or invalid KvK number", body = ErrorResponse),
        (status = 500, description = "Body is not JSON, or the webhook is not configured, unavailable or rejected the registration", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn submit_signup(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SubmissionResponse>> {
    let signup: HandymanSignup = decode_json(HandymanSignup::DESTINATION, &body)?;

    state.relay.submit(&signup).await?;

    Ok(Json(SubmissionResponse::delivered(Destination::Handyman)))
}

#[derive(Debug, Serialize)]
struct SignupPage<'a> {
    form: &'a HandymanSignup,
    error: Option<String>,
    submitted: bool,
}

fn render_form(state: &AppState, locale: Locale, form: &HandymanSignup, error: Option<&Error>) -> Result<Response> {
    let page = SignupPage {
        form,
        error: error.map(|err| state.catalog.messages(locale.0).get(err.ui_message_key())),
        submitted: false,
    };
    let status = error.map_or(StatusCode::OK, Error::status_code);
    render_page(state, locale, status, "handyman_signup.html", PATH, page)
}

fn from_form(form: &FormData) -> HandymanSignup {
    HandymanSignup {
        name: form.text("name"),
        email: form.text("email").trim().to_string(),
        phone: form.text("phone"),
        kvk: form.text("kvk"),
        btw: form.optional_text("btw"),
        profile_photo: None,
        description: form.text("description"),
        services: form.texts("services"),
    }
}

#[instrument(skip_all)]
pub async fn signup_page(State(state): State<AppState>, locale: Locale) -> Result<Response> {
    render_form(&state, locale, &HandymanSignup::default(), None)
}

#[instrument(skip_all)]
pub async fn submit_signup_form(State(state): State<AppState>, locale: Locale, multipart: Multipart) -> Result<Response> {
    let mut form = match FormData::from_multipart(multipart).await {
        Ok(form) => form,
        Err(err) => return render_form(&state, locale, &HandymanSignup::default(), Some(&err)),
    };

    let mut signup = from_form(&form);
    // Only the first accepted photo is kept
    let photos = UploadPolicy::from_config(&state.config.uploads).filter(form.take_files("profile_photo"));
    match attachments::encode_all(photos.into_iter().take(1).collect()).await {
        Ok(encoded) => signup.profile_photo = encoded.into_iter().next(),
        Err(err) => return render_form(&state, locale, &signup, Some(&err)),
    }

    if let Err(err) = state.relay.submit(&signup).await {
        if err.status_code().is_server_error() {
            warn!(error = %err, "Handyman registration failed");
        }
        return render_form(&state, locale, &signup, Some(&err));
    }

    let page = SignupPage {
        form: &HandymanSignup::default(),
        error: None,
        submitted: true,
    };
    render_page(&state, locale, StatusCode::OK, "handyman_signup.html", PATH, page)
}
