//! HTTP handler for job requests collected by the wizard.

use axum::{Json, body::Bytes, extract::State};

use super::decode_json;
use crate::api::models::{
    job_requests::JobRequest,
    responses::{ErrorResponse, SubmissionResponse},
};
use crate::errors::Result;
use crate::relay::{Destination, Submission};
use crate::AppState;

#[utoipa::path(
    post,
    path = "/gpt",
    tag = "submissions",
    summary = "Submit job request",
    description = "Validate a job request and forward it, with a timestamp, to the job request webhook. \
                   The webhook's JSON response is returned as `data`.",
    request_body = JobRequest,
    responses(
        (status = 200, description = "Request forwarded", body = SubmissionResponse),
        (status = 400, description = "Missing required fields or invalid email", body = ErrorResponse),
        (status = 500, description = "Body is not JSON, or the webhook is unavailable, rejected the request or returned non-JSON", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn submit_job_request(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SubmissionResponse>> {
    let request: JobRequest = decode_json(JobRequest::DESTINATION, &body)?;

    let delivery = state.relay.submit(&request).await?;
    let data = delivery.json()?;

    Ok(Json(SubmissionResponse::delivered(Destination::JobRequest).with_data(data)))
}
