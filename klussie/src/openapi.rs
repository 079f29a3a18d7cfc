//! OpenAPI documentation for the JSON submission API at `/api/*`.
//!
//! Served as JSON at `/api/openapi.json` and browsable through Scalar at `/api/docs`.

use utoipa::OpenApi;

use crate::api;
use crate::attachments::Attachment;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Klussie submission API",
        description = "Validates contact messages, job requests and handyman registrations and relays \
                       them, with a server-side timestamp, to the configured automation webhooks."
    ),
    servers(
        (url = "/api", description = "Submission API")
    ),
    paths(
        api::handlers::contact::submit_contact,
        api::handlers::gpt::submit_job_request,
        api::handlers::handyman::submit_signup,
    ),
    components(
        schemas(
            api::models::contact::ContactSubmission,
            api::models::job_requests::JobRequest,
            api::models::handyman::HandymanSignup,
            api::models::responses::SubmissionResponse,
            api::models::responses::ErrorResponse,
            Attachment,
        )
    ),
    tags(
        (name = "submissions", description = "Form submissions relayed to external webhooks"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documents_all_submission_routes() {
        let spec = ApiDoc::openapi();

        for path in ["/contact", "/gpt", "/handyman"] {
            assert!(spec.paths.paths.contains_key(path), "missing {path}");
        }

        let schemas = spec.components.unwrap().schemas;
        assert!(schemas.contains_key("JobRequest"));
        assert!(schemas.contains_key("Attachment"));
    }
}
