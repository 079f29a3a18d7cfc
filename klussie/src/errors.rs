use crate::relay::{Destination, RelayError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// A required field was absent, empty, or of the wrong type
    #[error("Missing required fields for {destination} submission")]
    MissingFields { destination: Destination },

    /// Email address does not look like `local@domain.tld`
    #[error("Invalid email format")]
    InvalidEmail,

    /// KvK number is not eight digits after removing whitespace
    #[error("Invalid KVK number format")]
    InvalidRegistrationNumber,

    /// Invalid request data, e.g. an unreadable multipart body
    #[error("{message}")]
    BadRequest { message: String },

    /// Request body is not JSON at all
    #[error("Unreadable {destination} request body: {source}")]
    UnreadableBody {
        destination: Destination,
        #[source]
        source: serde_json::Error,
    },

    /// Forwarding to the external webhook failed
    #[error(transparent)]
    Relay(#[from] RelayError),

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    #[error(transparent)]
    Template(#[from] minijinja::Error),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingFields { .. } | Error::InvalidEmail | Error::InvalidRegistrationNumber | Error::BadRequest { .. } => {
                StatusCode::BAD_REQUEST
            }
            Error::UnreadableBody { .. } | Error::Relay(_) | Error::Internal { .. } | Error::Template(_) | Error::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    /// such as webhook URLs or upstream responses.
    pub fn user_message(&self) -> String {
        match self {
            Error::MissingFields { destination } => destination.missing_fields_message().to_string(),
            Error::InvalidEmail => "Invalid email format".to_string(),
            Error::InvalidRegistrationNumber => "Invalid KVK number format".to_string(),
            Error::BadRequest { message } => message.clone(),
            Error::UnreadableBody { destination, .. } => destination.failure_message().to_string(),
            Error::Relay(relay_err) => relay_err.destination().failure_message().to_string(),
            Error::Internal { .. } | Error::Template(_) | Error::Other(_) => "Internal server error".to_string(),
        }
    }

    /// Translation key of the message shown inline on the HTML forms.
    pub fn ui_message_key(&self) -> &'static str {
        match self {
            Error::MissingFields { .. } => "errors.missingFields",
            Error::InvalidEmail => "errors.invalidEmail",
            Error::InvalidRegistrationNumber => "errors.invalidRegistrationNumber",
            Error::BadRequest { .. } => "errors.uploadFailed",
            Error::UnreadableBody { .. } | Error::Relay(_) | Error::Internal { .. } | Error::Template(_) | Error::Other(_) => {
                "errors.submitFailed"
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full error details for debugging - different log levels based on severity
        match &self {
            Error::Internal { .. } | Error::Template(_) | Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::UnreadableBody { .. } => {
                tracing::warn!("Unreadable request body: {:#}", self);
            }
            Error::Relay(_) => {
                tracing::warn!("Relay error: {:#}", self);
            }
            Error::MissingFields { .. } | Error::InvalidEmail | Error::InvalidRegistrationNumber | Error::BadRequest { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        let status = self.status_code();
        let body = if status.is_server_error() {
            json!({ "error": self.user_message(), "success": false })
        } else {
            json!({ "error": self.user_message() })
        };

        (status, Json(body)).into_response()
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            Error::MissingFields {
                destination: Destination::Contact
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(Error::InvalidEmail.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(Error::InvalidRegistrationNumber.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            Error::Relay(RelayError::NotConfigured {
                destination: Destination::Handyman
            })
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_relay_errors_hide_cause() {
        let err = Error::Relay(RelayError::Status {
            destination: Destination::JobRequest,
            status: 502,
        });
        let message = err.user_message();
        assert_eq!(message, "Failed to submit GPT request. Please try again later.");
        assert!(!message.contains("502"));
    }

    #[test]
    fn test_missing_fields_message_per_destination() {
        let contact = Error::MissingFields {
            destination: Destination::Contact,
        };
        let handyman = Error::MissingFields {
            destination: Destination::Handyman,
        };
        assert_eq!(contact.user_message(), "Missing required fields");
        assert_eq!(handyman.user_message(), "Missing or invalid required fields for handyman registration");
    }
}
