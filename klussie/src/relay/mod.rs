//! Forwarding of form submissions to external automation webhooks.
//!
//! Every accepted submission results in exactly one outbound `POST` carrying the submitted fields
//! plus a server-side `timestamp`. There is no retry and no persistence: a failed delivery is a
//! failed submission, reported to the caller with a generic message while the cause is logged.
//!
//! ```text
//!   handler ──► Submission::validate ──► WebhookRelay::submit ──► POST {destination url}
//!                       │                          │
//!                   400 error            Stamped { ..fields, timestamp }
//! ```

mod payload;
mod service;

use std::fmt;

use serde::Serialize;

pub use payload::Stamped;
pub use service::{Delivery, RelayError, WebhookRelay};

/// The external endpoint a submission is delivered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    Contact,
    JobRequest,
    Handyman,
}

impl Destination {
    pub fn as_str(&self) -> &'static str {
        match self {
            Destination::Contact => "contact",
            Destination::JobRequest => "gpt",
            Destination::Handyman => "handyman",
        }
    }

    pub fn missing_fields_message(&self) -> &'static str {
        match self {
            Destination::Contact | Destination::JobRequest => "Missing required fields",
            Destination::Handyman => "Missing or invalid required fields for handyman registration",
        }
    }

    pub fn failure_message(&self) -> &'static str {
        match self {
            Destination::Contact => "Failed to submit contact form. Please try again later.",
            Destination::JobRequest => "Failed to submit GPT request. Please try again later.",
            Destination::Handyman => "Failed to submit request. Please try again later.",
        }
    }

    pub fn success_message(&self) -> &'static str {
        match self {
            Destination::Contact => "Contact form submitted successfully",
            Destination::JobRequest => "GPT request submitted successfully",
            Destination::Handyman => "Handyman registration submitted successfully",
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated payload bound for one [`Destination`].
///
/// `validate` checks required fields first and formats second, so callers always see
/// [`Error::MissingFields`](crate::errors::Error::MissingFields) before a format error.
pub trait Submission: Serialize + Send + Sync {
    const DESTINATION: Destination;

    fn validate(&self) -> crate::errors::Result<()>;
}
