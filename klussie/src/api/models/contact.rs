//! API request model for the contact form.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::attachments::Attachment;
use crate::errors::{Error, Result};
use crate::relay::{Destination, Submission};
use crate::validation::{is_blank, is_valid_email};

/// A message sent through the contact form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct ContactSubmission {
    /// Sender's name
    pub name: String,
    /// Address replies go to
    pub email: String,
    /// Optional phone number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
    /// Inline-encoded photos
    pub images: Vec<Attachment>,
}

impl Submission for ContactSubmission {
    const DESTINATION: Destination = Destination::Contact;

    fn validate(&self) -> Result<()> {
        if [&self.name, &self.email, &self.subject, &self.message].iter().any(|value| is_blank(value)) {
            return Err(Error::MissingFields {
                destination: Self::DESTINATION,
            });
        }

        if !is_valid_email(&self.email) {
            return Err(Error::InvalidEmail);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ContactSubmission {
        ContactSubmission {
            name: "Jan de Vries".to_string(),
            email: "jan@example.nl".to_string(),
            phone: None,
            subject: "Vraag over een klus".to_string(),
            message: "Kunnen jullie ook dakgoten reinigen?".to_string(),
            images: Vec::new(),
        }
    }

    #[test]
    fn test_valid_submission() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_each_required_field() {
        let clears: [fn(&mut ContactSubmission); 4] = [
            |s: &mut ContactSubmission| s.name.clear(),
            |s: &mut ContactSubmission| s.email.clear(),
            |s: &mut ContactSubmission| s.subject = "  ".to_string(),
            |s: &mut ContactSubmission| s.message.clear(),
        ];

        for clear in clears {
            let mut submission = valid();
            clear(&mut submission);
            assert!(matches!(submission.validate(), Err(Error::MissingFields { .. })));
        }
    }

    #[test]
    fn test_missing_fields_reported_before_bad_email() {
        let submission = ContactSubmission {
            email: "not-an-email".to_string(),
            message: String::new(),
            ..valid()
        };
        assert!(matches!(submission.validate(), Err(Error::MissingFields { .. })));
    }

    #[test]
    fn test_invalid_email() {
        let submission = ContactSubmission {
            email: "jan@example".to_string(),
            ..valid()
        };
        assert!(matches!(submission.validate(), Err(Error::InvalidEmail)));
    }

    #[test]
    fn test_phone_omitted_from_payload_when_absent() {
        let value = serde_json::to_value(valid()).unwrap();
        assert!(value.get("phone").is_none());
        assert_eq!(value["images"], serde_json::json!([]));
    }
}
