//! API request model for the job request wizard.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::attachments::Attachment;
use crate::errors::{Error, Result};
use crate::relay::{Destination, Submission};
use crate::validation::{is_blank, is_valid_email};

/// A job request collected by the wizard at `/gpt`.
///
/// The route only insists on `name`, `email`, `jobType` and `description`; the wizard itself
/// enforces the phone and postal code formats before it ever submits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct JobRequest {
    /// Short label, e.g. "lekkende kraan"
    pub job_type: String,
    pub description: String,
    /// `low`, `medium` or `high`
    #[schema(example = "medium")]
    pub urgency: String,
    /// Free text, e.g. "€ 150"
    pub budget: String,
    pub images: Vec<Attachment>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    /// Dutch postal code, e.g. `1234AB`
    pub postal_code: String,
    pub city: String,
}

impl Submission for JobRequest {
    const DESTINATION: Destination = Destination::JobRequest;

    fn validate(&self) -> Result<()> {
        if [&self.name, &self.email, &self.job_type, &self.description].iter().any(|value| is_blank(value)) {
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
    use serde_json::json;

    #[test]
    fn test_camel_case_wire_names() {
        let request: JobRequest = serde_json::from_value(json!({
            "jobType": "Lekkage",
            "description": "Kraan lekt",
            "postalCode": "1234AB",
            "name": "Jan",
            "email": "jan@example.nl"
        }))
        .unwrap();

        assert_eq!(request.job_type, "Lekkage");
        assert_eq!(request.postal_code, "1234AB");
        assert!(request.validate().is_ok());

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["jobType"], "Lekkage");
        assert_eq!(value["postalCode"], "1234AB");
        assert!(value.get("job_type").is_none());
    }

    #[test]
    fn test_only_contact_and_job_fields_required() {
        let request = JobRequest {
            job_type: "Schilderwerk".to_string(),
            description: "Twee slaapkamers".to_string(),
            name: "Piet".to_string(),
            email: "piet@example.nl".to_string(),
            ..Default::default()
        };
        assert!(request.validate().is_ok());

        let missing = JobRequest {
            description: String::new(),
            ..request
        };
        assert!(matches!(missing.validate(), Err(Error::MissingFields { .. })));
    }
}
