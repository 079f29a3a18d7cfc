//! API request model for handyman registrations.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::attachments::Attachment;
use crate::errors::{Error, Result};
use crate::relay::{Destination, Submission};
use crate::validation::{is_blank, is_valid_email, is_valid_registration_number};

/// A handyman signing up to receive jobs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct HandymanSignup {
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Chamber of Commerce number, 8 digits (whitespace ignored)
    #[schema(example = "1234 5678")]
    pub kvk: String,
    /// VAT number
    pub btw: Option<String>,
    pub profile_photo: Option<Attachment>,
    /// About the handyman: experience, specialties, area
    pub description: String,
    /// Offered service categories, at least one
    pub services: Vec<String>,
}

impl Submission for HandymanSignup {
    const DESTINATION: Destination = Destination::Handyman;

    fn validate(&self) -> Result<()> {
        let blank_field = [&self.name, &self.email, &self.phone, &self.kvk, &self.description]
            .iter()
            .any(|value| is_blank(value));

        if blank_field || self.services.is_empty() {
            return Err(Error::MissingFields {
                destination: Self::DESTINATION,
            });
        }

        if !is_valid_email(&self.email) {
            return Err(Error::InvalidEmail);
        }

        if !is_valid_registration_number(&self.kvk) {
            return Err(Error::InvalidRegistrationNumber);
        }

        Ok(())
    }
}
