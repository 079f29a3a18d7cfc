//! Multipart form bodies posted by the server-rendered pages.

use std::collections::HashMap;

use axum::extract::Multipart;
use tracing::debug;

use crate::attachments::Upload;
use crate::errors::{Error, Result};

/// Text fields and file parts of one form post.
///
/// Repeated names (checkbox groups, multi-file inputs) keep every value in order.
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, Vec<String>>,
    files: HashMap<String, Vec<Upload>>,
}

impl FormData {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self> {
        let mut form = FormData::default();

        while let Some(field) = multipart.next_field().await.map_err(|e| Error::BadRequest {
            message: format!("Failed to parse multipart data: {}", e),
        })? {
            let name = field.name().unwrap_or("").to_string();

            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await.map_err(|e| Error::BadRequest {
                        message: format!("Failed to read uploaded file: {}", e),
                    })?;

                    // An empty file input still posts a nameless, empty part
                    if file_name.is_empty() && bytes.is_empty() {
                        continue;
                    }

                    debug!(field = %name, file_name = %file_name, size = bytes.len(), "Received file part");
                    form.files.entry(name).or_default().push(Upload {
                        file_name,
                        content_type,
                        bytes,
                    });
                }
                None => {
                    let value = field.text().await.map_err(|e| Error::BadRequest {
                        message: format!("Failed to read form field: {}", e),
                    })?;
                    form.fields.entry(name).or_default().push(value);
                }
            }
        }

        Ok(form)
    }

    /// First value of a text field, or an empty string.
    pub fn text(&self, name: &str) -> String {
        self.fields
            .get(name)
            .and_then(|values| values.first())
            .cloned()
            .unwrap_or_default()
    }

    /// Non-empty, trimmed value of an optional text field.
    pub fn optional_text(&self, name: &str) -> Option<String> {
        let value = self.text(name);
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    /// All values of a repeated text field.
    pub fn texts(&self, name: &str) -> Vec<String> {
        self.fields.get(name).cloned().unwrap_or_default()
    }

    /// Remove and return the files posted under `name`.
    pub fn take_files(&mut self, name: &str) -> Vec<Upload> {
        self.files.remove(name).unwrap_or_default()
    }
}

#[cfg(test)]
impl FormData {
    pub fn with_field(mut self, name: &str, value: &str) -> Self {
        self.fields.entry(name.to_string()).or_default().push(value.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_accessors() {
        let form = FormData::default()
            .with_field("name", "Jan")
            .with_field("btw", "   ")
            .with_field("services", "Tegelwerk")
            .with_field("services", "Elektra");

        assert_eq!(form.text("name"), "Jan");
        assert_eq!(form.text("missing"), "");
        assert_eq!(form.optional_text("btw"), None);
        assert_eq!(form.optional_text("name"), Some("Jan".to_string()));
        assert_eq!(form.texts("services"), vec!["Tegelwerk", "Elektra"]);
    }
}
