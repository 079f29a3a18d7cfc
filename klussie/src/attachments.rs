//! Image attachments inlined as data URLs.
//!
//! Browsers post images as multipart file parts. Before a submission is relayed, each accepted
//! file becomes an [`Attachment`] whose `data` is a self-contained `data:<mime>;base64,...` string,
//! so the webhook receives one JSON document with no separate upload step.
//!
//! Files that are not images, or that exceed the configured size, are dropped from the selection
//! and logged. Encoding runs one blocking task per file and is joined all-or-nothing: if any file
//! fails, the whole submission fails.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use utoipa::ToSchema;

use crate::config::UploadConfig;
use crate::errors::{Error, Result};

/// An inline-encoded file, in the shape the webhooks expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Attachment {
    /// Original file name
    pub name: String,
    /// MIME type, e.g. `image/jpeg`
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Size of the original file in bytes
    pub size: u64,
    /// `data:<mime>;base64,<payload>`
    pub data: String,
}

/// A raw file part received from a browser form.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl Upload {
    /// The declared content type, or a guess from the file extension when the browser sent none
    /// (or sent `application/octet-stream`).
    pub fn mime_type(&self) -> String {
        match self.content_type.as_deref() {
            Some(declared) if !declared.is_empty() && declared != "application/octet-stream" => declared.to_string(),
            _ => mime_guess::from_path(&self.file_name).first_or_octet_stream().to_string(),
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

#[derive(Debug, Clone, Copy)]
pub struct UploadPolicy {
    pub max_file_size: u64,
}

impl UploadPolicy {
    pub fn from_config(config: &UploadConfig) -> Self {
        Self {
            max_file_size: config.max_file_size,
        }
    }

    pub fn accepts(&self, upload: &Upload) -> bool {
        upload.mime_type().starts_with("image/") && upload.size() <= self.max_file_size
    }

    /// Keep the uploads this policy accepts. Rejected files are not reported to the visitor.
    pub fn filter(&self, uploads: Vec<Upload>) -> Vec<Upload> {
        uploads
            .into_iter()
            .filter(|upload| {
                let accepted = self.accepts(upload);
                if !accepted {
                    info!(
                        file_name = %upload.file_name,
                        mime_type = %upload.mime_type(),
                        size = upload.size(),
                        max_file_size = self.max_file_size,
                        "Dropping upload: not an image or too large"
                    );
                }
                accepted
            })
            .collect()
    }
}

/// Encode a single upload.
pub fn encode(upload: Upload) -> Attachment {
    let mime_type = upload.mime_type();
    let size = upload.size();
    let data = format!("data:{};base64,{}", mime_type, STANDARD.encode(&upload.bytes));

    Attachment {
        name: upload.file_name,
        mime_type,
        size,
        data,
    }
}

/// Encode all uploads concurrently, preserving order.
#[instrument(skip_all, fields(count = uploads.len()))]
pub async fn encode_all(uploads: Vec<Upload>) -> Result<Vec<Attachment>> {
    if uploads.is_empty() {
        return Ok(Vec::new());
    }

    let tasks = uploads.into_iter().map(|upload| async move {
        tokio::task::spawn_blocking(move || encode(upload)).await.map_err(|e| Error::Internal {
            operation: format!("encode attachment: {e}"),
        })
    });

    let attachments = futures::future::try_join_all(tasks).await?;
    debug!(count = attachments.len(), "Encoded attachments");
    Ok(attachments)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, content_type: Option<&str>, bytes: &'static [u8]) -> Upload {
        Upload {
            file_name: name.to_string(),
            content_type: content_type.map(str::to_string),
            bytes: Bytes::from_static(bytes),
        }
    }

    #[test]
    fn test_encode_produces_data_url() {
        let attachment = encode(upload("kraan.png", Some("image/png"), b"hello"));

        assert_eq!(attachment.name, "kraan.png");
        assert_eq!(attachment.mime_type, "image/png");
        assert_eq!(attachment.size, 5);
        assert_eq!(attachment.data, "data:image/png;base64,aGVsbG8=");
    }

    #[test]
    fn test_attachment_wire_shape() {
        let attachment = encode(upload("a.jpg", Some("image/jpeg"), b"x"));
        let value = serde_json::to_value(&attachment).unwrap();

        assert_eq!(value["type"], "image/jpeg");
        assert!(value.get("mime_type").is_none());
    }

    #[test]
    fn test_mime_type_falls_back_to_extension() {
        assert_eq!(upload("foto.jpg", None, b"").mime_type(), "image/jpeg");
        assert_eq!(upload("foto.png", Some("application/octet-stream"), b"").mime_type(), "image/png");
        assert_eq!(upload("notes", None, b"").mime_type(), "application/octet-stream");
    }

    #[test]
    fn test_policy_drops_non_images_and_oversized_files() {
        let policy = UploadPolicy { max_file_size: 4 };

        let kept = policy.filter(vec![
            upload("ok.png", Some("image/png"), b"1234"),
            upload("too-big.png", Some("image/png"), b"12345"),
            upload("offerte.pdf", Some("application/pdf"), b"1"),
        ]);

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].file_name, "ok.png");
    }

    #[tokio::test]
    async fn test_encode_all_preserves_order() {
        let attachments = encode_all(vec![
            upload("1.png", Some("image/png"), b"a"),
            upload("2.png", Some("image/png"), b"b"),
            upload("3.png", Some("image/png"), b"c"),
        ])
        .await
        .unwrap();

        let names: Vec<_> = attachments.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["1.png", "2.png", "3.png"]);
    }

    #[tokio::test]
    async fn test_encode_all_empty() {
        assert!(encode_all(Vec::new()).await.unwrap().is_empty());
    }
}
