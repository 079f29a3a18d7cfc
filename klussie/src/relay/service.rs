//! Webhook relay service.
//!
//! Created once at startup and shared through [`AppState`](crate::AppState). The underlying
//! `reqwest::Client` pools connections, so cloning the relay is cheap.

use axum::http::StatusCode;
use bytes::Bytes;
use serde::Serialize;
use thiserror::Error as ThisError;
use tracing::{info, instrument, warn};
use url::Url;
use uuid::Uuid;

use super::{Destination, Stamped, Submission};
use crate::config::RelayConfig;

#[derive(ThisError, Debug)]
pub enum RelayError {
    /// No URL configured for this destination; submissions fail closed
    #[error("No webhook URL configured for {destination}")]
    NotConfigured { destination: Destination },

    #[error("Failed to encode {destination} payload: {source}")]
    Encode {
        destination: Destination,
        #[source]
        source: serde_json::Error,
    },

    /// Webhook unreachable, timed out, or the response body could not be read
    #[error("Failed to reach {destination} webhook: {source}")]
    Transport {
        destination: Destination,
        #[source]
        source: reqwest::Error,
    },

    #[error("{destination} webhook responded with HTTP {status}")]
    Status { destination: Destination, status: u16 },

    /// Webhook answered 2xx but the body was not the JSON we expected
    #[error("Failed to decode {destination} webhook response: {source}")]
    Decode {
        destination: Destination,
        #[source]
        source: serde_json::Error,
    },
}

impl RelayError {
    pub fn destination(&self) -> Destination {
        match self {
            RelayError::NotConfigured { destination }
            | RelayError::Encode { destination, .. }
            | RelayError::Transport { destination, .. }
            | RelayError::Status { destination, .. }
            | RelayError::Decode { destination, .. } => *destination,
        }
    }
}

/// A successful (2xx) webhook response.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub destination: Destination,
    pub submission_id: Uuid,
    pub status: StatusCode,
    pub body: Bytes,
}

impl Delivery {
    /// Parse the webhook's response body as JSON.
    pub fn json(&self) -> Result<serde_json::Value, RelayError> {
        serde_json::from_slice(&self.body).map_err(|source| RelayError::Decode {
            destination: self.destination,
            source,
        })
    }
}

#[derive(Debug, Clone)]
pub struct WebhookRelay {
    http_client: reqwest::Client,
    contact_url: Option<Url>,
    job_request_url: Option<Url>,
    handyman_url: Option<Url>,
}

impl WebhookRelay {
    pub fn new(config: &RelayConfig) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {e}"))?;

        Ok(Self {
            http_client,
            contact_url: config.contact_url.clone(),
            job_request_url: config.gpt_url.clone(),
            handyman_url: config.handyman_url.clone(),
        })
    }

    pub fn endpoint(&self, destination: Destination) -> Option<&Url> {
        match destination {
            Destination::Contact => self.contact_url.as_ref(),
            Destination::JobRequest => self.job_request_url.as_ref(),
            Destination::Handyman => self.handyman_url.as_ref(),
        }
    }

    /// Validate a submission and deliver it to its destination.
    ///
    /// Validation errors are returned before any network traffic happens.
    pub async fn submit<S: Submission>(&self, submission: &S) -> crate::errors::Result<Delivery> {
        submission.validate()?;
        Ok(self.deliver(S::DESTINATION, submission).await?)
    }

    /// POST `payload` plus a timestamp to the destination's webhook.
    #[instrument(skip_all, fields(destination = %destination))]
    pub async fn deliver<T: Serialize>(&self, destination: Destination, payload: &T) -> Result<Delivery, RelayError> {
        let url = self.endpoint(destination).ok_or(RelayError::NotConfigured { destination })?;

        let submission_id = Uuid::new_v4();
        let body = serde_json::to_vec(&Stamped::now(payload)).map_err(|source| RelayError::Encode { destination, source })?;
        let body_size = body.len();

        let result = self
            .http_client
            .post(url.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                let status_code = response.status().as_u16();
                let body = response
                    .bytes()
                    .await
                    .map_err(|source| RelayError::Transport { destination, source })?;
                info!(
                    submission_id = %submission_id,
                    status = status_code,
                    body_size,
                    "Webhook delivered successfully"
                );
                Ok(Delivery {
                    destination,
                    submission_id,
                    status: StatusCode::from_u16(status_code).unwrap_or(StatusCode::OK),
                    body,
                })
            }
            Ok(response) => {
                let status_code = response.status().as_u16();
                warn!(
                    submission_id = %submission_id,
                    status = status_code,
                    "Webhook delivery failed"
                );
                Err(RelayError::Status {
                    destination,
                    status: status_code,
                })
            }
            Err(e) => {
                warn!(
                    submission_id = %submission_id,
                    error = %e,
                    "Webhook delivery failed (network error)"
                );
                Err(RelayError::Transport { destination, source: e })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use crate::test_utils::{install_crypto_provider, relay_config};
    use serde_json::{Value, json};
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Serialize)]
    struct Ping {
        name: String,
    }

    impl Submission for Ping {
        const DESTINATION: Destination = Destination::Contact;

        fn validate(&self) -> crate::errors::Result<()> {
            if self.name.is_empty() {
                return Err(Error::MissingFields {
                    destination: Self::DESTINATION,
                });
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_deliver_posts_json_with_timestamp() {
        install_crypto_provider();
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/contact"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .expect(1)
            .mount(&server)
            .await;

        let relay = WebhookRelay::new(&relay_config(&server.uri())).unwrap();
        let delivery = relay.submit(&Ping { name: "Jan".to_string() }).await.unwrap();

        assert_eq!(delivery.status, StatusCode::OK);
        assert_eq!(delivery.json().unwrap(), json!({ "ok": true }));

        let requests = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["name"], "Jan");
        assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[tokio::test]
    async fn test_invalid_submission_is_not_sent() {
        install_crypto_provider();
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let relay = WebhookRelay::new(&relay_config(&server.uri())).unwrap();
        let result = relay.submit(&Ping { name: String::new() }).await;

        assert!(matches!(result, Err(Error::MissingFields { .. })));
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        install_crypto_provider();
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream exploded"))
            .mount(&server)
            .await;

        let relay = WebhookRelay::new(&relay_config(&server.uri())).unwrap();
        let result = relay.deliver(Destination::Contact, &json!({ "name": "Jan" })).await;

        match result {
            Err(RelayError::Status { destination, status }) => {
                assert_eq!(destination, Destination::Contact);
                assert_eq!(status, 503);
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unconfigured_destination_fails_closed() {
        install_crypto_provider();
        let mut config = relay_config("http://127.0.0.1:9");
        config.handyman_url = None;

        let relay = WebhookRelay::new(&config).unwrap();
        let result = relay.deliver(Destination::Handyman, &json!({})).await;

        assert!(matches!(
            result,
            Err(RelayError::NotConfigured {
                destination: Destination::Handyman
            })
        ));
    }

    #[tokio::test]
    async fn test_timeout_is_a_transport_error() {
        install_crypto_provider();
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let mut config = relay_config(&server.uri());
        config.timeout = Duration::from_millis(100);

        let relay = WebhookRelay::new(&config).unwrap();
        let result = relay.deliver(Destination::JobRequest, &json!({})).await;

        assert!(matches!(result, Err(RelayError::Transport { .. })));
    }

    #[test]
    fn test_non_json_body_is_a_decode_error() {
        let delivery = Delivery {
            destination: Destination::JobRequest,
            submission_id: Uuid::new_v4(),
            status: StatusCode::OK,
            body: Bytes::from_static(b"Accepted"),
        };

        assert!(matches!(delivery.json(), Err(RelayError::Decode { .. })));
    }
}
