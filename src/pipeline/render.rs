//! Packet rendering: POST the canonical request to the rendering service.
//!
//! PDF composition happens remotely; this stage only speaks the contract:
//!
//! * `POST <endpoint>/generate-packet` with a JSON [`PacketRequest`] body
//! * 2xx → raw PDF bytes (must be non-empty)
//! * non-2xx → JSON `{ "message": ... }` or plain text, surfaced as
//!   [`PacketError::RenderService`]
//!
//! No retry is performed here.

use crate::config::PacketConfig;
use crate::error::{PacketError, Stage};
use crate::model::{PacketArtifact, PacketRequest};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Client for the remote rendering service.
#[derive(Debug, Clone)]
pub struct PacketClient {
    client: reqwest::Client,
    endpoint: String,
    url: String,
    timeout_secs: u64,
}

impl PacketClient {
    pub fn new(client: reqwest::Client, config: &PacketConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint.clone(),
            url: config.generate_url(),
            timeout_secs: config.render_timeout_secs,
        }
    }

    /// Base URL this client was constructed with.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send `request` and return the rendered packet.
    ///
    /// # Errors
    /// * [`PacketError::Connectivity`] — the service could not be reached.
    /// * [`PacketError::Timeout`] — no complete response within the render timeout.
    /// * [`PacketError::RenderService`] — non-2xx status.
    /// * [`PacketError::EmptyArtifact`] — 2xx with a zero-byte body.
    pub async fn generate(&self, request: &PacketRequest) -> Result<PacketArtifact, PacketError> {
        let url = &self.url;
        let start = Instant::now();
        info!(
            "Requesting packet from {} ({} documents)",
            url,
            request.documents.len()
        );

        let response = self
            .client
            .post(url)
            .timeout(Duration::from_secs(self.timeout_secs))
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = extract_error_message(&body);
            error!("Rendering service returned {}: {}", status, message);
            return Err(PacketError::RenderService {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("").to_string(),
                message,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;

        if bytes.is_empty() {
            error!("Rendering service returned {} with an empty body", status);
            return Err(PacketError::EmptyArtifact);
        }

        let artifact = PacketArtifact::new(bytes.to_vec())?;
        if !artifact.looks_like_pdf() {
            warn!("Rendered packet does not start with %PDF; passing it through unchanged");
        }
        debug!(
            "Packet rendered: {} bytes in {}ms",
            artifact.len(),
            start.elapsed().as_millis()
        );
        Ok(artifact)
    }

    fn transport_error(&self, e: reqwest::Error) -> PacketError {
        if e.is_timeout() {
            PacketError::Timeout {
                stage: Stage::Render,
                secs: self.timeout_secs,
            }
        } else {
            PacketError::Connectivity {
                endpoint: self.endpoint.clone(),
                reason: e.to_string(),
            }
        }
    }
}

/// Best-effort message from an error body.
///
/// JSON with a string `message` → that string; other JSON → the JSON text;
/// anything else → the raw body.
pub fn extract_error_message(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => match value.get("message").and_then(|m| m.as_str()) {
            Some(message) => message.to_string(),
            None => value.to_string(),
        },
        Err(_) if body.trim().is_empty() => "(empty response body)".to_string(),
        Err(_) => body.trim().to_string(),
    }
}
