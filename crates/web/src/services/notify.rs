// =============================================================================
// Consent Banner Web - Remote Consent Notification
// =============================================================================
// Table of Contents:
// 1. Error Types
// 2. Endpoint Resolution
// 3. HTTP Notifier
// =============================================================================

use std::cell::RefCell;

use consent_banner_core::{ConsentNotifier, ConsentPayload};
use gloo_net::http::{Request, Response};
use thiserror::Error;
use wasm_bindgen_futures::spawn_local;

// -----------------------------------------------------------------------------
// 1. Error Types
// -----------------------------------------------------------------------------

/// Notification failures. Logged only; never reach the visitor.
#[derive(Error, Debug, Clone)]
pub enum NotifyError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error: {status} - {message}")]
    Server { status: u16, message: String },

    #[error("Deserialization error: {0}")]
    Deserialize(String),
}

// -----------------------------------------------------------------------------
// 2. Endpoint Resolution
// -----------------------------------------------------------------------------

pub const DEFAULT_ENDPOINT: &str = "/set-consent";

/// Development builds always post to the local relative endpoint.
pub fn resolve_endpoint(configured: Option<&str>) -> String {
    let environment = option_env!("ENVIRONMENT").unwrap_or("production");
    if environment == "development" {
        return DEFAULT_ENDPOINT.to_string();
    }
    configured
        .filter(|url| !url.is_empty())
        .unwrap_or(DEFAULT_ENDPOINT)
        .to_string()
}

// -----------------------------------------------------------------------------
// 3. HTTP Notifier
// -----------------------------------------------------------------------------

/// Fire-and-forget `POST {necessary, analytical, advertising}`.
pub struct HttpNotifier {
    endpoint: RefCell<String>,
}

impl HttpNotifier {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: RefCell::new(endpoint.into()),
        }
    }

    pub fn endpoint(&self) -> String {
        self.endpoint.borrow().clone()
    }

    pub fn set_endpoint(&self, endpoint: impl Into<String>) {
        *self.endpoint.borrow_mut() = endpoint.into();
    }

    async fn send(endpoint: String, payload: ConsentPayload) -> Result<serde_json::Value, NotifyError> {
        let response = Request::post(&endpoint)
            .json(&payload)
            .map_err(|e| NotifyError::Network(e.to_string()))?
            .send()
            .await
            .map_err(|e| NotifyError::Network(e.to_string()))?;
        Self::handle_response(response).await
    }

    async fn handle_response(response: Response) -> Result<serde_json::Value, NotifyError> {
        let status = response.status();
        match status {
            200..=299 => response
                .json::<serde_json::Value>()
                .await
                .map_err(|e| NotifyError::Deserialize(e.to_string())),
            _ => {
                let message = response.text().await.unwrap_or_default();
                Err(NotifyError::Server { status, message })
            }
        }
    }
}

impl ConsentNotifier for HttpNotifier {
    fn notify(&self, payload: ConsentPayload) {
        let endpoint = self.endpoint();
        spawn_local(async move {
            match Self::send(endpoint, payload).await {
                Ok(body) => log::debug!("Consent sent to server: {}", body),
                Err(err) => log::error!("Error sending consent to server: {}", err),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_endpoint() {
        if option_env!("ENVIRONMENT") == Some("development") {
            assert_eq!(resolve_endpoint(Some("https://example.com/consent")), DEFAULT_ENDPOINT);
        } else {
            assert_eq!(
                resolve_endpoint(Some("https://example.com/consent")),
                "https://example.com/consent"
            );
            assert_eq!(resolve_endpoint(Some("")), DEFAULT_ENDPOINT);
        }
        assert_eq!(resolve_endpoint(None), DEFAULT_ENDPOINT);
    }
}
