//! Backend REST API client
//!
//! Thin typed wrapper over the platform's JSON API. Every call makes exactly
//! one request: no retries, no client-side timeouts beyond reqwest's
//! defaults. Error bodies of the form `{"error": ...}` or `{"detail": ...}`
//! are unwrapped into [`BackendError::Status`] so handlers can show the
//! backend's own message.

pub mod auth;
pub mod availability;
pub mod error;
pub mod patients;
pub mod reviews;
pub mod sessions;
pub mod therapists;

pub use error::BackendError;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Client for the therapy platform backend.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: Client,
    base_url: String,
}

impl BackendClient {
    /// `base_url` is the API root without a trailing slash, e.g.
    /// `http://localhost:8000/api`.
    pub fn new(base_url: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn apply_token(builder: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
    ) -> Result<T, BackendError> {
        let builder = Self::apply_token(self.http.get(self.url(path)), token);
        let response = builder
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;
        Self::parse_json(response).await
    }

    pub(crate) async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
        body: &B,
    ) -> Result<T, BackendError> {
        let builder = Self::apply_token(self.http.post(self.url(path)), token);
        let response = builder
            .json(body)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;
        Self::parse_json(response).await
    }

    pub(crate) async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
        body: &B,
    ) -> Result<T, BackendError> {
        let builder = Self::apply_token(self.http.put(self.url(path)), token);
        let response = builder
            .json(body)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;
        Self::parse_json(response).await
    }

    pub(crate) async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
        form: reqwest::multipart::Form,
    ) -> Result<T, BackendError> {
        let builder = Self::apply_token(self.http.post(self.url(path)), token);
        let response = builder
            .multipart(form)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;
        Self::parse_json(response).await
    }

    async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
                message: extract_error_message(status, &body),
            });
        }

        serde_json::from_str(&body).map_err(|e| BackendError::UnexpectedPayload(e.to_string()))
    }
}

/// Pull the human-readable message out of an error body, falling back to the
/// status line when the body is not the expected shape.
fn extract_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["error", "detail", "message"] {
            if let Some(message) = value.get(key).and_then(|v| v.as_str()) {
                return message.to_string();
            }
        }
    }
    status
        .canonical_reason()
        .unwrap_or("Request failed")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash() {
        let client = BackendClient::new("http://localhost:8000/api/");
        assert_eq!(
            client.url("/sessions/"),
            "http://localhost:8000/api/sessions/"
        );
    }

    #[test]
    fn test_extract_error_message_variants() {
        let status = StatusCode::BAD_REQUEST;
        assert_eq!(
            extract_error_message(status, r#"{"error": "Slot already booked"}"#),
            "Slot already booked"
        );
        assert_eq!(
            extract_error_message(status, r#"{"detail": "Not found."}"#),
            "Not found."
        );
        assert_eq!(extract_error_message(status, "<html>oops</html>"), "Bad Request");
    }
}
