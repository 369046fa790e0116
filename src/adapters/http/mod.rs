//! Outbound HTTP adapter for the course backend.

pub mod course;
pub mod error;
pub mod material;
pub mod quiz;
pub mod transport;
pub mod video;

pub use error::BackendError;
pub use transport::HttpChunkTransport;

use crate::ports::token::TokenProvider;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// JSON envelope every backend endpoint wraps its payload in.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Shared `reqwest` client for every backend port. Mutating calls carry a
/// bearer token from the token provider.
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenProvider>,
}

impl BackendClient {
    pub fn new(
        base_url: impl Into<String>,
        tokens: Arc<dyn TokenProvider>,
    ) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            tokens,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn bearer(&self) -> Result<String, BackendError> {
        self.tokens
            .bearer_token()
            .await
            .map_err(|e| BackendError::Token(e.to_string()))
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, BackendError> {
        let response = self.http.get(self.url(path)).send().await?;
        Self::decode(response).await
    }

    pub(crate) async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, BackendError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let token = self.bearer().await?;
        let response = self
            .http
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;
        Self::decode(response).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), BackendError> {
        let token = self.bearer().await?;
        let response = self
            .http
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        parse_ack(&body).map_err(|e| e.with_status(status))
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BackendError> {
        let status = response.status();
        let body = response.text().await?;
        parse_payload(&body).map_err(|e| e.with_status(status))
    }
}

/// Unwraps the `{success, data, message}` envelope around a payload.
fn parse_payload<T: DeserializeOwned>(body: &str) -> Result<T, BackendError> {
    let envelope: Envelope<T> =
        serde_json::from_str(body).map_err(|e| BackendError::Malformed(e.to_string()))?;
    if !envelope.success {
        return Err(BackendError::Rejected(
            envelope
                .message
                .unwrap_or_else(|| String::from("backend reported failure")),
        ));
    }
    envelope.data.ok_or(BackendError::MissingData)
}

/// Like [`parse_payload`], for endpoints that acknowledge without data.
fn parse_ack(body: &str) -> Result<(), BackendError> {
    let envelope: Envelope<serde_json::Value> =
        serde_json::from_str(body).map_err(|e| BackendError::Malformed(e.to_string()))?;
    if !envelope.success {
        return Err(BackendError::Rejected(
            envelope
                .message
                .unwrap_or_else(|| String::from("backend reported failure")),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Payload {
        value: u32,
    }

    #[test]
    fn a_successful_envelope_yields_its_payload() {
        let parsed: Payload = parse_payload(r#"{"success":true,"data":{"value":7}}"#).unwrap();
        assert_eq!(parsed, Payload { value: 7 });
    }

    #[test]
    fn a_failed_envelope_surfaces_the_backend_message() {
        let err = parse_payload::<Payload>(r#"{"success":false,"message":"no such lesson"}"#)
            .unwrap_err();
        assert!(matches!(err, BackendError::Rejected(m) if m == "no such lesson"));
    }

    #[test]
    fn success_without_data_is_an_error_for_payload_endpoints() {
        let err = parse_payload::<Payload>(r#"{"success":true}"#).unwrap_err();
        assert!(matches!(err, BackendError::MissingData));
    }

    #[test]
    fn acks_need_no_data() {
        assert!(parse_ack(r#"{"success":true}"#).is_ok());
        assert!(parse_ack(r#"{"success":false,"message":"gone"}"#).is_err());
    }

    #[test]
    fn non_json_bodies_are_malformed() {
        let err = parse_ack("<html>502</html>").unwrap_err();
        assert!(matches!(err, BackendError::Malformed(_)));
    }
}
