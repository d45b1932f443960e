//! Shape Store API seam and its HTTP transport.
//!
//! The trait returns raw JSON records: the store's schema is not trusted, so
//! decoding into canonical shapes happens in [`crate::normalize`], never here.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::time::Duration;

use serde_json::Value;
use shapes::{ShapeId, ShapeInput};

use crate::config::ClientConfig;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("store request failed: {0}")]
    Request(String),
    #[error("store returned HTTP {status}: {body}")]
    Status { status: u16, code: Option<String>, body: String },
    #[error("store response decode failed: {0}")]
    Decode(String),
    #[error("http client build failed: {0}")]
    ClientBuild(String),
}

impl ApiError {
    /// Build a status error, lifting the `error` code out of a JSON body.
    #[must_use]
    pub fn from_status(status: u16, body: String) -> Self {
        let code = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string));
        Self::Status { status, code, body }
    }

    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Server error code such as `E_TYPE_IMMUTABLE`, when one was sent.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Status { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

// =============================================================================
// API TRAIT
// =============================================================================

/// Remote Shape Store. Enables mocking in tests.
#[async_trait::async_trait]
pub trait ShapeApi: Send + Sync {
    /// Fetch every stored record.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or a non-2xx status.
    async fn list(&self) -> Result<Vec<Value>, ApiError>;

    /// Persist a new shape and return the echoed record.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or a non-2xx status.
    async fn create(&self, input: &ShapeInput) -> Result<Value, ApiError>;

    /// Replace a stored shape and return the echoed record.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or a non-2xx status.
    async fn update(&self, id: &ShapeId, input: &ShapeInput) -> Result<Value, ApiError>;

    /// Delete a stored shape.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or a non-2xx status.
    async fn delete(&self, id: &ShapeId) -> Result<(), ApiError>;
}

// =============================================================================
// HTTP CLIENT
// =============================================================================

pub struct HttpShapeApi {
    http: reqwest::Client,
    config: ClientConfig,
}

impl HttpShapeApi {
    /// # Errors
    ///
    /// Returns `ClientBuild` if the TLS backend cannot be initialized.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::ClientBuild(e.to_string()))?;
        Ok(Self { http, config })
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await.map_err(|e| ApiError::Request(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| ApiError::Request(e.to_string()))?;
        if !(200..300).contains(&status) {
            tracing::warn!(status, body = %text, "store rejected request");
            return Err(ApiError::from_status(status, text));
        }
        Ok(text)
    }
}

#[async_trait::async_trait]
impl ShapeApi for HttpShapeApi {
    async fn list(&self) -> Result<Vec<Value>, ApiError> {
        let text = self.send(self.http.get(self.config.collection_url())).await?;
        parse_list(&text)
    }

    async fn create(&self, input: &ShapeInput) -> Result<Value, ApiError> {
        let text = self.send(self.http.post(self.config.collection_url()).json(input)).await?;
        Ok(parse_record(&text))
    }

    async fn update(&self, id: &ShapeId, input: &ShapeInput) -> Result<Value, ApiError> {
        let text = self
            .send(self.http.put(self.config.shape_url(id.as_str())).json(input))
            .await?;
        Ok(parse_record(&text))
    }

    async fn delete(&self, id: &ShapeId) -> Result<(), ApiError> {
        self.send(self.http.delete(self.config.shape_url(id.as_str()))).await?;
        Ok(())
    }
}

// =============================================================================
// RESPONSE PARSING
// =============================================================================

/// Parse a list body: a bare array, or an object wrapping one under `shapes`.
///
/// # Errors
///
/// Returns `Decode` for anything else.
pub fn parse_list(text: &str) -> Result<Vec<Value>, ApiError> {
    let value: Value = serde_json::from_str(text).map_err(|e| ApiError::Decode(e.to_string()))?;
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("shapes") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(ApiError::Decode("expected an array of shapes".into())),
        },
        _ => Err(ApiError::Decode("expected an array of shapes".into())),
    }
}

/// Parse a single-record body. An unparsable success body yields `Null`, which
/// the store treats like any other record it cannot normalize.
#[must_use]
pub fn parse_record(text: &str) -> Value {
    match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "store returned a non-JSON success body");
            Value::Null
        }
    }
}
