//! Request parameters and the generic response mapping.
//!
//! # Design
//! uCaller answers every call with a JSON object whose shape varies per
//! endpoint and evolves without notice. `ApiResponse` keeps that object
//! verbatim; typed views live in `models.rs` and are opt-in via
//! `ApiResponse::decode`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::ErrorResponse;

/// Parameters of `initCall`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitCall {
    pub phone: String,
    /// The 4 digits that end the calling number.
    pub code: String,
    /// Caller-side user identifier, up to 64 characters.
    pub client: Option<String>,
    /// Idempotency key, up to 64 characters. A repeated `initCall` with the
    /// same key returns the first call with `exists: true`.
    pub unique: Option<String>,
    /// Ask the provider to dictate the code by voice.
    pub voice: bool,
}

impl InitCall {
    pub fn new(phone: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            phone: phone.into(),
            code: code.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_client(mut self, client: impl Into<String>) -> Self {
        self.client = Some(client.into());
        self
    }

    #[must_use]
    pub fn with_unique(mut self, unique: impl Into<String>) -> Self {
        self.unique = Some(unique.into());
        self
    }

    /// Use a fresh v4 UUID as the idempotency key.
    #[must_use]
    pub fn with_random_unique(self) -> Self {
        self.with_unique(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn with_voice(mut self, voice: bool) -> Self {
        self.voice = voice;
        self
    }
}

/// A decoded uCaller response, kept as the provider sent it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiResponse(Map<String, Value>);

impl ApiResponse {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// The boolean-like `status` field, if present and interpretable.
    pub fn status(&self) -> Option<bool> {
        self.0.get("status").and_then(truthy)
    }

    /// `true` only when the provider reported `status: true`.
    ///
    /// Endpoints that omit `status` (e.g. `checkPhone`) count as not
    /// successful; inspect the fields directly for those.
    pub fn is_success(&self) -> bool {
        self.status().unwrap_or(false)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Decode into one of the typed views in `models`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidResponse` if required fields are missing or
    /// have an unexpected type.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_value(Value::Object(self.0.clone()))
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    /// The provider's error body, when `status` is false.
    pub fn error(&self) -> Option<ErrorResponse> {
        match self.status() {
            Some(false) => self.decode().ok(),
            _ => None,
        }
    }
}

impl From<ApiResponse> for Value {
    fn from(response: ApiResponse) -> Self {
        Value::Object(response.0)
    }
}

/// Interpret the loosely typed flags uCaller returns.
pub(crate) fn truthy(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|n| n != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" | "" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
