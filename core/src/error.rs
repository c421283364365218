//! Error types for the uCaller client.
//!
//! # Design
//! Only failures the client itself can observe are errors: the transport
//! could not deliver the request, the provider answered with a non-2xx
//! status, or the body was not a JSON object. Application-level failures
//! reported by uCaller (bad phone, unknown credentials, empty balance) come
//! back as ordinary response bodies with `status: false`.

use thiserror::Error;

/// Failure to complete the HTTP exchange with the provider.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NetworkError {
    /// Connection refused, DNS failure, TLS failure and the like.
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The request did not complete within the configured timeout.
    #[error("request to {url} timed out")]
    Timeout { url: String },

    /// The provider answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

/// Errors returned by `UCallerClient` and `UCaller`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    /// The response body could not be decoded as a JSON object.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// A parameter was rejected by local validation.
    ///
    /// Only produced when `ClientConfig::validate_input` is enabled or when
    /// the phone/code helpers are called directly.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ApiError {
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    pub(crate) fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
