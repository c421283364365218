//! Client configuration.
//!
//! Everything the client needs is passed explicitly to its constructor. The
//! environment loader is a convenience for binaries; the library never reads
//! process state on its own.

use std::fmt;
use std::time::Duration;

use crate::error::ApiError;

pub const DEFAULT_BASE_URL: &str = "https://api.ucaller.ru";
pub const DEFAULT_API_VERSION: &str = "v1.0";

/// Account credentials issued by uCaller.
///
/// The key is not checked locally; the provider rejects bad credentials
/// with an error body.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    service_id: u64,
    key: String,
}

impl Credentials {
    pub fn new(service_id: u64, key: impl Into<String>) -> Self {
        Self {
            service_id,
            key: key.into(),
        }
    }

    pub fn service_id(&self) -> u64 {
        self.service_id
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("service_id", &self.service_id)
            .field("key", &"<redacted>")
            .finish()
    }
}

/// Configuration for `UCallerClient` and `UCaller`.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub credentials: Credentials,
    /// Scheme and host of the API, without the version segment.
    pub base_url: String,
    pub api_version: String,
    /// Global per-request timeout. `None` keeps the transport default.
    pub timeout: Option<Duration>,
    /// Normalize phones and check code/client/unique locally before sending.
    pub validate_input: bool,
}

impl ClientConfig {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: None,
            validate_input: false,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_input_validation(mut self, enabled: bool) -> Self {
        self.validate_input = enabled;
        self
    }

    /// Build a configuration from `UCALLER_SERVICE_ID`, `UCALLER_KEY` and the
    /// optional `UCALLER_BASE_URL` / `UCALLER_TIMEOUT_SECS`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Config` if a required variable is missing or a
    /// value cannot be parsed.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let service_id = lookup("UCALLER_SERVICE_ID")
            .ok_or_else(|| ApiError::Config("UCALLER_SERVICE_ID is not set".to_string()))?;
        let service_id = service_id.trim().parse::<u64>().map_err(|err| {
            ApiError::Config(format!("UCALLER_SERVICE_ID `{service_id}`: {err}"))
        })?;
        let key = lookup("UCALLER_KEY")
            .ok_or_else(|| ApiError::Config("UCALLER_KEY is not set".to_string()))?;

        let mut config = Self::new(Credentials::new(service_id, key));
        if let Some(base_url) = lookup("UCALLER_BASE_URL") {
            config.base_url = base_url;
        }
        if let Some(secs) = lookup("UCALLER_TIMEOUT_SECS") {
            let secs = secs.trim().parse::<u64>().map_err(|err| {
                ApiError::Config(format!("UCALLER_TIMEOUT_SECS `{secs}`: {err}"))
            })?;
            config.timeout = Some(Duration::from_secs(secs));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_point_at_the_public_api() {
        let config = ClientConfig::new(Credentials::new(1, "k"));
        assert_eq!(config.base_url, "https://api.ucaller.ru");
        assert_eq!(config.api_version, "v1.0");
        assert!(config.timeout.is_none());
        assert!(!config.validate_input);
    }

    #[test]
    fn debug_redacts_key() {
        let creds = Credentials::new(25742, "SezKuYbfSaKT8j211ESjTgnlLcyNf4K5");
        let printed = format!("{creds:?}");
        assert!(printed.contains("25742"));
        assert!(!printed.contains("SezKuYbf"));
    }

    #[test]
    fn from_lookup_reads_required_and_optional_values() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("UCALLER_SERVICE_ID", "25742"),
            ("UCALLER_KEY", "abc"),
            ("UCALLER_BASE_URL", "http://127.0.0.1:3000"),
            ("UCALLER_TIMEOUT_SECS", "15"),
        ]))
        .unwrap();
        assert_eq!(config.credentials.service_id(), 25742);
        assert_eq!(config.credentials.key(), "abc");
        assert_eq!(config.base_url, "http://127.0.0.1:3000");
        assert_eq!(config.timeout, Some(Duration::from_secs(15)));
    }

    #[test]
    fn from_lookup_requires_service_id() {
        let err = ClientConfig::from_lookup(lookup(&[("UCALLER_KEY", "abc")])).unwrap_err();
        assert!(matches!(err, ApiError::Config(msg) if msg.contains("UCALLER_SERVICE_ID")));
    }

    #[test]
    fn from_lookup_rejects_non_numeric_service_id() {
        let err = ClientConfig::from_lookup(lookup(&[
            ("UCALLER_SERVICE_ID", "abc"),
            ("UCALLER_KEY", "abc"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn from_lookup_requires_key() {
        let err =
            ClientConfig::from_lookup(lookup(&[("UCALLER_SERVICE_ID", "1")])).unwrap_err();
        assert!(matches!(err, ApiError::Config(msg) if msg.contains("UCALLER_KEY")));
    }
}
