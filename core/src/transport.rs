//! Executes `HttpRequest` values against the network.
//!
//! # Design
//! The transport only moves bytes. Status interpretation and JSON decoding
//! stay in `UCallerClient::parse_response`, so the agent is configured to
//! hand back 4xx/5xx responses as data instead of errors.

use std::fmt;
use std::time::Duration;

use crate::error::NetworkError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Performs one HTTP exchange. Implementations must not retry.
pub trait Transport {
    /// # Errors
    ///
    /// Returns `NetworkError` if no HTTP response could be obtained.
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, NetworkError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, NetworkError> {
        (**self).execute(request)
    }
}

/// Blocking transport backed by a `ureq::Agent`.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl UreqTransport {
    pub fn new(timeout: Option<Duration>) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, NetworkError> {
        let mut builder = match request.method {
            HttpMethod::Get => self.agent.get(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let mut response = builder
            .call()
            .map_err(|err| network_error(request.endpoint(), err))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|err| network_error(request.endpoint(), err))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Map a ureq failure without leaking the query string (it carries the key).
fn network_error(endpoint: &str, err: ureq::Error) -> NetworkError {
    match err {
        ureq::Error::Timeout(_) => NetworkError::Timeout {
            url: endpoint.to_string(),
        },
        other => NetworkError::Transport {
            url: endpoint.to_string(),
            message: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_refused_is_a_transport_error() {
        // Bind then drop to get a port nothing listens on.
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let request = HttpRequest {
            method: HttpMethod::Get,
            url: format!("http://127.0.0.1:{port}/v1.0/getBalance?service_id=1&key=secret"),
            headers: Vec::new(),
        };

        let err = UreqTransport::default().execute(&request).unwrap_err();
        match err {
            NetworkError::Transport { url, .. } => {
                assert_eq!(url, format!("http://127.0.0.1:{port}/v1.0/getBalance"));
            }
            other => panic!("expected transport error, got {other:?}"),
        }
    }
}
