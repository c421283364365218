//! Stateless HTTP request builder and response parser for the uCaller API.
//!
//! # Design
//! `UCallerClient` holds the configuration and nothing else. Each remote
//! operation has a `build_*` method producing an `HttpRequest`; every
//! operation shares `parse_response`, because the provider answers all of
//! them with a JSON object. `UCaller` (see `ucaller.rs`) glues the two
//! halves together with a `Transport`.

use std::fmt;

use serde_json::Value;

use crate::config::{ClientConfig, Credentials};
use crate::error::{ApiError, NetworkError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::phone;
use crate::types::{ApiResponse, InitCall};

/// Remote operations of the v1.0 API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    InitCall,
    InitRepeat,
    GetInfo,
    GetBalance,
    GetService,
    GetAccount,
    CheckPhone,
    InboundCallWaiting,
}

impl Endpoint {
    pub const ALL: [Endpoint; 8] = [
        Endpoint::InitCall,
        Endpoint::InitRepeat,
        Endpoint::GetInfo,
        Endpoint::GetBalance,
        Endpoint::GetService,
        Endpoint::GetAccount,
        Endpoint::CheckPhone,
        Endpoint::InboundCallWaiting,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Endpoint::InitCall => "initCall",
            Endpoint::InitRepeat => "initRepeat",
            Endpoint::GetInfo => "getInfo",
            Endpoint::GetBalance => "getBalance",
            Endpoint::GetService => "getService",
            Endpoint::GetAccount => "getAccount",
            Endpoint::CheckPhone => "checkPhone",
            Endpoint::InboundCallWaiting => "inboundCallWaiting",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Synchronous, stateless request builder for the uCaller API.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network.
#[derive(Debug, Clone)]
pub struct UCallerClient {
    base_url: String,
    api_version: String,
    credentials: Credentials,
    validate_input: bool,
}

impl UCallerClient {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_version: config.api_version.trim_matches('/').to_string(),
            credentials: config.credentials.clone(),
            validate_input: config.validate_input,
        }
    }

    pub fn service_id(&self) -> u64 {
        self.credentials.service_id()
    }

    /// `{base_url}/{api_version}/{endpoint}` without query.
    pub fn endpoint_url(&self, endpoint: Endpoint) -> String {
        format!("{}/{}/{}", self.base_url, self.api_version, endpoint)
    }

    /// Build a GET for `endpoint`. Credentials always come first, followed by
    /// `params` in the given order.
    pub fn build_request(&self, endpoint: Endpoint, params: &[(&str, &str)]) -> HttpRequest {
        let service_id = self.credentials.service_id().to_string();
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("service_id", &service_id)
            .append_pair("key", self.credentials.key())
            .extend_pairs(params)
            .finish();

        HttpRequest {
            method: HttpMethod::Get,
            url: format!("{}?{query}", self.endpoint_url(endpoint)),
            headers: vec![("accept".to_string(), "application/json".to_string())],
        }
    }

    /// # Errors
    ///
    /// Fails only when input validation is enabled and a parameter is
    /// rejected.
    pub fn build_init_call(&self, params: &InitCall) -> Result<HttpRequest, ApiError> {
        let (phone, code) = if self.validate_input {
            if let Some(client) = &params.client {
                phone::check_identifier("client", client)?;
            }
            if let Some(unique) = &params.unique {
                phone::check_identifier("unique", unique)?;
            }
            (
                phone::normalize_phone(&params.phone)?,
                phone::normalize_code(&params.code)?,
            )
        } else {
            (params.phone.clone(), params.code.clone())
        };

        let mut query = vec![("phone", phone.as_str()), ("code", code.as_str())];
        if let Some(client) = &params.client {
            query.push(("client", client.as_str()));
        }
        if let Some(unique) = &params.unique {
            query.push(("unique", unique.as_str()));
        }
        if params.voice {
            query.push(("voice", "true"));
        }
        Ok(self.build_request(Endpoint::InitCall, &query))
    }

    pub fn build_init_repeat(&self, uid: u64) -> HttpRequest {
        let uid = uid.to_string();
        self.build_request(Endpoint::InitRepeat, &[("uid", uid.as_str())])
    }

    pub fn build_get_info(&self, uid: u64) -> HttpRequest {
        let uid = uid.to_string();
        self.build_request(Endpoint::GetInfo, &[("uid", uid.as_str())])
    }

    pub fn build_get_balance(&self) -> HttpRequest {
        self.build_request(Endpoint::GetBalance, &[])
    }

    pub fn build_get_service(&self) -> HttpRequest {
        self.build_request(Endpoint::GetService, &[])
    }

    pub fn build_get_account(&self) -> HttpRequest {
        self.build_request(Endpoint::GetAccount, &[])
    }

    /// # Errors
    ///
    /// Fails only when input validation is enabled and the phone is rejected.
    pub fn build_check_phone(&self, phone: &str) -> Result<HttpRequest, ApiError> {
        let phone = self.prepare_phone(phone)?;
        Ok(self.build_request(Endpoint::CheckPhone, &[("phone", phone.as_str())]))
    }

    /// # Errors
    ///
    /// Fails only when input validation is enabled and the phone is rejected.
    pub fn build_inbound_call_waiting(
        &self,
        phone: &str,
        callback_url: &str,
    ) -> Result<HttpRequest, ApiError> {
        let phone = self.prepare_phone(phone)?;
        Ok(self.build_request(
            Endpoint::InboundCallWaiting,
            &[("phone", phone.as_str()), ("callback_url", callback_url)],
        ))
    }

    /// Decode a provider response.
    ///
    /// A 2xx JSON object is returned verbatim whatever its `status` says.
    ///
    /// # Errors
    ///
    /// `ApiError::Network` for a non-2xx status, `ApiError::InvalidResponse`
    /// if the body is not a JSON object.
    pub fn parse_response(&self, response: HttpResponse) -> Result<ApiResponse, ApiError> {
        check_status(&response)?;
        let value: Value = serde_json::from_str(&response.body)
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
        match value {
            Value::Object(fields) => Ok(ApiResponse::new(fields)),
            other => Err(ApiError::InvalidResponse(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    fn prepare_phone(&self, phone: &str) -> Result<String, ApiError> {
        if self.validate_input {
            phone::normalize_phone(phone)
        } else {
            Ok(phone.to_string())
        }
    }
}

/// Map non-2xx status codes to a network error.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(NetworkError::Status {
        status: response.status,
        body: response.body.clone(),
    }
    .into())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
