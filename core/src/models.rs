//! Typed views over uCaller responses.
//!
//! Every struct carries an `extra` map so fields added by the provider
//! survive decoding. Phones and codes arrive as numbers or strings (masked
//! phones such as `7900***1010` are strings) and are always decoded to
//! `String`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

mod de {
    use serde::de::{Deserializer, Error};
    use serde::Deserialize;
    use serde_json::Value;

    pub fn bool_like<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        crate::types::truthy(&value)
            .ok_or_else(|| D::Error::custom(format!("expected boolean-like value, got {value}")))
    }

    pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(D::Error::custom(format!(
                "expected string or number, got {other}"
            ))),
        }
    }

    pub fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(other) => Err(D::Error::custom(format!(
                "expected string or number, got {other}"
            ))),
        }
    }
}

/// `{"status": false, "error": ..., "code": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(deserialize_with = "de::bool_like")]
    pub status: bool,
    pub error: String,
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response of `initCall`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitCallResponse {
    #[serde(deserialize_with = "de::bool_like")]
    pub status: bool,
    /// Identifier used by `getInfo` and `initRepeat`.
    pub ucaller_id: u64,
    #[serde(deserialize_with = "de::string_or_number")]
    pub phone: String,
    #[serde(deserialize_with = "de::string_or_number")]
    pub code: String,
    #[serde(default)]
    pub client: Option<String>,
    /// Echo of the `unique` parameter.
    #[serde(default)]
    pub unique_request_id: Option<String>,
    /// Set when a call with the same `unique` was already initiated.
    #[serde(default)]
    pub exists: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response of `initRepeat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitRepeatResponse {
    #[serde(deserialize_with = "de::bool_like")]
    pub status: bool,
    pub ucaller_id: u64,
    #[serde(deserialize_with = "de::string_or_number")]
    pub phone: String,
    #[serde(deserialize_with = "de::string_or_number")]
    pub code: String,
    #[serde(default)]
    pub client: Option<String>,
    #[serde(default)]
    pub unique_request_id: Option<String>,
    #[serde(default)]
    pub exists: Option<bool>,
    /// The repeat was free of charge.
    #[serde(default)]
    pub free_repeated: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Carrier information attached to `getInfo`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoneInfo {
    #[serde(default)]
    pub operator: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    /// New operator when the number was ported.
    #[serde(default)]
    pub mnp: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response of `getInfo`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetInfoResponse {
    #[serde(deserialize_with = "de::bool_like")]
    pub status: bool,
    pub ucaller_id: u64,
    #[serde(default)]
    pub init_time: Option<i64>,
    /// -1 still checking, 0 not reached, 1 call made.
    #[serde(default)]
    pub call_status: Option<i64>,
    /// No longer sent by the provider.
    #[serde(default)]
    pub is_repeated: Option<bool>,
    #[serde(default)]
    pub repeatable: Option<bool>,
    #[serde(default)]
    pub repeat_times: Option<u32>,
    #[serde(default)]
    pub repeated_ucaller_ids: Vec<u64>,
    #[serde(default)]
    pub unique: Option<String>,
    #[serde(default)]
    pub client: Option<String>,
    #[serde(deserialize_with = "de::string_or_number")]
    pub phone: String,
    #[serde(default, deserialize_with = "de::opt_string_or_number")]
    pub code: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub country_image: Option<String>,
    #[serde(default)]
    pub phone_info: Vec<PhoneInfo>,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub balance: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response of `getBalance`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetBalanceResponse {
    #[serde(deserialize_with = "de::bool_like")]
    pub status: bool,
    pub rub_balance: f64,
    #[serde(default)]
    pub bonus_balance: Option<f64>,
    #[serde(default)]
    pub tariff: Option<String>,
    #[serde(default)]
    pub tariff_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestInfo {
    /// Free test requests left.
    #[serde(default)]
    pub test_requests: Option<u64>,
    #[serde(default, deserialize_with = "de::opt_string_or_number")]
    pub verified_phone: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response of `getService`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetServiceResponse {
    #[serde(deserialize_with = "de::bool_like")]
    pub status: bool,
    #[serde(default)]
    pub service_status: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    /// Unix seconds.
    #[serde(default)]
    pub creation_time: Option<i64>,
    /// Unix seconds of the last uncached API call.
    #[serde(default)]
    pub last_request: Option<i64>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub use_direction: Option<String>,
    #[serde(default)]
    pub now_test: Option<bool>,
    #[serde(default)]
    pub test_info: Option<TestInfo>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entry of the account audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserLog {
    pub action: String,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    /// Unix seconds.
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response of `getAccount`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetAccountResponse {
    #[serde(deserialize_with = "de::bool_like")]
    pub status: bool,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub two_auth: Option<bool>,
    /// Unix seconds.
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub logs: Vec<UserLog>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response of `checkPhone`. This endpoint sends no `status` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckPhoneResponse {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    /// 1 for mobile numbers.
    #[serde(default)]
    pub mobile: Option<u8>,
    #[serde(default, deserialize_with = "de::opt_string_or_number")]
    pub phone: Option<String>,
    #[serde(default)]
    pub country_iso: Option<String>,
    #[serde(default)]
    pub country_code: Option<u32>,
    #[serde(default)]
    pub mnc: Option<u32>,
    #[serde(default, deserialize_with = "de::opt_string_or_number")]
    pub number: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub phone_format: Option<String>,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub balance: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response of `inboundCallWaiting`: the user must call `confirmation_number`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundCallWaitingResponse {
    #[serde(deserialize_with = "de::bool_like")]
    pub status: bool,
    pub ucaller_id: u64,
    #[serde(deserialize_with = "de::string_or_number")]
    pub phone: String,
    #[serde(deserialize_with = "de::string_or_number")]
    pub confirmation_number: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload uCaller posts to `callback_url` once an inbound call arrives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookCall {
    #[serde(default)]
    pub call_id: Option<u64>,
    #[serde(default, deserialize_with = "de::opt_string_or_number")]
    pub client_number: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string_or_number")]
    pub confirmation_number: Option<String>,
    #[serde(default)]
    pub is_mnp: bool,
    #[serde(default)]
    pub operator_name: Option<String>,
    #[serde(default)]
    pub operator_name_mnp: Option<String>,
    #[serde(default)]
    pub region_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WebhookCall {
    /// Decode a webhook request body.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidResponse` if the body is not a JSON object
    /// of the expected shape.
    pub fn from_json(body: &str) -> Result<Self, crate::ApiError> {
        serde_json::from_str(body).map_err(|e| crate::ApiError::InvalidResponse(e.to_string()))
    }
}
