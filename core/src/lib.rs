//! Client for the uCaller phone-verification API.
//!
//! # Overview
//! uCaller verifies a phone number by calling it from a number whose last
//! four digits are the verification code. This crate maps each v1.0 REST
//! operation to a method that sends one GET with the account credentials and
//! returns the provider's JSON object.
//!
//! # Design
//! - `UCallerClient` is the deterministic half: `build_*` produces an
//!   `HttpRequest`, `parse_response` consumes an `HttpResponse`.
//! - `Transport` executes requests; `UreqTransport` is the blocking default.
//! - `UCaller` combines both and is what most callers want.
//! - Responses stay generic (`ApiResponse`); typed views in `models` carry an
//!   `extra` map so new provider fields never break decoding.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod phone;
pub mod transport;
pub mod types;
pub mod ucaller;

pub use client::{Endpoint, UCallerClient};
pub use config::{ClientConfig, Credentials};
pub use error::{ApiError, NetworkError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use models::{
    CheckPhoneResponse, ErrorResponse, GetAccountResponse, GetBalanceResponse, GetInfoResponse,
    GetServiceResponse, InboundCallWaitingResponse, InitCallResponse, InitRepeatResponse,
    PhoneInfo, TestInfo, UserLog, WebhookCall,
};
pub use phone::{normalize_code, normalize_phone};
pub use transport::{Transport, UreqTransport};
pub use types::{ApiResponse, InitCall};
pub use ucaller::UCaller;
