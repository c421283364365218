//! Blocking uCaller client: build, execute, parse.

use crate::client::{Endpoint, UCallerClient};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::HttpRequest;
use crate::transport::{Transport, UreqTransport};
use crate::types::{ApiResponse, InitCall};

/// Client for the uCaller phone-verification API.
///
/// Every method issues exactly one request and returns the provider's JSON
/// object verbatim. A `status: false` body is still `Ok`; check
/// `ApiResponse::is_success`. Nothing is retried.
///
/// ```no_run
/// use ucaller_core::{ClientConfig, Credentials, UCaller};
///
/// let config = ClientConfig::new(Credentials::new(25742, "SezKuYbfSaKT8j211ESjTgnlLcyNf4K5"));
/// let api = UCaller::new(config);
/// let response = api.init_call("9999999999", "6123")?;
/// if response.is_success() {
///     println!("calling, uCaller ID {:?}", response.get("ucaller_id"));
/// }
/// # Ok::<(), ucaller_core::ApiError>(())
/// ```
#[derive(Debug, Clone)]
pub struct UCaller<T = UreqTransport> {
    client: UCallerClient,
    transport: T,
}

impl UCaller<UreqTransport> {
    pub fn new(config: ClientConfig) -> Self {
        let transport = UreqTransport::new(config.timeout);
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> UCaller<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            client: UCallerClient::new(&config),
            transport,
        }
    }

    pub fn service_id(&self) -> u64 {
        self.client.service_id()
    }

    /// The request builder behind this client.
    pub fn client(&self) -> &UCallerClient {
        &self.client
    }

    /// Start a verification call to `phone`; the last 4 digits of the
    /// calling number are `code`.
    ///
    /// # Errors
    ///
    /// `ApiError::Network` on transport failure or non-2xx status,
    /// `ApiError::InvalidResponse` if the body is not a JSON object.
    pub fn init_call(&self, phone: &str, code: &str) -> Result<ApiResponse, ApiError> {
        self.init_call_with(&InitCall::new(phone, code))
    }

    /// `init_call` with the optional `client`, `unique` and `voice`
    /// parameters.
    ///
    /// # Errors
    ///
    /// Same as `init_call`, plus `ApiError::InvalidParameter` when input
    /// validation is enabled.
    #[tracing::instrument(skip_all, fields(endpoint = %Endpoint::InitCall, service_id = self.service_id()))]
    pub fn init_call_with(&self, params: &InitCall) -> Result<ApiResponse, ApiError> {
        let request = self.client.build_init_call(params)?;
        self.send(&request)
    }

    /// Repeat a call that did not reach the user. The provider only allows
    /// this within five minutes of `init_call` and has deprecated it.
    ///
    /// # Errors
    ///
    /// Same as `init_call`.
    #[tracing::instrument(skip(self), fields(endpoint = %Endpoint::InitRepeat, service_id = self.service_id()))]
    pub fn init_repeat(&self, uid: u64) -> Result<ApiResponse, ApiError> {
        tracing::warn!("initRepeat is no longer supported by uCaller");
        let request = self.client.build_init_repeat(uid);
        self.send(&request)
    }

    /// Details of an initiated call.
    ///
    /// # Errors
    ///
    /// Same as `init_call`.
    #[tracing::instrument(skip(self), fields(endpoint = %Endpoint::GetInfo, service_id = self.service_id()))]
    pub fn get_info(&self, uid: u64) -> Result<ApiResponse, ApiError> {
        let request = self.client.build_get_info(uid);
        self.send(&request)
    }

    /// # Errors
    ///
    /// Same as `init_call`.
    #[tracing::instrument(skip(self), fields(endpoint = %Endpoint::GetBalance, service_id = self.service_id()))]
    pub fn get_balance(&self) -> Result<ApiResponse, ApiError> {
        let request = self.client.build_get_balance();
        self.send(&request)
    }

    /// # Errors
    ///
    /// Same as `init_call`.
    #[tracing::instrument(skip(self), fields(endpoint = %Endpoint::GetService, service_id = self.service_id()))]
    pub fn get_service(&self) -> Result<ApiResponse, ApiError> {
        let request = self.client.build_get_service();
        self.send(&request)
    }

    /// # Errors
    ///
    /// Same as `init_call`.
    #[tracing::instrument(skip(self), fields(endpoint = %Endpoint::GetAccount, service_id = self.service_id()))]
    pub fn get_account(&self) -> Result<ApiResponse, ApiError> {
        let request = self.client.build_get_account();
        self.send(&request)
    }

    /// Carrier and region lookup for `phone`. Billed by the provider.
    ///
    /// # Errors
    ///
    /// Same as `init_call_with`.
    #[tracing::instrument(skip_all, fields(endpoint = %Endpoint::CheckPhone, service_id = self.service_id()))]
    pub fn check_phone(&self, phone: &str) -> Result<ApiResponse, ApiError> {
        let request = self.client.build_check_phone(phone)?;
        self.send(&request)
    }

    /// Wait for the user to call the returned `confirmation_number`; the
    /// provider notifies `callback_url` when the call arrives.
    ///
    /// # Errors
    ///
    /// Same as `init_call_with`.
    #[tracing::instrument(skip_all, fields(endpoint = %Endpoint::InboundCallWaiting, service_id = self.service_id()))]
    pub fn inbound_call_waiting(
        &self,
        phone: &str,
        callback_url: &str,
    ) -> Result<ApiResponse, ApiError> {
        let request = self.client.build_inbound_call_waiting(phone, callback_url)?;
        self.send(&request)
    }

    fn send(&self, request: &HttpRequest) -> Result<ApiResponse, ApiError> {
        let response = self.transport.execute(request).map_err(|err| {
            tracing::warn!(error = %err, "request failed");
            ApiError::from(err)
        })?;

        let status = response.status;
        match self.client.parse_response(response) {
            Ok(parsed) => {
                tracing::debug!(http_status = status, status = ?parsed.status(), "response decoded");
                Ok(parsed)
            }
            Err(err) => {
                tracing::warn!(http_status = status, error = %err, "unusable response");
                Err(err)
            }
        }
    }
}
