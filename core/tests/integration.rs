//! Every client operation against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives `UCaller` with the
//! default `UreqTransport` over real HTTP. The server records what it
//! received, so the wire contract is checked from the receiving side.

use std::time::Duration;

use mock_server::{Fault, MockConfig, MockState, RecordedRequest, CONFIRMATION_NUMBER};
use ucaller_core::{
    ApiError, CheckPhoneResponse, ClientConfig, Credentials, GetBalanceResponse, GetInfoResponse,
    InboundCallWaitingResponse, InitCall, InitCallResponse, NetworkError, UCaller,
};

const SERVICE_ID: u64 = 25742;
const KEY: &str = "SezKuYbfSaKT8j211ESjTgnlLcyNf4K5";

/// Serve `state` on a random port and return the base URL.
fn start(state: MockState) -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run_with(listener, state).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn recorded(state: &MockState) -> Vec<RecordedRequest> {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(state.requests())
}

fn set_fault(state: &MockState, fault: Option<Fault>) {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(state.set_fault(fault));
}

fn api(base_url: &str) -> UCaller {
    UCaller::new(
        ClientConfig::new(Credentials::new(SERVICE_ID, KEY))
            .with_base_url(base_url)
            .with_timeout(Duration::from_secs(5)),
    )
}

#[test]
fn init_call_sends_credentials_and_parameters_once() {
    let state = MockState::default();
    let base = start(state.clone());

    let response = api(&base).init_call("9999999999", "6123").unwrap();
    assert!(response.is_success());
    let call: InitCallResponse = response.decode().unwrap();
    assert_eq!(call.ucaller_id, 103_000);
    assert_eq!(call.phone, "79999999999");
    assert_eq!(call.code, "6123");

    let requests = recorded(&state);
    assert_eq!(requests.len(), 1);
    let req = &requests[0];
    assert_eq!(req.endpoint, "initCall");
    assert_eq!(req.param("service_id"), Some("25742"));
    assert_eq!(req.param("key"), Some(KEY));
    assert_eq!(req.param("phone"), Some("9999999999"));
    assert_eq!(req.param("code"), Some("6123"));
}

#[test]
fn call_lifecycle() {
    let state = MockState::default();
    let base = start(state.clone());
    let api = api(&base);

    // Step 1: initiate with idempotency key.
    let params = InitCall::new("+7 (909) 123-45-67", "7777")
        .with_client("nickname")
        .with_unique("f32d7ab0-2695-44ee-a20c-a34262a06b90");
    let first: InitCallResponse = api.init_call_with(&params).unwrap().decode().unwrap();
    assert_eq!(first.exists, Some(false));
    assert_eq!(first.client.as_deref(), Some("nickname"));

    // Step 2: same key returns the same call.
    let again: InitCallResponse = api.init_call_with(&params).unwrap().decode().unwrap();
    assert_eq!(again.ucaller_id, first.ucaller_id);
    assert_eq!(again.exists, Some(true));

    // Step 3: repeat it.
    let repeat = api.init_repeat(first.ucaller_id).unwrap();
    assert!(repeat.is_success());

    // Step 4: inspect it.
    let info: GetInfoResponse = api.get_info(first.ucaller_id).unwrap().decode().unwrap();
    assert_eq!(info.ucaller_id, first.ucaller_id);
    assert_eq!(info.repeated_ucaller_ids.len(), 1);
    assert_eq!(info.client.as_deref(), Some("nickname"));

    // Step 5: only one call was charged.
    let balance: GetBalanceResponse = api.get_balance().unwrap().decode().unwrap();
    assert!((balance.rub_balance - 99.7).abs() < 1e-9);

    assert_eq!(recorded(&state).len(), 5);
}

#[test]
fn service_account_and_lookup_operations() {
    let base = start(MockState::default());
    let api = api(&base);

    assert!(api.get_service().unwrap().is_success());
    assert!(api.get_account().unwrap().is_success());

    let check = api.check_phone("79091000000").unwrap();
    assert_eq!(check.status(), None);
    let check: CheckPhoneResponse = check.decode().unwrap();
    assert_eq!(check.country_iso.as_deref(), Some("RU"));

    let waiting: InboundCallWaitingResponse = api
        .inbound_call_waiting("79091000000", "https://example.com/callback?user=1")
        .unwrap()
        .decode()
        .unwrap();
    assert_eq!(waiting.confirmation_number, CONFIRMATION_NUMBER);
}

#[test]
fn provider_errors_are_returned_as_bodies() {
    let base = start(MockState::default());

    let response = api(&base).init_call("123", "6123").unwrap();
    assert!(!response.is_success());
    assert!(response.error().is_some());

    let wrong_key = UCaller::new(
        ClientConfig::new(Credentials::new(SERVICE_ID, "x".repeat(32))).with_base_url(&base),
    );
    let response = wrong_key.get_balance().unwrap();
    assert_eq!(response.status(), Some(false));
}

#[test]
fn clients_with_different_credentials_stay_independent() {
    let state = MockState::new(MockConfig::default());
    let base = start(state.clone());

    let good = api(&base);
    let other = UCaller::new(
        ClientConfig::new(Credentials::new(1, "o".repeat(32))).with_base_url(&base),
    );

    good.get_balance().unwrap();
    other.get_balance().unwrap();

    let requests = recorded(&state);
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].param("service_id"), Some("25742"));
    assert_eq!(requests[0].param("key"), Some(KEY));
    assert_eq!(requests[1].param("service_id"), Some("1"));
    assert_eq!(requests[1].param("key"), Some("o".repeat(32).as_str()));
}

#[test]
fn server_error_is_a_network_error_without_retry() {
    let state = MockState::default();
    let base = start(state.clone());
    set_fault(&state, Some(Fault::ServerError));

    let err = api(&base).get_balance().unwrap_err();
    assert!(matches!(
        err,
        ApiError::Network(NetworkError::Status { status: 500, .. })
    ));
    assert_eq!(recorded(&state).len(), 1);
}

#[test]
fn non_json_body_is_an_invalid_response() {
    let state = MockState::default();
    let base = start(state.clone());
    set_fault(&state, Some(Fault::NotJson));

    let err = api(&base).init_call("9999999999", "6123").unwrap_err();
    assert!(matches!(err, ApiError::InvalidResponse(_)));
}

#[test]
fn unreachable_host_is_a_network_error() {
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();

    let err = api(&format!("http://127.0.0.1:{port}"))
        .get_service()
        .unwrap_err();
    assert!(err.is_network());
    assert!(!err.to_string().contains(KEY));
}

#[test]
fn local_validation_blocks_bad_input_before_sending() {
    let state = MockState::default();
    let base = start(state.clone());
    let api = UCaller::new(
        ClientConfig::new(Credentials::new(SERVICE_ID, KEY))
            .with_base_url(&base)
            .with_input_validation(true),
    );

    let err = api.init_call("9999999999", "61").unwrap_err();
    assert!(matches!(err, ApiError::InvalidParameter { name: "code", .. }));
    assert!(recorded(&state).is_empty());

    api.init_call("8 (999) 999-99-99", "61-23").unwrap();
    let requests = recorded(&state);
    assert_eq!(requests[0].param("phone"), Some("79999999999"));
    assert_eq!(requests[0].param("code"), Some("6123"));
}
