//! In-memory stand-in for the uCaller v1.0 API.
//!
//! Serves `GET /v1.0/{endpoint}` with the provider's response shapes, keeps
//! initiated calls in memory, and records every request so tests can assert
//! on what a client actually sent.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

pub const FIRST_UCALLER_ID: u64 = 103_000;
pub const MAX_FREE_REPEATS: usize = 2;
pub const CONFIRMATION_NUMBER: &str = "79001000011";

pub const ERR_CREDENTIALS: i64 = 1;
pub const ERR_PHONE: i64 = 2;
pub const ERR_CODE: i64 = 3;
pub const ERR_BALANCE: i64 = 4;
pub const ERR_UID: i64 = 5;
pub const ERR_REPEAT: i64 = 6;
pub const ERR_PARAMETER: i64 = 7;

/// Account the mock accepts.
#[derive(Clone, Debug)]
pub struct MockConfig {
    pub service_id: u64,
    pub key: String,
    pub rub_balance: f64,
    pub call_cost: f64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            service_id: 25742,
            key: "SezKuYbfSaKT8j211ESjTgnlLcyNf4K5".to_string(),
            rub_balance: 100.0,
            call_cost: 0.3,
        }
    }
}

/// Broken behaviours to exercise client error paths.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fault {
    /// Answer every request with HTTP 500.
    ServerError,
    /// Answer every request with HTTP 200 and an HTML body.
    NotJson,
}

/// One request as the server received it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedRequest {
    pub endpoint: String,
    pub query: Vec<(String, String)>,
}

impl RecordedRequest {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Clone, Debug)]
struct Call {
    phone: u64,
    code: String,
    client: Option<String>,
    unique: Option<String>,
    init_time: u64,
    repeats: Vec<u64>,
}

#[derive(Debug)]
struct Inner {
    config: MockConfig,
    balance: f64,
    next_id: u64,
    calls: HashMap<u64, Call>,
    by_unique: HashMap<String, u64>,
    fault: Option<Fault>,
    requests: Vec<RecordedRequest>,
}

/// Shared server state. Cloning shares the same store.
#[derive(Clone, Debug)]
pub struct MockState(Arc<RwLock<Inner>>);

impl MockState {
    pub fn new(config: MockConfig) -> Self {
        Self(Arc::new(RwLock::new(Inner {
            balance: config.rub_balance,
            config,
            next_id: FIRST_UCALLER_ID,
            calls: HashMap::new(),
            by_unique: HashMap::new(),
            fault: None,
            requests: Vec::new(),
        })))
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.0.read().await.requests.clone()
    }

    pub async fn set_fault(&self, fault: Option<Fault>) {
        self.0.write().await.fault = fault;
    }

    pub async fn balance(&self) -> f64 {
        self.0.read().await.balance
    }
}

impl Default for MockState {
    fn default() -> Self {
        Self::new(MockConfig::default())
    }
}

pub fn app() -> Router {
    app_with(MockState::default())
}

pub fn app_with(state: MockState) -> Router {
    Router::new()
        .route("/v1.0/{endpoint}", get(dispatch))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, MockState::default()).await
}

pub async fn run_with(listener: TcpListener, state: MockState) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(state)).await
}

type Params = HashMap<String, String>;

async fn dispatch(
    State(state): State<MockState>,
    Path(endpoint): Path<String>,
    Query(query): Query<Vec<(String, String)>>,
) -> Response {
    let mut inner = state.0.write().await;
    tracing::info!(%endpoint, "request");
    inner.requests.push(RecordedRequest {
        endpoint: endpoint.clone(),
        query: query.clone(),
    });

    match inner.fault {
        Some(Fault::ServerError) => {
            return (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response()
        }
        Some(Fault::NotJson) => {
            return (
                [(header::CONTENT_TYPE, "text/html")],
                "<html><body>maintenance</body></html>",
            )
                .into_response()
        }
        None => {}
    }

    let params: Params = query.into_iter().collect();
    if !authorized(&inner.config, &params) {
        return error(ERR_CREDENTIALS, "Wrong service_id or key");
    }

    match endpoint.as_str() {
        "initCall" => init_call(&mut inner, &params),
        "initRepeat" => init_repeat(&mut inner, &params),
        "getInfo" => get_info(&inner, &params),
        "getBalance" => ok(json!({
            "status": true,
            "rub_balance": inner.balance,
            "bonus_balance": 0,
            "tariff": "uni",
            "tariff_name": "Universal",
        })),
        "getService" => ok(json!({
            "status": true,
            "service_status": inner.config.service_id,
            "name": "mock",
            "creation_time": 1_556_064_401,
            "last_request": now(),
            "owner": "mock@ucaller.local",
            "use_direction": "integration tests",
            "now_test": false,
        })),
        "getAccount" => ok(json!({
            "status": true,
            "email": "mock@ucaller.local",
            "two_auth": false,
            "created": 1_556_064_401,
            "logs": [],
        })),
        "checkPhone" => check_phone(&mut inner, &params),
        "inboundCallWaiting" => inbound_call_waiting(&mut inner, &params),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

fn authorized(config: &MockConfig, params: &Params) -> bool {
    let service_id = params.get("service_id").and_then(|s| s.parse::<u64>().ok());
    service_id == Some(config.service_id) && params.get("key") == Some(&config.key)
}

fn init_call(inner: &mut Inner, params: &Params) -> Response {
    let Some(phone) = params.get("phone").and_then(|p| parse_phone(p)) else {
        return error(ERR_PHONE, "Wrong phone number");
    };
    let code = params.get("code").cloned().unwrap_or_default();
    if code.len() != 4 || !code.chars().all(|c| c.is_ascii_digit()) {
        return error(ERR_CODE, "Code must be 4 digits");
    }
    let client = params.get("client").cloned();
    let unique = params.get("unique").cloned();

    if let Some(id) = unique.as_ref().and_then(|u| inner.by_unique.get(u)) {
        let id = *id;
        if let Some(call) = inner.calls.get(&id) {
            return ok(call_body(id, call, true));
        }
    }

    if inner.balance < inner.config.call_cost {
        return error(ERR_BALANCE, "Insufficient funds");
    }
    inner.balance -= inner.config.call_cost;

    let id = inner.next_id;
    inner.next_id += 1;
    let call = Call {
        phone,
        code,
        client,
        unique: unique.clone(),
        init_time: now(),
        repeats: Vec::new(),
    };
    let body = call_body(id, &call, false);
    inner.calls.insert(id, call);
    if let Some(unique) = unique {
        inner.by_unique.insert(unique, id);
    }
    ok(body)
}

fn init_repeat(inner: &mut Inner, params: &Params) -> Response {
    let Some(uid) = params.get("uid").and_then(|u| u.parse::<u64>().ok()) else {
        return error(ERR_UID, "Unknown uid");
    };
    let repeat_id = inner.next_id;
    let Some(call) = inner.calls.get_mut(&uid) else {
        return error(ERR_UID, "Unknown uid");
    };
    if call.repeats.len() >= MAX_FREE_REPEATS {
        return error(ERR_REPEAT, "No free repeats left");
    }
    call.repeats.push(repeat_id);
    let mut body = call_body(repeat_id, call, true);
    body["free_repeated"] = json!(true);
    inner.next_id += 1;
    ok(body)
}

fn get_info(inner: &Inner, params: &Params) -> Response {
    let Some((uid, call)) = params
        .get("uid")
        .and_then(|u| u.parse::<u64>().ok())
        .and_then(|uid| inner.calls.get(&uid).map(|call| (uid, call)))
    else {
        return error(ERR_UID, "Unknown uid");
    };
    let repeat_times = MAX_FREE_REPEATS - call.repeats.len();
    ok(json!({
        "status": true,
        "ucaller_id": uid,
        "init_time": call.init_time,
        "call_status": 1,
        "repeatable": repeat_times > 0,
        "repeat_times": repeat_times,
        "repeated_ucaller_ids": call.repeats,
        "unique": call.unique,
        "client": call.client,
        "phone": call.phone,
        "code": call.code,
        "country_code": "RU",
        "country_image": "https://static.ucaller.ru/flag/ru.svg",
        "phone_info": [{"operator": "Mock Telecom", "region": "Moscow", "mnp": null}],
        "cost": inner.config.call_cost,
        "balance": inner.balance,
    }))
}

fn check_phone(inner: &mut Inner, params: &Params) -> Response {
    let source = params.get("phone").cloned().unwrap_or_default();
    let Some(phone) = parse_phone(&source) else {
        return ok(json!({"source": source, "error": "Invalid phone number"}));
    };
    inner.balance -= 0.04;
    ok(json!({
        "source": source,
        "mobile": 1,
        "phone": phone,
        "country_iso": "RU",
        "country_code": 7,
        "mnc": 99,
        "number": phone % 10_000_000_000,
        "provider": "Mock Telecom",
        "company": "Mock Telecom LLC",
        "country": "Россия",
        "region": "Москва",
        "city": "Москва",
        "phone_format": format!("+{phone}"),
        "cost": 0.04,
        "balance": inner.balance,
    }))
}

fn inbound_call_waiting(inner: &mut Inner, params: &Params) -> Response {
    let Some(phone) = params.get("phone").and_then(|p| parse_phone(p)) else {
        return error(ERR_PHONE, "Wrong phone number");
    };
    if params.get("callback_url").map_or(true, String::is_empty) {
        return error(ERR_PARAMETER, "callback_url is required");
    }
    let id = inner.next_id;
    inner.next_id += 1;
    ok(json!({
        "status": true,
        "ucaller_id": id,
        "phone": phone,
        "confirmation_number": CONFIRMATION_NUMBER,
    }))
}

fn call_body(id: u64, call: &Call, exists: bool) -> Value {
    let mut body = json!({
        "status": true,
        "ucaller_id": id,
        "phone": call.phone,
        "code": call.code,
        "exists": exists,
    });
    if let Some(client) = &call.client {
        body["client"] = json!(client);
    }
    if let Some(unique) = &call.unique {
        body["unique_request_id"] = json!(unique);
    }
    body
}

/// Accept `7XXXXXXXXXX`, `8XXXXXXXXXX`, `+7...` or 10 bare digits.
fn parse_phone(raw: &str) -> Option<u64> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    let national = match digits.len() {
        10 => digits.as_str(),
        11 if digits.starts_with('7') || digits.starts_with('8') => &digits[1..],
        _ => return None,
    };
    format!("7{national}").parse().ok()
}

fn ok(body: Value) -> Response {
    Json(body).into_response()
}

fn error(code: i64, message: &str) -> Response {
    Json(json!({"status": false, "error": message, "code": code})).into_response()
}

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
