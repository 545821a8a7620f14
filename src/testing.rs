//! In-process fake of the sport-plus API for the flow tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::{Path, Query, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use crate::models::Config;

/// How the fake answers. The default accepts every login and creation.
#[derive(Default)]
pub(crate) struct FakeApi {
    /// login -> (status, body) returned instead of a token
    pub(crate) rejected_logins: HashMap<String, (StatusCode, String)>,
    pub(crate) omit_token: bool,
    /// endpoint -> (status, body) returned instead of the entries
    pub(crate) failing_reads: HashMap<String, (StatusCode, String)>,
    pub(crate) schedules: HashMap<String, Vec<Value>>,
    /// Status for successful creations, 201 when unset.
    pub(crate) create_status: Option<StatusCode>,
    /// Zero-based index of the creation to reject.
    pub(crate) failing_create: Option<(usize, StatusCode, String)>,
}

#[derive(Debug, Default)]
pub(crate) struct Recorded {
    /// (login, password)
    pub(crate) signins: Vec<(String, String)>,
    /// (endpoint, authorization header)
    pub(crate) reads: Vec<(String, Option<String>)>,
    /// (authorization header, body)
    pub(crate) creates: Vec<(Option<String>, Value)>,
}

struct Shared {
    api: FakeApi,
    recorded: Mutex<Recorded>,
}

pub(crate) struct FakeServer {
    pub(crate) base_url: String,
    shared: Arc<Shared>,
}

impl FakeServer {
    pub(crate) async fn start(api: FakeApi) -> Self {
        let shared = Arc::new(Shared {
            api,
            recorded: Mutex::new(Recorded::default()),
        });

        let app = Router::new()
            .route("/v1/auth/signin", get(signin))
            .route("/v1/calendar", post(create))
            .route("/v1/calendar/{endpoint}", get(read))
            .with_state(Arc::clone(&shared));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}/v1", addr),
            shared,
        }
    }

    pub(crate) fn recorded(&self) -> MutexGuard<'_, Recorded> {
        self.shared.recorded.lock().unwrap()
    }

    /// Built-in users pointed at this server.
    pub(crate) fn config(&self) -> Config {
        let mut cfg = Config::default();
        cfg.api.base_url = self.base_url.clone();
        cfg
    }
}

/// Base URL on a local port nothing listens on.
pub(crate) fn unreachable_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/v1", port)
}

pub(crate) fn token_for(login: &str) -> String {
    format!("token-{}", login)
}

pub(crate) fn bearer(login: &str) -> Option<String> {
    Some(format!("Bearer {}", token_for(login)))
}

fn authorization(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn signin(
    State(shared): State<Arc<Shared>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let login = params.get("login").cloned().unwrap_or_default();
    let password = params.get("password").cloned().unwrap_or_default();
    shared
        .recorded
        .lock()
        .unwrap()
        .signins
        .push((login.clone(), password));

    if let Some((status, body)) = shared.api.rejected_logins.get(&login) {
        return (*status, body.clone()).into_response();
    }
    if shared.api.omit_token {
        return Json(json!({ "user": { "login": login } })).into_response();
    }
    Json(json!({ "token": token_for(&login), "user": { "login": login } })).into_response()
}

async fn read(
    State(shared): State<Arc<Shared>>,
    Path(endpoint): Path<String>,
    headers: HeaderMap,
) -> Response {
    shared
        .recorded
        .lock()
        .unwrap()
        .reads
        .push((endpoint.clone(), authorization(&headers)));

    if let Some((status, body)) = shared.api.failing_reads.get(&endpoint) {
        return (*status, body.clone()).into_response();
    }
    let entries = shared.api.schedules.get(&endpoint).cloned().unwrap_or_default();
    Json(Value::Array(entries)).into_response()
}

async fn create(
    State(shared): State<Arc<Shared>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let index = {
        let mut recorded = shared.recorded.lock().unwrap();
        recorded.creates.push((authorization(&headers), body));
        recorded.creates.len() - 1
    };

    if let Some((at, status, text)) = &shared.api.failing_create {
        if *at == index {
            return (*status, text.clone()).into_response();
        }
    }
    let status = shared.api.create_status.unwrap_or(StatusCode::CREATED);
    (status, Json(json!({ "id": index + 1 }))).into_response()
}
