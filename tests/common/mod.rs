#![allow(dead_code)]

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use reqwest::{Method, StatusCode};
use serde_json::{Value, json};
use trimify::{
    Res,
    http::{ApiClient, ApiResponse, PendingRequest, RequestBody, Transport},
    management::{MemoryTokenStore, TokenStore},
    session::{Navigator, View},
};

// Builds an unsigned "header.payload.signature" token around `claims`
pub fn token_with_claims(claims: Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.signature")
}

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
    pub body: Option<Value>,
    pub retried: bool,
}

/// Transport answering from per-route queues and recording every request.
///
/// Routes are keyed as "METHOD /path/". Unscripted routes answer 404.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<String, VecDeque<ApiResponse>>>,
    requests: Mutex<Vec<Recorded>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, method: Method, path: &str, status: StatusCode, body: Value) {
        self.routes
            .lock()
            .unwrap()
            .entry(format!("{method} {path}"))
            .or_default()
            .push_back(ApiResponse::from_json(status, &body));
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &PendingRequest) -> Res<ApiResponse> {
        let body = match request.body() {
            Some(RequestBody::Json(value)) => Some(value.clone()),
            _ => None,
        };
        self.requests.lock().unwrap().push(Recorded {
            method: request.method().clone(),
            path: request.path().to_string(),
            authorization: request.authorization().map(str::to_string),
            body,
            retried: request.retried(),
        });

        let key = format!("{} {}", request.method(), request.path());
        let scripted = self
            .routes
            .lock()
            .unwrap()
            .get_mut(&key)
            .and_then(|queue| queue.pop_front());
        Ok(scripted.unwrap_or_else(|| {
            ApiResponse::from_json(StatusCode::NOT_FOUND, &json!({"detail": "Not found."}))
        }))
    }
}

/// Hands control back to the runtime before every call so concurrent
/// requests interleave instead of running to completion one by one.
pub struct YieldingTransport(pub Arc<ScriptedTransport>);

#[async_trait]
impl Transport for YieldingTransport {
    async fn send(&self, request: &PendingRequest) -> Res<ApiResponse> {
        tokio::task::yield_now().await;
        let response = self.0.send(request).await;
        tokio::task::yield_now().await;
        response
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    views: Mutex<Vec<View>>,
}

impl RecordingNavigator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn views(&self) -> Vec<View> {
        self.views.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, view: View) {
        self.views.lock().unwrap().push(view);
    }
}

pub struct Harness {
    pub transport: Arc<ScriptedTransport>,
    pub store: Arc<MemoryTokenStore>,
    pub navigator: Arc<RecordingNavigator>,
    pub client: ApiClient,
}

pub fn harness(store: MemoryTokenStore) -> Harness {
    let transport = ScriptedTransport::new();
    let store = Arc::new(store);
    let navigator = RecordingNavigator::new();
    let client = ApiClient::new(
        transport.clone(),
        store.clone() as Arc<dyn TokenStore>,
        navigator.clone(),
    );
    Harness {
        transport,
        store,
        navigator,
        client,
    }
}
