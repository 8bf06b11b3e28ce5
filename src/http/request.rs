use reqwest::{
    Method, StatusCode,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{Res, error::ApiError};

pub const LOGIN_PATH: &str = "/api/auth/login/";
pub const REGISTER_PATH: &str = "/api/auth/register/";
pub const REFRESH_PATH: &str = "/api/auth/refresh/";

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    /// A single file sent as `multipart/form-data`.
    Multipart {
        field: String,
        file_name: String,
        mime: String,
        bytes: Vec<u8>,
    },
}

/// An outbound request as it travels through the middleware stages.
///
/// The request is kept as plain data so a stage can re-dispatch it. The
/// `retried` flag is one-shot: once set by the refresh stage the request is
/// never refreshed again.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    method: Method,
    path: String,
    headers: HeaderMap,
    body: Option<RequestBody>,
    retried: bool,
}

impl PendingRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: None,
            retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Res<Self> {
        self.body = Some(RequestBody::Json(serde_json::to_value(body)?));
        Ok(self)
    }

    pub fn multipart(
        mut self,
        field: impl Into<String>,
        file_name: impl Into<String>,
        mime: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        self.body = Some(RequestBody::Multipart {
            field: field.into(),
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
        });
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }

    pub fn retried(&self) -> bool {
        self.retried
    }

    pub fn mark_retried(&mut self) {
        self.retried = true;
    }

    pub fn is_login(&self) -> bool {
        self.path.contains("/login/")
    }

    /// Login and refresh answer 401 for bad credentials, not expiry.
    pub fn is_auth_endpoint(&self) -> bool {
        self.is_login() || self.path.starts_with(REFRESH_PATH)
    }

    pub fn authorization(&self) -> Option<&str> {
        self.headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
    }

    /// Sets `Authorization: Bearer <token>`.
    ///
    /// A token that is not a valid header value is dropped and the request
    /// goes out unauthenticated; the API rejects it if it must.
    pub fn set_bearer(&mut self, token: &str) {
        match HeaderValue::from_str(&format!("Bearer {token}")) {
            Ok(mut value) => {
                value.set_sensitive(true);
                self.headers.insert(AUTHORIZATION, value);
            }
            Err(_) => {
                tracing::warn!(path = %self.path, "stored access token is not a valid header value");
                self.headers.remove(AUTHORIZATION);
            }
        }
    }

    pub fn clear_authorization(&mut self) {
        self.headers.remove(AUTHORIZATION);
    }
}

/// A fully buffered response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    pub fn from_json(status: StatusCode, body: &Value) -> Self {
        Self::new(status, HeaderMap::new(), body.to_string().into_bytes())
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.body
    }

    pub fn json<T: DeserializeOwned>(&self) -> Res<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Human readable reason for a failed response.
    ///
    /// Uses the `detail` or `message` field of a JSON body, then the first
    /// field error of a validation body, then the canonical status reason.
    pub fn detail(&self) -> String {
        if let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(&self.body) {
            for key in ["detail", "message", "error"] {
                if let Some(Value::String(text)) = map.get(key) {
                    return text.clone();
                }
            }
            let field_error = map.iter().find_map(|(field, value)| match value {
                Value::Array(items) => items
                    .first()
                    .and_then(Value::as_str)
                    .map(|msg| format!("{field}: {msg}")),
                Value::String(msg) => Some(format!("{field}: {msg}")),
                _ => None,
            });
            if let Some(text) = field_error {
                return text;
            }
        }
        self.status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    }

    /// Maps a non-2xx response onto the error taxonomy.
    pub fn into_error(self, auth_endpoint: bool) -> ApiError {
        ApiError::from_status(self.status, self.detail(), auth_endpoint)
    }
}
