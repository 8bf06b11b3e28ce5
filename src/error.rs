//! Error taxonomy.
//!
//! Authentication failures are split in two: [`ApiError::AuthenticationExpired`]
//! is what a protected call reports once the pipeline could not recover it
//! with a refresh, while [`ApiError::AuthenticationInvalid`] means the login
//! or refresh endpoint itself rejected the presented credentials. Everything
//! else is either a transport problem, a non-2xx answer, or a local failure.

use reqwest::StatusCode;
use thiserror::Error;

/// Failures of the durable token store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("token store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("token store is corrupt: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// A protected request was rejected with 401 and could not be recovered.
    #[error("session expired: {detail}")]
    AuthenticationExpired { detail: String },

    /// The login or refresh endpoint rejected the presented credentials.
    #[error("authentication failed: {detail}")]
    AuthenticationInvalid { detail: String },

    #[error("malformed access token: {0}")]
    MalformedToken(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("server responded with {status}: {detail}")]
    Server { status: StatusCode, detail: String },

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] StoreError),

    #[error("{0}")]
    Validation(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Classifies a final non-2xx status.
    ///
    /// `auth_endpoint` is true for the login and refresh endpoints, whose
    /// 401 means "bad credentials" rather than "session expired".
    pub fn from_status(status: StatusCode, detail: String, auth_endpoint: bool) -> Self {
        if status == StatusCode::UNAUTHORIZED {
            if auth_endpoint {
                ApiError::AuthenticationInvalid { detail }
            } else {
                ApiError::AuthenticationExpired { detail }
            }
        } else {
            ApiError::Server { status, detail }
        }
    }

    pub fn is_authentication(&self) -> bool {
        matches!(
            self,
            ApiError::AuthenticationExpired { .. } | ApiError::AuthenticationInvalid { .. }
        )
    }

    /// HTTP status carried by the error, if the server produced one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::AuthenticationExpired { .. } | ApiError::AuthenticationInvalid { .. } => {
                Some(StatusCode::UNAUTHORIZED)
            }
            ApiError::Server { status, .. } => Some(*status),
            ApiError::Network(e) => e.status(),
            _ => None,
        }
    }
}
