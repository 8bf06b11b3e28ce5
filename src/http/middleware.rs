//! Pipeline stages.
//!
//! A stage receives the request and a [`Next`] handle for everything after
//! it. Calling `next.run(request)` passes through; returning without calling
//! it short-circuits; calling it again re-dispatches through the remaining
//! stages.

use std::{sync::Arc, time::Instant};

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::{
    Res,
    error::ApiError,
    http::{ApiResponse, PendingRequest, REFRESH_PATH, Transport},
    management::TokenStore,
    session::{Navigator, View},
    types::{RefreshRequest, RefreshResponse},
};

#[async_trait]
pub trait Middleware: Send + Sync {
    fn name(&self) -> &'static str;

    async fn handle(&self, request: &mut PendingRequest, next: Next<'_>) -> Res<ApiResponse>;
}

/// The stages after the current one, followed by the transport.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    transport: &'a dyn Transport,
    stages: &'a [Arc<dyn Middleware>],
}

impl<'a> Next<'a> {
    pub fn new(transport: &'a dyn Transport, stages: &'a [Arc<dyn Middleware>]) -> Self {
        Self { transport, stages }
    }

    /// The bare transport, for calls that must not be intercepted.
    pub fn transport(&self) -> &'a dyn Transport {
        self.transport
    }

    pub async fn run(self, request: &mut PendingRequest) -> Res<ApiResponse> {
        match self.stages.split_first() {
            Some((stage, rest)) => stage.handle(request, Next::new(self.transport, rest)).await,
            None => self.transport.send(request).await,
        }
    }
}

/// Attaches the stored access token as a bearer credential.
pub struct BearerAuth {
    store: Arc<dyn TokenStore>,
}

impl BearerAuth {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Middleware for BearerAuth {
    fn name(&self) -> &'static str {
        "bearer-auth"
    }

    async fn handle(&self, request: &mut PendingRequest, next: Next<'_>) -> Res<ApiResponse> {
        match self.store.access_token() {
            Some(token) => request.set_bearer(&token),
            None => request.clear_authorization(),
        }
        next.run(request).await
    }
}

/// Recovers a 401 with one token refresh and one re-dispatch.
///
/// Login requests and requests that were already retried are passed back
/// untouched. A failed refresh ends the session: the store is cleared, the
/// navigator is sent to the login view and the refresh failure is returned.
pub struct RefreshOn401 {
    store: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
}

impl RefreshOn401 {
    pub fn new(store: Arc<dyn TokenStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self { store, navigator }
    }

    async fn refresh(&self, transport: &dyn Transport) -> Res<String> {
        let Some(refresh) = self.store.refresh_token() else {
            return Err(ApiError::AuthenticationInvalid {
                detail: "no refresh token stored".to_string(),
            });
        };

        let request = PendingRequest::post(REFRESH_PATH).json(&RefreshRequest { refresh })?;
        let response = transport.send(&request).await?;
        if !response.status().is_success() {
            return Err(response.into_error(true));
        }

        let RefreshResponse { access } = response.json()?;
        Ok(access)
    }

    fn end_session(&self) {
        if let Err(e) = self.store.clear() {
            tracing::error!(error = %e, "failed to clear token store after refresh failure");
        }
        self.navigator.navigate(View::Login);
    }
}

#[async_trait]
impl Middleware for RefreshOn401 {
    fn name(&self) -> &'static str {
        "refresh-on-401"
    }

    async fn handle(&self, request: &mut PendingRequest, next: Next<'_>) -> Res<ApiResponse> {
        let response = next.run(request).await?;
        if response.status() != StatusCode::UNAUTHORIZED || request.is_login() || request.retried()
        {
            return Ok(response);
        }

        request.mark_retried();
        tracing::info!(path = %request.path(), "access token rejected, refreshing");

        let access = match self.refresh(next.transport()).await {
            Ok(access) => access,
            Err(e) => {
                tracing::warn!(path = %request.path(), error = %e, "token refresh failed, ending session");
                self.end_session();
                return Err(e);
            }
        };

        self.store.set_access(&access)?;
        request.set_bearer(&access);
        next.run(request).await
    }
}

/// Emits one `tracing` event per dispatch, retries included.
#[derive(Debug, Default)]
pub struct RequestLog;

#[async_trait]
impl Middleware for RequestLog {
    fn name(&self) -> &'static str {
        "request-log"
    }

    async fn handle(&self, request: &mut PendingRequest, next: Next<'_>) -> Res<ApiResponse> {
        let started = Instant::now();
        let result = next.run(request).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(response) => tracing::debug!(
                method = %request.method(),
                path = %request.path(),
                status = response.status().as_u16(),
                retried = request.retried(),
                elapsed_ms,
                "request completed"
            ),
            Err(e) => tracing::warn!(
                method = %request.method(),
                path = %request.path(),
                retried = request.retried(),
                elapsed_ms,
                error = %e,
                "request failed"
            ),
        }
        result
    }
}
