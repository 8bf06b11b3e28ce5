use std::sync::Arc;

use serde::{Serialize, de::DeserializeOwned};

use crate::{
    Res,
    http::{
        ApiResponse, BearerAuth, Middleware, Next, PendingRequest, RefreshOn401, RequestLog,
        Transport,
    },
    management::TokenStore,
    session::Navigator,
};

/// Entry point for every API call.
///
/// Requests run through the middleware stages in order, then the transport.
/// Any final non-2xx response is turned into an [`crate::error::ApiError`].
/// Cloning is cheap and clones share the store and stages.
///
/// # Example
///
/// ```
/// use std::{sync::Arc, time::Duration};
/// use trimify::{
///     http::{ApiClient, ReqwestTransport},
///     management::MemoryTokenStore,
///     session::TerminalNavigator,
///     types::ShortUrl,
/// };
///
/// # async fn run() -> trimify::Res<()> {
/// let transport = ReqwestTransport::new("https://link-trimify.vercel.app", Duration::from_secs(30))?;
/// let client = ApiClient::new(
///     Arc::new(transport),
///     Arc::new(MemoryTokenStore::with_tokens("access", "refresh")),
///     Arc::new(TerminalNavigator),
/// );
/// let urls: Vec<ShortUrl> = client.get_json("/urls/").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    stages: Arc<[Arc<dyn Middleware>]>,
    store: Arc<dyn TokenStore>,
}

impl ApiClient {
    /// Client with the default stages:
    /// `refresh-on-401`, `bearer-auth`, `request-log`.
    ///
    /// # Arguments
    ///
    /// * `transport` - Where requests finally go; also used directly for
    ///   token refresh so the refresh call never re-enters the stages
    /// * `store` - Token store read by `bearer-auth` and rewritten on refresh
    /// * `navigator` - Told to show the login view when a refresh fails
    pub fn new(
        transport: Arc<dyn Transport>,
        store: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let stages: Vec<Arc<dyn Middleware>> = vec![
            Arc::new(RefreshOn401::new(Arc::clone(&store), navigator)),
            Arc::new(BearerAuth::new(Arc::clone(&store))),
            Arc::new(RequestLog),
        ];
        Self::with_stages(transport, store, stages)
    }

    /// Client with a caller-chosen stage list, outermost first.
    pub fn with_stages(
        transport: Arc<dyn Transport>,
        store: Arc<dyn TokenStore>,
        stages: Vec<Arc<dyn Middleware>>,
    ) -> Self {
        Self {
            transport,
            stages: stages.into(),
            store,
        }
    }

    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Runs `request` through the stages and the transport.
    ///
    /// # Returns
    ///
    /// The raw response when its status is 2xx.
    ///
    /// # Errors
    ///
    /// * [`ApiError::AuthenticationInvalid`](crate::error::ApiError) - 401 on
    ///   login or refresh, or the session ended because refresh failed
    /// * [`ApiError::AuthenticationExpired`](crate::error::ApiError) - 401
    ///   that survived the single retry
    /// * [`ApiError::Server`](crate::error::ApiError) - any other non-2xx
    /// * [`ApiError::Network`](crate::error::ApiError) - transport failure
    pub async fn execute(&self, mut request: PendingRequest) -> Res<ApiResponse> {
        let response = Next::new(self.transport.as_ref(), &self.stages)
            .run(&mut request)
            .await?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(response.into_error(request.is_auth_endpoint()))
        }
    }

    /// GET `path` and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Res<T> {
        self.execute(PendingRequest::get(path)).await?.json()
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Res<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(PendingRequest::post(path).json(body)?)
            .await?
            .json()
    }

    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Res<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(PendingRequest::put(path).json(body)?)
            .await?
            .json()
    }

    /// POST whose response body is ignored.
    pub async fn post_unit<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Res<()> {
        self.execute(PendingRequest::post(path).json(body)?).await?;
        Ok(())
    }

    pub async fn delete(&self, path: &str) -> Res<()> {
        self.execute(PendingRequest::delete(path)).await?;
        Ok(())
    }

    /// GET `path` and return the body as-is (QR images).
    pub async fn get_bytes(&self, path: &str) -> Res<Vec<u8>> {
        Ok(self.execute(PendingRequest::get(path)).await?.into_bytes())
    }
}
