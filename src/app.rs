use std::sync::Arc;

use crate::{
    Res, config,
    http::{ApiClient, ReqwestTransport, Transport},
    management::{FileTokenStore, MemoryTokenStore, TokenStore},
    session::{Navigator, SessionController, TerminalNavigator},
};

/// Everything a command needs, built once per process.
pub struct App {
    pub client: ApiClient,
    pub session: SessionController,
    pub navigator: Arc<dyn Navigator>,
    pub base_url: String,
}

impl App {
    pub fn new(
        transport: Arc<dyn Transport>,
        store: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
        base_url: impl Into<String>,
    ) -> Self {
        let client = ApiClient::new(transport, store, Arc::clone(&navigator));
        let session = SessionController::new(client.clone(), Arc::clone(&navigator));
        Self {
            client,
            session,
            navigator,
            base_url: base_url.into(),
        }
    }

    /// Production wiring: reqwest transport, file token store, terminal
    /// navigator.
    pub fn from_config() -> Res<Self> {
        let store = FileTokenStore::open(config::token_file())?;
        Self::with_store(Arc::new(store))
    }

    /// Like [`App::from_config`] but nothing is written to disk.
    pub fn ephemeral() -> Res<Self> {
        Self::with_store(Arc::new(MemoryTokenStore::new()))
    }

    fn with_store(store: Arc<dyn TokenStore>) -> Res<Self> {
        let base_url = config::api_url();
        let transport = ReqwestTransport::new(base_url.clone(), config::request_timeout())?;
        Ok(Self::new(
            Arc::new(transport),
            store,
            Arc::new(TerminalNavigator),
            base_url,
        ))
    }
}
