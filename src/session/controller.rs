use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{
    Res, api,
    http::ApiClient,
    management::TokenStore,
    session::{Navigator, SessionIdentity, View, decoder},
    types::{Credentials, Registration},
};

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Loading,
    Anonymous,
    Authenticated(SessionIdentity),
}

impl SessionState {
    pub fn identity(&self) -> Option<&SessionIdentity> {
        match self {
            SessionState::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }
}

// State plus the access token it was derived from.
struct Session {
    state: SessionState,
    token: Option<String>,
}

/// Owns the session lifecycle: `Loading` → `Anonymous` | `Authenticated`.
///
/// Built once at start-up and shared by reference. Identity is re-derived
/// whenever the stored access token changes underneath it, which happens
/// when the pipeline refreshes a token or ends a session after a failed
/// refresh.
///
/// # Example
///
/// ```
/// use trimify::{app::App, session::SessionState, types::Credentials};
///
/// # async fn run(app: App) -> trimify::Res<()> {
/// if app.session.state() == SessionState::Anonymous {
///     let identity = app
///         .session
///         .login(&Credentials::new("ada@example.com", "correct horse"))
///         .await?;
///     println!("signed in as {}", identity.display_name());
/// }
/// app.session.logout();
/// # Ok(())
/// # }
/// ```
pub struct SessionController {
    client: ApiClient,
    store: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
    session: Mutex<Session>,
}

impl SessionController {
    /// Creates the controller and resolves the initial `Loading` state from
    /// the stored access token.
    pub fn new(client: ApiClient, navigator: Arc<dyn Navigator>) -> Self {
        let store = Arc::clone(client.store());
        let controller = Self {
            client,
            store,
            navigator,
            session: Mutex::new(Session {
                state: SessionState::Loading,
                token: None,
            }),
        };
        controller.state();
        controller
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current state, re-derived if the stored access token changed.
    pub fn state(&self) -> SessionState {
        let mut session = self.lock();
        self.resolve(&mut session);
        session.state.clone()
    }

    pub fn identity(&self) -> Option<SessionIdentity> {
        self.state().identity().cloned()
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    fn resolve(&self, session: &mut Session) {
        let current = self.store.access_token();
        if current == session.token && session.state != SessionState::Loading {
            return;
        }

        match decoder::decode(current.as_deref()) {
            Ok(identity) => {
                tracing::debug!(user = %identity.display_name(), "session resolved");
                session.state = SessionState::Authenticated(identity);
                session.token = current;
            }
            Err(e) => {
                if current.is_some() {
                    tracing::warn!(error = %e, "discarding stored session");
                }
                self.end(session);
            }
        }
    }

    fn end(&self, session: &mut Session) {
        if let Err(e) = self.store.clear() {
            tracing::error!(error = %e, "failed to clear token store");
        }
        session.state = SessionState::Anonymous;
        session.token = None;
    }

    /// Signs in and stores the returned tokens.
    ///
    /// # Arguments
    ///
    /// * `credentials` - Email and password; validate them first with
    ///   [`validate::credentials`](crate::validate::credentials)
    ///
    /// # Returns
    ///
    /// The identity decoded from the new access token. The session is
    /// `Authenticated` afterwards.
    ///
    /// # Errors
    ///
    /// * [`ApiError::AuthenticationInvalid`](crate::error::ApiError) - the
    ///   server rejected the credentials; the state is left as it was
    /// * [`ApiError::MalformedToken`](crate::error::ApiError) - the server
    ///   answered with a token that cannot be decoded; the store is cleared
    ///   and the session is `Anonymous`
    /// * [`ApiError::Storage`](crate::error::ApiError) - the tokens could not
    ///   be persisted
    pub async fn login(&self, credentials: &Credentials) -> Res<SessionIdentity> {
        let tokens = api::auth::login(&self.client, credentials).await?;
        self.store.save(&tokens.access, &tokens.refresh)?;

        let mut session = self.lock();
        match decoder::decode(Some(&tokens.access)) {
            Ok(identity) => {
                tracing::info!(user = %identity.display_name(), "signed in");
                session.state = SessionState::Authenticated(identity.clone());
                session.token = Some(tokens.access);
                Ok(identity)
            }
            Err(e) => {
                self.end(&mut session);
                Err(e)
            }
        }
    }

    /// Creates an account; the session state is not touched.
    pub async fn register(&self, registration: &Registration) -> Res<()> {
        api::auth::register(&self.client, registration).await
    }

    /// Clears the tokens and navigates to the landing view.
    pub fn logout(&self) {
        {
            let mut session = self.lock();
            self.end(&mut session);
        }
        tracing::info!("signed out");
        self.navigator.navigate(View::Landing);
    }
}
