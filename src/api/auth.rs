use crate::{
    Res,
    http::{ApiClient, LOGIN_PATH, REGISTER_PATH},
    types::{Credentials, Registration, TokenPair},
};

/// Exchanges credentials for an access/refresh token pair.
///
/// A 401 here is reported as
/// [`crate::error::ApiError::AuthenticationInvalid`] and never triggers a
/// token refresh.
pub async fn login(client: &ApiClient, credentials: &Credentials) -> Res<TokenPair> {
    client.post_json(LOGIN_PATH, credentials).await
}

/// Creates an account. Signing in is a separate step.
pub async fn register(client: &ApiClient, registration: &Registration) -> Res<()> {
    client.post_unit(REGISTER_PATH, registration).await
}
