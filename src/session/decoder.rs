//! Access token claim decoding.
//!
//! The payload segment of the access token is decoded so the client can show
//! who is signed in. Nothing here verifies a signature: the identity is a
//! display convenience and the API remains the only authority.

use base64::{
    Engine, alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::error::ApiError;

// base64url with or without trailing '='
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Read-only projection of the access token's claims.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionIdentity {
    claims: Map<String, Value>,
}

impl SessionIdentity {
    pub fn from_claims(claims: Map<String, Value>) -> Self {
        Self { claims }
    }

    pub fn claims(&self) -> &Map<String, Value> {
        &self.claims
    }

    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    fn text_claim(&self, name: &str) -> Option<String> {
        match self.claims.get(name)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn subject(&self) -> Option<String> {
        self.text_claim("sub")
    }

    /// `user_id` claim, falling back to `sub`.
    pub fn user_id(&self) -> Option<String> {
        self.text_claim("user_id").or_else(|| self.subject())
    }

    pub fn username(&self) -> Option<String> {
        self.text_claim("username")
    }

    pub fn email(&self) -> Option<String> {
        self.text_claim("email")
    }

    /// Name to greet the user with: username, email, then user id.
    pub fn display_name(&self) -> String {
        self.username()
            .or_else(|| self.email())
            .or_else(|| self.user_id())
            .unwrap_or_else(|| "unknown user".to_string())
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let exp = self.claims.get("exp")?;
        let secs = exp.as_i64().or_else(|| exp.as_f64().map(|f| f as i64))?;
        DateTime::from_timestamp(secs, 0)
    }

    /// False when the token carries no `exp` claim.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|exp| exp <= now)
    }
}

/// Decodes the claims of `token`.
///
/// Only the payload segment is read. The signature is not verified; the
/// server does that on every request, this side just needs to know who is
/// signed in.
///
/// # Arguments
///
/// * `token` - The stored access token, if any
///
/// # Returns
///
/// The identity carried by the token's claims.
///
/// # Errors
///
/// [`ApiError::MalformedToken`] when the token is absent, does not have
/// exactly three dot-separated segments, or its payload is not a
/// base64url-encoded JSON object.
///
/// # Example
///
/// ```
/// use trimify::session::decoder::decode;
///
/// // {"sub":"42","username":"ada"}
/// let token = "e30.eyJzdWIiOiI0MiIsInVzZXJuYW1lIjoiYWRhIn0.sig";
/// let identity = decode(Some(token))?;
/// assert_eq!(identity.username().as_deref(), Some("ada"));
/// assert!(decode(Some("not-a-token")).is_err());
/// # Ok::<(), trimify::error::ApiError>(())
/// ```
pub fn decode(token: Option<&str>) -> Result<SessionIdentity, ApiError> {
    let token = token.ok_or_else(|| ApiError::MalformedToken("no token present".into()))?;

    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(ApiError::MalformedToken(format!(
            "expected 3 segments, found {}",
            segments.len()
        )));
    }

    let payload = segments[1].replace('+', "-").replace('/', "_");
    if payload.is_empty() {
        return Err(ApiError::MalformedToken("empty payload segment".into()));
    }
    let bytes = PAYLOAD_ENGINE
        .decode(payload.as_bytes())
        .map_err(|e| ApiError::MalformedToken(format!("payload is not base64url: {e}")))?;

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(claims)) => Ok(SessionIdentity::from_claims(claims)),
        Ok(_) => Err(ApiError::MalformedToken(
            "payload is not a JSON object".into(),
        )),
        Err(e) => Err(ApiError::MalformedToken(format!(
            "payload is not JSON: {e}"
        ))),
    }
}
