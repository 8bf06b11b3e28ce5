//! # HTTP Client Pipeline
//!
//! Every call to the Trimify API goes through [`ApiClient`], which runs an
//! ordered list of named [`Middleware`] stages before the [`Transport`]:
//!
//! ```text
//! ApiClient::execute
//!     ↓
//! refresh-on-401   401 → refresh once → re-dispatch (never for login, never twice)
//!     ↓
//! bearer-auth      Authorization: Bearer <stored access token>
//!     ↓
//! request-log      one tracing event per dispatch
//!     ↓
//! Transport        reqwest in production, scripted in tests
//! ```
//!
//! The refresh call itself goes straight to the transport so it can never
//! trigger another refresh. Concurrent 401s each perform their own refresh;
//! nothing coalesces them.

mod client;
mod middleware;
mod request;
mod transport;

pub use client::ApiClient;
pub use middleware::{BearerAuth, Middleware, Next, RefreshOn401, RequestLog};
pub use request::{
    ApiResponse, LOGIN_PATH, PendingRequest, REFRESH_PATH, REGISTER_PATH, RequestBody,
};
pub use transport::{ReqwestTransport, Transport};
