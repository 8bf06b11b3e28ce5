//! # Session Module
//!
//! Client-side view of "who is signed in".
//!
//! - [`decoder`] - reads the access token's claims (no verification)
//! - [`SessionController`] - login / register / logout and the session state
//! - [`guard`] - admits or redirects protected views
//! - [`Navigator`] - where forced navigations go

pub mod decoder;
pub mod guard;

mod controller;
mod navigation;

pub use controller::{SessionController, SessionState};
pub use decoder::SessionIdentity;
pub use guard::{Admission, admit};
pub use navigation::{Navigator, TerminalNavigator, View};
