//! # CLI Module
//!
//! Sub-command implementations for the `trimify` binary. Each command maps
//! onto one of the client's views; protected ones pass through the route
//! guard before any request is made.
//!
//! ## Commands
//!
//! - [`auth`] - `login`, `register`, `logout`, `whoami`
//! - [`urls`] - `shorten`, `urls ...`, `qr`, `open`
//! - [`analytics`] - `stats`, `analytics <code>`
//! - [`profile`] - `profile ...`
//!
//! Output goes through the crate's `info!`/`success!`/`warning!`/`error!`
//! macros and `tabled` tables. `error!` terminates the process, so command
//! functions never return errors.

pub mod analytics;
pub mod auth;
pub mod profile;
pub mod urls;

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    app::App,
    error,
    error::ApiError,
    session::{Admission, SessionIdentity, SessionState, View, admit},
};

/// Runs the route guard for `view` and returns the signed-in identity.
///
/// Exits the process when the view cannot be shown.
pub fn require(app: &App, view: View) -> SessionIdentity {
    let state = app.session.state();
    match admit(&state, view) {
        Admission::Render(_) => {}
        Admission::Pending => error!("Session is still loading. Please try again."),
        Admission::Redirect(target) => {
            app.navigator.navigate(target);
            std::process::exit(1);
        }
    }

    match state {
        SessionState::Authenticated(identity) => identity,
        _ => error!("You are not signed in."),
    }
}

/// Reports a failed request and exits.
///
/// When the session is gone the navigator has already been told (by the
/// pipeline after a failed refresh); an expired-but-unrecovered session
/// gets the same hint here.
pub fn fail(app: &App, context: &str, err: ApiError) -> ! {
    if let ApiError::AuthenticationExpired { .. } = err {
        app.navigator.navigate(View::Login);
    }
    error!("{}. Err: {}", context, err)
}

pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb
}
