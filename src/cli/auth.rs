use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::{
    app::App,
    error, info,
    session::View,
    success,
    types::{Credentials, Registration},
    validate, warning,
};

use super::{require, spinner};

/// Reads a password from the first line of `reader`.
///
/// The line terminator is stripped, everything else (including surrounding
/// spaces) is kept as typed.
///
/// # Errors
///
/// Returns the underlying I/O error if the reader fails.
pub async fn read_password<R>(mut reader: R) -> std::io::Result<String>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    reader.read_line(&mut line).await?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Password for `login --password-stdin`, so the secret never appears in
/// shell history or the process list.
pub async fn password_from_stdin() -> String {
    match read_password(BufReader::new(tokio::io::stdin())).await {
        Ok(password) => password,
        Err(e) => error!("Cannot read password from stdin. Err: {}", e),
    }
}

pub async fn login(app: &App, email: String, password: String) {
    let credentials = Credentials::new(email, password);
    if let Err(e) = validate::credentials(&credentials) {
        error!("{}", e);
    }

    let pb = spinner("Signing in...");
    let result = app.session.login(&credentials).await;
    pb.finish_and_clear();

    match result {
        Ok(identity) => {
            success!("Signed in as {}", identity.display_name());
            info!("Continue with `trimify urls` or `trimify shorten <url>`.");
        }
        Err(e) if e.is_authentication() => error!("Invalid email or password ({})", e),
        Err(e) => error!("Login failed. Err: {}", e),
    }
}

pub async fn register(
    app: &App,
    username: String,
    email: String,
    password: String,
    confirm_password: String,
) {
    let registration = Registration {
        username,
        email,
        password,
    };
    if let Err(e) = validate::registration(&registration, &confirm_password) {
        error!("{}", e);
    }

    let pb = spinner("Creating account...");
    let result = app.session.register(&registration).await;
    pb.finish_and_clear();

    match result {
        Ok(()) => {
            success!("Account {} created.", registration.username);
            app.navigator.navigate(View::Login);
        }
        Err(e) => error!("Failed to register. Err: {}", e),
    }
}

pub fn logout(app: &App) {
    app.session.logout();
}

pub fn whoami(app: &App) {
    let identity = require(app, View::Dashboard);

    info!("Signed in as {}", identity.display_name());
    if let Some(user_id) = identity.user_id() {
        info!("User id: {}", user_id);
    }
    if let Some(email) = identity.email() {
        info!("Email: {}", email);
    }
    match identity.expires_at() {
        Some(exp) if identity.is_expired(chrono::Utc::now()) => warning!(
            "Access token expired at {}; it will be refreshed on the next request.",
            exp.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        Some(exp) => info!(
            "Access token valid until {}",
            exp.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        None => {}
    }
}
