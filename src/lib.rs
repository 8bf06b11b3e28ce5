//! Trimify URL Shortener Client Library
//!
//! This library talks to the Trimify REST API: account management, short URL
//! creation and maintenance, QR codes and click analytics. Every call runs
//! through one HTTP pipeline that attaches the stored bearer token and
//! transparently refreshes it once when the API answers `401`.
//!
//! # Modules
//!
//! - `api` - Typed endpoint groups (auth, urls, users)
//! - `app` - Application context built once at start-up
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `error` - Error taxonomy shared by every layer
//! - `http` - Request pipeline: transport, middleware stages, client
//! - `management` - Durable token storage
//! - `session` - Token decoding, session state machine and route guard
//! - `types` - Data structures and type definitions
//! - `validate` - Client-side form validation
//!
//! # Example
//!
//! ```
//! use trimify::{app::App, config, types::Credentials};
//!
//! #[tokio::main]
//! async fn main() -> trimify::Res<()> {
//!     config::load_env().await?;
//!     let app = App::from_config()?;
//!     app.session
//!         .login(&Credentials::new("a@b.com", "secret"))
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod management;
pub mod session;
pub mod types;
pub mod validate;

/// Result alias used across the crate.
///
/// Every fallible library operation reports one of the [`error::ApiError`]
/// variants so callers can tell an expired session apart from a network
/// failure or a rejected form.
pub type Res<T> = std::result::Result<T, error::ApiError>;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Fetching {} short URLs", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```
/// success!("Short URL created: {}", short_url);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only meant for the command-line front-end. Library code returns
/// [`Res`] instead of calling this.
///
/// # Example
///
/// ```
/// error!("Failed to load configuration");
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// # Example
///
/// ```
/// warning!("You are not signed in. Run `trimify login` first.");
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
