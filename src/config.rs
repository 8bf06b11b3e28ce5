//! Configuration management for the Trimify CLI.
//!
//! Configuration values come from environment variables, optionally seeded
//! from a `.env` file in the local data directory:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Built-in defaults

use std::{env, path::PathBuf, time::Duration};

use crate::{Res, error::ApiError};

pub const DEFAULT_API_URL: &str = "https://link-trimify.vercel.app";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Returns the directory where Trimify keeps its `.env` and session files.
///
/// - Linux: `~/.local/share/trimify`
/// - macOS: `~/Library/Application Support/trimify`
/// - Windows: `%LOCALAPPDATA%/trimify`
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("trimify");
    path
}

/// Loads environment variables from `<data dir>/.env`.
///
/// Creates the data directory if it doesn't exist. A missing `.env` file is
/// not an error; every setting has a default. Variables already present in
/// the process environment are never overwritten.
///
/// # Errors
///
/// Returns [`ApiError::Io`] when the data directory cannot be created and
/// [`ApiError::Config`] when the `.env` file exists but cannot be parsed.
pub async fn load_env() -> Res<()> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| {
            ApiError::Config(format!("cannot load {}: {}", path.display(), e))
        })?;
    }
    Ok(())
}

/// Base URL of the remote API (`TRIMIFY_API_URL`), without trailing slash.
pub fn api_url() -> String {
    env::var("TRIMIFY_API_URL")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string())
        .trim_end_matches('/')
        .to_string()
}

/// Location of the durable token store (`TRIMIFY_TOKEN_FILE`).
pub fn token_file() -> PathBuf {
    match env::var("TRIMIFY_TOKEN_FILE") {
        Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
        _ => data_dir().join("session.json"),
    }
}

/// Per-request timeout (`TRIMIFY_TIMEOUT_SECS`).
///
/// Unparseable or zero values fall back to the default.
pub fn request_timeout() -> Duration {
    let secs = env::var("TRIMIFY_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    Duration::from_secs(secs)
}

/// Diagnostic log filter in `tracing` EnvFilter syntax (`TRIMIFY_LOG`).
pub fn log_filter() -> String {
    env::var("TRIMIFY_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string())
}
