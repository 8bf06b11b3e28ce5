//! # API Module
//!
//! Typed wrappers around the Trimify REST endpoints. Each function takes the
//! shared [`crate::http::ApiClient`], so authentication and silent token
//! refresh apply uniformly.
//!
//! - [`auth`] - login and registration
//! - [`urls`] - short URL lifecycle, QR codes, stats and analytics
//! - [`users`] - profile, password and avatar management

pub mod auth;
pub mod urls;
pub mod users;
