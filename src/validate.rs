//! Client-side form validation.
//!
//! These checks only save a round trip; the API validates everything again.

use reqwest::Url;

use crate::{
    Res,
    error::ApiError,
    types::{Credentials, PasswordChange, Registration, ShortenRequest},
};

pub const MAX_USERNAME_LEN: usize = 150;
pub const MAX_EMAIL_LEN: usize = 255;
pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 128;

fn invalid<T>(message: impl Into<String>) -> Res<T> {
    Err(ApiError::Validation(message.into()))
}

pub fn email(email: &str) -> Res<()> {
    if email.is_empty() {
        return invalid("Email is required");
    }
    if email.chars().count() > MAX_EMAIL_LEN {
        return invalid(format!("Email must be {MAX_EMAIL_LEN} characters or fewer"));
    }
    if !is_email_shaped(email) {
        return invalid("Please enter a valid email address");
    }
    Ok(())
}

// local@domain.tld, tld letters only and at least two of them
fn is_email_shaped(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    let local_ok = !local.is_empty()
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "._%+-".contains(c));
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    let host_ok = !host.is_empty()
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
    let tld_ok = tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic());

    local_ok && host_ok && tld_ok
}

pub fn username(username: &str) -> Res<()> {
    if username.is_empty() {
        return invalid("Username is required");
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return invalid(format!(
            "Username must be {MAX_USERNAME_LEN} characters or fewer"
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || "_.@+-".contains(c))
    {
        return invalid("Username can only contain letters, digits and @/./+/-/_");
    }
    Ok(())
}

pub fn new_password(password: &str, confirmation: &str) -> Res<()> {
    if password.is_empty() {
        return invalid("Password is required");
    }
    let len = password.chars().count();
    if len > MAX_PASSWORD_LEN {
        return invalid(format!(
            "Password must be {MAX_PASSWORD_LEN} characters or fewer"
        ));
    }
    if len < MIN_PASSWORD_LEN {
        return invalid(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        ));
    }
    if password != confirmation {
        return invalid("Passwords do not match");
    }
    Ok(())
}

pub fn credentials(credentials: &Credentials) -> Res<()> {
    email(&credentials.email)?;
    if credentials.password.is_empty() {
        return invalid("Password is required");
    }
    Ok(())
}

pub fn registration(registration: &Registration, confirmation: &str) -> Res<()> {
    username(&registration.username)?;
    email(&registration.email)?;
    new_password(&registration.password, confirmation)
}

pub fn password_change(change: &PasswordChange) -> Res<()> {
    if change.current_password.is_empty() {
        return invalid("Current password is required");
    }
    new_password(&change.new_password, &change.confirm_password)
}

pub fn shorten(request: &ShortenRequest) -> Res<()> {
    if request.original_url.trim().is_empty() {
        return invalid("Please enter a URL");
    }
    match Url::parse(request.original_url.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {}
        _ => return invalid("Please enter a valid http(s) URL"),
    }
    Ok(())
}
