use std::path::PathBuf;

use tabled::Table;

use crate::{
    api,
    app::App,
    error,
    session::View,
    success,
    types::{MetricTableRow, PasswordChange, ProfileUpdate},
    validate, warning,
};

use super::{fail, require, spinner};

pub async fn show(app: &App) {
    require(app, View::Profile);

    let pb = spinner("Loading profile...");
    let result = api::users::profile(&app.client).await;
    pb.finish_and_clear();

    let profile = match result {
        Ok(profile) => profile,
        Err(e) => fail(app, "Failed to load profile", e),
    };

    let mut rows = vec![
        field("username", profile.username),
        field("email", profile.email),
    ];
    if let Some(bio) = profile.bio.filter(|b| !b.is_empty()) {
        rows.push(field("bio", bio));
    }
    if let Some(avatar) = profile.avatar_url {
        rows.push(field("avatar", avatar));
    }
    if let Some(joined) = profile.date_joined {
        rows.push(field("joined", joined));
    }
    println!("{}", Table::new(rows));
}

pub async fn update(app: &App, update: ProfileUpdate) {
    require(app, View::Profile);

    if update.is_empty() {
        warning!("Nothing to change. Pass --username, --email and/or --bio.");
        return;
    }
    if let Some(username) = &update.username {
        if let Err(e) = validate::username(username) {
            error!("{}", e);
        }
    }
    if let Some(email) = &update.email {
        if let Err(e) = validate::email(email) {
            error!("{}", e);
        }
    }

    match api::users::update_profile(&app.client, &update).await {
        Ok(profile) => success!("Profile updated for {}", profile.username),
        Err(e) => fail(app, "Failed to update profile", e),
    }
}

pub async fn change_password(app: &App, change: PasswordChange) {
    require(app, View::Profile);

    if let Err(e) = validate::password_change(&change) {
        error!("{}", e);
    }

    match api::users::change_password(&app.client, &change).await {
        Ok(()) => success!("Password updated."),
        Err(e) => fail(app, "Failed to update password", e),
    }
}

pub async fn delete(app: &App, confirmed: bool) {
    require(app, View::Profile);

    if !confirmed {
        warning!("This deletes your account and every short URL. Re-run with --yes to confirm.");
        return;
    }

    match api::users::delete_account(&app.client).await {
        Ok(()) => {
            success!("Account deleted.");
            app.session.logout();
        }
        Err(e) => fail(app, "Failed to delete account", e),
    }
}

pub async fn avatar(app: &App, path: PathBuf) {
    require(app, View::Profile);

    let pb = spinner("Uploading avatar...");
    let result = api::users::upload_avatar(&app.client, &path).await;
    pb.finish_and_clear();

    match result {
        Ok(()) => success!("Avatar updated."),
        Err(e) => fail(app, "Failed to upload avatar", e),
    }
}

fn field(name: &str, value: String) -> MetricTableRow {
    MetricTableRow {
        metric: name.to_string(),
        value,
    }
}
