use std::path::Path;

use crate::{
    Res,
    error::ApiError,
    http::{ApiClient, PendingRequest},
    types::{PasswordChange, Profile, ProfileUpdate},
};

const PROFILE_PATH: &str = "/api/users/profile/";

pub async fn profile(client: &ApiClient) -> Res<Profile> {
    client.get_json(PROFILE_PATH).await
}

pub async fn update_profile(client: &ApiClient, update: &ProfileUpdate) -> Res<Profile> {
    client.put_json(PROFILE_PATH, update).await
}

pub async fn change_password(client: &ApiClient, change: &PasswordChange) -> Res<()> {
    client
        .post_unit("/api/users/change-password/", change)
        .await
}

pub async fn delete_account(client: &ApiClient) -> Res<()> {
    client.delete(PROFILE_PATH).await
}

/// Uploads `path` as the `avatar` multipart field.
pub async fn upload_avatar(client: &ApiClient, path: &Path) -> Res<()> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| ApiError::Validation(format!("{} is not a file", path.display())))?
        .to_string();
    let bytes = async_fs::read(path).await?;

    let request = PendingRequest::post("/api/users/avatar/").multipart(
        "avatar",
        file_name.clone(),
        image_mime(&file_name),
        bytes,
    );
    client.execute(request).await?;
    Ok(())
}

fn image_mime(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}
