use crate::{
    Res,
    http::{ApiClient, PendingRequest},
    types::{
        BulkRequest, ShortUrl, ShortenRequest, ShortenResponse, UpdateUrlRequest, UrlAnalytics,
        UserStats,
    },
};

pub async fn shorten(client: &ApiClient, request: &ShortenRequest) -> Res<ShortenResponse> {
    client.post_json("/shorten/", request).await
}

pub async fn list(client: &ApiClient) -> Res<Vec<ShortUrl>> {
    client.get_json("/urls/").await
}

pub async fn detail(client: &ApiClient, short_code: &str) -> Res<ShortUrl> {
    client.get_json(&format!("/urls/{short_code}/")).await
}

pub async fn update(
    client: &ApiClient,
    short_code: &str,
    update: &UpdateUrlRequest,
) -> Res<ShortUrl> {
    client
        .put_json(&format!("/urls/{short_code}/edit/"), update)
        .await
}

pub async fn delete(client: &ApiClient, short_code: &str) -> Res<()> {
    client.delete(&format!("/urls/{short_code}/delete/")).await
}

pub async fn toggle(client: &ApiClient, short_code: &str) -> Res<()> {
    client
        .execute(PendingRequest::post(format!("/urls/{short_code}/toggle/")))
        .await?;
    Ok(())
}

pub async fn bulk_delete(client: &ApiClient, short_codes: &[String]) -> Res<()> {
    client
        .post_unit(
            "/urls/bulk/delete/",
            &BulkRequest {
                short_codes: short_codes.to_vec(),
            },
        )
        .await
}

pub async fn bulk_toggle(client: &ApiClient, short_codes: &[String]) -> Res<()> {
    client
        .post_unit(
            "/urls/bulk/toggle/",
            &BulkRequest {
                short_codes: short_codes.to_vec(),
            },
        )
        .await
}

/// Raw per-URL counters from `GET /stats/{code}/`.
pub async fn stats(client: &ApiClient, short_code: &str) -> Res<UrlAnalytics> {
    client.get_json(&format!("/stats/{short_code}/")).await
}

pub async fn analytics(client: &ApiClient, short_code: &str) -> Res<UrlAnalytics> {
    client.get_json(&format!("/analytics/{short_code}/")).await
}

/// PNG image bytes.
pub async fn qr_code(client: &ApiClient, short_code: &str) -> Res<Vec<u8>> {
    client.get_bytes(&format!("/qr/{short_code}/")).await
}

pub async fn user_stats(client: &ApiClient) -> Res<UserStats> {
    client.get_json("/user/stats/").await
}
