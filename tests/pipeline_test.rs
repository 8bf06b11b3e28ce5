mod common;

use std::sync::Arc;

use async_trait::async_trait;
use common::{Harness, YieldingTransport, harness, token_with_claims};
use reqwest::{Method, StatusCode};
use serde_json::{Value, json};
use trimify::{
    Res,
    error::ApiError,
    http::{
        ApiClient, ApiResponse, LOGIN_PATH, Middleware, Next, PendingRequest, REFRESH_PATH,
    },
    management::{MemoryTokenStore, TokenStore},
    session::View,
};

fn signed_in() -> Harness {
    harness(MemoryTokenStore::with_tokens("h.p1.s", "r"))
}

#[tokio::test]
async fn test_bearer_attached_from_store() {
    let h = signed_in();
    h.transport
        .respond(Method::GET, "/urls/", StatusCode::OK, json!([]));

    let urls: Vec<Value> = h.client.get_json("/urls/").await.unwrap();
    assert!(urls.is_empty());

    let sent = h.transport.requests_to("/urls/");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].authorization.as_deref(), Some("Bearer h.p1.s"));
}

#[tokio::test]
async fn test_request_without_token_is_unauthenticated() {
    let h = harness(MemoryTokenStore::new());
    h.transport
        .respond(Method::GET, "/urls/", StatusCode::OK, json!([]));

    h.client.get_json::<Vec<Value>>("/urls/").await.unwrap();

    assert_eq!(h.transport.requests()[0].authorization, None);
}

#[tokio::test]
async fn test_401_refreshes_once_and_retries_with_new_token() {
    let h = signed_in();
    h.transport.respond(
        Method::GET,
        "/urls/",
        StatusCode::UNAUTHORIZED,
        json!({"detail": "Given token not valid for any token type"}),
    );
    h.transport.respond(
        Method::GET,
        "/urls/",
        StatusCode::OK,
        json!([{"short_code": "abc", "original_url": "https://example.com"}]),
    );
    h.transport.respond(
        Method::POST,
        REFRESH_PATH,
        StatusCode::OK,
        json!({"access": "h.p2.s"}),
    );

    let urls: Vec<Value> = h.client.get_json("/urls/").await.unwrap();
    assert_eq!(urls[0]["short_code"], "abc");

    let sent = h.transport.requests();
    assert_eq!(sent.len(), 3);

    // original, refresh, retry - in that order
    assert_eq!(sent[0].path, "/urls/");
    assert_eq!(sent[0].authorization.as_deref(), Some("Bearer h.p1.s"));
    assert_eq!(sent[1].path, REFRESH_PATH);
    assert_eq!(sent[1].authorization, None);
    assert_eq!(sent[1].body, Some(json!({"refresh": "r"})));
    assert_eq!(sent[2].path, "/urls/");
    assert_eq!(sent[2].authorization.as_deref(), Some("Bearer h.p2.s"));
    assert!(sent[2].retried);

    // new access token stored, refresh token unchanged
    assert_eq!(h.store.access_token().as_deref(), Some("h.p2.s"));
    assert_eq!(h.store.refresh_token().as_deref(), Some("r"));
    assert!(h.navigator.views().is_empty());
}

#[tokio::test]
async fn test_second_401_never_triggers_second_refresh() {
    let h = signed_in();
    for _ in 0..2 {
        h.transport.respond(
            Method::GET,
            "/urls/",
            StatusCode::UNAUTHORIZED,
            json!({"detail": "still rejected"}),
        );
    }
    h.transport.respond(
        Method::POST,
        REFRESH_PATH,
        StatusCode::OK,
        json!({"access": "h.p2.s"}),
    );
    h.transport.respond(
        Method::POST,
        REFRESH_PATH,
        StatusCode::OK,
        json!({"access": "h.p3.s"}),
    );

    let err = h.client.get_json::<Vec<Value>>("/urls/").await.unwrap_err();

    match err {
        ApiError::AuthenticationExpired { detail } => assert_eq!(detail, "still rejected"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(h.transport.requests_to(REFRESH_PATH).len(), 1);
    assert_eq!(h.transport.requests_to("/urls/").len(), 2);
    assert_eq!(h.store.access_token().as_deref(), Some("h.p2.s"));
}

#[tokio::test]
async fn test_refresh_rejection_clears_store_and_redirects_to_login() {
    let h = signed_in();
    h.transport.respond(
        Method::GET,
        "/urls/",
        StatusCode::UNAUTHORIZED,
        json!({"detail": "expired"}),
    );
    h.transport.respond(
        Method::POST,
        REFRESH_PATH,
        StatusCode::UNAUTHORIZED,
        json!({"detail": "Token is invalid or expired", "code": "token_not_valid"}),
    );

    let err = h.client.get_json::<Vec<Value>>("/urls/").await.unwrap_err();

    match err {
        ApiError::AuthenticationInvalid { detail } => {
            assert_eq!(detail, "Token is invalid or expired")
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(h.store.access_token(), None);
    assert_eq!(h.store.refresh_token(), None);
    assert_eq!(h.navigator.views(), vec![View::Login]);

    // the original request is not re-sent after a failed refresh
    assert_eq!(h.transport.requests_to("/urls/").len(), 1);
}

#[tokio::test]
async fn test_refresh_server_error_is_propagated_to_caller() {
    let h = signed_in();
    h.transport
        .respond(Method::GET, "/user/stats/", StatusCode::UNAUTHORIZED, json!({}));
    h.transport.respond(
        Method::POST,
        REFRESH_PATH,
        StatusCode::BAD_GATEWAY,
        json!({}),
    );

    let err = h
        .client
        .get_json::<Value>("/user/stats/")
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::BAD_GATEWAY));
    assert_eq!(h.store.access_token(), None);
    assert_eq!(h.navigator.views(), vec![View::Login]);
}

#[tokio::test]
async fn test_missing_refresh_token_ends_session_without_refresh_call() {
    let h = harness(MemoryTokenStore::new());
    h.store.set_access("h.p1.s").unwrap();
    h.transport
        .respond(Method::GET, "/urls/", StatusCode::UNAUTHORIZED, json!({}));

    let err = h.client.get_json::<Vec<Value>>("/urls/").await.unwrap_err();

    assert!(matches!(err, ApiError::AuthenticationInvalid { .. }));
    assert!(h.transport.requests_to(REFRESH_PATH).is_empty());
    assert_eq!(h.store.access_token(), None);
    assert_eq!(h.navigator.views(), vec![View::Login]);
}

#[tokio::test]
async fn test_login_401_is_terminal() {
    let h = signed_in();
    h.transport.respond(
        Method::POST,
        LOGIN_PATH,
        StatusCode::UNAUTHORIZED,
        json!({"detail": "No active account found with the given credentials"}),
    );

    let err = h
        .client
        .post_json::<_, Value>(LOGIN_PATH, &json!({"email": "a@b.com", "password": "x"}))
        .await
        .unwrap_err();

    match err {
        ApiError::AuthenticationInvalid { detail } => {
            assert_eq!(detail, "No active account found with the given credentials")
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(h.transport.requests_to(REFRESH_PATH).is_empty());
    assert_eq!(h.store.refresh_token().as_deref(), Some("r"));
    assert!(h.navigator.views().is_empty());
}

#[tokio::test]
async fn test_other_failures_propagate_unchanged() {
    let h = signed_in();
    h.transport.respond(
        Method::POST,
        "/shorten/",
        StatusCode::BAD_REQUEST,
        json!({"custom_code": ["This code is already taken."]}),
    );
    h.transport.respond(
        Method::GET,
        "/urls/",
        StatusCode::INTERNAL_SERVER_ERROR,
        json!("boom"),
    );

    let err = h
        .client
        .post_json::<_, Value>("/shorten/", &json!({"original_url": "https://a.io"}))
        .await
        .unwrap_err();
    match err {
        ApiError::Server { status, detail } => {
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(detail, "custom_code: This code is already taken.");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let err = h.client.get_json::<Value>("/urls/").await.unwrap_err();
    match err {
        ApiError::Server { status, detail } => {
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(detail, "Internal Server Error");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert!(h.transport.requests_to(REFRESH_PATH).is_empty());
}

#[tokio::test]
async fn test_token_rotation_reaches_later_requests() {
    let h = signed_in();
    h.transport
        .respond(Method::GET, "/urls/", StatusCode::UNAUTHORIZED, json!({}));
    h.transport
        .respond(Method::GET, "/urls/", StatusCode::OK, json!([]));
    h.transport.respond(
        Method::POST,
        REFRESH_PATH,
        StatusCode::OK,
        json!({"access": "h.p2.s"}),
    );
    h.transport
        .respond(Method::GET, "/user/stats/", StatusCode::OK, json!({}));

    h.client.get_json::<Vec<Value>>("/urls/").await.unwrap();
    h.client.get_json::<Value>("/user/stats/").await.unwrap();

    let stats = h.transport.requests_to("/user/stats/");
    assert_eq!(stats[0].authorization.as_deref(), Some("Bearer h.p2.s"));
}

#[test]
fn test_default_stage_order() {
    let h = signed_in();
    assert_eq!(
        h.client.stage_names(),
        vec!["refresh-on-401", "bearer-auth", "request-log"]
    );
}

struct Offline;

#[async_trait]
impl Middleware for Offline {
    fn name(&self) -> &'static str {
        "offline"
    }

    async fn handle(&self, _request: &mut PendingRequest, _next: Next<'_>) -> Res<ApiResponse> {
        Ok(ApiResponse::from_json(
            StatusCode::OK,
            &json!({"served_by": "offline"}),
        ))
    }
}

#[tokio::test]
async fn test_stage_can_short_circuit_the_transport() {
    let h = signed_in();
    let client = ApiClient::with_stages(
        h.transport.clone(),
        h.store.clone() as Arc<dyn TokenStore>,
        vec![Arc::new(Offline) as Arc<dyn Middleware>],
    );

    let body: Value = client.get_json("/urls/").await.unwrap();

    assert_eq!(body["served_by"], "offline");
    assert!(h.transport.requests().is_empty());
}

#[tokio::test]
async fn test_refreshed_token_is_a_real_jwt() {
    // identity-bearing token flows through the store untouched
    let fresh = token_with_claims(json!({"sub": "42", "username": "ada"}));
    let h = signed_in();
    h.transport
        .respond(Method::GET, "/urls/", StatusCode::UNAUTHORIZED, json!({}));
    h.transport
        .respond(Method::GET, "/urls/", StatusCode::OK, json!([]));
    h.transport.respond(
        Method::POST,
        REFRESH_PATH,
        StatusCode::OK,
        json!({"access": fresh}),
    );

    h.client.get_json::<Vec<Value>>("/urls/").await.unwrap();

    assert_eq!(h.store.access_token(), Some(fresh));
}

#[tokio::test]
async fn test_concurrent_401s_each_refresh_independently() {
    let h = signed_in();
    for path in ["/a/", "/b/"] {
        h.transport
            .respond(Method::GET, path, StatusCode::UNAUTHORIZED, json!({}));
        h.transport
            .respond(Method::GET, path, StatusCode::OK, json!({"path": path}));
    }
    for access in ["h.p2.s", "h.p3.s"] {
        h.transport.respond(
            Method::POST,
            REFRESH_PATH,
            StatusCode::OK,
            json!({"access": access}),
        );
    }
    let client = ApiClient::new(
        Arc::new(YieldingTransport(h.transport.clone())),
        h.store.clone() as Arc<dyn TokenStore>,
        h.navigator.clone(),
    );

    let (a, b) = tokio::join!(
        client.get_json::<Value>("/a/"),
        client.get_json::<Value>("/b/"),
    );
    assert_eq!(a.unwrap()["path"], "/a/");
    assert_eq!(b.unwrap()["path"], "/b/");

    // no coalescing: one refresh per failed request
    let refreshes = h.transport.requests_to(REFRESH_PATH);
    assert_eq!(refreshes.len(), 2);
    assert!(refreshes.iter().all(|r| r.body == Some(json!({"refresh": "r"}))));

    for path in ["/a/", "/b/"] {
        let sent = h.transport.requests_to(path);
        assert_eq!(sent.len(), 2);
        assert!(!sent[0].retried);
        assert!(sent[1].retried);
    }

    // both requests were in flight before either refresh started
    let order: Vec<String> = h.transport.requests().into_iter().map(|r| r.path).collect();
    let first_refresh = order.iter().position(|p| p == REFRESH_PATH).unwrap();
    assert!(order[..first_refresh].contains(&"/a/".to_string()));
    assert!(order[..first_refresh].contains(&"/b/".to_string()));

    assert!(h.navigator.views().is_empty());
    assert!(h.store.access_token().is_some());
}
