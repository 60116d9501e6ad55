use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use sporlauth::{
    Error,
    management::TokenGuard,
    spotify::{
        auth::TokenExchanger,
        client::Client,
        transport::{AuthenticatedTransport, Body, read_json},
    },
    types::{AuthToken, Credentials, TokenResponse},
};
use wiremock::{
    Mock, MockServer, Request, ResponseTemplate,
    matchers::{bearer_token, body_json, header, method, path, query_param},
};

#[derive(Debug, Deserialize)]
struct Profile {
    id: String,
}

fn transport(server: &MockServer, access: &str) -> AuthenticatedTransport {
    AuthenticatedTransport::new(server.uri(), Arc::new(TokenGuard::fixed(access))).unwrap()
}

#[tokio::test]
async fn test_get_sends_bearer_token_and_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/me/top/tracks"))
        .and(bearer_token("access-1"))
        .and(query_param("limit", "5"))
        .and(header("accept-language", "de"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "top" })))
        .expect(1)
        .mount(&server)
        .await;

    let response = transport(&server, "access-1")
        .get(
            "/v1/me/top/tracks",
            &[("accept-language", "de")],
            &[("limit", "5")],
        )
        .await
        .unwrap();

    let body: Profile = read_json(response).await.unwrap();
    assert_eq!(body.id, "top");
}

#[tokio::test]
async fn test_put_sends_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/v1/me/player/volume"))
        .and(bearer_token("access-1"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({ "volume_percent": 40 })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let response = transport(&server, "access-1")
        .put(
            "/v1/me/player/volume",
            &[],
            &[],
            Body::json(&json!({ "volume_percent": 40 })).unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), 204);
}

#[tokio::test]
async fn test_post_and_delete_without_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/me/player/next"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v1/me/tracks"))
        .and(query_param("ids", "a,b"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let transport = transport(&server, "access-1");
    let next = transport
        .post("/v1/me/player/next", &[], &[], Body::Empty)
        .await
        .unwrap();
    let removed = transport
        .delete("/v1/me/tracks", &[], &[("ids", "a,b")], Body::Empty)
        .await
        .unwrap();

    assert_eq!(next.status(), 204);
    assert_eq!(removed.status(), 200);
}

async fn only_request(server: &MockServer) -> Request {
    let mut requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    requests.remove(0)
}

fn values(request: &Request, name: &str) -> Vec<String> {
    request
        .headers
        .get_all(name)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_caller_content_type_replaces_default() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/v1/playlists/p/images"))
        .respond_with(ResponseTemplate::new(202))
        .mount(&server)
        .await;

    let response = transport(&server, "tok")
        .put(
            "/v1/playlists/p/images",
            &[("Content-Type", "image/jpeg")],
            &[],
            Body::json("b64data").unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), 202);

    let request = only_request(&server).await;
    assert_eq!(values(&request, "content-type"), ["image/jpeg"]);
    assert_eq!(request.body, br#""b64data""#);
}

#[tokio::test]
async fn test_guarded_token_wins_over_caller_authorization() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    transport(&server, "tok")
        .get("/v1/me", &[("Authorization", "Bearer other")], &[])
        .await
        .unwrap();

    let request = only_request(&server).await;
    assert_eq!(values(&request, "authorization"), ["Bearer tok"]);
}

#[tokio::test]
async fn test_raw_bytes_body_with_caller_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(202))
        .mount(&server)
        .await;

    transport(&server, "tok")
        .put(
            "/v1/playlists/p/images",
            &[("Content-Type", "image/jpeg")],
            &[],
            Body::bytes(b"\xff\xd8jpeg".to_vec()),
        )
        .await
        .unwrap();

    let request = only_request(&server).await;
    assert_eq!(values(&request, "content-type"), ["image/jpeg"]);
    assert_eq!(request.body, b"\xff\xd8jpeg");
}

#[tokio::test]
async fn test_form_body_is_url_encoded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/users/u/playlists"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    transport(&server, "tok")
        .post(
            "/v1/users/u/playlists",
            &[],
            &[],
            Body::form([("name", "road trip"), ("public", "false")]),
        )
        .await
        .unwrap();

    let request = only_request(&server).await;
    assert_eq!(
        values(&request, "content-type"),
        ["application/x-www-form-urlencoded"]
    );
    assert_eq!(request.body, b"name=road+trip&public=false");
}

#[tokio::test]
async fn test_endpoint_without_leading_slash_reaches_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "user-1" })))
        .expect(1)
        .mount(&server)
        .await;

    let response = transport(&server, "tok").get("v1/me", &[], &[]).await.unwrap();
    let profile: Profile = read_json(response).await.unwrap();

    assert_eq!(profile.id, "user-1");
}

#[tokio::test]
async fn test_malformed_caller_header_fails_before_sending() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = transport(&server, "tok")
        .get("/v1/me", &[("bad header", "x")], &[])
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidHeader { .. }));
}

#[tokio::test]
async fn test_read_json_maps_api_error_object() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "status": 401, "message": "The access token expired" }
        })))
        .mount(&server)
        .await;

    let response = transport(&server, "revoked")
        .get("/v1/me", &[], &[])
        .await
        .unwrap();
    let err = read_json::<Profile>(response).await.unwrap_err();

    match err {
        Error::Api(api) => {
            assert_eq!(api.status, 401);
            assert_eq!(api.message, "The access token expired");
        }
        other => panic!("expected api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_read_json_keeps_raw_body_for_unknown_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let response = transport(&server, "t").get("/v1/me", &[], &[]).await.unwrap();
    let err = read_json::<Profile>(response).await.unwrap_err();

    match err {
        Error::Api(api) => {
            assert_eq!(api.status, 503);
            assert_eq!(api.message, "upstream down");
        }
        other => panic!("expected api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_api_is_transport_error() {
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let transport = AuthenticatedTransport::new(
        format!("http://127.0.0.1:{port}"),
        Arc::new(TokenGuard::fixed("t")),
    )
    .unwrap();

    let err = transport.get("/v1/me", &[], &[]).await.unwrap_err();

    assert!(matches!(err, Error::Transport(_)));
}

#[tokio::test]
async fn test_expired_token_is_refreshed_before_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "refreshed",
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/me"))
        .and(bearer_token("refreshed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "user-1" })))
        .expect(2)
        .mount(&server)
        .await;

    let mut stale = AuthToken::from_response(
        TokenResponse {
            access_token: "stale".to_string(),
            token_type: "Bearer".to_string(),
            expires_in: 3600,
            scope: None,
            refresh_token: Some("refresh".to_string()),
        },
        Utc::now(),
    );
    stale.expires_at = Utc::now();

    let exchanger = TokenExchanger::new(
        Credentials::new("id", "secret", "http://127.0.0.1:8080/callback"),
        format!("{}/api/token", server.uri()),
    )
    .unwrap();
    let client = Client::from_token(stale, Arc::new(exchanger), &server.uri()).unwrap();

    for _ in 0..2 {
        let response = client.transport().get("/v1/me", &[], &[]).await.unwrap();
        let profile: Profile = read_json(response).await.unwrap();
        assert_eq!(profile.id, "user-1");
    }

    let token = client.token().await;
    assert_eq!(token.access_token, "refreshed");
    assert_eq!(token.refresh_token, "refresh");
}
