//! Tests for the conductor client: login, bearer propagation, status sets.

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use nbhctl_core::api::ConductorClient;
use nbhctl_core::error::Error;
use nbhctl_core::types::ResourcePath;

const BASE: &str = "/api/v1/config/candidate/authority";

#[tokio::test]
async fn login_acquires_token_and_sends_it_as_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/login"))
        .and(body_json(json!({ "username": "admin", "password": "hunter2" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "jwt-abc" })))
        .mount(&server)
        .await;
    // Only a request carrying the freshly issued token matches.
    Mock::given(method("GET"))
        .and(path(format!("{BASE}/router")))
        .and(header("authorization", "Bearer jwt-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "name": "r1" }])))
        .mount(&server)
        .await;

    let mut client = ConductorClient::new(&server.uri(), false).unwrap();
    client.login("admin", "hunter2").await.unwrap();
    assert_eq!(client.routers().await.unwrap(), vec!["r1"]);
}

#[tokio::test]
async fn rejected_login_is_an_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let mut client = ConductorClient::new(&server.uri(), false).unwrap();
    let err = client.login("admin", "wrong").await.unwrap_err();
    assert!(matches!(err, Error::Auth(_)));
}

#[tokio::test]
async fn login_without_token_in_body_is_an_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .mount(&server)
        .await;

    let mut client = ConductorClient::new(&server.uri(), false).unwrap();
    let err = client.login("admin", "hunter2").await.unwrap_err();
    assert!(matches!(err, Error::Auth(_)));
}

#[tokio::test]
async fn accepted_mutation_statuses_include_204() {
    let server = MockServer::start().await;
    let target = ResourcePath::new("spoke1", "node0", "dev0", "wan0");
    Mock::given(method("POST"))
        .and(path(format!(
            "{BASE}/router/spoke1/node/node0/device-interface/dev0/network-interface/wan0/neighborhood"
        )))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = ConductorClient::with_token(&server.uri(), "t", false).unwrap();
    client.add_neighborhood(&target, "C").await.unwrap();
}

#[tokio::test]
async fn rejected_add_carries_the_target_path() {
    let server = MockServer::start().await;
    let target = ResourcePath::new("spoke1", "node0", "dev0", "wan0");
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let client = ConductorClient::with_token(&server.uri(), "t", false).unwrap();
    let err = client.add_neighborhood(&target, "C").await.unwrap_err();
    match err {
        Error::Apply { path, name, detail } => {
            assert_eq!(path, "spoke1/node0/dev0/wan0");
            assert_eq!(name, "C");
            assert!(detail.contains("403"), "detail: {detail}");
        }
        other => panic!("expected Apply, got {other:?}"),
    }
}
