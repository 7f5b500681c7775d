//! Engine-level tests for clone, verify, confirm, and fan-out behavior.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use nbhctl_core::api::ConductorClient;
use nbhctl_core::error::Error;
use nbhctl_core::propagate::{EngineState, PropagationEngine, Verdict, name_contains};
use nbhctl_core::types::ResourcePath;

const BASE: &str = "/api/v1/config/candidate/authority";

fn nbh_collection(p: &ResourcePath) -> String {
    format!(
        "{BASE}/router/{}/node/{}/device-interface/{}/network-interface/{}/neighborhood",
        p.router, p.node, p.device_interface, p.network_interface
    )
}

fn names_body(names: &[&str]) -> serde_json::Value {
    json!(names.iter().map(|n| json!({ "name": n })).collect::<Vec<_>>())
}

async fn mount_neighborhoods(server: &MockServer, p: &ResourcePath, names: &[&str]) {
    Mock::given(method("GET"))
        .and(path(nbh_collection(p)))
        .respond_with(ResponseTemplate::new(200).set_body_json(names_body(names)))
        .mount(server)
        .await;
}

async fn mount_add(server: &MockServer, p: &ResourcePath, name: &str, status: u16) {
    Mock::given(method("POST"))
        .and(path(nbh_collection(p)))
        .and(body_json(json!({ "name": name })))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

fn client_for(server: &MockServer) -> ConductorClient {
    ConductorClient::with_token(&server.uri(), "test-token", false).unwrap()
}

fn spoke(n: usize) -> ResourcePath {
    ResourcePath::new(format!("spoke{n}"), "node0", "wan0", "wan-intf")
}

#[tokio::test]
async fn clone_then_verify_reaches_confirmation_gate() {
    let server = MockServer::start().await;
    let source = ResourcePath::new("hub1", "node0", "wan0", "wan-intf");
    Mock::given(method("POST"))
        .and(path(format!("{}/A/clone", nbh_collection(&source))))
        .and(body_json(json!({ "name": "C" })))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;
    mount_neighborhoods(&server, &source, &["A", "B", "C"]).await;
    let client = client_for(&server);

    let mut engine = PropagationEngine::new(&client).with_settle(Duration::ZERO);
    engine.clone_neighborhood(&source, "A", "C").await.unwrap();
    assert_eq!(engine.state(), EngineState::Verifying);
    engine.verify(&source, "C").await.unwrap();
    assert_eq!(engine.state(), EngineState::AwaitingConfirmation);
}

#[tokio::test]
async fn rejected_clone_aborts_before_any_fanout() {
    let server = MockServer::start().await;
    let source = ResourcePath::new("hub1", "node0", "wan0", "wan-intf");
    Mock::given(method("POST"))
        .and(path(format!("{}/A/clone", nbh_collection(&source))))
        .respond_with(ResponseTemplate::new(409))
        .mount(&server)
        .await;
    let client = client_for(&server);

    let mut engine = PropagationEngine::new(&client).with_settle(Duration::ZERO);
    let err = engine.clone_neighborhood(&source, "A", "C").await.unwrap_err();
    assert!(matches!(err, Error::Clone { .. }));
    assert_eq!(engine.state(), EngineState::Aborted);
}

#[tokio::test]
async fn failed_verification_aborts_and_touches_no_target() {
    let server = MockServer::start().await;
    let source = ResourcePath::new("hub1", "node0", "wan0", "wan-intf");
    Mock::given(method("POST"))
        .and(path(format!("{}/A/clone", nbh_collection(&source))))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    // Settle wait elapses but the clone never shows up.
    mount_neighborhoods(&server, &source, &["A", "B"]).await;
    let client = client_for(&server);

    let mut engine = PropagationEngine::new(&client).with_settle(Duration::ZERO);
    engine.clone_neighborhood(&source, "A", "C").await.unwrap();
    let err = engine.verify(&source, "C").await.unwrap_err();
    assert!(matches!(err, Error::VerificationFailed { .. }));
    assert_eq!(engine.state(), EngineState::Aborted);

    // No request ever hit a spoke: the only POST recorded is the clone.
    let posts: Vec<_> = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.method.as_str() == "POST")
        .collect();
    assert_eq!(posts.len(), 1);
    assert!(posts[0].url.path().ends_with("/A/clone"));
}

#[tokio::test]
async fn declined_confirmation_aborts() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    let mut engine = PropagationEngine::new(&client);

    assert!(!engine.confirm(false));
    assert_eq!(engine.state(), EngineState::Aborted);
}

#[tokio::test]
async fn fanout_adds_where_missing_and_skips_where_present() {
    let server = MockServer::start().await;
    let targets = vec![spoke(1), spoke(2), spoke(3)];
    mount_neighborhoods(&server, &targets[0], &["A"]).await;
    mount_neighborhoods(&server, &targets[1], &["A", "C"]).await;
    mount_neighborhoods(&server, &targets[2], &[]).await;
    mount_add(&server, &targets[0], "C", 201).await;
    mount_add(&server, &targets[2], "C", 201).await;
    let client = client_for(&server);

    let mut engine = PropagationEngine::new(&client);
    let report = engine.fan_out(&targets, "C", name_contains("wan")).await;

    assert_eq!(engine.state(), EngineState::Done);
    let verdicts: Vec<Verdict> = report.outcomes().iter().map(|o| o.verdict).collect();
    assert_eq!(verdicts, vec![Verdict::Added, Verdict::Skipped, Verdict::Added]);
    assert_eq!(report.added(), 2);
    assert_eq!(report.skipped(), 1);
    assert_eq!(report.failed(), 0);
}

#[tokio::test]
async fn one_failing_target_never_blocks_the_rest() {
    let server = MockServer::start().await;
    let targets = vec![spoke(1), spoke(2), spoke(3)];
    for t in &targets {
        mount_neighborhoods(&server, t, &["A"]).await;
    }
    mount_add(&server, &targets[0], "C", 201).await;
    mount_add(&server, &targets[1], "C", 500).await;
    mount_add(&server, &targets[2], "C", 201).await;
    let client = client_for(&server);

    let mut engine = PropagationEngine::new(&client);
    let report = engine.fan_out(&targets, "C", name_contains("wan")).await;

    let verdicts: Vec<Verdict> = report.outcomes().iter().map(|o| o.verdict).collect();
    assert_eq!(verdicts, vec![Verdict::Added, Verdict::Failed, Verdict::Added]);
    assert_eq!(report.outcomes()[1].path, targets[1]);
    assert!(report.outcomes()[1].detail.as_deref().unwrap().contains("500"));
}

#[tokio::test]
async fn second_identical_run_skips_everything() {
    // Run 1: nothing carries C yet.
    let server = MockServer::start().await;
    let targets = vec![spoke(1), spoke(2)];
    for t in &targets {
        mount_neighborhoods(&server, t, &["A"]).await;
        mount_add(&server, t, "C", 201).await;
    }
    let client = client_for(&server);
    let report = PropagationEngine::new(&client)
        .fan_out(&targets, "C", name_contains("wan"))
        .await;
    assert_eq!(report.added(), 2);
    assert_eq!(report.skipped(), 0);

    // Run 2: the backend now reports C everywhere; no add is issued.
    let server = MockServer::start().await;
    for t in &targets {
        mount_neighborhoods(&server, t, &["A", "C"]).await;
    }
    let client = client_for(&server);
    let report = PropagationEngine::new(&client)
        .fan_out(&targets, "C", name_contains("wan"))
        .await;
    assert_eq!(report.added(), 0);
    assert_eq!(report.skipped(), 2);
    assert!(
        server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .all(|r| r.method.as_str() == "GET")
    );
}

#[tokio::test]
async fn predicate_filters_targets_and_empty_result_is_not_an_error() {
    let server = MockServer::start().await;
    let lan = ResourcePath::new("spoke1", "node0", "lan0", "lan-intf");
    let client = client_for(&server);

    let mut engine = PropagationEngine::new(&client);
    let report = engine
        .fan_out(std::slice::from_ref(&lan), "C", name_contains("wan"))
        .await;

    assert!(report.is_empty());
    assert_eq!(engine.state(), EngineState::Done);
    assert!(server.received_requests().await.unwrap().is_empty());
}
