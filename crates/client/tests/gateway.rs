mod common;

use common::{dead_url, spawn_identity};
use voxgate_auth::{AuthError, Role, SessionGrant};
use voxgate_client::{AuthGateway, HttpGateway};

fn gateway(base_url: &str) -> HttpGateway {
    HttpGateway::new(reqwest::Client::new(), base_url)
}

#[tokio::test]
async fn form_login_returns_grant_with_submitted_username() {
    let (server, identity) = spawn_identity().await;

    let grant = gateway(&server.base_url)
        .authenticate("alice", "pw1")
        .await
        .unwrap();

    // The fake server only accepts form bodies and answers with a different
    // `username`; the grant must carry what was submitted.
    assert_eq!(grant, SessionGrant::new("t1", "alice", Role::Transcriber));
    assert_eq!(identity.request_count(), 1);
}

#[tokio::test]
async fn rejected_credentials_are_invalid_credentials() {
    let (server, identity) = spawn_identity().await;

    let err = gateway(&server.base_url)
        .authenticate("bob", "wrong")
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::InvalidCredentials(_)), "{err:?}");
    assert_eq!(identity.request_count(), 1, "no retries");
}

#[tokio::test]
async fn missing_role_is_malformed() {
    let (server, _) = spawn_identity().await;

    let err = gateway(&server.base_url)
        .authenticate("norole", "pw")
        .await
        .unwrap_err();

    assert_eq!(err, AuthError::malformed("Role not provided by server"));
}

#[tokio::test]
async fn unknown_role_is_malformed() {
    let (server, _) = spawn_identity().await;

    let err = gateway(&server.base_url)
        .authenticate("mallory", "pw")
        .await
        .unwrap_err();

    match err {
        AuthError::MalformedResponse(msg) => assert!(msg.contains("superuser"), "{msg}"),
        other => panic!("expected malformed response, got {other:?}"),
    }
}

#[tokio::test]
async fn non_json_success_body_is_malformed() {
    let (server, _) = spawn_identity().await;

    let err = gateway(&server.base_url)
        .authenticate("garbled", "pw")
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::MalformedResponse(_)), "{err:?}");
}

#[tokio::test]
async fn backend_collector_spelling_is_accepted() {
    let (server, _) = spawn_identity().await;

    let grant = gateway(&server.base_url)
        .authenticate("carol", "pw")
        .await
        .unwrap();

    assert_eq!(grant.role, Role::DataCollector);
}

#[tokio::test]
async fn unreachable_endpoint_is_invalid_credentials() {
    let err = gateway(&dead_url().await)
        .authenticate("alice", "pw1")
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::InvalidCredentials(_)), "{err:?}");
}

#[tokio::test]
async fn empty_fields_fail_without_a_request() {
    let (server, identity) = spawn_identity().await;
    let gw = gateway(&server.base_url);

    for (user, pass) in [("", "pw"), ("alice", ""), ("", "")] {
        let err = gw.authenticate(user, pass).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials(_)));
    }
    assert_eq!(identity.request_count(), 0);
}

#[test]
fn token_url_is_under_api_root() {
    let gw = HttpGateway::new(reqwest::Client::new(), "http://localhost:8000/");
    assert_eq!(gw.token_url(), "http://localhost:8000/token");
}
