#![expect(clippy::expect_used)]

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use webterm_protocol::{FailureClass, HistoryEntry, RemoteDirectoryClient};
use webterm_remote_client::{HttpRemoteClient, RemoteClientConfig};

const TOKEN: &str = "test-session-token";

fn client_for(server: &MockServer) -> HttpRemoteClient {
    let config = RemoteClientConfig::new(server.uri(), TOKEN);
    HttpRemoteClient::new(config).unwrap_or_else(|e| panic!("client construction failed: {e}"))
}

#[tokio::test]
async fn probe_returns_cwd_and_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/cd"))
        .and(header("Authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "cwd": "/test" })))
        .expect(1)
        .mount(&server)
        .await;

    let cwd = client_for(&server)
        .probe_directory()
        .await
        .unwrap_or_else(|e| panic!("probe failed: {e}"));
    assert_eq!(cwd, "/test");
}

#[tokio::test]
async fn change_directory_posts_full_command_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/cd"))
        .and(body_json(json!({ "command": "cd /test2" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "cwd": "/test2" })))
        .expect(1)
        .mount(&server)
        .await;

    let cwd = client_for(&server)
        .change_directory("cd /test2")
        .await
        .unwrap_or_else(|e| panic!("change failed: {e}"));
    assert_eq!(cwd, "/test2");
}

#[tokio::test]
async fn list_directory_passes_options_as_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/ls"))
        .and(query_param("options", "-l -a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ls": "file1 file2" })))
        .expect(1)
        .mount(&server)
        .await;

    let listing = client_for(&server)
        .list_directory("-l -a")
        .await
        .unwrap_or_else(|e| panic!("ls failed: {e}"));
    assert_eq!(listing, "file1 file2");
}

#[tokio::test]
async fn fetch_history_decodes_entries_with_optional_cwd() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "command": "cd /a", "cwd": "/a" },
            { "command": "frobnicate" },
        ])))
        .mount(&server)
        .await;

    let entries = client_for(&server)
        .fetch_history()
        .await
        .unwrap_or_else(|e| panic!("history failed: {e}"));
    assert_eq!(
        entries,
        vec![
            HistoryEntry {
                command: "cd /a".to_string(),
                cwd: Some("/a".to_string()),
            },
            HistoryEntry {
                command: "frobnicate".to_string(),
                cwd: None,
            },
        ]
    );
}

#[tokio::test]
async fn non_success_status_maps_to_protocol_failure_with_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/ls"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "error": "no such directory" })),
        )
        .mount(&server)
        .await;

    let failure = client_for(&server)
        .list_directory("")
        .await
        .expect_err("expected failure");
    assert_eq!(failure.class, FailureClass::Protocol);
    assert_eq!(failure.message.as_deref(), Some("no such directory"));
}

#[tokio::test]
async fn non_success_status_without_error_body_has_no_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/cd"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let failure = client_for(&server)
        .change_directory("cd /nowhere")
        .await
        .expect_err("expected failure");
    assert_eq!(failure.class, FailureClass::Protocol);
    assert_eq!(failure.message, None);
}

#[tokio::test]
async fn unauthorized_is_classified_as_transport() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/cd"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "error": "token expired" })))
        .mount(&server)
        .await;

    let failure = client_for(&server)
        .probe_directory()
        .await
        .expect_err("expected failure");
    assert_eq!(failure.class, FailureClass::Transport);
    assert_eq!(failure.message.as_deref(), Some("token expired"));
}

#[tokio::test]
async fn undecodable_success_payload_is_a_protocol_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/ls"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "unexpected": true })))
        .mount(&server)
        .await;

    let failure = client_for(&server)
        .list_directory("-l")
        .await
        .expect_err("expected failure");
    assert_eq!(failure.class, FailureClass::Protocol);
    assert_eq!(failure.message, None);
}

#[tokio::test]
async fn unreachable_server_is_a_transport_failure() {
    // Nothing listens on the mock server's port once it is dropped.
    // A pooled server (`MockServer::start`) stays alive after drop, so use
    // an unpooled one that actually shuts down.
    let dead_uri = {
        let server = MockServer::builder().start().await;
        server.uri()
    };

    let config = RemoteClientConfig::new(dead_uri, TOKEN);
    let client =
        HttpRemoteClient::new(config).unwrap_or_else(|e| panic!("client construction failed: {e}"));
    let failure = client
        .probe_directory()
        .await
        .expect_err("expected transport failure");
    assert!(failure.is_transport());
    assert_eq!(failure.message, None);
}
