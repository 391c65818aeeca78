//! Retry, timeout and header behavior of `Session`.
//!
//! These tests use wiremock to simulate a flaky server and count how often
//! each request is sent.

use std::time::Duration;

use konfuzio::{DatasetStatus, DocumentUpdate, KonfuzioError, Session, SessionBuilder};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn session_for(server: &MockServer) -> Session {
    SessionBuilder::new()
        .token("test-token")
        .host(server.uri())
        .backoff_factor(0.0)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_token_header_sent_on_every_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/projects/1/"))
        .and(header("Authorization", "Token test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1, "name": "Invoices"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let session = session_for(&mock_server);
    let project = session.get_project_details(1).await.unwrap();
    assert_eq!(project.name, "Invoices");
}

#[tokio::test]
async fn test_custom_auth_scheme() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/projects/1/"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1, "name": "Invoices"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let session = SessionBuilder::new()
        .token("test-token")
        .auth_scheme("Bearer")
        .host(mock_server.uri())
        .build()
        .unwrap();
    assert!(session.get_project_details(1).await.is_ok());
}

#[tokio::test]
async fn test_get_retried_until_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/projects/1/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/projects/1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1, "name": "Invoices"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let session = session_for(&mock_server);
    let project = session.get_project_details(1).await.unwrap();
    assert_eq!(project.id, 1);
}

#[tokio::test]
async fn test_get_gives_up_after_five_attempts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/projects/1/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(5)
        .mount(&mock_server)
        .await;

    let session = session_for(&mock_server);
    let err = session.get_project_details(1).await.unwrap_err();

    match err {
        KonfuzioError::TransientServer {
            status,
            attempts,
            url,
        } => {
            assert_eq!(status, 500);
            assert_eq!(attempts, 5);
            assert!(url.ends_with("/api/projects/1/"));
        }
        other => panic!("expected TransientServer, got {other:?}"),
    }
}

#[tokio::test]
async fn test_each_retry_status_is_retried() {
    for status in [429, 500, 502, 503, 504] {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/projects/1/"))
            .respond_with(ResponseTemplate::new(status))
            .expect(3)
            .mount(&mock_server)
            .await;

        let session = SessionBuilder::new()
            .token("test-token")
            .host(mock_server.uri())
            .backoff_factor(0.0)
            .max_attempts(3)
            .build()
            .unwrap();

        let err = session.get_project_details(1).await.unwrap_err();
        assert!(
            matches!(err, KonfuzioError::TransientServer { attempts: 3, .. }),
            "status {status}: {err:?}"
        );
    }
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/projects/1/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found."})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let session = session_for(&mock_server);
    let err = session.get_project_details(1).await.unwrap_err();

    match err {
        KonfuzioError::Api {
            status, message, ..
        } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Not found.");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_post_is_never_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/projects/"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let session = session_for(&mock_server);
    let err = session.create_project("Invoices").await.unwrap_err();

    assert!(
        matches!(err, KonfuzioError::Validation { status: 503, .. }),
        "got {err:?}"
    );
}

#[tokio::test]
async fn test_patch_is_never_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/api/v2/docs/8/"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&mock_server)
        .await;

    let session = session_for(&mock_server);
    let update = DocumentUpdate {
        file_name: "renamed.pdf".into(),
        dataset_status: DatasetStatus::Test,
        category_id: None,
    };
    let err = session.update_file(8, &update).await.unwrap_err();
    assert!(matches!(err, KonfuzioError::Validation { status: 502, .. }));
}

#[tokio::test]
async fn test_delete_is_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v2/docs/8/"))
        .respond_with(ResponseTemplate::new(504))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/v2/docs/8/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let session = session_for(&mock_server);
    session.delete_file(8).await.unwrap();
}

#[tokio::test]
async fn test_unauthorized_maps_to_authentication_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/projects/1/"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Invalid token."})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let session = session_for(&mock_server);
    let err = session.get_project_details(1).await.unwrap_err();
    assert!(matches!(err, KonfuzioError::Authentication { .. }));
}

#[tokio::test]
async fn test_timeout_surfaces_as_http_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/projects/1/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": 1, "name": "Slow"}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let session = SessionBuilder::new()
        .token("test-token")
        .host(mock_server.uri())
        .timeout(Duration::from_millis(100))
        .max_attempts(2)
        .backoff_factor(0.0)
        .build()
        .unwrap();

    let err = session.get_project_details(1).await.unwrap_err();
    match err {
        KonfuzioError::Http(e) => assert!(e.is_timeout()),
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn test_post_is_resent_when_connection_is_refused() {
    // Reserve a port, then leave it closed until after the first attempts.
    let reserved = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = reserved.local_addr().unwrap();
    drop(reserved);

    let session = SessionBuilder::new()
        .token("test-token")
        .host(format!("http://{addr}"))
        .max_attempts(5)
        .backoff_factor(0.5)
        .build()
        .unwrap();

    // Attempts 1 and 2 hit the closed port; attempt 3 goes out a second later.
    let pending = tokio::spawn(async move { session.create_project("Invoices").await });
    tokio::time::sleep(Duration::from_millis(200)).await;

    let listener = std::net::TcpListener::bind(addr).unwrap();
    let mock_server = MockServer::builder().listener(listener).start().await;
    Mock::given(method("POST"))
        .and(path("/api/projects/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 7})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let id = pending.await.unwrap().unwrap();
    assert_eq!(id, 7);
}

#[tokio::test]
async fn test_refused_connection_surfaces_after_budget() {
    let reserved = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = reserved.local_addr().unwrap();
    drop(reserved);

    let session = SessionBuilder::new()
        .token("test-token")
        .host(format!("http://{addr}"))
        .max_attempts(3)
        .backoff_factor(0.0)
        .build()
        .unwrap();

    let err = session.create_project("Invoices").await.unwrap_err();
    match err {
        KonfuzioError::Http(e) => assert!(e.is_connect()),
        other => panic!("expected connection error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_post_timeout_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/projects/"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({"id": 7}))
                .set_delay(Duration::from_secs(2)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let session = SessionBuilder::new()
        .token("test-token")
        .host(mock_server.uri())
        .timeout(Duration::from_millis(100))
        .max_attempts(3)
        .backoff_factor(0.0)
        .build()
        .unwrap();

    let err = session.create_project("Invoices").await.unwrap_err();
    match err {
        KonfuzioError::Http(e) => assert!(e.is_timeout()),
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[test]
fn test_missing_token_is_rejected() {
    // No token and an empty environment override.
    std::env::set_var("KONFUZIO_TOKEN", "");
    let result = SessionBuilder::new().host("http://localhost:8000").build();
    assert!(matches!(result, Err(KonfuzioError::Authentication { .. })));
}
