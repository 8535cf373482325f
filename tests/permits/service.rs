//! Decision service over raw TCP.

use std::net::SocketAddr;

use permitdesk::auth::create_token;
use permitdesk::config::{Auth, Config, Server as ServerConfig};
use permitdesk::routes::AccessModule;
use permitdesk::{ActingUser, Module, Role, Router, server};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

const SECRET: &str = "test-secret-that-is-at-least-32b!";

fn config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            allowed_origins: vec!["https://desk.airport.example".to_string()],
        },
        auth: Auth {
            jwt_secret: SECRET.to_string(),
            token_expiry_days: 1,
        },
        ..Default::default()
    }
}

async fn start() -> (server::Server, Config) {
    let config = config();
    let mut router = Router::new();
    AccessModule.routes(&mut router);
    let server = server::start(config.clone(), router.into_handle())
        .await
        .expect("failed to start decision service");
    (server, config)
}

fn token(config: &Config, user: &ActingUser) -> String {
    create_token(&config.auth, user).unwrap()
}

/// Send a raw HTTP/1.1 request with `Connection: close` and read the full response.
async fn raw_request(addr: SocketAddr, payload: &[u8]) -> String {
    let mut stream = TcpStream::connect(addr).await.expect("failed to connect");
    stream.write_all(payload).await.expect("failed to write");

    let mut buf = Vec::new();
    let _ = tokio::time::timeout(
        std::time::Duration::from_secs(5),
        stream.read_to_end(&mut buf),
    )
    .await;
    String::from_utf8_lossy(&buf).into_owned()
}

async fn post_json(addr: SocketAddr, path: &str, token: Option<&str>, body: &str) -> String {
    let auth = token
        .map(|t| format!("Authorization: Bearer {t}\r\n"))
        .unwrap_or_default();
    let request = format!(
        "POST {path} HTTP/1.1\r\nHost: localhost\r\n{auth}Content-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    raw_request(addr, request.as_bytes()).await
}

fn json_body(response: &str) -> serde_json::Value {
    let body = response.split("\r\n\r\n").nth(1).unwrap_or("");
    serde_json::from_str(body).unwrap_or_else(|e| panic!("bad body {body:?}: {e}"))
}

#[tokio::test]
async fn health_and_statuses() {
    let (server, _) = start().await;
    let addr = server.addr();

    let health = raw_request(
        addr,
        b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
    )
    .await;
    let statuses = raw_request(
        addr,
        b"GET /api/statuses HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
    )
    .await;
    server.shutdown().await.unwrap();

    assert!(health.starts_with("HTTP/1.1 200"), "{health}");
    let statuses = json_body(&statuses);
    assert_eq!(statuses.as_array().unwrap().len(), 6);
    assert_eq!(statuses[5]["nameEn"], "Cancelled");
    assert_eq!(statuses[5]["nameAr"], "ملغي");
}

#[tokio::test]
async fn access_for_owner_on_approved_permit() {
    let (server, config) = start().await;
    let token = token(&config, &ActingUser::new(7, [Role::User]));

    let response = post_json(
        server.addr(),
        "/api/permits/access",
        Some(&token),
        r#"{"permit":{"id":41,"status":"Approved","createdById":7,"isSigned":true}}"#,
    )
    .await;
    server.shutdown().await.unwrap();

    assert!(response.starts_with("HTTP/1.1 200"), "{response}");
    let access = json_body(&response);
    assert_eq!(access["editMode"], "limited");
    assert_eq!(access["canInitiateChange"], true);
    assert_eq!(access["allowedTargets"], serde_json::json!(["InProgress"]));
    assert_eq!(access["canExport"], true);
    assert_eq!(
        access["enabledFields"],
        serde_json::json!(["timings.actualEndDate", "timings.actualEndTime"])
    );
}

#[tokio::test]
async fn access_for_new_permit() {
    let (server, config) = start().await;
    let token = token(&config, &ActingUser::new(3, [Role::Supervisor]));

    let response = post_json(server.addr(), "/api/permits/access", Some(&token), "{}").await;
    server.shutdown().await.unwrap();

    let access = json_body(&response);
    assert_eq!(access["editMode"], "full");
    assert_eq!(access["allowedTargets"], serde_json::json!([]));
    assert!(access["exportHint"].is_null());
}

#[tokio::test]
async fn bodiless_access_request_is_a_new_permit() {
    let (server, config) = start().await;
    let token = token(&config, &ActingUser::new(3, [Role::User]));

    let request = format!(
        "POST /api/permits/access HTTP/1.1\r\nHost: localhost\r\nAuthorization: Bearer {token}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
    );
    let response = raw_request(server.addr(), request.as_bytes()).await;
    server.shutdown().await.unwrap();

    assert!(response.starts_with("HTTP/1.1 200"), "{response}");
    let access = json_body(&response);
    assert_eq!(access["editMode"], "full");
    assert_eq!(access["canInitiateChange"], false);
}

#[tokio::test]
async fn access_requires_token() {
    let (server, _) = start().await;

    let response = post_json(server.addr(), "/api/permits/access", None, "{}").await;
    server.shutdown().await.unwrap();

    assert!(response.starts_with("HTTP/1.1 401"), "{response}");
    assert!(response.to_ascii_lowercase().contains("application/problem+json"));
}

#[tokio::test]
async fn unsigned_approval_is_refused() {
    let (server, config) = start().await;
    let token = token(&config, &ActingUser::new(1, [Role::Admin]));
    let permit = r#"{"id":42,"status":"Pending","createdById":7,"isSigned":false}"#;

    let refused = post_json(
        server.addr(),
        "/api/permits/transitions",
        Some(&token),
        &format!(r#"{{"permit":{permit},"target":"Approved"}}"#),
    )
    .await;
    let allowed = post_json(
        server.addr(),
        "/api/permits/transitions",
        Some(&token),
        &format!(r#"{{"permit":{permit},"target":"Rejected"}}"#),
    )
    .await;
    server.shutdown().await.unwrap();

    assert!(refused.starts_with("HTTP/1.1 409"), "{refused}");
    assert!(json_body(&refused)["detail"].as_str().unwrap().contains("signed"));
    assert!(allowed.starts_with("HTTP/1.1 204"), "{allowed}");
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let (server, config) = start().await;
    let token = token(&config, &ActingUser::new(1, [Role::Admin]));

    let response = post_json(
        server.addr(),
        "/api/permits/transitions",
        Some(&token),
        r#"{"permit":{"id":1},"target":"Sideways"}"#,
    )
    .await;
    server.shutdown().await.unwrap();

    assert!(response.starts_with("HTTP/1.1 400"), "{response}");
}

#[tokio::test]
async fn rejects_oversized_body() {
    let (server, _) = start().await;

    let response = raw_request(
        server.addr(),
        b"POST /api/permits/access HTTP/1.1\r\nHost: localhost\r\nContent-Length: 10485760\r\nConnection: close\r\n\r\n",
    )
    .await;
    server.shutdown().await.unwrap();

    assert!(response.contains("413"), "Expected 413, got:\n{response}");
}

#[tokio::test]
async fn cors_only_for_allowed_origins() {
    let (server, _) = start().await;
    let addr = server.addr();

    let allowed = raw_request(
        addr,
        b"GET /health HTTP/1.1\r\nHost: localhost\r\nOrigin: https://desk.airport.example\r\nConnection: close\r\n\r\n",
    )
    .await
    .to_ascii_lowercase();
    let foreign = raw_request(
        addr,
        b"GET /health HTTP/1.1\r\nHost: localhost\r\nOrigin: https://evil.example\r\nConnection: close\r\n\r\n",
    )
    .await
    .to_ascii_lowercase();
    let preflight = raw_request(
        addr,
        b"OPTIONS /api/permits/access HTTP/1.1\r\nHost: localhost\r\nOrigin: https://desk.airport.example\r\nConnection: close\r\n\r\n",
    )
    .await
    .to_ascii_lowercase();
    server.shutdown().await.unwrap();

    assert!(allowed.contains("access-control-allow-origin: https://desk.airport.example"));
    assert!(!foreign.contains("access-control-allow-origin"));
    assert!(preflight.starts_with("http/1.1 204"), "{preflight}");
    assert!(preflight.contains("access-control-allow-headers"));
}

#[tokio::test]
async fn security_headers_and_unknown_routes() {
    let (server, _) = start().await;
    let addr = server.addr();

    let missing = raw_request(
        addr,
        b"GET /api/nothing HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
    )
    .await;
    let wrong_method = raw_request(
        addr,
        b"GET /api/permits/access HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
    )
    .await;
    server.shutdown().await.unwrap();

    assert!(missing.starts_with("HTTP/1.1 404"), "{missing}");
    assert!(wrong_method.starts_with("HTTP/1.1 405"), "{wrong_method}");
    let lower = missing.to_ascii_lowercase();
    assert!(lower.contains("x-content-type-options: nosniff"));
    assert!(lower.contains("x-frame-options: deny"));
}

#[tokio::test]
async fn closes_slow_connections() {
    let (server, _) = start().await;

    let mut stream = TcpStream::connect(server.addr()).await.unwrap();
    stream
        .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\n")
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_secs(3)).await;

    let mut buf = vec![0u8; 4096];
    let result =
        tokio::time::timeout(std::time::Duration::from_secs(2), stream.read(&mut buf)).await;
    server.shutdown().await.unwrap();

    match result {
        Ok(Ok(0)) | Ok(Err(_)) => {}
        Ok(Ok(n)) => {
            let resp = String::from_utf8_lossy(&buf[..n]);
            assert!(resp.contains("408"), "Expected close or 408, got:\n{resp}");
        }
        Err(_) => panic!("slow connection was not closed"),
    }
}
