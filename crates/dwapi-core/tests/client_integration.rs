//! Integration tests for the HTTP transport.
//!
//! These tests run the real reqwest client against a one-shot HTTP server on
//! the loopback interface and check the request body the server received.

use dwapi::{ClientOptions, DwApiClient, DwApiError, OrgCredential};
use serde_json::{json, Value};
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener};
use std::thread::JoinHandle;
use std::time::Duration;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// A request captured by [`serve_once`].
struct Captured {
    head: String,
    body: String,
}

/// Accept one connection, answer it with `status` and `body`, and return what
/// the client sent.
fn serve_once(status: &'static str, body: &'static str) -> (SocketAddr, JoinHandle<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback listener");
    let addr = listener.local_addr().unwrap();

    let handle = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept connection");
        stream
            .set_read_timeout(Some(Duration::from_secs(10)))
            .unwrap();

        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        let header_end = loop {
            let n = stream.read(&mut chunk).expect("read request");
            assert!(n > 0, "client closed before sending headers");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
        let content_length = head
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);

        while buf.len() < header_end + content_length {
            let n = stream.read(&mut chunk).expect("read request body");
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }
        let request_body = String::from_utf8_lossy(&buf[header_end..]).to_string();

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).unwrap();
        stream.flush().unwrap();

        Captured {
            head,
            body: request_body,
        }
    });

    (addr, handle)
}

fn endpoint(addr: SocketAddr) -> String {
    format!("http://{}/api", addr)
}

#[test]
fn test_ping_posts_envelope_with_null_auth() {
    init_tracing();
    let (addr, server) = serve_once("200 OK", r#"{"data":{"params":{}}}"#);

    let mut client = DwApiClient::new(ClientOptions::new(endpoint(addr))).unwrap();
    assert!(client.ping().unwrap());

    let captured = server.join().unwrap();
    assert!(captured.head.starts_with("POST /api HTTP/1.1"));
    assert!(captured
        .head
        .to_ascii_lowercase()
        .contains("content-type: application/json"));
    assert_eq!(
        captured.body,
        r#"{"auth":null,"data":{"command":"api.ping","params":{}}}"#
    );
    assert_eq!(client.last_sent(), Some(captured.body.as_str()));
}

#[test]
fn test_sub_second_timeout_still_reaches_server() {
    init_tracing();
    let (addr, server) = serve_once("200 OK", r#"{"data":{"params":{}}}"#);

    let options = ClientOptions::new(endpoint(addr)).with_timeout(Duration::from_millis(500));
    assert_eq!(options.timeout(), Duration::from_millis(500));

    let mut client = DwApiClient::new(options).unwrap();
    assert_eq!(client.transport().timeout(), Duration::from_millis(500));
    assert!(client.ping().unwrap());
    server.join().unwrap();
}

#[test]
fn test_login_then_authenticated_call() {
    init_tracing();
    let (addr, server) = serve_once("200 OK", r#"{"data":{"params":{"sessionId":"XYZ"}}}"#);

    let mut client = DwApiClient::new(
        ClientOptions::new(endpoint(addr)).with_application_token("app"),
    )
    .unwrap();
    let session = client
        .login(None, Some(OrgCredential::login("u", "p")))
        .unwrap();
    assert_eq!(session, "XYZ");

    let captured: Value = serde_json::from_str(&server.join().unwrap().body).unwrap();
    assert_eq!(
        captured["data"]["params"],
        json!({"applicationToken": "app", "username": "u", "password": "p"})
    );

    let (addr, server) = serve_once(
        "200 OK",
        r#"{"data":{"params":{"gateways":[{"cloudlinkId":"gw-1"}]}}}"#,
    );
    client.set_endpoint(endpoint(addr));
    let gateways = client.list_gateways().unwrap();
    assert_eq!(gateways["gateways"][0]["cloudlinkId"], "gw-1");

    let captured: Value = serde_json::from_str(&server.join().unwrap().body).unwrap();
    assert_eq!(
        captured["auth"],
        json!({"applicationToken": "app", "sessionId": "XYZ"})
    );
}

#[test]
fn test_api_error_message_is_surfaced() {
    init_tracing();
    let (addr, server) = serve_once("200 OK", r#"{"data":{"errorMessage":"bad token"}}"#);

    let mut client = DwApiClient::new(
        ClientOptions::new(endpoint(addr))
            .with_application_token("app")
            .with_session_id("stale"),
    )
    .unwrap();
    let err = client.gateway_details("gw-1").unwrap_err();
    server.join().unwrap();

    match err {
        DwApiError::Api { message } => assert_eq!(message, "bad token"),
        other => panic!("expected API error, got {:?}", other),
    }
}

#[test]
fn test_http_error_status_is_transport_error() {
    init_tracing();
    let (addr, server) = serve_once("500 Internal Server Error", r#"{"oops":true}"#);

    let mut client = DwApiClient::new(ClientOptions::new(endpoint(addr))).unwrap();
    let err = client.ping().unwrap_err();
    server.join().unwrap();

    match err {
        DwApiError::Transport { status, .. } => assert_eq!(status, Some(500)),
        other => panic!("expected transport error, got {:?}", other),
    }
}

#[test]
fn test_empty_body_is_transport_error() {
    init_tracing();
    let (addr, server) = serve_once("200 OK", "");

    let mut client = DwApiClient::new(ClientOptions::new(endpoint(addr))).unwrap();
    let err = client.ping().unwrap_err();
    server.join().unwrap();

    assert!(err.is_transport());
    assert!(err.to_string().contains("empty response body"));
    assert!(client.last_sent().is_some());
    assert_eq!(client.last_received(), None);
}

#[test]
fn test_connection_refused_keeps_attempted_request() {
    init_tracing();
    // Bind then drop to get a port nothing is listening on.
    let addr = TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();

    let mut client = DwApiClient::new(
        ClientOptions::new(endpoint(addr))
            .with_application_token("app")
            .with_session_id("sess")
            .with_timeout(Duration::from_secs(5)),
    )
    .unwrap();
    let err = client
        .exec_user_op("gw-1", "restart", [("delay", 5)])
        .unwrap_err();

    assert!(err.is_transport());
    let sent: Value = serde_json::from_str(client.last_sent().unwrap()).unwrap();
    assert_eq!(sent["data"]["command"], "gateway.userop.exec");
    assert_eq!(
        sent["data"]["params"]["inputs"],
        json!([{"key": "delay", "value": 5}])
    );
}
