//! HTTP client tests against an in-process canned API server.

use std::sync::{Arc, Mutex};

use stratus_api::{
    ApiError, ApiTarget, ControlPlaneClient, Credentials, Filter, HttpClient, HttpClientConfig,
    Warnings,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// A canned reply: status, extra headers, body.
struct Reply {
    status: u16,
    headers: Vec<(&'static str, String)>,
    body: String,
}

impl Reply {
    fn json(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    fn with_warnings(mut self, value: &str) -> Self {
        self.headers.push(("X-Cf-Warnings", value.to_string()));
        self
    }
}

type Router = Arc<dyn Fn(&str, &str, &str) -> Reply + Send + Sync>;

/// Minimal HTTP/1.1 server answering from a routing function.
struct CannedServer {
    base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl CannedServer {
    async fn start(router: impl Fn(&str, &str, &str) -> Reply + Send + Sync + 'static) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let base_url = format!("http://{}", listener.local_addr().expect("addr"));
        let requests = Arc::new(Mutex::new(Vec::new()));
        let router: Router = Arc::new(router);

        let seen = Arc::clone(&requests);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let router = Arc::clone(&router);
                let seen = Arc::clone(&seen);
                tokio::spawn(async move {
                    let _ = serve(stream, router, seen).await;
                });
            }
        });

        Self { base_url, requests }
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("lock").clone()
    }
}

async fn serve(
    mut stream: TcpStream,
    router: Router,
    seen: Arc<Mutex<Vec<String>>>,
) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let head_end = loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let content_length = head
        .lines()
        .find_map(|l| {
            let (name, value) = l.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);
    while buf.len() < head_end + content_length {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = String::from_utf8_lossy(&buf[head_end..]).to_string();

    let request_line = head.lines().next().unwrap_or_default().to_string();
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let target = parts.next().unwrap_or_default().to_string();
    seen.lock().expect("lock").push(format!("{method} {target}"));

    let reply = router(&method, &target, &body);
    let mut response = format!(
        "HTTP/1.1 {} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n",
        reply.status,
        reply.body.len()
    );
    for (name, value) in &reply.headers {
        response.push_str(&format!("{name}: {value}\r\n"));
    }
    response.push_str("\r\n");
    response.push_str(&reply.body);
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}

fn info_body(base_url: &str) -> String {
    format!(r#"{{"api_version":"2.150.0","authorization_endpoint":"{base_url}"}}"#)
}

const TOKEN_BODY: &str =
    r#"{"access_token":"abc","refresh_token":"def","token_type":"bearer"}"#;

#[tokio::test]
async fn login_and_list_brokers_across_pages() {
    let base = Arc::new(Mutex::new(String::new()));
    let base_for_router = Arc::clone(&base);
    let server = CannedServer::start(move |method, target, _body| {
        let base_url = base_for_router.lock().expect("lock").clone();
        match (method, target) {
            ("GET", "/v2/info") => Reply::json(200, info_body(&base_url)),
            ("POST", "/oauth/token") => Reply::json(200, TOKEN_BODY),
            ("GET", t) if t.starts_with("/v2/service_brokers?q=") => Reply::json(
                200,
                r#"{"next_url":"/v2/service_brokers?page=2","resources":[{"metadata":{"guid":"guid-1"},"entity":{"name":"my-broker"}}]}"#,
            )
            .with_warnings("first%20page"),
            ("GET", "/v2/service_brokers?page=2") => Reply::json(
                200,
                r#"{"next_url":null,"resources":[{"metadata":{"guid":"guid-2"},"entity":{"name":"my-broker"}}]}"#,
            )
            .with_warnings("second%20page,still+second"),
            _ => Reply::json(404, r#"{"code":10000,"description":"Unknown request"}"#),
        }
    })
    .await;
    *base.lock().expect("lock") = server.base_url.clone();

    let mut client = HttpClient::new(HttpClientConfig::default()).expect("client");
    let info = client
        .connect(&ApiTarget::new(&server.base_url, false))
        .await
        .expect("connect");
    assert_eq!(info.api_version, "2.150.0");

    client
        .authenticate(&Credentials::password("admin", "secret"))
        .await
        .expect("authenticate");

    let outcome = client.service_brokers(&[Filter::name("my-broker")]).await;
    let brokers = outcome.result.expect("list");
    assert_eq!(brokers.len(), 2);
    assert_eq!(brokers[0].guid, "guid-1");
    assert_eq!(brokers[1].guid, "guid-2");
    assert_eq!(
        outcome.warnings,
        Warnings::from(["first page", "second page", "still second"])
    );

    let requests = server.requests();
    assert!(requests.iter().any(|r| r == "GET /v2/service_brokers?q=name%3Amy-broker"));
}

#[tokio::test]
async fn rejected_password_is_invalid_credentials() {
    let base = Arc::new(Mutex::new(String::new()));
    let base_for_router = Arc::clone(&base);
    let server = CannedServer::start(move |method, target, _body| {
        let base_url = base_for_router.lock().expect("lock").clone();
        match (method, target) {
            ("GET", "/v2/info") => Reply::json(200, info_body(&base_url)),
            ("POST", "/oauth/token") => Reply::json(
                401,
                r#"{"error":"unauthorized","error_description":"Bad credentials"}"#,
            ),
            _ => Reply::json(404, "{}"),
        }
    })
    .await;
    *base.lock().expect("lock") = server.base_url.clone();

    let mut client = HttpClient::new(HttpClientConfig::default()).expect("client");
    client
        .connect(&ApiTarget::new(&server.base_url, false))
        .await
        .expect("connect");
    let err = client
        .authenticate(&Credentials::password("admin", "wrong"))
        .await
        .expect_err("should be rejected");
    assert_eq!(err, ApiError::InvalidCredentials);
}

#[tokio::test]
async fn failed_create_keeps_warnings() {
    let base = Arc::new(Mutex::new(String::new()));
    let base_for_router = Arc::clone(&base);
    let server = CannedServer::start(move |method, target, body| {
        let base_url = base_for_router.lock().expect("lock").clone();
        match (method, target) {
            ("GET", "/v2/info") => Reply::json(200, info_body(&base_url)),
            ("POST", "/oauth/token") => Reply::json(200, TOKEN_BODY),
            ("POST", "/v2/service_brokers") => {
                assert!(body.contains(r#""auth_password":"password""#));
                Reply::json(
                    400,
                    r#"{"code":270003,"description":"error creating broker"}"#,
                )
                .with_warnings("one-warning,two-warnings")
            }
            _ => Reply::json(404, "{}"),
        }
    })
    .await;
    *base.lock().expect("lock") = server.base_url.clone();

    let mut client = HttpClient::new(HttpClientConfig::default()).expect("client");
    client
        .connect(&ApiTarget::new(&server.base_url, false))
        .await
        .expect("connect");
    client
        .authenticate(&Credentials::password("admin", "secret"))
        .await
        .expect("authenticate");

    let outcome = client
        .create_service_broker("broker-name", "username", "password", "https://broker.com", None)
        .await;
    assert_eq!(outcome.warnings, Warnings::from(["one-warning", "two-warnings"]));
    let err = outcome.result.expect_err("should fail");
    assert_eq!(err.to_string(), "error creating broker");
}

#[tokio::test]
async fn unreachable_endpoint_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let mut client = HttpClient::new(HttpClientConfig::default()).expect("client");
    let err = client
        .connect(&ApiTarget::new(&format!("http://{addr}"), false))
        .await
        .expect_err("should fail");
    assert!(matches!(err, ApiError::Transport(_)));
}
