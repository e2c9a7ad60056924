//! Mock component registry shared by the integration tests.

use std::net::TcpListener;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Starts a mock registry, or returns `None` when localhost sockets are unavailable.
pub async fn start_registry() -> Option<MockServer> {
    if TcpListener::bind("127.0.0.1:0").is_err() {
        eprintln!("cannot bind a localhost socket; skipping registry test");
        return None;
    }
    Some(MockServer::start().await)
}

/// Base URL the mock serves components under (`{uri}/r`).
#[must_use]
pub fn registry_base(server: &MockServer) -> String {
    format!("{}/r", server.uri())
}

/// Answers `GET /r/{name}` with `status` and `body`.
pub async fn mount_component(server: &MockServer, name: &str, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/r/{name}")))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}
