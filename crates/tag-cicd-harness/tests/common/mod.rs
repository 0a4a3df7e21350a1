// crates/tag-cicd-harness/tests/common/mod.rs
// ============================================================================
// Module: Stub Gateway Helpers
// Description: Scripted HTTP stub and recording log sink for plumbing tests.
// Purpose: Verify request shape and status mapping without a live gateway.
// Dependencies: tiny_http, url
// ============================================================================

//! ## Overview
//! The stub answers requests in order from a fixed script and records what it
//! received. It stops after the script is exhausted or after a quiet period,
//! so a client that sends fewer requests than scripted cannot hang a test.

#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Shared helpers are not used by every test binary."
)]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use tag_cicd_harness::HarnessEvent;
use tag_cicd_harness::HarnessLogSink;
use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;
use url::Url;

/// Quiet period after which the stub stops waiting for requests.
const IDLE_TIMEOUT: Duration = Duration::from_secs(5);

/// Route prefix served by the stub.
pub const ROUTE_PREFIX: &str = "/data/tag-cicd";

/// One request as the stub saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method.
    pub method: String,
    /// Request path without the query.
    pub path: String,
    /// Decoded query parameters.
    pub query: BTreeMap<String, String>,
    /// Request body.
    pub body: Vec<u8>,
    /// `Content-Type` header, when sent.
    pub content_type: Option<String>,
}

/// Scripted HTTP stub.
pub struct StubGateway {
    /// Base URL including the route prefix.
    pub base_url: String,
    /// Recording thread.
    handle: thread::JoinHandle<Vec<RecordedRequest>>,
}

impl StubGateway {
    /// Starts a stub answering with `script` as `(status, body)` pairs.
    pub fn start(script: Vec<(u16, String)>) -> Self {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        let base_url = format!("http://{addr}{ROUTE_PREFIX}");
        let handle = thread::spawn(move || {
            let mut seen = Vec::new();
            for (status, body) in script {
                let Ok(Some(mut request)) = server.recv_timeout(IDLE_TIMEOUT) else {
                    break;
                };
                let mut payload = Vec::new();
                let _ = request.as_reader().read_to_end(&mut payload);
                let url = Url::parse(&format!("http://stub{}", request.url())).unwrap();
                let content_type = request
                    .headers()
                    .iter()
                    .find(|header| header.field.equiv("Content-Type"))
                    .map(|header| header.value.as_str().to_string());
                seen.push(RecordedRequest {
                    method: request.method().to_string(),
                    path: url.path().to_string(),
                    query: url.query_pairs().into_owned().collect(),
                    body: payload,
                    content_type,
                });
                let header = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap();
                let response = Response::from_string(body).with_status_code(status).with_header(header);
                let _ = request.respond(response);
            }
            seen
        });
        Self {
            base_url,
            handle,
        }
    }

    /// Stops the stub and returns the recorded requests.
    pub fn finish(self) -> Vec<RecordedRequest> {
        self.handle.join().unwrap()
    }
}

/// Returns a base URL nothing listens on.
pub fn closed_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}{ROUTE_PREFIX}")
}

/// Sink keeping every event in memory.
#[derive(Default)]
pub struct RecordingSink {
    /// Events in arrival order.
    events: Mutex<Vec<HarnessEvent>>,
}

impl RecordingSink {
    /// Creates a shared sink.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Returns a copy of the recorded events.
    pub fn events(&self) -> Vec<HarnessEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Returns recorded events named `name`.
    pub fn named(&self, name: &str) -> Vec<HarnessEvent> {
        self.events().into_iter().filter(|event| event.event == name).collect()
    }
}

impl HarnessLogSink for RecordingSink {
    fn record(&self, event: &HarnessEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
