// crates/contract-gate-probe/tests/common/mod.rs
// ============================================================================
// Module: Probe Test Fixtures
// Description: Shared contract and local HTTP server helpers for probe tests.
// Purpose: Provide deterministic endpoints for compliance checks.
// Dependencies: contract-gate-core, tiny_http
// ============================================================================

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::sync::mpsc;
use std::thread;

use contract_gate_core::DocumentFormat;
use contract_gate_core::OpenApiDocument;
use contract_gate_probe::ComplianceProbe;
use contract_gate_probe::ProbeConfig;
use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

// ============================================================================
// SECTION: Contract
// ============================================================================

/// Minimal Users contract served by the local test servers.
pub const USERS_CONTRACT: &str = r"
openapi: 3.0.3
info:
  title: Users API
  version: 1.0.0
servers:
  - url: http://127.0.0.1
paths:
  /users:
    post:
      responses:
        '201':
          description: created
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/User'
  /users/{id}:
    get:
      responses:
        '200':
          description: found
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/User'
        '404':
          description: missing
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/Error'
    head:
      responses:
        '200':
          description: exists
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/User'
    delete:
      responses:
        '204':
          description: deleted
  /users/{id}/activate:
    post:
      responses:
        '2XX':
          description: accepted
components:
  schemas:
    User:
      type: object
      required: [id, name, email]
      properties:
        id:
          type: integer
        name:
          type: string
        email:
          type: string
          format: email
    Error:
      type: object
      required: [message]
      properties:
        message:
          type: string
";

/// Parses the shared Users contract.
pub fn users_contract() -> OpenApiDocument {
    OpenApiDocument::parse(USERS_CONTRACT, DocumentFormat::Yaml).unwrap()
}

/// A user object that conforms to the contract.
pub const VALID_USER: &str = r#"{"id": 1, "name": "Leanne Graham", "email": "Sincere@april.biz"}"#;

// ============================================================================
// SECTION: Probes
// ============================================================================

/// Creates a probe allowed to reach the local server over HTTP.
pub fn local_probe() -> ComplianceProbe {
    local_probe_with(ProbeConfig::default())
}

/// Creates a local probe from a base configuration.
pub fn local_probe_with(config: ProbeConfig) -> ComplianceProbe {
    ComplianceProbe::new(ProbeConfig {
        allow_http: true,
        allowed_hosts: Some(BTreeSet::from(["127.0.0.1".to_string()])),
        ..config
    })
    .unwrap()
}

// ============================================================================
// SECTION: Servers
// ============================================================================

/// Request observed by a test server.
#[derive(Debug)]
pub struct SeenRequest {
    /// Request method.
    pub method: String,
    /// Request URL (path and query).
    pub url: String,
    /// Request body.
    pub body: String,
}

/// Spawns a server answering one request with `body` and `status`.
pub fn spawn_server(
    body: &'static str,
    status: u16,
) -> (String, mpsc::Receiver<SeenRequest>, thread::JoinHandle<()>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let url = format!("http://{addr}");
    let (sender, receiver) = mpsc::channel();

    let handle = thread::spawn(move || {
        if let Ok(mut request) = server.recv() {
            let mut content = String::new();
            let _ = request.as_reader().read_to_string(&mut content);
            let _ = sender.send(SeenRequest {
                method: request.method().to_string(),
                url: request.url().to_string(),
                body: content,
            });
            let response = Response::from_string(body).with_status_code(status);
            let _ = request.respond(response);
        }
    });

    (url, receiver, handle)
}

/// Spawns a server answering one request with a `302` redirect to `location`.
pub fn spawn_redirect(
    location: &'static str,
) -> (String, mpsc::Receiver<SeenRequest>, thread::JoinHandle<()>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let url = format!("http://{addr}");
    let (sender, receiver) = mpsc::channel();

    let handle = thread::spawn(move || {
        if let Ok(request) = server.recv() {
            let _ = sender.send(SeenRequest {
                method: request.method().to_string(),
                url: request.url().to_string(),
                body: String::new(),
            });
            let header = Header::from_bytes(&b"Location"[..], location.as_bytes()).unwrap();
            let response = Response::from_string("").with_status_code(302).with_header(header);
            let _ = request.respond(response);
        }
    });

    (url, receiver, handle)
}
