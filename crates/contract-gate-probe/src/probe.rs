// crates/contract-gate-probe/src/probe.rs
// ============================================================================
// Module: Response Compliance Probe
// Description: Bounded HTTP requests checked against contract responses.
// Purpose: Compare live status codes and bodies with the OpenAPI contract.
// Dependencies: contract-gate-core, reqwest, serde_json
// ============================================================================

//! ## Overview
//! Each [`ProbeCheck`] names an operation by method and path template. The
//! probe expands the template, sends the request, and records a
//! [`ProbeOutcome`] that passes only when the status matches the expectation
//! and the body conforms to the response schema declared for that status.
//!
//! The expected status is, in order: the check's explicit `expected_status`,
//! the operation's lowest declared `2XX` code, or any `2XX`.
//! Security posture: responses are untrusted; size limits and scheme policy
//! fail closed before any body is parsed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::io::Read;
use std::time::Duration;
use std::time::Instant;

use contract_gate_core::DocumentError;
use contract_gate_core::HttpMethod;
use contract_gate_core::OpenApiDocument;
use contract_gate_core::SchemaError;
use contract_gate_core::SchemaValidator;
use reqwest::Method;
use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// User agent sent when none is configured.
pub const DEFAULT_USER_AGENT: &str = "contract-gate/0.1";
/// Media type requested from and sent to the API.
const JSON_MEDIA_TYPE: &str = "application/json";

/// Configuration for compliance probes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Allow cleartext HTTP (disabled by default).
    pub allow_http: bool,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum response size allowed, in bytes.
    pub max_response_bytes: usize,
    /// Optional host allowlist.
    pub allowed_hosts: Option<BTreeSet<String>>,
    /// User agent string for outbound requests.
    pub user_agent: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            allow_http: false,
            timeout_ms: 5_000,
            max_response_bytes: 1024 * 1024,
            allowed_hosts: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

// ============================================================================
// SECTION: Checks and Outcomes
// ============================================================================

/// One request to send and verify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProbeCheck {
    /// HTTP method.
    pub method: HttpMethod,
    /// Path template as declared in the contract, e.g. `/users/{id}`.
    pub path: String,
    /// Values for `{name}` template parameters.
    #[serde(default)]
    pub params: BTreeMap<String, String>,
    /// Status code the response must carry.
    #[serde(default)]
    pub expected_status: Option<u16>,
    /// JSON request body.
    #[serde(default)]
    pub body: Option<Value>,
}

impl ProbeCheck {
    /// Creates a check with no parameters, expectation, or body.
    #[must_use]
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: BTreeMap::new(),
            expected_status: None,
            body: None,
        }
    }

    /// Sets a template parameter.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Sets the expected status code.
    #[must_use]
    pub const fn expect_status(mut self, status: u16) -> Self {
        self.expected_status = Some(status);
        self
    }

    /// Sets the JSON request body.
    #[must_use]
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Returns `METHOD /path` for messages.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} {}", self.method, self.path)
    }

    /// Builds the concrete request URL under `base_url`.
    ///
    /// Parameter values are percent-encoded as single path segments.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError`] when the base URL is invalid or a template
    /// parameter is missing or malformed.
    pub fn resolve_url(&self, base_url: &str) -> Result<Url, ProbeError> {
        build_url(base_url, self)
    }
}

/// Result of one check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeOutcome {
    /// HTTP method.
    pub method: HttpMethod,
    /// Path template.
    pub path: String,
    /// Concrete URL requested, when one was built.
    pub url: Option<String>,
    /// Expected status code or range, when known.
    pub expected_status: Option<String>,
    /// Received status code.
    pub status: Option<u16>,
    /// Whether the check passed.
    pub passed: bool,
    /// Status and body violations (`path: message`).
    pub violations: Vec<String>,
    /// Error that prevented the check from completing.
    pub error: Option<String>,
    /// Request round-trip time in milliseconds.
    pub elapsed_ms: u64,
}

impl ProbeOutcome {
    /// Builds a failed outcome for a check that could not complete.
    fn errored(check: &ProbeCheck, error: &ProbeError) -> Self {
        Self {
            method: check.method,
            path: check.path.clone(),
            url: None,
            expected_status: check.expected_status.map(|status| status.to_string()),
            status: None,
            passed: false,
            violations: Vec::new(),
            error: Some(error.to_string()),
            elapsed_ms: 0,
        }
    }

    /// Returns `METHOD /path` for messages.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

/// Results of a probe run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeReport {
    /// Base URL every check was sent to.
    pub base_url: String,
    /// Outcomes in check order.
    pub outcomes: Vec<ProbeOutcome>,
    /// Number of passed checks.
    pub passed: usize,
    /// Number of failed checks.
    pub failed: usize,
}

impl ProbeReport {
    /// Builds a report and tallies the outcomes.
    #[must_use]
    pub fn new(base_url: impl Into<String>, outcomes: Vec<ProbeOutcome>) -> Self {
        let passed = outcomes.iter().filter(|outcome| outcome.passed).count();
        Self {
            base_url: base_url.into(),
            failed: outcomes.len() - passed,
            passed,
            outcomes,
        }
    }

    /// Returns true when no check failed.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.failed == 0
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while preparing or executing a check.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The HTTP client could not be created.
    #[error("http client build failed: {0}")]
    Client(String),
    /// A `{name}` template parameter has no value.
    #[error("path parameter '{param}' missing for {path}")]
    MissingParam {
        /// Path template.
        path: String,
        /// Parameter name.
        param: String,
    },
    /// A parameter value would turn a segment into `""`, `.`, or `..`.
    #[error("path segment '{segment}' of {path} expands to an empty or dot segment")]
    DotSegment {
        /// Path template.
        path: String,
        /// Template segment.
        segment: String,
    },
    /// A path template has an unterminated `{`.
    #[error("malformed path template '{0}'")]
    InvalidTemplate(String),
    /// The base URL does not parse or cannot carry a path.
    #[error("invalid base url '{0}'")]
    InvalidUrl(String),
    /// The URL scheme is not permitted.
    #[error("unsupported url scheme '{0}'")]
    UnsupportedScheme(String),
    /// The URL has no host but an allowlist is configured.
    #[error("url host required")]
    HostRequired,
    /// The URL host is not on the allowlist.
    #[error("url host '{0}' not allowed")]
    HostNotAllowed(String),
    /// The request could not be sent.
    #[error("http request failed: {0}")]
    Request(String),
    /// The response body exceeds the configured limit.
    #[error("http response exceeds size limit of {limit} bytes")]
    ResponseTooLarge {
        /// Configured limit in bytes.
        limit: usize,
    },
    /// The response body could not be read.
    #[error("failed to read response: {0}")]
    ResponseRead(String),
    /// The contract does not describe the operation.
    #[error(transparent)]
    Document(#[from] DocumentError),
    /// The response schema could not be compiled.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

// ============================================================================
// SECTION: Probe
// ============================================================================

/// Sends contract checks to a live API.
pub struct ComplianceProbe {
    /// Probe configuration, including limits and policy.
    config: ProbeConfig,
    /// HTTP client used for outbound requests.
    client: Client,
    /// Validator used for response bodies.
    validator: SchemaValidator,
}

impl ComplianceProbe {
    /// Creates a probe with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Client`] when the HTTP client cannot be created.
    pub fn new(config: ProbeConfig) -> Result<Self, ProbeError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .redirect(Policy::none())
            .build()
            .map_err(|err| ProbeError::Client(err.to_string()))?;
        Ok(Self {
            config,
            client,
            validator: SchemaValidator::new(),
        })
    }

    /// Returns the probe configuration.
    #[must_use]
    pub const fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Runs one check.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError`] when the operation is not in the contract, the
    /// URL is rejected, or the request cannot complete. Status mismatches and
    /// schema violations are reported in the outcome, not as errors.
    pub fn run(
        &self,
        document: &OpenApiDocument,
        base_url: &str,
        check: &ProbeCheck,
    ) -> Result<ProbeOutcome, ProbeError> {
        document.operation(&check.path, check.method)?;
        let expectation = StatusExpectation::resolve(document, check)?;
        let url = check.resolve_url(base_url)?;
        validate_url(&url, &self.config)?;

        let started = Instant::now();
        let mut request =
            self.client.request(to_method(check.method), url.clone()).header(ACCEPT, JSON_MEDIA_TYPE);
        if let Some(body) = &check.body {
            let bytes =
                serde_json::to_vec(body).map_err(|err| ProbeError::Request(err.to_string()))?;
            request = request.header(CONTENT_TYPE, JSON_MEDIA_TYPE).body(bytes);
        }
        let mut response = request.send().map_err(|err| ProbeError::Request(err.to_string()))?;
        let status = response.status().as_u16();
        let body = if check.method == HttpMethod::Head {
            Vec::new()
        } else {
            read_response_limited(&mut response, self.config.max_response_bytes)?
        };
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let mut violations = Vec::new();
        if !expectation.matches(status) {
            violations.push(format!("status: expected {}, got {status}", expectation.label()));
        }
        let schema = if check.method == HttpMethod::Head {
            None
        } else {
            response_schema_for(document, check, status)?
        };
        if let Some(schema) = schema {
            match serde_json::from_slice::<Value>(&body) {
                Ok(payload) => violations.extend(
                    self.validator
                        .validate(&payload, schema, Some(document))?
                        .iter()
                        .map(ToString::to_string),
                ),
                Err(err) => violations.push(format!("root: response body is not valid JSON: {err}")),
            }
        }

        Ok(ProbeOutcome {
            method: check.method,
            path: check.path.clone(),
            url: Some(url.to_string()),
            expected_status: Some(expectation.label()),
            status: Some(status),
            passed: violations.is_empty(),
            violations,
            error: None,
            elapsed_ms,
        })
    }

    /// Runs every check, recording errors as failed outcomes.
    #[must_use]
    pub fn run_all(
        &self,
        document: &OpenApiDocument,
        base_url: &str,
        checks: &[ProbeCheck],
    ) -> ProbeReport {
        let outcomes = checks
            .iter()
            .map(|check| {
                self.run(document, base_url, check)
                    .unwrap_or_else(|err| ProbeOutcome::errored(check, &err))
            })
            .collect();
        ProbeReport::new(base_url, outcomes)
    }
}

// ============================================================================
// SECTION: Status Expectations
// ============================================================================

/// Status a response must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusExpectation {
    /// One exact code.
    Exact(u16),
    /// Any code in a hundred-block, e.g. `2` for `2XX`.
    Range(u16),
}

impl StatusExpectation {
    /// Resolves the expectation for a check.
    fn resolve(document: &OpenApiDocument, check: &ProbeCheck) -> Result<Self, ProbeError> {
        if let Some(status) = check.expected_status {
            return Ok(Self::Exact(status));
        }
        let declared = document.success_status(&check.path, check.method)?;
        Ok(declared.map_or(Self::Range(2), |code| {
            code.parse::<u16>().map_or(Self::Range(2), Self::Exact)
        }))
    }

    /// Returns true when `status` satisfies the expectation.
    const fn matches(self, status: u16) -> bool {
        match self {
            Self::Exact(expected) => status == expected,
            Self::Range(block) => status / 100 == block,
        }
    }

    /// Renders the expectation, e.g. `201` or `2XX`.
    fn label(self) -> String {
        match self {
            Self::Exact(expected) => expected.to_string(),
            Self::Range(block) => format!("{block}XX"),
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Maps a contract method onto a request method.
const fn to_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Post => Method::POST,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Options => Method::OPTIONS,
        HttpMethod::Head => Method::HEAD,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Trace => Method::TRACE,
    }
}

/// Looks up the JSON schema declared for a received status.
///
/// Tries the exact code, then its `NXX` range, then `default`.
fn response_schema_for<'a>(
    document: &'a OpenApiDocument,
    check: &ProbeCheck,
    status: u16,
) -> Result<Option<&'a Value>, ProbeError> {
    let candidates = [status.to_string(), format!("{}XX", status / 100), "default".to_string()];
    for key in &candidates {
        match document.response_schema(&check.path, check.method, key) {
            Ok(schema) => return Ok(Some(schema)),
            Err(DocumentError::ResponseNotFound {
                ..
            }) => {}
            Err(DocumentError::NoJsonContent {
                ..
            }) => return Ok(None),
            Err(err) => return Err(err.into()),
        }
    }
    Ok(None)
}

/// Appends the expanded path template to the base URL.
fn build_url(base_url: &str, check: &ProbeCheck) -> Result<Url, ProbeError> {
    let invalid = || ProbeError::InvalidUrl(base_url.to_string());
    let mut url = Url::parse(base_url).map_err(|_| invalid())?;
    let template = check.path.strip_prefix('/').unwrap_or(&check.path);
    let segments = template
        .split('/')
        .map(|segment| expand_segment(segment, &check.path, &check.params))
        .collect::<Result<Vec<_>, _>>()?;
    url.path_segments_mut().map_err(|()| invalid())?.pop_if_empty().extend(&segments);
    Ok(url)
}

/// Substitutes `{name}` placeholders inside one path segment.
fn expand_segment(
    segment: &str,
    template: &str,
    params: &BTreeMap<String, String>,
) -> Result<String, ProbeError> {
    let mut out = String::with_capacity(segment.len());
    let mut rest = segment;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[.. start]);
        let after = &rest[start + 1 ..];
        let end =
            after.find('}').ok_or_else(|| ProbeError::InvalidTemplate(template.to_string()))?;
        let name = &after[.. end];
        let value = params.get(name).ok_or_else(|| ProbeError::MissingParam {
            path: template.to_string(),
            param: name.to_string(),
        })?;
        out.push_str(value);
        rest = &after[end + 1 ..];
    }
    out.push_str(rest);
    if out != segment && matches!(out.as_str(), "" | "." | "..") {
        return Err(ProbeError::DotSegment {
            path: template.to_string(),
            segment: segment.to_string(),
        });
    }
    Ok(out)
}

/// Validates URL scheme and allowlist policy.
fn validate_url(url: &Url, config: &ProbeConfig) -> Result<(), ProbeError> {
    match url.scheme() {
        "https" => {}
        "http" if config.allow_http => {}
        other => return Err(ProbeError::UnsupportedScheme(other.to_string())),
    }
    if let Some(allowlist) = &config.allowed_hosts {
        let host = url.host_str().ok_or(ProbeError::HostRequired)?;
        if !allowlist.contains(host) {
            return Err(ProbeError::HostNotAllowed(host.to_string()));
        }
    }
    Ok(())
}

/// Reads the response body while enforcing a byte limit.
fn read_response_limited(
    response: &mut reqwest::blocking::Response,
    max_bytes: usize,
) -> Result<Vec<u8>, ProbeError> {
    let too_large = || ProbeError::ResponseTooLarge {
        limit: max_bytes,
    };
    let expected_len = response.content_length();
    let max_bytes_u64 = u64::try_from(max_bytes).map_err(|_| too_large())?;
    if let Some(expected) = expected_len
        && expected > max_bytes_u64
    {
        return Err(too_large());
    }
    let mut buf = Vec::new();
    let mut handle = response.take(max_bytes_u64.saturating_add(1));
    handle.read_to_end(&mut buf).map_err(|err| ProbeError::ResponseRead(err.to_string()))?;
    if buf.len() > max_bytes {
        return Err(too_large());
    }
    if let Some(expected) = expected_len
        && u64::try_from(buf.len()).unwrap_or(u64::MAX) < expected
    {
        return Err(ProbeError::ResponseRead("http response truncated".to_string()));
    }
    Ok(buf)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
