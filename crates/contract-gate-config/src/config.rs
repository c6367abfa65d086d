// crates/contract-gate-config/src/config.rs
// ============================================================================
// Module: Contract Gate Configuration
// Description: Configuration loading and validation for Contract Gate.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: contract-gate-core, contract-gate-probe, serde, toml, url
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! An explicit path (flag or environment) must exist; the default
//! `contract-gate.toml` is optional and its absence means "all defaults".
//! Security posture: config inputs are untrusted and validated before use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use contract_gate_core::ReportFormat;
use contract_gate_core::Severity;
use contract_gate_probe::DEFAULT_USER_AGENT;
use contract_gate_probe::ProbeCheck;
use contract_gate_probe::ProbeConfig;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "contract-gate.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "CONTRACT_GATE_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Minimum probe request timeout in milliseconds.
pub(crate) const MIN_PROBE_TIMEOUT_MS: u64 = 100;
/// Maximum probe request timeout in milliseconds.
pub(crate) const MAX_PROBE_TIMEOUT_MS: u64 = 60_000;
/// Maximum probe response size in bytes.
pub(crate) const MAX_PROBE_RESPONSE_BYTES: usize = 16 * 1024 * 1024;
/// Maximum number of allowed probe hosts.
pub(crate) const MAX_ALLOWED_HOSTS: usize = 64;
/// Maximum number of probe checks.
pub(crate) const MAX_PROBE_CHECKS: usize = 256;
/// Maximum length of a user agent string.
pub(crate) const MAX_USER_AGENT_LENGTH: usize = 256;
/// Lowest valid HTTP status code.
pub(crate) const MIN_STATUS_CODE: u16 = 100;
/// Highest valid HTTP status code.
pub(crate) const MAX_STATUS_CODE: u16 = 599;

// ============================================================================
// SECTION: Root Configuration
// ============================================================================

/// Contract Gate configuration loaded from `contract-gate.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContractGateConfig {
    /// Contract document locations.
    #[serde(default)]
    pub spec: SpecConfig,
    /// Live compliance probe settings.
    #[serde(default)]
    pub probe: ProbeSection,
    /// Breaking-change gate settings.
    #[serde(default)]
    pub diff: DiffConfig,
    /// Report output settings.
    #[serde(default)]
    pub reports: ReportsConfig,
    /// Audit event settings.
    #[serde(default)]
    pub audit: AuditConfig,
}

impl ContractGateConfig {
    /// Loads configuration using the default resolution rules.
    ///
    /// Resolution order: `path`, then `CONTRACT_GATE_CONFIG`, then
    /// `contract-gate.toml` in the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let env_path = env::var(CONFIG_ENV_VAR).ok();
        let resolved = resolve_path(path, env_path.as_deref())?;
        if !resolved.explicit && !resolved.path.exists() {
            return Ok(Self::default());
        }
        Self::load_file(&resolved.path)
    }

    /// Loads and validates configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file is unreadable, too large, not
    /// UTF-8, malformed, or invalid.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        validate_path(path)?;
        let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config = Self::parse(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses TOML without validating it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Validates every section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.spec.validate()?;
        self.probe.validate()?;
        self.reports.validate()?;
        self.audit.validate()?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Sections
// ============================================================================

/// Contract document locations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpecConfig {
    /// Current contract, used when `--spec` is omitted.
    #[serde(default)]
    pub path: Option<String>,
    /// Previous contract, used as the `diff --old` default.
    #[serde(default)]
    pub baseline: Option<String>,
}

impl SpecConfig {
    /// Validates contract paths.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            validate_path_string("spec.path", path)?;
        }
        if let Some(baseline) = &self.baseline {
            validate_path_string("spec.baseline", baseline)?;
        }
        Ok(())
    }
}

/// Live compliance probe settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProbeSection {
    /// Base URL; defaults to the contract's first server.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Allow cleartext HTTP.
    #[serde(default)]
    pub allow_http: bool,
    /// Request timeout in milliseconds.
    #[serde(default = "default_probe_timeout_ms")]
    pub timeout_ms: u64,
    /// Maximum response size in bytes.
    #[serde(default = "default_probe_max_response_bytes")]
    pub max_response_bytes: usize,
    /// Optional host allowlist.
    #[serde(default)]
    pub allowed_hosts: Option<Vec<String>>,
    /// User agent override.
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Checks run by `contract-gate probe`.
    #[serde(default)]
    pub checks: Vec<ProbeCheck>,
}

impl Default for ProbeSection {
    fn default() -> Self {
        Self {
            base_url: None,
            allow_http: false,
            timeout_ms: default_probe_timeout_ms(),
            max_response_bytes: default_probe_max_response_bytes(),
            allowed_hosts: None,
            user_agent: None,
            checks: Vec::new(),
        }
    }
}

impl ProbeSection {
    /// Validates probe limits, URL policy, and checks.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_PROBE_TIMEOUT_MS ..= MAX_PROBE_TIMEOUT_MS).contains(&self.timeout_ms) {
            return Err(ConfigError::Invalid(format!(
                "probe.timeout_ms must be between {MIN_PROBE_TIMEOUT_MS} and \
                 {MAX_PROBE_TIMEOUT_MS}"
            )));
        }
        if self.max_response_bytes == 0 || self.max_response_bytes > MAX_PROBE_RESPONSE_BYTES {
            return Err(ConfigError::Invalid(format!(
                "probe.max_response_bytes must be between 1 and {MAX_PROBE_RESPONSE_BYTES}"
            )));
        }
        if let Some(base_url) = &self.base_url {
            validate_base_url(base_url, self.allow_http)?;
        }
        if let Some(hosts) = &self.allowed_hosts {
            if hosts.is_empty() {
                return Err(ConfigError::Invalid(
                    "probe.allowed_hosts must be non-empty when set".to_string(),
                ));
            }
            if hosts.len() > MAX_ALLOWED_HOSTS {
                return Err(ConfigError::Invalid("too many probe.allowed_hosts".to_string()));
            }
            if hosts.iter().any(|host| host.trim().is_empty()) {
                return Err(ConfigError::Invalid(
                    "probe.allowed_hosts entries must be non-empty".to_string(),
                ));
            }
        }
        if let Some(agent) = &self.user_agent
            && (agent.trim().is_empty() || agent.len() > MAX_USER_AGENT_LENGTH)
        {
            return Err(ConfigError::Invalid(format!(
                "probe.user_agent must be 1 to {MAX_USER_AGENT_LENGTH} characters"
            )));
        }
        if self.checks.len() > MAX_PROBE_CHECKS {
            return Err(ConfigError::Invalid("too many probe.checks".to_string()));
        }
        for (index, check) in self.checks.iter().enumerate() {
            validate_check(index, check)?;
        }
        Ok(())
    }

    /// Converts the section into runtime probe settings.
    #[must_use]
    pub fn to_probe_config(&self) -> ProbeConfig {
        ProbeConfig {
            allow_http: self.allow_http,
            timeout_ms: self.timeout_ms,
            max_response_bytes: self.max_response_bytes,
            allowed_hosts: self.allowed_hosts.as_ref().map(|hosts| {
                hosts.iter().map(|host| host.trim().to_ascii_lowercase()).collect::<BTreeSet<_>>()
            }),
            user_agent: self.user_agent.clone().unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        }
    }
}

/// Breaking-change gate settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiffConfig {
    /// Lowest severity that fails `contract-gate diff`.
    #[serde(default = "default_fail_on")]
    pub fail_on: Severity,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            fail_on: default_fail_on(),
        }
    }
}

/// Report output settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportsConfig {
    /// Directory reports are written to; stdout only when unset.
    #[serde(default)]
    pub dir: Option<String>,
    /// Default report format.
    #[serde(default)]
    pub format: ReportFormat,
}

impl ReportsConfig {
    /// Validates the report directory.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(dir) = &self.dir {
            validate_path_string("reports.dir", dir)?;
        }
        Ok(())
    }
}

/// Audit event settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Record one event per executed check.
    #[serde(default)]
    pub enabled: bool,
    /// JSON-lines file; stderr when unset.
    #[serde(default)]
    pub path: Option<String>,
}

impl AuditConfig {
    /// Validates the audit log path.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            validate_path_string("audit.path", path)?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Config path plus whether it was requested explicitly.
#[derive(Debug, PartialEq, Eq)]
struct ResolvedPath {
    /// Path to read.
    path: PathBuf,
    /// True when the path came from the CLI or the environment.
    explicit: bool,
}

/// Resolves the config path from CLI, environment, or the default name.
fn resolve_path(path: Option<&Path>, env_path: Option<&str>) -> Result<ResolvedPath, ConfigError> {
    if let Some(path) = path {
        return Ok(ResolvedPath {
            path: path.to_path_buf(),
            explicit: true,
        });
    }
    if let Some(env_path) = env_path.filter(|value| !value.trim().is_empty()) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(ResolvedPath {
            path: PathBuf::from(env_path),
            explicit: true,
        });
    }
    Ok(ResolvedPath {
        path: PathBuf::from(DEFAULT_CONFIG_NAME),
        explicit: false,
    })
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates the probe base URL scheme and host.
fn validate_base_url(value: &str, allow_http: bool) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|err| ConfigError::Invalid(format!("probe.base_url is invalid: {err}")))?;
    match url.scheme() {
        "https" => {}
        "http" if allow_http => {}
        "http" => {
            return Err(ConfigError::Invalid(
                "probe.base_url uses http without probe.allow_http".to_string(),
            ));
        }
        scheme => {
            return Err(ConfigError::Invalid(format!(
                "probe.base_url scheme {scheme} is not supported"
            )));
        }
    }
    if url.host_str().is_none() {
        return Err(ConfigError::Invalid("probe.base_url must include a host".to_string()));
    }
    Ok(())
}

/// Validates one probe check.
fn validate_check(index: usize, check: &ProbeCheck) -> Result<(), ConfigError> {
    if !check.path.starts_with('/') {
        return Err(ConfigError::Invalid(format!("probe.checks[{index}].path must start with /")));
    }
    if let Some(status) = check.expected_status
        && !(MIN_STATUS_CODE ..= MAX_STATUS_CODE).contains(&status)
    {
        return Err(ConfigError::Invalid(format!(
            "probe.checks[{index}].expected_status must be between {MIN_STATUS_CODE} and \
             {MAX_STATUS_CODE}"
        )));
    }
    Ok(())
}

/// Default probe timeout.
const fn default_probe_timeout_ms() -> u64 {
    5_000
}

/// Default probe response limit.
const fn default_probe_max_response_bytes() -> usize {
    1024 * 1024
}

/// Default diff gate: any breaking change fails.
const fn default_fail_on() -> Severity {
    Severity::Medium
}

// ============================================================================
// SECTION: Tests
// ============================================================================
