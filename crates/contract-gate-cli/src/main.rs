// crates/contract-gate-cli/src/main.rs
// ============================================================================
// Module: Contract Gate CLI Entry Point
// Description: Command dispatcher for contract lint, schema, diff, and probe.
// Purpose: Provide a localized CLI that gates CI on API contract checks.
// Dependencies: clap, contract-gate-config, contract-gate-core, contract-gate-probe
// ============================================================================

//! ## Overview
//! The Contract Gate CLI loads OpenAPI contracts and runs one check per
//! invocation. Reports go to stdout and, when a report directory is set, to a
//! file. Exit codes: `0` the check passed, `1` the check ran and failed, `2`
//! usage, I/O, parse, or configuration errors. All user-facing strings are
//! routed through the i18n catalog.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use contract_gate_cli::t;
use contract_gate_config::ContractGateConfig;
use contract_gate_core::AuditSink;
use contract_gate_core::BreakingChangeDetector;
use contract_gate_core::CheckAuditEvent;
use contract_gate_core::CheckAuditEventParams;
use contract_gate_core::CheckKind;
use contract_gate_core::CheckOutcome;
use contract_gate_core::DocumentError;
use contract_gate_core::FileAuditSink;
use contract_gate_core::HashDigest;
use contract_gate_core::HttpMethod;
use contract_gate_core::NoopAuditSink;
use contract_gate_core::OpenApiDocument;
use contract_gate_core::ReportFormat;
use contract_gate_core::SchemaValidator;
use contract_gate_core::Severity;
use contract_gate_core::StderrAuditSink;
use contract_gate_core::canonical_json;
use contract_gate_core::highest_severity;
use contract_gate_core::lint_document;
use contract_gate_core::render_diff;
use contract_gate_core::render_lint;
use contract_gate_core::render_violations;
use contract_gate_core::write_report;
use contract_gate_probe::ComplianceProbe;
use contract_gate_probe::render_probe;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a JSON instance passed to `schema check`.
const MAX_INSTANCE_BYTES: usize = 4 * 1024 * 1024;
/// Exit code when a check ran and failed.
const EXIT_CHECK_FAILED: u8 = 1;
/// Exit code for usage, I/O, parse, and configuration errors.
const EXIT_ERROR: u8 = 2;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "contract-gate", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Config file path (defaults to contract-gate.toml or env override).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Directory to write report files into (overrides `reports.dir`).
    #[arg(long = "report-dir", value_name = "DIR", global = true)]
    report_dir: Option<PathBuf>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// OpenAPI contract utilities.
    Spec {
        /// Selected spec subcommand.
        #[command(subcommand)]
        command: SpecCommand,
    },
    /// JSON payload compliance utilities.
    Schema {
        /// Selected schema subcommand.
        #[command(subcommand)]
        command: SchemaCommand,
    },
    /// Detect breaking changes between two contract versions.
    Diff(DiffCommand),
    /// Probe a live API for response compliance.
    Probe(ProbeCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Spec subcommands.
#[derive(Subcommand, Debug)]
enum SpecCommand {
    /// Lint an OpenAPI contract.
    Validate(SpecValidateCommand),
    /// Summarize an OpenAPI contract.
    Info(SpecInfoCommand),
}

/// Schema subcommands.
#[derive(Subcommand, Debug)]
enum SchemaCommand {
    /// Validate a JSON instance against a contract schema.
    Check(SchemaCheckCommand),
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a Contract Gate configuration file.
    Validate,
}

/// Arguments for `spec validate`.
#[derive(Args, Debug)]
struct SpecValidateCommand {
    /// Contract path (defaults to `spec.path`).
    #[arg(long, value_name = "PATH")]
    spec: Option<PathBuf>,
    /// Report format (defaults to `reports.format`).
    #[arg(long, value_enum)]
    format: Option<FormatArg>,
}

/// Arguments for `spec info`.
#[derive(Args, Debug)]
struct SpecInfoCommand {
    /// Contract path (defaults to `spec.path`).
    #[arg(long, value_name = "PATH")]
    spec: Option<PathBuf>,
    /// Output format (defaults to `reports.format`).
    #[arg(long, value_enum)]
    format: Option<FormatArg>,
}

/// Arguments for `schema check`.
#[derive(Args, Debug)]
struct SchemaCheckCommand {
    /// Contract path (defaults to `spec.path`).
    #[arg(long, value_name = "PATH")]
    spec: Option<PathBuf>,
    /// Component schema name, e.g. `User`.
    #[arg(long, value_name = "NAME", conflicts_with = "operation", required_unless_present = "operation")]
    schema: Option<String>,
    /// Operation whose response schema applies, e.g. `"GET /users/{id}"`.
    #[arg(long, value_name = "OPERATION")]
    operation: Option<String>,
    /// Response status (defaults to the operation's success code).
    #[arg(long, value_name = "STATUS", requires = "operation")]
    status: Option<u16>,
    /// JSON instance file to validate.
    #[arg(long, value_name = "PATH")]
    instance: PathBuf,
    /// Report format (defaults to `reports.format`).
    #[arg(long, value_enum)]
    format: Option<FormatArg>,
}

/// Arguments for `diff`.
#[derive(Args, Debug)]
struct DiffCommand {
    /// Previous contract (defaults to `spec.baseline`).
    #[arg(long, value_name = "PATH")]
    old: Option<PathBuf>,
    /// Current contract (defaults to `spec.path`).
    #[arg(long, value_name = "PATH")]
    new: Option<PathBuf>,
    /// Report format (defaults to `reports.format`).
    #[arg(long, value_enum)]
    format: Option<FormatArg>,
    /// Lowest severity that fails the gate (defaults to `diff.fail_on`).
    #[arg(long = "fail-on", value_enum)]
    fail_on: Option<SeverityArg>,
}

/// Arguments for `probe`.
#[derive(Args, Debug)]
struct ProbeCommand {
    /// Contract path (defaults to `spec.path`).
    #[arg(long, value_name = "PATH")]
    spec: Option<PathBuf>,
    /// Base URL (defaults to `probe.base_url`, then the contract's first server).
    #[arg(long = "base-url", value_name = "URL")]
    base_url: Option<String>,
    /// Report format (defaults to `reports.format`).
    #[arg(long, value_enum)]
    format: Option<FormatArg>,
}

/// Report formats selectable on the command line.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum FormatArg {
    /// Plain text output.
    Text,
    /// Canonical JSON output.
    Json,
    /// Markdown output.
    Markdown,
}

/// Severities selectable for the diff gate.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum SeverityArg {
    /// Fail on any breaking change.
    Medium,
    /// Fail on high or critical changes.
    High,
    /// Fail on critical changes only.
    Critical,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for localized error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a localized message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

/// Errors returned by bounded file reads.
#[derive(Debug)]
enum ReadLimitError {
    /// File I/O failure.
    Io(std::io::Error),
    /// File size exceeds the configured limit.
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

// ============================================================================
// SECTION: Context
// ============================================================================

/// Settings shared by every check command.
struct CliContext {
    /// Loaded configuration.
    config: ContractGateConfig,
    /// Directory reports are written to, when any.
    report_dir: Option<PathBuf>,
    /// Audit sink for check events.
    audit: Box<dyn AuditSink>,
}

impl CliContext {
    /// Builds the context from global flags and the loaded configuration.
    fn new(config: ContractGateConfig, report_dir: Option<PathBuf>) -> CliResult<Self> {
        let report_dir = report_dir.or_else(|| config.reports.dir.as_ref().map(PathBuf::from));
        let audit: Box<dyn AuditSink> = if !config.audit.enabled {
            Box::new(NoopAuditSink)
        } else if let Some(path) = &config.audit.path {
            let sink = FileAuditSink::new(Path::new(path))
                .map_err(|err| CliError::new(t!("audit.open_failed", path = path, error = err)))?;
            Box::new(sink)
        } else {
            Box::new(StderrAuditSink)
        };
        Ok(Self {
            config,
            report_dir,
            audit,
        })
    }

    /// Resolves the report format from the flag or the config default.
    fn format(&self, flag: Option<FormatArg>) -> ReportFormat {
        flag.map_or(self.config.reports.format, ReportFormat::from)
    }

    /// Resolves the contract path from the flag or `spec.path`.
    fn spec_path(&self, flag: Option<&Path>) -> CliResult<PathBuf> {
        flag.map(Path::to_path_buf)
            .or_else(|| self.config.spec.path.as_ref().map(PathBuf::from))
            .ok_or_else(|| CliError::new(t!("spec.path_missing", flag = "--spec", key = "spec.path")))
    }

    /// Records one audit event.
    fn record(
        &self,
        check: CheckKind,
        subject: &str,
        outcome: CheckOutcome,
        finding_count: usize,
        document_hash: Option<HashDigest>,
    ) {
        self.audit.record(&CheckAuditEvent::new(CheckAuditEventParams {
            check,
            subject: subject.to_string(),
            outcome,
            finding_count,
            document_hash,
        }));
    }

    /// Records an error event when `result` failed, then passes it through.
    fn audited<T>(&self, check: CheckKind, subject: &str, result: CliResult<T>) -> CliResult<T> {
        if result.is_err() {
            self.record(check, subject, CheckOutcome::Error, 0, None);
        }
        result
    }

    /// Writes a rendered report to stdout and, when configured, to a file.
    fn emit(&self, stem: &str, format: ReportFormat, body: &str) -> CliResult<()> {
        let mut bytes = body.as_bytes().to_vec();
        if !body.ends_with('\n') {
            bytes.push(b'\n');
        }
        write_stdout_bytes(&bytes).map_err(|err| CliError::new(output_error("stdout", &err)))?;
        if let Some(dir) = &self.report_dir {
            let path = write_report(dir, stem, format, body)
                .map_err(|err| CliError::new(t!("report.write_failed", error = err)))?;
            write_stderr_line(&t!("report.written", path = path.display()))
                .map_err(|err| CliError::new(output_error("stderr", &err)))?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    let config = ContractGateConfig::load(cli.config.as_deref())
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    let context = CliContext::new(config, cli.report_dir)?;

    match command {
        Commands::Spec {
            command,
        } => command_spec(&context, command),
        Commands::Schema {
            command,
        } => command_schema(&context, command),
        Commands::Diff(command) => command_diff(&context, &command),
        Commands::Probe(command) => command_probe(&context, &command),
        Commands::Config {
            command,
        } => command_config(command),
    }
}

/// Emits the top-level help message for the CLI.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Spec Commands
// ============================================================================

/// Dispatches spec subcommands.
fn command_spec(context: &CliContext, command: SpecCommand) -> CliResult<ExitCode> {
    match command {
        SpecCommand::Validate(command) => command_spec_validate(context, &command),
        SpecCommand::Info(command) => command_spec_info(context, &command),
    }
}

/// Executes `spec validate`: lints the contract.
fn command_spec_validate(context: &CliContext, command: &SpecValidateCommand) -> CliResult<ExitCode> {
    let path = context.spec_path(command.spec.as_deref())?;
    let subject = path.display().to_string();
    let document = context.audited(CheckKind::Lint, &subject, load_document(&path))?;
    let report = lint_document(&document);
    let format = context.format(command.format);
    let body = context.audited(
        CheckKind::Lint,
        &subject,
        render_lint(&document, &report, format)
            .map_err(|err| CliError::new(t!("report.render_failed", error = err))),
    )?;
    context.emit("lint", format, &body)?;
    let outcome = outcome_of(report.is_valid());
    context.record(
        CheckKind::Lint,
        &subject,
        outcome,
        report.findings.len(),
        Some(document.digest().clone()),
    );
    Ok(exit_code(outcome))
}

/// Contract summary printed by `spec info`.
#[derive(Debug, Serialize)]
struct SpecInfo {
    /// Source label.
    document: String,
    /// Digest of the source bytes.
    document_hash: HashDigest,
    /// Declared `openapi` version.
    openapi: Option<String>,
    /// `info.title`.
    title: Option<String>,
    /// `info.version`.
    version: Option<String>,
    /// Declared server URLs.
    servers: Vec<String>,
    /// Operations as `METHOD /path`.
    operations: Vec<String>,
    /// Component schema names.
    schemas: Vec<String>,
}

impl SpecInfo {
    /// Collects the summary from a loaded document.
    fn from_document(document: &OpenApiDocument) -> Self {
        let servers = document
            .root()
            .get("servers")
            .and_then(Value::as_array)
            .map(|servers| {
                servers
                    .iter()
                    .filter_map(|server| server.get("url").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        Self {
            document: document.label(),
            document_hash: document.digest().clone(),
            openapi: document.openapi_version().map(str::to_string),
            title: document.title().map(str::to_string),
            version: document.version().map(str::to_string),
            servers,
            operations: document
                .operations()
                .into_iter()
                .map(|(path, method, _)| format!("{method} {path}"))
                .collect(),
            schemas: document
                .schemas()
                .map(|schemas| schemas.keys().cloned().collect())
                .unwrap_or_default(),
        }
    }

    /// Renders the summary as text or Markdown.
    fn render_lines(&self, markdown: bool) -> String {
        let unknown = || "?".to_string();
        let bullet = if markdown { "- " } else { "" };
        let mut lines = Vec::new();
        if markdown {
            lines.push(format!(
                "# {} {}\n",
                self.title.clone().unwrap_or_else(unknown),
                self.version.clone().unwrap_or_else(unknown)
            ));
        }
        lines.push(format!("{bullet}{}", t!("spec.info.document", document = self.document)));
        lines.push(format!("{bullet}{}", t!("spec.info.digest", digest = self.document_hash)));
        lines.push(format!(
            "{bullet}{}",
            t!("spec.info.openapi", version = self.openapi.clone().unwrap_or_else(unknown))
        ));
        lines.push(format!(
            "{bullet}{}",
            t!(
                "spec.info.title",
                title = self.title.clone().unwrap_or_else(unknown),
                version = self.version.clone().unwrap_or_else(unknown)
            )
        ));
        lines.push(format!(
            "{bullet}{}",
            t!("spec.info.servers", servers = list_or_none(&self.servers))
        ));
        lines.push(format!(
            "{bullet}{}",
            t!("spec.info.schemas", count = self.schemas.len(), names = list_or_none(&self.schemas))
        ));
        lines.push(format!("{bullet}{}", t!("spec.info.operations", count = self.operations.len())));
        for operation in &self.operations {
            if markdown {
                lines.push(format!("  - `{operation}`"));
            } else {
                lines.push(format!("  {operation}"));
            }
        }
        lines.join("\n")
    }
}

/// Executes `spec info`: prints a contract summary.
fn command_spec_info(context: &CliContext, command: &SpecInfoCommand) -> CliResult<ExitCode> {
    let path = context.spec_path(command.spec.as_deref())?;
    let document = load_document(&path)?;
    let info = SpecInfo::from_document(&document);
    let format = context.format(command.format);
    let body = match format {
        ReportFormat::Json => canonical_json(&info)
            .map_err(|err| CliError::new(t!("report.render_failed", error = err)))?,
        ReportFormat::Text => info.render_lines(false),
        ReportFormat::Markdown => info.render_lines(true),
    };
    context.emit("spec-info", format, &body)?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Schema Commands
// ============================================================================

/// Dispatches schema subcommands.
fn command_schema(context: &CliContext, command: SchemaCommand) -> CliResult<ExitCode> {
    match command {
        SchemaCommand::Check(command) => command_schema_check(context, &command),
    }
}

/// Executes `schema check`: validates a JSON instance against a schema.
fn command_schema_check(context: &CliContext, command: &SchemaCheckCommand) -> CliResult<ExitCode> {
    let path = context.spec_path(command.spec.as_deref())?;
    let fallback_subject = command
        .schema
        .clone()
        .or_else(|| command.operation.clone())
        .unwrap_or_else(|| path.display().to_string());
    let document = context.audited(CheckKind::Schema, &fallback_subject, load_document(&path))?;
    let instance =
        context.audited(CheckKind::Schema, &fallback_subject, read_instance(&command.instance))?;
    let (subject, schema) = context.audited(
        CheckKind::Schema,
        &fallback_subject,
        select_schema(&document, command),
    )?;
    let violations = context.audited(
        CheckKind::Schema,
        &subject,
        SchemaValidator::new()
            .validate(&instance, schema, Some(&document))
            .map_err(|err| CliError::new(t!("schema.compile_failed", subject = subject, error = err))),
    )?;
    let format = context.format(command.format);
    let body = render_violations(&subject, &violations, format)
        .map_err(|err| CliError::new(t!("report.render_failed", error = err)))?;
    context.emit("schema-check", format, &body)?;
    let outcome = outcome_of(violations.is_empty());
    context.record(
        CheckKind::Schema,
        &subject,
        outcome,
        violations.len(),
        Some(document.digest().clone()),
    );
    Ok(exit_code(outcome))
}

/// Picks the schema named by `--schema` or by `--operation` and `--status`.
fn select_schema<'a>(
    document: &'a OpenApiDocument,
    command: &SchemaCheckCommand,
) -> CliResult<(String, &'a Value)> {
    let document_error = |err: DocumentError| CliError::new(t!("schema.lookup_failed", error = err));
    if let Some(name) = &command.schema {
        let schema = document.schema(name).map_err(document_error)?;
        return Ok((name.clone(), schema));
    }
    let operation = command.operation.as_deref().unwrap_or_default();
    let (method, path) = parse_operation(operation)?;
    let status = match command.status {
        Some(status) => status.to_string(),
        None => document
            .success_status(path, method)
            .map_err(document_error)?
            .map(str::to_string)
            .ok_or_else(|| {
                CliError::new(t!("schema.no_success_status", operation = operation))
            })?,
    };
    let schema = document.response_schema(path, method, &status).map_err(document_error)?;
    Ok((format!("{method} {path} {status}"), schema))
}

/// Parses `"GET /users/{id}"` into a method and path template.
fn parse_operation(value: &str) -> CliResult<(HttpMethod, &str)> {
    let invalid = || CliError::new(t!("schema.operation_invalid", operation = value));
    let (method, path) = value.trim().split_once(' ').ok_or_else(invalid)?;
    let method = HttpMethod::parse(method).ok_or_else(invalid)?;
    let path = path.trim();
    if !path.starts_with('/') {
        return Err(invalid());
    }
    Ok((method, path))
}

/// Reads and parses the JSON instance file.
fn read_instance(path: &Path) -> CliResult<Value> {
    let bytes = read_bytes_with_limit(path, MAX_INSTANCE_BYTES).map_err(|err| match err {
        ReadLimitError::Io(err) => {
            CliError::new(t!("input.read_failed", path = path.display(), error = err))
        }
        ReadLimitError::TooLarge {
            size,
            limit,
        } => CliError::new(t!(
            "input.read_too_large",
            kind = "instance",
            path = path.display(),
            size = size,
            limit = limit
        )),
    })?;
    serde_json::from_slice(&bytes)
        .map_err(|err| CliError::new(t!("input.parse_failed", path = path.display(), error = err)))
}

// ============================================================================
// SECTION: Diff Command
// ============================================================================

/// Executes `diff`: reports breaking changes between two contracts.
fn command_diff(context: &CliContext, command: &DiffCommand) -> CliResult<ExitCode> {
    let old_path = command
        .old
        .clone()
        .or_else(|| context.config.spec.baseline.as_ref().map(PathBuf::from))
        .ok_or_else(|| {
            CliError::new(t!("spec.path_missing", flag = "--old", key = "spec.baseline"))
        })?;
    let new_path = context.spec_path(command.new.as_deref()).map_err(|_| {
        CliError::new(t!("spec.path_missing", flag = "--new", key = "spec.path"))
    })?;
    let subject = format!("{} -> {}", old_path.display(), new_path.display());
    let old = context.audited(CheckKind::Diff, &subject, load_document(&old_path))?;
    let new = context.audited(CheckKind::Diff, &subject, load_document(&new_path))?;
    let detector = BreakingChangeDetector::new(old, new);
    let changes = detector.detect_all_changes();
    let format = context.format(command.format);
    let body = render_diff(detector.old(), detector.new_document(), &changes, format)
        .map_err(|err| CliError::new(t!("report.render_failed", error = err)))?;
    context.emit("diff", format, &body)?;

    let fail_on = command.fail_on.map_or(context.config.diff.fail_on, Severity::from);
    let failed = highest_severity(&changes).is_some_and(|severity| severity >= fail_on);
    let outcome = outcome_of(!failed);
    context.record(
        CheckKind::Diff,
        &subject,
        outcome,
        changes.len(),
        Some(detector.new_document().digest().clone()),
    );
    Ok(exit_code(outcome))
}

// ============================================================================
// SECTION: Probe Command
// ============================================================================

/// Executes `probe`: runs the configured checks against a live API.
fn command_probe(context: &CliContext, command: &ProbeCommand) -> CliResult<ExitCode> {
    let path = context.spec_path(command.spec.as_deref())?;
    let document = context.audited(CheckKind::Probe, &path.display().to_string(), load_document(&path))?;
    let base_url = match command.base_url.clone().or_else(|| context.config.probe.base_url.clone()) {
        Some(url) => url,
        None => document
            .base_url()
            .map(str::to_string)
            .map_err(|err| CliError::new(t!("probe.base_url_missing", error = err)))?,
    };
    let checks = &context.config.probe.checks;
    if checks.is_empty() {
        return Err(CliError::new(t!("probe.no_checks")));
    }
    let probe = context.audited(
        CheckKind::Probe,
        &base_url,
        ComplianceProbe::new(context.config.probe.to_probe_config())
            .map_err(|err| CliError::new(t!("probe.init_failed", error = err))),
    )?;
    let report = probe.run_all(&document, &base_url, checks);
    let format = context.format(command.format);
    let body = render_probe(&report, format)
        .map_err(|err| CliError::new(t!("report.render_failed", error = err)))?;
    context.emit("probe", format, &body)?;
    let outcome = outcome_of(report.is_success());
    context.record(
        CheckKind::Probe,
        &base_url,
        outcome,
        report.failed,
        Some(document.digest().clone()),
    );
    Ok(exit_code(outcome))
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate => {
            write_stdout_line(&t!("config.validate.ok"))
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Loads a contract document with a localized error.
fn load_document(path: &Path) -> CliResult<OpenApiDocument> {
    OpenApiDocument::load(path).map_err(|err| {
        CliError::new(t!("spec.load_failed", path = path.display(), error = err))
    })
}

/// Maps a pass/fail verdict to an audit outcome.
const fn outcome_of(passed: bool) -> CheckOutcome {
    if passed { CheckOutcome::Passed } else { CheckOutcome::Failed }
}

/// Maps a check outcome to the process exit code.
fn exit_code(outcome: CheckOutcome) -> ExitCode {
    match outcome {
        CheckOutcome::Passed => ExitCode::SUCCESS,
        CheckOutcome::Failed => ExitCode::from(EXIT_CHECK_FAILED),
        CheckOutcome::Error => ExitCode::from(EXIT_ERROR),
    }
}

/// Joins names for display, or `none`.
fn list_or_none(items: &[String]) -> String {
    if items.is_empty() { t!("spec.info.none") } else { items.join(", ") }
}

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let metadata = file.metadata().map_err(ReadLimitError::Io)?;
    let size = metadata.len();
    let limit = u64::try_from(max_bytes).map_err(|_| ReadLimitError::TooLarge {
        size,
        limit: max_bytes,
    })?;
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }

    let mut limited = file.take(limit.saturating_add(1));
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        let actual = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        return Err(ReadLimitError::TooLarge {
            size: actual,
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

/// Converts CLI format selections into report formats.
impl From<FormatArg> for ReportFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Text => Self::Text,
            FormatArg::Json => Self::Json,
            FormatArg::Markdown => Self::Markdown,
        }
    }
}

/// Converts CLI severity selections into diff severities.
impl From<SeverityArg> for Severity {
    fn from(value: SeverityArg) -> Self {
        match value {
            SeverityArg::Medium => Self::Medium,
            SeverityArg::High => Self::High,
            SeverityArg::Critical => Self::Critical,
        }
    }
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes raw bytes to stdout without adding a newline.
fn write_stdout_bytes(bytes: &[u8]) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(bytes)
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats a localized output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns the error exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::from(EXIT_ERROR)
}
