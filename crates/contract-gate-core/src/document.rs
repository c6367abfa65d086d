// crates/contract-gate-core/src/document.rs
// ============================================================================
// Module: OpenAPI Document Loader
// Description: Bounded loading and navigation of OpenAPI 3.0 documents.
// Purpose: Give every check a single, validated view of the contract.
// Dependencies: serde_json, serde_yaml, thiserror
// ============================================================================

//! ## Overview
//! An [`OpenApiDocument`] wraps the parsed root object of a contract together
//! with the digest of its source bytes. YAML and JSON sources are both read
//! into a `serde_json::Value` tree; YAML mapping keys that are not strings
//! (for example unquoted `200:` response codes) are stringified during
//! conversion so lookups behave the same for both formats.
//!
//! Navigation helpers return [`DocumentError`] rather than `None` so callers
//! can surface precise "what was missing where" diagnostics.
//!
//! ## Invariants
//! - The root is always a JSON object.
//! - Only local (`#/...`) references are resolved; chains are bounded by
//!   [`MAX_REF_DEPTH`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Number;
use serde_json::Value;
use thiserror::Error;

use crate::hashing::HashDigest;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a contract document in bytes.
pub const MAX_DOCUMENT_BYTES: usize = 4 * 1024 * 1024;
/// Maximum number of `$ref` hops followed before giving up.
pub const MAX_REF_DEPTH: usize = 32;
/// Media type used for JSON request and response bodies.
const JSON_MEDIA_TYPE: &str = "application/json";

// ============================================================================
// SECTION: HTTP Methods
// ============================================================================

/// HTTP methods that may appear as operations under an OpenAPI path item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `PUT`
    Put,
    /// `POST`
    Post,
    /// `DELETE`
    Delete,
    /// `OPTIONS`
    Options,
    /// `HEAD`
    Head,
    /// `PATCH`
    Patch,
    /// `TRACE`
    Trace,
}

impl HttpMethod {
    /// Every method, in OpenAPI path item order.
    pub const ALL: [Self; 8] = [
        Self::Get,
        Self::Put,
        Self::Post,
        Self::Delete,
        Self::Options,
        Self::Head,
        Self::Patch,
        Self::Trace,
    ];

    /// Returns the lowercase key used inside a path item.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Put => "put",
            Self::Post => "post",
            Self::Delete => "delete",
            Self::Options => "options",
            Self::Head => "head",
            Self::Patch => "patch",
            Self::Trace => "trace",
        }
    }

    /// Returns the uppercase label used in messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Post => "POST",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
            Self::Head => "HEAD",
            Self::Patch => "PATCH",
            Self::Trace => "TRACE",
        }
    }

    /// Parses a method name case-insensitively.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|method| method.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.label())
    }
}

// ============================================================================
// SECTION: Source Format
// ============================================================================

/// Serialization format of a contract source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    /// YAML source (also accepts JSON, which is a YAML subset).
    Yaml,
    /// Strict JSON source.
    Json,
}

impl DocumentFormat {
    /// Picks the format from a file extension; anything but `.json` is YAML.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|extension| extension.to_str()) {
            Some(extension) if extension.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }

    /// Returns the lowercase label for the format.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Yaml => "yaml",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.label())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while loading or navigating a contract document.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    /// The source could not be read.
    #[error("failed to read {path}: {error}")]
    Io {
        /// Source path.
        path: String,
        /// Underlying I/O error message.
        error: String,
    },
    /// The source exceeds [`MAX_DOCUMENT_BYTES`].
    #[error("document is {size} bytes (limit {limit})")]
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
    /// The source is not valid YAML or JSON.
    #[error("invalid {format} syntax: {error}")]
    Parse {
        /// Format that failed to parse.
        format: DocumentFormat,
        /// Underlying parse error message.
        error: String,
    },
    /// The source contains no document.
    #[error("document is empty")]
    Empty,
    /// The document root is not an object.
    #[error("document root must be an object")]
    NotAnObject,
    /// No component schema with the given name.
    #[error("schema '{0}' not found in spec")]
    SchemaNotFound(String),
    /// No path item with the given template.
    #[error("path '{0}' not found in spec")]
    PathNotFound(String),
    /// The path item has no such operation.
    #[error("method '{method}' not found for path '{path}'")]
    OperationNotFound {
        /// Requested method.
        method: HttpMethod,
        /// Path template.
        path: String,
    },
    /// The operation declares no such response.
    #[error("response {status} not found for {method} {path}")]
    ResponseNotFound {
        /// Requested method.
        method: HttpMethod,
        /// Path template.
        path: String,
        /// Requested status code.
        status: String,
    },
    /// The response declares no JSON body.
    #[error("no JSON response defined for {method} {path} {status}")]
    NoJsonContent {
        /// Requested method.
        method: HttpMethod,
        /// Path template.
        path: String,
        /// Requested status code.
        status: String,
    },
    /// The document has no `servers` entry with a URL.
    #[error("no servers defined in spec")]
    NoServers,
    /// A `$ref` points outside the document.
    #[error("unsupported non-local reference '{0}'")]
    UnsupportedRef(String),
    /// A local `$ref` points at nothing.
    #[error("reference '{0}' does not resolve")]
    UnresolvedRef(String),
    /// A `$ref` chain is longer than [`MAX_REF_DEPTH`] (usually a cycle).
    #[error("reference chain starting at '{0}' exceeds depth limit")]
    RefDepthExceeded(String),
}

/// A `$ref` that does not resolve inside the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedRef {
    /// JSON pointer of the object carrying the `$ref`.
    pub location: String,
    /// The reference string itself.
    pub reference: String,
}

// ============================================================================
// SECTION: Document
// ============================================================================

/// A parsed OpenAPI document.
#[derive(Debug, Clone)]
pub struct OpenApiDocument {
    /// Parsed root object.
    root: Value,
    /// Source path when loaded from disk.
    source: Option<PathBuf>,
    /// Source serialization format.
    format: DocumentFormat,
    /// Digest of the source bytes.
    digest: HashDigest,
}

impl OpenApiDocument {
    /// Loads a document from disk, enforcing [`MAX_DOCUMENT_BYTES`].
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] when the file cannot be read, is too large,
    /// does not parse, or does not hold an object.
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let bytes = read_bounded(path, MAX_DOCUMENT_BYTES)?;
        let input = std::str::from_utf8(&bytes).map_err(|err| DocumentError::Parse {
            format: DocumentFormat::from_path(path),
            error: format!("document must be utf-8: {err}"),
        })?;
        let mut document = Self::parse(input, DocumentFormat::from_path(path))?;
        document.source = Some(path.to_path_buf());
        Ok(document)
    }

    /// Parses a document from an in-memory string.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] when parsing fails or the root is not an object.
    pub fn parse(input: &str, format: DocumentFormat) -> Result<Self, DocumentError> {
        if input.trim().is_empty() {
            return Err(DocumentError::Empty);
        }
        let root = match format {
            DocumentFormat::Json => {
                serde_json::from_str(input).map_err(|err| DocumentError::Parse {
                    format,
                    error: err.to_string(),
                })?
            }
            DocumentFormat::Yaml => {
                let yaml_error = |err: serde_yaml::Error| DocumentError::Parse {
                    format,
                    error: err.to_string(),
                };
                let mut yaml: serde_yaml::Value = serde_yaml::from_str(input).map_err(yaml_error)?;
                yaml.apply_merge().map_err(yaml_error)?;
                yaml_to_json(yaml)?
            }
        };
        let mut document = Self::from_value(root)?;
        document.format = format;
        document.digest = HashDigest::of_bytes(input.as_bytes());
        Ok(document)
    }

    /// Wraps an already-parsed value.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Empty`] for `null` and
    /// [`DocumentError::NotAnObject`] for any other non-object root.
    pub fn from_value(root: Value) -> Result<Self, DocumentError> {
        match root {
            Value::Null => Err(DocumentError::Empty),
            Value::Object(_) => {
                let digest = HashDigest::of_bytes(&serde_json::to_vec(&root).unwrap_or_default());
                Ok(Self {
                    root,
                    source: None,
                    format: DocumentFormat::Json,
                    digest,
                })
            }
            _ => Err(DocumentError::NotAnObject),
        }
    }

    /// Returns the parsed root object.
    #[must_use]
    pub const fn root(&self) -> &Value {
        &self.root
    }

    /// Returns the source path when loaded from disk.
    #[must_use]
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Returns the source format.
    #[must_use]
    pub const fn format(&self) -> DocumentFormat {
        self.format
    }

    /// Returns the digest of the source bytes.
    #[must_use]
    pub const fn digest(&self) -> &HashDigest {
        &self.digest
    }

    /// Returns a display label: the source path, or the title for in-memory documents.
    #[must_use]
    pub fn label(&self) -> String {
        self.source.as_ref().map_or_else(
            || self.title().unwrap_or("<inline>").to_string(),
            |path| path.display().to_string(),
        )
    }

    /// Returns the declared `openapi` version string.
    #[must_use]
    pub fn openapi_version(&self) -> Option<&str> {
        self.root.get("openapi").and_then(Value::as_str)
    }

    /// Returns `info.title`.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.root.pointer("/info/title").and_then(Value::as_str)
    }

    /// Returns `info.version`.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.root.pointer("/info/version").and_then(Value::as_str)
    }

    /// Returns `components.schemas`, if present.
    #[must_use]
    pub fn schemas(&self) -> Option<&Map<String, Value>> {
        self.root.pointer("/components/schemas").and_then(Value::as_object)
    }

    /// Returns a named component schema.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::SchemaNotFound`] when the schema is absent.
    pub fn schema(&self, name: &str) -> Result<&Value, DocumentError> {
        self.schemas()
            .and_then(|schemas| schemas.get(name))
            .ok_or_else(|| DocumentError::SchemaNotFound(name.to_string()))
    }

    /// Returns the `paths` object, if present.
    #[must_use]
    pub fn paths(&self) -> Option<&Map<String, Value>> {
        self.root.get("paths").and_then(Value::as_object)
    }

    /// Returns every declared operation as `(path, method, operation)`.
    #[must_use]
    pub fn operations(&self) -> Vec<(&str, HttpMethod, &Value)> {
        let mut operations = Vec::new();
        let Some(paths) = self.paths() else {
            return operations;
        };
        for (path, item) in paths {
            for method in HttpMethod::ALL {
                if let Some(operation) = item.get(method.as_str()) {
                    operations.push((path.as_str(), method, operation));
                }
            }
        }
        operations
    }

    /// Returns the operation for a path template and method.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::PathNotFound`] or
    /// [`DocumentError::OperationNotFound`].
    pub fn operation(&self, path: &str, method: HttpMethod) -> Result<&Value, DocumentError> {
        let item = self
            .paths()
            .and_then(|paths| paths.get(path))
            .ok_or_else(|| DocumentError::PathNotFound(path.to_string()))?;
        item.get(method.as_str()).ok_or_else(|| DocumentError::OperationNotFound {
            method,
            path: path.to_string(),
        })
    }

    /// Returns the JSON body schema of an operation's response.
    ///
    /// Range keys match case-insensitively, so `2XX` also finds `2xx`.
    /// Response objects given as `$ref` are resolved first. The exact
    /// `application/json` media type is preferred; otherwise any JSON media
    /// type (`application/json; charset=...`, `application/*+json`) is used.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] when the operation, response, or JSON body is
    /// missing, or when a reference does not resolve.
    pub fn response_schema(
        &self,
        path: &str,
        method: HttpMethod,
        status: &str,
    ) -> Result<&Value, DocumentError> {
        let operation = self.operation(path, method)?;
        let response = operation
            .get("responses")
            .and_then(Value::as_object)
            .and_then(|responses| {
                responses.get(status).or_else(|| {
                    responses
                        .iter()
                        .find(|(code, _)| code.eq_ignore_ascii_case(status))
                        .map(|(_, response)| response)
                })
            })
            .ok_or_else(|| DocumentError::ResponseNotFound {
                method,
                path: path.to_string(),
                status: status.to_string(),
            })?;
        let response = self.resolve_schema_ref(response)?;
        let no_json = || DocumentError::NoJsonContent {
            method,
            path: path.to_string(),
            status: status.to_string(),
        };
        let content = response.get("content").and_then(Value::as_object).ok_or_else(no_json)?;
        let media = content.get(JSON_MEDIA_TYPE).or_else(|| {
            content.iter().find(|(name, _)| is_json_media_type(name)).map(|(_, media)| media)
        });
        media.and_then(|media| media.get("schema")).ok_or_else(no_json)
    }

    /// Returns the lowest declared `2XX` response code of an operation.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] when the operation does not exist.
    pub fn success_status(
        &self,
        path: &str,
        method: HttpMethod,
    ) -> Result<Option<&str>, DocumentError> {
        let operation = self.operation(path, method)?;
        Ok(success_code(operation))
    }

    /// Returns the URL of the first declared server.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::NoServers`] when no server URL is declared.
    pub fn base_url(&self) -> Result<&str, DocumentError> {
        self.root
            .get("servers")
            .and_then(Value::as_array)
            .and_then(|servers| servers.first())
            .and_then(|server| server.get("url"))
            .and_then(Value::as_str)
            .ok_or(DocumentError::NoServers)
    }

    /// Follows `$ref` until a concrete schema (or response) object is reached.
    ///
    /// Objects without `$ref` are returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] for non-local, dangling, or over-long chains.
    pub fn resolve_schema_ref<'a>(&'a self, schema: &'a Value) -> Result<&'a Value, DocumentError> {
        let mut current = schema;
        for _ in 0 .. MAX_REF_DEPTH {
            let Some(reference) = current.get("$ref").and_then(Value::as_str) else {
                return Ok(current);
            };
            current = self.resolve_pointer(reference)?;
        }
        let start = schema.get("$ref").and_then(Value::as_str).unwrap_or_default();
        Err(DocumentError::RefDepthExceeded(start.to_string()))
    }

    /// Resolves a single local reference such as `#/components/schemas/User`.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::UnsupportedRef`] for non-local references and
    /// [`DocumentError::UnresolvedRef`] when the pointer matches nothing.
    pub fn resolve_pointer(&self, reference: &str) -> Result<&Value, DocumentError> {
        let Some(pointer) = reference.strip_prefix('#') else {
            return Err(DocumentError::UnsupportedRef(reference.to_string()));
        };
        self.root
            .pointer(pointer)
            .ok_or_else(|| DocumentError::UnresolvedRef(reference.to_string()))
    }

    /// Lists every `$ref` in the document that does not resolve locally.
    ///
    /// Results are ordered by location: object keys sort lexically and array
    /// items follow their index.
    #[must_use]
    pub fn unresolved_refs(&self) -> Vec<UnresolvedRef> {
        let mut unresolved = Vec::new();
        self.collect_unresolved(&self.root, &mut String::new(), &mut unresolved);
        unresolved
    }

    /// Walks `value` depth-first, recording dangling references.
    fn collect_unresolved(
        &self,
        value: &Value,
        location: &mut String,
        unresolved: &mut Vec<UnresolvedRef>,
    ) {
        match value {
            Value::Object(map) => {
                if let Some(reference) = map.get("$ref").and_then(Value::as_str)
                    && self.resolve_pointer(reference).is_err()
                {
                    unresolved.push(UnresolvedRef {
                        location: if location.is_empty() {
                            "/".to_string()
                        } else {
                            location.clone()
                        },
                        reference: reference.to_string(),
                    });
                }
                for (key, child) in map {
                    let len = location.len();
                    location.push('/');
                    location.push_str(&escape_pointer_token(key));
                    self.collect_unresolved(child, location, unresolved);
                    location.truncate(len);
                }
            }
            Value::Array(items) => {
                for (index, child) in items.iter().enumerate() {
                    let len = location.len();
                    location.push('/');
                    location.push_str(&index.to_string());
                    self.collect_unresolved(child, location, unresolved);
                    location.truncate(len);
                }
            }
            _ => {}
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the lowest `2XX` key of an operation's `responses` map.
pub(crate) fn success_code(operation: &Value) -> Option<&str> {
    operation
        .get("responses")
        .and_then(Value::as_object)?
        .keys()
        .map(String::as_str)
        .find(|code| code.starts_with('2'))
}

/// Returns true for JSON media types other than the exact `application/json`.
fn is_json_media_type(name: &str) -> bool {
    let essence = name.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    essence == JSON_MEDIA_TYPE || essence.ends_with("+json")
}

/// Escapes a JSON pointer reference token (RFC 6901).
pub(crate) fn escape_pointer_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

/// Reads a file while enforcing a hard size limit.
fn read_bounded(path: &Path, max_bytes: usize) -> Result<Vec<u8>, DocumentError> {
    let io_error = |err: std::io::Error| DocumentError::Io {
        path: path.display().to_string(),
        error: err.to_string(),
    };
    let file = File::open(path).map_err(io_error)?;
    let size = file.metadata().map_err(io_error)?.len();
    let limit = u64::try_from(max_bytes).unwrap_or(u64::MAX);
    if size > limit {
        return Err(DocumentError::TooLarge {
            size,
            limit: max_bytes,
        });
    }
    let mut bytes = Vec::new();
    file.take(limit.saturating_add(1)).read_to_end(&mut bytes).map_err(io_error)?;
    if bytes.len() > max_bytes {
        return Err(DocumentError::TooLarge {
            size: u64::try_from(bytes.len()).unwrap_or(u64::MAX),
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

/// Converts a YAML tree into JSON, stringifying scalar mapping keys.
fn yaml_to_json(value: serde_yaml::Value) -> Result<Value, DocumentError> {
    let parse_error = |error: String| DocumentError::Parse {
        format: DocumentFormat::Yaml,
        error,
    };
    Ok(match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(flag) => Value::Bool(flag),
        serde_yaml::Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                Value::Number(int.into())
            } else if let Some(uint) = number.as_u64() {
                Value::Number(uint.into())
            } else {
                let float = number.as_f64().unwrap_or(f64::NAN);
                Value::Number(
                    Number::from_f64(float)
                        .ok_or_else(|| parse_error(format!("non-finite number {number}")))?,
                )
            }
        }
        serde_yaml::Value::String(text) => Value::String(text),
        serde_yaml::Value::Sequence(items) => {
            Value::Array(items.into_iter().map(yaml_to_json).collect::<Result<_, _>>()?)
        }
        serde_yaml::Value::Mapping(mapping) => {
            let mut map = Map::with_capacity(mapping.len());
            for (key, child) in mapping {
                let key = match key {
                    serde_yaml::Value::String(text) => text,
                    serde_yaml::Value::Number(number) => number.to_string(),
                    serde_yaml::Value::Bool(flag) => flag.to_string(),
                    serde_yaml::Value::Null => "null".to_string(),
                    _ => return Err(parse_error("mapping keys must be scalars".to_string())),
                };
                map.insert(key, yaml_to_json(child)?);
            }
            Value::Object(map)
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(tagged.value)?,
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================
