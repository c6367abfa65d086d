// crates/contract-gate-core/src/hashing.rs
// ============================================================================
// Module: Contract Gate Document Hashing
// Description: Content digests for loaded contract documents.
// Purpose: Tie reports and audit events to the exact bytes that were checked.
// Dependencies: serde, sha2
// ============================================================================

//! ## Overview
//! Documents are hashed over their raw source bytes with SHA-256 so that two
//! reports can be matched to the same contract revision.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;

// ============================================================================
// SECTION: Hash Digest
// ============================================================================

/// Prefix naming the digest algorithm in rendered and serialized digests.
const ALGORITHM_PREFIX: &str = "sha256:";

/// SHA-256 content digest, lowercase hex encoded.
///
/// Serializes as `sha256:<hex>`, the same form `Display` prints.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct HashDigest(String);

impl HashDigest {
    /// Hashes raw bytes.
    #[must_use]
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self(hex_encode(&hasher.finalize()))
    }

    /// Returns the hex-encoded digest.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the first twelve hex characters for compact display.
    #[must_use]
    pub fn short(&self) -> &str {
        self.0.get(.. 12).unwrap_or(&self.0)
    }
}

impl fmt::Display for HashDigest {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{ALGORITHM_PREFIX}{}", self.0)
    }
}

impl From<HashDigest> for String {
    fn from(digest: HashDigest) -> Self {
        digest.to_string()
    }
}

impl TryFrom<String> for HashDigest {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let hex = value
            .strip_prefix(ALGORITHM_PREFIX)
            .ok_or_else(|| format!("digest must start with {ALGORITHM_PREFIX}"))?;
        if hex.len() != 64 || !hex.bytes().all(|byte| matches!(byte, b'0'..=b'9' | b'a'..=b'f')) {
            return Err(format!("digest must be 64 lowercase hex characters: {hex}"));
        }
        Ok(Self(hex.to_string()))
    }
}

// ============================================================================
// SECTION: Hex Encoding
// ============================================================================

/// Encodes bytes as a lowercase hex string.
fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    out
}

// ============================================================================
// SECTION: Tests
// ============================================================================
