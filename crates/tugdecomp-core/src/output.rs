//! JSON output types and serialization for CLI responses.
//!
//! ## Principles
//!
//! 1. **Status first:** Every response has `status` as first field
//! 2. **Deterministic:** Same input -> same output (field order, array ordering)
//! 3. **Versioned:** Schema version in response enables forward compatibility

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::error::{DecompError, OutputErrorCode, RenderError};
use crate::revision::Revision;

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

// ============================================================================
// Error Output
// ============================================================================

/// Source position of a render fault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultLocation {
    /// Kind of the offending node.
    pub kind: String,
    /// Source line, when the tree recorded one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

/// Error details for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Numeric error code.
    pub code: u8,
    /// Human-readable message.
    pub message: String,
    /// Offending node, for render faults.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<FaultLocation>,
}

impl ErrorInfo {
    /// Create from a DecompError.
    pub fn from_error(err: &DecompError) -> Self {
        let location = match err {
            DecompError::Render(render) => Some(FaultLocation::from(render)),
            _ => None,
        };
        ErrorInfo {
            code: OutputErrorCode::from(err).code(),
            message: err.to_string(),
            location,
        }
    }
}

impl From<&RenderError> for FaultLocation {
    fn from(err: &RenderError) -> Self {
        FaultLocation {
            kind: err.kind().to_string(),
            line: err.line(),
        }
    }
}

/// Error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Status: "error".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// Error information.
    pub error: ErrorInfo,
}

impl ErrorResponse {
    /// Create an error response from a DecompError.
    pub fn from_error(err: &DecompError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

// ============================================================================
// Response Structs
// ============================================================================

/// Response for the render command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderResponse {
    /// Status: "ok".
    pub status: String,
    pub schema_version: String,
    /// Revision the tree was rendered for.
    pub revision: Revision,
    /// Reconstructed source text.
    pub source: String,
}

impl RenderResponse {
    pub fn new(revision: Revision, source: impl Into<String>) -> Self {
        RenderResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            revision,
            source: source.into(),
        }
    }
}

/// One entry of the active rule table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleInfo {
    /// Node kind the rule is registered for.
    pub tag: String,
    /// `template`, `handler`, or `variants`.
    pub rule: String,
    /// Format string, for template rules.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

/// One entry of the active precedence table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrecedenceInfo {
    pub tag: String,
    pub value: u32,
}

/// Response for the rules command.
///
/// Both lists are sorted by tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesResponse {
    /// Status: "ok".
    pub status: String,
    pub schema_version: String,
    pub revision: Revision,
    pub rules: Vec<RuleInfo>,
    pub precedence: Vec<PrecedenceInfo>,
}

impl RulesResponse {
    pub fn new(revision: Revision, rules: Vec<RuleInfo>, precedence: Vec<PrecedenceInfo>) -> Self {
        RulesResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            revision,
            rules,
            precedence,
        }
    }
}

// ============================================================================
// Emit
// ============================================================================

/// Emit a response as pretty-printed JSON to a writer.
///
/// The output is deterministic: same input produces identical bytes.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

// ============================================================================
// Tests
// ============================================================================
