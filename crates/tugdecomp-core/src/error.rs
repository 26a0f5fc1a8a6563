//! Error types and error code constants for tugdecomp.
//!
//! Two layers:
//! - [`RenderError`]: internal-consistency faults raised while rendering a
//!   tree. Every variant carries the offending node kind and its source line.
//! - [`DecompError`]: the unified error for CLI output, bridging render
//!   failures, input problems, and argument errors.
//!
//! Pruning ("this subtree is fully rendered") is a dispatch result, not an
//! error, and never appears here.
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments (bad revision, bad flags)
//! - `3`: Input errors (file not found, malformed tree JSON)
//! - `4`: Unsupported construct (render faults)
//! - `10`: Internal errors (bugs, unexpected state)

use std::fmt;

use thiserror::Error;

use crate::tree::Tree;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Error codes for JSON output.
///
/// These codes map to CLI exit codes and appear in JSON error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller.
    InvalidArguments = 2,
    /// Input could not be read or deserialized.
    InputError = 3,
    /// The tree contains a shape the renderer cannot reconstruct.
    UnsupportedConstruct = 4,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Render Faults
// ============================================================================

fn location(line: &Option<u32>) -> String {
    match line {
        Some(n) => format!(" at line {n}"),
        None => String::new(),
    }
}

/// A fatal fault while rendering one tree.
///
/// These indicate an unsupported bytecode shape or a registry/tree mismatch
/// and abort the whole render.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// Packed argument counts disagree with the number of children present.
    #[error("'{kind}'{}: argument count expects {expected} children, found {found}", location(.line))]
    ArgCountMismatch {
        kind: String,
        line: Option<u32>,
        expected: usize,
        found: usize,
    },

    /// A selector or handler addressed a child that does not exist.
    #[error("'{kind}'{}: no child at index {index} (node has {len})", location(.line))]
    MissingChild {
        kind: String,
        line: Option<u32>,
        index: isize,
        len: usize,
    },

    /// A child was present but had the wrong kind.
    #[error("'{kind}'{}: expected '{expected}', found '{found}'", location(.line))]
    UnexpectedKind {
        kind: String,
        line: Option<u32>,
        expected: String,
        found: String,
    },

    /// The trailing call opcode is not a known call variant.
    #[error("'{kind}'{}: unrecognized call opcode '{opcode}'", location(.line))]
    UnknownCallVariant {
        kind: String,
        line: Option<u32>,
        opcode: String,
    },

    /// A construct recognized but deliberately not reconstructed.
    #[error("'{kind}'{}: unsupported construct: {reason}", location(.line))]
    Unsupported {
        kind: String,
        line: Option<u32>,
        reason: String,
    },

    /// A template's directives and selectors disagree in number.
    #[error("'{kind}'{}: template '{format}' has {directives} child directives but {selectors} selectors", location(.line))]
    TemplateArity {
        kind: String,
        line: Option<u32>,
        format: String,
        directives: usize,
        selectors: usize,
    },

    /// A template asked for an attribute nobody supplies.
    #[error("'{kind}'{}: unknown template attribute '{name}'", location(.line))]
    UnknownAttribute {
        kind: String,
        line: Option<u32>,
        name: String,
    },
}

impl RenderError {
    pub fn arg_count(node: &Tree, expected: usize, found: usize) -> Self {
        RenderError::ArgCountMismatch {
            kind: node.kind().to_string(),
            line: node.line(),
            expected,
            found,
        }
    }

    pub fn missing_child(node: &Tree, index: isize) -> Self {
        RenderError::MissingChild {
            kind: node.kind().to_string(),
            line: node.line(),
            index,
            len: node.len(),
        }
    }

    pub fn unexpected_kind(node: &Tree, expected: impl Into<String>, found: &Tree) -> Self {
        RenderError::UnexpectedKind {
            kind: node.kind().to_string(),
            line: node.line(),
            expected: expected.into(),
            found: found.kind().to_string(),
        }
    }

    pub fn unknown_call_variant(node: &Tree, opcode: impl Into<String>) -> Self {
        RenderError::UnknownCallVariant {
            kind: node.kind().to_string(),
            line: node.line(),
            opcode: opcode.into(),
        }
    }

    pub fn unsupported(node: &Tree, reason: impl Into<String>) -> Self {
        RenderError::Unsupported {
            kind: node.kind().to_string(),
            line: node.line(),
            reason: reason.into(),
        }
    }

    pub fn unknown_attribute(node: &Tree, name: impl Into<String>) -> Self {
        RenderError::UnknownAttribute {
            kind: node.kind().to_string(),
            line: node.line(),
            name: name.into(),
        }
    }

    /// Kind of the node the fault was raised on.
    pub fn kind(&self) -> &str {
        match self {
            RenderError::ArgCountMismatch { kind, .. }
            | RenderError::MissingChild { kind, .. }
            | RenderError::UnexpectedKind { kind, .. }
            | RenderError::UnknownCallVariant { kind, .. }
            | RenderError::Unsupported { kind, .. }
            | RenderError::TemplateArity { kind, .. }
            | RenderError::UnknownAttribute { kind, .. } => kind,
        }
    }

    /// Source line of the offending node, when known.
    pub fn line(&self) -> Option<u32> {
        match self {
            RenderError::ArgCountMismatch { line, .. }
            | RenderError::MissingChild { line, .. }
            | RenderError::UnexpectedKind { line, .. }
            | RenderError::UnknownCallVariant { line, .. }
            | RenderError::Unsupported { line, .. }
            | RenderError::TemplateArity { line, .. }
            | RenderError::UnknownAttribute { line, .. } => *line,
        }
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for CLI output.
#[derive(Debug, Error)]
pub enum DecompError {
    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// Input file not found.
    #[error("file not found: {path}")]
    FileNotFound { path: String },

    /// Input is not a well-formed tree.
    #[error("invalid tree: {message}")]
    InvalidTree { message: String },

    /// Rendering failed.
    #[error("render failed: {0}")]
    Render(#[from] RenderError),

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    InternalError { message: String },
}

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&DecompError> for OutputErrorCode {
    fn from(err: &DecompError) -> Self {
        match err {
            DecompError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            DecompError::FileNotFound { .. } => OutputErrorCode::InputError,
            DecompError::InvalidTree { .. } => OutputErrorCode::InputError,
            DecompError::Render(_) => OutputErrorCode::UnsupportedConstruct,
            DecompError::InternalError { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl From<DecompError> for OutputErrorCode {
    fn from(err: DecompError) -> Self {
        OutputErrorCode::from(&err)
    }
}

// ============================================================================
// Bridges
// ============================================================================

impl From<serde_json::Error> for DecompError {
    fn from(err: serde_json::Error) -> Self {
        DecompError::InvalidTree {
            message: err.to_string(),
        }
    }
}

impl From<crate::revision::ParseRevisionError> for DecompError {
    fn from(err: crate::revision::ParseRevisionError) -> Self {
        DecompError::invalid_args(err.to_string())
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl DecompError {
    /// Create an invalid arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        DecompError::InvalidArguments {
            message: message.into(),
        }
    }

    /// Create a file not found error.
    pub fn file_not_found(path: impl Into<String>) -> Self {
        DecompError::FileNotFound { path: path.into() }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        DecompError::InternalError {
            message: message.into(),
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}

// ============================================================================
// Tests
// ============================================================================
