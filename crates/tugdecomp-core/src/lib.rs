//! Core infrastructure for tugdecomp.
//!
//! This crate provides the pieces shared by the semantic-action layer and the
//! command-line front door:
//! - Parse tree model handed over by the grammar/parser collaborator
//! - Dialect revisions of the bytecode instruction set
//! - Error types and error codes
//! - JSON output types for CLI responses

pub mod error;
pub mod output;
pub mod revision;
pub mod tree;

pub use error::{DecompError, OutputErrorCode, RenderError};
pub use revision::{ParseRevisionError, Revision};
pub use tree::{Attr, CodeObject, Node, Token, Tree};
