//! CLI front door.
//!
//! Provides the command implementations behind the `tugdecomp` binary:
//! - `render` - Render a JSON parse tree to source text
//! - `rules` - List the rule and precedence tables of one revision
//!
//! ## Input
//!
//! A tree file holds either a bare tree or an envelope naming its revision:
//!
//! ```text
//! {"revision": "3.6", "tree": {"kind": "call", "children": [...]}}
//! ```
//!
//! An explicit `--revision` overrides the envelope.
//!
//! ## Error Handling
//!
//! All functions return `Result<T, DecompError>`; `main.rs` turns errors into
//! an `ErrorResponse` and exit code.

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use tugdecomp_core::error::DecompError;
use tugdecomp_core::output::{RenderResponse, RulesResponse};
use tugdecomp_core::{Revision, Tree};
use tugdecomp_semantics::{build_registry, render_tree, RenderOptions};

/// Contents of a tree file.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TreeInput {
    Envelope {
        #[serde(default)]
        revision: Option<Revision>,
        tree: Tree,
    },
    Bare(Tree),
}

/// Rendering switches taken from the command line.
#[derive(Debug, Clone, Default)]
pub struct RenderArgs {
    pub revision: Option<Revision>,
    pub indent_unit: Option<String>,
    pub show_internal: bool,
    pub no_line_breaks: bool,
}

/// Read a tree from `path`, or from stdin when `path` is `-`.
pub fn read_input(path: &str) -> Result<String, DecompError> {
    if path == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .map_err(|e| DecompError::internal(format!("failed to read stdin: {}", e)))?;
        return Ok(text);
    }
    if !Path::new(path).exists() {
        return Err(DecompError::file_not_found(path));
    }
    fs::read_to_string(path)
        .map_err(|e| DecompError::internal(format!("failed to read {}: {}", path, e)))
}

/// Parse tree-file text and settle which revision to render it with.
pub fn parse_input(
    text: &str,
    revision: Option<Revision>,
) -> Result<(Revision, Tree), DecompError> {
    let input: TreeInput = serde_json::from_str(text)?;
    let (declared, tree) = match input {
        TreeInput::Envelope { revision, tree } => (revision, tree),
        TreeInput::Bare(tree) => (None, tree),
    };
    let revision = revision.or(declared).ok_or_else(|| {
        DecompError::invalid_args("no revision given: pass --revision or add one to the tree file")
    })?;
    Ok((revision, tree))
}

/// Render the tree in `path` and return the response envelope.
pub fn run_render(path: &str, args: &RenderArgs) -> Result<RenderResponse, DecompError> {
    let text = read_input(path)?;
    let (revision, tree) = parse_input(&text, args.revision)?;

    let mut options = RenderOptions::new(revision)
        .with_hide_internal(!args.show_internal)
        .with_line_breaks(!args.no_line_breaks);
    if let Some(unit) = &args.indent_unit {
        options = options.with_indent_unit(unit.clone());
    }
    debug!(%revision, input = path, "rendering tree");

    let registry = build_registry(revision);
    let source = render_tree(&registry, &options, &tree)?;
    info!(%revision, bytes = source.len(), "rendered");
    Ok(RenderResponse::new(revision, source))
}

/// Describe the registry built for `revision`.
pub fn run_rules(revision: Revision) -> RulesResponse {
    let registry = build_registry(revision);
    let (rules, precedence) = registry.describe();
    RulesResponse::new(revision, rules, precedence)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BARE: &str = r#"{"kind": "call", "children": [
        {"kind": "expr", "children": [{"kind": "LOAD_NAME", "pattr": "f"}]},
        {"kind": "CALL_FUNCTION_0", "attr": {"int": 0}}
    ]}"#;

    #[test]
    fn test_bare_tree_needs_revision() {
        let err = parse_input(BARE, None).unwrap_err();
        assert!(matches!(err, DecompError::InvalidArguments { .. }));
        let (revision, tree) = parse_input(BARE, Some(Revision::V3_6)).unwrap();
        assert_eq!(revision, Revision::V3_6);
        assert!(tree.is("call"));
    }

    #[test]
    fn test_envelope_revision_and_override() {
        let envelope = format!(r#"{{"revision": "3.4", "tree": {BARE}}}"#);
        let (revision, _) = parse_input(&envelope, None).unwrap();
        assert_eq!(revision, Revision::V3_4);
        let (revision, _) = parse_input(&envelope, Some(Revision::V3_7)).unwrap();
        assert_eq!(revision, Revision::V3_7);
    }

    #[test]
    fn test_malformed_tree_is_input_error() {
        let err = parse_input("[1, 2]", Some(Revision::V3_6)).unwrap_err();
        assert!(matches!(err, DecompError::InvalidTree { .. }));
    }

    #[test]
    fn test_bad_descendant_is_input_error() {
        let text = r#"{"revision": "3.6", "tree": {"kind": "expr_stmt", "children": [
            {"kind": "call", "children": [
                {"kind": "expr", "children": [
                    {"kind": "LOAD_NAME", "pattr": "f", "attr": {"bogus": 1}}
                ]},
                {"kind": "CALL_FUNCTION_0", "attr": {"int": 0}}
            ]}
        ]}}"#;
        let err = parse_input(text, None).unwrap_err();
        assert!(matches!(err, DecompError::InvalidTree { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = run_render("/definitely/not/here.json", &RenderArgs::default()).unwrap_err();
        assert!(matches!(err, DecompError::FileNotFound { .. }));
    }

    #[test]
    fn test_rules_listing() {
        let response = run_rules(Revision::V3_6);
        assert_eq!(response.revision, Revision::V3_6);
        assert!(response.rules.iter().any(|r| r.tag == "call_ex_kw"));
        assert!(response.precedence.iter().any(|p| p.tag == "call_ex_kw" && p.value == 100));
    }
}
