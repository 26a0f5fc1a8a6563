//! Compile-only test to verify public API surface.
//!
//! This file serves as a compile-time contract for the public API.
//! If this file fails to compile, the public API has regressed.
//!
//! Run with: cargo test -- api_surface

// Allow unused imports - this test is about compile-time verification, not runtime usage
#![allow(unused_imports)]

// ============================================================================
// Core Infrastructure Types
// ============================================================================

// tree module - parse tree handed over by the parser
use tugdecomp::tree::{Attr, CodeObject, Node, Token, Tree, CO_COROUTINE};

// revision module - dialect revisions
use tugdecomp::revision::{ParseRevisionError, Revision};

// error module - error types and codes
use tugdecomp::error::{DecompError, OutputErrorCode, RenderError};

// output module - JSON output types
use tugdecomp::output::{
    emit_response, ErrorInfo, ErrorResponse, FaultLocation, PrecedenceInfo, RenderResponse,
    RuleInfo, RulesResponse, SCHEMA_VERSION,
};

// ============================================================================
// Semantic Actions
// ============================================================================

use tugdecomp::semantics::{
    build_registry, decompile, render_tree, ArgCount, CallVariant, Dispatch, Handler,
    LineBreaker, PrecedenceTable, Registry, RenderOptions, RenderState, Renderer, Rule,
    RuleTable, Segment, Selector, Template, VariantRule, PRECEDENCE_BODY, PRECEDENCE_STATEMENT,
};

// ============================================================================
// Front Door
// ============================================================================

use tugdecomp::cli::{parse_input, read_input, run_render, run_rules, RenderArgs};

#[test]
fn api_surface_compiles() {
    // Touch a few items so the imports are not optimized into nothing.
    let _ = Revision::V3_6;
    let _ = PRECEDENCE_BODY;
    let _ = SCHEMA_VERSION;
}
