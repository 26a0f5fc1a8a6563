// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Version-dispatched semantic actions for Python 3 bytecode decompilation.
//!
//! Given a parse tree built from a disassembled instruction stream, this crate
//! renders the high-level source text it came from. Call sites, unpack merges,
//! formatted strings, and coroutine syntax are encoded by different bytecode
//! idioms in different dialect revisions; the rules here fold all of them back
//! into one canonical textual form.
//!
//! # Overview
//!
//! - **Registry**: [`build_registry`] produces an immutable [`Registry`] (rule
//!   table plus precedence table) for one [`Revision`].
//! - **Rendering**: [`render_tree`] walks a [`Tree`] with a [`Renderer`],
//!   consulting the registry for every node kind.
//! - **Options**: [`RenderOptions`] controls indentation, line breaks, and
//!   whether internal-only constructs are hidden.
//!
//! # Quick Start
//!
//! ```
//! use tugdecomp_core::{Attr, Node, Revision, Token, Tree};
//! use tugdecomp_semantics::{build_registry, render_tree, RenderOptions};
//!
//! let name = |id: &str| -> Tree {
//!     Node::new("expr", vec![Token::new("LOAD_NAME", id).into()]).into()
//! };
//! let call: Tree = Node::new(
//!     "call",
//!     vec![
//!         name("f"),
//!         name("a"),
//!         name("rest"),
//!         Token::new("CALL_FUNCTION_VAR_1", "").with_attr(Attr::Int(1)).into(),
//!     ],
//! )
//! .into();
//!
//! let registry = build_registry(Revision::V3_4);
//! let options = RenderOptions::new(Revision::V3_4);
//! assert_eq!(render_tree(&registry, &options, &call).unwrap(), "f(a, *rest)");
//! ```

// ============================================================================
// Public modules and re-exports
// ============================================================================

pub mod arguments;
pub mod calls;
pub mod coroutine;
pub mod engine;
pub mod fstring;
pub mod functions;
pub mod layout;
pub mod options;
pub mod precedence;
pub mod registry;
pub mod state;
pub mod statements;
pub mod template;
pub mod unpack;

/// Tree builders shared by unit and integration tests.
pub mod test_helpers;

pub use calls::{ArgCount, CallVariant};
pub use engine::{decompile, render_tree, Dispatch, Handler, Renderer};
pub use layout::LineBreaker;
pub use options::RenderOptions;
pub use precedence::{PrecedenceTable, PRECEDENCE_BODY, PRECEDENCE_STATEMENT};
pub use registry::{build_registry, Registry, Rule, RuleTable, VariantRule};
pub use state::RenderState;
pub use template::{Segment, Selector, Template};

pub use tugdecomp_core::{RenderError, Revision, Tree};
