// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Builders for the tree shapes the parser produces.
//!
//! Each helper returns an owned [`Tree`] so fixtures compose by nesting:
//!
//! ```
//! use tugdecomp_semantics::test_helpers::{argc, call, kwarg, name, opcode, render_ok};
//! use tugdecomp_semantics::Revision;
//!
//! let tree = call(vec![
//!     name("f"),
//!     name("a"),
//!     kwarg("k", name("v")),
//!     opcode("CALL_FUNCTION_257", argc(1, 1)),
//! ]);
//! assert_eq!(render_ok(Revision::V3_4, &tree), "f(a, k=v)");
//! ```

use tugdecomp_core::{Attr, CodeObject, Node, RenderError, Revision, Token, Tree};

use crate::engine::render_tree;
use crate::options::RenderOptions;
use crate::registry::build_registry;

/// `expr[LOAD_NAME id]`
pub fn name(id: &str) -> Tree {
    node("expr", vec![Token::new("LOAD_NAME", id).into()])
}

/// `expr[LOAD_NAME id]` with the token on source line `line`.
pub fn name_at(id: &str, line: u32) -> Tree {
    node("expr", vec![Token::new("LOAD_NAME", id).at_line(line).into()])
}

/// `pos_arg[value]`
pub fn pos_arg(value: Tree) -> Tree {
    node("pos_arg", vec![value])
}

/// `kwarg[LOAD_CONST 'key', value]`
pub fn kwarg(key: &str, value: Tree) -> Tree {
    let key_token = Token::new("LOAD_CONST", format!("'{key}'")).with_attr(Attr::Str(key.into()));
    node("kwarg", vec![key_token.into(), value])
}

/// A token whose payload is an integer.
pub fn opcode(kind: &str, arg: i64) -> Tree {
    Token::new(kind, arg.to_string()).with_attr(Attr::Int(arg)).into()
}

/// Packed argument word for a pre-3.6 call opcode.
pub fn argc(positional: u8, keyword: u8) -> i64 {
    i64::from(positional) | (i64::from(keyword) << 8)
}

pub fn node(kind: &str, children: Vec<Tree>) -> Tree {
    Node::new(kind, children).into()
}

pub fn call(children: Vec<Tree>) -> Tree {
    node("call", children)
}

/// `expr[LOAD_CONST repr]`: a constant displayed as `repr`.
pub fn constant(repr: &str) -> Tree {
    node("expr", vec![Token::new("LOAD_CONST", repr).into()])
}

/// `expr[LOAD_STR 'text']` carrying the unquoted text as its payload.
pub fn string_const(text: &str) -> Tree {
    let token = Token::new("LOAD_STR", format!("'{text}'")).with_attr(Attr::Str(text.into()));
    node("expr", vec![token.into()])
}

/// A `LOAD_CONST` of a tuple of names.
pub fn names_const(names: &[&str]) -> Tree {
    let pattr = format!(
        "({})",
        names
            .iter()
            .map(|n| format!("'{n}'"))
            .collect::<Vec<_>>()
            .join(", ")
    );
    Token::new("LOAD_CONST", pattr)
        .with_attr(Attr::Names(names.iter().map(|n| n.to_string()).collect()))
        .into()
}

/// `LOAD_CONST <code object>`
pub fn code(code: CodeObject) -> Tree {
    let pattr = format!("<code object {}>", code.name);
    Token::new("LOAD_CONST", pattr)
        .with_attr(Attr::Code(Box::new(code)))
        .into()
}

/// `tuple[e0, e1, ..., BUILD_TUPLE_n]`
pub fn tuple(elements: Vec<Tree>) -> Tree {
    let n = elements.len() as i64;
    let mut children = elements;
    children.push(opcode(&format!("BUILD_TUPLE_{n}"), n));
    node("tuple", children)
}

/// The 3.6 constant-keys dict: `dict[v0, ..., LOAD_CONST (k0, ...), BUILD_CONST_KEY_MAP_n]`.
pub fn dict_const_keys(items: &[(&str, Tree)]) -> Tree {
    let n = items.len() as i64;
    let keys: Vec<&str> = items.iter().map(|(k, _)| *k).collect();
    let mut children: Vec<Tree> = items.iter().map(|(_, v)| v.clone()).collect();
    children.push(names_const(&keys));
    children.push(opcode(&format!("BUILD_CONST_KEY_MAP_{n}"), n));
    node("dict", children)
}

/// The key/value-list dict: `dict[kvlist_n[k0, v0, ..., BUILD_MAP_n]]`.
pub fn dict_kvlist(items: &[(&str, Tree)]) -> Tree {
    let n = items.len() as i64;
    let mut children = Vec::with_capacity(items.len() * 2 + 1);
    for (key, value) in items {
        let key_token =
            Token::new("LOAD_STR", format!("'{key}'")).with_attr(Attr::Str((*key).into()));
        children.push(key_token.into());
        children.push(value.clone());
    }
    children.push(opcode(&format!("BUILD_MAP_{n}"), n));
    node("dict", vec![node(&format!("kvlist_{n}"), children)])
}

/// Render `tree` with default options for `revision`.
pub fn render(revision: Revision, tree: &Tree) -> Result<String, RenderError> {
    let registry = build_registry(revision);
    let options = RenderOptions::new(revision);
    render_tree(&registry, &options, tree)
}

/// Render `tree` with default options for `revision`.
///
/// # Panics
///
/// Panics with the render error if rendering fails.
pub fn render_ok(revision: Revision, tree: &Tree) -> String {
    match render(revision, tree) {
        Ok(source) => source,
        Err(err) => panic!("render failed at {revision}: {err}"),
    }
}
