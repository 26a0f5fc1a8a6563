// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Binding power of syntactic constructs.
//!
//! Lower numbers bind tighter. A node is parenthesized when its own value is
//! strictly greater than the bound of the context it is rendered in.

use std::collections::HashMap;

/// Binding power of a bare module or function body. Every extended-call
/// construct sits at exactly this value.
pub const PRECEDENCE_BODY: u32 = 100;

/// Bound used for the expression of a statement; nothing is parenthesized.
pub const PRECEDENCE_STATEMENT: u32 = 200;

/// Bound for the callee and arguments of `async` calls.
pub const PRECEDENCE_ASYNC_CALL: u32 = 80;

const BASE: &[(&str, u32)] = &[
    ("list", 0),
    ("dict", 0),
    ("build_list_unpack", 0),
    ("attribute", 2),
    ("subscript", 2),
    ("call", 2),
    ("compare", 20),
    ("unary_not", 22),
    ("and", 24),
    ("or", 26),
    ("conditional", 28),
    ("mklambda", 30),
    ("yield", 101),
    ("yield_from", 101),
];

/// Mapping from node kind to binding power.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrecedenceTable {
    values: HashMap<&'static str, u32>,
}

impl PrecedenceTable {
    /// The revision-independent table.
    pub fn base() -> Self {
        Self {
            values: BASE.iter().copied().collect(),
        }
    }

    pub fn get(&self, kind: &str) -> Option<u32> {
        self.values.get(kind).copied()
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.values.contains_key(kind)
    }

    pub(crate) fn set(&mut self, kind: &'static str, value: u32) {
        self.values.insert(kind, value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Entries sorted by kind.
    pub fn entries(&self) -> Vec<(&'static str, u32)> {
        let mut entries: Vec<_> = self.values.iter().map(|(k, v)| (*k, *v)).collect();
        entries.sort_unstable();
        entries
    }
}

/// Returns whether a node of binding power `own` needs parentheses inside a
/// context bounded by `bound`.
pub fn needs_parens(own: u32, bound: u32) -> bool {
    own > bound
}
