// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Literal tuples and dicts, both as values and as spliced call arguments.
//!
//! Inside a call a literal tuple is written without its parentheses
//! (`f(a, b)`), and a literal dict with identifier keys is written as keyword
//! pairs (`f(x=1, y=2)`). Both layouts follow [`LineBreaker`].

use tugdecomp_core::{RenderError, Tree};

use crate::engine::{Dispatch, Renderer};
use crate::layout::LineBreaker;
use crate::precedence::PRECEDENCE_BODY;

/// Opcodes that can trail or interleave the elements of a tuple.
const TUPLE_NOISE: &[&str] = &["ROT_THREE", "EXTENDED_ARG"];

/// Children of a merge/unpack node without its trailing `BUILD_*` opcode.
pub fn operands(tree: &Tree) -> &[Tree] {
    match tree.children().last() {
        Some(last) if last.is_token() && last.kind_starts_with("BUILD_") => tree.slice(0, -1),
        _ => tree.children(),
    }
}

fn is_tuple_noise(child: &Tree) -> bool {
    child.is_token()
        && (child.kind_starts_with("BUILD_TUPLE") || TUPLE_NOISE.contains(&child.kind()))
}

/// Element children of a literal tuple.
pub fn tuple_elements(tuple: &Tree) -> impl Iterator<Item = &Tree> {
    tuple.children().iter().filter(|c| !is_tuple_noise(c))
}

pub fn has_elements(tuple: &Tree) -> bool {
    tuple_elements(tuple).next().is_some()
}

/// Write the elements of a literal tuple without parentheses. Returns the
/// number of elements written.
///
/// `breaker` is shared with whatever else goes into the same argument list.
pub fn bare_tuple(
    r: &mut Renderer<'_>,
    breaker: &mut LineBreaker,
    tuple: &Tree,
) -> Result<usize, RenderError> {
    let mut count = 0;
    for element in tuple_elements(tuple) {
        let sep = breaker.separator(element.line());
        r.write(&sep);
        r.render_with_prec(element, PRECEDENCE_BODY)?;
        count += 1;
    }
    Ok(count)
}

// ============================================================================
// Dict Shapes
// ============================================================================

/// The two encodings of a literal dict.
enum DictForm<'t> {
    /// `dict[kvlist_n[k0, v0, k1, v1, ..., BUILD_MAP_n]]`
    KeyValueList(&'t [Tree]),
    /// `dict[v0, v1, ..., LOAD_CONST (k0, k1, ...), BUILD_CONST_KEY_MAP_n]`
    ConstKeys {
        keys: &'t [String],
        values: &'t [Tree],
    },
}

fn dict_form(dict: &Tree) -> Result<Option<DictForm<'_>>, RenderError> {
    if let Some(kvlist) = dict.get(0).filter(|c| c.kind_starts_with("kvlist")) {
        let items = operands(kvlist);
        if items.len() % 2 != 0 {
            return Err(RenderError::missing_child(kvlist, items.len() as isize));
        }
        return Ok(Some(DictForm::KeyValueList(items)));
    }
    let Some(builder) = dict.get(-1).filter(|c| c.kind_starts_with("BUILD_CONST_KEY_MAP")) else {
        return Ok(None);
    };
    let names = dict.child(-2)?;
    let keys = names
        .attr()
        .as_names()
        .ok_or_else(|| RenderError::unexpected_kind(dict, "LOAD_CONST key tuple", names))?;
    let count = builder
        .attr()
        .as_int()
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(keys.len());
    if count != keys.len() || dict.len() != count + 2 {
        return Err(RenderError::arg_count(dict, keys.len() + 2, dict.len()));
    }
    Ok(Some(DictForm::ConstKeys {
        keys,
        values: dict.slice(0, -2),
    }))
}

pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_alphabetic() => chars.all(|c| c == '_' || c.is_alphanumeric()),
        _ => false,
    }
}

/// Key of a key/value-list entry as a bare name: string constants lose their
/// quotes.
fn key_name(r: &mut Renderer<'_>, key: &Tree) -> Result<String, RenderError> {
    let inner = key.unwrap_trivial();
    if let Some(s) = inner.attr().as_str() {
        return Ok(s.to_string());
    }
    let text = r.capture(|r| r.render(key))?;
    Ok(strip_quotes(&text).to_string())
}

fn strip_quotes(text: &str) -> &str {
    for quote in ['\'', '"'] {
        if let Some(inner) = text
            .strip_prefix(quote)
            .and_then(|t| t.strip_suffix(quote))
        {
            return inner;
        }
    }
    text
}

/// The text of a string-constant key; `None` for any other expression.
fn static_key(key: &Tree) -> Option<String> {
    let inner = key.unwrap_trivial();
    if !(inner.is("LOAD_CONST") || inner.is("LOAD_STR")) {
        return None;
    }
    if let Some(s) = inner.attr().as_str() {
        return Some(s.to_string());
    }
    let pattr = inner.pattr()?;
    let stripped = strip_quotes(pattr);
    (stripped.len() + 2 == pattr.len()).then(|| stripped.to_string())
}

/// Whether a literal dict can be written as `name=value` pairs. An empty
/// dict cannot.
pub fn is_identifier_keyed(dict: &Tree) -> bool {
    match dict_form(dict) {
        Ok(Some(DictForm::KeyValueList(items))) => {
            !items.is_empty()
                && items
                    .chunks(2)
                    .all(|pair| static_key(&pair[0]).is_some_and(|k| is_identifier(&k)))
        }
        Ok(Some(DictForm::ConstKeys { keys, .. })) => {
            !keys.is_empty() && keys.iter().all(|k| is_identifier(k))
        }
        _ => false,
    }
}

/// Write a literal dict as keyword pairs. Dicts of any other shape are
/// spread as `**dict`. Returns the number of items written.
pub fn keyword_pairs(
    r: &mut Renderer<'_>,
    breaker: &mut LineBreaker,
    dict: &Tree,
) -> Result<usize, RenderError> {
    match dict_form(dict)? {
        Some(DictForm::KeyValueList(items)) => {
            for pair in items.chunks(2) {
                let (key, value) = (&pair[0], &pair[1]);
                let sep = breaker.separator(key.line());
                let name = key_name(r, key)?;
                r.write(&sep);
                r.write(&name);
                r.write("=");
                r.render_with_prec(value, PRECEDENCE_BODY)?;
            }
            Ok(items.len() / 2)
        }
        Some(DictForm::ConstKeys { keys, values }) => {
            for (key, value) in keys.iter().zip(values) {
                let sep = breaker.separator(value.line());
                r.write(&sep);
                r.write(key);
                r.write("=");
                r.render_with_prec(value, PRECEDENCE_BODY)?;
            }
            Ok(keys.len())
        }
        None => {
            let sep = breaker.separator(dict.line());
            r.write(&sep);
            r.write("**");
            r.render_with_prec(dict, PRECEDENCE_BODY)?;
            Ok(1)
        }
    }
}

// ============================================================================
// Literal Handlers
// ============================================================================

/// `tuple`: `()`, `(a,)`, `(a, b)`.
pub fn tuple_literal(r: &mut Renderer<'_>, tuple: &Tree) -> Result<Dispatch, RenderError> {
    r.write("(");
    let count = r.with_prec(PRECEDENCE_BODY, |r| {
        let mut count = 0;
        for element in tuple_elements(tuple) {
            if count > 0 {
                r.write(", ");
            }
            r.render(element)?;
            count += 1;
        }
        Ok(count)
    })?;
    r.write(if count == 1 { ",)" } else { ")" });
    Ok(Dispatch::Rendered)
}

/// `dict`: `{k: v, ...}`.
pub fn dict_literal(r: &mut Renderer<'_>, dict: &Tree) -> Result<Dispatch, RenderError> {
    let Some(form) = dict_form(dict)? else {
        return Ok(Dispatch::NotHandled);
    };
    r.write("{");
    r.with_prec(PRECEDENCE_BODY, |r| match form {
        DictForm::KeyValueList(items) => {
            for (i, pair) in items.chunks(2).enumerate() {
                if i > 0 {
                    r.write(", ");
                }
                r.render(&pair[0])?;
                r.write(": ");
                r.render(&pair[1])?;
            }
            Ok(())
        }
        DictForm::ConstKeys { keys, values } => {
            for (i, (key, value)) in keys.iter().zip(values).enumerate() {
                if i > 0 {
                    r.write(", ");
                }
                r.write(&format!("'{key}': "));
                r.render(value)?;
            }
            Ok(())
        }
    })?;
    r.write("}");
    Ok(Dispatch::Rendered)
}
