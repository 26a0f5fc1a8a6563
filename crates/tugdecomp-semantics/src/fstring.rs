// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Formatted string literals (3.6+).
//!
//! `FORMAT_VALUE` carries a conversion code that becomes the `!s`, `!r`, or
//! `!a` suffix of the interpolated expression. Literals are written with
//! triple single quotes so embedded quotes need no escaping.

use tracing::debug;

use tugdecomp_core::{RenderError, Tree};

use crate::arguments::operands;
use crate::engine::{Dispatch, Renderer};

/// Suffix for a `FORMAT_VALUE` conversion code. Unknown codes mean "no
/// conversion".
pub fn conversion_suffix(code: i64) -> &'static str {
    match code {
        0 => "",
        1 => "!s",
        2 => "!r",
        3 => "!a",
        other => {
            debug!(code = other, "unknown conversion code, writing no suffix");
            ""
        }
    }
}

/// Conversion suffix read from the `FORMAT_VALUE` token at child 1.
fn node_conversion(node: &Tree) -> &'static str {
    let code = node.get(1).and_then(|t| t.attr().as_int()).unwrap_or(0);
    conversion_suffix(code)
}

/// Expand the node's own template with its `conversion` attribute supplied.
fn with_conversion(r: &mut Renderer<'_>, node: &Tree) -> Result<Dispatch, RenderError> {
    let registry = r.registry();
    let Some(template) = registry.rules().template(node.kind()) else {
        return Ok(Dispatch::NotHandled);
    };
    r.apply_template(template, node, &[("conversion", node_conversion(node))])?;
    Ok(Dispatch::Rendered)
}

/// `fstring_expr`: `{expr!r}` inside a larger literal.
pub fn fstring_expr(r: &mut Renderer<'_>, node: &Tree) -> Result<Dispatch, RenderError> {
    with_conversion(r, node)
}

/// `fstring_single`: a literal that is one interpolation, `f'''{x!r}'''`.
pub fn fstring_single(r: &mut Renderer<'_>, node: &Tree) -> Result<Dispatch, RenderError> {
    with_conversion(r, node)
}

/// `formatted_value`: a constant operand is written verbatim as literal text.
pub fn formatted_value(r: &mut Renderer<'_>, node: &Tree) -> Result<Dispatch, RenderError> {
    let value = node.child(0)?.unwrap_trivial();
    if value.is("LOAD_CONST") || value.is("LOAD_STR") {
        let text = match value.attr().as_str() {
            Some(s) => s.to_string(),
            None => value.pattr().unwrap_or_default().to_string(),
        };
        r.write(&text);
        return Ok(Dispatch::Rendered);
    }
    with_conversion(r, node)
}

fn text_part(part: &Tree) -> Option<&str> {
    let inner = part.unwrap_trivial();
    if inner.is("LOAD_CONST") || inner.is("LOAD_STR") {
        inner.attr().as_str()
    } else {
        None
    }
}

/// `fstring_multi`: literal text interleaved with interpolations, closed by
/// `BUILD_STRING`. Without interpolations it is a plain string literal.
pub fn fstring_multi(r: &mut Renderer<'_>, node: &Tree) -> Result<Dispatch, RenderError> {
    let parts = operands(node);
    if parts.iter().all(|p| text_part(p).is_some()) {
        let text: String = parts.iter().filter_map(text_part).collect();
        r.write(&py_string_literal(&text));
        return Ok(Dispatch::Rendered);
    }
    r.write("f'''");
    for part in parts {
        match text_part(part) {
            Some(text) => r.write(&escape_braces(text)),
            None => r.render(part)?,
        }
    }
    r.write("'''");
    Ok(Dispatch::Rendered)
}

fn escape_braces(text: &str) -> String {
    text.replace('{', "{{").replace('}', "}}")
}

/// Quote `s` the way `repr` does for `str`.
pub fn py_string_literal(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}
