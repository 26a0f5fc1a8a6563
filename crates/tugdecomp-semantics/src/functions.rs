// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Function headers built by `MAKE_FUNCTION`.
//!
//! The header text comes from the code object: its name, its positional
//! parameters, and (with annotations) the annotation expressions that were
//! pushed before the annotation-name tuple.

use tugdecomp_core::{CodeObject, RenderError, Revision, Tree};

use crate::engine::{Dispatch, Renderer};
use crate::precedence::PRECEDENCE_BODY;

fn code_of<'t>(parent: &Tree, slot: &'t Tree) -> Result<&'t CodeObject, RenderError> {
    slot.unwrap_trivial()
        .attr()
        .as_code()
        .ok_or_else(|| RenderError::unexpected_kind(parent, "code object", slot))
}

/// Write `:` and the indented body, or `pass` when none was supplied.
fn emit_body(r: &mut Renderer<'_>, code: &CodeObject) -> Result<(), RenderError> {
    r.write(":\n");
    r.indent_more();
    let result = match &code.body {
        Some(body) => r.render_with_prec(body, PRECEDENCE_BODY),
        None => {
            r.write_indent();
            r.write("pass\n");
            Ok(())
        }
    };
    r.indent_less();
    result
}

/// `mkfunc`: `name(a, b):` followed by the body.
pub fn mkfunc(r: &mut Renderer<'_>, node: &Tree) -> Result<Dispatch, RenderError> {
    let Some(code) = node
        .children()
        .iter()
        .find_map(|c| c.unwrap_trivial().attr().as_code())
    else {
        return Err(RenderError::missing_child(node, 0));
    };
    r.write(&code.name);
    r.write("(");
    r.write(&code.params.join(", "));
    r.write(")");
    emit_body(r, code)?;
    Ok(Dispatch::Rendered)
}

/// Where the code object sits among the children of `mkfunc_annotate`.
fn annotated_code<'t>(r: &Renderer<'_>, node: &'t Tree) -> Result<&'t CodeObject, RenderError> {
    // 3.3 added the qualified name between the code object and the opcode.
    if r.revision().at_least(Revision::V3_3) || node.get(-2).is_some_and(|c| c.is("kwargs")) {
        return code_of(node, node.child(-4)?);
    }
    let slot = node.child(-3)?;
    if slot.is("expr") {
        code_of(node, slot.child(0)?)
    } else {
        code_of(node, slot)
    }
}

/// `mkfunc_annotate`: `(a: int, b) -> str:` with each annotation expression
/// paired to its name from the `annotate_tuple` constant.
pub fn mkfunc_annotate(r: &mut Renderer<'_>, node: &Tree) -> Result<Dispatch, RenderError> {
    let code = annotated_code(r, node)?;
    let Some(position) = node.children().iter().rposition(|c| c.is("annotate_tuple")) else {
        return Err(RenderError::unsupported(node, "no annotate_tuple child"));
    };
    let tuple = &node.children()[position];
    let names_holder = match tuple.children().first() {
        Some(first) if !tuple.is_token() => first,
        _ => tuple,
    };
    let names = names_holder
        .attr()
        .as_names()
        .ok_or_else(|| RenderError::unexpected_kind(node, "annotation names", tuple))?;
    if position < names.len() {
        return Err(RenderError::arg_count(node, names.len() + 1, position));
    }
    let values = &node.children()[position - names.len()..position];
    let annotation = |name: &str| {
        names
            .iter()
            .position(|n| n == name)
            .map(|i| &values[i])
    };

    if r.ends_with("def ") {
        r.write(&code.name);
    }
    r.write("(");
    for (i, param) in code.params.iter().enumerate() {
        if i > 0 {
            r.write(", ");
        }
        r.write(param);
        if let Some(value) = annotation(param) {
            r.write(": ");
            r.render_with_prec(value, PRECEDENCE_BODY)?;
        }
    }
    r.write(")");
    if let Some(value) = annotation("return") {
        r.write(" -> ");
        r.render_with_prec(value, PRECEDENCE_BODY)?;
    }
    emit_body(r, code)?;
    Ok(Dispatch::Rendered)
}
