// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Unpack merges spliced into call argument lists.
//!
//! `f(a, b, *c, *d)` compiles (3.5+) to a `build_tuple_unpack_with_call` over
//! the operands `(a, b)`, `c`, and `d`; `f(x=1, **m, **n)` to a
//! `build_map_unpack_with_call` over `{'x': 1}`, `m`, and `n`. Operands are
//! always written in tree order.

use tugdecomp_core::{RenderError, Tree};

use crate::arguments::{bare_tuple, is_identifier_keyed, keyword_pairs, operands};
use crate::engine::{Dispatch, Renderer};
use crate::layout::LineBreaker;
use crate::precedence::PRECEDENCE_BODY;

fn expect_builder<'t>(merge: &'t Tree, opcode: &str) -> Result<&'t [Tree], RenderError> {
    let last = merge.child(-1)?;
    if !last.kind_starts_with(opcode) {
        return Err(RenderError::unexpected_kind(merge, opcode, last));
    }
    let ops = merge.slice(0, -1);
    if ops.is_empty() {
        return Err(RenderError::missing_child(merge, 0));
    }
    Ok(ops)
}

/// Write each operand as `prefix operand`. Returns the number written.
fn spread_each(
    r: &mut Renderer<'_>,
    breaker: &mut LineBreaker,
    ops: &[Tree],
    prefix: &str,
) -> Result<usize, RenderError> {
    for op in ops {
        let sep = breaker.separator(op.line());
        r.write(&sep);
        r.write(prefix);
        r.render_with_prec(op, PRECEDENCE_BODY)?;
    }
    Ok(ops.len())
}

/// A leading literal tuple becomes bare elements; every other operand is
/// written `*operand`. Returns the number of arguments written.
pub fn emit_tuple_merge(
    r: &mut Renderer<'_>,
    breaker: &mut LineBreaker,
    merge: &Tree,
) -> Result<usize, RenderError> {
    let ops = expect_builder(merge, "BUILD_TUPLE_UNPACK_WITH_CALL")?;
    let (first, rest) = (&ops[0], &ops[1..]);
    if first.reduces_to("tuple") {
        let count = bare_tuple(r, breaker, first.unwrap_trivial())?;
        Ok(count + spread_each(r, breaker, rest, "*")?)
    } else {
        spread_each(r, breaker, ops, "*")
    }
}

/// A leading identifier-keyed literal dict becomes `name=value` pairs; every
/// other operand is written `**operand`.
pub fn emit_map_merge(
    r: &mut Renderer<'_>,
    breaker: &mut LineBreaker,
    merge: &Tree,
) -> Result<usize, RenderError> {
    let ops = expect_builder(merge, "BUILD_MAP_UNPACK_WITH_CALL")?;
    let first = ops[0].unwrap_trivial();
    if first.is("dict") && is_identifier_keyed(first) {
        let count = keyword_pairs(r, breaker, first)?;
        Ok(count + spread_each(r, breaker, &ops[1..], "**")?)
    } else {
        spread_each(r, breaker, ops, "**")
    }
}

/// `starred` (3.6): an optional literal tuple head, then `*operand` for the
/// rest. An empty head with nothing after it is `*()`.
pub fn emit_starred(
    r: &mut Renderer<'_>,
    breaker: &mut LineBreaker,
    starred: &Tree,
) -> Result<usize, RenderError> {
    let ops = operands(starred);
    let Some((head, rest)) = ops.split_first() else {
        return Err(RenderError::missing_child(starred, 0));
    };
    if !head.reduces_to("tuple") {
        return spread_each(r, breaker, ops, "*");
    }
    let count = bare_tuple(r, breaker, head.unwrap_trivial())?;
    if count == 0 && rest.is_empty() {
        let sep = breaker.separator(head.line());
        r.write(&sep);
        r.write("*()");
        return Ok(1);
    }
    Ok(count + spread_each(r, breaker, rest, "*")?)
}

pub fn build_tuple_unpack_with_call(
    r: &mut Renderer<'_>,
    merge: &Tree,
) -> Result<Dispatch, RenderError> {
    let mut breaker = LineBreaker::for_renderer(r);
    emit_tuple_merge(r, &mut breaker, merge)?;
    Ok(Dispatch::Rendered)
}

pub fn build_map_unpack_with_call(
    r: &mut Renderer<'_>,
    merge: &Tree,
) -> Result<Dispatch, RenderError> {
    let mut breaker = LineBreaker::for_renderer(r);
    emit_map_merge(r, &mut breaker, merge)?;
    Ok(Dispatch::Rendered)
}

pub fn starred(r: &mut Renderer<'_>, starred: &Tree) -> Result<Dispatch, RenderError> {
    let mut breaker = LineBreaker::for_renderer(r);
    emit_starred(r, &mut breaker, starred)?;
    Ok(Dispatch::Rendered)
}

/// `unmapexpr` (3.5+): `{**a, **b}`.
pub fn unmapexpr(r: &mut Renderer<'_>, node: &Tree) -> Result<Dispatch, RenderError> {
    let merge = node.child(0)?;
    r.write("{");
    let mut breaker = LineBreaker::new("", false);
    spread_each(r, &mut breaker, operands(merge), "**")?;
    r.write("}");
    Ok(Dispatch::Rendered)
}
