// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Statement-level handlers for compiler-generated shapes.

use tugdecomp_core::{RenderError, Tree};

use crate::engine::{Dispatch, Renderer};

/// `except_suite_finalize` (3.6+): a `return` inside a handler is followed by
/// cleanup code the compiler emitted. With `hide_internal` only the return is
/// written, one level deeper.
pub fn except_suite_finalize(r: &mut Renderer<'_>, node: &Tree) -> Result<Dispatch, RenderError> {
    let hide = r.options().hide_internal;
    match node.get(1) {
        Some(returns) if hide && returns.is("returns") => {
            r.indent_more();
            let result = r.render(returns);
            r.indent_less();
            result?;
            Ok(Dispatch::Rendered)
        }
        _ => Ok(Dispatch::NotHandled),
    }
}

/// `return_closure`: the implicit `return __class__` at the end of a class
/// body has no source text.
pub fn return_closure(_r: &mut Renderer<'_>, _node: &Tree) -> Result<Dispatch, RenderError> {
    Ok(Dispatch::Rendered)
}
