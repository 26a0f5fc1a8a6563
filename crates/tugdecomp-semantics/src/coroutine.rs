// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Coroutine syntax: `async def` and `yield from`.

use tugdecomp_core::{CodeObject, RenderError, Revision, Tree};

use crate::engine::{Dispatch, Renderer};
use crate::template::{Selector, Template};

/// Code object of the function built by the `mkfunc` at `function_def[0]`.
///
/// From 3.6 the code object is the first operand of `MAKE_FUNCTION`; before
/// that it follows the default-argument tuple. Any child carrying a code
/// object is accepted when neither slot holds one.
fn function_code(r: &Renderer<'_>, node: &Tree) -> Result<Option<CodeObject>, RenderError> {
    let mkfunc = node.child(0)?;
    let slot = if r.revision().at_least(Revision::V3_6) { 0 } else { 1 };
    let code = mkfunc
        .get(slot)
        .and_then(|c| c.unwrap_trivial().attr().as_code())
        .or_else(|| {
            mkfunc
                .children()
                .iter()
                .find_map(|c| c.unwrap_trivial().attr().as_code())
        });
    Ok(code.cloned())
}

/// `function_def` (3.5+): `async def` when the code object is a coroutine
/// or an async generator.
pub fn function_def(r: &mut Renderer<'_>, node: &Tree) -> Result<Dispatch, RenderError> {
    let is_coroutine = function_code(r, node)?.is_some_and(|code| code.is_coroutine());
    let format = if is_coroutine {
        "\n\n%|async def %c\n"
    } else {
        "\n\n%|def %c\n"
    };
    let template = Template::new(format, vec![Selector::at(-2)]);
    r.apply_template(&template, node, &[])?;
    Ok(Dispatch::Rendered)
}

/// `yield_from` (3.3+). In 3.3 and 3.4 the operand is nested three levels
/// below the `expr` child.
pub fn yield_from(r: &mut Renderer<'_>, node: &Tree) -> Result<Dispatch, RenderError> {
    let operand = if r.revision().within(Revision::V3_3, Revision::V3_4) {
        node.child(0)?.child(0)?.child(0)?.child(0)?
    } else {
        node.child(0)?
    };
    r.write("yield from ");
    r.render(operand)?;
    Ok(Dispatch::Rendered)
}
