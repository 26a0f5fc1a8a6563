// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Options controlling how a tree is rendered.

use tugdecomp_core::Revision;

/// Rendering options, built like a parser configuration.
///
/// # Example
///
/// ```
/// use tugdecomp_core::Revision;
/// use tugdecomp_semantics::RenderOptions;
///
/// let options = RenderOptions::new(Revision::V3_6)
///     .with_indent_unit("  ")
///     .with_line_breaks(false);
/// assert_eq!(options.indent_unit, "  ");
/// assert!(options.hide_internal);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Dialect revision the bytecode was produced by.
    pub revision: Revision,
    /// One level of indentation.
    pub indent_unit: String,
    /// Suppress compiler-generated code, such as the dead tail after a
    /// `return` inside an exception handler.
    pub hide_internal: bool,
    /// Follow source line changes when laying out argument lists.
    pub line_breaks: bool,
}

impl RenderOptions {
    pub fn new(revision: Revision) -> Self {
        Self {
            revision,
            indent_unit: "    ".to_string(),
            hide_internal: true,
            line_breaks: true,
        }
    }

    #[must_use]
    pub fn with_indent_unit(mut self, unit: impl Into<String>) -> Self {
        self.indent_unit = unit.into();
        self
    }

    #[must_use]
    pub fn with_hide_internal(mut self, hide: bool) -> Self {
        self.hide_internal = hide;
        self
    }

    #[must_use]
    pub fn with_line_breaks(mut self, enabled: bool) -> Self {
        self.line_breaks = enabled;
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::new(Revision::V3_6)
    }
}
