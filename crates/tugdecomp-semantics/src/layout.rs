// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Line-break heuristic for argument lists.
//!
//! When a call spans several source lines, its arguments are re-rendered one
//! per line exactly where the source line changed between two successive
//! elements. Layout depends only on the line numbers recorded in the tree, so
//! rendering the same tree twice yields identical bytes.

use crate::engine::Renderer;

/// Chooses the separator written before each element of an argument list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineBreaker {
    previous: Option<u32>,
    started: bool,
    continuation: String,
    enabled: bool,
}

impl LineBreaker {
    /// `continuation` is written after the newline of a broken separator.
    pub fn new(continuation: impl Into<String>, enabled: bool) -> Self {
        Self {
            previous: None,
            started: false,
            continuation: continuation.into(),
            enabled,
        }
    }

    /// Continuation lines are indented one unit past the current indentation.
    pub fn for_renderer(r: &Renderer<'_>) -> Self {
        let options = r.options();
        Self::new(
            format!("{}{}", r.current_indent(), options.indent_unit),
            options.line_breaks,
        )
    }

    /// Separator to write before an element whose source line is `line`.
    ///
    /// The first element gets nothing. Later ones get `", "`, or `",\n"` plus
    /// the continuation when both lines are known and differ.
    pub fn separator(&mut self, line: Option<u32>) -> String {
        if !self.started {
            self.started = true;
            self.previous = line;
            return String::new();
        }
        let changed = matches!((self.previous, line), (Some(a), Some(b)) if a != b);
        if line.is_some() {
            self.previous = line;
        }
        if changed && self.enabled {
            format!(",\n{}", self.continuation)
        } else {
            ", ".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_line_uses_comma_space() {
        let mut breaker = LineBreaker::new("    ", true);
        assert_eq!(breaker.separator(Some(1)), "");
        assert_eq!(breaker.separator(Some(1)), ", ");
        assert_eq!(breaker.separator(Some(1)), ", ");
    }

    #[test]
    fn test_line_change_breaks() {
        let mut breaker = LineBreaker::new("    ", true);
        assert_eq!(breaker.separator(Some(1)), "");
        assert_eq!(breaker.separator(Some(2)), ",\n    ");
        assert_eq!(breaker.separator(Some(2)), ", ");
    }

    #[test]
    fn test_unknown_lines_never_break() {
        let mut breaker = LineBreaker::new("    ", true);
        assert_eq!(breaker.separator(None), "");
        assert_eq!(breaker.separator(Some(3)), ", ");
        assert_eq!(breaker.separator(None), ", ");
        // The last known line is remembered across elements without one.
        assert_eq!(breaker.separator(Some(4)), ",\n    ");
    }

    #[test]
    fn test_disabled_never_breaks() {
        let mut breaker = LineBreaker::new("    ", false);
        assert_eq!(breaker.separator(Some(1)), "");
        assert_eq!(breaker.separator(Some(9)), ", ");
    }
}
