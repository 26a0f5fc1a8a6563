// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Output sink for one render: text buffer, indentation stack, line cursor.

use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderState {
    tokens: String,
    indent_tokens: Vec<String>,
    line_number: u32,
}

impl RenderState {
    pub fn add_token(&mut self, token: &str) {
        self.line_number += token.matches('\n').count() as u32;
        self.tokens.push_str(token);
    }

    /// Write the current indentation.
    pub fn add_indent(&mut self) {
        for token in &self.indent_tokens {
            self.tokens.push_str(token);
        }
    }

    pub fn indent(&mut self, value: &str) {
        self.indent_tokens.push(value.to_string());
    }

    pub fn dedent(&mut self) {
        self.indent_tokens.pop();
    }

    pub fn current_indent(&self) -> String {
        self.indent_tokens.concat()
    }

    pub fn indent_depth(&self) -> usize {
        self.indent_tokens.len()
    }

    /// Number of newlines written so far.
    pub fn line_number(&self) -> u32 {
        self.line_number
    }

    pub fn ends_with(&self, suffix: &str) -> bool {
        self.tokens.ends_with(suffix)
    }

    /// Swap out the buffer, returning what was written since the last swap.
    /// The line cursor is left untouched.
    pub(crate) fn replace_tokens(&mut self, tokens: String) -> String {
        std::mem::replace(&mut self.tokens, tokens)
    }

    pub(crate) fn set_line_number(&mut self, line: u32) {
        self.line_number = line;
    }

    pub fn into_string(self) -> String {
        self.tokens
    }
}

impl fmt::Display for RenderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indentation_stack() {
        let mut state = RenderState::default();
        state.indent("    ");
        state.indent("    ");
        state.add_indent();
        state.add_token("pass\n");
        state.dedent();
        state.add_indent();
        state.add_token("x");
        assert_eq!(state.to_string(), "        pass\n    x");
        assert_eq!(state.indent_depth(), 1);
        state.dedent();
        state.dedent();
        assert_eq!(state.current_indent(), "");
    }

    #[test]
    fn test_line_number_counts_newlines() {
        let mut state = RenderState::default();
        state.add_token("a\nb\n");
        state.add_token("c");
        assert_eq!(state.line_number(), 2);
        assert!(state.ends_with("c"));
    }
}
