// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Traversal engine.
//!
//! The [`Renderer`] walks a tree depth-first. For every node it consults the
//! [`Registry`]: a custom handler runs first and either renders the whole
//! subtree ([`Dispatch::Rendered`]) or declines ([`Dispatch::NotHandled`]), in
//! which case the node's template, call-variant table, or plain child order is
//! applied. Handlers call back into the renderer through its public methods.
//!
//! The only mutable state is owned by the renderer: the output buffer, the
//! indentation stack, and the current precedence bound.

use tracing::trace;

use tugdecomp_core::{RenderError, Revision, Tree};

use crate::calls::{ArgCount, CallVariant};
use crate::options::RenderOptions;
use crate::precedence::{needs_parens, PRECEDENCE_BODY};
use crate::registry::{build_registry, Registry};
use crate::state::RenderState;
use crate::template::{Segment, Selector, Template};

/// Outcome of a custom handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Dispatch {
    /// The subtree is fully rendered; skip the generic rule.
    Rendered,
    /// Fall back to the generic rule for this node.
    NotHandled,
}

/// A custom render routine registered for a node kind.
pub type Handler = fn(&mut Renderer<'_>, &Tree) -> Result<Dispatch, RenderError>;

/// Render `tree` with a registry built for `options.revision`.
pub fn decompile(options: &RenderOptions, tree: &Tree) -> Result<String, RenderError> {
    let registry = build_registry(options.revision);
    render_tree(&registry, options, tree)
}

/// Render `tree` with an existing registry.
///
/// The registry's revision governs revision-dependent decisions; callers keep
/// `options.revision` equal to it.
pub fn render_tree(
    registry: &Registry,
    options: &RenderOptions,
    tree: &Tree,
) -> Result<String, RenderError> {
    let mut renderer = Renderer::new(registry, options);
    renderer.render(tree)?;
    Ok(renderer.finish())
}

pub struct Renderer<'r> {
    registry: &'r Registry,
    options: &'r RenderOptions,
    state: RenderState,
    prec: u32,
}

impl<'r> Renderer<'r> {
    pub fn new(registry: &'r Registry, options: &'r RenderOptions) -> Self {
        Self {
            registry,
            options,
            state: RenderState::default(),
            prec: PRECEDENCE_BODY,
        }
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    pub fn options(&self) -> &'r RenderOptions {
        self.options
    }

    pub fn revision(&self) -> Revision {
        self.registry.revision()
    }

    /// Current precedence bound.
    pub fn precedence(&self) -> u32 {
        self.prec
    }

    // ------------------------------------------------------------------------
    // Traversal
    // ------------------------------------------------------------------------

    /// Render one subtree under the current precedence bound.
    pub fn render(&mut self, tree: &Tree) -> Result<(), RenderError> {
        let own = self.registry.precedence().get(tree.kind());
        let parens = own.is_some_and(|p| needs_parens(p, self.prec));
        let saved = self.prec;
        if parens {
            self.write("(");
        }
        if let Some(p) = own {
            self.prec = p;
        }
        let result = self.dispatch(tree);
        self.prec = saved;
        result?;
        if parens {
            self.write(")");
        }
        Ok(())
    }

    /// Render one subtree under the bound `prec`.
    pub fn render_with_prec(&mut self, tree: &Tree, prec: u32) -> Result<(), RenderError> {
        self.with_prec(prec, |r| r.render(tree))
    }

    /// Run `f` with the precedence bound set to `prec`, restoring it after.
    pub fn with_prec<T, F>(&mut self, prec: u32, f: F) -> Result<T, RenderError>
    where
        F: FnOnce(&mut Self) -> Result<T, RenderError>,
    {
        let saved = self.prec;
        self.prec = prec;
        let result = f(self);
        self.prec = saved;
        result
    }

    /// Render the children `tree[start:end]` joined by `sep`.
    pub fn render_range(
        &mut self,
        tree: &Tree,
        start: isize,
        end: isize,
        sep: &str,
        prec: Option<u32>,
    ) -> Result<(), RenderError> {
        for (i, child) in tree.slice(start, end).iter().enumerate() {
            if i > 0 {
                self.write(sep);
            }
            match prec {
                Some(p) => self.render_with_prec(child, p)?,
                None => self.render(child)?,
            }
        }
        Ok(())
    }

    /// Render every child in order.
    pub fn render_children(&mut self, tree: &Tree) -> Result<(), RenderError> {
        for child in tree.children() {
            self.render(child)?;
        }
        Ok(())
    }

    fn dispatch(&mut self, tree: &Tree) -> Result<(), RenderError> {
        let registry = self.registry;
        if let Some(handler) = registry.rules().handler(tree.kind()) {
            trace!(kind = tree.kind(), "custom handler");
            if handler(self, tree)? == Dispatch::Rendered {
                return Ok(());
            }
        }
        self.render_default(tree)
    }

    /// Apply the generic rule: template, then call-variant table, then plain
    /// child order. Tokens without a rule render as nothing.
    pub fn render_default(&mut self, tree: &Tree) -> Result<(), RenderError> {
        let registry = self.registry;
        let rules = registry.rules();
        if let Some(template) = rules.template(tree.kind()) {
            return self.apply_template(template, tree, &[]);
        }
        if let Some(table) = rules.variants(tree.kind()) {
            let (variant, opcode) = CallVariant::of(tree)?;
            if let Some(rule) = table.get(&variant) {
                let template = if ArgCount::of(opcode).is_empty() {
                    &rule.bare
                } else {
                    &rule.with_args
                };
                return self.apply_template(template, tree, &[]);
            }
            trace!(kind = tree.kind(), ?variant, "no variant rule, rendering children");
        }
        self.render_children(tree)
    }

    /// Expand `template` against `tree`.
    ///
    /// `extras` supplies handler-computed attributes such as `conversion`;
    /// they are only visible to `%{name}` on the node itself.
    pub fn apply_template(
        &mut self,
        template: &Template,
        tree: &Tree,
        extras: &[(&str, &str)],
    ) -> Result<(), RenderError> {
        if !template.is_consistent() {
            return Err(arity_error(template, tree));
        }
        let mut selectors = template.selectors().iter();
        for segment in template.segments() {
            match segment {
                Segment::Text(text) => self.write(text),
                Segment::Indent => self.write_indent(),
                Segment::IndentMore => self.indent_more(),
                Segment::IndentLess => self.indent_less(),
                Segment::Child | Segment::Range => match selectors.next() {
                    Some(Selector::Child {
                        index,
                        expect,
                        prec,
                    }) => {
                        let child = tree.child(*index)?;
                        if let Some(kind) = expect {
                            if !child.is(kind) {
                                return Err(RenderError::unexpected_kind(tree, *kind, child));
                            }
                        }
                        match prec {
                            Some(p) => self.render_with_prec(child, *p)?,
                            None => self.render(child)?,
                        }
                    }
                    Some(Selector::Range {
                        start,
                        end,
                        sep,
                        prec,
                    }) => self.render_range(tree, *start, *end, sep, *prec)?,
                    None => return Err(arity_error(template, tree)),
                },
                Segment::Attr { child, name } => {
                    let value = match child {
                        Some(index) => attribute(tree.child(*index)?, name, &[])?,
                        None => attribute(tree, name, extras)?,
                    };
                    self.write(&value);
                }
            }
        }
        Ok(())
    }

    /// Run `f` against a scratch buffer and return what it wrote.
    pub fn capture<F>(&mut self, f: F) -> Result<String, RenderError>
    where
        F: FnOnce(&mut Self) -> Result<(), RenderError>,
    {
        let saved = self.state.replace_tokens(String::new());
        let line = self.state.line_number();
        let result = f(self);
        let captured = self.state.replace_tokens(saved);
        self.state.set_line_number(line);
        result.map(|()| captured)
    }

    // ------------------------------------------------------------------------
    // Output primitives
    // ------------------------------------------------------------------------

    pub fn write(&mut self, text: &str) {
        self.state.add_token(text);
    }

    pub fn write_indent(&mut self) {
        self.state.add_indent();
    }

    pub fn indent_more(&mut self) {
        self.state.indent(&self.options.indent_unit);
    }

    pub fn indent_less(&mut self) {
        self.state.dedent();
    }

    pub fn current_indent(&self) -> String {
        self.state.current_indent()
    }

    /// Number of output lines completed so far.
    pub fn output_line(&self) -> u32 {
        self.state.line_number()
    }

    pub fn ends_with(&self, suffix: &str) -> bool {
        self.state.ends_with(suffix)
    }

    pub fn finish(self) -> String {
        self.state.into_string()
    }
}

fn arity_error(template: &Template, tree: &Tree) -> RenderError {
    RenderError::TemplateArity {
        kind: tree.kind().to_string(),
        line: tree.line(),
        format: template.format().to_string(),
        directives: template.arity(),
        selectors: template.selectors().len(),
    }
}

fn attribute(tree: &Tree, name: &str, extras: &[(&str, &str)]) -> Result<String, RenderError> {
    if let Some((_, value)) = extras.iter().find(|(key, _)| *key == name) {
        return Ok((*value).to_string());
    }
    match name {
        "kind" => Ok(tree.kind().to_string()),
        "attr" if tree.is_token() => Ok(tree.attr().display()),
        "pattr" => tree
            .pattr()
            .map(str::to_string)
            .ok_or_else(|| RenderError::unknown_attribute(tree, name)),
        _ => Err(RenderError::unknown_attribute(tree, name)),
    }
}
