// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Rule registry: which rule renders each node kind, for one revision.
//!
//! A [`Registry`] is built once per decompilation session by
//! [`build_registry`]: the revision-independent base table first, then the
//! 3.x overlays in ascending revision order. Overlays add or replace entries
//! but never remove a tag, so every tag known at one revision is known at
//! every later one. The result is immutable and may be shared across threads.

mod base;
mod v3;

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use tracing::debug;

use tugdecomp_core::output::{PrecedenceInfo, RuleInfo};
use tugdecomp_core::Revision;

use crate::calls::CallVariant;
use crate::engine::Handler;
use crate::precedence::PrecedenceTable;
use crate::template::Template;

/// Templates for one call variant, chosen by whether the opcode's argument
/// count is zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantRule {
    pub bare: Template,
    pub with_args: Template,
}

impl VariantRule {
    pub fn new(bare: Template, with_args: Template) -> Self {
        Self { bare, with_args }
    }

    /// The same template regardless of argument count.
    pub fn uniform(template: Template) -> Self {
        Self {
            bare: template.clone(),
            with_args: template,
        }
    }
}

/// The rule a node kind resolves to, in dispatch order.
#[derive(Clone, Copy)]
pub enum Rule<'a> {
    Handler(Handler),
    Template(&'a Template),
    Variants(&'a HashMap<CallVariant, VariantRule>),
}

impl Rule<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Rule::Handler(_) => "handler",
            Rule::Template(_) => "template",
            Rule::Variants(_) => "variants",
        }
    }
}

impl fmt::Debug for Rule<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Handler(_) => f.write_str("Handler(..)"),
            Rule::Template(t) => f.debug_tuple("Template").field(&t.format()).finish(),
            Rule::Variants(v) => f.debug_tuple("Variants").field(&v.len()).finish(),
        }
    }
}

// ============================================================================
// Rule Table
// ============================================================================

/// Rules keyed by node kind.
///
/// A kind may carry a handler and a template at once: the handler runs first
/// and the template is its fallback when it declines.
#[derive(Default, Clone)]
pub struct RuleTable {
    templates: HashMap<&'static str, Template>,
    handlers: HashMap<&'static str, Handler>,
    variants: HashMap<&'static str, HashMap<CallVariant, VariantRule>>,
}

impl fmt::Debug for RuleTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleTable")
            .field("templates", &self.templates.len())
            .field("handlers", &self.handlers.len())
            .field("variants", &self.variants.len())
            .finish()
    }
}

impl RuleTable {
    pub fn template(&self, kind: &str) -> Option<&Template> {
        self.templates.get(kind)
    }

    pub fn handler(&self, kind: &str) -> Option<Handler> {
        self.handlers.get(kind).copied()
    }

    pub fn variants(&self, kind: &str) -> Option<&HashMap<CallVariant, VariantRule>> {
        self.variants.get(kind)
    }

    pub(crate) fn insert_template(&mut self, kind: &'static str, template: Template) {
        self.templates.insert(kind, template);
    }

    pub(crate) fn insert_handler(&mut self, kind: &'static str, handler: Handler) {
        self.handlers.insert(kind, handler);
    }

    pub(crate) fn insert_variant(&mut self, kind: &'static str, variant: CallVariant, rule: VariantRule) {
        self.variants.entry(kind).or_default().insert(variant, rule);
    }

    /// The first rule consulted for `kind`.
    pub fn lookup(&self, kind: &str) -> Option<Rule<'_>> {
        if let Some(handler) = self.handler(kind) {
            return Some(Rule::Handler(handler));
        }
        if let Some(template) = self.template(kind) {
            return Some(Rule::Template(template));
        }
        self.variants(kind).map(Rule::Variants)
    }

    /// Every kind with at least one rule, sorted.
    pub fn tags(&self) -> BTreeSet<&'static str> {
        self.templates
            .keys()
            .chain(self.handlers.keys())
            .chain(self.variants.keys())
            .copied()
            .collect()
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.templates.contains_key(kind)
            || self.handlers.contains_key(kind)
            || self.variants.contains_key(kind)
    }

    /// Number of distinct kinds.
    pub fn len(&self) -> usize {
        self.tags().len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty() && self.handlers.is_empty() && self.variants.is_empty()
    }

    /// Every template in the table, variant templates included.
    pub fn all_templates(&self) -> impl Iterator<Item = (&'static str, &Template)> + '_ {
        let plain = self.templates.iter().map(|(k, t)| (*k, t));
        let variants = self.variants.iter().flat_map(|(k, table)| {
            table
                .values()
                .flat_map(move |rule| [(*k, &rule.bare), (*k, &rule.with_args)])
        });
        plain.chain(variants)
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Rule table plus precedence table for one revision.
#[derive(Debug, Clone)]
pub struct Registry {
    revision: Revision,
    rules: RuleTable,
    precedence: PrecedenceTable,
}

impl Registry {
    pub fn revision(&self) -> Revision {
        self.revision
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn precedence(&self) -> &PrecedenceTable {
        &self.precedence
    }

    /// Listing of every rule and precedence entry, sorted by tag.
    pub fn describe(&self) -> (Vec<RuleInfo>, Vec<PrecedenceInfo>) {
        let mut rules = Vec::new();
        for tag in self.rules.tags() {
            if self.rules.handler(tag).is_some() {
                rules.push(RuleInfo {
                    tag: tag.to_string(),
                    rule: "handler".to_string(),
                    template: None,
                });
            }
            if let Some(template) = self.rules.template(tag) {
                rules.push(RuleInfo {
                    tag: tag.to_string(),
                    rule: "template".to_string(),
                    template: Some(template.format().to_string()),
                });
            }
            if let Some(table) = self.rules.variants(tag) {
                let mut variants: Vec<_> = table.iter().collect();
                variants.sort_by_key(|(variant, _)| variant.opcode_name());
                for (variant, rule) in variants {
                    rules.push(RuleInfo {
                        tag: format!("{tag}/{variant}"),
                        rule: "variants".to_string(),
                        template: Some(rule.with_args.format().to_string()),
                    });
                }
            }
        }
        let precedence = self
            .precedence
            .entries()
            .into_iter()
            .map(|(tag, value)| PrecedenceInfo {
                tag: tag.to_string(),
                value,
            })
            .collect();
        (rules, precedence)
    }
}

/// Build the registry for `revision`.
pub fn build_registry(revision: Revision) -> Registry {
    let mut rules = RuleTable::default();
    let mut precedence = PrecedenceTable::base();
    base::install(&mut rules);
    if revision.at_least(Revision::V3_0) {
        v3::install(&mut rules, &mut precedence, revision);
    }
    debug!(
        %revision,
        rules = rules.len(),
        precedence = precedence.len(),
        "built rule registry"
    );
    Registry {
        revision,
        rules,
        precedence,
    }
}
