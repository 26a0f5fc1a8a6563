// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Call-site reconstruction.
//!
//! Every call renders in source order, whichever bytecode layout produced it:
//!
//! ```text
//! f(p0, ..., *rest, k0=v0, ..., **more)
//! ```
//!
//! The call opcode at the end of a `call` node is decoded once into a
//! [`CallVariant`]. Its packed argument word is split into an [`ArgCount`],
//! and the children are cut into groups according to the revision's
//! [`VariadicLayout`]. A child count that disagrees with the decoded counts
//! is a fatal [`RenderError::ArgCountMismatch`].
//!
//! Revision 3.6 replaced the variadic opcodes with `CALL_FUNCTION_EX`; those
//! extended calls are rendered by [`extended_call`], which classifies the
//! positional operand and the keyword operand separately.

use std::fmt;

use tracing::{debug, trace};

use tugdecomp_core::{RenderError, Revision, Tree};

use crate::arguments::{bare_tuple, has_elements, is_identifier_keyed, keyword_pairs, operands};
use crate::engine::{Dispatch, Renderer};
use crate::layout::LineBreaker;
use crate::precedence::{PRECEDENCE_ASYNC_CALL, PRECEDENCE_BODY};
use crate::template::{Selector, Template};
use crate::unpack::{emit_map_merge, emit_starred, emit_tuple_merge};

// ============================================================================
// Call Variants
// ============================================================================

/// Which stack-argument layout a call was produced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CallVariant {
    /// `CALL_FUNCTION`
    Plain,
    /// `CALL_METHOD`
    Method,
    /// `CALL_FUNCTION_KW`
    Keyword,
    /// `CALL_FUNCTION_VAR`
    Var,
    /// `CALL_FUNCTION_VAR_KW`
    VarKeyword,
    /// `CALL_FUNCTION_EX`
    Ex,
    /// `CALL_FUNCTION_EX_KW`
    ExKeyword,
}

impl CallVariant {
    pub const ALL: [CallVariant; 7] = [
        CallVariant::Plain,
        CallVariant::Method,
        CallVariant::Keyword,
        CallVariant::Var,
        CallVariant::VarKeyword,
        CallVariant::Ex,
        CallVariant::ExKeyword,
    ];

    /// Decode an opcode name, ignoring a trailing `_<argc>` suffix.
    pub fn from_opcode(kind: &str) -> Option<Self> {
        match opcode_base(kind) {
            "CALL_FUNCTION" => Some(CallVariant::Plain),
            "CALL_METHOD" => Some(CallVariant::Method),
            "CALL_FUNCTION_KW" => Some(CallVariant::Keyword),
            "CALL_FUNCTION_VAR" => Some(CallVariant::Var),
            "CALL_FUNCTION_VAR_KW" => Some(CallVariant::VarKeyword),
            "CALL_FUNCTION_EX" => Some(CallVariant::Ex),
            "CALL_FUNCTION_EX_KW" => Some(CallVariant::ExKeyword),
            _ => None,
        }
    }

    /// Decode the trailing opcode of `call`.
    pub fn of(call: &Tree) -> Result<(Self, &Tree), RenderError> {
        let opcode = call.child(-1)?;
        match Self::from_opcode(opcode.kind()) {
            Some(variant) => Ok((variant, opcode)),
            None => Err(RenderError::unknown_call_variant(call, opcode.kind())),
        }
    }

    pub fn opcode_name(self) -> &'static str {
        match self {
            CallVariant::Plain => "CALL_FUNCTION",
            CallVariant::Method => "CALL_METHOD",
            CallVariant::Keyword => "CALL_FUNCTION_KW",
            CallVariant::Var => "CALL_FUNCTION_VAR",
            CallVariant::VarKeyword => "CALL_FUNCTION_VAR_KW",
            CallVariant::Ex => "CALL_FUNCTION_EX",
            CallVariant::ExKeyword => "CALL_FUNCTION_EX_KW",
        }
    }

    /// Operands pushed after the counted arguments (`*args`, `**kwargs`).
    pub fn trailing_operands(self) -> usize {
        match self {
            CallVariant::Plain | CallVariant::Method => 0,
            CallVariant::Keyword | CallVariant::Var | CallVariant::Ex => 1,
            CallVariant::VarKeyword | CallVariant::ExKeyword => 2,
        }
    }

    pub fn has_star(self) -> bool {
        matches!(self, CallVariant::Var | CallVariant::VarKeyword)
    }

    pub fn has_double_star(self) -> bool {
        matches!(self, CallVariant::Keyword | CallVariant::VarKeyword)
    }

    /// Whether the opcode argument is a packed positional/keyword count.
    pub fn is_counted(self) -> bool {
        !matches!(self, CallVariant::Ex | CallVariant::ExKeyword)
    }
}

impl fmt::Display for CallVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.opcode_name())
    }
}

fn opcode_base(kind: &str) -> &str {
    match kind.rsplit_once('_') {
        Some((base, suffix)) if !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()) => {
            base
        }
        _ => kind,
    }
}

// ============================================================================
// Argument Counts
// ============================================================================

/// Counts decoded from a packed call argument word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArgCount {
    pub positional: usize,
    pub keyword: usize,
}

impl ArgCount {
    /// Low byte is the positional count, the next byte the keyword count.
    pub fn decode(word: i64) -> Self {
        Self {
            positional: (word & 0xFF) as usize,
            keyword: ((word >> 8) & 0xFF) as usize,
        }
    }

    /// Decode the word carried by a call opcode token. Tokens without an
    /// integer payload fall back to the numeric suffix of their name.
    pub fn of(opcode: &Tree) -> Self {
        let word = opcode.attr().as_int().or_else(|| {
            opcode
                .kind()
                .rsplit_once('_')
                .and_then(|(_, suffix)| suffix.parse::<i64>().ok())
        });
        Self::decode(word.unwrap_or(0))
    }

    pub fn total(self) -> usize {
        self.positional + self.keyword
    }

    pub fn is_empty(self) -> bool {
        self.total() == 0
    }
}

// ============================================================================
// Layouts
// ============================================================================

/// Relative stack order of `*args` and keyword pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariadicLayout {
    /// Before 3.5: positional, keyword pairs, `*args`.
    KeywordsBeforeStar,
    /// 3.5: positional, `*args`, keyword pairs.
    StarBeforeKeywords,
}

impl VariadicLayout {
    pub fn for_revision(revision: Revision) -> Self {
        if revision.at_least(Revision::V3_5) {
            VariadicLayout::StarBeforeKeywords
        } else {
            VariadicLayout::KeywordsBeforeStar
        }
    }
}

/// The children of a counted call, grouped by role.
#[derive(Debug, Clone, Copy)]
pub struct CallArguments<'t> {
    pub callee: &'t Tree,
    pub positional: &'t [Tree],
    pub star: Option<&'t Tree>,
    pub keywords: &'t [Tree],
    pub double_star: Option<&'t Tree>,
}

/// Cut the children of `call` into argument groups.
pub fn split_call(
    call: &Tree,
    variant: CallVariant,
    layout: VariadicLayout,
) -> Result<CallArguments<'_>, RenderError> {
    if !variant.is_counted() {
        return Err(RenderError::unsupported(
            call,
            format!("{variant} carries no argument count"),
        ));
    }
    let count = ArgCount::of(call.child(-1)?);
    let expected = 1 + count.total() + variant.trailing_operands() + 1;
    if call.len() != expected {
        return Err(RenderError::arg_count(call, expected, call.len()));
    }

    let children = call.children();
    let mut next = 1 + count.positional;
    let positional = &children[1..next];
    let star_first = variant.has_star() && layout == VariadicLayout::StarBeforeKeywords;
    let mut star = None;
    if star_first {
        star = Some(&children[next]);
        next += 1;
    }
    let keywords = &children[next..next + count.keyword];
    next += count.keyword;
    if variant.has_star() && !star_first {
        star = Some(&children[next]);
        next += 1;
    }
    let double_star = variant.has_double_star().then(|| &children[next]);

    if let Some(stray) = keywords.iter().find(|kw| !kw.is("kwarg")) {
        return Err(RenderError::unexpected_kind(call, "kwarg", stray));
    }

    Ok(CallArguments {
        callee: &children[0],
        positional,
        star,
        keywords,
        double_star,
    })
}

/// Write a call in canonical order.
pub fn emit_call(r: &mut Renderer<'_>, args: &CallArguments<'_>) -> Result<(), RenderError> {
    r.render(args.callee)?;
    r.write("(");
    let mut written = 0;
    for arg in args.positional {
        comma(r, &mut written);
        r.render_with_prec(arg, PRECEDENCE_BODY)?;
    }
    if let Some(star) = args.star {
        comma(r, &mut written);
        emit_star(r, star)?;
    }
    for kw in args.keywords {
        comma(r, &mut written);
        r.render_with_prec(kw, PRECEDENCE_BODY)?;
    }
    if let Some(double_star) = args.double_star {
        comma(r, &mut written);
        r.write("**");
        r.render_with_prec(double_star, PRECEDENCE_BODY)?;
    }
    r.write(")");
    Ok(())
}

fn comma(r: &mut Renderer<'_>, written: &mut usize) {
    if *written > 0 {
        r.write(", ");
    }
    *written += 1;
}

/// `*rest`, or `*a, *b` when the operand is an unpack of several lists.
fn emit_star(r: &mut Renderer<'_>, star: &Tree) -> Result<(), RenderError> {
    let inner = star.unwrap_trivial();
    if inner.is("build_list_unpack") {
        for (i, element) in operands(inner).iter().enumerate() {
            r.write(if i == 0 { "*" } else { ", *" });
            r.render_with_prec(element, PRECEDENCE_BODY)?;
        }
        return Ok(());
    }
    r.write("*");
    r.render_with_prec(star, PRECEDENCE_BODY)
}

// ============================================================================
// Revision Handlers for `call`
// ============================================================================

/// 3.2 to 3.4.
pub fn call_pre35(r: &mut Renderer<'_>, call: &Tree) -> Result<Dispatch, RenderError> {
    let (variant, _) = CallVariant::of(call)?;
    let layout = VariadicLayout::KeywordsBeforeStar;
    match variant {
        CallVariant::Var => {
            let args = split_call(call, variant, layout)?;
            if args.keywords.is_empty() {
                return Ok(Dispatch::NotHandled);
            }
            emit_call(r, &args)?;
            Ok(Dispatch::Rendered)
        }
        CallVariant::VarKeyword => {
            split_call(call, variant, layout)?;
            debug!(
                line = ?call.line(),
                "*args with **kwargs left to the generic call template"
            );
            Ok(Dispatch::NotHandled)
        }
        CallVariant::Plain | CallVariant::Method | CallVariant::Keyword => {
            split_call(call, variant, layout)?;
            Ok(Dispatch::NotHandled)
        }
        CallVariant::Ex | CallVariant::ExKeyword => Ok(Dispatch::NotHandled),
    }
}

/// 3.5: `*args` sits below the keyword pairs on the stack.
pub fn call_35(r: &mut Renderer<'_>, call: &Tree) -> Result<Dispatch, RenderError> {
    let (variant, _) = CallVariant::of(call)?;
    star_before_keywords(r, call, variant)
}

/// 3.6 and later.
pub fn call_36(r: &mut Renderer<'_>, call: &Tree) -> Result<Dispatch, RenderError> {
    let (variant, _) = CallVariant::of(call)?;
    match variant {
        CallVariant::Keyword => {
            emit_named_keywords(r, call)?;
            Ok(Dispatch::Rendered)
        }
        CallVariant::Ex | CallVariant::ExKeyword => unpacked_call(r, call, variant),
        _ => star_before_keywords(r, call, variant),
    }
}

fn star_before_keywords(
    r: &mut Renderer<'_>,
    call: &Tree,
    variant: CallVariant,
) -> Result<Dispatch, RenderError> {
    let layout = VariadicLayout::StarBeforeKeywords;
    match variant {
        CallVariant::Var | CallVariant::VarKeyword => {
            let args = split_call(call, variant, layout)?;
            emit_call(r, &args)?;
            Ok(Dispatch::Rendered)
        }
        CallVariant::Plain | CallVariant::Method | CallVariant::Keyword => {
            split_call(call, variant, layout)?;
            Ok(Dispatch::NotHandled)
        }
        CallVariant::Ex | CallVariant::ExKeyword => Ok(Dispatch::NotHandled),
    }
}

/// `call_kw36`: keyword names come from a constant tuple just before the opcode.
pub fn call_kw36(r: &mut Renderer<'_>, call: &Tree) -> Result<Dispatch, RenderError> {
    emit_named_keywords(r, call)?;
    Ok(Dispatch::Rendered)
}

/// Children: callee, positional values, keyword values, names tuple, opcode.
fn emit_named_keywords(r: &mut Renderer<'_>, call: &Tree) -> Result<(), RenderError> {
    let names = call.child(-2)?;
    let keys = names
        .unwrap_trivial()
        .attr()
        .as_names()
        .ok_or_else(|| RenderError::unexpected_kind(call, "keyword names tuple", names))?;
    let n = call.len();
    if n < keys.len() + 3 {
        return Err(RenderError::arg_count(call, keys.len() + 3, n));
    }
    if let Some(argc) = call.child(-1)?.attr().as_int() {
        if usize::try_from(argc).ok() != Some(n - 3) {
            return Err(RenderError::arg_count(
                call,
                usize::try_from(argc).unwrap_or(0) + 3,
                n,
            ));
        }
    }

    let children = call.children();
    let first_keyword = n - 2 - keys.len();
    r.render(&children[0])?;
    r.write("(");
    let mut breaker = LineBreaker::for_renderer(r);
    for arg in &children[1..first_keyword] {
        let sep = breaker.separator(arg.line());
        r.write(&sep);
        r.render_with_prec(arg, PRECEDENCE_BODY)?;
    }
    for (key, value) in keys.iter().zip(&children[first_keyword..n - 2]) {
        let sep = breaker.separator(value.line());
        r.write(&sep);
        r.write(key);
        r.write("=");
        r.render_with_prec(value, PRECEDENCE_BODY)?;
    }
    r.write(")");
    Ok(())
}

// ============================================================================
// Extended Calls (3.6+)
// ============================================================================

/// What the positional operand of `CALL_FUNCTION_EX` holds.
#[derive(Debug, Clone, Copy)]
pub enum PositionalGroup<'t> {
    /// `()`: no positional arguments.
    Empty,
    /// A literal tuple, written as bare elements.
    Elements(&'t Tree),
    /// `build_tuple_unpack_with_call`.
    Merge(&'t Tree),
    /// `starred`.
    Starred(&'t Tree),
    /// Any other iterable, written as `*operand`.
    Spread(&'t Tree),
}

impl<'t> PositionalGroup<'t> {
    pub fn classify(operand: &'t Tree) -> Self {
        let inner = operand.unwrap_trivial();
        if is_empty_tuple_const(inner) {
            return PositionalGroup::Empty;
        }
        match inner.kind() {
            "tuple" if has_elements(inner) => PositionalGroup::Elements(inner),
            "tuple" => PositionalGroup::Empty,
            "build_tuple_unpack_with_call" => PositionalGroup::Merge(inner),
            "starred" => PositionalGroup::Starred(inner),
            _ => PositionalGroup::Spread(operand),
        }
    }
}

/// `LOAD_CONST ()`: the constant pushed for a call without positional
/// arguments.
fn is_empty_tuple_const(tree: &Tree) -> bool {
    if !tree.is_token() || !tree.is("LOAD_CONST") {
        return false;
    }
    match tree.attr().as_names() {
        Some(names) => names.is_empty(),
        None => tree.pattr() == Some("()"),
    }
}

/// What the keyword operand of `CALL_FUNCTION_EX_KW` holds.
#[derive(Debug, Clone, Copy)]
pub enum KeywordGroup<'t> {
    /// `build_map_unpack_with_call`.
    Merge(&'t Tree),
    /// A literal dict with identifier keys, written as `k=v` pairs.
    Pairs(&'t Tree),
    /// Any other mapping, written as `**operand`.
    Spread(&'t Tree),
}

impl<'t> KeywordGroup<'t> {
    pub fn classify(operand: &'t Tree) -> Self {
        let inner = operand.unwrap_trivial();
        if inner.is("build_map_unpack_with_call") {
            KeywordGroup::Merge(inner)
        } else if inner.is("dict") && is_identifier_keyed(inner) {
            KeywordGroup::Pairs(inner)
        } else {
            KeywordGroup::Spread(operand)
        }
    }
}

/// Which of the two operands are unpack merges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtendedCallShape {
    BothMerged,
    PositionalMerged,
    KeywordMerged,
    NeitherMerged,
}

impl ExtendedCallShape {
    pub fn of(positional: &PositionalGroup<'_>, keywords: &KeywordGroup<'_>) -> Self {
        match (
            matches!(positional, PositionalGroup::Merge(_)),
            matches!(keywords, KeywordGroup::Merge(_)),
        ) {
            (true, true) => ExtendedCallShape::BothMerged,
            (true, false) => ExtendedCallShape::PositionalMerged,
            (false, true) => ExtendedCallShape::KeywordMerged,
            (false, false) => ExtendedCallShape::NeitherMerged,
        }
    }
}

/// `call_ex_kw`, `call_ex_kw2`, `call_ex_kw3`, `call_ex_kw4`.
///
/// Children: callee, positional operand, keyword operand, opcode. Every shape
/// writes the positional group first and the keyword group second.
pub fn extended_call(r: &mut Renderer<'_>, call: &Tree) -> Result<Dispatch, RenderError> {
    if call.len() != 4 {
        return Err(RenderError::arg_count(call, 4, call.len()));
    }
    let opcode = call.child(-1)?;
    if !opcode.kind_starts_with("CALL_FUNCTION_EX") {
        return Err(RenderError::unexpected_kind(call, "CALL_FUNCTION_EX_KW", opcode));
    }
    let positional = PositionalGroup::classify(call.child(1)?);
    let keywords = KeywordGroup::classify(call.child(2)?);
    let shape = ExtendedCallShape::of(&positional, &keywords);
    trace!(kind = call.kind(), ?shape, "extended call");
    emit_unpacked(r, call.child(0)?, positional, Some(keywords))?;
    Ok(Dispatch::Rendered)
}

/// `CALL_FUNCTION_EX` at the end of a plain `call` node. A plain iterable
/// and mapping are left to the variant templates.
fn unpacked_call(
    r: &mut Renderer<'_>,
    call: &Tree,
    variant: CallVariant,
) -> Result<Dispatch, RenderError> {
    let expected = 2 + variant.trailing_operands();
    if call.len() != expected {
        return Err(RenderError::arg_count(call, expected, call.len()));
    }
    let positional = PositionalGroup::classify(call.child(1)?);
    let keywords = match variant {
        CallVariant::ExKeyword => Some(KeywordGroup::classify(call.child(2)?)),
        _ => None,
    };
    let spread_only = matches!(positional, PositionalGroup::Spread(_))
        && keywords.is_none_or(|k| matches!(k, KeywordGroup::Spread(_)));
    if spread_only {
        return Ok(Dispatch::NotHandled);
    }
    emit_unpacked(r, call.child(0)?, positional, keywords)?;
    Ok(Dispatch::Rendered)
}

/// `callee(positional group, keyword group)`.
fn emit_unpacked(
    r: &mut Renderer<'_>,
    callee: &Tree,
    positional: PositionalGroup<'_>,
    keywords: Option<KeywordGroup<'_>>,
) -> Result<(), RenderError> {
    r.render(callee)?;
    r.write("(");
    // One breaker for the whole list, so the keyword group can start a line.
    let mut breaker = LineBreaker::for_renderer(r);
    emit_positional(r, &mut breaker, positional)?;
    if let Some(keywords) = keywords {
        emit_keywords(r, &mut breaker, keywords)?;
    }
    r.write(")");
    Ok(())
}

fn emit_positional(
    r: &mut Renderer<'_>,
    breaker: &mut LineBreaker,
    group: PositionalGroup<'_>,
) -> Result<usize, RenderError> {
    match group {
        PositionalGroup::Empty => Ok(0),
        PositionalGroup::Elements(tuple) => bare_tuple(r, breaker, tuple),
        PositionalGroup::Merge(merge) => emit_tuple_merge(r, breaker, merge),
        PositionalGroup::Starred(starred) => emit_starred(r, breaker, starred),
        PositionalGroup::Spread(operand) => {
            let sep = breaker.separator(operand.line());
            r.write(&sep);
            r.write("*");
            r.render_with_prec(operand, PRECEDENCE_BODY)?;
            Ok(1)
        }
    }
}

fn emit_keywords(
    r: &mut Renderer<'_>,
    breaker: &mut LineBreaker,
    group: KeywordGroup<'_>,
) -> Result<usize, RenderError> {
    match group {
        KeywordGroup::Merge(merge) => emit_map_merge(r, breaker, merge),
        KeywordGroup::Pairs(dict) => keyword_pairs(r, breaker, dict),
        KeywordGroup::Spread(operand) => {
            let sep = breaker.separator(operand.line());
            r.write(&sep);
            r.write("**");
            r.render_with_prec(operand, PRECEDENCE_BODY)?;
            Ok(1)
        }
    }
}

// ============================================================================
// Async Calls (3.5+)
// ============================================================================

/// `async_call`: callee, positional args, then four opcode tokens.
pub fn async_call(r: &mut Renderer<'_>, call: &Tree) -> Result<Dispatch, RenderError> {
    let template = Template::new(
        "%c(%P)",
        vec![
            Selector::at(0),
            Selector::range(1, -4, ", ").with_prec(PRECEDENCE_BODY),
        ],
    );
    r.write("async ");
    r.with_prec(PRECEDENCE_ASYNC_CALL, |r| r.apply_template(&template, call, &[]))?;
    Ok(Dispatch::Rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{argc, call, kwarg, name, opcode, render, render_ok};

    #[test]
    fn test_variant_decoding() {
        assert_eq!(CallVariant::from_opcode("CALL_FUNCTION_2"), Some(CallVariant::Plain));
        assert_eq!(CallVariant::from_opcode("CALL_FUNCTION"), Some(CallVariant::Plain));
        assert_eq!(CallVariant::from_opcode("CALL_METHOD_1"), Some(CallVariant::Method));
        assert_eq!(
            CallVariant::from_opcode("CALL_FUNCTION_VAR_KW_258"),
            Some(CallVariant::VarKeyword)
        );
        assert_eq!(
            CallVariant::from_opcode("CALL_FUNCTION_EX_KW"),
            Some(CallVariant::ExKeyword)
        );
        assert_eq!(CallVariant::from_opcode("CALL_FUNCTION_KW_3"), Some(CallVariant::Keyword));
        assert_eq!(CallVariant::from_opcode("CALL_FUNCTIONS_2"), None);
        assert_eq!(CallVariant::from_opcode("BUILD_TUPLE_2"), None);
    }

    #[test]
    fn test_argcount_decode() {
        assert_eq!(
            ArgCount::decode(258),
            ArgCount {
                positional: 2,
                keyword: 1
            }
        );
        assert_eq!(ArgCount::decode(0x10203).positional, 3);
        assert_eq!(ArgCount::decode(0x10203).keyword, 2);
        assert!(ArgCount::decode(0).is_empty());
        // Without an integer payload the name suffix is used.
        let bare: Tree = tugdecomp_core::Token::new("CALL_FUNCTION_VAR_258", "").into();
        assert_eq!(ArgCount::of(&bare).total(), 3);
    }

    #[test]
    fn test_layout_for_revision() {
        assert_eq!(
            VariadicLayout::for_revision(Revision::V3_4),
            VariadicLayout::KeywordsBeforeStar
        );
        assert_eq!(
            VariadicLayout::for_revision(Revision::V3_5),
            VariadicLayout::StarBeforeKeywords
        );
    }

    #[test]
    fn test_split_pre35_layout() {
        let tree = call(vec![
            name("f"),
            name("a"),
            kwarg("k", name("v")),
            name("rest"),
            name("kw"),
            opcode("CALL_FUNCTION_VAR_KW_257", argc(1, 1)),
        ]);
        let args = split_call(&tree, CallVariant::VarKeyword, VariadicLayout::KeywordsBeforeStar)
            .unwrap();
        assert_eq!(args.positional.len(), 1);
        assert_eq!(args.keywords.len(), 1);
        assert!(args.star.is_some());
        assert!(args.double_star.is_some());
    }

    #[test]
    fn test_split_rejects_bad_count() {
        let tree = call(vec![name("f"), name("a"), opcode("CALL_FUNCTION_VAR_2", argc(2, 0))]);
        let err = split_call(&tree, CallVariant::Var, VariadicLayout::KeywordsBeforeStar)
            .unwrap_err();
        assert!(matches!(
            err,
            RenderError::ArgCountMismatch {
                expected: 5,
                found: 3,
                ..
            }
        ));
        assert_eq!(err.kind(), "call");
    }

    #[test]
    fn test_split_rejects_non_keyword_slot() {
        let tree = call(vec![
            name("f"),
            name("a"),
            name("rest"),
            opcode("CALL_FUNCTION_VAR_256", argc(0, 1)),
        ]);
        let err = split_call(&tree, CallVariant::Var, VariadicLayout::StarBeforeKeywords)
            .unwrap_err();
        assert!(matches!(err, RenderError::UnexpectedKind { .. }));
    }

    #[test]
    fn test_unknown_variant_is_fatal() {
        let tree = call(vec![name("f"), opcode("CALL_SOMETHING_1", 1)]);
        let err = render(Revision::V3_6, &tree).unwrap_err();
        assert!(matches!(err, RenderError::UnknownCallVariant { .. }));
    }

    #[test]
    fn test_plain_call_with_keywords() {
        let tree = call(vec![
            name("f"),
            name("a"),
            kwarg("k", name("v")),
            opcode("CALL_FUNCTION_257", argc(1, 1)),
        ]);
        assert_eq!(render_ok(Revision::V3_4, &tree), "f(a, k=v)");
    }

    #[test]
    fn test_no_argument_call() {
        let tree = call(vec![name("f"), opcode("CALL_FUNCTION_0", 0)]);
        assert_eq!(render_ok(Revision::V2_7, &tree), "f()");
        assert_eq!(render_ok(Revision::V3_6, &tree), "f()");
    }

    #[test]
    fn test_keyword_only_var_call_pre35() {
        let tree = call(vec![
            name("f"),
            kwarg("k", name("v")),
            name("rest"),
            opcode("CALL_FUNCTION_VAR_256", argc(0, 1)),
        ]);
        assert_eq!(render_ok(Revision::V3_3, &tree), "f(*rest, k=v)");
    }

    #[test]
    fn test_var_keyword_pre35_falls_through_to_template() {
        let tree = call(vec![
            name("f"),
            name("a"),
            kwarg("k", name("v")),
            name("rest"),
            name("kw"),
            opcode("CALL_FUNCTION_VAR_KW_257", argc(1, 1)),
        ]);
        assert_eq!(render_ok(Revision::V3_4, &tree), "f(a, k=v, *rest, **kw)");
    }

    #[test]
    fn test_var_keyword_35_swaps() {
        let tree = call(vec![
            name("f"),
            name("a"),
            name("rest"),
            kwarg("k", name("v")),
            name("kw"),
            opcode("CALL_FUNCTION_VAR_KW_257", argc(1, 1)),
        ]);
        assert_eq!(render_ok(Revision::V3_5, &tree), "f(a, *rest, k=v, **kw)");
    }

    #[test]
    fn test_star_operand_list_unpack() {
        let unpack = crate::test_helpers::node(
            "build_list_unpack",
            vec![name("xs"), name("ys"), opcode("BUILD_LIST_UNPACK_2", 2)],
        );
        let tree = call(vec![
            name("f"),
            crate::test_helpers::node("expr", vec![unpack]),
            opcode("CALL_FUNCTION_VAR_0", 0),
        ]);
        assert_eq!(render_ok(Revision::V3_5, &tree), "f(*xs, *ys)");
    }

    #[test]
    fn test_keyword_call_36_uses_names_tuple() {
        let tree = call(vec![
            name("f"),
            name("a"),
            name("one"),
            name("two"),
            crate::test_helpers::names_const(&["x", "y"]),
            opcode("CALL_FUNCTION_KW_3", 3),
        ]);
        assert_eq!(render_ok(Revision::V3_6, &tree), "f(a, x=one, y=two)");
    }

    #[test]
    fn test_keyword_call_36_checks_count() {
        let tree = call(vec![
            name("f"),
            name("one"),
            crate::test_helpers::names_const(&["x"]),
            opcode("CALL_FUNCTION_KW_4", 4),
        ]);
        let err = render(Revision::V3_6, &tree).unwrap_err();
        assert!(matches!(err, RenderError::ArgCountMismatch { .. }));
    }

    #[test]
    fn test_async_call() {
        let tree = crate::test_helpers::node(
            "async_call",
            vec![
                name("fetch"),
                name("url"),
                opcode("CALL_FUNCTION_1", 1),
                opcode("GET_AWAITABLE", 0),
                opcode("LOAD_CONST", 0),
                opcode("YIELD_FROM", 0),
            ],
        );
        assert_eq!(render_ok(Revision::V3_5, &tree), "async fetch(url)");
    }

    #[test]
    fn test_ex_call_with_merge_positional() {
        let merge = crate::test_helpers::node(
            "build_tuple_unpack_with_call",
            vec![
                crate::test_helpers::tuple(vec![name("a")]),
                name("rest"),
                opcode("BUILD_TUPLE_UNPACK_WITH_CALL_2", 2),
            ],
        );
        let tree = call(vec![name("f"), merge, opcode("CALL_FUNCTION_EX", 0)]);
        assert_eq!(render_ok(Revision::V3_6, &tree), "f(a, *rest)");
    }

    #[test]
    fn test_ex_call_spread_uses_template() {
        let tree = call(vec![name("f"), name("args"), opcode("CALL_FUNCTION_EX", 0)]);
        assert_eq!(render_ok(Revision::V3_6, &tree), "f(*args)");
        let tree = call(vec![
            name("f"),
            name("args"),
            name("kw"),
            opcode("CALL_FUNCTION_EX_KW", 1),
        ]);
        assert_eq!(render_ok(Revision::V3_6, &tree), "f(*args, **kw)");
    }

    #[test]
    fn test_ex_keyword_call_without_positionals() {
        use crate::test_helpers::{names_const, node};

        let empty = || node("expr", vec![names_const(&[])]);
        let merge = node(
            "build_map_unpack_with_call",
            vec![name("kw"), name("kw2"), opcode("BUILD_MAP_UNPACK_WITH_CALL_2", 2)],
        );
        let tree = node(
            "call_ex_kw",
            vec![name("f"), empty(), merge, opcode("CALL_FUNCTION_EX_KW", 1)],
        );
        assert_eq!(render_ok(Revision::V3_6, &tree), "f(**kw, **kw2)");

        let tree = call(vec![
            name("f"),
            tugdecomp_core::Token::new("LOAD_CONST", "()").into(),
            name("kw"),
            opcode("CALL_FUNCTION_EX_KW", 1),
        ]);
        assert_eq!(render_ok(Revision::V3_6, &tree), "f(**kw)");
        let tree = call(vec![name("f"), empty(), opcode("CALL_FUNCTION_EX", 0)]);
        assert_eq!(render_ok(Revision::V3_7, &tree), "f()");
    }

    #[test]
    fn test_keyword_group_breaks_onto_new_line() {
        use crate::test_helpers::{dict_const_keys, name_at, node, tuple};

        let tree = node(
            "call_ex_kw",
            vec![
                name_at("f", 1),
                tuple(vec![name_at("a", 1)]),
                dict_const_keys(&[("x", name_at("one", 2))]),
                opcode("CALL_FUNCTION_EX_KW", 1),
            ],
        );
        assert_eq!(render_ok(Revision::V3_6, &tree), "f(a,\n    x=one)");
    }

    #[test]
    fn test_ex_keyword_call_with_literal_pairs() {
        let tree = call(vec![
            name("f"),
            crate::test_helpers::tuple(vec![name("a")]),
            crate::test_helpers::dict_const_keys(&[("x", crate::test_helpers::constant("1"))]),
            opcode("CALL_FUNCTION_EX_KW", 1),
        ]);
        assert_eq!(render_ok(Revision::V3_6, &tree), "f(a, x=1)");
    }
}
