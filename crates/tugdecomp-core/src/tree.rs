//! Parse tree model.
//!
//! Trees are produced by the grammar/parser collaborator from a disassembled
//! instruction stream and are only read by the semantic-action layer. A
//! [`Tree`] is either an interior [`Node`] that exclusively owns its ordered
//! children, or a leaf [`Token`] carrying an instruction payload.
//!
//! ## JSON Shape
//!
//! Trees round-trip through serde so fixtures and the CLI can feed them in:
//!
//! ```text
//! {"kind": "call", "children": [
//!     {"kind": "expr", "children": [{"kind": "LOAD_NAME", "pattr": "f"}]},
//!     {"kind": "CALL_FUNCTION_0", "attr": {"int": 0}}
//! ]}
//! ```
//!
//! A value with a `children` array is a node; anything else is a token.

use serde::{Deserialize, Serialize};

use crate::error::RenderError;

/// Code-object flag: the function is a native coroutine (`async def`).
pub const CO_COROUTINE: u32 = 0x0080;
/// Code-object flag: generator-based coroutine (`types.coroutine`).
pub const CO_ITERABLE_COROUTINE: u32 = 0x0100;
/// Code-object flag: asynchronous generator (`async def` containing `yield`).
pub const CO_ASYNC_GENERATOR: u32 = 0x0200;

/// Wrapper kinds that pass a single child through unchanged.
pub const TRIVIAL_WRAPPERS: &[&str] = &["expr", "pos_arg"];

// ============================================================================
// Tree
// ============================================================================

/// A parse tree: interior node or leaf token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Tree {
    Node(Node),
    Token(Token),
}

/// An interior node of the parse tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Node {
    /// Grammar nonterminal, e.g. `call`, `tuple`, `kwarg`.
    pub kind: String,
    /// Ordered children.
    pub children: Vec<Tree>,
    /// Source line, when the parser recorded one on the node itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

/// A leaf token: one disassembled instruction.
///
/// Unknown fields are rejected so a node with a malformed descendant cannot
/// fall back to being read as a token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Token {
    /// Opcode name, possibly with an argument suffix (`CALL_FUNCTION_VAR_2`).
    pub kind: String,
    /// Raw payload (constant, packed argument count, code object).
    #[serde(default, skip_serializing_if = "Attr::is_none")]
    pub attr: Attr,
    /// Display string for the payload.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pattr: String,
    /// Source line the instruction belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

/// Raw payload carried on a token.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attr {
    #[default]
    None,
    /// Integer operand: packed argument counts, flag words, small constants.
    Int(i64),
    /// String constant.
    Str(String),
    /// Tuple of identifiers (keyword names, constant-map keys, annotation names).
    Names(Vec<String>),
    /// Code object reference.
    Code(Box<CodeObject>),
}

/// The parts of a code object the semantic actions need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeObject {
    /// `co_name`.
    pub name: String,
    /// `co_flags`.
    #[serde(default)]
    pub flags: u32,
    /// Positional parameter names, in order.
    #[serde(default)]
    pub params: Vec<String>,
    /// Already-parsed body of the function, if the caller decompiled it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Tree>,
}

impl CodeObject {
    /// Create a code object with no flags, parameters, or body.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            flags: 0,
            params: Vec::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn with_flags(mut self, flags: u32) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub fn with_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params = params.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Tree>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Returns whether the function must be written as `async def`.
    pub fn is_coroutine(&self) -> bool {
        self.flags & (CO_COROUTINE | CO_ASYNC_GENERATOR) != 0
    }
}

impl Attr {
    pub fn is_none(&self) -> bool {
        matches!(self, Attr::None)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Attr::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Attr::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_names(&self) -> Option<&[String]> {
        match self {
            Attr::Names(names) => Some(names),
            _ => None,
        }
    }

    pub fn as_code(&self) -> Option<&CodeObject> {
        match self {
            Attr::Code(code) => Some(code),
            _ => None,
        }
    }

    /// Text used when a template asks for `%{attr}`.
    pub fn display(&self) -> String {
        match self {
            Attr::None => String::new(),
            Attr::Int(n) => n.to_string(),
            Attr::Str(s) => s.clone(),
            Attr::Names(names) => names.join(", "),
            Attr::Code(code) => code.name.clone(),
        }
    }
}

// ============================================================================
// Construction
// ============================================================================

impl Node {
    pub fn new(kind: impl Into<String>, children: Vec<Tree>) -> Self {
        Self {
            kind: kind.into(),
            children,
            line: None,
        }
    }

    #[must_use]
    pub fn at_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }
}

impl Token {
    pub fn new(kind: impl Into<String>, pattr: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            attr: Attr::None,
            pattr: pattr.into(),
            line: None,
        }
    }

    #[must_use]
    pub fn with_attr(mut self, attr: Attr) -> Self {
        self.attr = attr;
        self
    }

    #[must_use]
    pub fn at_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }
}

impl From<Node> for Tree {
    fn from(node: Node) -> Self {
        Tree::Node(node)
    }
}

impl From<Token> for Tree {
    fn from(token: Token) -> Self {
        Tree::Token(token)
    }
}

// ============================================================================
// Queries
// ============================================================================

impl Tree {
    /// Grammar kind or opcode name.
    pub fn kind(&self) -> &str {
        match self {
            Tree::Node(n) => &n.kind,
            Tree::Token(t) => &t.kind,
        }
    }

    /// Tag comparison against a kind literal.
    pub fn is(&self, kind: &str) -> bool {
        self.kind() == kind
    }

    /// Prefix comparison, used for opcode families such as `BUILD_TUPLE_3`.
    pub fn kind_starts_with(&self, prefix: &str) -> bool {
        self.kind().starts_with(prefix)
    }

    pub fn is_token(&self) -> bool {
        matches!(self, Tree::Token(_))
    }

    pub fn as_token(&self) -> Option<&Token> {
        match self {
            Tree::Token(t) => Some(t),
            Tree::Node(_) => None,
        }
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Tree::Node(n) => Some(n),
            Tree::Token(_) => None,
        }
    }

    /// Children of a node; tokens have none.
    pub fn children(&self) -> &[Tree] {
        match self {
            Tree::Node(n) => &n.children,
            Tree::Token(_) => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.children().len()
    }

    pub fn is_empty(&self) -> bool {
        self.children().is_empty()
    }

    /// Token payload; nodes carry none.
    pub fn attr(&self) -> &Attr {
        static NONE: Attr = Attr::None;
        match self {
            Tree::Token(t) => &t.attr,
            Tree::Node(_) => &NONE,
        }
    }

    /// Token display string; nodes carry none.
    pub fn pattr(&self) -> Option<&str> {
        self.as_token().map(|t| t.pattr.as_str())
    }

    /// Source line: the recorded one, else the first found depth-first.
    pub fn line(&self) -> Option<u32> {
        match self {
            Tree::Token(t) => t.line,
            Tree::Node(n) => n.line.or_else(|| n.children.iter().find_map(Tree::line)),
        }
    }

    /// Child at a Python-style index (negative counts from the end).
    pub fn get(&self, index: isize) -> Option<&Tree> {
        let children = self.children();
        let resolved = if index < 0 {
            children.len().checked_sub(index.unsigned_abs())?
        } else {
            index as usize
        };
        children.get(resolved)
    }

    /// Like [`Tree::get`], but a missing child is an internal-consistency fault.
    pub fn child(&self, index: isize) -> Result<&Tree, RenderError> {
        self.get(index)
            .ok_or_else(|| RenderError::missing_child(self, index))
    }

    /// Children in the Python-style slice `[start:end]`, clamped to bounds.
    pub fn slice(&self, start: isize, end: isize) -> &[Tree] {
        let children = self.children();
        let (lo, hi) = slice_bounds(children.len(), start, end);
        &children[lo..hi]
    }

    /// Strip single-child pass-through wrappers (`expr`, `pos_arg`).
    ///
    /// Every reconstructor goes through this one function so that wrapper
    /// handling cannot diverge between them.
    pub fn unwrap_trivial(&self) -> &Tree {
        let mut current = self;
        while let Tree::Node(node) = current {
            if node.children.len() != 1 || !TRIVIAL_WRAPPERS.contains(&node.kind.as_str()) {
                break;
            }
            current = &node.children[0];
        }
        current
    }

    /// Returns whether this tree is `kind` once trivial wrappers are removed.
    pub fn reduces_to(&self, kind: &str) -> bool {
        self.unwrap_trivial().is(kind)
    }
}

/// Resolve Python slice bounds against a sequence of length `len`.
pub fn slice_bounds(len: usize, start: isize, end: isize) -> (usize, usize) {
    let resolve = |i: isize| -> usize {
        if i < 0 {
            len.saturating_sub(i.unsigned_abs())
        } else {
            (i as usize).min(len)
        }
    };
    let lo = resolve(start);
    let hi = resolve(end).max(lo);
    (lo, hi)
}
