// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Render templates: a format skeleton plus the child selectors it consumes.
//!
//! # Directives
//!
//! | Directive | Meaning |
//! |-----------|---------|
//! | `%c`, `%p` | render one child (next selector must be [`Selector::Child`]) |
//! | `%C`, `%P` | render a slice of children (next selector must be [`Selector::Range`]) |
//! | `%\|` | write current indentation |
//! | `%+`, `%-` | indent more / less |
//! | `%{name}` | attribute of this node |
//! | `%[i]{name}` | attribute of child `i` |
//! | `%%` | literal `%` |
//!
//! The lowercase/uppercase `p` spellings are kept for readability of the rule
//! tables (`p` marks a selector that carries a precedence bound); both spellings
//! parse to the same [`Segment`]. Anything else after `%` is literal text.

use std::fmt;

/// One parsed piece of a format string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Indent,
    IndentMore,
    IndentLess,
    Child,
    Range,
    Attr { child: Option<isize>, name: String },
}

/// Which children a child directive consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    /// One child, optionally asserted to be of a kind, optionally rendered
    /// under a precedence bound.
    Child {
        index: isize,
        expect: Option<&'static str>,
        prec: Option<u32>,
    },
    /// Python-style slice `[start:end]` joined by `sep`.
    Range {
        start: isize,
        end: isize,
        sep: &'static str,
        prec: Option<u32>,
    },
}

impl Selector {
    pub fn at(index: isize) -> Self {
        Selector::Child {
            index,
            expect: None,
            prec: None,
        }
    }

    pub fn range(start: isize, end: isize, sep: &'static str) -> Self {
        Selector::Range {
            start,
            end,
            sep,
            prec: None,
        }
    }

    /// Require the selected child to have kind `kind`. No effect on ranges.
    #[must_use]
    pub fn expecting(self, kind: &'static str) -> Self {
        match self {
            Selector::Child { index, prec, .. } => Selector::Child {
                index,
                expect: Some(kind),
                prec,
            },
            range => range,
        }
    }

    #[must_use]
    pub fn with_prec(self, value: u32) -> Self {
        match self {
            Selector::Child { index, expect, .. } => Selector::Child {
                index,
                expect,
                prec: Some(value),
            },
            Selector::Range { start, end, sep, .. } => Selector::Range {
                start,
                end,
                sep,
                prec: Some(value),
            },
        }
    }

    fn matches(&self, segment: &Segment) -> bool {
        matches!(
            (self, segment),
            (Selector::Child { .. }, Segment::Child) | (Selector::Range { .. }, Segment::Range)
        )
    }
}

/// An immutable render template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    format: String,
    segments: Vec<Segment>,
    selectors: Vec<Selector>,
}

impl Template {
    pub fn new(format: impl Into<String>, selectors: Vec<Selector>) -> Self {
        let format = format.into();
        let segments = parse_format(&format);
        Self {
            format,
            segments,
            selectors,
        }
    }

    /// A template with no child directives.
    pub fn text(format: impl Into<String>) -> Self {
        Self::new(format, Vec::new())
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn selectors(&self) -> &[Selector] {
        &self.selectors
    }

    /// Number of child directives in the format string.
    pub fn arity(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Child | Segment::Range))
            .count()
    }

    /// Returns whether every child directive has a selector of the right shape.
    pub fn is_consistent(&self) -> bool {
        let directives = self
            .segments
            .iter()
            .filter(|s| matches!(s, Segment::Child | Segment::Range));
        directives.clone().count() == self.selectors.len()
            && directives
                .zip(&self.selectors)
                .all(|(segment, selector)| selector.matches(segment))
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format)
    }
}

fn parse_format(format: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut text = String::new();
    let mut rest = format;

    while let Some(pos) = rest.find('%') {
        text.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let (segment, consumed) = match after.chars().next() {
            Some('c') | Some('p') => (Some(Segment::Child), 1),
            Some('C') | Some('P') => (Some(Segment::Range), 1),
            Some('|') => (Some(Segment::Indent), 1),
            Some('+') => (Some(Segment::IndentMore), 1),
            Some('-') => (Some(Segment::IndentLess), 1),
            Some('%') => {
                text.push('%');
                (None, 1)
            }
            Some('{') => match after[1..].find('}') {
                Some(end) => (
                    Some(Segment::Attr {
                        child: None,
                        name: after[1..1 + end].to_string(),
                    }),
                    end + 2,
                ),
                None => {
                    text.push('%');
                    (None, 0)
                }
            },
            Some('[') => match parse_child_attr(after) {
                Some((child, name, consumed)) => (
                    Some(Segment::Attr {
                        child: Some(child),
                        name,
                    }),
                    consumed,
                ),
                None => {
                    text.push('%');
                    (None, 0)
                }
            },
            _ => {
                text.push('%');
                (None, 0)
            }
        };
        if let Some(segment) = segment {
            if !text.is_empty() {
                segments.push(Segment::Text(std::mem::take(&mut text)));
            }
            segments.push(segment);
        }
        rest = &after[consumed..];
    }
    text.push_str(rest);
    if !text.is_empty() {
        segments.push(Segment::Text(text));
    }
    segments
}

/// Parse `[i]{name}` at the start of `s`, returning the index, the name, and
/// the number of bytes consumed.
fn parse_child_attr(s: &str) -> Option<(isize, String, usize)> {
    let close = s.find(']')?;
    let index = s[1..close].trim().parse::<isize>().ok()?;
    let tail = &s[close + 1..];
    if !tail.starts_with('{') {
        return None;
    }
    let end = tail.find('}')?;
    Some((index, tail[1..end].to_string(), close + 1 + end + 1))
}
