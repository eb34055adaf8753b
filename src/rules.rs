//! Ordering rules: pairwise comparison of two values of the same kind.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::element::{ElementKind, ElementValue};
use crate::error::{HasseError, Result};

/// Outcome of comparing `a` against `b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparison {
    Less,
    Greater,
    Equal,
    Incomparable,
}

impl Comparison {
    /// The outcome of the same comparison with the operands swapped.
    pub fn reverse(self) -> Self {
        match self {
            Self::Less => Self::Greater,
            Self::Greater => Self::Less,
            other => other,
        }
    }
}

/// A pairwise comparison rule over one element kind.
pub trait Comparator {
    fn kind(&self) -> ElementKind;

    /// Compare two values. Both must be of [`Comparator::kind`].
    fn compare(&self, a: &ElementValue, b: &ElementValue) -> Result<Comparison>;
}

/// The built-in rule families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// Text: `a` is a prefix of `b`.
    Prefix,
    /// Text: lexicographic, total.
    Lex,
    /// Text: `a` can be read off `b` left to right, skipping characters.
    Subsequence,
    /// Integer: `a` divides `b`; zero divides only zero.
    Divides,
    /// Integer: numeric, total.
    Leq,
    /// Integer set: containment.
    Subset,
    /// Integer set: cardinality; distinct sets of equal size are incomparable.
    Size,
}

impl Rule {
    pub const ALL: [Rule; 7] = [
        Rule::Prefix,
        Rule::Lex,
        Rule::Subsequence,
        Rule::Divides,
        Rule::Leq,
        Rule::Subset,
        Rule::Size,
    ];

    pub fn kind(self) -> ElementKind {
        match self {
            Rule::Prefix | Rule::Lex | Rule::Subsequence => ElementKind::Text,
            Rule::Divides | Rule::Leq => ElementKind::Integer,
            Rule::Subset | Rule::Size => ElementKind::IntegerSet,
        }
    }

    /// Rules applicable to values of `kind`.
    pub fn for_kind(kind: ElementKind) -> impl Iterator<Item = Rule> {
        Self::ALL.into_iter().filter(move |r| r.kind() == kind)
    }

    fn name(self) -> &'static str {
        match self {
            Rule::Prefix => "prefix",
            Rule::Lex => "lex",
            Rule::Subsequence => "subsequence",
            Rule::Divides => "divides",
            Rule::Leq => "leq",
            Rule::Subset => "subset",
            Rule::Size => "size",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Rule {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|r| r.name() == s)
            .ok_or_else(|| format!("unknown rule {s:?}"))
    }
}

fn ensure_kind(expected: ElementKind, v: &ElementValue) -> Result<()> {
    if v.kind() == expected {
        Ok(())
    } else {
        Err(HasseError::TypeMismatch {
            expected,
            found: v.kind(),
        })
    }
}

impl Comparator for Rule {
    fn kind(&self) -> ElementKind {
        Rule::kind(*self)
    }

    fn compare(&self, a: &ElementValue, b: &ElementValue) -> Result<Comparison> {
        ensure_kind(Rule::kind(*self), a)?;
        ensure_kind(Rule::kind(*self), b)?;
        Ok(match self {
            Rule::Prefix => compare_prefix(a.as_text()?, b.as_text()?),
            Rule::Lex => compare_lex(a.as_text()?, b.as_text()?),
            Rule::Subsequence => compare_subsequence(a.as_text()?, b.as_text()?),
            Rule::Divides => compare_divides(a.as_integer()?, b.as_integer()?),
            Rule::Leq => compare_leq(a.as_integer()?, b.as_integer()?),
            Rule::Subset => {
                let (x, y) = (a.as_integer_set()?, b.as_integer_set()?);
                if x == y {
                    Comparison::Equal
                } else if x.is_subset(y) {
                    Comparison::Less
                } else if y.is_subset(x) {
                    Comparison::Greater
                } else {
                    Comparison::Incomparable
                }
            }
            Rule::Size => {
                let (x, y) = (a.as_integer_set()?, b.as_integer_set()?);
                if x == y {
                    Comparison::Equal
                } else {
                    by_total(x.len().cmp(&y.len()), Comparison::Incomparable)
                }
            }
        })
    }
}

/// Maps a total ordering onto a comparison, with `tie` for equal keys.
fn by_total(ord: std::cmp::Ordering, tie: Comparison) -> Comparison {
    match ord {
        std::cmp::Ordering::Less => Comparison::Less,
        std::cmp::Ordering::Greater => Comparison::Greater,
        std::cmp::Ordering::Equal => tie,
    }
}

/// Symmetric wrapper around a one-directional "`x` is below `y`" test.
fn from_below(a_below_b: bool, b_below_a: bool) -> Comparison {
    if a_below_b {
        Comparison::Less
    } else if b_below_a {
        Comparison::Greater
    } else {
        Comparison::Incomparable
    }
}

pub fn compare_prefix(a: &str, b: &str) -> Comparison {
    if a == b {
        return Comparison::Equal;
    }
    from_below(b.starts_with(a), a.starts_with(b))
}

pub fn compare_lex(a: &str, b: &str) -> Comparison {
    by_total(a.cmp(b), Comparison::Equal)
}

pub fn compare_subsequence(a: &str, b: &str) -> Comparison {
    if a == b {
        return Comparison::Equal;
    }
    from_below(is_subsequence(a, b), is_subsequence(b, a))
}

/// Greedy left-to-right scan: each char of `needle` is matched against the
/// next equal char of `haystack`.
pub fn is_subsequence(needle: &str, haystack: &str) -> bool {
    let mut hay = haystack.chars();
    needle.chars().all(|c| hay.any(|h| h == c))
}

pub fn compare_divides(a: i64, b: i64) -> Comparison {
    if a == b {
        return Comparison::Equal;
    }
    from_below(divides(a, b), divides(b, a))
}

pub fn compare_leq(a: i64, b: i64) -> Comparison {
    by_total(a.cmp(&b), Comparison::Equal)
}

/// `a | b`. Zero divides only zero.
pub fn divides(a: i64, b: i64) -> bool {
    if a == 0 {
        return b == 0;
    }
    // wrapping_rem keeps i64::MIN % -1 from overflowing
    b.wrapping_rem(a) == 0
}

/// A comparator backed by a caller-supplied function.
pub struct CustomRule<F> {
    kind: ElementKind,
    f: F,
}

impl<F> CustomRule<F>
where
    F: Fn(&ElementValue, &ElementValue) -> Comparison,
{
    pub fn new(kind: ElementKind, f: F) -> Self {
        Self { kind, f }
    }
}

impl<F> Comparator for CustomRule<F>
where
    F: Fn(&ElementValue, &ElementValue) -> Comparison,
{
    fn kind(&self) -> ElementKind {
        self.kind
    }

    fn compare(&self, a: &ElementValue, b: &ElementValue) -> Result<Comparison> {
        ensure_kind(self.kind, a)?;
        ensure_kind(self.kind, b)?;
        Ok((self.f)(a, b))
    }
}
