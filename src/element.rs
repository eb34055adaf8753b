//! Element values and the deduplicated universe they live in.

use std::fmt;

use ordermap::OrderMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{HasseError, Result};

/// Which variant a value (or a rule, or a universe) is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Integer,
    Text,
    IntegerSet,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => write!(f, "integer"),
            Self::Text => write!(f, "text"),
            Self::IntegerSet => write!(f, "integer set"),
        }
    }
}

/// A set of integers kept sorted and without duplicates, so that equality
/// and containment can be decided by a linear merge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
pub struct IntSet(Vec<i64>);

impl IntSet {
    pub fn as_slice(&self) -> &[i64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Two-pointer containment test over the canonical form.
    pub fn is_subset(&self, other: &IntSet) -> bool {
        let (a, b) = (&self.0, &other.0);
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            if a[i] == b[j] {
                i += 1;
                j += 1;
            } else if a[i] > b[j] {
                j += 1;
            } else {
                return false;
            }
        }
        i == a.len()
    }
}

impl FromIterator<i64> for IntSet {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        let mut v: Vec<i64> = iter.into_iter().collect();
        v.sort_unstable();
        v.dedup();
        IntSet(v)
    }
}

impl From<Vec<i64>> for IntSet {
    fn from(v: Vec<i64>) -> Self {
        v.into_iter().collect()
    }
}

impl fmt::Display for IntSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, x) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{x}")?;
        }
        write!(f, "]")
    }
}

/// One member of the universe being ordered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum ElementValue {
    Integer(i64),
    Text(String),
    IntegerSet(IntSet),
}

impl ElementValue {
    pub fn integer_set<I: IntoIterator<Item = i64>>(items: I) -> Self {
        Self::IntegerSet(items.into_iter().collect())
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Integer(_) => ElementKind::Integer,
            Self::Text(_) => ElementKind::Text,
            Self::IntegerSet(_) => ElementKind::IntegerSet,
        }
    }

    fn mismatch(&self, expected: ElementKind) -> HasseError {
        HasseError::TypeMismatch {
            expected,
            found: self.kind(),
        }
    }

    pub fn as_integer(&self) -> Result<i64> {
        match self {
            Self::Integer(v) => Ok(*v),
            other => Err(other.mismatch(ElementKind::Integer)),
        }
    }

    pub fn as_text(&self) -> Result<&str> {
        match self {
            Self::Text(s) => Ok(s),
            other => Err(other.mismatch(ElementKind::Text)),
        }
    }

    pub fn as_integer_set(&self) -> Result<&IntSet> {
        match self {
            Self::IntegerSet(s) => Ok(s),
            other => Err(other.mismatch(ElementKind::IntegerSet)),
        }
    }

    /// Read one element from a line of raw input.
    ///
    /// The line is trimmed first; blank lines are rejected. Integer sets are
    /// whitespace-separated and must hold at least one number.
    pub fn parse(kind: ElementKind, line: &str) -> Result<Self> {
        let line = line.trim();
        if line.is_empty() {
            return Err(HasseError::EmptyInput("element line"));
        }
        let invalid = || HasseError::InvalidElement {
            kind,
            input: line.to_string(),
        };
        match kind {
            ElementKind::Integer => line.parse().map(Self::Integer).map_err(|_| invalid()),
            ElementKind::Text => Ok(Self::Text(line.to_string())),
            ElementKind::IntegerSet => {
                let nums = line
                    .split_whitespace()
                    .map(str::parse)
                    .collect::<std::result::Result<Vec<i64>, _>>()
                    .map_err(|_| invalid())?;
                if nums.is_empty() {
                    return Err(invalid());
                }
                Ok(Self::integer_set(nums))
            }
        }
    }
}

impl fmt::Display for ElementValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
            Self::IntegerSet(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for ElementValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<&str> for ElementValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ElementValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<IntSet> for ElementValue {
    fn from(s: IntSet) -> Self {
        Self::IntegerSet(s)
    }
}

/// Index-addressed, duplicate-free sequence of values of one kind.
///
/// The position of a value is its identity in relation matrices and edges.
#[derive(Debug, Clone, Default)]
pub struct Universe {
    /// Stable order of first appearance: value -> idx
    idx: OrderMap<ElementValue, usize>,
    /// Reverse index: idx -> value
    values: Vec<ElementValue>,
    kind: Option<ElementKind>,
    removed: usize,
}

impl Universe {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty universe that only accepts values of `kind`.
    pub fn with_kind(kind: ElementKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    /// Collect values, keeping the first occurrence of each and counting the rest.
    pub fn from_values<I>(values: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<ElementValue>,
    {
        let mut u = Self::new();
        for v in values {
            u.push(v.into())?;
        }
        if u.removed > 0 {
            debug!(removed = u.removed, kept = u.len(), "dropped duplicate elements");
        }
        Ok(u)
    }

    /// Read one element per line until the first blank line.
    pub fn parse_lines(kind: ElementKind, text: &str) -> Result<Self> {
        let mut u = Self::with_kind(kind);
        for line in text.lines() {
            if line.trim().is_empty() {
                break;
            }
            u.push(ElementValue::parse(kind, line)?)?;
        }
        if u.is_empty() {
            return Err(HasseError::EmptyInput("no elements were provided"));
        }
        Ok(u)
    }

    /// Add a value, returning its index. A duplicate is not stored again: it
    /// resolves to the first occurrence and counts as removed.
    pub fn push(&mut self, value: ElementValue) -> Result<usize> {
        match self.kind {
            Some(kind) if kind != value.kind() => {
                return Err(HasseError::TypeMismatch {
                    expected: kind,
                    found: value.kind(),
                })
            }
            Some(_) => {}
            None => self.kind = Some(value.kind()),
        }
        if let Some(&i) = self.idx.get(&value) {
            self.removed += 1;
            return Ok(i);
        }
        let i = self.values.len();
        self.idx.insert(value.clone(), i);
        self.values.push(value);
        Ok(i)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Kind shared by every element, if one has been fixed.
    pub fn kind(&self) -> Option<ElementKind> {
        self.kind
    }

    /// How many duplicates were discarded while building.
    pub fn removed_duplicates(&self) -> usize {
        self.removed
    }

    pub fn get(&self, i: usize) -> Option<&ElementValue> {
        self.values.get(i)
    }

    pub fn index_of(&self, value: &ElementValue) -> Option<usize> {
        self.idx.get(value).copied()
    }

    pub fn values(&self) -> &[ElementValue] {
        &self.values
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ElementValue> {
        self.values.iter()
    }
}

impl std::ops::Index<usize> for Universe {
    type Output = ElementValue;

    fn index(&self, i: usize) -> &ElementValue {
        &self.values[i]
    }
}

impl<'a> IntoIterator for &'a Universe {
    type Item = &'a ElementValue;
    type IntoIter = std::slice::Iter<'a, ElementValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
