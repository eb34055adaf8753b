//! Error taxonomy shared by every operation in the crate.

use crate::element::ElementKind;

/// Deterministic input-validity failures. Nothing here is transient, so
/// callers match on the variant instead of retrying.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HasseError {
    /// A value of the wrong kind reached a comparator or a uniform universe.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: ElementKind,
        found: ElementKind,
    },

    /// A sequence contains a character the score table does not know.
    #[error("unsupported symbol {symbol:?} at position {position} of {sequence:?}")]
    UnsupportedSymbol {
        symbol: char,
        position: usize,
        sequence: String,
    },

    /// An operation that needs at least one item got none.
    #[error("empty input: {0}")]
    EmptyInput(&'static str),

    /// An externally supplied edge does not refer to two distinct elements.
    #[error("malformed explicit edge {parent} -> {child}: {reason}")]
    MalformedExplicitEdge {
        parent: String,
        child: String,
        reason: &'static str,
    },

    /// Raw text that cannot be read as an element of the requested kind.
    #[error("cannot read {input:?} as {kind}")]
    InvalidElement { kind: ElementKind, input: String },

    #[error("invalid score table: {0}")]
    InvalidScoreTable(String),

    /// A score matrix cell does not fit in an `i32` for these lengths.
    #[error("alignment score overflows for sequences of length {a_len} and {b_len}")]
    ScoreOverflow { a_len: usize, b_len: usize },

    /// Leveling met edges that loop back; only reachable with explicit edges.
    #[error("edges contain a cycle through element {0}")]
    Cycle(usize),
}

pub type Result<T> = std::result::Result<T, HasseError>;
