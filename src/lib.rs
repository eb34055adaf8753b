//! # hasse_align
//!
//! Hasse diagrams of finite partial orders, with global sequence alignment
//! on the edges when the elements are biological sequences.
//!
//! A universe of values is ordered by a pairwise rule, the relation is
//! closed transitively and cut back to its covering edges, and the edges are
//! leveled by longest path for layout and extremal statistics. For sequence
//! universes each covering edge can carry its Needleman-Wunsch alignment.
//!
//! ```
//! use hasse_align::{Poset, Rule, Universe};
//!
//! let u = Universe::from_values([2i64, 4, 8, 3]).unwrap();
//! let p = Poset::from_rule(u, &Rule::Divides).unwrap();
//! assert_eq!(p.edges().len(), 2);
//! assert_eq!(p.levels().height(), 3);
//! ```
pub mod align;
pub mod bio;
pub mod closure;
pub mod config;
pub mod edge;
pub mod element;
pub mod error;
pub mod levels;
pub mod poset;
pub mod report;
pub mod rules;
pub mod scoring;

pub use align::{Aligner, Alignment, DpMatrix};
pub use bio::{annotate_edges, validate_sequences, EdgeAlignment};
pub use closure::{build_covering_edges, explicit_edges, Relation};
pub use edge::Edge;
pub use element::{ElementKind, ElementValue, IntSet, Universe};
pub use error::{HasseError, Result};
pub use levels::Levels;
pub use poset::Poset;
pub use report::{to_dot, Dot, Summary};
pub use rules::{Comparator, Comparison, CustomRule, Rule};
pub use scoring::{ScoreTable, BLOSUM62_GAP};
