//! Covering edges between universe indices.

use serde::{Deserialize, Serialize};

/// `parent` is covered by `child`: parent < child with nothing in between.
///
/// Ordered by (parent, child), which is also the order edges are emitted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Edge {
    pub parent: usize,
    pub child: usize,
}

impl Edge {
    pub fn new(parent: usize, child: usize) -> Self {
        Self { parent, child }
    }
}

impl From<(usize, usize)> for Edge {
    fn from((parent, child): (usize, usize)) -> Self {
        Self::new(parent, child)
    }
}

impl std::fmt::Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.parent, self.child)
    }
}
