//! Longest-path leveling of a covering relation, and the extremal
//! statistics read off it.

use std::collections::{BTreeMap, VecDeque};

use serde::Serialize;
use tracing::debug;

use crate::closure::validate_edges;
use crate::edge::Edge;
use crate::element::Universe;
use crate::error::{HasseError, Result};

/// Layering of the elements by longest path from a source.
///
/// Sources (no incoming edge) sit on level 0, and every edge goes strictly
/// upward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Levels {
    level_of: Vec<usize>,
    layers: BTreeMap<usize, Vec<usize>>,
    minimal: Vec<usize>,
    maximal: Vec<usize>,
}

impl Levels {
    pub fn of(universe: &Universe, edges: &[Edge]) -> Result<Self> {
        Self::from_edges(universe.len(), edges)
    }

    /// Kahn-style propagation over `n` elements.
    ///
    /// Fails with [`HasseError::Cycle`] if the edges are not acyclic, which
    /// can only happen for externally supplied edges.
    pub fn from_edges(n: usize, edges: &[Edge]) -> Result<Self> {
        validate_edges(n, edges)?;

        let mut succ: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut indegree = vec![0usize; n];
        for e in edges {
            succ[e.parent].push(e.child);
            indegree[e.child] += 1;
        }

        let minimal: Vec<usize> = (0..n).filter(|&i| indegree[i] == 0).collect();
        let maximal: Vec<usize> = (0..n).filter(|&i| succ[i].is_empty()).collect();

        let mut level_of = vec![0usize; n];
        let mut queue: VecDeque<usize> = minimal.iter().copied().collect();
        let mut visited = 0;
        while let Some(u) = queue.pop_front() {
            visited += 1;
            for &v in &succ[u] {
                level_of[v] = level_of[v].max(level_of[u] + 1);
                indegree[v] -= 1;
                if indegree[v] == 0 {
                    queue.push_back(v);
                }
            }
        }
        if visited < n {
            if let Some(stuck) = (0..n).find(|&i| indegree[i] > 0) {
                return Err(HasseError::Cycle(stuck));
            }
        }

        let mut layers: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (i, &l) in level_of.iter().enumerate() {
            layers.entry(l).or_default().push(i);
        }

        let levels = Self {
            level_of,
            layers,
            minimal,
            maximal,
        };
        debug!(height = levels.height(), width = levels.width(), "leveled elements");
        Ok(levels)
    }

    /// Level of element `i`. Panics if `i` is out of range.
    pub fn level(&self, i: usize) -> usize {
        self.level_of[i]
    }

    /// Level number -> element indices on it, ascending.
    pub fn layers(&self) -> &BTreeMap<usize, Vec<usize>> {
        &self.layers
    }

    /// Elements with no incoming covering edge (level 0).
    pub fn minimal_elements(&self) -> &[usize] {
        &self.minimal
    }

    /// Elements with no outgoing covering edge: the top level plus every
    /// isolated element.
    pub fn maximal_elements(&self) -> &[usize] {
        &self.maximal
    }

    /// Number of distinct levels.
    pub fn height(&self) -> usize {
        self.layers.len()
    }

    /// Size of the largest level.
    pub fn width(&self) -> usize {
        self.layers.values().map(Vec::len).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edges(pairs: &[(usize, usize)]) -> Vec<Edge> {
        pairs.iter().copied().map(Edge::from).collect()
    }

    #[test]
    fn diamond() {
        // 0 -> {1, 2} -> 3
        let lv = Levels::from_edges(4, &edges(&[(0, 1), (0, 2), (1, 3), (2, 3)])).unwrap();
        assert_eq!(lv.level(0), 0);
        assert_eq!(lv.level(1), 1);
        assert_eq!(lv.level(2), 1);
        assert_eq!(lv.level(3), 2);
        assert_eq!(lv.minimal_elements(), &[0]);
        assert_eq!(lv.maximal_elements(), &[3]);
        assert_eq!(lv.height(), 3);
        assert_eq!(lv.width(), 2);
    }

    #[test]
    fn longest_path_wins() {
        // 0 -> 1 -> 2 -> 3 and a shortcut-looking 0 -> 3 from explicit input
        let lv = Levels::from_edges(4, &edges(&[(0, 3), (0, 1), (1, 2), (2, 3)])).unwrap();
        assert_eq!(lv.level(3), 3);
        assert_eq!(lv.layers()[&3], vec![3]);
    }

    #[test]
    fn isolated_elements_are_minimal_and_maximal() {
        let lv = Levels::from_edges(3, &edges(&[(0, 1)])).unwrap();
        assert_eq!(lv.minimal_elements(), &[0, 2]);
        assert_eq!(lv.maximal_elements(), &[1, 2]);
        assert_eq!(lv.layers()[&0], vec![0, 2]);
    }

    #[test]
    fn empty_has_no_levels() {
        let lv = Levels::from_edges(0, &[]).unwrap();
        assert_eq!(lv.height(), 0);
        assert_eq!(lv.width(), 0);
    }

    #[test]
    fn cycles_are_reported() {
        let err = Levels::from_edges(3, &edges(&[(0, 1), (1, 2), (2, 1)])).unwrap_err();
        assert_eq!(err, HasseError::Cycle(1));
    }
}
