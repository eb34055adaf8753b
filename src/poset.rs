use petgraph::algo::{has_path_connecting, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::info;

use crate::bio::{annotate_edges, EdgeAlignment};
use crate::closure::{build_covering_edges, explicit_edges, reduce_edges};
use crate::edge::Edge;
use crate::element::{ElementValue, Universe};
use crate::error::{HasseError, Result};
use crate::levels::Levels;
use crate::rules::Comparator;
use crate::scoring::ScoreTable;

/// A finite poset as its Hasse diagram: the universe, its covering edges and
/// their leveling.
#[derive(Debug, Clone)]
pub struct Poset {
    universe: Universe,
    /// Covering edges (or explicit pairs), by increasing parent then child
    edges: Vec<Edge>,
    levels: Levels,
    /// Per-edge alignments, once a score table has been applied
    alignments: Option<Vec<EdgeAlignment>>,
}

impl Poset {
    /// Orders `universe` by `cmp` and keeps the covering relation.
    pub fn from_rule<C: Comparator + ?Sized>(universe: Universe, cmp: &C) -> Result<Self> {
        let edges = build_covering_edges(&universe, cmp)?;
        Self::from_edges(universe, edges)
    }

    /// Uses externally supplied pairs instead of a rule.
    ///
    /// With `reduce`, the pairs are first closed and cut back to their
    /// covering relation; otherwise they are taken as the diagram verbatim.
    pub fn from_pairs(
        universe: Universe,
        pairs: &[(ElementValue, ElementValue)],
        reduce: bool,
    ) -> Result<Self> {
        let mut edges = explicit_edges(&universe, pairs)?;
        if reduce {
            edges = reduce_edges(universe.len(), &edges)?;
        }
        Self::from_edges(universe, edges)
    }

    /// Wraps already computed edges; they must be in range and acyclic.
    pub fn from_edges(universe: Universe, edges: Vec<Edge>) -> Result<Self> {
        let levels = Levels::of(&universe, &edges)?;
        info!(
            elements = universe.len(),
            edges = edges.len(),
            height = levels.height(),
            "built hasse diagram"
        );
        Ok(Self {
            universe,
            edges,
            levels,
            alignments: None,
        })
    }

    /// Labels every edge with the global alignment of its endpoints.
    pub fn align_edges(mut self, table: &ScoreTable) -> Result<Self> {
        self.alignments = Some(annotate_edges(&self.universe, &self.edges, table)?);
        Ok(self)
    }

    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn levels(&self) -> &Levels {
        &self.levels
    }

    pub fn alignments(&self) -> Option<&[EdgeAlignment]> {
        self.alignments.as_deref()
    }

    /// Direct successors of `i` in the diagram.
    pub fn successors(&self, i: usize) -> impl Iterator<Item = usize> + '_ {
        self.edges.iter().filter(move |e| e.parent == i).map(|e| e.child)
    }

    /// The diagram as a petgraph graph; node `i` is universe index `i`.
    pub fn graph(&self) -> DiGraph<&ElementValue, ()> {
        let mut g = DiGraph::with_capacity(self.universe.len(), self.edges.len());
        for v in &self.universe {
            g.add_node(v);
        }
        for e in &self.edges {
            g.add_edge(NodeIndex::new(e.parent), NodeIndex::new(e.child), ());
        }
        g
    }

    /// One linear extension: every element appears after all elements below it.
    pub fn topo_one(&self) -> Result<Vec<&ElementValue>> {
        let g = self.graph();
        match toposort(&g, None) {
            Ok(order) => Ok(order.into_iter().map(|ix| g[ix]).collect()),
            Err(cycle) => Err(HasseError::Cycle(cycle.node_id().index())),
        }
    }

    /// Pairs `(i, j)` with `i < j` where neither element is reachable from
    /// the other.
    pub fn incomparable_pairs(&self) -> Vec<(usize, usize)> {
        let g = self.graph();
        let n = self.universe.len();
        let mut amb = Vec::new();
        for i in 0..n {
            for j in (i + 1)..n {
                let (a, b) = (NodeIndex::new(i), NodeIndex::new(j));
                if !has_path_connecting(&g, a, b, None) && !has_path_connecting(&g, b, a, None) {
                    amb.push((i, j));
                }
            }
        }
        amb
    }
}
