//! Order closure: from pairwise comparisons to the covering relation.
//!
//! The relation is kept as a dense `n x n` boolean matrix addressed by
//! universe index. Closure is the cubic reachability pass, which is fine for
//! universes of a few hundred elements.

use ordermap::OrderSet;
use tracing::debug;

use crate::edge::Edge;
use crate::element::{ElementValue, Universe};
use crate::error::{HasseError, Result};
use crate::rules::{Comparator, Comparison};

/// Reflexive `≤` relation over universe indices; `le(i, j)` is "i ≤ j".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    len: usize,
    le: Vec<bool>,
}

impl Relation {
    /// The identity relation on `n` elements.
    pub fn reflexive(n: usize) -> Self {
        let mut le = vec![false; n * n];
        for i in 0..n {
            le[i * n + i] = true;
        }
        Self { len: n, le }
    }

    /// Direct comparisons of every ordered pair, not yet closed.
    ///
    /// `Less` and `Equal` mark `i ≤ j`, `Greater` marks `j ≤ i`. Since both
    /// orders of each pair are visited, `Equal` ends up marked both ways.
    pub fn from_comparator<C: Comparator + ?Sized>(universe: &Universe, cmp: &C) -> Result<Self> {
        let n = universe.len();
        let mut rel = Self::reflexive(n);
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                match cmp.compare(&universe[i], &universe[j])? {
                    Comparison::Less | Comparison::Equal => rel.set(i, j),
                    Comparison::Greater => rel.set(j, i),
                    Comparison::Incomparable => {}
                }
            }
        }
        Ok(rel)
    }

    /// Relation generated by the given edges, not yet closed.
    pub fn from_edges(n: usize, edges: &[Edge]) -> Result<Self> {
        validate_edges(n, edges)?;
        let mut rel = Self::reflexive(n);
        for e in edges {
            rel.set(e.parent, e.child);
        }
        Ok(rel)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// `i ≤ j`. Panics if either index is out of range.
    pub fn le(&self, i: usize, j: usize) -> bool {
        assert!(i < self.len && j < self.len);
        self.le[i * self.len + j]
    }

    fn set(&mut self, i: usize, j: usize) {
        self.le[i * self.len + j] = true;
    }

    /// Both `i ≤ j` and `j ≤ i`.
    pub fn equivalent(&self, i: usize, j: usize) -> bool {
        self.le(i, j) && self.le(j, i)
    }

    /// `i ≤ j` but not `j ≤ i`.
    pub fn strictly_less(&self, i: usize, j: usize) -> bool {
        self.le(i, j) && !self.le(j, i)
    }

    /// Transitive closure in place.
    pub fn close(&mut self) {
        let n = self.len;
        for k in 0..n {
            for i in 0..n {
                if !self.le[i * n + k] {
                    continue;
                }
                for j in 0..n {
                    if self.le[k * n + j] {
                        self.le[i * n + j] = true;
                    }
                }
            }
        }
    }

    pub fn is_reflexive(&self) -> bool {
        (0..self.len).all(|i| self.le(i, i))
    }

    pub fn is_transitive(&self) -> bool {
        let n = self.len;
        (0..n).all(|i| {
            (0..n).all(|j| !self.le(i, j) || (0..n).all(|k| !self.le(j, k) || self.le(i, k)))
        })
    }

    /// Covering pairs of a closed relation, by increasing parent then child.
    ///
    /// `(i, j)` is kept when `i < j` strictly and no `k` sits strictly between
    /// them. Elements equivalent to an endpoint never count as in between.
    pub fn covering_edges(&self) -> Vec<Edge> {
        let n = self.len;
        let mut edges = Vec::with_capacity(n * 2);
        for i in 0..n {
            for j in 0..n {
                if i == j || !self.strictly_less(i, j) {
                    continue;
                }
                let has_middle = (0..n).any(|k| {
                    k != i
                        && k != j
                        && self.le(i, k)
                        && self.le(k, j)
                        && !self.equivalent(k, i)
                        && !self.equivalent(k, j)
                });
                if !has_middle {
                    edges.push(Edge::new(i, j));
                }
            }
        }
        edges
    }
}

/// Covering edges of the order `cmp` induces on `universe`.
///
/// An empty universe yields no edges.
pub fn build_covering_edges<C: Comparator + ?Sized>(
    universe: &Universe,
    cmp: &C,
) -> Result<Vec<Edge>> {
    if let Some(kind) = universe.kind() {
        if kind != cmp.kind() {
            return Err(HasseError::TypeMismatch {
                expected: cmp.kind(),
                found: kind,
            });
        }
    }
    let mut rel = Relation::from_comparator(universe, cmp)?;
    rel.close();
    let edges = rel.covering_edges();
    debug!(elements = universe.len(), edges = edges.len(), "built covering relation");
    Ok(edges)
}

/// Checks that every edge joins two distinct in-range indices.
pub fn validate_edges(n: usize, edges: &[Edge]) -> Result<()> {
    for e in edges {
        let reason = if e.parent >= n || e.child >= n {
            "index out of range"
        } else if e.parent == e.child {
            "element related to itself"
        } else {
            continue;
        };
        return Err(HasseError::MalformedExplicitEdge {
            parent: e.parent.to_string(),
            child: e.child.to_string(),
            reason,
        });
    }
    Ok(())
}

/// Resolves externally supplied value pairs to edges over `universe`.
///
/// Pairs are kept in the order given and are not reduced. A repeated pair
/// keeps only its first occurrence.
pub fn explicit_edges(
    universe: &Universe,
    pairs: &[(ElementValue, ElementValue)],
) -> Result<Vec<Edge>> {
    let mut edges = OrderSet::with_capacity(pairs.len());
    for (a, b) in pairs {
        let malformed = |reason| HasseError::MalformedExplicitEdge {
            parent: a.to_string(),
            child: b.to_string(),
            reason,
        };
        let parent = universe
            .index_of(a)
            .ok_or_else(|| malformed("parent is not in the universe"))?;
        let child = universe
            .index_of(b)
            .ok_or_else(|| malformed("child is not in the universe"))?;
        if parent == child {
            return Err(malformed("element related to itself"));
        }
        edges.insert(Edge::new(parent, child));
    }
    if edges.len() < pairs.len() {
        debug!(repeated = pairs.len() - edges.len(), "dropped repeated explicit pairs");
    }
    Ok(edges.into_iter().collect())
}

/// Reduces arbitrary edges to the covering relation of their closure.
///
/// Elements on a common cycle become equivalent and lose their edges.
pub fn reduce_edges(n: usize, edges: &[Edge]) -> Result<Vec<Edge>> {
    let mut rel = Relation::from_edges(n, edges)?;
    rel.close();
    Ok(rel.covering_edges())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementKind;
    use crate::rules::{CustomRule, Rule};

    fn ints(xs: &[i64]) -> Universe {
        Universe::from_values(xs.iter().copied()).unwrap()
    }

    #[test]
    fn empty_universe_has_no_edges() {
        let u = Universe::new();
        assert_eq!(build_covering_edges(&u, &Rule::Divides).unwrap(), vec![]);
        let u = Universe::with_kind(ElementKind::Integer);
        assert_eq!(build_covering_edges(&u, &Rule::Leq).unwrap(), vec![]);
    }

    #[test]
    fn closure_is_reflexive_and_transitive() {
        let u = ints(&[1, 2, 3, 4, 6, 12]);
        let mut rel = Relation::from_comparator(&u, &Rule::Divides).unwrap();
        rel.close();
        assert!(rel.is_reflexive());
        assert!(rel.is_transitive());
        assert!(rel.le(0, 5));
        assert!(!rel.le(2, 3));
    }

    #[test]
    fn divisors_of_twelve() {
        let u = ints(&[1, 2, 3, 4, 6, 12]);
        let edges = build_covering_edges(&u, &Rule::Divides).unwrap();
        let pairs: Vec<_> = edges.iter().map(|e| (e.parent, e.child)).collect();
        // 1->2, 1->3, 2->4, 2->6, 3->6, 4->12, 6->12
        assert_eq!(pairs, vec![(0, 1), (0, 2), (1, 3), (1, 4), (2, 4), (3, 5), (4, 5)]);
    }

    #[test]
    fn total_order_is_a_chain() {
        let u = ints(&[5, 1, 3]);
        let edges = build_covering_edges(&u, &Rule::Leq).unwrap();
        assert_eq!(edges, vec![Edge::new(1, 2), Edge::new(2, 0)]);
    }

    #[test]
    fn equivalent_elements_are_not_covering() {
        // every text of the same length compares Equal here
        let same_len = CustomRule::new(ElementKind::Text, |a: &ElementValue, b: &ElementValue| {
            let (a, b) = (a.to_string().len(), b.to_string().len());
            match a.cmp(&b) {
                std::cmp::Ordering::Less => Comparison::Less,
                std::cmp::Ordering::Greater => Comparison::Greater,
                std::cmp::Ordering::Equal => Comparison::Equal,
            }
        });
        let u = Universe::from_values(["a", "b", "cc"]).unwrap();
        let edges = build_covering_edges(&u, &same_len).unwrap();
        assert_eq!(edges, vec![Edge::new(0, 2), Edge::new(1, 2)]);
    }

    #[test]
    fn rule_of_other_kind_is_rejected() {
        let u = ints(&[1, 2]);
        assert!(matches!(
            build_covering_edges(&u, &Rule::Prefix),
            Err(HasseError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn explicit_pairs_resolve_by_value() {
        let u = ints(&[2, 4, 8]);
        let pairs = vec![
            (ElementValue::Integer(2), ElementValue::Integer(4)),
            (ElementValue::Integer(4), ElementValue::Integer(8)),
        ];
        assert_eq!(
            explicit_edges(&u, &pairs).unwrap(),
            vec![Edge::new(0, 1), Edge::new(1, 2)]
        );

        let bad = vec![(ElementValue::Integer(2), ElementValue::Integer(5))];
        assert_eq!(
            explicit_edges(&u, &bad).unwrap_err(),
            HasseError::MalformedExplicitEdge {
                parent: "2".into(),
                child: "5".into(),
                reason: "child is not in the universe",
            }
        );
        let selfish = vec![(ElementValue::Integer(4), ElementValue::Integer(4))];
        assert!(explicit_edges(&u, &selfish).is_err());
    }

    #[test]
    fn repeated_pairs_become_one_edge() {
        let u = ints(&[2, 4, 8]);
        let (two, four, eight) = (
            ElementValue::Integer(2),
            ElementValue::Integer(4),
            ElementValue::Integer(8),
        );
        let pairs = vec![
            (four.clone(), eight.clone()),
            (two.clone(), four.clone()),
            (four.clone(), eight),
            (two, four),
        ];
        assert_eq!(explicit_edges(&u, &pairs).unwrap(), vec![Edge::new(1, 2), Edge::new(0, 1)]);
    }

    #[test]
    fn validate_rejects_out_of_range() {
        assert!(validate_edges(2, &[Edge::new(0, 1)]).is_ok());
        assert!(matches!(
            validate_edges(2, &[Edge::new(0, 2)]),
            Err(HasseError::MalformedExplicitEdge { reason: "index out of range", .. })
        ));
    }

    #[test]
    fn reduce_drops_transitive_pairs() {
        let edges = [Edge::new(0, 1), Edge::new(1, 2), Edge::new(0, 2)];
        assert_eq!(
            reduce_edges(3, &edges).unwrap(),
            vec![Edge::new(0, 1), Edge::new(1, 2)]
        );
        // a 2-cycle collapses into one equivalence class above 2
        let cyclic = [Edge::new(0, 1), Edge::new(1, 0), Edge::new(2, 0)];
        assert_eq!(
            reduce_edges(3, &cyclic).unwrap(),
            vec![Edge::new(2, 0), Edge::new(2, 1)]
        );
    }
}
