//! Textual, JSON and DOT renderings of a built diagram.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::error::Result;
use crate::poset::Poset;

/// One covering edge by value, optionally with its alignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeLabel {
    pub parent: String,
    pub child: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment: Option<String>,
}

/// Everything a presentation layer needs, by value rather than by index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub elements: Vec<String>,
    pub removed_duplicates: usize,
    pub edges: Vec<EdgeLabel>,
    pub levels: BTreeMap<usize, Vec<String>>,
    pub minimal: Vec<String>,
    pub maximal: Vec<String>,
    pub height: usize,
    pub width: usize,
    pub linear_extension: Vec<String>,
    pub incomparable: Vec<(String, String)>,
}

impl Summary {
    pub fn of(poset: &Poset) -> Result<Self> {
        let u = poset.universe();
        let name = |i: usize| u[i].to_string();
        let names = |ix: &[usize]| ix.iter().map(|&i| name(i)).collect::<Vec<_>>();

        let edges = match poset.alignments() {
            Some(rows) => rows
                .iter()
                .map(|r| EdgeLabel {
                    parent: r.parent.clone(),
                    child: r.child.clone(),
                    score: Some(r.score()),
                    alignment: Some(r.alignment.to_string()),
                })
                .collect(),
            None => poset
                .edges()
                .iter()
                .map(|e| EdgeLabel {
                    parent: name(e.parent),
                    child: name(e.child),
                    score: None,
                    alignment: None,
                })
                .collect(),
        };

        let levels = poset.levels();
        Ok(Self {
            elements: u.iter().map(ToString::to_string).collect(),
            removed_duplicates: u.removed_duplicates(),
            edges,
            levels: levels
                .layers()
                .iter()
                .map(|(&l, ix)| (l, names(ix.as_slice())))
                .collect(),
            minimal: names(levels.minimal_elements()),
            maximal: names(levels.maximal_elements()),
            height: levels.height(),
            width: levels.width(),
            linear_extension: poset.topo_one()?.iter().map(ToString::to_string).collect(),
            incomparable: poset
                .incomparable_pairs()
                .into_iter()
                .map(|(i, j)| (name(i), name(j)))
                .collect(),
        })
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.removed_duplicates > 0 {
            writeln!(f, "Removed duplicates: {}", self.removed_duplicates)?;
        }
        writeln!(f, "Elements ({}):", self.elements.len())?;
        for (i, e) in self.elements.iter().enumerate() {
            writeln!(f, "  [{i}] {e}")?;
        }
        writeln!(f, "Hasse edges ({}):", self.edges.len())?;
        for e in &self.edges {
            write!(f, "  {} -> {}", e.parent, e.child)?;
            if let (Some(score), Some(al)) = (e.score, &e.alignment) {
                write!(f, " : {al} (score {score})")?;
            }
            writeln!(f)?;
        }
        writeln!(f, "Levels:")?;
        for (l, names) in &self.levels {
            writeln!(f, "  {l}: {}", names.join(", "))?;
        }
        writeln!(f, "Minimal: {}", self.minimal.join(", "))?;
        writeln!(f, "Maximal: {}", self.maximal.join(", "))?;
        writeln!(f, "Height: {}", self.height)?;
        writeln!(f, "Width: {}", self.width)
    }
}

fn escape_dot(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c == '\\' || c == '"' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Graphviz rendering of a diagram, drawn bottom-up. Alignment scores,
/// when present, become edge labels.
pub struct Dot<'p>(pub &'p Poset);

impl fmt::Display for Dot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let poset = self.0;
        writeln!(f, "digraph Hasse {{")?;
        writeln!(f, "  rankdir=BT;")?;
        writeln!(f, "  node [shape=circle];")?;
        for (i, v) in poset.universe().iter().enumerate() {
            writeln!(f, "  n{i} [label=\"{}\"];", escape_dot(&v.to_string()))?;
        }
        let scores = poset.alignments();
        for (k, e) in poset.edges().iter().enumerate() {
            write!(f, "  n{} -> n{}", e.parent, e.child)?;
            if let Some(row) = scores.and_then(|rows| rows.get(k)) {
                write!(f, " [label=\"{}\"]", row.score())?;
            }
            writeln!(f, ";")?;
        }
        writeln!(f, "}}")
    }
}

pub fn to_dot(poset: &Poset) -> String {
    Dot(poset).to_string()
}
