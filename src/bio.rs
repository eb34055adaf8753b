//! Sequence universes: covering edges labelled with global alignments.

use std::fmt;

use serde::Serialize;
use tracing::info;

use crate::align::{Aligner, Alignment};
use crate::edge::Edge;
use crate::element::{ElementKind, Universe};
use crate::error::{HasseError, Result};
use crate::scoring::ScoreTable;

/// One covering edge between two sequences, with their optimal alignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeAlignment {
    pub edge: Edge,
    pub parent: String,
    pub child: String,
    pub alignment: Alignment,
}

impl EdgeAlignment {
    pub fn score(&self) -> i32 {
        self.alignment.score
    }
}

impl fmt::Display for EdgeAlignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} : {}", self.parent, self.child, self.alignment)
    }
}

fn ensure_text(universe: &Universe) -> Result<()> {
    match universe.kind() {
        Some(kind) if kind != ElementKind::Text => Err(HasseError::TypeMismatch {
            expected: ElementKind::Text,
            found: kind,
        }),
        _ => Ok(()),
    }
}

/// Checks every sequence against the table's alphabet.
pub fn validate_sequences(universe: &Universe, table: &ScoreTable) -> Result<()> {
    ensure_text(universe)?;
    for v in universe {
        table.encode(v.as_text()?)?;
    }
    Ok(())
}

/// Aligns the endpoints of every edge, in edge order.
pub fn annotate_edges(
    universe: &Universe,
    edges: &[Edge],
    table: &ScoreTable,
) -> Result<Vec<EdgeAlignment>> {
    ensure_text(universe)?;
    crate::closure::validate_edges(universe.len(), edges)?;
    let aligner = Aligner::new(table);
    let annotated = edges
        .iter()
        .map(|&edge| {
            let parent = universe[edge.parent].as_text()?;
            let child = universe[edge.child].as_text()?;
            Ok(EdgeAlignment {
                edge,
                parent: parent.to_string(),
                child: child.to_string(),
                alignment: aligner.align(parent, child)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    info!(edges = annotated.len(), "aligned covering edges");
    Ok(annotated)
}
