//! Needleman-Wunsch global alignment with a linear gap penalty.
//!
//! The score matrix is `(|a| + 1) x (|b| + 1)`:
//!
//! ```text
//! dp[0][0] = 0, dp[i][0] = i * gap, dp[0][j] = j * gap
//! dp[i][j] = max(dp[i-1][j-1] + s(a[i-1], b[j-1]),
//!                dp[i-1][j] + gap,
//!                dp[i][j-1] + gap)
//! ```
//!
//! Traceback starts at the bottom-right cell and prefers, in order, the
//! diagonal, the up move (gap in `b`) and the left move (gap in `a`).

use std::fmt;

use serde::Serialize;
use tracing::trace;

use crate::error::{HasseError, Result};
use crate::scoring::ScoreTable;

/// Symbol written into an alignment row opposite an inserted residue.
pub const GAP: char = '-';

/// Filled score matrix for one pair of sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DpMatrix {
    a: Vec<char>,
    b: Vec<char>,
    cols: usize,
    cells: Vec<i32>,
}

impl DpMatrix {
    pub fn rows(&self) -> usize {
        self.a.len() + 1
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `dp[i][j]`. Panics outside the matrix.
    pub fn get(&self, i: usize, j: usize) -> i32 {
        assert!(i < self.rows() && j < self.cols);
        self.cells[i * self.cols + j]
    }

    /// Optimal global score, the bottom-right cell.
    pub fn score(&self) -> i32 {
        self.get(self.a.len(), self.b.len())
    }
}

impl fmt::Display for DpMatrix {
    /// Fixed-width table: `b` across the top, `a` down the side.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const W: usize = 4;
        write!(f, "{:>W$}{:>W$}", ' ', GAP)?;
        for c in &self.b {
            write!(f, "{c:>W$}")?;
        }
        writeln!(f)?;
        for i in 0..self.rows() {
            let label = if i == 0 { GAP } else { self.a[i - 1] };
            write!(f, "{label:>W$}")?;
            for j in 0..self.cols {
                write!(f, "{:>W$}", self.get(i, j))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// One optimal global alignment: two equal-length rows over the input
/// alphabet plus [`GAP`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alignment {
    pub score: i32,
    pub top: String,
    pub bottom: String,
}

impl Alignment {
    /// Number of columns.
    pub fn len(&self) -> usize {
        self.top.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.top.is_empty()
    }

    /// Columns where both rows carry the same residue.
    pub fn matches(&self) -> usize {
        self.top
            .chars()
            .zip(self.bottom.chars())
            .filter(|&(x, y)| x == y && x != GAP)
            .count()
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.top, self.bottom)
    }
}

/// Global aligner bound to one score table.
#[derive(Debug, Clone, Copy)]
pub struct Aligner<'t> {
    table: &'t ScoreTable,
}

impl<'t> Aligner<'t> {
    pub fn new(table: &'t ScoreTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &'t ScoreTable {
        self.table
    }

    /// Fills the score matrix for `a` against `b`.
    ///
    /// Every symbol of both sequences must be in the table's alphabet.
    pub fn matrix(&self, a: &str, b: &str) -> Result<DpMatrix> {
        let (ea, eb) = (self.table.encode(a)?, self.table.encode(b)?);
        self.fill(a, b, &ea, &eb)
    }

    /// Optimal global score only.
    pub fn score(&self, a: &str, b: &str) -> Result<i32> {
        Ok(self.matrix(a, b)?.score())
    }

    /// Optimal score and one optimal alignment.
    pub fn align(&self, a: &str, b: &str) -> Result<Alignment> {
        let (ea, eb) = (self.table.encode(a)?, self.table.encode(b)?);
        let dp = self.fill(a, b, &ea, &eb)?;
        let alignment = self.traceback(&dp, &ea, &eb);
        trace!(
            a_len = ea.len(),
            b_len = eb.len(),
            score = alignment.score,
            "aligned pair"
        );
        Ok(alignment)
    }

    /// Fills the matrix with checked sums; a cell or candidate outside the
    /// `i32` range fails with [`HasseError::ScoreOverflow`].
    fn fill(&self, a: &str, b: &str, ea: &[usize], eb: &[usize]) -> Result<DpMatrix> {
        let overflow = || HasseError::ScoreOverflow {
            a_len: ea.len(),
            b_len: eb.len(),
        };
        let gap = self.table.gap();
        let border = |k: usize| {
            i32::try_from(k)
                .ok()
                .and_then(|k| k.checked_mul(gap))
                .ok_or_else(overflow)
        };

        let cols = eb.len() + 1;
        let mut cells = vec![0i32; (ea.len() + 1) * cols];
        for j in 1..cols {
            cells[j] = border(j)?;
        }
        for i in 1..=ea.len() {
            let row = i * cols;
            let prev = row - cols;
            cells[row] = border(i)?;
            for j in 1..cols {
                let sub = self.table.by_index(ea[i - 1], eb[j - 1]);
                let diag = cells[prev + j - 1].checked_add(sub).ok_or_else(overflow)?;
                let up = cells[prev + j].checked_add(gap).ok_or_else(overflow)?;
                let left = cells[row + j - 1].checked_add(gap).ok_or_else(overflow)?;
                cells[row + j] = diag.max(up).max(left);
            }
        }
        Ok(DpMatrix {
            a: a.chars().collect(),
            b: b.chars().collect(),
            cols,
            cells,
        })
    }

    fn traceback(&self, dp: &DpMatrix, ea: &[usize], eb: &[usize]) -> Alignment {
        let gap = self.table.gap();
        let (mut i, mut j) = (ea.len(), eb.len());
        let mut top = Vec::with_capacity(i + j);
        let mut bottom = Vec::with_capacity(i + j);
        while i > 0 && j > 0 {
            let here = dp.get(i, j);
            if here == dp.get(i - 1, j - 1) + self.table.by_index(ea[i - 1], eb[j - 1]) {
                top.push(dp.a[i - 1]);
                bottom.push(dp.b[j - 1]);
                i -= 1;
                j -= 1;
            } else if here == dp.get(i - 1, j) + gap {
                top.push(dp.a[i - 1]);
                bottom.push(GAP);
                i -= 1;
            } else {
                top.push(GAP);
                bottom.push(dp.b[j - 1]);
                j -= 1;
            }
        }
        while i > 0 {
            top.push(dp.a[i - 1]);
            bottom.push(GAP);
            i -= 1;
        }
        while j > 0 {
            top.push(GAP);
            bottom.push(dp.b[j - 1]);
            j -= 1;
        }
        Alignment {
            score: dp.score(),
            top: top.into_iter().rev().collect(),
            bottom: bottom.into_iter().rev().collect(),
        }
    }
}

/// Score of `a` against `b` under `table`.
pub fn score(a: &str, b: &str, table: &ScoreTable) -> Result<i32> {
    Aligner::new(table).score(a, b)
}

/// One optimal alignment of `a` against `b` under `table`.
pub fn align(a: &str, b: &str, table: &ScoreTable) -> Result<Alignment> {
    Aligner::new(table).align(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dna() -> ScoreTable {
        ScoreTable::uniform("ACGTU", 1, -1, -1).unwrap()
    }

    #[test]
    fn matrix_borders_and_recurrence() {
        let t = dna();
        let dp = Aligner::new(&t).matrix("ACGT", "AGT").unwrap();
        assert_eq!((dp.rows(), dp.cols()), (5, 4));
        let want = [
            [0, -1, -2, -3],
            [-1, 1, 0, -1],
            [-2, 0, 0, -1],
            [-3, -1, 1, 0],
            [-4, -2, 0, 2],
        ];
        for (i, row) in want.iter().enumerate() {
            for (j, &v) in row.iter().enumerate() {
                assert_eq!(dp.get(i, j), v, "dp[{i}][{j}]");
            }
        }
        assert_eq!(dp.score(), 2);
    }

    #[test]
    fn traceback_prefers_diagonal() {
        let t = dna();
        let al = align("ACGT", "AGT", &t).unwrap();
        assert_eq!(al.score, 2);
        assert_eq!(al.top, "ACGT");
        assert_eq!(al.bottom, "A-GT");
        assert_eq!(al.to_string(), "ACGT|A-GT");
        assert_eq!(al.matches(), 3);
    }

    #[test]
    fn empty_side_is_all_gaps() {
        let t = dna();
        let al = align("AC", "", &t).unwrap();
        assert_eq!((al.score, al.top.as_str(), al.bottom.as_str()), (-2, "AC", "--"));
        let al = align("", "AC", &t).unwrap();
        assert_eq!((al.score, al.top.as_str(), al.bottom.as_str()), (-2, "--", "AC"));
        let al = align("", "", &t).unwrap();
        assert_eq!(al.score, 0);
        assert!(al.is_empty());
    }

    #[test]
    fn unknown_symbol_is_rejected() {
        let t = dna();
        assert_eq!(
            score("ACGT", "ACXT", &t).unwrap_err(),
            HasseError::UnsupportedSymbol {
                symbol: 'X',
                position: 2,
                sequence: "ACXT".into()
            }
        );
    }

    #[test]
    fn blosum_pairs() {
        let t = ScoreTable::blosum62(-4);
        let al = align("HEAGAWGHEE", "PAWHEAE", &t).unwrap();
        assert_eq!(al.score, 12);
        assert_eq!(al.top, "HEAGAWGHE-E");
        assert_eq!(al.bottom, "--P-AW-HEAE");
        assert_eq!(score("MKV", "MKV", &t).unwrap(), 14);
        assert_eq!(align("ACD", "AD", &t).unwrap().bottom, "A-D");
    }

    #[test]
    fn renders_matrix() {
        let t = dna();
        let dp = Aligner::new(&t).matrix("A", "AC").unwrap();
        let text = dp.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "       -   A   C");
        assert_eq!(lines[1], "   -   0  -1  -2");
        assert_eq!(lines[2], "   A  -1   1   0");
    }

    #[test]
    fn extreme_gap_is_an_error_not_a_wrap() {
        let t = ScoreTable::uniform("ACGT", 1, -1, -2_000_000_000).unwrap();
        assert_eq!(
            score("A", "AC", &t).unwrap_err(),
            HasseError::ScoreOverflow { a_len: 1, b_len: 2 }
        );
        assert!(align("AC", "A", &t).is_err());
        // one gap still fits
        assert_eq!(score("", "A", &t).unwrap(), -2_000_000_000);
    }

    #[test]
    fn extreme_substitution_scores_overflow() {
        let t = ScoreTable::uniform("AC", i32::MAX, 0, -1).unwrap();
        assert_eq!(score("A", "A", &t).unwrap(), i32::MAX);
        assert!(matches!(score("AA", "AA", &t), Err(HasseError::ScoreOverflow { .. })));
    }
}
