//! Substitution score tables with a linear gap penalty.

use ordermap::OrderMap;

use crate::error::{HasseError, Result};

/// Gap penalty used with BLOSUM62 unless the caller picks another.
pub const BLOSUM62_GAP: i32 = -4;

const BLOSUM62_ALPHABET: &str = "ARNDCQEGHILKMFPSTWYV";

#[rustfmt::skip]
const BLOSUM62: [[i32; 20]; 20] = [
    [4, -1, -2, -2, 0, -1, -1, 0, -2, -1, -1, -1, -1, -2, -1, 1, 0, -3, -2, 0], // A
    [-1, 5, 0, -2, -3, 1, 0, -2, 0, -3, -2, 2, -1, -3, -2, -1, -1, -3, -2, -3], // R
    [-2, 0, 6, 1, -3, 0, 0, 0, 1, -3, -3, 0, -2, -3, -2, 1, 0, -4, -2, -3], // N
    [-2, -2, 1, 6, -3, 0, 2, -1, -1, -3, -4, -1, -3, -3, -1, 0, -1, -4, -3, -3], // D
    [0, -3, -3, -3, 9, -3, -4, -3, -3, -1, -1, -3, -1, -2, -3, -1, -1, -2, -2, -1], // C
    [-1, 1, 0, 0, -3, 5, 2, -2, 0, -3, -2, 1, 0, -3, -1, 0, -1, -2, -1, -2], // Q
    [-1, 0, 0, 2, -4, 2, 5, -2, 0, -3, -3, 1, -2, -3, -1, 0, -1, -3, -2, -2], // E
    [0, -2, 0, -1, -3, -2, -2, 6, -2, -4, -4, -2, -3, -3, -2, 0, -2, -2, -3, -3], // G
    [-2, 0, 1, -1, -3, 0, 0, -2, 8, -3, -3, -1, -2, -1, -2, -1, -2, -2, 2, -3], // H
    [-1, -3, -3, -3, -1, -3, -3, -4, -3, 4, 2, -3, 1, 0, -3, -2, -1, -3, -1, 3], // I
    [-1, -2, -3, -4, -1, -2, -3, -4, -3, 2, 4, -2, 2, 0, -3, -2, -1, -2, -1, 1], // L
    [-1, 2, 0, -1, -3, 1, 1, -2, -1, -3, -2, 5, -1, -3, -1, 0, -1, -3, -2, -2], // K
    [-1, -1, -2, -3, -1, 0, -2, -3, -2, 1, 2, -1, 5, 0, -2, -1, -1, -1, -1, 1], // M
    [-2, -3, -3, -3, -2, -3, -3, -3, -1, 0, 0, -3, 0, 6, -4, -2, -2, 1, 3, -1], // F
    [-1, -2, -2, -1, -3, -1, -1, -2, -2, -3, -3, -1, -2, -4, 7, -1, -1, -4, -3, -2], // P
    [1, -1, 1, 0, -1, 0, 0, 0, -1, -2, -2, 0, -1, -2, -1, 4, 1, -3, -2, -2], // S
    [0, -1, 0, -1, -1, -1, -1, -2, -2, -1, -1, -1, -1, -2, -1, 1, 5, -2, -2, 0], // T
    [-3, -3, -4, -4, -2, -2, -3, -2, -2, -3, -2, -3, -1, 1, -4, -3, -2, 11, 2, -3], // W
    [-2, -2, -2, -3, -2, -1, -2, -3, 2, -1, -1, -2, -1, 3, -3, -2, -2, 2, 7, -1], // Y
    [0, -3, -3, -3, -1, -2, -2, -3, -3, 3, 1, -2, 1, -1, -2, -2, 0, -3, -1, 4], // V
];

/// A fixed alphabet, a symmetric substitution matrix over it, and one
/// linear gap penalty. Immutable once built; pass it by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreTable {
    /// symbol -> row/column
    index: OrderMap<char, usize>,
    /// row-major, `len * len`
    matrix: Vec<i32>,
    gap: i32,
}

impl ScoreTable {
    /// Builds a table from an alphabet and its square matrix, in alphabet order.
    ///
    /// Rejects empty alphabets, repeated symbols, shape mismatches and
    /// asymmetric matrices.
    pub fn new<R: AsRef<[i32]>>(alphabet: &str, rows: &[R], gap: i32) -> Result<Self> {
        let mut index = OrderMap::new();
        for (i, c) in alphabet.chars().enumerate() {
            if index.insert(c, i).is_some() {
                return Err(HasseError::InvalidScoreTable(format!("symbol {c:?} listed twice")));
            }
        }
        let n = index.len();
        if n == 0 {
            return Err(HasseError::EmptyInput("score table alphabet"));
        }
        if rows.len() != n {
            return Err(HasseError::InvalidScoreTable(format!(
                "{} rows for {n} symbols",
                rows.len()
            )));
        }
        let mut matrix = Vec::with_capacity(n * n);
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != n {
                return Err(HasseError::InvalidScoreTable(format!(
                    "row {i} has {} values, expected {n}",
                    row.len()
                )));
            }
            matrix.extend_from_slice(row);
        }
        for i in 0..n {
            for j in (i + 1)..n {
                if matrix[i * n + j] != matrix[j * n + i] {
                    return Err(HasseError::InvalidScoreTable(format!(
                        "not symmetric at ({i}, {j})"
                    )));
                }
            }
        }
        Ok(Self { index, matrix, gap })
    }

    /// BLOSUM62 over the 20 standard amino acids.
    pub fn blosum62(gap: i32) -> Self {
        let index = BLOSUM62_ALPHABET.chars().enumerate().map(|(i, c)| (c, i)).collect();
        let matrix = BLOSUM62.iter().flatten().copied().collect();
        Self { index, matrix, gap }
    }

    /// `matched` on the diagonal, `mismatched` everywhere else.
    pub fn uniform(alphabet: &str, matched: i32, mismatched: i32, gap: i32) -> Result<Self> {
        let n = alphabet.chars().count();
        let rows: Vec<Vec<i32>> = (0..n)
            .map(|i| (0..n).map(|j| if i == j { matched } else { mismatched }).collect())
            .collect();
        Self::new(alphabet, &rows, gap)
    }

    /// Parses a delimited matrix: a header of symbols after one empty corner
    /// cell, then one row per symbol led by its label.
    ///
    /// ```text
    /// ;A;C
    /// A;1;-1
    /// C;-1;1
    /// ```
    pub fn from_delimited(text: &str, delimiter: char, gap: i32) -> Result<Self> {
        let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
        let header = lines
            .next()
            .ok_or(HasseError::EmptyInput("score table text"))?;
        let alphabet = header
            .split(delimiter)
            .skip(1)
            .map(|cell| single_symbol(cell.trim()))
            .collect::<Result<String>>()?;

        let mut labels = String::new();
        let mut rows = Vec::new();
        for line in lines {
            let mut cells = line.split(delimiter).map(str::trim);
            labels.push(single_symbol(cells.next().unwrap_or_default())?);
            let row = cells
                .map(|cell| {
                    cell.parse::<i32>().map_err(|_| {
                        HasseError::InvalidScoreTable(format!("bad score {cell:?} in row {line:?}"))
                    })
                })
                .collect::<Result<Vec<i32>>>()?;
            rows.push(row);
        }
        if labels != alphabet {
            return Err(HasseError::InvalidScoreTable(format!(
                "row labels {labels:?} do not match header {alphabet:?}"
            )));
        }
        Self::new(&alphabet, &rows, gap)
    }

    /// Same alphabet and matrix with another gap penalty.
    pub fn with_gap(mut self, gap: i32) -> Self {
        self.gap = gap;
        self
    }

    pub fn gap(&self) -> i32 {
        self.gap
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn alphabet(&self) -> impl Iterator<Item = char> + '_ {
        self.index.keys().copied()
    }

    pub fn contains(&self, symbol: char) -> bool {
        self.index.contains_key(&symbol)
    }

    /// Substitution score of two symbols, if both are in the alphabet.
    pub fn score(&self, a: char, b: char) -> Option<i32> {
        let (i, j) = (*self.index.get(&a)?, *self.index.get(&b)?);
        Some(self.by_index(i, j))
    }

    pub(crate) fn by_index(&self, i: usize, j: usize) -> i32 {
        self.matrix[i * self.len() + j]
    }

    /// Maps a sequence onto alphabet positions.
    pub fn encode(&self, seq: &str) -> Result<Vec<usize>> {
        seq.chars()
            .enumerate()
            .map(|(position, symbol)| {
                self.index
                    .get(&symbol)
                    .copied()
                    .ok_or_else(|| HasseError::UnsupportedSymbol {
                        symbol,
                        position,
                        sequence: seq.to_string(),
                    })
            })
            .collect()
    }
}

fn single_symbol(cell: &str) -> Result<char> {
    let mut chars = cell.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(HasseError::InvalidScoreTable(format!(
            "expected a single symbol, got {cell:?}"
        ))),
    }
}
