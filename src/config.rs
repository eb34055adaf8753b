//! JSON job descriptions for the command-line front end.
//!
//! ```json
//! { "kind": "integer", "values": [2, 4, 8, 3], "rule": "divides" }
//! { "kind": "text", "values": ["AD", "ACD"], "align": { "table": { "type": "blosum62" } } }
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_json::Value;

use crate::bio::validate_sequences;
use crate::element::{ElementKind, ElementValue, Universe};
use crate::error::HasseError;
use crate::poset::Poset;
use crate::report::Summary;
use crate::rules::Rule;
use crate::scoring::{ScoreTable, BLOSUM62_GAP};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Dot,
}

/// Where the substitution scores come from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TableSource {
    #[default]
    Blosum62,
    Uniform {
        alphabet: String,
        match_score: i32,
        mismatch: i32,
    },
    /// Delimited matrix text, `;` separated unless told otherwise.
    File {
        path: PathBuf,
        #[serde(default = "default_delimiter")]
        delimiter: char,
    },
}

fn default_delimiter() -> char {
    ';'
}

fn default_gap() -> i32 {
    BLOSUM62_GAP
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AlignConfig {
    #[serde(default)]
    pub table: TableSource,
    #[serde(default = "default_gap")]
    pub gap: i32,
}

impl AlignConfig {
    pub fn load_table(&self) -> Result<ScoreTable> {
        let table = match &self.table {
            TableSource::Blosum62 => ScoreTable::blosum62(self.gap),
            TableSource::Uniform {
                alphabet,
                match_score,
                mismatch,
            } => ScoreTable::uniform(alphabet, *match_score, *mismatch, self.gap)?,
            TableSource::File { path, delimiter } => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading score table {}", path.display()))?;
                ScoreTable::from_delimited(&text, *delimiter, self.gap)
                    .with_context(|| format!("parsing score table {}", path.display()))?
            }
        };
        Ok(table)
    }
}

/// One run: a universe, how to order it, and what to print.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Job {
    pub kind: ElementKind,
    pub values: Vec<Value>,
    #[serde(default)]
    pub rule: Option<Rule>,
    /// Explicit `[parent, child]` pairs used instead of a rule.
    #[serde(default)]
    pub pairs: Option<Vec<(Value, Value)>>,
    #[serde(default)]
    pub reduce_pairs: bool,
    #[serde(default)]
    pub align: Option<AlignConfig>,
    #[serde(default)]
    pub output: OutputFormat,
}

/// Reads a JSON value as an element of `kind`. Strings go through the
/// line parser, so `"1 2 3"` is a valid integer set.
pub fn value_from_json(kind: ElementKind, v: &Value) -> Result<ElementValue> {
    let value = match (kind, v) {
        (_, Value::String(s)) => ElementValue::parse(kind, s)?,
        (ElementKind::Integer, Value::Number(n)) => match n.as_i64() {
            Some(x) => ElementValue::Integer(x),
            None => bail!("{n} is not a 64-bit integer"),
        },
        (ElementKind::IntegerSet, Value::Array(items)) => {
            let nums = items
                .iter()
                .map(|x| x.as_i64().with_context(|| format!("{x} is not a 64-bit integer")))
                .collect::<Result<Vec<i64>>>()?;
            ElementValue::integer_set(nums)
        }
        _ => {
            return Err(HasseError::InvalidElement {
                kind,
                input: v.to_string(),
            }
            .into())
        }
    };
    Ok(value)
}

impl Job {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("parsing job description")
    }

    /// The deduplicated universe of this job.
    pub fn universe(&self) -> Result<Universe> {
        let mut universe = Universe::with_kind(self.kind);
        for v in &self.values {
            universe.push(value_from_json(self.kind, v)?)?;
        }
        if universe.is_empty() {
            return Err(HasseError::EmptyInput("no elements were provided").into());
        }
        Ok(universe)
    }

    /// Builds the diagram, aligning edges when a score table is configured.
    pub fn build(&self) -> Result<Poset> {
        let universe = self.universe()?;
        let table = self.align.as_ref().map(AlignConfig::load_table).transpose()?;
        if let Some(table) = &table {
            validate_sequences(&universe, table)?;
        }

        let poset = match (self.rule, &self.pairs) {
            (Some(_), Some(_)) => bail!("give either a rule or explicit pairs, not both"),
            (Some(rule), None) => Poset::from_rule(universe, &rule)?,
            (None, Some(pairs)) => {
                let pairs = pairs
                    .iter()
                    .map(|(a, b)| {
                        Ok((value_from_json(self.kind, a)?, value_from_json(self.kind, b)?))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Poset::from_pairs(universe, &pairs, self.reduce_pairs)?
            }
            (None, None) if table.is_some() && self.kind == ElementKind::Text => {
                Poset::from_rule(universe, &Rule::Subsequence)?
            }
            (None, None) => bail!("no ordering given: set \"rule\" or \"pairs\""),
        };

        match table {
            Some(table) => Ok(poset.align_edges(&table)?),
            None => Ok(poset),
        }
    }

    pub fn run(&self) -> Result<Summary> {
        Ok(Summary::of(&self.build()?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_minimal_job() {
        let job =
            Job::from_json(r#"{"kind": "integer", "values": [2, 4], "rule": "divides"}"#).unwrap();
        assert_eq!(job.kind, ElementKind::Integer);
        assert_eq!(job.rule, Some(Rule::Divides));
        assert_eq!(job.output, OutputFormat::Text);
        assert!(job.align.is_none());
    }

    #[test]
    fn rejects_unknown_fields() {
        assert!(Job::from_json(r#"{"kind": "text", "values": [], "colour": "red"}"#).is_err());
    }

    #[test]
    fn align_defaults_to_blosum62() {
        let job = Job::from_json(r#"{"kind": "text", "values": ["A"], "align": {}}"#).unwrap();
        let align = job.align.unwrap();
        assert_eq!(align.table, TableSource::Blosum62);
        assert_eq!(align.gap, BLOSUM62_GAP);
    }

    #[test]
    fn json_values_of_each_kind() {
        assert_eq!(
            value_from_json(ElementKind::Integer, &json!(12)).unwrap(),
            ElementValue::Integer(12)
        );
        assert_eq!(
            value_from_json(ElementKind::Integer, &json!(" 7 ")).unwrap(),
            ElementValue::Integer(7)
        );
        assert_eq!(
            value_from_json(ElementKind::IntegerSet, &json!([3, 1, 3])).unwrap(),
            ElementValue::integer_set([1, 3])
        );
        assert_eq!(
            value_from_json(ElementKind::IntegerSet, &json!("5 4")).unwrap(),
            ElementValue::integer_set([4, 5])
        );
        assert!(value_from_json(ElementKind::Text, &json!(5)).is_err());
        assert!(value_from_json(ElementKind::Integer, &json!(1.5)).is_err());
    }

    #[test]
    fn empty_universe_is_rejected() {
        let job = Job::from_json(r#"{"kind": "integer", "values": [], "rule": "leq"}"#).unwrap();
        let err = job.build().unwrap_err();
        assert_eq!(
            err.downcast_ref::<HasseError>(),
            Some(&HasseError::EmptyInput("no elements were provided"))
        );
    }

    #[test]
    fn rule_and_pairs_are_exclusive() {
        let job = Job::from_json(
            r#"{"kind": "integer", "values": [1, 2], "rule": "leq", "pairs": [[1, 2]]}"#,
        )
        .unwrap();
        assert!(job.build().is_err());
        let job = Job::from_json(r#"{"kind": "integer", "values": [1, 2]}"#).unwrap();
        assert!(job.build().is_err());
    }

    #[test]
    fn explicit_pairs_must_exist() {
        let job = Job::from_json(
            r#"{"kind": "integer", "values": [1, 2], "pairs": [[1, 3]]}"#,
        )
        .unwrap();
        let err = job.build().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<HasseError>(),
            Some(HasseError::MalformedExplicitEdge { .. })
        ));
    }

    #[test]
    fn text_job_with_table_defaults_to_subsequence() {
        let job = Job::from_json(
            r#"{"kind": "text", "values": ["AD", "ACD", "W"], "align": {"gap": -4}}"#,
        )
        .unwrap();
        let summary = job.run().unwrap();
        assert_eq!(summary.edges.len(), 1);
        assert_eq!(summary.edges[0].score, Some(6));
        assert_eq!(summary.maximal, vec!["ACD", "W"]);
    }

    #[test]
    fn uniform_table_source() {
        let job = Job::from_json(
            r#"{"kind": "text", "values": ["GA", "GAT"], "rule": "prefix",
                "align": {
                    "table": {
                        "type": "uniform", "alphabet": "ACGT", "match_score": 1, "mismatch": -1
                    },
                    "gap": -1
                }}"#,
        )
        .unwrap();
        let summary = job.run().unwrap();
        assert_eq!(summary.edges[0].alignment.as_deref(), Some("GA-|GAT"));
        assert_eq!(summary.edges[0].score, Some(1));
    }

    #[test]
    fn extreme_gap_fails_the_job() {
        let job = Job::from_json(
            r#"{"kind": "text", "values": ["AD", "ACDE"], "rule": "subsequence",
                "align": {"gap": -2000000000}}"#,
        )
        .unwrap();
        let err = job.run().unwrap_err();
        assert_eq!(
            err.downcast_ref::<HasseError>(),
            Some(&HasseError::ScoreOverflow { a_len: 2, b_len: 4 })
        );
    }

    fn file_job(path: &std::path::Path) -> Job {
        let job = json!({
            "kind": "text",
            "values": ["GA", "GAT"],
            "rule": "prefix",
            "align": {"table": {"type": "file", "path": path}, "gap": -3}
        });
        Job::from_json(&job.to_string()).unwrap()
    }

    #[test]
    fn file_table_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dna.csv");
        std::fs::write(&path, ";A;G;T\nA;2;-1;-1\nG;-1;2;-1\nT;-1;-1;2\n").unwrap();

        let summary = file_job(&path).run().unwrap();
        assert_eq!(summary.edges[0].alignment.as_deref(), Some("GA-|GAT"));
        assert_eq!(summary.edges[0].score, Some(1));
    }

    #[test]
    fn file_table_errors_name_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.csv");
        let err = file_job(&missing).run().unwrap_err();
        assert!(format!("{err:#}").contains("reading score table"));
        assert!(err.to_string().contains("missing.csv"));

        let bad = dir.path().join("bad.csv");
        std::fs::write(&bad, ";A;G\nA;1;x\nG;0;1\n").unwrap();
        let err = file_job(&bad).run().unwrap_err();
        assert!(err.to_string().starts_with("parsing score table"));
        assert!(matches!(err.downcast_ref::<HasseError>(), Some(HasseError::InvalidScoreTable(_))));
    }
}
