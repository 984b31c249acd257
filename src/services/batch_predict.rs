// Offline scoring of pre-built flow feature rows
// Backs the `nids-predict` binary

use std::collections::HashMap;
use thiserror::Error;

use crate::services::classifier::{ModelArtifacts, ModelError, Prediction};

/// Rows printed when no output file is requested
pub const PREVIEW_ROWS: usize = 10;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Invalid number '{value}' in column {column}")]
    InvalidNumber { column: usize, value: String },

    #[error("Input vector has length {got} but model expects {expected} features")]
    VectorLength { expected: usize, got: usize },

    #[error(
        "Input CSV columns do not match expected features.\nExpected:\n{expected:?}\nFound:\n{found:?}"
    )]
    ColumnMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("Row {row} has {got} values, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("Input CSV is empty")]
    EmptyInput,

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Binary verdict: class `0` (or a benign label) is Normal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Normal,
    Attack,
}

impl Verdict {
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        let is_normal = match label.parse::<i64>() {
            Ok(code) => code == 0,
            Err(_) => label.eq_ignore_ascii_case("benign") || label.eq_ignore_ascii_case("normal"),
        };
        if is_normal {
            Verdict::Normal
        } else {
            Verdict::Attack
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Normal => "Normal",
            Verdict::Attack => "Attack",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRow {
    pub verdict: Verdict,
    pub confidence: f64,
}

impl From<Prediction> for ScoredRow {
    fn from(prediction: Prediction) -> Self {
        Self {
            verdict: Verdict::from_label(&prediction.label),
            confidence: prediction.confidence(),
        }
    }
}

fn split_fields(line: &str) -> Vec<String> {
    line.split(',')
        .map(|field| field.trim().trim_matches('"').to_string())
        .collect()
}

fn parse_values(fields: &[String]) -> Result<Vec<f64>, BatchError> {
    fields
        .iter()
        .enumerate()
        .map(|(column, value)| {
            value.parse::<f64>().map_err(|_| BatchError::InvalidNumber {
                column,
                value: value.clone(),
            })
        })
        .collect()
}

/// Parse a comma separated sample and check it against the column count
pub fn parse_vector(input: &str, expected: Option<usize>) -> Result<Vec<f64>, BatchError> {
    let values = parse_values(&split_fields(input))?;
    if let Some(expected) = expected {
        if values.len() != expected {
            return Err(BatchError::VectorLength {
                expected,
                got: values.len(),
            });
        }
    }
    Ok(values)
}

/// Map each expected column to its index in `header`.
///
/// The header must be the expected list itself or a permutation of it.
pub fn align_columns(header: &[String], expected: &[String]) -> Result<Vec<usize>, BatchError> {
    let mismatch = || BatchError::ColumnMismatch {
        expected: expected.to_vec(),
        found: header.to_vec(),
    };

    if header.len() != expected.len() {
        return Err(mismatch());
    }

    let positions: HashMap<&str, usize> = header
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i))
        .collect();
    if positions.len() != header.len() {
        return Err(mismatch());
    }

    expected
        .iter()
        .map(|name| positions.get(name.as_str()).copied().ok_or_else(mismatch))
        .collect()
}

/// Score one raw vector
pub fn score_vector(artifacts: &ModelArtifacts, values: &[f64]) -> Result<ScoredRow, BatchError> {
    Ok(artifacts.predict(values)?.into())
}

/// Score every data row of a CSV document whose header names the columns
pub fn score_csv(
    artifacts: &ModelArtifacts,
    content: &str,
    expected: &[String],
) -> Result<Vec<ScoredRow>, BatchError> {
    let mut lines = content.lines().filter(|line| !line.trim().is_empty());
    let header = split_fields(lines.next().ok_or(BatchError::EmptyInput)?);
    let order = align_columns(&header, expected)?;

    lines
        .enumerate()
        .map(|(row, line)| {
            let values = parse_values(&split_fields(line))?;
            if values.len() != order.len() {
                return Err(BatchError::RowWidth {
                    row,
                    expected: order.len(),
                    got: values.len(),
                });
            }
            let aligned: Vec<f64> = order.iter().map(|&i| values[i]).collect();
            score_vector(artifacts, &aligned)
        })
        .collect()
}

/// Render scored rows as `prediction,confidence` CSV
pub fn to_csv(rows: &[ScoredRow]) -> String {
    let mut out = String::from("prediction,confidence\n");
    for row in rows {
        out.push_str(&format!("{},{}\n", row.verdict, row.confidence));
    }
    out
}
