use thiserror::Error;

/// Failures raised while reading fields out of loaded rows.
#[derive(Debug, Error, PartialEq)]
pub enum AnalysisError {
    #[error("line {line}: column {column} is out of range (row has {len} fields)")]
    MissingColumn { line: u64, column: usize, len: usize },
    #[error("line {line}: column {column} value {value:?} is not a number")]
    InvalidNumber { line: u64, column: usize, value: String },
}

pub type AnalysisResult<T> = std::result::Result<T, AnalysisError>;
