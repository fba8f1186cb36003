//! Error types for the readiness engine.

use thiserror::Error;

/// Row-level failure; the batch normalizer turns it into a skipped-row warning.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("missing identifier column '{field}'")]
    MissingIdentifier { field: &'static str },
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("no usable rows: {total_rows} rows read, {skipped_rows} skipped")]
    EmptyDataset {
        total_rows: usize,
        skipped_rows: usize,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("no data loaded")]
    NoDataLoaded,
}

impl From<toml::de::Error> for AnalysisError {
    fn from(e: toml::de::Error) -> Self {
        AnalysisError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
