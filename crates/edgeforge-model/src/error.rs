//! Error types for tabular ingestion and export.

/// Errors raised while reading or writing edge-list files.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// Underlying I/O failure
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed tabular data
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Header is missing a required column
    #[error("missing column: {0}")]
    MissingColumn(&'static str),

    /// No valid interaction rows survived ingestion
    #[error("dataset contains no valid interaction rows")]
    Empty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_lowercase_and_specific() {
        let err = DatasetError::MissingColumn("type");
        assert_eq!(err.to_string(), "missing column: type");
        assert!(DatasetError::Empty.to_string().contains("no valid"));
    }
}
