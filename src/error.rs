#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The ingestion boundary dropped every row, so there is nothing to
    /// analyze. Recoverable: the host keeps whatever it was showing before.
    #[error("no valid records after ingestion")]
    NoValidRecords,

    /// The active filters eliminated every record. Recoverable: the host
    /// decides whether to keep or clear its previous derived results.
    #[error("no records left after filtering")]
    EmptyFilteredSet,
}

pub type Result<T> = std::result::Result<T, ReportError>;
