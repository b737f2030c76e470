use thiserror::Error;

#[derive(Error, Debug)]
pub enum MeasureError {
    #[error("Array of {elements} elements needs {requested} bytes, above the {limit} byte limit")]
    AllocationTooLarge {
        elements: usize,
        requested: u128,
        limit: u64,
    },

    #[error("Failed to reserve {bytes} bytes for the array")]
    AllocationFailed { bytes: u128 },
}

impl MeasureError {
    pub fn kind(&self) -> &'static str {
        match self {
            MeasureError::AllocationTooLarge { .. } => "AllocationTooLarge",
            MeasureError::AllocationFailed { .. } => "AllocationFailed",
        }
    }
}

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("Measurement error: {0}")]
    Measure(#[from] MeasureError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl AnalyzerError {
    /// Name stored in the `kind` field of an error log record.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalyzerError::Measure(e) => e.kind(),
            AnalyzerError::Config(_) => "Config",
            AnalyzerError::Io(_) => "Io",
            AnalyzerError::Json(_) => "Json",
            AnalyzerError::Other(_) => "Other",
        }
    }

    /// Recoverable errors are recorded and the session keeps going.
    /// Everything else ends the session.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AnalyzerError::Measure(_))
    }

    /// Message without the variant prefix added by `Display`.
    pub fn detail(&self) -> String {
        match self {
            AnalyzerError::Measure(e) => e.to_string(),
            AnalyzerError::Config(msg) => msg.clone(),
            AnalyzerError::Io(e) => e.to_string(),
            AnalyzerError::Json(e) => e.to_string(),
            AnalyzerError::Other(e) => e.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;
