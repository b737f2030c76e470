// Core modules
pub mod core;
pub mod storage;
pub mod cli;
pub mod common;

// Re-export commonly used types
pub use crate::common::{AnalyzerError, Config, DevMode, MeasureError, Result};
pub use crate::core::{Comparison, Dtype, Measurement, Measurer, BASELINE_DTYPE};
pub use crate::storage::{ErrorLog, ErrorRecord, LogClock};
pub use crate::cli::{Exit, Session};
