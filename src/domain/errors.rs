//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

/// Notice shown to the user when an analysis request fails.
pub const ANALYSIS_FAILURE_NOTICE: &str = "Failed to analyze device. Please check your API key.";

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Storage error: {0}")]
    Store(String),

    #[error("AI request failed: {0}")]
    Ai(String),

    /// The AI replied, but the payload does not satisfy the analysis schema.
    #[error("Invalid analysis payload: {0}")]
    InvalidAnalysis(String),

    /// Surfaced to the user; the device stays unanalyzed.
    #[error("{notice} ({0})", notice = ANALYSIS_FAILURE_NOTICE)]
    AnalysisFailed(String),

    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("No registered user; register first")]
    NotRegistered,

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("UI error: {0}")]
    Ui(String),
}
