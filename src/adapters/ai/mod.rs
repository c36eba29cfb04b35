//! AI adapter module. Implements AnalysisPort and AdvisorPort.
//!
//! Provides the Gemini adapter and a mock adapter for running offline.

pub mod gemini_adapter;
pub mod mock_adapter;
pub mod payload;
pub mod prompts;

pub use gemini_adapter::GeminiAdapter;
pub use mock_adapter::MockAiAdapter;
pub use payload::{parse_analysis, sanitize_json};
