//! Application use cases. Orchestrate domain logic via ports.

pub mod advisory_chat;
pub mod app_controller;

pub use advisory_chat::{ChatMessage, ChatRole, ChatSession};
pub use app_controller::{AnalysisOutcome, AppController, ImpactSummary, Session, Tab};
