//! Infrastructure adapters. Implement outbound ports.
//!
//! Generative AI, snapshot storage, terminal UI. Map errors to DomainError.

pub mod ai;
pub mod persistence;
pub mod ui;
