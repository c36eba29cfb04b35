//! Core domain layer. No external I/O dependencies.
//!
//! Entities and business rules live here. Dependencies flow inward.

pub mod entities;
pub mod errors;

pub use entities::{
    ComponentBreakdown, Device, DeviceAnalysis, DeviceCategory, DeviceStatus, FALLBACK_DEVICE_NAME,
    NewDevice, Recommendation, SCORE_PER_ANALYSIS, User, UserStats, seed_devices,
};
pub use errors::{ANALYSIS_FAILURE_NOTICE, DomainError};
