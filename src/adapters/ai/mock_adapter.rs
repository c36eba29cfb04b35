//! Mock AI adapter for running without an API key.
//!
//! Returns canned, condition-driven responses. Simulates network latency
//! with a configurable delay.

use crate::domain::{
    ComponentBreakdown, Device, DeviceAnalysis, DeviceStatus, DomainError, Recommendation,
};
use crate::ports::{AdvisorPort, AnalysisPort};
use chrono::Datelike;
use std::time::Duration;
use tracing::info;

pub struct MockAiAdapter {
    /// Simulated network delay in milliseconds.
    delay_ms: u64,
}

impl MockAiAdapter {
    /// Create a new mock adapter with default delay (100ms).
    pub fn new() -> Self {
        Self { delay_ms: 100 }
    }

    /// Create a mock adapter with custom delay.
    pub fn with_delay(delay_ms: u64) -> Self {
        Self { delay_ms }
    }

    fn mock_analysis(device: &Device, current_year: i32) -> DeviceAnalysis {
        let age = device.age_in_years(current_year);
        let (recommendation, base_score, stage) = match device.status {
            DeviceStatus::Working => (Recommendation::Resell, 80_i32, "Prime"),
            DeviceStatus::MinorIssues => (Recommendation::Repair, 70, "Mature"),
            DeviceStatus::MajorDamage => (Recommendation::Repair, 45, "Mature"),
            DeviceStatus::Dead => (Recommendation::Recycle, 20, "End-of-life"),
        };
        let score = base_score.saturating_sub(age.saturating_mul(3)).clamp(5, 100) as u8;

        let steps = match recommendation {
            Recommendation::Repair => vec![
                "[MOCK] Book a doorstep repair through Urban Company".to_string(),
                "[MOCK] Ask for genuine spare parts and a service warranty".to_string(),
            ],
            Recommendation::Resell => vec![
                "[MOCK] Get an instant quote on Cashify".to_string(),
                "[MOCK] Wipe personal data before listing on OLX".to_string(),
            ],
            Recommendation::Recycle => vec![
                "[MOCK] Drop off at a Karo Sambhav collection point".to_string(),
                "[MOCK] Schedule a pickup with Namo e-waste".to_string(),
            ],
        };

        DeviceAnalysis {
            sustainability_score: score,
            recommendation,
            lifecycle_stage: stage.to_string(),
            breakdown: ComponentBreakdown {
                repairable: vec!["Screen".to_string(), "Charging Port".to_string()],
                recyclable: vec![
                    "Gold".to_string(),
                    "Copper".to_string(),
                    "Plastic".to_string(),
                ],
                hazardous: vec!["Lithium-ion battery".to_string(), "Lead".to_string()],
            },
            india_specific_steps: steps,
            educational_insight: format!(
                "[MOCK] A {} year old {} still holds recoverable metals; \
                 only CPCB-authorized recyclers should handle it at end of life.",
                age,
                device.category.label()
            ),
        }
    }
}

impl Default for MockAiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl AnalysisPort for MockAiAdapter {
    async fn analyze_device(&self, device: &Device) -> Result<DeviceAnalysis, DomainError> {
        info!(device_id = %device.id, name = %device.name, "[MOCK] Simulating device analysis");

        tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;

        Ok(Self::mock_analysis(device, chrono::Local::now().year()))
    }
}

#[async_trait::async_trait]
impl AdvisorPort for MockAiAdapter {
    async fn quick_advice(&self, query: &str) -> String {
        info!(query_len = query.len(), "[MOCK] Simulating advisory reply");

        tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;

        let lower = query.to_lowercase();
        if lower.contains("battery") || lower.contains("batteries") {
            "[MOCK] 🔋 Never bin lithium-ion batteries. Hand them to a CPCB-authorized recycler \
             or a brand take-back point."
                .to_string()
        } else if lower.contains("epr") || lower.contains("rule") {
            "[MOCK] 📜 Under the E-Waste Management Rules 2022, producers carry Extended \
             Producer Responsibility for collecting and recycling their products."
                .to_string()
        } else {
            "[MOCK] ♻️ Repair first, resell next, recycle last. Set REVIBE_AI_API_KEY for \
             real answers."
                .to_string()
        }
    }
}
