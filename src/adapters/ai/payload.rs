//! Parsing and validation of the structured analysis reply.
//!
//! The score must be a finite number in [0, 100] and the recommendation one of
//! the three known actions. Anything else is rejected instead of stored.

use crate::domain::{ComponentBreakdown, DeviceAnalysis, DomainError, Recommendation};
use serde::Deserialize;
use tracing::warn;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireAnalysis {
    sustainability_score: f64,
    recommendation: String,
    lifecycle_stage: String,
    breakdown: WireBreakdown,
    india_specific_steps: Vec<String>,
    educational_insight: String,
}

#[derive(Deserialize)]
struct WireBreakdown {
    repairable: Vec<String>,
    recyclable: Vec<String>,
    hazardous: Vec<String>,
}

/// Strip markdown fences or surrounding prose around a JSON object.
pub fn sanitize_json(raw_text: &str) -> String {
    let trimmed = raw_text.trim();

    if let Some(rest) = trimmed.strip_prefix("```") {
        let body = rest.strip_prefix("json").unwrap_or(rest);
        let body = match body.rfind("```") {
            Some(end) => &body[..end],
            None => body,
        };
        return body.trim().to_string();
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            return trimmed[start..=end].to_string();
        }
    }

    trimmed.to_string()
}

fn parse_recommendation(raw: &str) -> Result<Recommendation, DomainError> {
    match raw.trim() {
        "Repair" => Ok(Recommendation::Repair),
        "Resell" => Ok(Recommendation::Resell),
        "Recycle" => Ok(Recommendation::Recycle),
        other => Err(DomainError::InvalidAnalysis(format!(
            "unknown recommendation {:?}",
            other
        ))),
    }
}

fn parse_score(raw: f64) -> Result<u8, DomainError> {
    if !raw.is_finite() || !(0.0..=100.0).contains(&raw) {
        return Err(DomainError::InvalidAnalysis(format!(
            "sustainability score {} outside 0..=100",
            raw
        )));
    }
    Ok(raw.round() as u8)
}

/// Parse the model's reply text into a validated [`DeviceAnalysis`].
pub fn parse_analysis(raw_text: &str) -> Result<DeviceAnalysis, DomainError> {
    let clean_json = sanitize_json(raw_text);
    let wire: WireAnalysis = serde_json::from_str(&clean_json).map_err(|e| {
        warn!(error = %e, json = %clean_json.chars().take(200).collect::<String>(), "analysis JSON parse failed");
        DomainError::InvalidAnalysis(format!("failed to parse analysis JSON: {}", e))
    })?;

    Ok(DeviceAnalysis {
        sustainability_score: parse_score(wire.sustainability_score)?,
        recommendation: parse_recommendation(&wire.recommendation)?,
        lifecycle_stage: wire.lifecycle_stage,
        breakdown: ComponentBreakdown {
            repairable: wire.breakdown.repairable,
            recyclable: wire.breakdown.recyclable,
            hazardous: wire.breakdown.hazardous,
        },
        india_specific_steps: wire.india_specific_steps,
        educational_insight: wire.educational_insight,
    })
}
