//! Domain entities. Pure data structures for the core business.
//!
//! Field names serialize in camelCase: the persisted snapshots and the
//! analysis wire payload share this shape.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Display name used when a device is registered without brand or model.
pub const FALLBACK_DEVICE_NAME: &str = "New Device";

/// Points added to the user's score each time an analysis completes.
pub const SCORE_PER_ANALYSIS: u32 = 15;

/// Physical condition reported by the owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DeviceStatus {
    #[default]
    Working,
    #[serde(rename = "Minor Issues")]
    MinorIssues,
    #[serde(rename = "Major Damage")]
    MajorDamage,
    Dead,
}

impl DeviceStatus {
    pub const ALL: [DeviceStatus; 4] = [
        DeviceStatus::Working,
        DeviceStatus::MinorIssues,
        DeviceStatus::MajorDamage,
        DeviceStatus::Dead,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceStatus::Working => "Working",
            DeviceStatus::MinorIssues => "Minor Issues",
            DeviceStatus::MajorDamage => "Major Damage",
            DeviceStatus::Dead => "Dead",
        }
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Device category. Unknown ids are kept verbatim so snapshots round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DeviceCategory {
    #[default]
    Smartphone,
    Laptop,
    Tablet,
    Tv,
    Audio,
    Wearable,
    Camera,
    Other(String),
}

impl DeviceCategory {
    /// The categories offered by the add-device form, in form order.
    pub const KNOWN: [DeviceCategory; 7] = [
        DeviceCategory::Smartphone,
        DeviceCategory::Laptop,
        DeviceCategory::Tablet,
        DeviceCategory::Tv,
        DeviceCategory::Audio,
        DeviceCategory::Wearable,
        DeviceCategory::Camera,
    ];

    pub fn id(&self) -> &str {
        match self {
            DeviceCategory::Smartphone => "smartphone",
            DeviceCategory::Laptop => "laptop",
            DeviceCategory::Tablet => "tablet",
            DeviceCategory::Tv => "tv",
            DeviceCategory::Audio => "audio",
            DeviceCategory::Wearable => "wearable",
            DeviceCategory::Camera => "camera",
            DeviceCategory::Other(raw) => raw,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            DeviceCategory::Smartphone => "Smartphone",
            DeviceCategory::Laptop => "Laptop",
            DeviceCategory::Tablet => "Tablet",
            DeviceCategory::Tv => "Television",
            DeviceCategory::Audio => "Audio Device",
            DeviceCategory::Wearable => "Wearable",
            DeviceCategory::Camera => "Camera",
            DeviceCategory::Other(raw) => raw,
        }
    }
}

impl From<String> for DeviceCategory {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "smartphone" => DeviceCategory::Smartphone,
            "laptop" => DeviceCategory::Laptop,
            "tablet" => DeviceCategory::Tablet,
            "tv" => DeviceCategory::Tv,
            "audio" => DeviceCategory::Audio,
            "wearable" => DeviceCategory::Wearable,
            "camera" => DeviceCategory::Camera,
            _ => DeviceCategory::Other(raw),
        }
    }
}

impl From<&str> for DeviceCategory {
    fn from(raw: &str) -> Self {
        DeviceCategory::from(raw.to_string())
    }
}

impl From<DeviceCategory> for String {
    fn from(category: DeviceCategory) -> Self {
        match category {
            DeviceCategory::Other(raw) => raw,
            known => known.id().to_string(),
        }
    }
}

impl fmt::Display for DeviceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Circular-economy action, in priority order: repair, then resale, then recycling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recommendation {
    Repair,
    Resell,
    Recycle,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Recommendation::Repair => "Repair",
            Recommendation::Resell => "Resell",
            Recommendation::Recycle => "Recycle",
        })
    }
}

/// Component lists. Order is display order only.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ComponentBreakdown {
    pub repairable: Vec<String>,
    pub recyclable: Vec<String>,
    pub hazardous: Vec<String>,
}

/// Sustainability analysis. Attached to a device at most once and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceAnalysis {
    /// 0..=100.
    pub sustainability_score: u8,
    pub recommendation: Recommendation,
    pub lifecycle_stage: String,
    pub breakdown: ComponentBreakdown,
    pub india_specific_steps: Vec<String>,
    pub educational_insight: String,
}

/// A registered device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: String,
    pub name: String,
    pub brand: String,
    pub model: String,
    pub category: DeviceCategory,
    pub purchase_year: i32,
    pub status: DeviceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<DeviceAnalysis>,
}

impl Device {
    /// "brand model" trimmed, or [`FALLBACK_DEVICE_NAME`] when both are blank.
    pub fn display_name(brand: &str, model: &str) -> String {
        let joined = format!("{} {}", brand, model);
        let trimmed = joined.trim();
        if trimmed.is_empty() {
            FALLBACK_DEVICE_NAME.to_string()
        } else {
            trimmed.to_string()
        }
    }

    /// Age in whole years relative to `current_year`. Never negative.
    pub fn age_in_years(&self, current_year: i32) -> i32 {
        current_year.saturating_sub(self.purchase_year).max(0)
    }

    pub fn is_analyzed(&self) -> bool {
        self.analysis.is_some()
    }
}

/// Fields submitted by the add-device form. Missing values get defaults.
#[derive(Debug, Clone, Default)]
pub struct NewDevice {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub category: Option<DeviceCategory>,
    pub purchase_year: Option<i32>,
    pub status: Option<DeviceStatus>,
}

impl NewDevice {
    /// Build a device with the given id. Defaults: smartphone, `current_year`, Working.
    pub fn into_device(self, id: String, current_year: i32) -> Device {
        let brand = self.brand.unwrap_or_default().trim().to_string();
        let model = self.model.unwrap_or_default().trim().to_string();
        Device {
            id,
            name: Device::display_name(&brand, &model),
            brand,
            model,
            category: self.category.unwrap_or_default(),
            purchase_year: self.purchase_year.unwrap_or(current_year),
            status: self.status.unwrap_or_default(),
            analysis: None,
        }
    }
}

/// Impact counters shown on the dashboard. Seeded values, not derived from devices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    /// kg.
    pub co2_saved: f64,
    /// kg.
    pub e_waste_prevented: f64,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    /// Placeholder, never validated.
    pub email: String,
    pub avatar: String,
    pub stats: UserStats,
}

impl Default for User {
    fn default() -> Self {
        Self {
            id: "u1".to_string(),
            name: "Aravind Sharma".to_string(),
            email: "aravind.s@example.com".to_string(),
            avatar: "https://picsum.photos/seed/user123/150/150".to_string(),
            stats: UserStats {
                co2_saved: 124.5,
                e_waste_prevented: 12.8,
                score: 850,
            },
        }
    }
}

/// Devices written on first run when no device snapshot exists.
pub fn seed_devices() -> Vec<Device> {
    vec![
        Device {
            id: "1".to_string(),
            name: "OnePlus 7 Pro".to_string(),
            brand: "OnePlus".to_string(),
            model: "7 Pro".to_string(),
            category: DeviceCategory::Smartphone,
            purchase_year: 2019,
            status: DeviceStatus::Working,
            analysis: None,
        },
        Device {
            id: "2".to_string(),
            name: "Dell XPS 13".to_string(),
            brand: "Dell".to_string(),
            model: "XPS 13".to_string(),
            category: DeviceCategory::Laptop,
            purchase_year: 2018,
            status: DeviceStatus::MajorDamage,
            analysis: None,
        },
    ]
}
