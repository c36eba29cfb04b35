//! Plain-text renderings of the dashboard, device list, analysis detail and
//! rules page. No terminal I/O here.

use crate::domain::{Device, DeviceAnalysis, User};
use crate::usecases::ImpactSummary;
use std::fmt::Write;

/// Cities offered on the registration screen.
pub const REGISTRATION_CITIES: [&str; 10] = [
    "Bangalore",
    "Mumbai",
    "Delhi NCR",
    "Chennai",
    "Hyderabad",
    "Kolkata",
    "Pune",
    "Ahmedabad",
    "Jaipur",
    "Lucknow",
];

/// Key points of India's E-Waste Management Rules, 2022: (title, body).
pub const RULES: [(&str, &str); 4] = [
    (
        "Extended Producer Responsibility (EPR)",
        "Producers, importers, and brand owners are legally responsible for the end-of-life collection and recycling of their products in India.",
    ),
    (
        "Categorization of E-Waste",
        "The new rules cover a wider range of items including Solar PV modules, tablets, smartphones, and many other IoT devices.",
    ),
    (
        "Recycling Targets",
        "Compulsory recycling targets have been set for manufacturers, increasing annually to ensure minimal leakage into landfills.",
    ),
    (
        "Authorized Recyclers Only",
        "It is illegal to sell or give e-waste to unorganized 'Kabadiwalas' who use toxic smelting methods. Only CPCB-authorized recyclers should handle e-waste.",
    ),
];

pub const RULES_FOOTNOTE: &str = "ReVibe helps you comply with these rules by guiding you to authorized collection points and verified resale platforms like Cashify and Attero.";

const SCORE_BAR_WIDTH: usize = 20;

/// Illustrative weekly CO2 figures (kg). The current week is the user's total.
const CO2_EARLIER_WEEKS: [(&str, f64); 3] = [("Week 1", 12.0), ("Week 2", 18.0), ("Week 3", 45.0)];

/// Illustrative disposal mix. Not derived from the device ledger.
const DISPOSAL_STRATEGY: [(&str, u32); 3] = [("Repaired", 4), ("Resold", 3), ("Recycled", 2)];

const CHART_WIDTH: usize = 30;

fn score_bar(score: u8) -> String {
    let filled = (usize::from(score.min(100)) * SCORE_BAR_WIDTH).div_ceil(100);
    format!(
        "[{}{}]",
        "#".repeat(filled),
        "-".repeat(SCORE_BAR_WIDTH - filled)
    )
}

pub fn render_dashboard(user: &User, summary: &ImpactSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Welcome back, {}", user.name);
    let _ = writeln!(out, "  CO2 Offset:       {} kg", summary.co2_saved);
    let _ = writeln!(out, "  Waste Prevented:  {} kg", summary.e_waste_prevented);
    let _ = writeln!(out, "  ReVibe Score:     {}", summary.score);
    let _ = writeln!(
        out,
        "  Devices Tracked:  {} ({} analyzed)",
        summary.devices_tracked, summary.devices_analyzed
    );

    out.push_str("\nCarbon Footprint Saved (kg CO2e)\n");
    let weeks: Vec<(&str, f64)> = CO2_EARLIER_WEEKS
        .iter()
        .copied()
        .chain(std::iter::once(("Week 4", summary.co2_saved)))
        .collect();
    let peak = weeks.iter().map(|(_, v)| *v).fold(1.0_f64, f64::max);
    for (label, value) in &weeks {
        let len = ((value.max(0.0) / peak) * CHART_WIDTH as f64).round() as usize;
        let _ = writeln!(out, "  {:<7} {} {}", label, "█".repeat(len), value);
    }

    out.push_str("\nDevice Disposal Strategy\n");
    for (label, count) in DISPOSAL_STRATEGY {
        let _ = writeln!(out, "  {:<9} {}", label, count);
    }
    out
}

/// One line per device for the device picker.
pub fn render_device_line(device: &Device, analyzing: bool) -> String {
    let state = match (&device.analysis, analyzing) {
        (Some(a), _) => format!("{} {}/100", a.recommendation, a.sustainability_score),
        (None, true) => "Consulting AI...".to_string(),
        (None, false) => "Analyze Lifecycle".to_string(),
    };
    format!(
        "{} · {} · {} · {} · {}",
        device.name,
        device.category.label(),
        device.purchase_year,
        device.status,
        state
    )
}

fn push_list(out: &mut String, title: &str, items: &[String]) {
    let _ = writeln!(out, "{}:", title);
    if items.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for item in items {
        let _ = writeln!(out, "  - {}", item);
    }
}

/// Full report for an analyzed device.
pub fn render_analysis(device: &Device, analysis: &DeviceAnalysis) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {} {} ==", device.brand, device.model);
    let _ = writeln!(
        out,
        "Sustainability score: {}/100 {}",
        analysis.sustainability_score,
        score_bar(analysis.sustainability_score)
    );
    let _ = writeln!(out, "Action recommended: {}", analysis.recommendation);
    let _ = writeln!(out, "Lifecycle stage: {}", analysis.lifecycle_stage);
    out.push('\n');
    push_list(&mut out, "Repairable Modules", &analysis.breakdown.repairable);
    push_list(&mut out, "Recyclable Parts", &analysis.breakdown.recyclable);
    push_list(&mut out, "Hazardous Materials", &analysis.breakdown.hazardous);
    out.push('\n');
    let _ = writeln!(out, "Next steps in India:");
    for (i, step) in analysis.india_specific_steps.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", i + 1, step);
    }
    out.push('\n');
    let _ = writeln!(out, "\"{}\"", analysis.educational_insight);
    out
}

pub fn render_rules() -> String {
    let mut out = String::from("E-Waste Management Rules, 2022\n\n");
    for (i, (title, body)) in RULES.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, title);
        let _ = writeln!(out, "   {}", body);
    }
    out.push('\n');
    out.push_str(RULES_FOOTNOTE);
    out.push('\n');
    out
}
