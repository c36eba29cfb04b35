//! Prompt text and response schema sent to the generative model.

use crate::domain::Device;
use serde_json::{Value, json};

/// System instruction for the advisory chat.
pub const ADVISOR_PERSONA: &str = "You are ReVibe, an AI-powered e-waste advisor for India. \
Keep answers concise, helpful, and focused on Indian e-waste rules and sustainability. Use emojis.";

/// Chat reply when the model returns no text.
pub const EMPTY_REPLY_FALLBACK: &str = "I'm sorry, I couldn't process that request right now.";

/// Chat reply when the request fails outright.
pub const FAILURE_REPLY_FALLBACK: &str = "Something went wrong. Let's try again later.";

/// Build the analysis prompt for `device`. Age is measured against `current_year`.
pub fn analysis_prompt(device: &Device, current_year: i32) -> String {
    format!(
        r#"As ReVibe (Senior Sustainability Consultant for India), analyze this device:
- Name: {brand} {model}
- Category: {category}
- Age: {age} years
- Current Condition: {status}

Prioritize Circular Economy (Repair > Resell > Recycle).
Consider India's E-Waste Management Rules 2022 and available infrastructure in India (Urban Company, Cashify, Karo Sambhav, Namo e-waste).

Provide a detailed breakdown of:
- Recyclable parts (Gold, Copper, Plastic, etc.)
- Hazardous parts (Lead, Mercury, Lithium-ion battery, etc.)
- Repairable modules (Screen, Charging Port, etc.)

Keep the tone encouraging and non-judgmental."#,
        brand = device.brand,
        model = device.model,
        category = device.category,
        age = device.age_in_years(current_year),
        status = device.status,
    )
}

fn string_list() -> Value {
    json!({ "type": "ARRAY", "items": { "type": "STRING" } })
}

/// Response schema: six required fields; the breakdown requires all three lists.
pub fn analysis_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "sustainabilityScore": {
                "type": "NUMBER",
                "description": "A score from 0 to 100 based on repairability, age, and market demand in India."
            },
            "recommendation": {
                "type": "STRING",
                "description": "One of 'Repair', 'Resell', or 'Recycle' based on circular economy priorities."
            },
            "lifecycleStage": {
                "type": "STRING",
                "description": "Identification of where the device stands (e.g., Prime, Mature, End-of-life)."
            },
            "breakdown": {
                "type": "OBJECT",
                "properties": {
                    "recyclable": string_list(),
                    "hazardous": string_list(),
                    "repairable": string_list()
                },
                "required": ["recyclable", "hazardous", "repairable"]
            },
            "indiaSpecificSteps": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "List of actionable next steps like specific platforms (Cashify, OLX, Karo Sambhav, etc)."
            },
            "educationalInsight": {
                "type": "STRING",
                "description": "Short educational note about the components or disposal impacts."
            }
        },
        "required": [
            "sustainabilityScore",
            "recommendation",
            "lifecycleStage",
            "breakdown",
            "indiaSpecificSteps",
            "educationalInsight"
        ]
    })
}
