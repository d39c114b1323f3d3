//! Farmer-facing text: reasons, application hints and timing guidance.

use chrono::NaiveDate;

use crate::domain::report::ApplicationTiming;
use crate::dosage::{MaterialClass, NutrientStatus};
use crate::pricing::alias::canonical_name;

/// Which slot of the report a material fills.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    Primary,
    Secondary,
}

impl Slot {
    fn role(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
        }
    }
}

/// Nutrient a status refers to, for wording only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Nutrient {
    Nitrogen,
    Phosphorus,
    Potassium,
}

impl Nutrient {
    pub fn name(self) -> &'static str {
        match self {
            Self::Nitrogen => "Nitrogen",
            Self::Phosphorus => "Phosphorus",
            Self::Potassium => "Potassium",
        }
    }
}

pub fn reason(material: &str, slot: Slot, governing: Option<(Nutrient, NutrientStatus)>) -> String {
    let status = match governing {
        Some((nutrient, status)) if status != NutrientStatus::Unknown => format!(
            "Model detected {} {} levels, ",
            status.as_str(),
            nutrient.name().to_lowercase()
        ),
        _ => String::new(),
    };
    let specific = match MaterialClass::of(material) {
        MaterialClass::Nitrogen => {
            "Provides essential nitrogen for vegetative growth and protein synthesis."
        }
        MaterialClass::Phosphorus => {
            "Supplies both nitrogen and phosphorus for root development and early growth."
        }
        MaterialClass::Potassium => {
            "Enhances fruit quality, disease resistance, and water use efficiency."
        }
        MaterialClass::Organic | MaterialClass::Other => {
            "Provides balanced nutrition according to soil test recommendations."
        }
    };
    let lead = if status.is_empty() { "Selected" } else { "selected" };
    format!(
        "{status}{lead} as {} fertilizer based on soil analysis and crop requirements. {specific}",
        slot.role()
    )
}

pub fn method_hint(material: &str) -> &'static str {
    let canonical = canonical_name(material).unwrap_or_default().to_lowercase();
    match canonical.as_str() {
        "urea" | "calcium ammonium nitrate" | "ammonium sulphate" => {
            "Apply 2–3 split doses as top-dressing during vegetative growth."
        }
        "mop" | "sop" => {
            "Broadcast or band place; avoid waterlogging; apply around fruiting stage for quality."
        }
        "dap" => {
            "Apply at basal dose during sowing/land prep; keep seeds away from direct contact."
        }
        "vermicompost" | "compost" | "poultry manure" => {
            "Incorporate into topsoil 2–3 weeks before sowing for mineralization."
        }
        "neem cake" => {
            "Mix into soil at land preparation; slow-release nitrogen + pest deterrence."
        }
        "bone meal" => "Use as basal before sowing/transplanting; phosphorus source.",
        "wood ash" => "Apply lightly; provides K and raises pH; avoid overuse on alkaline soils.",
        _ => "Follow label guidance and local agronomy recommendations.",
    }
}

/// First sentence of the method hint, used as the organic block reason.
pub fn short_hint(material: &str) -> String {
    let hint = method_hint(material);
    hint.split('.').next().unwrap_or(hint).to_string()
}

pub const ORGANIC_TIMING: &str = "Apply near land preparation or as basal before sowing.";

/// Timing guidance, anchored to the sowing date when it is an ISO date.
pub fn application_timing(sowing_date: Option<&str>) -> ApplicationTiming {
    match sowing_date.and_then(|raw| NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()) {
        Some(date) => ApplicationTiming {
            primary: format!(
                "Give main fertilizer before {date} and again in 2–3 small doses as crop grows."
            ),
            secondary: format!(
                "Use during flowering or fruiting stage after {date} when the crop needs extra boost."
            ),
            organics: format!("Mix into soil 2–3 weeks before {date} so it breaks down in time."),
        },
        None => ApplicationTiming {
            primary: "Give main fertilizer before sowing and again in 2–3 small doses as crop grows."
                .to_string(),
            secondary: "Use during flowering or fruiting stage when the crop needs extra boost."
                .to_string(),
            organics: "Mix into soil 2–3 weeks before sowing so it breaks down in time.".to_string(),
        },
    }
}

/// NPK grade shown next to the predicted material.
pub fn npk_grade(material: &str) -> &'static str {
    match canonical_name(material).as_deref() {
        Some("Urea") => "46-0-0",
        Some("DAP") => "18-46-0",
        Some("MOP") => "0-0-60",
        Some("SOP") => "0-0-50",
        Some("Ammonium Sulphate") => "21-0-0",
        Some("Calcium Ammonium Nitrate") => "26-0-0",
        Some("Vermicompost" | "Compost" | "Poultry manure") => "NPK varies",
        Some("Neem cake") => "NPK varies (~5-1-1)",
        Some("Bone meal") => "NPK varies (~3-15-0)",
        Some("Wood Ash") => "K-rich",
        _ => "—",
    }
}

/// True when a predicted pH amendment asks for action.
pub fn needs_ph_amendment(amendment: Option<&str>) -> bool {
    amendment
        .map(|value| value.trim().to_lowercase())
        .is_some_and(|value| !matches!(value.as_str(), "" | "none" | "na" | "optimal"))
}

pub fn soil_recommendations(amendment: Option<&str>, deficiencies: &[String]) -> Vec<String> {
    let mut recommendations = vec![
        match amendment.filter(|_| needs_ph_amendment(amendment)) {
            Some(amendment) => format!("Apply pH amendment: {}", amendment.trim()),
            None => "Maintain current pH levels".to_string(),
        },
        "Maintain current moisture levels".to_string(),
    ];
    if !deficiencies.is_empty() {
        recommendations.push(format!("Address {} deficiency", deficiencies.join(", ")));
    }
    recommendations.push("Regular soil testing every 6 months is recommended".to_string());
    recommendations.push("Consider crop rotation to maintain soil health".to_string());
    recommendations
}
