//! Per-hectare dose rates and status scaling.

use std::fmt;

use serde::Serialize;

use crate::pricing::alias::{canonical_name, is_sentinel};

const LOW_STATUS_DELTA: f64 = 0.25;
const HIGH_STATUS_DELTA: f64 = -0.20;

/// Nutrient family a material is dosed and explained as.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialClass {
    Nitrogen,
    Phosphorus,
    Potassium,
    Organic,
    Other,
}

impl MaterialClass {
    pub fn of(material: &str) -> Self {
        let Some(canonical) = canonical_name(material) else {
            return Self::Other;
        };
        match canonical.to_lowercase().as_str() {
            "urea" | "calcium ammonium nitrate" | "ammonium sulphate" => Self::Nitrogen,
            "dap" => Self::Phosphorus,
            "mop" | "sop" => Self::Potassium,
            "vermicompost" | "neem cake" | "bone meal" | "compost" | "poultry manure"
            | "wood ash" => Self::Organic,
            _ => Self::Other,
        }
    }
}

/// Soil nutrient status as predicted by the model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NutrientStatus {
    Low,
    High,
    Optimal,
    Unknown,
}

impl NutrientStatus {
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|status| status.trim().to_lowercase()).as_deref() {
            Some("low") => Self::Low,
            Some("high") => Self::High,
            Some("optimal") => Self::Optimal,
            _ => Self::Unknown,
        }
    }

    /// Fractional adjustment of the base rate.
    pub fn delta(self) -> f64 {
        match self {
            Self::Low => LOW_STATUS_DELTA,
            Self::High => HIGH_STATUS_DELTA,
            Self::Optimal | Self::Unknown => 0.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::High => "high",
            Self::Optimal => "optimal",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for NutrientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delta for a raw status string: low +25%, high -20%, anything else 0.
pub fn status_delta(status: Option<&str>) -> f64 {
    NutrientStatus::parse(status).delta()
}

/// Base application rate in kg per hectare.
pub fn base_rate_kg_per_ha(material: &str) -> f64 {
    let canonical = canonical_name(material).unwrap_or_default().to_lowercase();
    match canonical.as_str() {
        "urea" | "calcium ammonium nitrate" | "ammonium sulphate" => 100.0,
        "mop" | "sop" => 60.0,
        "dap" => 80.0,
        "vermicompost" => 200.0,
        "neem cake" => 40.0,
        "bone meal" => 30.0,
        "compost" => 400.0,
        "poultry manure" => 150.0,
        "wood ash" => 60.0,
        _ => 60.0,
    }
}

/// Whole kilograms of `material` for a field, after status scaling.
pub fn amount_kg(material: &str, field_size_ha: f64, status_delta: f64) -> u64 {
    if is_sentinel(material) || !field_size_ha.is_finite() || field_size_ha < 0.0 {
        return 0;
    }
    let delta = if status_delta.is_finite() { status_delta } else { 0.0 };
    let per_ha = (base_rate_kg_per_ha(material) * (1.0 + delta)).max(0.0);
    let amount = (per_ha * field_size_ha).round_ties_even();
    if amount.is_finite() && amount > 0.0 {
        amount as u64
    } else {
        0
    }
}
