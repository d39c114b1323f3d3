use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::feature::FeatureVector;
use super::target::Target;

/// Measurements and field geometry for one recommendation request.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldInputs {
    pub features: FeatureVector,
    #[serde(default)]
    pub sowing_date: Option<String>,
    #[serde(default)]
    pub field_size: Option<f64>,
    #[serde(default)]
    pub field_unit: Option<String>,
    /// Soil bulk density in g/cm3.
    #[serde(default)]
    pub bulk_density: Option<f64>,
    /// Soil sampling depth in cm.
    #[serde(default)]
    pub sampling_depth: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecommendationReport {
    pub ml_model_prediction: PredictionSummary,
    pub soil_condition: SoilCondition,
    pub primary_fertilizer: DosageBlock,
    pub secondary_fertilizer: DosageBlock,
    pub organic_alternatives: Vec<OrganicBlock>,
    pub application_timing: ApplicationTiming,
    pub cost_estimate: CostEstimate,
    #[serde(rename = "_meta")]
    pub meta: ReportMeta,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionSummary {
    pub name: String,
    pub confidence_percent: Option<u32>,
    pub npk: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SoilCondition {
    pub ph_status: String,
    pub moisture_status: String,
    pub nutrient_deficiencies: Vec<String>,
    pub recommendations: Vec<String>,
    pub soil_test_values: SoilTestValues,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SoilTestValues {
    pub units_input: String,
    pub units_converted: String,
    pub bulk_density_g_cm3: f64,
    pub sampling_depth_cm: f64,
    #[serde(rename = "N")]
    pub nitrogen: NutrientReading,
    #[serde(rename = "P")]
    pub phosphorus: NutrientReading,
    #[serde(rename = "K")]
    pub potassium: NutrientReading,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NutrientReading {
    pub mg_per_kg: f64,
    pub kg_per_ha: f64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DosageBlock {
    pub name: String,
    pub amount_kg: u64,
    pub reason: String,
    pub application_method: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganicBlock {
    pub name: String,
    pub amount_kg: u64,
    pub reason: String,
    pub timing: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationTiming {
    pub primary: String,
    pub secondary: String,
    pub organics: String,
}

/// Costs per category. All four amounts are always present and
/// `total == primary + secondary + organics`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostEstimate {
    pub primary: Decimal,
    pub secondary: Decimal,
    pub organics: Decimal,
    pub total: Decimal,
    pub formatted: FormattedCosts,
    pub notes: String,
    pub breakdown: CostBreakdown,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedCosts {
    pub primary: String,
    pub secondary: String,
    pub organics: String,
    pub total: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub primary_details: MaterialCostDetail,
    pub secondary_details: MaterialCostDetail,
    pub organics_details: OrganicsCostDetail,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialCostDetail {
    pub fertilizer: String,
    pub amount_kg: u64,
    pub price_per_kg: String,
    pub cost: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganicsCostDetail {
    pub options_count: usize,
    pub total_amount_kg: u64,
    pub cost: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReportMeta {
    pub report_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub inputs: FieldInputs,
    pub predictions: BTreeMap<Target, String>,
    pub confidences: BTreeMap<Target, f64>,
    pub region: Option<String>,
    pub currency: String,
    pub price_source: String,
}
