//! Turns a prediction plus field inputs into a priced recommendation report.

pub mod money;
pub mod rationale;
pub mod soil;

use chrono::Utc;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::feature::{NITROGEN, PHOSPHORUS, POTASSIUM};
use crate::domain::prediction::Prediction;
use crate::domain::report::{
    CostBreakdown, CostEstimate, DosageBlock, FieldInputs, FormattedCosts, MaterialCostDetail,
    NutrientReading, OrganicBlock, OrganicsCostDetail, PredictionSummary, RecommendationReport,
    ReportMeta, SoilCondition, SoilTestValues,
};
use crate::domain::target::Target;
use crate::dosage::{amount_kg, MaterialClass, NutrientStatus};
use crate::pricing::alias::is_sentinel;
use crate::pricing::PriceResolver;

use self::money::{format_money, format_unit_price, DEFAULT_CURRENCY};
use self::rationale::{Nutrient, Slot};
use self::soil::{
    effective_field_size, mgkg_to_kg_ha, positive_or, FieldUnit, DEFAULT_BULK_DENSITY_G_CM3,
    DEFAULT_SAMPLING_DEPTH_CM,
};

pub const NO_PRIMARY: &str = "No primary fertilizer recommended";
pub const NO_SECONDARY: &str = "No secondary fertilizer recommended";
pub const DEFAULT_ORGANIC: &str = "Compost (optional)";
const DEFAULT_ORGANIC_PRICED_AS: &str = "Compost";
const PRICE_SOURCE: &str = "live->fallback";

/// Caller-selected presentation options for one report.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReportOptions<'a> {
    pub region: Option<&'a str>,
    pub currency: Option<&'a str>,
}

#[derive(Clone, Debug)]
pub struct RecommendationComposer {
    prices: PriceResolver,
}

struct StatusSignals {
    nitrogen: NutrientStatus,
    phosphorus: NutrientStatus,
    potassium: NutrientStatus,
}

impl StatusSignals {
    fn from_prediction(prediction: &Prediction) -> Self {
        Self {
            nitrogen: NutrientStatus::parse(prediction.label(Target::NStatus)),
            phosphorus: NutrientStatus::parse(prediction.label(Target::PStatus)),
            potassium: NutrientStatus::parse(prediction.label(Target::KStatus)),
        }
    }

    /// Status whose level scales the dose of `material` in `slot`.
    fn governing(&self, material: &str, slot: Slot) -> Option<(Nutrient, NutrientStatus)> {
        if is_sentinel(material) {
            return None;
        }
        match (MaterialClass::of(material), slot) {
            (MaterialClass::Nitrogen, _) | (MaterialClass::Phosphorus, Slot::Primary) => {
                Some((Nutrient::Nitrogen, self.nitrogen))
            }
            (MaterialClass::Phosphorus, Slot::Secondary) => {
                Some((Nutrient::Phosphorus, self.phosphorus))
            }
            (MaterialClass::Potassium, _) => Some((Nutrient::Potassium, self.potassium)),
            _ => None,
        }
    }

    fn deficiencies(&self) -> Vec<String> {
        [
            (Nutrient::Nitrogen, self.nitrogen),
            (Nutrient::Phosphorus, self.phosphorus),
            (Nutrient::Potassium, self.potassium),
        ]
        .into_iter()
        .filter(|(_, status)| *status == NutrientStatus::Low)
        .map(|(nutrient, _)| nutrient.name().to_string())
        .collect()
    }
}

/// A dosed and priced line of the report.
struct PricedItem {
    name: String,
    amount_kg: u64,
    price: Option<Decimal>,
    cost: Decimal,
}

impl RecommendationComposer {
    pub fn new(prices: PriceResolver) -> Self {
        Self { prices }
    }

    pub fn prices(&self) -> &PriceResolver {
        &self.prices
    }

    pub fn compose(
        &self,
        inputs: &FieldInputs,
        prediction: &Prediction,
        options: ReportOptions<'_>,
    ) -> RecommendationReport {
        let book = self.prices.book();
        let currency = options
            .currency
            .map(str::trim)
            .filter(|currency| !currency.is_empty())
            .or(book.currency())
            .unwrap_or(DEFAULT_CURRENCY)
            .to_string();
        let region = options
            .region
            .map(str::trim)
            .filter(|region| !region.is_empty())
            .or(book.region())
            .map(str::to_string);

        let field_size = effective_field_size(inputs.field_size);
        let field_unit = FieldUnit::parse(inputs.field_unit.as_deref());
        let field_ha = field_unit.to_hectares(field_size);
        let statuses = StatusSignals::from_prediction(prediction);

        let primary_name = prediction.label(Target::PrimaryFertilizer);
        let secondary_name = prediction.label(Target::SecondaryFertilizer);

        let price_region = region.as_deref();
        let primary = primary_name.map(|name| {
            let governing = statuses.governing(name, Slot::Primary);
            self.priced_dose(name, name, field_ha, governing, price_region)
        });
        let secondary = secondary_name.map(|name| {
            let governing = statuses.governing(name, Slot::Secondary);
            self.priced_dose(name, name, field_ha, governing, price_region)
        });

        let predicted_organics: Vec<&str> =
            Target::ORGANICS.iter().filter_map(|target| prediction.label(*target)).collect();
        let synthesized_organic = predicted_organics.is_empty();
        let organics: Vec<PricedItem> = if synthesized_organic {
            vec![self.priced_dose(
                DEFAULT_ORGANIC,
                DEFAULT_ORGANIC_PRICED_AS,
                field_ha,
                None,
                price_region,
            )]
        } else {
            predicted_organics
                .iter()
                .map(|name| self.priced_dose(name, name, field_ha, None, price_region))
                .collect()
        };

        let primary_cost = primary.as_ref().map_or(Decimal::ZERO, |item| item.cost);
        let secondary_cost = secondary.as_ref().map_or(Decimal::ZERO, |item| item.cost);
        let organics_cost = organics
            .iter()
            .try_fold(Decimal::ZERO, |sum, item| sum.checked_add(item.cost))
            .unwrap_or_else(|| cost_overflow("organics", Decimal::ZERO));
        let (primary_cost, secondary_cost, organics_cost, total) =
            checked_total(primary_cost, secondary_cost, organics_cost);

        let primary_block = match (&primary, primary_name) {
            (Some(item), Some(name)) => DosageBlock {
                name: item.name.clone(),
                amount_kg: item.amount_kg,
                reason: rationale::reason(
                    name,
                    Slot::Primary,
                    statuses.governing(name, Slot::Primary),
                ),
                application_method: rationale::method_hint(name).to_string(),
            },
            _ => DosageBlock {
                name: NO_PRIMARY.to_string(),
                amount_kg: 0,
                reason: "Based on soil analysis, current nutrient levels appear sufficient for \
                         primary fertilization."
                    .to_string(),
                application_method: "—".to_string(),
            },
        };
        let secondary_block = match (&secondary, secondary_name) {
            (Some(item), Some(name)) => DosageBlock {
                name: item.name.clone(),
                amount_kg: item.amount_kg,
                reason: rationale::reason(
                    name,
                    Slot::Secondary,
                    statuses.governing(name, Slot::Secondary),
                ),
                application_method: rationale::method_hint(name).to_string(),
            },
            _ => DosageBlock {
                name: NO_SECONDARY.to_string(),
                amount_kg: 0,
                reason: "Soil nutrient levels indicate no additional secondary fertilization \
                         needed at this time."
                    .to_string(),
                application_method: "—".to_string(),
            },
        };

        let organic_blocks: Vec<OrganicBlock> = organics
            .iter()
            .map(|item| {
                if synthesized_organic {
                    OrganicBlock {
                        name: item.name.clone(),
                        amount_kg: item.amount_kg,
                        reason: "General soil health improvement".to_string(),
                        timing: "Apply as needed for long-term soil health benefits.".to_string(),
                    }
                } else {
                    OrganicBlock {
                        name: item.name.clone(),
                        amount_kg: item.amount_kg,
                        reason: rationale::short_hint(&item.name),
                        timing: rationale::ORGANIC_TIMING.to_string(),
                    }
                }
            })
            .collect();

        let deficiencies = statuses.deficiencies();
        let ph_amendment = prediction.label(Target::PhAmendment);
        let soil_condition = SoilCondition {
            ph_status: if rationale::needs_ph_amendment(ph_amendment) {
                "Needs amendment".to_string()
            } else {
                "Optimal".to_string()
            },
            moisture_status: "Optimal".to_string(),
            recommendations: rationale::soil_recommendations(ph_amendment, &deficiencies),
            nutrient_deficiencies: deficiencies,
            soil_test_values: soil_test_values(inputs),
        };

        let notes = format!(
            "For {field_size} {field_unit}{}. Prices fetched from live provider when available; \
             fallback to local rate table. All three categories (Primary, Secondary, Organic) are \
             always included for complete cost analysis.",
            region.as_deref().map(|region| format!(" in {region}")).unwrap_or_default()
        );

        let cost_estimate = CostEstimate {
            primary: primary_cost,
            secondary: secondary_cost,
            organics: organics_cost,
            total,
            formatted: FormattedCosts {
                primary: format_money(Some(primary_cost), &currency),
                secondary: format_money(Some(secondary_cost), &currency),
                organics: format_money(Some(organics_cost), &currency),
                total: format_money(Some(total), &currency),
            },
            notes,
            breakdown: CostBreakdown {
                primary_details: cost_detail(
                    &primary_block,
                    primary.as_ref(),
                    primary_cost,
                    &currency,
                ),
                secondary_details: cost_detail(
                    &secondary_block,
                    secondary.as_ref(),
                    secondary_cost,
                    &currency,
                ),
                organics_details: OrganicsCostDetail {
                    options_count: organic_blocks.len(),
                    total_amount_kg: organic_blocks.iter().map(|block| block.amount_kg).sum(),
                    cost: format_money(Some(organics_cost), &currency),
                },
            },
        };

        let summary = PredictionSummary {
            name: primary_block.name.clone(),
            confidence_percent: confidence_percent(prediction),
            npk: primary_name
                .map(|name| format!("NPK: {}", rationale::npk_grade(name)))
                .unwrap_or_else(|| "—".to_string()),
        };

        let report = RecommendationReport {
            ml_model_prediction: summary,
            soil_condition,
            primary_fertilizer: primary_block,
            secondary_fertilizer: secondary_block,
            organic_alternatives: organic_blocks,
            application_timing: rationale::application_timing(inputs.sowing_date.as_deref()),
            cost_estimate,
            meta: ReportMeta {
                report_id: Uuid::new_v4(),
                generated_at: Utc::now(),
                inputs: inputs.clone(),
                predictions: prediction.labels.clone(),
                confidences: prediction.confidences.clone(),
                region,
                currency,
                price_source: PRICE_SOURCE.to_string(),
            },
        };

        info!(
            event_name = "recommendation.composed",
            report_id = %report.meta.report_id,
            primary = %report.primary_fertilizer.name,
            secondary = %report.secondary_fertilizer.name,
            organics = report.organic_alternatives.len(),
            total_cost = %report.cost_estimate.total,
            "recommendation report composed"
        );

        report
    }

    fn priced_dose(
        &self,
        display_name: &str,
        priced_as: &str,
        field_ha: f64,
        governing: Option<(Nutrient, NutrientStatus)>,
        region: Option<&str>,
    ) -> PricedItem {
        let delta = governing.map_or(0.0, |(_, status)| status.delta());
        let amount = amount_kg(priced_as, field_ha, delta);
        let price = self.prices.price(priced_as, region);
        let cost = match price {
            Some(price) if amount > 0 && !is_sentinel(priced_as) => price
                .checked_mul(Decimal::from(amount))
                .unwrap_or_else(|| cost_overflow(priced_as, Decimal::ZERO)),
            _ => Decimal::ZERO,
        };
        PricedItem { name: display_name.trim().to_string(), amount_kg: amount, price, cost }
    }
}

fn cost_overflow(category: &str, fallback: Decimal) -> Decimal {
    warn!(
        event_name = "recommendation.cost_overflow",
        category,
        "cost exceeds the representable range; counted as zero"
    );
    fallback
}

/// Sums the category costs. A category whose addition would overflow is
/// zeroed so the total always equals the sum of the reported categories.
fn checked_total(
    primary: Decimal,
    secondary: Decimal,
    organics: Decimal,
) -> (Decimal, Decimal, Decimal, Decimal) {
    let mut total = primary;
    let mut add = |category: &str, cost: Decimal| match total.checked_add(cost) {
        Some(sum) => {
            total = sum;
            cost
        }
        None => cost_overflow(category, Decimal::ZERO),
    };
    let secondary = add("secondary", secondary);
    let organics = add("organics", organics);
    (primary, secondary, organics, total)
}

fn cost_detail(
    block: &DosageBlock,
    item: Option<&PricedItem>,
    cost: Decimal,
    currency: &str,
) -> MaterialCostDetail {
    MaterialCostDetail {
        fertilizer: item.map_or_else(|| "Not recommended".to_string(), |_| block.name.clone()),
        amount_kg: block.amount_kg,
        price_per_kg: format_unit_price(item.and_then(|item| item.price), currency),
        cost: format_money(Some(cost), currency),
    }
}

fn soil_test_values(inputs: &FieldInputs) -> SoilTestValues {
    let bulk_density = positive_or(inputs.bulk_density, DEFAULT_BULK_DENSITY_G_CM3);
    let depth = positive_or(inputs.sampling_depth, DEFAULT_SAMPLING_DEPTH_CM);
    let reading = |feature: &str| {
        let mg_per_kg = inputs.features.number(feature).unwrap_or(0.0);
        NutrientReading { mg_per_kg, kg_per_ha: mgkg_to_kg_ha(mg_per_kg, bulk_density, depth) }
    };
    SoilTestValues {
        units_input: "mg/kg".to_string(),
        units_converted: "kg/ha".to_string(),
        bulk_density_g_cm3: bulk_density,
        sampling_depth_cm: depth,
        nitrogen: reading(NITROGEN),
        phosphorus: reading(PHOSPHORUS),
        potassium: reading(POTASSIUM),
    }
}

/// Primary target confidence, else the mean of all confidences, as a
/// half-to-even rounded percentage.
pub fn confidence_percent(prediction: &Prediction) -> Option<u32> {
    let confidence = prediction.confidence(Target::PrimaryFertilizer).or_else(|| {
        let values: Vec<f64> = prediction.confidences.values().copied().collect();
        (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
    })?;
    let percent = Decimal::from_f64_retain(confidence.clamp(0.0, 1.0) * 100.0)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven);
    u32::try_from(percent.mantissa()).ok()
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{
        confidence_percent, RecommendationComposer, ReportOptions, DEFAULT_ORGANIC, NO_PRIMARY,
        NO_SECONDARY,
    };
    use crate::domain::feature::FeatureVector;
    use crate::domain::prediction::Prediction;
    use crate::domain::report::FieldInputs;
    use crate::domain::target::Target;
    use crate::pricing::{PriceBook, PriceResolver, ProviderError};

    fn composer() -> RecommendationComposer {
        RecommendationComposer::new(PriceResolver::new(PriceBook::builtin()))
    }

    fn inputs(field_size: f64) -> FieldInputs {
        FieldInputs {
            features: FeatureVector::new()
                .with("Nitrogen", 45.0)
                .with("Phosphorus", 20.0)
                .with("Potassium", 110.0),
            sowing_date: Some("2025-07-01".to_string()),
            field_size: Some(field_size),
            ..FieldInputs::default()
        }
    }

    fn full_prediction() -> Prediction {
        Prediction::new()
            .with(Target::NStatus, "low", 0.81)
            .with(Target::PStatus, "optimal", 0.77)
            .with(Target::KStatus, "high", 0.69)
            .with(Target::PrimaryFertilizer, "Urea", 0.874)
            .with(Target::SecondaryFertilizer, "DAP", 0.64)
            .with(Target::Organic1, "Vermicompost", 0.58)
            .with(Target::Organic2, "Neem Cake", 0.52)
            .with(Target::PhAmendment, "none", 0.9)
    }

    #[test]
    fn composes_a_fully_priced_report() {
        let report = composer().compose(&inputs(2.0), &full_prediction(), ReportOptions::default());

        assert_eq!(report.primary_fertilizer.name, "Urea");
        assert_eq!(report.primary_fertilizer.amount_kg, 250);
        assert_eq!(report.secondary_fertilizer.amount_kg, 160);
        assert_eq!(report.organic_alternatives.len(), 2);
        assert_eq!(report.organic_alternatives[0].amount_kg, 400);
        assert_eq!(report.organic_alternatives[1].amount_kg, 80);

        let cost = &report.cost_estimate;
        assert_eq!(cost.primary, Decimal::from(250 * 40));
        assert_eq!(cost.secondary, Decimal::from(160 * 150));
        assert_eq!(cost.organics, Decimal::from(400 * 12 + 80 * 25));
        assert_eq!(cost.total, cost.primary + cost.secondary + cost.organics);
        assert_eq!(cost.formatted.total, "₹40,800");
        assert_eq!(cost.breakdown.primary_details.price_per_kg, "₹40");
        assert_eq!(cost.breakdown.organics_details.total_amount_kg, 480);

        assert_eq!(report.ml_model_prediction.confidence_percent, Some(87));
        assert_eq!(report.ml_model_prediction.npk, "NPK: 46-0-0");
        assert_eq!(report.soil_condition.ph_status, "Optimal");
        assert_eq!(report.soil_condition.nutrient_deficiencies, vec!["Nitrogen"]);
        assert_eq!(report.soil_condition.soil_test_values.nitrogen.kg_per_ha, 87.75);
        assert!(report.application_timing.primary.contains("2025-07-01"));
        assert_eq!(report.meta.currency, "₹");
        assert_eq!(report.meta.price_source, "live->fallback");
    }

    #[test]
    fn dap_is_governed_by_slot() {
        let prediction = Prediction::new()
            .with(Target::NStatus, "high", 0.8)
            .with(Target::PStatus, "low", 0.8)
            .with(Target::PrimaryFertilizer, "DAP", 0.8)
            .with(Target::SecondaryFertilizer, "DAP", 0.8);

        let report = composer().compose(&inputs(1.0), &prediction, ReportOptions::default());

        assert_eq!(report.primary_fertilizer.amount_kg, 64);
        assert_eq!(report.secondary_fertilizer.amount_kg, 100);
        assert!(report.secondary_fertilizer.reason.starts_with("Model detected low phosphorus"));
    }

    #[test]
    fn empty_prediction_still_yields_every_cost() {
        let report = composer().compose(&inputs(1.0), &Prediction::new(), ReportOptions::default());

        assert_eq!(report.primary_fertilizer.name, NO_PRIMARY);
        assert_eq!(report.secondary_fertilizer.name, NO_SECONDARY);
        assert_eq!(report.cost_estimate.primary, Decimal::ZERO);
        assert_eq!(report.cost_estimate.secondary, Decimal::ZERO);
        assert_eq!(report.organic_alternatives.len(), 1);
        assert_eq!(report.organic_alternatives[0].name, DEFAULT_ORGANIC);
        assert_eq!(report.organic_alternatives[0].amount_kg, 400);
        assert_eq!(report.cost_estimate.organics, Decimal::from(400 * 6));
        assert_eq!(report.cost_estimate.total, Decimal::from(2400));
        assert_eq!(report.cost_estimate.breakdown.primary_details.fertilizer, "Not recommended");
        assert_eq!(report.cost_estimate.breakdown.primary_details.price_per_kg, "N/A");
        assert_eq!(report.ml_model_prediction.confidence_percent, None);
        assert_eq!(report.ml_model_prediction.npk, "—");
    }

    #[test]
    fn sentinels_cost_nothing() {
        let prediction = Prediction::new()
            .with(Target::NStatus, "low", 0.9)
            .with(Target::PrimaryFertilizer, "Balanced NPK (maintenance)", 0.9)
            .with(Target::SecondaryFertilizer, "—", 0.9)
            .with(Target::Organic1, "Compost", 0.5);

        let report = composer().compose(&inputs(25.0), &prediction, ReportOptions::default());

        assert_eq!(report.primary_fertilizer.amount_kg, 0);
        assert_eq!(report.secondary_fertilizer.amount_kg, 0);
        assert_eq!(report.cost_estimate.primary, Decimal::ZERO);
        assert_eq!(report.cost_estimate.secondary, Decimal::ZERO);
        assert_eq!(report.cost_estimate.formatted.primary, "₹0");
        assert_eq!(report.cost_estimate.total, report.cost_estimate.organics);
    }

    #[test]
    fn unpriced_organics_contribute_zero() {
        let prediction = Prediction::new()
            .with(Target::Organic1, "Seaweed extract", 0.5)
            .with(Target::Organic2, "Bone meal", 0.5);

        let report = composer().compose(&inputs(1.0), &prediction, ReportOptions::default());

        assert_eq!(report.organic_alternatives[0].amount_kg, 60);
        assert_eq!(report.cost_estimate.organics, Decimal::from(30 * 18));
        assert_eq!(report.ml_model_prediction.confidence_percent, Some(50));
    }

    #[test]
    fn currency_region_and_units_are_respected() {
        let composer = RecommendationComposer::new(
            PriceResolver::new(PriceBook::builtin().with_currency("KSh").with_region("Nakuru"))
                .with_provider(|_: &str, _: Option<&str>| -> Result<Option<f64>, ProviderError> {
                    Ok(Some(1000.0))
                }),
        );
        let mut field = inputs(10.0);
        field.field_unit = Some("acres".to_string());
        let prediction = Prediction::new().with(Target::PrimaryFertilizer, "Urea", 0.5);

        let report = composer.compose(&field, &prediction, ReportOptions::default());

        assert_eq!(report.primary_fertilizer.amount_kg, 405);
        assert_eq!(report.cost_estimate.formatted.primary, "KSh405,000");
        assert!(report.cost_estimate.notes.starts_with("For 10 acres in Nakuru."));

        let overridden = composer.compose(
            &field,
            &prediction,
            ReportOptions { region: Some("Kisumu"), currency: Some("$") },
        );
        assert_eq!(overridden.meta.currency, "$");
        assert_eq!(overridden.meta.region.as_deref(), Some("Kisumu"));
    }

    #[test]
    fn notes_name_the_normalized_unit() {
        let mut field = inputs(2.0);
        field.field_unit = Some("Bigha".to_string());

        let report = composer().compose(&field, &Prediction::new(), ReportOptions::default());

        assert!(report.cost_estimate.notes.starts_with("For 2 hectares."));
        assert_eq!(report.organic_alternatives[0].amount_kg, 800);
    }

    #[test]
    fn unrepresentable_costs_degrade_to_zero() {
        let composer = RecommendationComposer::new(
            PriceResolver::new(PriceBook::builtin())
                .with_provider(|material: &str, _: Option<&str>| -> Result<Option<f64>, ProviderError> {
                    Ok((material == "Urea").then_some(1e27))
                }),
        );
        let prediction = Prediction::new()
            .with(Target::PrimaryFertilizer, "Urea", 0.8)
            .with(Target::SecondaryFertilizer, "MOP", 0.8);

        let report = composer.compose(&inputs(2.0), &prediction, ReportOptions::default());

        let cost = &report.cost_estimate;
        assert_eq!(report.primary_fertilizer.amount_kg, 200);
        assert_eq!(cost.primary, Decimal::ZERO);
        assert_eq!(cost.secondary, Decimal::from(120 * 33));
        assert_eq!(cost.total, cost.primary + cost.secondary + cost.organics);
    }

    #[test]
    fn totals_that_would_overflow_drop_the_overflowing_category() {
        let near_max = Decimal::MAX - Decimal::from(10);

        let (primary, secondary, organics, total) =
            super::checked_total(near_max, Decimal::from(5), Decimal::from(50));

        assert_eq!((primary, secondary, organics), (near_max, Decimal::from(5), Decimal::ZERO));
        assert_eq!(total, primary + secondary + organics);
    }

    #[test]
    fn confidence_falls_back_to_mean() {
        let prediction = Prediction::new().with(Target::NStatus, "low", 0.5).with(Target::KStatus, "low", 0.9);
        assert_eq!(confidence_percent(&prediction), Some(70));

        let half = Prediction::new().with(Target::PrimaryFertilizer, "Urea", 0.125);
        assert_eq!(confidence_percent(&half), Some(12));
    }

    #[test]
    fn report_serializes_with_meta_key() {
        let report = composer().compose(&inputs(1.0), &full_prediction(), ReportOptions::default());

        let json = serde_json::to_value(&report).expect("serialize");

        assert!(json.get("_meta").is_some());
        assert_eq!(json["soil_condition"]["soil_test_values"]["N"]["kg_per_ha"], 87.75);
        assert_eq!(json["_meta"]["predictions"]["Primary_Fertilizer"], "Urea");
    }
}
