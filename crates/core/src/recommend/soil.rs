//! Soil test conversions and field geometry.

use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BULK_DENSITY_G_CM3: f64 = 1.3;
pub const DEFAULT_SAMPLING_DEPTH_CM: f64 = 15.0;
pub const DEFAULT_FIELD_SIZE: f64 = 1.0;

const HECTARES_PER_ACRE: f64 = 0.404686;
const SQUARE_METERS_PER_HECTARE: f64 = 10_000.0;

/// Converts a soil test reading from mg/kg to kg/ha, rounded to 2 decimals.
///
/// `kg/ha = mg/kg * bulk density (g/cm3) * sampling depth (cm) * 0.1`
pub fn mgkg_to_kg_ha(value_mg_kg: f64, bulk_density_g_cm3: f64, depth_cm: f64) -> f64 {
    round2(value_mg_kg * bulk_density_g_cm3 * depth_cm * 0.1)
}

/// Half-to-even on the exact binary value, so 1.365 (stored just below the
/// midpoint) gives 1.36 and an exact 4.875 gives 4.88.
fn round2(value: f64) -> f64 {
    Decimal::from_f64_retain(value)
        .map(|exact| exact.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven))
        .and_then(|rounded| rounded.to_string().parse::<f64>().ok())
        .unwrap_or(value)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldUnit {
    #[default]
    Hectares,
    Acres,
    SquareMeters,
}

impl FieldUnit {
    /// Parses a unit label; unrecognized labels read as hectares.
    pub fn parse(value: Option<&str>) -> Self {
        let normalized = value.map(|unit| unit.trim().to_lowercase().replace([' ', '-'], "_"));
        match normalized.as_deref() {
            Some("acre" | "acres" | "ac") => Self::Acres,
            Some("square_meters" | "square_metres" | "square_meter" | "sq_m" | "m2") => {
                Self::SquareMeters
            }
            _ => Self::Hectares,
        }
    }

    pub fn to_hectares(self, size: f64) -> f64 {
        match self {
            Self::Hectares => size,
            Self::Acres => size * HECTARES_PER_ACRE,
            Self::SquareMeters => size / SQUARE_METERS_PER_HECTARE,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hectares => "hectares",
            Self::Acres => "acres",
            Self::SquareMeters => "square_meters",
        }
    }
}

impl fmt::Display for FieldUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field size as supplied, or the default when absent, zero or not finite.
pub fn effective_field_size(size: Option<f64>) -> f64 {
    size.filter(|size| size.is_finite() && *size != 0.0).unwrap_or(DEFAULT_FIELD_SIZE)
}

/// Positive finite value or the default.
pub fn positive_or(value: Option<f64>, default: f64) -> f64 {
    value.filter(|value| value.is_finite() && *value > 0.0).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::{effective_field_size, mgkg_to_kg_ha, positive_or, FieldUnit};

    #[test]
    fn converts_mg_per_kg_with_default_soil_geometry() {
        assert_eq!(mgkg_to_kg_ha(45.0, 1.3, 15.0), 87.75);
        assert_eq!(mgkg_to_kg_ha(0.0, 1.3, 15.0), 0.0);
        assert_eq!(mgkg_to_kg_ha(12.0, 1.45, 20.0), 34.8);
    }

    #[test]
    fn conversions_round_half_to_even_on_the_stored_value() {
        assert_eq!(mgkg_to_kg_ha(0.7, 1.3, 15.0), 1.36);
        assert_eq!(mgkg_to_kg_ha(2.5, 1.3, 15.0), 4.88);
        assert_eq!(mgkg_to_kg_ha(1.0, 1.3, 15.0), 1.95);
        assert_eq!(mgkg_to_kg_ha(1.125, 2.0, 5.0), 1.12);
    }

    #[test]
    fn field_units_convert_to_hectares() {
        assert!((FieldUnit::parse(Some("Acres")).to_hectares(10.0) - 4.04686).abs() < 1e-12);
        assert_eq!(FieldUnit::parse(Some("square meters")).to_hectares(25_000.0), 2.5);
        assert_eq!(FieldUnit::parse(Some("bigha")), FieldUnit::Hectares);
        assert_eq!(FieldUnit::parse(None).to_hectares(3.0), 3.0);
    }

    #[test]
    fn field_size_defaults() {
        assert_eq!(effective_field_size(None), 1.0);
        assert_eq!(effective_field_size(Some(0.0)), 1.0);
        assert_eq!(effective_field_size(Some(2.5)), 2.5);
        assert_eq!(effective_field_size(Some(-2.0)), -2.0);
        assert_eq!(positive_or(Some(-1.0), 1.3), 1.3);
        assert_eq!(positive_or(Some(1.45), 1.3), 1.45);
    }
}
