use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const TEMPERATURE: &str = "Temperature";
pub const HUMIDITY: &str = "Humidity";
pub const MOISTURE: &str = "Moisture";
pub const SOIL_TYPE: &str = "Soil_Type";
pub const CROP: &str = "Crop";
pub const NITROGEN: &str = "Nitrogen";
pub const PHOSPHORUS: &str = "Phosphorus";
pub const POTASSIUM: &str = "Potassium";
pub const PH: &str = "pH";

/// Feature names every recommendation request is expected to carry.
pub const MODEL_FEATURES: [&str; 9] =
    [TEMPERATURE, HUMIDITY, MOISTURE, SOIL_TYPE, CROP, NITROGEN, PHOSPHORUS, POTASSIUM, PH];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(f64),
    Category(String),
}

impl FeatureValue {
    /// Numeric view of the value. Categories holding a number (as submitted
    /// by HTML forms) are parsed.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => value.is_finite().then_some(*value),
            Self::Category(raw) => raw.trim().parse::<f64>().ok().filter(|value| value.is_finite()),
        }
    }

    pub fn as_category(&self) -> Option<String> {
        match self {
            Self::Category(raw) => {
                let trimmed = raw.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Self::Number(value) if value.fract() == 0.0 => Some(format!("{}", *value as i64)),
            Self::Number(value) => Some(value.to_string()),
        }
    }
}

impl From<f64> for FeatureValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for FeatureValue {
    fn from(value: &str) -> Self {
        Self::Category(value.to_string())
    }
}

/// Raw measurements for one request, keyed by feature name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector(BTreeMap<String, FeatureValue>);

impl FeatureVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<FeatureValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FeatureValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.0.get(name)
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(FeatureValue::as_number)
    }

    /// Values in the given column order; absent features stay `None`.
    pub fn aligned<'a>(&'a self, columns: &[String]) -> Vec<Option<&'a FeatureValue>> {
        columns.iter().map(|column| self.0.get(column)).collect()
    }

    /// Required model features that are absent or blank.
    pub fn missing(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|name| match self.0.get(**name) {
                None => true,
                Some(FeatureValue::Category(raw)) => raw.trim().is_empty(),
                Some(FeatureValue::Number(value)) => !value.is_finite(),
            })
            .map(|name| (*name).to_string())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FeatureValue)> {
        self.0.iter()
    }

    /// Replaces numeric soil and crop codes sent by older clients with the
    /// category names the model was trained on.
    pub fn map_legacy_codes(&mut self) {
        for (feature, names) in [(SOIL_TYPE, LEGACY_SOIL_TYPES), (CROP, LEGACY_CROPS)] {
            let Some(value) = self.0.get_mut(feature) else {
                continue;
            };
            let code = value.as_category().and_then(|raw| raw.parse::<usize>().ok());
            if let Some(name) = code.and_then(|code| names.get(code)) {
                *value = FeatureValue::from(*name);
            }
        }
    }
}

const LEGACY_SOIL_TYPES: &[&str] = &["Black", "Clayey", "Loamy", "Red", "Sandy"];

const LEGACY_CROPS: &[&str] = &[
    "Wheat",
    "Cotton",
    "Groundnut",
    "Maize",
    "Millets",
    "Soybean",
    "Rice",
    "Pulses",
    "Sugarcane",
    "Tea",
    "Coffee",
];

#[cfg(test)]
mod tests {
    use super::{FeatureValue, FeatureVector, MODEL_FEATURES};

    #[test]
    fn legacy_codes_map_to_category_names() {
        let mut features = FeatureVector::new()
            .with("Soil_Type", "2")
            .with("Crop", 10.0)
            .with("Nitrogen", 3.0);

        features.map_legacy_codes();

        assert_eq!(features.get("Soil_Type"), Some(&FeatureValue::from("Loamy")));
        assert_eq!(features.get("Crop"), Some(&FeatureValue::from("Coffee")));
        assert_eq!(features.get("Nitrogen"), Some(&FeatureValue::Number(3.0)));

        let mut named = FeatureVector::new().with("Soil_Type", "Red").with("Crop", "42");
        named.map_legacy_codes();
        assert_eq!(named.get("Soil_Type"), Some(&FeatureValue::from("Red")));
        assert_eq!(named.get("Crop"), Some(&FeatureValue::from("42")));
    }

    #[test]
    fn aligned_preserves_column_order_and_gaps() {
        let features = FeatureVector::new().with("pH", 6.5).with("Crop", "Wheat");
        let columns = vec!["Crop".to_string(), "Humidity".to_string(), "pH".to_string()];

        let row = features.aligned(&columns);

        assert_eq!(row[0], Some(&FeatureValue::Category("Wheat".to_string())));
        assert_eq!(row[1], None);
        assert_eq!(row[2], Some(&FeatureValue::Number(6.5)));
    }

    #[test]
    fn numeric_strings_are_readable_as_numbers() {
        assert_eq!(FeatureValue::from(" 42.5 ").as_number(), Some(42.5));
        assert_eq!(FeatureValue::from("loamy").as_number(), None);
        assert_eq!(FeatureValue::Number(f64::NAN).as_number(), None);
    }

    #[test]
    fn missing_reports_absent_and_blank_features() {
        let features = FeatureVector::new()
            .with("Temperature", 26.0)
            .with("Humidity", 52.0)
            .with("Moisture", 38.0)
            .with("Soil_Type", "  ")
            .with("Crop", "Maize")
            .with("Nitrogen", 37.0)
            .with("Phosphorus", 0.0)
            .with("pH", 6.8);

        assert_eq!(features.missing(&MODEL_FEATURES), vec!["Soil_Type", "Potassium"]);
    }

    #[test]
    fn deserializes_mixed_json_values() {
        let features: FeatureVector =
            serde_json::from_str(r#"{"Crop":"Rice","Nitrogen":40,"pH":"6.1"}"#).expect("parse");

        assert_eq!(features.number("Nitrogen"), Some(40.0));
        assert_eq!(features.number("pH"), Some(6.1));
        assert_eq!(features.get("Crop").and_then(FeatureValue::as_category).as_deref(), Some("Rice"));
    }
}
