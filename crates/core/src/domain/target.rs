use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A prediction slot produced by the ensemble. Declaration order is the
/// order targets appear in predictions and reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Target {
    #[serde(rename = "N_Status")]
    NStatus,
    #[serde(rename = "P_Status")]
    PStatus,
    #[serde(rename = "K_Status")]
    KStatus,
    #[serde(rename = "Primary_Fertilizer")]
    PrimaryFertilizer,
    #[serde(rename = "Secondary_Fertilizer")]
    SecondaryFertilizer,
    #[serde(rename = "Organic_1")]
    Organic1,
    #[serde(rename = "Organic_2")]
    Organic2,
    #[serde(rename = "Organic_3")]
    Organic3,
    #[serde(rename = "pH_Amendment", alias = "PH_Amendment")]
    PhAmendment,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown prediction target `{0}`")]
pub struct UnknownTarget(pub String);

impl Target {
    pub const ALL: [Target; 9] = [
        Target::NStatus,
        Target::PStatus,
        Target::KStatus,
        Target::PrimaryFertilizer,
        Target::SecondaryFertilizer,
        Target::Organic1,
        Target::Organic2,
        Target::Organic3,
        Target::PhAmendment,
    ];

    pub const ORGANICS: [Target; 3] = [Target::Organic1, Target::Organic2, Target::Organic3];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NStatus => "N_Status",
            Self::PStatus => "P_Status",
            Self::KStatus => "K_Status",
            Self::PrimaryFertilizer => "Primary_Fertilizer",
            Self::SecondaryFertilizer => "Secondary_Fertilizer",
            Self::Organic1 => "Organic_1",
            Self::Organic2 => "Organic_2",
            Self::Organic3 => "Organic_3",
            Self::PhAmendment => "pH_Amendment",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Target {
    type Err = UnknownTarget;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        // Older artifacts spell the amendment slot with a capital P.
        if trimmed == "PH_Amendment" {
            return Ok(Self::PhAmendment);
        }
        Self::ALL
            .into_iter()
            .find(|target| target.as_str() == trimmed)
            .ok_or_else(|| UnknownTarget(trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::Target;

    #[test]
    fn parses_every_known_target_name() {
        for target in Target::ALL {
            assert_eq!(target.as_str().parse::<Target>(), Ok(target));
        }
    }

    #[test]
    fn accepts_legacy_amendment_spelling() {
        assert_eq!("PH_Amendment".parse::<Target>(), Ok(Target::PhAmendment));
    }

    #[test]
    fn rejects_unknown_target_names() {
        let error = "Micronutrient".parse::<Target>().expect_err("unknown target");
        assert_eq!(error.to_string(), "unknown prediction target `Micronutrient`");
    }

    #[test]
    fn serializes_with_artifact_names() {
        let json = serde_json::to_string(&Target::PrimaryFertilizer).expect("serialize");
        assert_eq!(json, "\"Primary_Fertilizer\"");
    }
}
