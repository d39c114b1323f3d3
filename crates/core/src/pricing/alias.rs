//! Material name normalization shared by pricing, dosing and the NPK registry.

/// Canonical name of the maintenance advisory. Never dosed or costed.
pub const MAINTENANCE_SENTINEL: &str = "Balanced NPK (maintenance)";

/// Canonical name of the "no secondary fertilizer" placeholder.
pub const NO_SECONDARY_SENTINEL: &str = "—";

/// Lowercase alias to canonical material name.
const ALIASES: &[(&str, &str)] = &[
    ("mop", "MOP"),
    ("murate of potash", "MOP"),
    ("muriate of potash", "MOP"),
    ("potassium chloride", "MOP"),
    ("sop", "SOP"),
    ("potassium sulfate", "SOP"),
    ("potassium sulphate", "SOP"),
    ("urea", "Urea"),
    ("dap", "DAP"),
    ("diammonium phosphate", "DAP"),
    ("can", "Calcium Ammonium Nitrate"),
    ("calcium ammonium nitrate", "Calcium Ammonium Nitrate"),
    ("ammonium sulphate", "Ammonium Sulphate"),
    ("ammonium sulfate", "Ammonium Sulphate"),
    ("ammonium nitrate", "Ammonium Nitrate"),
    ("ammonium chloride", "Ammonium Chloride"),
    ("ssp", "SSP"),
    ("single super phosphate", "SSP"),
    ("tsp", "TSP"),
    ("triple super phosphate", "TSP"),
    ("rock phosphate", "Rock Phosphate"),
    ("vermicompost", "Vermicompost"),
    ("neem cake", "Neem cake"),
    ("bone meal", "Bone meal"),
    ("compost", "Compost"),
    ("poultry manure", "Poultry manure"),
    ("wood ash", "Wood Ash"),
    ("fym", "FYM"),
    ("farmyard manure", "FYM"),
    ("green manure", "Green manure"),
    ("mustard cake", "Mustard cake"),
    ("banana wastes", "Banana wastes"),
    ("banana peel compost", "Banana peel compost"),
    ("mulch", "Mulch"),
    ("azolla", "Azolla"),
    ("psb", "PSB"),
    ("phosphate solubilizing bacteria", "PSB"),
    ("rhizobium", "Rhizobium"),
    ("azospirillum", "Azospirillum"),
    ("azotobacter", "Azotobacter"),
    ("balanced npk (maintenance)", MAINTENANCE_SENTINEL),
    ("balanced npk", MAINTENANCE_SENTINEL),
    ("maintenance", MAINTENANCE_SENTINEL),
    ("split n doses", "Split N doses"),
    ("stop p", "Stop P"),
    ("stop k", "Stop K"),
    ("reduce n", "Reduce N"),
    ("avoid n", "Avoid N"),
    ("avoid potash", "Avoid Potash"),
    ("avoid phosphate application", "Avoid Phosphate application"),
    ("none", NO_SECONDARY_SENTINEL),
    ("no secondary", NO_SECONDARY_SENTINEL),
    ("-", NO_SECONDARY_SENTINEL),
    ("—", NO_SECONDARY_SENTINEL),
];

/// Maps a material name to its canonical form. Matching is case-insensitive
/// on the trimmed name; unknown names pass through trimmed. Blank names have
/// no canonical form.
pub fn canonical_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return None;
    }
    let key = trimmed.to_lowercase();
    let canonical = ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map_or(trimmed, |(_, canonical)| canonical);
    Some(canonical.to_string())
}

/// True for the maintenance and no-secondary placeholders.
pub fn is_sentinel(name: &str) -> bool {
    matches!(
        canonical_name(name).as_deref(),
        Some(MAINTENANCE_SENTINEL) | Some(NO_SECONDARY_SENTINEL)
    )
}

#[cfg(test)]
mod tests {
    use super::{canonical_name, is_sentinel, MAINTENANCE_SENTINEL, NO_SECONDARY_SENTINEL};

    #[test]
    fn aliases_are_case_insensitive_and_trimmed() {
        assert_eq!(canonical_name("  Muriate of Potash ").as_deref(), Some("MOP"));
        assert_eq!(canonical_name("mop").as_deref(), Some("MOP"));
        assert_eq!(canonical_name("CAN").as_deref(), Some("Calcium Ammonium Nitrate"));
        assert_eq!(canonical_name("Ammonium Sulfate").as_deref(), Some("Ammonium Sulphate"));
    }

    #[test]
    fn unknown_names_pass_through_trimmed() {
        assert_eq!(canonical_name("  Seaweed extract ").as_deref(), Some("Seaweed extract"));
    }

    #[test]
    fn blank_names_have_no_canonical_form() {
        assert_eq!(canonical_name(""), None);
        assert_eq!(canonical_name("   "), None);
    }

    #[test]
    fn sentinel_aliases() {
        assert_eq!(canonical_name("maintenance").as_deref(), Some(MAINTENANCE_SENTINEL));
        assert_eq!(canonical_name("None").as_deref(), Some(NO_SECONDARY_SENTINEL));
        assert!(is_sentinel("Balanced NPK"));
        assert!(is_sentinel("-"));
        assert!(is_sentinel("no secondary"));
        assert!(!is_sentinel("Urea"));
    }
}
