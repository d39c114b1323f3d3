//! Regional price table and the built-in fallbacks behind it.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use super::alias::canonical_name;

/// Regional baseline in currency per kg, used when no price file is available.
const RATE_TABLE_DEFAULT: &[(&str, i64)] = &[
    ("Urea", 40),
    ("DAP", 150),
    ("MOP", 33),
    ("SOP", 50),
    ("SSP", 25),
    ("TSP", 45),
    ("Ammonium Sulphate", 24),
    ("Ammonium Nitrate", 32),
    ("Ammonium Chloride", 28),
    ("Calcium Ammonium Nitrate", 30),
    ("Rock Phosphate", 20),
    ("PSB", 15),
    ("Rhizobium", 15),
    ("Azospirillum", 15),
    ("Azotobacter", 15),
    ("Azolla", 10),
    ("Vermicompost", 12),
    ("Compost", 6),
    ("FYM", 5),
    ("Green manure", 7),
    ("Neem cake", 25),
    ("Mustard cake", 20),
    ("Bone meal", 18),
    ("Poultry manure", 8),
    ("Banana wastes", 5),
    ("Banana peel compost", 6),
    ("Mulch", 2),
    ("Wood Ash", 3),
    ("Balanced NPK (maintenance)", 0),
    ("Split N doses", 0),
    ("Stop P", 0),
    ("Stop K", 0),
    ("Reduce N", 0),
    ("Avoid N", 0),
    ("Avoid Potash", 0),
    ("Avoid Phosphate application", 0),
    ("—", 0),
];

/// Last-resort prices consulted after the regional table.
const DEFAULT_FALLBACK_RATES: &[(&str, i64)] = &[
    ("Urea", 40),
    ("DAP", 150),
    ("MOP", 33),
    ("SOP", 50),
    ("Calcium Ammonium Nitrate", 30),
    ("Ammonium Sulphate", 24),
    ("Vermicompost", 12),
    ("Neem cake", 25),
    ("Bone meal", 18),
    ("Compost", 6),
    ("Poultry manure", 8),
    ("Wood Ash", 3),
];

/// Price from the minimal fallback table for a canonical material name.
pub fn fallback_price(canonical: &str) -> Option<Decimal> {
    DEFAULT_FALLBACK_RATES
        .iter()
        .find(|(name, _)| *name == canonical)
        .map(|(_, price)| Decimal::from(*price))
}

#[derive(Debug, Error)]
pub enum PriceTableError {
    #[error("failed to read price table `{path}`: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("failed to parse price table: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("price table must be a JSON object")]
    NotAnObject,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TableSource {
    File(PathBuf),
    BuiltIn,
}

impl fmt::Display for TableSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "file:{}", path.display()),
            Self::BuiltIn => f.write_str("built-in"),
        }
    }
}

/// Immutable price book, keyed by canonical material name.
#[derive(Clone, Debug, PartialEq)]
pub struct PriceBook {
    prices: BTreeMap<String, Decimal>,
    currency: Option<String>,
    region: Option<String>,
    source: TableSource,
}

impl Default for PriceBook {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PriceBook {
    pub fn builtin() -> Self {
        let mut book = Self::empty(TableSource::BuiltIn);
        for (name, price) in RATE_TABLE_DEFAULT {
            book.insert(name, Decimal::from(*price));
        }
        book
    }

    pub fn empty(source: TableSource) -> Self {
        Self { prices: BTreeMap::new(), currency: None, region: None, source }
    }

    /// Adds a price under the canonical form of `name`. The first entry for a
    /// canonical name wins.
    pub fn insert(&mut self, name: &str, price: Decimal) {
        if let Some(canonical) = canonical_name(name) {
            self.prices.entry(canonical).or_insert(price);
        }
    }

    pub fn with_price(mut self, name: &str, price: Decimal) -> Self {
        self.insert(name, price);
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Table price for a material, looked up under its canonical name.
    pub fn price(&self, material: &str) -> Option<Decimal> {
        let canonical = canonical_name(material)?;
        self.prices.get(&canonical).copied()
    }

    pub fn currency(&self) -> Option<&str> {
        self.currency.as_deref()
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn source(&self) -> &TableSource {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn load(path: &Path) -> Result<Self, PriceTableError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| PriceTableError::Read { path: path.to_path_buf(), source })?;
        Self::from_json(&raw, TableSource::File(path.to_path_buf()))
    }

    /// Parses `{currency, region, prices}` or a bare `{name: price}` map.
    /// Entries whose price is not a non-negative number are skipped.
    pub fn from_json(raw: &str, source: TableSource) -> Result<Self, PriceTableError> {
        let Value::Object(document) = serde_json::from_str::<Value>(raw)? else {
            return Err(PriceTableError::NotAnObject);
        };

        let mut book = Self::empty(source);
        book.currency = string_field(&document, "currency");
        book.region = string_field(&document, "region");

        let prices = match document.get("prices") {
            Some(Value::Object(prices)) if !prices.is_empty() => prices,
            _ => &document,
        };
        for (name, value) in prices {
            match decimal_value(value) {
                Some(price) => book.insert(name, price),
                None if matches!(name.as_str(), "currency" | "region" | "prices") => {}
                None => debug!(material = %name, "skipping unusable price table entry"),
            }
        }

        Ok(book)
    }

    /// Loads the table at `path`, falling back to the built-in table when the
    /// file is absent or unusable.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            debug!(path = %path.display(), "price table not found, using built-in rates");
            return Self::builtin();
        }
        match Self::load(path) {
            Ok(book) => book,
            Err(error) => {
                warn!(
                    event_name = "pricing.table.fallback",
                    path = %path.display(),
                    error = %error,
                    "price table unusable, using built-in rates"
                );
                Self::builtin()
            }
        }
    }
}

fn string_field(document: &Map<String, Value>, key: &str) -> Option<String> {
    document
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn decimal_value(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.trim().to_string(),
        _ => return None,
    };
    let price = Decimal::from_str(&text).or_else(|_| Decimal::from_scientific(&text)).ok()?;
    (price >= Decimal::ZERO).then_some(price)
}
