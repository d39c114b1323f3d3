//! Unit price resolution.
//!
//! Prices come from the first source that has one: a live provider when one
//! is configured, then the regional price table, then a minimal built-in
//! table. Sources are never blended.

pub mod alias;
pub mod provider;
pub mod table;

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

pub use alias::canonical_name;
pub use provider::{DeadlineProvider, PriceProvider, ProviderError};
pub use table::{PriceBook, PriceTableError, TableSource};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    Provider,
    Table,
    Fallback,
}

impl PriceSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Provider => "provider",
            Self::Table => "table",
            Self::Fallback => "fallback",
        }
    }
}

impl fmt::Display for PriceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResolvedPrice {
    pub material: String,
    pub price_per_kg: Decimal,
    pub source: PriceSource,
}

/// Resolves a material's unit price against an explicit price book.
pub fn resolve(
    material: &str,
    region: Option<&str>,
    book: &PriceBook,
    provider: Option<&dyn PriceProvider>,
) -> Option<ResolvedPrice> {
    let canonical = canonical_name(material)?;

    if let Some(provider) = provider {
        if let Some(price) = ask_provider(provider, &canonical, region) {
            return Some(ResolvedPrice {
                material: canonical,
                price_per_kg: price,
                source: PriceSource::Provider,
            });
        }
    }

    if let Some(price) = book.price(&canonical) {
        return Some(ResolvedPrice {
            material: canonical,
            price_per_kg: price,
            source: PriceSource::Table,
        });
    }

    table::fallback_price(&canonical).map(|price| ResolvedPrice {
        material: canonical,
        price_per_kg: price,
        source: PriceSource::Fallback,
    })
}

fn ask_provider(
    provider: &dyn PriceProvider,
    canonical: &str,
    region: Option<&str>,
) -> Option<Decimal> {
    let answer = panic::catch_unwind(AssertUnwindSafe(|| provider.price(canonical, region)))
        .unwrap_or(Err(ProviderError::Panicked));

    match answer {
        Ok(Some(price)) if price.is_finite() && price > 0.0 => Decimal::from_f64(price),
        Ok(Some(price)) => {
            debug!(material = canonical, price, "ignoring non-positive provider price");
            None
        }
        Ok(None) => None,
        Err(error) => {
            warn!(
                event_name = "pricing.provider.failed",
                material = canonical,
                region = region.unwrap_or(""),
                error = %error,
                "live price lookup failed, falling back to price table"
            );
            None
        }
    }
}

/// Price book plus an optional live provider, shared across requests.
#[derive(Clone)]
pub struct PriceResolver {
    book: Arc<PriceBook>,
    provider: Option<Arc<dyn PriceProvider>>,
}

impl fmt::Debug for PriceResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PriceResolver")
            .field("book", &self.book.source())
            .field("provider", &self.provider.is_some())
            .finish()
    }
}

impl PriceResolver {
    pub fn new(book: PriceBook) -> Self {
        Self { book: Arc::new(book), provider: None }
    }

    pub fn with_provider(mut self, provider: impl PriceProvider + 'static) -> Self {
        self.provider = Some(Arc::new(provider));
        self
    }

    /// Attaches a provider that is abandoned after `timeout`, normally
    /// `pricing.provider_timeout_ms` from the loaded config.
    pub fn with_deadline_provider(
        self,
        provider: impl PriceProvider + 'static,
        timeout: Duration,
    ) -> Self {
        self.with_provider(DeadlineProvider::new(provider, timeout))
    }

    pub fn book(&self) -> &PriceBook {
        &self.book
    }

    pub fn resolve(&self, material: &str, region: Option<&str>) -> Option<ResolvedPrice> {
        resolve(material, region, &self.book, self.provider.as_deref())
    }

    pub fn price(&self, material: &str, region: Option<&str>) -> Option<Decimal> {
        self.resolve(material, region).map(|resolved| resolved.price_per_kg)
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use rust_decimal::Decimal;

    use crate::config::AppConfig;

    use super::{resolve, PriceBook, PriceProvider, PriceResolver, PriceSource, ProviderError, TableSource};

    fn no_quote(_: &str, _: Option<&str>) -> Result<Option<f64>, ProviderError> {
        Ok(None)
    }

    #[test]
    fn aliases_resolve_to_the_same_price() {
        let resolver = PriceResolver::new(PriceBook::builtin());

        assert_eq!(resolver.price("muriate of potash", None), resolver.price("MOP", None));
        assert_eq!(resolver.price("MOP", None), Some(Decimal::from(33)));
    }

    #[test]
    fn provider_wins_when_it_answers() {
        let resolver = PriceResolver::new(PriceBook::builtin())
            .with_provider(|material: &str, region: Option<&str>| -> Result<Option<f64>, ProviderError> {
                Ok((material == "Urea" && region == Some("Punjab")).then_some(42.25))
            });

        let resolved = resolver.resolve(" urea ", Some("Punjab")).expect("price");

        assert_eq!(resolved.source, PriceSource::Provider);
        assert_eq!(resolved.price_per_kg, Decimal::new(4225, 2));
        assert_eq!(resolved.material, "Urea");
        assert_eq!(resolver.resolve("urea", None).map(|r| r.source), Some(PriceSource::Table));
    }

    #[test]
    fn provider_failures_fall_through_to_the_table() {
        let failing = |_: &str, _: Option<&str>| -> Result<Option<f64>, ProviderError> {
            Err(ProviderError::Unavailable("503".to_string()))
        };
        let negative = |_: &str, _: Option<&str>| -> Result<Option<f64>, ProviderError> { Ok(Some(-4.0)) };
        let nan = |_: &str, _: Option<&str>| -> Result<Option<f64>, ProviderError> { Ok(Some(f64::NAN)) };
        let panicking = |_: &str, _: Option<&str>| -> Result<Option<f64>, ProviderError> { panic!("boom") };
        let book = PriceBook::builtin();

        let providers: [&dyn PriceProvider; 5] = [&failing, &negative, &nan, &panicking, &no_quote];
        for provider in providers {
            let resolved = resolve("DAP", None, &book, Some(provider)).expect("price");
            assert_eq!(resolved.source, PriceSource::Table);
            assert_eq!(resolved.price_per_kg, Decimal::from(150));
        }
    }

    #[test]
    fn slow_provider_is_abandoned_after_the_configured_timeout() {
        let mut config = AppConfig::default();
        config.pricing.provider_timeout_ms = 20;
        let resolver = PriceResolver::new(PriceBook::builtin()).with_deadline_provider(
            |_: &str, _: Option<&str>| -> Result<Option<f64>, ProviderError> {
                thread::sleep(Duration::from_millis(300));
                Ok(Some(99.0))
            },
            config.pricing.provider_timeout(),
        );

        let resolved = resolver.resolve("Urea", None).expect("price");

        assert_eq!(resolved.source, PriceSource::Table);
        assert_eq!(resolved.price_per_kg, Decimal::from(40));
    }

    #[test]
    fn minimal_table_is_the_last_resort() {
        let book = PriceBook::empty(TableSource::BuiltIn).with_price("DAP", Decimal::from(140));

        assert_eq!(
            resolve("Neem Cake", None, &book, None).map(|r| (r.price_per_kg, r.source)),
            Some((Decimal::from(25), PriceSource::Fallback))
        );
        assert_eq!(resolve("DAP", None, &book, None).map(|r| r.source), Some(PriceSource::Table));
    }

    #[test]
    fn unknown_and_blank_materials_have_no_price() {
        let book = PriceBook::builtin();

        assert_eq!(resolve("Seaweed extract", None, &book, None), None);
        assert_eq!(resolve("  ", None, &book, None), None);
    }
}
