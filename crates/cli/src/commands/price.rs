use fertiwise_core::pricing::canonical_name;
use rust_decimal::Decimal;
use serde::Serialize;

use super::{load_config, price_resolver, CommandResult, EXIT_INPUT};

const COMMAND: &str = "price";

#[derive(Debug, Serialize)]
struct PriceQuote {
    material: String,
    canonical_name: String,
    region: Option<String>,
    currency: Option<String>,
    price_per_kg: Option<Decimal>,
    source: Option<&'static str>,
    table: String,
}

pub fn run(material: &str, region: Option<&str>) -> CommandResult {
    let Some(canonical) = canonical_name(material) else {
        return CommandResult::failure(
            COMMAND,
            "input_invalid",
            "material name must not be empty",
            EXIT_INPUT,
        );
    };
    let config = match load_config(COMMAND) {
        Ok(config) => config,
        Err(result) => return result,
    };

    let resolver = price_resolver(&config);
    let region = region.map(str::to_string).or_else(|| config.pricing.region.clone());
    let resolved = resolver.resolve(&canonical, region.as_deref());
    let currency =
        config.pricing.currency.clone().or_else(|| resolver.book().currency().map(str::to_string));

    CommandResult::document(
        COMMAND,
        &PriceQuote {
            material: material.to_string(),
            canonical_name: canonical,
            region,
            currency,
            price_per_kg: resolved.as_ref().map(|price| price.price_per_kg),
            source: resolved.as_ref().map(|price| price.source.as_str()),
            table: resolver.book().source().to_string(),
        },
    )
}
