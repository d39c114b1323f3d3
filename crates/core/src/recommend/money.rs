use rust_decimal::{Decimal, RoundingStrategy};

pub const DEFAULT_CURRENCY: &str = "₹";

/// Formats an amount as `{currency}{whole units}` with thousands separators.
/// Absent amounts render like zero.
pub fn format_money(amount: Option<Decimal>, currency: &str) -> String {
    let rounded = amount
        .unwrap_or(Decimal::ZERO)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven);
    let digits = rounded.abs().trunc().to_string();
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{sign}{currency}{}", group_thousands(&digits))
}

/// Unit price for the cost breakdown, `N/A` when there is none.
pub fn format_unit_price(price: Option<Decimal>, currency: &str) -> String {
    match price {
        Some(price) if !price.is_zero() => format_money(Some(price), currency),
        _ => "N/A".to_string(),
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{format_money, format_unit_price};

    #[test]
    fn groups_thousands() {
        assert_eq!(format_money(Some(Decimal::from(1_234_567)), "₹"), "₹1,234,567");
        assert_eq!(format_money(Some(Decimal::from(999)), "$"), "$999");
        assert_eq!(format_money(Some(Decimal::from(1000)), "$"), "$1,000");
    }

    #[test]
    fn rounds_half_to_even() {
        assert_eq!(format_money(Some(Decimal::new(25, 1)), "₹"), "₹2");
        assert_eq!(format_money(Some(Decimal::new(35, 1)), "₹"), "₹4");
        assert_eq!(format_money(Some(Decimal::new(1_234_56, 2)), "₹"), "₹1,235");
    }

    #[test]
    fn zero_and_absent_render_the_same() {
        assert_eq!(format_money(None, "₹"), "₹0");
        assert_eq!(format_money(Some(Decimal::ZERO), "₹"), "₹0");
    }

    #[test]
    fn unit_prices_without_a_value_are_not_available() {
        assert_eq!(format_unit_price(None, "₹"), "N/A");
        assert_eq!(format_unit_price(Some(Decimal::ZERO), "₹"), "N/A");
        assert_eq!(format_unit_price(Some(Decimal::from(33)), "₹"), "₹33");
    }
}
