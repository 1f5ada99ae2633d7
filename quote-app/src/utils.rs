use quote_core::PricingConfig;
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Shown in place of an amount that could not be computed.
pub const UNDEFINED_DISPLAY: &str = "NaN";

/// Error returned when a string cannot be parsed as a [`Decimal`].
#[derive(Debug, Error)]
#[error("invalid decimal '{input}': {source}")]
pub struct ParseDecimalError {
    input: String,
    #[source]
    source: rust_decimal::Error,
}

/// Normalizes input for decimal parsing: trims whitespace and removes commas (thousands separator).
fn normalize_decimal_input(s: &str) -> String {
    s.trim().replace(',', "")
}

/// Parses a string into a [`Decimal`].
///
/// Handles comma as thousands separator (e.g. `"1,234.56"`).
/// Empty or whitespace-only input is treated as 0.
pub fn parse_decimal(s: &str) -> Result<Decimal, ParseDecimalError> {
    let normalized = normalize_decimal_input(s);
    if normalized.is_empty() {
        return Ok(Decimal::ZERO);
    }
    normalized.parse().map_err(|e| {
        tracing::debug!(input = %s, "invalid decimal: {}", e);
        ParseDecimalError {
            input: s.to_string(),
            source: e,
        }
    })
}

/// Inserts `,` every three digits from the right of an unsigned integer string.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Formats `value` with exactly `digits` decimals and thousands separators.
pub fn format_amount(
    value: Decimal,
    digits: u32,
) -> String {
    let mut rounded = value.round_dp_with_strategy(digits, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }

    let fixed = format!("{:.*}", digits as usize, rounded);
    let (sign, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };

    match unsigned.split_once('.') {
        Some((int_part, frac)) => format!("{sign}{}.{frac}", group_thousands(int_part)),
        None => format!("{sign}{}", group_thousands(unsigned)),
    }
}

/// `<currency> <amount>`, or `NaN` when the amount is undefined.
pub fn format_money(
    value: Option<Decimal>,
    config: &PricingConfig,
) -> String {
    match value {
        Some(v) => format!("{} {}", config.currency, format_amount(v, config.round_digits)),
        None => UNDEFINED_DISPLAY.to_string(),
    }
}

/// A percentage with one decimal place, e.g. `9.0%`.
pub fn format_percent(pct: Decimal) -> String {
    format!("{}%", format_amount(pct, 1))
}

/// Label of the tax row, e.g. `Tax (9.0%)`.
pub fn tax_label(config: &PricingConfig) -> String {
    format!("Tax ({})", format_percent(config.tax_rate_pct))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn parse_decimal_accepts_comma_thousands_separator() {
        assert_eq!(parse_decimal("1,234.56").unwrap(), dec!(1234.56));
        assert_eq!(parse_decimal("1,234,567.89").unwrap(), dec!(1234567.89));
    }

    #[test]
    fn parse_decimal_trim_whitespace() {
        assert_eq!(parse_decimal("  123.45  ").unwrap(), dec!(123.45));
    }

    #[test]
    fn parse_decimal_empty_treated_as_zero() {
        assert_eq!(parse_decimal("").unwrap(), Decimal::ZERO);
        assert_eq!(parse_decimal("   ").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn parse_decimal_invalid_returns_error() {
        let err = parse_decimal("abc").unwrap_err();
        assert!(err.to_string().starts_with("invalid decimal 'abc'"));
    }

    #[test]
    fn amounts_are_padded_and_grouped() {
        assert_eq!(format_amount(dec!(1234.5), 2), "1,234.50");
        assert_eq!(format_amount(dec!(1234567), 0), "1,234,567");
        assert_eq!(format_amount(dec!(999.999), 2), "1,000.00");
        assert_eq!(format_amount(dec!(12), 3), "12.000");
        assert_eq!(format_amount(dec!(0), 2), "0.00");
    }

    #[test]
    fn amounts_round_half_away_from_zero() {
        assert_eq!(format_amount(dec!(0.125), 2), "0.13");
        assert_eq!(format_amount(dec!(-1234.565), 2), "-1,234.57");
        assert_eq!(format_amount(dec!(-0.001), 2), "0.00");
    }

    #[test]
    fn money_uses_currency_label_or_nan() {
        let config = PricingConfig::default();

        assert_eq!(format_money(Some(dec!(145.33)), &config), "SGD 145.33");
        assert_eq!(format_money(None, &config), "NaN");
    }

    #[test]
    fn tax_label_shows_one_decimal() {
        let mut config = PricingConfig::default();
        assert_eq!(tax_label(&config), "Tax (9.0%)");

        config.tax_rate_pct = dec!(8.25);
        assert_eq!(tax_label(&config), "Tax (8.3%)");
    }
}
