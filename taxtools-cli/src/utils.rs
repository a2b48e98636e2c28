use rust_decimal::Decimal;
use thiserror::Error;

/// Error returned when a string cannot be parsed as a [`Decimal`].
#[derive(Debug, Error)]
#[error("invalid amount '{input}': {source}")]
pub struct ParseDecimalError {
    input: String,
    #[source]
    source: rust_decimal::Error,
}

/// Normalizes input for decimal parsing: trims whitespace, a leading `$` and
/// commas (thousands separator).
fn normalize_decimal_input(s: &str) -> String {
    let s = s.trim();
    let s = s.strip_prefix('$').unwrap_or(s);
    s.replace(',', "")
}

/// Parses an amount given on the command line.
///
/// Handles comma as thousands separator (e.g. `"1,234.56"`) and a leading
/// `$`. Empty or whitespace-only input is treated as 0.
pub fn parse_decimal(s: &str) -> Result<Decimal, ParseDecimalError> {
    let normalized = normalize_decimal_input(s);
    if normalized.is_empty() {
        return Ok(Decimal::ZERO);
    }
    normalized.parse().map_err(|e| ParseDecimalError {
        input: s.to_string(),
        source: e,
    })
}

/// Formats an amount with comma thousands separators, keeping its scale.
pub fn format_amount(d: Decimal) -> String {
    let plain = d.abs().to_string();
    let (whole, fraction) = match plain.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (plain.as_str(), None),
    };

    let mut grouped = String::with_capacity(plain.len() + whole.len() / 3 + 1);
    if d.is_sign_negative() && !d.is_zero() {
        grouped.push('-');
    }
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(fraction);
    }
    grouped
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
    fn parse_decimal_accepts_dollar_sign() {
        assert_eq!(parse_decimal(" $50,000 ").unwrap(), dec!(50000));
    }

    #[test]
    fn parse_decimal_empty_treated_as_zero() {
        assert_eq!(parse_decimal("").unwrap(), Decimal::ZERO);
        assert_eq!(parse_decimal("   ").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn parse_decimal_keeps_sign() {
        assert_eq!(parse_decimal("-500").unwrap(), dec!(-500));
    }

    #[test]
    fn parse_decimal_invalid_returns_error() {
        let err = parse_decimal("abc").unwrap_err();

        assert!(err.to_string().starts_with("invalid amount 'abc'"));
    }

    #[test]
    fn format_amount_groups_thousands() {
        assert_eq!(format_amount(dec!(0)), "0");
        assert_eq!(format_amount(dec!(999)), "999");
        assert_eq!(format_amount(dec!(1000)), "1,000");
        assert_eq!(format_amount(dec!(219336)), "219,336");
        assert_eq!(format_amount(dec!(1234567.89)), "1,234,567.89");
    }

    #[test]
    fn format_amount_keeps_sign_and_scale() {
        assert_eq!(format_amount(dec!(-6307.50)), "-6,307.50");
        assert_eq!(format_amount(dec!(12.62)), "12.62");
    }
}
