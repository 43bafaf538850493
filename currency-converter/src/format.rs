//! Display formatting.

use crate::CurrencyCode;

/// Formats an amount as `"{code} {amount}"` with thousands separators on the
/// integer part. Fractional digits are printed as-is; no rounding happens here.
pub fn format_currency(amount: f64, currency: &CurrencyCode) -> String {
    if !amount.is_finite() {
        return format!("{} {}", currency, amount);
    }

    let digits = amount.abs().to_string();
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (digits.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    match frac_part {
        Some(frac) => format!("{} {}{}.{}", currency, sign, grouped, frac),
        None => format!("{} {}{}", currency, sign, grouped),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::new(s).unwrap()
    }

    #[test]
    fn test_thousands_separators() {
        assert_eq!(format_currency(1_234_567.0, &code("SSP")), "SSP 1,234,567");
        assert_eq!(format_currency(999.0, &code("KES")), "KES 999");
        assert_eq!(format_currency(1000.0, &code("KES")), "KES 1,000");
        assert_eq!(format_currency(0.0, &code("USD")), "USD 0");
    }

    #[test]
    fn test_fraction_kept_verbatim() {
        assert_eq!(format_currency(1050.4, &code("SSP")), "SSP 1,050.4");
        assert_eq!(format_currency(0.25, &code("USD")), "USD 0.25");
    }

    #[test]
    fn test_negative_amount() {
        assert_eq!(format_currency(-1500.0, &code("USD")), "USD -1,500");
    }
}
