//! Currency display
//!
//! Amounts are stored as plain decimals and shown as Indonesian Rupiah, using
//! `.` for thousands and `,` for the decimal separator.

use rust_decimal::{Decimal, RoundingStrategy};

pub const CURRENCY_CODE: &str = "IDR";
pub const CURRENCY_SYMBOL: &str = "Rp";

/// Format an amount without fractional digits, e.g. `Rp 12.500.000`
pub fn format_rupiah(amount: Decimal) -> String {
    format_with_places(amount, 0)
}

/// Format an amount with two fractional digits, e.g. `Rp 1.234,50`
pub fn format_rupiah_with_decimal(amount: Decimal) -> String {
    format_with_places(amount, 2)
}

fn format_with_places(amount: Decimal, places: u32) -> String {
    let rounded = amount.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded < Decimal::ZERO;
    let text = rounded.abs().to_string();

    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, fraction.to_string()),
        None => (text.as_str(), String::new()),
    };

    let mut out = String::from(CURRENCY_SYMBOL);
    out.push(' ');
    if negative {
        out.push('-');
    }
    out.push_str(&group_thousands(whole));

    if places > 0 {
        let mut fraction = fraction;
        while fraction.len() < places as usize {
            fraction.push('0');
        }
        out.push(',');
        out.push_str(&fraction);
    }

    out
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_format_rupiah() {
        assert_eq!(format_rupiah(dec("12500000")), "Rp 12.500.000");
        assert_eq!(format_rupiah(dec("185000")), "Rp 185.000");
        assert_eq!(format_rupiah(dec("1000")), "Rp 1.000");
        assert_eq!(format_rupiah(dec("999")), "Rp 999");
        assert_eq!(format_rupiah(Decimal::ZERO), "Rp 0");
    }

    #[test]
    fn test_format_rupiah_rounds_half_away_from_zero() {
        assert_eq!(format_rupiah(dec("1234.50")), "Rp 1.235");
        assert_eq!(format_rupiah(dec("1234.49")), "Rp 1.234");
    }

    #[test]
    fn test_format_rupiah_with_decimal() {
        assert_eq!(format_rupiah_with_decimal(dec("1234.5")), "Rp 1.234,50");
        assert_eq!(format_rupiah_with_decimal(dec("3000")), "Rp 3.000,00");
        assert_eq!(format_rupiah_with_decimal(dec("0.05")), "Rp 0,05");
    }

    #[test]
    fn test_format_negative_amount() {
        assert_eq!(format_rupiah(dec("-12500")), "Rp -12.500");
    }
}
