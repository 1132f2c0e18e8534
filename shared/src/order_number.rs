//! Order number rules
//!
//! Order numbers look like `ORD202601010001`: the `ORD` prefix, the UTC order
//! date as `YYYYMMDD`, then a four digit sequence that restarts every day.

use chrono::NaiveDate;
use thiserror::Error;

pub const ORDER_NUMBER_PREFIX: &str = "ORD";

/// Width of the daily sequence suffix
pub const SEQUENCE_WIDTH: usize = 4;

/// Highest sequence that still fits the suffix
pub const MAX_DAILY_SEQUENCE: u32 = 9999;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderNumberError {
    #[error("order number {number} does not start with {prefix}")]
    ForeignPrefix { number: String, prefix: String },

    #[error("order number {0} has a malformed sequence")]
    MalformedSequence(String),

    #[error("daily order sequence exhausted for {0}")]
    SequenceExhausted(String),
}

/// Prefix shared by every order placed on `date`
pub fn daily_prefix(date: NaiveDate) -> String {
    format!("{}{}", ORDER_NUMBER_PREFIX, date.format("%Y%m%d"))
}

/// Format the order number for a given day and sequence
pub fn format_order_number(date: NaiveDate, sequence: u32) -> String {
    format!("{}{:0width$}", daily_prefix(date), sequence, width = SEQUENCE_WIDTH)
}

/// Extract the daily sequence from an order number carrying `prefix`
pub fn parse_sequence(prefix: &str, number: &str) -> Result<u32, OrderNumberError> {
    let suffix = number
        .strip_prefix(prefix)
        .ok_or_else(|| OrderNumberError::ForeignPrefix {
            number: number.to_string(),
            prefix: prefix.to_string(),
        })?;

    if suffix.is_empty() || !suffix.chars().all(|c| c.is_ascii_digit()) {
        return Err(OrderNumberError::MalformedSequence(number.to_string()));
    }

    suffix
        .parse()
        .map_err(|_| OrderNumberError::MalformedSequence(number.to_string()))
}

/// Next order number for `date`, given the highest number already issued that day
pub fn next_order_number(date: NaiveDate, last: Option<&str>) -> Result<String, OrderNumberError> {
    let prefix = daily_prefix(date);
    let next = match last {
        None => 1,
        Some(number) => parse_sequence(&prefix, number)? + 1,
    };

    if next > MAX_DAILY_SEQUENCE {
        return Err(OrderNumberError::SequenceExhausted(prefix));
    }

    Ok(format_order_number(date, next))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_first_order_of_the_day() {
        let number = next_order_number(day(2026, 1, 1), None).unwrap();
        assert_eq!(number, "ORD202601010001");
    }

    #[test]
    fn test_increments_last_sequence() {
        let number = next_order_number(day(2026, 1, 1), Some("ORD202601010001")).unwrap();
        assert_eq!(number, "ORD202601010002");

        let number = next_order_number(day(2026, 1, 1), Some("ORD202601010099")).unwrap();
        assert_eq!(number, "ORD202601010100");
    }

    #[test]
    fn test_sequence_exhausted() {
        let result = next_order_number(day(2026, 1, 1), Some("ORD202601019999"));
        assert_eq!(
            result,
            Err(OrderNumberError::SequenceExhausted("ORD20260101".to_string()))
        );
    }

    #[test]
    fn test_rejects_other_days() {
        let result = next_order_number(day(2026, 1, 2), Some("ORD202601010007"));
        assert!(matches!(result, Err(OrderNumberError::ForeignPrefix { .. })));
    }

    #[test]
    fn test_rejects_malformed_sequence() {
        assert!(parse_sequence("ORD20260101", "ORD20260101").is_err());
        assert!(parse_sequence("ORD20260101", "ORD20260101-001").is_err());
        assert_eq!(parse_sequence("ORD20260101", "ORD202601010042"), Ok(42));
    }
}
