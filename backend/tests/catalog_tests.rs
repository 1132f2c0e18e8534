//! Catalog and display rule tests
//!
//! Order numbering, Rupiah formatting, list pagination and input validation.

use std::str::FromStr;

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    format_rupiah, format_rupiah_with_decimal, next_order_number, parse_sequence, CreateItemInput,
    OrderStatus, Pagination, PaginationMeta, UpdateItemInput,
};
use uuid::Uuid;
use validator::Validate;

// ============================================================================
// Property Test Strategies
// ============================================================================

fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (2020i32..2040, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn sequence_strategy() -> impl Strategy<Value = u32> {
    1u32..9999
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_same_day_order_numbers() {
        let day = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();

        let first = next_order_number(day, None).unwrap();
        let second = next_order_number(day, Some(&first)).unwrap();
        let third = next_order_number(day, Some(&second)).unwrap();

        assert_eq!(first, "ORD202601010001");
        assert_eq!(second, "ORD202601010002");
        assert_eq!(third, "ORD202601010003");
    }

    #[test]
    fn test_sequence_restarts_each_day() {
        let day = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap();
        assert_eq!(next_order_number(day, None).unwrap(), "ORD202601020001");
    }

    #[test]
    fn test_currency_examples() {
        assert_eq!(format_rupiah(Decimal::from(12_500_000)), "Rp 12.500.000");
        assert_eq!(
            format_rupiah_with_decimal(Decimal::from_str("1234.50").unwrap()),
            "Rp 1.234,50"
        );
    }

    #[test]
    fn test_admin_page_size() {
        let pagination = Pagination::default();
        assert_eq!(pagination.per_page, 10);

        let meta = PaginationMeta::new(&pagination, 21);
        assert_eq!(meta.total_pages, 3);
    }

    #[test]
    fn test_status_parsing_is_case_insensitive() {
        assert_eq!(OrderStatus::from_str("paid").unwrap(), OrderStatus::Paid);
        assert_eq!(OrderStatus::from_str("Cancelled").unwrap(), OrderStatus::Cancelled);
        assert!(OrderStatus::from_str("shipped").is_err());
    }

    #[test]
    fn test_status_json_is_uppercase() {
        let json = serde_json::to_string(&OrderStatus::Pending).unwrap();
        assert_eq!(json, "\"PENDING\"");
    }

    #[test]
    fn test_item_input_rules() {
        let valid = CreateItemInput {
            category_id: Uuid::new_v4(),
            name: "Kopi Robusta".to_string(),
            price: Decimal::from_str("45000.00").unwrap(),
            stock: 0,
        };
        assert!(valid.validate().is_ok());

        let negative_stock = UpdateItemInput {
            category_id: Uuid::new_v4(),
            name: "Kopi Robusta".to_string(),
            price: Decimal::from(45000),
            stock: -1,
        };
        let errors = negative_stock.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("stock"));

        let fractional = CreateItemInput {
            price: Decimal::from_str("1.005").unwrap(),
            ..valid
        };
        let errors = fractional.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("price"));
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        /// The next number on a day always follows the last one by exactly one
        #[test]
        fn prop_order_numbers_increment(date in date_strategy(), seq in sequence_strategy()) {
            let prefix = shared::daily_prefix(date);
            let last = shared::format_order_number(date, seq);
            let next = next_order_number(date, Some(&last)).unwrap();

            prop_assert_eq!(next.len(), last.len());
            prop_assert!(next > last);
            prop_assert_eq!(parse_sequence(&prefix, &next).unwrap(), seq + 1);
        }

        /// Formatted amounts keep every digit of the whole part
        #[test]
        fn prop_rupiah_keeps_digits(amount in 0i64..1_000_000_000_000) {
            let formatted = format_rupiah(Decimal::from(amount));
            prop_assert!(formatted.starts_with("Rp "));
            let digits: String = formatted.chars().filter(|c| c.is_ascii_digit()).collect();
            prop_assert_eq!(digits, amount.to_string());
        }

        /// Total pages is the ceiling of total / page size
        #[test]
        fn prop_total_pages(total in 0u64..10_000, per_page in 1u32..=100) {
            let meta = PaginationMeta::new(&Pagination::new(1, per_page), total);
            let expected = (total + u64::from(per_page) - 1) / u64::from(per_page);
            prop_assert_eq!(u64::from(meta.total_pages), expected);
        }

        /// Pages are clamped to at least one and offsets never go negative
        #[test]
        fn prop_page_clamped(page in 0u32..1000, per_page in 0u32..500) {
            let pagination = Pagination::new(page, per_page);
            prop_assert!(pagination.page >= 1);
            prop_assert!(pagination.per_page >= 1);
            prop_assert!(pagination.offset() >= 0);
        }
    }
}
