//! Validation utilities for the back-office

use rust_decimal::Decimal;
use validator::ValidationError;

/// Price columns are NUMERIC(18,2)
pub const PRICE_SCALE: u32 = 2;

/// Largest amount a NUMERIC(18,2) column holds
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xa763_ffff, 0x0de0_b6b3, 0, false, 2);

/// Reject names made only of whitespace
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some("Value cannot be empty".into());
        return Err(error);
    }
    Ok(())
}

/// Prices are non-negative with at most two fractional digits
pub fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if *price < Decimal::ZERO {
        let mut error = ValidationError::new("negative_price");
        error.message = Some("Price cannot be negative".into());
        return Err(error);
    }
    if *price > MAX_AMOUNT {
        let mut error = ValidationError::new("price_range");
        error.message = Some("Price is too large".into());
        return Err(error);
    }
    if price.normalize().scale() > PRICE_SCALE {
        let mut error = ValidationError::new("price_scale");
        error.message = Some("Price can have at most two decimal places".into());
        return Err(error);
    }
    Ok(())
}

/// Order line quantities are positive
pub fn validate_quantity(quantity: i32) -> Result<(), &'static str> {
    if quantity <= 0 {
        return Err("Quantity must be greater than zero");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    use validator::Validate;

    use crate::models::{CreateCategoryInput, CreateItemInput, UpdateCategoryInput};

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("Electronics").is_ok());
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank("   ").is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(&dec("0")).is_ok());
        assert!(validate_price(&dec("12500000")).is_ok());
        assert!(validate_price(&dec("10.50")).is_ok());
        assert!(validate_price(&dec("10.500")).is_ok());
        assert!(validate_price(&dec("10.505")).is_err());
        assert!(validate_price(&dec("-1")).is_err());
    }

    #[test]
    fn test_validate_price_upper_bound() {
        assert_eq!(MAX_AMOUNT, dec("9999999999999999.99"));
        assert!(validate_price(&MAX_AMOUNT).is_ok());
        assert!(validate_price(&dec("10000000000000000")).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
    }

    #[test]
    fn test_category_input_lengths() {
        let ok = CreateCategoryInput {
            name: "Books".to_string(),
            description: Some("Books and publications".to_string()),
        };
        assert!(ok.validate().is_ok());

        let long_name = CreateCategoryInput {
            name: "x".repeat(101),
            description: None,
        };
        assert!(long_name.validate().is_err());

        let long_description = UpdateCategoryInput {
            name: "Books".to_string(),
            description: Some("x".repeat(501)),
        };
        let errors = long_description.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("description"));
    }

    #[test]
    fn test_item_input_rules() {
        let mut input = CreateItemInput {
            category_id: uuid::Uuid::new_v4(),
            name: "Yoga Mat".to_string(),
            price: dec("225000"),
            stock: 120,
        };
        assert!(input.validate().is_ok());

        input.stock = -1;
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("stock"));

        input.stock = 1;
        input.name = " ".to_string();
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
    }
}
