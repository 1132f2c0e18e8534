//! Item (inventory) models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::validation::{validate_not_blank, validate_price};

/// A sellable item with its current price and stock level
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    pub id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Item joined with the name of its category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemWithCategory {
    #[serde(flatten)]
    pub item: Item,
    pub category_name: String,
}

/// Input for creating an item
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateItemInput {
    pub category_id: Uuid,
    #[validate(
        length(max = 200, message = "Name must be at most 200 characters"),
        custom = "validate_not_blank"
    )]
    pub name: String,
    #[validate(custom = "validate_price")]
    pub price: Decimal,
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: i32,
}

/// Input for updating an item (full replace)
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateItemInput {
    pub category_id: Uuid,
    #[validate(
        length(max = 200, message = "Name must be at most 200 characters"),
        custom = "validate_not_blank"
    )]
    pub name: String,
    #[validate(custom = "validate_price")]
    pub price: Decimal,
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: i32,
}
