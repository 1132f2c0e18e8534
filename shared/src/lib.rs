//! Shared types and rules for the back-office
//!
//! This crate holds the domain models, input validation and the order workflow
//! planner. Nothing in here performs I/O; the backend loads rows, asks for a
//! plan and writes the result.

pub mod currency;
pub mod models;
pub mod order_number;
pub mod types;
pub mod validation;
pub mod workflow;

pub use currency::*;
pub use models::*;
pub use order_number::*;
pub use types::*;
pub use validation::*;
