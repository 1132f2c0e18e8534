//! HTTP handlers for the JSON API

pub mod category;
pub mod health;
pub mod item;
pub mod order;
pub mod reporting;

pub use category::*;
pub use health::*;
pub use item::*;
pub use order::*;
pub use reporting::*;
