//! Domain models for the back-office

mod category;
mod item;
mod order;

pub use category::*;
pub use item::*;
pub use order::*;
