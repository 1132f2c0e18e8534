//! Business logic services for the back-office

pub mod category;
pub mod item;
pub mod order;
pub mod reporting;

pub use category::CategoryService;
pub use item::ItemService;
pub use order::OrderService;
pub use reporting::ReportingService;
