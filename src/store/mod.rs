//! Persistence layer: append-only sheets behind the `SheetStore` trait.

pub mod google_sheets;
pub mod libsql_backend;
pub mod migrations;
pub mod traits;

pub use google_sheets::GoogleSheetsStore;
pub use libsql_backend::LibSqlSheetStore;
pub use traits::{SheetHandle, SheetStore};
