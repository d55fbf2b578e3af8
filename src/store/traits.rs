//! `SheetStore` trait: the narrow persistence interface the survey engine
//! writes completed records through.

use async_trait::async_trait;

use crate::error::StoreError;

/// An opened sheet: its backend id, name and the header row in effect.
///
/// The header is whatever the sheet's first row holds. A freshly created
/// sheet gets the header passed to [`SheetStore::ensure_sheet`]; an existing
/// sheet keeps its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetHandle {
    pub id: String,
    pub name: String,
    pub header: Vec<String>,
}

impl SheetHandle {
    /// Number of columns a row appended to this sheet must have.
    pub fn width(&self) -> usize {
        self.header.len()
    }

    /// Reject rows whose width does not match the header.
    pub fn check_width(&self, values: &[String]) -> Result<(), StoreError> {
        if values.len() != self.width() {
            return Err(StoreError::RowWidth {
                sheet: self.name.clone(),
                expected: self.width(),
                got: values.len(),
            });
        }
        Ok(())
    }
}

/// Append-only tabular storage.
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// Human-readable backend name for logs.
    fn backend_name(&self) -> &str;

    /// Open the sheet called `name`, creating it when absent.
    ///
    /// Idempotent: the header row is written only when the sheet has no rows.
    async fn ensure_sheet(&self, name: &str, header: &[String]) -> Result<SheetHandle, StoreError>;

    /// Append one row. `values` must have exactly `sheet.width()` cells.
    async fn append_row(&self, sheet: &SheetHandle, values: &[String]) -> Result<(), StoreError>;

    /// All rows of the sheet, header first.
    async fn rows(&self, sheet: &SheetHandle) -> Result<Vec<Vec<String>>, StoreError>;
}
