//! libSQL backend: local `SheetStore` implementation.
//!
//! Each sheet is a row in `sheets`; its cells live in `sheet_rows` as JSON
//! arrays keyed by `(sheet_id, row_index)`. Row 0 is the header.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::StoreError;
use crate::store::migrations;
use crate::store::traits::{SheetHandle, SheetStore};

/// libSQL sheet store.
///
/// Stores a single connection that is reused for all operations.
pub struct LibSqlSheetStore {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlSheetStore {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Connection(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| StoreError::Connection(format!("Failed to open libSQL database: {e}")))?;

        let store = Self::from_database(db).await?;
        info!(path = %path.display(), "Sheet store opened");
        Ok(store)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, StoreError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                StoreError::Connection(format!("Failed to create in-memory database: {e}"))
            })?;
        Self::from_database(db).await
    }

    async fn from_database(db: LibSqlDatabase) -> Result<Self, StoreError> {
        let conn = db
            .connect()
            .map_err(|e| StoreError::Connection(format!("Failed to create connection: {e}")))?;

        migrations::init_schema(&conn).await?;
        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }

    async fn find_sheet_id(&self, name: &str) -> Result<Option<String>, StoreError> {
        let mut rows = self
            .conn()
            .query("SELECT id FROM sheets WHERE name = ?1", params![name])
            .await
            .map_err(|e| StoreError::Query(format!("find_sheet_id: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => row
                .get::<String>(0)
                .map(Some)
                .map_err(|e| StoreError::Query(format!("find_sheet_id: {e}"))),
            Ok(None) => Ok(None),
            Err(e) => Err(StoreError::Query(format!("find_sheet_id: {e}"))),
        }
    }

    async fn header_row(&self, sheet_id: &str) -> Result<Option<Vec<String>>, StoreError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT cells FROM sheet_rows WHERE sheet_id = ?1 AND row_index = 0",
                params![sheet_id],
            )
            .await
            .map_err(|e| StoreError::Query(format!("header_row: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let cells: String = row
                    .get(0)
                    .map_err(|e| StoreError::Query(format!("header_row: {e}")))?;
                decode_cells(&cells).map(Some)
            }
            Ok(None) => Ok(None),
            Err(e) => Err(StoreError::Query(format!("header_row: {e}"))),
        }
    }

    async fn insert_row(&self, sheet_id: &str, values: &[String]) -> Result<(), StoreError> {
        let cells = encode_cells(values)?;
        // Index assignment and insert happen in one statement.
        self.conn()
            .execute(
                "INSERT INTO sheet_rows (sheet_id, row_index, cells, created_at)
                 SELECT ?1, COALESCE(MAX(row_index), -1) + 1, ?2, ?3
                 FROM sheet_rows WHERE sheet_id = ?1",
                params![sheet_id, cells, Utc::now().to_rfc3339()],
            )
            .await
            .map_err(|e| StoreError::Query(format!("insert_row: {e}")))?;
        Ok(())
    }
}

// ── Helper functions ────────────────────────────────────────────────

fn encode_cells(values: &[String]) -> Result<String, StoreError> {
    serde_json::to_string(values).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn decode_cells(raw: &str) -> Result<Vec<String>, StoreError> {
    serde_json::from_str(raw).map_err(|e| StoreError::Serialization(e.to_string()))
}

// ── Trait implementation ────────────────────────────────────────────

#[async_trait]
impl SheetStore for LibSqlSheetStore {
    fn backend_name(&self) -> &str {
        "libsql"
    }

    async fn ensure_sheet(&self, name: &str, header: &[String]) -> Result<SheetHandle, StoreError> {
        self.conn()
            .execute(
                "INSERT OR IGNORE INTO sheets (id, name, created_at) VALUES (?1, ?2, ?3)",
                params![Uuid::new_v4().to_string(), name, Utc::now().to_rfc3339()],
            )
            .await
            .map_err(|e| StoreError::Query(format!("ensure_sheet: {e}")))?;

        let id = self
            .find_sheet_id(name)
            .await?
            .ok_or_else(|| StoreError::SheetNotFound(name.to_string()))?;

        let header = match self.header_row(&id).await? {
            Some(existing) => {
                debug!(sheet = name, columns = existing.len(), "Opened existing sheet");
                existing
            }
            None => {
                self.insert_row(&id, header).await?;
                info!(sheet = name, columns = header.len(), "Wrote header row");
                header.to_vec()
            }
        };

        Ok(SheetHandle {
            id,
            name: name.to_string(),
            header,
        })
    }

    async fn append_row(&self, sheet: &SheetHandle, values: &[String]) -> Result<(), StoreError> {
        sheet.check_width(values)?;
        self.insert_row(&sheet.id, values).await?;
        debug!(sheet = %sheet.name, "Row appended");
        Ok(())
    }

    async fn rows(&self, sheet: &SheetHandle) -> Result<Vec<Vec<String>>, StoreError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT cells FROM sheet_rows WHERE sheet_id = ?1 ORDER BY row_index",
                params![sheet.id.as_str()],
            )
            .await
            .map_err(|e| StoreError::Query(format!("rows: {e}")))?;

        let mut out = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            let cells: String = row
                .get(0)
                .map_err(|e| StoreError::Query(format!("rows: {e}")))?;
            out.push(decode_cells(&cells)?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_store() -> LibSqlSheetStore {
        LibSqlSheetStore::new_memory().await.unwrap()
    }

    fn header() -> Vec<String> {
        vec!["Время".into(), "ID".into(), "Имя".into()]
    }

    #[tokio::test]
    async fn ensure_sheet_creates_header() {
        let store = test_store().await;
        let sheet = store.ensure_sheet("Diary", &header()).await.unwrap();

        assert_eq!(sheet.name, "Diary");
        assert_eq!(sheet.header, header());
        let rows = store.rows(&sheet).await.unwrap();
        assert_eq!(rows, vec![header()]);
    }

    #[tokio::test]
    async fn ensure_sheet_twice_writes_one_header() {
        let store = test_store().await;
        let first = store.ensure_sheet("Diary", &header()).await.unwrap();
        let second = store.ensure_sheet("Diary", &header()).await.unwrap();

        assert_eq!(first.id, second.id);
        let rows = store.rows(&second).await.unwrap();
        assert_eq!(rows.len(), 1, "header must not be duplicated");
    }

    #[tokio::test]
    async fn ensure_sheet_keeps_existing_header() {
        let store = test_store().await;
        store.ensure_sheet("Diary", &header()).await.unwrap();

        let other: Vec<String> = vec!["x".into(), "y".into()];
        let reopened = store.ensure_sheet("Diary", &other).await.unwrap();
        assert_eq!(reopened.header, header());
    }

    #[tokio::test]
    async fn append_row_preserves_order() {
        let store = test_store().await;
        let sheet = store.ensure_sheet("Diary", &header()).await.unwrap();

        store
            .append_row(&sheet, &["t1".into(), "1".into(), "Anna".into()])
            .await
            .unwrap();
        store
            .append_row(&sheet, &["t2".into(), "2".into(), String::new()])
            .await
            .unwrap();

        let rows = store.rows(&sheet).await.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1][2], "Anna");
        assert_eq!(rows[2][0], "t2");
        assert_eq!(rows[2][2], "");
    }

    #[tokio::test]
    async fn append_row_rejects_wrong_width() {
        let store = test_store().await;
        let sheet = store.ensure_sheet("Diary", &header()).await.unwrap();

        let err = store
            .append_row(&sheet, &["only one".into()])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::RowWidth { .. }));
        assert_eq!(store.rows(&sheet).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn sheets_are_isolated() {
        let store = test_store().await;
        let a = store.ensure_sheet("A", &header()).await.unwrap();
        let b = store.ensure_sheet("B", &header()).await.unwrap();
        store
            .append_row(&a, &["t".into(), "1".into(), "Anna".into()])
            .await
            .unwrap();

        assert_eq!(store.rows(&a).await.unwrap().len(), 2);
        assert_eq!(store.rows(&b).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn reopen_file_keeps_rows() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("koordbook.db");

        {
            let store = LibSqlSheetStore::new_local(&path).await.unwrap();
            let sheet = store.ensure_sheet("Diary", &header()).await.unwrap();
            store
                .append_row(&sheet, &["t".into(), "1".into(), "Anna".into()])
                .await
                .unwrap();
        }

        let store = LibSqlSheetStore::new_local(&path).await.unwrap();
        let sheet = store.ensure_sheet("Diary", &header()).await.unwrap();
        let rows = store.rows(&sheet).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][2], "Anna");
    }
}
