use super::types::{ImageAnalysisRecord, InteractionRecord, ItemLocationRecord, Label};
use super::MemoryStore;
use crate::error::{MemoriaError, Result};
use anyhow::Context;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::PathBuf;

const IMAGE_COLUMNS: &str = "description, labels, objects, text_content, potential_products, \
                             timestamp, location, session_id";

const LOCATION_COLUMNS: &str = "items, storage_location, location, timestamp, image_ref";

/// SQLite-backed memory store
///
/// A connection is opened per call on the blocking thread pool.
#[derive(Debug, Clone)]
pub struct SqliteMemoryStore {
    db_path: PathBuf,
}

impl SqliteMemoryStore {
    /// Create a store at a specific database path
    ///
    /// # Examples
    ///
    /// ```
    /// use memoria::memory::SqliteMemoryStore;
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let store = SqliteMemoryStore::new_with_path(dir.path().join("memory.db")).unwrap();
    /// ```
    pub fn new_with_path<P: Into<PathBuf>>(db_path: P) -> Result<Self> {
        let db_path = db_path.into();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create parent directory for database")
                .map_err(|e| MemoriaError::Storage(e.to_string()))?;
        }

        let store = Self { db_path };
        store.init()?;
        Ok(store)
    }

    /// Path of the underlying database file
    pub fn path(&self) -> &std::path::Path {
        &self.db_path
    }

    fn init(&self) -> Result<()> {
        let conn = open(&self.db_path)?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS images (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                description TEXT NOT NULL,
                labels JSON NOT NULL,
                objects JSON NOT NULL,
                text_content TEXT NOT NULL,
                potential_products JSON NOT NULL,
                timestamp TEXT NOT NULL,
                location TEXT NOT NULL,
                session_id TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_images_user_ts ON images (user_id, timestamp);

            CREATE TABLE IF NOT EXISTS item_locations (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                items JSON NOT NULL,
                storage_location TEXT NOT NULL,
                location TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                image_ref TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_item_locations_user_ts
                ON item_locations (user_id, timestamp);

            CREATE TABLE IF NOT EXISTS interactions (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                kind TEXT NOT NULL,
                query TEXT NOT NULL,
                response TEXT,
                confidence REAL,
                product_recommendations JSON NOT NULL,
                timestamp TEXT NOT NULL,
                session_id TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_interactions_user_kind_ts
                ON interactions (user_id, kind, timestamp);",
        )
        .context("Failed to create tables")
        .map_err(|e| MemoriaError::Storage(e.to_string()))?;

        Ok(())
    }

    /// Run `f` against a fresh connection on the blocking pool
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let conn = open(&db_path)?;
            f(&conn)
        })
        .await
        .map_err(|e| MemoriaError::Storage(format!("Storage task failed: {}", e)))?
    }
}

fn open(path: &std::path::Path) -> Result<Connection> {
    Connection::open(path)
        .context("Failed to open database")
        .map_err(|e| MemoriaError::Storage(e.to_string()).into())
}

fn storage_err(context: &str) -> impl Fn(rusqlite::Error) -> anyhow::Error + '_ {
    move |e| MemoriaError::Storage(format!("{}: {}", context, e)).into()
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value)
        .map_err(|e| MemoriaError::Storage(format!("Failed to serialize column: {}", e)).into())
}

/// Decode a JSON column inside a row mapper
fn json_column<T: serde::de::DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn image_from_row(row: &Row<'_>) -> rusqlite::Result<ImageAnalysisRecord> {
    Ok(ImageAnalysisRecord {
        description: row.get(0)?,
        labels: json_column::<Vec<Label>>(row, 1)?,
        objects: json_column::<Vec<Label>>(row, 2)?,
        text_content: row.get(3)?,
        potential_products: json_column(row, 4)?,
        timestamp: row.get(5)?,
        location: row.get(6)?,
        session_id: row.get(7)?,
    })
}

fn location_from_row(row: &Row<'_>) -> rusqlite::Result<ItemLocationRecord> {
    Ok(ItemLocationRecord {
        items: json_column(row, 0)?,
        storage_location: row.get(1)?,
        location: row.get(2)?,
        timestamp: row.get(3)?,
        image_ref: row.get(4)?,
    })
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[async_trait]
impl MemoryStore for SqliteMemoryStore {
    async fn insert_image(&self, user_id: &str, record: &ImageAnalysisRecord) -> Result<String> {
        let user_id = user_id.to_string();
        let record = record.clone();
        self.with_conn(move |conn| {
            let id = new_id();
            conn.execute(
                "INSERT INTO images (id, user_id, description, labels, objects, text_content,
                    potential_products, timestamp, location, session_id)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    id,
                    user_id,
                    record.description,
                    to_json(&record.labels)?,
                    to_json(&record.objects)?,
                    record.text_content,
                    to_json(&record.potential_products)?,
                    record.timestamp,
                    record.location,
                    record.session_id,
                ],
            )
            .map_err(storage_err("Failed to insert image"))?;
            Ok(id)
        })
        .await
    }

    async fn insert_item_location(
        &self,
        user_id: &str,
        record: &ItemLocationRecord,
    ) -> Result<String> {
        let user_id = user_id.to_string();
        let record = record.clone();
        self.with_conn(move |conn| {
            let id = new_id();
            conn.execute(
                "INSERT INTO item_locations (id, user_id, items, storage_location, location,
                    timestamp, image_ref)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    id,
                    user_id,
                    to_json(&record.items)?,
                    record.storage_location,
                    record.location,
                    record.timestamp,
                    record.image_ref,
                ],
            )
            .map_err(storage_err("Failed to insert item location"))?;
            Ok(id)
        })
        .await
    }

    async fn insert_interaction(
        &self,
        user_id: &str,
        record: &InteractionRecord,
    ) -> Result<String> {
        let user_id = user_id.to_string();
        let record = record.clone();
        self.with_conn(move |conn| {
            let id = new_id();
            conn.execute(
                "INSERT INTO interactions (id, user_id, kind, query, response, confidence,
                    product_recommendations, timestamp, session_id)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    id,
                    user_id,
                    record.kind.as_str(),
                    record.query,
                    record.response,
                    record.confidence,
                    to_json(&record.product_recommendations)?,
                    record.timestamp,
                    record.session_id,
                ],
            )
            .map_err(storage_err("Failed to insert interaction"))?;
            Ok(id)
        })
        .await
    }

    async fn recent_images(&self, user_id: &str, limit: usize) -> Result<Vec<ImageAnalysisRecord>> {
        let user_id = user_id.to_string();
        self.with_conn(move |conn| {
            let sql = format!(
                "SELECT {} FROM images WHERE user_id = ?1
                 ORDER BY timestamp DESC, rowid DESC LIMIT ?2",
                IMAGE_COLUMNS
            );
            let mut stmt = conn
                .prepare(&sql)
                .map_err(storage_err("Failed to prepare image query"))?;
            let rows = stmt
                .query_map(params![user_id, limit as i64], image_from_row)
                .map_err(storage_err("Failed to query images"))?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
                .map_err(storage_err("Failed to read image row"))
        })
        .await
    }

    async fn recent_item_locations(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<ItemLocationRecord>> {
        let user_id = user_id.to_string();
        self.with_conn(move |conn| {
            let sql = format!(
                "SELECT {} FROM item_locations WHERE user_id = ?1
                 ORDER BY timestamp DESC, rowid DESC LIMIT ?2",
                LOCATION_COLUMNS
            );
            let mut stmt = conn
                .prepare(&sql)
                .map_err(storage_err("Failed to prepare item location query"))?;
            let rows = stmt
                .query_map(params![user_id, limit as i64], location_from_row)
                .map_err(storage_err("Failed to query item locations"))?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
                .map_err(storage_err("Failed to read item location row"))
        })
        .await
    }

    async fn latest_location_with_item(
        &self,
        user_id: &str,
        item: &str,
    ) -> Result<Option<ItemLocationRecord>> {
        let user_id = user_id.to_string();
        let item = item.to_string();
        self.with_conn(move |conn| {
            let sql = format!(
                "SELECT {} FROM item_locations
                 WHERE user_id = ?1
                   AND EXISTS (SELECT 1 FROM json_each(item_locations.items)
                               WHERE json_each.value = ?2)
                 ORDER BY timestamp DESC, rowid DESC LIMIT 1",
                LOCATION_COLUMNS
            );
            conn.query_row(&sql, params![user_id, item], location_from_row)
                .optional()
                .map_err(storage_err("Failed to query item membership"))
        })
        .await
    }

    async fn latest_image_with_product(
        &self,
        user_id: &str,
        product: &str,
    ) -> Result<Option<ImageAnalysisRecord>> {
        let user_id = user_id.to_string();
        let product = product.to_string();
        self.with_conn(move |conn| {
            let sql = format!(
                "SELECT {} FROM images
                 WHERE user_id = ?1
                   AND EXISTS (SELECT 1 FROM json_each(images.potential_products)
                               WHERE json_each.value = ?2)
                 ORDER BY timestamp DESC, rowid DESC LIMIT 1",
                IMAGE_COLUMNS
            );
            conn.query_row(&sql, params![user_id, product], image_from_row)
                .optional()
                .map_err(storage_err("Failed to query product membership"))
        })
        .await
    }
}
