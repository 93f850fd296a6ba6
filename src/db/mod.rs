use crate::session::models::UploadedFile;
use rusqlite::{params, Connection, OptionalExtension, Result};
use std::path::Path;

const UPLOAD_ID_KEY: &str = "current_upload_id";
const ACTIVE_FILE_KEY: &str = "active_file";

/// Local SQLite store: gateway settings plus the best-effort upload cache.
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(app_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(app_dir).ok();
        let db_path = app_dir.join("pulse-chat.db");
        let conn = Connection::open(db_path)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    pub fn in_memory() -> Result<Self> {
        let db = Self {
            conn: Connection::open_in_memory()?,
        };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS session_cache (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            ",
        )?;
        Ok(())
    }

    // ── Settings ──

    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn delete_setting(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM settings WHERE key = ?1", params![key])?;
        Ok(())
    }

    // ── Upload cache ──

    pub fn cache_active_file(&self, file: &UploadedFile) -> Result<()> {
        let serialized = serde_json::to_string(file)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
        let tx = self.conn.unchecked_transaction()?;
        if let Some(upload_id) = file.chat_id() {
            tx.execute(
                "INSERT OR REPLACE INTO session_cache (key, value) VALUES (?1, ?2)",
                params![UPLOAD_ID_KEY, upload_id],
            )?;
        }
        tx.execute(
            "INSERT OR REPLACE INTO session_cache (key, value) VALUES (?1, ?2)",
            params![ACTIVE_FILE_KEY, serialized],
        )?;
        tx.commit()
    }

    pub fn cached_upload_id(&self) -> Result<Option<String>> {
        self.cache_value(UPLOAD_ID_KEY)
    }

    /// A cached descriptor that no longer deserializes is treated as absent.
    pub fn cached_active_file(&self) -> Result<Option<UploadedFile>> {
        Ok(self
            .cache_value(ACTIVE_FILE_KEY)?
            .and_then(|raw| serde_json::from_str(&raw).ok()))
    }

    pub fn clear_cache(&self) -> Result<()> {
        self.conn.execute("DELETE FROM session_cache", [])?;
        Ok(())
    }

    fn cache_value(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM session_cache WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
    }
}
