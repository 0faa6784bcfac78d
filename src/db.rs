// 🗄️ SQLite Config Store - the whole config document as one JSON row + WAL

use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use tracing::{debug, info};

use crate::config::{ConfigDocument, ConfigStore, StoreError};

/// Key of the single row holding the document
const DOCUMENT_KEY: &str = "config";

pub fn setup_database(conn: &Connection) -> Result<(), StoreError> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS config (
            key TEXT PRIMARY KEY NOT NULL,
            document TEXT NOT NULL,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    Ok(())
}

pub struct SqliteConfigStore {
    conn: Connection,
}

impl SqliteConfigStore {
    /// Open (or create) the database file and prepare the schema
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref())?;
        setup_database(&conn)?;
        info!(path = %path.as_ref().display(), "opened config store");
        Ok(SqliteConfigStore { conn })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        setup_database(&conn)?;
        Ok(SqliteConfigStore { conn })
    }

    pub fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        setup_database(&conn)?;
        Ok(SqliteConfigStore { conn })
    }
}

impl ConfigStore for SqliteConfigStore {
    /// A database with no stored document yields the default document
    fn load(&self) -> Result<ConfigDocument, StoreError> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT document FROM config WHERE key = ?1",
                params![DOCUMENT_KEY],
                |row| row.get(0),
            )
            .optional()?;

        match raw {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(ConfigDocument::default()),
        }
    }

    fn save(&self, document: &ConfigDocument) -> Result<(), StoreError> {
        let json = serde_json::to_string(document)?;

        self.conn.execute(
            "INSERT INTO config (key, document, updated_at)
             VALUES (?1, ?2, CURRENT_TIMESTAMP)
             ON CONFLICT(key) DO UPDATE SET
                document = excluded.document,
                updated_at = excluded.updated_at",
            params![DOCUMENT_KEY, json],
        )?;

        debug!(
            templates = document.import_templates.len(),
            "saved config document"
        );
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
