use crate::app_dirs::AppDirs;
use crate::error::StoreError;
use crate::stats::{Penalty, SolveRecord};
use chrono::{DateTime, Local};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Where solve histories live. Keys are opaque to the store.
pub trait SolveStore {
    /// Newest-first history for `key`; empty when nothing was saved yet.
    fn load(&self, key: &str) -> Result<Vec<SolveRecord>, StoreError>;
    /// Replace everything stored under `key`.
    fn save(&mut self, key: &str, history: &[SolveRecord]) -> Result<(), StoreError>;
}

/// SQLite-backed solve store
#[derive(Debug)]
pub struct SqliteSolveStore {
    conn: Connection,
}

impl SqliteSolveStore {
    /// Open the database at the default state path
    pub fn new() -> Result<Self, StoreError> {
        let db_path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("twisty_solves.db"));
        Self::open(db_path)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        info!(path = %path.display(), "opening solve store");
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS solves (
                session TEXT NOT NULL,
                id INTEGER NOT NULL,
                raw_time_ms INTEGER NOT NULL,
                penalty TEXT NOT NULL,
                created_at TEXT NOT NULL,
                PRIMARY KEY (session, id)
            )
            "#,
            [],
        )?;

        Ok(Self { conn })
    }

    /// Every key with at least one stored solve
    pub fn sessions(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT session FROM solves ORDER BY session")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut sessions = Vec::new();
        for session in rows {
            sessions.push(session?);
        }
        Ok(sessions)
    }
}

impl SolveStore for SqliteSolveStore {
    fn load(&self, key: &str) -> Result<Vec<SolveRecord>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, raw_time_ms, penalty, created_at
            FROM solves
            WHERE session = ?1
            ORDER BY id DESC
            "#,
        )?;

        let rows = stmt.query_map([key], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, raw_time_ms, penalty, created_at) = row?;
            records.push(decode_row(id, raw_time_ms, &penalty, &created_at)?);
        }

        debug!(key, count = records.len(), "loaded solves");
        Ok(records)
    }

    fn save(&mut self, key: &str, history: &[SolveRecord]) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM solves WHERE session = ?1", [key])?;

        for record in history {
            tx.execute(
                r#"
                INSERT INTO solves (session, id, raw_time_ms, penalty, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![
                    key,
                    record.id,
                    record.raw_time_ms,
                    record.penalty.as_str(),
                    record.created_at.to_rfc3339(),
                ],
            )?;
        }

        tx.commit()?;
        debug!(key, count = history.len(), "saved solves");
        Ok(())
    }
}

fn decode_row(
    id: i64,
    raw_time_ms: i64,
    penalty: &str,
    created_at: &str,
) -> Result<SolveRecord, StoreError> {
    let corrupt = |reason: String| StoreError::CorruptRow { id, reason };

    let penalty = Penalty::parse(penalty).ok_or_else(|| corrupt(format!("penalty '{penalty}'")))?;
    let created_at = DateTime::parse_from_rfc3339(created_at)
        .map_err(|e| corrupt(format!("timestamp: {e}")))?
        .with_timezone(&Local);
    let raw_time_ms =
        u64::try_from(raw_time_ms).map_err(|_| corrupt(format!("time {raw_time_ms}")))?;
    let record_id = u64::try_from(id).map_err(|_| corrupt("negative id".to_string()))?;

    Ok(SolveRecord {
        id: record_id,
        raw_time_ms,
        created_at,
        penalty,
    })
}

/// Store that keeps everything in a map. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemorySolveStore {
    sessions: std::collections::HashMap<String, Vec<SolveRecord>>,
}

impl SolveStore for MemorySolveStore {
    fn load(&self, key: &str) -> Result<Vec<SolveRecord>, StoreError> {
        Ok(self.sessions.get(key).cloned().unwrap_or_default())
    }

    fn save(&mut self, key: &str, history: &[SolveRecord]) -> Result<(), StoreError> {
        self.sessions.insert(key.to_string(), history.to_vec());
        Ok(())
    }
}
