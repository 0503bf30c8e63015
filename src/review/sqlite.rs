//! SQLite-backed review sink
//!
//! Persists review-flagged records to a single table keyed by record
//! id, storing the review reasons alongside the full serialized record
//! so reviewers can triage without re-running the pipeline.
//! Thread-safe via an internal mutex on the connection.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection};
use tracing::debug;

use super::{ReviewError, ReviewSink};
use crate::model::VoterRecord;

/// Review sink writing to a SQLite database.
pub struct SqliteReviewSink {
    conn: Mutex<Connection>,
}

impl SqliteReviewSink {
    /// Open or create a review database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ReviewError> {
        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory sink (useful for testing).
    pub fn open_in_memory() -> Result<Self, ReviewError> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_schema(conn: &Connection) -> Result<(), ReviewError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS review_queue (
                record_id TEXT PRIMARY KEY,
                queued_at TEXT NOT NULL,
                overall_confidence REAL NOT NULL,
                review_reasons TEXT NOT NULL,
                record_json TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_review_queued_at
                ON review_queue(queued_at);
            "#,
        )?;
        Ok(())
    }

    /// Record ids currently queued, oldest first.
    pub fn queued_ids(&self) -> Result<Vec<String>, ReviewError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT record_id FROM review_queue ORDER BY queued_at, record_id")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    /// Load a queued record by id.
    pub fn load(&self, record_id: &str) -> Result<Option<VoterRecord>, ReviewError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT record_json FROM review_queue WHERE record_id = ?1")?;
        let mut rows = stmt.query_map(params![record_id], |row| row.get::<_, String>(0))?;
        match rows.next() {
            Some(json) => Ok(Some(serde_json::from_str(&json?)?)),
            None => Ok(None),
        }
    }

    /// Number of queued records.
    pub fn len(&self) -> Result<usize, ReviewError> {
        let conn = self.conn.lock().unwrap();
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM review_queue", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[async_trait]
impl ReviewSink for SqliteReviewSink {
    async fn enqueue(&self, record: &VoterRecord) -> Result<(), ReviewError> {
        let reasons = serde_json::to_string(&record.review_reasons)?;
        let payload = serde_json::to_string(record)?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT OR REPLACE INTO review_queue
                (record_id, queued_at, overall_confidence, review_reasons, record_json)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                record.record_id,
                Utc::now().to_rfc3339(),
                record.overall_confidence,
                reasons,
                payload,
            ],
        )?;
        debug!(record_id = %record.record_id, "record enqueued for review");
        Ok(())
    }
}
