mod schema;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, Connection, Row};
use serde_json::Number;
use uuid::Uuid;

use crate::models::*;

pub use schema::SCHEMA;

/// File name used by [`Database::open_default`].
pub const DEFAULT_DATABASE_FILE: &str = "feedback.db";

/// Shared handle to the SQLite store.
///
/// Cloning is cheap and every clone talks to the same connection, so the
/// handle is built once at startup and passed to whoever needs it.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("handles", &Arc::strong_count(&self.conn))
            .finish()
    }
}

impl Database {
    /// Open (or create) a database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {}", path.display()))?;
        Ok(Self::from_connection(conn))
    }

    /// Open the database in the platform data directory.
    pub fn open_default() -> Result<Self> {
        let path = Self::default_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        Self::open(path)
    }

    /// Open a private in-memory database. Mostly useful for tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
        Ok(Self::from_connection(conn))
    }

    /// Location used by [`Database::open_default`].
    pub fn default_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "feedback-widget")
            .ok_or_else(|| anyhow!("could not determine a data directory"))?;
        Ok(dirs.data_dir().join(DEFAULT_DATABASE_FILE))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Returns `true` when both handles refer to the same underlying store.
    pub fn shares_store(a: &Database, b: &Database) -> bool {
        Arc::ptr_eq(&a.conn, &b.conn)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("database connection mutex poisoned"))
    }

    /// Create the tables if they do not exist yet.
    pub fn migrate(&self) -> Result<()> {
        self.conn()?
            .execute_batch(SCHEMA)
            .context("failed to apply schema")?;
        Ok(())
    }

    // ============================================================
    // Feedback
    // ============================================================

    pub fn create_feedback(&self, input: CreateFeedbackInput) -> Result<Feedback> {
        let feedback = Feedback {
            id: Uuid::new_v4(),
            name: input.name,
            email: input.email,
            message: input.message,
            rating: input.rating,
            // Stored with microsecond precision, so truncate up front to keep
            // the returned record identical to what a later read yields.
            created_at: Utc::now().trunc_subsecs(6),
        };

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO Feedback (id, name, email, message, rating, createdAt)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                feedback.id.to_string(),
                feedback.name,
                feedback.email,
                feedback.message,
                feedback.rating.as_ref().and_then(rating_to_sql),
                format_timestamp(&feedback.created_at),
            ],
        )
        .map_err(|e| {
            tracing::warn!(error = %e, "feedback insert rejected");
            anyhow::Error::from(e).context("failed to insert feedback")
        })?;

        Ok(feedback)
    }

    /// All feedback, newest first.
    pub fn list_feedback(&self) -> Result<Vec<Feedback>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, email, message, rating, createdAt
             FROM Feedback
             ORDER BY createdAt DESC, rowid DESC",
        )?;

        let feedbacks = stmt
            .query_map([], row_to_feedback)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| {
                tracing::warn!(error = %e, "failed to read feedback rows");
                anyhow::Error::from(e).context("failed to list feedback")
            })?;

        Ok(feedbacks)
    }

    pub fn count_feedback(&self) -> Result<usize> {
        let count: i64 = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM Feedback", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn rating_to_sql(rating: &Number) -> Option<SqlValue> {
    rating
        .as_i64()
        .map(SqlValue::Integer)
        .or_else(|| rating.as_f64().map(SqlValue::Real))
}

fn rating_from_sql(value: SqlValue) -> std::result::Result<Option<Number>, RatingColumnError> {
    match value {
        SqlValue::Null => Ok(None),
        SqlValue::Integer(i) => Ok(Some(Number::from(i))),
        SqlValue::Real(f) => Number::from_f64(f).map(Some).ok_or(RatingColumnError),
        SqlValue::Text(_) | SqlValue::Blob(_) => Err(RatingColumnError),
    }
}

#[derive(Debug)]
struct RatingColumnError;

impl std::fmt::Display for RatingColumnError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("rating column does not hold a number")
    }
}

impl std::error::Error for RatingColumnError {}

fn row_to_feedback(row: &Row<'_>) -> rusqlite::Result<Feedback> {
    let id: String = row.get(0)?;
    let created_at: String = row.get(5)?;

    Ok(Feedback {
        id: Uuid::parse_str(&id).map_err(|e| conversion_error(0, e))?,
        name: row.get(1)?,
        email: row.get(2)?,
        message: row.get(3)?,
        rating: rating_from_sql(row.get(4)?).map_err(|e| conversion_error(4, e))?,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| conversion_error(5, e))?
            .with_timezone(&Utc),
    })
}

fn conversion_error(
    column: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(err))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();
        db
    }

    fn input(message: &str) -> CreateFeedbackInput {
        CreateFeedbackInput {
            message: message.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn create_returns_stored_record() {
        let db = test_db();

        let created = db
            .create_feedback(CreateFeedbackInput {
                name: Some("Ada".into()),
                email: Some("ada@example.com".into()),
                message: "Great app!".into(),
                rating: Some(Number::from(5)),
            })
            .unwrap();

        let all = db.list_feedback().unwrap();
        assert_eq!(all, vec![created]);
    }

    #[test]
    fn ratings_round_trip_as_given() {
        let db = test_db();

        for rating in [
            Number::from(5),
            Number::from(-3),
            Number::from_f64(4.5).unwrap(),
            Number::from_f64(5.0).unwrap(),
        ] {
            db.create_feedback(CreateFeedbackInput {
                message: "rated".into(),
                rating: Some(rating),
                ..Default::default()
            })
            .unwrap();
        }

        let ratings: Vec<String> = db
            .list_feedback()
            .unwrap()
            .into_iter()
            .map(|f| f.rating.unwrap().to_string())
            .collect();
        assert_eq!(ratings, vec!["5.0", "4.5", "-3", "5"]);
    }

    #[test]
    fn list_is_newest_first() {
        let db = test_db();

        let first = db.create_feedback(input("first")).unwrap();
        let second = db.create_feedback(input("second")).unwrap();
        let third = db.create_feedback(input("third")).unwrap();

        let ids: Vec<Uuid> = db.list_feedback().unwrap().iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);
    }

    #[test]
    fn create_never_touches_existing_rows() {
        let db = test_db();

        let kept = db.create_feedback(input("keep me")).unwrap();
        for i in 0..5 {
            db.create_feedback(input(&format!("more {i}"))).unwrap();
        }

        let all = db.list_feedback().unwrap();
        assert_eq!(all.len(), 6);
        assert_eq!(all.last(), Some(&kept));
        assert_eq!(db.count_feedback().unwrap(), 6);
    }

    #[test]
    fn empty_message_is_rejected_by_store() {
        let db = test_db();

        assert!(db.create_feedback(input("")).is_err());
        assert_eq!(db.count_feedback().unwrap(), 0);
    }

    #[test]
    fn list_fails_without_schema() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.list_feedback().is_err());
    }

    #[test]
    fn migrate_is_idempotent() {
        let db = test_db();
        db.create_feedback(input("survives")).unwrap();
        db.migrate().unwrap();
        assert_eq!(db.count_feedback().unwrap(), 1);
    }

    #[test]
    fn clones_share_one_store() {
        let db = test_db();
        let other = db.clone();

        assert!(Database::shares_store(&db, &other));
        other.create_feedback(input("via clone")).unwrap();
        assert_eq!(db.count_feedback().unwrap(), 1);

        let unrelated = test_db();
        assert!(!Database::shares_store(&db, &unrelated));
    }

    #[test]
    fn file_database_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_DATABASE_FILE);

        {
            let db = Database::open(&path).unwrap();
            db.migrate().unwrap();
            db.create_feedback(input("persisted")).unwrap();
        }

        let db = Database::open(&path).unwrap();
        db.migrate().unwrap();
        let all = db.list_feedback().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].message, "persisted");
    }
}
