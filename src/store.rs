//! SQLite store handle.
//!
//! The store is opened read-only, once, during startup. Statements run on
//! tokio's blocking pool behind a mutex so a slow query never stalls the
//! async workers. Rows come back as JSON objects keyed by column name, in
//! storage column order, so `SELECT *` results pass through unchanged.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use rusqlite::types::ValueRef;
use rusqlite::{params_from_iter, Connection, OpenFlags, OptionalExtension};
use serde_json::{Map, Number, Value};
use thiserror::Error;
use tracing::debug;

/// One result row: column name → JSON value.
pub type Row = Map<String, Value>;

/// A bound statement parameter. `None` binds SQL `NULL`.
pub type Bind = Option<String>;

/// Errors raised while opening the store or running a statement.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Driver error, shown verbatim.
    #[error("{0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A previous statement panicked while holding the connection.
    #[error("database connection poisoned")]
    Poisoned,
    /// The blocking task running the statement did not complete.
    #[error("database task failed: {0}")]
    Join(String),
}

/// Where and how to open the database.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path to the SQLite database file. It must already exist.
    pub path: PathBuf,
    /// How long a statement waits on a locked database before failing.
    pub busy_timeout: Duration,
}

impl StoreConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), busy_timeout: Duration::from_millis(5_000) }
    }
}

/// Shared, read-only database handle. Cloning shares the connection.
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    /// Opens an existing database file read-only.
    pub fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(&config.path, flags)?;
        conn.busy_timeout(config.busy_timeout)?;
        debug!(path = %config.path.display(), "sqlite connection opened");
        Ok(Self::from_connection(conn))
    }

    /// Wraps an already open connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn: Arc::new(Mutex::new(conn)) }
    }

    /// Runs `sql` and returns every row.
    pub async fn fetch_all(&self, sql: &'static str, binds: Vec<Bind>) -> Result<Vec<Row>, StoreError> {
        self.run(move |conn| {
            let mut stmt = conn.prepare_cached(sql)?;
            let columns = column_names(&stmt);
            let rows = stmt
                .query_map(params_from_iter(binds.iter()), |row| row_to_json(row, &columns))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
    }

    /// Runs `sql` and returns the first row, if any. Further rows are ignored.
    pub async fn fetch_one(&self, sql: &'static str, binds: Vec<Bind>) -> Result<Option<Row>, StoreError> {
        self.run(move |conn| {
            let mut stmt = conn.prepare_cached(sql)?;
            let columns = column_names(&stmt);
            let row = stmt
                .query_row(params_from_iter(binds.iter()), |row| row_to_json(row, &columns))
                .optional()?;
            Ok(row)
        })
        .await
    }

    /// Round-trips a trivial statement to prove the connection is usable.
    pub async fn ping(&self) -> Result<(), StoreError> {
        self.run(|conn| conn.query_row("SELECT 1", [], |_| Ok(()))).await
    }

    async fn run<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().map_err(|_| StoreError::Poisoned)?;
            f(&conn).map_err(StoreError::from)
        })
        .await
        .map_err(|e| StoreError::Join(e.to_string()))?
    }
}

fn column_names(stmt: &rusqlite::Statement<'_>) -> Vec<String> {
    stmt.column_names().into_iter().map(str::to_owned).collect()
}

fn row_to_json(row: &rusqlite::Row<'_>, columns: &[String]) -> rusqlite::Result<Row> {
    let mut out = Row::with_capacity(columns.len());
    for (idx, name) in columns.iter().enumerate() {
        let value = match row.get_ref(idx)? {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(n) => Value::from(n),
            ValueRef::Real(f) => real_to_json(f),
            ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Value::Array(b.iter().map(|&byte| Value::from(byte)).collect()),
        };
        out.insert(name.clone(), value);
    }
    Ok(out)
}

/// Whole floats within the exactly-representable integer range are written
/// as integers (`300`, not `300.0`). NaN and infinities have no JSON form.
fn real_to_json(f: f64) -> Value {
    const EXACT: f64 = 9_007_199_254_740_992.0; // 2^53
    if f.is_finite() && f.fract() == 0.0 && f.abs() < EXACT {
        Value::from(f as i64)
    } else {
        Number::from_f64(f).map_or(Value::Null, Value::Number)
    }
}

/// Startup-filled slot for the [`Store`].
///
/// `main` opens the store and fills the slot before the listener binds, so in
/// a running process [`SharedStore::get`] always succeeds. A slot that was
/// never filled answers every query with [`NotReady`].
#[derive(Clone, Default)]
pub struct SharedStore(Arc<OnceLock<Store>>);

/// The slot holds no store.
#[derive(Debug, Error)]
#[error("Database not initialized yet")]
pub struct NotReady;

impl SharedStore {
    /// An empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// A slot already holding `store`.
    pub fn ready(store: Store) -> Self {
        Self(Arc::new(OnceLock::from(store)))
    }

    pub fn get(&self) -> Result<&Store, NotReady> {
        self.0.get().ok_or(NotReady)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> Store {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE samples (id INTEGER PRIMARY KEY, label TEXT, score REAL, raw BLOB, note TEXT);
            INSERT INTO samples VALUES (1, 'alpha', 4.5, x'0102', NULL);
            INSERT INTO samples VALUES (2, 'beta', 3.0, NULL, 'n');
            "#,
        )
        .unwrap();
        Store::from_connection(conn)
    }

    #[tokio::test]
    async fn rows_keep_column_order_and_storage_types() {
        let rows = seeded()
            .fetch_all("SELECT * FROM samples WHERE id = ?", vec![Some("1".into())])
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        let keys: Vec<_> = rows[0].keys().map(String::as_str).collect();
        assert_eq!(keys, ["id", "label", "score", "raw", "note"]);
        assert_eq!(rows[0]["id"], 1);
        assert_eq!(rows[0]["label"], "alpha");
        assert_eq!(rows[0]["score"], 4.5);
        assert_eq!(rows[0]["raw"], serde_json::json!([1, 2]));
        assert_eq!(rows[0]["note"], Value::Null);
    }

    #[tokio::test]
    async fn null_bind_matches_nothing() {
        let rows = seeded()
            .fetch_all("SELECT * FROM samples WHERE note = ?", vec![None])
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn fetch_one_takes_the_first_row() {
        let store = seeded();
        let row = store
            .fetch_one("SELECT * FROM samples ORDER BY id", Vec::new())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row["label"], "alpha");
        let none = store
            .fetch_one("SELECT * FROM samples WHERE id = ?", vec![Some("9".into())])
            .await
            .unwrap();
        assert!(none.is_none());
    }

    #[tokio::test]
    async fn driver_errors_surface_verbatim() {
        let err = seeded()
            .fetch_all("SELECT * FROM missing", Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Sqlite(_)));
        assert!(err.to_string().contains("no such table: missing"), "{err}");
    }

    #[tokio::test]
    async fn ping_succeeds_on_open_connection() {
        seeded().ping().await.unwrap();
    }

    #[test]
    fn opening_a_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::new(dir.path().join("absent.sqlite"));
        assert!(matches!(Store::open(&config), Err(StoreError::Sqlite(_))));
    }

    #[test]
    fn opened_store_is_read_only() {
        let file = tempfile::NamedTempFile::new().unwrap();
        Connection::open(file.path())
            .unwrap()
            .execute_batch("CREATE TABLE t (x INTEGER);")
            .unwrap();
        let store = Store::open(&StoreConfig::new(file.path())).unwrap();
        let conn = store.conn.lock().unwrap();
        assert!(conn.execute("INSERT INTO t VALUES (1)", []).is_err());
    }

    #[test]
    fn empty_slot_is_not_ready() {
        let slot = SharedStore::new();
        assert_eq!(slot.get().err().map(|e| e.to_string()).as_deref(), Some("Database not initialized yet"));
    }

    #[test]
    fn ready_slot_is_shared_by_clones() {
        let slot = SharedStore::ready(seeded());
        let clone = slot.clone();
        assert!(std::ptr::eq(slot.get().unwrap(), clone.get().unwrap()));
    }

    #[tokio::test]
    async fn whole_reals_are_written_as_integers() {
        let rows = seeded()
            .fetch_all("SELECT score FROM samples WHERE id = ?", vec![Some("2".into())])
            .await
            .unwrap();
        assert!(rows[0]["score"].is_i64());
        assert_eq!(serde_json::to_string(&rows[0]["score"]).unwrap(), "3");
    }

    #[test]
    fn non_integral_and_huge_reals_stay_floats() {
        assert_eq!(real_to_json(4.5), 4.5);
        assert!(real_to_json(1e300).is_f64());
        assert_eq!(real_to_json(-0.0), 0);
        assert_eq!(real_to_json(f64::NAN), Value::Null);
    }
}
