//! # Interaction Store Adapter
//!
//! Read/write access to the two interaction partitions ("real" and "simulated").
//! The ranking engine only sees the [`InteractionStore`] trait; the SQLite
//! implementation opens a fresh connection per operation so every call has its
//! own scoped access to the database.
//!
//! ## Schema
//!
//! Both partitions share one layout:
//!
//! ```text
//! id INTEGER PRIMARY KEY, user_id TEXT, track_id TEXT, track_name TEXT,
//! artist_name TEXT, album_name TEXT, popularity INTEGER
//! ```
//!
//! A partition table that does not exist yet reads as empty. Reads never create
//! the database file: a store whose file is missing reads as two empty partitions.
//! Writes create the file, its parent directory and both tables on demand.

use crate::error::Result;
use crate::interaction::{InteractionRecord, InteractionSnapshot, Partition, TrackDisplay};
use log::{debug, info, trace};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Transaction, TransactionBehavior};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Storage backend for interaction records.
pub trait InteractionStore {
    /// Read every record of both partitions as one consistent snapshot.
    fn snapshot(&self) -> Result<InteractionSnapshot>;

    /// Display fields of the first row in `partition` carrying `track_id`.
    fn first_display(&self, partition: Partition, track_id: &str) -> Result<Option<TrackDisplay>>;

    /// Replace every real-partition row of `user_id` with `records`.
    ///
    /// `None` addresses rows recorded without a user id. Returns the number of rows written.
    fn replace_user_history(&self, user_id: Option<&str>, records: &[InteractionRecord]) -> Result<usize>;

    /// Replace the whole simulated partition with `records`. Returns rows written.
    fn replace_simulated(&self, records: &[InteractionRecord]) -> Result<usize>;
}

/// SQLite-backed interaction store.
#[derive(Debug, Clone)]
pub struct SqliteInteractionStore {
    db_path: PathBuf,
}

impl SqliteInteractionStore {
    /// Store backed by the database file at `db_path`. Nothing is opened yet.
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    /// Opens the store for writing, creating the database when it is missing.
    ///
    /// The parent directory of `db_path` is created if needed, then both
    /// partition tables (`interactions_real`, `interactions_simulated`) and
    /// their indexes are created if they do not exist yet. Existing rows are
    /// left untouched.
    ///
    /// Read-only callers (ranking, KPIs, metadata lookups) can use
    /// [`SqliteInteractionStore::new`] instead, which never touches the
    /// filesystem until a read and never creates anything.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Io`](crate::EngineError::Io) if the parent
    /// directory cannot be created, and
    /// [`EngineError::Storage`](crate::EngineError::Storage) if SQLite cannot
    /// open the file or create the schema.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use colisten::store::{InteractionStore, SqliteInteractionStore};
    ///
    /// let store = SqliteInteractionStore::open("/tmp/colisten/colisten.db")?;
    /// assert!(store.snapshot()?.is_empty());
    /// # Ok::<(), colisten::EngineError>(())
    /// ```
    pub fn open(db_path: impl Into<PathBuf>) -> Result<Self> {
        let store = Self::new(db_path);
        if let Some(parent) = store.db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let conn = store.connect()?;
        for partition in Partition::ALL {
            create_partition_table(&conn, partition)?;
        }
        info!("Interaction store ready at {}", store.db_path.display());
        Ok(store)
    }

    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.db_path)?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        Ok(conn)
    }

    /// Read-only connection, or `None` when the database file does not exist.
    fn connect_existing(&self) -> Result<Option<Connection>> {
        if !self.db_path.exists() {
            debug!("No database at {}, reading as empty", self.db_path.display());
            return Ok(None);
        }
        let conn = Connection::open_with_flags(
            &self.db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        Ok(Some(conn))
    }
}

fn create_partition_table(conn: &Connection, partition: Partition) -> Result<()> {
    let table = partition.table();
    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS {table} (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id     TEXT,
            track_id    TEXT,
            track_name  TEXT,
            artist_name TEXT,
            album_name  TEXT,
            popularity  INTEGER
        );
        CREATE INDEX IF NOT EXISTS idx_{table}_track ON {table}(track_id);
        CREATE INDEX IF NOT EXISTS idx_{table}_user ON {table}(user_id);"
    ))?;
    Ok(())
}

fn partition_exists(conn: &Connection, partition: Partition) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [partition.table()],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn read_partition(conn: &Connection, partition: Partition) -> Result<Vec<InteractionRecord>> {
    if !partition_exists(conn, partition)? {
        debug!("Partition `{partition}` has no table yet, reading as empty");
        return Ok(Vec::new());
    }

    let mut stmt = conn.prepare(&format!(
        "SELECT user_id, track_id, track_name, artist_name, album_name, popularity FROM {}",
        partition.table()
    ))?;

    let rows = stmt.query_map([], |row| {
        Ok(InteractionRecord {
            user_id: row.get(0)?,
            track_id: row.get(1)?,
            track_name: row.get(2)?,
            artist_name: row.get(3)?,
            album_name: row.get(4)?,
            popularity: row.get::<_, Option<i64>>(5)?.unwrap_or(0),
        })
    })?;

    let records = rows.collect::<rusqlite::Result<Vec<_>>>()?;
    trace!("Read {} rows from `{partition}`", records.len());
    Ok(records)
}

/// Insert `records`, skipping repeated (user, track) pairs so the partition never
/// holds the same pair twice.
fn insert_records(
    tx: &Transaction<'_>,
    partition: Partition,
    user_override: Option<Option<&str>>,
    records: &[InteractionRecord],
) -> Result<usize> {
    let mut stmt = tx.prepare(&format!(
        "INSERT INTO {} (user_id, track_id, track_name, artist_name, album_name, popularity)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        partition.table()
    ))?;

    let mut seen: HashSet<(Option<&str>, &str)> = HashSet::new();
    let mut written = 0;
    for record in records {
        let user_id = user_override.unwrap_or(record.user_id.as_deref());
        if let Some(track) = record.track_key() {
            if !seen.insert((user_id, track)) {
                trace!("Dropping repeated pair ({user_id:?}, {track}) for `{partition}`");
                continue;
            }
        }
        stmt.execute(params![
            user_id,
            record.track_id,
            record.track_name,
            record.artist_name,
            record.album_name,
            record.popularity,
        ])?;
        written += 1;
    }
    Ok(written)
}

impl InteractionStore for SqliteInteractionStore {
    fn snapshot(&self) -> Result<InteractionSnapshot> {
        let Some(mut conn) = self.connect_existing()? else {
            return Ok(InteractionSnapshot::default());
        };
        let tx = conn.transaction_with_behavior(TransactionBehavior::Deferred)?;
        let snapshot = InteractionSnapshot {
            real: read_partition(&tx, Partition::Real)?,
            simulated: read_partition(&tx, Partition::Simulated)?,
        };
        tx.finish()?;

        debug!(
            "Snapshot: {} real rows, {} simulated rows",
            snapshot.real.len(),
            snapshot.simulated.len()
        );
        Ok(snapshot)
    }

    fn first_display(&self, partition: Partition, track_id: &str) -> Result<Option<TrackDisplay>> {
        let Some(conn) = self.connect_existing()? else {
            return Ok(None);
        };
        if !partition_exists(&conn, partition)? {
            return Ok(None);
        }

        let display = conn
            .query_row(
                &format!(
                    "SELECT track_name, artist_name FROM {} WHERE track_id = ?1 LIMIT 1",
                    partition.table()
                ),
                [track_id],
                |row| {
                    Ok(TrackDisplay {
                        track_name: row.get(0)?,
                        artist_name: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(display)
    }

    fn replace_user_history(&self, user_id: Option<&str>, records: &[InteractionRecord]) -> Result<usize> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        create_partition_table(&tx, Partition::Real)?;

        // `IS` matches NULL as well as text
        let removed = tx.execute(
            &format!("DELETE FROM {} WHERE user_id IS ?1", Partition::Real.table()),
            [user_id],
        )?;
        let written = insert_records(&tx, Partition::Real, Some(user_id), records)?;
        tx.commit()?;

        info!(
            "Replaced listening history for {}: {removed} old rows removed, {written} written",
            user_id.unwrap_or("<unknown user>")
        );
        Ok(written)
    }

    fn replace_simulated(&self, records: &[InteractionRecord]) -> Result<usize> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        create_partition_table(&tx, Partition::Simulated)?;

        let removed = tx.execute(&format!("DELETE FROM {}", Partition::Simulated.table()), [])?;
        let written = insert_records(&tx, Partition::Simulated, None, records)?;
        tx.commit()?;

        info!("Replaced simulated partition: {removed} old rows removed, {written} written");
        Ok(written)
    }
}
