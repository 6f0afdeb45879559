//! SQLite storage implementation.
//!
//! Every write goes through [`SqliteStorage::mutate`], which wraps the
//! work in an IMMEDIATE transaction so a push is all-or-nothing and
//! concurrent invocations against the same file are serialized by SQLite.

use crate::envfile::EnvMap;
use crate::error::{Error, Result};
use crate::model::{Directory, DirectorySummary};
use crate::storage::schema::apply_schema;
use rusqlite::{Connection, OptionalExtension, Transaction};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// How long a writer waits on a locked database before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-based storage backend.
#[derive(Debug)]
pub struct SqliteStorage {
    conn: Connection,
}

/// Outcome of a successful [`SqliteStorage::save_env_vars`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveSummary {
    /// Directory the variables were stored under.
    pub directory: String,
    /// Number of variables now stored for the directory.
    pub count: usize,
    /// Whether this push created the directory's identity record.
    pub created: bool,
}

impl SqliteStorage {
    /// Open a database at the given path.
    ///
    /// Creates the database file if missing and applies the schema.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageUnavailable`] if the file cannot be opened
    /// and [`Error::Schema`] if the tables cannot be created.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| Error::StorageUnavailable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        conn.busy_timeout(BUSY_TIMEOUT)?;

        apply_schema(&conn).map_err(Error::Schema)?;
        debug!(path = %path.display(), "Opened database");
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn).map_err(Error::Schema)?;
        Ok(Self { conn })
    }

    /// Get a reference to the underlying connection (for read operations).
    #[must_use]
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Execute a mutation inside an IMMEDIATE transaction.
    ///
    /// The transaction commits only if the closure succeeds; otherwise
    /// it is rolled back when dropped. Database failures raised inside
    /// the closure are reported as [`Error::Transaction`].
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot begin, the closure
    /// fails, or the commit fails.
    pub fn mutate<F, R>(&mut self, op: &str, f: F) -> Result<R>
    where
        F: FnOnce(&Transaction) -> Result<R>,
    {
        let as_tx_error = |source: rusqlite::Error| Error::Transaction {
            op: op.to_string(),
            source,
        };

        let tx = self
            .conn
            .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)
            .map_err(as_tx_error)?;

        let result = f(&tx).map_err(|e| match e {
            Error::Database(source) => as_tx_error(source),
            other => other,
        })?;

        tx.commit().map_err(as_tx_error)?;
        Ok(result)
    }

    // ===================
    // Env Var Operations
    // ===================

    /// Replace the stored variables for `directory` with `vars`.
    ///
    /// Creates the directory's identity record on first use. Keys not in
    /// `vars` are removed; an empty map leaves a known directory with no
    /// variables.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transaction`] if any statement fails. Nothing is
    /// written in that case.
    pub fn save_env_vars(&mut self, directory: &str, vars: &EnvMap) -> Result<SaveSummary> {
        let now = chrono::Utc::now().timestamp_millis();

        let summary = self.mutate("save_env_vars", |tx| {
            let (directory_id, created) = get_or_create_directory(tx, directory, now)?;

            let removed = tx.execute(
                "DELETE FROM env_vars WHERE directory_id = ?1",
                [directory_id],
            )?;

            let mut stmt = tx.prepare_cached(
                "INSERT INTO env_vars (directory_id, key, value) VALUES (?1, ?2, ?3)",
            )?;
            for (key, value) in vars {
                stmt.execute(rusqlite::params![directory_id, key, value])?;
            }

            tx.execute(
                "UPDATE directories SET updated_at = ?1 WHERE id = ?2",
                rusqlite::params![now, directory_id],
            )?;

            debug!(directory, removed, inserted = vars.len(), "Replaced env vars");

            Ok(SaveSummary {
                directory: directory.to_string(),
                count: vars.len(),
                created,
            })
        })?;

        info!(directory, count = summary.count, created = summary.created, "Saved env vars");
        Ok(summary)
    }

    /// Get the stored variables for `directory`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DirectoryNotFound`] if nothing was ever pushed for
    /// the directory. A directory whose last push was empty yields an
    /// empty map.
    pub fn get_env_vars(&self, directory: &str) -> Result<EnvMap> {
        let dir = self
            .get_directory(directory)?
            .ok_or_else(|| Error::DirectoryNotFound {
                path: directory.to_string(),
            })?;

        let mut stmt = self
            .conn
            .prepare("SELECT key, value FROM env_vars WHERE directory_id = ?1")?;

        let vars = stmt
            .query_map([dir.id], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<EnvMap, _>>()?;

        debug!(directory, count = vars.len(), "Loaded env vars");
        Ok(vars)
    }

    // ====================
    // Directory Operations
    // ====================

    /// Get a directory's identity record by path.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_directory(&self, path: &str) -> Result<Option<Directory>> {
        let dir = self
            .conn
            .query_row(
                "SELECT id, path, created_at, updated_at FROM directories WHERE path = ?1",
                [path],
                map_directory_row,
            )
            .optional()?;
        Ok(dir)
    }

    /// List every stored directory path, including ones with no variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_directories(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT path FROM directories ORDER BY path")?;

        let paths = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;

        Ok(paths)
    }

    /// List every stored directory with its variable count.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_directory_summaries(&self) -> Result<Vec<DirectorySummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT d.id, d.path, d.created_at, d.updated_at, COUNT(v.id)
             FROM directories d
             LEFT JOIN env_vars v ON v.directory_id = d.id
             GROUP BY d.id
             ORDER BY d.path",
        )?;

        let summaries = stmt
            .query_map([], |row| {
                let var_count: i64 = row.get(4)?;
                Ok(DirectorySummary {
                    directory: map_directory_row(row)?,
                    var_count: usize::try_from(var_count).unwrap_or_default(),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(summaries)
    }
}

/// Look up a directory's id, inserting the identity record if absent.
///
/// Runs inside the caller's IMMEDIATE transaction, so no other writer can
/// insert the same path between the select and the insert.
fn get_or_create_directory(tx: &Transaction, path: &str, now: i64) -> Result<(i64, bool)> {
    let existing: Option<i64> = tx
        .query_row(
            "SELECT id FROM directories WHERE path = ?1",
            [path],
            |row| row.get(0),
        )
        .optional()?;

    if let Some(id) = existing {
        return Ok((id, false));
    }

    tx.execute(
        "INSERT INTO directories (path, created_at, updated_at) VALUES (?1, ?2, ?2)",
        rusqlite::params![path, now],
    )?;
    Ok((tx.last_insert_rowid(), true))
}

fn map_directory_row(row: &rusqlite::Row) -> rusqlite::Result<Directory> {
    Ok(Directory {
        id: row.get(0)?,
        path: row.get(1)?,
        created_at: row.get(2)?,
        updated_at: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn map(pairs: &[(&str, &str)]) -> EnvMap {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    /// Make inserts of the key `BAD` fail, to force a mid-transaction error.
    fn install_rejecting_trigger(storage: &SqliteStorage) {
        storage
            .conn()
            .execute_batch(
                "CREATE TRIGGER reject_bad BEFORE INSERT ON env_vars
                 WHEN NEW.key = 'BAD'
                 BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
            )
            .unwrap();
    }

    #[test]
    fn test_open_memory() {
        let storage = SqliteStorage::open_memory();
        assert!(storage.is_ok());
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let vars = map(&[("A", "1"), ("B", "two words"), ("C", "")]);

        let summary = storage.save_env_vars("/proj", &vars).unwrap();
        assert_eq!(summary.count, 3);
        assert!(summary.created);

        assert_eq!(storage.get_env_vars("/proj").unwrap(), vars);
    }

    #[test]
    fn test_save_is_full_replace() {
        let mut storage = SqliteStorage::open_memory().unwrap();

        storage
            .save_env_vars("/proj", &map(&[("A", "1"), ("B", "2")]))
            .unwrap();
        let summary = storage
            .save_env_vars("/proj", &map(&[("C", "3")]))
            .unwrap();
        assert!(!summary.created);

        assert_eq!(storage.get_env_vars("/proj").unwrap(), map(&[("C", "3")]));
    }

    #[test]
    fn test_save_overwrites_shared_keys() {
        let mut storage = SqliteStorage::open_memory().unwrap();

        storage
            .save_env_vars("/proj", &map(&[("A", "old"), ("B", "2")]))
            .unwrap();
        storage
            .save_env_vars("/proj", &map(&[("A", "new")]))
            .unwrap();

        assert_eq!(storage.get_env_vars("/proj").unwrap(), map(&[("A", "new")]));
    }

    #[test]
    fn test_save_empty_map_keeps_directory() {
        let mut storage = SqliteStorage::open_memory().unwrap();

        storage
            .save_env_vars("/proj", &map(&[("A", "1")]))
            .unwrap();
        storage.save_env_vars("/proj", &EnvMap::new()).unwrap();

        assert!(storage.get_env_vars("/proj").unwrap().is_empty());
        assert_eq!(storage.list_directories().unwrap(), vec!["/proj".to_string()]);
    }

    #[test]
    fn test_first_save_with_empty_map() {
        let mut storage = SqliteStorage::open_memory().unwrap();

        let summary = storage.save_env_vars("/proj", &EnvMap::new()).unwrap();
        assert!(summary.created);
        assert_eq!(summary.count, 0);
        assert!(storage.get_env_vars("/proj").unwrap().is_empty());
    }

    #[test]
    fn test_load_unknown_directory_is_not_found() {
        let storage = SqliteStorage::open_memory().unwrap();

        let err = storage.get_env_vars("/never").unwrap_err();
        assert!(matches!(err, Error::DirectoryNotFound { ref path } if path == "/never"));
    }

    #[test]
    fn test_directories_are_isolated() {
        let mut storage = SqliteStorage::open_memory().unwrap();

        storage.save_env_vars("/a", &map(&[("K", "a")])).unwrap();
        storage.save_env_vars("/b", &map(&[("K", "b")])).unwrap();
        storage.save_env_vars("/a", &map(&[("X", "1")])).unwrap();

        assert_eq!(storage.get_env_vars("/a").unwrap(), map(&[("X", "1")]));
        assert_eq!(storage.get_env_vars("/b").unwrap(), map(&[("K", "b")]));
    }

    #[test]
    fn test_list_directories_no_duplicates() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        assert!(storage.list_directories().unwrap().is_empty());

        storage.save_env_vars("/a", &map(&[("K", "1")])).unwrap();
        storage.save_env_vars("/b", &map(&[("K", "2")])).unwrap();
        storage.save_env_vars("/a", &map(&[("K", "3")])).unwrap();

        let dirs = storage.list_directories().unwrap();
        assert_eq!(dirs.len(), 2);
        let dirs: HashSet<String> = dirs.into_iter().collect();
        assert_eq!(
            dirs,
            HashSet::from(["/a".to_string(), "/b".to_string()])
        );
    }

    #[test]
    fn test_list_directory_summaries_counts() {
        let mut storage = SqliteStorage::open_memory().unwrap();

        storage
            .save_env_vars("/a", &map(&[("K", "1"), ("L", "2")]))
            .unwrap();
        storage.save_env_vars("/b", &EnvMap::new()).unwrap();

        let summaries = storage.list_directory_summaries().unwrap();
        let counts: Vec<(String, usize)> = summaries
            .into_iter()
            .map(|s| (s.directory.path, s.var_count))
            .collect();
        assert_eq!(counts, vec![("/a".to_string(), 2), ("/b".to_string(), 0)]);
    }

    #[test]
    fn test_save_bumps_updated_at() {
        let mut storage = SqliteStorage::open_memory().unwrap();

        storage.save_env_vars("/proj", &map(&[("A", "1")])).unwrap();
        let first = storage.get_directory("/proj").unwrap().unwrap();
        assert_eq!(first.created_at, first.updated_at);

        std::thread::sleep(Duration::from_millis(5));
        storage.save_env_vars("/proj", &map(&[("A", "2")])).unwrap();
        let second = storage.get_directory("/proj").unwrap().unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at > first.updated_at);
    }

    #[test]
    fn test_failed_save_rolls_back_existing_directory() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        storage.save_env_vars("/proj", &map(&[("OLD", "1")])).unwrap();
        install_rejecting_trigger(&storage);

        let err = storage
            .save_env_vars("/proj", &map(&[("A", "x"), ("BAD", "y")]))
            .unwrap_err();
        assert!(matches!(err, Error::Transaction { ref op, .. } if op == "save_env_vars"));

        assert_eq!(storage.get_env_vars("/proj").unwrap(), map(&[("OLD", "1")]));
    }

    #[test]
    fn test_failed_save_does_not_create_directory() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        install_rejecting_trigger(&storage);

        let result = storage.save_env_vars("/new", &map(&[("BAD", "y")]));
        assert!(result.is_err());

        assert!(storage.get_directory("/new").unwrap().is_none());
        assert!(storage.list_directories().unwrap().is_empty());
    }

    #[test]
    fn test_mutate_rolls_back_on_closure_error() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        storage.save_env_vars("/proj", &map(&[("A", "1")])).unwrap();

        let result: Result<()> = storage.mutate("wipe", |tx| {
            tx.execute("DELETE FROM env_vars", [])?;
            Err(Error::InvalidArgument("abort".to_string()))
        });
        assert!(matches!(result, Err(Error::InvalidArgument(_))));

        assert_eq!(storage.get_env_vars("/proj").unwrap(), map(&[("A", "1")]));
    }

    #[test]
    fn test_file_backed_storage_persists_across_connections() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("envtamer.db");

        {
            let mut first = SqliteStorage::open(&db_path).unwrap();
            first.save_env_vars("/a", &map(&[("K", "1")])).unwrap();
        }

        let mut second = SqliteStorage::open(&db_path).unwrap();
        second.save_env_vars("/a", &map(&[("K", "2")])).unwrap();
        second.save_env_vars("/b", &map(&[("K", "3")])).unwrap();

        let reopened = SqliteStorage::open(&db_path).unwrap();
        assert_eq!(reopened.list_directories().unwrap().len(), 2);
        assert_eq!(reopened.get_env_vars("/a").unwrap(), map(&[("K", "2")]));
    }

    #[test]
    fn test_open_in_missing_directory_is_storage_unavailable() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("does").join("not").join("exist.db");

        let err = SqliteStorage::open(&db_path).unwrap_err();
        assert!(matches!(err, Error::StorageUnavailable { .. }));
    }
}
