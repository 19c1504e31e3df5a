//! Library store for saved manga.
//!
//! This module provides the persistence API for the personal library:
//! upsert-by-external-id, filtered listing, lookup, and deletion. Every
//! operation touches at most one record and runs as a single transaction.

use crate::error::{StoreError, StoreResult};
use crate::models::*;
use crate::Database;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, TransactionBehavior};
use tracing::{debug, info};

const RECORD_COLUMNS: &str = "id, title, external_id, description, author, cover_image, \
     genres, chapters, year, status, date_added, last_updated";

/// Outcome of saving a manga with a status
#[derive(Debug, Clone, PartialEq)]
pub enum Upserted {
    /// No record had this external id; a new one was inserted
    Created(MangaRecord),
    /// An existing record had its status and `last_updated` refreshed
    Updated(MangaRecord),
}

impl Upserted {
    pub fn record(&self) -> &MangaRecord {
        match self {
            Upserted::Created(record) | Upserted::Updated(record) => record,
        }
    }

    pub fn into_record(self) -> MangaRecord {
        match self {
            Upserted::Created(record) | Upserted::Updated(record) => record,
        }
    }

    pub fn was_created(&self) -> bool {
        matches!(self, Upserted::Created(_))
    }
}

/// Persistent manga library
pub struct LibraryStore {
    db: Database,
}

impl LibraryStore {
    /// Create a new library store on the given database
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Find a record by the catalog's external id
    pub fn find_by_external_id(&self, external_id: &str) -> StoreResult<Option<MangaRecord>> {
        let record = self
            .db
            .conn()
            .query_row(
                &format!("SELECT {} FROM manga WHERE external_id = ?1", RECORD_COLUMNS),
                params![external_id.trim()],
                row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    /// Get a record by its identity
    pub fn get(&self, id: i64) -> StoreResult<Option<MangaRecord>> {
        let record = self
            .db
            .conn()
            .query_row(
                &format!("SELECT {} FROM manga WHERE id = ?1", RECORD_COLUMNS),
                params![id],
                row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    /// Save a manga with the given status (upsert keyed by external id)
    ///
    /// If a record with the same external id exists, only its status and
    /// `last_updated` change. Otherwise the candidate is validated and
    /// inserted with `date_added == last_updated == now`.
    pub fn upsert_status(&mut self, manga: &NewManga, status: LibraryStatus) -> StoreResult<Upserted> {
        let manga = manga.clone().normalized();
        let conn = self.db.conn_mut();
        // Take the write lock before the lookup so the read cannot go stale
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let existing = tx
            .query_row(
                &format!("SELECT {} FROM manga WHERE external_id = ?1", RECORD_COLUMNS),
                params![manga.external_id],
                row_to_record,
            )
            .optional()?;

        if let Some(mut record) = existing {
            let now = next_timestamp(record.last_updated);
            tx.execute(
                "UPDATE manga SET status = ?1, last_updated = ?2 WHERE id = ?3",
                params![status.as_str(), now, record.id],
            )?;
            tx.commit()?;

            record.status = status;
            record.last_updated = now;

            debug!(
                id = record.id,
                external_id = %record.external_id,
                status = %status,
                "Updated manga status"
            );
            return Ok(Upserted::Updated(record));
        }

        let errors = manga.validate();
        if !errors.is_empty() {
            return Err(StoreError::Validation(errors));
        }

        let now = Utc::now();
        let inserted = tx.execute(
            "INSERT INTO manga (
                title, external_id, description, author, cover_image,
                genres, chapters, year, status, date_added, last_updated
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                manga.title,
                manga.external_id,
                manga.description,
                manga.author,
                manga.cover_image,
                serde_json::to_string(&manga.genres)?,
                manga.chapters,
                manga.year,
                status.as_str(),
                now,
                now,
            ],
        );

        match inserted {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                // Lost an insert race against another writer of the same external id
                return Err(StoreError::Conflict(manga.external_id));
            }
            Err(e) => return Err(e.into()),
        }

        let id = tx.last_insert_rowid();
        tx.commit()?;

        info!(id = id, external_id = %manga.external_id, title = %manga.title, status = %status, "Saved new manga");

        Ok(Upserted::Created(MangaRecord {
            id,
            title: manga.title,
            external_id: manga.external_id,
            description: manga.description,
            author: manga.author,
            cover_image: manga.cover_image,
            genres: manga.genres,
            chapters: manga.chapters,
            year: manga.year,
            status,
            date_added: now,
            last_updated: now,
        }))
    }

    /// List records, optionally restricted to one status, newest first
    pub fn list(&self, filter: Option<LibraryStatus>) -> StoreResult<Vec<MangaRecord>> {
        let conn = self.db.conn();

        let records = match filter {
            Some(status) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM manga WHERE status = ?1 ORDER BY date_added DESC, id DESC",
                    RECORD_COLUMNS
                ))?;
                let rows = stmt
                    .query_map(params![status.as_str()], row_to_record)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM manga ORDER BY date_added DESC, id DESC",
                    RECORD_COLUMNS
                ))?;
                let rows = stmt
                    .query_map([], row_to_record)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
        };

        debug!(filter = ?filter, count = records.len(), "Listed library");
        Ok(records)
    }

    /// Count records, optionally restricted to one status
    pub fn count(&self, filter: Option<LibraryStatus>) -> StoreResult<usize> {
        let conn = self.db.conn();
        let count: i64 = match filter {
            Some(status) => conn.query_row(
                "SELECT COUNT(*) FROM manga WHERE status = ?1",
                params![status.as_str()],
                |row| row.get(0),
            )?,
            None => conn.query_row("SELECT COUNT(*) FROM manga", [], |row| row.get(0))?,
        };
        Ok(count as usize)
    }

    /// Delete a record by identity, returning what was removed
    pub fn delete_by_id(&mut self, id: i64) -> StoreResult<MangaRecord> {
        let conn = self.db.conn_mut();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let record = tx
            .query_row(
                &format!("SELECT {} FROM manga WHERE id = ?1", RECORD_COLUMNS),
                params![id],
                row_to_record,
            )
            .optional()?
            .ok_or(StoreError::NotFound(id))?;

        tx.execute("DELETE FROM manga WHERE id = ?1", params![id])?;
        tx.commit()?;

        info!(id = id, external_id = %record.external_id, "Removed manga from library");
        Ok(record)
    }
}

/// Current time, forced strictly past `previous`
fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + chrono::Duration::microseconds(1)
    }
}

/// Helper: Convert a database row to a MangaRecord
fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<MangaRecord> {
    let genres: String = row.get(6)?;
    let genres: Vec<String> = serde_json::from_str(&genres)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(e)))?;

    let status: String = row.get(9)?;
    let status: LibraryStatus = status.parse().map_err(|e: anyhow::Error| {
        rusqlite::Error::FromSqlConversionFailure(9, Type::Text, e.into())
    })?;

    Ok(MangaRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        external_id: row.get(2)?,
        description: row.get(3)?,
        author: row.get(4)?,
        cover_image: row.get(5)?,
        genres,
        chapters: row.get(7)?,
        year: row.get(8)?,
        status,
        date_added: row.get(10)?,
        last_updated: row.get(11)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::TempDir;

    fn open_store(temp_dir: &TempDir) -> Result<LibraryStore> {
        let db = Database::open(temp_dir.path().join("library.db"))?;
        Ok(LibraryStore::new(db))
    }

    fn manga(external_id: &str, title: &str) -> NewManga {
        NewManga {
            title: title.to_string(),
            external_id: external_id.to_string(),
            genres: vec!["Action".to_string(), "Adventure".to_string()],
            chapters: Some(1100),
            year: Some(1997),
            ..Default::default()
        }
    }

    #[test]
    fn test_fresh_external_id_creates_one_record() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let mut store = open_store(&temp_dir)?;

        let outcome = store.upsert_status(&manga("abc-1", "One Piece"), LibraryStatus::Liked)?;
        assert!(outcome.was_created());

        let record = outcome.record();
        assert_eq!(record.date_added, record.last_updated);
        assert_eq!(record.status, LibraryStatus::Liked);
        assert_eq!(record.genres, vec!["Action", "Adventure"]);
        assert_eq!(store.count(None)?, 1);

        let found = store.find_by_external_id("abc-1")?.expect("record stored");
        assert_eq!(&found, record);

        Ok(())
    }

    #[test]
    fn test_second_save_updates_in_place() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let mut store = open_store(&temp_dir)?;

        let first = store
            .upsert_status(&manga("abc-1", "One Piece"), LibraryStatus::Liked)?
            .into_record();
        let second = store.upsert_status(&manga("abc-1", "One Piece"), LibraryStatus::Read)?;

        assert!(!second.was_created());
        let second = second.into_record();
        assert_eq!(second.id, first.id);
        assert_eq!(second.status, LibraryStatus::Read);
        assert_eq!(second.date_added, first.date_added);
        assert!(second.last_updated > first.last_updated);

        let all = store.list(None)?;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].status, LibraryStatus::Read);
        assert_eq!(all[0].last_updated, second.last_updated);

        Ok(())
    }

    #[test]
    fn test_update_only_touches_status() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let mut store = open_store(&temp_dir)?;

        store.upsert_status(&manga("abc-1", "One Piece"), LibraryStatus::Liked)?;

        let mut changed = manga("abc-1", "Renamed");
        changed.cover_image = Some("not a url".to_string());
        let updated = store
            .upsert_status(&changed, LibraryStatus::Read)?
            .into_record();

        assert_eq!(updated.title, "One Piece");
        assert_eq!(updated.cover_image, None);

        Ok(())
    }

    #[test]
    fn test_list_filters_and_orders_newest_first() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let mut store = open_store(&temp_dir)?;

        store.upsert_status(&manga("a", "First"), LibraryStatus::Liked)?;
        store.upsert_status(&manga("b", "Second"), LibraryStatus::Read)?;
        store.upsert_status(&manga("c", "Third"), LibraryStatus::Liked)?;

        let liked = store.list(Some(LibraryStatus::Liked))?;
        let titles: Vec<_> = liked.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["Third", "First"]);
        assert!(liked.iter().all(|m| m.status == LibraryStatus::Liked));
        assert!(liked.windows(2).all(|w| w[0].date_added >= w[1].date_added));

        let read = store.list(Some(LibraryStatus::Read))?;
        assert_eq!(read.len(), 1);
        assert_eq!(read[0].title, "Second");

        assert_eq!(store.list(None)?.len(), 3);
        assert_eq!(store.count(Some(LibraryStatus::Liked))?, 2);

        Ok(())
    }

    #[test]
    fn test_delete_removes_record() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let mut store = open_store(&temp_dir)?;

        let record = store
            .upsert_status(&manga("abc-1", "One Piece"), LibraryStatus::Liked)?
            .into_record();

        let removed = store.delete_by_id(record.id)?;
        assert_eq!(removed, record);
        assert!(store.list(None)?.is_empty());
        assert!(store.get(record.id)?.is_none());

        Ok(())
    }

    #[test]
    fn test_delete_missing_is_not_found() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let mut store = open_store(&temp_dir)?;

        match store.delete_by_id(42) {
            Err(StoreError::NotFound(42)) => {}
            other => panic!("expected NotFound, got {:?}", other),
        }

        Ok(())
    }

    #[test]
    fn test_invalid_candidate_is_rejected() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let mut store = open_store(&temp_dir)?;

        let mut bad = manga("abc-1", "One Piece");
        bad.cover_image = Some("cover.jpg".to_string());
        bad.chapters = Some(-3);

        match store.upsert_status(&bad, LibraryStatus::Liked) {
            Err(StoreError::Validation(errors)) => {
                assert_eq!(
                    errors,
                    vec!["Cover image must be a valid URL", "Chapters cannot be negative"]
                );
            }
            other => panic!("expected Validation, got {:?}", other),
        }
        assert_eq!(store.count(None)?, 0);

        Ok(())
    }

    #[test]
    fn test_external_id_uniqueness_is_enforced() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let mut store = open_store(&temp_dir)?;

        // A second writer on the same file
        let other = Database::open(temp_dir.path().join("library.db"))?;
        let now = Utc::now();
        other.conn().execute(
            "INSERT INTO manga (title, external_id, genres, status, date_added, last_updated)
             VALUES ('One Piece', 'abc-1', '[]', 'liked', ?1, ?1)",
            params![now],
        )?;

        // A blind duplicate insert is rejected with the unique-constraint code
        let err = store
            .db
            .conn()
            .execute(
                "INSERT INTO manga (title, external_id, genres, status, date_added, last_updated)
                 VALUES ('One Piece', 'abc-1', '[]', 'read', ?1, ?1)",
                params![now],
            )
            .unwrap_err();
        match err {
            rusqlite::Error::SqliteFailure(e, _) => {
                assert_eq!(e.extended_code, rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE)
            }
            other => panic!("expected constraint failure, got {:?}", other),
        }

        // The store sees the other writer's row and updates it
        let outcome = store.upsert_status(&manga("abc-1", "One Piece"), LibraryStatus::Read)?;
        assert!(!outcome.was_created());
        assert_eq!(store.count(None)?, 1);

        Ok(())
    }

    #[test]
    fn test_save_waits_for_a_pending_writer_before_reading() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let mut store = open_store(&temp_dir)?;

        // Another writer holds the write lock with an uncommitted insert
        let other = Database::open(temp_dir.path().join("library.db"))?;
        other.conn().execute_batch("BEGIN IMMEDIATE")?;
        other.conn().execute(
            "INSERT INTO manga (title, external_id, genres, status, date_added, last_updated)
             VALUES ('One Piece', 'abc-1', '[]', 'liked', ?1, ?1)",
            params![Utc::now()],
        )?;
        let writer = std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(200));
            other.conn().execute_batch("COMMIT")
        });

        // The lookup runs after the commit, so this is an update, not a lost insert
        let outcome = store.upsert_status(&manga("abc-1", "One Piece"), LibraryStatus::Read)?;
        writer.join().expect("writer thread panicked")?;

        assert!(!outcome.was_created());
        assert_eq!(outcome.record().status, LibraryStatus::Read);
        assert_eq!(store.count(None)?, 1);

        Ok(())
    }

    #[test]
    fn test_lost_insert_race_maps_to_conflict() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let mut store = open_store(&temp_dir)?;

        // Another writer slips in the same external id right before our insert
        store.db.conn().execute_batch(
            "CREATE TEMP TRIGGER racing_writer BEFORE INSERT ON manga
             WHEN NOT EXISTS (SELECT 1 FROM manga WHERE external_id = NEW.external_id)
             BEGIN
                 INSERT INTO manga (title, external_id, genres, status, date_added, last_updated)
                 VALUES ('Racing writer', NEW.external_id, '[]', 'liked',
                         NEW.date_added, NEW.last_updated);
             END;",
        )?;

        let err = store
            .upsert_status(&manga("abc-1", "One Piece"), LibraryStatus::Read)
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(ref id) if id == "abc-1"));

        // The failed save rolled back as a whole
        assert_eq!(store.count(None)?, 0);

        // Once the race is over a retry updates the winner's row
        store.db.conn().execute_batch("DROP TRIGGER racing_writer")?;
        store.db.conn().execute(
            "INSERT INTO manga (title, external_id, genres, status, date_added, last_updated)
             VALUES ('Racing writer', 'abc-1', '[]', 'liked', ?1, ?1)",
            params![Utc::now()],
        )?;
        let outcome = store.upsert_status(&manga("abc-1", "One Piece"), LibraryStatus::Read)?;
        assert!(!outcome.was_created());
        assert_eq!(outcome.record().title, "Racing writer");
        assert_eq!(outcome.record().status, LibraryStatus::Read);

        Ok(())
    }

    #[test]
    fn test_next_timestamp_is_strictly_increasing() {
        let future = Utc::now() + chrono::Duration::seconds(60);
        assert!(next_timestamp(future) > future);

        let past = Utc::now() - chrono::Duration::seconds(60);
        assert!(next_timestamp(past) > past);
    }
}
