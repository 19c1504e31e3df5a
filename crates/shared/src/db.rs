//! Database operations for SQLite.
//!
//! This module handles the database connection, schema creation, and migrations.

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;
use tracing::{debug, info};

/// Current schema version, stored in `PRAGMA user_version`
pub const SCHEMA_VERSION: i32 = 1;

/// Database connection wrapper
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let is_new = !path.exists();

        debug!(path = %path.display(), "Opening database");

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create database directory: {}", parent.display())
                })?;
            }
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;

        // Wait on a locked database instead of failing immediately
        conn.busy_timeout(std::time::Duration::from_secs(5))
            .context("Failed to set busy timeout")?;

        let mut db = Self { conn };

        if is_new {
            info!("Creating new database schema");
            db.create_schema()?;
        } else {
            debug!("Database already exists");
            db.run_migrations()?;
        }

        Ok(db)
    }

    /// Create the database schema
    fn create_schema(&mut self) -> Result<()> {
        self.conn
            .execute_batch(include_str!("../schema.sql"))
            .context("Failed to create database schema")?;

        info!("Database schema created successfully");
        Ok(())
    }

    /// Get a reference to the underlying connection
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Get a mutable reference to the underlying connection
    pub fn conn_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    /// Check if a table exists
    pub fn table_exists(&self, table_name: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
            [table_name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Get the database version (from user_version pragma)
    pub fn get_version(&self) -> Result<i32> {
        let version: i32 = self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))?;
        Ok(version)
    }

    /// Run migrations for existing databases
    fn run_migrations(&mut self) -> Result<()> {
        let version = self.get_version()?;

        // A file created outside this process (or by an older build) may be empty
        if version < SCHEMA_VERSION || !self.table_exists("manga")? {
            info!(
                from_version = version,
                to_version = SCHEMA_VERSION,
                "Running migration: creating manga table"
            );
            self.create_schema()
                .context("Failed to migrate database schema")?;
            info!("Migration completed: manga table ready");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_database() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let db_path = temp_dir.path().join("library.db");

        let db = Database::open(&db_path)?;
        assert!(db_path.exists());
        assert!(db.table_exists("manga")?);
        assert!(!db.table_exists("jobs")?);

        Ok(())
    }

    #[test]
    fn test_version() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let db_path = temp_dir.path().join("library.db");

        let db = Database::open(&db_path)?;
        assert_eq!(db.get_version()?, SCHEMA_VERSION);

        db.conn().execute_batch("PRAGMA user_version = 7")?;
        assert_eq!(db.get_version()?, 7);

        Ok(())
    }

    #[test]
    fn test_migrates_empty_file() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let db_path = temp_dir.path().join("library.db");

        // An existing but empty file
        std::fs::File::create(&db_path)?;

        let db = Database::open(&db_path)?;
        assert!(db.table_exists("manga")?);
        assert_eq!(db.get_version()?, SCHEMA_VERSION);

        Ok(())
    }

    #[test]
    fn test_creates_parent_directory() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let db_path = temp_dir.path().join("nested").join("library.db");

        Database::open(&db_path)?;
        assert!(db_path.exists());

        Ok(())
    }
}
