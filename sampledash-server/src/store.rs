// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Grouped-count queries over the sample store
//!
//! Every call opens its own read-only connection, so handlers share nothing
//! but the database path. The service never writes; [`SqliteStatsStore::init_schema`]
//! exists for tests and local development databases.

use rusqlite::{Connection, OpenFlags};
use sampledash_core::{AggregationRow, Dimension, UNKNOWN_LABEL};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("query task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type QueryResult<T> = std::result::Result<T, QueryError>;

/// Read-only statistics over files, tags, objects and users.
///
/// Rows of `count_by_type`, `count_by_tag` and `count_by_user` are ordered
/// by count descending, then label ascending. `upload_timeline` is ordered
/// by date ascending.
pub trait StatsStore: Send + Sync {
    fn count_by_type(&self) -> QueryResult<Vec<AggregationRow>>;

    fn count_by_tag(&self) -> QueryResult<Vec<AggregationRow>>;

    fn upload_timeline(&self) -> QueryResult<Vec<AggregationRow>>;

    fn count_by_user(&self) -> QueryResult<Vec<AggregationRow>>;

    /// Number of stored files; fails when the store is unreachable.
    fn ping(&self) -> QueryResult<u64>;

    fn aggregate(&self, dimension: Dimension) -> QueryResult<Vec<AggregationRow>> {
        match dimension {
            Dimension::FileType => self.count_by_type(),
            Dimension::Tag => self.count_by_tag(),
            Dimension::Date => self.upload_timeline(),
            Dimension::User => self.count_by_user(),
        }
    }
}

const COUNT_BY_TYPE: &str = "
    SELECT COALESCE(f.file_type, ?1) AS label, COUNT(*) AS n
    FROM files f
    GROUP BY label
    ORDER BY n DESC, label ASC";

const COUNT_BY_TAG: &str = "
    SELECT t.tag AS label, COUNT(DISTINCT o.id) AS n
    FROM tags t
    JOIN object_tags ot ON ot.tag_id = t.id
    JOIN objects o ON o.id = ot.object_id
    WHERE o.type = 'file'
    GROUP BY t.tag
    ORDER BY n DESC, label ASC";

const UPLOAD_TIMELINE: &str = "
    SELECT date(o.upload_time) AS label, COUNT(*) AS n
    FROM files f
    JOIN objects o ON o.id = f.id
    WHERE date(o.upload_time) IS NOT NULL
    GROUP BY label
    ORDER BY label ASC";

const COUNT_BY_USER: &str = "
    SELECT COALESCE(u.login, ?1) AS label, COUNT(*) AS n
    FROM files f
    JOIN objects o ON o.id = f.id
    LEFT JOIN users u ON u.id = o.owner_id
    GROUP BY label
    ORDER BY n DESC, label ASC";

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS users (
        id      INTEGER PRIMARY KEY,
        login   TEXT NOT NULL UNIQUE
    );
    CREATE TABLE IF NOT EXISTS objects (
        id          INTEGER PRIMARY KEY,
        type        TEXT NOT NULL,
        dhash       TEXT,
        upload_time TEXT,
        owner_id    INTEGER REFERENCES users(id)
    );
    CREATE TABLE IF NOT EXISTS files (
        id          INTEGER PRIMARY KEY REFERENCES objects(id),
        file_name   TEXT,
        file_size   INTEGER,
        file_type   TEXT,
        md5         TEXT,
        sha256      TEXT
    );
    CREATE TABLE IF NOT EXISTS tags (
        id      INTEGER PRIMARY KEY,
        tag     TEXT NOT NULL UNIQUE
    );
    CREATE TABLE IF NOT EXISTS object_tags (
        object_id   INTEGER NOT NULL REFERENCES objects(id),
        tag_id      INTEGER NOT NULL REFERENCES tags(id),
        PRIMARY KEY (object_id, tag_id)
    );
    CREATE INDEX IF NOT EXISTS idx_objects_owner ON objects(owner_id);
    CREATE INDEX IF NOT EXISTS idx_object_tags_tag ON object_tags(tag_id);";

/// [`StatsStore`] over an SQLite database file
#[derive(Debug, Clone)]
pub struct SqliteStatsStore {
    path: PathBuf,
}

impl SqliteStatsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the sample tables in `path` if they are missing.
    pub fn init_schema(path: impl AsRef<Path>) -> QueryResult<()> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    fn open(&self) -> QueryResult<Connection> {
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(conn)
    }

    fn grouped(&self, dimension: Dimension, sql: &str) -> QueryResult<Vec<AggregationRow>> {
        let conn = self.open()?;
        let mut stmt = conn.prepare(sql)?;

        let rows = if stmt.parameter_count() > 0 {
            stmt.query_map([UNKNOWN_LABEL], |row| read_row(dimension, row))?
                .collect::<Result<Vec<_>, _>>()?
        } else {
            stmt.query_map([], |row| read_row(dimension, row))?
                .collect::<Result<Vec<_>, _>>()?
        };

        debug!("{} returned {} rows", dimension, rows.len());
        Ok(rows)
    }
}

fn read_row(dimension: Dimension, row: &rusqlite::Row<'_>) -> rusqlite::Result<AggregationRow> {
    let label: String = row.get(0)?;
    let count: i64 = row.get(1)?;
    Ok(AggregationRow::new(dimension, label, count.max(0) as u64))
}

impl StatsStore for SqliteStatsStore {
    fn count_by_type(&self) -> QueryResult<Vec<AggregationRow>> {
        self.grouped(Dimension::FileType, COUNT_BY_TYPE)
    }

    fn count_by_tag(&self) -> QueryResult<Vec<AggregationRow>> {
        self.grouped(Dimension::Tag, COUNT_BY_TAG)
    }

    fn upload_timeline(&self) -> QueryResult<Vec<AggregationRow>> {
        self.grouped(Dimension::Date, UPLOAD_TIMELINE)
    }

    fn count_by_user(&self) -> QueryResult<Vec<AggregationRow>> {
        self.grouped(Dimension::User, COUNT_BY_USER)
    }

    fn ping(&self) -> QueryResult<u64> {
        let conn = self.open()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM files", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }
}
