use reqwest::blocking::Client;
use rusqlite::types::ToSql;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::domain::models::{EpisodeEntry, Show};
use crate::error::LoadError;
use crate::infra::query::NameFilter;

/// Read-only handle on the shows/episodes database.
pub struct Dataset {
    conn: Connection,
    // Whether episodes carry their own catalog id (the link-out target).
    episode_ids: bool,
    // Keeps a downloaded asset on disk for as long as the connection uses it.
    _asset: Option<NamedTempFile>,
}

impl std::fmt::Debug for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dataset")
            .field("path", &self.conn.path())
            .field("episode_ids", &self.episode_ids)
            .finish()
    }
}

impl Dataset {
    /// Load from an `http(s)://` URL or a local file path.
    pub fn load(source: &str) -> Result<Self, LoadError> {
        Self::load_with(&Client::new(), source)
    }

    pub fn load_with(client: &Client, source: &str) -> Result<Self, LoadError> {
        if source.starts_with("http://") || source.starts_with("https://") {
            let asset = fetch(client, source)?;
            let mut dataset = Self::open(asset.path())?;
            dataset._asset = Some(asset);
            Ok(dataset)
        } else {
            Self::open(Path::new(source))
        }
    }

    pub fn open(path: &Path) -> Result<Self, LoadError> {
        let len = fs::metadata(path)?.len();
        debug!(path = %path.display(), bytes = len, "opening dataset");
        if len == 0 {
            return Err(LoadError::Empty);
        }
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Self::from_connection(conn)
    }

    pub fn from_connection(conn: Connection) -> Result<Self, LoadError> {
        for table in ["shows", "episodes"] {
            if !table_exists(&conn, table)? {
                return Err(LoadError::MissingTable(table));
            }
        }
        let episode_ids = column_exists(&conn, "episodes", "id")?;
        info!(episode_ids, "Database loaded successfully");
        Ok(Self {
            conn,
            episode_ids,
            _asset: None,
        })
    }

    pub fn find_shows(&self, filter: &NameFilter) -> rusqlite::Result<Vec<Show>> {
        let bind = filter.params();
        let bind_refs: Vec<&dyn ToSql> = bind.iter().map(|b| b.as_ref()).collect();
        let mut stmt = self.conn.prepare(&filter.sql())?;
        let rows = stmt.query_map(bind_refs.as_slice(), show_from_row)?;
        rows.collect()
    }

    pub fn show(&self, show_id: &str) -> rusqlite::Result<Option<Show>> {
        self.conn
            .query_row(
                "SELECT id, name, year, rating FROM shows WHERE id = ?1 LIMIT 1",
                params![show_id],
                show_from_row,
            )
            .optional()
    }

    /// Episodes of one show, ordered by season then episode number.
    pub fn episodes(&self, show_id: &str) -> rusqlite::Result<Vec<EpisodeEntry>> {
        let id_column = if self.episode_ids { "id" } else { "NULL AS id" };
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {id_column}, parent_id, season, episode_number, score, name
             FROM episodes
             WHERE parent_id = ?1
             ORDER BY season, episode_number"
        ))?;
        let rows = stmt.query_map(params![show_id], |row| {
            Ok(EpisodeEntry {
                id: row.get(0)?,
                parent_id: row.get(1)?,
                season_number: row.get(2)?,
                episode_number: row.get(3)?,
                score: row.get(4)?,
                name: row.get(5)?,
            })
        })?;
        rows.collect()
    }
}

fn show_from_row(row: &Row<'_>) -> rusqlite::Result<Show> {
    Ok(Show {
        id: row.get(0)?,
        name: row.get(1)?,
        year: row.get(2)?,
        rating: row.get(3)?,
    })
}

fn table_exists(conn: &Connection, table: &str) -> rusqlite::Result<bool> {
    let mut stmt =
        conn.prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1 LIMIT 1")?;
    let mut rows = stmt.query([table])?;
    Ok(rows.next()?.is_some())
}

fn column_exists(conn: &Connection, table: &str, column: &str) -> rusqlite::Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name.eq_ignore_ascii_case(column) {
            return Ok(true);
        }
    }
    Ok(false)
}

fn fetch(client: &Client, url: &str) -> Result<NamedTempFile, LoadError> {
    info!(url, "Fetching dataset");
    let response = client.get(url).send()?;
    let status = response.status();
    debug!(%status, "fetch response");
    if !status.is_success() {
        return Err(LoadError::HttpStatus(status));
    }

    let bytes = response.bytes()?;
    debug!(bytes = bytes.len(), "dataset downloaded");
    if bytes.is_empty() {
        return Err(LoadError::Empty);
    }

    let mut file = NamedTempFile::new()?;
    file.write_all(&bytes)?;
    file.flush()?;
    Ok(file)
}
