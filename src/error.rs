use thiserror::Error;

/// Failures while fetching or opening the dataset. Fatal for the session.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to fetch database: HTTP {0}")]
    HttpStatus(reqwest::StatusCode),

    #[error("Database file is empty")]
    Empty,

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Database has no `{0}` table")]
    MissingTable(&'static str),
}

/// Failures while projecting one show into chart data.
#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("Show not found: {0}")]
    NotFound(String),

    #[error("Query failed: {0}")]
    Query(#[from] rusqlite::Error),
}
