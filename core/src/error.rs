use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed record: expected {expected} fields, got {got}")]
    Parse { expected: usize, got: usize },

    #[error("Flush failed for '{entity}' ({rows} rows, keys {first_key}..{last_key}): {source}")]
    Flush {
        entity: &'static str,
        rows: usize,
        first_key: String,
        last_key: String,
        source: rusqlite::Error,
    },

    #[error("Invalid config value for '{key}': {value}")]
    Config { key: &'static str, value: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type LoadResult<T> = Result<T, LoadError>;
