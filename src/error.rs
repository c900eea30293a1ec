use thiserror::Error;

/// Errors surfaced by the quiz core and its local stores
#[derive(Debug, Error)]
pub enum LingoError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt data: {0}")]
    Corrupt(String),

    #[error("word catalog error: {0}")]
    Catalog(String),
}

pub type Result<T> = std::result::Result<T, LingoError>;
