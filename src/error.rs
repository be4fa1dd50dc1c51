use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Fetch error: {0}")]
    FetchError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Database connection error: {0}")]
    ConnectError(String),

    #[error("Database save error: {0}")]
    SaveError(String),

    #[error("Export error: {0}")]
    ExportError(String),
}

/// Marker returned by pipeline stages when the shutdown token fired.
/// Not an error: callers unwind with `?` and stop starting new work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;
