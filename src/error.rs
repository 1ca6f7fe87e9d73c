//! Error types for the sift host.

/// Top-level error type for the host.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Search request or engine configuration error.
    #[error(transparent)]
    Search(#[from] sift_search::SearchError),

    /// Configuration file error.
    #[error("config error: {0}")]
    Config(String),

    /// Dataset file error.
    #[error("dataset error: {0}")]
    Dataset(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, AppError>;
