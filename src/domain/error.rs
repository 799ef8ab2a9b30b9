use thiserror::Error;

/// Errors surfaced to the user; the `Display` text is shown verbatim
/// in the status line.
#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("Resolver error: {0}")]
    Resolve(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Transfer error: {0}")]
    Transfer(String),
}
