use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Repository error: {0}: {1}")]
    RepositoryError(String, String),
    #[error("Aggregate not found: {0}: {1}")]
    AggregateNotFound(String, String),
}

impl AppError {
    /// Errors raised before the store was touched.
    pub fn is_client_error(&self) -> bool {
        matches!(self, AppError::InvalidInput(_))
    }
}
