// Defines a custom error type and a result type alias for the application
// using the thiserror crate.
use thiserror::Error;

// Make the response module public
pub mod response;
pub mod store;

// Re-export commonly used types
pub use store::{StoreError, StoreResult};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    Auth(String),

    // The #[from] attribute automatically converts a StoreError into an
    // AppError::Store using the From trait.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("File error: {0}")]
    File(#[from] std::io::Error),

    #[error("User error: {0}")]
    User(String),

    #[error("Upload error: {0}")]
    Upload(String),
}

// Custom result type
pub type AppResult<T> = Result<T, AppError>;
