use thiserror::Error;

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sea-orm.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A referenced row does not exist.
    #[error("Not found: {entity}")]
    NotFound { entity: String },

    /// Caller passed an unusable value.
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

impl StoreError {
    /// Create a not found error.
    #[inline]
    pub fn not_found(entity: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
        }
    }

    /// Create an invalid input error.
    #[inline]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
