//! Storage error types for the data-store abstraction layer.

/// Errors that can occur during data-store operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The requested entity was not found.
    #[error("Entity not found: {collection}/{id}")]
    NotFound {
        /// The collection that was searched.
        collection: String,
        /// The ID of the entity that was not found.
        id: String,
    },

    /// Attempted to create an entity that already exists.
    #[error("Entity already exists: {collection}/{id}")]
    AlreadyExists {
        /// The collection the entity belongs to.
        collection: String,
        /// The ID of the entity that already exists.
        id: String,
    },

    /// The entity data is invalid.
    #[error("Invalid entity: {message}")]
    InvalidEntity {
        /// Description of why the entity is invalid.
        message: String,
    },

    /// Failed to reach the storage backend.
    #[error("Connection error: {message}")]
    ConnectionError {
        /// Description of the connection error.
        message: String,
    },

    /// An internal storage error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl StorageError {
    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Creates a new `AlreadyExists` error.
    #[must_use]
    pub fn already_exists(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::AlreadyExists {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Creates a new `InvalidEntity` error.
    #[must_use]
    pub fn invalid_entity(message: impl Into<String>) -> Self {
        Self::InvalidEntity {
            message: message.into(),
        }
    }

    /// Creates a new `ConnectionError` error.
    #[must_use]
    pub fn connection_error(message: impl Into<String>) -> Self {
        Self::ConnectionError {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error maps to a 404 at the API boundary.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<ostad_core::CoreError> for StorageError {
    fn from(err: ostad_core::CoreError) -> Self {
        use ostad_core::CoreError;
        match err {
            CoreError::EntityNotFound { collection, id } => Self::NotFound { collection, id },
            CoreError::EntityConflict { collection, id } => Self::AlreadyExists { collection, id },
            CoreError::InvalidEntity { message } => Self::InvalidEntity { message },
            other => Self::Internal {
                message: other.to_string(),
            },
        }
    }
}
