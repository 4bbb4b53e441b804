use thiserror::Error;

/// Core error types for catalog operations
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid collection: {0}")]
    InvalidCollection(String),

    #[error("Invalid entity id: {0}")]
    InvalidId(String),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("UUID error: {0}")]
    UuidError(#[from] uuid::Error),

    #[error("Entity not found: {collection}/{id}")]
    EntityNotFound { collection: String, id: String },

    #[error("Entity conflict: {collection}/{id} already exists")]
    EntityConflict { collection: String, id: String },

    #[error("Invalid entity data: {message}")]
    InvalidEntity { message: String },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CoreError {
    /// Create a new InvalidCollection error
    pub fn invalid_collection(collection: impl Into<String>) -> Self {
        Self::InvalidCollection(collection.into())
    }

    /// Create a new InvalidId error
    pub fn invalid_id(id: impl Into<String>) -> Self {
        Self::InvalidId(id.into())
    }

    /// Create a new EntityNotFound error
    pub fn entity_not_found(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::EntityNotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Create a new EntityConflict error
    pub fn entity_conflict(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::EntityConflict {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Create a new InvalidEntity error
    pub fn invalid_entity(message: impl Into<String>) -> Self {
        Self::InvalidEntity {
            message: message.into(),
        }
    }

    /// Create a new Configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Check if this error is a client error (4xx category)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidCollection(_)
                | Self::InvalidId(_)
                | Self::InvalidEntity { .. }
                | Self::EntityNotFound { .. }
                | Self::EntityConflict { .. }
                | Self::JsonError(_)
        )
    }

    /// Check if this error is a server error (5xx category)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::UuidError(_))
    }

    /// Get error category for logging/monitoring
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidCollection(_) | Self::InvalidId(_) | Self::InvalidEntity { .. } => {
                ErrorCategory::Validation
            }
            Self::EntityNotFound { .. } => ErrorCategory::NotFound,
            Self::EntityConflict { .. } => ErrorCategory::Conflict,
            Self::JsonError(_) => ErrorCategory::Serialization,
            Self::UuidError(_) => ErrorCategory::System,
            Self::Configuration(_) => ErrorCategory::Configuration,
        }
    }
}

/// Error categories for monitoring and classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Conflict,
    Serialization,
    System,
    Configuration,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::NotFound => write!(f, "not_found"),
            Self::Conflict => write!(f, "conflict"),
            Self::Serialization => write!(f, "serialization"),
            Self::System => write!(f, "system"),
            Self::Configuration => write!(f, "configuration"),
        }
    }
}

/// Convenience result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = CoreError::invalid_collection("nonsense");
        assert_eq!(err.to_string(), "Invalid collection: nonsense");
        assert!(err.is_client_error());
        assert!(!err.is_server_error());
        assert_eq!(err.category(), ErrorCategory::Validation);
    }

    #[test]
    fn test_entity_not_found_error() {
        let err = CoreError::entity_not_found("course", "123");
        assert_eq!(err.to_string(), "Entity not found: course/123");
        assert!(err.is_client_error());
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }

    #[test]
    fn test_entity_conflict_error() {
        let err = CoreError::entity_conflict("academy", "456");
        assert_eq!(err.to_string(), "Entity conflict: academy/456 already exists");
        assert!(err.is_client_error());
        assert_eq!(err.category(), ErrorCategory::Conflict);
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err: serde_json::Error =
            serde_json::from_str::<serde_json::Value>("{ invalid json }").unwrap_err();
        let core_err: CoreError = json_err.into();

        assert!(matches!(core_err, CoreError::JsonError(_)));
        assert!(core_err.is_client_error());
        assert_eq!(core_err.category(), ErrorCategory::Serialization);
    }

    #[test]
    fn test_configuration_error() {
        let err = CoreError::configuration("Invalid config value");
        assert_eq!(err.to_string(), "Configuration error: Invalid config value");
        assert!(err.is_server_error());
        assert_eq!(err.category(), ErrorCategory::Configuration);
    }

    #[test]
    fn test_client_vs_server_error_classification() {
        assert!(CoreError::invalid_id("bad-id").is_client_error());
        assert!(CoreError::entity_not_found("course", "123").is_client_error());
        assert!(CoreError::entity_conflict("course", "123").is_client_error());
        assert!(CoreError::configuration("config error").is_server_error());

        // Ensure mutual exclusivity
        let client_err = CoreError::invalid_id("test");
        assert!(client_err.is_client_error());
        assert!(!client_err.is_server_error());

        let server_err = CoreError::configuration("test");
        assert!(server_err.is_server_error());
        assert!(!server_err.is_client_error());
    }

    #[test]
    fn test_error_categories_display() {
        assert_eq!(ErrorCategory::Validation.to_string(), "validation");
        assert_eq!(ErrorCategory::NotFound.to_string(), "not_found");
        assert_eq!(ErrorCategory::Conflict.to_string(), "conflict");
        assert_eq!(ErrorCategory::Serialization.to_string(), "serialization");
        assert_eq!(ErrorCategory::System.to_string(), "system");
        assert_eq!(ErrorCategory::Configuration.to_string(), "configuration");
    }
}
