use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdError {
    #[error("Invalid ID")]
    Invalid,
}

/// Generate a fresh entity id.
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Validate an externally supplied entity id.
pub fn validate_id(id: &str) -> Result<(), IdError> {
    if id.is_empty() || id.len() > 128 {
        return Err(IdError::Invalid);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique_and_valid() {
        let a = generate_id();
        let b = generate_id();
        assert_ne!(a, b);
        assert!(validate_id(&a).is_ok());
    }

    #[test]
    fn empty_id_is_invalid() {
        assert!(validate_id("").is_err());
    }
}
