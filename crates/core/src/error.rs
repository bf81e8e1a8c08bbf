use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Validation error: {0}")]
    Validation(String),
}

impl CoreError {
    /// Error for a required field that is missing or blank.
    pub fn missing_field(field: &str) -> Self {
        Self::Validation(format!("{} is required", field))
    }
}

/// Returns the value untouched, or a validation error naming `field` when blank.
pub fn require_non_empty<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str, CoreError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(CoreError::missing_field(field)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = CoreError::missing_field("message");
        assert_eq!(error.to_string(), "Validation error: message is required");
    }

    #[test]
    fn test_require_non_empty() {
        assert_eq!(require_non_empty("mood", Some(" calm ")).unwrap(), " calm ");
        assert!(require_non_empty("mood", Some("   ")).is_err());
        assert!(require_non_empty("mood", None).is_err());
    }
}
