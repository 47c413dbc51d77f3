use thiserror::Error;

/// Core error types for intranet domain values
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid {kind} id: {value}")]
    InvalidId { kind: &'static str, value: String },

    #[error("Invalid table id: {0}")]
    InvalidTableId(String),

    #[error("Invalid sort direction: {0}")]
    InvalidSortDirection(String),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl CoreError {
    /// Create a new InvalidId error
    pub fn invalid_id(kind: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidId {
            kind,
            value: value.into(),
        }
    }

    /// Create a new InvalidTableId error
    pub fn invalid_table_id(value: impl Into<String>) -> Self {
        Self::InvalidTableId(value.into())
    }

    /// Create a new InvalidSortDirection error
    pub fn invalid_sort_direction(value: impl Into<String>) -> Self {
        Self::InvalidSortDirection(value.into())
    }
}

/// Convenience result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_id_message() {
        let err = CoreError::invalid_id("user", "abc");
        assert_eq!(err.to_string(), "Invalid user id: abc");
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err: serde_json::Error =
            serde_json::from_str::<serde_json::Value>("{ invalid json }").unwrap_err();
        let core_err: CoreError = json_err.into();
        assert!(matches!(core_err, CoreError::JsonError(_)));
    }
}
