use thiserror::Error;

/// Top-level error type for Medibot.
///
/// Subsystem crates define their own error types and implement
/// `From<MedibotError>` so that `?` works across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MedibotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for MedibotError {
    fn from(err: toml::de::Error) -> Self {
        MedibotError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for MedibotError {
    fn from(err: toml::ser::Error) -> Self {
        MedibotError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for MedibotError {
    fn from(err: serde_json::Error) -> Self {
        MedibotError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Medibot operations.
pub type Result<T> = std::result::Result<T, MedibotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_all_variants() {
        let cases: Vec<(MedibotError, &str)> = vec![
            (
                MedibotError::Config("bad key".to_string()),
                "Configuration error: bad key",
            ),
            (
                MedibotError::Dataset("no records".to_string()),
                "Dataset error: no records",
            ),
            (
                MedibotError::Storage("disk full".to_string()),
                "Storage error: disk full",
            ),
            (
                MedibotError::Serialization("invalid json".to_string()),
                "Serialization error: invalid json",
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err: MedibotError = io_err.into();
        assert!(matches!(err, MedibotError::Io(_)));
        assert!(err.to_string().starts_with("I/O error:"));
        assert!(err.to_string().contains("access denied"));
    }

    #[test]
    fn test_error_from_toml_de() {
        let err: std::result::Result<toml::Value, _> = toml::from_str("invalid = [[[");
        let err: MedibotError = err.unwrap_err().into();
        assert!(matches!(err, MedibotError::Config(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let err: std::result::Result<serde_json::Value, _> = serde_json::from_str("{ nope }");
        let err: MedibotError = err.unwrap_err().into();
        assert!(matches!(err, MedibotError::Serialization(_)));
    }

    #[test]
    fn test_result_type_with_question_mark() {
        fn inner() -> Result<String> {
            let io_result: std::result::Result<i32, std::io::Error> = Ok(42);
            let value = io_result?;
            Ok(value.to_string())
        }

        assert_eq!(inner().unwrap(), "42");
    }
}
