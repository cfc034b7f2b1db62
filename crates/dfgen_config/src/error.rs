//! Error types for configuration loading and validation.

/// Errors that can occur when loading or validating a `campaign.toml`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading the configuration file.
    #[error("failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// A required list is empty.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A configuration value failed validation.
    #[error("validation error: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_missing_field() {
        let err = ConfigError::MissingField("campaign.graph_sizes".to_string());
        assert_eq!(
            format!("{err}"),
            "missing required field: campaign.graph_sizes"
        );
    }

    #[test]
    fn display_validation_error() {
        let err = ConfigError::ValidationError("max_difficulty must be at least 1".to_string());
        assert_eq!(
            format!("{err}"),
            "validation error: max_difficulty must be at least 1"
        );
    }

    #[test]
    fn display_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = ConfigError::IoError(io_err);
        assert!(format!("{err}").starts_with("failed to read configuration:"));
    }
}
