//! Error types for the ODP CLI
//!
//! User-facing errors with clear, actionable messages. Pipeline errors pass
//! through transparently; they already carry their own guidance.

use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Error type for CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    /// Pipeline operation failed
    #[error(transparent)]
    Pipeline(#[from] odp_pipeline::PipelineError),

    /// Configuration is missing or invalid
    #[error("Configuration error: {0}. Check your environment variables or .env file.")]
    Config(String),

    /// Required file is missing
    #[error("File not found: '{0}'. Paths in the datapackage are resolved relative to the datapackage file.")]
    FileNotFound(String),

    /// A --table filter matched nothing
    #[error("Table '{0}' is not declared in the datapackage. Run 'odp check' to list declared tables.")]
    TableNotFound(String),

    /// File system operation failed
    #[error("File operation failed: {0}. Check file permissions and paths.")]
    Io(#[from] std::io::Error),

    /// JSON serialization failed
    #[error("Failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_errors_pass_through_unchanged() {
        let inner = odp_pipeline::PipelineError::InvalidName("--".to_string());
        let message = inner.to_string();
        let wrapped: CliError = inner.into();
        assert_eq!(wrapped.to_string(), message);
    }

    #[test]
    fn test_config_error_mentions_env() {
        let err = CliError::config("ODP_API_TOKEN is required in production");
        assert!(err.to_string().contains("environment variables"));
    }
}
