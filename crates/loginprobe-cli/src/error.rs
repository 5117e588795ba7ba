//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Test execution error
    #[error("Test execution failed: {message}")]
    TestExecution {
        /// Error message
        message: String,
    },

    /// The run completed but some tests failed
    #[error("{failures} of {tests} test(s) failed")]
    TestsFailed {
        /// Failed tests
        failures: usize,
        /// Tests executed
        tests: usize,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Library error
    #[error(transparent)]
    Probe(#[from] loginprobe::ProbeError),

    /// Invalid argument
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message
        message: String,
    },
}

impl CliError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a test execution error
    #[must_use]
    pub fn test_execution(message: impl Into<String>) -> Self {
        Self::TestExecution {
            message: message.into(),
        }
    }

    /// Create an invalid argument error
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

impl From<regex::Error> for CliError {
    fn from(e: regex::Error) -> Self {
        Self::invalid_argument(format!("--grep: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error() {
        let err = CliError::config("bad config");
        assert!(err.to_string().contains("Configuration"));
        assert!(err.to_string().contains("bad config"));
    }

    #[test]
    fn test_tests_failed_message() {
        let err = CliError::TestsFailed {
            failures: 2,
            tests: 16,
        };
        assert_eq!(err.to_string(), "2 of 16 test(s) failed");
    }

    #[test]
    fn test_probe_error_is_transparent() {
        let err: CliError = loginprobe::ProbeError::fixture("missing").into();
        assert_eq!(err.to_string(), "Fixture error: missing");
    }

    #[test]
    fn test_regex_error_from() {
        let err: CliError = regex::Regex::new("(").unwrap_err().into();
        assert!(err.to_string().contains("--grep"));
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let cli_err: CliError = io_err.into();
        assert!(cli_err.to_string().contains("I/O"));
    }
}
