//! Error handling for cls-overhead

use thiserror::Error;

/// Error types produced by the extractor, summarizer and probes
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors (result files, standard streams, child processes)
    #[error("I/O error: {0}")]
    Io(String),

    /// Parsing errors (result file lines, JSON replies)
    #[error("Parsing error: {0}")]
    Parse(String),

    /// Failures reaching the cluster's administrative or object endpoints
    #[error("Cluster error: {0}")]
    Cluster(String),

    /// Timeout errors
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// Statistics calculation errors
    #[error("Statistics error: {0}")]
    Statistics(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io(message.into())
    }

    /// Create a new parsing error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse(message.into())
    }

    /// Create a new cluster error
    pub fn cluster<S: Into<String>>(message: S) -> Self {
        Self::Cluster(message.into())
    }

    /// Create a new timeout error
    pub fn timeout<S: Into<String>>(message: S) -> Self {
        Self::Timeout(message.into())
    }

    /// Create a new statistics error
    pub fn statistics<S: Into<String>>(message: S) -> Self {
        Self::Statistics(message.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Get error category for logging and reporting
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG",
            Self::Io(_) => "IO",
            Self::Parse(_) => "PARSE",
            Self::Cluster(_) => "CLUSTER",
            Self::Timeout(_) => "TIMEOUT",
            Self::Statistics(_) => "STATS",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Get exit code for this error type
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Parse(_) => 1,
            Self::Cluster(_) => 2,
            Self::Timeout(_) => 3,
            Self::Io(_) => 5,
            Self::Statistics(_) => 6,
            Self::Internal(_) => 99,
        }
    }

    /// Format error for console display with color coding
    pub fn format_for_console(&self, use_color: bool) -> String {
        let category = self.category();
        let message = self.to_string();

        if use_color {
            use colored::Colorize;
            match self {
                Self::Config(_) | Self::Parse(_) => {
                    format!("[{}] {}", category.red().bold(), message.red())
                }
                Self::Cluster(_) => {
                    format!("[{}] {}", category.yellow().bold(), message.yellow())
                }
                Self::Timeout(_) => {
                    format!("[{}] {}", category.blue().bold(), message.blue())
                }
                Self::Io(_) | Self::Statistics(_) => {
                    format!("[{}] {}", category.cyan().bold(), message.cyan())
                }
                Self::Internal(_) => {
                    format!("[{}] {}", category.bright_red().bold(), message.bright_red())
                }
            }
        } else {
            format!("[{}] {}", category, message)
        }
    }
}

// Standard library error conversions
impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<url::ParseError> for AppError {
    fn from(error: url::ParseError) -> Self {
        Self::parse(format!("URL parse error: {}", error))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::parse(format!("JSON parse error: {}", error))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::timeout(error.to_string())
        } else {
            Self::cluster(error.to_string())
        }
    }
}

impl From<glob::PatternError> for AppError {
    fn from(error: glob::PatternError) -> Self {
        Self::config(format!("Invalid results pattern: {}", error))
    }
}

impl From<glob::GlobError> for AppError {
    fn from(error: glob::GlobError) -> Self {
        Self::io(error.to_string())
    }
}

impl From<dotenv::Error> for AppError {
    fn from(error: dotenv::Error) -> Self {
        Self::config(format!("Environment file error: {}", error))
    }
}

/// Custom Result type for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Error context trait for adding context to errors
pub trait ErrorContext<T> {
    /// Add context to an error, keeping its category
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<AppError>,
{
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.into().prefixed(&f()))
    }
}

impl AppError {
    /// Rebuild this error with `prefix` prepended to its message
    fn prefixed(self, prefix: &str) -> Self {
        let wrap = |msg: String| format!("{}: {}", prefix, msg);
        match self {
            Self::Config(m) => Self::Config(wrap(m)),
            Self::Io(m) => Self::Io(wrap(m)),
            Self::Parse(m) => Self::Parse(wrap(m)),
            Self::Cluster(m) => Self::Cluster(wrap(m)),
            Self::Timeout(m) => Self::Timeout(wrap(m)),
            Self::Statistics(m) => Self::Statistics(wrap(m)),
            Self::Internal(m) => Self::Internal(wrap(m)),
        }
    }
}

/// Error reporter for user-facing error output
pub struct ErrorReporter {
    pub use_color: bool,
    pub verbose: bool,
}

impl ErrorReporter {
    /// Create a new error reporter
    pub fn new(use_color: bool, verbose: bool) -> Self {
        Self { use_color, verbose }
    }

    /// Report an error to the user
    pub fn report_error(&self, error: &AppError) {
        eprintln!("{}", error.format_for_console(self.use_color));

        if self.verbose {
            if let Some(hint) = suggestion(error) {
                eprintln!();
                eprintln!("{}", hint);
            }
        }
    }
}

/// Short remediation hint for the error categories users can act on
pub fn suggestion(error: &AppError) -> Option<&'static str> {
    match error {
        AppError::Config(_) => Some(
            "Check your .env file, environment variables and command line flags.",
        ),
        AppError::Parse(_) => Some(
            "Result files are expected to contain '<iteration>: <nanoseconds>' lines.",
        ),
        AppError::Cluster(_) => Some(
            "Verify CEPH_RESTFUL_URL and credentials, or CEPH_CONF and CEPH_CLIENT_ID for the librados backend.",
        ),
        AppError::Timeout(_) => Some("Increase the timeout with --timeout or CEPH_TIMEOUT_SECONDS."),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert_eq!(AppError::config("x").category(), "CONFIG");
        assert_eq!(AppError::cluster("x").category(), "CLUSTER");
        assert_eq!(AppError::timeout("x").category(), "TIMEOUT");
        assert_eq!(AppError::statistics("x").category(), "STATS");
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(AppError::config("x").exit_code(), 1);
        assert_eq!(AppError::cluster("x").exit_code(), 2);
        assert_eq!(AppError::timeout("x").exit_code(), 3);
        assert_eq!(AppError::io("x").exit_code(), 5);
        assert_eq!(AppError::internal("x").exit_code(), 99);
    }

    #[test]
    fn test_plain_console_format() {
        let error = AppError::parse("bad line");
        assert_eq!(error.format_for_console(false), "[PARSE] Parsing error: bad line");
    }

    #[test]
    fn test_with_context_keeps_category() {
        let result: std::result::Result<(), AppError> = Err(AppError::parse("no separator"));
        let error = result.with_context(|| "results/a.dat:3".to_string()).unwrap_err();
        assert!(matches!(error, AppError::Parse(_)));
        assert_eq!(error.to_string(), "Parsing error: results/a.dat:3: no separator");
    }

    #[test]
    fn test_io_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let error: AppError = io_error.into();
        assert!(matches!(error, AppError::Io(_)));
    }

    #[test]
    fn test_suggestions() {
        assert!(suggestion(&AppError::timeout("x")).is_some());
        assert!(suggestion(&AppError::internal("x")).is_none());
    }
}
