//! Run-level errors
//!
//! [`AppError`] stops a run before or after measuring: bad configuration, an
//! unwritable report, a broken HTTP stack. Failures of individual probes never
//! become an `AppError`; they are [`ProbeError`]s and end up as absent report
//! entries.

pub mod probe;

pub use probe::{ProbeError, ProbeResult};

use colored::{Color, Colorize};
use thiserror::Error;

/// Errors that end a run of the network path tester
#[derive(Error, Debug)]
pub enum AppError {
    /// Unknown metric names, out-of-range limits, unreadable `.env` files
    #[error("Configuration error: {0}")]
    Config(String),

    /// The HTTP stack used for bandwidth transfers could not be set up
    #[error("Network error: {0}")]
    Network(String),

    /// Report or log files could not be written
    #[error("I/O error: {0}")]
    Io(String),

    /// Malformed values such as log levels or report JSON
    #[error("Parsing error: {0}")]
    Parse(String),

    /// Invariant violations inside the tester itself
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network(message.into())
    }

    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io(message.into())
    }

    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse(message.into())
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Short tag used in console output and log fields
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG",
            Self::Network(_) => "NETWORK",
            Self::Io(_) => "IO",
            Self::Parse(_) => "PARSE",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Whether running again unchanged could succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Io(_))
    }

    /// Process exit code
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Parse(_) => 1,
            Self::Network(_) => 2,
            Self::Io(_) => 5,
            Self::Internal(_) => 99,
        }
    }

    /// What the user can do about it
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::Config(_) => "Check your .env file, environment variables and command line arguments (npt --check-env).",
            Self::Network(_) => "Check the TLS and proxy setup of this machine.",
            Self::Io(_) => "Check file permissions and free disk space.",
            Self::Parse(_) => "Check the format of the offending value.",
            Self::Internal(_) => "This is likely a bug. Please report it with the error details.",
        }
    }

    /// Error followed by a suggestion, for verbose output
    pub fn user_friendly_message(&self) -> String {
        format!("{}\n\nSuggestion: {}", self, self.suggestion())
    }

    /// `[CATEGORY] message`, colored by severity when `use_color` is set
    pub fn format_for_console(&self, use_color: bool) -> String {
        let category = self.category();
        let message = self.to_string();

        if !use_color {
            return format!("[{}] {}", category, message);
        }

        let color = match self {
            Self::Config(_) | Self::Parse(_) => Color::Red,
            Self::Network(_) => Color::Yellow,
            Self::Io(_) => Color::Cyan,
            Self::Internal(_) => Color::BrightRed,
        };
        format!("[{}] {}", category.color(color).bold(), message.color(color))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::parse(format!("JSON error: {}", error))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        Self::network(format!("HTTP client error: {}", error))
    }
}

impl From<dotenv::Error> for AppError {
    fn from(error: dotenv::Error) -> Self {
        Self::config(format!("Environment file error: {}", error))
    }
}

/// Crate-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Prints run-level errors to stderr
pub struct ErrorReporter {
    pub use_color: bool,
    pub verbose: bool,
}

impl ErrorReporter {
    pub fn new(use_color: bool, verbose: bool) -> Self {
        Self { use_color, verbose }
    }

    /// Console line, plus the suggestion in verbose mode
    pub fn render(&self, error: &AppError) -> String {
        let mut out = error.format_for_console(self.use_color);
        if self.verbose {
            out.push_str("\n\nSuggestion: ");
            out.push_str(error.suggestion());
        }
        out
    }

    pub fn report_error(&self, error: &AppError) {
        eprintln!("{}", self.render(error));
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}
