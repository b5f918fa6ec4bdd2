//! Error types for the kwcat library.
//!
//! All fallible operations return [`KwcatError`]. The classification policy
//! itself never fails; errors come from loading configuration, reading
//! keyword files and talking to the fallback classifier.
//!
//! # Examples
//!
//! ```
//! use kwcat::error::{KwcatError, Result};
//!
//! fn load() -> Result<()> {
//!     Err(KwcatError::config("missing token list categories: eval_terms"))
//! }
//!
//! match load() {
//!     Ok(_) => println!("Loaded"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for kwcat operations.
#[derive(Error, Debug)]
pub enum KwcatError {
    /// I/O errors (file operations, sockets, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration errors (token lists, taxonomy). Always fatal.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input table errors (unsupported file, missing keyword column).
    #[error("Input error: {0}")]
    Input(String),

    /// Fallback classifier errors (transport, response parsing).
    #[error("Fallback classifier error: {0}")]
    Fallback(String),

    /// Spreadsheet reading errors
    #[error("Workbook error: {0}")]
    Workbook(String),

    /// Workbook report writing errors
    #[error("Workbook writer error: {0}")]
    WorkbookWriter(#[from] rust_xlsxwriter::XlsxError),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML deserialization errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// CSV reading/writing errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with KwcatError.
pub type Result<T> = std::result::Result<T, KwcatError>;

impl KwcatError {
    /// Create a new configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        KwcatError::Config(msg.into())
    }

    /// Create a new input error.
    pub fn input<S: Into<String>>(msg: S) -> Self {
        KwcatError::Input(msg.into())
    }

    /// Create a new fallback classifier error.
    pub fn fallback<S: Into<String>>(msg: S) -> Self {
        KwcatError::Fallback(msg.into())
    }

    /// Create a new workbook error.
    pub fn workbook<S: Into<String>>(msg: S) -> Self {
        KwcatError::Workbook(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        KwcatError::Other(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        KwcatError::Other(format!("Invalid argument: {}", msg.into()))
    }

    /// Whether this error was caused by the caller's input rather than the service.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            KwcatError::Input(_) | KwcatError::Csv(_) | KwcatError::Workbook(_)
        )
    }
}
