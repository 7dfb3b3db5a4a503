//! Error types for the tweet-sentiment library.
//!
//! All fallible operations return [`Result`], whose error type is the
//! [`SentimentError`] enum. Variants fall into four categories (see
//! [`ErrorCategory`]):
//!
//! - **Input**: the caller handed over bad data (missing CSV columns,
//!   mismatched lengths, non-finite features, unknown labels).
//! - **State**: a lifecycle fault (predicting before fitting, artifacts whose
//!   shapes disagree).
//! - **Io**: artifacts or datasets could not be read or were corrupt.
//! - **Analysis**: the text analysis chain could not be built.
//!
//! Optimizer non-convergence is deliberately *not* an error; see
//! [`crate::ml::logistic::ConvergenceWarning`].
//!
//! # Examples
//!
//! ```
//! use tweet_sentiment::error::{ErrorCategory, Result, SentimentError};
//!
//! fn check(n: usize) -> Result<()> {
//!     if n == 0 {
//!         return Err(SentimentError::input("corpus is empty"));
//!     }
//!     Ok(())
//! }
//!
//! let err = check(0).unwrap_err();
//! assert_eq!(err.category(), ErrorCategory::Input);
//! ```

use std::io;

use thiserror::Error;

/// The main error type for tweet-sentiment operations.
#[derive(Error, Debug)]
pub enum SentimentError {
    /// Malformed caller input.
    #[error("Input error: {0}")]
    Input(String),

    /// Required dataset columns are absent.
    #[error("Input error: missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// Two sequences that must be parallel have different lengths.
    #[error("Input error: length mismatch: expected {expected} items, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// A feature value is NaN or infinite.
    #[error("Input error: non-finite feature value {value} at index {index}")]
    NonFiniteFeature { index: usize, value: f64 },

    /// A label was not seen when the label encoder was fitted.
    #[error("Input error: unknown label '{0}'")]
    UnknownLabel(String),

    /// A component was used before being fitted or loaded.
    #[error("State error: {0} is not fitted; call fit or load its artifact first")]
    NotFitted(&'static str),

    /// Fitted components disagree on dimensionality or class count.
    #[error("State error: shape mismatch: {0}")]
    ShapeMismatch(String),

    /// A class index outside the fitted label set.
    #[error("State error: class index {index} out of range for {len} labels")]
    IndexOutOfRange { index: usize, len: usize },

    /// I/O errors (file operations, stdin, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A named artifact does not exist in storage.
    #[error("Artifact error: '{name}' is missing")]
    ArtifactMissing { name: String },

    /// A named artifact exists but cannot be decoded or failed validation.
    #[error("Artifact error: '{name}' is corrupt: {reason}")]
    ArtifactCorrupt { name: String, reason: String },

    /// Storage backend errors.
    #[error("Storage error: {0}")]
    Storage(String),

    /// CSV reading errors.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Analysis-related errors (char filters, tokenization, etc.)
    #[error("Analysis error: {0}")]
    Analysis(String),
}

/// Result type alias for operations that may fail with [`SentimentError`].
pub type Result<T> = std::result::Result<T, SentimentError>;

/// Coarse classification of [`SentimentError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The caller's data is wrong.
    Input,
    /// Component lifecycle fault.
    State,
    /// Storage or file system fault.
    Io,
    /// Text analysis configuration fault.
    Analysis,
}

impl SentimentError {
    /// Create a new input error.
    pub fn input<S: Into<String>>(msg: S) -> Self {
        SentimentError::Input(msg.into())
    }

    /// Create a new shape mismatch error.
    pub fn shape<S: Into<String>>(msg: S) -> Self {
        SentimentError::ShapeMismatch(msg.into())
    }

    /// Create a new storage error.
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        SentimentError::Storage(msg.into())
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        SentimentError::Analysis(msg.into())
    }

    /// Create a new artifact corruption error.
    pub fn corrupt<N: Into<String>, R: Into<String>>(name: N, reason: R) -> Self {
        SentimentError::ArtifactCorrupt {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a new missing artifact error.
    pub fn missing<N: Into<String>>(name: N) -> Self {
        SentimentError::ArtifactMissing { name: name.into() }
    }

    /// The category this error belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            SentimentError::Input(_)
            | SentimentError::MissingColumns(_)
            | SentimentError::LengthMismatch { .. }
            | SentimentError::NonFiniteFeature { .. }
            | SentimentError::UnknownLabel(_) => ErrorCategory::Input,
            SentimentError::NotFitted(_)
            | SentimentError::ShapeMismatch(_)
            | SentimentError::IndexOutOfRange { .. } => ErrorCategory::State,
            SentimentError::Io(_)
            | SentimentError::ArtifactMissing { .. }
            | SentimentError::ArtifactCorrupt { .. }
            | SentimentError::Storage(_)
            | SentimentError::Csv(_)
            | SentimentError::Json(_) => ErrorCategory::Io,
            SentimentError::Analysis(_) => ErrorCategory::Analysis,
        }
    }

    /// Whether the caller's input caused this error.
    pub fn is_input_error(&self) -> bool {
        self.category() == ErrorCategory::Input
    }

    /// Whether a lifecycle fault caused this error.
    pub fn is_state_error(&self) -> bool {
        self.category() == ErrorCategory::State
    }

    /// Whether storage or I/O caused this error.
    pub fn is_io_error(&self) -> bool {
        self.category() == ErrorCategory::Io
    }
}
