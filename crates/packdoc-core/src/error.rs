//! Error types for the packdoc-core library.

use thiserror::Error;

use crate::documents::ArtifactKind;
use crate::invoice::CsvProfile;

/// Generic message shown to end users for internal faults.
const INTERNAL_APOLOGY: &str =
    "An error occurred while processing your files. Please check your files and try again.";

/// Main error type for the packdoc library.
#[derive(Error, Debug)]
pub enum PackdocError {
    /// The uploaded input cannot be used.
    #[error("input error: {0}")]
    Input(#[from] InputError),

    /// An artifact could not be rendered.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// Text recognition failed.
    #[error("recognition error: {0}")]
    Recognition(#[from] RecognitionError),

    /// The archive could not be assembled.
    #[error("archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl PackdocError {
    /// Whether the failure was caused by the caller's input rather than an internal fault.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::Input(_))
    }

    /// Message suitable for the end user.
    ///
    /// Input errors are specific and actionable. Everything else collapses to a
    /// generic apology so internal diagnostics never leak.
    pub fn user_message(&self) -> String {
        match self {
            Self::Input(e) => e.to_string(),
            _ => INTERNAL_APOLOGY.to_string(),
        }
    }
}

/// Errors caused by unusable input files.
#[derive(Error, Debug)]
pub enum InputError {
    /// No bytes were supplied for the CSV file.
    #[error("CSV file is required and cannot be empty")]
    MissingCsv,

    /// The CSV produced no records.
    #[error(
        "CSV file appears to be empty or has invalid format. Please check your CSV file contains the required columns: {}",
        .profile.required_columns().join(", ")
    )]
    NoRecords { profile: CsvProfile },

    /// The CSV is structurally broken (unbalanced quotes and similar).
    #[error("There was an issue parsing the CSV file near line {line}: {reason}")]
    MalformedCsv { line: u64, reason: String },

    /// The requested date stamp is not usable as a file name component.
    #[error("invalid date stamp '{0}': expected six digits (yyMMdd)")]
    InvalidDateStamp(String),
}

/// Errors raised while writing one artifact.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The byte sink rejected a write.
    #[error("failed to write {artifact}: {source}")]
    Write {
        artifact: ArtifactKind,
        #[source]
        source: std::io::Error,
    },

    /// The CSV encoder failed.
    #[error("failed to encode {artifact}: {reason}")]
    Encode { artifact: ArtifactKind, reason: String },
}

/// Errors from a text recognizer.
#[derive(Error, Debug)]
pub enum RecognitionError {
    /// Failed to load recognition models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// The bytes are not a decodable image.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// The engine ran but could not read the image.
    #[error("text recognition failed: {0}")]
    Recognition(String),
}

/// Errors from the archive writer.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// Two artifacts share an entry name.
    #[error("duplicate archive entry: {0}")]
    DuplicateEntry(String),

    /// The ZIP writer failed.
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Writing entry bytes failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the packdoc library.
pub type Result<T> = std::result::Result<T, PackdocError>;
