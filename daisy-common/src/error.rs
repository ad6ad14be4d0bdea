//! Common error types for the Daisy portal

use thiserror::Error;

/// Common result type for portal operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by the stores, the upload orchestrator and the API layer
#[derive(Error, Debug)]
pub enum Error {
    /// Admission number is not present in the roster
    #[error("Unknown student: {0}")]
    UnknownStudent(String),

    /// Category outside {gallery, result, letter}
    #[error("Invalid category: {0}")]
    InvalidCategory(String),

    /// Upload request carried no usable files
    #[error("No files provided")]
    NoFilesProvided,

    /// Media host rejected or failed an upload
    #[error("Remote upload failed: {0}")]
    RemoteUploadFailed(String),

    /// Media host failed to destroy a resource; the local record is kept
    #[error("Remote delete failed: {0}")]
    RemoteDeleteFailed(String),

    /// Biography text is blank after trimming
    #[error("Biography must not be empty")]
    EmptyBiography,

    /// Persisted store could not be reached or the statement failed (wraps sqlx::Error)
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Roster source could not be parsed at all
    #[error("Roster error: {0}")]
    Roster(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Stable machine-readable kind, used as the `code` field of API errors
    pub fn kind(&self) -> &'static str {
        match self {
            Error::UnknownStudent(_) => "UNKNOWN_STUDENT",
            Error::InvalidCategory(_) => "INVALID_CATEGORY",
            Error::NoFilesProvided => "NO_FILES_PROVIDED",
            Error::RemoteUploadFailed(_) => "REMOTE_UPLOAD_FAILED",
            Error::RemoteDeleteFailed(_) => "REMOTE_DELETE_FAILED",
            Error::EmptyBiography => "EMPTY_BIOGRAPHY",
            Error::StorageUnavailable(_) => "STORAGE_UNAVAILABLE",
            Error::Io(_) => "IO_ERROR",
            Error::Roster(_) => "ROSTER_ERROR",
            Error::Config(_) => "CONFIG_ERROR",
        }
    }
}
