//! Error types shared by every component of the outreach core.

use thiserror::Error;

use crate::intake::FieldErrors;

/// Result type for outreach operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Every way an outreach operation can be rejected.
///
/// None of these are fatal to the process. Validation and authentication
/// failures are meant to be shown next to the form; the rest abort the one
/// operation that raised them and leave prior state untouched.
#[derive(Error, Debug)]
pub enum Error {
    /// One or more fields failed their schema rules.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// Staff login rejected.
    #[error("Invalid username or password")]
    Authentication,

    /// The operation needs an authenticated staff session.
    #[error("staff login required")]
    Unauthenticated,

    /// An image or payload does not fit where it has to go.
    #[error("{0}")]
    Capacity(String),

    /// An attached file is not an image we recognise.
    #[error("unsupported image: {0}")]
    UnsupportedImage(String),

    /// Reading an attached image failed.
    #[error("Failed to read image file: {0}")]
    ImageRead(#[source] std::io::Error),

    /// Export was requested with no generated artifact.
    #[error("no QR code has been generated yet")]
    ExportUnavailable,

    /// The form is in its submitted state; `submit_another` must run first.
    #[error("form already submitted")]
    AlreadySubmitted,

    /// Rasterising the QR code failed.
    #[error("render error: {0}")]
    Render(String),

    /// Durable store read or write failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// Visitor session read or write failed.
    #[error("session error: {0}")]
    Session(String),
}

impl From<sea_orm::DbErr> for Error {
    fn from(err: sea_orm::DbErr) -> Self {
        Error::Storage(err.to_string())
    }
}

impl From<FieldErrors> for Error {
    fn from(errors: FieldErrors) -> Self {
        Error::Validation(errors)
    }
}

impl From<tower_sessions::session::Error> for Error {
    fn from(err: tower_sessions::session::Error) -> Self {
        Error::Session(err.to_string())
    }
}
