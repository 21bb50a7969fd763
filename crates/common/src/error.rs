//! Error types shared across Birthcard crates.

use std::path::PathBuf;

/// Top-level error type for Birthcard operations.
#[derive(Debug, thiserror::Error)]
pub enum BirthcardError {
    /// A template or user photo could not be read or decoded.
    #[error("Asset load failed: {message}")]
    AssetLoadFailed { message: String },

    /// The storage collaborator rejected the file, or the network call failed.
    #[error("Upload failed: {message}")]
    UploadFailed { message: String },

    /// The file was stored but writing its reference into the record failed.
    #[error("Record update failed: {message}")]
    RecordUpdateFailed { message: String },

    #[error("Nothing has been rendered yet")]
    NotRendered,

    #[error("No source record is bound to this generator")]
    NoSourceRecord,

    #[error("Invalid layer field: {message}")]
    InvalidField { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using BirthcardError.
pub type BirthcardResult<T> = Result<T, BirthcardError>;

impl BirthcardError {
    pub fn asset_load(msg: impl Into<String>) -> Self {
        Self::AssetLoadFailed {
            message: msg.into(),
        }
    }

    pub fn upload(msg: impl Into<String>) -> Self {
        Self::UploadFailed {
            message: msg.into(),
        }
    }

    pub fn record_update(msg: impl Into<String>) -> Self {
        Self::RecordUpdateFailed {
            message: msg.into(),
        }
    }

    pub fn invalid_field(msg: impl Into<String>) -> Self {
        Self::InvalidField {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Message suitable for showing to the person driving the generator.
    ///
    /// Remote failures name the step that failed so the user knows whether
    /// the image reached storage.
    pub fn user_message(&self) -> String {
        match self {
            Self::AssetLoadFailed { message } => format!("Could not load image: {message}"),
            Self::UploadFailed { message } => format!("Error uploading image: {message}"),
            Self::RecordUpdateFailed { message } => {
                format!("Image uploaded, but the record could not be updated: {message}")
            }
            Self::NotRendered => "Nothing to export yet: the preview has not been drawn".into(),
            Self::NoSourceRecord => "Upload needs a patient record to attach the image to".into(),
            other => format!("Error: {other}"),
        }
    }

    /// Whether this error came from one of the remote export steps.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::UploadFailed { .. } | Self::RecordUpdateFailed { .. }
        )
    }
}
