//! Error types for template extraction and deck synthesis.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a build.
///
/// Everything recoverable is reported as a [`crate::DegradeEvent`] instead.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open or read the input file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// The template package could not be read at all.
    #[error("Template extraction error: {0}")]
    ExtractionError(String),

    /// ZIP archive error (for PPTX).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML parsing error (for PPTX).
    #[error("XML parsing error: {0}")]
    XmlError(String),

    /// The document model failed in a way no slide-level fallback can absorb.
    #[error("Document model failure: {0}")]
    DocumentError(#[from] DocumentError),

    /// An external collaborator (normalizer, content generator) failed.
    #[error("Collaborator failure: {0}")]
    CollaboratorError(#[from] CollaboratorError),
}

/// Failure reported by a [`crate::DocumentModel`] operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// The requested layout does not exist.
    #[error("no layout at index {0}")]
    UnknownLayout(usize),

    /// The slide handle does not refer to a pending slide.
    #[error("unknown slide {0}")]
    UnknownSlide(usize),

    /// The shape does not exist on the slide.
    #[error("slide {slide} has no shape {shape}")]
    UnknownShape { slide: usize, shape: usize },

    /// The shape cannot hold text.
    #[error("shape {0} has no text frame")]
    NotTextCapable(usize),

    /// No template image with the given id.
    #[error("no template image '{0}'")]
    UnknownImage(String),

    /// Any other backend failure.
    #[error("{0}")]
    Backend(String),
}

/// Failure of an assisted step that lives outside the core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{collaborator}: {message}")]
pub struct CollaboratorError {
    pub collaborator: String,
    pub message: String,
}

impl CollaboratorError {
    pub fn new(collaborator: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            collaborator: collaborator.into(),
            message: message.into(),
        }
    }
}
