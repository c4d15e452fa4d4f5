//! Error types for the conversion pipeline.

use std::{io, path::PathBuf};

/// Result type for conversion operations.
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Coarse error category, stable across variants, for callers that map
/// failures to user-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  Configuration,
  Structural,
  Parse,
  Io,
}

/// Errors that abort a conversion. None of them leave output behind.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
  /// Base template, snippet directory, or a snippet file is missing or
  /// unusable.
  #[error("configuration error: {0}")]
  Configuration(String),

  /// The anchor comments in the body markup are missing or out of order.
  #[error("structural error: {0}")]
  Structural(String),

  /// Body markup or a composed fragment is not well-formed.
  #[error("failed to parse {what}: {message}")]
  Parse { what: String, message: String },

  /// Workspace or output I/O failed.
  #[error("I/O error at `{path}`: {source}")]
  Io {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  /// Writing the container archive failed.
  #[error("failed to write container: {0}")]
  Archive(#[from] zip::result::ZipError),
}

impl ConvertError {
  #[must_use]
  pub const fn kind(&self) -> ErrorKind {
    match self {
      Self::Configuration(_) => ErrorKind::Configuration,
      Self::Structural(_) => ErrorKind::Structural,
      Self::Parse { .. } => ErrorKind::Parse,
      Self::Io { .. } | Self::Archive(_) => ErrorKind::Io,
    }
  }

  pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
    Self::Io {
      path: path.into(),
      source,
    }
  }

  pub(crate) fn parse(
    what: impl Into<String>,
    message: impl ToString,
  ) -> Self {
    Self::Parse {
      what:    what.into(),
      message: message.to_string(),
    }
  }
}
