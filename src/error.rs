//! Error taxonomy shared by the resolver, the asset store and the segmenter.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while converting a document into fragments.
///
/// [`ConvertError::ResourceNotFound`] and [`ConvertError::MalformedComment`] are absorbed by the
/// conversion and reported through [`crate::models::ConversionResult::diagnostics`]; every other
/// variant aborts the current document.
#[derive(Error, Debug)]
pub enum ConvertError {
  /// A local reference has no file behind it.
  #[error("resource `{reference}` not found at {}", .candidate.display())]
  ResourceNotFound {
    /// Reference text as written in the document or stylesheet.
    reference: String,
    /// Path the reference resolved to.
    candidate: PathBuf,
  },

  /// Two different sources sanitise to the same destination.
  #[error(
    "destination `{name}` is already taken by {} and cannot also receive {}",
    .existing.display(),
    .incoming.display()
  )]
  DestinationConflict {
    /// Sanitised destination name inside the content tree.
    name: String,
    /// Source already stored under `name`.
    existing: PathBuf,
    /// Source that tried to claim `name`.
    incoming: PathBuf,
  },

  /// A Start marker has no End marker among its following siblings.
  #[error("section `{name}` has no matching End marker among its siblings")]
  UnterminatedSection {
    /// Section name taken from the Start marker.
    name: String,
  },

  /// A section name is opened more than once.
  #[error("section `{name}` is opened more than once")]
  DuplicateSection {
    /// Repeated section name.
    name: String,
  },

  /// A marker comment carries no usable section name in front of the marker word.
  ///
  /// Names must be a single plain file-name token of word characters, `-` and `.`.
  #[error("marker comment `{text}` has no usable section name")]
  MalformedComment {
    /// Trimmed comment text.
    text: String,
  },

  /// A section's template file would replace another generated template.
  #[error("section `{name}` would be written to `{file}`, which is already taken")]
  TemplateConflict {
    /// Section name as written in the marker.
    name: String,
    /// Template file name both would use.
    file: String,
  },

  /// Read, write or copy failure at the storage boundary.
  #[error("I/O error at {}: {source}", .path.display())]
  Io {
    /// Path involved in the failed operation.
    path: PathBuf,
    /// Underlying I/O error.
    #[source]
    source: std::io::Error,
  },
}

impl ConvertError {
  /// Wrap an I/O error with the path it happened on.
  pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    Self::Io {
      path: path.into(),
      source,
    }
  }

  /// Whether the conversion skips over this error instead of aborting.
  pub fn is_recoverable(&self) -> bool {
    matches!(
      self,
      Self::ResourceNotFound { .. } | Self::MalformedComment { .. }
    )
  }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, ConvertError>;
