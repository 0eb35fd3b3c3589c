//! Data structures produced while converting a document.

use std::path::PathBuf;

use serde::Serialize;

use crate::error::ConvertError;

/// Classification of a reference found in markup or stylesheet text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceKind {
  /// Local path whose target exists.
  LocalExisting {
    /// Absolute, normalised path of the target file.
    source: PathBuf,
    /// Sanitised destination name relative to the content tree.
    relative_name: String,
  },
  /// Local path whose target does not exist (or is not a regular file).
  LocalMissing {
    /// Path the reference resolved to.
    candidate: PathBuf,
  },
  /// Reference carrying a URI scheme or a protocol-relative host.
  External,
  /// Embedded `data:` URI.
  DataUri,
  /// In-document `#fragment` reference.
  Fragment,
}

/// Reference token after classification. Immutable once built by the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
  raw: String,
  path: String,
  query: String,
  kind: ReferenceKind,
}

impl Reference {
  pub(crate) fn new(raw: &str, path: &str, query: &str, kind: ReferenceKind) -> Self {
    Self {
      raw: raw.to_string(),
      path: path.to_string(),
      query: query.to_string(),
      kind,
    }
  }

  /// Reference text exactly as found.
  pub fn raw(&self) -> &str {
    &self.raw
  }

  /// Path component without the suffix.
  pub fn path(&self) -> &str {
    &self.path
  }

  /// `?query` and/or `#fragment` suffix, verbatim, or an empty string.
  pub fn query(&self) -> &str {
    &self.query
  }

  /// Classification decided by the resolver.
  pub fn kind(&self) -> &ReferenceKind {
    &self.kind
  }

  /// Whether the reference points at something outside the local resource tree.
  pub fn is_passthrough(&self) -> bool {
    matches!(
      self.kind,
      ReferenceKind::External | ReferenceKind::DataUri | ReferenceKind::Fragment
    )
  }

  /// Diagnostic for a local reference that has no target, if this is one.
  pub fn missing_error(&self) -> Option<ConvertError> {
    match &self.kind {
      ReferenceKind::LocalMissing { candidate } => Some(ConvertError::ResourceNotFound {
        reference: self.raw.clone(),
        candidate: candidate.clone(),
      }),
      _ => None,
    }
  }
}

/// A resource copied into the content tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedAsset {
  /// Absolute path of the original resource.
  pub source: PathBuf,
  /// Sanitised, `/`-separated name relative to the content tree.
  pub relative_name: String,
  /// Absolute path of the copy.
  pub destination: PathBuf,
  /// Namespace-qualified public path substituted into stylesheets.
  pub public_reference: String,
}

impl ResolvedAsset {
  /// Whether the asset is a stylesheet that needs its own `url()` pass.
  pub fn is_stylesheet(&self) -> bool {
    self
      .source
      .extension()
      .and_then(|ext| ext.to_str())
      .is_some_and(|ext| ext.eq_ignore_ascii_case("css"))
  }
}

/// Named, comment-delimited run of sibling markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
  /// Section name, case preserved.
  pub name: String,
  /// Serialised sibling nodes strictly between the markers, in document order.
  pub nodes: Vec<String>,
}

impl Section {
  /// Concatenated markup of the section.
  pub fn content(&self) -> String {
    self.nodes.concat()
  }
}

/// Sections keyed by name, kept in the order their Start markers appear.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Sections(Vec<Section>);

impl Sections {
  pub(crate) fn push(&mut self, section: Section) {
    self.0.push(section);
  }

  /// Look up a section by exact, case-sensitive name.
  pub fn get(&self, name: &str) -> Option<&Section> {
    self.0.iter().find(|section| section.name == name)
  }

  /// Iterate sections in document order.
  pub fn iter(&self) -> impl Iterator<Item = &Section> {
    self.0.iter()
  }

  /// Section names in document order.
  pub fn names(&self) -> Vec<&str> {
    self.0.iter().map(|section| section.name.as_str()).collect()
  }

  /// Number of sections.
  pub fn len(&self) -> usize {
    self.0.len()
  }

  /// Whether no section was found.
  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

/// Everything a conversion hands to the template and routing collaborators.
#[derive(Debug, Default)]
pub struct ConversionResult {
  /// Extracted sections.
  pub sections: Sections,
  /// Distinct local page-link route names in first-seen order.
  pub page_links: Vec<String>,
  /// Resources copied into the content tree, in the order they were stored.
  pub assets: Vec<ResolvedAsset>,
  /// Serialised `<head>` element after rewriting, when the document has one.
  pub head: Option<String>,
  /// Serialised `script` elements inside `<body>`, after rewriting.
  pub body_scripts: Vec<String>,
  /// Recoverable problems that were skipped.
  pub diagnostics: Vec<ConvertError>,
}

/// Serializable summary written for the routing/view collaborator.
#[derive(Debug, Serialize)]
pub struct ConversionManifest<'a> {
  /// Namespace shared by templates and assets.
  pub namespace: &'a str,
  /// Section names in document order.
  pub sections: Vec<&'a str>,
  /// Page-link route names in first-seen order.
  pub page_links: &'a [String],
  /// Content-tree names of the copied assets.
  pub assets: Vec<&'a str>,
}

impl<'a> ConversionManifest<'a> {
  /// Summarise a conversion result.
  pub fn new(namespace: &'a str, result: &'a ConversionResult) -> Self {
    Self {
      namespace,
      sections: result.sections.names(),
      page_links: &result.page_links,
      assets: result
        .assets
        .iter()
        .map(|asset| asset.relative_name.as_str())
        .collect(),
    }
  }
}
