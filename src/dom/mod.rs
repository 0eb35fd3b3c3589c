//! Typed HTML document tree built with html5ever.

mod arena;
mod serialize;
mod sink;

use std::fs;
use std::path::Path;

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;

pub use arena::{Attribute, Children, Document, NodeData, NodeId};
pub use sink::{DocumentSink, NodeHandle};

use crate::error::{ConvertError, Result};

impl Document {
  /// Parse an HTML document from text.
  pub fn parse(html: &str) -> Self {
    parse_document(DocumentSink::new(), ParseOpts::default())
      .one(html)
      .into_document()
  }

  /// Read and parse an HTML document from disk. Invalid UTF-8 is replaced lossily.
  pub fn load(path: &Path) -> Result<Self> {
    let bytes = fs::read(path).map_err(|err| ConvertError::io(path, err))?;
    Ok(
      parse_document(DocumentSink::new(), ParseOpts::default())
        .from_utf8()
        .one(bytes.as_slice())
        .into_document(),
    )
  }

  /// The `<head>` element, if the document has one.
  pub fn head(&self) -> Option<NodeId> {
    self.elements_named("head").into_iter().next()
  }

  /// The `<body>` element, if the document has one.
  pub fn body(&self) -> Option<NodeId> {
    self.elements_named("body").into_iter().next()
  }
}

/// Element kinds whose reference attribute is rewritten to the asset namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkableElement {
  /// `<link rel="stylesheet" href>`.
  Stylesheet,
  /// `<script src>`.
  Script,
  /// `<img src>`.
  Image,
}

impl LinkableElement {
  /// Decide whether an element carries a rewritable asset reference.
  pub fn classify(document: &Document, id: NodeId) -> Option<Self> {
    match document.element_name(id)? {
      "link" => document
        .attr(id, "rel")
        .is_some_and(|rel| {
          rel
            .split_ascii_whitespace()
            .any(|token| token.eq_ignore_ascii_case("stylesheet"))
        })
        .then_some(Self::Stylesheet),
      "script" => Some(Self::Script),
      "img" => Some(Self::Image),
      _ => None,
    }
  }

  /// Attribute holding the reference.
  pub fn reference_attribute(self) -> &'static str {
    match self {
      Self::Stylesheet => "href",
      Self::Script | Self::Image => "src",
    }
  }
}
