//! Page-link rewriting and the registry of discovered route names.

use std::collections::BTreeSet;

use crate::asset_paths::{classify_passthrough, split_suffix};
use crate::dom::{Document, NodeId};
use crate::placeholder::PlaceholderStyle;

/// Distinct page-link route names in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkRegistry {
  seen: BTreeSet<String>,
  names: Vec<String>,
}

impl LinkRegistry {
  /// Record a route name, ignoring repeats.
  pub fn push(&mut self, name: &str) {
    if self.seen.insert(name.to_string()) {
      self.names.push(name.to_string());
    }
  }

  /// Route names in first-seen order.
  pub fn names(&self) -> &[String] {
    &self.names
  }

  /// Consume the registry into its ordered names.
  pub fn into_names(self) -> Vec<String> {
    self.names
  }
}

/// Route name for a local page link ending in `extension`, if it is one.
///
/// The name is the path without the extension and without a leading `./`.
pub fn page_route_name(href: &str, extension: &str) -> Option<String> {
  let trimmed = href.trim();
  if extension.is_empty() || classify_passthrough(trimmed).is_some() {
    return None;
  }
  let (path, _) = split_suffix(trimmed);
  let stem = path.strip_suffix(extension)?;
  let stem = stem.trim_start_matches("./").trim_start_matches('/');
  (!stem.is_empty()).then(|| stem.to_string())
}

/// Rewrites `a[href]` page links to route placeholders and records their names.
pub struct PageLinkRewriter<'a, P: PlaceholderStyle + ?Sized> {
  placeholders: &'a P,
  extension: &'a str,
}

impl<'a, P: PlaceholderStyle + ?Sized> PageLinkRewriter<'a, P> {
  /// Create a rewriter for links ending in `extension` (e.g. `.html`).
  pub fn new(placeholders: &'a P, extension: &'a str) -> Self {
    Self {
      placeholders,
      extension,
    }
  }

  /// Rewrite every matching anchor in `document`, adding route names to `registry`.
  ///
  /// Returns the number of anchors rewritten.
  pub fn rewrite(&self, document: &mut Document, registry: &mut LinkRegistry) -> usize {
    let mut rewritten = 0;
    for id in document.elements_named("a") {
      if self.rewrite_anchor(document, id, registry) {
        rewritten += 1;
      }
    }
    rewritten
  }

  fn rewrite_anchor(&self, document: &mut Document, id: NodeId, registry: &mut LinkRegistry) -> bool {
    let Some(href) = document.attr(id, "href").map(str::to_string) else {
      return false;
    };
    let Some(route) = page_route_name(&href, self.extension) else {
      return false;
    };

    let (_, suffix) = split_suffix(href.trim());
    let replacement = format!("{}{}", self.placeholders.route_reference(&route), suffix);
    tracing::debug!(%href, %replacement, "rewriting page link");
    document.set_attr(id, "href", replacement);
    registry.push(&route);
    true
  }
}
