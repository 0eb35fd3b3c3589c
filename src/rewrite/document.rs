//! Asset reference rewriting for linkable document elements.

use crate::asset_paths::PathResolver;
use crate::dom::{Document, LinkableElement, NodeId};
use crate::error::Result;
use crate::models::{Reference, ReferenceKind, ResolvedAsset};
use crate::placeholder::PlaceholderStyle;
use crate::rewrite::css::CssReferenceRewriter;
use crate::store::AssetStore;

/// Summary of a document scan.
#[derive(Debug, Default)]
pub struct ScanReport {
  /// Elements whose reference attribute was rewritten.
  pub rewritten: usize,
  /// Assets copied for elements and for their stylesheets.
  pub copied: Vec<ResolvedAsset>,
  /// Local references with no target.
  pub missing: Vec<Reference>,
}

/// Walks stylesheet links, scripts and images, copying their targets and rewriting the
/// reference attribute to the asset placeholder.
pub struct DocumentAssetScanner<'a, P: PlaceholderStyle + ?Sized> {
  resolver: &'a PathResolver,
  store: &'a mut AssetStore,
  placeholders: &'a P,
}

impl<'a, P: PlaceholderStyle + ?Sized> DocumentAssetScanner<'a, P> {
  /// Create a scanner for a document located in `resolver`'s root.
  pub fn new(resolver: &'a PathResolver, store: &'a mut AssetStore, placeholders: &'a P) -> Self {
    Self {
      resolver,
      store,
      placeholders,
    }
  }

  /// Rewrite every linkable element of `document` in document order.
  pub fn scan(&mut self, document: &mut Document) -> Result<ScanReport> {
    let mut report = ScanReport::default();
    let namespace = self.store.namespace().to_string();
    let mut stylesheets = CssReferenceRewriter::new(self.resolver, &mut *self.store);

    let candidates: Vec<_> = document
      .descendants(NodeId::DOCUMENT)
      .into_iter()
      .filter_map(|id| LinkableElement::classify(document, id).map(|kind| (id, kind)))
      .collect();

    for (id, kind) in candidates {
      let attribute = kind.reference_attribute();
      let Some(value) = document.attr(id, attribute).map(str::to_string) else {
        continue;
      };

      let reference = self.resolver.resolve(&value, self.resolver.root());
      match reference.kind() {
        ReferenceKind::LocalExisting {
          source,
          relative_name,
        } => {
          let asset = stylesheets.store_mut().store(source, relative_name)?;
          let placeholder = self
            .placeholders
            .asset_reference(&namespace, &asset.relative_name);
          document.set_attr(id, attribute, format!("{placeholder}{}", reference.query()));
          report.rewritten += 1;

          if kind == LinkableElement::Stylesheet {
            let nested = stylesheets.rewrite_stylesheet(&asset)?;
            report.copied.extend(nested.copied);
            report.missing.extend(nested.missing);
          }
          report.copied.push(asset);
        }
        ReferenceKind::LocalMissing { candidate } => {
          tracing::warn!(
            reference = %value,
            candidate = %candidate.display(),
            "document reference does not exist"
          );
          report.missing.push(reference.clone());
        }
        ReferenceKind::External | ReferenceKind::DataUri | ReferenceKind::Fragment => {
          tracing::trace!(reference = %value, "leaving non-local reference untouched");
        }
      }
    }

    Ok(report)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::placeholder::TemplatePlaceholders;
  use std::fs;
  use std::path::{Path, PathBuf};
  use tempfile::tempdir;

  const PAGE: &str = r#"<!DOCTYPE html>
<html><head>
<link rel="stylesheet" href="css/main.css?v=2">
<link rel="icon" href="favicon.ico">
<link rel="stylesheet" href="https://cdn.test/lib.css">
<script src="js/app.js"></script>
</head><body>
<img src="img/a/x.png"><img src="img/b/x.png"><img src="img/missing.png">
<img src="data:image/gif;base64,R0lGOD"><script>inline()</script>
</body></html>"#;

  fn site() -> (tempfile::TempDir, PathBuf) {
    let temp = tempdir().unwrap();
    let site = temp.path().join("site");
    for dir in ["css", "js", "img/a", "img/b"] {
      fs::create_dir_all(site.join(dir)).unwrap();
    }
    fs::write(site.join("css/main.css"), "body{background:url(../img/a/x.png)}").unwrap();
    fs::write(site.join("js/app.js"), "app()").unwrap();
    fs::write(site.join("favicon.ico"), b"ico").unwrap();
    fs::write(site.join("img/a/x.png"), b"a").unwrap();
    fs::write(site.join("img/b/x.png"), b"b").unwrap();
    fs::write(site.join("index.html"), PAGE).unwrap();
    (temp, site)
  }

  fn scan(site: &Path, out: &Path) -> (Document, ScanReport) {
    let resolver = PathResolver::new(site);
    let mut store = AssetStore::new(out, "site", "/static");
    let placeholders = TemplatePlaceholders::default();
    let mut document = Document::load(&site.join("index.html")).unwrap();
    let report = DocumentAssetScanner::new(&resolver, &mut store, &placeholders)
      .scan(&mut document)
      .unwrap();
    (document, report)
  }

  #[test]
  fn rewrites_linkable_elements_and_copies_targets() {
    let (temp, site) = site();
    let out = temp.path().join("out/static/site");

    let (document, report) = scan(&site, &out);

    let links = document.elements_named("link");
    assert_eq!(
      document.attr(links[0], "href"),
      Some("{% static 'site/css/main.css' %}?v=2")
    );
    assert_eq!(document.attr(links[1], "href"), Some("favicon.ico"));
    assert_eq!(document.attr(links[2], "href"), Some("https://cdn.test/lib.css"));

    let images = document.elements_named("img");
    assert_eq!(
      document.attr(images[0], "src"),
      Some("{% static 'site/img/a/x.png' %}")
    );
    assert_eq!(
      document.attr(images[1], "src"),
      Some("{% static 'site/img/b/x.png' %}")
    );
    assert_eq!(document.attr(images[2], "src"), Some("img/missing.png"));
    assert_eq!(document.attr(images[3], "src"), Some("data:image/gif;base64,R0lGOD"));

    assert_eq!(report.rewritten, 4);
    assert_eq!(report.missing.len(), 1);
    assert_eq!(fs::read(out.join("img/b/x.png")).unwrap(), b"b");
    assert_eq!(
      fs::read_to_string(out.join("css/main.css")).unwrap(),
      "body{background:url(\"/static/site/img/a/x.png\")}"
    );
    assert!(!out.join("favicon.ico").exists());
  }

  #[test]
  fn rescanning_produces_the_same_tree() {
    let (temp, site) = site();
    let out = temp.path().join("out/static/site");

    let (first_doc, _) = scan(&site, &out);
    let first_css = fs::read_to_string(out.join("css/main.css")).unwrap();
    let (second_doc, second) = scan(&site, &out);

    assert_eq!(
      first_doc.outer_html(NodeId::DOCUMENT),
      second_doc.outer_html(NodeId::DOCUMENT)
    );
    assert_eq!(fs::read_to_string(out.join("css/main.css")).unwrap(), first_css);
    assert_eq!(second.rewritten, 4);
  }

  #[test]
  fn references_sanitising_to_one_name_conflict() {
    let temp = tempdir().unwrap();
    let site = temp.path().join("site");
    fs::create_dir_all(&site).unwrap();
    fs::write(site.join("a b.png"), b"spaced").unwrap();
    fs::write(site.join("a_b.png"), b"underscored").unwrap();
    let mut document =
      Document::parse(r#"<html><body><img src="a b.png"><img src="a_b.png"></body></html>"#);

    let resolver = PathResolver::new(&site);
    let out = temp.path().join("out/static/site");
    let mut store = AssetStore::new(&out, "site", "/static");
    let placeholders = TemplatePlaceholders::default();
    let err = DocumentAssetScanner::new(&resolver, &mut store, &placeholders)
      .scan(&mut document)
      .unwrap_err();

    assert!(matches!(
      err,
      crate::error::ConvertError::DestinationConflict { ref name, .. } if name == "a_b.png"
    ));
    assert_eq!(fs::read(out.join("a_b.png")).unwrap(), b"spaced");
  }
}
