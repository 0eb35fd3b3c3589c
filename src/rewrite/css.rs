//! `url(...)` discovery and rewriting inside stylesheet text.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::asset_paths::PathResolver;
use crate::error::{ConvertError, Result};
use crate::models::{Reference, ReferenceKind, ResolvedAsset};
use crate::store::AssetStore;

const GRADIENT_FUNCTIONS: &[&str] = &[
  "linear-gradient",
  "radial-gradient",
  "repeating-linear-gradient",
];

fn url_pattern() -> &'static Regex {
  use std::sync::OnceLock;

  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| {
    Regex::new(r#"(?i)url\(\s*(?:"([^"]*)"|'([^']*)'|([^)"'\s]*))\s*\)"#)
      .expect("invalid css url regex")
  })
}

/// Outcome of rewriting one stylesheet body.
#[derive(Debug, Default)]
pub struct CssRewrite {
  /// Stylesheet text with local references replaced.
  pub text: String,
  /// Assets copied while rewriting, including those of imported stylesheets.
  pub copied: Vec<ResolvedAsset>,
  /// Local references with no target, left unchanged.
  pub missing: Vec<Reference>,
}

impl CssRewrite {
  /// Number of resources copied into the content tree.
  pub fn copied_count(&self) -> usize {
    self.copied.len()
  }
}

/// Rewrites `url()` references in stylesheets to namespace-qualified public paths.
pub struct CssReferenceRewriter<'a> {
  resolver: &'a PathResolver,
  store: &'a mut AssetStore,
  rewritten: BTreeSet<PathBuf>,
}

impl<'a> CssReferenceRewriter<'a> {
  /// Create a rewriter sharing the document's resolver and store.
  pub fn new(resolver: &'a PathResolver, store: &'a mut AssetStore) -> Self {
    Self {
      resolver,
      store,
      rewritten: BTreeSet::new(),
    }
  }

  /// Store shared with the document pass.
  pub fn store_mut(&mut self) -> &mut AssetStore {
    &mut *self.store
  }

  /// Rewrite `css` whose relative references are anchored at `css_base_dir`.
  ///
  /// Substitutions are applied to the exact span of each match, so identical text elsewhere
  /// in the stylesheet is never touched.
  pub fn rewrite(&mut self, css: &str, css_base_dir: &Path) -> Result<CssRewrite> {
    let mut outcome = CssRewrite::default();
    let mut text = String::with_capacity(css.len());
    let mut cursor = 0;

    for caps in url_pattern().captures_iter(css) {
      let Some(whole) = caps.get(0) else {
        continue;
      };
      let Some(body) = caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)) else {
        continue;
      };
      let value = body.as_str().trim();

      text.push_str(&css[cursor..whole.start()]);
      cursor = whole.end();

      if value.is_empty() || is_gradient(value) {
        text.push_str(whole.as_str());
        continue;
      }

      let reference = self.resolver.resolve(value, css_base_dir);
      match reference.kind() {
        ReferenceKind::LocalExisting {
          source,
          relative_name,
        } => {
          let asset = self.store.store(source, relative_name)?;
          text.push_str(&format!(
            "url(\"{}{}\")",
            asset.public_reference,
            reference.query()
          ));
          if asset.is_stylesheet() {
            let nested = self.rewrite_stylesheet(&asset)?;
            outcome.copied.extend(nested.copied);
            outcome.missing.extend(nested.missing);
          }
          outcome.copied.push(asset);
        }
        ReferenceKind::LocalMissing { candidate } => {
          tracing::warn!(
            reference = value,
            candidate = %candidate.display(),
            "stylesheet reference does not exist"
          );
          text.push_str(whole.as_str());
          outcome.missing.push(reference.clone());
        }
        ReferenceKind::External | ReferenceKind::DataUri | ReferenceKind::Fragment => {
          text.push_str(whole.as_str());
        }
      }
    }

    text.push_str(&css[cursor..]);
    outcome.text = text;
    Ok(outcome)
  }

  /// Rewrite a stored stylesheet from its source and persist the result over its copy.
  ///
  /// Each source stylesheet is processed at most once per rewriter, which keeps `@import`
  /// cycles finite.
  pub fn rewrite_stylesheet(&mut self, asset: &ResolvedAsset) -> Result<CssRewrite> {
    if !self.rewritten.insert(asset.source.clone()) {
      return Ok(CssRewrite::default());
    }

    let css =
      fs::read_to_string(&asset.source).map_err(|err| ConvertError::io(&asset.source, err))?;
    let base_dir = asset
      .source
      .parent()
      .map(Path::to_path_buf)
      .unwrap_or_else(|| self.resolver.root().to_path_buf());

    let outcome = self.rewrite(&css, &base_dir)?;
    self.store.persist(asset, &outcome.text)?;
    tracing::debug!(
      stylesheet = %asset.destination.display(),
      copied = outcome.copied_count(),
      "rewrote stylesheet"
    );
    Ok(outcome)
  }
}

fn is_gradient(value: &str) -> bool {
  let lowered = value.to_ascii_lowercase();
  GRADIENT_FUNCTIONS
    .iter()
    .any(|name| lowered.contains(name))
}
