//! Content tree that receives copied resources under a fixed namespace.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use same_file::is_same_file;

use crate::error::{ConvertError, Result};
use crate::models::ResolvedAsset;

/// Owner of the destination content tree.
///
/// Every write into the tree goes through the store so destination conflicts are detected in
/// one place.
#[derive(Debug)]
pub struct AssetStore {
  root: PathBuf,
  namespace: String,
  url_prefix: String,
  stored: BTreeMap<String, ResolvedAsset>,
  order: Vec<String>,
}

impl AssetStore {
  /// Create a store writing below `root` (the namespace directory itself).
  ///
  /// Public references are built as `<url_prefix>/<namespace>/<name>`.
  pub fn new(root: impl Into<PathBuf>, namespace: &str, url_prefix: &str) -> Self {
    Self {
      root: root.into(),
      namespace: namespace.trim_matches('/').to_string(),
      url_prefix: url_prefix.trim_end_matches('/').to_string(),
      stored: BTreeMap::new(),
      order: Vec::new(),
    }
  }

  /// Directory the content tree is written to.
  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Namespace shared by every stored asset.
  pub fn namespace(&self) -> &str {
    &self.namespace
  }

  /// Copy `source` into the content tree under `name`.
  ///
  /// Storing the same source under the same name again is a no-op that returns the existing
  /// record. Storing a different source under a taken name fails with
  /// [`ConvertError::DestinationConflict`].
  pub fn store(&mut self, source: &Path, name: &str) -> Result<ResolvedAsset> {
    if let Some(existing) = self.stored.get(name) {
      if same_source(&existing.source, source) {
        tracing::trace!(name, "asset already stored");
        return Ok(existing.clone());
      }
      return Err(ConvertError::DestinationConflict {
        name: name.to_string(),
        existing: existing.source.clone(),
        incoming: source.to_path_buf(),
      });
    }

    let destination = self.root.join(name);
    if let Some(parent) = destination.parent() {
      fs::create_dir_all(parent).map_err(|err| ConvertError::io(parent, err))?;
    }
    copy_with_metadata(source, &destination)?;
    tracing::debug!(
      source = %source.display(),
      destination = %destination.display(),
      "copied asset"
    );

    let asset = ResolvedAsset {
      source: source.to_path_buf(),
      relative_name: name.to_string(),
      destination,
      public_reference: self.public_reference(name),
    };
    self.stored.insert(name.to_string(), asset.clone());
    self.order.push(name.to_string());
    Ok(asset)
  }

  /// Overwrite a stored asset's copy with new text, leaving the source untouched.
  pub fn persist(&self, asset: &ResolvedAsset, contents: &str) -> Result<()> {
    if same_source(&asset.source, &asset.destination) {
      return Err(ConvertError::io(
        &asset.destination,
        std::io::Error::new(
          ErrorKind::InvalidInput,
          "refusing to overwrite the source resource",
        ),
      ));
    }
    fs::write(&asset.destination, contents)
      .map_err(|err| ConvertError::io(&asset.destination, err))
  }

  /// Namespace-qualified public path for a sanitised name.
  pub fn public_reference(&self, name: &str) -> String {
    format!("{}/{}/{}", self.url_prefix, self.namespace, name)
  }

  /// Stored assets in the order they were first stored.
  pub fn assets(&self) -> Vec<ResolvedAsset> {
    self
      .order
      .iter()
      .filter_map(|name| self.stored.get(name).cloned())
      .collect()
  }
}

fn same_source(existing: &Path, incoming: &Path) -> bool {
  existing == incoming || is_same_file(existing, incoming).unwrap_or(false)
}

fn copy_with_metadata(source: &Path, destination: &Path) -> Result<()> {
  if destination.exists() && is_same_file(source, destination).unwrap_or(false) {
    return Ok(());
  }

  fs::copy(source, destination).map_err(|err| ConvertError::io(destination, err))?;

  let modified = fs::metadata(source)
    .and_then(|metadata| metadata.modified())
    .map_err(|err| ConvertError::io(source, err))?;
  fs::File::options()
    .write(true)
    .open(destination)
    .and_then(|file| file.set_modified(modified))
    .map_err(|err| ConvertError::io(destination, err))
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  fn fixture() -> (tempfile::TempDir, PathBuf, AssetStore) {
    let temp = tempdir().unwrap();
    let source_root = temp.path().join("site");
    fs::create_dir_all(source_root.join("a")).unwrap();
    fs::create_dir_all(source_root.join("b")).unwrap();
    fs::write(source_root.join("a/x.png"), b"first").unwrap();
    fs::write(source_root.join("b/x.png"), b"second").unwrap();
    let store = AssetStore::new(temp.path().join("static/site"), "site", "/static");
    (temp, source_root, store)
  }

  #[test]
  fn copies_byte_identical_files_and_builds_public_references() {
    let (_temp, source_root, mut store) = fixture();

    let asset = store.store(&source_root.join("a/x.png"), "a/x.png").unwrap();

    assert_eq!(fs::read(&asset.destination).unwrap(), b"first");
    assert_eq!(asset.public_reference, "/static/site/a/x.png");
    assert!(asset.destination.ends_with("static/site/a/x.png"));
  }

  #[test]
  fn preserves_modification_time() {
    let (_temp, source_root, mut store) = fixture();
    let source = source_root.join("a/x.png");

    let asset = store.store(&source, "a/x.png").unwrap();

    let source_time = fs::metadata(&source).unwrap().modified().unwrap();
    let copy_time = fs::metadata(&asset.destination).unwrap().modified().unwrap();
    assert_eq!(source_time, copy_time);
  }

  #[test]
  fn storing_the_same_pair_twice_is_idempotent() {
    let (_temp, source_root, mut store) = fixture();
    let source = source_root.join("a/x.png");

    let first = store.store(&source, "a/x.png").unwrap();
    let second = store.store(&source, "a/x.png").unwrap();

    assert_eq!(first, second);
    assert_eq!(store.assets().len(), 1);
  }

  #[test]
  fn directory_preserving_names_do_not_conflict() {
    let (_temp, source_root, mut store) = fixture();

    store.store(&source_root.join("a/x.png"), "a/x.png").unwrap();
    store.store(&source_root.join("b/x.png"), "b/x.png").unwrap();

    assert_eq!(store.assets().len(), 2);
  }

  #[test]
  fn collapsing_names_raise_destination_conflict() {
    let (_temp, source_root, mut store) = fixture();

    store.store(&source_root.join("a/x.png"), "x.png").unwrap();
    let err = store
      .store(&source_root.join("b/x.png"), "x.png")
      .unwrap_err();

    assert!(matches!(err, ConvertError::DestinationConflict { ref name, .. } if name == "x.png"));
    assert_eq!(fs::read(store.root().join("x.png")).unwrap(), b"first");
  }

  #[test]
  fn persist_overwrites_only_the_copy() {
    let temp = tempdir().unwrap();
    let source = temp.path().join("main.css");
    fs::write(&source, "body{}").unwrap();
    let mut store = AssetStore::new(temp.path().join("out"), "site", "/static");

    let asset = store.store(&source, "main.css").unwrap();
    store.persist(&asset, "body{color:red}").unwrap();

    assert_eq!(fs::read_to_string(&source).unwrap(), "body{}");
    assert_eq!(
      fs::read_to_string(&asset.destination).unwrap(),
      "body{color:red}"
    );
  }
}
