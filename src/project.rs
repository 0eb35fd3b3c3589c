//! Output layout shared by the asset store and the template writer.

use std::path::{Path, PathBuf};

/// Borrowed description of where a conversion writes its files.
#[derive(Debug, Clone, Copy)]
pub struct OutputLayout<'a> {
  /// Root directory for all generated output.
  pub output_dir: &'a Path,
  /// Directory under `output_dir` holding copied assets.
  pub static_dir: &'a str,
  /// Directory under `output_dir` holding generated templates.
  pub template_dir: &'a str,
  /// Namespace appended to both the static and template directories.
  pub namespace: &'a str,
  /// URL prefix of the static directory.
  pub public_url_prefix: &'a str,
}

impl<'a> OutputLayout<'a> {
  /// Content tree root: `<output>/<static_dir>/<namespace>`.
  pub fn static_root(&self) -> PathBuf {
    self.output_dir.join(self.static_dir).join(self.namespace)
  }

  /// Template root: `<output>/<template_dir>/<namespace>`.
  pub fn template_root(&self) -> PathBuf {
    self.output_dir.join(self.template_dir).join(self.namespace)
  }
}
