use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;

use super::filters::{classify_passthrough, split_suffix};
use super::names::{normalize_path, relative_location, sanitize_relative_name};
use crate::models::{Reference, ReferenceKind};

/// Resolves references against the directory tree of a single document.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    /// Create a resolver rooted at the document's own directory.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: normalize_path(root.as_ref()),
        }
    }

    /// Directory every destination name is computed relative to.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Classify `reference` and, for local paths, resolve it against `base_dir`.
    ///
    /// Root-relative references (`/img/a.png`) resolve against the document root. The suffix
    /// after the first `?` or `#` is kept verbatim on the returned [`Reference`].
    pub fn resolve(&self, reference: &str, base_dir: &Path) -> Reference {
        let trimmed = reference.trim();
        if let Some(kind) = classify_passthrough(trimmed) {
            return Reference::new(reference, trimmed, "", kind);
        }

        let (path_part, query) = split_suffix(trimmed);
        let decoded = percent_decode_str(path_part).decode_utf8_lossy();

        let joined = match decoded.strip_prefix('/') {
            Some(rooted) => self.root.join(rooted),
            None => base_dir.join(&*decoded),
        };
        let candidate = normalize_path(&joined);

        let kind = if candidate.is_file() {
            let location = relative_location(&candidate, &self.root);
            ReferenceKind::LocalExisting {
                source: candidate,
                relative_name: sanitize_relative_name(&location),
            }
        } else {
            ReferenceKind::LocalMissing { candidate }
        };

        Reference::new(reference, path_part, query, kind)
    }
}
