use std::path::{Component, Path, PathBuf};

use regex::Regex;

/// Component written in place of `..` when a resource lives above the document root.
const PARENT_COMPONENT: &str = "__";

/// Lexically normalise a path, folding `.` and `..` segments without touching the filesystem.
///
/// `..` never climbs above the root of an absolute path; for relative inputs leading `..`
/// segments are kept.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    normalized.pop();
                } else if !normalized.has_root() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Relative, `/`-separated location of `path` below `root`.
///
/// Both inputs are expected to be normalised. Segments needed to climb out of `root` are
/// written as [`PARENT_COMPONENT`] so every result stays inside the content tree.
pub fn relative_location(path: &Path, root: &Path) -> String {
    let path_parts: Vec<Component> = path.components().collect();
    let root_parts: Vec<Component> = root.components().collect();
    let shared = path_parts
        .iter()
        .zip(root_parts.iter())
        .take_while(|(left, right)| left == right)
        .count();

    let mut segments: Vec<String> = Vec::new();
    for _ in shared..root_parts.len() {
        segments.push(PARENT_COMPONENT.to_string());
    }
    for part in &path_parts[shared..] {
        match part {
            Component::Normal(value) => segments.push(value.to_string_lossy().into_owned()),
            Component::ParentDir => segments.push(PARENT_COMPONENT.to_string()),
            _ => {}
        }
    }
    segments.join("/")
}

fn disallowed_characters() -> &'static Regex {
    use std::sync::OnceLock;

    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^\w\-./]").expect("invalid sanitise regex"))
}

/// Replace every character outside the allow-list with `_`, keeping `/` separators.
///
/// Backslashes are first normalised to `/` so Windows-style input mirrors the same tree.
pub fn sanitize_relative_name(name: &str) -> String {
    let forward = name.replace('\\', "/");
    disallowed_characters()
        .replace_all(&forward, "_")
        .into_owned()
}
