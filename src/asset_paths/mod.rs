//! Helpers for classifying, resolving and naming asset references.
//!
//! Filtering of references that must pass through untouched, lexical path normalisation with
//! destination naming, and the resolver that ties them to the filesystem live in separate
//! submodules so each can be tested on its own.

mod filters;
mod names;
mod resolve;

pub use filters::{classify_passthrough, split_suffix};
pub use names::{normalize_path, relative_location, sanitize_relative_name};
pub use resolve::PathResolver;
