#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod asset_paths;
pub mod builder;
pub mod config;
pub mod dom;
pub mod error;
pub mod logging;
pub mod models;
pub mod placeholder;
pub mod project;
pub mod rewrite;
pub mod sections;
pub mod store;
pub mod templates;

pub use asset_paths::PathResolver;
pub use builder::{ConversionOutput, TemplateConverter};
pub use config::ConverterConfig;
pub use error::{ConvertError, Result};
pub use models::{ConversionResult, Reference, ReferenceKind, ResolvedAsset, Section, Sections};
pub use placeholder::{PlaceholderFns, PlaceholderStyle, TemplatePlaceholders};
pub use project::OutputLayout;
pub use sections::{SectionSegmenter, SectionState};
pub use store::AssetStore;
pub use templates::TemplateArtifacts;
