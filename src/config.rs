//! Converter configuration loaded from `sectionize.config.json`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::placeholder::{DEFAULT_ASSET_FORMAT, DEFAULT_ROUTE_FORMAT, TemplatePlaceholders};
use crate::project::OutputLayout;

/// File name looked up next to the converted document.
pub const DEFAULT_CONFIG_FILE: &str = "sectionize.config.json";

/// Discoverable configuration describing the namespace, output layout and template syntax.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Namespace shared by the content tree and the template directory.
    pub namespace: String,
    /// Directory receiving every generated file.
    pub output_dir: PathBuf,
    /// Directory under `output_dir` holding copied assets.
    pub static_dir: String,
    /// Directory under `output_dir` holding generated templates.
    pub template_dir: String,
    /// URL prefix under which the static directory is served.
    pub public_url_prefix: String,
    /// Asset placeholder format with `{namespace}` and `{name}` slots.
    pub asset_placeholder: String,
    /// Route placeholder format with a `{route}` slot.
    pub route_placeholder: String,
    /// Extension identifying links to sibling pages.
    pub page_extension: String,
    /// First line of every generated template.
    pub template_prelude: String,
    /// Block wrapper with `{section}` and `{content}` slots.
    pub section_block: String,
    /// Sections rendered by the base layout instead of the index page.
    pub layout_sections: Vec<String>,
    /// File name of the JSON manifest written next to the templates.
    pub manifest_file: String,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            namespace: "site".into(),
            output_dir: PathBuf::from("build"),
            static_dir: "static".into(),
            template_dir: "templates".into(),
            public_url_prefix: "/static".into(),
            asset_placeholder: DEFAULT_ASSET_FORMAT.into(),
            route_placeholder: DEFAULT_ROUTE_FORMAT.into(),
            page_extension: ".html".into(),
            template_prelude: "{% load static %}".into(),
            section_block: "{% block {section} %}\n{content}\n{% endblock %}".into(),
            layout_sections: vec!["navbar".into(), "footer".into()],
            manifest_file: "sections.json".into(),
        }
    }
}

impl ConverterConfig {
    /// Look for a configuration file in `document_dir`.
    ///
    /// A missing or unparsable file falls back to defaults so a bare document still converts.
    pub fn discover(document_dir: &Path) -> Self {
        let candidate = document_dir.join(DEFAULT_CONFIG_FILE);
        if !candidate.is_file() {
            return Self::default();
        }
        match Self::from_path(&candidate) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %candidate.display(), error = %err, "ignoring unreadable config");
                Self::default()
            }
        }
    }

    /// Read configuration from a specific JSON file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Placeholder style described by the configured formats.
    pub fn placeholders(&self) -> TemplatePlaceholders {
        TemplatePlaceholders::new(&self.asset_placeholder, &self.route_placeholder)
    }

    /// Borrowed view of the output layout.
    pub fn layout(&self) -> OutputLayout<'_> {
        OutputLayout {
            output_dir: &self.output_dir,
            static_dir: &self.static_dir,
            template_dir: &self.template_dir,
            namespace: &self.namespace,
            public_url_prefix: &self.public_url_prefix,
        }
    }

    /// Whether `section` is rendered by the base layout, compared case-insensitively.
    pub fn is_layout_section(&self, section: &str) -> bool {
        self.layout_sections
            .iter()
            .any(|name| name.eq_ignore_ascii_case(section))
    }
}
