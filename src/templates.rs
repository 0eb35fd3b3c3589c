//! Template emission for extracted sections, the document head and body scripts.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::ConverterConfig;
use crate::error::ConvertError;
use crate::models::{ConversionManifest, ConversionResult};
use crate::placeholder::fill_named;

/// Templates generated for every document, by file stem.
const FIXED_TEMPLATES: &[&str] = &["head", "body_scripts", "index", "base"];

/// File name of the template holding `section`.
pub fn section_file_name(section: &str) -> String {
  format!("{}.html", section.to_lowercase())
}

/// Make sure every section gets a template file of its own.
///
/// Section names are case-sensitive but file names are lowercased, and the fixed templates and
/// the manifest share the directory, so two names can claim the same file.
pub fn check_template_names<'a>(
  config: &ConverterConfig,
  sections: impl IntoIterator<Item = &'a str>,
) -> crate::error::Result<()> {
  let mut taken: BTreeSet<String> = FIXED_TEMPLATES
    .iter()
    .map(|stem| format!("{stem}.html"))
    .collect();
  taken.insert(config.manifest_file.to_lowercase());

  for name in sections {
    let file = section_file_name(name);
    if !taken.insert(file.clone()) {
      return Err(ConvertError::TemplateConflict {
        name: name.to_string(),
        file,
      });
    }
  }
  Ok(())
}

/// A generated file, relative to the template root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFile {
  /// File name inside the template root.
  pub name: String,
  /// Full file contents.
  pub contents: String,
}

/// Every file produced for one converted document.
#[derive(Debug, Clone, Default)]
pub struct TemplateArtifacts {
  /// Section, head, body-script, index and base templates.
  pub templates: Vec<TemplateFile>,
  /// Manifest file name and its JSON body.
  pub manifest: Option<TemplateFile>,
}

impl TemplateArtifacts {
  /// Render all templates for `result` using the syntax configured in `config`.
  ///
  /// Fails with [`ConvertError::TemplateConflict`] when two templates would share a file.
  pub fn render(config: &ConverterConfig, result: &ConversionResult) -> Result<Self> {
    check_template_names(config, result.sections.names())?;
    let prelude = &config.template_prelude;
    let namespace = &config.namespace;
    let mut templates = Vec::new();

    for section in result.sections.iter() {
      let block_name = section.name.to_lowercase();
      let content = section.content();
      let block = fill_named(
        &config.section_block,
        &[("section", block_name.as_str()), ("content", content.as_str())],
      );
      templates.push(TemplateFile {
        name: section_file_name(&section.name),
        contents: format!("{prelude}\n{block}"),
      });
    }

    let head = result.head.as_deref().unwrap_or_default();
    templates.push(TemplateFile {
      name: "head.html".into(),
      contents: format!("{prelude}\n{head}"),
    });
    templates.push(TemplateFile {
      name: "body_scripts.html".into(),
      contents: format!("{prelude}\n{}", result.body_scripts.join("\n")),
    });

    let (before, content, after) = partition_sections(config, result);
    templates.push(TemplateFile {
      name: "index.html".into(),
      contents: render_index(namespace, &content),
    });
    templates.push(TemplateFile {
      name: "base.html".into(),
      contents: render_base(namespace, &before, &after),
    });

    let manifest = serde_json::to_string_pretty(&ConversionManifest::new(namespace, result))
      .context("failed to serialise the conversion manifest")?;

    Ok(Self {
      templates,
      manifest: Some(TemplateFile {
        name: config.manifest_file.clone(),
        contents: manifest,
      }),
    })
  }

  /// Write every file below `root`, creating it as needed. Returns the written paths.
  pub fn write(&self, root: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(root).with_context(|| format!("failed to create {}", root.display()))?;

    let mut written = Vec::new();
    for file in self.templates.iter().chain(self.manifest.iter()) {
      let target = root.join(&file.name);
      fs::write(&target, &file.contents)
        .with_context(|| format!("failed to write {}", target.display()))?;
      tracing::debug!(path = %target.display(), "wrote template");
      written.push(target);
    }
    Ok(written)
  }

  #[cfg(test)]
  fn get(&self, name: &str) -> Option<&str> {
    self
      .templates
      .iter()
      .find(|file| file.name == name)
      .map(|file| file.contents.as_str())
  }
}

/// Split lowercased section names into layout sections before the content, content sections,
/// and layout sections after the content, keeping document order.
fn partition_sections(
  config: &ConverterConfig,
  result: &ConversionResult,
) -> (Vec<String>, Vec<String>, Vec<String>) {
  let mut before = Vec::new();
  let mut content = Vec::new();
  let mut after = Vec::new();

  for section in result.sections.iter() {
    let name = section.name.to_lowercase();
    if !config.is_layout_section(&section.name) {
      content.push(name);
    } else if content.is_empty() {
      before.push(name);
    } else {
      after.push(name);
    }
  }

  (before, content, after)
}

fn include(namespace: &str, name: &str) -> String {
  format!("{{% include '{namespace}/{name}.html' %}}")
}

fn render_index(namespace: &str, content: &[String]) -> String {
  let mut out = format!("{{% extends '{namespace}/base.html' %}}\n{{% block content %}}\n");
  for name in content {
    out.push_str(&format!("    {}\n", include(namespace, name)));
  }
  out.push_str("{% endblock %}\n");
  out
}

fn render_base(namespace: &str, before: &[String], after: &[String]) -> String {
  let mut out = String::from(
    "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n    <meta charset=\"utf-8\">\n",
  );
  out.push_str("    <title>{% block title %}{% endblock %}</title>\n");
  out.push_str(&format!("    {}\n</head>\n<body>\n", include(namespace, "head")));
  for name in before {
    out.push_str(&format!("    {}\n", include(namespace, name)));
  }
  out.push_str("    {% block content %}{% endblock %}\n");
  for name in after {
    out.push_str(&format!("    {}\n", include(namespace, name)));
  }
  out.push_str(&format!(
    "    {}\n</body>\n</html>\n",
    include(namespace, "body_scripts")
  ));
  out
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::{Section, Sections};
  use tempfile::tempdir;

  fn sections(entries: &[(&str, &str)]) -> Sections {
    let mut sections = Sections::default();
    for (name, body) in entries {
      sections.push(Section {
        name: name.to_string(),
        nodes: vec![body.to_string()],
      });
    }
    sections
  }

  fn conflicting_file(entries: &[(&str, &str)]) -> Option<String> {
    let result = ConversionResult {
      sections: sections(entries),
      ..ConversionResult::default()
    };
    let err = TemplateArtifacts::render(&ConverterConfig::default(), &result).unwrap_err();
    match err.downcast_ref::<ConvertError>() {
      Some(ConvertError::TemplateConflict { file, .. }) => Some(file.clone()),
      _ => None,
    }
  }

  fn result() -> ConversionResult {
    let sections = sections(&[
      ("Navbar", "<nav></nav>"),
      ("Hero", "<h1>Hi</h1>"),
      ("Footer", "<footer></footer>"),
    ]);
    ConversionResult {
      sections,
      page_links: vec!["about".into()],
      head: Some("<head><title>T</title></head>".into()),
      body_scripts: vec!["<script src=\"a.js\"></script>".into()],
      ..ConversionResult::default()
    }
  }

  #[test]
  fn wraps_sections_in_blocks() {
    let artifacts = TemplateArtifacts::render(&ConverterConfig::default(), &result()).unwrap();

    assert_eq!(
      artifacts.get("hero.html"),
      Some("{% load static %}\n{% block hero %}\n<h1>Hi</h1>\n{% endblock %}")
    );
    assert_eq!(
      artifacts.get("head.html"),
      Some("{% load static %}\n<head><title>T</title></head>")
    );
    assert_eq!(
      artifacts.get("body_scripts.html"),
      Some("{% load static %}\n<script src=\"a.js\"></script>")
    );
  }

  #[test]
  fn index_includes_only_content_sections() {
    let artifacts = TemplateArtifacts::render(&ConverterConfig::default(), &result()).unwrap();

    assert_eq!(
      artifacts.get("index.html"),
      Some(
        "{% extends 'site/base.html' %}\n{% block content %}\n    {% include 'site/hero.html' %}\n{% endblock %}\n"
      )
    );
    let base = artifacts.get("base.html").unwrap();
    let navbar = base.find("site/navbar.html").unwrap();
    let content = base.find("{% block content %}").unwrap();
    let footer = base.find("site/footer.html").unwrap();
    assert!(navbar < content && content < footer);
  }

  #[test]
  fn writes_templates_and_manifest() {
    let dir = tempdir().unwrap();
    let artifacts = TemplateArtifacts::render(&ConverterConfig::default(), &result()).unwrap();

    let written = artifacts.write(&dir.path().join("templates/site")).unwrap();

    assert_eq!(written.len(), 8);
    let manifest: serde_json::Value =
      serde_json::from_str(&fs::read_to_string(dir.path().join("templates/site/sections.json")).unwrap())
        .unwrap();
    assert_eq!(manifest["namespace"], "site");
    assert_eq!(manifest["sections"], serde_json::json!(["Navbar", "Hero", "Footer"]));
    assert_eq!(manifest["page_links"], serde_json::json!(["about"]));
  }

  #[test]
  fn sections_differing_only_in_case_conflict() {
    assert_eq!(
      conflicting_file(&[("Hero", "upper"), ("hero", "lower")]),
      Some("hero.html".to_string())
    );
  }

  #[test]
  fn sections_cannot_take_fixed_template_names() {
    for name in ["Index", "base", "HEAD", "body_scripts"] {
      assert_eq!(
        conflicting_file(&[(name, "x")]),
        Some(format!("{}.html", name.to_lowercase()))
      );
    }
  }

  #[test]
  fn manifest_file_name_is_reserved() {
    let config = ConverterConfig {
      manifest_file: "hero.html".into(),
      ..ConverterConfig::default()
    };
    let result = ConversionResult {
      sections: sections(&[("Hero", "A")]),
      ..ConversionResult::default()
    };

    assert!(check_template_names(&config, result.sections.names()).is_err());
    assert!(TemplateArtifacts::render(&config, &result).is_err());
    assert!(check_template_names(&ConverterConfig::default(), ["Hero"]).is_ok());
  }
}
