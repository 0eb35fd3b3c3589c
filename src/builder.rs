//! Conversion orchestrator: asset scanning, page-link rewriting, segmentation and template output.

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::asset_paths::PathResolver;
use crate::config::ConverterConfig;
use crate::dom::{Document, NodeId};
use crate::error::{ConvertError, Result};
use crate::models::ConversionResult;
use crate::rewrite::{DocumentAssetScanner, LinkRegistry, PageLinkRewriter};
use crate::sections::SectionSegmenter;
use crate::store::AssetStore;
use crate::templates::{TemplateArtifacts, check_template_names};

/// Files written for a conversion.
#[derive(Debug)]
pub struct ConversionOutput {
  /// In-memory result of the conversion.
  pub result: ConversionResult,
  /// Template files written below the template root, manifest last.
  pub written: Vec<PathBuf>,
}

/// Converts one HTML document into namespaced templates and a content tree.
pub struct TemplateConverter<'a> {
  config: &'a ConverterConfig,
}

impl<'a> TemplateConverter<'a> {
  /// Create a converter for the provided configuration.
  pub fn new(config: &'a ConverterConfig) -> Self {
    Self { config }
  }

  /// Run every pass over the document at `document_path`.
  ///
  /// Assets are copied into the content tree as a side effect; templates are not written.
  pub fn convert(&self, document_path: &Path) -> Result<ConversionResult> {
    let document_path =
      std::path::absolute(document_path).map_err(|err| ConvertError::io(document_path, err))?;
    let root = document_path
      .parent()
      .map(Path::to_path_buf)
      .unwrap_or_else(|| PathBuf::from("."));

    let layout = self.config.layout();
    let resolver = PathResolver::new(&root);
    let mut store = AssetStore::new(
      layout.static_root(),
      layout.namespace,
      layout.public_url_prefix,
    );
    let placeholders = self.config.placeholders();
    let mut document = Document::load(&document_path)?;

    let segmenter = SectionSegmenter::new();
    let analysis = segmenter.analyze(&document)?;
    check_template_names(
      self.config,
      analysis.spans.iter().map(|span| span.name.as_str()),
    )?;

    let report = DocumentAssetScanner::new(&resolver, &mut store, &placeholders).scan(&mut document)?;

    let mut registry = LinkRegistry::default();
    let links = PageLinkRewriter::new(&placeholders, &self.config.page_extension)
      .rewrite(&mut document, &mut registry);

    let (sections, section_diagnostics) = segmenter.segment(&document)?;

    let mut diagnostics: Vec<ConvertError> = report
      .missing
      .iter()
      .filter_map(|reference| reference.missing_error())
      .collect();
    diagnostics.extend(section_diagnostics);

    let result = ConversionResult {
      sections,
      page_links: registry.into_names(),
      assets: store.assets(),
      head: document.head().map(|head| document.outer_html(head)),
      body_scripts: body_scripts(&document),
      diagnostics,
    };

    tracing::info!(
      document = %document_path.display(),
      sections = result.sections.len(),
      assets = result.assets.len(),
      rewritten = report.rewritten,
      links,
      diagnostics = result.diagnostics.len(),
      "converted document"
    );
    Ok(result)
  }

  /// Render and write the templates and manifest for `result`.
  pub fn write_artifacts(&self, result: &ConversionResult) -> anyhow::Result<Vec<PathBuf>> {
    let root = self.config.layout().template_root();
    TemplateArtifacts::render(self.config, result)?
      .write(&root)
      .with_context(|| format!("failed to write templates to {}", root.display()))
  }

  /// Convert the document and write its templates.
  pub fn run(&self, document_path: &Path) -> anyhow::Result<ConversionOutput> {
    let result = self
      .convert(document_path)
      .with_context(|| format!("failed to convert {}", document_path.display()))?;
    let written = self.write_artifacts(&result)?;
    Ok(ConversionOutput { result, written })
  }
}

fn body_scripts(document: &Document) -> Vec<String> {
  let Some(body) = document.body() else {
    return Vec::new();
  };
  document
    .descendants(body)
    .into_iter()
    .filter(|&id| document.element_name(id) == Some("script"))
    .map(|id: NodeId| document.outer_html(id))
    .collect()
}
