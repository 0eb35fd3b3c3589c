//! Splits a document into named sections delimited by `<!-- Name Start -->` and
//! `<!-- Name End -->` comment markers.
//!
//! Markers are paired per name with an explicit state machine. A section's content is every
//! sibling node strictly between its two markers, serialised in document order. The End marker
//! must be a following sibling of the Start marker; a Start that never meets one is reported as
//! [`ConvertError::UnterminatedSection`] rather than extracted as empty.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::dom::{Document, NodeId};
use crate::error::{ConvertError, Result};
use crate::models::{Section, Sections};

const START_WORD: &str = "Start";
const END_WORD: &str = "End";

/// Which side of a section a marker delimits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
  /// Opens a section.
  Start,
  /// Closes a section.
  End,
}

/// A marker comment recognised in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionMarker {
  /// Position among all comment nodes, in document order.
  pub index: usize,
  /// Comment node carrying the marker.
  pub node: NodeId,
  /// Start or End.
  pub kind: MarkerKind,
  /// Section name, case preserved.
  pub name: String,
}

/// Outcome of pairing a Start marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionState {
  /// Start and End markers found as siblings.
  Complete {
    /// Start marker node.
    start: NodeId,
    /// End marker node.
    end: NodeId,
  },
  /// No End marker among the Start marker's following siblings.
  Unterminated {
    /// Start marker node.
    start: NodeId,
  },
}

/// A named section and its pairing state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionSpan {
  /// Section name.
  pub name: String,
  /// Pairing state.
  pub state: SectionState,
}

/// Result of walking the marker stream without extracting anything.
#[derive(Debug, Default)]
pub struct SectionAnalysis {
  /// Spans in the order their Start markers appear.
  pub spans: Vec<SectionSpan>,
  /// Recoverable marker problems, such as a marker with no name.
  pub diagnostics: Vec<ConvertError>,
}

fn section_name_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| Regex::new(r"^[\w\-.]+$").expect("invalid section name regex"))
}

/// Whether `name` can name a section. Section names become template file names, so only
/// word characters, `-` and `.` are accepted, and a name made of dots alone is refused.
pub fn is_valid_section_name(name: &str) -> bool {
  section_name_pattern().is_match(name) && !name.chars().all(|c| c == '.')
}

/// Interpret a comment as a section marker.
///
/// The first whitespace-delimited token is the name. A later token equal to `Start` makes a
/// Start marker, otherwise a later token equal to `End` makes an End marker. Comments whose
/// first token is itself a marker word, or whose name is not a plain file-name token, are
/// reported as malformed; any other comment is not a marker.
pub fn parse_marker(text: &str) -> Result<Option<(MarkerKind, String)>> {
  let trimmed = text.trim();
  let mut tokens = trimmed.split_whitespace();
  let Some(name) = tokens.next() else {
    return Ok(None);
  };

  if name == START_WORD || name == END_WORD {
    return Err(ConvertError::MalformedComment {
      text: trimmed.to_string(),
    });
  }

  let rest: Vec<&str> = tokens.collect();
  let kind = if rest.contains(&START_WORD) {
    MarkerKind::Start
  } else if rest.contains(&END_WORD) {
    MarkerKind::End
  } else {
    return Ok(None);
  };
  if !is_valid_section_name(name) {
    return Err(ConvertError::MalformedComment {
      text: trimmed.to_string(),
    });
  }
  Ok(Some((kind, name.to_string())))
}

/// Finds and extracts comment-delimited sections.
#[derive(Debug, Default, Clone, Copy)]
pub struct SectionSegmenter;

impl SectionSegmenter {
  /// Create a segmenter.
  pub fn new() -> Self {
    Self
  }

  /// Marker comments of `document` in document order, plus diagnostics for malformed ones.
  pub fn markers(&self, document: &Document) -> (Vec<SectionMarker>, Vec<ConvertError>) {
    let mut markers = Vec::new();
    let mut diagnostics = Vec::new();

    for (index, (node, text)) in document.comments().into_iter().enumerate() {
      match parse_marker(text) {
        Ok(Some((kind, name))) => markers.push(SectionMarker {
          index,
          node,
          kind,
          name,
        }),
        Ok(None) => {}
        Err(err) => {
          tracing::warn!(comment = text.trim(), "skipping marker without a usable section name");
          diagnostics.push(err);
        }
      }
    }

    (markers, diagnostics)
  }

  /// Pair Start and End markers per section name.
  ///
  /// A Start for a name that is already open or already closed is a conflict. End markers with
  /// no open section, or that are not following siblings of the open Start, are ignored.
  pub fn analyze(&self, document: &Document) -> Result<SectionAnalysis> {
    let (markers, diagnostics) = self.markers(document);
    let mut spans: Vec<SectionSpan> = Vec::new();
    let mut seen = BTreeSet::new();

    for marker in markers {
      match marker.kind {
        MarkerKind::Start => {
          tracing::trace!(section = %marker.name, comment = marker.index, "section opened");
          if !seen.insert(marker.name.clone()) {
            return Err(ConvertError::DuplicateSection { name: marker.name });
          }
          spans.push(SectionSpan {
            name: marker.name,
            state: SectionState::Unterminated { start: marker.node },
          });
        }
        MarkerKind::End => {
          let open = spans.iter_mut().find(|span| {
            span.name == marker.name && matches!(span.state, SectionState::Unterminated { .. })
          });
          let Some(span) = open else {
            tracing::debug!(
              section = %marker.name,
              comment = marker.index,
              "ignoring End marker without an open section"
            );
            continue;
          };
          let SectionState::Unterminated { start } = span.state else {
            continue;
          };
          if follows_as_sibling(document, start, marker.node) {
            span.state = SectionState::Complete {
              start,
              end: marker.node,
            };
          } else {
            tracing::debug!(section = %marker.name, "ignoring End marker outside the Start marker's siblings");
          }
        }
      }
    }

    Ok(SectionAnalysis { spans, diagnostics })
  }

  /// Extract every section of `document`.
  ///
  /// Returns the sections together with the recoverable diagnostics met on the way.
  pub fn segment(&self, document: &Document) -> Result<(Sections, Vec<ConvertError>)> {
    let analysis = self.analyze(document)?;
    let mut sections = Sections::default();

    for span in analysis.spans {
      match span.state {
        SectionState::Complete { start, end } => {
          let nodes = self.extract(document, start, end);
          tracing::debug!(section = %span.name, nodes = nodes.len(), "extracted section");
          sections.push(Section {
            name: span.name,
            nodes,
          });
        }
        SectionState::Unterminated { .. } => {
          return Err(ConvertError::UnterminatedSection { name: span.name });
        }
      }
    }

    Ok((sections, analysis.diagnostics))
  }

  /// Serialised siblings strictly between `start` and `end`, markers excluded.
  pub fn extract(&self, document: &Document, start: NodeId, end: NodeId) -> Vec<String> {
    let mut nodes = Vec::new();
    let mut cursor = document.next_sibling(start);
    while let Some(id) = cursor {
      if id == end {
        break;
      }
      nodes.push(document.outer_html(id));
      cursor = document.next_sibling(id);
    }
    nodes
  }
}

fn follows_as_sibling(document: &Document, start: NodeId, end: NodeId) -> bool {
  let mut cursor = document.next_sibling(start);
  while let Some(id) = cursor {
    if id == end {
      return true;
    }
    cursor = document.next_sibling(id);
  }
  false
}

#[cfg(test)]
mod tests {
  use super::*;

  fn page(body: &str) -> Document {
    Document::parse(&format!("<html><head></head><body>{body}</body></html>"))
  }

  #[test]
  fn extracts_content_between_markers() {
    let document = page("<!-- Hero Start -->A<!-- Hero End -->");
    let (sections, diagnostics) = SectionSegmenter::new().segment(&document).unwrap();

    assert_eq!(sections.get("Hero").unwrap().content(), "A");
    assert!(diagnostics.is_empty());
  }

  #[test]
  fn keeps_sibling_markup_in_document_order() {
    let document = page(
      "<!-- Navbar Start --><nav><a href=\"#\">Home</a></nav>\n<!-- Navbar End -->\
       <!-- Footer Start --><footer>&copy; me</footer><!-- Footer End -->",
    );
    let (sections, _) = SectionSegmenter::new().segment(&document).unwrap();

    assert_eq!(sections.names(), vec!["Navbar", "Footer"]);
    assert_eq!(
      sections.get("Navbar").unwrap().nodes,
      vec!["<nav><a href=\"#\">Home</a></nav>".to_string(), "\n".to_string()]
    );
    assert_eq!(sections.get("Footer").unwrap().content(), "<footer>\u{a9} me</footer>");
  }

  #[test]
  fn unterminated_sections_fail_with_their_name() {
    let document = page("<!-- Hero Start --><p>A</p>");
    let err = SectionSegmenter::new().segment(&document).unwrap_err();

    assert!(matches!(err, ConvertError::UnterminatedSection { name } if name == "Hero"));
  }

  #[test]
  fn end_marker_that_is_not_a_sibling_leaves_the_section_unterminated() {
    let document = page("<!-- Hero Start --><div><!-- Hero End --></div>");
    let analysis = SectionSegmenter::new().analyze(&document).unwrap();

    assert!(matches!(
      analysis.spans[0].state,
      SectionState::Unterminated { .. }
    ));
  }

  #[test]
  fn repeated_start_markers_conflict() {
    let open_twice = page("<!-- Hero Start -->A<!-- Hero Start -->B<!-- Hero End -->");
    let reopened = page("<!-- Hero Start -->A<!-- Hero End --><!-- Hero Start -->B<!-- Hero End -->");

    for document in [open_twice, reopened] {
      let err = SectionSegmenter::new().segment(&document).unwrap_err();
      assert!(matches!(err, ConvertError::DuplicateSection { name } if name == "Hero"));
    }
  }

  #[test]
  fn nameless_markers_are_reported_and_skipped() {
    let document = page("<!-- Start -->x<!-- About Start -->B<!-- About End -->");
    let (sections, diagnostics) = SectionSegmenter::new().segment(&document).unwrap();

    assert_eq!(sections.len(), 1);
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].is_recoverable());
  }

  #[test]
  fn names_match_case_sensitively() {
    let document = page("<!-- hero Start -->A<!-- Hero End --><!-- hero End -->");
    let (sections, _) = SectionSegmenter::new().segment(&document).unwrap();

    assert_eq!(sections.names(), vec!["hero"]);
    assert_eq!(sections.get("hero").unwrap().nodes.len(), 2);
    assert!(sections.get("Hero").is_none());
  }

  #[test]
  fn nested_sections_are_both_extracted() {
    let document = page(
      "<!-- Outer Start --><!-- Inner Start -->I<!-- Inner End -->O<!-- Outer End -->",
    );
    let (sections, _) = SectionSegmenter::new().segment(&document).unwrap();

    assert_eq!(sections.get("Inner").unwrap().content(), "I");
    assert_eq!(
      sections.get("Outer").unwrap().content(),
      "<!-- Inner Start -->I<!-- Inner End -->O"
    );
  }

  #[test]
  fn unrelated_comments_and_stray_ends_are_ignored() {
    let document = page("<!-- just a note --><!-- Orphan End --><!-- A Start -->x<!-- A End -->");
    let (sections, diagnostics) = SectionSegmenter::new().segment(&document).unwrap();

    assert_eq!(sections.names(), vec!["A"]);
    assert!(diagnostics.is_empty());
  }

  #[test]
  fn parses_marker_words_after_the_name() {
    assert_eq!(
      parse_marker("  Hero Start ").unwrap(),
      Some((MarkerKind::Start, "Hero".to_string()))
    );
    assert_eq!(
      parse_marker("Hero section End").unwrap(),
      Some((MarkerKind::End, "Hero".to_string()))
    );
    assert_eq!(parse_marker("Hero Starts").unwrap(), None);
    assert!(parse_marker("End").is_err());
  }

  #[test]
  fn names_that_are_not_plain_file_names_are_rejected() {
    for text in ["../../../escaped Start", "a/b End", "a\\b Start", ".. Start", "{x} Start"] {
      assert!(
        matches!(parse_marker(text), Err(ConvertError::MalformedComment { .. })),
        "{text}"
      );
    }
    assert_eq!(parse_marker("../notes here").unwrap(), None);
    assert!(is_valid_section_name("hero-2.v1"));
    assert!(is_valid_section_name("Über"));
  }

  #[test]
  fn path_like_sections_are_skipped_with_a_diagnostic() {
    let document = page(
      "<!-- ../../../escaped Start -->x<!-- ../../../escaped End --><!-- Hero Start -->A<!-- Hero End -->",
    );
    let (sections, diagnostics) = SectionSegmenter::new().segment(&document).unwrap();

    assert_eq!(sections.names(), vec!["Hero"]);
    assert_eq!(diagnostics.len(), 2);
    assert!(diagnostics.iter().all(ConvertError::is_recoverable));
  }
}
