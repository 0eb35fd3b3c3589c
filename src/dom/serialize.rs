//! Markup serialisation for document nodes.

use super::arena::{Document, NodeData, NodeId};

const VOID_ELEMENTS: &[&str] = &[
  "area", "base", "basefont", "bgsound", "br", "col", "embed", "frame", "hr", "img", "input",
  "keygen", "link", "meta", "param", "source", "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &[
  "script", "style", "xmp", "iframe", "noembed", "noframes", "noscript", "plaintext",
];

impl Document {
  /// Serialise a node, including its own tags, as HTML markup.
  pub fn outer_html(&self, id: NodeId) -> String {
    let mut output = String::new();
    self.write_node(id, &mut output);
    output
  }

  fn write_node(&self, id: NodeId, output: &mut String) {
    match self.data(id) {
      NodeData::Document => {
        for child in self.children(id) {
          self.write_node(child, output);
        }
      }
      NodeData::Doctype { name, .. } => {
        output.push_str("<!DOCTYPE ");
        output.push_str(name);
        output.push('>');
      }
      NodeData::Comment(text) => {
        output.push_str("<!--");
        output.push_str(text);
        output.push_str("-->");
      }
      NodeData::Text(text) => {
        let raw_parent = self
          .parent(id)
          .and_then(|parent| self.element_name(parent))
          .is_some_and(|name| RAW_TEXT_ELEMENTS.contains(&name));
        if raw_parent {
          output.push_str(text);
        } else {
          escape_text(text, output);
        }
      }
      NodeData::Element { name, attrs } => {
        let local: &str = name.local.as_ref();
        output.push('<');
        output.push_str(local);
        for attr in attrs {
          output.push(' ');
          if let Some(prefix) = &attr.name.prefix {
            output.push_str(prefix.as_ref());
            output.push(':');
          }
          output.push_str(attr.name.local.as_ref());
          output.push_str("=\"");
          escape_attribute(&attr.value, output);
          output.push('"');
        }
        output.push('>');

        if VOID_ELEMENTS.contains(&local) {
          return;
        }
        for child in self.children(id) {
          self.write_node(child, output);
        }
        output.push_str("</");
        output.push_str(local);
        output.push('>');
      }
    }
  }
}

fn escape_text(text: &str, output: &mut String) {
  for c in text.chars() {
    match c {
      '&' => output.push_str("&amp;"),
      '\u{a0}' => output.push_str("&nbsp;"),
      '<' => output.push_str("&lt;"),
      '>' => output.push_str("&gt;"),
      other => output.push(other),
    }
  }
}

fn escape_attribute(value: &str, output: &mut String) {
  for c in value.chars() {
    match c {
      '&' => output.push_str("&amp;"),
      '\u{a0}' => output.push_str("&nbsp;"),
      '"' => output.push_str("&quot;"),
      other => output.push(other),
    }
  }
}

#[cfg(test)]
mod tests {
  use crate::dom::Document;

  #[test]
  fn serialises_elements_attributes_and_comments() {
    let doc = Document::parse(
      r#"<html><body><!-- note --><p class="lead">Fish &amp; chips</p><br></body></html>"#,
    );
    let body = doc.elements_named("body")[0];

    assert_eq!(
      doc.outer_html(body),
      r#"<body><!-- note --><p class="lead">Fish &amp; chips</p><br></body>"#
    );
  }

  #[test]
  fn leaves_script_bodies_unescaped() {
    let doc = Document::parse("<html><head><script>if (a < b && c) {}</script></head></html>");
    let script = doc.elements_named("script")[0];

    assert_eq!(
      doc.outer_html(script),
      "<script>if (a < b && c) {}</script>"
    );
  }

  #[test]
  fn escapes_quotes_in_attribute_values() {
    let doc = Document::parse(r#"<html><body><a title='say "hi"' href="x.html">x</a></body></html>"#);
    let anchor = doc.elements_named("a")[0];

    assert_eq!(
      doc.outer_html(anchor),
      r#"<a title="say &quot;hi&quot;" href="x.html">x</a>"#
    );
  }
}
