//! Arena-backed document tree with typed nodes and attribute access.

use html5ever::QualName;

/// Index of a node inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
  /// Identifier of the document node itself.
  pub const DOCUMENT: NodeId = NodeId(0);
}

/// Element attribute with its qualified name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
  /// Qualified attribute name.
  pub name: QualName,
  /// Attribute value, unescaped.
  pub value: String,
}

/// Payload carried by a node.
#[derive(Debug, Clone)]
pub enum NodeData {
  /// Root of the tree.
  Document,
  /// `<!DOCTYPE ...>` declaration.
  Doctype {
    /// Doctype name, usually `html`.
    name: String,
    /// Public identifier.
    public_id: String,
    /// System identifier.
    system_id: String,
  },
  /// Element with its ordered attributes.
  Element {
    /// Qualified element name.
    name: QualName,
    /// Attributes in source order.
    attrs: Vec<Attribute>,
  },
  /// Character data.
  Text(String),
  /// `<!-- ... -->` comment, without the delimiters.
  Comment(String),
}

#[derive(Debug, Clone)]
struct Node {
  data: NodeData,
  parent: Option<NodeId>,
  prev_sibling: Option<NodeId>,
  next_sibling: Option<NodeId>,
  first_child: Option<NodeId>,
  last_child: Option<NodeId>,
}

impl Node {
  fn new(data: NodeData) -> Self {
    Self {
      data,
      parent: None,
      prev_sibling: None,
      next_sibling: None,
      first_child: None,
      last_child: None,
    }
  }
}

/// Parsed HTML document.
#[derive(Debug, Clone)]
pub struct Document {
  nodes: Vec<Node>,
}

impl Default for Document {
  fn default() -> Self {
    Self::new()
  }
}

impl Document {
  /// Empty document containing only the root node.
  pub fn new() -> Self {
    Self {
      nodes: vec![Node::new(NodeData::Document)],
    }
  }

  fn node(&self, id: NodeId) -> &Node {
    &self.nodes[id.0]
  }

  fn node_mut(&mut self, id: NodeId) -> &mut Node {
    &mut self.nodes[id.0]
  }

  pub(crate) fn create(&mut self, data: NodeData) -> NodeId {
    let id = NodeId(self.nodes.len());
    self.nodes.push(Node::new(data));
    id
  }

  /// Payload of a node.
  pub fn data(&self, id: NodeId) -> &NodeData {
    &self.node(id).data
  }

  /// Parent of a node, `None` for the root and detached nodes.
  pub fn parent(&self, id: NodeId) -> Option<NodeId> {
    self.node(id).parent
  }

  /// Next sibling of a node.
  pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
    self.node(id).next_sibling
  }

  /// Iterate the direct children of a node.
  pub fn children(&self, id: NodeId) -> Children<'_> {
    Children {
      document: self,
      next: self.node(id).first_child,
    }
  }

  /// All nodes below `id` in document (pre-)order, excluding `id` itself.
  pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
    let mut order = Vec::new();
    let mut stack: Vec<NodeId> = self.children(id).collect();
    stack.reverse();
    while let Some(current) = stack.pop() {
      order.push(current);
      let mut children: Vec<NodeId> = self.children(current).collect();
      children.reverse();
      stack.extend(children);
    }
    order
  }

  /// Local name of an element, `None` for other node kinds.
  pub fn element_name(&self, id: NodeId) -> Option<&str> {
    match &self.node(id).data {
      NodeData::Element { name, .. } => Some(name.local.as_ref()),
      _ => None,
    }
  }

  /// Elements with the given local name, in document order.
  pub fn elements_named(&self, local: &str) -> Vec<NodeId> {
    self
      .descendants(NodeId::DOCUMENT)
      .into_iter()
      .filter(|&id| self.element_name(id) == Some(local))
      .collect()
  }

  /// Comment nodes with their text, in document order.
  pub fn comments(&self) -> Vec<(NodeId, &str)> {
    self
      .descendants(NodeId::DOCUMENT)
      .into_iter()
      .filter_map(|id| match &self.node(id).data {
        NodeData::Comment(text) => Some((id, text.as_str())),
        _ => None,
      })
      .collect()
  }

  /// Attribute value looked up by local name.
  pub fn attr(&self, id: NodeId, local: &str) -> Option<&str> {
    match &self.node(id).data {
      NodeData::Element { attrs, .. } => attrs
        .iter()
        .find(|attr| attr.name.local.as_ref() == local)
        .map(|attr| attr.value.as_str()),
      _ => None,
    }
  }

  /// Replace the value of an existing attribute, or append it. Returns `false` for non-elements.
  pub fn set_attr(&mut self, id: NodeId, local: &str, value: impl Into<String>) -> bool {
    let NodeData::Element { attrs, .. } = &mut self.node_mut(id).data else {
      return false;
    };
    let value = value.into();
    match attrs
      .iter_mut()
      .find(|attr| attr.name.local.as_ref() == local)
    {
      Some(existing) => existing.value = value,
      None => attrs.push(Attribute {
        name: QualName::new(None, html5ever::ns!(), local.into()),
        value,
      }),
    }
    true
  }

  /// Append `child` as the last child of `parent`. The child must be detached.
  pub(crate) fn append(&mut self, parent: NodeId, child: NodeId) {
    let last = self.node(parent).last_child;
    {
      let node = self.node_mut(child);
      node.parent = Some(parent);
      node.prev_sibling = last;
      node.next_sibling = None;
    }
    match last {
      Some(last) => self.node_mut(last).next_sibling = Some(child),
      None => self.node_mut(parent).first_child = Some(child),
    }
    self.node_mut(parent).last_child = Some(child);
  }

  /// Append text to `parent`, merging with a trailing text node.
  pub(crate) fn append_text(&mut self, parent: NodeId, text: &str) {
    if let Some(last) = self.node(parent).last_child {
      if let NodeData::Text(existing) = &mut self.node_mut(last).data {
        existing.push_str(text);
        return;
      }
    }
    let id = self.create(NodeData::Text(text.to_string()));
    self.append(parent, id);
  }

  /// Insert a detached `child` immediately before `sibling`.
  pub(crate) fn insert_before(&mut self, sibling: NodeId, child: NodeId) {
    let Some(parent) = self.node(sibling).parent else {
      return;
    };
    let prev = self.node(sibling).prev_sibling;
    {
      let node = self.node_mut(child);
      node.parent = Some(parent);
      node.prev_sibling = prev;
      node.next_sibling = Some(sibling);
    }
    self.node_mut(sibling).prev_sibling = Some(child);
    match prev {
      Some(prev) => self.node_mut(prev).next_sibling = Some(child),
      None => self.node_mut(parent).first_child = Some(child),
    }
  }

  /// Insert text before `sibling`, merging with a preceding text node.
  pub(crate) fn insert_text_before(&mut self, sibling: NodeId, text: &str) {
    if let Some(prev) = self.node(sibling).prev_sibling {
      if let NodeData::Text(existing) = &mut self.node_mut(prev).data {
        existing.push_str(text);
        return;
      }
    }
    let id = self.create(NodeData::Text(text.to_string()));
    self.insert_before(sibling, id);
  }

  /// Unlink a node from its parent and siblings.
  pub(crate) fn detach(&mut self, id: NodeId) {
    let (parent, prev, next) = {
      let node = self.node(id);
      (node.parent, node.prev_sibling, node.next_sibling)
    };

    match prev {
      Some(prev) => self.node_mut(prev).next_sibling = next,
      None => {
        if let Some(parent) = parent {
          self.node_mut(parent).first_child = next;
        }
      }
    }
    match next {
      Some(next) => self.node_mut(next).prev_sibling = prev,
      None => {
        if let Some(parent) = parent {
          self.node_mut(parent).last_child = prev;
        }
      }
    }

    let node = self.node_mut(id);
    node.parent = None;
    node.prev_sibling = None;
    node.next_sibling = None;
  }

  /// Add attributes that are not yet present on an element.
  pub(crate) fn add_attrs_if_missing(&mut self, id: NodeId, incoming: Vec<Attribute>) {
    if let NodeData::Element { attrs, .. } = &mut self.node_mut(id).data {
      for attr in incoming {
        if !attrs.iter().any(|existing| existing.name == attr.name) {
          attrs.push(attr);
        }
      }
    }
  }
}

/// Iterator over the direct children of a node.
pub struct Children<'a> {
  document: &'a Document,
  next: Option<NodeId>,
}

impl Iterator for Children<'_> {
  type Item = NodeId;

  fn next(&mut self) -> Option<Self::Item> {
    let current = self.next?;
    self.next = self.document.next_sibling(current);
    Some(current)
  }
}
