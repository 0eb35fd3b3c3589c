//! html5ever TreeSink implementation for [`Document`].

use std::borrow::Cow;
use std::cell::RefCell;
use std::rc::Rc;

use html5ever::tendril::StrTendril;
use html5ever::tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::{Attribute as Html5Attribute, QualName};

use super::arena::{Attribute, Document, NodeData, NodeId};

/// Handle used by the tree builder to reference nodes.
///
/// Element handles carry their own name so [`TreeSink::elem_name`] can hand out a reference
/// that lives as long as the handle.
#[derive(Debug, Clone)]
pub struct NodeHandle {
    id: NodeId,
    name: Rc<QualName>,
}

/// Tree builder sink producing a [`Document`].
///
/// The tree builder only passes `&self`, so the document sits behind a `RefCell`.
pub struct DocumentSink {
    document: RefCell<Document>,
    unnamed: Rc<QualName>,
}

impl Default for DocumentSink {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentSink {
    /// Sink holding an empty document.
    pub fn new() -> Self {
        Self {
            document: RefCell::new(Document::new()),
            unnamed: Rc::new(QualName::new(
                None,
                html5ever::ns!(),
                html5ever::local_name!(""),
            )),
        }
    }

    /// Consume the sink and return the built document.
    pub fn into_document(self) -> Document {
        self.document.into_inner()
    }

    fn handle(&self, id: NodeId) -> NodeHandle {
        NodeHandle {
            id,
            name: Rc::clone(&self.unnamed),
        }
    }

    fn convert_attrs(attrs: Vec<Html5Attribute>) -> Vec<Attribute> {
        attrs
            .into_iter()
            .map(|attr| Attribute {
                name: attr.name,
                value: attr.value.to_string(),
            })
            .collect()
    }
}

impl TreeSink for DocumentSink {
    type Handle = NodeHandle;
    type Output = Self;
    type ElemName<'a>
        = &'a QualName
    where
        Self: 'a;

    fn finish(self) -> Self::Output {
        self
    }

    fn parse_error(&self, msg: Cow<'static, str>) {
        tracing::trace!(%msg, "html parse error");
    }

    fn get_document(&self) -> Self::Handle {
        self.handle(NodeId::DOCUMENT)
    }

    fn elem_name<'a>(&'a self, target: &'a Self::Handle) -> Self::ElemName<'a> {
        &*target.name
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<Html5Attribute>,
        _flags: ElementFlags,
    ) -> Self::Handle {
        let shared = Rc::new(name.clone());
        let id = self.document.borrow_mut().create(NodeData::Element {
            name,
            attrs: Self::convert_attrs(attrs),
        });
        NodeHandle { id, name: shared }
    }

    fn create_comment(&self, text: StrTendril) -> Self::Handle {
        let id = self
            .document
            .borrow_mut()
            .create(NodeData::Comment(text.to_string()));
        self.handle(id)
    }

    fn create_pi(&self, target: StrTendril, data: StrTendril) -> Self::Handle {
        let id = self
            .document
            .borrow_mut()
            .create(NodeData::Comment(format!("?{target} {data}")));
        self.handle(id)
    }

    fn append(&self, parent: &Self::Handle, child: NodeOrText<Self::Handle>) {
        let mut document = self.document.borrow_mut();
        match child {
            NodeOrText::AppendNode(node) => document.append(parent.id, node.id),
            NodeOrText::AppendText(text) => document.append_text(parent.id, &text),
        }
    }

    fn append_based_on_parent_node(
        &self,
        element: &Self::Handle,
        prev_element: &Self::Handle,
        child: NodeOrText<Self::Handle>,
    ) {
        let has_parent = self.document.borrow().parent(element.id).is_some();
        if has_parent {
            self.append_before_sibling(element, child);
        } else {
            self.append(prev_element, child);
        }
    }

    fn append_doctype_to_document(
        &self,
        name: StrTendril,
        public_id: StrTendril,
        system_id: StrTendril,
    ) {
        let mut document = self.document.borrow_mut();
        let doctype = document.create(NodeData::Doctype {
            name: name.to_string(),
            public_id: public_id.to_string(),
            system_id: system_id.to_string(),
        });
        document.append(NodeId::DOCUMENT, doctype);
    }

    fn get_template_contents(&self, target: &Self::Handle) -> Self::Handle {
        target.clone()
    }

    fn same_node(&self, x: &Self::Handle, y: &Self::Handle) -> bool {
        x.id == y.id
    }

    fn set_quirks_mode(&self, _mode: QuirksMode) {}

    fn append_before_sibling(&self, sibling: &Self::Handle, new_node: NodeOrText<Self::Handle>) {
        let mut document = self.document.borrow_mut();
        match new_node {
            NodeOrText::AppendNode(node) => document.insert_before(sibling.id, node.id),
            NodeOrText::AppendText(text) => document.insert_text_before(sibling.id, &text),
        }
    }

    fn add_attrs_if_missing(&self, target: &Self::Handle, attrs: Vec<Html5Attribute>) {
        self.document
            .borrow_mut()
            .add_attrs_if_missing(target.id, Self::convert_attrs(attrs));
    }

    fn remove_from_parent(&self, target: &Self::Handle) {
        self.document.borrow_mut().detach(target.id);
    }

    fn reparent_children(&self, node: &Self::Handle, new_parent: &Self::Handle) {
        let mut document = self.document.borrow_mut();
        let children: Vec<NodeId> = document.children(node.id).collect();
        for child in children {
            document.detach(child);
            document.append(new_parent.id, child);
        }
    }
}
