//! Document tree
//!
//! Arena-backed DOM: nodes live in one vector and refer to each other by
//! [`NodeId`]. Detached nodes stay in the arena, which keeps ids stable for the
//! lifetime of the document.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    pub name: String,
    pub attrs: Vec<Attribute>,
}

impl ElementData {
    pub fn new(name: impl Into<String>) -> Self {
        ElementData {
            name: name.into(),
            attrs: Vec::new(),
        }
    }

    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value.as_str())
    }

    pub fn set_attribute(&mut self, name: &str, value: &str) {
        match self.attrs.iter_mut().find(|a| a.name == name) {
            Some(attr) => attr.value = value.to_string(),
            None => self.attrs.push(Attribute {
                name: name.to_string(),
                value: value.to_string(),
            }),
        }
    }

    pub fn remove_attribute(&mut self, name: &str) {
        self.attrs.retain(|a| a.name != name);
    }

    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.get_attribute("class")
            .unwrap_or_default()
            .split_whitespace()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Root,
    Element(ElementData),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Document {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                data: NodeData::Root,
            }],
            root: NodeId(0),
        }
    }

    /// Parses an HTML fragment into a new document.
    pub fn parse(html: &str) -> Self {
        super::html_parser::parse_fragment(html)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            data,
        });
        NodeId(self.nodes.len() - 1)
    }

    pub fn create_element(&mut self, element: ElementData) -> NodeId {
        self.alloc(NodeData::Element(element))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Text(text.into()))
    }

    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Comment(text.into()))
    }

    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0].data
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.nodes[id.0].data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes[id.0].data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].data {
            NodeData::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn set_text(&mut self, id: NodeId, value: impl Into<String>) {
        if let NodeData::Text(text) = &mut self.nodes[id.0].data {
            *text = value.into();
        }
    }

    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|el| el.get_attribute(name))
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(el) = self.element_mut(id) {
            el.set_attribute(name, value);
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|c| *c == id)
    }

    /// Removes `id` from its parent. The node and its subtree stay usable.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != id);
        }
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Inserts `child` into `parent` right before `reference`, or at the end if
    /// `reference` is not a child of `parent`.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) {
        self.detach(child);
        let position = self.nodes[parent.0]
            .children
            .iter()
            .position(|c| *c == reference)
            .unwrap_or(self.nodes[parent.0].children.len());
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.insert(position, child);
    }

    /// Splits a text node at byte `offset`. The original node keeps the head, the
    /// returned node holds the tail and is inserted right after it.
    pub fn split_text(&mut self, id: NodeId, offset: usize) -> Option<NodeId> {
        let text = self.text(id)?;
        if offset == 0 || offset >= text.len() || !text.is_char_boundary(offset) {
            return None;
        }
        let tail = text[offset..].to_string();
        let head = text[..offset].to_string();
        self.set_text(id, head);

        let new_node = self.create_text(tail);
        if let Some(parent) = self.parent(id) {
            let position = self.index_in_parent(id).unwrap_or(0) + 1;
            self.nodes[new_node.0].parent = Some(parent);
            self.nodes[parent.0].children.insert(position, new_node);
        }
        Some(new_node)
    }

    /// All descendants of `id` in document (pre-)order, excluding `id`.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            result.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        result
    }

    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |n| self.parent(*n))
    }

    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.ancestors(node).any(|a| a == ancestor)
    }

    /// True if `id` is the root or connected to it.
    pub fn is_attached(&self, id: NodeId) -> bool {
        id == self.root || self.is_ancestor(self.root, id)
    }

    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.text(id) {
            return text.to_string();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|n| self.text(n))
            .collect()
    }

    pub fn inner_html(&self, id: NodeId) -> String {
        super::serializer::serialize_children(self, id)
    }

    pub fn outer_html(&self, id: NodeId) -> String {
        super::serializer::serialize_node(self, id)
    }

    pub fn to_html(&self) -> String {
        self.inner_html(self.root)
    }
}
