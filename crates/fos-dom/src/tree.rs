//! DOM Tree (arena-based allocation)
//!
//! Raw structural operations. These do not notify observers; see
//! [`Document`](crate::Document) for the observed API.

use crate::{DomError, DomResult, Node, NodeData, NodeId};

/// Arena-based DOM tree. Slot 0 is always the document node.
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<Node>,
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeData::Document)],
        }
    }

    /// Root (document) node
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Allocate a detached node
    pub(crate) fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(data));
        id
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Get a node or fail with `NotFound`
    pub fn node(&self, id: NodeId) -> DomResult<&Node> {
        self.get(id).ok_or(DomError::NotFound(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> DomResult<&mut Node> {
        self.get_mut(id).ok_or(DomError::NotFound(id))
    }

    /// Number of nodes in the arena (attached or not)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the document node is never freed
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    fn position(&self, id: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.parent(id)?;
        let pos = self.children(parent).iter().position(|&c| c == id)?;
        Some((parent, pos))
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, pos) = self.position(id)?;
        pos.checked_sub(1).map(|p| self.children(parent)[p])
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, pos) = self.position(id)?;
        self.children(parent).get(pos + 1).copied()
    }

    /// Is `ancestor` equal to `node` or one of its parents?
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Topmost parent (no shadow-host crossing)
    pub fn root_of(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    /// Is the node in the document, possibly through shadow hosts?
    pub fn is_connected(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            let root = self.root_of(current);
            if root == NodeId::ROOT {
                return true;
            }
            match self.get(root).map(|n| &n.data) {
                Some(NodeData::ShadowRoot(shadow)) => current = shadow.host,
                _ => return false,
            }
        }
    }

    /// DOM `textContent`: own data for character data, concatenated
    /// descendant text for elements and fragments, `None` for documents.
    pub fn text_content(&self, id: NodeId) -> Option<String> {
        let node = self.get(id)?;
        match &node.data {
            NodeData::Text(text) | NodeData::Comment(text) => Some(text.clone()),
            NodeData::Element(_) | NodeData::ShadowRoot(_) => {
                let mut out = String::new();
                self.collect_text(id, &mut out);
                Some(out)
            }
            NodeData::Document | NodeData::Doctype { .. } => None,
        }
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        for &child in self.children(id) {
            match self.get(child).map(|n| &n.data) {
                Some(NodeData::Text(text)) => out.push_str(text),
                Some(NodeData::Element(_)) => self.collect_text(child, out),
                _ => {}
            }
        }
    }

    /// Insert a detached `child` under `parent` before `reference`.
    /// Returns the new (previous, next) siblings.
    pub(crate) fn insert(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> DomResult<(Option<NodeId>, Option<NodeId>)> {
        let parent_node = self.node(parent)?;
        if !matches!(
            parent_node.data,
            NodeData::Document | NodeData::Element(_) | NodeData::ShadowRoot(_)
        ) {
            return Err(DomError::HierarchyRequest);
        }
        let child_node = self.node(child)?;
        if matches!(child_node.data, NodeData::Document | NodeData::ShadowRoot(_)) {
            return Err(DomError::InvalidNodeType);
        }
        if child_node.parent.is_some() || self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest);
        }

        let index = match reference {
            Some(reference) => self
                .children(parent)
                .iter()
                .position(|&c| c == reference)
                .ok_or(DomError::NotAChild)?,
            None => self.children(parent).len(),
        };

        let previous = index.checked_sub(1).map(|i| self.children(parent)[i]);
        self.node_mut(parent)?.children.insert(index, child);
        self.node_mut(child)?.parent = Some(parent);
        Ok((previous, reference))
    }

    /// Detach `child` from `parent`. Returns the former (previous, next) siblings.
    pub(crate) fn detach(
        &mut self,
        parent: NodeId,
        child: NodeId,
    ) -> DomResult<(Option<NodeId>, Option<NodeId>)> {
        let index = self
            .children(parent)
            .iter()
            .position(|&c| c == child)
            .ok_or(DomError::NotAChild)?;
        let previous = index.checked_sub(1).map(|i| self.children(parent)[i]);
        let next = self.children(parent).get(index + 1).copied();

        self.node_mut(parent)?.children.remove(index);
        self.node_mut(child)?.parent = None;
        Ok((previous, next))
    }
}
