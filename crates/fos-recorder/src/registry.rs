//! Node Identity Registry
//!
//! Hands out stable integer ids for host nodes. Ids start at 1, only grow,
//! and are never released: a node keeps its id after it leaves the tree so
//! later `removed` events still resolve.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use serde::Serialize;

/// Recorder-assigned node id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// Raw id value
    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Node → id association. The only owner of host node handles.
#[derive(Debug)]
pub struct NodeRegistry<N> {
    ids: HashMap<N, NodeId>,
    /// Slot `i` holds the node with id `i + 1`
    nodes: Vec<N>,
}

impl<N> Default for NodeRegistry<N> {
    fn default() -> Self {
        Self {
            ids: HashMap::new(),
            nodes: Vec::new(),
        }
    }
}

impl<N: Copy + Eq + Hash + fmt::Debug> NodeRegistry<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, node: N) -> bool {
        self.ids.contains_key(&node)
    }

    pub fn get_id(&self, node: N) -> Option<NodeId> {
        self.ids.get(&node).copied()
    }

    /// Id of `node`, allocating the next one on first sight
    pub fn track(&mut self, node: N) -> NodeId {
        if let Some(&id) = self.ids.get(&node) {
            return id;
        }
        self.nodes.push(node);
        let id = NodeId(self.nodes.len() as u32);
        self.ids.insert(node, id);
        id
    }

    /// Node for an id handed out by this registry.
    ///
    /// # Panics
    ///
    /// Panics if `id` was never allocated here; that is a caller bug.
    #[track_caller]
    pub fn get_node(&self, id: NodeId) -> N {
        match id.0.checked_sub(1).and_then(|slot| self.nodes.get(slot as usize)) {
            Some(&node) => node,
            None => panic!("Node with id not found -> {id}"),
        }
    }

    /// Number of nodes seen so far
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
