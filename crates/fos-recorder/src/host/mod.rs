//! Host document interface
//!
//! The recorder never owns the document it watches. Every entry point gets
//! the host passed in; the host answers read-only node queries
//! ([`DomHost`]) and delivers batched structural notifications
//! ([`MutationSource`]).

use std::fmt::Debug;
use std::hash::Hash;

use crate::node_data::{PropertyValue, SHADOW_NODE_TYPE};

mod document;

/// Shape of a host node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element,
    Text,
    Comment,
    ShadowRoot,
    /// Anything else, with its raw `nodeType`
    Other(u16),
}

impl NodeKind {
    /// `nodeType` written into serialized node data
    pub fn node_type(self) -> u16 {
        match self {
            NodeKind::Element => 1,
            NodeKind::Text => 3,
            NodeKind::Comment => 8,
            NodeKind::Document => 9,
            NodeKind::ShadowRoot => SHADOW_NODE_TYPE,
            NodeKind::Other(node_type) => node_type,
        }
    }
}

/// Attribute as read from a host element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostAttribute {
    pub name: String,
    pub namespace: Option<String>,
    pub value: String,
}

/// Rule list could not be read (cross-origin sheet)
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("style sheet rules are not accessible")]
pub struct RestrictedAccess;

/// One raw structural notification, as batched by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation<N> {
    ChildList {
        target: N,
        added: Vec<N>,
        removed: Vec<N>,
        /// Sibling the insertion/removal happened after
        previous_sibling: Option<N>,
    },
    Attributes {
        target: N,
        name: String,
        namespace: Option<String>,
    },
    CharacterData {
        target: N,
    },
}

impl<N: Copy> Mutation<N> {
    pub fn target(&self) -> N {
        match self {
            Mutation::ChildList { target, .. }
            | Mutation::Attributes { target, .. }
            | Mutation::CharacterData { target } => *target,
        }
    }
}

/// Read-only view of the hosted document
pub trait DomHost {
    /// Opaque node handle
    type Node: Copy + Eq + Hash + Debug;

    /// Current document address
    fn location(&self) -> String;

    /// The document node
    fn document(&self) -> Self::Node;

    fn node_kind(&self, node: Self::Node) -> NodeKind;

    fn parent_node(&self, node: Self::Node) -> Option<Self::Node>;

    fn previous_sibling(&self, node: Self::Node) -> Option<Self::Node>;

    fn child_nodes(&self, node: Self::Node) -> Vec<Self::Node>;

    /// Attached (open) shadow root
    fn shadow_root(&self, node: Self::Node) -> Option<Self::Node>;

    fn tag_name(&self, node: Self::Node) -> Option<String>;

    fn namespace_uri(&self, node: Self::Node) -> Option<String>;

    fn attributes(&self, node: Self::Node) -> Vec<HostAttribute>;

    /// Current value of one attribute (`getAttributeNS`)
    fn attribute(&self, node: Self::Node, namespace: Option<&str>, name: &str) -> Option<String>;

    fn text_content(&self, node: Self::Node) -> Option<String>;

    /// Live IDL property, `None` when the element does not expose it
    fn property(&self, node: Self::Node, name: &str) -> Option<PropertyValue>;

    /// Rule texts of a style-bearing element's sheet. `None` when the node
    /// has no sheet, `Some(Err(_))` when reading it is forbidden.
    fn style_rules(&self, node: Self::Node) -> Option<Result<Vec<String>, RestrictedAccess>>;

    fn is_connected(&self, node: Self::Node) -> bool;
}

/// Structural-change subscription
pub trait MutationSource: DomHost {
    /// Observe child-list, attribute and character-data changes under `root`
    fn observe_subtree(&mut self, root: Self::Node);

    /// Synchronously drain notifications not yet delivered
    fn take_mutations(&mut self) -> Vec<Mutation<Self::Node>>;

    /// Release the subscription
    fn stop_observing(&mut self);
}
