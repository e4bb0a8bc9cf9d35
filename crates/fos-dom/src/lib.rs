//! fOS DOM - Document Object Model
//!
//! Arena-backed DOM tree with mutation observation.
//!
//! Structural edits made through [`Document`] are reported to its
//! [`MutationObserver`] as [`MutationRecord`]s, the same way a browser
//! queues records for an observed subtree. Live form-control properties and
//! CSSOM rule edits are deliberately *not* reported.

mod document;
mod node;
mod observer;
mod operations;
mod shadow;
mod stylesheet;
mod tree;

pub use document::Document;
pub use node::{Attribute, ElementData, FormState, Node, NodeData, PropertyValue};
pub use observer::{MutationObserver, MutationObserverInit, MutationRecord, MutationType};
pub use operations::{DomError, DomResult};
pub use shadow::{ShadowRootData, ShadowRootMode};
pub use stylesheet::StyleSheet;
pub use tree::DomTree;

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root node ID
    pub const ROOT: NodeId = NodeId(0);

    /// Arena index of this node
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Default (HTML) namespace
pub const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// SVG namespace
pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// XLink namespace (attributes)
pub const XLINK_NAMESPACE: &str = "http://www.w3.org/1999/xlink";
