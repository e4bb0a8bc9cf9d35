//! DOM Operation Errors
//!
//! Failures of appendChild, removeChild, insertBefore and friends.

use crate::NodeId;

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// Node not found
    #[error("Node not found: {0:?}")]
    NotFound(NodeId),

    /// Hierarchy error (e.g., inserting an ancestor into its descendant)
    #[error("Hierarchy request error")]
    HierarchyRequest,

    /// Invalid node type for the operation
    #[error("Invalid node type")]
    InvalidNodeType,

    /// Node is not a child of the given parent
    #[error("Node is not a child")]
    NotAChild,

    /// Element already hosts a shadow root
    #[error("Shadow root already attached")]
    ShadowAlreadyAttached,

    /// Rule list access denied (cross-origin stylesheet)
    #[error("Security error: stylesheet rules are not accessible")]
    Security,

    /// Rule index out of range
    #[error("Index size error: {0}")]
    IndexSize(usize),

    /// Document address could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}
