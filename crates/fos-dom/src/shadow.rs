//! Shadow DOM
//!
//! Shadow roots are separately-rooted trees: their children point at the
//! shadow root as parent, and the shadow root itself has no parent. The host
//! element only keeps a reference to it.

use crate::NodeId;

/// Shadow root mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadowRootMode {
    #[default]
    Open,
    Closed,
}

/// Shadow root
#[derive(Debug, Clone)]
pub struct ShadowRootData {
    pub host: NodeId,
    pub mode: ShadowRootMode,
}

impl ShadowRootData {
    /// Create a new shadow root record
    pub fn new(host: NodeId, mode: ShadowRootMode) -> Self {
        Self { host, mode }
    }

    /// Closed roots are hidden from `Element.shadowRoot`
    pub fn is_exposed(&self) -> bool {
        self.mode == ShadowRootMode::Open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shadow_root_exposure() {
        let open = ShadowRootData::new(NodeId(1), ShadowRootMode::Open);
        let closed = ShadowRootData::new(NodeId(1), ShadowRootMode::Closed);

        assert!(open.is_exposed());
        assert!(!closed.is_exposed());
        assert_eq!(open.host, NodeId(1));
    }
}
