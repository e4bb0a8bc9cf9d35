//! Mutation Observer
//!
//! Queues [`MutationRecord`]s for observed subtrees until they are taken.
//! One observer may watch several roots (the document plus any shadow roots
//! discovered later); shadow trees are never covered by observing their
//! host's tree.

use crate::{DomTree, NodeId};

/// Mutation observer
#[derive(Debug, Default)]
pub struct MutationObserver {
    observed: Vec<(NodeId, MutationObserverInit)>,
    records: Vec<MutationRecord>,
}

/// Mutation observer options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationObserverInit {
    pub child_list: bool,
    pub attributes: bool,
    pub character_data: bool,
    pub subtree: bool,
}

impl MutationObserverInit {
    /// Everything, including descendants
    pub fn all() -> Self {
        Self {
            child_list: true,
            attributes: true,
            character_data: true,
            subtree: true,
        }
    }

    fn accepts(&self, kind: MutationType) -> bool {
        match kind {
            MutationType::ChildList => self.child_list,
            MutationType::Attributes => self.attributes,
            MutationType::CharacterData => self.character_data,
        }
    }
}

/// Mutation record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub mutation_type: MutationType,
    pub target: NodeId,
    pub added_nodes: Vec<NodeId>,
    pub removed_nodes: Vec<NodeId>,
    pub previous_sibling: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
    pub attribute_name: Option<String>,
    pub attribute_namespace: Option<String>,
    pub old_value: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationType {
    Attributes,
    CharacterData,
    ChildList,
}

impl MutationRecord {
    pub fn child_list(
        target: NodeId,
        added_nodes: Vec<NodeId>,
        removed_nodes: Vec<NodeId>,
        previous_sibling: Option<NodeId>,
        next_sibling: Option<NodeId>,
    ) -> Self {
        Self {
            mutation_type: MutationType::ChildList,
            target,
            added_nodes,
            removed_nodes,
            previous_sibling,
            next_sibling,
            attribute_name: None,
            attribute_namespace: None,
            old_value: None,
        }
    }

    pub fn attribute(
        target: NodeId,
        name: &str,
        namespace: Option<&str>,
        old_value: Option<String>,
    ) -> Self {
        Self {
            mutation_type: MutationType::Attributes,
            target,
            added_nodes: Vec::new(),
            removed_nodes: Vec::new(),
            previous_sibling: None,
            next_sibling: None,
            attribute_name: Some(name.to_string()),
            attribute_namespace: namespace.map(str::to_string),
            old_value,
        }
    }

    pub fn character_data(target: NodeId, old_value: Option<String>) -> Self {
        Self {
            mutation_type: MutationType::CharacterData,
            target,
            added_nodes: Vec::new(),
            removed_nodes: Vec::new(),
            previous_sibling: None,
            next_sibling: None,
            attribute_name: None,
            attribute_namespace: None,
            old_value,
        }
    }
}

impl MutationObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or re-configure) observation of `target`
    pub fn observe(&mut self, target: NodeId, options: MutationObserverInit) {
        match self.observed.iter_mut().find(|(id, _)| *id == target) {
            Some(entry) => entry.1 = options,
            None => self.observed.push((target, options)),
        }
    }

    /// Stop observing everything and drop queued records
    pub fn disconnect(&mut self) {
        self.observed.clear();
        self.records.clear();
    }

    /// Drain queued records
    pub fn take_records(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.records)
    }

    pub fn is_observing(&self, target: NodeId) -> bool {
        self.observed.iter().any(|(id, _)| *id == target)
    }

    pub fn pending(&self) -> usize {
        self.records.len()
    }

    /// Queue `record` if its target is covered by an observed root
    pub(crate) fn notify(&mut self, tree: &DomTree, record: MutationRecord) {
        let covered = self.observed.iter().any(|(root, options)| {
            options.accepts(record.mutation_type)
                && if options.subtree {
                    tree.is_inclusive_ancestor(*root, record.target)
                } else {
                    *root == record.target
                }
        });
        if covered {
            self.records.push(record);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mutation_observer() {
        let mut observer = MutationObserver::new();
        observer.observe(NodeId(1), MutationObserverInit {
            child_list: true,
            attributes: true,
            ..Default::default()
        });

        assert!(observer.is_observing(NodeId(1)));

        observer.disconnect();
        assert!(!observer.is_observing(NodeId(1)));
    }

    #[test]
    fn test_options_filter_records() {
        let tree = DomTree::new();
        let mut observer = MutationObserver::new();
        observer.observe(NodeId::ROOT, MutationObserverInit {
            child_list: true,
            ..Default::default()
        });

        observer.notify(&tree, MutationRecord::attribute(NodeId::ROOT, "id", None, None));
        assert_eq!(observer.pending(), 0);

        observer.notify(&tree, MutationRecord::child_list(NodeId::ROOT, vec![], vec![], None, None));
        assert_eq!(observer.take_records().len(), 1);
        assert_eq!(observer.pending(), 0);
    }
}
