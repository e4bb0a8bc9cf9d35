//! Mutation flattening
//!
//! Turns one batch of host notifications into an ordered list of
//! [`ChangeEvent`]s. Every event only references ids introduced by an
//! earlier event; unknown targets get their hierarchy backfilled first.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use crate::config::RecorderConfig;
use crate::host::{Mutation, MutationSource};
use crate::node_data::{ChangeEvent, DomActionType, NodeData, Sequence};
use crate::properties::{PropertyTracker, StylesheetTracker};
use crate::NodeRegistry;

/// Per-batch bookkeeping
pub(crate) struct Batch<N> {
    pub(crate) timestamp: u64,
    pub(crate) changes: Vec<ChangeEvent>,
    /// Node → index of its `added` event in `changes`
    added: HashMap<N, usize>,
    /// Nodes in first-added order; grows while subtrees are walked
    added_order: Vec<N>,
    removed: HashSet<N>,
}

impl<N: Copy + Eq + Hash> Batch<N> {
    pub(crate) fn new(timestamp: u64) -> Self {
        Self {
            timestamp,
            changes: Vec::new(),
            added: HashMap::new(),
            added_order: Vec::new(),
            removed: HashSet::new(),
        }
    }

    pub(crate) fn mark_added(&mut self, node: N, index: usize) {
        if self.added.insert(node, index).is_none() {
            self.added_order.push(node);
        }
    }

    fn added_data(&self, node: N) -> Option<&NodeData> {
        self.added.get(&node).map(|&index| &self.changes[index].data)
    }
}

/// Change-capture state owned by one recorder
#[derive(Debug)]
pub struct ChangeCapture<N> {
    pub(crate) registry: NodeRegistry<N>,
    pub(crate) properties: PropertyTracker,
    pub(crate) stylesheets: StylesheetTracker,
    pub(crate) sequence: Sequence,
    location: String,
    pub(crate) watched_properties: Vec<String>,
    pub(crate) default_namespace: String,
}

impl<N: Copy + Eq + Hash + std::fmt::Debug> ChangeCapture<N> {
    pub fn new(config: &RecorderConfig) -> Self {
        Self {
            registry: NodeRegistry::new(),
            properties: PropertyTracker::new(),
            stylesheets: StylesheetTracker::new(),
            sequence: Sequence::default(),
            location: String::new(),
            watched_properties: config.watched_properties.clone(),
            default_namespace: config.default_namespace.clone(),
        }
    }

    pub fn registry(&self) -> &NodeRegistry<N> {
        &self.registry
    }

    /// Seed event for a fresh document
    pub fn new_document(&mut self, location: String, timestamp: u64) -> ChangeEvent {
        self.location = location.clone();
        ChangeEvent {
            action: DomActionType::NewDocument,
            data: NodeData::document(location),
            timestamp,
            sequence: self.sequence.next(),
        }
    }

    pub(crate) fn emit(
        &mut self,
        out: &mut Vec<ChangeEvent>,
        action: DomActionType,
        data: NodeData,
        timestamp: u64,
    ) -> usize {
        out.push(ChangeEvent {
            action,
            data,
            timestamp,
            sequence: self.sequence.next(),
        });
        out.len() - 1
    }

    /// Watched-property check point
    pub fn check_properties<H>(&mut self, host: &H, timestamp: u64, out: &mut Vec<ChangeEvent>)
    where
        H: MutationSource<Node = N>,
    {
        self.properties
            .collect_changes(host, &self.registry, timestamp, &mut self.sequence, out);
    }

    /// Style sheet check point
    pub fn check_stylesheets<H>(&mut self, host: &H, timestamp: u64, out: &mut Vec<ChangeEvent>)
    where
        H: MutationSource<Node = N>,
    {
        self.stylesheets
            .collect_changes(host, &self.registry, timestamp, &mut self.sequence, out);
    }

    fn location_change<H>(&mut self, host: &H, timestamp: u64, out: &mut Vec<ChangeEvent>)
    where
        H: MutationSource<Node = N>,
    {
        let current = host.location();
        if current == self.location {
            return;
        }
        self.location = current.clone();
        self.emit(out, DomActionType::Location, NodeData::document(current), timestamp);
    }

    /// Flatten one batch of notifications
    pub fn convert_mutations<H>(
        &mut self,
        host: &mut H,
        mutations: Vec<Mutation<N>>,
        timestamp: u64,
    ) -> Vec<ChangeEvent>
    where
        H: MutationSource<Node = N>,
    {
        let mut batch = Batch::new(timestamp);

        self.location_change(&*host, timestamp, &mut batch.changes);
        self.check_properties(&*host, timestamp, &mut batch.changes);

        for mutation in mutations {
            let target = mutation.target();
            if !self.registry.has(target) {
                self.serialize_hierarchy(&*host, target, &mut batch);
            }

            match mutation {
                Mutation::ChildList {
                    target,
                    added,
                    removed,
                    previous_sibling,
                } => {
                    self.child_list(&*host, &mut batch, target, &added, &removed, previous_sibling);
                }
                Mutation::Attributes {
                    target,
                    name,
                    namespace,
                } => {
                    self.attribute_change(&*host, &mut batch, target, &name, namespace.as_deref());
                }
                Mutation::CharacterData { target } => {
                    let mut data = self.serialize_node(&*host, target);
                    data.text_content = host.text_content(target);
                    self.emit(&mut batch.changes, DomActionType::Text, data, timestamp);
                }
            }
        }

        // Subtrees inserted in one shot only report their root
        let mut next = 0;
        while let Some(&node) = batch.added_order.get(next) {
            self.serialize_children(host, node, &mut batch);
            next += 1;
        }

        self.check_stylesheets(&*host, timestamp, &mut batch.changes);

        batch.changes
    }

    fn child_list<H>(
        &mut self,
        host: &H,
        batch: &mut Batch<N>,
        target: N,
        added: &[N],
        removed: &[N],
        previous_sibling: Option<N>,
    ) where
        H: MutationSource<Node = N>,
    {
        let parent_id = self.registry.get_id(target);

        // Only the first node sits after the record's sibling; later ones
        // use their live pointer.
        let mut is_first = true;
        for &node in removed {
            batch.removed.insert(node);
            let Some(id) = self.registry.get_id(node) else {
                continue;
            };
            let sibling = if is_first {
                previous_sibling
            } else {
                host.previous_sibling(node)
            };
            let data = NodeData {
                parent_node_id: parent_id,
                previous_sibling_id: sibling.and_then(|s| self.registry.get_id(s)),
                ..NodeData::reference(id)
            };
            self.emit(&mut batch.changes, DomActionType::Removed, data, batch.timestamp);
            is_first = false;
        }

        let mut is_first = true;
        for &node in added {
            let mut data = self.serialize_node(host, node);
            data.parent_node_id = parent_id;
            let sibling = if is_first {
                previous_sibling
            } else {
                host.previous_sibling(node)
            };
            data.previous_sibling_id = sibling.and_then(|s| self.registry.get_id(s));
            is_first = false;

            // re-orders can report an unchanged placement again
            if !batch.removed.contains(&node) {
                if let Some(existing) = batch.added_data(node) {
                    if existing.previous_sibling_id == data.previous_sibling_id
                        && existing.parent_node_id == data.parent_node_id
                    {
                        continue;
                    }
                }
            }

            let index = self.emit(&mut batch.changes, DomActionType::Added, data, batch.timestamp);
            batch.mark_added(node, index);
        }
    }

    fn attribute_change<H>(
        &mut self,
        host: &H,
        batch: &mut Batch<N>,
        target: N,
        name: &str,
        namespace: Option<&str>,
    ) where
        H: MutationSource<Node = N>,
    {
        let value = host.attribute(target, namespace, name);
        let namespace = namespace.filter(|ns| !ns.is_empty());

        // A node added in this batch gets the attribute folded into its
        // `added` record instead of a separate edit.
        if let Some(&index) = batch.added.get(&target) {
            batch.changes[index].data.set_attribute(name, value, namespace);
            return;
        }

        let mut data = self.serialize_node(host, target);
        data.set_attribute(name, value, namespace);
        self.emit(&mut batch.changes, DomActionType::Attribute, data, batch.timestamp);
    }
}
