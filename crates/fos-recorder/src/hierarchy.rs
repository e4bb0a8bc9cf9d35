//! Node serialization and hierarchy backfill
//!
//! A node is written in full the first time the recorder sees it and as a
//! bare `{ id }` afterwards. Before a node's `added` event goes out, its
//! parent and previous sibling must already be in the stream; these walks
//! stop at the first node the registry already knows.

use std::hash::Hash;

use crate::flatten::{Batch, ChangeCapture};
use crate::host::{DomHost, MutationSource, NodeKind};
use crate::node_data::{DomActionType, NodeData};
use crate::NodeId;

const STYLE_TAG: &str = "STYLE";

impl<N: Copy + Eq + Hash + std::fmt::Debug> ChangeCapture<N> {
    /// Full record for an unknown node (registering it), or a reference
    pub(crate) fn serialize_node<H>(&mut self, host: &H, node: N) -> NodeData
    where
        H: DomHost<Node = N>,
    {
        if let Some(id) = self.registry.get_id(node) {
            return NodeData::reference(id);
        }

        let id = self.registry.track(node);
        let kind = host.node_kind(node);
        let mut data = NodeData {
            id: Some(id),
            node_type: Some(kind.node_type()),
            ..NodeData::default()
        };

        match kind {
            NodeKind::Text | NodeKind::Comment => {
                data.text_content = host.text_content(node);
            }
            NodeKind::Element => self.serialize_element(host, node, id, &mut data),
            NodeKind::Document | NodeKind::ShadowRoot | NodeKind::Other(_) => {}
        }

        data
    }

    fn serialize_element<H>(&mut self, host: &H, node: N, id: NodeId, data: &mut NodeData)
    where
        H: DomHost<Node = N>,
    {
        data.tag_name = host.tag_name(node);
        data.namespace_uri = host
            .namespace_uri(node)
            .filter(|ns| !ns.is_empty() && *ns != self.default_namespace);

        for attr in host.attributes(node) {
            let namespace = attr
                .namespace
                .as_deref()
                .filter(|ns| !ns.is_empty() && *ns != self.default_namespace);
            data.set_attribute(&attr.name, Some(attr.value), namespace);
        }

        let snapshot = self
            .watched_properties
            .iter()
            .filter_map(|name| Some((name.clone(), host.property(node, name)?)))
            .collect();
        self.properties.track(id, snapshot);
    }

    /// Make sure `node` and everything it hangs off are in the stream.
    /// Emits `added` for each unknown node, ancestors first.
    pub(crate) fn serialize_hierarchy<H>(&mut self, host: &H, node: N, batch: &mut Batch<N>) -> NodeId
    where
        H: DomHost<Node = N>,
    {
        if let Some(id) = self.registry.get_id(node) {
            return id;
        }

        let data = self.serialize_node(host, node);
        let id = self.registry.track(node);
        let mut stack = vec![Backfill::new(node, data)];

        // A node is emitted once its parent and previous sibling are out;
        // registering before descending keeps cycles finite.
        while let Some(top) = stack.last_mut() {
            let link = match top.step {
                Link::Parent => {
                    top.step = Link::Sibling;
                    host.parent_node(top.node)
                }
                Link::Sibling => {
                    top.step = Link::Done;
                    host.previous_sibling(top.node)
                }
                Link::Done => {
                    if let Some(done) = stack.pop() {
                        let Backfill { node, data, .. } = done;
                        let index = self.emit(&mut batch.changes, DomActionType::Added, data, batch.timestamp);
                        batch.mark_added(node, index);
                    }
                    continue;
                }
            };
            let Some(link) = link else {
                continue;
            };

            let pending = match self.registry.get_id(link) {
                Some(link_id) => {
                    top.set_link(link_id);
                    None
                }
                None => {
                    let data = self.serialize_node(host, link);
                    top.set_link(self.registry.track(link));
                    Some(Backfill::new(link, data))
                }
            };
            stack.extend(pending);
        }

        id
    }

    /// Emit every unknown descendant of a freshly added node, depth first.
    ///
    /// Also starts tracking `<style>` sheets among each visited node and its
    /// children, and picks up attached shadow trees: the shadow root is
    /// written with its host as parent, flattened the same way, then
    /// observed.
    pub(crate) fn serialize_children<H>(&mut self, host: &mut H, node: N, batch: &mut Batch<N>)
    where
        H: MutationSource<Node = N>,
    {
        let mut stack = vec![Descent::enter(&*host, node, None)];

        while let Some(frame) = stack.last_mut() {
            if let Some(&child) = frame.children.get(frame.next_child) {
                frame.next_child += 1;
                if self.registry.has(child) {
                    continue;
                }
                let parent_id = self.registry.get_id(frame.node);
                let mut data = self.serialize_node(&*host, child);
                data.parent_node_id = parent_id;
                data.previous_sibling_id = host
                    .previous_sibling(child)
                    .and_then(|sibling| self.registry.get_id(sibling));
                let index = self.emit(&mut batch.changes, DomActionType::Added, data, batch.timestamp);
                batch.mark_added(child, index);

                stack.push(Descent::enter(&*host, child, None));
                continue;
            }

            // the node itself, then each child
            if frame.next_extra <= frame.children.len() {
                let element = match frame.next_extra {
                    0 => frame.node,
                    i => frame.children[i - 1],
                };
                frame.next_extra += 1;

                if host.tag_name(element).as_deref() == Some(STYLE_TAG) {
                    if let Some(id) = self.registry.get_id(element) {
                        self.stylesheets.track(&*host, id, element);
                    }
                }

                let Some(shadow) = host.shadow_root(element) else {
                    continue;
                };
                if self.registry.has(shadow) {
                    continue;
                }
                let mut data = self.serialize_node(&*host, shadow);
                data.parent_node_id = self.registry.get_id(element);
                self.emit(&mut batch.changes, DomActionType::Added, data, batch.timestamp);

                stack.push(Descent::enter(&*host, shadow, Some(element)));
                continue;
            }

            if let Some(done) = stack.pop() {
                if let Some(element) = done.shadow_host {
                    host.observe_subtree(done.node);
                    tracing::debug!("Observing shadow root of {:?}", element);
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Link {
    Parent,
    Sibling,
    Done,
}

/// A node waiting on its parent and previous sibling
struct Backfill<N> {
    node: N,
    data: NodeData,
    step: Link,
}

impl<N> Backfill<N> {
    fn new(node: N, data: NodeData) -> Self {
        Self {
            node,
            data,
            step: Link::Parent,
        }
    }

    /// Record the id for the link just resolved
    fn set_link(&mut self, id: NodeId) {
        match self.step {
            Link::Sibling => self.data.parent_node_id = Some(id),
            Link::Done => self.data.previous_sibling_id = Some(id),
            Link::Parent => {}
        }
    }
}

/// One level of the descendant walk
struct Descent<N> {
    node: N,
    children: Vec<N>,
    next_child: usize,
    /// Position in `node` followed by `children` for the style and shadow pass
    next_extra: usize,
    /// Set when `node` is a shadow root, observed once its tree is out
    shadow_host: Option<N>,
}

impl<N: Copy> Descent<N> {
    fn enter<H>(host: &H, node: N, shadow_host: Option<N>) -> Self
    where
        H: DomHost<Node = N>,
    {
        Self {
            node,
            children: host.child_nodes(node),
            next_child: 0,
            next_extra: 0,
            shadow_host,
        }
    }
}
