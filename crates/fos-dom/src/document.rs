//! Document - High-level document API
//!
//! All structural, attribute and character-data edits go through here so the
//! document's [`MutationObserver`] sees them. Form-control properties and
//! CSSOM rule edits change state silently, as they do in a browser.

use url::Url;

use crate::{
    DomError, DomResult, DomTree, ElementData, MutationObserver, MutationObserverInit,
    MutationRecord, NodeData, NodeId, PropertyValue, ShadowRootData, ShadowRootMode, StyleSheet,
};

/// HTML Document
#[derive(Debug)]
pub struct Document {
    /// The DOM tree
    tree: DomTree,
    /// Document URL
    url: Url,
    /// Observer fed by every observed edit
    observer: MutationObserver,
}

impl Document {
    /// Create an empty document (document node only)
    pub fn new(url: &str) -> DomResult<Self> {
        Ok(Self {
            tree: DomTree::new(),
            url: Url::parse(url)?,
            observer: MutationObserver::new(),
        })
    }

    /// Get document URL
    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Same-document navigation (`history.pushState`, fragment change).
    /// Relative addresses resolve against the current URL.
    pub fn navigate(&mut self, url: &str) -> DomResult<()> {
        self.url = self.url.join(url)?;
        tracing::debug!("Document navigated to {}", self.url);
        Ok(())
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Document node
    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    // ------------------------------------------------------------------
    // Node creation (detached, unobserved)
    // ------------------------------------------------------------------

    /// Create an HTML element
    pub fn create_element(&mut self, local_name: &str) -> NodeId {
        self.create_element_ns(crate::HTML_NAMESPACE, local_name)
    }

    /// Create an element in `namespace`
    pub fn create_element_ns(&mut self, namespace: &str, local_name: &str) -> NodeId {
        self.tree
            .alloc(NodeData::Element(ElementData::new(namespace, local_name)))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.tree.alloc(NodeData::Text(text.to_string()))
    }

    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.tree.alloc(NodeData::Comment(text.to_string()))
    }

    pub fn create_doctype(&mut self, name: &str) -> NodeId {
        self.tree.alloc(NodeData::Doctype {
            name: name.to_string(),
        })
    }

    // ------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------

    /// Append `child` as the last child of `parent`
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` before `reference` (append when `None`).
    /// An attached `child` is first removed from its current parent.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> DomResult<NodeId> {
        if reference == Some(child) {
            return Err(DomError::HierarchyRequest);
        }
        if self.tree.is_inclusive_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest);
        }
        if let Some(old_parent) = self.tree.parent(child) {
            self.remove_child(old_parent, child)?;
        }

        let (previous, next) = self.tree.insert(parent, child, reference)?;
        self.observer.notify(
            &self.tree,
            MutationRecord::child_list(parent, vec![child], Vec::new(), previous, next),
        );
        self.refresh_sheet(parent);
        Ok(child)
    }

    /// Append several detached nodes at once (fragment insertion).
    /// Produces a single record listing every added node.
    pub fn append_children(&mut self, parent: NodeId, children: &[NodeId]) -> DomResult<()> {
        if children.is_empty() {
            return Ok(());
        }
        let previous = self.tree.children(parent).last().copied();
        for &child in children {
            self.tree.insert(parent, child, None)?;
        }
        self.observer.notify(
            &self.tree,
            MutationRecord::child_list(parent, children.to_vec(), Vec::new(), previous, None),
        );
        self.refresh_sheet(parent);
        Ok(())
    }

    /// Remove `child` from `parent`
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        let (previous, next) = self.tree.detach(parent, child)?;
        self.observer.notify(
            &self.tree,
            MutationRecord::child_list(parent, Vec::new(), vec![child], previous, next),
        );
        self.refresh_sheet(parent);
        Ok(child)
    }

    /// Replace all children of `parent` (`replaceChildren`, `innerHTML`).
    /// Produces a single record with every removed and added node.
    pub fn replace_children(&mut self, parent: NodeId, children: &[NodeId]) -> DomResult<()> {
        let removed = self.tree.children(parent).to_vec();
        for &old in &removed {
            self.tree.detach(parent, old)?;
        }
        for &child in children {
            self.tree.insert(parent, child, None)?;
        }
        if removed.is_empty() && children.is_empty() {
            return Ok(());
        }
        self.observer.notify(
            &self.tree,
            MutationRecord::child_list(parent, children.to_vec(), removed, None, None),
        );
        self.refresh_sheet(parent);
        Ok(())
    }

    /// Attach a shadow root to an element
    pub fn attach_shadow(&mut self, host: NodeId, mode: ShadowRootMode) -> DomResult<NodeId> {
        let host_node = self.tree.node(host)?;
        if !host_node.is_element() {
            return Err(DomError::InvalidNodeType);
        }
        if host_node.shadow_root.is_some() {
            return Err(DomError::ShadowAlreadyAttached);
        }
        let root = self
            .tree
            .alloc(NodeData::ShadowRoot(ShadowRootData::new(host, mode)));
        self.tree.node_mut(host)?.shadow_root = Some(root);
        Ok(root)
    }

    // ------------------------------------------------------------------
    // Attributes and character data
    // ------------------------------------------------------------------

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> DomResult<()> {
        self.set_attribute_ns(node, None, name, value)
    }

    pub fn set_attribute_ns(
        &mut self,
        node: NodeId,
        namespace: Option<&str>,
        name: &str,
        value: &str,
    ) -> DomResult<()> {
        let element = self
            .tree
            .node_mut(node)?
            .as_element_mut()
            .ok_or(DomError::InvalidNodeType)?;
        let old_value = element.set_attr(namespace, name, value);
        self.observer.notify(
            &self.tree,
            MutationRecord::attribute(node, name, namespace, old_value),
        );
        Ok(())
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> DomResult<()> {
        let element = self
            .tree
            .node_mut(node)?
            .as_element_mut()
            .ok_or(DomError::InvalidNodeType)?;
        if let Some(old_value) = element.remove_attr(None, name) {
            self.observer.notify(
                &self.tree,
                MutationRecord::attribute(node, name, None, Some(old_value)),
            );
        }
        Ok(())
    }

    /// Replace the data of a text or comment node
    pub fn set_text(&mut self, node: NodeId, text: &str) -> DomResult<()> {
        let old_value = match &mut self.tree.node_mut(node)?.data {
            NodeData::Text(data) | NodeData::Comment(data) => {
                std::mem::replace(data, text.to_string())
            }
            _ => return Err(DomError::InvalidNodeType),
        };
        self.observer.notify(
            &self.tree,
            MutationRecord::character_data(node, Some(old_value)),
        );
        if let Some(parent) = self.tree.parent(node) {
            self.refresh_sheet(parent);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Live properties (not observable)
    // ------------------------------------------------------------------

    /// Read an IDL property (`value`, `checked`, `selected`)
    pub fn property(&self, node: NodeId, name: &str) -> Option<PropertyValue> {
        self.tree.get(node)?.as_element()?.form.get(name)
    }

    /// User typing / script assignment to `.value`
    pub fn set_value(&mut self, node: NodeId, value: &str) -> DomResult<()> {
        let form = &mut self.element_mut(node)?.form;
        match form.value.as_mut() {
            Some(current) => {
                *current = value.to_string();
                Ok(())
            }
            None => Err(DomError::InvalidNodeType),
        }
    }

    pub fn set_checked(&mut self, node: NodeId, checked: bool) -> DomResult<()> {
        let form = &mut self.element_mut(node)?.form;
        match form.checked.as_mut() {
            Some(current) => {
                *current = checked;
                Ok(())
            }
            None => Err(DomError::InvalidNodeType),
        }
    }

    pub fn set_selected(&mut self, node: NodeId, selected: bool) -> DomResult<()> {
        let form = &mut self.element_mut(node)?.form;
        match form.selected.as_mut() {
            Some(current) => {
                *current = selected;
                Ok(())
            }
            None => Err(DomError::InvalidNodeType),
        }
    }

    // ------------------------------------------------------------------
    // Style sheets
    // ------------------------------------------------------------------

    /// Sheet of a `<style>` element
    pub fn style_sheet(&self, node: NodeId) -> Option<&StyleSheet> {
        self.tree.get(node)?.as_element()?.sheet.as_ref()
    }

    fn style_sheet_mut(&mut self, node: NodeId) -> DomResult<&mut StyleSheet> {
        self.element_mut(node)?
            .sheet
            .as_mut()
            .ok_or(DomError::InvalidNodeType)
    }

    /// `CSSStyleSheet.insertRule`
    pub fn insert_rule(&mut self, style: NodeId, rule: &str, index: usize) -> DomResult<usize> {
        self.style_sheet_mut(style)?.insert_rule(rule, index)
    }

    /// `CSSStyleSheet.deleteRule`
    pub fn delete_rule(&mut self, style: NodeId, index: usize) -> DomResult<()> {
        self.style_sheet_mut(style)?.delete_rule(index)
    }

    /// Mark a sheet as cross-origin (rules unreadable)
    pub fn set_sheet_origin_clean(&mut self, style: NodeId, clean: bool) -> DomResult<()> {
        self.style_sheet_mut(style)?.set_origin_clean(clean);
        Ok(())
    }

    fn refresh_sheet(&mut self, node: NodeId) {
        let has_sheet = self.style_sheet(node).is_some();
        if !has_sheet {
            return;
        }
        let text = self.tree.text_content(node).unwrap_or_default();
        if let Ok(sheet) = self.style_sheet_mut(node) {
            sheet.replace_text(&text);
        }
    }

    // ------------------------------------------------------------------
    // Observation
    // ------------------------------------------------------------------

    /// Observe `root` with `options`
    pub fn observe(&mut self, root: NodeId, options: MutationObserverInit) {
        self.observer.observe(root, options);
    }

    /// Drain queued mutation records (`MutationObserver.takeRecords`)
    pub fn take_records(&mut self) -> Vec<MutationRecord> {
        self.observer.take_records()
    }

    /// Stop observing (`MutationObserver.disconnect`)
    pub fn disconnect_observer(&mut self) {
        self.observer.disconnect();
    }

    pub fn observer(&self) -> &MutationObserver {
        &self.observer
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.tree.parent(node)
    }

    pub fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.tree.previous_sibling(node)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.tree.children(node)
    }

    /// Open shadow root of `host` (`Element.shadowRoot`)
    pub fn shadow_root(&self, host: NodeId) -> Option<NodeId> {
        let root = self.tree.get(host)?.shadow_root?;
        match &self.tree.get(root)?.data {
            NodeData::ShadowRoot(shadow) if shadow.is_exposed() => Some(root),
            _ => None,
        }
    }

    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.tree
            .get(node)?
            .as_element()
            .map(|e| e.tag_name.as_str())
    }

    pub fn text_content(&self, node: NodeId) -> Option<String> {
        self.tree.text_content(node)
    }

    pub fn is_connected(&self, node: NodeId) -> bool {
        self.tree.is_connected(node)
    }

    fn element_mut(&mut self, node: NodeId) -> DomResult<&mut ElementData> {
        self.tree
            .node_mut(node)?
            .as_element_mut()
            .ok_or(DomError::InvalidNodeType)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MutationType;

    fn observed_doc() -> Document {
        let mut doc = Document::new("https://example.com/").unwrap();
        let root = doc.root();
        doc.observe(root, MutationObserverInit::all());
        doc
    }

    #[test]
    fn test_append_records_child_list() {
        let mut doc = observed_doc();
        let html = doc.create_element("html");
        doc.append_child(doc.root(), html).unwrap();

        let records = doc.take_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].mutation_type, MutationType::ChildList);
        assert_eq!(records[0].added_nodes, vec![html]);
        assert_eq!(records[0].previous_sibling, None);
    }

    #[test]
    fn test_move_records_removal_then_insertion() {
        let mut doc = observed_doc();
        let a = doc.create_element("div");
        let b = doc.create_element("div");
        doc.append_child(doc.root(), a).unwrap();
        doc.append_child(a, b).unwrap();
        doc.take_records();

        doc.append_child(doc.root(), b).unwrap();
        let records = doc.take_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].removed_nodes, vec![b]);
        assert_eq!(records[0].target, a);
        assert_eq!(records[1].added_nodes, vec![b]);
        assert_eq!(records[1].previous_sibling, Some(a));
    }

    #[test]
    fn test_detached_edits_are_not_observed() {
        let mut doc = observed_doc();
        let div = doc.create_element("div");
        let text = doc.create_text("x");
        doc.append_child(div, text).unwrap();
        doc.set_attribute(div, "id", "a").unwrap();
        assert!(doc.take_records().is_empty());
    }

    #[test]
    fn test_shadow_tree_needs_own_observation() {
        let mut doc = observed_doc();
        let host = doc.create_element("div");
        doc.append_child(doc.root(), host).unwrap();
        let shadow = doc.attach_shadow(host, ShadowRootMode::Open).unwrap();
        doc.take_records();

        let span = doc.create_element("span");
        doc.append_child(shadow, span).unwrap();
        assert!(doc.take_records().is_empty());
        assert!(doc.is_connected(span));

        doc.observe(shadow, MutationObserverInit::all());
        doc.set_attribute(span, "class", "x").unwrap();
        assert_eq!(doc.take_records().len(), 1);
    }

    #[test]
    fn test_properties_change_silently() {
        let mut doc = observed_doc();
        let input = doc.create_element("input");
        doc.append_child(doc.root(), input).unwrap();
        doc.take_records();

        doc.set_value(input, "typed").unwrap();
        doc.set_checked(input, true).unwrap();
        assert!(doc.take_records().is_empty());
        assert_eq!(doc.property(input, "value"), Some(PropertyValue::Text("typed".into())));
        assert_eq!(doc.set_selected(input, true), Err(DomError::InvalidNodeType));
    }

    #[test]
    fn test_style_text_reparses_sheet() {
        let mut doc = observed_doc();
        let style = doc.create_element("style");
        let text = doc.create_text("a { color: red; }");
        doc.append_child(style, text).unwrap();
        assert_eq!(doc.style_sheet(style).unwrap().css_rules().unwrap().len(), 1);

        doc.set_text(text, "a {} b {}").unwrap();
        assert_eq!(doc.style_sheet(style).unwrap().css_rules().unwrap().len(), 2);

        doc.insert_rule(style, "c {}", 2).unwrap();
        assert_eq!(doc.style_sheet(style).unwrap().css_rules().unwrap().len(), 3);
    }

    #[test]
    fn test_navigate_resolves_relative() {
        let mut doc = Document::new("https://example.com/a/b").unwrap();
        doc.navigate("c#top").unwrap();
        assert_eq!(doc.url(), "https://example.com/a/c#top");
    }
}
