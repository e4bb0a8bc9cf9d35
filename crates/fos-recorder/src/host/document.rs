//! [`DomHost`] for the fOS DOM

use fos_dom::{
    Document, MutationObserverInit, MutationRecord, MutationType, NodeData as DomNodeData,
    NodeId as DomNodeId, PropertyValue as DomPropertyValue,
};

use super::{DomHost, HostAttribute, Mutation, MutationSource, NodeKind, RestrictedAccess};
use crate::node_data::PropertyValue;

impl DomHost for Document {
    type Node = DomNodeId;

    fn location(&self) -> String {
        self.url().to_string()
    }

    fn document(&self) -> DomNodeId {
        self.root()
    }

    fn node_kind(&self, node: DomNodeId) -> NodeKind {
        match self.tree().get(node) {
            Some(n) => match &n.data {
                DomNodeData::Document => NodeKind::Document,
                DomNodeData::Element(_) => NodeKind::Element,
                DomNodeData::Text(_) => NodeKind::Text,
                DomNodeData::Comment(_) => NodeKind::Comment,
                DomNodeData::ShadowRoot(_) => NodeKind::ShadowRoot,
                DomNodeData::Doctype { .. } => NodeKind::Other(n.node_type()),
            },
            None => NodeKind::Other(0),
        }
    }

    fn parent_node(&self, node: DomNodeId) -> Option<DomNodeId> {
        self.parent(node)
    }

    fn previous_sibling(&self, node: DomNodeId) -> Option<DomNodeId> {
        Document::previous_sibling(self, node)
    }

    fn child_nodes(&self, node: DomNodeId) -> Vec<DomNodeId> {
        self.children(node).to_vec()
    }

    fn shadow_root(&self, node: DomNodeId) -> Option<DomNodeId> {
        Document::shadow_root(self, node)
    }

    fn tag_name(&self, node: DomNodeId) -> Option<String> {
        Document::tag_name(self, node).map(str::to_string)
    }

    fn namespace_uri(&self, node: DomNodeId) -> Option<String> {
        let element = self.tree().get(node)?.as_element()?;
        Some(element.namespace.clone())
    }

    fn attributes(&self, node: DomNodeId) -> Vec<HostAttribute> {
        let Some(element) = self.tree().get(node).and_then(|n| n.as_element()) else {
            return Vec::new();
        };
        element
            .attrs
            .iter()
            .map(|attr| HostAttribute {
                name: attr.name.clone(),
                namespace: attr.namespace.clone(),
                value: attr.value.clone(),
            })
            .collect()
    }

    fn attribute(&self, node: DomNodeId, namespace: Option<&str>, name: &str) -> Option<String> {
        let element = self.tree().get(node)?.as_element()?;
        element.get_attr_ns(namespace, name).map(str::to_string)
    }

    fn text_content(&self, node: DomNodeId) -> Option<String> {
        Document::text_content(self, node)
    }

    fn property(&self, node: DomNodeId, name: &str) -> Option<PropertyValue> {
        Document::property(self, node, name).map(|value| match value {
            DomPropertyValue::Text(text) => PropertyValue::Text(text),
            DomPropertyValue::Bool(flag) => PropertyValue::Bool(flag),
        })
    }

    fn style_rules(&self, node: DomNodeId) -> Option<Result<Vec<String>, RestrictedAccess>> {
        let sheet = self.style_sheet(node)?;
        Some(
            sheet
                .css_rules()
                .map(<[String]>::to_vec)
                .map_err(|_| RestrictedAccess),
        )
    }

    fn is_connected(&self, node: DomNodeId) -> bool {
        Document::is_connected(self, node)
    }
}

impl MutationSource for Document {
    fn observe_subtree(&mut self, root: DomNodeId) {
        self.observe(root, MutationObserverInit::all());
    }

    fn take_mutations(&mut self) -> Vec<Mutation<DomNodeId>> {
        self.take_records().into_iter().map(to_mutation).collect()
    }

    fn stop_observing(&mut self) {
        self.disconnect_observer();
    }
}

fn to_mutation(record: MutationRecord) -> Mutation<DomNodeId> {
    match record.mutation_type {
        MutationType::ChildList => Mutation::ChildList {
            target: record.target,
            added: record.added_nodes,
            removed: record.removed_nodes,
            previous_sibling: record.previous_sibling,
        },
        MutationType::Attributes => Mutation::Attributes {
            target: record.target,
            name: record.attribute_name.unwrap_or_default(),
            namespace: record.attribute_namespace,
        },
        MutationType::CharacterData => Mutation::CharacterData {
            target: record.target,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_kinds() {
        let mut doc = Document::new("https://example.com/").unwrap();
        let doctype = doc.create_doctype("html");
        let div = doc.create_element("div");
        let text = doc.create_text("t");
        let shadow = doc.attach_shadow(div, fos_dom::ShadowRootMode::Open).unwrap();

        assert_eq!(doc.node_kind(doc.root()), NodeKind::Document);
        assert_eq!(doc.node_kind(div), NodeKind::Element);
        assert_eq!(doc.node_kind(text), NodeKind::Text);
        assert_eq!(doc.node_kind(shadow).node_type(), 40);
        assert_eq!(doc.node_kind(doctype), NodeKind::Other(10));
    }

    #[test]
    fn test_restricted_sheet() {
        let mut doc = Document::new("https://example.com/").unwrap();
        let style = doc.create_element("style");
        assert_eq!(doc.style_rules(style), Some(Ok(Vec::new())));

        doc.set_sheet_origin_clean(style, false).unwrap();
        assert_eq!(doc.style_rules(style), Some(Err(RestrictedAccess)));
        assert_eq!(doc.style_rules(doc.root()), None);
    }

    #[test]
    fn test_records_convert_to_mutations() {
        let mut doc = Document::new("https://example.com/").unwrap();
        let root = doc.root();
        doc.observe_subtree(root);
        let div = doc.create_element("div");
        doc.append_child(root, div).unwrap();
        doc.set_attribute(div, "id", "main").unwrap();

        let mutations = doc.take_mutations();
        assert_eq!(
            mutations,
            vec![
                Mutation::ChildList {
                    target: root,
                    added: vec![div],
                    removed: vec![],
                    previous_sibling: None,
                },
                Mutation::Attributes {
                    target: div,
                    name: "id".into(),
                    namespace: None,
                },
            ]
        );

        doc.stop_observing();
        doc.set_attribute(div, "id", "other").unwrap();
        assert!(doc.take_mutations().is_empty());
    }
}
