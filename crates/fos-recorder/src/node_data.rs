//! Serialized change records
//!
//! Wire shape of the structural stream. A change is a positional JSON array
//! `[action, nodeData, timestamp, sequence]`; node data is a camelCase object
//! with absent fields omitted.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

use crate::NodeId;

/// `nodeType` reported for shadow roots
pub const SHADOW_NODE_TYPE: u16 = 40;

/// Synthetic property carrying a style sheet's rule list
pub const CSS_RULES_PROPERTY: &str = "sheet.cssRules";

/// Kind of structural/property change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DomActionType {
    NewDocument = 0,
    Location = 1,
    Added = 2,
    Removed = 3,
    Text = 4,
    Attribute = 5,
    Property = 6,
}

impl Serialize for DomActionType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

/// Value of a watched property
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Text(String),
    Bool(bool),
    /// Serialized rule texts of a style sheet
    Rules(Vec<String>),
}

/// Serialized node. Full on first sight, `{ id }` afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    /// `None` for document-level records (written as -1)
    #[serde(serialize_with = "serialize_node_ref")]
    pub id: Option<NodeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_type: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace_uri: Option<String>,
    /// A `None` value means the attribute was removed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<BTreeMap<String, Option<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute_namespaces: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_node_id: Option<NodeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_sibling_id: Option<NodeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, PropertyValue>>,
}

fn serialize_node_ref<S: Serializer>(id: &Option<NodeId>, serializer: S) -> Result<S::Ok, S::Error> {
    match id {
        Some(id) => serializer.serialize_u32(id.get()),
        None => serializer.serialize_i32(-1),
    }
}

impl NodeData {
    /// Minimal form for an already-known node
    pub fn reference(id: NodeId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    /// Document-level record carrying an address
    pub fn document(location: impl Into<String>) -> Self {
        Self {
            text_content: Some(location.into()),
            ..Self::default()
        }
    }

    /// Record a single attribute (and its namespace) on this node
    pub fn set_attribute(&mut self, name: &str, value: Option<String>, namespace: Option<&str>) {
        self.attributes
            .get_or_insert_with(BTreeMap::new)
            .insert(name.to_string(), value);
        if let Some(namespace) = namespace {
            self.attribute_namespaces
                .get_or_insert_with(BTreeMap::new)
                .insert(name.to_string(), namespace.to_string());
        }
    }

    /// Record a single property value on this node
    pub fn set_property(&mut self, name: &str, value: PropertyValue) {
        self.properties
            .get_or_insert_with(BTreeMap::new)
            .insert(name.to_string(), value);
    }
}

/// One entry of the structural stream
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub action: DomActionType,
    pub data: NodeData,
    pub timestamp: u64,
    /// Total order of the structural stream
    pub sequence: u64,
}

impl Serialize for ChangeEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.action, &self.data, self.timestamp, self.sequence).serialize(serializer)
    }
}

/// Shared counter for [`ChangeEvent::sequence`]
#[derive(Debug, Default)]
pub struct Sequence(u64);

impl Sequence {
    pub fn next(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }

    pub fn current(&self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NodeRegistry;

    #[test]
    fn test_document_record_uses_negative_id() {
        let event = ChangeEvent {
            action: DomActionType::NewDocument,
            data: NodeData::document("https://example.com/"),
            timestamp: 10,
            sequence: 1,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"[0,{"id":-1,"textContent":"https://example.com/"},10,1]"#);
    }

    #[test]
    fn test_reference_omits_absent_fields() {
        let mut registry = NodeRegistry::new();
        let id = registry.track(1u8);
        let mut data = NodeData::reference(id);
        data.set_attribute("class", Some("a".into()), None);
        data.set_attribute("href", None, Some("http://www.w3.org/1999/xlink"));

        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 1,
                "attributes": { "class": "a", "href": null },
                "attributeNamespaces": { "href": "http://www.w3.org/1999/xlink" }
            })
        );
    }

    #[test]
    fn test_property_values_are_untagged() {
        let mut registry = NodeRegistry::new();
        let mut data = NodeData::reference(registry.track(1u8));
        data.set_property("checked", PropertyValue::Bool(true));
        data.set_property(CSS_RULES_PROPERTY, PropertyValue::Rules(vec!["a {}".into()]));

        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["properties"]["checked"], serde_json::json!(true));
        assert_eq!(json["properties"]["sheet.cssRules"], serde_json::json!(["a {}"]));
    }

    #[test]
    fn test_sequence_is_strictly_increasing() {
        let mut seq = Sequence::default();
        let values: Vec<u64> = (0..5).map(|_| seq.next()).collect();
        assert_eq!(values, vec![1, 2, 3, 4, 5]);
        assert_eq!(seq.current(), 5);
    }
}
