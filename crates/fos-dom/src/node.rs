//! DOM Node
//!
//! Nodes live in the [`DomTree`](crate::DomTree) arena and link to each other
//! through [`NodeId`]s. Children are kept in order on the parent; sibling
//! lookups go through the parent's child list.

use crate::{NodeId, ShadowRootData, StyleSheet};

/// DOM Node - Core structure
#[derive(Debug, Clone)]
pub struct Node {
    /// Parent node (None for the document, detached nodes and shadow roots)
    pub parent: Option<NodeId>,
    /// Children in tree order
    pub children: Vec<NodeId>,
    /// Attached shadow root, if any
    pub shadow_root: Option<NodeId>,
    /// Node-specific data
    pub data: NodeData,
}

impl Node {
    pub(crate) fn new(data: NodeData) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            shadow_root: None,
            data,
        }
    }

    /// Check if this is an element
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    /// Check if this is character data (text or comment)
    #[inline]
    pub fn is_character_data(&self) -> bool {
        matches!(self.data, NodeData::Text(_) | NodeData::Comment(_))
    }

    /// Get element data if this is an element
    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get mutable element data
    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// DOM `nodeType` number
    pub fn node_type(&self) -> u16 {
        match self.data {
            NodeData::Element(_) => 1,
            NodeData::Text(_) => 3,
            NodeData::Comment(_) => 8,
            NodeData::Document => 9,
            NodeData::Doctype { .. } => 10,
            // shadow roots report as document fragments
            NodeData::ShadowRoot(_) => 11,
        }
    }
}

/// Node-specific data
#[derive(Debug, Clone)]
pub enum NodeData {
    /// Document root
    Document,
    /// DOCTYPE
    Doctype { name: String },
    /// Element
    Element(ElementData),
    /// Text content
    Text(String),
    /// Comment
    Comment(String),
    /// Shadow root attached to a host element
    ShadowRoot(ShadowRootData),
}

/// Element-specific data
#[derive(Debug, Clone)]
pub struct ElementData {
    /// Tag name as exposed by `Element.tagName` (upper-case for HTML)
    pub tag_name: String,
    /// Namespace URI
    pub namespace: String,
    /// Attributes in insertion order
    pub attrs: Vec<Attribute>,
    /// Live form-control state (IDL properties)
    pub form: FormState,
    /// Rule list for `<style>` elements
    pub sheet: Option<StyleSheet>,
}

impl ElementData {
    pub fn new(namespace: &str, local_name: &str) -> Self {
        let tag_name = if namespace == crate::HTML_NAMESPACE {
            local_name.to_ascii_uppercase()
        } else {
            local_name.to_string()
        };
        let form = FormState::for_tag(&tag_name);
        let sheet = (tag_name == "STYLE").then(StyleSheet::default);
        Self {
            tag_name,
            namespace: namespace.to_string(),
            attrs: Vec::new(),
            form,
            sheet,
        }
    }

    /// Get an attribute value by namespace and local name
    pub fn get_attr_ns(&self, namespace: Option<&str>, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name && a.namespace.as_deref() == namespace)
            .map(|a| a.value.as_str())
    }

    /// Get an attribute value by qualified name (any namespace)
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Set an attribute, returning the previous value
    pub fn set_attr(&mut self, namespace: Option<&str>, name: &str, value: &str) -> Option<String> {
        for attr in self.attrs.iter_mut() {
            if attr.name == name && attr.namespace.as_deref() == namespace {
                return Some(std::mem::replace(&mut attr.value, value.to_string()));
            }
        }
        self.attrs.push(Attribute {
            name: name.to_string(),
            namespace: namespace.map(str::to_string),
            value: value.to_string(),
        });
        None
    }

    /// Remove an attribute, returning its value
    pub fn remove_attr(&mut self, namespace: Option<&str>, name: &str) -> Option<String> {
        let pos = self
            .attrs
            .iter()
            .position(|a| a.name == name && a.namespace.as_deref() == namespace)?;
        Some(self.attrs.remove(pos).value)
    }
}

/// Attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub namespace: Option<String>,
    pub value: String,
}

/// Value of a live IDL property
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Text(String),
    Bool(bool),
}

/// Live form-control state.
///
/// Only properties the element kind exposes are `Some`; a text input has a
/// `value` and a `checked`, an `<option>` has `value` and `selected`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub value: Option<String>,
    pub checked: Option<bool>,
    pub selected: Option<bool>,
}

impl FormState {
    fn for_tag(tag_name: &str) -> Self {
        match tag_name {
            "INPUT" => Self {
                value: Some(String::new()),
                checked: Some(false),
                selected: None,
            },
            "OPTION" => Self {
                value: Some(String::new()),
                checked: None,
                selected: Some(false),
            },
            "TEXTAREA" | "SELECT" | "BUTTON" => Self {
                value: Some(String::new()),
                ..Self::default()
            },
            _ => Self::default(),
        }
    }

    /// Read a property by its IDL name
    pub fn get(&self, name: &str) -> Option<PropertyValue> {
        match name {
            "value" => self.value.clone().map(PropertyValue::Text),
            "checked" => self.checked.map(PropertyValue::Bool),
            "selected" => self.selected.map(PropertyValue::Bool),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_tag_name_is_uppercase() {
        let el = ElementData::new(crate::HTML_NAMESPACE, "div");
        assert_eq!(el.tag_name, "DIV");

        let svg = ElementData::new(crate::SVG_NAMESPACE, "circle");
        assert_eq!(svg.tag_name, "circle");
    }

    #[test]
    fn test_attribute_set_and_replace() {
        let mut el = ElementData::new(crate::HTML_NAMESPACE, "a");
        assert_eq!(el.set_attr(None, "href", "/a"), None);
        assert_eq!(el.set_attr(None, "href", "/b"), Some("/a".to_string()));
        assert_eq!(el.get_attr("href"), Some("/b"));
        assert_eq!(el.remove_attr(None, "href"), Some("/b".to_string()));
        assert!(el.attrs.is_empty());
    }

    #[test]
    fn test_form_state_properties() {
        let input = ElementData::new(crate::HTML_NAMESPACE, "input");
        assert_eq!(input.form.get("value"), Some(PropertyValue::Text(String::new())));
        assert_eq!(input.form.get("checked"), Some(PropertyValue::Bool(false)));
        assert_eq!(input.form.get("selected"), None);

        let div = ElementData::new(crate::HTML_NAMESPACE, "div");
        assert_eq!(div.form, FormState::default());
    }

    #[test]
    fn test_style_element_has_sheet() {
        assert!(ElementData::new(crate::HTML_NAMESPACE, "style").sheet.is_some());
        assert!(ElementData::new(crate::HTML_NAMESPACE, "p").sheet.is_none());
    }
}
