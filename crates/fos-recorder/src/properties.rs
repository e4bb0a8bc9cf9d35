//! Property and style sheet shadows
//!
//! Some state changes never reach the mutation observer: typing into a
//! field, toggling a checkbox, `insertRule` on a sheet. The recorder keeps
//! its own copy of those values and diffs it against the live document at
//! every check point.

use std::collections::BTreeMap;

use crate::host::{DomHost, RestrictedAccess};
use crate::node_data::{
    ChangeEvent, DomActionType, NodeData, PropertyValue, Sequence, CSS_RULES_PROPERTY,
};
use crate::{NodeId, NodeRegistry};

/// Last-seen values of watched element properties
#[derive(Debug, Default)]
pub struct PropertyTracker {
    elements: BTreeMap<NodeId, Vec<(String, PropertyValue)>>,
}

impl PropertyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking an element with its current values
    pub fn track(&mut self, id: NodeId, snapshot: Vec<(String, PropertyValue)>) {
        if !snapshot.is_empty() {
            self.elements.insert(id, snapshot);
        }
    }

    pub fn is_tracked(&self, id: NodeId) -> bool {
        self.elements.contains_key(&id)
    }

    /// Emit a `property` event per changed value and refresh the snapshot
    pub fn collect_changes<H: DomHost>(
        &mut self,
        host: &H,
        registry: &NodeRegistry<H::Node>,
        timestamp: u64,
        sequence: &mut Sequence,
        out: &mut Vec<ChangeEvent>,
    ) {
        for (&id, properties) in self.elements.iter_mut() {
            let node = registry.get_node(id);
            for (name, value) in properties.iter_mut() {
                let Some(live) = host.property(node, name) else {
                    continue;
                };
                if live == *value {
                    continue;
                }
                let mut data = NodeData::reference(id);
                data.set_property(name, live.clone());
                out.push(ChangeEvent {
                    action: DomActionType::Property,
                    data,
                    timestamp,
                    sequence: sequence.next(),
                });
                *value = live;
            }
        }
    }
}

/// Last-seen rule lists of `<style>` sheets
#[derive(Debug, Default)]
pub struct StylesheetTracker {
    sheets: BTreeMap<NodeId, Vec<String>>,
}

impl StylesheetTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_tracked(&self, id: NodeId) -> bool {
        self.sheets.contains_key(&id)
    }

    /// Start tracking a style element's sheet.
    ///
    /// The starting snapshot holds the current rules only when the element
    /// has literal style text; rules inserted through the CSSOM into an
    /// empty `<style>` are reported at the next check point. Cross-origin
    /// sheets are never tracked.
    pub fn track<H: DomHost>(&mut self, host: &H, id: NodeId, element: H::Node) {
        if self.sheets.contains_key(&id) {
            return;
        }
        let Some(rules) = host.style_rules(element) else {
            return;
        };
        let has_style_text = host
            .text_content(element)
            .is_some_and(|text| !text.is_empty());

        match rules {
            Ok(rules) => {
                let snapshot = if has_style_text { rules } else { Vec::new() };
                self.sheets.insert(id, snapshot);
            }
            Err(RestrictedAccess) => {
                tracing::debug!("Skipping style sheet {}: rules not accessible", id);
            }
        }
    }

    /// Emit a `sheet.cssRules` property event for every attached sheet
    /// whose rule text changed
    pub fn collect_changes<H: DomHost>(
        &mut self,
        host: &H,
        registry: &NodeRegistry<H::Node>,
        timestamp: u64,
        sequence: &mut Sequence,
        out: &mut Vec<ChangeEvent>,
    ) {
        for (&id, snapshot) in self.sheets.iter_mut() {
            let element = registry.get_node(id);
            if !host.is_connected(element) {
                continue;
            }
            let Some(Ok(rules)) = host.style_rules(element) else {
                continue;
            };
            if rules.join(",") == snapshot.join(",") {
                continue;
            }
            let mut data = NodeData::reference(id);
            data.set_property(CSS_RULES_PROPERTY, PropertyValue::Rules(rules.clone()));
            out.push(ChangeEvent {
                action: DomActionType::Property,
                data,
                timestamp,
                sequence: sequence.next(),
            });
            *snapshot = rules;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fos_dom::Document;

    fn setup() -> (Document, NodeRegistry<fos_dom::NodeId>) {
        (Document::new("https://example.com/").unwrap(), NodeRegistry::new())
    }

    #[test]
    fn test_property_change_emits_only_changed_value() {
        let (mut doc, mut registry) = setup();
        let input = doc.create_element("input");
        doc.append_child(doc.root(), input).unwrap();
        let id = registry.track(input);

        let mut tracker = PropertyTracker::new();
        tracker.track(id, vec![
            ("value".into(), PropertyValue::Text(String::new())),
            ("checked".into(), PropertyValue::Bool(false)),
        ]);

        let mut seq = Sequence::default();
        let mut out = Vec::new();
        tracker.collect_changes(&doc, &registry, 5, &mut seq, &mut out);
        assert!(out.is_empty());

        doc.set_value(input, "hello").unwrap();
        tracker.collect_changes(&doc, &registry, 6, &mut seq, &mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].action, DomActionType::Property);
        let properties = out[0].data.properties.as_ref().unwrap();
        assert_eq!(properties.len(), 1);
        assert_eq!(properties["value"], PropertyValue::Text("hello".into()));

        // snapshot updated, nothing new
        tracker.collect_changes(&doc, &registry, 7, &mut seq, &mut out);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_empty_style_starts_with_empty_snapshot() {
        let (mut doc, mut registry) = setup();
        let style = doc.create_element("style");
        doc.append_child(doc.root(), style).unwrap();
        doc.insert_rule(style, "a { color: red }", 0).unwrap();
        let id = registry.track(style);

        let mut tracker = StylesheetTracker::new();
        tracker.track(&doc, id, style);

        let mut seq = Sequence::default();
        let mut out = Vec::new();
        tracker.collect_changes(&doc, &registry, 1, &mut seq, &mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(
            out[0].data.properties.as_ref().unwrap()[CSS_RULES_PROPERTY],
            PropertyValue::Rules(vec!["a { color: red }".into()])
        );
    }

    #[test]
    fn test_style_with_text_snapshots_current_rules() {
        let (mut doc, mut registry) = setup();
        let style = doc.create_element("style");
        let text = doc.create_text("p { margin: 0 }");
        doc.append_child(style, text).unwrap();
        doc.append_child(doc.root(), style).unwrap();
        let id = registry.track(style);

        let mut tracker = StylesheetTracker::new();
        tracker.track(&doc, id, style);

        let mut seq = Sequence::default();
        let mut out = Vec::new();
        tracker.collect_changes(&doc, &registry, 1, &mut seq, &mut out);
        assert!(out.is_empty());

        doc.insert_rule(style, "b { top: 0 }", 1).unwrap();
        tracker.collect_changes(&doc, &registry, 2, &mut seq, &mut out);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_cross_origin_sheet_is_never_tracked() {
        let (mut doc, mut registry) = setup();
        let style = doc.create_element("style");
        doc.set_sheet_origin_clean(style, false).unwrap();
        let id = registry.track(style);

        let mut tracker = StylesheetTracker::new();
        tracker.track(&doc, id, style);
        assert!(!tracker.is_tracked(id));
    }

    #[test]
    fn test_detached_sheet_is_skipped() {
        let (mut doc, mut registry) = setup();
        let style = doc.create_element("style");
        doc.append_child(doc.root(), style).unwrap();
        let id = registry.track(style);

        let mut tracker = StylesheetTracker::new();
        tracker.track(&doc, id, style);
        doc.remove_child(doc.root(), style).unwrap();
        doc.insert_rule(style, "a {}", 0).unwrap();

        let mut seq = Sequence::default();
        let mut out = Vec::new();
        tracker.collect_changes(&doc, &registry, 1, &mut seq, &mut out);
        assert!(out.is_empty());
    }
}
