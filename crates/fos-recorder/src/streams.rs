//! Event streams
//!
//! Five append-only buffers in arrival order. Input records refer to nodes
//! only by recorder id and are written as positional JSON arrays.

use serde::{Serialize, Serializer};

use crate::node_data::ChangeEvent;
use crate::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MouseEventType {
    Move = 0,
    Down = 1,
    Up = 2,
    Over = 3,
    Out = 4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FocusType {
    In = 0,
    Out = 1,
}

impl Serialize for MouseEventType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

impl Serialize for FocusType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

/// Raw pointer event as handed over by the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInput<N> {
    pub page_x: f64,
    pub page_y: f64,
    /// Position relative to the target's padding edge
    pub offset_x: f64,
    pub offset_y: f64,
    /// Pressed-buttons bitmask
    pub buttons: u16,
    pub target: Option<N>,
    pub related_target: Option<N>,
}

impl<N> PointerInput<N> {
    pub fn at(page_x: f64, page_y: f64) -> Self {
        Self {
            page_x,
            page_y,
            offset_x: 0.0,
            offset_y: 0.0,
            buttons: 0,
            target: None,
            related_target: None,
        }
    }
}

/// `[kind, pageX, pageY, offsetX, offsetY, buttons, nodeId, relatedNodeId, time]`
#[derive(Debug, Clone, PartialEq)]
pub struct MouseEvent {
    pub kind: MouseEventType,
    pub page_x: f64,
    pub page_y: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub buttons: u16,
    pub node_id: Option<NodeId>,
    pub related_node_id: Option<NodeId>,
    pub timestamp: u64,
}

impl Serialize for MouseEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (
            self.kind,
            self.page_x,
            self.page_y,
            self.offset_x,
            self.offset_y,
            self.buttons,
            self.node_id,
            self.related_node_id,
            self.timestamp,
        )
            .serialize(serializer)
    }
}

/// `[kind, nodeId, relatedNodeId, time]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusEvent {
    pub kind: FocusType,
    pub node_id: Option<NodeId>,
    pub related_node_id: Option<NodeId>,
    pub timestamp: u64,
}

impl Serialize for FocusEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.kind, self.node_id, self.related_node_id, self.timestamp).serialize(serializer)
    }
}

/// `[scrollX, scrollY, time]`
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollEvent {
    pub scroll_x: f64,
    pub scroll_y: f64,
    pub timestamp: u64,
}

impl Serialize for ScrollEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.scroll_x, self.scroll_y, self.timestamp).serialize(serializer)
    }
}

/// `[name, location, time]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadEvent {
    pub name: String,
    pub location: String,
    pub timestamp: u64,
}

impl Serialize for LoadEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.name, &self.location, self.timestamp).serialize(serializer)
    }
}

/// Snapshot of all five buffers; the upload payload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageResultSet {
    pub dom_changes: Vec<ChangeEvent>,
    pub mouse_events: Vec<MouseEvent>,
    pub focus_events: Vec<FocusEvent>,
    pub scroll_events: Vec<ScrollEvent>,
    pub load_events: Vec<LoadEvent>,
}

impl PageResultSet {
    /// Records across all five streams
    pub fn total(&self) -> usize {
        self.dom_changes.len()
            + self.mouse_events.len()
            + self.focus_events.len()
            + self.scroll_events.len()
            + self.load_events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

impl Serialize for PageResultSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (
            &self.dom_changes,
            &self.mouse_events,
            &self.focus_events,
            &self.scroll_events,
            &self.load_events,
        )
            .serialize(serializer)
    }
}

/// The recorder's live buffers
#[derive(Debug, Default)]
pub struct EventStreams {
    buffers: PageResultSet,
}

impl EventStreams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_changes(&mut self, changes: impl IntoIterator<Item = ChangeEvent>) {
        self.buffers.dom_changes.extend(changes);
    }

    pub fn push_mouse(&mut self, event: MouseEvent) {
        self.buffers.mouse_events.push(event);
    }

    pub fn push_focus(&mut self, event: FocusEvent) {
        self.buffers.focus_events.push(event);
    }

    pub fn push_scroll(&mut self, event: ScrollEvent) {
        self.buffers.scroll_events.push(event);
    }

    pub fn push_load(&mut self, event: LoadEvent) {
        self.buffers.load_events.push(event);
    }

    pub fn buffers(&self) -> &PageResultSet {
        &self.buffers
    }

    /// Copy of the current contents
    pub fn snapshot(&self) -> PageResultSet {
        self.buffers.clone()
    }

    /// Empty all five buffers
    pub fn clear(&mut self) {
        self.buffers = PageResultSet::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node_data::{DomActionType, NodeData};
    use crate::NodeRegistry;

    #[test]
    fn test_empty_payload_shape() {
        let json = serde_json::to_string(&PageResultSet::default()).unwrap();
        assert_eq!(json, "[[],[],[],[],[]]");
    }

    #[test]
    fn test_records_are_positional() {
        let mut registry = NodeRegistry::new();
        let target = registry.track("button");

        let mut streams = EventStreams::new();
        streams.push_mouse(MouseEvent {
            kind: MouseEventType::Down,
            page_x: 10.0,
            page_y: 20.5,
            offset_x: 1.0,
            offset_y: 2.0,
            buttons: 1,
            node_id: Some(target),
            related_node_id: None,
            timestamp: 99,
        });
        streams.push_focus(FocusEvent {
            kind: FocusType::Out,
            node_id: Some(target),
            related_node_id: None,
            timestamp: 100,
        });
        streams.push_scroll(ScrollEvent {
            scroll_x: 0.0,
            scroll_y: 300.0,
            timestamp: 101,
        });
        streams.push_load(LoadEvent {
            name: "load".into(),
            location: "https://example.com/".into(),
            timestamp: 102,
        });

        let json = serde_json::to_value(streams.buffers()).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                [],
                [[1, 10.0, 20.5, 1.0, 2.0, 1, 1, null, 99]],
                [[1, 1, null, 100]],
                [[0.0, 300.0, 101]],
                [["load", "https://example.com/", 102]]
            ])
        );
    }

    #[test]
    fn test_clear_empties_every_buffer() {
        let mut streams = EventStreams::new();
        streams.push_changes([ChangeEvent {
            action: DomActionType::NewDocument,
            data: NodeData::document("about:blank"),
            timestamp: 1,
            sequence: 1,
        }]);
        streams.push_scroll(ScrollEvent {
            scroll_x: 1.0,
            scroll_y: 1.0,
            timestamp: 2,
        });
        assert_eq!(streams.buffers().total(), 2);

        let snapshot = streams.snapshot();
        streams.clear();
        assert!(streams.buffers().is_empty());
        assert_eq!(snapshot.total(), 2);
    }
}
