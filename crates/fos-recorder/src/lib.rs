//! fOS Page Recorder
//!
//! Produces an ordered, replayable log of everything that happens to a live
//! document and to the user's interaction with it, and ships that log in
//! batches to an external sink.
//!
//! # Streams
//! - structural: node additions/removals, attribute, text, property and
//!   style sheet changes, each referencing only already-introduced ids
//! - pointer, focus, scroll and lifecycle records
//!
//! # Example
//! ```rust,ignore
//! use fos_dom::Document;
//! use fos_recorder::{PageRecorder, RecorderConfig};
//!
//! let mut doc = Document::new("https://example.com/")?;
//! let mut recorder = PageRecorder::new(&mut doc, |payload: &str| {
//!     println!("{payload}");
//!     Ok(())
//! }, RecorderConfig::default());
//! recorder.process_pending(&mut doc);
//! recorder.disconnect(&mut doc);
//! ```

mod clock;
mod config;
mod error;
mod flatten;
mod hierarchy;
pub mod host;
mod node_data;
mod properties;
mod recorder;
mod registry;
mod streams;
mod upload;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::RecorderConfig;
pub use error::{RecorderError, RecorderResult, SinkError};
pub use flatten::ChangeCapture;
pub use host::{DomHost, HostAttribute, Mutation, MutationSource, NodeKind, RestrictedAccess};
pub use node_data::{
    ChangeEvent, DomActionType, NodeData, PropertyValue, Sequence, CSS_RULES_PROPERTY,
    SHADOW_NODE_TYPE,
};
pub use properties::{PropertyTracker, StylesheetTracker};
pub use recorder::PageRecorder;
pub use registry::{NodeId, NodeRegistry};
pub use streams::{
    EventStreams, FocusEvent, FocusType, LoadEvent, MouseEvent, MouseEventType, PageResultSet,
    PointerInput, ScrollEvent,
};
pub use upload::{Sink, UploadOutcome, UploadScheduler};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
