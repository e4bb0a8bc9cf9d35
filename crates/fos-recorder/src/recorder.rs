//! Page recorder
//!
//! Glue between the host's callbacks and the engine. One recorder per
//! document instance: it seeds the structural stream, snapshots and
//! subscribes to the document, turns every entry-point call into buffered
//! records, and uploads them through the scheduler.
//!
//! All entry points are synchronous and never fail towards the host;
//! delivery problems only show up in the log and in the returned
//! [`UploadOutcome`].

use std::fmt::Debug;
use std::hash::Hash;

use crate::clock::{Clock, SystemClock};
use crate::flatten::ChangeCapture;
use crate::host::{Mutation, MutationSource};
use crate::streams::{
    EventStreams, FocusEvent, FocusType, LoadEvent, MouseEvent, MouseEventType, PageResultSet,
    PointerInput, ScrollEvent,
};
use crate::upload::{Sink, UploadOutcome, UploadScheduler};
use crate::{NodeRegistry, RecorderConfig};

const BLANK_DOCUMENT: &str = "about:blank";

/// Records one document's changes and input into five streams
#[derive(Debug)]
pub struct PageRecorder<N, S, C = SystemClock> {
    capture: ChangeCapture<N>,
    streams: EventStreams,
    scheduler: UploadScheduler<S>,
    clock: C,
    config: RecorderConfig,
    disconnected: bool,
}

impl<N, S> PageRecorder<N, S>
where
    N: Copy + Eq + Hash + Debug,
    S: Sink,
{
    /// Attach to `host` using the wall clock
    pub fn new<H>(host: &mut H, sink: S, config: RecorderConfig) -> Self
    where
        H: MutationSource<Node = N>,
    {
        Self::with_clock(host, sink, SystemClock, config)
    }
}

impl<N, S, C> PageRecorder<N, S, C>
where
    N: Copy + Eq + Hash + Debug,
    S: Sink,
    C: Clock,
{
    /// Attach to `host`.
    ///
    /// Seeds the structural stream with `new-document`, flattens the
    /// document's current children as one synthetic insertion and
    /// subscribes to the whole document. Blank documents only get the seed
    /// event when `skip_blank_documents` is set.
    pub fn with_clock<H>(host: &mut H, sink: S, clock: C, config: RecorderConfig) -> Self
    where
        H: MutationSource<Node = N>,
    {
        let mut capture = ChangeCapture::new(&config);
        let mut streams = EventStreams::new();
        let location = host.location();
        streams.push_changes([capture.new_document(location.clone(), clock.now_ms())]);

        let mut recorder = Self {
            capture,
            streams,
            scheduler: UploadScheduler::new(sink, &config),
            clock,
            config,
            disconnected: false,
        };

        if recorder.config.skip_blank_documents && location == BLANK_DOCUMENT {
            tracing::debug!("Blank document, not observing");
            return recorder;
        }

        let document = host.document();
        let children = host.child_nodes(document);
        if !children.is_empty() {
            let snapshot = Mutation::ChildList {
                target: document,
                added: children,
                removed: Vec::new(),
                previous_sibling: None,
            };
            recorder.on_mutations(host, vec![snapshot]);
        }
        host.observe_subtree(document);

        tracing::info!(
            "Recording {} ({} nodes in initial snapshot)",
            location,
            recorder.capture.registry().len()
        );
        recorder
    }

    // ------------------------------------------------------------------
    // Structural stream
    // ------------------------------------------------------------------

    /// Batch delivery callback
    pub fn on_mutations<H>(&mut self, host: &mut H, mutations: Vec<Mutation<N>>)
    where
        H: MutationSource<Node = N>,
    {
        let now = self.clock.now_ms();
        let changes = self.capture.convert_mutations(host, mutations, now);
        self.streams.push_changes(changes);
    }

    /// Flatten whatever the host has queued but not delivered yet
    pub fn process_pending<H>(&mut self, host: &mut H)
    where
        H: MutationSource<Node = N>,
    {
        let mutations = host.take_mutations();
        self.on_mutations(host, mutations);
    }

    /// Drain pending notifications and return a copy of every buffer
    pub fn extract_changes<H>(&mut self, host: &mut H) -> PageResultSet
    where
        H: MutationSource<Node = N>,
    {
        self.process_pending(host);
        self.streams.snapshot()
    }

    /// Empty all five buffers
    pub fn reset_lists(&mut self) {
        self.streams.clear();
    }

    /// Extract then reset; the consumer pulls instead of the sink
    pub fn flush<H>(&mut self, host: &mut H) -> PageResultSet
    where
        H: MutationSource<Node = N>,
    {
        let changes = self.extract_changes(host);
        self.reset_lists();
        changes
    }

    /// Final drain, unsubscribe and upload. Only the first call does
    /// anything; later calls return `None`.
    pub fn disconnect<H>(&mut self, host: &mut H) -> Option<UploadOutcome>
    where
        H: MutationSource<Node = N>,
    {
        if self.disconnected {
            return None;
        }
        self.process_pending(host);
        host.stop_observing();
        self.disconnected = true;

        let outcome = self.upload_changes();
        tracing::info!("Recorder disconnected ({:?})", outcome);
        Some(outcome)
    }

    pub fn is_disconnected(&self) -> bool {
        self.disconnected
    }

    // ------------------------------------------------------------------
    // Uploads
    // ------------------------------------------------------------------

    /// Deliver all buffers; cleared only when the sink accepts them
    pub fn upload_changes(&mut self) -> UploadOutcome {
        let now = self.clock.now_ms();
        match self.scheduler.upload(self.streams.buffers(), now) {
            Ok(UploadOutcome::Delivered { records }) => {
                self.streams.clear();
                UploadOutcome::Delivered { records }
            }
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!("Error uploading page records: {}", err);
                UploadOutcome::Failed
            }
        }
    }

    /// Poll-timer tick. Uploads when nothing went out within the idle
    /// threshold; `None` when the tick was a no-op.
    pub fn on_interval(&mut self) -> Option<UploadOutcome> {
        if self.disconnected || !self.scheduler.is_idle(self.clock.now_ms()) {
            return None;
        }
        Some(self.upload_changes())
    }

    // ------------------------------------------------------------------
    // Input and lifecycle
    // ------------------------------------------------------------------

    pub fn track_mouse(&mut self, kind: MouseEventType, input: PointerInput<N>) {
        let registry = self.capture.registry();
        let event = MouseEvent {
            kind,
            page_x: input.page_x,
            page_y: input.page_y,
            offset_x: input.offset_x,
            offset_y: input.offset_y,
            buttons: input.buttons,
            node_id: input.target.and_then(|node| registry.get_id(node)),
            related_node_id: input.related_target.and_then(|node| registry.get_id(node)),
            timestamp: self.clock.now_ms(),
        };
        self.streams.push_mouse(event);
    }

    /// Focus change; also runs the property check point
    pub fn track_focus<H>(
        &mut self,
        host: &H,
        kind: FocusType,
        target: Option<N>,
        related_target: Option<N>,
    ) where
        H: MutationSource<Node = N>,
    {
        let registry = self.capture.registry();
        let now = self.clock.now_ms();
        let event = FocusEvent {
            kind,
            node_id: target.and_then(|node| registry.get_id(node)),
            related_node_id: related_target.and_then(|node| registry.get_id(node)),
            timestamp: now,
        };
        self.streams.push_focus(event);
        self.property_check(host, now);
    }

    pub fn track_scroll(&mut self, scroll_x: f64, scroll_y: f64) {
        let event = ScrollEvent {
            scroll_x,
            scroll_y,
            timestamp: self.clock.now_ms(),
        };
        self.streams.push_scroll(event);
    }

    /// Lifecycle milestone (`DOMContentLoaded`, `load`, ...). Always
    /// uploads.
    pub fn on_load_event<H>(&mut self, host: &H, name: &str) -> UploadOutcome
    where
        H: MutationSource<Node = N>,
    {
        self.streams.push_load(LoadEvent {
            name: name.to_string(),
            location: host.location(),
            timestamp: self.clock.now_ms(),
        });
        self.upload_changes()
    }

    /// Input/keydown/change callback
    pub fn check_for_property_changes<H>(&mut self, host: &H)
    where
        H: MutationSource<Node = N>,
    {
        let now = self.clock.now_ms();
        self.property_check(host, now);
    }

    fn property_check<H>(&mut self, host: &H, now: u64)
    where
        H: MutationSource<Node = N>,
    {
        let mut changes = Vec::new();
        self.capture.check_properties(host, now, &mut changes);
        self.streams.push_changes(changes);
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Current buffer contents
    pub fn result_set(&self) -> &PageResultSet {
        self.streams.buffers()
    }

    pub fn registry(&self) -> &NodeRegistry<N> {
        self.capture.registry()
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    pub fn last_upload_ms(&self) -> Option<u64> {
        self.scheduler.last_upload_ms()
    }

    pub fn sink(&self) -> &S {
        self.scheduler.sink()
    }

    pub fn sink_mut(&mut self) -> &mut S {
        self.scheduler.sink_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::SinkError;
    use crate::node_data::DomActionType;
    use fos_dom::Document;

    #[derive(Debug, Default)]
    struct Collect(Vec<String>);

    impl Sink for Collect {
        fn deliver(&mut self, payload: &str) -> Result<(), SinkError> {
            self.0.push(payload.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_blank_document_only_seeds() {
        let mut doc = Document::new("about:blank").unwrap();
        let html = doc.create_element("html");
        doc.append_child(doc.root(), html).unwrap();

        let recorder = PageRecorder::with_clock(
            &mut doc,
            Collect::default(),
            ManualClock::new(1),
            RecorderConfig::default(),
        );
        let changes = &recorder.result_set().dom_changes;
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].action, DomActionType::NewDocument);
        assert!(recorder.registry().is_empty());
        assert!(!doc.observer().is_observing(doc.root()));
    }

    #[test]
    fn test_blank_document_snapshot_when_not_skipped() {
        let mut doc = Document::new("about:blank").unwrap();
        let html = doc.create_element("html");
        doc.append_child(doc.root(), html).unwrap();

        let config = RecorderConfig {
            skip_blank_documents: false,
            ..RecorderConfig::default()
        };
        let recorder = PageRecorder::with_clock(&mut doc, Collect::default(), ManualClock::new(1), config);
        assert!(recorder.registry().has(html));
        assert!(doc.observer().is_observing(doc.root()));
    }

    #[test]
    fn test_interval_waits_for_idle_threshold() {
        let mut doc = Document::new("https://example.com/").unwrap();
        let clock = ManualClock::new(10_000);
        let mut recorder = PageRecorder::with_clock(
            &mut doc,
            Collect::default(),
            clock.clone(),
            RecorderConfig::default(),
        );

        assert_eq!(recorder.on_interval(), Some(UploadOutcome::Delivered { records: 1 }));
        recorder.track_scroll(0.0, 10.0);

        clock.advance(500);
        assert_eq!(recorder.on_interval(), None);
        clock.advance(501);
        assert_eq!(recorder.on_interval(), Some(UploadOutcome::Delivered { records: 1 }));
        assert_eq!(recorder.sink().0.len(), 2);
    }

    #[test]
    fn test_track_focus_checks_properties() {
        let mut doc = Document::new("https://example.com/").unwrap();
        let input = doc.create_element("input");
        doc.append_child(doc.root(), input).unwrap();

        let mut recorder = PageRecorder::with_clock(
            &mut doc,
            Collect::default(),
            ManualClock::new(1),
            RecorderConfig::default(),
        );
        doc.set_value(input, "typed").unwrap();
        recorder.track_focus(&doc, FocusType::Out, Some(input), None);

        let results = recorder.result_set();
        assert_eq!(results.focus_events.len(), 1);
        assert_eq!(results.focus_events[0].node_id, recorder.registry().get_id(input));
        let last = results.dom_changes.last().unwrap();
        assert_eq!(last.action, DomActionType::Property);
    }
}
