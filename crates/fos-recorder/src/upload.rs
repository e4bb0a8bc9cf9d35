//! Upload scheduling
//!
//! The scheduler serializes a snapshot of the buffers and hands it to a
//! [`Sink`]. It never touches the buffers itself: the caller clears them
//! only after a [`UploadOutcome::Delivered`].

use std::panic::{self, AssertUnwindSafe};

use crate::error::{RecorderResult, SinkError};
use crate::streams::PageResultSet;
use crate::RecorderConfig;

/// Receiver of serialized payloads.
///
/// A panic inside `deliver` is caught and counts as a failed delivery.
pub trait Sink {
    fn deliver(&mut self, payload: &str) -> Result<(), SinkError>;
}

impl<F> Sink for F
where
    F: FnMut(&str) -> Result<(), SinkError>,
{
    fn deliver(&mut self, payload: &str) -> Result<(), SinkError> {
        self(payload)
    }
}

/// Result of one upload attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Nothing buffered, sink not called
    Empty,
    /// Sink accepted the payload
    Delivered { records: usize },
    /// Sink or serializer failed; buffers must be kept
    Failed,
}

/// Idle tracking and payload delivery for one recorder
#[derive(Debug)]
pub struct UploadScheduler<S> {
    sink: S,
    idle_threshold_ms: u64,
    last_upload_ms: Option<u64>,
}

impl<S: Sink> UploadScheduler<S> {
    pub fn new(sink: S, config: &RecorderConfig) -> Self {
        Self {
            sink,
            idle_threshold_ms: config.idle_threshold_ms,
            last_upload_ms: None,
        }
    }

    /// True when no upload succeeded within the idle threshold
    pub fn is_idle(&self, now_ms: u64) -> bool {
        match self.last_upload_ms {
            Some(last) => now_ms.saturating_sub(last) > self.idle_threshold_ms,
            None => true,
        }
    }

    /// Serialize `records` and deliver them
    pub fn upload(&mut self, records: &PageResultSet, now_ms: u64) -> RecorderResult<UploadOutcome> {
        let total = records.total();
        if total == 0 {
            return Ok(UploadOutcome::Empty);
        }

        let payload = serde_json::to_string(records)?;
        let sink = &mut self.sink;
        panic::catch_unwind(AssertUnwindSafe(|| sink.deliver(&payload)))
            .map_err(|_| SinkError::Panicked)??;
        self.last_upload_ms = Some(now_ms);

        tracing::debug!("Uploaded {} records ({} bytes)", total, payload.len());
        Ok(UploadOutcome::Delivered { records: total })
    }

    pub fn last_upload_ms(&self) -> Option<u64> {
        self.last_upload_ms
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecorderError;
    use crate::streams::ScrollEvent;

    fn one_record() -> PageResultSet {
        PageResultSet {
            scroll_events: vec![ScrollEvent {
                scroll_x: 0.0,
                scroll_y: 5.0,
                timestamp: 1,
            }],
            ..PageResultSet::default()
        }
    }

    #[test]
    fn test_empty_payload_skips_sink() {
        let mut calls = 0;
        let mut scheduler = UploadScheduler::new(
            |_: &str| -> Result<(), SinkError> {
                calls += 1;
                Ok(())
            },
            &RecorderConfig::default(),
        );
        let outcome = scheduler.upload(&PageResultSet::default(), 10).unwrap();
        assert_eq!(outcome, UploadOutcome::Empty);
        assert_eq!(scheduler.last_upload_ms(), None);
        drop(scheduler);
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_delivery_records_time() {
        let mut payloads = Vec::new();
        let mut scheduler = UploadScheduler::new(
            |payload: &str| -> Result<(), SinkError> {
                payloads.push(payload.to_string());
                Ok(())
            },
            &RecorderConfig::default(),
        );
        assert!(scheduler.is_idle(0));

        let outcome = scheduler.upload(&one_record(), 2000).unwrap();
        assert_eq!(outcome, UploadOutcome::Delivered { records: 1 });
        assert_eq!(scheduler.last_upload_ms(), Some(2000));
        assert!(!scheduler.is_idle(3000));
        assert!(scheduler.is_idle(3001));
        drop(scheduler);
        assert_eq!(payloads, vec!["[[],[],[],[[0.0,5.0,1]],[]]".to_string()]);
    }

    #[test]
    fn test_panicking_sink_counts_as_failure() {
        let mut scheduler = UploadScheduler::new(
            |_: &str| -> Result<(), SinkError> { panic!("sink blew up") },
            &RecorderConfig::default(),
        );
        let err = scheduler.upload(&one_record(), 5).unwrap_err();
        assert!(matches!(err, RecorderError::Sink(SinkError::Panicked)));
        assert_eq!(scheduler.last_upload_ms(), None);
        assert!(scheduler.is_idle(6));
    }

    #[test]
    fn test_sink_failure_is_reported() {
        let mut scheduler = UploadScheduler::new(
            |_: &str| -> Result<(), SinkError> { Err(SinkError::Closed) },
            &RecorderConfig::default(),
        );
        let err = scheduler.upload(&one_record(), 5).unwrap_err();
        assert!(matches!(err, RecorderError::Sink(SinkError::Closed)));
        assert_eq!(scheduler.last_upload_ms(), None);
    }
}
