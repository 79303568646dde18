//! Processor observer trait for progress reporting.

use log::info;

use hx_agent::RowCounts;
use hx_events::Event;

use crate::RunSummary;

/// Callbacks invoked by [`EventProcessor::run`][crate::EventProcessor::run].
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example — count departures
///
/// ```rust,ignore
/// struct Departures(u64);
///
/// impl ProcessObserver for Departures {
///     fn on_event(&mut self, _seq: u64, event: &Event) {
///         if matches!(event, Event::Departure { .. }) {
///             self.0 += 1;
///         }
///     }
/// }
/// ```
pub trait ProcessObserver {
    /// Called after an event has been applied.  `seq` is 1-based.
    fn on_event(&mut self, _seq: u64, _event: &Event) {}

    /// Called after a non-empty batch was handed to the sink.
    fn on_flush(&mut self, _time: f64, _rows: RowCounts) {}

    /// Called once after the final flush.
    fn on_finish(&mut self, _summary: &RunSummary) {}
}

/// A [`ProcessObserver`] that does nothing.
pub struct NoopObserver;

impl ProcessObserver for NoopObserver {}

/// Logs progress through the `log` facade.
///
/// Emits one `info!` line every `interval` events, one per flush, and the
/// run summary at the end.
pub struct LogObserver {
    interval: u64,
    rows:     RowCounts,
}

impl LogObserver {
    pub fn new(interval: u64) -> Self {
        Self { interval, rows: RowCounts::default() }
    }

    /// Rows flushed so far.
    pub fn rows(&self) -> RowCounts {
        self.rows
    }
}

impl ProcessObserver for LogObserver {
    fn on_event(&mut self, seq: u64, event: &Event) {
        if self.interval > 0 && seq.is_multiple_of(self.interval) {
            info!("{seq} events processed (t={})", event.time());
        }
    }

    fn on_flush(&mut self, time: f64, rows: RowCounts) {
        self.rows += rows;
        info!(
            "flushed {} rows at t={time} ({} so far)",
            rows.total(),
            self.rows.total()
        );
    }

    fn on_finish(&mut self, summary: &RunSummary) {
        info!(
            "processed {} events ({} ignored): {} agents closed, {} aborted, {} route misses",
            summary.events, summary.ignored, summary.closed_normally, summary.aborted, summary.route_misses
        );
    }
}
