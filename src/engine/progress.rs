//! Progress reporting channel between the ladder driver and its caller.
//!
//! A run's events are strictly monotonically non-decreasing in percentage,
//! emitted in ladder order then in-level suborder (page/entry index), with
//! exactly one terminal 100% event. The band below [`LADDER_BAND_START`] is
//! reserved for the caller's pre-phase (target selection, analysis); the
//! driver only ever reports inside the remaining band.

use std::io::{self, Write};

use serde::Serialize;

/// Percent where the ladder's slice of the progress band begins. Everything
/// below this belongs to the caller's pre-processing phase.
pub const LADDER_BAND_START: u8 = 20;

/// Sink accepting `(percent, label)` progress tuples.
///
/// Implemented for closures, so callers can pass `|pct, label| ...` directly.
pub trait ProgressSink {
    fn update(&mut self, percent: u8, label: &str);
}

impl<F: FnMut(u8, &str)> ProgressSink for F {
    fn update(&mut self, percent: u8, label: &str) {
        self(percent, label)
    }
}

/// Sink that discards all updates.
pub struct NullSink;

impl ProgressSink for NullSink {
    fn update(&mut self, _percent: u8, _label: &str) {}
}

/// Sink that forwards updates to the log at info level.
pub struct LogSink;

impl ProgressSink for LogSink {
    fn update(&mut self, percent: u8, label: &str) {
        log::info!("[{percent:>3}%] {label}");
    }
}

#[derive(Serialize)]
struct ProgressLine<'a> {
    progress: u8,
    status: &'a str,
}

/// Adapts the sink into a streamed event protocol: one JSON object per line,
/// `{"progress": <int>, "status": <string>}`. Monotonic percent and the
/// single terminal event are preserved because this sink only reformats what
/// the tracker already ordered.
pub struct JsonLineSink<W: Write> {
    out: W,
}

impl<W: Write> JsonLineSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> ProgressSink for JsonLineSink<W> {
    fn update(&mut self, percent: u8, label: &str) {
        let line = ProgressLine {
            progress: percent,
            status: label,
        };
        let result = serde_json::to_writer(&mut self.out, &line)
            .map_err(io::Error::from)
            .and_then(|()| writeln!(self.out));
        if let Err(err) = result {
            log::warn!("Progress sink write failed: {err}");
        }
    }
}

/// Enforces the ordering guarantees on behalf of the driver: percentages are
/// clamped monotonically non-decreasing, intermediate reports are capped at
/// 99, and only [`ProgressTracker::finish`] may emit 100.
pub struct ProgressTracker<'a> {
    sink: &'a mut dyn ProgressSink,
    last: u8,
}

impl<'a> ProgressTracker<'a> {
    pub fn new(sink: &'a mut dyn ProgressSink) -> Self {
        Self { sink, last: 0 }
    }

    /// Report intermediate progress at `percent`, clamped so the stream
    /// never goes backwards and never reaches 100 early.
    pub fn report(&mut self, percent: u8, label: &str) {
        let percent = percent.min(99).max(self.last);
        self.last = percent;
        self.sink.update(percent, label);
    }

    /// Emit the single terminal 100% event.
    pub fn finish(&mut self, label: &str) {
        self.last = 100;
        self.sink.update(100, label);
    }

    /// Scope progress to one ladder step's slice of the 20..100 band.
    pub fn step<'t>(&'t mut self, index: usize, count: usize) -> StepScope<'t, 'a> {
        StepScope {
            tracker: self,
            index,
            count,
        }
    }
}

/// One ladder step's view of the progress band, handed to the codec adapter
/// so it can report per-page or per-entry sub-progress without knowing the
/// band arithmetic.
pub struct StepScope<'t, 'a> {
    tracker: &'t mut ProgressTracker<'a>,
    index: usize,
    count: usize,
}

impl StepScope<'_, '_> {
    /// Report that `done` of `total` units within this step are finished.
    pub fn unit(&mut self, done: usize, total: usize, label: &str) {
        let frac = if total == 0 {
            1.0
        } else {
            (done as f32 / total as f32).min(1.0)
        };
        let span = f32::from(100 - LADDER_BAND_START);
        let percent = f32::from(LADDER_BAND_START)
            + span * (self.index as f32 + frac) / self.count.max(1) as f32;
        self.tracker.report(percent as u8, label);
    }
}
