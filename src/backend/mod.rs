//! The audio rendering backend contract.
//!
//! The synthesis core never touches samples. It computes parameters
//! (frequencies, gains, ramp durations) and issues abstract commands to an
//! [`AudioBackend`]: create a tone source, create an envelope gain stage,
//! connect them, ramp a gain, dispose a handle, run a task later. Two
//! implementations ship with the crate:
//!
//! - [`null::NullBackend`] — offline, manually clocked, logs every command.
//!   This is what the tests and demos drive.
//! - [`live::LiveBackend`] — renders through cpal with an oscillator per
//!   source handle and a linear gain ramp per envelope handle.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

pub mod live;
pub mod null;

pub use crate::dsp::Waveform;

use crate::envelope::EnvelopeTiming;
use crate::error::BackendError;

/// Opaque handle to one running tone source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceHandle(pub(crate) u64);

/// Opaque handle to one envelope gain stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnvelopeHandle(pub(crate) u64);

/// A deferred callback, run by the backend's own task pump with the
/// backend itself in scope.
pub type ScheduledTask = Box<dyn FnOnce(&mut dyn AudioBackend) + Send>;

/// Abstract audio rendering backend.
///
/// Disposing a handle that was never created, or was already disposed, is
/// a no-op: stale handles are expected after deferred teardown.
pub trait AudioBackend: Send {
    /// Current backend clock, in seconds.
    fn now(&self) -> f64;

    /// Allocate a tone source at a fixed frequency and per-source gain.
    /// The source stays silent until started, and its output only reaches
    /// the destination through a connected envelope stage.
    fn create_source(
        &mut self,
        frequency: f32,
        gain: f32,
        waveform: Waveform,
    ) -> Result<SourceHandle, BackendError>;

    fn start_source(&mut self, handle: SourceHandle);

    fn dispose_source(&mut self, handle: SourceHandle);

    /// Allocate an envelope gain stage.
    fn create_envelope(&mut self, timing: EnvelopeTiming)
        -> Result<EnvelopeHandle, BackendError>;

    /// Set a gain with no interpolation.
    fn set_gain(&mut self, handle: EnvelopeHandle, value: f32);

    /// Ramp a gain from its current instantaneous value to `target` over
    /// `seconds`.
    fn ramp_gain(&mut self, handle: EnvelopeHandle, target: f32, seconds: f32);

    fn dispose_envelope(&mut self, handle: EnvelopeHandle);

    /// Route a source into an envelope stage (one-way edge).
    fn connect(&mut self, source: SourceHandle, envelope: EnvelopeHandle);

    /// Run `task` no earlier than `delay_seconds` from now. Best effort
    /// under a cooperative pump; never blocks.
    fn schedule(&mut self, delay_seconds: f64, task: ScheduledTask);
}

/// Due-ordered queue of scheduled tasks, shared by both backends.
///
/// Ties on the due time fire in submission order.
pub struct TaskQueue {
    heap: BinaryHeap<QueuedTask>,
    next_seq: u64,
}

struct QueuedTask {
    due: f64,
    seq: u64,
    task: ScheduledTask,
}

impl PartialEq for QueuedTask {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}

impl Eq for QueuedTask {}

impl Ord for QueuedTask {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; invert so the earliest due time wins.
        other
            .due
            .total_cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for QueuedTask {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl TaskQueue {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Enqueue a task due at absolute time `due` (seconds).
    pub fn push(&mut self, due: f64, task: ScheduledTask) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(QueuedTask { due, seq, task });
    }

    /// Pop the earliest task due at or before `now`, with its due time.
    pub fn pop_due(&mut self, now: f64) -> Option<(f64, ScheduledTask)> {
        if self.heap.peek().is_some_and(|q| q.due <= now) {
            let q = self.heap.pop().expect("peeked");
            Some((q.due, q.task))
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}
