//! Offline backend with a manual clock and a full command log.
//!
//! Nothing here makes sound. Every command is recorded as a
//! [`BackendEvent`] with the clock time it arrived at, live handles are
//! counted, and capacities are configurable so resource-exhaustion paths
//! can be exercised for real. Tests and demos drive the clock with
//! [`NullBackend::advance`].

use std::collections::HashMap;

use super::{
    AudioBackend, EnvelopeHandle, ScheduledTask, SourceHandle, TaskQueue, Waveform,
};
use crate::envelope::EnvelopeTiming;
use crate::error::BackendError;

/// One recorded backend command, timestamped with the clock at arrival.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendEvent {
    CreateSource {
        handle: SourceHandle,
        frequency: f32,
        gain: f32,
        waveform: Waveform,
        at: f64,
    },
    StartSource {
        handle: SourceHandle,
        at: f64,
    },
    DisposeSource {
        handle: SourceHandle,
        at: f64,
    },
    CreateEnvelope {
        handle: EnvelopeHandle,
        at: f64,
    },
    SetGain {
        handle: EnvelopeHandle,
        value: f32,
        at: f64,
    },
    RampGain {
        handle: EnvelopeHandle,
        target: f32,
        seconds: f32,
        at: f64,
    },
    DisposeEnvelope {
        handle: EnvelopeHandle,
        at: f64,
    },
    Connect {
        source: SourceHandle,
        envelope: EnvelopeHandle,
        at: f64,
    },
}

/// Manually clocked backend that records instead of rendering.
pub struct NullBackend {
    clock: f64,
    next_handle: u64,
    sources: HashMap<SourceHandle, bool>, // value: started
    envelopes: HashMap<EnvelopeHandle, f32>, // value: last set/target gain
    tasks: TaskQueue,
    events: Vec<BackendEvent>,
    source_capacity: usize,
    envelope_capacity: usize,
}

impl NullBackend {
    pub fn new() -> Self {
        Self::with_capacity(usize::MAX, usize::MAX)
    }

    /// Backend that refuses allocations beyond the given live-handle
    /// counts, for exercising exhaustion paths.
    pub fn with_capacity(sources: usize, envelopes: usize) -> Self {
        Self {
            clock: 0.0,
            next_handle: 0,
            sources: HashMap::new(),
            envelopes: HashMap::new(),
            tasks: TaskQueue::new(),
            events: Vec::new(),
            source_capacity: sources,
            envelope_capacity: envelopes,
        }
    }

    /// Advance the clock by `seconds`, firing every task that comes due
    /// along the way. Each task observes the clock at its own due time.
    pub fn advance(&mut self, seconds: f64) {
        let target = self.clock + seconds;
        loop {
            let popped = self.tasks.pop_due(target);
            match popped {
                Some((due, task)) => {
                    self.clock = due.max(self.clock);
                    task(self);
                }
                None => break,
            }
        }
        self.clock = target;
    }

    pub fn live_sources(&self) -> usize {
        self.sources.len()
    }

    pub fn live_envelopes(&self) -> usize {
        self.envelopes.len()
    }

    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    pub fn events(&self) -> &[BackendEvent] {
        &self.events
    }

    fn fresh_handle(&mut self) -> u64 {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }
}

impl Default for NullBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioBackend for NullBackend {
    fn now(&self) -> f64 {
        self.clock
    }

    fn create_source(
        &mut self,
        frequency: f32,
        gain: f32,
        waveform: Waveform,
    ) -> Result<SourceHandle, BackendError> {
        if self.sources.len() >= self.source_capacity {
            return Err(BackendError::SourcesExhausted {
                capacity: self.source_capacity,
            });
        }
        let handle = SourceHandle(self.fresh_handle());
        self.sources.insert(handle, false);
        self.events.push(BackendEvent::CreateSource {
            handle,
            frequency,
            gain,
            waveform,
            at: self.clock,
        });
        Ok(handle)
    }

    fn start_source(&mut self, handle: SourceHandle) {
        if let Some(started) = self.sources.get_mut(&handle) {
            *started = true;
            self.events.push(BackendEvent::StartSource {
                handle,
                at: self.clock,
            });
        }
    }

    fn dispose_source(&mut self, handle: SourceHandle) {
        // Stale handles are expected after deferred teardown; ignore them.
        if self.sources.remove(&handle).is_some() {
            self.events.push(BackendEvent::DisposeSource {
                handle,
                at: self.clock,
            });
        }
    }

    fn create_envelope(
        &mut self,
        _timing: EnvelopeTiming,
    ) -> Result<EnvelopeHandle, BackendError> {
        if self.envelopes.len() >= self.envelope_capacity {
            return Err(BackendError::EnvelopesExhausted {
                capacity: self.envelope_capacity,
            });
        }
        let handle = EnvelopeHandle(self.fresh_handle());
        self.envelopes.insert(handle, 0.0);
        self.events.push(BackendEvent::CreateEnvelope {
            handle,
            at: self.clock,
        });
        Ok(handle)
    }

    fn set_gain(&mut self, handle: EnvelopeHandle, value: f32) {
        if let Some(gain) = self.envelopes.get_mut(&handle) {
            *gain = value;
            self.events.push(BackendEvent::SetGain {
                handle,
                value,
                at: self.clock,
            });
        }
    }

    fn ramp_gain(&mut self, handle: EnvelopeHandle, target: f32, seconds: f32) {
        if let Some(gain) = self.envelopes.get_mut(&handle) {
            *gain = target;
            self.events.push(BackendEvent::RampGain {
                handle,
                target,
                seconds,
                at: self.clock,
            });
        }
    }

    fn dispose_envelope(&mut self, handle: EnvelopeHandle) {
        if self.envelopes.remove(&handle).is_some() {
            self.events.push(BackendEvent::DisposeEnvelope {
                handle,
                at: self.clock,
            });
        }
    }

    fn connect(&mut self, source: SourceHandle, envelope: EnvelopeHandle) {
        if self.sources.contains_key(&source) && self.envelopes.contains_key(&envelope) {
            self.events.push(BackendEvent::Connect {
                source,
                envelope,
                at: self.clock,
            });
        }
    }

    fn schedule(&mut self, delay_seconds: f64, task: ScheduledTask) {
        self.tasks.push(self.clock + delay_seconds, task);
    }
}
