//! Live cpal backend.
//!
//! One [`Oscillator`] lane per source handle, one [`LinearRamp`] per
//! envelope handle. The rack of lanes is shared with the cpal callback
//! through a mutex; the callback mixes `osc * source_gain * ramp_level`
//! per sample in blocks of at most `MAX_BLOCK_SIZE` frames. A sample
//! counter doubles as the backend clock.
//!
//! Scheduled tasks do not run on the audio thread: the owner of the
//! backend calls [`LiveBackend::run_pending`] from its event loop, which
//! fires whatever has come due against the sample-counter clock.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use super::{AudioBackend, EnvelopeHandle, ScheduledTask, SourceHandle, TaskQueue, Waveform};
use crate::dsp::{LinearRamp, Oscillator};
use crate::envelope::EnvelopeTiming;
use crate::error::BackendError;
use crate::MAX_BLOCK_SIZE;

/// Oscillator lanes available at once. 256 lanes is 21 simultaneous
/// 12-partial voices; beyond that note-ons fail with a real exhaustion
/// error rather than degrading the mix.
const SOURCE_CAPACITY: usize = 256;
const ENVELOPE_CAPACITY: usize = 64;

/// Source frequencies are clamped to the audible band at this boundary.
const MIN_FREQUENCY: f32 = 20.0;
const MAX_FREQUENCY: f32 = 20_000.0;

struct SourceLane {
    osc: Oscillator,
    gain: f32,
    envelope: Option<EnvelopeHandle>,
    started: bool,
}

/// Everything the audio callback reads, behind one lock.
struct Rack {
    sources: HashMap<SourceHandle, SourceLane>,
    envelopes: HashMap<EnvelopeHandle, LinearRamp>,
    #[cfg(feature = "rtrb")]
    tap: Option<rtrb::Producer<f32>>,
}

impl Rack {
    fn new() -> Self {
        Self {
            sources: HashMap::new(),
            envelopes: HashMap::new(),
            #[cfg(feature = "rtrb")]
            tap: None,
        }
    }

    /// Mix one mono block. Envelope ramps advance exactly once per sample;
    /// every started lane reads its connected ramp's current level.
    fn render(&mut self, block: &mut [f32]) {
        for out in block.iter_mut() {
            for ramp in self.envelopes.values_mut() {
                ramp.next_sample();
            }

            let mut mixed = 0.0;
            for lane in self.sources.values_mut() {
                if !lane.started {
                    continue;
                }
                let sample = lane.osc.next_sample() * lane.gain;
                let level = lane
                    .envelope
                    .and_then(|h| self.envelopes.get(&h))
                    .map_or(0.0, LinearRamp::value);
                mixed += sample * level;
            }
            *out = mixed;

            #[cfg(feature = "rtrb")]
            if let Some(tap) = &mut self.tap {
                // Visualizer feed; dropped samples are fine.
                let _ = tap.push(mixed);
            }
        }
    }
}

/// Backend rendering through the default cpal output device.
pub struct LiveBackend {
    rack: Arc<Mutex<Rack>>,
    samples_rendered: Arc<AtomicU64>,
    sample_rate: f32,
    next_handle: u64,
    tasks: TaskQueue,
}

impl LiveBackend {
    /// Open the default output device and start rendering silence.
    ///
    /// The returned [`cpal::Stream`] must be kept alive by the caller for
    /// as long as sound should play; dropping it stops the device.
    pub fn start() -> Result<(Self, cpal::Stream), BackendError> {
        let (backend, stream) = Self::open(Rack::new())?;
        Ok((backend, stream))
    }

    /// Like [`LiveBackend::start`], with a ring-buffer tap on the mixed
    /// output for a visualizer.
    #[cfg(feature = "rtrb")]
    pub fn start_with_tap(
        tap_capacity: usize,
    ) -> Result<(Self, cpal::Stream, rtrb::Consumer<f32>), BackendError> {
        let (producer, consumer) = rtrb::RingBuffer::new(tap_capacity);
        let mut rack = Rack::new();
        rack.tap = Some(producer);
        let (backend, stream) = Self::open(rack)?;
        Ok((backend, stream, consumer))
    }

    fn open(rack: Rack) -> Result<(Self, cpal::Stream), BackendError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| BackendError::Device("no default output device".into()))?;
        let config = device
            .default_output_config()
            .map_err(|e| BackendError::Device(e.to_string()))?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;

        let rack = Arc::new(Mutex::new(rack));
        let samples_rendered = Arc::new(AtomicU64::new(0));

        let rack_for_callback = rack.clone();
        let counter = samples_rendered.clone();
        let mut block = vec![0.0f32; MAX_BLOCK_SIZE];

        let stream = device
            .build_output_stream(
                &config.into(),
                move |data: &mut [f32], _| {
                    let mut rack = rack_for_callback.lock().unwrap();
                    let total_frames = data.len() / channels;
                    let mut frames_written = 0;

                    while frames_written < total_frames {
                        let frames = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                        let block = &mut block[..frames];
                        rack.render(block);

                        // Mono to all channels.
                        let out_off = frames_written * channels;
                        for (i, &s) in block.iter().enumerate() {
                            for ch in 0..channels {
                                data[out_off + i * channels + ch] = s;
                            }
                        }
                        frames_written += frames;
                    }

                    counter.fetch_add(total_frames as u64, Ordering::Relaxed);
                },
                |err| tracing::error!(%err, "audio stream error"),
                None,
            )
            .map_err(|e| BackendError::Device(e.to_string()))?;

        stream
            .play()
            .map_err(|e| BackendError::Device(e.to_string()))?;

        tracing::info!(sample_rate, channels, "live backend started");

        Ok((
            Self {
                rack,
                samples_rendered,
                sample_rate,
                next_handle: 0,
                tasks: TaskQueue::new(),
            },
            stream,
        ))
    }

    /// Fire every scheduled task that has come due. Called from the UI
    /// event loop; never blocks on anything but the rack lock.
    pub fn run_pending(&mut self) {
        let now = self.now();
        while let Some((_, task)) = self.tasks.pop_due(now) {
            task(self);
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn fresh_handle(&mut self) -> u64 {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }
}

impl AudioBackend for LiveBackend {
    fn now(&self) -> f64 {
        self.samples_rendered.load(Ordering::Relaxed) as f64 / self.sample_rate as f64
    }

    fn create_source(
        &mut self,
        frequency: f32,
        gain: f32,
        waveform: Waveform,
    ) -> Result<SourceHandle, BackendError> {
        let handle = SourceHandle(self.fresh_handle());
        let frequency = frequency.clamp(MIN_FREQUENCY, MAX_FREQUENCY);
        let osc = Oscillator::new(frequency, waveform, self.sample_rate);

        let mut rack = self.rack.lock().unwrap();
        if rack.sources.len() >= SOURCE_CAPACITY {
            return Err(BackendError::SourcesExhausted {
                capacity: SOURCE_CAPACITY,
            });
        }
        rack.sources.insert(
            handle,
            SourceLane {
                osc,
                gain,
                envelope: None,
                started: false,
            },
        );
        Ok(handle)
    }

    fn start_source(&mut self, handle: SourceHandle) {
        let mut rack = self.rack.lock().unwrap();
        if let Some(lane) = rack.sources.get_mut(&handle) {
            lane.started = true;
        }
    }

    fn dispose_source(&mut self, handle: SourceHandle) {
        self.rack.lock().unwrap().sources.remove(&handle);
    }

    fn create_envelope(
        &mut self,
        _timing: EnvelopeTiming,
    ) -> Result<EnvelopeHandle, BackendError> {
        let handle = EnvelopeHandle(self.fresh_handle());
        let mut rack = self.rack.lock().unwrap();
        if rack.envelopes.len() >= ENVELOPE_CAPACITY {
            return Err(BackendError::EnvelopesExhausted {
                capacity: ENVELOPE_CAPACITY,
            });
        }
        rack.envelopes
            .insert(handle, LinearRamp::new(0.0, self.sample_rate));
        Ok(handle)
    }

    fn set_gain(&mut self, handle: EnvelopeHandle, value: f32) {
        let mut rack = self.rack.lock().unwrap();
        if let Some(ramp) = rack.envelopes.get_mut(&handle) {
            ramp.set_immediate(value);
        }
    }

    fn ramp_gain(&mut self, handle: EnvelopeHandle, target: f32, seconds: f32) {
        let mut rack = self.rack.lock().unwrap();
        if let Some(ramp) = rack.envelopes.get_mut(&handle) {
            ramp.ramp_to(target, seconds);
        }
    }

    fn dispose_envelope(&mut self, handle: EnvelopeHandle) {
        self.rack.lock().unwrap().envelopes.remove(&handle);
    }

    fn connect(&mut self, source: SourceHandle, envelope: EnvelopeHandle) {
        let mut rack = self.rack.lock().unwrap();
        if let Some(lane) = rack.sources.get_mut(&source) {
            lane.envelope = Some(envelope);
        }
    }

    fn schedule(&mut self, delay_seconds: f64, task: ScheduledTask) {
        self.tasks.push(self.now() + delay_seconds, task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 1_000.0;

    fn rack_with_lane(started: bool, level: f32) -> Rack {
        let mut rack = Rack::new();
        let env = EnvelopeHandle(0);
        let mut ramp = LinearRamp::new(0.0, SAMPLE_RATE);
        ramp.set_immediate(level);
        rack.envelopes.insert(env, ramp);
        rack.sources.insert(
            SourceHandle(1),
            SourceLane {
                osc: Oscillator::new(250.0, Waveform::Sine, SAMPLE_RATE),
                gain: 0.5,
                envelope: Some(env),
                started,
            },
        );
        rack
    }

    #[test]
    fn unstarted_lanes_stay_silent() {
        let mut rack = rack_with_lane(false, 1.0);
        let mut block = [1.0f32; 64];
        rack.render(&mut block);
        assert!(block.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn started_lane_renders_through_its_envelope() {
        let mut rack = rack_with_lane(true, 1.0);
        let mut block = [0.0f32; 64];
        rack.render(&mut block);
        assert!(block.iter().any(|&s| s.abs() > 0.1));
        // Source gain of 0.5 bounds the mix.
        assert!(block.iter().all(|&s| s.abs() <= 0.5));
    }

    #[test]
    fn zero_envelope_level_mutes_a_started_lane() {
        let mut rack = rack_with_lane(true, 0.0);
        let mut block = [0.0f32; 64];
        rack.render(&mut block);
        assert!(block.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn disconnected_lane_is_silent() {
        let mut rack = rack_with_lane(true, 1.0);
        rack.sources.get_mut(&SourceHandle(1)).unwrap().envelope = None;
        let mut block = [0.0f32; 64];
        rack.render(&mut block);
        assert!(block.iter().all(|&s| s == 0.0));
    }
}
