//! Linear gain ramp for click-free parameter moves.
//!
//! This is the backend's interpolation primitive: a ramp always departs
//! from the current instantaneous value, never from the previous target,
//! so interrupting an in-flight ramp (release during attack, re-attack
//! during release) cannot produce a discontinuity.

/// Per-sample linear interpolator toward a target value.
#[derive(Debug, Clone)]
pub struct LinearRamp {
    current: f32,
    target: f32,
    step: f32,
    samples_remaining: u32,
    sample_rate: f32,
}

impl LinearRamp {
    pub fn new(initial: f32, sample_rate: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            step: 0.0,
            samples_remaining: 0,
            sample_rate,
        }
    }

    /// Jump to a value with no interpolation.
    pub fn set_immediate(&mut self, value: f32) {
        self.current = value;
        self.target = value;
        self.step = 0.0;
        self.samples_remaining = 0;
    }

    /// Start ramping from the current value toward `target` over `seconds`.
    pub fn ramp_to(&mut self, target: f32, seconds: f32) {
        self.target = target;
        self.samples_remaining = (seconds * self.sample_rate).round().max(1.0) as u32;
        self.step = (target - self.current) / self.samples_remaining as f32;
    }

    /// Advance one sample and return the new value.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        if self.samples_remaining > 0 {
            self.current += self.step;
            self.samples_remaining -= 1;
            if self.samples_remaining == 0 {
                // Land exactly on target; accumulated float error stops here.
                self.current = self.target;
            }
        }
        self.current
    }

    /// The current value without advancing.
    #[inline]
    pub fn value(&self) -> f32 {
        self.current
    }
}
