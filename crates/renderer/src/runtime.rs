use std::time::Instant;

/// Snapshot of the clock taken once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSample {
    /// Seconds elapsed since the source was last reset.
    pub seconds: f64,
}

impl TimeSample {
    pub fn new(seconds: f64) -> Self {
        Self { seconds }
    }
}

/// Abstraction over where frame timestamps originate from.
pub trait TimeSource {
    /// Moves the origin to "now" so the next sample starts near zero.
    fn reset(&mut self);
    /// Reads the current time relative to the origin.
    fn sample(&mut self) -> TimeSample;
}

/// Time source backed by the system monotonic clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemTimeSource {
    origin: Instant,
}

impl SystemTimeSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl TimeSource for SystemTimeSource {
    fn reset(&mut self) {
        self.origin = Instant::now();
    }

    fn sample(&mut self) -> TimeSample {
        TimeSample::new(self.origin.elapsed().as_secs_f64())
    }
}
