//! Seams to the tone hardware and the time source.

use std::time::Instant;

/// A single-voice tone generator, e.g. a PWM channel driving a piezo.
pub trait ToneOutput {
    /// Start sounding `frequency_hz`. Never called with 0.
    fn set_tone(&mut self, frequency_hz: u32) -> anyhow::Result<()>;

    fn silence(&mut self) -> anyhow::Result<()>;
}

impl<T: ToneOutput + ?Sized> ToneOutput for &mut T {
    fn set_tone(&mut self, frequency_hz: u32) -> anyhow::Result<()> {
        (**self).set_tone(frequency_hz)
    }

    fn silence(&mut self) -> anyhow::Result<()> {
        (**self).silence()
    }
}

impl<T: ToneOutput + ?Sized> ToneOutput for Box<T> {
    fn set_tone(&mut self, frequency_hz: u32) -> anyhow::Result<()> {
        (**self).set_tone(frequency_hz)
    }

    fn silence(&mut self) -> anyhow::Result<()> {
        (**self).silence()
    }
}

/// Monotonic millisecond clock.
pub trait Clock {
    fn now_millis(&self) -> u64;
}

/// Milliseconds since construction, from [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }
}
