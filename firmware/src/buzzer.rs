//! Piezo buzzer driver using the ESP32 LEDC (PWM) peripheral.
//!
//! A passive piezo needs a square wave to produce sound. The timer's
//! frequency follows the note and the channel runs at a fixed 50% duty;
//! silence is 0% duty.

use esp_idf_svc::hal::gpio::OutputPin;
use esp_idf_svc::hal::ledc::{
    config::TimerConfig, LedcDriver, LedcTimerDriver, LowSpeed, Resolution, SpeedMode, CHANNEL0,
    TIMER0,
};
use esp_idf_svc::hal::peripheral::Peripheral;
use esp_idf_svc::hal::prelude::*;
use rtttl::ToneOutput;

/// Frequency the timer is configured with before the first note (C7).
const IDLE_FREQUENCY_HZ: u32 = 2093;

pub struct LedcBuzzer<'d, S: SpeedMode> {
    timer: LedcTimerDriver<'d, S>,
    channel: LedcDriver<'d>,
    tone_duty: u32,
}

impl<'d> LedcBuzzer<'d, LowSpeed> {
    /// Takes ownership of the LEDC timer0, channel0, and the buzzer GPIO pin.
    /// The channel starts silent.
    pub fn new(
        timer: TIMER0,
        channel: CHANNEL0,
        pin: impl Peripheral<P = impl OutputPin> + 'd,
    ) -> anyhow::Result<Self> {
        let timer = LedcTimerDriver::new(
            timer,
            &TimerConfig::default()
                .frequency(IDLE_FREQUENCY_HZ.Hz().into())
                .resolution(Resolution::Bits10),
        )?;

        let mut channel = LedcDriver::new(channel, &timer, pin)?;
        channel.set_duty(0)?;
        let tone_duty = channel.get_max_duty() / 2;

        Ok(Self {
            timer,
            channel,
            tone_duty,
        })
    }
}

impl<S: SpeedMode> ToneOutput for LedcBuzzer<'_, S> {
    fn set_tone(&mut self, frequency_hz: u32) -> anyhow::Result<()> {
        self.timer.set_frequency(Hertz(frequency_hz))?;
        self.channel.set_duty(self.tone_duty)?;
        Ok(())
    }

    fn silence(&mut self) -> anyhow::Result<()> {
        self.channel.set_duty(0)?;
        Ok(())
    }
}
