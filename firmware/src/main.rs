mod buzzer;

use std::time::Duration;

use anyhow::{Context, Result};
use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::log::EspLogger;
use log::{error, info};

use buzzer::LedcBuzzer;
use rtttl::{worker, SystemClock, DEFAULT_VOLUME};

// ── Configuration ──────────────────────────────────────────────────────────

/// Tetris Theme A (Korobeiniki).
const KOROBEINIKI: &str = "korobeiniki:d=4,o=5,b=160:e6,8b,8c6,8d6,16e6,16d6,8c6,8b,a,8a,8c6,e6,8d6,8c6,b,8b,8c6,d6,e6,c6,a,2a,8p,d6,8f6,a6,8g6,8f6,e6,8e6,8c6,e6,8d6,8c6,b,8b,8c6,d6,e6,c6,a,a";

/// Song to play, overridable with `RTTTL_SONG` in `.env`.
const SONG: &str = match option_env!("RTTTL_SONG") {
    Some(song) => song,
    None => KOROBEINIKI,
};

/// Number of times to play the song, `RTTTL_REPEAT` in `.env`.
const REPEAT: Option<&str> = option_env!("RTTTL_REPEAT");

/// How often the playback thread checks whether the current note is over.
const POLL_INTERVAL: Duration = Duration::from_millis(2);

/// Pause between repeats.
const REPEAT_GAP_MS: u32 = 2000;

// ── Main ───────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ESP-IDF boilerplate
    esp_idf_svc::sys::link_patches();
    EspLogger::initialize_default();

    info!("rtttl player starting up");

    let repeat: u32 = match REPEAT {
        Some(n) => n.parse().context("RTTTL_REPEAT must be a number")?,
        None => 1,
    };

    let peripherals = Peripherals::take()?;
    let buzzer = LedcBuzzer::new(
        peripherals.ledc.timer0,
        peripherals.ledc.channel0,
        peripherals.pins.gpio19,
    )?;

    let player = worker::spawn(buzzer, SystemClock::new(), POLL_INTERVAL)?;
    player.load(SONG, DEFAULT_VOLUME)?;

    for round in 1..=repeat {
        info!("playing round {round}/{repeat}");
        if let Err(e) = player.start() {
            error!("could not start playback: {e}");
            break;
        }
        while player.is_playing() {
            FreeRtos::delay_ms(50);
        }
        if let Some(e) = player.take_error() {
            error!("playback stopped early: {e}");
            break;
        }
        if round < repeat {
            FreeRtos::delay_ms(REPEAT_GAP_MS);
        }
    }

    info!("playback complete");
    drop(player);

    loop {
        FreeRtos::delay_ms(1000);
    }
}
