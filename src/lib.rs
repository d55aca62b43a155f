//! RTTTL ringtone parsing and non-blocking playback.
//!
//! ```
//! use rtttl::{Player, Tick, ToneOutput};
//!
//! struct Piezo;
//!
//! impl ToneOutput for Piezo {
//!     fn set_tone(&mut self, _hz: u32) -> anyhow::Result<()> { Ok(()) }
//!     fn silence(&mut self) -> anyhow::Result<()> { Ok(()) }
//! }
//!
//! let mut player = Player::new(Piezo);
//! player.load("beep:d=8,o=6,b=120:c,p,c").unwrap();
//! player.start().unwrap();
//!
//! let mut now = 0;
//! while player.tick(now).unwrap() != Tick::Finished {
//!     now += 1;
//! }
//! assert!(player.is_done());
//! ```

pub mod decoder;
pub mod error;
pub mod header;
pub mod notes;
pub mod output;
pub mod player;
mod scanner;
pub mod song;
pub mod worker;

pub use decoder::{decode_next, Note};
pub use error::{Result, RtttlError};
pub use header::{parse_header, Header};
pub use output::{Clock, SystemClock, ToneOutput};
pub use player::{PlaybackState, Player, Tick, DEFAULT_VOLUME};
pub use song::{Notes, Song};
pub use worker::PlayerHandle;
