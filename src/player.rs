//! Non-blocking playback state machine.
//!
//! The caller polls [`Player::tick`] with the current time. Each tick either
//! keeps holding the current note, emits the next one, or finishes the
//! song. Nothing here sleeps.

use log::{debug, info, warn};

use crate::decoder::Note;
use crate::error::{Result, RtttlError};
use crate::output::ToneOutput;
use crate::song::Song;

/// Volume passed by [`Player::load`].
pub const DEFAULT_VOLUME: u8 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    /// Started, next tick emits a note.
    Playing,
    /// A note is sounding until `until` (ms).
    Holding { until: u64 },
}

/// What a call to [`Player::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Not playing; nothing happened.
    Idle,
    /// Still inside the current note's hold window.
    Holding,
    /// A new note was sent to the output.
    Note(Note),
    /// The last note ended; output silenced, cursor left at the end.
    Finished,
}

impl Tick {
    pub fn is_playing(&self) -> bool {
        matches!(self, Tick::Holding | Tick::Note(_))
    }
}

pub struct Player<'a, O> {
    output: O,
    song: Option<Song<'a>>,
    state: PlaybackState,
    volume: u8,
}

impl<'a, O: ToneOutput> Player<'a, O> {
    pub fn new(output: O) -> Self {
        Self {
            output,
            song: None,
            state: PlaybackState::Idle,
            volume: DEFAULT_VOLUME,
        }
    }

    pub fn load(&mut self, text: &'a str) -> Result<()> {
        self.load_with_volume(text, DEFAULT_VOLUME)
    }

    /// Replace the current song. Playback stops and does not resume until
    /// [`Player::start`].
    ///
    /// `volume` is stored but the output always runs at a fixed duty cycle.
    pub fn load_with_volume(&mut self, text: &'a str, volume: u8) -> Result<()> {
        self.song = None;
        self.state = PlaybackState::Idle;
        self.volume = volume;
        self.output.silence()?;

        let song = Song::parse(text)?;
        let header = song.header();
        info!(
            "loaded \"{}\": d={} o={} b={} (whole note {} ms)",
            song.name(),
            header.default_duration,
            header.default_octave,
            header.bpm,
            header.whole_note_ms
        );
        self.song = Some(song);
        Ok(())
    }

    /// Begin playback. A song that already played to the end starts over.
    pub fn start(&mut self) -> Result<()> {
        let Some(song) = self.song.as_mut() else {
            return Err(RtttlError::NoSongLoaded);
        };
        if self.state == PlaybackState::Idle {
            if song.is_finished() {
                song.rewind();
            }
            self.state = PlaybackState::Playing;
        }
        Ok(())
    }

    pub fn tick(&mut self, now_ms: u64) -> Result<Tick> {
        match self.state {
            PlaybackState::Idle => return Ok(Tick::Idle),
            PlaybackState::Holding { until } if now_ms < until => return Ok(Tick::Holding),
            _ => {}
        }

        let Some(song) = self.song.as_mut() else {
            self.state = PlaybackState::Idle;
            return Ok(Tick::Idle);
        };

        let note = match song.next_note() {
            None => {
                info!("finished \"{}\"", song.name());
                self.state = PlaybackState::Idle;
                self.output.silence()?;
                return Ok(Tick::Finished);
            }
            Some(Ok(note)) => note,
            Some(Err(e)) => {
                warn!("stopping \"{}\": {e}", song.name());
                self.halt();
                self.output.silence()?;
                return Err(e);
            }
        };

        if let Err(e) = self.emit(&note) {
            warn!("tone output failed, stopping: {e}");
            self.halt();
            return Err(e);
        }
        self.state = PlaybackState::Holding {
            until: now_ms + note.hold_ms() as u64,
        };
        Ok(Tick::Note(note))
    }

    fn emit(&mut self, note: &Note) -> Result<()> {
        self.output.silence()?;
        if !note.is_rest() {
            self.output.set_tone(note.frequency_hz)?;
        }
        debug!(
            "{} Hz for {} ms (pitch {}, octave {})",
            note.frequency_hz, note.duration_ms, note.pitch, note.octave
        );
        Ok(())
    }

    fn halt(&mut self) {
        self.state = PlaybackState::Idle;
        if let Some(song) = self.song.as_mut() {
            song.rewind();
        }
    }

    /// Silence immediately and rewind so the same song can be started again.
    pub fn stop(&mut self) -> Result<()> {
        if !self.is_playing() {
            return Ok(());
        }
        self.halt();
        self.output.silence()?;
        Ok(())
    }

    pub fn is_playing(&self) -> bool {
        self.state != PlaybackState::Idle
    }

    pub fn is_done(&self) -> bool {
        !self.is_playing()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn song(&self) -> Option<&Song<'a>> {
        self.song.as_ref()
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn output(&self) -> &O {
        &self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Event {
        Tone(u32),
        Silence,
    }

    #[derive(Default)]
    struct Recorder {
        events: Vec<Event>,
        fail_tones: bool,
    }

    impl ToneOutput for Recorder {
        fn set_tone(&mut self, frequency_hz: u32) -> anyhow::Result<()> {
            if self.fail_tones {
                anyhow::bail!("timer refused {frequency_hz} Hz");
            }
            self.events.push(Event::Tone(frequency_hz));
            Ok(())
        }

        fn silence(&mut self) -> anyhow::Result<()> {
            self.events.push(Event::Silence);
            Ok(())
        }
    }

    const EXAMPLE: &str = "test:d=4,o=5,b=120:c,8g,4p";

    #[test]
    fn starts_idle() {
        let mut player = Player::new(Recorder::default());
        assert!(player.is_done());
        assert_eq!(player.tick(0).unwrap(), Tick::Idle);
        assert!(matches!(player.start(), Err(RtttlError::NoSongLoaded)));
    }

    #[test]
    fn load_does_not_start() {
        let mut player = Player::new(Recorder::default());
        player.load(EXAMPLE).unwrap();
        assert_eq!(player.volume(), DEFAULT_VOLUME);
        assert_eq!(player.state(), PlaybackState::Idle);
        assert_eq!(player.tick(0).unwrap(), Tick::Idle);
        assert_eq!(player.output().events, [Event::Silence]);
    }

    #[test]
    fn example_song_timeline() {
        let mut player = Player::new(Recorder::default());
        player.load(EXAMPLE).unwrap();
        player.start().unwrap();
        assert_eq!(player.state(), PlaybackState::Playing);

        let Tick::Note(c) = player.tick(0).unwrap() else {
            panic!("expected a note");
        };
        assert_eq!((c.frequency_hz, c.duration_ms), (523, 250));
        assert_eq!(player.state(), PlaybackState::Holding { until: 251 });

        assert_eq!(player.tick(250).unwrap(), Tick::Holding);

        let Tick::Note(g) = player.tick(251).unwrap() else {
            panic!("expected a note");
        };
        assert_eq!((g.frequency_hz, g.duration_ms), (784, 125));
        assert_eq!(player.state(), PlaybackState::Holding { until: 377 });

        let Tick::Note(p) = player.tick(377).unwrap() else {
            panic!("expected a rest");
        };
        assert!(p.is_rest());
        // no +1 guard on rests
        assert_eq!(player.state(), PlaybackState::Holding { until: 627 });

        assert_eq!(player.tick(626).unwrap(), Tick::Holding);
        assert_eq!(player.tick(627).unwrap(), Tick::Finished);
        assert!(player.is_done());
        assert_eq!(player.tick(10_000).unwrap(), Tick::Idle);

        assert_eq!(
            player.output().events,
            [
                Event::Silence, // load
                Event::Silence,
                Event::Tone(523),
                Event::Silence,
                Event::Tone(784),
                Event::Silence, // rest
                Event::Silence, // finished
            ]
        );
    }

    #[test]
    fn stop_silences_and_rewinds() {
        let mut player = Player::new(Recorder::default());
        player.load(EXAMPLE).unwrap();
        player.start().unwrap();
        player.tick(0).unwrap();
        player.tick(251).unwrap();

        player.stop().unwrap();
        assert!(player.is_done());
        assert_eq!(player.output().events.last(), Some(&Event::Silence));
        let song = player.song().unwrap();
        assert_eq!(song.cursor(), song.header().note_data_start);

        // second stop is a no-op
        let n = player.output().events.len();
        player.stop().unwrap();
        assert_eq!(player.output().events.len(), n);

        player.start().unwrap();
        let Tick::Note(first) = player.tick(1_000).unwrap() else {
            panic!("expected a note");
        };
        assert_eq!(first.frequency_hz, 523);
    }

    #[test]
    fn start_while_holding_keeps_hold() {
        let mut player = Player::new(Recorder::default());
        player.load(EXAMPLE).unwrap();
        player.start().unwrap();
        player.tick(0).unwrap();
        player.start().unwrap();
        assert_eq!(player.tick(10).unwrap(), Tick::Holding);
    }

    #[test]
    fn finish_leaves_cursor_at_end_and_start_replays() {
        let text = "x:b=120:c";
        let mut player = Player::new(Recorder::default());
        player.load(text).unwrap();
        player.start().unwrap();
        let first = player.tick(0).unwrap();
        assert!(first.is_playing());
        assert_eq!(player.tick(1_000).unwrap(), Tick::Finished);
        assert!(!Tick::Finished.is_playing());

        let song = player.song().unwrap();
        assert!(song.is_finished());
        assert_eq!(song.cursor(), text.len());

        player.start().unwrap();
        assert_eq!(player.tick(2_000).unwrap(), first);
    }

    #[test]
    fn example_song_ends_at_end_of_text() {
        let mut player = Player::new(Recorder::default());
        player.load(EXAMPLE).unwrap();
        player.start().unwrap();
        let mut now = 0;
        while player.tick(now).unwrap() != Tick::Finished {
            now += 1;
        }
        assert_eq!(player.state(), PlaybackState::Idle);
        assert_eq!(player.song().unwrap().cursor(), EXAMPLE.len());
    }

    #[test]
    fn reload_resets_state() {
        let mut player = Player::new(Recorder::default());
        player.load(EXAMPLE).unwrap();
        player.start().unwrap();
        player.tick(0).unwrap();

        player.load_with_volume("other:b=120:e", 3).unwrap();
        assert!(player.is_done());
        assert_eq!(player.volume(), 3);
        assert_eq!(player.song().unwrap().name(), "other");
    }

    #[test]
    fn failed_load_leaves_no_song() {
        let mut player = Player::new(Recorder::default());
        player.load(EXAMPLE).unwrap();
        let err = player.load("bad:d=4,o=5,b=0:c").unwrap_err();
        assert!(matches!(err, RtttlError::ZeroOrInvalidTempo { bpm: 0 }));
        assert!(player.song().is_none());
        assert!(matches!(player.start(), Err(RtttlError::NoSongLoaded)));
    }

    #[test]
    fn decode_error_fails_closed() {
        let mut player = Player::new(Recorder::default());
        player.load("x:b=120:c,c9,d").unwrap();
        player.start().unwrap();
        player.tick(0).unwrap();

        let err = player.tick(1_000).unwrap_err();
        assert!(matches!(err, RtttlError::NoteOutOfRange { octave: 9, .. }));
        assert!(player.is_done());
        assert_eq!(player.output().events.last(), Some(&Event::Silence));
        let song = player.song().unwrap();
        assert_eq!(song.cursor(), song.header().note_data_start);
    }

    #[test]
    fn output_errors_propagate() {
        let mut player = Player::new(Recorder {
            fail_tones: true,
            ..Default::default()
        });
        player.load(EXAMPLE).unwrap();
        player.start().unwrap();
        let err = player.tick(0).unwrap_err();
        assert!(matches!(err, RtttlError::Output(_)));
        assert!(player.is_done());
    }
}
