//! Note token decoder.
//!
//! Token grammar: `[duration]pitch[#][.][octave][.][,]`. Unknown pitch
//! letters decode as a rest; a token that does not end in `,` or the end of
//! the text is rejected.

use crate::error::{Result, RtttlError};
use crate::header::Header;
use crate::notes;
use crate::scanner::{Number, Scanner};

/// One decoded note. Lives for a single scheduling step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Note {
    /// 0 = rest, 1 = C ... 12 = B. A sharp adds one, so B# is 13.
    pub pitch: u8,
    pub sharp: bool,
    pub dotted: bool,
    /// Octave as written, or the header default.
    pub octave: u8,
    pub duration_ms: u32,
    /// 0 for rests.
    pub frequency_hz: u32,
}

impl Note {
    pub fn is_rest(&self) -> bool {
        self.pitch == 0
    }

    /// How long the player waits before the next note. Tones get one extra
    /// millisecond so a fast poller cannot cut them short; rests do not.
    pub fn hold_ms(&self) -> u32 {
        if self.is_rest() {
            self.duration_ms
        } else {
            self.duration_ms + 1
        }
    }
}

fn pitch_of(letter: u8) -> u8 {
    match letter {
        b'c' => 1,
        b'd' => 3,
        b'e' => 5,
        b'f' => 6,
        b'g' => 8,
        b'a' => 10,
        b'b' => 12,
        _ => 0,
    }
}

/// Decode the note token at `cursor`. Returns the note and the offset of
/// the following token.
pub fn decode_next(text: &str, cursor: usize, header: &Header) -> Result<(Note, usize)> {
    let mut s = Scanner::new(text, cursor);
    s.skip_whitespace();
    let start = s.pos();

    let divisor = match s.number() {
        Number::Value(n) if n > 0 => n,
        Number::Overflow => {
            return Err(RtttlError::MalformedNote {
                position: start,
                reason: "duration out of range",
            })
        }
        _ => header.default_duration,
    };
    let mut duration_ms = header.whole_note_ms / divisor;

    let Some(letter) = s.bump() else {
        return Err(RtttlError::MalformedNote {
            position: s.pos(),
            reason: "expected pitch letter",
        });
    };
    let mut pitch = pitch_of(letter);

    // a sharp rest is still a rest
    let sharp = s.eat(b'#');
    if sharp && pitch != 0 {
        pitch += 1;
    }

    let mut dotted = s.eat(b'.');
    if dotted {
        duration_ms += duration_ms / 2;
    }

    let octave = s.digit().unwrap_or(header.default_octave);

    if !dotted && s.eat(b'.') {
        dotted = true;
        duration_ms += duration_ms / 2;
    }

    if !s.eat(b',') && !s.at_end() {
        return Err(RtttlError::MalformedNote {
            position: s.pos(),
            reason: "expected ',' between notes",
        });
    }

    let frequency_hz =
        notes::frequency(octave, pitch).ok_or(RtttlError::NoteOutOfRange {
            position: start,
            octave,
            pitch,
        })?;

    let note = Note {
        pitch,
        sharp,
        dotted,
        octave,
        duration_ms,
        frequency_hz,
    };
    Ok((note, s.pos()))
}
