//! RTTTL header: `name:d=N,o=N,b=NNN:`.
//!
//! Fields are optional but order-sensitive. Out-of-range `d=` and `o=`
//! values fall back to the built-in defaults; anything outside the grammar
//! is an error.

use crate::error::{Result, RtttlError};
use crate::scanner::{Number, Scanner};

pub const DEFAULT_DURATION: u32 = 4;
pub const DEFAULT_OCTAVE: u8 = 6;
pub const DEFAULT_BPM: u32 = 63;

/// Parsed header values plus where the note list starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Whole-note divisor used when a note has no duration (4 = quarter).
    pub default_duration: u32,
    /// Octave used when a note has no octave digit. Always in 3..=7.
    pub default_octave: u8,
    /// Quarter notes per minute.
    pub bpm: u32,
    /// `(60000 / bpm) * 2`, truncating.
    pub whole_note_ms: u32,
    /// Byte offset of the first note token.
    pub note_data_start: usize,
}

fn malformed(s: &Scanner<'_>, reason: &'static str) -> RtttlError {
    RtttlError::MalformedHeader {
        position: s.pos(),
        reason,
    }
}

/// Consume `key=`. Returns false without moving if `key` is not next.
fn field(s: &mut Scanner<'_>, key: u8) -> Result<bool> {
    if !s.eat(key) {
        return Ok(false);
    }
    if !s.eat(b'=') {
        return Err(malformed(s, "expected '=' after field name"));
    }
    Ok(true)
}

fn separator(s: &mut Scanner<'_>) -> Result<()> {
    match s.peek() {
        None => Ok(()),
        Some(b',') | Some(b':') => {
            s.bump();
            Ok(())
        }
        Some(_) => Err(malformed(s, "expected ',' or ':' after field")),
    }
}

pub fn parse_header(text: &str) -> Result<Header> {
    let mut s = Scanner::new(text, 0);
    let mut default_duration = DEFAULT_DURATION;
    let mut default_octave = DEFAULT_OCTAVE;
    let mut bpm = DEFAULT_BPM;

    if !s.skip_past(b':') {
        return Err(malformed(&s, "missing ':' after song name"));
    }

    if field(&mut s, b'd')? {
        match s.number() {
            Number::Value(n) if n > 0 => default_duration = n,
            Number::Overflow => return Err(malformed(&s, "duration out of range")),
            _ => {}
        }
        separator(&mut s)?;
    }

    if field(&mut s, b'o')? {
        let Some(octave) = s.digit() else {
            return Err(malformed(&s, "expected octave digit"));
        };
        if (3..=7).contains(&octave) {
            default_octave = octave;
        }
        separator(&mut s)?;
    }

    if field(&mut s, b'b')? {
        bpm = match s.number() {
            Number::Value(n) => n,
            Number::Absent => return Err(malformed(&s, "expected tempo digits")),
            Number::Overflow => return Err(malformed(&s, "tempo out of range")),
        };
        separator(&mut s)?;
    }

    // Short or empty header ("name::notes", "name:d=8:notes")
    s.eat(b':');

    if bpm == 0 {
        return Err(RtttlError::ZeroOrInvalidTempo { bpm });
    }
    let whole_note_ms = (60_000 / bpm) * 2;
    if whole_note_ms == 0 {
        return Err(RtttlError::ZeroOrInvalidTempo { bpm });
    }

    Ok(Header {
        default_duration,
        default_octave,
        bpm,
        whole_note_ms,
        note_data_start: s.pos(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_header() {
        let h = parse_header("test:d=4,o=5,b=120:c,8g,4p").unwrap();
        assert_eq!(h.default_duration, 4);
        assert_eq!(h.default_octave, 5);
        assert_eq!(h.bpm, 120);
        assert_eq!(h.whole_note_ms, 1000);
        assert_eq!(h.note_data_start, 19);
    }

    #[test]
    fn defaults_when_fields_absent() {
        let h = parse_header("x::c").unwrap();
        assert_eq!(h.default_duration, DEFAULT_DURATION);
        assert_eq!(h.default_octave, DEFAULT_OCTAVE);
        assert_eq!(h.bpm, DEFAULT_BPM);
        // 60000 / 63 = 952
        assert_eq!(h.whole_note_ms, 1904);
        assert_eq!(h.note_data_start, 3);
    }

    #[test]
    fn partial_header_skips_closing_colon() {
        let h = parse_header("x:d=8:c").unwrap();
        assert_eq!(h.default_duration, 8);
        assert_eq!(h.bpm, DEFAULT_BPM);
        assert_eq!(&"x:d=8:c"[h.note_data_start..], "c");

        let h = parse_header("x:o=4,b=200:c").unwrap();
        assert_eq!(h.default_duration, DEFAULT_DURATION);
        assert_eq!(h.default_octave, 4);
        assert_eq!(h.whole_note_ms, 600);
    }

    #[test]
    fn tolerant_duration_and_octave() {
        let h = parse_header("x:d=0,o=9,b=100:c").unwrap();
        assert_eq!(h.default_duration, DEFAULT_DURATION);
        assert_eq!(h.default_octave, DEFAULT_OCTAVE);

        let h = parse_header("x:d=,o=2,b=100:c").unwrap();
        assert_eq!(h.default_duration, DEFAULT_DURATION);
        assert_eq!(h.default_octave, DEFAULT_OCTAVE);
    }

    #[test]
    fn name_is_ignored() {
        let text = "The Simpsons, 1989:d=4,o=5,b=160:c.6";
        let h = parse_header(text).unwrap();
        assert_eq!(h.default_octave, 5);
        assert_eq!(h.bpm, 160);
        assert_eq!(&text[h.note_data_start..], "c.6");
    }

    #[test]
    fn missing_colon() {
        let err = parse_header("no header here").unwrap_err();
        assert!(matches!(err, RtttlError::MalformedHeader { position: 14, .. }));
    }

    #[test]
    fn field_without_equals() {
        let err = parse_header("x:d4,o=5:c").unwrap_err();
        assert!(matches!(err, RtttlError::MalformedHeader { position: 3, .. }));
    }

    #[test]
    fn non_digit_octave() {
        let err = parse_header("x:o=x,b=100:c").unwrap_err();
        assert!(matches!(err, RtttlError::MalformedHeader { .. }));
    }

    #[test]
    fn non_numeric_tempo() {
        let err = parse_header("x:b=fast:c").unwrap_err();
        assert!(matches!(err, RtttlError::MalformedHeader { position: 4, .. }));

        let err = parse_header("x:b=99999999999:c").unwrap_err();
        assert!(matches!(err, RtttlError::MalformedHeader { .. }));
    }

    #[test]
    fn garbage_after_field() {
        let err = parse_header("x:d=4;o=5:c").unwrap_err();
        assert!(matches!(err, RtttlError::MalformedHeader { position: 5, .. }));
    }

    #[test]
    fn zero_tempo() {
        let err = parse_header("x:d=4,o=5,b=0:c").unwrap_err();
        assert!(matches!(err, RtttlError::ZeroOrInvalidTempo { bpm: 0 }));
    }

    #[test]
    fn tempo_too_fast_for_millisecond_resolution() {
        assert!(parse_header("x:b=60000:c").is_ok());
        let err = parse_header("x:b=60001:c").unwrap_err();
        assert!(matches!(err, RtttlError::ZeroOrInvalidTempo { bpm: 60001 }));
    }

    #[test]
    fn header_only() {
        let h = parse_header("silence:d=4,o=5,b=100").unwrap();
        assert_eq!(h.note_data_start, 21);
    }
}
