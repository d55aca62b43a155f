//! Error type shared by the header parser, the note decoder and the player.
//!
//! Byte positions are offsets into the song text, so a caller can point at
//! the offending character.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RtttlError {
    /// The `name:d=N,o=N,b=NNN:` section could not be read.
    #[error("malformed header at byte {position}: {reason}")]
    MalformedHeader {
        position: usize,
        reason: &'static str,
    },

    /// `b=` was 0, or so large that a whole note rounds down to 0 ms.
    #[error("invalid tempo b={bpm}")]
    ZeroOrInvalidTempo { bpm: u32 },

    /// `start()` was called before a song was loaded.
    #[error("no song loaded")]
    NoSongLoaded,

    /// A note token did not follow `[duration]pitch[#][.][octave][,]`.
    #[error("malformed note at byte {position}: {reason}")]
    MalformedNote {
        position: usize,
        reason: &'static str,
    },

    /// The note decoded fine but lies outside the frequency table.
    #[error("note at byte {position} is out of range (octave {octave}, pitch {pitch})")]
    NoteOutOfRange {
        position: usize,
        octave: u8,
        pitch: u8,
    },

    /// The tone peripheral refused an update.
    #[error(transparent)]
    Output(#[from] anyhow::Error),
}

pub type Result<T, E = RtttlError> = std::result::Result<T, E>;
