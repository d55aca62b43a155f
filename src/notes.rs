//! Equal-tempered frequency table, C3 through B8, rounded to the nearest Hz.

/// Added to the written octave before indexing. With the table starting at
/// C3 this makes `(octave + OCTAVE_OFFSET - 4) * 12` the start of that
/// octave's row.
pub const OCTAVE_OFFSET: u8 = 1;

/// Lowest and highest octave the table can sound.
pub const MIN_OCTAVE: u8 = 3;
pub const MAX_OCTAVE: u8 = 8;

/// Index 0 is the rest. Indices 1..=12 are C3..B3, 13..=24 C4..B4, and so on.
#[rustfmt::skip]
pub const NOTES: [u32; 73] = [
    0,
    // C     C#    D     D#    E     F     F#    G     G#    A     A#    B
    131,  139,  147,  156,  165,  175,  185,  196,  208,  220,  233,  247,  // 3
    262,  277,  294,  311,  330,  349,  370,  392,  415,  440,  466,  494,  // 4
    523,  554,  587,  622,  659,  698,  740,  784,  831,  880,  932,  988,  // 5
    1047, 1109, 1175, 1245, 1319, 1397, 1480, 1568, 1661, 1760, 1865, 1976, // 6
    2093, 2217, 2349, 2489, 2637, 2794, 2960, 3136, 3322, 3520, 3729, 3951, // 7
    4186, 4435, 4699, 4978, 5274, 5588, 5920, 6272, 6645, 7040, 7459, 7902, // 8
];

/// Table index for a written octave and a pitch value (1 = C ... 12 = B,
/// 13 = B# which spills into the next octave's C).
///
/// Returns `None` when the note falls outside the table. Pitch 0 (rest) has
/// no index.
pub fn index(octave: u8, pitch: u8) -> Option<usize> {
    if pitch == 0 {
        return None;
    }
    let row = (octave as usize + OCTAVE_OFFSET as usize).checked_sub(4)?;
    let idx = row * 12 + pitch as usize;
    (idx < NOTES.len()).then_some(idx)
}

/// Frequency in Hz, or `None` when the note is not in the table.
/// A rest is always 0 Hz.
pub fn frequency(octave: u8, pitch: u8) -> Option<u32> {
    if pitch == 0 {
        return Some(0);
    }
    index(octave, pitch).map(|i| NOTES[i])
}
