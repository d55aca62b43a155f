use crate::decoder::{decode_next, Note};
use crate::error::Result;
use crate::header::{parse_header, Header};

/// Melody text with its parsed header and a cursor into the note list.
///
/// The cursor only moves forward, except on [`Song::rewind`].
#[derive(Debug, Clone)]
pub struct Song<'a> {
    text: &'a str,
    header: Header,
    cursor: usize,
}

impl<'a> Song<'a> {
    pub fn parse(text: &'a str) -> Result<Self> {
        let header = parse_header(text)?;
        Ok(Self {
            text,
            header,
            cursor: header.note_data_start,
        })
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Everything before the first `:`.
    pub fn name(&self) -> &'a str {
        self.text.split(':').next().unwrap_or_default()
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// True once only whitespace is left.
    pub fn is_finished(&self) -> bool {
        self.text.as_bytes()[self.cursor..]
            .iter()
            .all(u8::is_ascii_whitespace)
    }

    pub fn rewind(&mut self) {
        self.cursor = self.header.note_data_start;
    }

    /// Decode the note at the cursor and advance past it. `None` at the end.
    ///
    /// On error the cursor stays where it was.
    pub fn next_note(&mut self) -> Option<Result<Note>> {
        if self.is_finished() {
            return None;
        }
        Some(
            decode_next(self.text, self.cursor, &self.header).map(|(note, next)| {
                self.cursor = next;
                note
            }),
        )
    }

    /// Iterate the whole note list from the start without touching this
    /// song's cursor.
    pub fn notes(&self) -> Notes<'a> {
        let mut song = self.clone();
        song.rewind();
        Notes { song, failed: false }
    }
}

/// Iterator over decoded notes. Stops after the first error.
pub struct Notes<'a> {
    song: Song<'a>,
    failed: bool,
}

impl Iterator for Notes<'_> {
    type Item = Result<Note>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let item = self.song.next_note()?;
        self.failed = item.is_err();
        Some(item)
    }
}
