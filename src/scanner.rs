//! Bounds-checked byte cursor over song text.

pub(crate) struct Scanner<'a> {
    bytes: &'a [u8],
    pos: usize,
}

/// Result of reading a run of decimal digits.
pub(crate) enum Number {
    Absent,
    Value(u32),
    Overflow,
}

impl<'a> Scanner<'a> {
    pub fn new(text: &'a str, pos: usize) -> Self {
        Self {
            bytes: text.as_bytes(),
            pos: pos.min(text.len()),
        }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    pub fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    pub fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    /// Consume `b` if it is next.
    pub fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Advance past the first `b`. Returns false (leaving the cursor at the
    /// end) when there is none.
    pub fn skip_past(&mut self, b: u8) -> bool {
        match self.bytes[self.pos..].iter().position(|&c| c == b) {
            Some(offset) => {
                self.pos += offset + 1;
                true
            }
            None => {
                self.pos = self.bytes.len();
                false
            }
        }
    }

    pub fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    /// Single decimal digit, if one is next.
    pub fn digit(&mut self) -> Option<u8> {
        let b = self.peek().filter(u8::is_ascii_digit)?;
        self.pos += 1;
        Some(b - b'0')
    }

    /// Run of decimal digits. All digits are consumed even on overflow.
    pub fn number(&mut self) -> Number {
        let mut value: Option<u32> = Some(0);
        let mut any = false;
        while let Some(d) = self.digit() {
            any = true;
            value = value
                .and_then(|v| v.checked_mul(10))
                .and_then(|v| v.checked_add(d as u32));
        }
        match (any, value) {
            (false, _) => Number::Absent,
            (true, Some(v)) => Number::Value(v),
            (true, None) => Number::Overflow,
        }
    }
}
