//! Position tracking for the keystroke log tokenizer
//!
//! The cursor is advanced once per consumed byte and decides where a bracketed
//! tag may legally begin: only at stream start or right after a newline.

/// A point in the input stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// Line number (1-based)
    pub line: u32,
    /// Column within the line (0-based)
    pub col: u32,
    /// Byte offset from stream start
    pub offset: u64,
}

/// Line/column/offset tracker with a "tag allowed" flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    line: u32,
    col: u32,
    offset: u64,
    tag_allowed: bool,
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}

impl Cursor {
    /// Cursor at stream start, where a tag is allowed
    pub fn new() -> Self {
        Self {
            line: 1,
            col: 0,
            offset: 0,
            tag_allowed: true,
        }
    }

    pub fn position(&self) -> Position {
        Position {
            line: self.line,
            col: self.col,
            offset: self.offset,
        }
    }

    pub fn tag_allowed(&self) -> bool {
        self.tag_allowed
    }

    /// Record one consumed byte
    pub fn advance(&mut self, byte: u8) {
        self.offset += 1;
        if byte == b'\n' {
            self.line += 1;
            self.col = 0;
            self.tag_allowed = true;
        } else {
            self.col += 1;
        }
    }

    /// A token-start decision was made for a non-newline byte
    pub fn disarm_tag(&mut self) {
        self.tag_allowed = false;
    }

    /// Let the next byte start a tag again (used for a pushed-back `[`)
    pub fn rearm_tag(&mut self) {
        self.tag_allowed = true;
    }
}
