//! Keystroke log tokenizer
//!
//! Splits the capture agent's log into tokens. Every printable byte is its own
//! token, except that a `[` at stream start or right after a newline opens a
//! bracketed tag such as `[left]` or `[keycount 100 timestamp ...]`, which is
//! captured as a single token up to the closing `]`.
//!
//! Tag capture ends early, and marks the token as chopped, when it hits a
//! newline, end of stream, or the capacity bound. A second `[` inside a tag
//! ends the current token cleanly and is pushed back to start a new tag.
//!
//! The tokenizer never logs. Problems it notices are queued as
//! [`Diagnostic`]s for the caller to drain and report.

use std::fmt;
use std::io::{BufReader, Bytes, Read};

use crate::core::cursor::{Cursor, Position};
use crate::core::error::KeystatError;

/// Default capacity of captured tag text, in bytes
pub const DEFAULT_MAX_TAG_LEN: usize = 63;

const FORM_FEED: u8 = 0x0c;

/// One counted unit of text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Where the token starts
    pub start: Position,
    /// Captured text; tag bytes outside printable ASCII appear as `\xNN`
    pub text: String,
    /// Truncated by the capacity bound or left unterminated
    pub chopped: bool,
}

impl Token {
    fn single(start: Position, byte: u8) -> Self {
        Self {
            start,
            text: char::from(byte).to_string(),
            chopped: false,
        }
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }
}

/// Non-fatal problem found while reading the log
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A byte outside the printable 7-bit range was skipped
    Unprintable { byte: u8, position: Position },
    /// A tag was truncated or never closed; it is still counted
    Chopped { position: Position, text: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::Unprintable { byte, position } => write!(
                f,
                "{}:{}: character {:#04x} is not printable",
                position.line, position.col, byte
            ),
            Diagnostic::Chopped { position, text } => write!(
                f,
                "{}:{}: lost closing bracket, token '{}'",
                position.line, position.col, text
            ),
        }
    }
}

/// Tokenizer settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenizerConfig {
    max_tag_len: usize,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            max_tag_len: DEFAULT_MAX_TAG_LEN,
        }
    }
}

impl TokenizerConfig {
    /// Config with a custom tag capacity; the opening `[` counts toward it
    pub fn with_max_tag_len(max_tag_len: usize) -> Result<Self, KeystatError> {
        if max_tag_len == 0 {
            return Err(KeystatError::InvalidCapacity(max_tag_len));
        }
        Ok(Self { max_tag_len })
    }

    pub fn max_tag_len(&self) -> usize {
        self.max_tag_len
    }
}

/// Capacity-bounded byte accumulator for tag text
#[derive(Debug)]
struct TagBuffer {
    bytes: Vec<u8>,
    capacity: usize,
    overflowed: bool,
}

impl TagBuffer {
    fn new(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity.min(DEFAULT_MAX_TAG_LEN + 1)),
            capacity,
            overflowed: false,
        }
    }

    fn push(&mut self, byte: u8) {
        if self.bytes.len() < self.capacity {
            self.bytes.push(byte);
        } else {
            self.overflowed = true;
        }
    }

    fn into_token(self, start: Position, unterminated: bool) -> Token {
        Token {
            start,
            text: escape_tag_bytes(&self.bytes),
            chopped: unterminated || self.overflowed,
        }
    }
}

/// Render captured tag bytes as text without losing information.
///
/// Printable bytes are kept, `\` becomes `\\` and every other byte becomes
/// `\xNN`, so distinct byte sequences always give distinct keys.
fn escape_tag_bytes(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    for &byte in bytes {
        match byte {
            b'\\' => text.push_str("\\\\"),
            _ if is_printable(byte) => text.push(char::from(byte)),
            _ => text.push_str(&format!("\\x{:02x}", byte)),
        }
    }
    text
}

#[inline]
fn is_printable(byte: u8) -> bool {
    (0x20..=0x7e).contains(&byte)
}

/// Single-pass tokenizer over a keystroke log
pub struct Tokenizer<R: Read> {
    input: Bytes<BufReader<R>>,
    cursor: Cursor,
    pushback: Option<u8>,
    config: TokenizerConfig,
    diagnostics: Vec<Diagnostic>,
}

impl<R: Read> Tokenizer<R> {
    pub fn new(reader: R, config: TokenizerConfig) -> Self {
        Self {
            input: BufReader::new(reader).bytes(),
            cursor: Cursor::new(),
            pushback: None,
            config,
            diagnostics: Vec::new(),
        }
    }

    /// Current cursor state
    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// Take the diagnostics queued since the last drain
    pub fn drain_diagnostics(&mut self) -> std::vec::Drain<'_, Diagnostic> {
        self.diagnostics.drain(..)
    }

    fn next_byte(&mut self) -> Result<Option<u8>, KeystatError> {
        if let Some(byte) = self.pushback.take() {
            return Ok(Some(byte));
        }
        self.input.next().transpose().map_err(KeystatError::Read)
    }

    /// Produce the next token, or `None` at end of stream
    pub fn next_token(&mut self) -> Result<Option<Token>, KeystatError> {
        while let Some(byte) = self.next_byte()? {
            let start = self.cursor.position();
            match byte {
                b'\n' | b'\t' | b'\r' | FORM_FEED => self.cursor.advance(byte),
                _ if !is_printable(byte) => {
                    self.diagnostics.push(Diagnostic::Unprintable {
                        byte,
                        position: start,
                    });
                    self.cursor.advance(byte);
                }
                _ => {
                    let opens_tag = byte == b'[' && self.cursor.tag_allowed();
                    self.cursor.advance(byte);
                    self.cursor.disarm_tag();
                    if opens_tag {
                        return self.capture_tag(start).map(Some);
                    }
                    return Ok(Some(Token::single(start, byte)));
                }
            }
        }
        Ok(None)
    }

    fn capture_tag(&mut self, start: Position) -> Result<Token, KeystatError> {
        let mut buf = TagBuffer::new(self.config.max_tag_len);
        buf.push(b'[');

        loop {
            let Some(byte) = self.next_byte()? else {
                return Ok(buf.into_token(start, true));
            };
            match byte {
                b'[' => {
                    // Left unconsumed: it opens the next tag.
                    self.pushback = Some(byte);
                    self.cursor.rearm_tag();
                    return Ok(buf.into_token(start, false));
                }
                b'\n' => {
                    self.cursor.advance(byte);
                    return Ok(buf.into_token(start, true));
                }
                b']' => {
                    buf.push(byte);
                    self.cursor.advance(byte);
                    return Ok(buf.into_token(start, false));
                }
                _ => {
                    buf.push(byte);
                    self.cursor.advance(byte);
                }
            }
        }
    }
}

impl<R: Read> Iterator for Tokenizer<R> {
    type Item = Result<Token, KeystatError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}
