//! Incremental decoders fed with character data as it arrives.
//!
//! Every parser follows the same lifecycle: `begin` once, `push_characters`
//! for each text fragment of the element, then `end`. Decoded output is
//! committed to the target only when `end` succeeds, so a malformed payload
//! leaves the target empty.

use crate::formatting::FormattingMode;
use crate::reflect::{ArrayValue, assign_scalar};
use crate::scalar::ScalarError;
use base64::Engine;
use thiserror::Error;

/// Errors raised by a push parser
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PushError {
    #[error("invalid base64 content: {0}")]
    Base64(String),
    #[error("data after base64 padding")]
    TrailingBase64,
    #[error("truncated base64 content")]
    TruncatedBase64,
    #[error("invalid hex content: {0}")]
    Hex(String),
    #[error("odd number of hex digits")]
    OddHexLength,
    #[error("invalid list item \"{token}\": {source}")]
    ListItem { token: String, source: ScalarError },
    #[error("decoded bytes are not valid UTF-8")]
    InvalidUtf8,
}

pub trait PushParser {
    fn begin(&mut self);
    fn push_characters(&mut self, chars: &str) -> Result<(), PushError>;
    fn end(&mut self) -> Result<(), PushError>;
}

/// Destination of a binary payload.
pub trait ByteSink {
    fn replace(&mut self, bytes: Vec<u8>) -> Result<(), PushError>;
    fn clear_sink(&mut self);
}

impl ByteSink for Vec<u8> {
    fn replace(&mut self, bytes: Vec<u8>) -> Result<(), PushError> {
        *self = bytes;
        Ok(())
    }

    fn clear_sink(&mut self) {
        self.clear();
    }
}

impl ByteSink for String {
    fn replace(&mut self, bytes: Vec<u8>) -> Result<(), PushError> {
        *self = String::from_utf8(bytes).map_err(|_| PushError::InvalidUtf8)?;
        Ok(())
    }

    fn clear_sink(&mut self) {
        self.clear();
    }
}

/// Streaming base64 decoder.
pub struct Base64Parser<'a> {
    sink: &'a mut dyn ByteSink,
    pending: Vec<u8>,
    decoded: Vec<u8>,
    padded: bool,
}

impl<'a> Base64Parser<'a> {
    pub fn new(sink: &'a mut dyn ByteSink) -> Self {
        Self {
            sink,
            pending: Vec::new(),
            decoded: Vec::new(),
            padded: false,
        }
    }

    fn flush_quanta(&mut self) -> Result<(), PushError> {
        while self.pending.len() >= 4 {
            if self.padded {
                return Err(PushError::TrailingBase64);
            }
            let quantum: Vec<u8> = self.pending.drain(..4).collect();
            self.padded = quantum.ends_with(b"=");
            base64::engine::general_purpose::STANDARD
                .decode_vec(&quantum, &mut self.decoded)
                .map_err(|e| PushError::Base64(e.to_string()))?;
        }
        Ok(())
    }
}

impl PushParser for Base64Parser<'_> {
    fn begin(&mut self) {
        self.pending.clear();
        self.decoded.clear();
        self.padded = false;
        self.sink.clear_sink();
    }

    fn push_characters(&mut self, chars: &str) -> Result<(), PushError> {
        collect_ascii(chars, &mut self.pending)
            .map_err(|c| PushError::Base64(format!("invalid character {c:?}")))?;
        self.flush_quanta()
    }

    fn end(&mut self) -> Result<(), PushError> {
        self.flush_quanta()?;
        if !self.pending.is_empty() {
            return Err(PushError::TruncatedBase64);
        }
        self.sink.replace(std::mem::take(&mut self.decoded))
    }
}

/// Append the non-whitespace characters of `chars`, rejecting non-ASCII.
fn collect_ascii(chars: &str, pending: &mut Vec<u8>) -> Result<(), char> {
    for c in chars.chars().filter(|c| !c.is_ascii_whitespace()) {
        if !c.is_ascii() {
            return Err(c);
        }
        pending.push(c as u8);
    }
    Ok(())
}

/// Streaming hex decoder.
pub struct HexParser<'a> {
    sink: &'a mut dyn ByteSink,
    pending: Vec<u8>,
    decoded: Vec<u8>,
}

impl<'a> HexParser<'a> {
    pub fn new(sink: &'a mut dyn ByteSink) -> Self {
        Self {
            sink,
            pending: Vec::new(),
            decoded: Vec::new(),
        }
    }
}

impl PushParser for HexParser<'_> {
    fn begin(&mut self) {
        self.pending.clear();
        self.decoded.clear();
        self.sink.clear_sink();
    }

    fn push_characters(&mut self, chars: &str) -> Result<(), PushError> {
        collect_ascii(chars, &mut self.pending)
            .map_err(|c| PushError::Hex(format!("invalid character {c:?}")))?;
        let complete = self.pending.len() / 2 * 2;
        if complete == 0 {
            return Ok(());
        }
        let pairs: Vec<u8> = self.pending.drain(..complete).collect();
        let bytes = hex::decode(pairs).map_err(|e| PushError::Hex(e.to_string()))?;
        self.decoded.extend_from_slice(&bytes);
        Ok(())
    }

    fn end(&mut self) -> Result<(), PushError> {
        if !self.pending.is_empty() {
            return Err(PushError::OddHexLength);
        }
        self.sink.replace(std::mem::take(&mut self.decoded))
    }
}

/// Whitespace separated list of scalars appended to an array.
pub struct ListParser<'a> {
    array: &'a mut dyn ArrayValue,
    mode: FormattingMode,
    token: String,
}

impl<'a> ListParser<'a> {
    pub fn new(array: &'a mut dyn ArrayValue, mode: FormattingMode) -> Self {
        // Items are plain scalars; LIST only applies to the array itself.
        let mode = mode.difference(FormattingMode::LIST);
        Self {
            array,
            mode,
            token: String::new(),
        }
    }

    fn append(&mut self) -> Result<(), PushError> {
        if self.token.is_empty() {
            return Ok(());
        }
        let token = std::mem::take(&mut self.token);
        let element = self.array.push_default();
        if let Err(source) = assign_scalar(element.target(), &token, self.mode) {
            self.array.clear();
            return Err(PushError::ListItem { token, source });
        }
        Ok(())
    }
}

impl PushParser for ListParser<'_> {
    fn begin(&mut self) {
        self.token.clear();
        self.array.clear();
    }

    fn push_characters(&mut self, chars: &str) -> Result<(), PushError> {
        for c in chars.chars() {
            if c.is_whitespace() {
                self.append()?;
            } else {
                self.token.push(c);
            }
        }
        Ok(())
    }

    fn end(&mut self) -> Result<(), PushError> {
        self.append()
    }
}
