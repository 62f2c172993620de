//! Text to scalar conversion.

use crate::formatting::FormattingMode;
use crate::reflect::SimpleValue;
use base64::Engine;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

/// Errors raised while converting character data into a scalar
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScalarError {
    #[error("invalid {kind} value")]
    Invalid { kind: &'static str },
    #[error("value out of range for {kind}")]
    OutOfRange { kind: &'static str },
    #[error("invalid base64 content: {0}")]
    Base64(String),
    #[error("invalid hex content: {0}")]
    Hex(String),
    #[error("{0}")]
    Rejected(String),
}

/// Parse a boolean from `true`, `false`, `1` or `0`
pub fn parse_bool(text: &str) -> Result<bool, ScalarError> {
    match text {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ScalarError::Invalid { kind: "boolean" }),
    }
}

/// Parse a single character
pub fn parse_char(text: &str) -> Result<char, ScalarError> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(ScalarError::Invalid { kind: "character" }),
    }
}

/// Decode a complete base64 payload, ignoring embedded whitespace
pub fn decode_base64(text: &str) -> Result<Vec<u8>, ScalarError> {
    let compact: String = text.split_ascii_whitespace().collect();
    base64::engine::general_purpose::STANDARD
        .decode(compact)
        .map_err(|e| ScalarError::Base64(e.to_string()))
}

/// Decode a complete hex payload, ignoring embedded whitespace
pub fn decode_hex(text: &str) -> Result<Vec<u8>, ScalarError> {
    let compact: String = text.split_ascii_whitespace().collect();
    hex::decode(compact).map_err(|e| ScalarError::Hex(e.to_string()))
}

fn classify(kind: &'static str, err: &std::num::ParseIntError) -> ScalarError {
    use std::num::IntErrorKind;
    match err.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => ScalarError::OutOfRange { kind },
        _ => ScalarError::Invalid { kind },
    }
}

macro_rules! integer_scalar {
    ($($ty:ty => $kind:literal),* $(,)?) => {
        $(
            impl SimpleValue for $ty {
                fn parse_text(&mut self, text: &str, mode: FormattingMode) -> Result<(), ScalarError> {
                    let parsed = if mode.contains(FormattingMode::HEX) {
                        <$ty>::from_str_radix(text, 16)
                    } else {
                        text.parse::<$ty>()
                    };
                    *self = parsed.map_err(|e| classify($kind, &e))?;
                    Ok(())
                }
            }
        )*
    };
}

integer_scalar! {
    i8 => "i8",
    i16 => "i16",
    i32 => "i32",
    i64 => "i64",
    u8 => "u8",
    u16 => "u16",
    u32 => "u32",
    u64 => "u64",
}

macro_rules! float_scalar {
    ($($ty:ty => $kind:literal),* $(,)?) => {
        $(
            impl SimpleValue for $ty {
                fn parse_text(&mut self, text: &str, _mode: FormattingMode) -> Result<(), ScalarError> {
                    // XML Schema spells the special values differently from Rust.
                    *self = match text {
                        "INF" | "+INF" => <$ty>::INFINITY,
                        "-INF" => <$ty>::NEG_INFINITY,
                        "NaN" => <$ty>::NAN,
                        _ => text.parse::<$ty>().map_err(|_| ScalarError::Invalid { kind: $kind })?,
                    };
                    Ok(())
                }
            }
        )*
    };
}

float_scalar! {
    f32 => "f32",
    f64 => "f64",
}

macro_rules! temporal_scalar {
    ($($ty:ty => $kind:literal),* $(,)?) => {
        $(
            impl SimpleValue for $ty {
                fn parse_text(&mut self, text: &str, _mode: FormattingMode) -> Result<(), ScalarError> {
                    *self = text.parse::<$ty>().map_err(|_| ScalarError::Invalid { kind: $kind })?;
                    Ok(())
                }
            }
        )*
    };
}

// ISO 8601 extended forms: `2024-01-31`, `13:45:00.25`, `2024-01-31T13:45:00`
temporal_scalar! {
    NaiveDate => "date",
    NaiveTime => "time",
    NaiveDateTime => "datetime",
}

impl SimpleValue for DateTime<FixedOffset> {
    fn parse_text(&mut self, text: &str, _mode: FormattingMode) -> Result<(), ScalarError> {
        *self = DateTime::parse_from_rfc3339(text).map_err(|_| ScalarError::Invalid {
            kind: "datetime with offset",
        })?;
        Ok(())
    }
}

impl SimpleValue for bool {
    fn parse_text(&mut self, text: &str, _mode: FormattingMode) -> Result<(), ScalarError> {
        *self = parse_bool(text)?;
        Ok(())
    }
}

impl SimpleValue for char {
    fn parse_text(&mut self, text: &str, _mode: FormattingMode) -> Result<(), ScalarError> {
        *self = parse_char(text)?;
        Ok(())
    }
}

impl SimpleValue for String {
    fn parse_text(&mut self, text: &str, mode: FormattingMode) -> Result<(), ScalarError> {
        let bytes = if mode.contains(FormattingMode::BASE64) {
            decode_base64(text)?
        } else if mode.contains(FormattingMode::HEX) {
            decode_hex(text)?
        } else {
            self.clear();
            self.push_str(text);
            return Ok(());
        };
        *self = String::from_utf8(bytes).map_err(|_| ScalarError::Invalid { kind: "UTF-8 string" })?;
        Ok(())
    }
}
