//! A schema-driven XML decoder.
//!
//! Types describe themselves through the traits in [`reflect`]; the
//! [`Decoder`] walks an XML document and fills a value in place, logging
//! problems instead of stopping at the first one. Unknown elements can be
//! skipped, which keeps older readers working against newer documents.
//!
//! # Examples
//!
//! ```no_run
//! use xmldecode::demo::Employee;
//! use xmldecode::{Decoder, DecoderOptions};
//!
//! let mut decoder = Decoder::new(DecoderOptions::default());
//! let mut employee = Employee::default();
//! let errors = decoder.decode_file("employee.xml", &mut employee).unwrap();
//! if errors > 0 {
//!     eprint!("{}", decoder.logged_messages());
//! }
//! ```

use std::io;
use thiserror::Error;

pub mod cli;
mod context;
pub mod decoder;
pub mod demo;
pub mod diagnostics;
mod dispatch;
pub mod formatting;
pub mod options;
pub mod push_parser;
pub mod reader;
pub mod reflect;
pub mod scalar;

pub use decoder::Decoder;
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use formatting::FormattingMode;
pub use options::DecoderOptions;
pub use reflect::{
    ArrayValue, Category, ChoiceValue, Customized, CustomizedValue, Enumerator, EnumerationValue,
    FieldInfo, NullableValue, Reflect, SequenceValue, SimpleValue, Target,
};
pub use scalar::ScalarError;

/// Error types for opening and reading documents
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("Malformed XML: {0}")]
    Malformed(String),
    #[error("No root element found")]
    NoRootElement,
    #[error("Decoder is not open")]
    NotOpen,
}

/// Result type alias for this crate
pub type Result<T> = std::result::Result<T, DecodeError>;
