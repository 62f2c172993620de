//! Contexts for strings and byte vectors, whose XML form depends on the
//! field's formatting mode rather than on the type alone.

use super::{ElementContext, Outcome, PushParserContext, discard_element};
use crate::decoder::Decoder;
use crate::formatting::FormattingMode;
use crate::push_parser::{Base64Parser, HexParser, ListParser};
use crate::reader::Attribute;

enum Utf8Target<'a> {
    Text(&'a mut String),
    Bytes(&'a mut Vec<u8>),
}

/// Raw text copied verbatim into a string or byte vector.
pub(crate) struct Utf8Context<'a> {
    target: Utf8Target<'a>,
}

impl<'a> Utf8Context<'a> {
    pub(crate) fn for_string(value: &'a mut String) -> Self {
        Self {
            target: Utf8Target::Text(value),
        }
    }

    pub(crate) fn for_bytes(value: &'a mut Vec<u8>) -> Self {
        Self {
            target: Utf8Target::Bytes(value),
        }
    }
}

impl ElementContext for Utf8Context<'_> {
    fn start_element(&mut self, _decoder: &mut Decoder<'_>) -> Outcome {
        match &mut self.target {
            Utf8Target::Text(value) => value.clear(),
            Utf8Target::Bytes(value) => value.clear(),
        }
        Ok(())
    }

    fn end_element(&mut self, _decoder: &mut Decoder<'_>) -> Outcome {
        Ok(())
    }

    fn add_characters(&mut self, chars: &str, _decoder: &mut Decoder<'_>) -> Outcome {
        match &mut self.target {
            Utf8Target::Text(value) => value.push_str(chars),
            Utf8Target::Bytes(value) => value.extend_from_slice(chars.as_bytes()),
        }
        Ok(())
    }

    fn parse_attribute(&mut self, _name: &str, _value: &str, _decoder: &mut Decoder<'_>) -> Outcome {
        Ok(())
    }

    fn parse_sub_element(
        &mut self,
        name: &str,
        attributes: &[Attribute],
        decoder: &mut Decoder<'_>,
    ) -> Outcome {
        decoder.log_error(format!(
            "Attempted to create sub context for \"{name}\" inside text content."
        ));
        discard_element(attributes, decoder)
    }
}

/// `String` targets: base64, hex or plain text.
pub(crate) enum StringContext<'a> {
    Base64(PushParserContext<Base64Parser<'a>>),
    Hex(PushParserContext<HexParser<'a>>),
    Utf8(Utf8Context<'a>),
}

impl<'a> StringContext<'a> {
    pub(crate) fn new(value: &'a mut String, mode: FormattingMode) -> Self {
        if mode.contains(FormattingMode::BASE64) {
            StringContext::Base64(PushParserContext::new(Base64Parser::new(value)))
        } else if mode.contains(FormattingMode::HEX) {
            StringContext::Hex(PushParserContext::new(HexParser::new(value)))
        } else {
            StringContext::Utf8(Utf8Context::for_string(value))
        }
    }

    fn inner(&mut self) -> &mut dyn ElementContext {
        match self {
            StringContext::Base64(context) => context,
            StringContext::Hex(context) => context,
            StringContext::Utf8(context) => context,
        }
    }
}

/// `Vec<u8>` targets: base64, hex, a list of numbers, or plain text.
pub(crate) enum BytesContext<'a> {
    Base64(PushParserContext<Base64Parser<'a>>),
    Hex(PushParserContext<HexParser<'a>>),
    List(PushParserContext<ListParser<'a>>),
    Utf8(Utf8Context<'a>),
}

impl<'a> BytesContext<'a> {
    pub(crate) fn new(value: &'a mut Vec<u8>, mode: FormattingMode) -> Self {
        if mode.contains(FormattingMode::BASE64) {
            BytesContext::Base64(PushParserContext::new(Base64Parser::new(value)))
        } else if mode.contains(FormattingMode::HEX) {
            BytesContext::Hex(PushParserContext::new(HexParser::new(value)))
        } else if mode.contains(FormattingMode::LIST) {
            BytesContext::List(PushParserContext::new(ListParser::new(value, mode)))
        } else {
            BytesContext::Utf8(Utf8Context::for_bytes(value))
        }
    }

    fn inner(&mut self) -> &mut dyn ElementContext {
        match self {
            BytesContext::Base64(context) => context,
            BytesContext::Hex(context) => context,
            BytesContext::List(context) => context,
            BytesContext::Utf8(context) => context,
        }
    }
}

macro_rules! forward_context {
    ($($ty:ident),*) => {
        $(
            impl ElementContext for $ty<'_> {
                fn start_element(&mut self, decoder: &mut Decoder<'_>) -> Outcome {
                    self.inner().start_element(decoder)
                }

                fn end_element(&mut self, decoder: &mut Decoder<'_>) -> Outcome {
                    self.inner().end_element(decoder)
                }

                fn add_characters(&mut self, chars: &str, decoder: &mut Decoder<'_>) -> Outcome {
                    self.inner().add_characters(chars, decoder)
                }

                fn parse_attribute(&mut self, name: &str, value: &str, decoder: &mut Decoder<'_>) -> Outcome {
                    self.inner().parse_attribute(name, value, decoder)
                }

                fn parse_sub_element(
                    &mut self,
                    name: &str,
                    attributes: &[Attribute],
                    decoder: &mut Decoder<'_>,
                ) -> Outcome {
                    self.inner().parse_sub_element(name, attributes, decoder)
                }
            }
        )*
    };
}

forward_context!(StringContext, BytesContext);
