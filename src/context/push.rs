use super::{ElementContext, Halt, Outcome, discard_element};
use crate::decoder::Decoder;
use crate::push_parser::PushParser;
use crate::reader::Attribute;

/// Streams element text into a base64, hex or list parser.
pub(crate) struct PushParserContext<P> {
    parser: P,
    failed: bool,
}

impl<P: PushParser> PushParserContext<P> {
    pub(crate) fn new(parser: P) -> Self {
        Self {
            parser,
            failed: false,
        }
    }
}

impl<P: PushParser> ElementContext for PushParserContext<P> {
    fn start_element(&mut self, _decoder: &mut Decoder<'_>) -> Outcome {
        self.failed = false;
        self.parser.begin();
        Ok(())
    }

    fn end_element(&mut self, decoder: &mut Decoder<'_>) -> Outcome {
        if self.failed {
            // already reported, and the parser state is no longer meaningful
            self.parser.begin();
            return Err(Halt::Failed);
        }
        if let Err(err) = self.parser.end() {
            decoder.log_error(format!("Unable to end parsing list or binary type: {err}."));
            self.parser.begin();
            return Err(Halt::Failed);
        }
        Ok(())
    }

    fn add_characters(&mut self, chars: &str, decoder: &mut Decoder<'_>) -> Outcome {
        if self.failed {
            return Ok(());
        }
        if let Err(err) = self.parser.push_characters(chars) {
            decoder.log_error(format!("Unable to push characters: {err}."));
            self.failed = true;
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
            "Unexpected sub-element \"{name}\" inside list or binary type."
        ));
        discard_element(attributes, decoder)
    }
}
