use super::{ElementContext, Halt, Outcome};
use crate::decoder::Decoder;
use crate::reader::Attribute;
use tracing::trace;

/// Consumes an element and everything below it, producing nothing.
pub(crate) struct UnknownElementContext;

impl ElementContext for UnknownElementContext {
    fn start_element(&mut self, _decoder: &mut Decoder<'_>) -> Outcome {
        Ok(())
    }

    fn end_element(&mut self, _decoder: &mut Decoder<'_>) -> Outcome {
        Ok(())
    }

    fn add_characters(&mut self, _chars: &str, _decoder: &mut Decoder<'_>) -> Outcome {
        Ok(())
    }

    fn parse_attribute(&mut self, _name: &str, _value: &str, _decoder: &mut Decoder<'_>) -> Outcome {
        Ok(())
    }

    fn parse_sub_element(
        &mut self,
        _name: &str,
        attributes: &[Attribute],
        decoder: &mut Decoder<'_>,
    ) -> Outcome {
        UnknownElementContext.begin_parse(attributes, decoder)
    }
}

/// Handle a sub-element no field or selection matches.
///
/// With `skip_unknown_elements` the subtree is counted and dropped.
/// Otherwise an error is logged, the subtree is still consumed so the
/// parent stays in step with the reader, and the element fails.
pub(crate) fn skip_unknown_element(
    name: &str,
    attributes: &[Attribute],
    decoder: &mut Decoder<'_>,
) -> Outcome {
    if decoder.options().skip_unknown_elements() {
        trace!(element = name, "skipping unknown element");
        decoder.note_unknown_element();
        return UnknownElementContext.begin_parse(attributes, decoder);
    }

    decoder.log_error(format!("Unable to decode sub-element '{name}'."));
    UnknownElementContext.begin_parse(attributes, decoder)?;
    Err(Halt::Failed)
}

/// Consume a sub-element that was already rejected and report the failure.
pub(crate) fn discard_element(attributes: &[Attribute], decoder: &mut Decoder<'_>) -> Outcome {
    UnknownElementContext.begin_parse(attributes, decoder)?;
    Err(Halt::Failed)
}
