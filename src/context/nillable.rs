use super::{ElementContext, Outcome};
use crate::decoder::Decoder;
use crate::reader::Attribute;

/// Wraps the context of a nillable value and notices empty elements.
///
/// When the element ends without any character data or sub-element, or
/// carries `xsi:nil="true"`, the wrapped context is not finished and
/// [`is_nil`](Self::is_nil) reports `true`; the caller then resets the
/// value to null. The `nil` attribute is never passed on.
pub(crate) struct NillableContext<'a> {
    inner: Box<dyn ElementContext + 'a>,
    empty: bool,
    marked_nil: bool,
}

impl<'a> NillableContext<'a> {
    pub(crate) fn new(inner: Box<dyn ElementContext + 'a>) -> Self {
        Self {
            inner,
            empty: true,
            marked_nil: false,
        }
    }

    pub(crate) fn is_nil(&self) -> bool {
        self.empty || self.marked_nil
    }
}

impl ElementContext for NillableContext<'_> {
    fn start_element(&mut self, decoder: &mut Decoder<'_>) -> Outcome {
        self.empty = true;
        self.marked_nil = false;
        self.inner.start_element(decoder)
    }

    fn end_element(&mut self, decoder: &mut Decoder<'_>) -> Outcome {
        if self.is_nil() {
            return Ok(());
        }
        self.inner.end_element(decoder)
    }

    fn add_characters(&mut self, chars: &str, decoder: &mut Decoder<'_>) -> Outcome {
        self.empty = false;
        self.inner.add_characters(chars, decoder)
    }

    fn parse_attribute(&mut self, name: &str, value: &str, decoder: &mut Decoder<'_>) -> Outcome {
        if name == "nil" {
            self.marked_nil = matches!(value.trim(), "true" | "1");
            return Ok(());
        }
        self.inner.parse_attribute(name, value, decoder)
    }

    fn parse_sub_element(
        &mut self,
        name: &str,
        attributes: &[Attribute],
        decoder: &mut Decoder<'_>,
    ) -> Outcome {
        self.empty = false;
        self.inner.parse_sub_element(name, attributes, decoder)
    }
}
