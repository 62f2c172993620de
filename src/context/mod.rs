//! Element contexts: one state machine per open XML element.
//!
//! A context receives the callbacks of exactly one element. Aggregate
//! contexts build a child context for each sub-element and let it consume
//! the nested events before resuming.

mod choice;
mod nillable;
mod proxy;
mod push;
mod sequence;
mod simple;
mod unknown;

pub(crate) use choice::ChoiceContext;
pub(crate) use nillable::NillableContext;
pub(crate) use proxy::{BytesContext, StringContext};
pub(crate) use push::PushParserContext;
pub(crate) use sequence::SequenceContext;
pub(crate) use simple::{CustomizedContext, EnumerationContext, SimpleContext};
pub(crate) use unknown::{UnknownElementContext, discard_element, skip_unknown_element};

use crate::decoder::Decoder;
use crate::reader::{Attribute, Node};

/// Why a callback stopped short. The message is already logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Halt {
    /// The element failed; siblings are still decoded.
    Failed,
    /// Decoding stops.
    Fatal,
}

pub(crate) type Outcome = Result<(), Halt>;

pub(crate) trait ElementContext {
    fn start_element(&mut self, decoder: &mut Decoder<'_>) -> Outcome;

    fn end_element(&mut self, decoder: &mut Decoder<'_>) -> Outcome;

    fn add_characters(&mut self, chars: &str, decoder: &mut Decoder<'_>) -> Outcome;

    fn parse_attribute(&mut self, name: &str, value: &str, decoder: &mut Decoder<'_>) -> Outcome;

    /// Decode the sub-element `name` whose start tag was just read.
    ///
    /// On return the sub-element's end tag has been consumed, whether the
    /// call succeeded or failed.
    fn parse_sub_element(
        &mut self,
        name: &str,
        attributes: &[Attribute],
        decoder: &mut Decoder<'_>,
    ) -> Outcome;

    /// Drive this context through one element whose start tag was just read.
    fn begin_parse(&mut self, attributes: &[Attribute], decoder: &mut Decoder<'_>) -> Outcome {
        decoder.enter_element()?;
        let mut failed = false;

        note(self.start_element(decoder), &mut failed)?;
        for attribute in attributes {
            note(
                self.parse_attribute(&attribute.name, &attribute.value, decoder),
                &mut failed,
            )?;
        }

        loop {
            match decoder.next_node()? {
                Node::Start(tag) => note(
                    self.parse_sub_element(&tag.name, &tag.attributes, decoder),
                    &mut failed,
                )?,
                Node::Text(text) => note(self.add_characters(&text, decoder), &mut failed)?,
                Node::End => {
                    note(self.end_element(decoder), &mut failed)?;
                    break;
                }
                Node::Eof => {
                    decoder.log_fatal("Unexpected end of document.");
                    return Err(Halt::Fatal);
                }
            }
        }

        decoder.leave_element();
        if failed { Err(Halt::Failed) } else { Ok(()) }
    }
}

/// Remember a recoverable failure, pass a fatal one up.
fn note(outcome: Outcome, failed: &mut bool) -> Outcome {
    match outcome {
        Err(Halt::Failed) => {
            *failed = true;
            Ok(())
        }
        other => other,
    }
}

/// Feed a complete text value through a context without reading events.
///
/// Used for attribute values and simple content, which are not elements.
pub(crate) fn feed_text(
    context: &mut dyn ElementContext,
    text: &str,
    decoder: &mut Decoder<'_>,
) -> Outcome {
    let mut failed = false;
    note(context.start_element(decoder), &mut failed)?;
    note(context.add_characters(text, decoder), &mut failed)?;
    note(context.end_element(decoder), &mut failed)?;
    if failed { Err(Halt::Failed) } else { Ok(()) }
}
