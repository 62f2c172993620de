//! Category dispatch: which context decodes a value, and how a value
//! bound to one element is driven through it.

use crate::context::{
    BytesContext, ChoiceContext, CustomizedContext, ElementContext, EnumerationContext, Halt,
    NillableContext, Outcome, PushParserContext, SequenceContext, SimpleContext, StringContext,
    discard_element, feed_text,
};
use crate::decoder::Decoder;
use crate::formatting::FormattingMode;
use crate::push_parser::ListParser;
use crate::reader::Attribute;
use crate::reflect::{ArrayValue, Target};

/// Build the context for `target` as the content of a single element.
///
/// Nullable targets are made present and decoded through their value.
/// `Failed` means nothing was consumed; the caller still owns the element.
pub(crate) fn select_context<'a>(
    target: Target<'a>,
    mode: FormattingMode,
    decoder: &mut Decoder<'_>,
) -> Result<Box<dyn ElementContext + 'a>, Halt> {
    let mode = mode.for_value();
    let context: Box<dyn ElementContext + 'a> = match target {
        Target::Sequence(value) => Box::new(SequenceContext::new(value, decoder)?),
        Target::Choice(value) => Box::new(ChoiceContext::new(value)),
        Target::Array(value) => {
            if !value.element_category().is_scalar() {
                decoder.log_error("Unable to decode a list of non-scalar values.");
                return Err(Halt::Failed);
            }
            Box::new(PushParserContext::new(ListParser::new(value, mode)))
        }
        Target::Bytes(value) => Box::new(BytesContext::new(value, mode)),
        Target::Simple(value) => Box::new(SimpleContext::new(value, mode)),
        Target::Text(value) => Box::new(StringContext::new(value, mode)),
        Target::Customized(value) => Box::new(CustomizedContext::new(value, mode)),
        Target::Enumeration(value) => Box::new(EnumerationContext::new(value)),
        Target::Nullable(value) => return select_context(value.make_value().target(), mode, decoder),
    };
    Ok(context)
}

/// Whether an array takes one element per XML element instead of a
/// whitespace-separated list.
fn repeats(array: &dyn ArrayValue, mode: FormattingMode) -> bool {
    !mode.contains(FormattingMode::LIST) || !array.element_category().is_scalar()
}

/// Decode the element whose start tag was just read into `target`.
///
/// Arrays without `LIST` take one element per call (repetition), and
/// nillable values are reset to null when the element is empty.
pub(crate) fn parse_value(
    target: Target<'_>,
    mode: FormattingMode,
    attributes: &[Attribute],
    decoder: &mut Decoder<'_>,
) -> Outcome {
    match target {
        Target::Array(array) if repeats(&*array, mode) => {
            let element = array.push_default();
            parse_value(element.target(), mode, attributes, decoder)
        }
        Target::Nullable(nullable) => {
            if !mode.contains(FormattingMode::NILLABLE) {
                return parse_value(nullable.make_value().target(), mode, attributes, decoder);
            }
            let (outcome, now_null) = match nullable.make_value().target() {
                Target::Array(array) if repeats(&*array, mode) => {
                    let before = array.len();
                    let (outcome, is_nil) =
                        parse_nillable(array.push_default().target(), mode, attributes, decoder);
                    if is_nil {
                        array.truncate(before);
                    }
                    (outcome, array.is_empty())
                }
                other => parse_nillable(other, mode, attributes, decoder),
            };
            if now_null {
                nullable.reset();
            }
            outcome
        }
        other => {
            let mut context = match select_context(other, mode, decoder) {
                Ok(context) => context,
                Err(Halt::Failed) => return discard_element(attributes, decoder),
                Err(Halt::Fatal) => return Err(Halt::Fatal),
            };
            context.begin_parse(attributes, decoder)
        }
    }
}

/// Decode one element that may be nil. The flag is `true` when it was.
fn parse_nillable(
    target: Target<'_>,
    mode: FormattingMode,
    attributes: &[Attribute],
    decoder: &mut Decoder<'_>,
) -> (Outcome, bool) {
    let inner = match select_context(target, mode, decoder) {
        Ok(inner) => inner,
        Err(Halt::Failed) => return (discard_element(attributes, decoder), false),
        Err(Halt::Fatal) => return (Err(Halt::Fatal), false),
    };
    let mut context = NillableContext::new(inner);
    let outcome = context.begin_parse(attributes, decoder);
    (outcome, context.is_nil())
}

/// Decode a complete text value (an attribute or simple content) into `target`.
pub(crate) fn decode_text(
    target: Target<'_>,
    mode: FormattingMode,
    text: &str,
    decoder: &mut Decoder<'_>,
) -> Outcome {
    match target {
        Target::Sequence(_) | Target::Choice(_) => {
            decoder.log_error("Unable to decode text into an aggregate value.");
            Err(Halt::Failed)
        }
        other => {
            let mut context = select_context(other, mode, decoder)?;
            feed_text(context.as_mut(), text, decoder)
        }
    }
}
