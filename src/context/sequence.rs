use super::{ChoiceContext, ElementContext, Halt, Outcome, discard_element, skip_unknown_element};
use crate::decoder::Decoder;
use crate::dispatch::{decode_text, parse_value};
use crate::formatting::FormattingMode;
use crate::reader::Attribute;
use crate::reflect::{FieldInfo, SequenceValue, Target, lookup_element, lookup_name};
use tracing::trace;

/// Text collected for the field that holds the element's own content.
struct SimpleContent {
    field: &'static FieldInfo,
    text: String,
}

pub(crate) struct SequenceContext<'a> {
    sequence: &'a mut dyn SequenceValue,
    simple_content: Option<SimpleContent>,
    /// Untagged choice fields that already received a selection.
    selected_untagged: Vec<i32>,
}

impl<'a> SequenceContext<'a> {
    /// Fails fatally when more than one field claims the simple content.
    pub(crate) fn new(
        sequence: &'a mut dyn SequenceValue,
        decoder: &mut Decoder<'_>,
    ) -> Result<Self, Halt> {
        let mut claimed = sequence
            .fields()
            .iter()
            .filter(|f| f.formatting.contains(FormattingMode::SIMPLE_CONTENT));
        let simple_content = claimed.next();
        if let (Some(first), Some(second)) = (simple_content, claimed.next()) {
            decoder.log_fatal(format!(
                "Fields '{}' and '{}' both claim the simple content of one element.",
                first.name, second.name
            ));
            return Err(Halt::Fatal);
        }

        Ok(Self {
            sequence,
            simple_content: simple_content.map(|field| SimpleContent {
                field,
                text: String::new(),
            }),
            selected_untagged: Vec::new(),
        })
    }

    /// Try the sub-fields of untagged aggregate fields.
    ///
    /// Returns `None` when no untagged field knows `name`.
    fn parse_untagged(
        &mut self,
        name: &str,
        attributes: &[Attribute],
        decoder: &mut Decoder<'_>,
    ) -> Option<Outcome> {
        let fields = self.sequence.fields();
        for info in fields
            .iter()
            .filter(|f| f.formatting.contains(FormattingMode::UNTAGGED))
        {
            let Some(field) = self.sequence.field_mut(info.id) else {
                continue;
            };
            match field.target() {
                Target::Sequence(inner) if lookup_element(inner.fields(), name).is_some() => {
                    trace!(field = info.name, element = name, "untagged sequence");
                    let outcome = match SequenceContext::new(inner, decoder) {
                        Ok(mut flattened) => flattened.parse_sub_element(name, attributes, decoder),
                        Err(halt) => Err(halt),
                    };
                    return Some(outcome);
                }
                Target::Choice(inner) if lookup_element(inner.selections(), name).is_some() => {
                    trace!(field = info.name, element = name, "untagged choice");
                    let mut flattened = if self.selected_untagged.contains(&info.id) {
                        ChoiceContext::continuing(inner)
                    } else {
                        self.selected_untagged.push(info.id);
                        ChoiceContext::new(inner)
                    };
                    return Some(flattened.parse_sub_element(name, attributes, decoder));
                }
                _ => {}
            }
        }
        None
    }
}

fn missing_field(name: &str, decoder: &mut Decoder<'_>) -> Outcome {
    decoder.log_error(format!("Unable to access field '{name}'."));
    Err(Halt::Failed)
}

impl ElementContext for SequenceContext<'_> {
    fn start_element(&mut self, _decoder: &mut Decoder<'_>) -> Outcome {
        if let Some(content) = &mut self.simple_content {
            content.text.clear();
        }
        Ok(())
    }

    fn end_element(&mut self, decoder: &mut Decoder<'_>) -> Outcome {
        let Some(content) = &self.simple_content else {
            return Ok(());
        };
        let Some(field) = self.sequence.field_mut(content.field.id) else {
            return missing_field(content.field.name, decoder);
        };
        decode_text(
            field.target(),
            content.field.formatting,
            &content.text,
            decoder,
        )
    }

    fn add_characters(&mut self, chars: &str, decoder: &mut Decoder<'_>) -> Outcome {
        match &mut self.simple_content {
            Some(content) => content.text.push_str(chars),
            None if !chars.trim().is_empty() => {
                decoder.log_warning(format!("Unexpected characters: \"{}\".", chars.trim()));
            }
            None => {}
        }
        Ok(())
    }

    fn parse_attribute(&mut self, name: &str, value: &str, decoder: &mut Decoder<'_>) -> Outcome {
        let Some(info) = lookup_name(self.sequence.fields(), name) else {
            if !decoder.options().skip_unknown_elements() {
                decoder.log_warning(format!("Unknown attribute '{name}'."));
            }
            return Ok(());
        };

        if !info.formatting.contains(FormattingMode::ATTRIBUTE) {
            decoder.log_warning(format!(
                "Object '{name}' is being parsed as an attribute, but it does not have the 'IS_ATTRIBUTE' flag set."
            ));
        }

        let Some(field) = self.sequence.field_mut(info.id) else {
            return missing_field(name, decoder);
        };
        match decode_text(field.target(), info.formatting, value, decoder) {
            Err(Halt::Failed) => {
                decoder.log_error(format!(
                    "Unable to parse \"{value}\" (for '{name}' attribute)."
                ));
                Err(Halt::Failed)
            }
            other => other,
        }
    }

    fn parse_sub_element(
        &mut self,
        name: &str,
        attributes: &[Attribute],
        decoder: &mut Decoder<'_>,
    ) -> Outcome {
        let Some(info) = lookup_element(self.sequence.fields(), name) else {
            if let Some(outcome) = self.parse_untagged(name, attributes, decoder) {
                return outcome;
            }
            return skip_unknown_element(name, attributes, decoder);
        };

        let Some(field) = self.sequence.field_mut(info.id) else {
            decoder.log_error(format!("Unable to access field '{name}'."));
            return discard_element(attributes, decoder);
        };
        match parse_value(field.target(), info.formatting, attributes, decoder) {
            Err(Halt::Failed) => {
                decoder.log_error(format!("Unable to decode sub-element '{name}'."));
                Err(Halt::Failed)
            }
            other => other,
        }
    }
}
