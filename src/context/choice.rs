use super::{ElementContext, Halt, Outcome, discard_element, skip_unknown_element};
use crate::decoder::Decoder;
use crate::dispatch::parse_value;
use crate::formatting::FormattingMode;
use crate::reader::Attribute;
use crate::reflect::{ChoiceValue, FieldInfo, lookup_element};

/// What the current element selected.
enum Selected {
    Field(&'static FieldInfo),
    /// A selector the schema does not know; repeats of it are skipped too.
    Unknown(String),
}

pub(crate) struct ChoiceContext<'a> {
    choice: &'a mut dyn ChoiceValue,
    selected: Option<Selected>,
}

impl<'a> ChoiceContext<'a> {
    pub(crate) fn new(choice: &'a mut dyn ChoiceValue) -> Self {
        Self {
            choice,
            selected: None,
        }
    }

    /// Resume a choice whose current selection was made earlier in the same
    /// parent element (an untagged choice).
    pub(crate) fn continuing(choice: &'a mut dyn ChoiceValue) -> Self {
        let selected = choice
            .selection_id()
            .and_then(|id| choice.selections().iter().find(|s| s.id == id))
            .map(Selected::Field);
        Self { choice, selected }
    }
}

impl ElementContext for ChoiceContext<'_> {
    fn start_element(&mut self, _decoder: &mut Decoder<'_>) -> Outcome {
        self.selected = None;
        Ok(())
    }

    fn end_element(&mut self, decoder: &mut Decoder<'_>) -> Outcome {
        if self.selected.is_none() {
            decoder.log_error("No elements selected in choice.");
            return Err(Halt::Failed);
        }
        Ok(())
    }

    fn add_characters(&mut self, chars: &str, decoder: &mut Decoder<'_>) -> Outcome {
        let trimmed = chars.trim();
        if !trimmed.is_empty() {
            decoder.log_warning(format!(
                "Invalid characters \"{trimmed}\" when parsing choice."
            ));
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
        let info = match &self.selected {
            Some(Selected::Field(current))
                if current.name == name && current.formatting.contains(FormattingMode::REPEATABLE) =>
            {
                *current
            }
            Some(Selected::Unknown(skipped)) if skipped == name => {
                return skip_unknown_element(name, attributes, decoder);
            }
            Some(_) => {
                decoder.log_error("Only one selection is permitted inside choice.");
                return discard_element(attributes, decoder);
            }
            None => {
                let Some(info) = lookup_element(self.choice.selections(), name) else {
                    self.selected = Some(Selected::Unknown(name.to_string()));
                    return skip_unknown_element(name, attributes, decoder);
                };
                if !self.choice.make_selection(info.id) {
                    decoder.log_error(format!("Unable to make selection: \"{name}\"."));
                    return discard_element(attributes, decoder);
                }
                self.selected = Some(Selected::Field(info));
                info
            }
        };

        let Some(value) = self.choice.selection_mut() else {
            decoder.log_error(format!("Unable to access selection '{name}'."));
            return discard_element(attributes, decoder);
        };
        match parse_value(value.target(), info.formatting, attributes, decoder) {
            Err(Halt::Failed) => {
                decoder.log_error(format!("Unable to decode sub-element '{name}'."));
                Err(Halt::Failed)
            }
            other => other,
        }
    }
}
