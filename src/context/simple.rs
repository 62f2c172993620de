use super::{ElementContext, Halt, Outcome, discard_element};
use crate::decoder::Decoder;
use crate::formatting::FormattingMode;
use crate::reader::Attribute;
use crate::reflect::{CustomizedValue, EnumerationValue, SimpleValue};

/// Character data of a scalar element, collected across fragments.
#[derive(Debug, Default)]
struct ScalarText {
    text: String,
}

impl ScalarText {
    fn clear(&mut self) {
        self.text.clear();
    }

    fn push(&mut self, chars: &str) {
        self.text.push_str(chars);
    }

    fn trimmed(&self) -> &str {
        self.text.trim()
    }
}

fn reject_sub_element(
    kind: &str,
    name: &str,
    attributes: &[Attribute],
    decoder: &mut Decoder<'_>,
) -> Outcome {
    decoder.log_error(format!(
        "Attempted to create sub context for \"{name}\" inside {kind} type."
    ));
    discard_element(attributes, decoder)
}

fn reject_attribute(kind: &str, name: &str, decoder: &mut Decoder<'_>) -> Outcome {
    decoder.log_error(format!(
        "Unexpected attribute '{name}' inside {kind} type."
    ));
    Err(Halt::Failed)
}

/// Numbers, booleans and other plain scalars.
pub(crate) struct SimpleContext<'a> {
    value: &'a mut dyn SimpleValue,
    mode: FormattingMode,
    text: ScalarText,
}

impl<'a> SimpleContext<'a> {
    pub(crate) fn new(value: &'a mut dyn SimpleValue, mode: FormattingMode) -> Self {
        Self {
            value,
            mode,
            text: ScalarText::default(),
        }
    }
}

impl ElementContext for SimpleContext<'_> {
    fn start_element(&mut self, _decoder: &mut Decoder<'_>) -> Outcome {
        self.text.clear();
        Ok(())
    }

    fn end_element(&mut self, decoder: &mut Decoder<'_>) -> Outcome {
        let text = self.text.trimmed();
        if let Err(err) = self.value.parse_text(text, self.mode) {
            decoder.log_error(format!("Unable to parse \"{text}\": {err}."));
            return Err(Halt::Failed);
        }
        Ok(())
    }

    fn add_characters(&mut self, chars: &str, _decoder: &mut Decoder<'_>) -> Outcome {
        self.text.push(chars);
        Ok(())
    }

    fn parse_attribute(&mut self, name: &str, _value: &str, decoder: &mut Decoder<'_>) -> Outcome {
        reject_attribute("simple", name, decoder)
    }

    fn parse_sub_element(
        &mut self,
        name: &str,
        attributes: &[Attribute],
        decoder: &mut Decoder<'_>,
    ) -> Outcome {
        reject_sub_element("simple", name, attributes, decoder)
    }
}

/// Restricted scalars: text goes through the base type, then validation.
pub(crate) struct CustomizedContext<'a> {
    value: &'a mut dyn CustomizedValue,
    mode: FormattingMode,
    text: ScalarText,
}

impl<'a> CustomizedContext<'a> {
    pub(crate) fn new(value: &'a mut dyn CustomizedValue, mode: FormattingMode) -> Self {
        Self {
            value,
            mode,
            text: ScalarText::default(),
        }
    }
}

impl ElementContext for CustomizedContext<'_> {
    fn start_element(&mut self, _decoder: &mut Decoder<'_>) -> Outcome {
        self.text.clear();
        Ok(())
    }

    fn end_element(&mut self, decoder: &mut Decoder<'_>) -> Outcome {
        let text = self.text.trimmed();
        if let Err(err) = self.value.convert_from_text(text, self.mode) {
            decoder.log_error(format!(
                "Unable to convert \"{text}\" to customized type: {err}."
            ));
            return Err(Halt::Failed);
        }
        Ok(())
    }

    fn add_characters(&mut self, chars: &str, _decoder: &mut Decoder<'_>) -> Outcome {
        self.text.push(chars);
        Ok(())
    }

    fn parse_attribute(&mut self, name: &str, _value: &str, decoder: &mut Decoder<'_>) -> Outcome {
        reject_attribute("customized", name, decoder)
    }

    fn parse_sub_element(
        &mut self,
        name: &str,
        attributes: &[Attribute],
        decoder: &mut Decoder<'_>,
    ) -> Outcome {
        reject_sub_element("customized", name, attributes, decoder)
    }
}

pub(crate) struct EnumerationContext<'a> {
    value: &'a mut dyn EnumerationValue,
    text: ScalarText,
}

impl<'a> EnumerationContext<'a> {
    pub(crate) fn new(value: &'a mut dyn EnumerationValue) -> Self {
        Self {
            value,
            text: ScalarText::default(),
        }
    }
}

impl ElementContext for EnumerationContext<'_> {
    fn start_element(&mut self, _decoder: &mut Decoder<'_>) -> Outcome {
        self.text.clear();
        Ok(())
    }

    fn end_element(&mut self, decoder: &mut Decoder<'_>) -> Outcome {
        let token = self.text.trimmed();
        if !self.value.set_from_token(token) {
            decoder.log_error(format!(
                "Unable to parse \"{token}\" as an enumeration value."
            ));
            return Err(Halt::Failed);
        }
        Ok(())
    }

    fn add_characters(&mut self, chars: &str, _decoder: &mut Decoder<'_>) -> Outcome {
        self.text.push(chars);
        Ok(())
    }

    fn parse_attribute(&mut self, name: &str, _value: &str, decoder: &mut Decoder<'_>) -> Outcome {
        reject_attribute("enumeration", name, decoder)
    }

    fn parse_sub_element(
        &mut self,
        name: &str,
        attributes: &[Attribute],
        decoder: &mut Decoder<'_>,
    ) -> Outcome {
        reject_sub_element("enumeration", name, attributes, decoder)
    }
}
