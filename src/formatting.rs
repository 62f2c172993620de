use bitflags::bitflags;

bitflags! {
    /// Per-field encoding details carried by schema metadata.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FormattingMode: u32 {
        /// Decimal text for numbers, `1`/`0` for booleans.
        const DEC = 0x0001;
        /// Hexadecimal text.
        const HEX = 0x0002;
        /// Base64 text.
        const BASE64 = 0x0004;
        /// Plain text.
        const TEXT = 0x0008;
        /// Whitespace separated list of scalars.
        const LIST = 0x0010;
        /// The field has no element of its own; its members sit in the parent.
        const UNTAGGED = 0x0100;
        /// The field is carried by an attribute.
        const ATTRIBUTE = 0x0200;
        /// The field is the direct text content of the enclosing element.
        const SIMPLE_CONTENT = 0x0400;
        /// An empty element means "no value".
        const NILLABLE = 0x0800;
        /// A choice selector that may repeat.
        const REPEATABLE = 0x1000;
    }
}

impl FormattingMode {
    pub const DEFAULT: FormattingMode = FormattingMode::empty();

    /// Bits that select how text is interpreted.
    pub const TYPE_MASK: FormattingMode = FormattingMode::DEC
        .union(FormattingMode::HEX)
        .union(FormattingMode::BASE64)
        .union(FormattingMode::TEXT)
        .union(FormattingMode::LIST);

    /// The text-interpretation part of the mode.
    pub fn type_mode(self) -> FormattingMode {
        self.intersection(Self::TYPE_MASK)
    }

    /// Mode handed to the context of a field's value.
    ///
    /// Structural bits such as `ATTRIBUTE` describe the field, not its
    /// value, so only the type bits and `LIST` carry over.
    pub fn for_value(self) -> FormattingMode {
        self.type_mode()
    }
}
