use crate::formatting::FormattingMode;

/// Default limit on element nesting.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Options controlling a [`Decoder`](crate::Decoder).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderOptions {
    skip_unknown_elements: bool,
    max_depth: usize,
    formatting_mode: FormattingMode,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            skip_unknown_elements: true,
            max_depth: DEFAULT_MAX_DEPTH,
            formatting_mode: FormattingMode::DEFAULT,
        }
    }
}

impl DecoderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip elements the schema does not know instead of failing on them
    pub fn with_skip_unknown_elements(mut self, skip: bool) -> Self {
        self.skip_unknown_elements = skip;
        self
    }

    /// Deepest element nesting accepted before decoding stops
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Formatting mode applied to the root object
    pub fn with_formatting_mode(mut self, mode: FormattingMode) -> Self {
        self.formatting_mode = mode;
        self
    }

    pub fn skip_unknown_elements(&self) -> bool {
        self.skip_unknown_elements
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn formatting_mode(&self) -> FormattingMode {
        self.formatting_mode
    }
}
