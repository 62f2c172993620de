use crate::context::{Halt, Outcome};
use crate::diagnostics::{Diagnostic, Diagnostics, Severity};
use crate::dispatch::parse_value;
use crate::options::DecoderOptions;
use crate::reader::{Node, StartTag, XmlReader};
use crate::reflect::Reflect;
use crate::{DecodeError, Result};
use std::fs;
use std::io::{Read, Write};
use std::path::Path;
use tracing::debug;

/// Source name used in diagnostics when none is given.
pub const DEFAULT_URI: &str = "input";

/// Decodes XML documents into values that implement [`Reflect`].
///
/// A decoder is opened on one document, decodes its root element once and
/// is closed again. The one-shot `decode_*` methods do all three steps.
/// Problems found along the way are logged and counted rather than
/// returned; read them back with [`logged_messages`](Self::logged_messages)
/// or [`diagnostics`](Self::diagnostics) until the next open.
pub struct Decoder<'s> {
    options: DecoderOptions,
    reader: Option<XmlReader>,
    uri: String,
    root: Option<StartTag>,
    depth: usize,
    diagnostics: Diagnostics,
    error_stream: Option<Box<dyn Write + 's>>,
    warning_stream: Option<Box<dyn Write + 's>>,
}

impl<'s> Decoder<'s> {
    pub fn new(options: DecoderOptions) -> Self {
        Self {
            options,
            reader: None,
            uri: DEFAULT_URI.to_string(),
            root: None,
            depth: 0,
            diagnostics: Diagnostics::new(),
            error_stream: None,
            warning_stream: None,
        }
    }

    /// Sink receiving the log of a one-shot decode call that logged errors
    pub fn set_error_stream(&mut self, stream: impl Write + 's) {
        self.error_stream = Some(Box::new(stream));
    }

    /// Sink receiving the log of a one-shot decode call that logged only warnings
    pub fn set_warning_stream(&mut self, stream: impl Write + 's) {
        self.warning_stream = Some(Box::new(stream));
    }

    pub fn options(&self) -> &DecoderOptions {
        &self.options
    }

    /// Open a document read to the end from `source`
    pub fn open_reader<R: Read>(&mut self, mut source: R, uri: Option<&str>) -> Result<()> {
        self.begin_open(uri.unwrap_or(DEFAULT_URI));
        let mut data = Vec::new();
        if let Err(err) = source.read_to_end(&mut data) {
            self.log_fatal(format!("Unable to read input: {err}."));
            return Err(err.into());
        }
        self.open_document(data)
    }

    /// Open a document held in memory
    pub fn open_bytes(&mut self, data: &[u8], uri: Option<&str>) -> Result<()> {
        self.begin_open(uri.unwrap_or(DEFAULT_URI));
        self.open_document(data.to_vec())
    }

    /// Open a document file; its path names it in diagnostics
    pub fn open_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.begin_open(&path.display().to_string());
        match fs::read(path) {
            Ok(data) => self.open_document(data),
            Err(err) => {
                self.log_fatal(format!("Unable to open file: {err}."));
                Err(err.into())
            }
        }
    }

    fn begin_open(&mut self, uri: &str) {
        self.close();
        self.diagnostics.reset();
        self.uri = uri.to_string();
    }

    /// Advance to the root element so its name can be inspected before decoding.
    fn open_document(&mut self, data: Vec<u8>) -> Result<()> {
        self.reader = Some(XmlReader::from_bytes(data, self.uri.clone()));
        loop {
            let node = match self.reader.as_mut() {
                Some(reader) => reader.advance(),
                None => return Err(DecodeError::NotOpen),
            };
            match node {
                Ok(Node::Start(tag)) => {
                    debug!(uri = %self.uri, root = %tag.name, "opened document");
                    self.root = Some(tag);
                    return Ok(());
                }
                Ok(Node::Text(_)) | Ok(Node::End) => continue,
                Ok(Node::Eof) => {
                    self.log_fatal("No root element found.");
                    return Err(DecodeError::NoRootElement);
                }
                Err(err) => {
                    self.log_reader_error(&err);
                    return Err(err);
                }
            }
        }
    }

    /// Local name of the root element of the open document
    pub fn root_name(&self) -> Option<&str> {
        self.root.as_ref().map(|tag| tag.name.as_str())
    }

    /// Release the document. Calling it again has no effect.
    pub fn close(&mut self) {
        if self.reader.take().is_some() {
            debug!(uri = %self.uri, "closed document");
        }
        self.root = None;
        self.depth = 0;
    }

    /// Decode the root element of the open document into `object`.
    ///
    /// `object` is reset first. Returns the number of errors logged, so
    /// `Ok(0)` means success; on errors `object` holds whatever could be
    /// decoded.
    pub fn decode<T: Reflect + Default>(&mut self, object: &mut T) -> Result<usize> {
        if self.reader.is_none() {
            return Err(DecodeError::NotOpen);
        }
        *object = T::default();

        let Some(root) = self.root.take() else {
            self.log_fatal("No element available to decode.");
            return Ok(self.error_count());
        };
        let mode = self.options.formatting_mode();
        let outcome: Outcome = parse_value(object.target(), mode, &root.attributes, self);
        debug!(
            root = %root.name,
            errors = self.error_count(),
            warnings = self.warning_count(),
            fatal = outcome == Err(Halt::Fatal),
            "decoded document"
        );
        Ok(self.error_count())
    }

    /// Open, decode and close a document read from `source`
    ///
    /// Like every one-shot call, the log is then written to the error or
    /// warning stream, chosen by [`error_severity`](Self::error_severity).
    pub fn decode_reader<R: Read, T: Reflect + Default>(
        &mut self,
        source: R,
        object: &mut T,
        uri: Option<&str>,
    ) -> Result<usize> {
        let opened = self.open_reader(source, uri);
        self.finish_one_shot(opened, object)
    }

    /// Open, decode and close a document held in memory
    pub fn decode_bytes<T: Reflect + Default>(
        &mut self,
        data: &[u8],
        object: &mut T,
        uri: Option<&str>,
    ) -> Result<usize> {
        let opened = self.open_bytes(data, uri);
        self.finish_one_shot(opened, object)
    }

    /// Open, decode and close a document file
    pub fn decode_file<P: AsRef<Path>, T: Reflect + Default>(
        &mut self,
        path: P,
        object: &mut T,
    ) -> Result<usize> {
        let opened = self.open_file(path);
        self.finish_one_shot(opened, object)
    }

    fn finish_one_shot<T: Reflect + Default>(
        &mut self,
        opened: Result<()>,
        object: &mut T,
    ) -> Result<usize> {
        let errors = match opened {
            Ok(()) => self.decode(object)?,
            Err(_) => self.error_count(),
        };
        self.close();
        self.flush_messages()?;
        Ok(errors)
    }

    fn flush_messages(&mut self) -> Result<()> {
        let messages = self.diagnostics.logged_messages();
        let sink = match self.diagnostics.severity() {
            Severity::NoError => return Ok(()),
            Severity::Warning => self.warning_stream.as_mut(),
            Severity::Error | Severity::Fatal => self.error_stream.as_mut(),
        };
        if let Some(sink) = sink {
            sink.write_all(messages.as_bytes())?;
            sink.flush()?;
        }
        Ok(())
    }

    /// Errors and fatal errors logged since the last open
    pub fn error_count(&self) -> usize {
        self.diagnostics.error_count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.warning_count()
    }

    /// Highest severity logged since the last open
    pub fn error_severity(&self) -> Severity {
        self.diagnostics.severity()
    }

    /// Every logged message formatted as `uri:line.column: Severity: message`, one per line
    pub fn logged_messages(&self) -> String {
        self.diagnostics.logged_messages()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.diagnostics.entries()
    }

    /// Unknown elements skipped since the last open
    pub fn num_unknown_elements_skipped(&self) -> usize {
        self.diagnostics.unknown_elements_skipped()
    }

    pub fn set_num_unknown_elements_skipped(&mut self, count: usize) {
        self.diagnostics.set_unknown_elements_skipped(count);
    }

    pub(crate) fn note_unknown_element(&mut self) {
        self.diagnostics.note_unknown_element();
    }

    pub(crate) fn take_root(&mut self) -> Option<StartTag> {
        self.root.take()
    }

    /// Enter one element, failing fatally past the configured depth.
    pub(crate) fn enter_element(&mut self) -> std::result::Result<(), Halt> {
        let max_depth = self.options.max_depth();
        if self.depth >= max_depth {
            self.log_fatal(format!("Maximum allowed depth of {max_depth} exceeded."));
            return Err(Halt::Fatal);
        }
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn leave_element(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Read the next node; reader errors are logged as fatal.
    pub(crate) fn next_node(&mut self) -> std::result::Result<Node, Halt> {
        let Some(reader) = self.reader.as_mut() else {
            self.log_fatal("Decoder is not open.");
            return Err(Halt::Fatal);
        };
        match reader.advance() {
            Ok(node) => Ok(node),
            Err(err) => {
                self.log_reader_error(&err);
                Err(Halt::Fatal)
            }
        }
    }

    fn log_reader_error(&mut self, err: &DecodeError) {
        let position = match (self.reader.as_mut(), err) {
            (Some(reader), DecodeError::Xml(_)) => reader.error_position(),
            (Some(reader), _) => reader.position(),
            (None, _) => (0, 0),
        };
        self.record(Severity::Fatal, err.to_string(), position);
    }

    pub(crate) fn log_warning(&mut self, message: impl Into<String>) {
        self.log(Severity::Warning, message);
    }

    pub(crate) fn log_error(&mut self, message: impl Into<String>) {
        self.log(Severity::Error, message);
    }

    pub(crate) fn log_fatal(&mut self, message: impl Into<String>) {
        self.log(Severity::Fatal, message);
    }

    fn log(&mut self, severity: Severity, message: impl Into<String>) {
        let position = self
            .reader
            .as_mut()
            .map(XmlReader::position)
            .unwrap_or((0, 0));
        self.record(severity, message.into(), position);
    }

    fn record(&mut self, severity: Severity, message: String, (line, column): (usize, usize)) {
        self.diagnostics.record(Diagnostic {
            severity,
            uri: self.uri.clone(),
            line,
            column,
            message,
        });
    }
}

impl Default for Decoder<'_> {
    fn default() -> Self {
        Self::new(DecoderOptions::default())
    }
}
