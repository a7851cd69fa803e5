pub mod collapsed;
pub mod rows;
pub mod yourkit;

use std::io;
use std::path::Path;

use log::{debug, warn};
use thiserror::Error;
use treeline_protocol::TreeMessage;

use crate::builder::{BuildError, build_forest, roll_up_self_times};
use crate::model::CallRecord;
use crate::serialize::to_tree_messages;

/// Stable identifier for a supported profiler export format. Lookup key
/// only; the sole ordering semantics is registry iteration order.
pub type FormatId = &'static str;

/// A lazily produced, finite sequence of call records in file order.
pub type RecordStream = Box<dyn Iterator<Item = Result<CallRecord, ParseError>>>;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("io: {0}")]
    Io(#[from] io::Error),
    /// A line passed sniffing but failed re-validation during parsing —
    /// either the file changed between the two reads or the sniffer's
    /// rules drifted from the parser's.
    #[error("line {line}: {reason}")]
    MalformedRecord { line: usize, reason: &'static str },
}

/// A failed conversion, labeled with the stage that failed so unsupported
/// uploads can be triaged against format support.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("no registered format accepts this file")]
    UnrecognizedFormat,
    #[error("detection failed: {0}")]
    Detect(#[source] io::Error),
    #[error("parsing failed: {0}")]
    Parse(#[source] ParseError),
    #[error("tree building failed: {0}")]
    Build(#[source] BuildError),
}

/// One supported profiler export format: a sniffer that decides by full
/// structural validation whether a file is an instance of the format, and
/// a parser producing the flat record sequence for accepted files.
pub trait FormatHandler {
    /// Stable format identifier.
    fn format_id(&self) -> FormatId;

    /// Whether this file is an instance of the format. Read-only; reads
    /// the whole file but never consumes or mutates it, and a fresh read
    /// is performed by [`records`](Self::records) afterwards.
    fn accepts(&self, file: &Path) -> io::Result<bool>;

    /// Lazy record sequence for a file this format accepted. Restartable:
    /// every call re-opens the file. Lines are re-validated, so a file
    /// that changed since sniffing surfaces as
    /// [`ParseError::MalformedRecord`] instead of a wrong tree.
    fn records(&self, file: &Path) -> Result<RecordStream, ParseError>;
}

/// Ordered set of format handlers. Detection is deterministic for a fixed
/// file and registration order; when two formats could both structurally
/// accept a file, registration order is the tie-break.
pub struct FormatRegistry {
    handlers: Vec<Box<dyn FormatHandler>>,
}

impl FormatRegistry {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// The built-in formats. YourKit CSV is registered ahead of folded
    /// stacks: the folded grammar is the more permissive of the two, so
    /// the stricter format gets first refusal.
    pub fn with_default_formats() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(yourkit::YourkitCsv));
        registry.register(Box::new(collapsed::FoldedStacks));
        registry
    }

    pub fn register(&mut self, handler: Box<dyn FormatHandler>) {
        self.handlers.push(handler);
    }

    /// Identifier of the first format whose sniffer accepts the file, or
    /// `None` when no registered format recognizes it.
    pub fn detect(&self, file: &Path) -> io::Result<Option<FormatId>> {
        Ok(self.detect_handler(file)?.map(|h| h.format_id()))
    }

    /// Handler registered under the given id.
    pub fn handler(&self, id: &str) -> Option<&dyn FormatHandler> {
        self.handlers
            .iter()
            .find(|h| h.format_id() == id)
            .map(|h| &**h)
    }

    /// Run the full pipeline for one file: detect, parse, build, roll up,
    /// serialize. Stateless; concurrent conversions of different files
    /// never interact.
    pub fn convert(&self, file: &Path) -> Result<Vec<TreeMessage>, ConvertError> {
        let result = self.convert_inner(file);
        if let Err(e) = &result {
            warn!("{}: conversion failed: {e}", file.display());
        }
        result
    }

    fn convert_inner(&self, file: &Path) -> Result<Vec<TreeMessage>, ConvertError> {
        let handler = self
            .detect_handler(file)
            .map_err(ConvertError::Detect)?
            .ok_or(ConvertError::UnrecognizedFormat)?;
        let records = handler.records(file).map_err(ConvertError::Parse)?;
        let mut forest = build_forest(records).map_err(|e| match e {
            BuildError::Record(parse) => ConvertError::Parse(parse),
            other => ConvertError::Build(other),
        })?;
        for tree in &mut forest {
            roll_up_self_times(tree);
        }
        Ok(to_tree_messages(&forest))
    }

    fn detect_handler(&self, file: &Path) -> io::Result<Option<&dyn FormatHandler>> {
        for handler in &self.handlers {
            if handler.accepts(file)? {
                debug!("{}: detected format {}", file.display(), handler.format_id());
                return Ok(Some(handler.as_ref()));
            }
        }
        debug!("{}: no format accepted", file.display());
        Ok(None)
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_default_formats()
    }
}
