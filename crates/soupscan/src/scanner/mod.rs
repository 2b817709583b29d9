//! Scanner driver: input lifecycle, entity stack, and event plumbing.
//!
//! The driver owns the active [`CurrentEntity`], the stack of suspended
//! entities, the byte playback stream (when the input was bytes), and the
//! scratch buffers shared by the content and special scanners. The scanning
//! state machines themselves live in `content.rs` and `special.rs`.

mod charref;
mod content;
mod special;
mod states;

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use crate::encoding;
use crate::shared::config::ScannerConfig;
use crate::shared::error::{Diagnostic, ErrorReporter};
use crate::shared::event::{Attribute, Attributes, DocumentHandler, Locator, QName};
use crate::shared::input::InputSource;
use crate::shared::location::LocationItem;
use crate::stream::{CurrentEntity, DecodingReader, PlaybackStream};
use crate::sysid;
use states::{ActiveScanner, ScannerState};

/// Internal control-flow fault: a real I/O failure, or the active entity
/// running dry (handled by popping the entity stack).
pub(crate) enum Fault {
    EndOfEntity,
    Io(io::Error),
}

impl From<io::Error> for Fault {
    fn from(error: io::Error) -> Self {
        Fault::Io(error)
    }
}

pub(crate) type ScanResult<T> = Result<T, Fault>;

/// Queue handle for pushing nested input sources from handler callbacks.
///
/// Handler callbacks cannot re-enter the scanner, so pushes are queued and
/// installed immediately after the delivering callback returns: the pushed
/// stream's events appear between the triggering event and the parent
/// stream's next event.
#[derive(Clone, Default)]
pub struct InputPusher {
    queue: Rc<RefCell<Vec<InputSource>>>,
}

impl InputPusher {
    pub fn push(&self, source: InputSource) {
        self.queue.borrow_mut().push(source);
    }
}

/// Permissive streaming HTML scanner.
///
/// Makes no attempt to balance tags or fix nesting: it scans what it can
/// and emits document events, recovering from every syntactic anomaly. See
/// the crate docs for the event contract.
pub struct HtmlScanner {
    pub(crate) config: ScannerConfig,
    pub(crate) handler: Option<Box<dyn DocumentHandler>>,
    pub(crate) reporter: Option<Box<dyn ErrorReporter>>,

    pub(crate) byte_stream: Option<Rc<RefCell<PlaybackStream>>>,
    pub(crate) entity: Option<CurrentEntity>,
    pub(crate) entity_stack: Vec<CurrentEntity>,

    pub(crate) state: ScannerState,
    pub(crate) active: ActiveScanner,
    /// IANA name of the encoding the document was opened with.
    pub(crate) iana_encoding: String,

    /// Start tags seen so far; compared against `element_depth` to suppress
    /// duplicate events while a re-decoded prefix replays.
    pub(crate) element_count: i32,
    pub(crate) element_depth: i32,

    pub(crate) begin_line: u32,
    pub(crate) begin_column: u32,
    pub(crate) end_line: u32,
    pub(crate) end_column: u32,

    // Scratch, reused across events: handlers must copy to retain.
    pub(crate) string_buffer: String,
    pub(crate) ref_buffer: String,
    pub(crate) attributes: Attributes,
    pub(crate) location_item: LocationItem,

    pub(crate) pushed: Rc<RefCell<Vec<InputSource>>>,
}

impl Default for HtmlScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlScanner {
    pub fn new() -> Self {
        Self::with_config(ScannerConfig::default())
    }

    pub fn with_config(config: ScannerConfig) -> Self {
        let iana_encoding = config.default_encoding.clone();
        Self {
            config,
            handler: None,
            reporter: None,
            byte_stream: None,
            entity: None,
            entity_stack: Vec::new(),
            state: ScannerState::StartDocument,
            active: ActiveScanner::Content,
            iana_encoding,
            element_count: 0,
            element_depth: -1,
            begin_line: 1,
            begin_column: 1,
            end_line: 1,
            end_column: 1,
            string_buffer: String::with_capacity(1024),
            ref_buffer: String::with_capacity(64),
            attributes: Attributes::default(),
            location_item: LocationItem::default(),
            pushed: Rc::default(),
        }
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Mutable configuration access; changes mid-parse are not supported.
    pub fn config_mut(&mut self) -> &mut ScannerConfig {
        &mut self.config
    }

    pub fn set_document_handler(&mut self, handler: Box<dyn DocumentHandler>) {
        self.handler = Some(handler);
    }

    pub fn set_error_reporter(&mut self, reporter: Box<dyn ErrorReporter>) {
        self.reporter = Some(reporter);
    }

    /// Handle for queueing nested input sources from handler callbacks.
    pub fn input_pusher(&self) -> InputPusher {
        InputPusher {
            queue: Rc::clone(&self.pushed),
        }
    }

    // Locator accessors (live values for the active entity).

    pub fn public_id(&self) -> Option<&str> {
        self.entity.as_ref().and_then(|e| e.public_id.as_deref())
    }

    pub fn base_system_id(&self) -> Option<&str> {
        self.entity.as_ref().and_then(|e| e.base_system_id.as_deref())
    }

    pub fn literal_system_id(&self) -> Option<&str> {
        self.entity.as_ref().and_then(|e| e.literal_system_id.as_deref())
    }

    pub fn expanded_system_id(&self) -> Option<&str> {
        self.entity.as_ref().and_then(|e| e.expanded_system_id.as_deref())
    }

    pub fn line_number(&self) -> Option<u32> {
        self.entity.as_ref().map(|e| e.line_number)
    }

    pub fn column_number(&self) -> Option<u32> {
        self.entity.as_ref().map(|e| e.column_number)
    }

    /// Install the document input and reset all parse state.
    ///
    /// Resolves the encoding (explicit, then BOM, then the configured
    /// default) and constructs the initial entity. Must not be called from
    /// a handler callback.
    pub fn set_input_source(&mut self, source: InputSource) -> io::Result<()> {
        self.element_count = 0;
        self.element_depth = -1;
        self.byte_stream = None;
        self.entity_stack.clear();
        self.pushed.borrow_mut().clear();

        self.begin_line = 1;
        self.begin_column = 1;
        self.end_line = 1;
        self.end_column = 1;

        self.iana_encoding = self.config.default_encoding.clone();

        let InputSource {
            public_id,
            system_id,
            base_system_id,
            encoding,
            byte_stream,
            char_stream,
        } = source;
        let expanded = sysid::expand_system_id(system_id.as_deref(), base_system_id.as_deref());

        let stream: Box<dyn crate::stream::CharStream> = match char_stream {
            Some(stream) => stream,
            None => {
                let bytes = byte_stream.ok_or_else(|| {
                    io::Error::new(
                        io::ErrorKind::InvalidInput,
                        "input source has no byte or character stream",
                    )
                })?;
                let playback = Rc::new(RefCell::new(PlaybackStream::new(bytes)));
                let mut iana = encoding;
                let mut native: Option<String> = None;
                if iana.is_none() {
                    let (detected_iana, detected_native) =
                        playback.borrow_mut().detect_encoding()?;
                    iana = detected_iana.map(str::to_owned);
                    native = detected_native.map(str::to_owned);
                }
                let iana = match iana {
                    Some(iana) => iana,
                    None => {
                        self.report_warning(Diagnostic::NoEncodingDeclared);
                        self.config.default_encoding.clone()
                    }
                };
                let native = match native {
                    Some(native) => native,
                    None => match encoding::iana_to_native(&iana) {
                        Some(native) => native.to_owned(),
                        None => {
                            self.report_warning(Diagnostic::UnknownIanaEncoding {
                                iana: iana.clone(),
                            });
                            iana.clone()
                        }
                    },
                };
                let decoder = encoding::for_name(&native).ok_or_else(|| {
                    io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("unsupported encoding: {native}"),
                    )
                })?;
                self.iana_encoding = iana;
                self.byte_stream = Some(Rc::clone(&playback));
                Box::new(DecodingReader::new(playback, decoder))
            }
        };

        self.entity = Some(CurrentEntity::new(
            stream,
            public_id,
            base_system_id,
            system_id,
            expanded,
        ));
        self.set_active(ActiveScanner::Content);
        self.set_scanner_state(ScannerState::StartDocument);
        Ok(())
    }

    /// Advance the document scan.
    ///
    /// With `complete` the scan runs until `end_document` has been
    /// delivered; otherwise it returns after one chunk of work. Returns
    /// whether more scanning remains.
    pub fn scan_document(&mut self, complete: bool) -> io::Result<bool> {
        assert!(
            self.entity.is_some() || self.state == ScannerState::EndDocument,
            "scan_document called before set_input_source"
        );
        loop {
            let special = match &self.active {
                ActiveScanner::Special(name) => Some(name.clone()),
                ActiveScanner::Content => None,
            };
            let more = match special {
                Some(name) => self.scan_special(&name, complete)?,
                None => self.scan_content(complete)?,
            };
            if !more {
                return Ok(false);
            }
            if !complete {
                return Ok(true);
            }
        }
    }

    /// Suspend the active entity and scan the pushed source next.
    ///
    /// The source must carry a character stream. At its end of input the
    /// suspended entity resumes exactly where it left off.
    pub fn push_input_source(&mut self, source: InputSource) {
        self.install_pushed(source);
    }

    pub(crate) fn install_pushed(&mut self, source: InputSource) {
        let InputSource {
            public_id,
            system_id,
            base_system_id,
            char_stream,
            ..
        } = source;
        let stream = char_stream.expect("pushed input source has no character stream");
        let expanded = sysid::expand_system_id(system_id.as_deref(), base_system_id.as_deref());
        let previous = self
            .entity
            .take()
            .expect("push_input_source called before set_input_source");
        self.entity_stack.push(previous);
        self.entity = Some(CurrentEntity::new(
            stream,
            public_id,
            base_system_id,
            system_id,
            expanded,
        ));
    }

    /// Install sources queued through the [`InputPusher`] during the last
    /// handler callback.
    pub(crate) fn drain_pushed_sources(&mut self) {
        while !self.pushed.borrow().is_empty() {
            let sources: Vec<InputSource> = self.pushed.borrow_mut().drain(..).collect();
            for source in sources {
                self.install_pushed(source);
            }
        }
    }

    // State plumbing.

    pub(crate) fn set_scanner_state(&mut self, next: ScannerState) {
        #[cfg(any(test, feature = "debug-stats"))]
        if self.state != next {
            log::trace!(target: "soupscan.scanner", "state {:?} -> {:?}", self.state, next);
        }
        self.state = next;
    }

    pub(crate) fn set_active(&mut self, next: ActiveScanner) {
        #[cfg(any(test, feature = "debug-stats"))]
        if self.active != next {
            log::trace!(target: "soupscan.scanner", "scanner {:?} -> {:?}", self.active, next);
        }
        self.active = next;
    }

    /// The active entity. Scanning without an input source is API misuse.
    pub(crate) fn ent(&mut self) -> &mut CurrentEntity {
        self.entity
            .as_mut()
            .expect("scan_document called before set_input_source")
    }

    pub(crate) fn cur_position(&self) -> (u32, u32) {
        match &self.entity {
            Some(entity) => (entity.line_number, entity.column_number),
            None => (1, 1),
        }
    }

    pub(crate) fn mark_begin(&mut self) {
        let (line, column) = self.cur_position();
        self.begin_line = line;
        self.begin_column = column;
    }

    pub(crate) fn mark_end(&mut self) {
        let (line, column) = self.cur_position();
        self.end_line = line;
        self.end_column = column;
    }

    pub(crate) fn locator_snapshot(&self) -> Locator {
        match &self.entity {
            Some(entity) => Locator {
                public_id: entity.public_id.clone(),
                base_system_id: entity.base_system_id.clone(),
                literal_system_id: entity.literal_system_id.clone(),
                expanded_system_id: entity.expanded_system_id.clone(),
                line_number: entity.line_number,
                column_number: entity.column_number,
            },
            None => Locator::default(),
        }
    }

    /// Whether content events may reach the handler: suppressed while a
    /// re-decoded prefix replays, until the element count catches up.
    pub(crate) fn emission_allowed(&self) -> bool {
        self.handler.is_some() && self.element_count >= self.element_depth
    }

    // Diagnostics.

    pub(crate) fn report_error(&mut self, diagnostic: Diagnostic) {
        if self.config.report_errors
            && let Some(reporter) = self.reporter.as_deref_mut()
        {
            reporter.report_error(&diagnostic);
        }
    }

    pub(crate) fn report_warning(&mut self, diagnostic: Diagnostic) {
        if self.config.report_errors
            && let Some(reporter) = self.reporter.as_deref_mut()
        {
            reporter.report_warning(&diagnostic);
        }
    }

    // Event emission. Each helper stamps the end location, refreshes the
    // pooled location item, delivers, then installs any sources the handler
    // queued.

    fn sync_location_item(&mut self) {
        if self.config.augmentations {
            self.location_item.set(
                self.begin_line,
                self.begin_column,
                self.end_line,
                self.end_column,
            );
        }
    }

    pub(crate) fn emit_start_element(&mut self, name: &QName) {
        self.mark_end();
        self.sync_location_item();
        #[cfg(any(test, feature = "debug-stats"))]
        log::trace!(
            target: "soupscan.scanner",
            "startElement {:?} ({} attributes)",
            name.raw,
            self.attributes.len()
        );
        let augs = self.config.augmentations.then_some(&self.location_item);
        if let Some(handler) = self.handler.as_deref_mut() {
            handler.start_element(name, &self.attributes, augs);
        }
        self.drain_pushed_sources();
    }

    pub(crate) fn emit_end_element(&mut self, name: &QName) {
        self.mark_end();
        self.sync_location_item();
        #[cfg(any(test, feature = "debug-stats"))]
        log::trace!(target: "soupscan.scanner", "endElement {:?}", name.raw);
        let augs = self.config.augmentations.then_some(&self.location_item);
        if let Some(handler) = self.handler.as_deref_mut() {
            handler.end_element(name, augs);
        }
        self.drain_pushed_sources();
    }

    /// Deliver `string_buffer` as one characters event.
    pub(crate) fn emit_characters_scratch(&mut self) {
        self.mark_end();
        self.sync_location_item();
        #[cfg(any(test, feature = "debug-stats"))]
        log::trace!(
            target: "soupscan.scanner",
            "characters ({} chars)",
            self.string_buffer.chars().count()
        );
        let augs = self.config.augmentations.then_some(&self.location_item);
        if let Some(handler) = self.handler.as_deref_mut() {
            handler.characters(&self.string_buffer, augs);
        }
        self.drain_pushed_sources();
    }

    /// Deliver `string_buffer` as one comment event.
    pub(crate) fn emit_comment_scratch(&mut self) {
        self.mark_end();
        self.sync_location_item();
        #[cfg(any(test, feature = "debug-stats"))]
        log::trace!(
            target: "soupscan.scanner",
            "comment ({} chars)",
            self.string_buffer.chars().count()
        );
        let augs = self.config.augmentations.then_some(&self.location_item);
        if let Some(handler) = self.handler.as_deref_mut() {
            handler.comment(&self.string_buffer, augs);
        }
        self.drain_pushed_sources();
    }

    /// Add one attribute to the scratch set, with a fresh location item
    /// when augmentations are on.
    pub(crate) fn push_attribute(&mut self, name: &str, value: String) {
        let location = if self.config.augmentations {
            self.mark_end();
            Some(LocationItem::new(
                self.begin_line,
                self.begin_column,
                self.end_line,
                self.end_column,
            ))
        } else {
            None
        };
        self.attributes.push(Attribute {
            name: QName::plain(name),
            attr_type: "CDATA",
            value,
            location,
        });
    }
}
