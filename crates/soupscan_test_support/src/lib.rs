//! Event and diagnostic recording for soupscan test suites.
//!
//! The [`Recorder`] turns the callback stream into deterministic snapshot
//! lines so golden tests can compare whole scans with `assert_eq!`. Install
//! one clone as the scanner's handler (and reporter) and keep another to
//! read the snapshot afterwards.

use std::cell::RefCell;
use std::rc::Rc;

use soupscan::{
    Attributes, Diagnostic, DocumentHandler, ErrorReporter, LocationItem, Locator, QName,
};

#[derive(Debug, Default)]
struct Inner {
    events: Vec<String>,
    diagnostics: Vec<String>,
    character_data: String,
    with_locations: bool,
}

/// Cloneable snapshot recorder.
#[derive(Clone, Debug, Default)]
pub struct Recorder {
    inner: Rc<RefCell<Inner>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a ` @bl,bc..el,ec` suffix on every event line.
    pub fn with_locations() -> Self {
        let recorder = Self::default();
        recorder.inner.borrow_mut().with_locations = true;
        recorder
    }

    /// Snapshot lines of all events recorded so far.
    pub fn events(&self) -> Vec<String> {
        self.inner.borrow().events.clone()
    }

    /// Diagnostics recorded so far, as `"error CODE"` / `"warning CODE"`.
    pub fn diagnostics(&self) -> Vec<String> {
        self.inner.borrow().diagnostics.clone()
    }

    /// Concatenated text of all characters events.
    pub fn character_data(&self) -> String {
        self.inner.borrow().character_data.clone()
    }

    fn push(&self, event: String, location: Option<&LocationItem>) {
        let mut inner = self.inner.borrow_mut();
        if inner.with_locations
            && let Some(location) = location
        {
            inner.events.push(format!(
                "{event} @{},{}..{},{}",
                location.begin_line,
                location.begin_column,
                location.end_line,
                location.end_column
            ));
        } else {
            inner.events.push(event);
        }
    }
}

/// Render an attribute set as `name="value"` pairs in source order.
pub fn format_attributes(attributes: &Attributes) -> String {
    attributes
        .iter()
        .map(|attr| format!("{}={:?}", attr.name.raw, attr.value))
        .collect::<Vec<_>>()
        .join(",")
}

impl DocumentHandler for Recorder {
    fn start_document(
        &mut self,
        _locator: &Locator,
        encoding: Option<&str>,
        location: Option<&LocationItem>,
    ) {
        self.push(
            format!("startDocument({})", encoding.unwrap_or("-")),
            location,
        );
    }

    fn end_document(&mut self, location: Option<&LocationItem>) {
        self.push("endDocument".to_owned(), location);
    }

    fn start_element(
        &mut self,
        name: &QName,
        attributes: &Attributes,
        location: Option<&LocationItem>,
    ) {
        self.push(
            format!("startElement({},[{}])", name.raw, format_attributes(attributes)),
            location,
        );
    }

    fn end_element(&mut self, name: &QName, location: Option<&LocationItem>) {
        self.push(format!("endElement({})", name.raw), location);
    }

    fn characters(&mut self, text: &str, location: Option<&LocationItem>) {
        self.inner.borrow_mut().character_data.push_str(text);
        self.push(format!("characters({text:?})"), location);
    }

    fn comment(&mut self, text: &str, location: Option<&LocationItem>) {
        self.push(format!("comment({text:?})"), location);
    }

    fn start_general_entity(&mut self, name: &str, location: Option<&LocationItem>) {
        self.push(format!("startGeneralEntity({name})"), location);
    }

    fn end_general_entity(&mut self, name: &str, location: Option<&LocationItem>) {
        self.push(format!("endGeneralEntity({name})"), location);
    }
}

impl ErrorReporter for Recorder {
    fn report_error(&mut self, diagnostic: &Diagnostic) {
        self.inner
            .borrow_mut()
            .diagnostics
            .push(format!("error {}", diagnostic.code()));
    }

    fn report_warning(&mut self, diagnostic: &Diagnostic) {
        self.inner
            .borrow_mut()
            .diagnostics
            .push(format!("warning {}", diagnostic.code()));
    }
}
