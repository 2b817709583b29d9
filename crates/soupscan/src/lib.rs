//! Permissive streaming HTML tokenizer.
//!
//! `soupscan` converts a byte or character stream of HTML source into a
//! sequence of document events — start-document, start-element, characters,
//! comment, end-element, end-document — without balancing tags, correcting
//! nesting, or imposing a document model. It is the foundation of a
//! tag-soup parser: every input produces *some* event stream, ill-formed
//! markup is always recovered from, and every event carries a precise
//! source location when augmentations are enabled.
//!
//! Invariants:
//! - Exactly one `start_document` opens and one `end_document` closes the
//!   event sequence of a complete scan.
//! - Character content never contains `\r`; every `\r`, `\n`, or `\r\n`
//!   maps to exactly one `\n`.
//! - Events are emitted in strict source order, and event data borrows
//!   scanner scratch: handlers copy anything they retain.
//!
//! Byte input is decoded incrementally. Bytes are buffered until either a
//! `<meta http-equiv="content-type" … charset=…>` declaration switches the
//! decoder — replaying the buffered prefix through it — or the document
//! reaches `<body>`, at which point the buffer is released.
//!
//! ```
//! use soupscan::{DocumentHandler, HtmlScanner, InputSource, LocationItem, QName};
//!
//! #[derive(Default)]
//! struct Names(Vec<String>);
//!
//! impl DocumentHandler for Names {
//!     fn start_element(
//!         &mut self,
//!         name: &QName,
//!         _attrs: &soupscan::Attributes,
//!         _location: Option<&LocationItem>,
//!     ) {
//!         self.0.push(name.raw.clone());
//!     }
//! }
//!
//! let mut scanner = HtmlScanner::new();
//! scanner.set_document_handler(Box::new(Names::default()));
//! scanner.set_input_source(InputSource::from_text("<p>hi</p>")).unwrap();
//! scanner.scan_document(true).unwrap();
//! ```

pub mod catalog;
pub mod encoding;
pub mod entities;
pub mod sysid;

mod scanner;
mod shared;
mod stream;

pub use scanner::{HtmlScanner, InputPusher};
pub use shared::config::{
    FEATURE_AUGMENTATIONS, FEATURE_NOTIFY_CHAR_REFS, FEATURE_NOTIFY_HTML_BUILTIN_REFS,
    FEATURE_NOTIFY_XML_BUILTIN_REFS, FEATURE_REPORT_ERRORS, NameCase, PROPERTY_DEFAULT_ENCODING,
    PROPERTY_NAMES_ATTRS, PROPERTY_NAMES_ELEMS, ScannerConfig,
};
pub use shared::error::{ConfigError, Diagnostic, ErrorReporter};
pub use shared::event::{Attribute, Attributes, DocumentHandler, Locator, QName};
pub use shared::input::InputSource;
pub use shared::location::LocationItem;
pub use stream::{CharStream, DecodingReader, PlaybackStream, StringReader};
