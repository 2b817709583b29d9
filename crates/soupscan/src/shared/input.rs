//! Input sources: identifiers plus at most one stream flavor.

use std::fmt;
use std::io::{Cursor, Read};

use crate::stream::{CharStream, StringReader};

/// One parse input: identifiers and an optional byte or character stream.
///
/// A byte stream enables BOM detection and `<meta>`-driven re-decoding; a
/// character stream is scanned as-is. When both are present the character
/// stream wins.
pub struct InputSource {
    pub public_id: Option<String>,
    pub system_id: Option<String>,
    pub base_system_id: Option<String>,
    /// Explicit IANA encoding, overriding BOM detection.
    pub encoding: Option<String>,
    pub(crate) byte_stream: Option<Box<dyn Read>>,
    pub(crate) char_stream: Option<Box<dyn CharStream>>,
}

impl InputSource {
    fn empty() -> Self {
        Self {
            public_id: None,
            system_id: None,
            base_system_id: None,
            encoding: None,
            byte_stream: None,
            char_stream: None,
        }
    }

    /// Source over an in-memory byte buffer.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self::from_byte_stream(Box::new(Cursor::new(bytes)))
    }

    /// Source over an arbitrary byte reader.
    pub fn from_byte_stream(stream: Box<dyn Read>) -> Self {
        Self {
            byte_stream: Some(stream),
            ..Self::empty()
        }
    }

    /// Source over already-decoded text.
    pub fn from_text(text: &str) -> Self {
        Self::from_char_stream(Box::new(StringReader::new(text)))
    }

    /// Source over an arbitrary character stream.
    pub fn from_char_stream(stream: Box<dyn CharStream>) -> Self {
        Self {
            char_stream: Some(stream),
            ..Self::empty()
        }
    }

    pub fn with_public_id(mut self, id: &str) -> Self {
        self.public_id = Some(id.to_owned());
        self
    }

    pub fn with_system_id(mut self, id: &str) -> Self {
        self.system_id = Some(id.to_owned());
        self
    }

    pub fn with_base_system_id(mut self, id: &str) -> Self {
        self.base_system_id = Some(id.to_owned());
        self
    }

    pub fn with_encoding(mut self, iana: &str) -> Self {
        self.encoding = Some(iana.to_owned());
        self
    }

    pub fn has_byte_stream(&self) -> bool {
        self.byte_stream.is_some()
    }

    pub fn has_char_stream(&self) -> bool {
        self.char_stream.is_some()
    }
}

impl fmt::Debug for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputSource")
            .field("public_id", &self.public_id)
            .field("system_id", &self.system_id)
            .field("base_system_id", &self.base_system_id)
            .field("encoding", &self.encoding)
            .field("byte_stream", &self.byte_stream.is_some())
            .field("char_stream", &self.char_stream.is_some())
            .finish()
    }
}
