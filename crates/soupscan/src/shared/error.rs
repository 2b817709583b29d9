//! Recoverable diagnostics and the reporting seam.

use std::fmt;

/// A recoverable syntax or encoding anomaly.
///
/// Every variant carries a stable `HTML1000`–`HTML1012` code. Reporting is
/// gated by the `report-errors` feature; the scanner recovers and keeps
/// scanning in every case.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Diagnostic {
    /// HTML1000: no encoding declared; falling back to the default.
    NoEncodingDeclared,
    /// HTML1001: IANA encoding name with no native mapping; used as-is.
    UnknownIanaEncoding { iana: String },
    /// HTML1002: `<!` not followed by `--`.
    BangNotComment,
    /// HTML1003: end of input right after `<`.
    EofAfterBracket,
    /// HTML1004: entity reference without a terminating `;`.
    MalformedEntityRef,
    /// HTML1005: numeric character reference that does not parse to a
    /// Unicode scalar value.
    MalformedCharRef { name: String },
    /// HTML1006: named entity not in the table.
    UnknownEntity { name: String },
    /// HTML1007: end of input inside markup, an attribute, or a comment.
    EofInMarkup,
    /// HTML1008: processing instructions are not expanded.
    ProcessingInstruction,
    /// HTML1009: missing element name after `<`.
    MissingElementName,
    /// HTML1010: `<meta>` declared an encoding no decoder supports.
    UnsupportedEncoding { charset: String },
    /// HTML1011: missing attribute name.
    MissingAttributeName,
    /// HTML1012: missing element name after `</`.
    MissingEndElementName,
}

impl Diagnostic {
    /// Stable diagnostic code.
    pub fn code(&self) -> &'static str {
        match self {
            Diagnostic::NoEncodingDeclared => "HTML1000",
            Diagnostic::UnknownIanaEncoding { .. } => "HTML1001",
            Diagnostic::BangNotComment => "HTML1002",
            Diagnostic::EofAfterBracket => "HTML1003",
            Diagnostic::MalformedEntityRef => "HTML1004",
            Diagnostic::MalformedCharRef { .. } => "HTML1005",
            Diagnostic::UnknownEntity { .. } => "HTML1006",
            Diagnostic::EofInMarkup => "HTML1007",
            Diagnostic::ProcessingInstruction => "HTML1008",
            Diagnostic::MissingElementName => "HTML1009",
            Diagnostic::UnsupportedEncoding { .. } => "HTML1010",
            Diagnostic::MissingAttributeName => "HTML1011",
            Diagnostic::MissingEndElementName => "HTML1012",
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.code())?;
        match self {
            Diagnostic::NoEncodingDeclared => {
                write!(f, "no encoding declared; using the default")
            }
            Diagnostic::UnknownIanaEncoding { iana } => {
                write!(f, "unknown IANA encoding {iana:?}; using the name as-is")
            }
            Diagnostic::BangNotComment => write!(f, "'<!' is not followed by '--'"),
            Diagnostic::EofAfterBracket => write!(f, "end of input after '<'"),
            Diagnostic::MalformedEntityRef => {
                write!(f, "entity reference is missing its ';'")
            }
            Diagnostic::MalformedCharRef { name } => {
                write!(f, "malformed numeric character reference {name:?}")
            }
            Diagnostic::UnknownEntity { name } => write!(f, "unknown entity {name:?}"),
            Diagnostic::EofInMarkup => write!(f, "end of input inside markup"),
            Diagnostic::ProcessingInstruction => {
                write!(f, "processing instructions are not supported")
            }
            Diagnostic::MissingElementName => write!(f, "missing element name after '<'"),
            Diagnostic::UnsupportedEncoding { charset } => {
                write!(f, "unsupported encoding {charset:?} declared in <meta>")
            }
            Diagnostic::MissingAttributeName => write!(f, "missing attribute name"),
            Diagnostic::MissingEndElementName => {
                write!(f, "missing element name after '</'")
            }
        }
    }
}

/// Receives diagnostics when `report-errors` is enabled.
///
/// Errors and warnings are separate channels; both are recoverable from the
/// scanner's point of view.
pub trait ErrorReporter {
    fn report_error(&mut self, diagnostic: &Diagnostic);
    fn report_warning(&mut self, diagnostic: &Diagnostic);
}

/// Failure to apply a feature or property setting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The identifier names no known feature or property.
    NotRecognized { id: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NotRecognized { id } => {
                write!(f, "unrecognized feature or property id {id:?}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
