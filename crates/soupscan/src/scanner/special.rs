//! Raw-text scanning for special elements (SCRIPT, STYLE, and friends).
//!
//! Inside a special element, markup and entity references do not apply:
//! everything is character data until the element's own end tag. A `</`
//! followed by any other name is literal text.

use std::io;

use crate::shared::error::Diagnostic;
use crate::shared::event::QName;

use super::states::{ActiveScanner, ScannerState, SpecialOutcome};
use super::{Fault, HtmlScanner};

impl HtmlScanner {
    /// Run the special-text scanner for `element`: one chunk, or until the
    /// matching end tag hands control back to the content scanner.
    pub(crate) fn scan_special(&mut self, element: &str, complete: bool) -> io::Result<bool> {
        loop {
            match self.special_step(element) {
                Ok(SpecialOutcome::BackToContent) => return Ok(true),
                Ok(SpecialOutcome::Continue) => {
                    if !complete {
                        return Ok(true);
                    }
                }
                Err(Fault::EndOfEntity) => {
                    self.set_active(ActiveScanner::Content);
                    if self.entity_stack.is_empty() {
                        self.set_scanner_state(ScannerState::EndDocument);
                    } else {
                        self.entity = self.entity_stack.pop();
                        self.set_scanner_state(ScannerState::Content);
                    }
                    return Ok(true);
                }
                Err(Fault::Io(error)) => return Err(error),
            }
        }
    }

    fn special_step(&mut self, element: &str) -> Result<SpecialOutcome, Fault> {
        self.mark_begin();
        match self.ent().read()? {
            Some('<') => match self.ent().read()? {
                Some('/') => {
                    if let Some(raw_name) = self.ent().scan_name()? {
                        if raw_name.eq_ignore_ascii_case(element) {
                            let ename = self.config.names_elems.apply(&raw_name);
                            self.ent().skip_markup()?;
                            if self.emission_allowed() {
                                let qname = QName::plain(&ename);
                                self.emit_end_element(&qname);
                            }
                            self.set_active(ActiveScanner::Content);
                            self.set_scanner_state(ScannerState::Content);
                            return Ok(SpecialOutcome::BackToContent);
                        }
                        // Some other end tag: raw text.
                        self.string_buffer.clear();
                        self.string_buffer.push_str("</");
                        self.string_buffer.push_str(&raw_name);
                    } else {
                        self.string_buffer.clear();
                        self.string_buffer.push_str("</");
                    }
                }
                Some(c) => {
                    self.string_buffer.clear();
                    self.string_buffer.push('<');
                    self.string_buffer.push(c);
                }
                None => {
                    self.string_buffer.clear();
                    self.string_buffer.push('<');
                }
            },
            None => {
                self.report_error(Diagnostic::EofInMarkup);
                return Err(Fault::EndOfEntity);
            }
            Some(c) => {
                self.string_buffer.clear();
                self.string_buffer.push(c);
            }
        }
        self.scan_special_characters()?;
        Ok(SpecialOutcome::Continue)
    }

    /// Accumulate raw text into the scratch buffer until `<` or end of
    /// input, normalizing `\r` and `\r\n` to `\n`, then deliver the buffer
    /// as one characters event.
    fn scan_special_characters(&mut self) -> Result<(), Fault> {
        loop {
            let Some(c) = self.ent().read()? else {
                break;
            };
            if c == '<' {
                self.ent().push_back();
                break;
            }
            if c == '\r' {
                self.string_buffer.push('\n');
                match self.ent().read()? {
                    None => break,
                    Some('\n') => {}
                    // Not part of a CR LF pair: reprocess it.
                    Some(_) => self.ent().push_back(),
                }
            } else {
                self.string_buffer.push(c);
            }
        }
        if !self.string_buffer.is_empty() && self.emission_allowed() {
            self.emit_characters_scratch();
        }
        Ok(())
    }
}
