//! The primary content scanner: text, entity references, comments, start
//! and end tags, attributes, and the meta-charset re-decode.

use std::io;
use std::rc::Rc;

use memchr::{memchr, memchr2};

use crate::catalog;
use crate::encoding;
use crate::shared::error::Diagnostic;
use crate::shared::event::QName;
use crate::stream::{DecodingReader, is_space};

use super::states::{ActiveScanner, ContentOutcome, ScannerState};
use super::{Fault, HtmlScanner, ScanResult};

impl HtmlScanner {
    /// Run the content state machine: one chunk, or to completion.
    ///
    /// Returns whether more scanning remains (`false` only after
    /// `end_document`).
    pub(crate) fn scan_content(&mut self, complete: bool) -> io::Result<bool> {
        loop {
            let next = match self.content_step() {
                Ok(ContentOutcome::Continue { next }) => next,
                Ok(ContentOutcome::EnteredSpecial) => return Ok(true),
                Ok(ContentOutcome::Finished) => return Ok(false),
                Err(Fault::EndOfEntity) => {
                    // The active entity ran dry: resume a suspended one, or
                    // wind the document down.
                    if self.entity_stack.is_empty() {
                        self.set_scanner_state(ScannerState::EndDocument);
                    } else {
                        self.entity = self.entity_stack.pop();
                    }
                    true
                }
                Err(Fault::Io(error)) => return Err(error),
            };
            if !(next || complete) {
                return Ok(true);
            }
        }
    }

    fn content_step(&mut self) -> ScanResult<ContentOutcome> {
        match self.state {
            ScannerState::StartDocument => {
                if self.emission_allowed() {
                    let locator = self.locator_snapshot();
                    let encoding_name = self.iana_encoding.clone();
                    self.sync_location_item();
                    let augs = self.config.augmentations.then_some(&self.location_item);
                    if let Some(handler) = self.handler.as_deref_mut() {
                        handler.start_document(&locator, Some(&encoding_name), augs);
                    }
                    self.drain_pushed_sources();
                }
                self.set_scanner_state(ScannerState::Content);
                Ok(ContentOutcome::Continue { next: false })
            }
            ScannerState::Content => {
                self.mark_begin();
                match self.ent().read()? {
                    Some('<') => {
                        self.set_scanner_state(ScannerState::MarkupBracket);
                        Ok(ContentOutcome::Continue { next: true })
                    }
                    Some('&') => {
                        self.scan_entity_ref(true)?;
                        Ok(ContentOutcome::Continue { next: false })
                    }
                    None => Err(Fault::EndOfEntity),
                    Some(_) => {
                        self.ent().push_back();
                        self.scan_characters()?;
                        Ok(ContentOutcome::Continue { next: false })
                    }
                }
            }
            ScannerState::MarkupBracket => {
                match self.ent().read()? {
                    Some('!') => {
                        let dashes =
                            self.ent().read()? == Some('-') && self.ent().read()? == Some('-');
                        if dashes {
                            self.scan_comment()?;
                        } else {
                            self.report_error(Diagnostic::BangNotComment);
                            self.ent().skip_markup()?;
                        }
                    }
                    Some('?') => self.scan_pi()?,
                    Some('/') => self.scan_end_element()?,
                    None => {
                        self.report_error(Diagnostic::EofAfterBracket);
                        return Err(Fault::EndOfEntity);
                    }
                    Some(_) => {
                        self.ent().push_back();
                        self.element_count += 1;
                        if let Some(name) = self.scan_start_element()?
                            && catalog::is_special(&name)
                        {
                            self.set_active(ActiveScanner::Special(name));
                            self.set_scanner_state(ScannerState::Content);
                            return Ok(ContentOutcome::EnteredSpecial);
                        }
                    }
                }
                self.set_scanner_state(ScannerState::Content);
                Ok(ContentOutcome::Continue { next: false })
            }
            ScannerState::EndDocument => {
                if self.emission_allowed() {
                    self.mark_end();
                    self.sync_location_item();
                    let augs = self.config.augmentations.then_some(&self.location_item);
                    if let Some(handler) = self.handler.as_deref_mut() {
                        handler.end_document(augs);
                    }
                    self.drain_pushed_sources();
                }
                Ok(ContentOutcome::Finished)
            }
        }
    }

    /// Scan a run of character content out of the buffer.
    ///
    /// The leading newline run (already counted by `skip_newlines`) is
    /// overwritten in place with `\n`, then the run extends to the next
    /// delimiter or the buffer end and is delivered as one event.
    fn scan_characters(&mut self) -> ScanResult<()> {
        let newlines = self.ent().skip_newlines()?;
        let (start, end) = {
            let entity = self.ent();
            if newlines == 0 && entity.offset == entity.length {
                return Ok(());
            }
            let start = entity.offset - newlines;
            for slot in &mut entity.buffer[start..entity.offset] {
                *slot = '\n';
            }
            while entity.offset < entity.length {
                let c = entity.buffer[entity.offset];
                if matches!(c, '<' | '&' | '\r' | '\n') {
                    break;
                }
                entity.offset += 1;
                entity.column_number += 1;
            }
            (start, entity.offset)
        };
        if end > start && self.emission_allowed() {
            let Self {
                entity,
                string_buffer,
                ..
            } = self;
            if let Some(entity) = entity.as_ref() {
                string_buffer.clear();
                string_buffer.extend(entity.buffer[start..end].iter());
            }
            self.emit_characters_scratch();
        }
        Ok(())
    }

    /// Scan a comment body up to `-->`.
    ///
    /// A run of n >= 2 dashes followed by `>` terminates the comment and
    /// contributes n-2 dashes; any dash run followed by something else
    /// contributes all its dashes and scanning continues.
    fn scan_comment(&mut self) -> ScanResult<()> {
        self.string_buffer.clear();
        loop {
            let Some(c) = self.ent().read()? else {
                self.report_error(Diagnostic::EofInMarkup);
                return Err(Fault::EndOfEntity);
            };
            match c {
                '-' => {
                    let mut count = 1;
                    let after = loop {
                        match self.ent().read()? {
                            Some('-') => count += 1,
                            other => break other,
                        }
                    };
                    let Some(after) = after else {
                        self.report_error(Diagnostic::EofInMarkup);
                        return Err(Fault::EndOfEntity);
                    };
                    if count < 2 {
                        self.string_buffer.push('-');
                        self.ent().push_back();
                        continue;
                    }
                    if after != '>' {
                        for _ in 0..count {
                            self.string_buffer.push('-');
                        }
                        self.ent().push_back();
                        continue;
                    }
                    for _ in 0..count - 2 {
                        self.string_buffer.push('-');
                    }
                    break;
                }
                '\r' | '\n' => {
                    self.ent().push_back();
                    let count = self.ent().skip_newlines()?;
                    for _ in 0..count {
                        self.string_buffer.push('\n');
                    }
                }
                other => self.string_buffer.push(other),
            }
        }
        if self.emission_allowed() {
            self.emit_comment_scratch();
        }
        Ok(())
    }

    /// Processing instructions are not expanded: report and discard.
    fn scan_pi(&mut self) -> ScanResult<()> {
        self.report_warning(Diagnostic::ProcessingInstruction);
        self.ent().skip_markup()?;
        Ok(())
    }

    /// Scan a start tag. Returns the (case-transformed) element name, or
    /// `None` when the tag had no name and was discarded.
    fn scan_start_element(&mut self) -> ScanResult<Option<String>> {
        let Some(raw_name) = self.ent().scan_name()? else {
            self.report_error(Diagnostic::MissingElementName);
            self.ent().skip_markup()?;
            return Ok(None);
        };
        let ename = self.config.names_elems.apply(&raw_name);
        self.attributes.clear();
        let begin_line = self.begin_line;
        let begin_column = self.begin_column;
        while self.scan_attribute()? {}
        // The event's begin location is the `<`, not the last attribute.
        self.begin_line = begin_line;
        self.begin_column = begin_column;
        if self.byte_stream.is_some() && self.element_depth == -1 {
            self.update_byte_buffering(&ename);
        }
        if self.emission_allowed() {
            let qname = QName::plain(&ename);
            self.emit_start_element(&qname);
        }
        Ok(Some(ename))
    }

    /// Early-document byte-buffer policy, applied while an encoding switch
    /// is still possible: `<meta http-equiv=content-type content=…charset=…>`
    /// triggers the re-decode; reaching `<body>` (or an element that
    /// defaults into it) releases the buffer instead.
    fn update_byte_buffering(&mut self, ename: &str) {
        let Some(stream) = self.byte_stream.clone() else {
            return;
        };
        if ename.eq_ignore_ascii_case("meta") {
            let charset = {
                let http_equiv = self.attributes.value_ignore_case("http-equiv");
                if !http_equiv.is_some_and(|v| v.eq_ignore_ascii_case("content-type")) {
                    return;
                }
                let Some(content) = self.attributes.value_ignore_case("content") else {
                    return;
                };
                let Some(index) = find_ignore_ascii_case(content, b"charset=") else {
                    return;
                };
                let rest = &content[index + b"charset=".len()..];
                let end = rest.find(';').unwrap_or(rest.len());
                rest[..end].to_owned()
            };
            let native = match encoding::iana_to_native(&charset) {
                Some(native) => native.to_owned(),
                None => {
                    self.report_error(Diagnostic::UnknownIanaEncoding {
                        iana: charset.clone(),
                    });
                    charset.clone()
                }
            };
            match encoding::for_name(&native) {
                Some(decoder) => {
                    #[cfg(any(test, feature = "debug-stats"))]
                    log::trace!(
                        target: "soupscan.scanner",
                        "re-decoding from byte 0 as {native}"
                    );
                    stream.borrow_mut().playback();
                    let reader = DecodingReader::new(Rc::clone(&stream), decoder);
                    // Suppress duplicate events until the replay catches up
                    // to the elements already delivered.
                    self.element_depth = self.element_count;
                    self.element_count = 0;
                    let entity = self.ent();
                    entity.stream = Box::new(reader);
                    entity.offset = 0;
                    entity.length = 0;
                    entity.line_number = 1;
                    entity.column_number = 1;
                }
                None => {
                    self.report_error(Diagnostic::UnsupportedEncoding { charset });
                    // No decoder will ever consume the buffered prefix.
                    stream.borrow_mut().clear();
                }
            }
        } else if ename.eq_ignore_ascii_case("body") {
            stream.borrow_mut().clear();
        } else if let Some(info) = catalog::element(ename)
            && info
                .parents
                .first()
                .is_some_and(|parent| parent.eq_ignore_ascii_case("body"))
        {
            stream.borrow_mut().clear();
        }
    }

    /// Scan one attribute. Returns whether more may follow; `false` means
    /// the tag is closed.
    fn scan_attribute(&mut self) -> ScanResult<bool> {
        self.ent().skip_spaces()?;
        self.mark_begin();
        let Some(c) = self.ent().read()? else {
            self.report_error(Diagnostic::EofInMarkup);
            return Err(Fault::EndOfEntity);
        };
        if c == '>' {
            return Ok(false);
        }
        self.ent().push_back();
        let Some(raw_name) = self.ent().scan_name()? else {
            self.report_error(Diagnostic::MissingAttributeName);
            self.ent().skip_markup()?;
            return Ok(false);
        };
        let aname = self.config.names_attrs.apply(&raw_name);
        self.ent().skip_spaces()?;
        let Some(c) = self.ent().read()? else {
            self.report_error(Diagnostic::EofInMarkup);
            return Err(Fault::EndOfEntity);
        };
        if c == '/' || c == '>' {
            self.push_attribute(&aname, String::new());
            if c == '/' {
                self.ent().skip_markup()?;
            }
            return Ok(false);
        }
        if c == '=' {
            self.ent().skip_spaces()?;
            let Some(c) = self.ent().read()? else {
                self.report_error(Diagnostic::EofInMarkup);
                return Err(Fault::EndOfEntity);
            };
            if c == '>' {
                self.push_attribute(&aname, String::new());
                return Ok(false);
            }
            if c != '\'' && c != '"' {
                // Unquoted value, e.g. <a href=/x>: runs to whitespace or
                // the closing bracket.
                self.string_buffer.clear();
                self.string_buffer.push(c);
                loop {
                    let Some(c) = self.ent().read()? else {
                        self.report_error(Diagnostic::EofInMarkup);
                        return Err(Fault::EndOfEntity);
                    };
                    if is_space(c) || c == '>' {
                        self.ent().push_back();
                        break;
                    }
                    if c == '&' {
                        match self.scan_entity_ref(false)? {
                            Some(resolved) => self.string_buffer.push(resolved),
                            None => self.string_buffer.push_str(&self.ref_buffer),
                        }
                    } else {
                        self.string_buffer.push(c);
                    }
                }
                let value = std::mem::take(&mut self.string_buffer);
                self.push_attribute(&aname, value);
                return Ok(true);
            }
            let quote = c;
            self.string_buffer.clear();
            loop {
                let Some(c) = self.ent().read()? else {
                    self.report_error(Diagnostic::EofInMarkup);
                    return Err(Fault::EndOfEntity);
                };
                if c == '&' {
                    match self.scan_entity_ref(false)? {
                        Some(resolved) => self.string_buffer.push(resolved),
                        // Unresolvable references keep their literal text.
                        None => self.string_buffer.push_str(&self.ref_buffer),
                    }
                } else if c != quote {
                    self.string_buffer.push(c);
                } else {
                    break;
                }
            }
            let value = std::mem::take(&mut self.string_buffer);
            self.push_attribute(&aname, value);
            return Ok(true);
        }
        // Value-less attribute; the terminator is reprocessed by the next
        // scan_attribute round.
        self.ent().push_back();
        self.push_attribute(&aname, String::new());
        Ok(true)
    }

    /// Scan an end tag: name, then everything up to `>`.
    fn scan_end_element(&mut self) -> ScanResult<()> {
        let raw_name = self.ent().scan_name()?;
        if raw_name.is_none() {
            self.report_error(Diagnostic::MissingEndElementName);
        }
        self.ent().skip_markup()?;
        if let Some(raw_name) = raw_name {
            let ename = self.config.names_elems.apply(&raw_name);
            if self.emission_allowed() {
                let qname = QName::plain(&ename);
                self.emit_end_element(&qname);
            }
        }
        Ok(())
    }
}

/// Byte position of `needle` in `haystack`, ASCII-case-insensitively.
fn find_ignore_ascii_case(haystack: &str, needle: &[u8]) -> Option<usize> {
    let hay = haystack.as_bytes();
    let n = needle.len();
    if n == 0 {
        return Some(0);
    }
    if hay.len() < n {
        return None;
    }
    let first = needle[0];
    let (lower, upper) = if first.is_ascii_alphabetic() {
        (first.to_ascii_lowercase(), first.to_ascii_uppercase())
    } else {
        (first, first)
    };
    let mut i = 0;
    while i + n <= hay.len() {
        let rel = if lower == upper {
            memchr(lower, &hay[i..])
        } else {
            memchr2(lower, upper, &hay[i..])
        };
        let pos = i + rel?;
        if pos + n <= hay.len() && hay[pos..pos + n].eq_ignore_ascii_case(needle) {
            return Some(pos);
        }
        i = pos + 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::find_ignore_ascii_case;

    #[test]
    fn finds_needles_in_any_case() {
        assert_eq!(
            find_ignore_ascii_case("text/html;charset=utf-8", b"charset="),
            Some(10)
        );
        assert_eq!(
            find_ignore_ascii_case("text/html;CHARSET=utf-8", b"charset="),
            Some(10)
        );
        assert_eq!(find_ignore_ascii_case("text/html", b"charset="), None);
        assert_eq!(find_ignore_ascii_case("", b"charset="), None);
        assert_eq!(find_ignore_ascii_case("charset=x", b"charset="), Some(0));
    }
}
