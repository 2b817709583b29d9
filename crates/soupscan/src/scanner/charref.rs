//! Entity-reference resolution: `&name;`, `&#N;`, `&#xH;`.

use crate::entities;
use crate::shared::error::Diagnostic;

use super::{HtmlScanner, ScanResult};

impl HtmlScanner {
    /// Resolve a reference after its `&` has been consumed.
    ///
    /// Returns the resolved character, or `None` when the reference was
    /// malformed or unknown — in which case `ref_buffer` holds the literal
    /// text (already delivered as characters in content mode; the caller
    /// appends it itself in attribute-value mode).
    pub(crate) fn scan_entity_ref(&mut self, content: bool) -> ScanResult<Option<char>> {
        self.ref_buffer.clear();
        self.ref_buffer.push('&');
        loop {
            match self.ent().read()? {
                Some(';') => {
                    self.ref_buffer.push(';');
                    break;
                }
                Some(c) if c.is_alphanumeric() || c == '#' => self.ref_buffer.push(c),
                Some(_) => {
                    self.report_warning(Diagnostic::MalformedEntityRef);
                    self.ent().push_back();
                    if content {
                        self.deliver_ref_literal();
                    }
                    return Ok(None);
                }
                None => {
                    self.report_warning(Diagnostic::MalformedEntityRef);
                    if content {
                        self.deliver_ref_literal();
                    }
                    return Ok(None);
                }
            }
        }
        let name: String = self.ref_buffer[1..self.ref_buffer.len() - 1].to_owned();
        if name.is_empty() {
            if content {
                self.deliver_ref_literal();
            }
            return Ok(None);
        }

        if let Some(digits) = name.strip_prefix('#') {
            let value = match digits.strip_prefix('x') {
                Some(hex) => u32::from_str_radix(hex, 16).ok(),
                None => digits.parse::<u32>().ok(),
            };
            return match value.and_then(char::from_u32) {
                Some(resolved) => {
                    if content {
                        self.deliver_resolved(&name, resolved, self.config.notify_char_refs);
                    }
                    Ok(Some(resolved))
                }
                None => {
                    self.report_error(Diagnostic::MalformedCharRef { name });
                    if content {
                        self.deliver_ref_literal();
                    }
                    Ok(None)
                }
            };
        }

        match entities::lookup(&name) {
            Some(resolved) => {
                let notify = self.config.notify_html_builtin_refs
                    || (self.config.notify_xml_builtin_refs && entities::is_xml_builtin(&name));
                if content {
                    self.deliver_resolved(&name, resolved, notify);
                }
                Ok(Some(resolved))
            }
            None => {
                self.report_warning(Diagnostic::UnknownEntity { name });
                if content {
                    self.deliver_ref_literal();
                }
                Ok(None)
            }
        }
    }

    /// Deliver the unresolvable reference text verbatim.
    fn deliver_ref_literal(&mut self) {
        if !self.emission_allowed() {
            return;
        }
        self.mark_end();
        self.sync_location_item();
        let augs = self.config.augmentations.then_some(&self.location_item);
        if let Some(handler) = self.handler.as_deref_mut() {
            handler.characters(&self.ref_buffer, augs);
        }
        self.drain_pushed_sources();
    }

    /// Deliver a resolved reference, optionally wrapped in general-entity
    /// events.
    fn deliver_resolved(&mut self, name: &str, resolved: char, notify: bool) {
        if !self.emission_allowed() {
            return;
        }
        self.mark_end();
        self.sync_location_item();
        let augs = self.config.augmentations.then_some(&self.location_item);
        let mut utf8 = [0u8; 4];
        let text: &str = resolved.encode_utf8(&mut utf8);
        if let Some(handler) = self.handler.as_deref_mut() {
            if notify {
                handler.start_general_entity(name, augs);
            }
            handler.characters(text, augs);
            if notify {
                handler.end_general_entity(name, augs);
            }
        }
        self.drain_pushed_sources();
    }
}
