//! The character-level sliding window the lexical primitives run over.

use std::io;

use crate::stream::CharStream;

pub(crate) const DEFAULT_BUFFER_SIZE: usize = 2048;

/// Legacy whitespace predicate: space, tab, LF, FF, CR.
///
/// Used consistently by `skip_spaces` and the unquoted-attribute-value
/// terminator.
pub(crate) fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0c' | '\r')
}

/// Name characters: Unicode letters and digits plus `-`, `.`, `:`.
pub(crate) fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '-' | '.' | ':')
}

/// One decoded character stream being scanned, with location tracking.
///
/// Invariants: `0 <= offset <= length <= buffer.len()`; `offset == length`
/// forces a refill on the next read; `column_number` advances by exactly one
/// per consumed character except when `skip_newlines` resets it to 1.
pub struct CurrentEntity {
    pub(crate) stream: Box<dyn CharStream>,
    pub(crate) public_id: Option<String>,
    pub(crate) base_system_id: Option<String>,
    pub(crate) literal_system_id: Option<String>,
    pub(crate) expanded_system_id: Option<String>,
    pub(crate) line_number: u32,
    pub(crate) column_number: u32,
    pub(crate) buffer: Box<[char]>,
    pub(crate) offset: usize,
    pub(crate) length: usize,
}

impl CurrentEntity {
    pub(crate) fn new(
        stream: Box<dyn CharStream>,
        public_id: Option<String>,
        base_system_id: Option<String>,
        literal_system_id: Option<String>,
        expanded_system_id: Option<String>,
    ) -> Self {
        Self::with_capacity(
            stream,
            public_id,
            base_system_id,
            literal_system_id,
            expanded_system_id,
            DEFAULT_BUFFER_SIZE,
        )
    }

    pub(crate) fn with_capacity(
        stream: Box<dyn CharStream>,
        public_id: Option<String>,
        base_system_id: Option<String>,
        literal_system_id: Option<String>,
        expanded_system_id: Option<String>,
        capacity: usize,
    ) -> Self {
        Self {
            stream,
            public_id,
            base_system_id,
            literal_system_id,
            expanded_system_id,
            line_number: 1,
            column_number: 1,
            buffer: vec!['\0'; capacity].into_boxed_slice(),
            offset: 0,
            length: 0,
        }
    }

    /// Next character, or `None` at end of input.
    pub(crate) fn read(&mut self) -> io::Result<Option<char>> {
        if self.offset == self.length && self.load(0)?.is_none() {
            return Ok(None);
        }
        let c = self.buffer[self.offset];
        self.offset += 1;
        self.column_number += 1;
        Ok(Some(c))
    }

    /// Rewind one position after a successful `read`.
    pub(crate) fn push_back(&mut self) {
        self.offset -= 1;
        self.column_number -= 1;
    }

    /// Refill `buffer[offset..]` from the character source.
    ///
    /// Sets `length` and `offset` accordingly and returns the count newly
    /// read, or `None` at end of input.
    pub(crate) fn load(&mut self, offset: usize) -> io::Result<Option<usize>> {
        let count = self.stream.read(&mut self.buffer[offset..])?;
        self.offset = offset;
        if count == 0 {
            self.length = offset;
            Ok(None)
        } else {
            self.length = offset + count;
            Ok(Some(count))
        }
    }

    /// Collect a run of name characters, spanning buffer refills.
    ///
    /// Returns `None` when no character matched or the buffer could not be
    /// refilled.
    pub(crate) fn scan_name(&mut self) -> io::Result<Option<String>> {
        if self.offset == self.length && self.load(0)?.is_none() {
            return Ok(None);
        }
        let mut start = self.offset;
        loop {
            while self.offset < self.length {
                if !is_name_char(self.buffer[self.offset]) {
                    break;
                }
                self.offset += 1;
                self.column_number += 1;
            }
            if self.offset != self.length {
                break;
            }
            // The token touches the buffer end: compact it to the front and
            // keep scanning after a refill. A token filling the whole buffer
            // leaves no room to refill and is cut at capacity.
            let kept = self.length - start;
            if kept == self.buffer.len() {
                break;
            }
            self.buffer.copy_within(start..self.length, 0);
            let exhausted = self.load(kept)?.is_none();
            start = 0;
            if exhausted {
                break;
            }
        }
        let count = self.offset - start;
        if count == 0 {
            return Ok(None);
        }
        Ok(Some(self.buffer[start..self.offset].iter().collect()))
    }

    /// Consume whitespace; newline runs are delegated to `skip_newlines`.
    pub(crate) fn skip_spaces(&mut self) -> io::Result<()> {
        loop {
            if self.offset == self.length && self.load(0)?.is_none() {
                break;
            }
            let c = self.buffer[self.offset];
            if !is_space(c) {
                break;
            }
            if c == '\r' || c == '\n' {
                self.skip_newlines()?;
                continue;
            }
            self.offset += 1;
            self.column_number += 1;
        }
        Ok(())
    }

    /// Consume a run of line terminators, counting each `\r\n`, `\r`, or
    /// `\n` as one line.
    ///
    /// While the run crosses a buffer boundary the first `newlines` slots
    /// are reserved ahead of the reload so the caller can overwrite the run
    /// in place. Afterwards the column resets to 1 and the line number
    /// advances by the count returned.
    pub(crate) fn skip_newlines(&mut self) -> io::Result<usize> {
        if self.offset == self.length && self.load(0)?.is_none() {
            return Ok(0);
        }
        if !matches!(self.buffer[self.offset], '\r' | '\n') {
            return Ok(0);
        }
        let mut newlines = 0;
        loop {
            let c = self.buffer[self.offset];
            self.offset += 1;
            match c {
                '\r' => {
                    newlines += 1;
                    if self.offset == self.length {
                        if newlines == self.buffer.len() {
                            break;
                        }
                        self.offset = newlines;
                        if self.load(newlines)?.is_none() {
                            break;
                        }
                    }
                    if self.buffer[self.offset] == '\n' {
                        self.offset += 1;
                    }
                }
                '\n' => {
                    newlines += 1;
                    if self.offset == self.length {
                        if newlines == self.buffer.len() {
                            break;
                        }
                        self.offset = newlines;
                        if self.load(newlines)?.is_none() {
                            break;
                        }
                    }
                }
                _ => {
                    self.offset -= 1;
                    break;
                }
            }
            if self.offset >= self.length {
                break;
            }
        }
        self.line_number += newlines as u32;
        self.column_number = 1;
        Ok(newlines)
    }

    /// Discard up to the `>` balancing the already-consumed `<`.
    ///
    /// Tracks a nesting depth starting at 1; returns at depth 0 or end of
    /// input. Inner newlines feed `skip_newlines`.
    pub(crate) fn skip_markup(&mut self) -> io::Result<()> {
        let mut depth = 1;
        'outer: loop {
            if self.offset == self.length && self.load(0)?.is_none() {
                break;
            }
            while self.offset < self.length {
                let c = self.buffer[self.offset];
                self.offset += 1;
                self.column_number += 1;
                match c {
                    '<' => depth += 1,
                    '>' => {
                        depth -= 1;
                        if depth == 0 {
                            break 'outer;
                        }
                    }
                    '\r' | '\n' => {
                        self.skip_newlines()?;
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }
}
