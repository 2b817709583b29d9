//! Buffering byte stream with BOM detection and replay.
//!
//! Every byte handed out before `clear()` is also appended to an internal
//! buffer. When a `<meta>` tag reveals the real encoding mid-document, the
//! scanner calls [`PlaybackStream::playback`] and re-reads the document from
//! byte 0 through a fresh decoder. If `<body>` is reached first the buffer
//! is released instead.
//!
//! Invariants:
//! - While neither cleared nor in playback, reads append to the buffer.
//! - During playback, reads come exclusively from the buffer; exhausting it
//!   auto-clears and subsequent reads hit the underlying source directly.
//! - `clear()` during playback is ignored; the buffer is released when the
//!   playback completes.

use std::io::{self, Read};

/// Growth applied when a single-byte append fills the buffer.
const SINGLE_GROWTH: usize = 1024;
/// Extra slack applied when a bulk append overflows the buffer.
const BULK_GROWTH: usize = 512;

/// Byte stream that can replay everything it has produced so far.
pub struct PlaybackStream {
    inner: Box<dyn Read>,
    playback: bool,
    cleared: bool,
    detected: bool,
    buffer: Vec<u8>,
    byte_offset: usize,
    byte_length: usize,
    pushback_offset: usize,
    pushback_length: usize,
}

impl PlaybackStream {
    pub fn new(inner: Box<dyn Read>) -> Self {
        Self {
            inner,
            playback: false,
            cleared: false,
            detected: false,
            buffer: vec![0; SINGLE_GROWTH],
            byte_offset: 0,
            byte_length: 0,
            pushback_offset: 0,
            pushback_length: 0,
        }
    }

    /// Probe up to three bytes for a byte-order mark.
    ///
    /// Returns `(iana, native)` names: `("UTF-8", "UTF-8")` for the UTF-8
    /// BOM (consumed), `("UTF-16", "UTF-16LE"/"UTF-16BE")` for the UTF-16
    /// BOMs (consumed; the decoder must not expect another mark). Without a
    /// BOM both are `None` and the probed bytes are pushed back to be
    /// re-read. Detection runs at most once per stream.
    pub fn detect_encoding(
        &mut self,
    ) -> io::Result<(Option<&'static str>, Option<&'static str>)> {
        if self.detected {
            return Err(io::Error::other("should not detect encoding twice"));
        }
        self.detected = true;
        let Some(b1) = self.read_byte()? else {
            return Ok((None, None));
        };
        let Some(b2) = self.read_byte()? else {
            self.pushback_length = 1;
            return Ok((None, None));
        };
        if b1 == 0xEF && b2 == 0xBB {
            return match self.read_byte()? {
                Some(0xBF) => {
                    // BOM consumed; nothing to push back.
                    self.pushback_offset = 3;
                    Ok((Some("UTF-8"), Some("UTF-8")))
                }
                Some(_) => {
                    self.pushback_length = 3;
                    Ok((None, None))
                }
                None => {
                    self.pushback_length = 2;
                    Ok((None, None))
                }
            };
        }
        if b1 == 0xFF && b2 == 0xFE {
            return Ok((Some("UTF-16"), Some("UTF-16LE")));
        }
        if b1 == 0xFE && b2 == 0xFF {
            return Ok((Some("UTF-16"), Some("UTF-16BE")));
        }
        self.pushback_length = 2;
        Ok((None, None))
    }

    /// Switch to replaying the buffered bytes from offset 0.
    pub fn playback(&mut self) {
        self.playback = true;
    }

    /// Stop buffering and release the buffer.
    ///
    /// Ignored during playback; the buffer is released automatically when
    /// the replay is exhausted. A pending pushback remainder keeps the
    /// buffer alive until it drains.
    pub fn clear(&mut self) {
        if !self.playback {
            self.cleared = true;
            if self.pushback_offset >= self.pushback_length {
                self.release();
            }
        }
    }

    fn release(&mut self) {
        self.buffer = Vec::new();
        self.byte_offset = 0;
        self.byte_length = 0;
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        if self.pushback_offset < self.pushback_length {
            let byte = self.buffer[self.pushback_offset];
            self.pushback_offset += 1;
            if self.cleared && self.pushback_offset >= self.pushback_length {
                self.release();
            }
            return Ok(Some(byte));
        }
        if self.cleared {
            let mut one = [0u8; 1];
            return match self.inner.read(&mut one)? {
                0 => Ok(None),
                _ => Ok(Some(one[0])),
            };
        }
        if self.playback {
            if self.byte_offset < self.byte_length {
                let byte = self.buffer[self.byte_offset];
                self.byte_offset += 1;
                if self.byte_offset == self.byte_length {
                    self.cleared = true;
                    self.release();
                }
                return Ok(Some(byte));
            }
            self.cleared = true;
            self.release();
            return self.read_byte();
        }
        let mut one = [0u8; 1];
        match self.inner.read(&mut one)? {
            0 => Ok(None),
            _ => {
                if self.byte_length == self.buffer.len() {
                    self.buffer.resize(self.byte_length + SINGLE_GROWTH, 0);
                }
                self.buffer[self.byte_length] = one[0];
                self.byte_length += 1;
                Ok(Some(one[0]))
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn buffered_len(&self) -> usize {
        self.byte_length
    }

    #[cfg(test)]
    pub(crate) fn buffer_capacity(&self) -> usize {
        self.buffer.len()
    }
}

impl Read for PlaybackStream {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if out.is_empty() {
            return Ok(0);
        }
        if self.pushback_offset < self.pushback_length {
            let count = (self.pushback_length - self.pushback_offset).min(out.len());
            out[..count].copy_from_slice(
                &self.buffer[self.pushback_offset..self.pushback_offset + count],
            );
            self.pushback_offset += count;
            if self.cleared && self.pushback_offset >= self.pushback_length {
                self.release();
            }
            return Ok(count);
        }
        if self.cleared {
            return self.inner.read(out);
        }
        if self.playback {
            let remaining = self.byte_length - self.byte_offset;
            if remaining == 0 {
                self.cleared = true;
                self.release();
                return self.inner.read(out);
            }
            let count = remaining.min(out.len());
            out[..count]
                .copy_from_slice(&self.buffer[self.byte_offset..self.byte_offset + count]);
            self.byte_offset += count;
            if self.byte_offset == self.byte_length {
                self.cleared = true;
                self.release();
            }
            return Ok(count);
        }
        let count = self.inner.read(out)?;
        if count > 0 {
            if self.byte_length + count > self.buffer.len() {
                self.buffer.resize(self.byte_length + count + BULK_GROWTH, 0);
            }
            self.buffer[self.byte_length..self.byte_length + count]
                .copy_from_slice(&out[..count]);
            self.byte_length += count;
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn stream(bytes: &[u8]) -> PlaybackStream {
        PlaybackStream::new(Box::new(Cursor::new(bytes.to_vec())))
    }

    fn read_all(stream: &mut PlaybackStream) -> Vec<u8> {
        let mut out = Vec::new();
        stream.read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn utf8_bom_is_detected_and_consumed() {
        let mut s = stream(b"\xEF\xBB\xBF<p>");
        let (iana, native) = s.detect_encoding().unwrap();
        assert_eq!(iana, Some("UTF-8"));
        assert_eq!(native, Some("UTF-8"));
        assert_eq!(read_all(&mut s), b"<p>");
    }

    #[test]
    fn utf16_boms_are_detected() {
        let mut le = stream(b"\xFF\xFE<\x00");
        assert_eq!(le.detect_encoding().unwrap(), (Some("UTF-16"), Some("UTF-16LE")));
        assert_eq!(read_all(&mut le), b"<\x00");

        let mut be = stream(b"\xFE\xFF\x00<");
        assert_eq!(be.detect_encoding().unwrap(), (Some("UTF-16"), Some("UTF-16BE")));
        assert_eq!(read_all(&mut be), b"\x00<");
    }

    #[test]
    fn probed_bytes_are_pushed_back_without_a_bom() {
        let mut s = stream(b"<p>x</p>");
        assert_eq!(s.detect_encoding().unwrap(), (None, None));
        assert_eq!(read_all(&mut s), b"<p>x</p>");
    }

    #[test]
    fn partial_utf8_bom_is_pushed_back_whole() {
        let mut s = stream(b"\xEF\xBBx rest");
        assert_eq!(s.detect_encoding().unwrap(), (None, None));
        assert_eq!(read_all(&mut s), b"\xEF\xBBx rest");
    }

    #[test]
    fn detection_refuses_to_run_twice() {
        let mut s = stream(b"<p>");
        s.detect_encoding().unwrap();
        assert!(s.detect_encoding().is_err());
    }

    #[test]
    fn playback_replays_from_byte_zero_then_reads_through() {
        let mut s = stream(b"abcdef");
        let mut head = [0u8; 3];
        s.read_exact(&mut head).unwrap();
        assert_eq!(&head, b"abc");
        s.playback();
        assert_eq!(read_all(&mut s), b"abcdef");
    }

    #[test]
    fn clear_releases_the_buffer_and_stops_appending() {
        let mut s = stream(b"abcdef");
        let mut head = [0u8; 2];
        s.read_exact(&mut head).unwrap();
        assert_eq!(s.buffered_len(), 2);
        s.clear();
        assert_eq!(s.buffered_len(), 0);
        assert_eq!(read_all(&mut s), b"cdef");
        assert_eq!(s.buffered_len(), 0);
    }

    #[test]
    fn clear_is_a_no_op_during_playback() {
        let mut s = stream(b"abc");
        let mut head = [0u8; 3];
        s.read_exact(&mut head).unwrap();
        s.playback();
        s.clear();
        assert_eq!(read_all(&mut s), b"abc");
    }

    #[test]
    fn playback_exhaustion_auto_clears() {
        let mut s = stream(b"ab-tail");
        let mut head = [0u8; 2];
        s.read_exact(&mut head).unwrap();
        s.playback();
        let mut replay = [0u8; 2];
        s.read_exact(&mut replay).unwrap();
        assert_eq!(&replay, b"ab");
        // The replay is exhausted; the buffer is gone and reads continue
        // from the underlying source.
        assert_eq!(s.buffered_len(), 0);
        assert_eq!(read_all(&mut s), b"-tail");
    }

    #[test]
    fn growth_steps_are_deterministic() {
        let bytes = vec![b'x'; 1500];
        let mut s = PlaybackStream::new(Box::new(Cursor::new(bytes)));
        assert_eq!(s.buffer_capacity(), 1024);
        for _ in 0..1024 {
            s.read_byte().unwrap();
        }
        assert_eq!(s.buffer_capacity(), 1024);
        s.read_byte().unwrap();
        // Single-byte appends grow by exactly 1024.
        assert_eq!(s.buffer_capacity(), 2048);

        let bytes = vec![b'y'; 4096];
        let mut s = PlaybackStream::new(Box::new(Cursor::new(bytes)));
        let mut chunk = [0u8; 2048];
        s.read_exact(&mut chunk).unwrap();
        // Bulk appends grow to length + count + 512.
        assert_eq!(s.buffer_capacity(), 2560);
        assert_eq!(s.buffered_len(), 2048);
    }
}
