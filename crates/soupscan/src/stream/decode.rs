//! Character sources: decoded byte streams and in-memory text.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;

use encoding_rs::{CoderResult, Decoder, Encoding};

use crate::stream::PlaybackStream;

/// Bytes pulled from the underlying stream per decode step.
const BYTE_CHUNK: usize = 1024;

/// A pull source of decoded characters.
///
/// `Ok(0)` means end of input; a read into a non-empty buffer otherwise
/// yields at least one character.
pub trait CharStream {
    fn read(&mut self, buf: &mut [char]) -> io::Result<usize>;
}

/// Character source over an in-memory string.
pub struct StringReader {
    chars: Vec<char>,
    pos: usize,
}

impl StringReader {
    pub fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
        }
    }
}

impl CharStream for StringReader {
    fn read(&mut self, buf: &mut [char]) -> io::Result<usize> {
        let count = (self.chars.len() - self.pos).min(buf.len());
        buf[..count].copy_from_slice(&self.chars[self.pos..self.pos + count]);
        self.pos += count;
        Ok(count)
    }
}

/// Streaming decoder over the shared byte playback stream.
///
/// The scanner holds the same `Rc` so it can trigger playback or release
/// the buffer mid-parse; borrows never outlive a single `read` call. A
/// `<meta>`-driven encoding switch installs a fresh reader over the same
/// stream, discarding whatever this one had decoded ahead.
pub struct DecodingReader {
    stream: Rc<RefCell<PlaybackStream>>,
    decoder: Decoder,
    pending: VecDeque<char>,
    finished: bool,
}

impl DecodingReader {
    pub fn new(stream: Rc<RefCell<PlaybackStream>>, encoding: &'static Encoding) -> Self {
        Self {
            stream,
            // BOM bytes are handled (and consumed) at detection time; a
            // replayed mark must decode as ordinary content.
            decoder: encoding.new_decoder_without_bom_handling(),
            pending: VecDeque::new(),
            finished: false,
        }
    }

    fn decode_chunk(&mut self) -> io::Result<()> {
        use std::io::Read;

        let mut bytes = [0u8; BYTE_CHUNK];
        let count = self.stream.borrow_mut().read(&mut bytes)?;
        let last = count == 0;
        let mut decoded = String::with_capacity(
            self.decoder
                .max_utf8_buffer_length(count)
                .unwrap_or(count * 3 + 16),
        );
        let mut src = &bytes[..count];
        loop {
            let (result, read, _replaced) =
                self.decoder.decode_to_string(src, &mut decoded, last);
            src = &src[read..];
            match result {
                CoderResult::InputEmpty => break,
                CoderResult::OutputFull => decoded.reserve(
                    self.decoder
                        .max_utf8_buffer_length(src.len())
                        .unwrap_or(src.len() * 3 + 16),
                ),
            }
        }
        self.pending.extend(decoded.chars());
        if last {
            self.finished = true;
        }
        Ok(())
    }
}

impl CharStream for DecodingReader {
    fn read(&mut self, buf: &mut [char]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        loop {
            if !self.pending.is_empty() {
                let count = self.pending.len().min(buf.len());
                for slot in buf.iter_mut().take(count) {
                    *slot = self.pending.pop_front().expect("pending char");
                }
                return Ok(count);
            }
            if self.finished {
                return Ok(0);
            }
            self.decode_chunk()?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn decode_all(bytes: &[u8], label: &str) -> String {
        let stream = Rc::new(RefCell::new(PlaybackStream::new(Box::new(Cursor::new(
            bytes.to_vec(),
        )))));
        let encoding = Encoding::for_label(label.as_bytes()).unwrap();
        let mut reader = DecodingReader::new(stream, encoding);
        let mut out = String::new();
        let mut buf = ['\0'; 7];
        loop {
            let n = reader.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            out.extend(&buf[..n]);
        }
        out
    }

    #[test]
    fn string_reader_hands_out_chunks() {
        let mut reader = StringReader::new("abcé");
        let mut buf = ['\0'; 3];
        assert_eq!(reader.read(&mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], &['a', 'b', 'c']);
        assert_eq!(reader.read(&mut buf).unwrap(), 1);
        assert_eq!(buf[0], 'é');
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn decodes_windows_1252() {
        assert_eq!(decode_all(b"caf\xE9", "windows-1252"), "café");
    }

    #[test]
    fn decodes_utf8_multibyte_sequences() {
        assert_eq!(decode_all("π & σ".as_bytes(), "UTF-8"), "π & σ");
    }

    #[test]
    fn decodes_utf16le_without_expecting_a_mark() {
        let bytes: Vec<u8> = "<p>".encode_utf16().flat_map(u16::to_le_bytes).collect();
        assert_eq!(decode_all(&bytes, "UTF-16LE"), "<p>");
    }
}
