//! Byte and character stream plumbing underneath the scanner.

mod decode;
mod entity;
mod playback;

pub use decode::{CharStream, DecodingReader, StringReader};
pub use entity::CurrentEntity;
pub use playback::PlaybackStream;

pub(crate) use entity::is_space;
