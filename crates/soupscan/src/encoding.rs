//! Encoding-name resolution over the WHATWG label registry.
//!
//! Two steps are kept distinct on purpose: mapping a declared IANA label to
//! a native decoder name can fail separately from constructing the decoder,
//! and each failure carries its own diagnostic.

use encoding_rs::Encoding;

/// Map an IANA-style label to the canonical name of the decoder that
/// handles it, or `None` when no decoder recognizes the label.
pub fn iana_to_native(iana: &str) -> Option<&'static str> {
    Encoding::for_label(iana.trim().as_bytes()).map(|e| e.name())
}

/// Decoder handle for a (native) encoding name.
pub fn for_name(name: &str) -> Option<&'static Encoding> {
    Encoding::for_label(name.trim().as_bytes())
}
