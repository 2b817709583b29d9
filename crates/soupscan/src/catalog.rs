//! Catalog of HTML 4 elements: content policy and default parents.
//!
//! The scanner asks two questions here: does an element's content scan as
//! opaque text until its own end tag (`special`), and what is its default
//! parent (used to decide when the byte buffer can no longer be needed for
//! an encoding replay). Unknown names have no entry and trigger neither.

use std::collections::HashMap;
use std::sync::OnceLock;

/// Catalog entry for one known element.
#[derive(Debug)]
pub struct ElementInfo {
    pub name: &'static str,
    /// Content is opaque text until the matching end tag.
    pub special: bool,
    /// Default parents, most specific first.
    pub parents: &'static [&'static str],
}

const HEAD: &[&str] = &["head"];
const HTML: &[&str] = &["html"];
const BODY: &[&str] = &["body"];
const NONE: &[&str] = &[];

macro_rules! elements {
    ($(($name:literal, $special:literal, $parents:expr),)*) => {
        &[$(ElementInfo { name: $name, special: $special, parents: $parents },)*]
    };
}

/// The known elements. Flow and phrasing content defaults to BODY; document
/// metadata defaults to HEAD; structural table/list/form parts name their
/// own containers.
const TABLE: &[ElementInfo] = elements![
    ("a", false, BODY),
    ("abbr", false, BODY),
    ("acronym", false, BODY),
    ("address", false, BODY),
    ("applet", false, BODY),
    ("area", false, &["map"]),
    ("b", false, BODY),
    ("base", false, HEAD),
    ("basefont", false, BODY),
    ("bdo", false, BODY),
    ("bgsound", false, HEAD),
    ("big", false, BODY),
    ("blink", false, BODY),
    ("blockquote", false, BODY),
    ("body", false, HTML),
    ("br", false, BODY),
    ("button", false, BODY),
    ("caption", false, &["table"]),
    ("center", false, BODY),
    ("cite", false, BODY),
    ("code", false, BODY),
    ("col", false, &["colgroup", "table"]),
    ("colgroup", false, &["table"]),
    ("comment", true, BODY),
    ("dd", false, &["dl"]),
    ("del", false, BODY),
    ("dfn", false, BODY),
    ("dir", false, BODY),
    ("div", false, BODY),
    ("dl", false, BODY),
    ("dt", false, &["dl"]),
    ("em", false, BODY),
    ("embed", false, BODY),
    ("fieldset", false, BODY),
    ("font", false, BODY),
    ("form", false, BODY),
    ("frame", false, &["frameset"]),
    ("frameset", false, HTML),
    ("h1", false, BODY),
    ("h2", false, BODY),
    ("h3", false, BODY),
    ("h4", false, BODY),
    ("h5", false, BODY),
    ("h6", false, BODY),
    ("head", false, HTML),
    ("hr", false, BODY),
    ("html", false, NONE),
    ("i", false, BODY),
    ("iframe", false, BODY),
    ("img", false, BODY),
    ("input", false, BODY),
    ("ins", false, BODY),
    ("isindex", false, HEAD),
    ("kbd", false, BODY),
    ("label", false, BODY),
    ("legend", false, &["fieldset"]),
    ("li", false, &["ul", "ol"]),
    ("link", false, HEAD),
    ("listing", false, BODY),
    ("map", false, BODY),
    ("marquee", false, BODY),
    ("menu", false, BODY),
    ("meta", false, HEAD),
    ("nobr", false, BODY),
    ("noembed", false, BODY),
    ("noframes", false, BODY),
    ("noscript", false, BODY),
    ("object", false, BODY),
    ("ol", false, BODY),
    ("optgroup", false, &["select"]),
    ("option", false, &["select"]),
    ("p", false, BODY),
    ("param", false, &["object", "applet"]),
    ("plaintext", true, BODY),
    ("pre", false, BODY),
    ("q", false, BODY),
    ("s", false, BODY),
    ("samp", false, BODY),
    ("script", true, &["head", "body"]),
    ("select", false, BODY),
    ("small", false, BODY),
    ("span", false, BODY),
    ("strike", false, BODY),
    ("strong", false, BODY),
    ("style", true, HEAD),
    ("sub", false, BODY),
    ("sup", false, BODY),
    ("table", false, BODY),
    ("tbody", false, &["table"]),
    ("td", false, &["tr"]),
    ("textarea", true, BODY),
    ("tfoot", false, &["table"]),
    ("th", false, &["tr"]),
    ("thead", false, &["table"]),
    ("title", true, HEAD),
    ("tr", false, &["tbody", "thead", "tfoot", "table"]),
    ("tt", false, BODY),
    ("u", false, BODY),
    ("ul", false, BODY),
    ("var", false, BODY),
    ("wbr", false, BODY),
    ("xmp", true, BODY),
];

fn map() -> &'static HashMap<&'static str, &'static ElementInfo> {
    static MAP: OnceLock<HashMap<&'static str, &'static ElementInfo>> = OnceLock::new();
    MAP.get_or_init(|| TABLE.iter().map(|info| (info.name, info)).collect())
}

/// Catalog entry for a name, matched ASCII-case-insensitively.
pub fn element(name: &str) -> Option<&'static ElementInfo> {
    if let Some(info) = map().get(name).copied() {
        return Some(info);
    }
    let folded = name.to_ascii_lowercase();
    map().get(folded.as_str()).copied()
}

/// Whether the element's content scans as opaque text.
pub fn is_special(name: &str) -> bool {
    element(name).is_some_and(|info| info.special)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_text_elements_are_special() {
        for name in ["script", "style", "comment", "title", "textarea", "xmp", "plaintext"] {
            assert!(is_special(name), "{name} should be special");
        }
        for name in ["p", "div", "pre", "noscript", "iframe"] {
            assert!(!is_special(name), "{name} should not be special");
        }
    }

    #[test]
    fn lookup_ignores_ascii_case() {
        assert!(is_special("SCRIPT"));
        assert!(is_special("Script"));
        assert_eq!(element("META").unwrap().parents, &["head"]);
    }

    #[test]
    fn default_parents_are_modeled() {
        assert_eq!(element("meta").unwrap().parents.first(), Some(&"head"));
        assert_eq!(element("title").unwrap().parents.first(), Some(&"head"));
        assert_eq!(element("p").unwrap().parents.first(), Some(&"body"));
        assert_eq!(element("table").unwrap().parents.first(), Some(&"body"));
        assert_eq!(element("body").unwrap().parents.first(), Some(&"html"));
        assert_eq!(element("td").unwrap().parents.first(), Some(&"tr"));
        assert!(element("html").unwrap().parents.is_empty());
    }

    #[test]
    fn unknown_elements_have_no_entry() {
        assert!(element("custom-widget").is_none());
        assert!(!is_special("custom-widget"));
    }

    #[test]
    fn table_has_no_duplicate_names() {
        assert_eq!(map().len(), TABLE.len());
    }
}
