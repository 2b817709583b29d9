//! System-identifier expansion.
//!
//! Turns the system identifier of an input source into an absolute URI so
//! the locator can report it. Expansion is best-effort: any failure along
//! the way degrades to returning the identifier unchanged.

use std::env;
use std::path::MAIN_SEPARATOR;

use url::Url;

/// Expand a system identifier against an optional base.
///
/// An already-absolute URI is returned as-is. Otherwise the identifier gets
/// platform-path fixing and is joined onto the base; with no usable base the
/// process working directory serves as a `file://` root.
pub fn expand_system_id(system_id: Option<&str>, base_system_id: Option<&str>) -> Option<String> {
    let system_id = system_id?;
    if system_id.is_empty() {
        return Some(String::new());
    }
    if Url::parse(system_id).is_ok() {
        return Some(system_id.to_owned());
    }
    let id = fix_uri(system_id);

    let base = match base_system_id {
        None => cwd_base(),
        Some(base) if base.is_empty() || base == system_id => cwd_base(),
        Some(base) => match Url::parse(&fix_uri(base)) {
            Ok(url) => Some(url),
            // Drive-qualified bases miss a scheme; anything else resolves
            // relative to the working directory.
            Err(_) if base.contains(':') => {
                Url::parse(&format!("file://{}", fix_uri(base))).ok()
            }
            Err(_) => cwd_base().and_then(|dir| dir.join(&fix_uri(base)).ok()),
        },
    };

    match base.and_then(|base| base.join(&id).ok()) {
        Some(expanded) => Some(expanded.to_string()),
        None => Some(system_id.to_owned()),
    }
}

/// `file://` URL for the working directory, with a trailing slash so joins
/// treat it as a directory. Reading the directory is fallible and degrades
/// to an empty path.
fn cwd_base() -> Option<Url> {
    let dir = env::current_dir()
        .ok()
        .map(|path| fix_uri(&path.to_string_lossy()))
        .unwrap_or_default();
    let dir = if dir.ends_with('/') { dir } else { format!("{dir}/") };
    Url::parse(&format!("file://{dir}")).ok()
}

/// Fix a platform-dependent filename into URI form.
fn fix_uri(text: &str) -> String {
    let mut fixed = text.replace(MAIN_SEPARATOR, "/");
    let bytes = fixed.as_bytes();
    if bytes.len() >= 2 {
        if bytes[1] == b':' && bytes[0].is_ascii_alphabetic() {
            // "C:dir" -> "/C:dir"
            fixed.insert(0, '/');
        } else if bytes[0] == b'/' && bytes[1] == b'/' {
            // "//host/share" -> "file://host/share"
            fixed.insert_str(0, "file:");
        }
    }
    fixed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_uris_pass_through() {
        assert_eq!(
            expand_system_id(Some("http://example.com/a.html"), None).as_deref(),
            Some("http://example.com/a.html")
        );
        assert_eq!(
            expand_system_id(Some("file:///tmp/x.html"), None).as_deref(),
            Some("file:///tmp/x.html")
        );
    }

    #[test]
    fn missing_and_empty_ids() {
        assert_eq!(expand_system_id(None, None), None);
        assert_eq!(expand_system_id(Some(""), None).as_deref(), Some(""));
    }

    #[test]
    fn relative_ids_resolve_against_the_working_directory() {
        let expanded = expand_system_id(Some("doc.html"), None).unwrap();
        assert!(expanded.starts_with("file://"), "got {expanded}");
        assert!(expanded.ends_with("/doc.html"), "got {expanded}");
    }

    #[test]
    fn relative_ids_resolve_against_an_absolute_base() {
        let expanded =
            expand_system_id(Some("b.html"), Some("http://example.com/dir/a.html")).unwrap();
        assert_eq!(expanded, "http://example.com/dir/b.html");
    }

    #[test]
    fn base_equal_to_id_falls_back_to_the_working_directory() {
        let expanded = expand_system_id(Some("same.html"), Some("same.html")).unwrap();
        assert!(expanded.starts_with("file://"), "got {expanded}");
        assert!(expanded.ends_with("/same.html"), "got {expanded}");
    }

    #[test]
    fn failures_degrade_to_the_original_id() {
        // A base that parses but cannot carry relative joins.
        let expanded = expand_system_id(Some("b.html"), Some("data:text/html,x")).unwrap();
        assert_eq!(expanded, "b.html");
    }

    #[test]
    fn relative_base_resolves_under_the_working_directory() {
        let expanded = expand_system_id(Some("b.html"), Some("sub/a.html")).unwrap();
        assert!(expanded.starts_with("file://"), "got {expanded}");
        assert!(expanded.ends_with("/sub/b.html"), "got {expanded}");
    }
}
