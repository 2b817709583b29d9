//! Parse-time configuration: features, properties, and their identifiers.

use crate::shared::error::ConfigError;

pub const FEATURE_AUGMENTATIONS: &str = "soupscan/features/augmentations";
pub const FEATURE_REPORT_ERRORS: &str = "soupscan/features/report-errors";
pub const FEATURE_NOTIFY_CHAR_REFS: &str = "soupscan/features/notify-char-refs";
pub const FEATURE_NOTIFY_XML_BUILTIN_REFS: &str = "soupscan/features/notify-xml-builtin-refs";
pub const FEATURE_NOTIFY_HTML_BUILTIN_REFS: &str = "soupscan/features/notify-html-builtin-refs";

pub const PROPERTY_NAMES_ELEMS: &str = "soupscan/properties/names/elems";
pub const PROPERTY_NAMES_ATTRS: &str = "soupscan/properties/names/attrs";
pub const PROPERTY_DEFAULT_ENCODING: &str = "soupscan/properties/default-encoding";

/// Case transformation applied to element or attribute names.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NameCase {
    #[default]
    NoChange,
    Upper,
    Lower,
}

impl NameCase {
    /// Property values are string-coerced; anything other than `lower` or
    /// `upper` means no change.
    pub fn from_property(value: &str) -> Self {
        match value {
            "lower" => NameCase::Lower,
            "upper" => NameCase::Upper,
            _ => NameCase::NoChange,
        }
    }

    pub(crate) fn apply(self, name: &str) -> String {
        match self {
            NameCase::NoChange => name.to_owned(),
            NameCase::Upper => name.to_ascii_uppercase(),
            NameCase::Lower => name.to_ascii_lowercase(),
        }
    }
}

/// Scanner configuration, immutable for the duration of one parse.
#[derive(Clone, Debug)]
pub struct ScannerConfig {
    /// Attach a [`LocationItem`](crate::LocationItem) to every event.
    pub augmentations: bool,
    /// Emit diagnostics through the error reporter.
    pub report_errors: bool,
    /// Wrap numeric character references in general-entity events.
    pub notify_char_refs: bool,
    /// Wrap `amp lt gt quot apos` in general-entity events.
    pub notify_xml_builtin_refs: bool,
    /// Wrap every named HTML entity in general-entity events.
    pub notify_html_builtin_refs: bool,
    pub names_elems: NameCase,
    pub names_attrs: NameCase,
    /// IANA name of the fallback decoder.
    pub default_encoding: String,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            augmentations: false,
            report_errors: false,
            notify_char_refs: false,
            notify_xml_builtin_refs: false,
            notify_html_builtin_refs: false,
            names_elems: NameCase::NoChange,
            names_attrs: NameCase::NoChange,
            default_encoding: "Windows-1252".to_owned(),
        }
    }
}

impl ScannerConfig {
    /// Set a feature by its opaque identifier.
    pub fn set_feature(&mut self, id: &str, state: bool) -> Result<(), ConfigError> {
        match id {
            FEATURE_AUGMENTATIONS => self.augmentations = state,
            FEATURE_REPORT_ERRORS => self.report_errors = state,
            FEATURE_NOTIFY_CHAR_REFS => self.notify_char_refs = state,
            FEATURE_NOTIFY_XML_BUILTIN_REFS => self.notify_xml_builtin_refs = state,
            FEATURE_NOTIFY_HTML_BUILTIN_REFS => self.notify_html_builtin_refs = state,
            _ => return Err(ConfigError::NotRecognized { id: id.to_owned() }),
        }
        Ok(())
    }

    /// Set a property by its opaque identifier. Values are string-coerced.
    pub fn set_property(&mut self, id: &str, value: &str) -> Result<(), ConfigError> {
        match id {
            PROPERTY_NAMES_ELEMS => self.names_elems = NameCase::from_property(value),
            PROPERTY_NAMES_ATTRS => self.names_attrs = NameCase::from_property(value),
            PROPERTY_DEFAULT_ENCODING => self.default_encoding = value.to_owned(),
            _ => return Err(ConfigError::NotRecognized { id: id.to_owned() }),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = ScannerConfig::default();
        assert!(!config.augmentations);
        assert!(!config.notify_char_refs);
        assert!(!config.notify_xml_builtin_refs);
        assert!(!config.notify_html_builtin_refs);
        assert_eq!(config.names_elems, NameCase::NoChange);
        assert_eq!(config.default_encoding, "Windows-1252");
    }

    #[test]
    fn names_values_are_string_coerced() {
        assert_eq!(NameCase::from_property("lower"), NameCase::Lower);
        assert_eq!(NameCase::from_property("upper"), NameCase::Upper);
        assert_eq!(NameCase::from_property("default"), NameCase::NoChange);
        assert_eq!(NameCase::from_property("LOWER"), NameCase::NoChange);
        assert_eq!(NameCase::from_property("42"), NameCase::NoChange);
    }

    #[test]
    fn unknown_ids_are_rejected() {
        let mut config = ScannerConfig::default();
        assert!(config.set_feature("soupscan/features/no-such", true).is_err());
        assert!(config.set_property("soupscan/properties/no-such", "x").is_err());
        assert!(config.set_feature(FEATURE_REPORT_ERRORS, true).is_ok());
        assert!(config.report_errors);
    }
}
