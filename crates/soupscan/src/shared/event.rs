//! Document events: the handler seam, qualified names, and attributes.

use crate::shared::location::LocationItem;

/// Qualified name triple.
///
/// The tokenizer never assigns a namespace, so `uri` is always absent and
/// `local == raw` (post case-transformation).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QName {
    pub uri: Option<String>,
    pub local: String,
    pub raw: String,
}

impl QName {
    pub(crate) fn plain(name: &str) -> Self {
        Self {
            uri: None,
            local: name.to_owned(),
            raw: name.to_owned(),
        }
    }
}

/// One scanned attribute. Values are fully decoded; the type is always
/// `"CDATA"` for tag-soup input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub name: QName,
    pub attr_type: &'static str,
    pub value: String,
    /// Fresh per attribute when augmentations are enabled.
    pub location: Option<LocationItem>,
}

/// Attribute set of one start tag, in source order.
///
/// Duplicate names are preserved: both occurrences are added.
#[derive(Clone, Debug, Default)]
pub struct Attributes {
    items: Vec<Attribute>,
}

impl Attributes {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Attribute> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.items.iter()
    }

    /// Value of the first attribute whose raw name matches, ignoring ASCII
    /// case.
    pub fn value_ignore_case(&self, name: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|attr| attr.name.raw.eq_ignore_ascii_case(name))
            .map(|attr| attr.value.as_str())
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
    }

    pub(crate) fn push(&mut self, attribute: Attribute) {
        self.items.push(attribute);
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Where the active entity came from and where scanning currently is.
///
/// A snapshot taken at `start_document` time; live values are available
/// through the scanner's accessor methods.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Locator {
    pub public_id: Option<String>,
    pub base_system_id: Option<String>,
    pub literal_system_id: Option<String>,
    pub expanded_system_id: Option<String>,
    pub line_number: u32,
    pub column_number: u32,
}

/// Receives the event stream.
///
/// All methods default to no-ops so handlers implement only what they
/// consume. Borrowed arguments are scanner scratch: copy anything that must
/// outlive the callback.
pub trait DocumentHandler {
    fn start_document(
        &mut self,
        _locator: &Locator,
        _encoding: Option<&str>,
        _location: Option<&LocationItem>,
    ) {
    }

    fn end_document(&mut self, _location: Option<&LocationItem>) {}

    fn start_element(
        &mut self,
        _name: &QName,
        _attributes: &Attributes,
        _location: Option<&LocationItem>,
    ) {
    }

    fn end_element(&mut self, _name: &QName, _location: Option<&LocationItem>) {}

    fn characters(&mut self, _text: &str, _location: Option<&LocationItem>) {}

    fn comment(&mut self, _text: &str, _location: Option<&LocationItem>) {}

    fn start_general_entity(&mut self, _name: &str, _location: Option<&LocationItem>) {}

    fn end_general_entity(&mut self, _name: &str, _location: Option<&LocationItem>) {}
}
