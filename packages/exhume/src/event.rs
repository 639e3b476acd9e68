//! Element events passed to handlers.

use bigdecimal::BigDecimal;
use chrono::NaiveDate;

use crate::error::ConversionError;
use crate::path::Path;
use crate::value::{self, FromElementValue};

/// Identity of an element as reported by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementName {
    /// Name as written in the document, including any prefix (`inv:Book`).
    pub qualified: String,
    /// Name without prefix (`Book`).
    pub local: String,
    /// Resolved namespace URI, only set for namespace-aware parses.
    pub namespace: Option<String>,
}

impl ElementName {
    /// Create a name with no namespace.
    pub fn new(qualified: impl Into<String>) -> Self {
        let qualified = qualified.into();
        let local = qualified
            .rsplit_once(':')
            .map_or(qualified.as_str(), |(_, local)| local)
            .to_string();
        Self {
            qualified,
            local,
            namespace: None,
        }
    }

    /// Attach a namespace URI.
    #[must_use]
    pub fn with_namespace(mut self, namespace: Option<String>) -> Self {
        self.namespace = namespace;
        self
    }
}

/// One attribute of an opening element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: ElementName,
    /// Unescaped attribute value.
    pub value: String,
}

/// Attributes of an opening element, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    items: Vec<Attribute>,
}

impl Attributes {
    /// Create an empty attribute list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, attribute: Attribute) {
        self.items.push(attribute);
    }

    /// Value of the attribute with the given qualified name.
    #[must_use]
    pub fn get(&self, qualified_name: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|a| a.name.qualified == qualified_name)
            .map(|a| a.value.as_str())
    }

    /// Value of the attribute with the given namespace URI and local name.
    ///
    /// Only namespace-aware parses resolve attribute namespaces.
    #[must_use]
    pub fn get_ns(&self, namespace: &str, local_name: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|a| a.name.namespace.as_deref() == Some(namespace) && a.name.local == local_name)
            .map(|a| a.value.as_str())
    }

    /// Iterate over all attributes.
    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.items.iter()
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the element has no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<Attribute> for Attributes {
    fn from_iter<I: IntoIterator<Item = Attribute>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

/// Emitted when an element opens.
///
/// Only valid for the duration of the callback; handlers copy out what they
/// need.
#[derive(Debug, Clone)]
pub struct StartOfElement {
    path: Path,
    name: ElementName,
    attributes: Attributes,
}

impl StartOfElement {
    /// Create a start event.
    #[must_use]
    pub fn new(path: Path, name: ElementName, attributes: Attributes) -> Self {
        Self {
            path,
            name,
            attributes,
        }
    }

    /// Path of the element, including itself.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Element identity.
    #[must_use]
    pub fn name(&self) -> &ElementName {
        &self.name
    }

    /// Qualified element name.
    #[must_use]
    pub fn qualified_name(&self) -> &str {
        &self.name.qualified
    }

    /// Element name without prefix.
    #[must_use]
    pub fn local_name(&self) -> &str {
        &self.name.local
    }

    /// Namespace URI, if resolved.
    #[must_use]
    pub fn namespace_uri(&self) -> Option<&str> {
        self.name.namespace.as_deref()
    }

    /// All attributes.
    #[must_use]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Shorthand for [`Attributes::get`].
    #[must_use]
    pub fn attribute_value(&self, qualified_name: &str) -> Option<&str> {
        self.attributes.get(qualified_name)
    }

    /// Shorthand for [`Attributes::get_ns`].
    #[must_use]
    pub fn attribute_value_ns(&self, namespace: &str, local_name: &str) -> Option<&str> {
        self.attributes.get_ns(namespace, local_name)
    }
}

/// Emitted when an element closes.
///
/// Carries the character data that appeared directly inside the element,
/// concatenated in document order and untrimmed. Text inside nested
/// elements belongs to those elements. An element with no text has an empty
/// value; an element marked `xsi:nil` is reported the same way.
#[derive(Debug, Clone)]
pub struct EndOfElement {
    path: Path,
    name: ElementName,
    value: String,
}

impl EndOfElement {
    /// Create an end event.
    #[must_use]
    pub fn new(path: Path, name: ElementName, value: String) -> Self {
        Self { path, name, value }
    }

    /// Path of the element, including itself.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Element identity.
    #[must_use]
    pub fn name(&self) -> &ElementName {
        &self.name
    }

    /// Qualified element name.
    #[must_use]
    pub fn qualified_name(&self) -> &str {
        &self.name.qualified
    }

    /// Element name without prefix.
    #[must_use]
    pub fn local_name(&self) -> &str {
        &self.name.local
    }

    /// Namespace URI, if resolved.
    #[must_use]
    pub fn namespace_uri(&self) -> Option<&str> {
        self.name.namespace.as_deref()
    }

    /// Accumulated text, unchanged.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Convert the text to any supported type.
    ///
    /// # Errors
    ///
    /// Returns a [`ConversionError`] if the text does not conform.
    pub fn value_as<T: FromElementValue>(&self) -> Result<T, ConversionError> {
        T::from_element_text(&self.value)
    }

    /// Text as a signed integer.
    ///
    /// # Errors
    ///
    /// See [`value::parse_integer`].
    pub fn value_as_integer(&self) -> Result<i64, ConversionError> {
        value::parse_integer(&self.value)
    }

    /// Text as a floating point number.
    ///
    /// # Errors
    ///
    /// See [`value::parse_float`].
    pub fn value_as_float(&self) -> Result<f64, ConversionError> {
        value::parse_float(&self.value)
    }

    /// Text as an arbitrary precision decimal.
    ///
    /// # Errors
    ///
    /// See [`value::parse_decimal`].
    pub fn value_as_decimal(&self) -> Result<BigDecimal, ConversionError> {
        value::parse_decimal(&self.value)
    }

    /// Text as a boolean.
    ///
    /// # Errors
    ///
    /// See [`value::parse_boolean`].
    pub fn value_as_boolean(&self) -> Result<bool, ConversionError> {
        value::parse_boolean(&self.value)
    }

    /// Text as a calendar date.
    ///
    /// # Errors
    ///
    /// See [`value::parse_date`].
    pub fn value_as_date(&self) -> Result<NaiveDate, ConversionError> {
        value::parse_date(&self.value)
    }
}
