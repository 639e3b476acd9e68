//! Typed conversion of accumulated element text.
//!
//! Every end handler declares which [`ValueKind`] it wants. The kind is
//! resolved once when the handler is registered, either statically through
//! [`FromElementValue`] or by name through [`ValueKind::from_name`], and is
//! applied to the element text right before the handler runs.

use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::Serialize;

use crate::config::{DATE_PATTERN, INTEGER_PATTERN, NUMBER_PATTERN};
use crate::error::{ConversionError, RegistrationError};

/// The closed set of conversions an end handler can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Raw text, never fails.
    Text,
    /// Signed 64-bit integer.
    Integer,
    /// 64-bit floating point.
    Float,
    /// Arbitrary precision decimal.
    Decimal,
    /// `true`/`1` or `false`/`0`.
    Boolean,
    /// Calendar date in `YYYY-MM-DD` form.
    Date,
}

impl ValueKind {
    /// All kinds, in declaration order.
    pub const ALL: [ValueKind; 6] = [
        ValueKind::Text,
        ValueKind::Integer,
        ValueKind::Float,
        ValueKind::Decimal,
        ValueKind::Boolean,
        ValueKind::Date,
    ];

    /// Resolve a kind from a type name such as `"integer"` or `"date"`.
    ///
    /// Common aliases are accepted (`string`, `int`, `double`, `bool`, ...).
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::UnsupportedValueType`] for unknown names.
    pub fn from_name(name: &str) -> Result<Self, RegistrationError> {
        match name.to_ascii_lowercase().as_str() {
            "string" | "text" | "str" => Ok(ValueKind::Text),
            "integer" | "int" | "i64" | "long" => Ok(ValueKind::Integer),
            "float" | "double" | "f64" => Ok(ValueKind::Float),
            "decimal" | "bigdecimal" => Ok(ValueKind::Decimal),
            "boolean" | "bool" => Ok(ValueKind::Boolean),
            "date" | "localdate" => Ok(ValueKind::Date),
            _ => Err(RegistrationError::UnsupportedValueType(name.to_string())),
        }
    }

    /// Canonical lowercase name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Text => "string",
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::Decimal => "decimal",
            ValueKind::Boolean => "boolean",
            ValueKind::Date => "date",
        }
    }

    /// Convert element text to this kind.
    ///
    /// # Errors
    ///
    /// Returns a [`ConversionError`] if the text does not follow the
    /// kind's grammar.
    pub fn convert(&self, text: &str) -> Result<Value, ConversionError> {
        Ok(match self {
            ValueKind::Text => Value::Text(text.to_string()),
            ValueKind::Integer => Value::Integer(parse_integer(text)?),
            ValueKind::Float => Value::Float(parse_float(text)?),
            ValueKind::Decimal => Value::Decimal(parse_decimal(text)?),
            ValueKind::Boolean => Value::Boolean(parse_boolean(text)?),
            ValueKind::Date => Value::Date(parse_date(text)?),
        })
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueKind {
    type Err = RegistrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

/// A converted element value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Integer(i64),
    Float(f64),
    Decimal(BigDecimal),
    Boolean(bool),
    Date(NaiveDate),
}

impl Value {
    /// The kind this value was converted to.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Text(_) => ValueKind::Text,
            Value::Integer(_) => ValueKind::Integer,
            Value::Float(_) => ValueKind::Float,
            Value::Decimal(_) => ValueKind::Decimal,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Date(_) => ValueKind::Date,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Decimal(d) => write!(f, "{d}"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

/// Types an end handler can take as its parameter.
///
/// Implemented for `String`, `i64`, `f64`, `BigDecimal`, `bool` and
/// `NaiveDate`. A callback over any other type does not compile.
pub trait FromElementValue: Sized {
    /// The conversion this type requires.
    const KIND: ValueKind;

    /// Parse element text into `Self`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConversionError`] if the text does not conform.
    fn from_element_text(text: &str) -> Result<Self, ConversionError>;
}

impl FromElementValue for String {
    const KIND: ValueKind = ValueKind::Text;

    fn from_element_text(text: &str) -> Result<Self, ConversionError> {
        Ok(text.to_string())
    }
}

impl FromElementValue for i64 {
    const KIND: ValueKind = ValueKind::Integer;

    fn from_element_text(text: &str) -> Result<Self, ConversionError> {
        parse_integer(text)
    }
}

impl FromElementValue for f64 {
    const KIND: ValueKind = ValueKind::Float;

    fn from_element_text(text: &str) -> Result<Self, ConversionError> {
        parse_float(text)
    }
}

impl FromElementValue for BigDecimal {
    const KIND: ValueKind = ValueKind::Decimal;

    fn from_element_text(text: &str) -> Result<Self, ConversionError> {
        parse_decimal(text)
    }
}

impl FromElementValue for bool {
    const KIND: ValueKind = ValueKind::Boolean;

    fn from_element_text(text: &str) -> Result<Self, ConversionError> {
        parse_boolean(text)
    }
}

impl FromElementValue for NaiveDate {
    const KIND: ValueKind = ValueKind::Date;

    fn from_element_text(text: &str) -> Result<Self, ConversionError> {
        parse_date(text)
    }
}

/// Parse a signed decimal integer.
///
/// # Errors
///
/// Fails on anything but an optional sign followed by digits, or on overflow.
pub fn parse_integer(text: &str) -> Result<i64, ConversionError> {
    if !INTEGER_PATTERN.is_match(text) {
        return Err(ConversionError::new(
            ValueKind::Integer,
            text,
            "not a signed decimal integer",
        ));
    }
    text.parse::<i64>()
        .map_err(|e| ConversionError::new(ValueKind::Integer, text, e.to_string()))
}

/// Parse a decimal or exponential floating point literal.
///
/// # Errors
///
/// Fails on non-numeric text, including `NaN` and `inf` spellings.
pub fn parse_float(text: &str) -> Result<f64, ConversionError> {
    if !NUMBER_PATTERN.is_match(text) {
        return Err(ConversionError::new(
            ValueKind::Float,
            text,
            "not a numeric literal",
        ));
    }
    text.parse::<f64>()
        .map_err(|e| ConversionError::new(ValueKind::Float, text, e.to_string()))
}

/// Parse an arbitrary precision decimal without rounding.
///
/// # Errors
///
/// Fails on non-numeric text.
pub fn parse_decimal(text: &str) -> Result<BigDecimal, ConversionError> {
    if !NUMBER_PATTERN.is_match(text) {
        return Err(ConversionError::new(
            ValueKind::Decimal,
            text,
            "not a numeric literal",
        ));
    }
    BigDecimal::from_str(text)
        .map_err(|e| ConversionError::new(ValueKind::Decimal, text, e.to_string()))
}

/// Parse `true`/`1` or `false`/`0`.
///
/// # Errors
///
/// Any other text, including other casings, is rejected.
pub fn parse_boolean(text: &str) -> Result<bool, ConversionError> {
    match text {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err(ConversionError::new(
            ValueKind::Boolean,
            text,
            "expected one of 'true', 'false', '1', '0'",
        )),
    }
}

/// Parse a complete `YYYY-MM-DD` date.
///
/// # Errors
///
/// Fails on other layouts and on impossible dates such as `2017-02-30`.
pub fn parse_date(text: &str) -> Result<NaiveDate, ConversionError> {
    if !DATE_PATTERN.is_match(text) {
        return Err(ConversionError::new(
            ValueKind::Date,
            text,
            "expected YYYY-MM-DD",
        ));
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map_err(|e| ConversionError::new(ValueKind::Date, text, e.to_string()))
}
