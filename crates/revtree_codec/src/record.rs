//! Tree-shaped wire records.

use crate::error::{CodecError, CodecResult};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

/// A named element with string attributes, an optional value payload and
/// nested child elements.
///
/// Records are the exchange shape for commands, events and sync logs. They
/// map one-to-one onto XML-like trees and are encoded to bytes as CBOR or
/// JSON.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Record {
    /// Element name.
    pub name: String,
    /// Attributes, kept sorted for deterministic output.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    /// Optional value payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Child elements in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Record>,
}

impl Record {
    /// Creates an empty element with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets an attribute, returning the record for chaining.
    #[must_use]
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Sets an attribute in place.
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Display) {
        self.attributes.insert(key.into(), value.to_string());
    }

    /// Sets a boolean flag attribute only when it is true.
    pub fn set_flag(&mut self, key: impl Into<String>, on: bool) {
        if on {
            self.attributes.insert(key.into(), "true".to_string());
        }
    }

    /// Sets the value payload.
    #[must_use]
    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    /// Appends a child element.
    pub fn push_child(&mut self, child: Record) {
        self.children.push(child);
    }

    /// Returns the named attribute, if present.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Returns the named attribute or a parse error naming this element.
    pub fn require_attr(&self, key: &str) -> CodecResult<&str> {
        self.attr(key)
            .ok_or_else(|| CodecError::parse(&self.name, format!("missing attribute '{key}'")))
    }

    /// Parses the named attribute, if present.
    pub fn parse_attr<T>(&self, key: &str) -> CodecResult<Option<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.attr(key) {
            None => Ok(None),
            Some(raw) => raw.parse::<T>().map(Some).map_err(|e| {
                CodecError::parse(&self.name, format!("attribute '{key}'=\"{raw}\": {e}"))
            }),
        }
    }

    /// Parses a required attribute.
    pub fn require_parsed<T>(&self, key: &str) -> CodecResult<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.parse_attr(key)?
            .ok_or_else(|| CodecError::parse(&self.name, format!("missing attribute '{key}'")))
    }

    /// Reads a boolean flag; an absent flag is false.
    pub fn flag(&self, key: &str) -> CodecResult<bool> {
        Ok(self.parse_attr::<bool>(key)?.unwrap_or(false))
    }

    /// Fails unless this element has the expected name.
    pub fn expect_name(&self, expected: &str) -> CodecResult<()> {
        if self.name == expected {
            Ok(())
        } else {
            Err(CodecError::unexpected_element(expected, &self.name))
        }
    }

    /// Iterates over the children with the given element name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Record> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attributes_and_flags() {
        let mut record = Record::new("xcommand").with_attr("revision", 7);
        record.set_flag("forced", false);
        record.set_flag("relative", true);

        assert_eq!(record.attr("revision"), Some("7"));
        assert_eq!(record.attr("forced"), None);
        assert!(record.flag("relative").unwrap());
        assert!(!record.flag("forced").unwrap());
        assert_eq!(record.require_parsed::<i64>("revision").unwrap(), 7);
    }

    #[test]
    fn missing_attribute_names_element() {
        let record = Record::new("xevent");
        let err = record.require_attr("type").unwrap_err();
        assert_eq!(
            err,
            CodecError::parse("xevent", "missing attribute 'type'")
        );
    }

    #[test]
    fn bad_attribute_is_parse_error() {
        let record = Record::new("xevent").with_attr("implied", "maybe");
        assert!(matches!(
            record.flag("implied"),
            Err(CodecError::Parse { element, .. }) if element == "xevent"
        ));
    }

    #[test]
    fn expect_name() {
        let record = Record::new("xtransaction");
        assert!(record.expect_name("xtransaction").is_ok());
        assert!(matches!(
            record.expect_name("xcommand"),
            Err(CodecError::UnexpectedElement { .. })
        ));
    }

    #[test]
    fn children_named_filters() {
        let mut parent = Record::new("xsynclog");
        parent.push_child(Record::new("xsynclogentry"));
        parent.push_child(Record::new("other"));
        parent.push_child(Record::new("xsynclogentry"));
        assert_eq!(parent.children_named("xsynclogentry").count(), 2);
    }
}
