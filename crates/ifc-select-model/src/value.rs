// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed property values
//!
//! Property payloads are a small closed set so operator dispatch stays
//! exhaustive. Upstream extraction decides the kind once; the engine never
//! re-guesses types from strings except where an operator explicitly
//! coerces (boolean comparison, numeric comparison against a string form).

use crate::types::AttributeValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A property value with an explicit kind tag
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Boolean value
    Boolean(bool),
    /// Numeric value (all IFC measures collapse to f64 upstream)
    Number(f64),
    /// Text value
    Text(String),
    /// Explicit null ($ in the source file)
    Null,
}

impl PropertyValue {
    /// Try to get as number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to get as boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get as text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Check if this is the null value
    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }

    /// Convert a decoded attribute value, if it carries a property payload
    pub fn from_attribute(value: &AttributeValue) -> Option<Self> {
        match value {
            AttributeValue::Bool(b) => Some(PropertyValue::Boolean(*b)),
            AttributeValue::Integer(i) => Some(PropertyValue::Number(*i as f64)),
            AttributeValue::Float(f) => Some(PropertyValue::Number(*f)),
            AttributeValue::String(s) => Some(PropertyValue::Text(s.clone())),
            AttributeValue::Enum(s) => match s.to_uppercase().as_str() {
                "TRUE" | "T" => Some(PropertyValue::Boolean(true)),
                "FALSE" | "F" => Some(PropertyValue::Boolean(false)),
                _ => Some(PropertyValue::Text(s.clone())),
            },
            AttributeValue::TypedValue(_, args) if !args.is_empty() => {
                Self::from_attribute(&args[0])
            }
            AttributeValue::Null => Some(PropertyValue::Null),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Boolean(b) => write!(f, "{b}"),
            PropertyValue::Number(n) => write!(f, "{n}"),
            PropertyValue::Text(s) => write!(f, "{s}"),
            PropertyValue::Null => Ok(()),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::Text(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::Text(s)
    }
}

impl From<f64> for PropertyValue {
    fn from(n: f64) -> Self {
        PropertyValue::Number(n)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Boolean(b)
    }
}
