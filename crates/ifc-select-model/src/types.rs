// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Raw-graph input types
//!
//! The selection engine does not parse IFC text itself. An upstream parser
//! hands over already-decoded entities in the shapes defined here.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Type-safe element identifier
///
/// Wraps the raw IFC express ID (e.g., #123 becomes ElementId(123)).
/// Stable only within one loaded graph.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize, Default)]
pub struct ElementId(pub u32);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for ElementId {
    fn from(id: u32) -> Self {
        ElementId(id)
    }
}

impl From<ElementId> for u32 {
    fn from(id: ElementId) -> Self {
        id.0
    }
}

/// Decoded attribute value
///
/// Represents any value that can appear in an IFC entity's attribute list.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum AttributeValue {
    /// Null value ($)
    #[default]
    Null,
    /// Derived value (*)
    Derived,
    /// Entity reference (#123)
    EntityRef(ElementId),
    /// Boolean value
    Bool(bool),
    /// Integer value
    Integer(i64),
    /// Floating point value
    Float(f64),
    /// String value
    String(String),
    /// Enumeration value (.VALUE.)
    Enum(String),
    /// List of values
    List(Vec<AttributeValue>),
    /// Typed value like IFCLABEL('text')
    TypedValue(String, Vec<AttributeValue>),
}

impl AttributeValue {
    /// Try to get as entity reference
    pub fn as_entity_ref(&self) -> Option<ElementId> {
        match self {
            AttributeValue::EntityRef(id) => Some(*id),
            _ => None,
        }
    }

    /// Try to get as string
    pub fn as_string(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            AttributeValue::TypedValue(_, args) if !args.is_empty() => args[0].as_string(),
            _ => None,
        }
    }

    /// Try to get as float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            AttributeValue::Float(f) => Some(*f),
            AttributeValue::Integer(i) => Some(*i as f64),
            AttributeValue::TypedValue(_, args) if !args.is_empty() => args[0].as_float(),
            _ => None,
        }
    }

    /// Try to get as boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(b) => Some(*b),
            AttributeValue::Enum(s) => match s.to_uppercase().as_str() {
                "TRUE" | "T" => Some(true),
                "FALSE" | "F" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Try to get as enum string
    pub fn as_enum(&self) -> Option<&str> {
        match self {
            AttributeValue::Enum(s) => Some(s),
            _ => None,
        }
    }

    /// Check if this is a null value
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }
}

/// Raw entity handed over by the upstream parser
///
/// Carries the express ID, the entity type name as it appeared in the file,
/// and the positional attribute values in declaration order.
#[derive(Clone, Debug)]
pub struct RawEntity {
    /// Express ID
    pub id: ElementId,
    /// Entity type name (e.g., "IFCWALL")
    pub type_name: String,
    /// Attribute values in order
    pub attributes: Vec<AttributeValue>,
}

impl RawEntity {
    /// Create a raw entity
    pub fn new(id: impl Into<ElementId>, type_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            type_name: type_name.into(),
            attributes: Vec::new(),
        }
    }

    /// Append an attribute (builder style for fixtures and adapters)
    pub fn with_attribute(mut self, value: AttributeValue) -> Self {
        self.attributes.push(value);
        self
    }

    /// Get attribute at index
    pub fn get(&self, index: usize) -> Option<&AttributeValue> {
        self.attributes.get(index)
    }

    /// Get string at index
    pub fn get_string(&self, index: usize) -> Option<&str> {
        self.get(index).and_then(|v| v.as_string())
    }

    /// GlobalId is at index 0 for all rooted entities
    pub fn global_id(&self) -> Option<&str> {
        self.get_string(0)
    }

    /// Name is at index 2 for rooted entities
    pub fn name(&self) -> Option<&str> {
        self.get_string(2)
    }

    /// Description is at index 3
    pub fn description(&self) -> Option<&str> {
        self.get_string(3)
    }

    /// ObjectType is at index 4 for objects
    pub fn object_type(&self) -> Option<&str> {
        self.get_string(4)
    }

    /// Tag is at index 7 for building elements
    pub fn tag(&self) -> Option<&str> {
        self.get_string(7)
    }

    /// PredefinedType is the trailing enum attribute on IFC4 products
    pub fn predefined_type(&self) -> Option<&str> {
        self.attributes.last().and_then(|v| v.as_enum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_id_display() {
        assert_eq!(ElementId(42).to_string(), "#42");
    }

    #[test]
    fn attribute_value_coercions() {
        assert_eq!(AttributeValue::Integer(7).as_float(), Some(7.0));
        assert_eq!(
            AttributeValue::TypedValue("IFCLABEL".into(), vec![AttributeValue::String("x".into())])
                .as_string(),
            Some("x")
        );
        assert_eq!(AttributeValue::Enum("T".into()).as_bool(), Some(true));
        assert_eq!(AttributeValue::Enum("NOTDEFINED".into()).as_bool(), None);
    }

    #[test]
    fn raw_entity_standard_positions() {
        let wall = RawEntity::new(1u32, "IFCWALL")
            .with_attribute(AttributeValue::String("guid".into()))
            .with_attribute(AttributeValue::Null)
            .with_attribute(AttributeValue::String("Wall 1".into()))
            .with_attribute(AttributeValue::Null)
            .with_attribute(AttributeValue::String("Basic Wall".into()))
            .with_attribute(AttributeValue::Null)
            .with_attribute(AttributeValue::Null)
            .with_attribute(AttributeValue::String("W-01".into()))
            .with_attribute(AttributeValue::Enum("SOLIDWALL".into()));

        assert_eq!(wall.global_id(), Some("guid"));
        assert_eq!(wall.name(), Some("Wall 1"));
        assert_eq!(wall.object_type(), Some("Basic Wall"));
        assert_eq!(wall.tag(), Some("W-01"));
        assert_eq!(wall.predefined_type(), Some("SOLIDWALL"));
    }
}
