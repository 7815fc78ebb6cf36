// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Selection rules and the condition union
//!
//! A [`Rule`] is a named sequence of top-level [`Condition`]s plus a
//! combination mode. Conditions form a closed sum, internally tagged by
//! `type` in the JSON document shape. Unrecognized tags deserialize to
//! [`Condition::Unknown`], which evaluates to "no match" rather than
//! failing the whole document.

use crate::value::PropertyValue;
use serde::{Deserialize, Deserializer, Serialize};

/// Comparison operators shared by all condition kinds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComparisonOperator {
    Equals,
    NotEquals,
    Contains,
    StartsWith,
    EndsWith,
    Matches,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Between,
    Exists,
    NotExists,
}

impl ComparisonOperator {
    /// Operators satisfied by a missing value
    pub fn accepts_missing(self) -> bool {
        matches!(
            self,
            ComparisonOperator::NotEquals | ComparisonOperator::NotExists
        )
    }
}

/// String attribute selector for attribute conditions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttributeField {
    Name,
    Description,
    Tag,
    ObjectType,
    PredefinedType,
}

/// Spatial containment levels
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SpatialLevel {
    Project,
    Site,
    Building,
    Storey,
    Space,
}

/// Relationship slots on an element
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationKind {
    ContainedIn,
    AggregatedBy,
    ConnectedTo,
    DefinedByType,
}

/// A numeric sub-condition (storey elevation, thickness bounds)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumericFilter {
    pub operator: ComparisonOperator,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_to: Option<f64>,
}

impl NumericFilter {
    pub fn new(operator: ComparisonOperator, value: f64) -> Self {
        Self {
            operator,
            value,
            value_to: None,
        }
    }

    pub fn between(lo: f64, hi: f64) -> Self {
        Self {
            operator: ComparisonOperator::Between,
            value: lo,
            value_to: Some(hi),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Accepts `"IfcWall"` or `["IfcDoor", "IfcWindow"]`
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
    })
}

/// One node of the boolean predicate tree
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Condition {
    /// Entity type check, subtype-aware by default
    #[serde(rename_all = "camelCase")]
    EntityType {
        #[serde(alias = "typeName", deserialize_with = "one_or_many")]
        type_names: Vec<String>,
        #[serde(default = "default_true")]
        include_subtypes: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        predefined_type: Option<String>,
    },
    /// Property lookup by namespace + name; namespace may be `"*"` or wildcarded
    #[serde(rename_all = "camelCase")]
    Property {
        property_set: String,
        property_name: String,
        operator: ComparisonOperator,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<PropertyValue>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value_to: Option<f64>,
    },
    /// Quantity lookup, numeric only
    #[serde(rename_all = "camelCase")]
    Quantity {
        #[serde(default = "default_any_namespace")]
        property_set: String,
        quantity_name: String,
        operator: ComparisonOperator,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value_to: Option<f64>,
    },
    /// Direct string attribute check
    #[serde(rename_all = "camelCase")]
    Attribute {
        field: AttributeField,
        operator: ComparisonOperator,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },
    /// Spatial containment check
    #[serde(rename_all = "camelCase")]
    Spatial {
        level: SpatialLevel,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        elevation: Option<NumericFilter>,
    },
    /// Material name and/or aggregate thickness check
    #[serde(rename_all = "camelCase")]
    Material {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        thickness_min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        thickness_max: Option<f64>,
    },
    /// Classification reference check; all given patterns must hold on one entry
    #[serde(rename_all = "camelCase")]
    Classification {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        system: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        code: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    /// Relationship slot presence check
    #[serde(rename_all = "camelCase")]
    Relationship { relation: RelationKind },
    /// All nested conditions must match
    And { conditions: Vec<Condition> },
    /// At least one nested condition must match
    Or { conditions: Vec<Condition> },
    /// None of the nested conditions may match (negated disjunction)
    Not { conditions: Vec<Condition> },
    /// Fallback for unrecognized tags; never matches
    #[serde(other)]
    Unknown,
}

fn default_any_namespace() -> String {
    "*".to_string()
}

impl Condition {
    /// Entity type condition with subtypes included
    pub fn entity_type(type_name: impl Into<String>) -> Self {
        Condition::EntityType {
            type_names: vec![type_name.into()],
            include_subtypes: true,
            predefined_type: None,
        }
    }

    /// Property condition
    pub fn property(
        property_set: impl Into<String>,
        property_name: impl Into<String>,
        operator: ComparisonOperator,
        value: impl Into<PropertyValue>,
    ) -> Self {
        Condition::Property {
            property_set: property_set.into(),
            property_name: property_name.into(),
            operator,
            value: Some(value.into()),
            value_to: None,
        }
    }

    /// Quantity condition
    pub fn quantity(
        property_set: impl Into<String>,
        quantity_name: impl Into<String>,
        operator: ComparisonOperator,
        value: f64,
    ) -> Self {
        Condition::Quantity {
            property_set: property_set.into(),
            quantity_name: quantity_name.into(),
            operator,
            value: Some(value),
            value_to: None,
        }
    }

    /// Attribute condition
    pub fn attribute(
        field: AttributeField,
        operator: ComparisonOperator,
        value: impl Into<String>,
    ) -> Self {
        Condition::Attribute {
            field,
            operator,
            value: Some(value.into()),
        }
    }
}

/// Top-level combination mode
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CombinationMode {
    /// Conjunction of the top-level conditions
    #[default]
    All,
    /// Disjunction of the top-level conditions
    Any,
}

/// A named selection rule
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub mode: CombinationMode,
    pub conditions: Vec<Condition>,
}

impl Rule {
    /// Create a rule with all-mode combination
    pub fn new(id: impl Into<String>, name: impl Into<String>, conditions: Vec<Condition>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            mode: CombinationMode::All,
            conditions,
        }
    }
}
