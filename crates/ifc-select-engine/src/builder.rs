// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fluent rule construction
//!
//! [`RuleBuilder`] assembles the same condition sequence a hand-authored
//! tree would, one chained call at a time. Property and quantity paths use
//! the dotted `namespace.name` form; a path without a dot is searched
//! across all namespaces.

use ifc_select_model::{
    AttributeField, CombinationMode, ComparisonOperator, Condition, NumericFilter, Rule,
    SpatialLevel,
};

/// Split a dotted `namespace.name` path
///
/// `"Pset_WallCommon.IsExternal"` → `("Pset_WallCommon", "IsExternal")`;
/// a dotless path means "search all namespaces".
fn split_path(path: &str) -> (String, String) {
    match path.split_once('.') {
        Some((ns, name)) => (ns.to_string(), name.to_string()),
        None => ("*".to_string(), path.to_string()),
    }
}

/// Chainable builder for [`Rule`]
///
/// The builder stays mutable until [`RuleBuilder::build`] consumes it and
/// materializes an immutable rule.
#[derive(Clone, Debug)]
pub struct RuleBuilder {
    id: String,
    name: String,
    description: Option<String>,
    mode: CombinationMode,
    type_condition: Option<Condition>,
    conditions: Vec<Condition>,
}

impl RuleBuilder {
    /// Start a rule
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            mode: CombinationMode::All,
            type_condition: None,
            conditions: Vec::new(),
        }
    }

    /// Set the description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the top-level combination mode
    pub fn mode(mut self, mode: CombinationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Seed (or replace) the leading entity-type condition
    ///
    /// A `"*"` type name installs no type condition: the rule matches any
    /// type.
    pub fn of_type(self, type_name: impl Into<String>) -> Self {
        self.of_types([type_name.into()])
    }

    /// Seed with several type names, OR'd together
    pub fn of_types<I, S>(mut self, type_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = type_names
            .into_iter()
            .map(Into::into)
            .filter(|n| n != "*")
            .collect();
        self.type_condition = if names.is_empty() {
            None
        } else {
            Some(Condition::EntityType {
                type_names: names,
                include_subtypes: true,
                predefined_type: None,
            })
        };
        self
    }

    /// Toggle subtype inclusion on the seeded type condition
    pub fn include_subtypes(mut self, include: bool) -> Self {
        if let Some(Condition::EntityType {
            include_subtypes, ..
        }) = &mut self.type_condition
        {
            *include_subtypes = include;
        }
        self
    }

    /// Add a predefined-type filter to the seeded type condition
    pub fn predefined_type(mut self, pattern: impl Into<String>) -> Self {
        if let Some(Condition::EntityType {
            predefined_type, ..
        }) = &mut self.type_condition
        {
            *predefined_type = Some(pattern.into());
        }
        self
    }

    /// Add a property condition for a dotted path
    pub fn with_property(
        mut self,
        path: &str,
        operator: ComparisonOperator,
        value: impl Into<ifc_select_model::PropertyValue>,
    ) -> Self {
        let (property_set, property_name) = split_path(path);
        self.conditions.push(Condition::Property {
            property_set,
            property_name,
            operator,
            value: Some(value.into()),
            value_to: None,
        });
        self
    }

    /// Add a property existence check for a dotted path
    pub fn with_property_existing(mut self, path: &str) -> Self {
        let (property_set, property_name) = split_path(path);
        self.conditions.push(Condition::Property {
            property_set,
            property_name,
            operator: ComparisonOperator::Exists,
            value: None,
            value_to: None,
        });
        self
    }

    /// Add an inclusive property range condition
    pub fn with_property_between(mut self, path: &str, lo: f64, hi: f64) -> Self {
        let (property_set, property_name) = split_path(path);
        self.conditions.push(Condition::Property {
            property_set,
            property_name,
            operator: ComparisonOperator::Between,
            value: Some(lo.into()),
            value_to: Some(hi),
        });
        self
    }

    /// Add a quantity condition for a dotted path
    pub fn with_quantity(mut self, path: &str, operator: ComparisonOperator, value: f64) -> Self {
        let (property_set, quantity_name) = split_path(path);
        self.conditions.push(Condition::Quantity {
            property_set,
            quantity_name,
            operator,
            value: Some(value),
            value_to: None,
        });
        self
    }

    /// Add an inclusive quantity range condition
    pub fn with_quantity_between(mut self, path: &str, lo: f64, hi: f64) -> Self {
        let (property_set, quantity_name) = split_path(path);
        self.conditions.push(Condition::Quantity {
            property_set,
            quantity_name,
            operator: ComparisonOperator::Between,
            value: Some(lo),
            value_to: Some(hi),
        });
        self
    }

    /// Require containment in a named storey
    pub fn in_storey(self, name: impl Into<String>) -> Self {
        self.at_level(SpatialLevel::Storey, name)
    }

    /// Require containment at a named level
    pub fn at_level(mut self, level: SpatialLevel, name: impl Into<String>) -> Self {
        self.conditions.push(Condition::Spatial {
            level,
            name: Some(name.into()),
            elevation: None,
        });
        self
    }

    /// Require a storey elevation filter
    pub fn storey_elevation(mut self, filter: NumericFilter) -> Self {
        self.conditions.push(Condition::Spatial {
            level: SpatialLevel::Storey,
            name: None,
            elevation: Some(filter),
        });
        self
    }

    /// Require a material name (pattern-aware)
    pub fn with_material(mut self, name: impl Into<String>) -> Self {
        self.conditions.push(Condition::Material {
            name: Some(name.into()),
            thickness_min: None,
            thickness_max: None,
        });
        self
    }

    /// Require an aggregate material thickness range
    pub fn with_material_thickness(mut self, min: f64, max: f64) -> Self {
        self.conditions.push(Condition::Material {
            name: None,
            thickness_min: Some(min),
            thickness_max: Some(max),
        });
        self
    }

    /// Require a classification reference
    pub fn with_classification(
        mut self,
        system: Option<String>,
        code: Option<String>,
        name: Option<String>,
    ) -> Self {
        self.conditions
            .push(Condition::Classification { system, code, name });
        self
    }

    /// Require a string attribute check
    pub fn with_attribute(
        mut self,
        field: AttributeField,
        operator: ComparisonOperator,
        value: impl Into<String>,
    ) -> Self {
        self.conditions
            .push(Condition::attribute(field, operator, value));
        self
    }

    /// Append a hand-built condition
    pub fn condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Collect a sub-builder's conditions into one `or` composite
    pub fn any_of(mut self, f: impl FnOnce(OrBuilder) -> OrBuilder) -> Self {
        let or = f(OrBuilder::default());
        if !or.conditions.is_empty() {
            self.conditions.push(Condition::Or {
                conditions: or.conditions,
            });
        }
        self
    }

    /// Materialize the rule
    pub fn build(self) -> Rule {
        let mut conditions = Vec::with_capacity(self.conditions.len() + 1);
        if let Some(type_condition) = self.type_condition {
            conditions.push(type_condition);
        }
        conditions.extend(self.conditions);
        Rule {
            id: self.id,
            name: self.name,
            description: self.description,
            mode: self.mode,
            conditions,
        }
    }
}

/// Sub-builder used by [`RuleBuilder::any_of`]
#[derive(Clone, Debug, Default)]
pub struct OrBuilder {
    conditions: Vec<Condition>,
}

impl OrBuilder {
    /// Add an entity-type alternative
    pub fn of_type(mut self, type_name: impl Into<String>) -> Self {
        self.conditions.push(Condition::entity_type(type_name));
        self
    }

    /// Add a property alternative for a dotted path
    pub fn with_property(
        mut self,
        path: &str,
        operator: ComparisonOperator,
        value: impl Into<ifc_select_model::PropertyValue>,
    ) -> Self {
        let (property_set, property_name) = split_path(path);
        self.conditions.push(Condition::Property {
            property_set,
            property_name,
            operator,
            value: Some(value.into()),
            value_to: None,
        });
        self
    }

    /// Add a hand-built alternative
    pub fn condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }
}
