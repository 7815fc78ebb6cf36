// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Recursive condition evaluation
//!
//! [`Evaluator::matches`] decides whether one element satisfies one
//! condition. Evaluation is total: unknown kinds, malformed patterns and
//! missing optional data all resolve to "no match" (fail-closed) instead
//! of raising, so a full-index scan never aborts.

use crate::matcher::{self, eval_numeric_op, eval_op, eval_string_op, match_pattern};
use ifc_select_model::{
    ComparisonOperator, Condition, Element, NumericFilter, PropertyValue, RelationKind,
    SpatialLevel,
};
use tracing::warn;

/// Stateless per-element condition evaluator
#[derive(Clone, Copy, Debug, Default)]
pub struct Evaluator;

impl Evaluator {
    /// Create an evaluator
    pub fn new() -> Self {
        Self
    }

    /// Decide whether `element` satisfies `condition`
    pub fn matches(&self, element: &Element, condition: &Condition) -> bool {
        match condition {
            Condition::EntityType {
                type_names,
                include_subtypes,
                predefined_type,
            } => self.matches_entity_type(element, type_names, *include_subtypes, predefined_type),
            Condition::Property {
                property_set,
                property_name,
                operator,
                value,
                value_to,
            } => self.matches_property(
                element,
                property_set,
                property_name,
                *operator,
                value.as_ref(),
                *value_to,
            ),
            Condition::Quantity {
                property_set,
                quantity_name,
                operator,
                value,
                value_to,
            } => {
                let subject = resolve_quantity(element, property_set, quantity_name);
                match *operator {
                    ComparisonOperator::Exists => subject.is_some(),
                    ComparisonOperator::NotExists => subject.is_none(),
                    op => match value {
                        Some(v) => eval_numeric_op(subject, op, *v, *value_to),
                        None => op.accepts_missing() && subject.is_none(),
                    },
                }
            }
            Condition::Attribute {
                field,
                operator,
                value,
            } => eval_string_op(
                element.attribute(*field),
                *operator,
                value.as_deref().unwrap_or_default(),
            ),
            Condition::Spatial {
                level,
                name,
                elevation,
            } => self.matches_spatial(element, *level, name.as_deref(), elevation.as_ref()),
            Condition::Material {
                name,
                thickness_min,
                thickness_max,
            } => self.matches_material(element, name.as_deref(), *thickness_min, *thickness_max),
            Condition::Classification { system, code, name } => {
                element.classifications.iter().any(|entry| {
                    optional_pattern(system.as_deref(), Some(&entry.system))
                        && optional_pattern(code.as_deref(), Some(&entry.code))
                        && optional_pattern(name.as_deref(), entry.name.as_deref())
                })
            }
            Condition::Relationship { relation } => {
                let refs = match &element.relationships {
                    Some(refs) => refs,
                    None => return false,
                };
                match relation {
                    RelationKind::ContainedIn => refs.contained_in.is_some(),
                    RelationKind::AggregatedBy => refs.aggregated_by.is_some(),
                    RelationKind::ConnectedTo => !refs.connected_to.is_empty(),
                    RelationKind::DefinedByType => refs.defined_by_type.is_some(),
                }
            }
            Condition::And { conditions } => {
                conditions.iter().all(|c| self.matches(element, c))
            }
            Condition::Or { conditions } => {
                conditions.iter().any(|c| self.matches(element, c))
            }
            // NOT negates the disjunction of its children: an element
            // passes only when none of them match it.
            Condition::Not { conditions } => {
                !conditions.iter().any(|c| self.matches(element, c))
            }
            Condition::Unknown => {
                warn!(element = %element.id, "unknown condition kind evaluated as non-match");
                false
            }
        }
    }

    fn matches_entity_type(
        &self,
        element: &Element,
        type_names: &[String],
        include_subtypes: bool,
        predefined_type: &Option<String>,
    ) -> bool {
        let type_hit = type_names.iter().any(|requested| {
            if include_subtypes {
                element
                    .type_ancestry
                    .iter()
                    .any(|ancestor| match_pattern(ancestor, requested))
            } else {
                match_pattern(&element.type_name, requested)
            }
        });
        if !type_hit {
            return false;
        }

        match predefined_type {
            Some(pattern) => match &element.predefined_type {
                Some(actual) => match_pattern(actual, pattern),
                None => false,
            },
            None => true,
        }
    }

    fn matches_property(
        &self,
        element: &Element,
        property_set: &str,
        property_name: &str,
        operator: ComparisonOperator,
        value: Option<&PropertyValue>,
        value_to: Option<f64>,
    ) -> bool {
        let subject = resolve_property(element, property_set, property_name);
        match operator {
            ComparisonOperator::Exists => subject.is_some_and(|v| !v.is_null()),
            ComparisonOperator::NotExists => !subject.is_some_and(|v| !v.is_null()),
            op => eval_op(subject, op, value, value_to),
        }
    }

    fn matches_spatial(
        &self,
        element: &Element,
        level: SpatialLevel,
        name: Option<&str>,
        elevation: Option<&NumericFilter>,
    ) -> bool {
        let placement = match &element.spatial {
            Some(p) => p,
            None => return false,
        };
        let level_name = placement.name_at(level);

        if let Some(pattern) = name {
            match level_name {
                Some(actual) => {
                    if !match_pattern(actual, pattern) {
                        return false;
                    }
                }
                None => return false,
            }
        }

        if let Some(filter) = elevation {
            if level != SpatialLevel::Storey {
                return false;
            }
            if !eval_numeric_op(
                placement.storey_elevation,
                filter.operator,
                filter.value,
                filter.value_to,
            ) {
                return false;
            }
        }

        // Neither name nor elevation given: any placement at this level
        if name.is_none() && elevation.is_none() {
            return level_name.is_some();
        }
        true
    }

    fn matches_material(
        &self,
        element: &Element,
        name: Option<&str>,
        thickness_min: Option<f64>,
        thickness_max: Option<f64>,
    ) -> bool {
        let material = match &element.material {
            Some(m) => m,
            None => return false,
        };

        if let Some(pattern) = name {
            let name_hit = match_pattern(&material.name, pattern)
                || material
                    .layers
                    .iter()
                    .any(|layer| match_pattern(&layer.name, pattern));
            if !name_hit {
                return false;
            }
        }

        if thickness_min.is_some() || thickness_max.is_some() {
            let total = match material.total_thickness {
                Some(t) => t,
                None => return false,
            };
            if thickness_min.is_some_and(|min| total < min) {
                return false;
            }
            if thickness_max.is_some_and(|max| total > max) {
                return false;
            }
        }

        true
    }
}

/// Optional pattern sub-check: an absent pattern passes, an absent
/// subject fails a present pattern
fn optional_pattern(pattern: Option<&str>, subject: Option<&str>) -> bool {
    match pattern {
        None => true,
        Some(p) => subject.map(|s| match_pattern(s, p)).unwrap_or(false),
    }
}

/// Resolve a property through the namespace pattern
///
/// An exact namespace is a single map lookup. `"*"` searches every
/// namespace; a wildcarded namespace searches those matching the pattern.
/// First hit wins, in map iteration order.
fn resolve_property<'a>(
    element: &'a Element,
    namespace: &str,
    name: &str,
) -> Option<&'a PropertyValue> {
    if namespace == "*" {
        element.find_property(name)
    } else if matcher::has_wildcards(namespace) {
        element
            .properties
            .iter()
            .filter(|(ns, _)| match_pattern(ns, namespace))
            .find_map(|(_, set)| set.get(name))
    } else {
        element.property(namespace, name)
    }
}

/// Quantity resolution with the same namespace semantics as properties
fn resolve_quantity(element: &Element, namespace: &str, name: &str) -> Option<f64> {
    if namespace == "*" {
        element.find_quantity(name)
    } else if matcher::has_wildcards(namespace) {
        element
            .quantities
            .iter()
            .filter(|(ns, _)| match_pattern(ns, namespace))
            .find_map(|(_, set)| set.get(name))
            .copied()
    } else {
        element.quantity(namespace, name)
    }
}
