// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Advisory rule validation
//!
//! Validation never blocks evaluation. A rule with zero conditions is a
//! hard error (there is nothing to evaluate); referencing a namespace or
//! classification system the index has never observed is only a warning,
//! carrying a handful of comparable known names as suggestions.

use crate::index::ElementIndex;
use crate::matcher::has_wildcards;
use ifc_select_model::{Condition, Result, Rule, SelectError};
use rustc_hash::FxHashSet;
use serde::Serialize;

/// Maximum suggestions carried by one warning
const MAX_SUGGESTIONS: usize = 5;

/// Validation outcome
#[derive(Clone, Debug, Default, Serialize)]
pub struct ValidationReport {
    /// False only when errors are present
    pub valid: bool,
    /// Structural defects; evaluation is still permitted but expected to
    /// yield trivial results
    pub errors: Vec<String>,
    /// Advisory findings; never affect `valid`
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// Turn structural defects into a hard error
    ///
    /// Warnings never fail the report.
    pub fn require_valid(&self, rule_id: &str) -> Result<()> {
        if self.valid {
            Ok(())
        } else {
            Err(SelectError::invalid_rule(rule_id, self.errors.join("; ")))
        }
    }
}

/// Validate a rule against an index
pub fn validate(rule: &Rule, index: &ElementIndex) -> ValidationReport {
    let mut report = ValidationReport {
        valid: true,
        ..Default::default()
    };

    if rule.conditions.is_empty() {
        report.valid = false;
        report
            .errors
            .push(format!("Rule '{}' has no conditions", rule.id));
        return report;
    }

    for condition in &rule.conditions {
        check_condition(condition, index, &mut report);
    }
    report
}

fn check_condition(condition: &Condition, index: &ElementIndex, report: &mut ValidationReport) {
    match condition {
        Condition::Property { property_set, .. } => {
            warn_unknown_name(
                property_set,
                index.property_set_names(),
                "property set",
                report,
            );
        }
        Condition::Quantity { property_set, .. } => {
            warn_unknown_name(
                property_set,
                index.quantity_set_names(),
                "quantity set",
                report,
            );
        }
        Condition::Classification {
            system: Some(system),
            ..
        } => {
            warn_unknown_name(
                system,
                index.classification_systems(),
                "classification system",
                report,
            );
        }
        Condition::And { conditions }
        | Condition::Or { conditions }
        | Condition::Not { conditions } => {
            for child in conditions {
                check_condition(child, index, report);
            }
        }
        _ => {}
    }
}

/// Emit a warning when `name` was never observed in the index
///
/// Wildcarded names are resolved at evaluation time and not warned about.
fn warn_unknown_name(
    name: &str,
    known: &FxHashSet<String>,
    kind: &str,
    report: &mut ValidationReport,
) {
    if has_wildcards(name) || known.contains(name) {
        return;
    }
    let suggestions = suggest(name, known);
    let mut message = format!("Unknown {kind} '{name}'");
    if !suggestions.is_empty() {
        message.push_str(&format!("; did you mean one of: {}?", suggestions.join(", ")));
    }
    report.warnings.push(message);
}

/// Comparable known names: shared prefix or substring overlap
fn suggest(name: &str, known: &FxHashSet<String>) -> Vec<String> {
    let needle = name.to_lowercase();
    let stem: String = needle.chars().take(5).collect();
    let mut hits: Vec<String> = known
        .iter()
        .filter(|candidate| {
            let c = candidate.to_lowercase();
            c.contains(&needle) || needle.contains(&c) || (!stem.is_empty() && c.starts_with(&stem))
        })
        .cloned()
        .collect();
    hits.sort();
    hits.truncate(MAX_SUGGESTIONS);
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{IndexBuilder, ModelGraph, PropertySetData};
    use ifc_select_model::{AttributeValue, PropertyValue, RawEntity, Rule};
    use serde_json::json;

    fn index_with_pset() -> ElementIndex {
        let mut graph = ModelGraph::new(vec![RawEntity::new(1u32, "IfcWall")
            .with_attribute(AttributeValue::String("guid".into()))]);
        graph.property_sets.insert(
            1,
            vec![PropertySetData {
                name: "Pset_WallCommon".into(),
                properties: vec![("IsExternal".into(), PropertyValue::Boolean(true))],
            }],
        );
        IndexBuilder::default().build(&graph).unwrap()
    }

    fn rule_with(conditions: serde_json::Value) -> Rule {
        serde_json::from_value(json!({
            "id": "r",
            "name": "rule",
            "conditions": conditions
        }))
        .unwrap()
    }

    #[test]
    fn empty_rule_is_an_error() {
        let report = validate(&rule_with(json!([])), &index_with_pset());
        assert!(!report.valid);
        assert_eq!(report.errors.len(), 1);
    }

    #[test]
    fn require_valid_surfaces_a_structural_error() {
        let index = index_with_pset();
        let report = validate(&rule_with(json!([])), &index);
        match report.require_valid("r") {
            Err(SelectError::InvalidRule { rule_id, message }) => {
                assert_eq!(rule_id, "r");
                assert!(message.contains("no conditions"));
            }
            other => panic!("expected an invalid-rule error, got {other:?}"),
        }

        let ok = rule_with(json!([{
            "type": "entityType",
            "typeNames": ["IfcWall"]
        }]));
        assert!(validate(&ok, &index).require_valid("r").is_ok());
    }

    #[test]
    fn unknown_namespace_warns_with_suggestion() {
        let rule = rule_with(json!([{
            "type": "property",
            "propertySet": "Pset_WallComon",
            "propertyName": "IsExternal",
            "operator": "exists"
        }]));
        let report = validate(&rule, &index_with_pset());
        assert!(report.valid);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("Pset_WallCommon"));
    }

    #[test]
    fn wildcard_namespace_is_not_warned_about() {
        let rule = rule_with(json!([{
            "type": "property",
            "propertySet": "Pset_*",
            "propertyName": "IsExternal",
            "operator": "exists"
        }]));
        let report = validate(&rule, &index_with_pset());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn composites_are_recursed() {
        let rule = rule_with(json!([{
            "type": "or",
            "conditions": [{
                "type": "property",
                "propertySet": "Pset_Bogus",
                "propertyName": "X",
                "operator": "exists"
            }]
        }]));
        let report = validate(&rule, &index_with_pset());
        assert!(report.valid);
        assert_eq!(report.warnings.len(), 1);
    }
}
