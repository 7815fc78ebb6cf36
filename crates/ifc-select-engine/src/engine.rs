// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The selection engine
//!
//! Iterates the index in build order, applies the evaluator per element
//! under the rule's combination mode, and packages matches into a
//! [`SelectionResult`] with grouping and materialization helpers.

use crate::evaluator::Evaluator;
use crate::index::ElementIndex;
use crate::validate::{self, ValidationReport};
use ifc_select_model::{CombinationMode, Condition, Element, ElementId, Rule};
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Evaluates rules against one immutable element index
///
/// The index is shared read-only; concurrent `select` calls against the
/// same engine are safe.
pub struct SelectionEngine {
    index: Arc<ElementIndex>,
    evaluator: Evaluator,
}

impl SelectionEngine {
    /// Create an engine over an index
    pub fn new(index: Arc<ElementIndex>) -> Self {
        Self {
            index,
            evaluator: Evaluator::new(),
        }
    }

    /// The underlying index
    pub fn index(&self) -> &ElementIndex {
        &self.index
    }

    /// Evaluate a rule over the full index
    ///
    /// A rule with zero conditions and `all` mode is a vacuous conjunction
    /// and matches every element; accidentally empty rules therefore
    /// select the whole model. Validate first when that matters.
    pub fn select(&self, rule: &Rule) -> SelectionResult {
        let start = Instant::now();
        let mut express_ids = Vec::new();

        for element in self.index.elements() {
            if self.element_matches(element, &rule.conditions, rule.mode) {
                express_ids.push(element.id);
            }
        }

        let evaluation_time_ms = start.elapsed().as_secs_f64() * 1000.0;
        debug!(
            rule = %rule.id,
            matched = express_ids.len(),
            scanned = self.index.len(),
            "rule evaluated"
        );

        SelectionResult {
            express_ids,
            rule_id: rule.id.clone(),
            rule_name: rule.name.clone(),
            evaluation_time_ms,
            index: Arc::clone(&self.index),
        }
    }

    /// Evaluate ad hoc conditions wrapped in a default all-mode rule
    pub fn query(&self, conditions: impl Into<Vec<Condition>>) -> SelectionResult {
        let rule = Rule::new("adhoc", "Ad hoc query", conditions.into());
        self.select(&rule)
    }

    /// Validate a rule against this index (advisory)
    pub fn validate(&self, rule: &Rule) -> ValidationReport {
        validate::validate(rule, &self.index)
    }

    fn element_matches(
        &self,
        element: &Element,
        conditions: &[Condition],
        mode: CombinationMode,
    ) -> bool {
        match mode {
            CombinationMode::All => conditions
                .iter()
                .all(|c| self.evaluator.matches(element, c)),
            CombinationMode::Any => conditions
                .iter()
                .any(|c| self.evaluator.matches(element, c)),
        }
    }
}

/// Result of one rule evaluation
///
/// Ephemeral: produced fresh per call, never persisted. Holds the matched
/// ids in index order plus on-demand materialization and grouping.
/// Serializes to the flat result payload; the index handle is not part
/// of it.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionResult {
    /// Matched element ids in index order
    pub express_ids: Vec<ElementId>,
    /// Originating rule id
    pub rule_id: String,
    /// Originating rule name
    pub rule_name: String,
    /// Wall-clock evaluation time
    pub evaluation_time_ms: f64,
    #[serde(skip)]
    index: Arc<ElementIndex>,
}

impl SelectionResult {
    /// Number of matched elements
    pub fn count(&self) -> usize {
        self.express_ids.len()
    }

    /// Whether nothing matched
    pub fn is_empty(&self) -> bool {
        self.express_ids.is_empty()
    }

    /// Resolve matched ids back to records
    pub fn elements(&self) -> Vec<&Element> {
        self.express_ids
            .iter()
            .filter_map(|id| self.index.get(*id))
            .collect()
    }

    /// Bucket matched ids by a dotted field path
    ///
    /// Paths address the record shape: `typeName`, `name`, `spatial.storey`,
    /// `material.name`, `properties.<namespace>.<name>`,
    /// `quantities.<namespace>.<name>`, `classifications.system`, ...
    /// Ids whose path does not resolve bucket under `"undefined"`.
    pub fn group_by(&self, path: &str) -> FxHashMap<String, Vec<ElementId>> {
        let segments: Vec<&str> = path.split('.').collect();
        let mut groups: FxHashMap<String, Vec<ElementId>> = FxHashMap::default();
        for id in &self.express_ids {
            let key = self
                .index
                .get(*id)
                .and_then(|element| resolve_path(element, &segments))
                .unwrap_or_else(|| "undefined".to_string());
            groups.entry(key).or_default().push(*id);
        }
        groups
    }
}

/// Resolve a dotted path against one record
fn resolve_path(element: &Element, segments: &[&str]) -> Option<String> {
    match segments {
        ["id"] => Some(element.id.0.to_string()),
        ["globalId" | "externalId"] => Some(element.global_id.clone()),
        ["typeName" | "type"] => Some(element.type_name.clone()),
        ["name"] => element.name.clone(),
        ["description"] => element.description.clone(),
        ["tag"] => element.tag.clone(),
        ["objectType"] => element.object_type.clone(),
        ["predefinedType"] => element.predefined_type.clone(),
        ["spatial", level] => {
            let spatial = element.spatial.as_ref()?;
            match *level {
                "project" => spatial.project.clone(),
                "site" => spatial.site.clone(),
                "building" => spatial.building.clone(),
                "storey" => spatial.storey.clone(),
                "space" => spatial.space.clone(),
                "storeyElevation" => spatial.storey_elevation.map(|e| e.to_string()),
                _ => None,
            }
        }
        ["material"] | ["material", "name"] => {
            element.material.as_ref().map(|m| m.name.clone())
        }
        ["material", "totalThickness"] => element
            .material
            .as_ref()
            .and_then(|m| m.total_thickness)
            .map(|t| t.to_string()),
        ["classifications", field] => {
            let first = element.classifications.first()?;
            match *field {
                "system" => Some(first.system.clone()),
                "code" => Some(first.code.clone()),
                "name" => first.name.clone(),
                "key" => Some(first.key()),
                _ => None,
            }
        }
        ["properties", namespace, name] => element
            .property(namespace, name)
            .filter(|v| !v.is_null())
            .map(|v| v.to_string()),
        ["quantities", namespace, name] => {
            element.quantity(namespace, name).map(|q| q.to_string())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::RuleBuilder;
    use crate::index::{
        IndexBuilder, ModelGraph, PropertySetData, QuantitySetData, SpatialNodeInfo, SpatialTable,
    };
    use ifc_select_model::{
        AttributeValue, ComparisonOperator, PropertyValue, RawEntity, SpatialLevel,
    };
    use serde_json::json;

    fn entity(id: u32, type_name: &str, name: &str) -> RawEntity {
        RawEntity::new(id, type_name)
            .with_attribute(AttributeValue::String(format!("guid-{id}")))
            .with_attribute(AttributeValue::Null)
            .with_attribute(AttributeValue::String(name.into()))
    }

    /// One wall with Pset_WallCommon.IsExternal = true, two doors, three
    /// windows, two spaces with NetFloorArea 42 and 61.
    fn fixture() -> SelectionEngine {
        let mut graph = ModelGraph::new(vec![
            entity(1, "IfcWall", "Wall 1"),
            entity(2, "IfcDoor", "Door 1"),
            entity(3, "IfcDoor", "Door 2"),
            entity(4, "IfcWindow", "Window 1"),
            entity(5, "IfcWindow", "Window 2"),
            entity(6, "IfcWindow", "Window 3"),
            entity(7, "IfcSpace", "Office"),
            entity(8, "IfcSpace", "Hall"),
        ]);
        graph.property_sets.insert(
            1,
            vec![PropertySetData {
                name: "Pset_WallCommon".into(),
                properties: vec![("IsExternal".into(), PropertyValue::Boolean(true))],
            }],
        );
        graph.quantity_sets.insert(
            7,
            vec![QuantitySetData {
                name: "Qto_SpaceBaseQuantities".into(),
                quantities: vec![("NetFloorArea".into(), 42.0)],
            }],
        );
        graph.quantity_sets.insert(
            8,
            vec![QuantitySetData {
                name: "Qto_SpaceBaseQuantities".into(),
                quantities: vec![("NetFloorArea".into(), 61.0)],
            }],
        );

        let mut table = SpatialTable::default();
        table.nodes.insert(
            100,
            SpatialNodeInfo {
                level: SpatialLevel::Storey,
                name: Some("Level 1".into()),
                elevation: Some(0.0),
            },
        );
        table.nodes.insert(
            101,
            SpatialNodeInfo {
                level: SpatialLevel::Storey,
                name: Some("Level 2".into()),
                elevation: Some(3.0),
            },
        );
        for id in [1u32, 2, 3, 4] {
            table.containment.insert(id, 100);
        }
        for id in [5u32, 6, 7, 8] {
            table.containment.insert(id, 101);
        }
        graph.spatial = Some(table);

        let index = IndexBuilder::default().build(&graph).unwrap();
        SelectionEngine::new(Arc::new(index))
    }

    #[test]
    fn external_wall_scenario() {
        let engine = fixture();
        let rule = RuleBuilder::new("r", "External walls")
            .of_type("IfcWall")
            .with_property(
                "Pset_WallCommon.IsExternal",
                ComparisonOperator::Equals,
                true,
            )
            .build();
        let result = engine.select(&rule);
        assert_eq!(result.count(), 1);
        assert_eq!(result.express_ids, vec![ElementId(1)]);
    }

    #[test]
    fn wildcard_namespace_scenario() {
        let engine = fixture();
        let rule = RuleBuilder::new("r", "External anything")
            .with_property("IsExternal", ComparisonOperator::Equals, true)
            .build();
        assert_eq!(engine.select(&rule).count(), 1);
    }

    #[test]
    fn doors_or_windows_scenario() {
        let engine = fixture();
        let rule: Rule = serde_json::from_value(json!({
            "id": "r",
            "name": "Doors or windows",
            "conditions": [{
                "type": "or",
                "conditions": [
                    { "type": "entityType", "typeNames": ["IfcDoor"] },
                    { "type": "entityType", "typeNames": ["IfcWindow"] }
                ]
            }]
        }))
        .unwrap();
        assert_eq!(engine.select(&rule).count(), 5);
    }

    #[test]
    fn quantity_threshold_scenario() {
        let engine = fixture();
        let rule = RuleBuilder::new("r", "Large spaces")
            .with_quantity("NetFloorArea", ComparisonOperator::GreaterThan, 50.0)
            .build();
        let result = engine.select(&rule);
        assert_eq!(result.count(), 1);
        assert_eq!(result.express_ids, vec![ElementId(8)]);
    }

    #[test]
    fn invalid_regex_never_throws_scenario() {
        let engine = fixture();
        let rule: Rule = serde_json::from_value(json!({
            "id": "r",
            "name": "Broken regex",
            "conditions": [{
                "type": "attribute",
                "field": "name",
                "operator": "matches",
                "value": "[unclosed"
            }]
        }))
        .unwrap();
        assert_eq!(engine.select(&rule).count(), 0);
    }

    #[test]
    fn mode_set_algebra() {
        let engine = fixture();
        let c1: Condition =
            serde_json::from_value(json!({ "type": "entityType", "typeNames": ["IfcDoor"] }))
                .unwrap();
        let c2: Condition = serde_json::from_value(
            json!({ "type": "spatial", "level": "storey", "name": "Level 1" }),
        )
        .unwrap();

        let all_rule = Rule::new("all", "all", vec![c1.clone(), c2.clone()]);
        let any_rule = Rule {
            mode: CombinationMode::Any,
            ..Rule::new("any", "any", vec![c1.clone(), c2.clone()])
        };

        let set1: Vec<ElementId> = engine.query(vec![c1]).express_ids;
        let set2: Vec<ElementId> = engine.query(vec![c2]).express_ids;

        let all: Vec<ElementId> = engine.select(&all_rule).express_ids;
        let any: Vec<ElementId> = engine.select(&any_rule).express_ids;

        let intersection: Vec<ElementId> =
            set1.iter().filter(|id| set2.contains(id)).copied().collect();
        let mut union: Vec<ElementId> = set1.clone();
        union.extend(set2.iter().filter(|id| !set1.contains(id)));
        let mut union_sorted = union.clone();
        union_sorted.sort_by_key(|id| id.0);

        assert_eq!(all, intersection);
        let mut any_sorted = any.clone();
        any_sorted.sort_by_key(|id| id.0);
        assert_eq!(any_sorted, union_sorted);
    }

    #[test]
    fn empty_conditions_vacuously_match_everything() {
        let engine = fixture();
        let rule = Rule::new("empty", "empty", Vec::new());
        assert_eq!(engine.select(&rule).count(), engine.index().len());
    }

    #[test]
    fn evaluation_is_idempotent() {
        let engine = fixture();
        let rule = RuleBuilder::new("r", "doors").of_type("IfcDoor").build();
        let first = engine.select(&rule).express_ids;
        let second = engine.select(&rule).express_ids;
        assert_eq!(first, second);
    }

    #[test]
    fn group_by_storey_and_type() {
        let engine = fixture();
        let rule = RuleBuilder::new("r", "everything").build();
        let result = engine.select(&rule);

        let by_storey = result.group_by("spatial.storey");
        assert_eq!(by_storey.get("Level 1").map(Vec::len), Some(4));
        assert_eq!(by_storey.get("Level 2").map(Vec::len), Some(4));

        let by_type = result.group_by("typeName");
        assert_eq!(by_type.get("IfcWindow").map(Vec::len), Some(3));

        // unresolved path buckets under "undefined"
        let by_bogus = result.group_by("material.name");
        assert_eq!(by_bogus.get("undefined").map(Vec::len), Some(8));
    }

    #[test]
    fn materialization_resolves_records() {
        let engine = fixture();
        let rule = RuleBuilder::new("r", "walls").of_type("IfcWall").build();
        let result = engine.select(&rule);
        let elements = result.elements();
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].name.as_deref(), Some("Wall 1"));
        assert!(result.evaluation_time_ms >= 0.0);
    }

    #[test]
    fn result_serializes_to_flat_payload() {
        let engine = fixture();
        let rule = RuleBuilder::new("r", "doors").of_type("IfcDoor").build();
        let payload = serde_json::to_value(engine.select(&rule)).unwrap();
        assert_eq!(payload["ruleId"], "r");
        assert_eq!(payload["ruleName"], "doors");
        assert_eq!(payload["expressIds"], json!([2, 3]));
        assert!(payload["evaluationTimeMs"].is_number());
        assert!(payload.get("index").is_none());
    }

    #[test]
    fn validate_delegates_to_index() {
        let engine = fixture();
        let rule = Rule::new("empty", "empty", Vec::new());
        let report = engine.validate(&rule);
        assert!(!report.valid);
    }
}
