// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC-Select Engine - Index building and rule evaluation
//!
//! This crate turns a decoded building-model graph into an immutable
//! element index and evaluates declarative selection rules against it.
//! It is pure and synchronous: no I/O, no suspension points, no shared
//! mutable state. The upstream parser and any viewer/UI layers are
//! external collaborators.
//!
//! # Example
//!
//! ```
//! use ifc_select_engine::{IndexBuilder, ModelGraph, RuleBuilder, SelectionEngine};
//! use ifc_select_model::{AttributeValue, ComparisonOperator, RawEntity};
//! use std::sync::Arc;
//!
//! let graph = ModelGraph::new(vec![
//!     RawEntity::new(1u32, "IfcWall")
//!         .with_attribute(AttributeValue::String("2O2Fr$t4X7Zf8NOew3FLOH".into())),
//! ]);
//! let index = IndexBuilder::default().build(&graph)?;
//! let engine = SelectionEngine::new(Arc::new(index));
//!
//! let rule = RuleBuilder::new("walls", "All walls").of_type("IfcWall").build();
//! let result = engine.select(&rule);
//! assert_eq!(result.count(), 1);
//! # Ok::<(), ifc_select_model::SelectError>(())
//! ```

mod builder;
mod engine;
mod evaluator;
mod index;
mod matcher;
mod validate;

pub use builder::{OrBuilder, RuleBuilder};
pub use engine::{SelectionEngine, SelectionResult};
pub use evaluator::Evaluator;
pub use index::{
    ElementIndex, IndexBuilder, ModelGraph, PropertySetData, QuantitySetData, SpatialNodeInfo,
    SpatialTable,
};
pub use matcher::{compile_glob, eval_numeric_op, eval_op, eval_string_op, match_pattern};
pub use validate::{validate, ValidationReport};

use ifc_select_model::{Result, Rule};

/// Read a rule document from JSON
///
/// Unknown condition kinds inside the document deserialize to the
/// non-matching fallback rather than failing the whole document.
pub fn rule_from_json(json: &str) -> Result<Rule> {
    serde_json::from_str(json)
        .map_err(|e| ifc_select_model::SelectError::InvalidDocument(e.to_string()))
}

/// Write a rule document to JSON
pub fn rule_to_json(rule: &Rule) -> Result<String> {
    serde_json::to_string_pretty(rule)
        .map_err(|e| ifc_select_model::SelectError::InvalidDocument(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_document_io() {
        let rule = RuleBuilder::new("r1", "External walls")
            .of_type("IfcWall")
            .build();
        let json = rule_to_json(&rule).unwrap();
        let back = rule_from_json(&json).unwrap();
        assert_eq!(rule, back);
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(rule_from_json("{ not json").is_err());
    }
}
