// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC-Select Model - Shared types for rule-based element selection
//!
//! This crate defines the data model the selection engine operates on:
//! the raw-graph input shapes handed over by an upstream parser, the
//! unified element record produced by the index builder, the type-ancestry
//! table, and the condition/rule union that drives evaluation.
//!
//! # Example
//!
//! ```
//! use ifc_select_model::{Condition, ComparisonOperator, Rule};
//!
//! let rule = Rule::new(
//!     "external-walls",
//!     "External walls",
//!     vec![
//!         Condition::entity_type("IfcWall"),
//!         Condition::property(
//!             "Pset_WallCommon",
//!             "IsExternal",
//!             ComparisonOperator::Equals,
//!             true,
//!         ),
//!     ],
//! );
//! assert_eq!(rule.conditions.len(), 2);
//! ```

pub mod element;
pub mod error;
pub mod hierarchy;
pub mod rule;
pub mod types;
pub mod value;

// Re-export all public types
pub use element::*;
pub use error::*;
pub use hierarchy::*;
pub use rule::*;
pub use types::*;
pub use value::*;
