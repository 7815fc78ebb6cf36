// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for index construction and rule handling
//!
//! Only construction-time problems surface as errors. Evaluation-time
//! irregularities (unknown condition kinds, malformed patterns, missing
//! optional data) degrade to a non-match plus a log line.

use thiserror::Error;

/// Result type alias for selection operations
pub type Result<T> = std::result::Result<T, SelectError>;

/// Errors that can occur while building an index or handling rules
#[derive(Error, Debug)]
pub enum SelectError {
    /// The raw graph carried no entity collection
    #[error("Missing entity collection: cannot build an index from an empty graph")]
    MissingEntities,

    /// Structural rule defect
    #[error("Invalid rule '{rule_id}': {message}")]
    InvalidRule { rule_id: String, message: String },

    /// Failed to read a rule document
    #[error("Invalid rule document: {0}")]
    InvalidDocument(String),
}

impl SelectError {
    /// Create an invalid-rule error
    pub fn invalid_rule(rule_id: impl Into<String>, message: impl Into<String>) -> Self {
        SelectError::InvalidRule {
            rule_id: rule_id.into(),
            message: message.into(),
        }
    }
}
