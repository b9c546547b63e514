// SPDX-License-Identifier: MIT

//! Condition trees for ticket rules
//!
//! Conditions are JSON objects mapping field paths to expectations:
//! - `{ "status": "new" }`
//! - `{ "hoursSinceCreation": { "$gte": 2 } }`
//! - `{ "metadata.customerTier": { "$in": ["gold", "platinum"] } }`

mod ast;
mod evaluator;
mod parser;
mod path;

pub use ast::{Clause, ConditionTree, Operator, Pattern, Predicate};
pub use evaluator::{evaluate, strict_equals};
pub use parser::{parse, parse_str, validate};
pub use path::get_nested_property;

impl ConditionTree {
    /// Check whether `data` satisfies every clause
    pub fn matches(&self, data: &serde_json::Value) -> bool {
        evaluate(self, data)
    }

    /// Report operator problems without rejecting the tree
    pub fn validate(&self) -> Vec<crate::engine::error::ConditionError> {
        validate(self)
    }
}
