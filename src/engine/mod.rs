// SPDX-License-Identifier: MIT

pub mod condition;
pub mod error;
pub mod rule;
pub mod rule_set;

pub use condition::ConditionTree;
pub use error::{ConditionError, RuleError};
pub use rule::Rule;
pub use rule_set::{MatchPolicy, RuleSet};
