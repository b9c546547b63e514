// SPDX-License-Identifier: MIT

//! Ticket assignment and escalation rules

pub mod assignment;
pub mod escalation;
pub mod loader;

pub use assignment::{AssignmentAction, AssignmentRule};
pub use escalation::{EscalationAction, EscalationActions, EscalationRule};
pub use loader::{validate_rules, RuleAction, RuleIssue, RuleKind, RuleLoader};
