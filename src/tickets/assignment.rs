// SPDX-License-Identifier: MIT

//! Ticket assignment rules
//!
//! An assignment rule routes a ticket to a user. Rules are evaluated against
//! the ticket alone, without extra context.

use crate::engine::{Rule, RuleSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Action payload of an assignment rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentAction {
    /// User the ticket is assigned to
    pub assign_to_id: String,
    /// Leave tickets that already have an assignee alone
    #[serde(default = "default_skip_if_assigned")]
    pub skip_if_assigned: bool,
}

fn default_skip_if_assigned() -> bool {
    true
}

impl AssignmentAction {
    pub fn new(assign_to_id: impl Into<String>) -> Self {
        Self {
            assign_to_id: assign_to_id.into(),
            skip_if_assigned: true,
        }
    }

    /// Whether the assignment should be skipped for a ticket in this state
    pub fn should_skip(&self, currently_assigned: bool) -> bool {
        self.skip_if_assigned && currently_assigned
    }
}

pub type AssignmentRule = Rule<AssignmentAction>;

impl RuleSet<AssignmentAction> {
    /// The highest-priority matching rule that may assign this ticket
    ///
    /// Rules that would skip an already-assigned ticket are passed over so a
    /// lower-priority rule with `skipIfAssigned: false` can still apply.
    pub fn assignment_for(
        &self,
        ticket: &Value,
        currently_assigned: bool,
    ) -> Option<&AssignmentRule> {
        self.all_matches(ticket, None).into_iter().find(|rule| {
            let skip = rule.action.should_skip(currently_assigned);
            if skip {
                log::debug!("Skipping rule '{}': ticket already assigned", rule.name);
            }
            !skip
        })
    }
}
