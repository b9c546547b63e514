// SPDX-License-Identifier: MIT

//! Ticket escalation rules
//!
//! Escalation rules are evaluated against the ticket overlaid with a context
//! record (e.g. `hoursSinceCreation`, `escalationLevel`) computed by the
//! caller at sweep time.

use crate::engine::{Rule, RuleSet};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Actions to take when an escalation rule fires
///
/// Stored as the raw object the platform persisted and handed back unchanged.
/// The accessors read the well-known keys and treat a missing or mistyped
/// value as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EscalationActions {
    raw: Map<String, Value>,
}

impl EscalationActions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`, replacing any previous value
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.raw.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.raw.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.raw
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.raw
    }

    /// `assignToId`: user to reassign the ticket to
    pub fn assign_to_id(&self) -> Option<&str> {
        self.str_field("assignToId")
    }

    /// `setPriority`: new ticket priority
    pub fn set_priority(&self) -> Option<&str> {
        self.str_field("setPriority")
    }

    /// `addNote`: internal note to add to the ticket
    pub fn add_note(&self) -> Option<&str> {
        self.str_field("addNote")
    }

    pub fn notify_supervisors(&self) -> bool {
        self.flag("notifySupervisors")
    }

    pub fn increase_escalation_level(&self) -> bool {
        self.flag("increaseEscalationLevel")
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.raw.get(key).and_then(Value::as_str)
    }

    fn flag(&self, key: &str) -> bool {
        self.raw.get(key).and_then(Value::as_bool).unwrap_or(false)
    }
}

impl From<Map<String, Value>> for EscalationActions {
    fn from(raw: Map<String, Value>) -> Self {
        Self { raw }
    }
}

/// Action payload of an escalation rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EscalationAction {
    pub actions: EscalationActions,
    /// How many times the rule may fire against the same ticket
    #[serde(default = "default_max_applications")]
    pub max_applications: u32,
}

fn default_max_applications() -> u32 {
    1
}

impl EscalationAction {
    pub fn new(actions: EscalationActions) -> Self {
        Self {
            actions,
            max_applications: default_max_applications(),
        }
    }

    /// Whether the rule may fire again after `times_applied` applications
    pub fn can_apply(&self, times_applied: u32) -> bool {
        times_applied < self.max_applications
    }
}

pub type EscalationRule = Rule<EscalationAction>;

impl RuleSet<EscalationAction> {
    /// Matching rules that have not yet used up their applications
    ///
    /// `times_applied` maps a rule key (id, or name when there is no id) to
    /// how often it already fired for this ticket; absent keys count as zero.
    /// A periodic sweep applies at most one rule per ticket per pass; use
    /// [`first_applicable`](Self::first_applicable) for that.
    pub fn applicable(
        &self,
        ticket: &Value,
        context: Option<&Value>,
        times_applied: &HashMap<String, u32>,
    ) -> Vec<&EscalationRule> {
        self.all_matches(ticket, context)
            .into_iter()
            .filter(|rule| self.has_applications_left(rule, times_applied))
            .collect()
    }

    /// The highest-priority matching rule that has not used up its applications
    pub fn first_applicable(
        &self,
        ticket: &Value,
        context: Option<&Value>,
        times_applied: &HashMap<String, u32>,
    ) -> Option<&EscalationRule> {
        self.candidates()
            .into_iter()
            .filter(|rule| self.has_applications_left(rule, times_applied))
            .find(|rule| rule.should_trigger(ticket, context))
    }

    fn has_applications_left(
        &self,
        rule: &EscalationRule,
        times_applied: &HashMap<String, u32>,
    ) -> bool {
        let applied = times_applied.get(rule.key()).copied().unwrap_or(0);
        let allowed = rule.action.can_apply(applied);
        if !allowed {
            log::debug!(
                "Rule '{}' exhausted ({} of {} applications)",
                rule.name,
                applied,
                rule.action.max_applications
            );
        }
        allowed
    }
}
