// SPDX-License-Identifier: MIT

//! Generic rule record shared by every rule kind
//!
//! A rule pairs a condition tree with an action payload `A`. Matching only
//! looks at `is_active` and `conditions`; the payload is handed back to the
//! caller untouched.

use crate::engine::condition::ConditionTree;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;

/// A prioritised, conditional rule carrying an action payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule<A> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Inactive rules never trigger
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub conditions: ConditionTree,
    /// Higher values are evaluated first
    #[serde(default)]
    pub priority: i32,
    #[serde(flatten)]
    pub action: A,
}

fn default_active() -> bool {
    true
}

impl<A> Rule<A> {
    /// Create an active catch-all rule with priority 0
    pub fn new(name: impl Into<String>, action: A) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: None,
            is_active: true,
            conditions: ConditionTree::empty(),
            priority: 0,
            action,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_conditions(mut self, conditions: ConditionTree) -> Self {
        self.conditions = conditions;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// Stable key for the rule: its id when it has one, otherwise its name
    pub fn key(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.name)
    }

    /// Check whether the rule fires for `subject`, optionally overlaid with `context`
    pub fn should_trigger(&self, subject: &Value, context: Option<&Value>) -> bool {
        if !self.is_active {
            return false;
        }
        self.matches_conditions(subject, context)
    }

    /// Check the conditions only, ignoring `is_active`
    pub fn matches_conditions(&self, subject: &Value, context: Option<&Value>) -> bool {
        if self.conditions.is_empty() {
            return true;
        }
        let data = merge_context(subject, context);
        self.conditions.matches(&data)
    }
}

/// Shallow-merge `context` over `subject`
///
/// Top-level context keys replace subject keys of the same name; nested
/// objects are replaced, not merged. Non-object records contribute nothing.
pub fn merge_context<'a>(subject: &'a Value, context: Option<&Value>) -> Cow<'a, Value> {
    let Some(context) = context else {
        return Cow::Borrowed(subject);
    };

    let mut merged = Map::new();
    if let Value::Object(fields) = subject {
        merged.extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    if let Value::Object(fields) = context {
        merged.extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    Cow::Owned(Value::Object(merged))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::condition::parse;
    use serde_json::json;

    fn rule(conditions: Value) -> Rule<()> {
        Rule::new("test", ()).with_conditions(parse(&conditions).unwrap())
    }

    #[test]
    fn test_catch_all_rule_triggers() {
        let r = Rule::new("catch-all", ());
        assert!(r.should_trigger(&json!({}), None));
        assert!(r.should_trigger(&json!({"status": "closed"}), None));
        assert!(r.should_trigger(&json!(null), Some(&json!({"x": 1}))));
    }

    #[test]
    fn test_inactive_rule_never_triggers() {
        let r = rule(json!({})).with_active(false);
        assert!(!r.should_trigger(&json!({}), None));

        let r = rule(json!({"status": "urgent"})).with_active(false);
        assert!(!r.should_trigger(&json!({"status": "urgent"}), None));
        // Conditions alone still match
        assert!(r.matches_conditions(&json!({"status": "urgent"}), None));
    }

    #[test]
    fn test_context_overrides_subject() {
        let r = rule(json!({"priority": "high"}));
        let subject = json!({"priority": "low", "metadata": {"x": 1}});
        let context = json!({"priority": "high"});

        assert!(!r.should_trigger(&subject, None));
        assert!(r.should_trigger(&subject, Some(&context)));
    }

    #[test]
    fn test_context_adds_fields() {
        let r = rule(json!({"hoursSinceCreation": {"$gte": 2}, "status": "open"}));
        let subject = json!({"status": "open"});
        assert!(r.should_trigger(&subject, Some(&json!({"hoursSinceCreation": 3}))));
        assert!(!r.should_trigger(&subject, Some(&json!({"hoursSinceCreation": 1}))));
    }

    #[test]
    fn test_merge_is_shallow() {
        let subject = json!({"metadata": {"tier": "gold", "region": "eu"}});
        let context = json!({"metadata": {"region": "us"}});
        let merged = merge_context(&subject, Some(&context));
        assert_eq!(*merged, json!({"metadata": {"region": "us"}}));

        let r = rule(json!({"metadata.tier": "gold"}));
        assert!(r.should_trigger(&subject, None));
        assert!(!r.should_trigger(&subject, Some(&context)));
    }

    #[test]
    fn test_merge_without_context_borrows() {
        let subject = json!({"a": 1});
        assert!(matches!(merge_context(&subject, None), Cow::Borrowed(_)));
    }

    #[test]
    fn test_merge_ignores_non_object_records() {
        let subject = json!("ticket");
        let merged = merge_context(&subject, Some(&json!({"a": 1})));
        assert_eq!(*merged, json!({"a": 1}));

        let subject = json!({"a": 1});
        let merged = merge_context(&subject, Some(&json!([1, 2])));
        assert_eq!(*merged, json!({"a": 1}));
    }

    #[test]
    fn test_key_prefers_id() {
        let r = Rule::new("Escalate VIP", ());
        assert_eq!(r.key(), "Escalate VIP");
        let r = r.with_id("7f1c");
        assert_eq!(r.key(), "7f1c");
    }

    #[test]
    fn test_deserialize_defaults() {
        let r: Rule<Map<String, Value>> =
            serde_json::from_value(json!({"name": "minimal"})).unwrap();
        assert!(r.is_active);
        assert_eq!(r.priority, 0);
        assert!(r.conditions.is_empty());
        assert!(r.description.is_none());
    }

    #[test]
    fn test_deserialize_null_conditions() {
        let r: Rule<Map<String, Value>> =
            serde_json::from_value(json!({"name": "n", "conditions": null})).unwrap();
        assert!(r.conditions.is_empty());
    }
}
