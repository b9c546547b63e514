// SPDX-License-Identifier: MIT

//! Rule file loading
//!
//! Rule files are YAML (or JSON, by `.json` extension) documents holding a
//! rule kind and a list of rules:
//!
//! ```yaml
//! kind: escalation
//! rules:
//!   - name: SLA breach
//!     priority: 10
//!     conditions: { hoursSinceCreation: { $gte: 2 } }
//!     actions: { setPriority: high }
//! ```

use super::assignment::AssignmentAction;
use super::escalation::EscalationAction;
use crate::engine::{ConditionError, Rule, RuleError, RuleSet};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// The two rule families stored by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    Assignment,
    Escalation,
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleKind::Assignment => write!(f, "assignment"),
            RuleKind::Escalation => write!(f, "escalation"),
        }
    }
}

impl FromStr for RuleKind {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "assignment" => Ok(RuleKind::Assignment),
            "escalation" => Ok(RuleKind::Escalation),
            other => Err(RuleError::config(format!("Unknown rule kind: {}", other))),
        }
    }
}

/// Action payloads that can be loaded from a rule file
pub trait RuleAction: DeserializeOwned {
    const KIND: RuleKind;
}

impl RuleAction for AssignmentAction {
    const KIND: RuleKind = RuleKind::Assignment;
}

impl RuleAction for EscalationAction {
    const KIND: RuleKind = RuleKind::Escalation;
}

/// A validation finding attached to the rule it was found in
#[derive(Debug, Clone, PartialEq)]
pub struct RuleIssue {
    pub rule: String,
    pub error: ConditionError,
}

impl std::fmt::Display for RuleIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.rule, self.error)
    }
}

#[derive(Debug, Deserialize)]
struct RawRuleFile {
    kind: Option<RuleKind>,
    #[serde(default)]
    rules: Vec<Value>,
}

/// Loads rule sets from files
pub struct RuleLoader {
    strict: bool,
}

impl RuleLoader {
    /// `strict` rejects any rule whose conditions fail validation; otherwise
    /// problems are logged and the rule is kept (it will fail closed).
    pub fn new(strict: bool) -> Self {
        Self { strict }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Load a rule set from a YAML or JSON file
    pub fn load<A: RuleAction, P: AsRef<Path>>(&self, path: P) -> Result<RuleSet<A>, RuleError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        log::debug!("Loading {} rules from {}", A::KIND, path.display());

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            self.parse_json(&content)
        } else {
            self.parse_yaml(&content)
        }
    }

    /// Parse a rule set from a YAML string
    pub fn parse_yaml<A: RuleAction>(&self, content: &str) -> Result<RuleSet<A>, RuleError> {
        let raw: RawRuleFile = serde_yaml::from_str(content)?;
        self.build(raw)
    }

    /// Parse a rule set from a JSON string
    pub fn parse_json<A: RuleAction>(&self, content: &str) -> Result<RuleSet<A>, RuleError> {
        let raw: RawRuleFile = serde_json::from_str(content)?;
        self.build(raw)
    }

    fn build<A: RuleAction>(&self, raw: RawRuleFile) -> Result<RuleSet<A>, RuleError> {
        if let Some(found) = raw.kind {
            if found != A::KIND {
                return Err(RuleError::kind_mismatch(A::KIND.to_string(), found.to_string()));
            }
        }

        let mut set = RuleSet::default();
        for value in raw.rules {
            let rule: Rule<A> = serde_json::from_value(value)?;
            let issues = rule.conditions.validate();

            if let Some(first) = issues.first() {
                if self.strict {
                    return Err(RuleError::InvalidRule {
                        rule: rule.name.clone(),
                        source: first.clone(),
                    });
                }
                for issue in &issues {
                    log::warn!("Rule '{}': {}", rule.name, issue);
                }
            }
            set.push(rule);
        }

        log::info!("Loaded {} {} rules", set.len(), A::KIND);
        Ok(set)
    }
}

impl Default for RuleLoader {
    fn default() -> Self {
        Self::new(false)
    }
}

/// Validate every rule in a set
pub fn validate_rules<A>(set: &RuleSet<A>) -> Vec<RuleIssue> {
    set.rules()
        .iter()
        .flat_map(|rule| {
            rule.conditions.validate().into_iter().map(|error| RuleIssue {
                rule: rule.name.clone(),
                error,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    const ESCALATION_YAML: &str = r#"
kind: escalation
rules:
  - name: SLA breach
    priority: 10
    conditions:
      hoursSinceCreation: { $gte: 2 }
      escalationLevel: 0
    actions:
      setPriority: high
      notifySupervisors: true
    maxApplications: 1
  - name: Legal review
    conditions:
      category: { $in: [legal, compliance] }
    actions:
      addNote: Routed to legal
"#;

    #[test]
    fn test_parse_escalation_yaml() {
        let set: RuleSet<EscalationAction> =
            RuleLoader::default().parse_yaml(ESCALATION_YAML).unwrap();
        assert_eq!(set.len(), 2);

        let sla = &set.rules()[0];
        assert_eq!(sla.name, "SLA breach");
        assert_eq!(sla.priority, 10);
        assert_eq!(sla.action.actions.set_priority(), Some("high"));
        assert!(sla.should_trigger(
            &json!({"escalationLevel": 0}),
            Some(&json!({"hoursSinceCreation": 4}))
        ));

        let legal = &set.rules()[1];
        assert!(legal.should_trigger(&json!({"category": "compliance"}), None));
        assert!(!legal.should_trigger(&json!({"category": "billing"}), None));
    }

    #[test]
    fn test_parse_assignment_json() {
        let content = r#"{
            "kind": "assignment",
            "rules": [
                {"name": "Billing", "assignToId": "u-1", "conditions": {"category": "billing"}},
                {"name": "Fallback", "assignToId": "u-2", "priority": -1}
            ]
        }"#;
        let set: RuleSet<AssignmentAction> = RuleLoader::default().parse_json(content).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.rules()[1].priority, -1);
    }

    #[test]
    fn test_lenient_loading_keeps_unusual_action_values() {
        let yaml = r#"
kind: escalation
rules:
  - name: Good
    actions:
      setPriority: high
  - name: Odd flags
    actions:
      notifySupervisors: "yes"
      setPriority: 3
"#;
        let set: RuleSet<EscalationAction> = RuleLoader::new(false).parse_yaml(yaml).unwrap();
        assert_eq!(set.len(), 2);
        let odd = &set.rules()[1].action.actions;
        assert!(!odd.notify_supervisors());
        assert_eq!(odd.get("notifySupervisors"), Some(&json!("yes")));
    }

    #[test]
    fn test_kind_mismatch() {
        let result: Result<RuleSet<AssignmentAction>, _> =
            RuleLoader::default().parse_yaml(ESCALATION_YAML);
        assert!(matches!(result, Err(RuleError::KindMismatch { .. })));
    }

    #[test]
    fn test_missing_kind_is_accepted() {
        let yaml = r#"
rules:
  - name: Anyone
    assignToId: u-9
"#;
        let set: RuleSet<AssignmentAction> = RuleLoader::default().parse_yaml(yaml).unwrap();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_lenient_keeps_invalid_rule() {
        let yaml = r#"
kind: assignment
rules:
  - name: Typo
    assignToId: u-1
    conditions:
      priority: { $equals: urgent }
"#;
        let set: RuleSet<AssignmentAction> = RuleLoader::new(false).parse_yaml(yaml).unwrap();
        assert_eq!(set.len(), 1);
        assert!(!set.rules()[0].should_trigger(&json!({"priority": "urgent"}), None));

        let issues = validate_rules(&set);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].rule, "Typo");
        assert_eq!(
            issues[0].to_string(),
            "Typo: Unknown operator '$equals' on 'priority'"
        );
    }

    #[test]
    fn test_strict_rejects_invalid_rule() {
        let yaml = r#"
kind: assignment
rules:
  - name: Bad set
    assignToId: u-1
    conditions:
      category: { $in: billing }
"#;
        let result: Result<RuleSet<AssignmentAction>, _> =
            RuleLoader::new(true).parse_yaml(yaml);
        match result {
            Err(RuleError::InvalidRule { rule, source }) => {
                assert_eq!(rule, "Bad set");
                assert_eq!(source.path(), "category");
            }
            other => panic!("Expected InvalidRule, got {:?}", other.map(|s| s.len())),
        }
    }

    #[test]
    fn test_invalid_conditions_shape() {
        let yaml = r#"
kind: assignment
rules:
  - name: Bad
    assignToId: u-1
    conditions: "status == open"
"#;
        let result: Result<RuleSet<AssignmentAction>, _> = RuleLoader::default().parse_yaml(yaml);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_files() {
        let dir = tempfile::tempdir().unwrap();

        let yaml_path = dir.path().join("escalation.yaml");
        fs::File::create(&yaml_path)
            .unwrap()
            .write_all(ESCALATION_YAML.as_bytes())
            .unwrap();
        let set: RuleSet<EscalationAction> = RuleLoader::default().load(&yaml_path).unwrap();
        assert_eq!(set.len(), 2);

        let json_path = dir.path().join("assignment.JSON");
        fs::write(
            &json_path,
            r#"{"kind": "assignment", "rules": [{"name": "A", "assignToId": "u"}]}"#,
        )
        .unwrap();
        let set: RuleSet<AssignmentAction> = RuleLoader::default().load(&json_path).unwrap();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let result: Result<RuleSet<AssignmentAction>, _> =
            RuleLoader::default().load("/nonexistent/rules.yaml");
        assert!(matches!(result, Err(RuleError::Io(_))));
    }

    #[test]
    fn test_rule_kind_from_str() {
        assert_eq!("Escalation".parse::<RuleKind>().unwrap(), RuleKind::Escalation);
        assert_eq!("assignment".parse::<RuleKind>().unwrap(), RuleKind::Assignment);
        assert!("routing".parse::<RuleKind>().is_err());
    }
}
