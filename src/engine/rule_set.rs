// SPDX-License-Identifier: MIT

//! Priority-ordered rule selection

use crate::engine::error::RuleError;
use crate::engine::rule::Rule;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// How many matching rules a caller applies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    /// Only the highest-priority match
    #[default]
    First,
    /// Every match, highest priority first
    All,
}

impl FromStr for MatchPolicy {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" => Ok(MatchPolicy::First),
            "all" => Ok(MatchPolicy::All),
            other => Err(RuleError::config(format!("Unknown match policy: {}", other))),
        }
    }
}

impl std::fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchPolicy::First => write!(f, "first"),
            MatchPolicy::All => write!(f, "all"),
        }
    }
}

/// A collection of rules of one kind
#[derive(Debug, Clone)]
pub struct RuleSet<A> {
    rules: Vec<Rule<A>>,
}

impl<A> RuleSet<A> {
    pub fn new(rules: Vec<Rule<A>>) -> Self {
        Self { rules }
    }

    pub fn push(&mut self, rule: Rule<A>) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[Rule<A>] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Active rules, highest priority first. Equal priorities keep insertion order.
    pub fn candidates(&self) -> Vec<&Rule<A>> {
        let mut active: Vec<&Rule<A>> = self.rules.iter().filter(|r| r.is_active).collect();
        active.sort_by(|a, b| b.priority.cmp(&a.priority));
        active
    }

    /// The highest-priority rule that triggers
    pub fn first_match(&self, subject: &Value, context: Option<&Value>) -> Option<&Rule<A>> {
        let found = self
            .candidates()
            .into_iter()
            .find(|rule| self.check(rule, subject, context));
        if found.is_none() {
            log::debug!("No rule matched among {} rules", self.rules.len());
        }
        found
    }

    /// Every rule that triggers, highest priority first
    pub fn all_matches(&self, subject: &Value, context: Option<&Value>) -> Vec<&Rule<A>> {
        self.candidates()
            .into_iter()
            .filter(|rule| self.check(rule, subject, context))
            .collect()
    }

    /// Select matches according to `policy`
    pub fn select(
        &self,
        policy: MatchPolicy,
        subject: &Value,
        context: Option<&Value>,
    ) -> Vec<&Rule<A>> {
        match policy {
            MatchPolicy::First => self.first_match(subject, context).into_iter().collect(),
            MatchPolicy::All => self.all_matches(subject, context),
        }
    }

    fn check(&self, rule: &Rule<A>, subject: &Value, context: Option<&Value>) -> bool {
        let matched = rule.should_trigger(subject, context);
        log::debug!(
            "Rule '{}' (priority {}): {}",
            rule.name,
            rule.priority,
            if matched { "matched" } else { "no match" }
        );
        matched
    }
}

impl<A> Default for RuleSet<A> {
    fn default() -> Self {
        Self { rules: Vec::new() }
    }
}

impl<A> From<Vec<Rule<A>>> for RuleSet<A> {
    fn from(rules: Vec<Rule<A>>) -> Self {
        Self::new(rules)
    }
}

impl<A> FromIterator<Rule<A>> for RuleSet<A> {
    fn from_iter<I: IntoIterator<Item = Rule<A>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
