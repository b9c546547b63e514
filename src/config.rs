// SPDX-License-Identifier: MIT

//! Runtime settings read from the environment
//!
//! - `TICKET_RULES_STRICT`: reject rules with invalid conditions (`1`, `true`, `yes`)
//! - `TICKET_RULES_POLICY`: default match policy (`first` or `all`)

use crate::engine::{MatchPolicy, RuleError};

pub const STRICT_VAR: &str = "TICKET_RULES_STRICT";
pub const POLICY_VAR: &str = "TICKET_RULES_POLICY";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub strict: bool,
    pub policy: MatchPolicy,
}

impl Settings {
    /// Read settings from process environment variables
    pub fn from_env() -> Result<Self, RuleError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, RuleError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let strict = match lookup(STRICT_VAR) {
            Some(raw) => parse_flag(&raw).ok_or_else(|| {
                RuleError::config(format!("{} must be a boolean, got '{}'", STRICT_VAR, raw))
            })?,
            None => false,
        };
        let policy = match lookup(POLICY_VAR) {
            Some(raw) => raw.parse()?,
            None => MatchPolicy::default(),
        };
        Ok(Self { strict, policy })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
