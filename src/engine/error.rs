// SPDX-License-Identifier: MIT

//! Typed error handling for ticket-rules
//!
//! Matching itself is total and never fails. Errors only come out of decoding,
//! validating and loading rules.

use thiserror::Error;

/// Top-level error type for ticket-rules
#[derive(Debug, Error)]
pub enum RuleError {
    /// Conditions were present but not a JSON object
    #[error("Invalid conditions: {0}")]
    InvalidConditions(String),

    /// A rule file declared a different rule kind than the caller asked for
    #[error("Rule file kind mismatch: expected {expected}, found {found}")]
    KindMismatch { expected: String, found: String },

    /// A rule failed validation while loading in strict mode
    #[error("Rule '{rule}' is invalid: {source}")]
    InvalidRule {
        rule: String,
        #[source]
        source: ConditionError,
    },

    /// Configuration errors (bad env values, unknown policy names)
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

/// Problems found when validating a condition tree
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConditionError {
    /// Operator symbol not recognised; the clause can never match
    #[error("Unknown operator '{operator}' on '{path}'")]
    UnknownOperator { path: String, operator: String },

    /// Operand has the wrong shape for its operator
    #[error("Operator '{operator}' on '{path}' expects {expected}")]
    InvalidOperand {
        path: String,
        operator: String,
        expected: String,
    },

    /// `$regex` pattern failed to compile
    #[error("Invalid pattern '{pattern}' on '{path}': {message}")]
    InvalidRegex {
        path: String,
        pattern: String,
        message: String,
    },
}

impl RuleError {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a kind mismatch error
    pub fn kind_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::KindMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }
}

impl ConditionError {
    /// Field path the problem was found on
    pub fn path(&self) -> &str {
        match self {
            ConditionError::UnknownOperator { path, .. }
            | ConditionError::InvalidOperand { path, .. }
            | ConditionError::InvalidRegex { path, .. } => path,
        }
    }
}
