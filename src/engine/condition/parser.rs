// SPDX-License-Identifier: MIT

//! Decoding and validation of JSON condition trees
//!
//! Decoding is lenient: any object decodes, and operator problems are kept in
//! the tree so they fail to match at evaluation time. `validate` reports the
//! same problems up front so a loader can reject them.

use super::ast::{Clause, ConditionTree, Operator, Predicate};
use crate::engine::error::{ConditionError, RuleError};
use serde_json::Value;

/// Decode a condition tree from JSON
///
/// `null` decodes to the empty tree. Any other non-object value is an error.
pub fn parse(value: &Value) -> Result<ConditionTree, RuleError> {
    match value {
        Value::Null => Ok(ConditionTree::empty()),
        Value::Object(map) => {
            let clauses = map
                .iter()
                .map(|(path, expected)| Clause {
                    path: path.clone(),
                    predicate: parse_predicate(expected),
                })
                .collect();
            Ok(ConditionTree { clauses })
        }
        other => Err(RuleError::InvalidConditions(format!(
            "expected an object, got {}",
            type_name(other)
        ))),
    }
}

/// Decode a condition tree from a JSON string
pub fn parse_str(input: &str) -> Result<ConditionTree, RuleError> {
    let value: Value = serde_json::from_str(input)?;
    parse(&value)
}

fn parse_predicate(expected: &Value) -> Predicate {
    match expected {
        Value::Object(ops) => Predicate::Operators(
            ops.iter()
                .map(|(symbol, operand)| Operator::from_symbol(symbol, operand.clone()))
                .collect(),
        ),
        literal => Predicate::Equals(literal.clone()),
    }
}

/// Report every operator problem in the tree
pub fn validate(tree: &ConditionTree) -> Vec<ConditionError> {
    let mut issues = Vec::new();

    for clause in tree.clauses() {
        let Predicate::Operators(ops) = &clause.predicate else {
            continue;
        };
        for op in ops {
            if let Some(issue) = check_operator(&clause.path, op) {
                issues.push(issue);
            }
        }
    }

    issues
}

fn check_operator(path: &str, op: &Operator) -> Option<ConditionError> {
    let invalid_operand = |expected: &str| ConditionError::InvalidOperand {
        path: path.to_string(),
        operator: op.symbol().to_string(),
        expected: expected.to_string(),
    };

    match op {
        Operator::Gt(v) | Operator::Gte(v) | Operator::Lt(v) | Operator::Lte(v) => {
            if v.is_number() || v.is_string() {
                None
            } else {
                Some(invalid_operand("a number or a string"))
            }
        }
        Operator::Ne(_) => None,
        Operator::In(v) | Operator::Nin(v) => {
            if v.is_array() {
                None
            } else {
                Some(invalid_operand("an array"))
            }
        }
        Operator::Regex(pattern) => match pattern.source() {
            Value::String(source) => match regex::Regex::new(source) {
                Ok(_) => None,
                Err(e) => Some(ConditionError::InvalidRegex {
                    path: path.to_string(),
                    pattern: source.clone(),
                    message: e.to_string(),
                }),
            },
            _ => Some(invalid_operand("a pattern string")),
        },
        Operator::Unknown { symbol, .. } => Some(ConditionError::UnknownOperator {
            path: path.to_string(),
            operator: symbol.clone(),
        }),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl TryFrom<Value> for ConditionTree {
    type Error = RuleError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        parse(&value)
    }
}
