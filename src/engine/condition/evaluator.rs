// SPDX-License-Identifier: MIT

//! Condition tree evaluator

use super::ast::{Clause, ConditionTree, Operator, Pattern, Predicate};
use super::path::get_nested_property;
use serde_json::Value;
use std::cmp::Ordering;

/// Evaluate a condition tree against a record
///
/// An empty tree always matches. Missing or mistyped fields never raise, they
/// just fail the clause they appear in.
pub fn evaluate(tree: &ConditionTree, data: &Value) -> bool {
    tree.clauses().iter().all(|clause| evaluate_clause(clause, data))
}

fn evaluate_clause(clause: &Clause, data: &Value) -> bool {
    let actual = get_nested_property(data, &clause.path);

    let passed = match &clause.predicate {
        Predicate::Equals(expected) => strict_equals(actual, expected),
        Predicate::Operators(ops) => ops.iter().all(|op| evaluate_operator(op, actual)),
    };

    if !passed {
        log::trace!("Condition on '{}' failed (actual: {:?})", clause.path, actual);
    }
    passed
}

fn evaluate_operator(op: &Operator, actual: Option<&Value>) -> bool {
    match op {
        Operator::Gt(v) => compare(actual, v, Ordering::is_gt),
        Operator::Gte(v) => compare(actual, v, Ordering::is_ge),
        Operator::Lt(v) => compare(actual, v, Ordering::is_lt),
        Operator::Lte(v) => compare(actual, v, Ordering::is_le),
        Operator::Ne(v) => !strict_equals(actual, v),
        Operator::In(v) => match v {
            Value::Array(items) => items.iter().any(|item| strict_equals(actual, item)),
            _ => false,
        },
        Operator::Nin(v) => match v {
            Value::Array(items) => !items.iter().any(|item| strict_equals(actual, item)),
            _ => false,
        },
        Operator::Regex(pattern) => check_regex(actual, pattern),
        Operator::Unknown { symbol, .. } => {
            log::debug!("Unknown operator '{}' never matches", symbol);
            false
        }
    }
}

/// Strict equality between a resolved field and an expected value
///
/// A missing field equals nothing. Numbers compare by value regardless of
/// integer/float representation; arrays and objects compare structurally.
pub fn strict_equals(actual: Option<&Value>, expected: &Value) -> bool {
    match actual {
        None => false,
        Some(actual) => values_equal(actual, expected),
    }
}

fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            },
        },
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(k, x)| b.get(k).is_some_and(|y| values_equal(x, y)))
        }
        _ => left == right,
    }
}

/// Order two values of the same primitive type
///
/// Only number/number and string/string pairs are comparable. Everything else,
/// a missing field included, is a non-match.
fn compare<F>(actual: Option<&Value>, operand: &Value, cmp: F) -> bool
where
    F: Fn(Ordering) -> bool,
{
    let ordering = match (actual, operand) {
        (Some(Value::Number(a)), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y),
            _ => None,
        },
        (Some(Value::String(a)), Value::String(b)) => Some(a.as_str().cmp(b.as_str())),
        _ => None,
    };
    ordering.is_some_and(cmp)
}

fn check_regex(actual: Option<&Value>, pattern: &Pattern) -> bool {
    match (actual, pattern.regex()) {
        (Some(Value::String(s)), Some(re)) => re.is_match(s),
        _ => false,
    }
}
