// SPDX-License-Identifier: MIT

//! Decoded form of a JSON condition tree

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A condition tree: every clause must pass for the tree to match.
///
/// Round-trips through JSON as `{ "<field.path>": <literal | operator clause> }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct ConditionTree {
    pub(crate) clauses: Vec<Clause>,
}

/// One `(field path, expectation)` entry of a condition tree
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    /// Dot-notation path into the evaluated record
    pub path: String,
    pub predicate: Predicate,
}

/// What a clause expects of the resolved field value
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Literal value, tested with strict equality
    Equals(Value),
    /// Operator clause; every operator must pass
    Operators(Vec<Operator>),
}

/// Comparison operators
#[derive(Debug, Clone, PartialEq)]
pub enum Operator {
    /// $gt
    Gt(Value),
    /// $gte
    Gte(Value),
    /// $lt
    Lt(Value),
    /// $lte
    Lte(Value),
    /// $ne
    Ne(Value),
    /// $in
    In(Value),
    /// $nin
    Nin(Value),
    /// $regex
    Regex(Pattern),
    /// Any other symbol. Never passes.
    Unknown { symbol: String, operand: Value },
}

/// A `$regex` operand, compiled once when the tree is decoded
#[derive(Debug, Clone)]
pub struct Pattern {
    source: Value,
    compiled: Option<Regex>,
}

impl Pattern {
    /// Compile `source`. Non-string or invalid patterns are kept but never match.
    ///
    /// Operands are not stringified first, so `{"$regex": 5}` is not the
    /// pattern `5` and matches nothing; write `{"$regex": "5"}` instead.
    pub fn new(source: Value) -> Self {
        let compiled = source.as_str().and_then(|s| Regex::new(s).ok());
        Self { source, compiled }
    }

    /// The operand as written in the rule
    pub fn source(&self) -> &Value {
        &self.source
    }

    /// The compiled regex, if the operand was a valid pattern string
    pub fn regex(&self) -> Option<&Regex> {
        self.compiled.as_ref()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Operator {
    /// Build an operator from its symbol and operand
    pub fn from_symbol(symbol: &str, operand: Value) -> Self {
        match symbol {
            "$gt" => Operator::Gt(operand),
            "$gte" => Operator::Gte(operand),
            "$lt" => Operator::Lt(operand),
            "$lte" => Operator::Lte(operand),
            "$ne" => Operator::Ne(operand),
            "$in" => Operator::In(operand),
            "$nin" => Operator::Nin(operand),
            "$regex" => Operator::Regex(Pattern::new(operand)),
            other => Operator::Unknown {
                symbol: other.to_string(),
                operand,
            },
        }
    }

    /// The operator symbol as written in rule JSON
    pub fn symbol(&self) -> &str {
        match self {
            Operator::Gt(_) => "$gt",
            Operator::Gte(_) => "$gte",
            Operator::Lt(_) => "$lt",
            Operator::Lte(_) => "$lte",
            Operator::Ne(_) => "$ne",
            Operator::In(_) => "$in",
            Operator::Nin(_) => "$nin",
            Operator::Regex(_) => "$regex",
            Operator::Unknown { symbol, .. } => symbol,
        }
    }

    /// The operand as written in rule JSON
    pub fn operand(&self) -> &Value {
        match self {
            Operator::Gt(v)
            | Operator::Gte(v)
            | Operator::Lt(v)
            | Operator::Lte(v)
            | Operator::Ne(v)
            | Operator::In(v)
            | Operator::Nin(v) => v,
            Operator::Regex(p) => p.source(),
            Operator::Unknown { operand, .. } => operand,
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl ConditionTree {
    /// A tree with no clauses. Matches everything.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }
}

impl From<ConditionTree> for Value {
    fn from(tree: ConditionTree) -> Self {
        let mut map = Map::new();
        for clause in tree.clauses {
            let expected = match clause.predicate {
                Predicate::Equals(v) => v,
                Predicate::Operators(ops) => Value::Object(
                    ops.iter()
                        .map(|op| (op.symbol().to_string(), op.operand().clone()))
                        .collect(),
                ),
            };
            map.insert(clause.path, expected);
        }
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operator_symbols() {
        let symbols = ["$gt", "$gte", "$lt", "$lte", "$ne", "$in", "$nin", "$regex"];
        for symbol in symbols {
            let op = Operator::from_symbol(symbol, json!(1));
            assert_eq!(op.symbol(), symbol);
            assert_eq!(format!("{}", op), symbol);
        }
    }

    #[test]
    fn test_unknown_operator_keeps_symbol() {
        let op = Operator::from_symbol("$between", json!([1, 5]));
        assert_eq!(
            op,
            Operator::Unknown {
                symbol: "$between".to_string(),
                operand: json!([1, 5]),
            }
        );
        assert_eq!(op.operand(), &json!([1, 5]));
    }

    #[test]
    fn test_pattern_compiles_strings_only() {
        assert!(Pattern::new(json!("^INC-\\d+$")).regex().is_some());
        assert!(Pattern::new(json!("(unclosed")).regex().is_none());
        assert!(Pattern::new(json!(42)).regex().is_none());
    }

    #[test]
    fn test_empty_tree() {
        let tree = ConditionTree::empty();
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert_eq!(Value::from(tree), json!({}));
    }
}
