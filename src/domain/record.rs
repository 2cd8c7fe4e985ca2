//! Outline Records
//!
//! One `Record` is one row of the structural outline.

use crate::domain::ast::LiteralValue;
use serde::Serialize;
use std::fmt;

/// A rendered expression: either text, or a literal passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DisplayValue {
    Text(String),
    Literal(LiteralValue),
}

impl fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayValue::Text(s) => write!(f, "{}", s),
            DisplayValue::Literal(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for DisplayValue {
    fn from(s: &str) -> Self {
        DisplayValue::Text(s.to_string())
    }
}

impl From<LiteralValue> for DisplayValue {
    fn from(v: LiteralValue) -> Self {
        DisplayValue::Literal(v)
    }
}

/// A row of the outline: where a construct starts and what it binds, tests or yields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    /// Logical line, starting at 1.
    pub line: usize,
    /// Node kind of the construct, e.g. `WhileStatement`.
    #[serde(rename = "type")]
    pub kind: String,
    pub name: Option<String>,
    pub condition: Option<String>,
    pub value: Option<DisplayValue>,
}

impl Record {
    /// Declaration-like row: a bound name, optionally with a value.
    pub fn named(line: usize, kind: &str, name: String, value: Option<DisplayValue>) -> Self {
        Self {
            line,
            kind: kind.to_string(),
            name: Some(name),
            condition: None,
            value,
        }
    }

    /// Control-flow row carrying only the rendered test.
    pub fn conditional(line: usize, kind: &str, condition: String) -> Self {
        Self {
            line,
            kind: kind.to_string(),
            name: None,
            condition: Some(condition),
            value: None,
        }
    }

    /// Row carrying only a value.
    pub fn valued(line: usize, kind: &str, value: DisplayValue) -> Self {
        Self {
            line,
            kind: kind.to_string(),
            name: None,
            condition: None,
            value: Some(value),
        }
    }

    /// Number of populated fields among name / condition / value.
    pub fn populated_fields(&self) -> usize {
        [
            self.name.is_some(),
            self.condition.is_some(),
            self.value.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count()
    }

    /// One or two of name / condition / value set, and a positive line.
    pub fn is_well_formed(&self) -> bool {
        self.line > 0 && matches!(self.populated_fields(), 1 | 2)
    }

    /// The five display cells; absent fields become empty strings.
    pub fn cells(&self) -> [String; 5] {
        [
            self.line.to_string(),
            self.kind.clone(),
            self.name.clone().unwrap_or_default(),
            self.condition.clone().unwrap_or_default(),
            self.value.as_ref().map(|v| v.to_string()).unwrap_or_default(),
        ]
    }
}

/// Column headers, in cell order.
pub const COLUMNS: [&str; 5] = ["line", "type", "name", "condition", "value"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_keep_invariant() {
        let named = Record::named(1, "VariableDeclarator", "x".into(), None);
        let cond = Record::conditional(2, "IfStatement", "a".into());
        let val = Record::valued(3, "ReturnStatement", "a".into());
        for r in [&named, &cond, &val] {
            assert!(r.is_well_formed(), "{:?}", r);
        }
        assert_eq!(named.populated_fields(), 1);
    }

    #[test]
    fn test_empty_record_is_not_well_formed() {
        let r = Record {
            line: 1,
            kind: "ReturnStatement".into(),
            name: None,
            condition: None,
            value: None,
        };
        assert!(!r.is_well_formed());
    }

    #[test]
    fn test_cells_blank_absent_fields() {
        let r = Record::named(4, "VariableDeclarator", "x".into(), Some(LiteralValue::Number(1.0).into()));
        assert_eq!(r.cells(), ["4", "VariableDeclarator", "x", "", "1"].map(String::from));
    }

    #[test]
    fn test_serializes_type_key_and_nulls() {
        let r = Record::named(1, "VariableDeclarator", "x".into(), Some(LiteralValue::Number(1.0).into()));
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "line": 1,
                "type": "VariableDeclarator",
                "name": "x",
                "condition": null,
                "value": 1
            })
        );
    }
}
