//! ESTree JSON adapter.
//!
//! Reads a syntax tree that another tool (esprima, acorn, ...) already
//! produced and serialized as ESTree JSON. Slots that normally hold an array
//! but carry a single node are read as a one-element sequence.

use crate::domain::ast::{LiteralValue, Node};
use crate::domain::error::{AnalysisError, Result};
use crate::infrastructure::config::DEFAULT_MAX_NESTING_DEPTH;
use crate::ports::SourceParser;
use serde_json::{Map, Value};

/// Slots of unsupported nodes that may hold statements, in traversal order.
const STATEMENT_SLOTS: [&str; 7] = [
    "declaration",
    "block",
    "handler",
    "cases",
    "consequent",
    "body",
    "finalizer",
];

/// serde_json's recursion limit, counted in nested JSON objects and arrays.
/// ESTree input deeper than this fails before `max_depth` is ever checked.
pub const JSON_NESTING_LIMIT: usize = 128;

pub struct EstreeJsonParser {
    max_depth: usize,
}

impl EstreeJsonParser {
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_MAX_NESTING_DEPTH)
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Convert an already-deserialized ESTree value.
    pub fn parse_value(&self, value: &Value) -> Result<Node> {
        let program = self.node(value, 0)?;
        match program {
            Node::Program { .. } => Ok(program),
            other => Err(AnalysisError::InvalidInput(format!(
                "expected a Program at the root, found {}",
                other.type_name()
            ))),
        }
    }

    fn node(&self, value: &Value, depth: usize) -> Result<Node> {
        if depth > self.max_depth {
            return Err(AnalysisError::NestingTooDeep {
                limit: self.max_depth,
            });
        }
        let depth = depth + 1;

        let obj = value.as_object().ok_or_else(|| {
            AnalysisError::InvalidInput(format!("expected an ESTree node object, found {}", value))
        })?;
        let kind = obj
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| AnalysisError::malformed("node", "type"))?;

        let slots = Slots {
            parser: self,
            obj,
            kind,
            depth,
        };

        let node = match kind {
            "Program" => Node::Program {
                body: slots.many("body")?,
            },
            "FunctionDeclaration" => Node::FunctionDeclaration {
                id: slots.required("id")?,
                params: slots.many("params")?,
                body: slots.required("body")?,
            },
            "BlockStatement" => Node::BlockStatement {
                body: slots.many("body")?,
            },
            "VariableDeclaration" => Node::VariableDeclaration {
                declaration_kind: slots.str_or("kind", "var"),
                declarations: slots.many("declarations")?,
            },
            "VariableDeclarator" => Node::VariableDeclarator {
                id: slots.required("id")?,
                init: slots.optional("init")?,
            },
            "ExpressionStatement" => Node::ExpressionStatement {
                expression: slots.required("expression")?,
            },
            "AssignmentExpression" => Node::AssignmentExpression {
                operator: slots.str_or("operator", "="),
                left: slots.required("left")?,
                right: slots.required("right")?,
            },
            "WhileStatement" => Node::WhileStatement {
                test: slots.required("test")?,
                body: slots.required("body")?,
            },
            "IfStatement" => Node::IfStatement {
                test: slots.required("test")?,
                consequent: slots.required("consequent")?,
                alternate: slots.optional("alternate")?,
            },
            "ForStatement" => Node::ForStatement {
                init: slots.optional("init")?,
                test: slots.optional("test")?,
                update: slots.optional("update")?,
                body: slots.required("body")?,
            },
            "ReturnStatement" => Node::ReturnStatement {
                argument: slots.optional("argument")?,
            },
            "MemberExpression" => Node::MemberExpression {
                object: slots.required("object")?,
                property: slots.required("property")?,
                computed: obj.get("computed").and_then(Value::as_bool).unwrap_or(false),
            },
            "BinaryExpression" => Node::BinaryExpression {
                operator: slots.required_str("operator")?,
                left: slots.required("left")?,
                right: slots.required("right")?,
            },
            "LogicalExpression" => Node::LogicalExpression {
                operator: slots.required_str("operator")?,
                left: slots.required("left")?,
                right: slots.required("right")?,
            },
            "UnaryExpression" => Node::UnaryExpression {
                operator: slots.required_str("operator")?,
                argument: slots.required("argument")?,
            },
            "Literal" => Node::literal(literal_value(obj)),
            "Identifier" => Node::identifier(slots.required_str("name")?),
            other => {
                let mut children = Vec::new();
                for slot in STATEMENT_SLOTS {
                    for child in one_or_many(obj.get(slot)) {
                        if holds_statements(child) {
                            children.push(self.node(child, depth)?);
                        }
                    }
                }
                Node::Unsupported {
                    kind: other.to_string(),
                    name: obj.get("name").and_then(Value::as_str).map(str::to_string),
                    children,
                }
            }
        };

        Ok(node)
    }
}

impl Default for EstreeJsonParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceParser for EstreeJsonParser {
    fn parse(&self, src: &str) -> Result<Node> {
        let value: Value = serde_json::from_str(src).map_err(|e| {
            // serde_json exposes no error code for this; its message is stable.
            if e.to_string().starts_with("recursion limit exceeded") {
                AnalysisError::NestingTooDeep {
                    limit: self.max_depth.min(JSON_NESTING_LIMIT),
                }
            } else {
                AnalysisError::InvalidInput(format!("ESTree JSON: {}", e))
            }
        })?;
        self.parse_value(&value)
    }
}

/// Typed access to the child slots of one ESTree object.
struct Slots<'p, 'v> {
    parser: &'p EstreeJsonParser,
    obj: &'v Map<String, Value>,
    kind: &'v str,
    depth: usize,
}

impl Slots<'_, '_> {
    fn present(&self, slot: &str) -> Option<&Value> {
        self.obj.get(slot).filter(|v| !v.is_null())
    }

    fn required(&self, slot: &str) -> Result<Box<Node>> {
        let value = self
            .present(slot)
            .ok_or_else(|| AnalysisError::malformed(self.kind, slot))?;
        Ok(Box::new(self.parser.node(value, self.depth)?))
    }

    fn optional(&self, slot: &str) -> Result<Option<Box<Node>>> {
        match self.present(slot) {
            Some(value) => Ok(Some(Box::new(self.parser.node(value, self.depth)?))),
            None => Ok(None),
        }
    }

    /// A sequence slot. A lone node is read as a one-element sequence.
    fn many(&self, slot: &str) -> Result<Vec<Node>> {
        let value = self
            .present(slot)
            .ok_or_else(|| AnalysisError::malformed(self.kind, slot))?;
        one_or_many(Some(value))
            .into_iter()
            .map(|item| self.parser.node(item, self.depth))
            .collect()
    }

    fn required_str(&self, slot: &str) -> Result<String> {
        self.present(slot)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| AnalysisError::malformed(self.kind, slot))
    }

    fn str_or(&self, slot: &str, default: &str) -> String {
        self.present(slot)
            .and_then(Value::as_str)
            .unwrap_or(default)
            .to_string()
    }
}

fn one_or_many(value: Option<&Value>) -> Vec<&Value> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().filter(|v| !v.is_null()).collect(),
        Some(single) => vec![single],
    }
}

fn holds_statements(value: &Value) -> bool {
    match value.get("type").and_then(Value::as_str) {
        Some(t) => {
            t.ends_with("Statement")
                || t.ends_with("Declaration")
                || t.ends_with("Clause")
                || t.ends_with("Body")
                || t == "SwitchCase"
        }
        None => false,
    }
}

fn literal_value(obj: &Map<String, Value>) -> LiteralValue {
    if let Some(regex) = obj.get("regex") {
        let pattern = regex.get("pattern").and_then(Value::as_str).unwrap_or("");
        let flags = regex.get("flags").and_then(Value::as_str).unwrap_or("");
        return LiteralValue::RegExp(format!("/{}/{}", pattern, flags));
    }
    if let Some(bigint) = obj.get("bigint").and_then(Value::as_str) {
        if let Ok(n) = bigint.parse::<f64>() {
            return LiteralValue::Number(n);
        }
    }

    match obj.get("value") {
        Some(Value::Number(n)) => LiteralValue::Number(n.as_f64().unwrap_or(f64::NAN)),
        Some(Value::String(s)) => LiteralValue::String(s.clone()),
        Some(Value::Bool(b)) => LiteralValue::Boolean(*b),
        Some(Value::Null) | None => LiteralValue::Null,
        // A value the serializer could not represent; fall back to its source text.
        Some(_) => match obj.get("raw").and_then(Value::as_str) {
            Some(raw) => LiteralValue::String(raw.to_string()),
            None => LiteralValue::Null,
        },
    }
}
