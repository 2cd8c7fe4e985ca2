// AST data structures for scriptscope.
// These types represent parsed JavaScript in the ESTree shape, reduced to the
// node kinds the structural outline understands.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;

/// A node in the abstract syntax tree.
///
/// Required child slots are boxed nodes, optional ones are `Option`s. Anything
/// the outline has no case for lands in `Unsupported`.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Program {
        body: Vec<Node>,
    },
    FunctionDeclaration {
        id: Box<Node>,
        params: Vec<Node>,
        body: Box<Node>,
    },
    BlockStatement {
        body: Vec<Node>,
    },
    VariableDeclaration {
        /// `var`, `let` or `const`.
        declaration_kind: String,
        declarations: Vec<Node>,
    },
    VariableDeclarator {
        id: Box<Node>,
        init: Option<Box<Node>>,
    },
    ExpressionStatement {
        expression: Box<Node>,
    },
    AssignmentExpression {
        operator: String,
        left: Box<Node>,
        right: Box<Node>,
    },
    WhileStatement {
        test: Box<Node>,
        body: Box<Node>,
    },
    IfStatement {
        test: Box<Node>,
        consequent: Box<Node>,
        alternate: Option<Box<Node>>,
    },
    ForStatement {
        init: Option<Box<Node>>,
        test: Option<Box<Node>>,
        update: Option<Box<Node>>,
        body: Box<Node>,
    },
    ReturnStatement {
        argument: Option<Box<Node>>,
    },
    MemberExpression {
        object: Box<Node>,
        property: Box<Node>,
        computed: bool,
    },
    BinaryExpression {
        operator: String,
        left: Box<Node>,
        right: Box<Node>,
    },
    LogicalExpression {
        operator: String,
        left: Box<Node>,
        right: Box<Node>,
    },
    UnaryExpression {
        operator: String,
        argument: Box<Node>,
    },
    Literal {
        value: LiteralValue,
    },
    Identifier {
        name: String,
    },
    /// Any kind without a dedicated case: call expressions, object literals,
    /// `try` blocks, classes, ... `children` holds the statement-level nodes
    /// found inside it, so the outline can still descend.
    Unsupported {
        kind: String,
        name: Option<String>,
        children: Vec<Node>,
    },
}

/// Tag for each node variant. `Unsupported` keeps no string so the tag stays `Copy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Program,
    FunctionDeclaration,
    BlockStatement,
    VariableDeclaration,
    VariableDeclarator,
    ExpressionStatement,
    AssignmentExpression,
    WhileStatement,
    IfStatement,
    ForStatement,
    ReturnStatement,
    MemberExpression,
    BinaryExpression,
    LogicalExpression,
    UnaryExpression,
    Literal,
    Identifier,
    Unsupported,
}

impl NodeKind {
    /// ESTree type name.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Program => "Program",
            NodeKind::FunctionDeclaration => "FunctionDeclaration",
            NodeKind::BlockStatement => "BlockStatement",
            NodeKind::VariableDeclaration => "VariableDeclaration",
            NodeKind::VariableDeclarator => "VariableDeclarator",
            NodeKind::ExpressionStatement => "ExpressionStatement",
            NodeKind::AssignmentExpression => "AssignmentExpression",
            NodeKind::WhileStatement => "WhileStatement",
            NodeKind::IfStatement => "IfStatement",
            NodeKind::ForStatement => "ForStatement",
            NodeKind::ReturnStatement => "ReturnStatement",
            NodeKind::MemberExpression => "MemberExpression",
            NodeKind::BinaryExpression => "BinaryExpression",
            NodeKind::LogicalExpression => "LogicalExpression",
            NodeKind::UnaryExpression => "UnaryExpression",
            NodeKind::Literal => "Literal",
            NodeKind::Identifier => "Identifier",
            NodeKind::Unsupported => "Unsupported",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Program { .. } => NodeKind::Program,
            Node::FunctionDeclaration { .. } => NodeKind::FunctionDeclaration,
            Node::BlockStatement { .. } => NodeKind::BlockStatement,
            Node::VariableDeclaration { .. } => NodeKind::VariableDeclaration,
            Node::VariableDeclarator { .. } => NodeKind::VariableDeclarator,
            Node::ExpressionStatement { .. } => NodeKind::ExpressionStatement,
            Node::AssignmentExpression { .. } => NodeKind::AssignmentExpression,
            Node::WhileStatement { .. } => NodeKind::WhileStatement,
            Node::IfStatement { .. } => NodeKind::IfStatement,
            Node::ForStatement { .. } => NodeKind::ForStatement,
            Node::ReturnStatement { .. } => NodeKind::ReturnStatement,
            Node::MemberExpression { .. } => NodeKind::MemberExpression,
            Node::BinaryExpression { .. } => NodeKind::BinaryExpression,
            Node::LogicalExpression { .. } => NodeKind::LogicalExpression,
            Node::UnaryExpression { .. } => NodeKind::UnaryExpression,
            Node::Literal { .. } => NodeKind::Literal,
            Node::Identifier { .. } => NodeKind::Identifier,
            Node::Unsupported { .. } => NodeKind::Unsupported,
        }
    }

    /// Display name of the node's kind. Unsupported nodes report the kind
    /// they were parsed from (`CallExpression`, `TryStatement`, ...).
    pub fn type_name(&self) -> &str {
        match self {
            Node::Unsupported { kind, .. } => kind,
            other => other.kind().name(),
        }
    }

    pub fn identifier(name: impl Into<String>) -> Self {
        Node::Identifier { name: name.into() }
    }

    pub fn literal(value: LiteralValue) -> Self {
        Node::Literal { value }
    }
}

/// Serializes in ESTree shape: a `type` tag plus the kind's child slots, so
/// the output reads back through the ESTree adapter. Unsupported nodes keep
/// their kind as `type`, their name, and their statement children under `body`.
impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", self.type_name())?;

        match self {
            Node::Program { body } => {
                map.serialize_entry("sourceType", "script")?;
                map.serialize_entry("body", body)?;
            }
            Node::FunctionDeclaration { id, params, body } => {
                map.serialize_entry("id", id)?;
                map.serialize_entry("params", params)?;
                map.serialize_entry("body", body)?;
            }
            Node::BlockStatement { body } => map.serialize_entry("body", body)?,
            Node::VariableDeclaration {
                declaration_kind,
                declarations,
            } => {
                map.serialize_entry("declarations", declarations)?;
                map.serialize_entry("kind", declaration_kind)?;
            }
            Node::VariableDeclarator { id, init } => {
                map.serialize_entry("id", id)?;
                map.serialize_entry("init", init)?;
            }
            Node::ExpressionStatement { expression } => {
                map.serialize_entry("expression", expression)?;
            }
            Node::AssignmentExpression {
                operator,
                left,
                right,
            }
            | Node::BinaryExpression {
                operator,
                left,
                right,
            }
            | Node::LogicalExpression {
                operator,
                left,
                right,
            } => {
                map.serialize_entry("operator", operator)?;
                map.serialize_entry("left", left)?;
                map.serialize_entry("right", right)?;
            }
            Node::WhileStatement { test, body } => {
                map.serialize_entry("test", test)?;
                map.serialize_entry("body", body)?;
            }
            Node::IfStatement {
                test,
                consequent,
                alternate,
            } => {
                map.serialize_entry("test", test)?;
                map.serialize_entry("consequent", consequent)?;
                map.serialize_entry("alternate", alternate)?;
            }
            Node::ForStatement {
                init,
                test,
                update,
                body,
            } => {
                map.serialize_entry("init", init)?;
                map.serialize_entry("test", test)?;
                map.serialize_entry("update", update)?;
                map.serialize_entry("body", body)?;
            }
            Node::ReturnStatement { argument } => map.serialize_entry("argument", argument)?,
            Node::MemberExpression {
                object,
                property,
                computed,
            } => {
                map.serialize_entry("computed", computed)?;
                map.serialize_entry("object", object)?;
                map.serialize_entry("property", property)?;
            }
            Node::UnaryExpression { operator, argument } => {
                map.serialize_entry("operator", operator)?;
                map.serialize_entry("prefix", &true)?;
                map.serialize_entry("argument", argument)?;
            }
            Node::Literal { value } => {
                map.serialize_entry("value", value)?;
                if let LiteralValue::RegExp(source) = value {
                    if let Some(regex) = RegexParts::split(source) {
                        map.serialize_entry("regex", &regex)?;
                    }
                }
            }
            Node::Identifier { name } => map.serialize_entry("name", name)?,
            Node::Unsupported { name, children, .. } => {
                if let Some(name) = name {
                    map.serialize_entry("name", name)?;
                }
                if !children.is_empty() {
                    map.serialize_entry("body", children)?;
                }
            }
        }

        map.end()
    }
}

/// ESTree `regex` member of a regular expression literal.
#[derive(Serialize)]
struct RegexParts<'a> {
    pattern: &'a str,
    flags: &'a str,
}

impl<'a> RegexParts<'a> {
    /// Split `/pattern/flags`.
    fn split(source: &'a str) -> Option<Self> {
        let (pattern, flags) = source.strip_prefix('/')?.rsplit_once('/')?;
        Some(Self { pattern, flags })
    }
}

/// The value carried by a `Literal` node.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Number(f64),
    String(String),
    Boolean(bool),
    Null,
    /// Regular expression in its source form, e.g. `/ab+c/gi`.
    RegExp(String),
}

impl fmt::Display for LiteralValue {
    /// Stringifies the value the way JavaScript string concatenation would.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Number(n) => write!(f, "{}", format_number(*n)),
            LiteralValue::String(s) => write!(f, "{}", s),
            LiteralValue::Boolean(b) => write!(f, "{}", b),
            LiteralValue::Null => write!(f, "null"),
            LiteralValue::RegExp(r) => write!(f, "{}", r),
        }
    }
}

impl Serialize for LiteralValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LiteralValue::Number(n) if is_integral(*n) => serializer.serialize_i64(*n as i64),
            LiteralValue::Number(n) => serializer.serialize_f64(*n),
            LiteralValue::String(s) | LiteralValue::RegExp(s) => serializer.serialize_str(s),
            LiteralValue::Boolean(b) => serializer.serialize_bool(*b),
            LiteralValue::Null => serializer.serialize_unit(),
        }
    }
}

// Integral and exactly representable as i64.
fn is_integral(n: f64) -> bool {
    n.is_finite() && n.fract() == 0.0 && n.abs() < 9.0e15
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if is_integral(n) {
        // -0 prints as 0 in JS
        return format!("{}", n as i64);
    }

    // Number.prototype.toString: shortest round-trip digits, placed by the
    // decimal exponent. Exponent form below 1e-6 and from 1e21 up.
    let sign = if n < 0.0 { "-" } else { "" };
    let sci = format!("{:e}", n.abs());
    let (mantissa, exponent) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let k = digits.len() as i32;
    let point = exponent + 1;

    let body = if k <= point && point <= 21 {
        format!("{}{}", digits, "0".repeat((point - k) as usize))
    } else if 0 < point && point <= 21 {
        let (int, frac) = digits.split_at(point as usize);
        format!("{}.{}", int, frac)
    } else if -6 < point && point <= 0 {
        format!("0.{}{}", "0".repeat((-point) as usize), digits)
    } else {
        let (first, rest) = digits.split_at(1);
        let fraction = if rest.is_empty() {
            String::new()
        } else {
            format!(".{}", rest)
        };
        let exp_sign = if point - 1 >= 0 { "+" } else { "-" };
        format!("{}{}e{}{}", first, fraction, exp_sign, (point - 1).abs())
    };
    format!("{}{}", sign, body)
}
