//! JavaScript parser adapter built on tree-sitter.
//!
//! tree-sitter produces a concrete syntax tree with its own node names
//! (`statement_block`, `lexical_declaration`, ...). This module maps it onto
//! the ESTree-shaped domain `Node`. Parenthesized expressions are unwrapped,
//! comments dropped, and everything without a domain case becomes
//! `Node::Unsupported` under its ESTree type name.

use crate::domain::ast::{LiteralValue, Node};
use crate::domain::error::{AnalysisError, Result};
use crate::infrastructure::config::DEFAULT_MAX_NESTING_DEPTH;
use crate::ports::SourceParser;
use tree_sitter::{Node as TsNode, Parser};

pub struct TreeSitterJsParser {
    max_depth: usize,
}

impl TreeSitterJsParser {
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_MAX_NESTING_DEPTH)
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }
}

impl Default for TreeSitterJsParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceParser for TreeSitterJsParser {
    fn parse(&self, src: &str) -> Result<Node> {
        // tree_sitter::Parser is stateful and not Sync, so every call gets its own.
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_javascript::LANGUAGE.into())
            .map_err(|e| AnalysisError::InvalidInput(format!("Failed to set language: {}", e)))?;

        let tree = parser
            .parse(src, None)
            .ok_or_else(|| AnalysisError::InvalidInput("Failed to parse content".to_string()))?;

        let root = tree.root_node();
        if root.has_error() {
            return Err(syntax_error(root, src.as_bytes()));
        }

        let converter = Converter {
            source: src.as_bytes(),
            max_depth: self.max_depth,
        };
        converter.program(root)
    }
}

/// Locate the first ERROR or MISSING node and describe it.
fn syntax_error(root: TsNode, source: &[u8]) -> AnalysisError {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            let pos = node.start_position();
            let message = if node.is_missing() {
                format!("missing '{}'", node.kind())
            } else {
                let text = node_text(node, source);
                let snippet: String = text.chars().take(40).collect();
                format!("unexpected '{}'", snippet)
            };
            return AnalysisError::Parse {
                line: pos.row + 1,
                column: pos.column + 1,
                message,
            };
        }
        let mut cursor = node.walk();
        let children: Vec<TsNode> = node
            .children(&mut cursor)
            .filter(|c| c.has_error() || c.is_missing())
            .collect();
        stack.extend(children.into_iter().rev());
    }

    let pos = root.start_position();
    AnalysisError::Parse {
        line: pos.row + 1,
        column: pos.column + 1,
        message: "invalid syntax".to_string(),
    }
}

fn node_text<'a>(node: TsNode, source: &'a [u8]) -> &'a str {
    source
        .get(node.start_byte()..node.end_byte())
        .and_then(|slice| std::str::from_utf8(slice).ok())
        .unwrap_or("")
}

/// Named children without comments.
fn named_children<'t>(node: TsNode<'t>) -> Vec<TsNode<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|c| c.kind() != "comment" && c.kind() != "hash_bang_line")
        .collect()
}

fn first_named_child(node: TsNode) -> Option<TsNode> {
    named_children(node).into_iter().next()
}

fn is_statement_kind(kind: &str) -> bool {
    kind == "statement_block" || kind.ends_with("_statement") || kind.ends_with("_declaration")
}

/// Containers that are not statements themselves but hold statements.
fn is_statement_container(kind: &str) -> bool {
    kind.ends_with("_clause")
        || matches!(kind, "switch_body" | "switch_case" | "switch_default" | "class_body")
}

/// ESTree type name for a tree-sitter node kind.
fn estree_kind(kind: &str) -> String {
    let mapped = match kind {
        "arrow_function" => "ArrowFunctionExpression",
        "function_expression" | "function" => "FunctionExpression",
        "generator_function" => "FunctionExpression",
        "template_string" => "TemplateLiteral",
        "object" => "ObjectExpression",
        "array" => "ArrayExpression",
        "ternary_expression" => "ConditionalExpression",
        "this" => "ThisExpression",
        "super" => "Super",
        "object_pattern" => "ObjectPattern",
        "array_pattern" => "ArrayPattern",
        "assignment_pattern" => "AssignmentPattern",
        "rest_pattern" => "RestElement",
        "spread_element" => "SpreadElement",
        "else_clause" => "ElseClause",
        "catch_clause" => "CatchClause",
        "finally_clause" => "FinallyClause",
        "switch_case" | "switch_default" => "SwitchCase",
        "class" => "ClassExpression",
        "import_statement" => "ImportDeclaration",
        "export_statement" => "ExportNamedDeclaration",
        "labeled_statement" => "LabeledStatement",
        "do_statement" => "DoWhileStatement",
        "for_in_statement" => "ForInStatement",
        "empty_statement" => "EmptyStatement",
        other => return pascal_case(other),
    };
    mapped.to_string()
}

fn pascal_case(kind: &str) -> String {
    kind.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

struct Converter<'s> {
    source: &'s [u8],
    max_depth: usize,
}

impl<'s> Converter<'s> {
    fn text(&self, node: TsNode) -> &'s str {
        node_text(node, self.source)
    }

    fn enter(&self, depth: usize) -> Result<usize> {
        if depth > self.max_depth {
            return Err(AnalysisError::NestingTooDeep {
                limit: self.max_depth,
            });
        }
        Ok(depth + 1)
    }

    fn required<'t>(&self, node: TsNode<'t>, field: &str) -> Result<TsNode<'t>> {
        node.child_by_field_name(field)
            .ok_or_else(|| AnalysisError::malformed(estree_kind(node.kind()), field))
    }

    fn program(&self, root: TsNode) -> Result<Node> {
        let body = self.statements(root, 0)?;
        Ok(Node::Program { body })
    }

    fn statements(&self, node: TsNode, depth: usize) -> Result<Vec<Node>> {
        named_children(node)
            .into_iter()
            .map(|child| self.statement(child, depth))
            .collect()
    }

    fn statement(&self, node: TsNode, depth: usize) -> Result<Node> {
        let depth = self.enter(depth)?;

        let converted = match node.kind() {
            "function_declaration" | "generator_function_declaration" => {
                let id = self.expression(self.required(node, "name")?, depth)?;
                let params = self.params(self.required(node, "parameters")?, depth)?;
                let body = self.statement(self.required(node, "body")?, depth)?;
                Node::FunctionDeclaration {
                    id: Box::new(id),
                    params,
                    body: Box::new(body),
                }
            }
            "statement_block" => Node::BlockStatement {
                body: self.statements(node, depth)?,
            },
            "lexical_declaration" | "variable_declaration" => {
                let declaration_kind = node
                    .child(0)
                    .map(|keyword| keyword.kind().to_string())
                    .unwrap_or_else(|| "var".to_string());
                let declarations = named_children(node)
                    .into_iter()
                    .filter(|c| c.kind() == "variable_declarator")
                    .map(|c| self.declarator(c, depth))
                    .collect::<Result<Vec<_>>>()?;
                Node::VariableDeclaration {
                    declaration_kind,
                    declarations,
                }
            }
            "expression_statement" => {
                let inner = first_named_child(node)
                    .ok_or_else(|| AnalysisError::malformed("ExpressionStatement", "expression"))?;
                Node::ExpressionStatement {
                    expression: Box::new(self.expression(inner, depth)?),
                }
            }
            "while_statement" => Node::WhileStatement {
                test: Box::new(self.expression(self.required(node, "condition")?, depth)?),
                body: Box::new(self.statement(self.required(node, "body")?, depth)?),
            },
            "if_statement" => {
                let test = self.expression(self.required(node, "condition")?, depth)?;
                let consequent = self.statement(self.required(node, "consequence")?, depth)?;
                let alternate = match node.child_by_field_name("alternative") {
                    Some(clause) => {
                        let branch = first_named_child(clause)
                            .ok_or_else(|| AnalysisError::malformed("IfStatement", "alternate"))?;
                        Some(Box::new(self.statement(branch, depth)?))
                    }
                    None => None,
                };
                Node::IfStatement {
                    test: Box::new(test),
                    consequent: Box::new(consequent),
                    alternate,
                }
            }
            "for_statement" => {
                let init = match node.child_by_field_name("initializer") {
                    Some(n) if matches!(n.kind(), "lexical_declaration" | "variable_declaration") => {
                        Some(self.statement(n, depth)?)
                    }
                    Some(n) => self.for_clause(n, depth)?,
                    None => None,
                };
                let test = match node.child_by_field_name("condition") {
                    Some(n) => self.for_clause(n, depth)?,
                    None => None,
                };
                let update = match node.child_by_field_name("increment") {
                    Some(n) => Some(self.expression(n, depth)?),
                    None => None,
                };
                Node::ForStatement {
                    init: init.map(Box::new),
                    test: test.map(Box::new),
                    update: update.map(Box::new),
                    body: Box::new(self.statement(self.required(node, "body")?, depth)?),
                }
            }
            "return_statement" => {
                let argument = match first_named_child(node) {
                    Some(arg) => Some(Box::new(self.expression(arg, depth)?)),
                    None => None,
                };
                Node::ReturnStatement { argument }
            }
            kind => self.unsupported_statement(node, kind, depth)?,
        };

        Ok(converted)
    }

    /// `for (init; test; update)` header parts. Empty parts are `None`.
    fn for_clause(&self, node: TsNode, depth: usize) -> Result<Option<Node>> {
        match node.kind() {
            ";" | "empty_statement" => Ok(None),
            "expression_statement" => match first_named_child(node) {
                Some(inner) => Ok(Some(self.expression(inner, depth)?)),
                None => Ok(None),
            },
            _ => Ok(Some(self.expression(node, depth)?)),
        }
    }

    fn unsupported_statement(&self, node: TsNode, kind: &str, depth: usize) -> Result<Node> {
        let mut children = Vec::new();
        for child in named_children(node) {
            let child_kind = child.kind();
            if is_statement_kind(child_kind) {
                children.push(self.statement(child, depth)?);
            } else if is_statement_container(child_kind) {
                let depth = self.enter(depth)?;
                children.push(self.unsupported_statement(child, child_kind, depth)?);
            }
        }
        Ok(Node::Unsupported {
            kind: estree_kind(kind),
            name: None,
            children,
        })
    }

    fn declarator(&self, node: TsNode, depth: usize) -> Result<Node> {
        let depth = self.enter(depth)?;
        let id = self.expression(self.required(node, "name")?, depth)?;
        let init = match node.child_by_field_name("value") {
            Some(value) => Some(Box::new(self.expression(value, depth)?)),
            None => None,
        };
        Ok(Node::VariableDeclarator {
            id: Box::new(id),
            init,
        })
    }

    fn params(&self, node: TsNode, depth: usize) -> Result<Vec<Node>> {
        named_children(node)
            .into_iter()
            .map(|param| self.param(param, depth))
            .collect()
    }

    fn param(&self, node: TsNode, depth: usize) -> Result<Node> {
        match node.kind() {
            "assignment_pattern" | "rest_pattern" => {
                // Best-effort name: the bound identifier, if it is a plain one.
                let target = node
                    .child_by_field_name("left")
                    .or_else(|| first_named_child(node));
                let name = target
                    .filter(|t| t.kind() == "identifier")
                    .map(|t| self.text(t).to_string());
                Ok(Node::Unsupported {
                    kind: estree_kind(node.kind()),
                    name,
                    children: vec![],
                })
            }
            _ => self.expression(node, depth),
        }
    }

    fn expression(&self, node: TsNode, depth: usize) -> Result<Node> {
        let depth = self.enter(depth)?;

        let converted = match node.kind() {
            "parenthesized_expression" => {
                let inner = first_named_child(node).ok_or_else(|| {
                    AnalysisError::malformed("ParenthesizedExpression", "expression")
                })?;
                return self.expression(inner, depth);
            }
            "identifier"
            | "property_identifier"
            | "shorthand_property_identifier"
            | "shorthand_property_identifier_pattern"
            | "private_property_identifier"
            | "statement_identifier"
            | "undefined" => Node::identifier(self.text(node)),
            "member_expression" => Node::MemberExpression {
                object: Box::new(self.expression(self.required(node, "object")?, depth)?),
                property: Box::new(self.expression(self.required(node, "property")?, depth)?),
                computed: false,
            },
            "subscript_expression" => Node::MemberExpression {
                object: Box::new(self.expression(self.required(node, "object")?, depth)?),
                property: Box::new(self.expression(self.required(node, "index")?, depth)?),
                computed: true,
            },
            "binary_expression" => {
                let operator = self.required(node, "operator")?.kind().to_string();
                let left = Box::new(self.expression(self.required(node, "left")?, depth)?);
                let right = Box::new(self.expression(self.required(node, "right")?, depth)?);
                if matches!(operator.as_str(), "&&" | "||" | "??") {
                    Node::LogicalExpression {
                        operator,
                        left,
                        right,
                    }
                } else {
                    Node::BinaryExpression {
                        operator,
                        left,
                        right,
                    }
                }
            }
            "unary_expression" => Node::UnaryExpression {
                operator: self.required(node, "operator")?.kind().to_string(),
                argument: Box::new(self.expression(self.required(node, "argument")?, depth)?),
            },
            "assignment_expression" | "augmented_assignment_expression" => {
                let operator = match node.child_by_field_name("operator") {
                    Some(op) => op.kind().to_string(),
                    None => "=".to_string(),
                };
                Node::AssignmentExpression {
                    operator,
                    left: Box::new(self.expression(self.required(node, "left")?, depth)?),
                    right: Box::new(self.expression(self.required(node, "right")?, depth)?),
                }
            }
            "number" => Node::literal(parse_number(self.text(node))),
            "string" => Node::literal(LiteralValue::String(self.string_value(node))),
            "regex" => Node::literal(LiteralValue::RegExp(self.text(node).to_string())),
            "true" => Node::literal(LiteralValue::Boolean(true)),
            "false" => Node::literal(LiteralValue::Boolean(false)),
            "null" => Node::literal(LiteralValue::Null),
            "this" | "super" => Node::Unsupported {
                kind: estree_kind(node.kind()),
                name: Some(self.text(node).to_string()),
                children: vec![],
            },
            other => Node::Unsupported {
                kind: estree_kind(other),
                name: None,
                children: vec![],
            },
        };

        Ok(converted)
    }

    /// Cooked value of a string literal, without quotes.
    fn string_value(&self, node: TsNode) -> String {
        let mut value = String::new();
        for part in named_children(node) {
            match part.kind() {
                "string_fragment" => value.push_str(self.text(part)),
                "escape_sequence" => value.push_str(&unescape(self.text(part))),
                _ => {}
            }
        }
        value
    }
}

fn parse_number(raw: &str) -> LiteralValue {
    let cleaned: String = raw.chars().filter(|c| *c != '_').collect();
    let cleaned = cleaned.strip_suffix('n').unwrap_or(&cleaned);
    let lower = cleaned.to_ascii_lowercase();

    let parsed = if let Some(hex) = lower.strip_prefix("0x") {
        u64::from_str_radix(hex, 16).ok().map(|n| n as f64)
    } else if let Some(oct) = lower.strip_prefix("0o") {
        u64::from_str_radix(oct, 8).ok().map(|n| n as f64)
    } else if let Some(bin) = lower.strip_prefix("0b") {
        u64::from_str_radix(bin, 2).ok().map(|n| n as f64)
    } else if is_legacy_octal(&lower) {
        u64::from_str_radix(&lower[1..], 8).ok().map(|n| n as f64)
    } else {
        lower.parse::<f64>().ok()
    };

    match parsed {
        Some(n) => LiteralValue::Number(n),
        None => LiteralValue::String(raw.to_string()),
    }
}

/// Sloppy-mode `010`: a leading zero followed only by octal digits.
/// `089` has a non-octal digit and stays decimal.
fn is_legacy_octal(digits: &str) -> bool {
    digits.len() > 1
        && digits.starts_with('0')
        && digits.bytes().all(|b| (b'0'..=b'7').contains(&b))
}

/// Decode one escape sequence, e.g. `\n` or `\u{1F600}`.
fn unescape(seq: &str) -> String {
    let body = seq.strip_prefix('\\').unwrap_or(seq);
    let mut chars = body.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let rest = chars.as_str();

    let code_point = |hex: &str| {
        u32::from_str_radix(hex, 16)
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
    };

    match first {
        'n' => "\n".to_string(),
        't' => "\t".to_string(),
        'r' => "\r".to_string(),
        'b' => "\u{8}".to_string(),
        'f' => "\u{c}".to_string(),
        'v' => "\u{b}".to_string(),
        '0' if rest.is_empty() => "\0".to_string(),
        'x' => code_point(rest).unwrap_or_else(|| body.to_string()),
        'u' => {
            let hex = rest.trim_start_matches('{').trim_end_matches('}');
            code_point(hex).unwrap_or_else(|| body.to_string())
        }
        // Line continuation.
        '\n' | '\r' | '\u{2028}' | '\u{2029}' => String::new(),
        _ => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ast::NodeKind;

    fn parse(src: &str) -> Node {
        TreeSitterJsParser::new().parse(src).unwrap()
    }

    fn body(program: Node) -> Vec<Node> {
        match program {
            Node::Program { body } => body,
            other => panic!("expected Program, got {:?}", other),
        }
    }

    #[test]
    fn test_function_declaration_shape() {
        let stmts = body(parse("function f(a, b) { return a + b; }"));
        assert_eq!(stmts.len(), 1);
        match &stmts[0] {
            Node::FunctionDeclaration { id, params, body } => {
                assert_eq!(**id, Node::identifier("f"));
                assert_eq!(params, &vec![Node::identifier("a"), Node::identifier("b")]);
                assert_eq!(body.kind(), NodeKind::BlockStatement);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parentheses_and_comments_are_dropped() {
        let stmts = body(parse("// note\nwhile ((x)) { /* c */ }"));
        assert_eq!(stmts.len(), 1);
        match &stmts[0] {
            Node::WhileStatement { test, body } => {
                assert_eq!(**test, Node::identifier("x"));
                assert_eq!(**body, Node::BlockStatement { body: vec![] });
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_logical_operators_split_from_binary() {
        let stmts = body(parse("if (a && b) {}"));
        match &stmts[0] {
            Node::IfStatement { test, alternate, .. } => {
                assert_eq!(test.kind(), NodeKind::LogicalExpression);
                assert!(alternate.is_none());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_literals() {
        let stmts = body(parse("let a = 0x10, b = 'x\\ty', c = true, d = null, e = 1_000;"));
        let values: Vec<LiteralValue> = match &stmts[0] {
            Node::VariableDeclaration { declarations, .. } => declarations
                .iter()
                .map(|d| match d {
                    Node::VariableDeclarator { init: Some(init), .. } => match init.as_ref() {
                        Node::Literal { value } => value.clone(),
                        other => panic!("not a literal: {:?}", other),
                    },
                    other => panic!("unexpected {:?}", other),
                })
                .collect(),
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(
            values,
            vec![
                LiteralValue::Number(16.0),
                LiteralValue::String("x\ty".into()),
                LiteralValue::Boolean(true),
                LiteralValue::Null,
                LiteralValue::Number(1000.0),
            ]
        );
    }

    #[test]
    fn test_unsupported_statement_keeps_statement_children() {
        let stmts = body(parse("try { x = 1; } catch (e) { y = 2; } finally { z = 3; }"));
        match &stmts[0] {
            Node::Unsupported { kind, children, .. } => {
                assert_eq!(kind, "TryStatement");
                assert_eq!(children.len(), 3);
                assert_eq!(children[0].kind(), NodeKind::BlockStatement);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_syntax_error_is_reported() {
        let err = TreeSitterJsParser::new().parse("let = ;").unwrap_err();
        assert!(matches!(err, AnalysisError::Parse { line: 1, .. }), "{:?}", err);
    }

    #[test]
    fn test_nesting_limit() {
        let src = format!("x = {}1{};", "(".repeat(50), ")".repeat(50));
        let err = TreeSitterJsParser::with_max_depth(20).parse(&src).unwrap_err();
        assert_eq!(err, AnalysisError::NestingTooDeep { limit: 20 });
    }

    #[test]
    fn test_estree_kind_names() {
        assert_eq!(estree_kind("call_expression"), "CallExpression");
        assert_eq!(estree_kind("try_statement"), "TryStatement");
        assert_eq!(estree_kind("arrow_function"), "ArrowFunctionExpression");
    }

    #[test]
    fn test_number_forms() {
        assert_eq!(parse_number("010"), LiteralValue::Number(8.0));
        assert_eq!(parse_number("0777"), LiteralValue::Number(511.0));
        assert_eq!(parse_number("089"), LiteralValue::Number(89.0));
        assert_eq!(parse_number("0"), LiteralValue::Number(0.0));
        assert_eq!(parse_number("0.5"), LiteralValue::Number(0.5));
        assert_eq!(parse_number("0o17"), LiteralValue::Number(15.0));
        assert_eq!(parse_number("0b101"), LiteralValue::Number(5.0));
        assert_eq!(parse_number("10n"), LiteralValue::Number(10.0));
        assert_eq!(parse_number("1e3"), LiteralValue::Number(1000.0));
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape("\\n"), "\n");
        assert_eq!(unescape("\\x41"), "A");
        assert_eq!(unescape("\\u0042"), "B");
        assert_eq!(unescape("\\u{1F600}"), "\u{1F600}");
        assert_eq!(unescape("\\'"), "'");
    }
}
