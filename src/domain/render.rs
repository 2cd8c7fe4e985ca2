//! Expression Renderer
//!
//! Turns an expression subtree into the single value shown in an outline
//! cell. Rendering never emits records.
//!
//! Nested binary expressions are grouped by depth, not by precedence: an
//! operator node with two or more binary ancestors (within the expression
//! being rendered) is wrapped in parentheses.

use crate::domain::ast::Node;
use crate::domain::record::DisplayValue;

/// Binary nesting depth from which a group gets parenthesized.
const PAREN_DEPTH: usize = 2;

enum Step<'a> {
    /// Render a node with the given number of enclosing binary expressions.
    Visit(&'a Node, usize),
    Text(&'a str),
}

/// Render an expression for a record field.
///
/// A bare literal is passed through as a literal; everything else becomes text.
pub fn render(node: &Node) -> DisplayValue {
    match node {
        Node::Literal { value } => DisplayValue::Literal(value.clone()),
        other => DisplayValue::Text(render_text(other)),
    }
}

/// Render an optional slot. Absent slots render as empty text.
pub fn render_opt(node: Option<&Node>) -> DisplayValue {
    node.map(render).unwrap_or_else(|| DisplayValue::Text(String::new()))
}

/// Render an expression as text, stringifying literals along the way.
pub fn render_text(node: &Node) -> String {
    let mut out = String::new();
    let mut stack = vec![Step::Visit(node, 0)];

    while let Some(step) = stack.pop() {
        match step {
            Step::Text(s) => out.push_str(s),
            Step::Visit(node, depth) => push_node(node, depth, &mut stack, &mut out),
        }
    }

    out
}

/// Expand one node: leaves write straight to `out`, composite nodes push their
/// parts in reverse so they pop in reading order.
fn push_node<'a>(node: &'a Node, depth: usize, stack: &mut Vec<Step<'a>>, out: &mut String) {
    match node {
        Node::Identifier { name } => out.push_str(name),
        Node::Literal { value } => out.push_str(&value.to_string()),
        Node::MemberExpression {
            object, property, ..
        } => {
            stack.push(Step::Text("]"));
            stack.push(Step::Visit(property, depth));
            stack.push(Step::Text("["));
            stack.push(Step::Visit(object, depth));
        }
        Node::UnaryExpression { operator, argument } => {
            stack.push(Step::Visit(argument, depth));
            stack.push(Step::Text(operator));
        }
        Node::BinaryExpression {
            operator,
            left,
            right,
        }
        | Node::LogicalExpression {
            operator,
            left,
            right,
        } => {
            let grouped = depth >= PAREN_DEPTH;
            if grouped {
                stack.push(Step::Text(")"));
            }
            stack.push(Step::Visit(right, depth + 1));
            stack.push(Step::Text(" "));
            stack.push(Step::Text(operator));
            stack.push(Step::Text(" "));
            stack.push(Step::Visit(left, depth + 1));
            if grouped {
                stack.push(Step::Text("("));
            }
        }
        Node::Unsupported { name, .. } => {
            if let Some(name) = name {
                out.push_str(name);
            }
        }
        // Statement kinds carry no display name.
        Node::Program { .. }
        | Node::FunctionDeclaration { .. }
        | Node::BlockStatement { .. }
        | Node::VariableDeclaration { .. }
        | Node::VariableDeclarator { .. }
        | Node::ExpressionStatement { .. }
        | Node::AssignmentExpression { .. }
        | Node::WhileStatement { .. }
        | Node::IfStatement { .. }
        | Node::ForStatement { .. }
        | Node::ReturnStatement { .. } => {}
    }
}
