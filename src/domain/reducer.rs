//! Structural Reducer
//!
//! Walks a `Program` depth-first and flattens the constructs it recognizes
//! into an ordered list of [`Record`]s.
//!
//! Traversal runs on an explicit work stack, so nesting depth in the input is
//! bounded by heap, not by the thread's call stack. Line bookkeeping is queued
//! on the same stack as `Advance` tasks, which keeps increments that follow a
//! subtree (closing lines) in the right place relative to its records.

use crate::domain::ast::Node;
use crate::domain::line_tracker::LineTracker;
use crate::domain::record::Record;
use crate::domain::render::{render, render_opt, render_text};
use tracing::trace;

enum Task<'a> {
    Visit(&'a Node),
    Advance,
}

/// Per-call traversal state. Created fresh for every reduction.
struct Reduction<'a> {
    lines: LineTracker,
    records: Vec<Record>,
    tasks: Vec<Task<'a>>,
}

/// Reduce a syntax tree to its outline records.
///
/// Deterministic: the same tree always yields the same sequence.
pub fn reduce(root: &Node) -> Vec<Record> {
    let mut state = Reduction {
        lines: LineTracker::new(),
        records: Vec::new(),
        tasks: vec![Task::Visit(root)],
    };

    while let Some(task) = state.tasks.pop() {
        match task {
            Task::Advance => state.lines.advance(),
            Task::Visit(node) => state.visit(node),
        }
    }

    state.records
}

impl<'a> Reduction<'a> {
    fn emit(&mut self, record: Record) {
        debug_assert!(record.is_well_formed(), "ill-formed record: {:?}", record);
        self.records.push(record);
    }

    /// Queue nodes so they are visited in source order.
    fn push_all(&mut self, nodes: &'a [Node]) {
        for node in nodes.iter().rev() {
            self.tasks.push(Task::Visit(node));
        }
    }

    fn visit(&mut self, node: &'a Node) {
        let line = self.lines.current();
        let kind = node.type_name();

        match node {
            Node::Program { body } => {
                for statement in body.iter().rev() {
                    self.tasks.push(Task::Visit(statement));
                    self.tasks.push(Task::Advance);
                }
            }
            Node::FunctionDeclaration { id, params, body } => {
                self.emit(Record::named(line, kind, render_text(id), None));
                for param in params {
                    self.emit(Record::named(line, param.type_name(), render_text(param), None));
                }
                self.lines.advance();
                self.tasks.push(Task::Visit(body));
            }
            Node::BlockStatement { body } => self.push_all(body),
            Node::VariableDeclaration { declarations, .. } => {
                self.tasks.push(Task::Advance);
                self.push_all(declarations);
            }
            Node::VariableDeclarator { id, init } => {
                let value = init.as_deref().map(render);
                self.emit(Record::named(line, kind, render_text(id), value));
            }
            Node::ExpressionStatement { expression } => {
                self.tasks.push(Task::Advance);
                if let Node::AssignmentExpression { .. } = expression.as_ref() {
                    self.tasks.push(Task::Visit(expression));
                }
            }
            Node::AssignmentExpression { left, right, .. } => {
                self.emit(Record::named(line, kind, render_text(left), Some(render(right))));
            }
            Node::WhileStatement { test, body } => {
                self.emit(Record::conditional(line, kind, render_text(test)));
                self.lines.advance();
                self.tasks.push(Task::Advance);
                self.tasks.push(Task::Visit(body));
            }
            Node::IfStatement {
                test,
                consequent,
                alternate,
            } => {
                self.emit(Record::conditional(line, kind, render_text(test)));
                self.lines.advance();
                self.tasks.push(Task::Advance);
                if let Some(alternate) = alternate {
                    self.tasks.push(Task::Visit(alternate));
                }
                self.tasks.push(Task::Visit(consequent));
            }
            Node::ForStatement { test, body, .. } => {
                let condition = test.as_deref().map(render_text).unwrap_or_default();
                self.emit(Record::conditional(line, kind, condition));
                self.lines.advance();
                self.tasks.push(Task::Advance);
                self.tasks.push(Task::Visit(body));
            }
            Node::ReturnStatement { argument } => {
                self.emit(Record::valued(line, kind, render_opt(argument.as_deref())));
            }
            Node::Unsupported { children, .. } => {
                trace!(kind, line, "skipping unsupported construct");
                self.push_all(children);
            }
            // Expressions at statement position produce nothing.
            Node::MemberExpression { .. }
            | Node::BinaryExpression { .. }
            | Node::LogicalExpression { .. }
            | Node::UnaryExpression { .. }
            | Node::Literal { .. }
            | Node::Identifier { .. } => {}
        }
    }
}
