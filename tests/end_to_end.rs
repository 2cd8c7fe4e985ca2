/// End-to-end tests: JavaScript source in, outline records out.
/// Line values are asserted exactly, following the line tracker's increment rules.

use scriptscope::domain::ast::LiteralValue;
use scriptscope::{analyze, AnalysisError, DisplayValue, Record};

/// (line, type, name, condition, value) with absent fields as None.
fn rows(records: &[Record]) -> Vec<(usize, &str, Option<&str>, Option<&str>, Option<String>)> {
    records
        .iter()
        .map(|r| {
            (
                r.line,
                r.kind.as_str(),
                r.name.as_deref(),
                r.condition.as_deref(),
                r.value.as_ref().map(|v| v.to_string()),
            )
        })
        .collect()
}

#[test]
fn test_function_with_params() {
    let records = analyze("function f(a, b) { return a + b; }").unwrap();

    assert_eq!(
        rows(&records),
        vec![
            (1, "FunctionDeclaration", Some("f"), None, None),
            (1, "Identifier", Some("a"), None, None),
            (1, "Identifier", Some("b"), None, None),
            (2, "ReturnStatement", None, None, Some("a + b".to_string())),
        ]
    );
}

#[test]
fn test_declaration_and_while_loop() {
    let records = analyze("let x = 1; while (x < 10) { x = x + 1; }").unwrap();

    assert_eq!(records.len(), 3);

    assert_eq!(records[0].line, 1);
    assert_eq!(records[0].kind, "VariableDeclarator");
    assert_eq!(records[0].name.as_deref(), Some("x"));
    // Top-level literal passes through with its type.
    assert_eq!(
        records[0].value,
        Some(DisplayValue::Literal(LiteralValue::Number(1.0)))
    );

    assert_eq!(records[1].line, 3);
    assert_eq!(records[1].kind, "WhileStatement");
    assert_eq!(records[1].condition.as_deref(), Some("x < 10"));

    assert_eq!(records[2].line, 4);
    assert_eq!(records[2].kind, "AssignmentExpression");
    assert_eq!(records[2].name.as_deref(), Some("x"));
    assert_eq!(records[2].value, Some(DisplayValue::from("x + 1")));
}

#[test]
fn test_if_without_else() {
    let records = analyze("if (a) { return a; }").unwrap();

    assert_eq!(
        rows(&records),
        vec![
            (1, "IfStatement", None, Some("a"), None),
            (2, "ReturnStatement", None, None, Some("a".to_string())),
        ]
    );
}

#[test]
fn test_else_if_chain() {
    let src = "if (a) { x = 1; } else if (b) { x = 2; } else { x = 3; }";
    let records = analyze(src).unwrap();

    assert_eq!(
        rows(&records),
        vec![
            (1, "IfStatement", None, Some("a"), None),
            (2, "AssignmentExpression", Some("x"), None, Some("1".to_string())),
            (3, "IfStatement", None, Some("b"), None),
            (4, "AssignmentExpression", Some("x"), None, Some("2".to_string())),
            (5, "AssignmentExpression", Some("x"), None, Some("3".to_string())),
        ]
    );
}

#[test]
fn test_for_loop_condition() {
    let records = analyze("for (let i = 0; i < n; i++) { total = total + i; }").unwrap();

    assert_eq!(records[0].kind, "ForStatement");
    assert_eq!(records[0].condition.as_deref(), Some("i < n"));
    assert_eq!(records[0].line, 1);
    // Init and update clauses produce no records of their own.
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].line, 2);
    assert_eq!(records[1].name.as_deref(), Some("total"));
}

#[test]
fn test_member_access_renders_as_index() {
    let records = analyze("y = obj.prop;").unwrap();
    assert_eq!(records[0].value, Some(DisplayValue::from("obj[prop]")));

    let records = analyze("y = obj[key];").unwrap();
    assert_eq!(records[0].value, Some(DisplayValue::from("obj[key]")));
}

#[test]
fn test_nested_binary_parenthesization() {
    let records = analyze("let y = a + b * (c - d);").unwrap();
    assert_eq!(records[0].value, Some(DisplayValue::from("a + b * (c - d)")));
}

#[test]
fn test_unary_and_logical() {
    let records = analyze("while (!done && i < n) { i = i + 1; }").unwrap();
    assert_eq!(records[0].condition.as_deref(), Some("!done && i < n"));
}

#[test]
fn test_bare_expression_statement_still_advances() {
    let records = analyze("foo(); return_value = 1;").unwrap();

    // The call yields no record but its statement still takes a line.
    assert_eq!(
        rows(&records),
        vec![(3, "AssignmentExpression", Some("return_value"), None, Some("1".to_string()))]
    );
}

#[test]
fn test_unsupported_constructs_are_transparent() {
    let src = "try { x = 1; } catch (e) { y = 2; }";
    let records = analyze(src).unwrap();

    let names: Vec<_> = records.iter().map(|r| r.name.as_deref()).collect();
    assert_eq!(names, vec![Some("x"), Some("y")]);
}

#[test]
fn test_every_record_is_well_formed() {
    let src = r#"
        function outer(n) {
            let total = 0, unset;
            for (let i = 0; i < n; i++) {
                if (i % 2 === 0 || skip) {
                    total = total + items[i].weight;
                } else {
                    total = total - 1;
                }
            }
            while (total > 100) { total = total / 2; }
            return;
        }
        outer(10);
    "#;
    let records = analyze(src).unwrap();

    assert!(!records.is_empty());
    for record in &records {
        assert!(record.line >= 1, "{:?}", record);
        let populated = record.populated_fields();
        assert!((1..=2).contains(&populated), "{:?}", record);
    }
    let bare_return = records.iter().find(|r| r.kind == "ReturnStatement").unwrap();
    assert_eq!(bare_return.value, Some(DisplayValue::from("")));
}

#[test]
fn test_analysis_is_deterministic() {
    let src = "function g(p) { while (p) { p = p - 1; } return p; } let z = g(3);";
    let first = analyze(src).unwrap();
    for _ in 0..5 {
        assert_eq!(analyze(src).unwrap(), first);
    }
}

#[test]
fn test_syntax_error_reports_position() {
    match analyze("let x = ;\nwhile (") {
        Err(AnalysisError::Parse { line, column, .. }) => {
            assert!(line >= 1);
            assert!(column >= 1);
        }
        other => panic!("expected parse error, got {:?}", other),
    }
}

#[test]
fn test_empty_source() {
    assert!(analyze("").unwrap().is_empty());
    assert!(analyze("// only a comment\n").unwrap().is_empty());
}

#[test]
fn test_statement_after_while_loop() {
    // The loop takes a line for its header and one closing line after its body.
    let records = analyze("while (a) { x = 1; } y = 2;").unwrap();
    let lines: Vec<usize> = records.iter().map(|r| r.line).collect();
    assert_eq!(lines, vec![1, 2, 5]);
    assert_eq!(records[2].name.as_deref(), Some("y"));
}

#[test]
fn test_statement_after_for_loop() {
    let records = analyze("for (i = 0; i < n; i++) { x = 1; } y = 2;").unwrap();
    let lines: Vec<usize> = records.iter().map(|r| r.line).collect();
    assert_eq!(lines, vec![1, 2, 5]);
    assert_eq!(records[2].name.as_deref(), Some("y"));
}

#[test]
fn test_statement_after_function() {
    // A function advances after its params only; its body closes without a line.
    let records = analyze("function f() { x = 1; } y = 2;").unwrap();
    assert_eq!(
        rows(&records),
        vec![
            (1, "FunctionDeclaration", Some("f"), None, None),
            (2, "AssignmentExpression", Some("x"), None, Some("1".to_string())),
            (4, "AssignmentExpression", Some("y"), None, Some("2".to_string())),
        ]
    );
}

#[test]
fn test_return_after_loop_inside_function() {
    let src = "function f(a) { while (a) { a = a - 1; } for (;;) { b = a; } return a; }";
    let records = analyze(src).unwrap();
    assert_eq!(
        rows(&records),
        vec![
            (1, "FunctionDeclaration", Some("f"), None, None),
            (1, "Identifier", Some("a"), None, None),
            (2, "WhileStatement", None, Some("a"), None),
            (3, "AssignmentExpression", Some("a"), None, Some("a - 1".to_string())),
            (5, "ForStatement", None, Some(""), None),
            (6, "AssignmentExpression", Some("b"), None, Some("a".to_string())),
            (8, "ReturnStatement", None, None, Some("a".to_string())),
        ]
    );
}

#[test]
fn test_large_number_literals_render_like_js() {
    let value = |src: &str| analyze(src).unwrap()[0].value.as_ref().map(|v| v.to_string());
    assert_eq!(value("y = x + 1e20;").as_deref(), Some("x + 100000000000000000000"));
    assert_eq!(value("y = x + 1e21;").as_deref(), Some("x + 1e+21"));
    assert_eq!(value("y = x + 1e-7;").as_deref(), Some("x + 1e-7"));
    assert_eq!(value("y = x + 010;").as_deref(), Some("x + 8"));
}
