// End-to-end tests: source text in, trace and rendered output out

use scopetrace::evaluator::{Evaluator, Limits};
use scopetrace::render;
use scopetrace::trace::TraceLog;

fn run(source: &str) -> (TraceLog, Vec<String>) {
    let mut evaluator = Evaluator::new(source).expect("tokenization failed");
    evaluator.run().expect("run failed");
    evaluator.into_parts()
}

#[test]
fn test_showcase_demo_runs_clean() {
    let source = include_str!("../demos/showcase.c");
    let (trace, diagnostics) = run(source);

    assert!(diagnostics.is_empty(), "diagnostics: {:?}", diagnostics);
    // 5 declarations, 1 assignment, 2 loop counters, 3 iterations of a
    // 2-statement body, 2 statements in the function body, 1 final assignment.
    assert_eq!(trace.len(), 17);

    let last = trace.get(trace.len() - 1).unwrap();
    assert_eq!(last.statement, "x = x - 1;");
    let find = |name: &str| {
        last.bindings
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    };
    assert_eq!(find("x"), Some("9"));
    assert_eq!(find("total"), Some("5"));
    assert_eq!(find("i"), Some("3"));
    assert_eq!(find("msg"), Some("?"));
    assert_eq!(find("buf"), Some("addr"));
    // The function's local was torn down with its scope.
    assert_eq!(find("local"), None);
}

#[test]
fn test_trace_records_each_state_change() {
    let source = r#"
        int x = 5;
        int y;
        y = x * 2;
    "#;
    let (trace, diagnostics) = run(source);

    assert!(diagnostics.is_empty());
    assert_eq!(trace.len(), 3);

    let bindings: Vec<&[(String, String)]> =
        trace.events().iter().map(|e| e.bindings.as_slice()).collect();
    assert_eq!(bindings[0], [("x".to_string(), "5".to_string())]);
    assert_eq!(bindings[1], [
        ("x".to_string(), "5".to_string()),
        ("y".to_string(), "?".to_string()),
    ]);
    assert_eq!(bindings[2], [
        ("x".to_string(), "5".to_string()),
        ("y".to_string(), "10".to_string()),
    ]);
}

#[test]
fn test_default_capacity_rejects_thirty_third_binding() {
    let mut source = String::new();
    for i in 0..33 {
        source.push_str(&format!("int v{};\n", i));
    }

    let mut evaluator = Evaluator::new(&source).expect("tokenization failed");
    evaluator.run().expect("run failed");

    assert_eq!(evaluator.table().len(), 32);
    assert!(evaluator.table().find("v32").is_none());
    assert_eq!(evaluator.diagnostics().len(), 1);
    assert!(evaluator.diagnostics()[0].contains("full"));
    // The rejected declaration contributes no trace row.
    assert_eq!(evaluator.trace().len(), 32);
}

#[test]
fn test_function_scope_visible_during_body() {
    let source = r#"
        int base = 3;
        int setup() {
            int local = base * base;
            return local;
        }
        int after;
    "#;
    let (trace, diagnostics) = run(source);

    assert!(diagnostics.is_empty());
    assert_eq!(trace.len(), 3);

    let body_event = trace.get(1).unwrap();
    assert_eq!(body_event.statement, "int local = base * base;");
    assert_eq!(body_event.scope_names[0], "local");
    assert!(body_event.bindings.iter().any(|(n, v)| n == "local" && v == "9"));

    let after_event = trace.get(2).unwrap();
    assert!(!after_event.bindings.iter().any(|(n, _)| n == "local"));
    assert!(!after_event.scope_names.iter().any(|n| n == "local"));
}

#[test]
fn test_plain_render_of_first_step() {
    let (trace, _) = run("int x = 5;");
    let block = render::format_event(trace.get(0).unwrap(), 1);
    assert_eq!(block, "Step 1: int x = 5;\nS = {x |-> 5}\nTop [x]\n");
}

#[test]
fn test_plain_render_labels_loop_iterations() {
    let (trace, _) = run("int i = 0; while (i < 2) { i = i + 1; }");

    let second_pass = trace.get(2).unwrap();
    let block = render::format_event(second_pass, 3);
    assert!(block.starts_with("Step 3 (iter 2): i = i + 1;"));
    assert!(block.contains("S = {i |-> 2}"));
}

#[test]
fn test_diagnostics_do_not_stop_the_run() {
    let source = r#"
        int x = 4;
        int y = x / 0;
        int z = x + 1;
    "#;
    let mut evaluator = Evaluator::new(source).expect("tokenization failed");
    evaluator.run().expect("run failed");

    assert_eq!(evaluator.diagnostics().len(), 1);
    assert!(evaluator.diagnostics()[0].contains("Division by zero"));
    assert!(evaluator.table().find("z").is_some());
    assert_eq!(evaluator.trace().len(), 2);
}

#[test]
fn test_raised_limits_admit_more_bindings() {
    let mut source = String::new();
    for i in 0..40 {
        source.push_str(&format!("int v{} = {};\n", i, i));
    }

    let mut evaluator = Evaluator::with_limits(
        &source,
        Limits {
            table_capacity: 64,
            ..Limits::default()
        },
    )
    .expect("tokenization failed");
    evaluator.run().expect("run failed");

    assert!(evaluator.diagnostics().is_empty());
    assert_eq!(evaluator.table().len(), 40);
}
