//! Plain-text rendering of trace snapshots
//!
//! Pure formatting of already-computed state: every function here works on a
//! frozen [`TraceEvent`] and returns a string. Used by the CLI's plain mode
//! and reused by the TUI's scope pane for the box diagram.

use crate::trace::TraceEvent;

/// Render the binding table: `S = {x |-> 5; y |-> ?}`.
pub fn format_binding_table(event: &TraceEvent) -> String {
    let mut out = String::from("S = {");
    for (index, (name, value)) in event.bindings.iter().enumerate() {
        out.push_str(name);
        out.push_str(" |-> ");
        out.push_str(value);
        if index + 1 < event.bindings.len() {
            out.push_str("; ");
        }
    }
    out.push('}');
    out
}

/// Render the scope stack on one line, top first: `Top [y]->[x]`.
pub fn format_scope_stack(event: &TraceEvent) -> String {
    if event.scope_names.is_empty() {
        return "Top (empty)".to_string();
    }
    let boxes: Vec<String> = event
        .scope_names
        .iter()
        .map(|name| format!("[{}]", name))
        .collect();
    format!("Top {}", boxes.join("->"))
}

/// Render the scope stack as an ASCII box diagram, top at the first box:
///
/// ```text
/// +----------------+
/// | i = 2          |
/// +----------------+
/// | x = ?          |
/// +----------------+
/// ```
///
/// Each box shows `name = value`, with the value resolved from the event's
/// binding pairs; a name missing from the table renders bare.
pub fn format_stack_diagram(event: &TraceEvent) -> String {
    let mut out = String::from("Stack (top at first box):\n");
    if event.scope_names.is_empty() {
        out.push_str("(empty)\n");
        return out;
    }

    for name in &event.scope_names {
        let display = match event.bindings.iter().find(|(n, _)| n == name) {
            Some((_, value)) => format!("{} = {}", name, value),
            None => name.clone(),
        };
        out.push_str("+----------------+\n");
        out.push_str(&format!("| {:<14} |\n", display));
    }
    out.push_str("+----------------+\n");
    out
}

/// One full plain-mode block for a traced statement: step header, statement
/// text, binding table, scope stack.
pub fn format_event(event: &TraceEvent, step: usize) -> String {
    let label = event.iteration_label();
    let header = if label.is_empty() {
        format!("Step {}: {}", step, event.statement)
    } else {
        format!("Step {} ({}): {}", step, label, event.statement)
    };
    format!(
        "{}\n{}\n{}\n",
        header,
        format_binding_table(event),
        format_scope_stack(event)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event() -> TraceEvent {
        TraceEvent {
            statement: "int i = 2;".to_string(),
            line: 1,
            iteration: None,
            bindings: vec![
                ("x".to_string(), "?".to_string()),
                ("i".to_string(), "2".to_string()),
            ],
            scope_names: vec!["i".to_string(), "x".to_string()],
        }
    }

    #[test]
    fn test_binding_table_shape() {
        assert_eq!(format_binding_table(&event()), "S = {x |-> ?; i |-> 2}");
    }

    #[test]
    fn test_empty_binding_table() {
        let mut e = event();
        e.bindings.clear();
        assert_eq!(format_binding_table(&e), "S = {}");
    }

    #[test]
    fn test_scope_stack_top_first() {
        assert_eq!(format_scope_stack(&event()), "Top [i]->[x]");
    }

    #[test]
    fn test_empty_scope_stack() {
        let mut e = event();
        e.scope_names.clear();
        assert_eq!(format_scope_stack(&e), "Top (empty)");
    }

    #[test]
    fn test_stack_diagram() {
        let diagram = format_stack_diagram(&event());
        let expected = "Stack (top at first box):\n\
                        +----------------+\n\
                        | i = 2          |\n\
                        +----------------+\n\
                        | x = ?          |\n\
                        +----------------+\n";
        assert_eq!(diagram, expected);
    }

    #[test]
    fn test_event_block_with_iteration() {
        let mut e = event();
        e.iteration = Some(2);
        let block = format_event(&e, 5);
        assert!(block.starts_with("Step 5 (iter 2): int i = 2;"));
        assert!(block.contains("S = {"));
        assert!(block.contains("Top [i]->[x]"));
    }
}
