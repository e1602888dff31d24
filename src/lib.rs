//! # Introduction
//!
//! Scopetrace parses and executes a tiny C-like subset, producing a
//! step-by-step trace of a binding table and a scope stack.  There is no AST:
//! recognizing a statement *is* executing it, so the trace mirrors exactly
//! what a reader stepping through the source with pencil and paper would
//! write down.  The finished trace is browsed in a terminal UI built with
//! [ratatui](https://docs.rs/ratatui), or printed as plain text.
//!
//! ## Execution pipeline
//!
//! ```text
//! Source → Lexer → Evaluator → TraceLog → TUI / plain text
//! ```
//!
//! 1. [`lexer`] — tokenises the source with line/column/offset tracking.
//! 2. [`evaluator`] — walks the token stream once, executing declarations,
//!    assignments, `while` loops, and trivial function bodies as they are
//!    recognized.
//! 3. [`bindings`] — the state being visualized: a [`bindings::table::SymbolTable`]
//!    of name/type/value entries and a [`bindings::scope::ScopeStack`] of
//!    declared names with scope marks.
//! 4. [`trace`] — the bounded event log, one frozen snapshot per traced
//!    statement.
//! 5. [`render`] — plain-text formatting of trace snapshots.
//! 6. [`ui`] — ratatui-based TUI; not part of the stable library API.
//!
//! ## Supported subset
//!
//! Types: `int`, `float`, `double`, `char *`, `char [N]`.
//! Statements: declarations (with optional `int` initializer), assignments,
//! `while` loops, function bodies (which open and close a scope), `return`.
//! Expressions: integer arithmetic and relational operators with the usual
//! precedence.

pub mod bindings;
pub mod evaluator;
pub mod lexer;
pub mod render;
pub mod trace;
pub mod ui;
