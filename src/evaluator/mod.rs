//! Recursive-descent parser/evaluator
//!
//! This module provides the execution core:
//! - [`engine`]: statement recognition and execution over the token stream
//! - [`expressions`]: the integer expression grammar
//! - [`errors`]: evaluation error types
//!
//! # Execution model
//!
//! There is no AST and no separate execution phase: recognizing a statement
//! *is* executing it. The evaluator walks the fully-tokenized stream left to
//! right with a single primary cursor, mutating the symbol table and scope
//! stack as each construct is recognized and pushing one trace event per
//! traced statement. The one exception to strict left-to-right motion is the
//! `while` loop, which re-evaluates its condition by re-reading the same
//! token range with a secondary cursor.

pub mod engine;
pub mod errors;
pub mod expressions;

pub use engine::{Evaluator, Limits};
pub use errors::EvalError;
