//! Evaluation error types
//!
//! [`EvalError`] covers everything that can go wrong after tokenization.
//! Errors split into two severities:
//!
//! - **statement-local** — the current statement's effects are abandoned, one
//!   diagnostic line is recorded, and evaluation resumes at the next
//!   statement boundary
//! - **fatal** — the whole run stops ([`EvalError::is_fatal`])
//!
//! No partial symbol mutation is visible for a failed int-expression: the
//! table write happens only after successful evaluation.

use crate::bindings::scope::ScopeError;
use crate::bindings::table::TableFull;
use crate::lexer::SourceLocation;
use crate::trace::TraceLimitExceeded;
use std::fmt;

/// Errors raised while recognizing and executing statements.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    /// Declaration rejected because the symbol table is at capacity.
    /// The pending binding is dropped; the run continues.
    TableFull {
        name: String,
        capacity: usize,
        location: SourceLocation,
    },

    /// An expression referenced a variable that is missing, uninitialized,
    /// or not an initialized `int`.
    UndefinedOrUninitialized {
        name: String,
        location: SourceLocation,
    },

    /// Division by zero; evaluation of the enclosing statement aborts.
    DivisionByZero { location: SourceLocation },

    /// The one quotient two's complement cannot represent
    /// (`i64::MIN / -1`). Statement-local, like division by zero.
    Overflow { location: SourceLocation },

    /// Expected token kind/lexeme not found (missing `;`, `)`, `{`, ...).
    Structural {
        expected: String,
        found: String,
        location: SourceLocation,
    },

    /// No matching `}` (or `)`) before end of input. Fatal.
    UnterminatedBlock { location: SourceLocation },

    /// Scope stack capacity exceeded. Fatal: a lost scope mark would corrupt
    /// later teardown.
    Scope {
        source: ScopeError,
        location: SourceLocation,
    },

    /// Trace event limit exceeded. Fatal; also the backstop for loops that
    /// never terminate.
    TraceLimit { limit: usize },
}

impl EvalError {
    /// Fatal errors stop the run; everything else aborts one statement.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            EvalError::UnterminatedBlock { .. }
                | EvalError::Scope { .. }
                | EvalError::TraceLimit { .. }
        )
    }

    pub fn location(&self) -> Option<SourceLocation> {
        match self {
            EvalError::TableFull { location, .. }
            | EvalError::UndefinedOrUninitialized { location, .. }
            | EvalError::DivisionByZero { location }
            | EvalError::Overflow { location }
            | EvalError::Structural { location, .. }
            | EvalError::UnterminatedBlock { location }
            | EvalError::Scope { location, .. } => Some(*location),
            EvalError::TraceLimit { .. } => None,
        }
    }

    pub(crate) fn from_table_full(err: TableFull, location: SourceLocation) -> Self {
        EvalError::TableFull {
            name: err.name,
            capacity: err.capacity,
            location,
        }
    }

    pub(crate) fn from_scope(err: ScopeError, location: SourceLocation) -> Self {
        EvalError::Scope {
            source: err,
            location,
        }
    }
}

impl From<TraceLimitExceeded> for EvalError {
    fn from(err: TraceLimitExceeded) -> Self {
        EvalError::TraceLimit { limit: err.limit }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::TableFull {
                name,
                capacity,
                location,
            } => {
                write!(
                    f,
                    "Symbol table is full ({} entries). Cannot add '{}' at line {}",
                    capacity, name, location.line
                )
            }
            EvalError::UndefinedOrUninitialized { name, location } => {
                write!(
                    f,
                    "Variable '{}' is undefined or uninitialized at line {}",
                    name, location.line
                )
            }
            EvalError::DivisionByZero { location } => {
                write!(f, "Division by zero at line {}", location.line)
            }
            EvalError::Overflow { location } => {
                write!(f, "Arithmetic overflow at line {}", location.line)
            }
            EvalError::Structural {
                expected,
                found,
                location,
            } => {
                write!(
                    f,
                    "Expected {}, found {} at line {}",
                    expected, found, location.line
                )
            }
            EvalError::UnterminatedBlock { location } => {
                write!(
                    f,
                    "Unterminated block: no matching close before end of file (opened at line {})",
                    location.line
                )
            }
            EvalError::Scope { source, location } => {
                write!(f, "{} at line {}", source, location.line)
            }
            EvalError::TraceLimit { limit } => {
                write!(f, "Trace limit of {} events exceeded", limit)
            }
        }
    }
}

impl std::error::Error for EvalError {}
