//! Trace collection for step-through visualization
//!
//! The evaluator owns a [`TraceLog`] and pushes one [`TraceEvent`] per traced
//! statement, in the exact order statements were executed. Suppression is a
//! per-statement-kind policy in the evaluator, not a stateful flag: `while`
//! headers and `return` statements simply never emit an event, while loop
//! bodies emit one event per body statement per iteration.
//!
//! Events capture rendered state, not live references: the binding pairs and
//! scope names are frozen at emission time, so the log can be replayed after
//! the symbol table has been released.

use std::fmt;

/// Default bound on the number of recorded events. Also the backstop that
/// terminates a runaway `while` loop.
pub const DEFAULT_EVENT_LIMIT: usize = 4096;

/// Snapshot description of one executed statement.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceEvent {
    /// The statement's source text, as written.
    pub statement: String,
    /// Source line of the statement's first token.
    pub line: usize,
    /// Loop iteration this statement executed in, if inside a `while` body.
    pub iteration: Option<usize>,
    /// The binding table as ordered `name -> rendered value` pairs.
    /// Uninitialized bindings render as `?`; character storage renders as an
    /// opaque `addr`, never a real address.
    pub bindings: Vec<(String, String)>,
    /// Scope stack names, most recently declared first.
    pub scope_names: Vec<String>,
}

impl TraceEvent {
    /// Label shown next to the statement: the iteration number inside loop
    /// bodies, empty elsewhere.
    pub fn iteration_label(&self) -> String {
        match self.iteration {
            Some(n) => format!("iter {}", n),
            None => String::new(),
        }
    }
}

/// Error returned when the event limit is exceeded. Fatal to the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceLimitExceeded {
    pub limit: usize,
}

impl fmt::Display for TraceLimitExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Trace limit of {} events exceeded", self.limit)
    }
}

impl std::error::Error for TraceLimitExceeded {}

/// Ordered, bounded event log.
#[derive(Debug, Clone)]
pub struct TraceLog {
    events: Vec<TraceEvent>,
    limit: usize,
}

impl TraceLog {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_EVENT_LIMIT)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            events: Vec::new(),
            limit,
        }
    }

    /// Append an event, failing once the limit is reached.
    pub fn push(&mut self, event: TraceEvent) -> Result<(), TraceLimitExceeded> {
        if self.events.len() >= self.limit {
            return Err(TraceLimitExceeded { limit: self.limit });
        }
        self.events.push(event);
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&TraceEvent> {
        self.events.get(index)
    }

    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl Default for TraceLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(statement: &str) -> TraceEvent {
        TraceEvent {
            statement: statement.to_string(),
            line: 1,
            iteration: None,
            bindings: Vec::new(),
            scope_names: Vec::new(),
        }
    }

    #[test]
    fn test_push_preserves_order() {
        let mut log = TraceLog::new();
        log.push(event("int x;")).unwrap();
        log.push(event("x = 1;")).unwrap();

        assert_eq!(log.len(), 2);
        assert_eq!(log.get(0).unwrap().statement, "int x;");
        assert_eq!(log.get(1).unwrap().statement, "x = 1;");
    }

    #[test]
    fn test_limit_reported() {
        let mut log = TraceLog::with_limit(1);
        log.push(event("int x;")).unwrap();

        let err = log.push(event("int y;")).unwrap_err();
        assert_eq!(err.limit, 1);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_iteration_label() {
        let mut e = event("i = i + 1;");
        assert_eq!(e.iteration_label(), "");
        e.iteration = Some(2);
        assert_eq!(e.iteration_label(), "iter 2");
    }
}
