//! Scope stack: declaration order and scope teardown
//!
//! The scope stack records which names were declared since the most recent
//! scope entry so that a closing brace can retract exactly those names from
//! the symbol table, most-recently-declared first. It holds names, never
//! values; removal resolves each name against the table.
//!
//! The outermost (global) scope is never entered or exited; only function
//! bodies open scopes.

use super::table::SymbolTable;
use std::fmt;

/// Default bound on nesting depth and on the declaration stack.
pub const DEFAULT_LIMIT: usize = 64;

/// Capacity errors for the scope stack.
///
/// The reference behavior silently capped both stacks; that loses scope marks
/// and corrupts later teardown, so overflow here fails loudly instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeError {
    DepthExceeded { limit: usize },
    DeclarationsExceeded { limit: usize },
}

impl fmt::Display for ScopeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeError::DepthExceeded { limit } => {
                write!(f, "Scope nesting exceeds the limit of {}", limit)
            }
            ScopeError::DeclarationsExceeded { limit } => {
                write!(f, "Declaration stack exceeds the limit of {}", limit)
            }
        }
    }
}

impl std::error::Error for ScopeError {}

/// Ordered record of declarations plus marks delimiting nested scopes.
#[derive(Debug, Clone)]
pub struct ScopeStack {
    declared: Vec<String>,
    marks: Vec<usize>,
    limit: usize,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_LIMIT)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            declared: Vec::new(),
            marks: Vec::new(),
            limit,
        }
    }

    /// Enter a nested scope: push a mark at the current declaration top.
    pub fn enter_scope(&mut self) -> Result<(), ScopeError> {
        if self.marks.len() >= self.limit {
            return Err(ScopeError::DepthExceeded { limit: self.limit });
        }
        self.marks.push(self.declared.len());
        Ok(())
    }

    /// Record a declaration event.
    pub fn on_declare(&mut self, name: &str) -> Result<(), ScopeError> {
        if self.declared.len() >= self.limit {
            return Err(ScopeError::DeclarationsExceeded { limit: self.limit });
        }
        self.declared.push(name.to_string());
        Ok(())
    }

    /// Exit the current scope, retracting from `table` every name declared
    /// since the matching [`enter_scope`](Self::enter_scope) in reverse
    /// declaration order. Afterward the stack is exactly as it was at entry.
    ///
    /// Without an open scope this is a no-op (the global scope never exits).
    pub fn exit_scope(&mut self, table: &mut SymbolTable) {
        let Some(mark) = self.marks.pop() else {
            return;
        };
        while self.declared.len() > mark {
            // pop above the mark, so the stack cannot be empty here
            if let Some(name) = self.declared.pop() {
                table.remove(&name);
            }
        }
    }

    /// Declared names from most recent to oldest, for display.
    pub fn names_top_down(&self) -> impl Iterator<Item = &str> {
        self.declared.iter().rev().map(|s| s.as_str())
    }

    /// Number of scopes currently open.
    pub fn depth(&self) -> usize {
        self.marks.len()
    }

    pub fn len(&self) -> usize {
        self.declared.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declared.is_empty()
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::table::VarType;

    fn declare(table: &mut SymbolTable, scopes: &mut ScopeStack, name: &str) {
        table.add(name, VarType::Int, None, 0).unwrap();
        scopes.on_declare(name).unwrap();
    }

    #[test]
    fn test_exit_retracts_inner_names_only() {
        let mut table = SymbolTable::new();
        let mut scopes = ScopeStack::new();

        declare(&mut table, &mut scopes, "outer");
        scopes.enter_scope().unwrap();
        declare(&mut table, &mut scopes, "a");
        declare(&mut table, &mut scopes, "b");

        scopes.exit_scope(&mut table);

        assert!(table.find("outer").is_some());
        assert!(table.find("a").is_none());
        assert!(table.find("b").is_none());
        assert_eq!(scopes.len(), 1);
        assert_eq!(scopes.depth(), 0);
    }

    #[test]
    fn test_nested_scopes_unwind_independently() {
        let mut table = SymbolTable::new();
        let mut scopes = ScopeStack::new();

        scopes.enter_scope().unwrap();
        declare(&mut table, &mut scopes, "x");
        scopes.enter_scope().unwrap();
        declare(&mut table, &mut scopes, "y");

        scopes.exit_scope(&mut table);
        assert!(table.find("x").is_some());
        assert!(table.find("y").is_none());

        scopes.exit_scope(&mut table);
        assert!(table.find("x").is_none());
        assert!(scopes.is_empty());
    }

    #[test]
    fn test_exit_without_entry_is_noop() {
        let mut table = SymbolTable::new();
        let mut scopes = ScopeStack::new();

        declare(&mut table, &mut scopes, "global");
        scopes.exit_scope(&mut table);

        assert!(table.find("global").is_some());
        assert_eq!(scopes.len(), 1);
    }

    #[test]
    fn test_depth_limit_reports() {
        let mut scopes = ScopeStack::with_limit(2);
        scopes.enter_scope().unwrap();
        scopes.enter_scope().unwrap();

        assert_eq!(
            scopes.enter_scope(),
            Err(ScopeError::DepthExceeded { limit: 2 })
        );
    }

    #[test]
    fn test_declaration_limit_reports() {
        let mut scopes = ScopeStack::with_limit(1);
        scopes.on_declare("a").unwrap();

        assert_eq!(
            scopes.on_declare("b"),
            Err(ScopeError::DeclarationsExceeded { limit: 1 })
        );
    }

    #[test]
    fn test_names_top_down() {
        let mut scopes = ScopeStack::new();
        scopes.on_declare("first").unwrap();
        scopes.on_declare("second").unwrap();

        let names: Vec<&str> = scopes.names_top_down().collect();
        assert_eq!(names, ["second", "first"]);
    }
}
