//! Statement recognition and execution
//!
//! [`Evaluator`] drives the whole run: it consumes the token stream produced
//! by the lexer, executes each statement as it is recognized, and records
//! trace events for the visualizer.
//!
//! # Error recovery
//!
//! Statement-local failures (bad structure, division by zero, table full,
//! undefined reads) abandon the current statement's remaining effects, record
//! one diagnostic line, and resynchronize past the next `;` so the driver
//! loop always makes forward progress. Fatal failures (unterminated blocks,
//! scope or trace limits) abort the run.

use super::errors::EvalError;
use super::expressions::{evaluate_condition, ExprCursor};
use crate::bindings::scope::{ScopeStack, DEFAULT_LIMIT};
use crate::bindings::table::{SymbolTable, Value, VarType, DEFAULT_CAPACITY};
use crate::lexer::{LexError, Lexer, SourceLocation, Token, TokenKind};
use crate::trace::{TraceEvent, TraceLog, DEFAULT_EVENT_LIMIT};

/// Bounded-resource configuration for a run.
///
/// Every bound is explicit and reported when exceeded; nothing is silently
/// capped or truncated.
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    /// Symbol table capacity (entries).
    pub table_capacity: usize,
    /// Scope nesting depth and declaration stack bound.
    pub scope_limit: usize,
    /// Trace event bound; doubles as the runaway-loop backstop.
    pub trace_events: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            table_capacity: DEFAULT_CAPACITY,
            scope_limit: DEFAULT_LIMIT,
            trace_events: DEFAULT_EVENT_LIMIT,
        }
    }
}

/// The parser/evaluator.
///
/// Owns the symbol table, the scope stack, and the trace log for the run's
/// duration; nothing else mutates them.
pub struct Evaluator {
    source: String,
    tokens: Vec<Token>,
    position: usize,
    table: SymbolTable,
    scopes: ScopeStack,
    trace: TraceLog,
    diagnostics: Vec<String>,
    /// Current `while` iteration label for emitted events; None outside loops.
    iteration: Option<usize>,
}

impl Evaluator {
    /// Tokenize `source` completely and set up an evaluator with default
    /// limits. Tokenization failures are fatal before evaluation starts.
    pub fn new(source: &str) -> Result<Self, LexError> {
        Self::with_limits(source, Limits::default())
    }

    pub fn with_limits(source: &str, limits: Limits) -> Result<Self, LexError> {
        let tokens = Lexer::new(source).tokenize()?;
        Ok(Self {
            source: source.to_string(),
            tokens,
            position: 0,
            table: SymbolTable::with_capacity(limits.table_capacity),
            scopes: ScopeStack::with_limit(limits.scope_limit),
            trace: TraceLog::with_limit(limits.trace_events),
            diagnostics: Vec::new(),
            iteration: None,
        })
    }

    /// Execute the whole program.
    ///
    /// Returns `Err` only for fatal conditions; statement-local failures are
    /// collected in [`diagnostics`](Self::diagnostics) and the run continues.
    /// The symbol table is released exactly once when the run ends.
    pub fn run(&mut self) -> Result<(), EvalError> {
        let result = self.run_inner();
        self.table.release();
        result
    }

    fn run_inner(&mut self) -> Result<(), EvalError> {
        while !self.at_eof() {
            self.step()?;
        }
        Ok(())
    }

    /// Execute one statement, recovering from statement-local errors.
    fn step(&mut self) -> Result<(), EvalError> {
        let start = self.position;
        match self.statement() {
            Ok(()) => Ok(()),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                self.diagnostics.push(e.to_string());
                self.synchronize(start);
                Ok(())
            }
        }
    }

    /// Skip to the next statement boundary after a failure: past the next
    /// `;`, or up to (not past) a `}` so the enclosing block can close.
    fn synchronize(&mut self, start: usize) {
        if self.position == start {
            self.advance();
        }
        while !self.at_eof() {
            let token = self.current();
            if token.is(TokenKind::Punctuation, ";") {
                self.advance();
                break;
            }
            if token.is(TokenKind::Punctuation, "}") {
                break;
            }
            self.advance();
        }
    }

    /// Dispatch on the current token's kind/lexeme.
    fn statement(&mut self) -> Result<(), EvalError> {
        let start = self.position;
        let token = self.current().clone();

        match token.kind {
            TokenKind::Keyword => match token.text.as_str() {
                "int" | "float" | "double" | "char" | "void" => self.type_statement(start),
                "while" => self.while_statement(),
                "return" => self.return_statement(),
                _ => Err(EvalError::Structural {
                    expected: "a statement".to_string(),
                    found: format!("{}", token),
                    location: token.location,
                }),
            },
            TokenKind::Identifier => self.assignment(start),
            _ => Err(EvalError::Structural {
                expected: "a statement".to_string(),
                found: format!("{}", token),
                location: token.location,
            }),
        }
    }

    /// A statement opening with a type keyword: either a variable declaration
    /// or a function body (type, name, `(`).
    fn type_statement(&mut self, start: usize) -> Result<(), EvalError> {
        let type_token = self.advance().clone();

        // `char` disambiguates on the following token: `char *p` is a
        // pointer, `char buf[N]` an array, bare `char buf` array storage.
        let mut var_type = match type_token.text.as_str() {
            "int" => VarType::Int,
            "float" => VarType::Float,
            "double" => VarType::Double,
            "char" => VarType::CharArray,
            _ => VarType::Int, // void: function-only, checked below
        };
        if type_token.text == "char" && self.current().is(TokenKind::Operator, "*") {
            self.advance();
            var_type = VarType::CharPtr;
        }

        let name_token = self.expect_identifier()?;

        if self.current().is(TokenKind::Punctuation, "(") {
            return self.function_body();
        }
        if type_token.text == "void" {
            let found = self.current().clone();
            return Err(EvalError::Structural {
                expected: "'(' after a void function name".to_string(),
                found: format!("{}", found),
                location: found.location,
            });
        }

        let mut array_len = 0;
        if var_type == VarType::CharArray && self.current().is(TokenKind::Punctuation, "[") {
            self.advance();
            let len_token = self.expect_number()?;
            array_len = len_token.text.parse::<usize>().unwrap_or(0);
            self.expect_punctuation("]")?;
        }

        self.table
            .add(&name_token.text, var_type, None, array_len)
            .map_err(|e| EvalError::from_table_full(e, name_token.location))?;
        self.scopes
            .on_declare(&name_token.text)
            .map_err(|e| EvalError::from_scope(e, name_token.location))?;

        if self.current().is(TokenKind::Operator, "=") {
            self.advance();
            if var_type == VarType::Int {
                let value = self.int_expression()?;
                self.table
                    .add(&name_token.text, VarType::Int, Some(Value::Int(value)), 0)
                    .map_err(|e| EvalError::from_table_full(e, name_token.location))?;
            } else {
                // Only integer initializers are evaluated; others are
                // consumed verbatim and the binding stays uninitialized.
                self.skip_initializer();
            }
        }

        self.expect_punctuation(";")?;
        self.emit_event(start)
    }

    /// `identifier = int-expression ;`
    ///
    /// Evaluates first, then binds the result as `int`, re-typing the
    /// variable if it was declared otherwise. Assigning to an undeclared name
    /// declares it implicitly, which also records a scope event.
    fn assignment(&mut self, start: usize) -> Result<(), EvalError> {
        let name_token = self.advance().clone();
        self.expect_operator("=")?;

        let value = self.int_expression()?;

        let implied_declaration = self.table.find(&name_token.text).is_none();
        self.table
            .add(&name_token.text, VarType::Int, Some(Value::Int(value)), 0)
            .map_err(|e| EvalError::from_table_full(e, name_token.location))?;
        if implied_declaration {
            self.scopes
                .on_declare(&name_token.text)
                .map_err(|e| EvalError::from_scope(e, name_token.location))?;
        }

        self.expect_punctuation(";")?;
        self.emit_event(start)
    }

    /// `while ( relational ) { statement* }`
    ///
    /// The condition token range is captured once and re-evaluated with a
    /// secondary cursor after every body pass; the primary cursor is only
    /// moved to the body start and, when the loop exits, past the closing
    /// brace. Emits no event for the header itself.
    fn while_statement(&mut self) -> Result<(), EvalError> {
        let while_token = self.advance().clone();

        self.expect_punctuation("(")?;
        let cond_start = self.position;
        let cond_end = self.find_matching_paren(cond_start, while_token.location)?;
        self.position = cond_end + 1;

        let open_brace = self.expect_punctuation("{")?;
        let body_start = self.position;
        let body_end = self.find_matching_brace(body_start, open_brace.location)?;

        // The first failure of the condition is reported through the normal
        // diagnostic channel; re-evaluation failures after a body pass reuse
        // that channel and are not duplicated.
        let mut condition =
            match evaluate_condition(&self.tokens, cond_start, cond_end, &self.table) {
                Ok(truth) => truth,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    self.diagnostics.push(e.to_string());
                    false
                }
            };

        let saved_iteration = self.iteration;
        let mut iteration = 0usize;

        while condition {
            iteration += 1;
            self.iteration = Some(iteration);
            self.position = body_start;

            while self.position < body_end && !self.at_eof() {
                self.step()?;
            }

            condition = evaluate_condition(&self.tokens, cond_start, cond_end, &self.table)
                .unwrap_or(false);
        }

        self.iteration = saved_iteration;
        self.position = body_end + 1;
        Ok(())
    }

    /// Return-type keyword, name, skipped parameter list, `{`…`}` body as a
    /// nested scope. No parameter binding, no call sites, no return value;
    /// strictly a scope-introducing container for declarations.
    fn function_body(&mut self) -> Result<(), EvalError> {
        let open_paren = self.expect_punctuation("(")?;
        let close = self.find_matching_paren(self.position, open_paren.location)?;
        self.position = close + 1;

        let open_brace = self.expect_punctuation("{")?;
        self.scopes
            .enter_scope()
            .map_err(|e| EvalError::from_scope(e, open_brace.location))?;

        loop {
            if self.current().is(TokenKind::Punctuation, "}") {
                break;
            }
            if self.at_eof() {
                return Err(EvalError::UnterminatedBlock {
                    location: open_brace.location,
                });
            }
            self.step()?;
        }
        self.advance();

        self.scopes.exit_scope(&mut self.table);
        Ok(())
    }

    /// `return expression? ;`. The expression is evaluated only to keep the
    /// token stream consistent; the result is discarded and no event emitted.
    fn return_statement(&mut self) -> Result<(), EvalError> {
        self.advance();
        if !self.current().is(TokenKind::Punctuation, ";") {
            let _ = self.int_expression()?;
        }
        self.expect_punctuation(";")?;
        Ok(())
    }

    /// Evaluate an int expression at the primary cursor, advancing it past
    /// the consumed tokens on success and leaving it untouched on failure.
    fn int_expression(&mut self) -> Result<i64, EvalError> {
        let mut cursor = ExprCursor::new(&self.tokens, self.position);
        let value = cursor.expression(&self.table)?;
        self.position = cursor.position();
        Ok(value)
    }

    /// Consume a non-int initializer verbatim, up to the terminating `;`.
    fn skip_initializer(&mut self) {
        while !self.at_eof() {
            let token = self.current();
            if token.is(TokenKind::Punctuation, ";") || token.is(TokenKind::Punctuation, "}") {
                break;
            }
            self.advance();
        }
    }

    /// Index of the `)` matching the parenthesis just before `start`.
    fn find_matching_paren(
        &self,
        start: usize,
        opened_at: SourceLocation,
    ) -> Result<usize, EvalError> {
        self.find_matching(start, "(", ")", opened_at)
    }

    /// Index of the `}` matching the brace just before `start`.
    fn find_matching_brace(
        &self,
        start: usize,
        opened_at: SourceLocation,
    ) -> Result<usize, EvalError> {
        self.find_matching(start, "{", "}", opened_at)
    }

    fn find_matching(
        &self,
        start: usize,
        open: &str,
        close: &str,
        opened_at: SourceLocation,
    ) -> Result<usize, EvalError> {
        let mut depth = 1usize;
        let mut index = start;
        while let Some(token) = self.tokens.get(index) {
            if token.kind == TokenKind::Eof {
                break;
            }
            if token.is(TokenKind::Punctuation, open) {
                depth += 1;
            } else if token.is(TokenKind::Punctuation, close) {
                depth -= 1;
                if depth == 0 {
                    return Ok(index);
                }
            }
            index += 1;
        }
        Err(EvalError::UnterminatedBlock {
            location: opened_at,
        })
    }

    /// Record a trace event for the statement spanning tokens
    /// `start..self.position`.
    fn emit_event(&mut self, start: usize) -> Result<(), EvalError> {
        let statement = self.statement_text(start);
        let line = self.tokens[start].location.line;
        let bindings = self
            .table
            .symbols()
            .iter()
            .map(|s| (s.name.clone(), s.render_value()))
            .collect();
        let scope_names = self.scopes.names_top_down().map(str::to_string).collect();

        self.trace.push(TraceEvent {
            statement,
            line,
            iteration: self.iteration,
            bindings,
            scope_names,
        })?;
        Ok(())
    }

    /// Recover the statement's source text from token byte offsets, with
    /// whitespace runs collapsed.
    fn statement_text(&self, start: usize) -> String {
        let end = self.position.saturating_sub(1).max(start);
        let first = &self.tokens[start];
        let last = &self.tokens[end];
        let text = &self.source[first.location.offset..last.location.offset + last.text.len()];
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    // ===== Token helpers =====

    fn current(&self) -> &Token {
        &self.tokens[self.position]
    }

    fn at_eof(&self) -> bool {
        self.current().kind == TokenKind::Eof
    }

    fn advance(&mut self) -> &Token {
        if !self.at_eof() {
            self.position += 1;
        }
        &self.tokens[self.position.saturating_sub(1)]
    }

    fn expect_identifier(&mut self) -> Result<Token, EvalError> {
        let token = self.current().clone();
        if token.kind == TokenKind::Identifier {
            self.advance();
            Ok(token)
        } else {
            Err(EvalError::Structural {
                expected: "an identifier".to_string(),
                found: format!("{}", token),
                location: token.location,
            })
        }
    }

    fn expect_number(&mut self) -> Result<Token, EvalError> {
        let token = self.current().clone();
        if token.kind == TokenKind::Number {
            self.advance();
            Ok(token)
        } else {
            Err(EvalError::Structural {
                expected: "a number".to_string(),
                found: format!("{}", token),
                location: token.location,
            })
        }
    }

    fn expect_operator(&mut self, text: &str) -> Result<Token, EvalError> {
        self.expect(TokenKind::Operator, text)
    }

    fn expect_punctuation(&mut self, text: &str) -> Result<Token, EvalError> {
        self.expect(TokenKind::Punctuation, text)
    }

    fn expect(&mut self, kind: TokenKind, text: &str) -> Result<Token, EvalError> {
        let token = self.current().clone();
        if token.is(kind, text) {
            self.advance();
            Ok(token)
        } else {
            Err(EvalError::Structural {
                expected: format!("'{}'", text),
                found: format!("{}", token),
                location: token.location,
            })
        }
    }

    // ===== Accessors =====

    pub fn trace(&self) -> &TraceLog {
        &self.trace
    }

    pub fn diagnostics(&self) -> &[String] {
        &self.diagnostics
    }

    pub fn table(&self) -> &SymbolTable {
        &self.table
    }

    pub fn scopes(&self) -> &ScopeStack {
        &self.scopes
    }

    /// Consume the evaluator, keeping what the visualizer needs.
    pub fn into_parts(self) -> (TraceLog, Vec<String>) {
        (self.trace, self.diagnostics)
    }
}
