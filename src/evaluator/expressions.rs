//! Integer expression grammar
//!
//! Recursive descent with the usual precedence, left-associative:
//!
//! ```text
//! relational := expression (relop expression)?    relop: > < >= <= == !=
//! expression := term (('+' | '-') term)*
//! term       := factor (('*' | '/') factor)*
//! factor     := '(' expression ')' | number | identifier
//! ```
//!
//! Evaluation happens during recognition; there is no expression tree. An
//! identifier factor must resolve to an initialized `int` binding.
//! Addition, subtraction, and multiplication wrap on overflow like the
//! machine ints they model; the one unrepresentable quotient
//! (`i64::MIN / -1`) is reported as an evaluation error.
//!
//! [`ExprCursor`] carries its own position so that `while` conditions can be
//! re-evaluated over an immutable token range without disturbing the
//! evaluator's primary cursor.

use super::errors::EvalError;
use crate::bindings::table::{SymbolTable, VarType};
use crate::lexer::{SourceLocation, Token, TokenKind};

/// Evaluate a relational expression over a token range as a loop condition.
///
/// Pure with respect to evaluator state: reads the range, reads the table,
/// mutates nothing. Truthiness of a bare expression is its non-zero-ness.
pub fn evaluate_condition(
    tokens: &[Token],
    start: usize,
    end: usize,
    table: &SymbolTable,
) -> Result<bool, EvalError> {
    let mut cursor = ExprCursor::new(&tokens[..end], start);
    let value = cursor.relational(table)?;
    Ok(value != 0)
}

/// A secondary cursor over (a prefix of) the token stream.
pub struct ExprCursor<'a> {
    tokens: &'a [Token],
    position: usize,
}

impl<'a> ExprCursor<'a> {
    pub fn new(tokens: &'a [Token], position: usize) -> Self {
        Self { tokens, position }
    }

    /// Position of the first unconsumed token.
    pub fn position(&self) -> usize {
        self.position
    }

    /// `expression (relop expression)?`, yielding 1/0 for a comparison and
    /// the bare value otherwise.
    pub fn relational(&mut self, table: &SymbolTable) -> Result<i64, EvalError> {
        let left = self.expression(table)?;

        let op = match self.peek() {
            Some(t)
                if t.kind == TokenKind::Operator
                    && matches!(t.text.as_str(), ">" | "<" | ">=" | "<=" | "==" | "!=") =>
            {
                t.text.clone()
            }
            _ => return Ok(left),
        };
        self.advance();

        let right = self.expression(table)?;
        let result = match op.as_str() {
            ">" => left > right,
            "<" => left < right,
            ">=" => left >= right,
            "<=" => left <= right,
            "==" => left == right,
            _ => left != right,
        };
        Ok(result as i64)
    }

    /// `term (('+' | '-') term)*`
    pub fn expression(&mut self, table: &SymbolTable) -> Result<i64, EvalError> {
        let mut value = self.term(table)?;

        while let Some(op) = self.match_operator(&["+", "-"]) {
            let rhs = self.term(table)?;
            value = if op == "+" {
                value.wrapping_add(rhs)
            } else {
                value.wrapping_sub(rhs)
            };
        }

        Ok(value)
    }

    /// `factor (('*' | '/') factor)*`
    fn term(&mut self, table: &SymbolTable) -> Result<i64, EvalError> {
        let mut value = self.factor(table)?;

        while let Some(op) = self.match_operator(&["*", "/"]) {
            let loc = self.previous_location();
            let rhs = self.factor(table)?;
            if op == "*" {
                value = value.wrapping_mul(rhs);
            } else {
                if rhs == 0 {
                    return Err(EvalError::DivisionByZero { location: loc });
                }
                // checked_div rejects the one unrepresentable quotient,
                // i64::MIN / -1.
                value = value
                    .checked_div(rhs)
                    .ok_or(EvalError::Overflow { location: loc })?;
            }
        }

        Ok(value)
    }

    /// `'(' expression ')' | number | identifier`
    fn factor(&mut self, table: &SymbolTable) -> Result<i64, EvalError> {
        let token = match self.peek() {
            Some(t) => t.clone(),
            None => {
                return Err(EvalError::Structural {
                    expected: "an expression operand".to_string(),
                    found: "end of condition".to_string(),
                    location: self.end_location(),
                });
            }
        };

        match token.kind {
            TokenKind::Punctuation if token.text == "(" => {
                self.advance();
                let value = self.expression(table)?;
                self.expect_punctuation(")")?;
                Ok(value)
            }
            TokenKind::Number => {
                self.advance();
                // Digit runs are bounded by the lexer; anything that still
                // overflows i64 is reported structurally.
                token.text.parse::<i64>().map_err(|_| EvalError::Structural {
                    expected: "an integer literal in range".to_string(),
                    found: format!("{}", token),
                    location: token.location,
                })
            }
            TokenKind::Identifier => {
                self.advance();
                self.lookup_int(&token.text, token.location, table)
            }
            _ => Err(EvalError::Structural {
                expected: "a number, identifier, or '('".to_string(),
                found: format!("{}", token),
                location: token.location,
            }),
        }
    }

    /// An identifier factor must name an initialized `int` binding.
    fn lookup_int(
        &self,
        name: &str,
        location: SourceLocation,
        table: &SymbolTable,
    ) -> Result<i64, EvalError> {
        match table.find(name) {
            Some(symbol) if symbol.var_type == VarType::Int && symbol.initialized => symbol
                .value
                .as_int()
                .ok_or(EvalError::UndefinedOrUninitialized {
                    name: name.to_string(),
                    location,
                }),
            _ => Err(EvalError::UndefinedOrUninitialized {
                name: name.to_string(),
                location,
            }),
        }
    }

    fn match_operator(&mut self, alternatives: &[&str]) -> Option<String> {
        match self.peek() {
            Some(t)
                if t.kind == TokenKind::Operator
                    && alternatives.contains(&t.text.as_str()) =>
            {
                let text = t.text.clone();
                self.advance();
                Some(text)
            }
            _ => None,
        }
    }

    fn expect_punctuation(&mut self, text: &str) -> Result<(), EvalError> {
        match self.peek() {
            Some(t) if t.kind == TokenKind::Punctuation && t.text == text => {
                self.advance();
                Ok(())
            }
            Some(t) => Err(EvalError::Structural {
                expected: format!("'{}'", text),
                found: format!("{}", t),
                location: t.location,
            }),
            None => Err(EvalError::Structural {
                expected: format!("'{}'", text),
                found: "end of condition".to_string(),
                location: self.end_location(),
            }),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    fn previous_location(&self) -> SourceLocation {
        self.tokens
            .get(self.position.saturating_sub(1))
            .map(|t| t.location)
            .unwrap_or_else(|| SourceLocation::new(1, 1, 0))
    }

    fn end_location(&self) -> SourceLocation {
        self.tokens
            .last()
            .map(|t| t.location)
            .unwrap_or_else(|| SourceLocation::new(1, 1, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::table::Value;
    use crate::lexer::Lexer;

    fn eval(source: &str, table: &SymbolTable) -> Result<i64, EvalError> {
        let tokens = Lexer::new(source).tokenize().unwrap();
        ExprCursor::new(&tokens, 0).relational(table)
    }

    #[test]
    fn test_precedence() {
        let table = SymbolTable::new();
        assert_eq!(eval("2 + 3 * 4", &table).unwrap(), 14);
        assert_eq!(eval("(2 + 3) * 4", &table).unwrap(), 20);
        assert_eq!(eval("20 - 6 / 2", &table).unwrap(), 17);
    }

    #[test]
    fn test_left_associativity() {
        let table = SymbolTable::new();
        assert_eq!(eval("10 - 3 - 2", &table).unwrap(), 5);
        assert_eq!(eval("100 / 10 / 2", &table).unwrap(), 5);
    }

    #[test]
    fn test_arithmetic_wraps_at_i64_bounds() {
        let table = SymbolTable::new();
        assert_eq!(eval("9223372036854775807 + 1", &table).unwrap(), i64::MIN);
        assert_eq!(eval("0 - 9223372036854775807 - 2", &table).unwrap(), i64::MAX);
        assert_eq!(eval("4611686018427387904 * 2", &table).unwrap(), i64::MIN);
    }

    #[test]
    fn test_min_quotient_reported_not_panicking() {
        let table = SymbolTable::new();
        assert!(matches!(
            eval("(0 - 9223372036854775807 - 1) / (0 - 1)", &table),
            Err(EvalError::Overflow { .. })
        ));
    }

    #[test]
    fn test_division_by_zero() {
        let table = SymbolTable::new();
        assert!(matches!(
            eval("5 / 0", &table),
            Err(EvalError::DivisionByZero { .. })
        ));
    }

    #[test]
    fn test_identifier_lookup() {
        let mut table = SymbolTable::new();
        table.add("x", VarType::Int, Some(Value::Int(6)), 0).unwrap();
        assert_eq!(eval("x * 7", &table).unwrap(), 42);
    }

    #[test]
    fn test_uninitialized_identifier_fails() {
        let mut table = SymbolTable::new();
        table.add("x", VarType::Int, None, 0).unwrap();
        assert!(matches!(
            eval("x + 1", &table),
            Err(EvalError::UndefinedOrUninitialized { ref name, .. }) if name == "x"
        ));
    }

    #[test]
    fn test_non_int_identifier_fails() {
        let mut table = SymbolTable::new();
        table
            .add("f", VarType::Float, Some(Value::Float(1.5)), 0)
            .unwrap();
        assert!(matches!(
            eval("f + 1", &table),
            Err(EvalError::UndefinedOrUninitialized { .. })
        ));
    }

    #[test]
    fn test_relational_operators() {
        let table = SymbolTable::new();
        assert_eq!(eval("3 < 5", &table).unwrap(), 1);
        assert_eq!(eval("5 <= 4", &table).unwrap(), 0);
        assert_eq!(eval("2 == 2", &table).unwrap(), 1);
        assert_eq!(eval("2 != 2", &table).unwrap(), 0);
        assert_eq!(eval("1 + 1 >= 2", &table).unwrap(), 1);
    }

    #[test]
    fn test_bare_expression_truthiness() {
        let mut table = SymbolTable::new();
        table.add("i", VarType::Int, Some(Value::Int(0)), 0).unwrap();
        let tokens = Lexer::new("i").tokenize().unwrap();
        assert!(!evaluate_condition(&tokens, 0, tokens.len() - 1, &table).unwrap());

        table.add("i", VarType::Int, Some(Value::Int(3)), 0).unwrap();
        assert!(evaluate_condition(&tokens, 0, tokens.len() - 1, &table).unwrap());
    }

    #[test]
    fn test_condition_range_is_bounded() {
        // The range ends before the ')'; evaluation must not read past it.
        let tokens = Lexer::new("i < 3 ) {").tokenize().unwrap();
        let mut table = SymbolTable::new();
        table.add("i", VarType::Int, Some(Value::Int(1)), 0).unwrap();
        assert!(evaluate_condition(&tokens, 0, 3, &table).unwrap());
    }
}
