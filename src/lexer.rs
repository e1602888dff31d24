//! Tokenizer for the traced language
//!
//! Converts raw source text into a flat [`Token`] stream consumed by the
//! evaluator. Tokenization runs to completion before any evaluation starts;
//! the evaluator never re-tokenizes, it only re-reads token ranges.
//!
//! Unlike a full C lexer there are no string/char/float literals here: the
//! traced language is integers, identifiers, a fixed keyword set, and a small
//! operator/punctuation alphabet. Anything else is a fatal [`LexError`].

use rustc_hash::FxHashSet;
use std::fmt;

/// Longest lexeme the tokenizer will accept, in characters.
///
/// Exceeding it is reported as a [`LexError`] rather than silently truncated.
pub const MAX_LEXEME_LEN: usize = 63;

/// Reserved words. An alphanumeric run that matches one of these exactly is
/// classified [`TokenKind::Keyword`], otherwise [`TokenKind::Identifier`].
const KEYWORDS: &[&str] = &[
    "int", "float", "double", "char", "if", "else", "while", "do", "for",
    "return", "break", "continue", "void", "struct", "union", "enum",
];

/// Source location information for diagnostics and statement-text recovery.
///
/// `offset` is the byte offset into the original source, which lets the
/// evaluator slice the exact text of a statement back out for the trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }
}

/// Token classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Keyword,
    Identifier,
    Number,
    Operator,
    Punctuation,
    Eof,
}

/// A classified lexeme.
///
/// Tokens are immutable once produced; the stream is read-only during
/// evaluation except for the cursor position.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub location: SourceLocation,
}

impl Token {
    fn new(kind: TokenKind, text: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            kind,
            text: text.into(),
            location,
        }
    }

    /// True for a token of the given kind whose lexeme is exactly `text`.
    pub fn is(&self, kind: TokenKind, text: &str) -> bool {
        self.kind == kind && self.text == text
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Keyword => write!(f, "keyword '{}'", self.text),
            TokenKind::Identifier => write!(f, "identifier '{}'", self.text),
            TokenKind::Number => write!(f, "number {}", self.text),
            TokenKind::Operator => write!(f, "'{}'", self.text),
            TokenKind::Punctuation => write!(f, "'{}'", self.text),
            TokenKind::Eof => write!(f, "end of file"),
        }
    }
}

/// Lexer error type. Always fatal: the whole run aborts.
#[derive(Debug)]
pub struct LexError {
    pub message: String,
    pub location: SourceLocation,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Lexer error at line {}, column {}: {}",
            self.location.line, self.location.column, self.message
        )
    }
}

impl std::error::Error for LexError {}

/// Lexer over a finite character sequence.
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    offset: usize,
    keywords: FxHashSet<&'static str>,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            offset: 0,
            keywords: KEYWORDS.iter().copied().collect(),
        }
    }

    /// Tokenize the entire input.
    ///
    /// Post-condition: exactly one [`TokenKind::Eof`] token terminates the
    /// returned stream.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments();

            if self.is_at_end() {
                tokens.push(Token::new(TokenKind::Eof, "", self.current_location()));
                break;
            }

            tokens.push(self.next_token()?);
        }

        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Token, LexError> {
        let loc = self.current_location();
        let ch = self.peek().ok_or_else(|| LexError {
            message: "Unexpected end of file".to_string(),
            location: loc,
        })?;

        if ch.is_ascii_alphabetic() {
            return self.word(loc);
        }

        if ch.is_ascii_digit() {
            return self.number(loc);
        }

        // Two-character operators take priority over their one-character
        // prefixes so that `==` never splits into `=` `=`.
        if let Some(next) = self.peek_ahead(1) {
            let pair = [ch, next];
            if matches!(pair, ['=', '='] | ['!', '='] | ['<', '='] | ['>', '=']) {
                self.advance();
                self.advance();
                let text: String = pair.iter().collect();
                return Ok(Token::new(TokenKind::Operator, text, loc));
            }
        }

        match ch {
            '=' | '+' | '-' | '*' | '/' | '<' | '>' => {
                self.advance();
                Ok(Token::new(TokenKind::Operator, ch.to_string(), loc))
            }
            ';' | '(' | ')' | '{' | '}' | '[' | ']' => {
                self.advance();
                Ok(Token::new(TokenKind::Punctuation, ch.to_string(), loc))
            }
            _ => Err(LexError {
                message: format!("Unexpected character: '{}'", ch),
                location: loc,
            }),
        }
    }

    /// Consume a maximal alphanumeric run; keyword or identifier.
    fn word(&mut self, loc: SourceLocation) -> Result<Token, LexError> {
        let mut lexeme = String::new();

        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                lexeme.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if lexeme.len() > MAX_LEXEME_LEN {
            return Err(LexError {
                message: format!(
                    "Identifier '{}...' exceeds {} characters",
                    &lexeme[..16],
                    MAX_LEXEME_LEN
                ),
                location: loc,
            });
        }

        let kind = if self.keywords.contains(lexeme.as_str()) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };

        Ok(Token::new(kind, lexeme, loc))
    }

    /// Consume a maximal digit run. Decimal points are not supported: `3.14`
    /// lexes as number `3` followed by an error on `.`.
    fn number(&mut self, loc: SourceLocation) -> Result<Token, LexError> {
        let mut lexeme = String::new();

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                lexeme.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if lexeme.len() > MAX_LEXEME_LEN {
            return Err(LexError {
                message: format!("Number literal exceeds {} digits", MAX_LEXEME_LEN),
                location: loc,
            });
        }

        Ok(Token::new(TokenKind::Number, lexeme, loc))
    }

    /// Skip whitespace runs and `//` line comments, which behave as
    /// whitespace.
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(' ') | Some('\t') | Some('\r') | Some('\n') => {
                    self.advance();
                }
                Some('/') if self.peek_ahead(1) == Some('/') => {
                    self.skip_line_comment();
                }
                _ => break,
            }
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            self.advance();
            if ch == '\n' {
                break;
            }
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += 1;
        self.offset += ch.len_utf8();

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column, self.offset)
    }
}
