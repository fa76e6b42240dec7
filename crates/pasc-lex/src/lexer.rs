//! The lexer: turns a source string into a stream of [`Token`]s.

use pasc_util::Span;
use tracing::trace;

use crate::error::{LexError, Result};
use crate::token::{Token, TokenKind};

/// Streams a source string into tokens one at a time. Owns its own
/// position/line/column state; two `Lexer`s over two source strings never
/// interact.
pub struct Lexer<'source> {
    chars: Vec<char>,
    source: &'source str,
    /// Byte-ish position into `chars` (index, not byte offset — fine since
    /// spans only need to be self-consistent within one lexer run).
    position: usize,
    line: u32,
    column: u32,
}

impl<'source> Lexer<'source> {
    pub fn new(source: &'source str) -> Self {
        Self {
            chars: source.chars().collect(),
            source,
            position: 0,
            line: 1,
            column: 1,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.chars.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        if let Some(c) = self.current_char() {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
            self.position += 1;
        }
    }

    fn span_at(&self, start_pos: usize, start_line: u32, start_col: u32) -> Span {
        Span::new(start_pos, self.position, start_line, start_col)
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.current_char() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Skip a `{ ... }` comment. Comments do not nest: the first `}`
    /// closes it. Called with `position` sitting on the opening `{`.
    fn skip_comment(&mut self) -> Result<()> {
        let start_line = self.line;
        let start_col = self.column;
        let start_pos = self.position;
        self.advance(); // consume '{'
        loop {
            match self.current_char() {
                Some('}') => {
                    self.advance();
                    return Ok(());
                }
                Some(_) => self.advance(),
                None => {
                    return Err(LexError::UnterminatedComment {
                        span: self.span_at(start_pos, start_line, start_col),
                    })
                }
            }
        }
    }

    fn lex_number(&mut self) -> Result<Token> {
        let start_pos = self.position;
        let start_line = self.line;
        let start_col = self.column;

        let mut digits = String::new();
        while let Some(c) = self.current_char() {
            if c.is_ascii_digit() {
                digits.push(c);
                self.advance();
            } else {
                break;
            }
        }

        if self.current_char() == Some('.') {
            digits.push('.');
            self.advance(); // consume '.' unconditionally once a digit run precedes it
            if !self.current_char().is_some_and(|c| c.is_ascii_digit()) {
                return Err(LexError::InvalidNumberFormat {
                    span: self.span_at(start_pos, start_line, start_col),
                });
            }
            while let Some(c) = self.current_char() {
                if c.is_ascii_digit() {
                    digits.push(c);
                    self.advance();
                } else {
                    break;
                }
            }
            let value: f64 = digits
                .parse()
                .expect("digit run with at most one '.' always parses as f64");
            let span = self.span_at(start_pos, start_line, start_col);
            return Ok(Token::new(TokenKind::RealConst(value), digits, span));
        }

        let value: i64 = digits
            .parse()
            .map_err(|_| LexError::InvalidNumberFormat {
                span: self.span_at(start_pos, start_line, start_col),
            })?;
        let span = self.span_at(start_pos, start_line, start_col);
        Ok(Token::new(TokenKind::IntegerConst(value), digits, span))
    }

    fn lex_identifier(&mut self) -> Token {
        let start_pos = self.position;
        let start_line = self.line;
        let start_col = self.column;

        let mut text = String::new();
        while let Some(c) = self.current_char() {
            if c.is_ascii_alphanumeric() || c == '_' {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }

        let span = self.span_at(start_pos, start_line, start_col);
        let upper = text.to_ascii_uppercase();
        match TokenKind::keyword(&upper) {
            Some(kind) => Token::new(kind, text, span),
            None => Token::new(TokenKind::Id, text, span),
        }
    }

    /// Produce the next token, or `TokenKind::Eof` once the source is
    /// exhausted.
    pub fn next_token(&mut self) -> Result<Token> {
        loop {
            self.skip_whitespace();
            if self.current_char() == Some('{') {
                self.skip_comment()?;
                continue;
            }
            break;
        }

        let start_line = self.line;
        let start_col = self.column;
        let start_pos = self.position;

        let Some(c) = self.current_char() else {
            return Ok(Token::eof(self.span_at(start_pos, start_line, start_col)));
        };

        if c.is_ascii_digit() {
            let tok = self.lex_number()?;
            trace!(?tok.kind, "lexed number");
            return Ok(tok);
        }

        if c.is_ascii_alphabetic() || c == '_' {
            let tok = self.lex_identifier();
            trace!(?tok.kind, "lexed identifier/keyword");
            return Ok(tok);
        }

        macro_rules! single {
            ($kind:expr) => {{
                self.advance();
                Token::new($kind, "", self.span_at(start_pos, start_line, start_col))
            }};
        }

        let tok = match c {
            '+' => single!(TokenKind::Plus),
            '-' => single!(TokenKind::Minus),
            '*' => single!(TokenKind::Star),
            '/' => {
                self.advance();
                if self.current_char() == Some('/') {
                    self.advance();
                    Token::new(
                        TokenKind::Div,
                        "",
                        self.span_at(start_pos, start_line, start_col),
                    )
                } else {
                    Token::new(
                        TokenKind::Slash,
                        "",
                        self.span_at(start_pos, start_line, start_col),
                    )
                }
            }
            ';' => single!(TokenKind::Semi),
            '.' => single!(TokenKind::Dot),
            ',' => single!(TokenKind::Comma),
            '(' => single!(TokenKind::LParen),
            ')' => single!(TokenKind::RParen),
            ':' => {
                self.advance();
                if self.current_char() == Some('=') {
                    self.advance();
                    Token::new(
                        TokenKind::Assign,
                        "",
                        self.span_at(start_pos, start_line, start_col),
                    )
                } else {
                    Token::new(
                        TokenKind::Colon,
                        "",
                        self.span_at(start_pos, start_line, start_col),
                    )
                }
            }
            '=' => single!(TokenKind::Eq),
            '<' => {
                self.advance();
                match self.current_char() {
                    Some('=') => {
                        self.advance();
                        Token::new(
                            TokenKind::Le,
                            "",
                            self.span_at(start_pos, start_line, start_col),
                        )
                    }
                    Some('>') => {
                        self.advance();
                        Token::new(
                            TokenKind::Ne,
                            "",
                            self.span_at(start_pos, start_line, start_col),
                        )
                    }
                    _ => Token::new(
                        TokenKind::Lt,
                        "",
                        self.span_at(start_pos, start_line, start_col),
                    ),
                }
            }
            '>' => {
                self.advance();
                if self.current_char() == Some('=') {
                    self.advance();
                    Token::new(
                        TokenKind::Ge,
                        "",
                        self.span_at(start_pos, start_line, start_col),
                    )
                } else {
                    Token::new(
                        TokenKind::Gt,
                        "",
                        self.span_at(start_pos, start_line, start_col),
                    )
                }
            }
            other => {
                self.advance();
                return Err(LexError::InvalidCharacter {
                    ch: other,
                    span: self.span_at(start_pos, start_line, start_col),
                });
            }
        };
        trace!(?tok.kind, "lexed token");
        Ok(tok)
    }

    /// Lex the whole source eagerly, stopping at the first error or after
    /// `Eof`. Convenient for tests and for the parser, which wants the full
    /// token vector up front.
    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            let is_eof = tok.kind == TokenKind::Eof;
            tokens.push(tok);
            if is_eof {
                return Ok(tokens);
            }
        }
    }

    pub fn source(&self) -> &'source str {
        self.source
    }
}
