//! Purpose: Turn query text into typed tokens for the query parser.
//! Exports: `Tokenizer`, `Token`, `TokenKind`, `LexerMode`.
//! Role: Two-mode scanner; plain mode yields attributes/operators/keywords, quoted mode yields literals.
//! Invariants: The tokenizer never switches mode itself; callers flip it on each quote boundary.
//! Invariants: Exactly one `End` token is produced; asking again is a lexical error.
use std::fmt;

use crate::core::error::{Error, ErrorKind};
use crate::core::operator::{self, LIKE_KEYWORD};

pub const QUOTE: char = '"';
const AND_KEYWORD: &str = "AND";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TokenKind {
    End,
    Attribute,
    Operator,
    And,
    Quote,
    Literal,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: Option<String>,
}

impl Token {
    fn bare(kind: TokenKind) -> Self {
        Self { kind, value: None }
    }

    fn with_value(kind: TokenKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: Some(value.into()),
        }
    }

    pub fn text(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.kind, &self.value) {
            (TokenKind::Literal, Some(value)) => write!(f, "\"{value}\""),
            (_, Some(value)) => f.write_str(value),
            (TokenKind::End, None) => f.write_str("<end>"),
            (TokenKind::And, None) => f.write_str(AND_KEYWORD),
            (TokenKind::Quote, None) => write!(f, "{QUOTE}"),
            (kind, None) => write!(f, "<{kind:?}>"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LexerMode {
    #[default]
    Plain,
    Quoted,
}

impl LexerMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Plain => Self::Quoted,
            Self::Quoted => Self::Plain,
        }
    }
}

#[derive(Debug)]
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    mode: LexerMode,
    finished: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            mode: LexerMode::Plain,
            finished: false,
        }
    }

    pub fn mode(&self) -> LexerMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: LexerMode) {
        self.mode = mode;
    }

    pub fn next_token(&mut self) -> Result<Token, Error> {
        if self.finished {
            return Err(lexical("no token after end of input", ""));
        }
        match self.mode {
            LexerMode::Plain => self.plain_token(),
            LexerMode::Quoted => self.quoted_token(),
        }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self, c: char) {
        self.pos += c.len_utf8();
    }

    fn plain_token(&mut self) -> Result<Token, Error> {
        while let Some(c) = self.peek().filter(|c| c.is_whitespace()) {
            self.bump(c);
        }

        let Some(first) = self.peek() else {
            self.finished = true;
            return Ok(Token::bare(TokenKind::End));
        };

        if first.is_alphabetic() || first == '_' {
            return Ok(self.word());
        }
        if operator::is_symbol_char(first) {
            return self.operator_symbol();
        }
        if first == QUOTE {
            self.bump(first);
            return Ok(Token::bare(TokenKind::Quote));
        }

        let start = self.pos;
        while let Some(c) = self.peek().filter(|c| !c.is_whitespace()) {
            self.bump(c);
        }
        Err(lexical("unknown token", &self.input[start..self.pos]))
    }

    fn word(&mut self) -> Token {
        let start = self.pos;
        while let Some(c) = self.peek().filter(|c| c.is_alphanumeric() || *c == '_') {
            self.bump(c);
        }
        let word = &self.input[start..self.pos];
        if word.eq_ignore_ascii_case(AND_KEYWORD) {
            Token::bare(TokenKind::And)
        } else if word == LIKE_KEYWORD {
            Token::with_value(TokenKind::Operator, LIKE_KEYWORD)
        } else {
            Token::with_value(TokenKind::Attribute, word)
        }
    }

    // Longest run of at most two symbol characters.
    fn operator_symbol(&mut self) -> Result<Token, Error> {
        let start = self.pos;
        for _ in 0..2 {
            match self.peek() {
                Some(c) if operator::is_symbol_char(c) => self.bump(c),
                _ => break,
            }
        }
        let symbol = &self.input[start..self.pos];
        if operator::ComparisonOperator::from_symbol(symbol).is_none() {
            return Err(lexical("invalid operator", symbol));
        }
        Ok(Token::with_value(TokenKind::Operator, symbol))
    }

    fn quoted_token(&mut self) -> Result<Token, Error> {
        let rest = self.rest();
        let Some(len) = rest.find(QUOTE) else {
            let fragment = rest.to_string();
            self.pos = self.input.len();
            return Err(lexical("unterminated literal", &fragment));
        };
        if len == 0 {
            self.bump(QUOTE);
            return Ok(Token::bare(TokenKind::Quote));
        }
        self.pos += len;
        Ok(Token::with_value(TokenKind::Literal, &rest[..len]))
    }
}

fn lexical(message: &str, fragment: &str) -> Error {
    let err = Error::new(ErrorKind::Lexical);
    if fragment.is_empty() {
        err.with_message(message.to_string())
    } else {
        err.with_message(format!("{message}: {fragment}"))
    }
}
