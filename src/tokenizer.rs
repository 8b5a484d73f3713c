//! Lexical analysis: turns the raw source text into classified tokens.
//!
//! The lexer is lazy; the parser pulls one token at a time through
//! [`Lexer::next_token`]. Multi-character operators are resolved here with a
//! single character of lookahead so the parser never has to glue tokens back
//! together. Newlines terminate statements and are therefore real tokens.

use std::fmt;

use crate::error::{CompileError, CompileResult};

/// Kinds of tokens recognised by the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
  Eof,
  Newline,
  Number,
  Ident,
  String,
  // Keywords.
  Label,
  Goto,
  Print,
  Input,
  Let,
  If,
  Then,
  Endif,
  While,
  Repeat,
  Endwhile,
  Rem,
  // Operators.
  Eq,
  Plus,
  Minus,
  Asterisk,
  Slash,
  EqEq,
  NotEq,
  Lt,
  LtEq,
  Gt,
  GtEq,
}

/// Reserved words, matched case-sensitively against whole identifiers.
const KEYWORDS: [(&str, TokenKind); 12] = [
  ("LABEL", TokenKind::Label),
  ("GOTO", TokenKind::Goto),
  ("PRINT", TokenKind::Print),
  ("INPUT", TokenKind::Input),
  ("LET", TokenKind::Let),
  ("IF", TokenKind::If),
  ("THEN", TokenKind::Then),
  ("ENDIF", TokenKind::Endif),
  ("WHILE", TokenKind::While),
  ("REPEAT", TokenKind::Repeat),
  ("ENDWHILE", TokenKind::Endwhile),
  ("REM", TokenKind::Rem),
];

impl TokenKind {
  /// Look up a keyword by its exact spelling.
  pub fn keyword(text: &str) -> Option<Self> {
    KEYWORDS
      .iter()
      .find(|(spelling, _)| *spelling == text)
      .map(|(_, kind)| *kind)
  }

  /// Relational operators usable inside an `IF`/`WHILE` condition.
  pub fn is_comparison(self) -> bool {
    matches!(
      self,
      Self::EqEq | Self::NotEq | Self::Lt | Self::LtEq | Self::Gt | Self::GtEq
    )
  }
}

impl fmt::Display for TokenKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if let Some((spelling, _)) = KEYWORDS.iter().find(|(_, kind)| kind == self) {
      return f.write_str(spelling);
    }
    let text = match self {
      Self::Eof => "end of input",
      Self::Newline => "newline",
      Self::Number => "number",
      Self::Ident => "identifier",
      Self::String => "string",
      Self::Eq => "=",
      Self::Plus => "+",
      Self::Minus => "-",
      Self::Asterisk => "*",
      Self::Slash => "/",
      Self::EqEq => "==",
      Self::NotEq => "!=",
      Self::Lt => "<",
      Self::LtEq => "<=",
      Self::Gt => ">",
      Self::GtEq => ">=",
      _ => unreachable!("keywords are handled above"),
    };
    f.write_str(text)
  }
}

/// A lexeme together with its classification.
///
/// `loc` is the byte offset of the lexeme in the source and only feeds
/// diagnostics. String tokens carry their contents without the quotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
  pub text: String,
  pub kind: TokenKind,
  pub loc: usize,
}

impl Token {
  pub fn new(text: impl Into<String>, kind: TokenKind, loc: usize) -> Self {
    Self {
      text: text.into(),
      kind,
      loc,
    }
  }
}

/// Human-friendly description used in diagnostics.
pub fn describe_token(token: &Token) -> String {
  match token.kind {
    TokenKind::Eof => "EOF".to_string(),
    TokenKind::Newline => "newline".to_string(),
    TokenKind::String => format!("\"{}\"", token.text),
    _ => token.text.clone(),
  }
}

/// Cursor over the source text producing one token per call.
pub struct Lexer {
  source: String,
  pos: usize,
}

impl Lexer {
  /// A newline is appended so the last statement always terminates.
  pub fn new(input: &str) -> Self {
    let mut source = String::with_capacity(input.len() + 1);
    source.push_str(input);
    source.push('\n');
    Self { source, pos: 0 }
  }

  /// The text being lexed, including the appended newline.
  pub fn source(&self) -> &str {
    &self.source
  }

  fn current(&self) -> Option<u8> {
    self.source.as_bytes().get(self.pos).copied()
  }

  fn peek(&self) -> Option<u8> {
    self.source.as_bytes().get(self.pos + 1).copied()
  }

  fn skip_whitespace(&mut self) {
    while matches!(self.current(), Some(b' ' | b'\t' | b'\r')) {
      self.pos += 1;
    }
  }

  fn skip_comment(&mut self) {
    if self.current() == Some(b'#') {
      while !matches!(self.current(), Some(b'\n') | None) {
        self.pos += 1;
      }
    }
  }

  fn error(&self, loc: usize, message: impl Into<String>) -> CompileError {
    CompileError::lex(&self.source, loc, message)
  }

  /// Produce a one- or two-character operator depending on whether the next
  /// character is `=`.
  fn operator(&mut self, single: TokenKind, with_eq: TokenKind) -> Token {
    let start = self.pos;
    let (kind, len) = if self.peek() == Some(b'=') {
      (with_eq, 2)
    } else {
      (single, 1)
    };
    self.pos += len;
    Token::new(&self.source[start..self.pos], kind, start)
  }

  /// Lex the next token; once the input is exhausted every call yields `Eof`.
  pub fn next_token(&mut self) -> CompileResult<Token> {
    self.skip_whitespace();
    self.skip_comment();

    let start = self.pos;
    let Some(c) = self.current() else {
      // Anchor at the end of the last line with content so diagnostics
      // quote a real line.
      let loc = self.source.trim_end().len();
      return Ok(Token::new("", TokenKind::Eof, loc));
    };

    let single = match c {
      b'+' => Some(TokenKind::Plus),
      b'-' => Some(TokenKind::Minus),
      b'*' => Some(TokenKind::Asterisk),
      b'/' => Some(TokenKind::Slash),
      b'\n' => Some(TokenKind::Newline),
      _ => None,
    };
    if let Some(kind) = single {
      self.pos += 1;
      return Ok(Token::new(&self.source[start..self.pos], kind, start));
    }

    match c {
      b'=' => Ok(self.operator(TokenKind::Eq, TokenKind::EqEq)),
      b'>' => Ok(self.operator(TokenKind::Gt, TokenKind::GtEq)),
      b'<' => Ok(self.operator(TokenKind::Lt, TokenKind::LtEq)),
      b'!' => {
        if self.peek() != Some(b'=') {
          return Err(self.error(start, "expected \"!=\", got \"!\" on its own"));
        }
        self.pos += 2;
        Ok(Token::new("!=", TokenKind::NotEq, start))
      }
      b'"' => self.string(),
      c if c.is_ascii_digit() => self.number(),
      c if c.is_ascii_alphabetic() => Ok(self.ident()),
      _ => {
        let invalid_char = self.source[start..].chars().next().unwrap_or('\0');
        Err(self.error(start, format!("unknown token: '{invalid_char}'")))
      }
    }
  }

  fn string(&mut self) -> CompileResult<Token> {
    let quote = self.pos;
    self.pos += 1;
    let start = self.pos;

    loop {
      match self.current() {
        Some(b'"') => break,
        Some(b'\r' | b'\n' | b'\t' | b'\\' | b'%') => {
          return Err(self.error(self.pos, "illegal character in string"));
        }
        Some(_) => self.pos += 1,
        None => return Err(self.error(quote, "unterminated string")),
      }
    }

    let text = self.source[start..self.pos].to_string();
    self.pos += 1;
    Ok(Token::new(text, TokenKind::String, quote))
  }

  fn number(&mut self) -> CompileResult<Token> {
    let start = self.pos;
    while self.current().is_some_and(|c| c.is_ascii_digit()) {
      self.pos += 1;
    }

    if self.current() == Some(b'.') {
      if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
        return Err(self.error(self.pos, "illegal character in number"));
      }
      self.pos += 1;
      while self.current().is_some_and(|c| c.is_ascii_digit()) {
        self.pos += 1;
      }
    }

    Ok(Token::new(&self.source[start..self.pos], TokenKind::Number, start))
  }

  fn ident(&mut self) -> Token {
    let start = self.pos;
    while self.current().is_some_and(|c| c.is_ascii_alphanumeric()) {
      self.pos += 1;
    }

    let text = &self.source[start..self.pos];
    let kind = TokenKind::keyword(text).unwrap_or(TokenKind::Ident);
    Token::new(text, kind, start)
  }
}

/// Lex the whole input into a vector terminated by an `Eof` token.
pub fn tokenize(input: &str) -> CompileResult<Vec<Token>> {
  let mut lexer = Lexer::new(input);
  let mut tokens = Vec::new();
  loop {
    let token = lexer.next_token()?;
    let done = token.kind == TokenKind::Eof;
    tokens.push(token);
    if done {
      return Ok(tokens);
    }
  }
}
