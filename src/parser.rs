//! Single-pass recursive-descent parser that emits C as it goes.
//!
//! There is no syntax tree: each grammar rule writes its translation into the
//! [`Emitter`] the moment it is recognised. The parser keeps two tokens in
//! view (current and peek), which is enough for every decision the grammar
//! needs.
//!
//! ```text
//! program    ::= {statement}
//! statement  ::= "REM" {any-token} nl
//!              | "PRINT" (STRING | expression) nl
//!              | "IF" comparison "THEN" nl {statement} "ENDIF" nl
//!              | "WHILE" comparison "REPEAT" nl {statement} "ENDWHILE" nl
//!              | "LABEL" IDENT nl
//!              | "GOTO" IDENT nl
//!              | "LET" IDENT "=" expression nl
//!              | "INPUT" IDENT nl
//! comparison ::= expression (relop expression)+
//! expression ::= term {("+" | "-") term}
//! term       ::= unary {("*" | "/") unary}
//! unary      ::= ["+" | "-"] primary
//! primary    ::= NUMBER | IDENT
//! nl         ::= NEWLINE {NEWLINE}
//! ```

use rustc_hash::{FxHashMap, FxHashSet};

use crate::codegen::Emitter;
use crate::error::{CompileError, CompileResult};
use crate::tokenizer::{Lexer, Token, TokenKind, describe_token};

pub struct Parser<'e> {
  lexer: Lexer,
  emitter: &'e mut Emitter,

  symbols: FxHashSet<String>,
  labels_declared: FxHashSet<String>,
  /// Jump targets, keyed by name, with the offset of the first `GOTO`.
  labels_gotoed: FxHashMap<String, usize>,
  /// Closing keywords of the IF/WHILE blocks still open, innermost last.
  open_blocks: Vec<TokenKind>,

  current: Token,
  peek: Token,
}

impl<'e> Parser<'e> {
  /// Prime the two-token window; lexing errors in the first tokens surface here.
  pub fn new(mut lexer: Lexer, emitter: &'e mut Emitter) -> CompileResult<Self> {
    let current = lexer.next_token()?;
    let peek = lexer.next_token()?;
    Ok(Self {
      lexer,
      emitter,
      symbols: FxHashSet::default(),
      labels_declared: FxHashSet::default(),
      labels_gotoed: FxHashMap::default(),
      open_blocks: Vec::new(),
      current,
      peek,
    })
  }

  fn check_token(&self, kind: TokenKind) -> bool {
    self.current.kind == kind
  }

  /// Shift the window by one token.
  fn next_token(&mut self) -> CompileResult<()> {
    let next = self.lexer.next_token()?;
    self.current = std::mem::replace(&mut self.peek, next);
    Ok(())
  }

  /// Binary operators are spaced so a following unary sign never fuses with
  /// them into `--` or `++`.
  fn emit_operator(&mut self) {
    self.emitter.emit(&format!(" {} ", self.current.text));
  }

  fn error_at(&self, loc: usize, message: impl Into<String>) -> CompileError {
    CompileError::syntax(self.lexer.source(), loc, message)
  }

  fn unexpected(&self, expected: impl std::fmt::Display) -> CompileError {
    let got = describe_token(&self.current);
    self.error_at(
      self.current.loc,
      format!("expected {expected}, but got \"{got}\""),
    )
  }

  /// Consume the current token if it has the given kind, fail otherwise.
  fn match_token(&mut self, kind: TokenKind) -> CompileResult<()> {
    if !self.check_token(kind) {
      return Err(self.unexpected(kind));
    }
    self.next_token()
  }

  /// Consume an identifier and hand back its text and location.
  fn ident(&mut self) -> CompileResult<(String, usize)> {
    if !self.check_token(TokenKind::Ident) {
      return Err(self.unexpected(TokenKind::Ident));
    }
    let name = self.current.text.clone();
    let loc = self.current.loc;
    self.next_token()?;
    Ok((name, loc))
  }

  /// Add `name` to the variable table, declaring it in the header the first
  /// time it is seen.
  fn declare_variable(&mut self, name: &str) {
    if self.symbols.insert(name.to_string()) {
      self.emitter.header_line(&format!("    float {name};"));
    }
  }

  /// program ::= {statement}
  pub fn program(&mut self) -> CompileResult<()> {
    self.emitter.header_line("#include <stdio.h>");
    self.emitter.header_line("int main(void) {");
    self.emitter.indent();

    while self.check_token(TokenKind::Newline) {
      self.next_token()?;
    }

    while !self.check_token(TokenKind::Eof) {
      self.statement()?;
    }

    if let Some(close) = self.open_blocks.last() {
      return Err(self.unexpected(close));
    }

    self.emitter.emit_line("return 0;");
    self.emitter.dedent();
    self.emitter.emit_line("}");

    self.check_labels()
  }

  /// Every jump target must have been declared somewhere in the program.
  fn check_labels(&self) -> CompileResult<()> {
    let unresolved = self
      .labels_gotoed
      .iter()
      .filter(|(label, _)| !self.labels_declared.contains(*label))
      .min_by_key(|(_, loc)| **loc);

    match unresolved {
      Some((label, loc)) => Err(self.error_at(
        *loc,
        format!("attempting to GOTO undeclared label: {label}"),
      )),
      None => Ok(()),
    }
  }

  fn statement(&mut self) -> CompileResult<()> {
    match self.current.kind {
      TokenKind::Rem => self.rem()?,
      TokenKind::Print => self.print()?,
      TokenKind::If => self.open_block("if", TokenKind::Then, TokenKind::Endif)?,
      TokenKind::While => self.open_block("while", TokenKind::Repeat, TokenKind::Endwhile)?,
      TokenKind::Endif | TokenKind::Endwhile
        if self.open_blocks.last() == Some(&self.current.kind) =>
      {
        self.close_block()?
      }
      TokenKind::Label => self.label()?,
      TokenKind::Goto => self.goto()?,
      TokenKind::Let => self.let_statement()?,
      TokenKind::Input => self.input()?,
      _ => {
        let got = describe_token(&self.current);
        return Err(self.error_at(
          self.current.loc,
          format!("invalid statement at \"{got}\""),
        ));
      }
    }

    self.nl()
  }

  /// "REM" {any-token}
  fn rem(&mut self) -> CompileResult<()> {
    self.next_token()?;
    let mut words = Vec::new();
    while !self.check_token(TokenKind::Newline) && !self.check_token(TokenKind::Eof) {
      words.push(self.current.text.clone());
      self.next_token()?;
    }

    if words.is_empty() {
      self.emitter.emit_line("//");
    } else {
      self.emitter.emit_line(&format!("// {}", words.join(" ")));
    }
    Ok(())
  }

  /// "PRINT" (STRING | expression)
  fn print(&mut self) -> CompileResult<()> {
    self.next_token()?;

    if self.check_token(TokenKind::String) {
      let text = self.current.text.clone();
      self.emitter.emit_line(&format!("printf(\"{text}\\n\");"));
      return self.next_token();
    }

    self.emitter.emit("printf(\"%.2f\\n\", (float)(");
    self.expression()?;
    self.emitter.emit_line("));");
    Ok(())
  }

  /// "IF" comparison "THEN" nl {statement} "ENDIF"
  /// "WHILE" comparison "REPEAT" nl {statement} "ENDWHILE"
  ///
  /// Only the header is handled here. The body is parsed by the statement
  /// loop, and the closing keyword is matched against `open_blocks`, so
  /// nesting depth never grows the call stack.
  fn open_block(&mut self, guard: &str, open: TokenKind, close: TokenKind) -> CompileResult<()> {
    self.next_token()?;
    self.emitter.emit(guard);
    self.emitter.emit(" (");
    self.comparison()?;

    self.match_token(open)?;
    self.emitter.emit_line(") {");
    self.emitter.indent();
    self.open_blocks.push(close);
    Ok(())
  }

  /// "ENDIF" | "ENDWHILE" closing the innermost open block.
  fn close_block(&mut self) -> CompileResult<()> {
    self.open_blocks.pop();
    self.next_token()?;
    self.emitter.dedent();
    self.emitter.emit_line("}");
    Ok(())
  }

  /// "LABEL" IDENT
  fn label(&mut self) -> CompileResult<()> {
    self.next_token()?;
    let (name, loc) = self.ident()?;

    if !self.labels_declared.insert(name.clone()) {
      return Err(self.error_at(loc, format!("label already exists: {name}")));
    }
    self.emitter.emit_line(&format!("{name}:"));
    Ok(())
  }

  /// "GOTO" IDENT
  fn goto(&mut self) -> CompileResult<()> {
    self.next_token()?;
    let (name, loc) = self.ident()?;

    self.emitter.emit_line(&format!("goto {name};"));
    self.labels_gotoed.entry(name).or_insert(loc);
    Ok(())
  }

  /// "LET" IDENT "=" expression
  fn let_statement(&mut self) -> CompileResult<()> {
    self.next_token()?;
    let (name, _) = self.ident()?;

    self.declare_variable(&name);
    self.emitter.emit(&format!("{name} = "));
    self.match_token(TokenKind::Eq)?;
    self.expression()?;
    self.emitter.emit_line(";");
    Ok(())
  }

  /// "INPUT" IDENT
  fn input(&mut self) -> CompileResult<()> {
    self.next_token()?;
    let (name, _) = self.ident()?;

    self.declare_variable(&name);
    self.emitter.emit_line(&format!("if (0 == scanf(\"%f\", &{name})) {{"));
    self.emitter.indent();
    self.emitter.emit_line(&format!("{name} = 0;"));
    self.emitter.emit_line("scanf(\"%*s\");");
    self.emitter.dedent();
    self.emitter.emit_line("}");
    Ok(())
  }

  /// comparison ::= expression (relop expression)+
  ///
  /// Chained operators are emitted back to back, exactly as written.
  fn comparison(&mut self) -> CompileResult<()> {
    self.expression()?;

    if !self.current.kind.is_comparison() {
      return Err(self.unexpected("a comparison operator"));
    }

    while self.current.kind.is_comparison() {
      self.emit_operator();
      self.next_token()?;
      self.expression()?;
    }
    Ok(())
  }

  /// expression ::= term {("+" | "-") term}
  fn expression(&mut self) -> CompileResult<()> {
    self.term()?;
    while self.check_token(TokenKind::Plus) || self.check_token(TokenKind::Minus) {
      self.emit_operator();
      self.next_token()?;
      self.term()?;
    }
    Ok(())
  }

  /// term ::= unary {("*" | "/") unary}
  fn term(&mut self) -> CompileResult<()> {
    self.unary()?;
    while self.check_token(TokenKind::Asterisk) || self.check_token(TokenKind::Slash) {
      self.emit_operator();
      self.next_token()?;
      self.unary()?;
    }
    Ok(())
  }

  /// unary ::= ["+" | "-"] primary
  fn unary(&mut self) -> CompileResult<()> {
    if self.check_token(TokenKind::Plus) || self.check_token(TokenKind::Minus) {
      self.emitter.emit(&self.current.text);
      self.next_token()?;
    }
    self.primary()
  }

  /// primary ::= NUMBER | IDENT
  fn primary(&mut self) -> CompileResult<()> {
    match self.current.kind {
      TokenKind::Number => {
        self.emitter.emit(&self.current.text);
        self.next_token()
      }
      TokenKind::Ident => {
        if !self.symbols.contains(&self.current.text) {
          return Err(self.error_at(
            self.current.loc,
            format!(
              "referencing variable before assignment: {}",
              self.current.text
            ),
          ));
        }
        self.emitter.emit(&self.current.text);
        self.next_token()
      }
      _ => Err(self.unexpected("a number or identifier")),
    }
  }

  /// nl ::= NEWLINE {NEWLINE}
  fn nl(&mut self) -> CompileResult<()> {
    self.match_token(TokenKind::Newline)?;
    while self.check_token(TokenKind::Newline) {
      self.next_token()?;
    }
    Ok(())
  }
}
