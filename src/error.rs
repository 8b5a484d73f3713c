//! Shared error utilities used across the compilation pipeline.
//!
//! Diagnostics stay lightweight: every error is anchored at a byte offset in
//! the source, and rendering quotes the offending line with a caret under the
//! column. The two variants map onto the two stages that can reject a
//! program, so callers can tell lexical problems apart from grammar ones.

use snafu::Snafu;

pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Debug, Snafu)]
pub enum CompileError {
  #[snafu(display("Lexing error at line {line}: {message}\n{source_line}\n{marker}"))]
  Lex {
    line: usize,
    source_line: String,
    marker: String,
    message: String,
  },
  #[snafu(display("Parsing error at line {line}: {message}\n{source_line}\n{marker}"))]
  Syntax {
    line: usize,
    source_line: String,
    marker: String,
    message: String,
  },
}

impl CompileError {
  /// Lexical error anchored at a specific byte offset in the source.
  pub fn lex(source: &str, loc: usize, message: impl Into<String>) -> Self {
    let location = Location::resolve(source, loc);
    Self::Lex {
      line: location.line,
      source_line: location.source_line,
      marker: location.marker,
      message: message.into(),
    }
  }

  /// Grammar or symbol-table error anchored at a specific byte offset.
  pub fn syntax(source: &str, loc: usize, message: impl Into<String>) -> Self {
    let location = Location::resolve(source, loc);
    Self::Syntax {
      line: location.line,
      source_line: location.source_line,
      marker: location.marker,
      message: message.into(),
    }
  }

  pub fn is_lex(&self) -> bool {
    matches!(self, Self::Lex { .. })
  }

  pub fn is_syntax(&self) -> bool {
    matches!(self, Self::Syntax { .. })
  }

  /// 1-based line the error points at.
  pub fn line(&self) -> usize {
    match self {
      Self::Lex { line, .. } | Self::Syntax { line, .. } => *line,
    }
  }

  pub fn message(&self) -> &str {
    match self {
      Self::Lex { message, .. } | Self::Syntax { message, .. } => message,
    }
  }
}

struct Location {
  line: usize,
  source_line: String,
  marker: String,
}

impl Location {
  fn resolve(source: &str, loc: usize) -> Self {
    let mut safe_loc = loc.min(source.len());
    while !source.is_char_boundary(safe_loc) {
      safe_loc -= 1;
    }
    let line_start = source[..safe_loc].rfind('\n').map_or(0, |pos| pos + 1);
    let line_end = source[safe_loc..]
      .find('\n')
      .map_or(source.len(), |pos| safe_loc + pos);
    let line = source[..safe_loc].matches('\n').count() + 1;
    let column = source[line_start..safe_loc].chars().count();
    let source_line = source[line_start..line_end].trim_end_matches('\r').to_string();
    let marker = format!("{}^", " ".repeat(column));
    Self {
      line,
      source_line,
      marker,
    }
  }
}
