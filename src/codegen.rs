//! Output buffering for the generated C source.
//!
//! The parser emits code while it recognises the program, so declarations
//! for freshly seen variables show up in the middle of the body stream. The
//! emitter keeps them in a separate header buffer and stitches the two
//! together at the end: header first, body second.

const INDENT: &str = "    ";
/// Deeper blocks keep this indentation so output stays linear in size.
const MAX_INDENT_LEVELS: usize = 32;

/// Append-only pair of text buffers.
#[derive(Debug, Default)]
pub struct Emitter {
  header: String,
  code: String,
  indent: usize,
  at_line_start: bool,
}

impl Emitter {
  pub fn new() -> Self {
    Self {
      at_line_start: true,
      ..Self::default()
    }
  }

  /// Append to the body without ending the line.
  pub fn emit(&mut self, code: &str) {
    if code.is_empty() {
      return;
    }
    if self.at_line_start {
      for _ in 0..self.indent.min(MAX_INDENT_LEVELS) {
        self.code.push_str(INDENT);
      }
      self.at_line_start = false;
    }
    self.code.push_str(code);
  }

  /// Append to the body and end the line.
  pub fn emit_line(&mut self, code: &str) {
    self.emit(code);
    self.code.push('\n');
    self.at_line_start = true;
  }

  /// Append a full line to the header.
  pub fn header_line(&mut self, code: &str) {
    self.header.push_str(code);
    self.header.push('\n');
  }

  /// Open a nested block: following body lines are indented one more level.
  pub fn indent(&mut self) {
    self.indent += 1;
  }

  pub fn dedent(&mut self) {
    self.indent = self.indent.saturating_sub(1);
  }

  /// Materialize the compiled output, header before body.
  pub fn finish(self) -> String {
    let mut output = self.header;
    output.push_str(&self.code);
    output
  }
}
