//! Crate root: wires together the compilation pipeline.
//!
//! Translation is a single pass with no intermediate tree:
//! - `tokenizer` lazily turns source text into classified tokens.
//! - `parser` enforces the grammar and emits C while it recognises it.
//! - `codegen` buffers the emitted text, keeping declarations ahead of code.
//! - `error` holds the diagnostics shared by the other modules.

pub mod codegen;
pub mod error;
pub mod parser;
pub mod tokenizer;

use std::path::{Path, PathBuf};

pub use error::{CompileError, CompileResult};

/// Compile a BASIC program into C source text.
///
/// Nothing is produced unless the whole program is valid; the first error
/// ends the compile.
pub fn compile_to_c(source: &str) -> CompileResult<String> {
  let lexer = tokenizer::Lexer::new(source);
  let mut emitter = codegen::Emitter::new();
  parser::Parser::new(lexer, &mut emitter)?.program()?;
  Ok(emitter.finish())
}

/// Derive the output file: everything from the first period of the file
/// name onward becomes `.c`.
pub fn output_path_for(input: &Path) -> PathBuf {
  let file_name = input
    .file_name()
    .map(|name| name.to_string_lossy().into_owned())
    .unwrap_or_default();
  let stem = file_name.split('.').next().unwrap_or_default();
  input.with_file_name(format!("{stem}.c"))
}
