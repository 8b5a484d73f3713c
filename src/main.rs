use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use rbasicc::{CompileError, compile_to_c, output_path_for};
use snafu::{ResultExt, Snafu};

#[derive(Debug, Snafu)]
enum DriverError {
  #[snafu(display("I/O error: could not read {}: {source}", path.display()))]
  Read {
    path: PathBuf,
    source: std::io::Error,
  },
  #[snafu(display("I/O error: could not write {}: {source}", path.display()))]
  Write {
    path: PathBuf,
    source: std::io::Error,
  },
  #[snafu(transparent)]
  Compile { source: CompileError },
}

/// Compile `input` and write the C file next to it. The output is only
/// touched once the whole program compiled.
fn run(input: &Path) -> Result<PathBuf, DriverError> {
  let source = fs::read_to_string(input).context(ReadSnafu { path: input })?;
  let code = compile_to_c(&source)?;
  let output = output_path_for(input);
  fs::write(&output, code).context(WriteSnafu { path: &output })?;
  Ok(output)
}

fn main() {
  let args: Vec<String> = env::args().collect();
  if args.len() != 2 {
    let program = args.first().map(String::as_str).unwrap_or("rbasicc");
    eprintln!("usage: {program} <source-file>");
    process::exit(1);
  }

  match run(Path::new(&args[1])) {
    Ok(output) => println!("Compiling done. Wrote {}", output.display()),
    Err(err) => {
      eprintln!("{err}");
      process::exit(1);
    }
  }
}
