// End-to-end tests for the BASIC to C translation.

use rbasicc::compile_to_c;
use rbasicc::tokenizer::{TokenKind, tokenize};

fn brace_depths(output: &str) -> (usize, i64) {
  let mut depth = 0i64;
  let mut max_depth = 0usize;
  for c in output.chars() {
    match c {
      '{' => {
        depth += 1;
        max_depth = max_depth.max(depth as usize);
      }
      '}' => {
        depth -= 1;
        assert!(depth >= 0, "closing brace without opener:\n{output}");
      }
      _ => {}
    }
  }
  (max_depth, depth)
}

#[test]
fn test_print_string() {
  let output = compile_to_c("PRINT \"HELLO\"").expect("compile failed");
  assert_eq!(
    output,
    "#include <stdio.h>\nint main(void) {\n    printf(\"HELLO\\n\");\n    return 0;\n}\n"
  );
}

#[test]
fn test_let_then_print() {
  let output = compile_to_c("LET x = 5\nPRINT x\n").expect("compile failed");
  assert_eq!(
    output,
    concat!(
      "#include <stdio.h>\n",
      "int main(void) {\n",
      "    float x;\n",
      "    x = 5;\n",
      "    printf(\"%.2f\\n\", (float)(x));\n",
      "    return 0;\n",
      "}\n",
    )
  );
}

#[test]
fn test_declarations_precede_code_declared_later() {
  let source = "PRINT \"start\"\nLET a = 1\nPRINT a\nINPUT b\nLET c = a + b\n";
  let output = compile_to_c(source).expect("compile failed");
  let first_statement = output.find("printf(\"start").unwrap();
  for decl in ["float a;", "float b;", "float c;"] {
    let at = output.find(decl).unwrap_or_else(|| panic!("missing {decl}"));
    assert!(at < first_statement, "{decl} emitted after body code");
  }
}

#[test]
fn test_undeclared_variable_fails() {
  let err = compile_to_c("PRINT y").unwrap_err();
  assert!(err.is_syntax());
  assert!(err.to_string().starts_with("Parsing error"));
}

#[test]
fn test_goto_checked_at_end_of_program() {
  // The reference itself parses fine; only the final check rejects it.
  let err = compile_to_c("GOTO missing\nPRINT \"after\"\nLET x = 1\n").unwrap_err();
  assert!(err.is_syntax());
  assert_eq!(err.line(), 1);
  assert!(err.message().contains("missing"));

  // A statement error after the jump wins, since the program never finishes.
  let err = compile_to_c("GOTO missing\nPRINT y\n").unwrap_err();
  assert_eq!(err.line(), 2);
  assert!(err.message().contains("variable"));
}

#[test]
fn test_forward_and_backward_jumps() {
  let source = "\
LET n = 0
GOTO check
LABEL top
LET n = n + 1
LABEL check
IF n < 3 THEN
GOTO top
ENDIF
PRINT n
";
  let output = compile_to_c(source).expect("compile failed");
  assert!(output.contains("    goto check;\n"));
  assert!(output.contains("    top:\n"));
  assert!(output.contains("        goto top;\n"));
}

#[test]
fn test_duplicate_label_fails() {
  let err = compile_to_c("LABEL a\nLABEL a\n").unwrap_err();
  assert!(err.is_syntax());
  assert_eq!(err.line(), 2);
}

#[test]
fn test_number_literals() {
  assert!(compile_to_c("LET x = 3.").unwrap_err().is_lex());

  let tokens = tokenize("3.14 007").expect("lexing failed");
  assert_eq!(tokens[0].kind, TokenKind::Number);
  assert_eq!(tokens[0].text, "3.14");
  assert_eq!(tokens[1].text, "007");

  let output = compile_to_c("LET x = 007\nLET y = 3.14").expect("compile failed");
  assert!(output.contains("x = 007;"));
  assert!(output.contains("y = 3.14;"));
}

#[test]
fn test_lex_errors_are_categorised() {
  for source in ["PRINT \"50%\"", "IF 1 ! 2 THEN\nENDIF", "LET x = $"] {
    let err = compile_to_c(source).unwrap_err();
    assert!(err.is_lex(), "{source:?}");
    assert!(err.to_string().starts_with("Lexing error"));
  }
}

#[test]
fn test_nested_blocks_balance_braces() {
  let mut source = String::from("LET i = 0\n");
  let depth = 6;
  for level in 0..depth {
    if level % 2 == 0 {
      source.push_str("WHILE i < 10 REPEAT\n");
    } else {
      source.push_str("IF i >= 0 THEN\n");
    }
  }
  source.push_str("LET i = i + 1\n");
  for level in (0..depth).rev() {
    if level % 2 == 0 {
      source.push_str("ENDWHILE\n");
    } else {
      source.push_str("ENDIF\n");
    }
  }

  let output = compile_to_c(&source).expect("compile failed");
  let (max_depth, remaining) = brace_depths(&output);
  assert_eq!(remaining, 0);
  // main's own braces add one level.
  assert_eq!(max_depth, depth + 1);

  let innermost = format!("{}i = i + 1;\n", "    ".repeat(depth + 1));
  assert!(output.contains(&innermost), "{output}");
}

#[test]
fn test_full_program() {
  let source = "\
# Fibonacci numbers
PRINT \"How many fibonacci numbers do you want?\"
INPUT nums
PRINT \"\"

LET a = 0
LET b = 1
WHILE nums > 0 REPEAT
    PRINT a
    LET c = a + b
    LET a = b
    LET b = c
    LET nums = nums - 1
ENDWHILE
";
  let output = compile_to_c(source).expect("compile failed");
  let expected = concat!(
    "#include <stdio.h>\n",
    "int main(void) {\n",
    "    float nums;\n",
    "    float a;\n",
    "    float b;\n",
    "    float c;\n",
    "    printf(\"How many fibonacci numbers do you want?\\n\");\n",
    "    if (0 == scanf(\"%f\", &nums)) {\n",
    "        nums = 0;\n",
    "        scanf(\"%*s\");\n",
    "    }\n",
    "    printf(\"\\n\");\n",
    "    a = 0;\n",
    "    b = 1;\n",
    "    while (nums > 0) {\n",
    "        printf(\"%.2f\\n\", (float)(a));\n",
    "        c = a + b;\n",
    "        a = b;\n",
    "        b = c;\n",
    "        nums = nums - 1;\n",
    "    }\n",
    "    return 0;\n",
    "}\n",
  );
  assert_eq!(output, expected);
}

#[test]
fn test_compilation_is_deterministic() {
  let source = "INPUT a\nIF a > 1 THEN\nGOTO x\nENDIF\nLABEL x\nREM done\n";
  assert_eq!(compile_to_c(source).unwrap(), compile_to_c(source).unwrap());
}

#[test]
fn test_ten_thousand_nested_ifs() {
  let depth = 10_000;
  let source = "IF 1 < 2 THEN\n".repeat(depth) + &"ENDIF\n".repeat(depth);
  let output = compile_to_c(&source).expect("compile failed");
  let (max_depth, remaining) = brace_depths(&output);
  assert_eq!(remaining, 0);
  assert_eq!(max_depth, depth + 1);
}

#[test]
fn test_unclosed_block_points_at_last_line() {
  let err = compile_to_c("LET a = 1\nWHILE a < 2 REPEAT\nPRINT a\n").unwrap_err();
  assert_eq!(err.line(), 3);
  assert!(!err.to_string().contains("\n\n"), "{err}");
}
