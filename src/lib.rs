//! JAL: a small statically-typed imperative scripting language. The library crate exposes the
//! four pipeline stages (`lexer` → `parser` → `checker` → `evaluator`) plus [`run_source`], a
//! single entry point that runs all four and reports the result the way the CLI binary does,
//! useful both for the binary and for tests that only care about end-to-end behavior.

pub mod ast;
pub mod checker;
pub mod cli;
pub mod evaluator;
pub mod lexer;
pub mod parser;

use std::io::Write;

/// The default maximum call-frame depth (§5), overridable by the CLI's `--max-depth` flag.
pub const DEFAULT_MAX_DEPTH: usize = 10_000;

/// Runs a complete JAL program through every stage and returns `(exit_code, stdout)`. Exit code
/// `0` means the program ran to completion; `1` covers lex/parse errors, type errors, and runtime
/// errors alike, matching the CLI's exit code contract (§6). Diagnostic text (type errors, the
/// fatal error message) is not part of the returned string — only what the program itself wrote
/// via `print`.
#[must_use]
pub fn run_source(source: &str) -> (i32, String) {
	run_source_with_depth(source, DEFAULT_MAX_DEPTH)
}

#[must_use]
pub fn run_source_with_depth(source: &str, max_depth: usize) -> (i32, String) {
	let mut output = Vec::new();
	let exit_code = i32::from(run_pipeline(source, max_depth, &mut output).is_err());
	(exit_code, String::from_utf8_lossy(&output).into_owned())
}

fn run_pipeline(source: &str, max_depth: usize, output: &mut dyn Write) -> anyhow::Result<()> {
	let mut tokens = lexer::tokenize(source)?;
	let program = parser::parse(&mut tokens)?;

	let errors = checker::check(&program);
	if !errors.is_empty() {
		anyhow::bail!(errors.join("\n"));
	}

	evaluator::evaluate(&program, max_depth, output)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn arithmetic_and_print() {
		let (exit_code, stdout) = run_source("fn main():void { let x := 2 + 3 * 4; print(x) }");
		assert_eq!(exit_code, 0);
		assert_eq!(stdout, "14\n");
	}

	#[test]
	fn integer_division() {
		let (exit_code, stdout) = run_source("fn main():void { print(7 / 2) }");
		assert_eq!((exit_code, stdout.as_str()), (0, "3\n"));
	}

	#[test]
	fn if_else_truthiness() {
		let source = r#"fn main():void { let s := "hi"; if (s == "hi") { print(1) } else { print(0) } }"#;
		assert_eq!(run_source(source), (0, "1\n".to_owned()));
	}

	#[test]
	fn for_in_over_list() {
		let source = "fn main():void { let xs := [10, 20, 30]; let sum := 0; for v in xs { sum = sum + v } print(sum) }";
		assert_eq!(run_source(source), (0, "60\n".to_owned()));
	}

	#[test]
	fn mutability_violation_is_rejected_with_no_stdout() {
		let (exit_code, stdout) = run_source("fn main():void { const k := 1; k = 2 }");
		assert_eq!(exit_code, 1);
		assert_eq!(stdout, "");
	}

	#[test]
	fn list_push_and_spread() {
		let source = "fn main():void { let a := [1]; a << 2; a << [3,4]; print(len(a)) }";
		assert_eq!(run_source(source), (0, "4\n".to_owned()));
	}

	#[test]
	fn recursive_function() {
		let source = "fn fact(n:int):int { if (n == 0) { return 1 } else { return n * fact(n - 1) } } fn main():void { print(fact(5)) }";
		assert_eq!(run_source(source), (0, "120\n".to_owned()));
	}

	#[test]
	fn missing_file_is_not_this_crates_concern_but_lex_errors_are_fatal() {
		let (exit_code, stdout) = run_source("fn main():void { let x := @ }");
		assert_eq!(exit_code, 1);
		assert_eq!(stdout, "");
	}
}
