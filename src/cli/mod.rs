//! The CLI entry point: reads a file, runs it through all four pipeline stages, and reports
//! progress and errors the way the rest of this crate's ambient stack does (`colored`, no
//! `log`/`tracing`). This module owns nothing the hard core depends on; it's a thin driver.

mod args;
mod debug;
mod report;

use std::io::Write as _;

pub use args::Args;

/// Runs the CLI to completion and returns the process exit code (§6: `0` success, `1` otherwise).
#[must_use]
pub fn run(args: &Args) -> i32 {
	match execute(args) {
		Ok(exit_code) => exit_code,
		Err(error) => {
			report::print_fatal_error(&error);
			1
		},
	}
}

fn execute(args: &Args) -> anyhow::Result<i32> {
	// The step banner only appears when explicitly asked for with --output, and never when
	// --quiet is set, even together with --output.
	let quiet = args.quiet || !args.output;

	let source = report::step("Reading", "source file", quiet, std::fs::read_to_string(&args.filename).map_err(anyhow::Error::from))?;
	let tokens = report::step("Tokenizing", "source code", quiet, crate::lexer::tokenize(&source))?;

	let mut token_queue = tokens.clone();
	let program = report::step("Parsing", "token stream", quiet, crate::parser::parse(&mut token_queue))?;

	let checker_errors = crate::checker::check(&program);
	report::step_type_checking(quiet, checker_errors.is_empty());
	if !checker_errors.is_empty() {
		report::print_type_errors(&checker_errors);
		if args.debug {
			debug::write_dumps(&tokens, &program, &checker_errors, 1, "")?;
		}
		return Ok(1);
	}

	let mut program_output = Vec::new();
	let evaluation = report::step("Evaluating", "abstract syntax tree", quiet, crate::evaluator::evaluate(&program, args.max_depth, &mut program_output));

	let stdout_text = String::from_utf8_lossy(&program_output).into_owned();
	print!("{stdout_text}");
	std::io::stdout().flush()?;

	let exit_code = i32::from(evaluation.is_err());
	if let Err(error) = &evaluation {
		report::print_fatal_error(error);
	}

	if args.debug {
		debug::write_dumps(&tokens, &program, &checker_errors, exit_code, &stdout_text)?;
	}

	Ok(exit_code)
}
