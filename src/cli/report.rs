//! Pipeline progress reporting. No `log`/`tracing` dependency here, same as the rest of this
//! codebase's lineage: each phase prints a line with `colored` as it starts and finishes.

use colored::Colorize as _;

/// Prints `"{action} {object}... "`, runs `step`, then prints `Done!` or the error in red.
/// Returns whatever `step` returned, so callers keep using `?` as normal; the caller decides what
/// happens to a failed pipeline (the CLI binary turns it into an exit code).
pub fn step<T>(action: &str, object: &str, quiet: bool, result: anyhow::Result<T>) -> anyhow::Result<T> {
	if !quiet {
		print!("{} {}... ", action.bold().green(), object);
		use std::io::Write as _;
		let _ = std::io::stdout().flush();
	}

	match result {
		Ok(value) => {
			if !quiet {
				println!("{}", "done".bold().green());
			}
			Ok(value)
		},
		Err(error) => {
			if !quiet {
				println!("{}", "failed".bold().red());
			}
			Err(error)
		},
	}
}

/// Type-checking isn't a `Result` (§4.2 accumulates errors rather than failing fast), so it gets
/// its own progress line instead of going through `step`.
pub fn step_type_checking(quiet: bool, passed: bool) {
	if quiet {
		return;
	}
	print!("{} {}... ", "Type-checking".bold().green(), "program");
	use std::io::Write as _;
	let _ = std::io::stdout().flush();
	println!("{}", if passed { "done".bold().green() } else { "failed".bold().red() });
}

pub fn print_type_errors(errors: &[String]) {
	eprintln!("{}", "Type errors:".bold().red());
	for error in errors {
		eprintln!("  {}", error.red());
	}
	eprintln!("{}", format!("{} error(s)", errors.len()).bold().red());
}

pub fn print_fatal_error(error: &anyhow::Error) {
	eprintln!("{} {}", "Error:".bold().red(), error);
}
