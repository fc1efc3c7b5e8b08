//! `--debug` JSON dumps: one file per pipeline stage under `./outputs/`, named after the stage
//! that produced it. `walker` is the type-checker's pass over the AST (its accumulated error
//! list, empty on a clean program); `EXE` is the outcome of evaluation.

use std::collections::VecDeque;
use std::path::Path;

use serde::Serialize;

use crate::ast::Program;
use crate::lexer::Token;

#[derive(Serialize)]
struct ExecutionDump<'a> {
	exit_code: i32,
	stdout: &'a str,
}

pub fn write_dumps(tokens: &VecDeque<Token>, program: &Program, checker_errors: &[String], exit_code: i32, stdout: &str) -> anyhow::Result<()> {
	let directory = Path::new("./outputs");
	std::fs::create_dir_all(directory)?;

	write_json(directory, "token", &Vec::from_iter(tokens.iter().cloned()))?;
	write_json(directory, "AST", program)?;
	write_json(directory, "walker", checker_errors)?;
	write_json(directory, "EXE", &ExecutionDump { exit_code, stdout })?;

	Ok(())
}

fn write_json<T: Serialize>(directory: &Path, name: &str, value: &T) -> anyhow::Result<()> {
	let path = directory.join(format!("{name}.json"));
	let file = std::fs::File::create(&path)?;
	serde_json::to_writer_pretty(file, value)?;
	Ok(())
}
