//! Command-line argument shape. JAL only has one verb — run a file — so this is a single
//! `clap::Parser` struct rather than a subcommand enum.

use std::path::PathBuf;

#[derive(clap::Parser)]
#[command(name = "jal", about = "A small statically-typed imperative scripting language.")]
pub struct Args {
	/// Path to the `.jal` source file to run.
	pub filename: PathBuf,

	/// Write JSON dumps of the tokens, AST, checker result, and execution log to ./outputs/.
	#[arg(short, long)]
	pub debug: bool,

	/// Print the step log (Tokenizing/Parsing/Type-checking/Evaluating) to stdout as it runs.
	#[arg(short, long)]
	pub output: bool,

	/// Maximum call-frame depth before a program is aborted with a stack overflow error.
	#[arg(long, default_value_t = crate::DEFAULT_MAX_DEPTH)]
	pub max_depth: usize,

	/// Suppress the step log entirely, including the banner `--output` would otherwise print.
	#[arg(short, long)]
	pub quiet: bool,
}
