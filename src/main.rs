use clap::Parser as _;
use jal::cli::Args;

fn main() {
	let args = Args::parse();
	std::process::exit(jal::cli::run(&args));
}
