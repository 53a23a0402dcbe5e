use std::process::ExitCode;

use clap::Parser;

use twin_script::cli::{self, Cli};

fn main() -> ExitCode {
	let cli = Cli::parse();
	cli::run(&cli)
}
