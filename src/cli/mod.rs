//! Command-line driver.
//!
//! A `LanguageRuntime` trait dispatched via `enum_dispatch` over
//! `LoxRuntime`/`MonkeyRuntime` picks the pipeline named by `--lang`.
//! Stdout carries only the interpreted program's own output — no
//! decorative progress printing.

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use crate::diagnostics::{Diagnostics, ExitClass};
use crate::{lox, monkey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Language {
	Lox,
	Monkey,
}

impl std::fmt::Display for Language {
	fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		self.to_possible_value().expect("Language has no skipped variants").get_name().fmt(formatter)
	}
}

/// `twin-script [--lang lox|monkey] [script]`. Zero positional args starts
/// a REPL in the selected language; one arg executes that file.
#[derive(Debug, Parser)]
#[command(name = "twin-script", about = "Tree-walking interpreters for Lox and Monkey")]
pub struct Cli {
	#[arg(long, value_enum, default_value_t = Language::Lox)]
	pub lang: Language,

	/// Path to a script to execute; omit to start a REPL.
	pub script: Option<std::path::PathBuf>,
}

#[enum_dispatch::enum_dispatch]
trait LanguageRuntime {
	fn run_file(&self, path: &Path) -> anyhow::Result<ExitClass>;
	fn run_repl(&self) -> anyhow::Result<ExitClass>;
}

struct LoxRuntime;
struct MonkeyRuntime;

impl LanguageRuntime for LoxRuntime {
	fn run_file(&self, path: &Path) -> anyhow::Result<ExitClass> {
		run_file_generic(path, lox::run)
	}

	fn run_repl(&self) -> anyhow::Result<ExitClass> {
		let mut interpreter = lox::interpreter::Interpreter::new();
		run_repl_generic(|line, diagnostics| lox::run_with(line, &mut interpreter, diagnostics))
	}
}

impl LanguageRuntime for MonkeyRuntime {
	fn run_file(&self, path: &Path) -> anyhow::Result<ExitClass> {
		run_file_generic(path, monkey::run)
	}

	fn run_repl(&self) -> anyhow::Result<ExitClass> {
		let mut interpreter = monkey::interpreter::Interpreter::new();
		run_repl_generic(|line, diagnostics| monkey::run_with(line, &mut interpreter, diagnostics))
	}
}

#[enum_dispatch::enum_dispatch(LanguageRuntime)]
enum Runtime {
	LoxRuntime(LoxRuntime),
	MonkeyRuntime(MonkeyRuntime),
}

fn run_file_generic(path: &Path, run: impl FnOnce(&str) -> Diagnostics) -> anyhow::Result<ExitClass> {
	let source = std::fs::read_to_string(path)?;
	let diagnostics = run(&source);
	diagnostics.report();
	Ok(diagnostics.exit_class())
}

fn run_repl_generic(mut run_line: impl FnMut(&str, &mut Diagnostics)) -> anyhow::Result<ExitClass> {
	let stdin = io::stdin();
	let mut stdout = io::stdout();
	let mut line = String::new();

	loop {
		print!("> ");
		stdout.flush()?;
		line.clear();
		if stdin.lock().read_line(&mut line)? == 0 {
			break;
		}
		let mut diagnostics = Diagnostics::new();
		run_line(line.trim_end(), &mut diagnostics);
		diagnostics.report();
	}

	Ok(ExitClass::Success)
}

/// Entry point used by `main.rs`. Returns the process exit code.
pub fn run(cli: &Cli) -> ExitCode {
	let runtime: Runtime = match cli.lang {
		Language::Lox => LoxRuntime.into(),
		Language::Monkey => MonkeyRuntime.into(),
	};

	let result = match &cli.script {
		Some(path) => runtime.run_file(path),
		None => runtime.run_repl(),
	};

	match result {
		Ok(exit_class) => ExitCode::from(exit_class.code() as u8),
		Err(error) => {
			eprintln!("error: {error:#}");
			ExitCode::from(70)
		}
	}
}
