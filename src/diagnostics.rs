//! Shared diagnostic vocabulary used by both the Lox and Monkey pipelines.

use std::fmt;

use colored::Colorize;

/// How serious a diagnostic is. Both languages currently only ever produce
/// errors; the variant exists so warnings (e.g. an unused variable pass) can
/// be added later without reshaping the collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
	Error,
	Warning,
}

impl fmt::Display for Severity {
	fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Error => write!(formatter, "{}", "error".red().bold()),
			Self::Warning => write!(formatter, "{}", "warning".yellow().bold()),
		}
	}
}

/// Which stage of the pipeline produced a diagnostic. Used only for
/// rendering; recovery behavior is identical for `Parse` and `Resolve`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
	Lex,
	Parse,
	Resolve,
	Runtime,
}

impl fmt::Display for Stage {
	fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
		let label = match self {
			Self::Lex | Self::Parse => "ParseError",
			Self::Resolve => "ResolveError",
			Self::Runtime => "RuntimeError",
		};
		write!(formatter, "{label}")
	}
}

/// Where in the source a diagnostic points, distinguishing a real token
/// (rendered quoted, `at '<lexeme>'`) from running off the end of input
/// (rendered bare, `at end of file`).
#[derive(Debug, Clone)]
pub enum Location {
	Lexeme(String),
	EndOfFile,
}

impl fmt::Display for Location {
	fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Lexeme(lexeme) => write!(formatter, "'{lexeme}'"),
			Self::EndOfFile => write!(formatter, "end of file"),
		}
	}
}

/// A single structured diagnostic: the line it occurred on, which stage
/// produced it, an optional location hint, and the message.
#[derive(Debug, Clone)]
pub struct Diagnostic {
	pub line: usize,
	pub stage: Stage,
	pub severity: Severity,
	pub location: Option<Location>,
	pub message: String,
}

impl Diagnostic {
	pub fn new(line: usize, stage: Stage, message: impl Into<String>) -> Self {
		Self { line, stage, severity: Severity::Error, location: None, message: message.into() }
	}

	#[must_use]
	pub fn at(mut self, location: Location) -> Self {
		self.location = Some(location);
		self
	}
}

impl fmt::Display for Diagnostic {
	fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(formatter, "[line {}] {}", self.line, self.stage)?;
		if let Some(location) = &self.location {
			write!(formatter, " at {location}")?;
		}
		write!(formatter, ": {}", self.message)
	}
}

impl std::error::Error for Diagnostic {}

/// The three-way classification the CLI driver maps onto a process exit
/// code: `0` on success, `1` if only lex/parse/resolve diagnostics were
/// raised, `2` if a runtime error aborted execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitClass {
	Success,
	StaticError,
	RuntimeError,
}

impl ExitClass {
	#[must_use]
	pub const fn code(self) -> i32 {
		match self {
			Self::Success => 0,
			Self::StaticError => 1,
			Self::RuntimeError => 2,
		}
	}
}

/// Accumulates diagnostics over the lifetime of one run (a file execution,
/// or a single REPL line).
#[derive(Debug, Default)]
pub struct Diagnostics {
	entries: Vec<Diagnostic>,
	runtime_error: bool,
}

impl Diagnostics {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, diagnostic: Diagnostic) {
		if diagnostic.stage == Stage::Runtime {
			self.runtime_error = true;
		}
		self.entries.push(diagnostic);
	}

	#[must_use]
	pub fn had_static_error(&self) -> bool {
		self.entries.iter().any(|d| d.stage != Stage::Runtime)
	}

	#[must_use]
	pub fn had_runtime_error(&self) -> bool {
		self.runtime_error
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	#[must_use]
	pub fn entries(&self) -> &[Diagnostic] {
		&self.entries
	}

	#[must_use]
	pub fn exit_class(&self) -> ExitClass {
		if self.had_runtime_error() {
			ExitClass::RuntimeError
		} else if self.had_static_error() {
			ExitClass::StaticError
		} else {
			ExitClass::Success
		}
	}

	/// Writes every accumulated diagnostic to stderr, one per line.
	pub fn report(&self) {
		for diagnostic in &self.entries {
			eprintln!("{diagnostic}");
		}
	}
}
