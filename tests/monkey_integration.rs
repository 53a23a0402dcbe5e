//! End-to-end CLI tests for the Monkey pipeline.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

fn script_file(source: &str) -> NamedTempFile {
	let mut file = NamedTempFile::new().expect("create temp script file");
	write!(file, "{source}").expect("write temp script file");
	file
}

fn run(source: &str) -> assert_cmd::assert::Assert {
	let file = script_file(source);
	Command::cargo_bin("twin-script")
		.expect("locate twin-script binary")
		.args(["--lang", "monkey"])
		.arg(file.path())
		.assert()
}

#[test]
fn integer_arithmetic() {
	run("1 + 2 * 3;").success().stdout(predicate::eq("7\n"));
}

#[test]
fn closures_capture_environment() {
	let source = r#"
		let newAdder = fn(x) {
			fn(y) { x + y; };
		};
		let addTwo = newAdder(2);
		addTwo(3);
	"#;
	run(source).success().stdout(predicate::eq("5\n"));
}

#[test]
fn return_bubbles_through_nested_if() {
	let source = r#"
		let counter = fn(x) {
			if (x > 2) {
				return true;
			} else {
				return counter(x + 1);
			}
		};
		counter(0);
	"#;
	run(source).success().stdout(predicate::eq("true\n"));
}

#[test]
fn calling_non_function_is_runtime_error() {
	run("let x = 5; x();").code(2).stderr(predicate::str::contains("RuntimeError"));
}

#[test]
fn string_concatenation() {
	run(r#""foo" + "bar";"#).success().stdout(predicate::eq("foobar\n"));
}

#[test]
fn only_the_final_statement_value_is_printed() {
	run("1 + 1; 2 + 2;").success().stdout(predicate::eq("4\n"));
}
