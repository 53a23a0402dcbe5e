//! End-to-end CLI tests for the Lox pipeline.

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
		.arg(file.path())
		.assert()
}

#[test]
fn arithmetic_precedence() {
	run("print 1 + 2 * 3;").success().stdout(predicate::eq("7\n"));
}

#[test]
fn block_scoping_shadows_global() {
	run(r#"var a = "global"; { var a = "block"; print a; } print a;"#)
		.success()
		.stdout(predicate::eq("block\nglobal\n"));
}

#[test]
fn closures_capture_by_reference() {
	let source = r#"
		fun counter() {
			var n = 0;
			fun inc() {
				n = n + 1;
				return n;
			}
			return inc;
		}
		var c = counter();
		print c();
		print c();
		print c();
	"#;
	run(source).success().stdout(predicate::eq("1\n2\n3\n"));
}

#[test]
fn method_call_on_instance() {
	let source = r#"
		class Greeter {
			greet(name) {
				print "hi " + name;
			}
		}
		Greeter().greet("world");
	"#;
	run(source).success().stdout(predicate::eq("hi world\n"));
}

#[test]
fn super_call_chains_to_parent_method() {
	let source = r#"
		class A {
			f() {
				print "A";
			}
		}
		class B < A {
			f() {
				super.f();
				print "B";
			}
		}
		B().f();
	"#;
	run(source).success().stdout(predicate::eq("A\nB\n"));
}

#[test]
fn initializer_binds_this() {
	let source = r#"
		class Point {
			init(x) {
				this.x = x;
			}
		}
		print Point(42).x;
	"#;
	run(source).success().stdout(predicate::eq("42\n"));
}

#[test]
fn parse_error_exits_with_code_one() {
	run("var = 1;").code(1);
}

#[test]
fn runtime_error_exits_with_code_two() {
	run("print undefined_name;").code(2);
}

#[test]
fn self_inheriting_class_is_a_static_error() {
	run("class A < A {}").code(1).stderr(predicate::str::contains("ResolveError"));
}
